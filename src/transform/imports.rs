//! Post-build import fix-ups for the compiled demo
//!
//! The wrapped templates export `getTemplateHtml` and call a `getTemplate`
//! helper that upstream provides from a module we do not ship. This pass
//! rewires the importers and defines the helper inside each wrapper.

use std::fs;
use std::path::Path;

use crate::error::{BuildError, Result};

const ABSOLUTE_STRINGS_IMPORT: &str = "import '/strings.m.js'";
const RELATIVE_STRINGS_IMPORT: &str = "import './strings.m.js'";
const TYPED_ACCESSOR: &str = "function(): HTMLTemplateElement";

/// Helper spliced over line 2 of every module still calling `getTemplate(`
const TEMPLATE_HELPER: &str = "
export function getTemplate(content: string) {
    const policy = trustedTypes.createPolicy('htmlTemplate', {
        createHTML: (string) => string
    });
    return policy.createHTML(`<!--_html_template_start_-->${content}<!--_html_template_end_-->`);
}";

/// Import specifiers of the wrapped templates once compiled to JS
fn template_modules<'a>(templates: &'a [&'a str]) -> impl Iterator<Item = String> + 'a {
    templates.iter().map(|name| format!("./{name}.js"))
}

/// Apply the fix-ups to one module's text
pub fn fix_module(text: &str, templates: &[&str]) -> String {
    let mut out = text.replacen(ABSOLUTE_STRINGS_IMPORT, RELATIVE_STRINGS_IMPORT, 1);

    for module in template_modules(templates) {
        let import = format!("import {{getTemplate}} from '{module}'");
        if out.contains(&import) {
            let renamed = format!("import {{getTemplateHtml}} from '{module}'");
            out = out
                .replacen(&import, &renamed, 1)
                .replacen("getTemplate()", "getTemplateHtml()", 1);
        }
    }

    if out.contains("getTemplate(") && !out.contains("export function getTemplate(") {
        out = replace_line(&out, 2, TEMPLATE_HELPER);
    }

    out.replacen(TYPED_ACCESSOR, "function()", 1)
}

/// Replace 1-based line `number`; out-of-range numbers leave the text as is
fn replace_line(text: &str, number: usize, replacement: &str) -> String {
    let mut lines: Vec<&str> = text.split('\n').collect();
    match lines.get_mut(number.wrapping_sub(1)) {
        Some(line) => {
            *line = replacement;
            lines.join("\n")
        }
        None => text.to_string(),
    }
}

/// Fix up every `*.ts` file directly inside `dir`; returns how many changed
pub fn fix_directory(dir: &Path, templates: &[&str]) -> Result<usize> {
    let mut changed = 0;
    for path in super::typescript_files(dir)? {
        let text = fs::read_to_string(&path).map_err(|e| BuildError::io(&path, e))?;
        let fixed = fix_module(&text, templates);
        if fixed != text {
            fs::write(&path, fixed).map_err(|e| BuildError::io(&path, e))?;
            changed += 1;
        }
    }
    Ok(changed)
}
