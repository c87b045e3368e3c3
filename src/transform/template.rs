//! HTML fragment → TypeScript template module wrapping

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, Result};

const CONTENT_SLOT: &str = "{{ content }}";

/// Skeleton shared by every wrapped fragment
const WRAPPER_TEMPLATE: &str = "// This file is generated by html_to_wrapper.py


export const getTemplateHtml = function(): HTMLTemplateElement {
    return getTemplate({{ content }});
};";

/// Suffix appended to the wrapped file's name
pub const WRAPPER_SUFFIX: &str = ".ts";

/// Quote `html` as a backtick literal, escaping only backticks
pub fn escape_template_literal(html: &str) -> String {
    format!("`{}`", html.replace('`', "\\`"))
}

/// Render the wrapper module for `html`
pub fn render_wrapper(html: &str) -> Result<String> {
    render(WRAPPER_TEMPLATE, &escape_template_literal(html))
}

fn render(template: &str, literal: &str) -> Result<String> {
    let (head, tail) = template
        .split_once(CONTENT_SLOT)
        .ok_or_else(|| BuildError::Template(format!("template has no {CONTENT_SLOT} slot")))?;
    Ok(format!("{head}{literal}{tail}"))
}

/// Wrap `input` into `<output_base>.ts`; returns the written path
pub fn wrap_html(input: &Path, output_base: &Path) -> Result<PathBuf> {
    let html = fs::read_to_string(input).map_err(|e| BuildError::io(input, e))?;
    let module = render_wrapper(&html)?;

    let mut out = output_base.as_os_str().to_owned();
    out.push(WRAPPER_SUFFIX);
    let out = PathBuf::from(out);

    fs::write(&out, module).map_err(|e| BuildError::io(&out, e))?;
    Ok(out)
}
