//! Built-in `<if expr>` stripping, same contract as grit's script

use std::fs;
use std::path::Path;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::expr::evaluate;
use super::{PlatformPreprocessor, PreprocessJob, output_path};
use crate::error::{BuildError, Result};

static BEGIN_IF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<if [^>]*?expr=("(?P<expr1>[^">]*)"|'(?P<expr2>[^'>]*)')[^>]*?>"#)
        .expect("static regex")
});

const END_IF: &str = "</if>";

#[derive(Debug, Clone, Copy, Default)]
pub struct NativePreprocessor;

impl PlatformPreprocessor for NativePreprocessor {
    fn name(&self) -> &'static str {
        "native"
    }

    fn process(&self, job: &PreprocessJob<'_>) -> Result<()> {
        for file in job.files {
            let input = job.in_dir.join(file);
            let text = fs::read_to_string(&input).map_err(|e| BuildError::io(&input, e))?;

            let stripped = strip_conditionals(&text, job.defines).map_err(|message| {
                BuildError::Directive {
                    file: input.clone(),
                    message,
                }
            })?;

            let output = output_path(job, file);
            write_creating_parents(&output, &stripped)?;
            debug!("Preprocessed {} -> {}", input.display(), output.display());
        }
        Ok(())
    }
}

fn write_creating_parents(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    fs::write(path, text).map_err(|e| BuildError::io(path, e))
}

/// Keep the content of satisfied `<if>` blocks, drop the rest
///
/// Markers themselves are always removed; text around them (such as a
/// leading `// `) stays. Blocks nest.
pub fn strip_conditionals(text: &str, defines: &[(&str, bool)]) -> Result<String, String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    loop {
        let Some(begin) = BEGIN_IF.captures(rest) else {
            if rest.contains(END_IF) {
                return Err("unmatched </if>".to_string());
            }
            out.push_str(rest);
            return Ok(out);
        };

        let marker = begin.get_match();
        let expr = begin
            .name("expr1")
            .or_else(|| begin.name("expr2"))
            .map_or("", |m| m.as_str());

        out.push_str(&rest[..marker.start()]);

        let body_start = marker.end();
        let body_end = matching_end(rest, body_start)?;
        let body = &rest[body_start..body_end];

        let keep = evaluate(expr, defines).map_err(|e| format!("<if expr=\"{expr}\">: {e}"))?;
        if keep {
            out.push_str(&strip_conditionals(body, defines)?);
        }
        rest = &rest[body_end + END_IF.len()..];
    }
}

/// Offset of the `</if>` closing the block whose body starts at `from`
fn matching_end(text: &str, from: usize) -> Result<usize, String> {
    let mut depth = 1;
    let mut pos = from;
    loop {
        let end = text[pos..]
            .find(END_IF)
            .map(|i| pos + i)
            .ok_or_else(|| "unmatched <if>".to_string())?;
        match BEGIN_IF.find_at(text, pos) {
            Some(next) if next.start() < end => {
                depth += 1;
                pos = next.end();
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Ok(end);
                }
                pos = end + END_IF.len();
            }
        }
    }
}
