//! Resource-path rewriting for generated TypeScript modules

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{BuildError, Result};

/// Absolute resource roots, longest spelling first so it wins
const RESOURCE_ROOTS: &[&str] = &["chrome://resources/js/", "//resources/js/"];

/// Only this module registers the color change updater
const COLOR_UPDATER_FILE: &str = "tab_list.ts";

static STRINGS_LOADER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^.*\./strings\.m\.js.*(?:\n|\z)").expect("static regex"));

static COLOR_UPDATER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^.*ColorChangeUpdater.*(?:\n|\z)").expect("static regex"));

/// Apply the rewrite rules to `text`; `file_name` selects file-specific rules
pub fn rewrite_source(file_name: &str, text: &str) -> String {
    let mut out = text.to_string();
    for root in RESOURCE_ROOTS {
        out = out.replace(root, "./");
    }

    out = STRINGS_LOADER_LINE.replace_all(&out, "").into_owned();

    if file_name.ends_with(COLOR_UPDATER_FILE) {
        out = COLOR_UPDATER_LINE.replace_all(&out, "").into_owned();
    }
    out
}

/// Rewrite a module in place
pub fn rewrite_file(path: &Path) -> Result<()> {
    let text = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    let rewritten = rewrite_source(&name, &text);
    fs::write(path, rewritten).map_err(|e| BuildError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_roots_become_relative() {
        let src = "import {assert} from 'chrome://resources/js/assert.js';\n\
                   import {EventTracker} from '//resources/js/event_tracker.js';\n\
                   import {x} from 'chrome://resources/js/a.js'; import {y} from '//resources/js/b.js';\n";
        let out = rewrite_source("tab.ts", src);

        assert!(!out.contains("chrome://resources/js/"));
        assert!(!out.contains("//resources/js/"));
        assert_eq!(out.matches("'./").count(), 4);
        assert!(out.contains("import {assert} from './assert.js';"));
    }

    #[test]
    fn strings_loader_lines_are_dropped_and_nothing_else() {
        let src = "line one\n\
                   import 'chrome://resources/js/strings.m.js';\n\
                   line three\n\
                   import './strings.m.js';\n\
                   line five\n";
        let out = rewrite_source("tab.ts", src);

        assert_eq!(out, "line one\nline three\nline five\n");
        assert_eq!(out.lines().count(), src.lines().count() - 2);
    }

    #[test]
    fn last_line_without_newline_is_dropped() {
        let out = rewrite_source("a.ts", "keep\nimport './strings.m.js';");
        assert_eq!(out, "keep\n");
    }

    #[test]
    fn color_updater_only_stripped_in_tab_list() {
        let src = "import {ColorChangeUpdater} from './color_change_listener.js';\n\
                   ColorChangeUpdater.forDocument().start();\n\
                   export class TabListElement {}\n";

        assert_eq!(rewrite_source("out/tab_list.ts", src), "export class TabListElement {}\n");
        assert_eq!(rewrite_source("tab.ts", src), src);
    }

    #[test]
    fn untouched_text_is_identical() {
        let src = "export const a = 1;\r\nconst b = `x`;\n";
        assert_eq!(rewrite_source("tab.ts", src), src);
    }

    #[test]
    fn rewrites_file_in_place() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tab_list.ts");
        fs::write(
            &path,
            "import {a} from '//resources/js/a.js';\nColorChangeUpdater.x();\n",
        )
        .unwrap();

        rewrite_file(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "import {a} from './a.js';\n");
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = rewrite_file(&tmp.path().join("nope.ts")).unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }
}
