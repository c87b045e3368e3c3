//! Canonical file manifests for the tab strip build
//!
//! Every file the pipeline touches is named here. When upstream adds or
//! renames a file, update ONLY these tables.

/// A gzip tarball of one upstream directory, unpacked into a staging dir
#[derive(Debug, Clone, Copy)]
pub struct ArchiveSpec {
    /// Repository path of the directory (without `.tar.gz`)
    pub repo_path: &'static str,
}

/// The tab strip WebUI sources, unpacked into `in/`
pub const TAB_STRIP_ARCHIVE: ArchiveSpec = ArchiveSpec {
    repo_path: "chrome/browser/resources/tab_strip",
};

/// The grit tool tree, unpacked into `grit/` (hosts `preprocess_if_expr.py`)
pub const GRIT_ARCHIVE: ArchiveSpec = ArchiveSpec {
    repo_path: "tools/grit",
};

/// Single tagged file downloaded into `in/` before preprocessing
pub const UTIL_SOURCE: &str = "ui/webui/resources/js/util.ts";

/// Files passed through the platform preprocessor (`in/` → `in2/`)
pub const PREPROCESSED_FILES: &[&str] = &["drag_manager.ts", "tab_list.html", "util.ts"];

/// Platform defines handed to the preprocessor
pub const PLATFORM_DEFINES: &[(&str, bool)] = &[
    ("linux", true),
    ("chromeos_ash", false),
    ("macosx", false),
];

/// HTML fragments wrapped into `<name>.ts` template modules
pub const HTML_TEMPLATES: &[&str] = &[
    "alert_indicator.html",
    "alert_indicators.html",
    "tab_group.html",
    "tab_list.html",
    "tab.html",
];

/// Files copied from `in2/` to `out/` unchanged
pub const VERBATIM_FILES: &[&str] = &[
    "alert_indicator.ts",
    "alert_indicators.ts",
    "tab_group.ts",
    "tab_list.ts",
    "tab.ts",
    "drag_manager.ts",
    "tab_swiper.ts",
    "tab_strip.html",
    "util.ts",
];

/// Subdirectory of `in/` copied as a whole into `out/`
pub const VERBATIM_DIR: &str = "alert_indicators";

/// Hand-maintained sources copied from the sibling `src/` directory
pub const SIBLING_SOURCES: &[&str] = &[
    "icon.ts",
    "tab_strip.mojom-webui.ts",
    "tabs.mojom-webui.ts",
    "tabs_api_proxy.ts",
];

/// Shared WebUI module downloaded straight into `out/`
#[derive(Debug, Clone, Copy)]
pub struct SharedModule {
    pub repo_path: &'static str,
    /// Prepend [`NOCHECK_MARKER`] so the downstream compiler skips it
    pub needs_nocheck: bool,
}

pub const NOCHECK_MARKER: &str = "// @ts-nocheck\n";

pub const SHARED_MODULES: &[SharedModule] = &[
    SharedModule {
        repo_path: "ui/webui/resources/js/assert.ts",
        needs_nocheck: false,
    },
    SharedModule {
        repo_path: "ui/webui/resources/js/custom_element.ts",
        needs_nocheck: true,
    },
    SharedModule {
        repo_path: "ui/webui/resources/js/event_tracker.ts",
        needs_nocheck: false,
    },
    SharedModule {
        repo_path: "ui/webui/resources/js/focus_outline_manager.ts",
        needs_nocheck: false,
    },
    SharedModule {
        repo_path: "ui/webui/resources/js/load_time_data.ts",
        needs_nocheck: false,
    },
    SharedModule {
        repo_path: "ui/webui/resources/js/static_types.ts",
        needs_nocheck: true,
    },
];

/// Image inlined into the generated module as a `data:` URI
#[derive(Debug, Clone, Copy)]
pub struct ImageAsset {
    /// File name inside the asset directory
    pub file_name: &'static str,
    /// Reference URL replaced in the target module
    pub reference: &'static str,
    pub mime: &'static str,
}

pub const IMAGE_ASSETS: &[ImageAsset] = &[
    ImageAsset {
        file_name: "IDR_CRASH_SAD_FAVICON@2x.png",
        reference: "chrome://theme/IDR_CRASH_SAD_FAVICON@2x",
        mime: "image/png",
    },
    ImageAsset {
        file_name: "icon_clear.svg",
        reference: "chrome://resources/images/icon_clear.svg",
        mime: "image/svg+xml",
    },
];

/// Generated module that receives the inlined images
pub const IMAGE_TARGET: &str = "tab.html.ts";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocessed_files_are_staged_before_copy() {
        // every preprocessed file must end up in out/ either wrapped or verbatim
        for file in PREPROCESSED_FILES {
            assert!(
                VERBATIM_FILES.contains(file) || HTML_TEMPLATES.contains(file),
                "{file} is preprocessed but never copied"
            );
        }
    }

    #[test]
    fn image_target_is_a_wrapped_template() {
        let source = IMAGE_TARGET.trim_end_matches(".ts");
        assert!(HTML_TEMPLATES.contains(&source));
    }

    #[test]
    fn nocheck_only_on_two_modules() {
        let flagged: Vec<_> = SHARED_MODULES
            .iter()
            .filter(|m| m.needs_nocheck)
            .map(|m| m.repo_path)
            .collect();
        assert_eq!(
            flagged,
            [
                "ui/webui/resources/js/custom_element.ts",
                "ui/webui/resources/js/static_types.ts"
            ]
        );
    }
}
