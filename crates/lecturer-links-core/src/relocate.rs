//! Root-absolute links rewritten relative to the page, so a frozen site works
//! from a GitHub Pages project subdirectory.

use crate::config::RelocateConfig;
use crate::decode::decode_component;
use crate::html::{self, escape_attribute};
use crate::model::{EditKind, HrefEdit};
use crate::rewrite::MARKER;
use crate::table::SlugTable;
use std::path::{Component, Path};

const STATIC_PREFIX: &str = "/static/";
const LECTURERS_DIR: &str = "lecturers";

/// Number of directories between the site root and a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDepth(pub usize);

impl PageDepth {
    pub const ROOT: PageDepth = PageDepth(0);

    /// Depth of a page given its path relative to the site root.
    ///
    /// ```
    /// use lecturer_links_core::relocate::PageDepth;
    /// use std::path::Path;
    ///
    /// assert_eq!(PageDepth::from_relative_path(Path::new("index.html")), PageDepth(0));
    /// assert_eq!(PageDepth::from_relative_path(Path::new("reviews/index.html")), PageDepth(1));
    /// assert_eq!(PageDepth::from_relative_path(Path::new("lecturers/A_B/index.html")), PageDepth(2));
    /// ```
    pub fn from_relative_path(path: &Path) -> Self {
        PageLocation::from_relative_path(path).depth()
    }

    /// Prefix that leads from the page back to the site root.
    pub fn base(&self) -> String {
        if self.0 == 0 {
            "./".to_string()
        } else {
            "../".repeat(self.0)
        }
    }
}

/// Directory of a page, as components below the site root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLocation {
    dirs: Vec<String>,
}

impl PageLocation {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_relative_path(path: &Path) -> Self {
        let dirs = path
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(dir) => Some(dir.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { dirs }
    }

    pub fn depth(&self) -> PageDepth {
        PageDepth(self.dirs.len())
    }

    /// Relative link from this page to the site directory `target`.
    ///
    /// ```
    /// use lecturer_links_core::relocate::PageLocation;
    /// use std::path::Path;
    ///
    /// let page = PageLocation::from_relative_path(Path::new("lecturers/index.html"));
    /// assert_eq!(page.link_to_dir(&["lecturers", "A_B"]), "A_B/");
    /// assert_eq!(page.link_to_dir(&["reviews"]), "../reviews/");
    /// assert_eq!(page.link_to_dir(&["lecturers"]), "./");
    /// ```
    pub fn link_to_dir(&self, target: &[&str]) -> String {
        let common = self
            .dirs
            .iter()
            .zip(target)
            .take_while(|(dir, segment)| dir.as_str() == **segment)
            .count();

        let mut link = "../".repeat(self.dirs.len() - common);
        for segment in &target[common..] {
            link.push_str(segment);
            link.push('/');
        }
        if link.is_empty() {
            link.push_str("./");
        }
        link
    }
}

/// Relative replacement for a root-absolute `value`, if one applies.
///
/// `value` is the attribute value with character references already decoded.
pub fn relocate_value(
    attribute: &str,
    value: &str,
    page: &PageLocation,
    config: &RelocateConfig,
    table: &SlugTable,
) -> Option<String> {
    let path = strip_application_root(value, &config.application_root)?;
    let depth = page.depth();
    let base = depth.base();

    if let Some(rest) = path.strip_prefix(STATIC_PREFIX) {
        return Some(format!("{base}static/{rest}"));
    }

    if attribute != "href" {
        return None;
    }

    if path == "/" {
        return Some(if depth == PageDepth::ROOT {
            "index.html".to_string()
        } else {
            base
        });
    }

    if let Some(target) = lecturer_target(path, page, table) {
        return Some(target);
    }

    let section = path.trim_start_matches('/').trim_end_matches('/');
    if config.sections.iter().any(|s| s == section) {
        return Some(format!("{base}{section}/"));
    }

    None
}

/// Page-relative link to the lecturer named by a root path like `/lecturers/<name>`.
///
/// Undecodable names are left for the lecturer link pass to report.
fn lecturer_target(path: &str, page: &PageLocation, table: &SlugTable) -> Option<String> {
    let raw_name = path.strip_prefix(MARKER)?;
    let name = decode_component(raw_name).ok()?;
    let slug = table.get(&name)?;
    Some(page.link_to_dir(&[LECTURERS_DIR, slug]))
}

/// Root-relative path of `value` with the application root removed.
/// `None` for anything that is not root-absolute.
fn strip_application_root<'a>(value: &'a str, application_root: &str) -> Option<&'a str> {
    if !value.starts_with('/') || value.starts_with("//") {
        return None;
    }

    let root = application_root.trim_end_matches('/');
    if !root.is_empty() {
        if let Some(rest) = value.strip_prefix(root) {
            if rest.is_empty() {
                return Some("/");
            }
            if rest.starts_with('/') {
                return Some(rest);
            }
        }
    }
    Some(value)
}

/// Edits that relativize every `href` and `src` of the document.
pub fn relocate_links(
    html: &str,
    page: &PageLocation,
    config: &RelocateConfig,
    table: &SlugTable,
) -> Vec<HrefEdit> {
    html::scan_attributes(html, &["href", "src"])
        .into_iter()
        .filter_map(|attr| {
            let target = relocate_value(&attr.name, &attr.value, page, config, table)?;
            let new_text = escape_attribute(&target, attr.quote);
            if new_text == attr.raw {
                return None;
            }
            Some(HrefEdit {
                start: attr.range.start,
                end: attr.range.end,
                old_text: attr.raw,
                new_text,
                kind: EditKind::Relocation,
            })
        })
        .collect()
}
