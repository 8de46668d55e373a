use crate::error::{Result, RewriteError};
use crate::table::SlugTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    pub site: SiteConfig,
    /// Lecturer roster; the built-in roster is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lecturers: Option<BTreeMap<String, String>>,
    pub relocate: RelocateConfig,
    pub logging: LoggingConfig,
}

/// Which files of the site are processed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// File extensions treated as HTML documents
    pub extensions: Vec<String>,
    /// Compute edits without writing them back
    pub dry_run: bool,
}

/// GitHub Pages relativization of root-absolute links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelocateConfig {
    pub enabled: bool,
    /// Prefix the site was served under before freezing, e.g. `/ITMOHistoryFeedback`
    pub application_root: String,
    /// First-level sections, each with its own `index.html`
    pub sections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether to log per-file statistics after a run
    pub show_stats: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["html".to_string()],
            dry_run: false,
        }
    }
}

impl Default for RelocateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            application_root: "/ITMOHistoryFeedback".to_string(),
            sections: vec!["lecturers".to_string(), "reviews".to_string()],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { show_stats: true }
    }
}

impl LinksConfig {
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load config from a specific path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RewriteError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// The effective lecturer table.
    pub fn table(&self) -> Result<SlugTable> {
        match &self.lecturers {
            Some(entries) => SlugTable::from_entries(entries.clone()),
            None => Ok(SlugTable::builtin()),
        }
    }
}
