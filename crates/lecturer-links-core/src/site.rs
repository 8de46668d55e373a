use crate::config::LinksConfig;
use crate::error::{Result, RewriteError};
use crate::html;
use crate::model::{DocumentRewrite, FileFailure, FileReport, HrefEdit, SiteReport};
use crate::relocate::{relocate_links, PageLocation};
use crate::rewrite::lecturer_link_edits;
use crate::table::SlugTable;
use crate::vfs::FileSystem;
use std::path::Path;
use std::sync::Arc;

/// Applies the link passes to every document of a frozen site.
///
/// Each document is read once, rewritten in memory, and written back only
/// when its content changed.
pub struct SiteRewriter {
    table: SlugTable,
    config: LinksConfig,
    fs: Arc<dyn FileSystem>,
}

impl SiteRewriter {
    pub fn new(table: SlugTable, config: LinksConfig, fs: Arc<dyn FileSystem>) -> Self {
        Self { table, config, fs }
    }

    /// Use the lecturer table declared by `config`.
    pub fn from_config(config: LinksConfig, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let table = config.table()?;
        Ok(Self::new(table, config, fs))
    }

    pub fn table(&self) -> &SlugTable {
        &self.table
    }

    pub fn config(&self) -> &LinksConfig {
        &self.config
    }

    /// Relocation (when enabled) and the lecturer link pass over one document.
    ///
    /// Both passes plan their edits against `source`; where they target the
    /// same value, relocation wins since it knows the page's depth. Every
    /// returned edit addresses `source`.
    pub fn rewrite_document(&self, relative: &Path, source: &str) -> Result<DocumentRewrite> {
        let relocation = if self.config.relocate.enabled {
            let page = PageLocation::from_relative_path(relative);
            relocate_links(source, &page, &self.config.relocate, &self.table)
        } else {
            Vec::new()
        };

        let (lecturer, mut report) = lecturer_link_edits(&self.table, source)?;
        let mut edits: Vec<HrefEdit> = lecturer
            .into_iter()
            .filter(|edit| {
                !relocation
                    .iter()
                    .any(|r| r.start < edit.end && edit.start < r.end)
            })
            .collect();

        report.rewritten = edits.len();
        report.relocated = relocation.len();
        edits.extend(relocation);
        edits.sort_by_key(|edit| edit.start);

        let content = html::apply_edits(source, &edits);
        Ok(DocumentRewrite {
            content,
            edits,
            report,
        })
    }

    /// Process one file under `root`.
    pub fn process_file(&self, root: &Path, path: &Path) -> Result<FileReport> {
        let source = self
            .fs
            .read_to_string(path)
            .map_err(|e| RewriteError::io(path, e))?;
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rewrite = self.rewrite_document(relative, &source)?;

        let changed = rewrite.content != source;
        let written = changed && !self.config.site.dry_run;
        if written {
            self.fs
                .write(path, &rewrite.content)
                .map_err(|e| RewriteError::io(path, e))?;
        }

        if self.config.logging.show_stats {
            log::info!(
                "{}: {} anchors, {} lecturer links rewritten, {} unresolved, {} relocated{}",
                relative.display(),
                rewrite.report.anchors,
                rewrite.report.rewritten,
                rewrite.report.unresolved,
                rewrite.report.relocated,
                if changed && !written { " (dry run)" } else { "" }
            );
        }

        Ok(FileReport {
            path: relative.to_path_buf(),
            report: rewrite.report,
            edits: rewrite.edits,
            written,
        })
    }

    /// Rewrite every document under `root`. A failing file is recorded and
    /// left untouched; the remaining files are still processed.
    pub fn run(&self, root: &Path) -> SiteReport {
        let mut files = Vec::new();
        for ext in &self.config.site.extensions {
            files.extend(self.fs.list_files(root, ext));
        }
        files.sort();
        files.dedup();

        let mut report = SiteReport {
            dry_run: self.config.site.dry_run,
            ..Default::default()
        };

        for path in &files {
            match self.process_file(root, path) {
                Ok(file) => {
                    report.totals.absorb(&file.report);
                    report.files.push(file);
                }
                Err(err) => {
                    log::warn!("{}: {}", path.display(), err);
                    report.failures.push(FileFailure {
                        path: path.strip_prefix(root).unwrap_or(path).to_path_buf(),
                        message: err.to_string(),
                    });
                }
            }
        }

        log::info!(
            "Processed {} files: {} changed, {} failed",
            files.len(),
            report.files_changed(),
            report.failures.len()
        );

        report
    }
}
