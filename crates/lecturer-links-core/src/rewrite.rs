//! Lecturer link rewriting.
//!
//! Links that point at a lecturer by display name, e.g.
//! `/lecturers/Белоусов%20Александр%20Сергеевич`, are replaced with the
//! slugged directory path `lecturers/Белоусов_Александр_Сергеевич/`.

use crate::decode::decode_component;
use crate::error::{DecodeError, Result, RewriteError};
use crate::html::{self, escape_attribute};
use crate::model::{DocumentReport, DocumentRewrite, EditKind, HrefEdit, LinkOutcome};
use crate::table::SlugTable;

/// Path segment that marks a link as a lecturer link. Case-sensitive.
pub const MARKER: &str = "/lecturers/";

/// Path of the lecturer page for `name`, or `None` when the name is unknown.
pub fn resolve_slug(table: &SlugTable, name: &str) -> Option<String> {
    table.get(name).map(|slug| format!("lecturers/{slug}/"))
}

/// The raw (still encoded) name following the first marker, if the marker is present.
pub fn extract_name(href: &str) -> Option<&str> {
    href.find(MARKER).map(|pos| &href[pos + MARKER.len()..])
}

pub fn rewrite_href(
    table: &SlugTable,
    href: &str,
) -> std::result::Result<LinkOutcome, DecodeError> {
    let Some(raw_name) = extract_name(href) else {
        return Ok(LinkOutcome::NotSelected);
    };

    let name = decode_component(raw_name)?;
    Ok(match resolve_slug(table, &name) {
        Some(path) => LinkOutcome::Rewritten(path),
        None => LinkOutcome::Unresolved,
    })
}

/// Rewrite a batch of link destinations, preserving order.
///
/// Stops at the first destination that cannot be decoded.
pub fn rewrite_links<S: AsRef<str>>(table: &SlugTable, hrefs: &[S]) -> Result<Vec<LinkOutcome>> {
    hrefs
        .iter()
        .map(|href| {
            let href = href.as_ref();
            rewrite_href(table, href).map_err(|source| RewriteError::Decode {
                href: href.to_string(),
                source,
            })
        })
        .collect()
}

/// Edits that point every resolvable lecturer anchor of `html` at its slug path.
pub fn lecturer_link_edits(
    table: &SlugTable,
    html: &str,
) -> Result<(Vec<HrefEdit>, DocumentReport)> {
    let anchors = html::scan_anchors(html);
    let hrefs: Vec<&str> = anchors.iter().map(|a| a.href.as_str()).collect();
    let outcomes = rewrite_links(table, hrefs.as_slice())?;

    let mut report = DocumentReport {
        anchors: anchors.len(),
        ..Default::default()
    };
    let mut edits = Vec::new();

    for (anchor, outcome) in anchors.iter().zip(outcomes) {
        if !outcome.is_selected() {
            continue;
        }
        report.selected += 1;

        let Some(path) = outcome.new_href() else {
            report.unresolved += 1;
            log::debug!("no lecturer entry for {:?}, left as is", anchor.href);
            continue;
        };

        let new_text = escape_attribute(path, anchor.quote);
        if new_text == anchor.raw {
            continue;
        }
        log::debug!("{:?} -> {:?}", anchor.href, path);
        report.rewritten += 1;
        edits.push(HrefEdit {
            start: anchor.range.start,
            end: anchor.range.end,
            old_text: anchor.raw.clone(),
            new_text,
            kind: EditKind::LecturerLink,
        });
    }

    Ok((edits, report))
}

/// Run the lecturer link pass over one document.
///
/// On a decode failure nothing is rewritten and the error names the offending href.
pub fn rewrite_all_links(table: &SlugTable, html: &str) -> Result<DocumentRewrite> {
    let (edits, report) = lecturer_link_edits(table, html)?;
    let content = html::apply_edits(html, &edits);
    Ok(DocumentRewrite {
        content,
        edits,
        report,
    })
}
