//! Attribute-level view of an HTML document.
//!
//! Finds start tags and their attribute values by byte range so that values
//! can be replaced without reserializing the document. Comments and the raw
//! text of `<script>` and `<style>` elements are skipped. Values are exposed
//! both raw and with character references decoded, the way a browser's
//! `getAttribute` sees them.

use crate::model::HrefEdit;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static START_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<([A-Za-z][A-Za-z0-9:-]*)((?:[\s/](?:"[^"]*"|'[^']*'|[^'">])*)?)>"#)
        .expect("start tag pattern")
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
        .expect("attribute pattern")
});

/// Named references decoded in attribute values. Anything else passes through.
const NAMED_REFERENCES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{00A0}'),
];

/// Longest reference we try to decode, `&` and `;` included.
const MAX_REFERENCE_LEN: usize = 12;

static OPAQUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<!--.*?-->|<script\b(?:"[^"]*"|'[^']*'|[^'">])*>(.*?)</script\s*>|<style\b(?:"[^"]*"|'[^']*'|[^'">])*>(.*?)</style\s*>"#,
    )
    .expect("opaque region pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
    Unquoted,
}

/// One attribute value inside a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeValue {
    /// Lowercased tag name.
    pub tag: String,
    /// Lowercased attribute name.
    pub name: String,
    /// Byte range of the value in the document, quotes excluded.
    pub range: Range<usize>,
    /// Value with character references decoded.
    pub value: String,
    /// Value as written in the source.
    pub raw: String,
    pub quote: Quote,
}

/// An `<a>` element with an `href`, alive only for the duration of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub range: Range<usize>,
    /// Destination with character references decoded.
    pub href: String,
    pub raw: String,
    pub quote: Quote,
}

impl From<AttributeValue> for Anchor {
    fn from(attr: AttributeValue) -> Self {
        Self {
            range: attr.range,
            href: attr.value,
            raw: attr.raw,
            quote: attr.quote,
        }
    }
}

/// Byte ranges whose content is not markup.
fn opaque_ranges(html: &str) -> Vec<Range<usize>> {
    OPAQUE
        .captures_iter(html)
        .filter_map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(0))
                .map(|m| m.range())
        })
        .collect()
}

/// Every attribute value whose (lowercased) name is in `names`, in document order.
///
/// Only the first occurrence of an attribute within a tag counts, matching how
/// browsers treat duplicates.
pub fn scan_attributes(html: &str, names: &[&str]) -> Vec<AttributeValue> {
    let opaque = opaque_ranges(html);
    let mut found = Vec::new();

    for caps in START_TAG.captures_iter(html) {
        let (Some(whole), Some(tag), Some(body)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        if opaque.iter().any(|r| r.contains(&whole.start())) {
            continue;
        }

        let tag = tag.as_str().to_ascii_lowercase();
        let mut seen: Vec<String> = Vec::new();

        for attr in ATTRIBUTE.captures_iter(body.as_str()) {
            let Some(name) = attr.get(1) else { continue };
            let name = name.as_str().to_ascii_lowercase();
            if seen.contains(&name) {
                continue;
            }
            seen.push(name.clone());

            if !names.contains(&name.as_str()) {
                continue;
            }

            let (value, quote) = if let Some(v) = attr.get(2) {
                (v, Quote::Double)
            } else if let Some(v) = attr.get(3) {
                (v, Quote::Single)
            } else if let Some(v) = attr.get(4) {
                (v, Quote::Unquoted)
            } else {
                // Bare attribute without a value
                continue;
            };

            let offset = body.start();
            found.push(AttributeValue {
                tag: tag.clone(),
                name,
                range: offset + value.start()..offset + value.end(),
                value: decode_character_references(value.as_str()),
                raw: value.as_str().to_string(),
                quote,
            });
        }
    }

    found
}

/// All `<a href=...>` anchors of the document.
pub fn scan_anchors(html: &str) -> Vec<Anchor> {
    scan_attributes(html, &["href"])
        .into_iter()
        .filter(|attr| attr.tag == "a")
        .map(Anchor::from)
        .collect()
}

/// Decode semicolon-terminated character references: numeric ones and the
/// common named ones. Unknown or malformed references are left as written.
///
/// ```
/// use lecturer_links_core::html::decode_character_references;
///
/// assert_eq!(decode_character_references("/lecturers/O&#39;Brien"), "/lecturers/O'Brien");
/// assert_eq!(decode_character_references("a&amp;b&unknown;"), "a&b&unknown;");
/// ```
pub fn decode_character_references(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match parse_reference(tail) {
            Some((ch, len)) => {
                out.push(ch);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Character and byte length of the reference at the start of `tail`.
fn parse_reference(tail: &str) -> Option<(char, usize)> {
    let semicolon = tail
        .bytes()
        .take(MAX_REFERENCE_LEN)
        .position(|b| b == b';')?;
    let body = &tail[1..semicolon];

    let ch = if let Some(number) = body.strip_prefix('#') {
        let code = match number.strip_prefix(|c| c == 'x' || c == 'X') {
            Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
                u32::from_str_radix(hex, 16).ok()?
            }
            None if !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) => {
                number.parse::<u32>().ok()?
            }
            _ => return None,
        };
        char::from_u32(code)?
    } else {
        NAMED_REFERENCES
            .iter()
            .find(|(name, _)| *name == body)
            .map(|(_, ch)| *ch)?
    };

    Some((ch, semicolon + 1))
}

/// Escape a value for placement inside an attribute written with `quote`.
pub fn escape_attribute(value: &str, quote: Quote) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match (c, quote) {
            ('&', _) => out.push_str("&amp;"),
            ('"', Quote::Double | Quote::Unquoted) => out.push_str("&quot;"),
            ('\'', Quote::Single | Quote::Unquoted) => out.push_str("&#39;"),
            ('<', Quote::Unquoted) => out.push_str("&lt;"),
            ('>', Quote::Unquoted) => out.push_str("&gt;"),
            ('=', Quote::Unquoted) => out.push_str("&#61;"),
            ('`', Quote::Unquoted) => out.push_str("&#96;"),
            (c, Quote::Unquoted) if c.is_ascii_whitespace() => {
                out.push_str(&format!("&#{};", c as u32))
            }
            (c, _) => out.push(c),
        }
    }
    out
}

/// Apply non-overlapping edits to the document. Edits may be given in any order;
/// an edit overlapping an earlier one is dropped.
pub fn apply_edits(html: &str, edits: &[HrefEdit]) -> String {
    let mut ordered: Vec<&HrefEdit> = edits.iter().collect();
    ordered.sort_by_key(|edit| edit.start);

    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;
    for edit in ordered {
        if edit.start < cursor || edit.end > html.len() {
            log::warn!(
                "dropping overlapping edit at {}..{} ({:?})",
                edit.start,
                edit.end,
                edit.new_text
            );
            continue;
        }
        out.push_str(&html[cursor..edit.start]);
        out.push_str(&edit.new_text);
        cursor = edit.end;
    }
    out.push_str(&html[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EditKind;

    #[test]
    fn test_scan_anchor_quote_styles() {
        let html = r#"<p><a href="/a">A</a> <A HREF='/b'>B</A> <a class=x href=/c>C</a></p>"#;
        let anchors = scan_anchors(html);

        assert_eq!(anchors.len(), 3);
        assert_eq!(anchors[0].href, "/a");
        assert_eq!(anchors[0].quote, Quote::Double);
        assert_eq!(anchors[1].href, "/b");
        assert_eq!(anchors[1].quote, Quote::Single);
        assert_eq!(anchors[2].href, "/c");
        assert_eq!(anchors[2].quote, Quote::Unquoted);

        for anchor in &anchors {
            assert_eq!(&html[anchor.range.clone()], anchor.raw);
        }
    }

    #[test]
    fn test_scan_skips_non_anchors_and_opaque_regions() {
        let html = concat!(
            r#"<link href="/static/style.css">"#,
            r#"<abbr href="/x">x</abbr>"#,
            r#"<!-- <a href="/commented">c</a> -->"#,
            r#"<script src="/static/app.js">var s = '<a href="/in-script">';</script>"#,
            r#"<a name="top">no href</a>"#,
            r#"<a title="1 > 0" href="/kept">k</a>"#,
        );
        let anchors = scan_anchors(html);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].href, "/kept");

        let attrs = scan_attributes(html, &["href", "src"]);
        let values: Vec<&str> = attrs.iter().map(|a| a.value.as_str()).collect();
        assert_eq!(
            values,
            vec!["/static/style.css", "/x", "/static/app.js", "/kept"]
        );
    }

    #[test]
    fn test_duplicate_attribute_first_wins() {
        let anchors = scan_anchors(r#"<a href="/first" href="/second">x</a>"#);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].href, "/first");
    }

    #[test]
    fn test_scan_multibyte_offsets() {
        let html = "<p>Лектор: <a href=\"/lecturers/Иванов\">Иванов</a></p>";
        let anchors = scan_anchors(html);
        assert_eq!(anchors.len(), 1);
        assert_eq!(&html[anchors[0].range.clone()], "/lecturers/Иванов");
    }

    #[test]
    fn test_escape_attribute() {
        assert_eq!(escape_attribute("a&b\"c'", Quote::Double), "a&amp;b&quot;c'");
        assert_eq!(escape_attribute("a&b\"c'", Quote::Single), "a&amp;b\"c&#39;");
        assert_eq!(escape_attribute("a b>", Quote::Unquoted), "a&#32;b&gt;");
        assert_eq!(
            escape_attribute("lecturers/Иванов_Иван/", Quote::Double),
            "lecturers/Иванов_Иван/"
        );
    }

    #[test]
    fn test_anchor_href_decodes_references() {
        let html = r#"<a href="/lecturers/O&#39;Brien?a=1&amp;b=2">O</a>"#;
        let anchors = scan_anchors(html);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].href, "/lecturers/O'Brien?a=1&b=2");
        assert_eq!(anchors[0].raw, "/lecturers/O&#39;Brien?a=1&amp;b=2");
        assert_eq!(&html[anchors[0].range.clone()], anchors[0].raw);
    }

    #[test]
    fn test_decode_character_references() {
        assert_eq!(decode_character_references("plain"), "plain");
        assert_eq!(decode_character_references("&lt;&gt;&quot;&apos;"), "<>\"'");
        assert_eq!(decode_character_references("&#x41;&#X42;&#67;"), "ABC");
        assert_eq!(decode_character_references("&#1048;"), "И");
        // Malformed or unknown references stay as written
        assert_eq!(decode_character_references("a & b"), "a & b");
        assert_eq!(decode_character_references("&amp"), "&amp");
        assert_eq!(decode_character_references("&#xZZ;"), "&#xZZ;");
        assert_eq!(decode_character_references("&#+5;"), "&#+5;");
        assert_eq!(decode_character_references("&#xD800;"), "&#xD800;");
        assert_eq!(decode_character_references("&copy;"), "&copy;");
    }

    #[test]
    fn test_apply_edits_out_of_order() {
        let html = "0123456789";
        let edits = vec![
            HrefEdit {
                start: 6,
                end: 8,
                old_text: "67".to_string(),
                new_text: "xx".to_string(),
                kind: EditKind::Relocation,
            },
            HrefEdit {
                start: 1,
                end: 3,
                old_text: "12".to_string(),
                new_text: "ABCD".to_string(),
                kind: EditKind::LecturerLink,
            },
            HrefEdit {
                start: 2,
                end: 4,
                old_text: "23".to_string(),
                new_text: "overlap".to_string(),
                kind: EditKind::LecturerLink,
            },
        ];
        assert_eq!(apply_edits(html, &edits), "0ABCD345xx89");
    }
}
