//! Lecturer Links Core Library
//!
//! Rewrites lecturer links of a frozen static site so that display names
//! resolve to slugged page directories. Pure logic plus a thin filesystem
//! seam used by the site runner.
//!

pub mod config;
pub mod decode;
pub mod error;
pub mod html;
pub mod model;
pub mod relocate;
pub mod rewrite;
pub mod site;
pub mod table;
pub mod vfs;

pub use config::LinksConfig;
pub use error::{DecodeError, Result, RewriteError};
pub use model::{DocumentRewrite, LinkOutcome, SiteReport};
pub use rewrite::{resolve_slug, rewrite_all_links, rewrite_href, rewrite_links, MARKER};
pub use site::SiteRewriter;
pub use table::SlugTable;
