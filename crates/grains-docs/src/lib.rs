#![deny(missing_docs)]
#![doc = "Integrity checks for the documentation bundle: README links, manual numbering, scripts and directory schemes."]

/// Bundle inspection.
pub mod bundle;
/// Expected bundle layout.
pub mod layout;
/// Markdown link and script scanning.
pub mod links;
/// Report types.
pub mod report;

pub use bundle::check_bundle;
pub use layout::{DocsLayout, SchemePair};
pub use links::{parse_links, script_mentions, MarkdownLink};
pub use report::{
    BundleCheck, BundleReport, BundleStatus, Conflict, LinkStatus, ManualSeries, ScriptReport,
};
