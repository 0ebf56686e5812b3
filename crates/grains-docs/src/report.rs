use serde::{Deserialize, Serialize};

/// Overall verdict of a bundle check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleStatus {
    /// Every check passed.
    Ok,
    /// At least one check failed.
    NeedsAttention,
}

/// One named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleCheck {
    /// Stable identifier of the check.
    pub name: String,
    /// Whether the check passed.
    pub pass: bool,
    /// Short explanation when the check failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl BundleCheck {
    pub(crate) fn new(name: &str, failures: usize, what: &str) -> Self {
        Self {
            name: name.to_string(),
            pass: failures == 0,
            note: (failures > 0).then(|| format!("{failures} {what}")),
        }
    }
}

/// A README link and whether its target exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStatus {
    /// Link text.
    pub label: String,
    /// Target path with the fragment stripped.
    pub target: String,
    /// README line of the link.
    pub line: usize,
    /// Whether the target exists under the bundle root.
    pub exists: bool,
}

/// Manuals found in one directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualSeries {
    /// Directory relative to the bundle root.
    pub directory: String,
    /// Indices on disk.
    pub on_disk: Vec<u32>,
    /// Indices referenced by README links, in link order.
    pub linked: Vec<u32>,
    /// Indices below the largest one that appear nowhere.
    pub gaps: Vec<u32>,
    /// Indices linked more than once.
    pub duplicates: Vec<u32>,
}

impl ManualSeries {
    /// `true` when numbering runs from zero without gaps or duplicates.
    pub fn is_contiguous(&self) -> bool {
        self.gaps.is_empty() && self.duplicates.is_empty()
    }
}

/// Scripts named in the README against the scripts directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptReport {
    /// Script names mentioned in the README.
    pub mentioned: Vec<String>,
    /// Scripts present on disk.
    pub present: Vec<String>,
    /// Mentioned or expected scripts that are absent.
    pub missing: Vec<String>,
    /// Scripts on disk the README never mentions.
    pub unlisted: Vec<String>,
}

/// Conflicting observation about the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Conflict {
    /// Both directories of a scheme pair are in use.
    PathScheme {
        /// First directory.
        first: String,
        /// Competing directory.
        second: String,
        /// README links pointing into `first`.
        first_links: usize,
        /// README links pointing into `second`.
        second_links: usize,
        /// Whether `first` exists on disk.
        first_present: bool,
        /// Whether `second` exists on disk.
        second_present: bool,
    },
    /// A manual link label lacks the expected word.
    Label {
        /// Offending label.
        label: String,
        /// Link target.
        target: String,
        /// README line.
        line: usize,
        /// Word the label should contain.
        expected: String,
    },
}

/// Result of [`crate::check_bundle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleReport {
    /// Overall verdict.
    pub status: BundleStatus,
    /// Individual checks in a fixed order.
    pub checks: Vec<BundleCheck>,
    /// Local README links.
    pub links: Vec<LinkStatus>,
    /// Manual series per directory.
    pub manual_series: Vec<ManualSeries>,
    /// Math introductions found on disk.
    pub math_intros: Vec<String>,
    /// Script comparison.
    pub scripts: ScriptReport,
    /// Flagged conflicts. None of them are resolved.
    pub conflicts: Vec<Conflict>,
}
