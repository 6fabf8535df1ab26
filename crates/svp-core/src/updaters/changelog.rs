//! Splice a new entry into `CHANGELOG.md`.

use std::sync::LazyLock;

use regex::Regex;

use crate::update::{UpdateError, Updater};

/// Top-level heading of a generated changelog.
pub const HEADER: &str = "# Changelog\n";

static VERSION_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n###? v?[0-9\[]").expect("heading pattern is valid"));

/// Inserts a rendered entry above the newest release in a changelog.
#[derive(Debug, Clone)]
pub struct ChangelogUpdater {
    entry: String,
}

impl ChangelogUpdater {
    /// Updater inserting `entry`.
    pub fn new(entry: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
        }
    }
}

impl Updater for ChangelogUpdater {
    fn update_content(&self, content: Option<&str>) -> Result<String, UpdateError> {
        Ok(update_changelog(content.unwrap_or_default(), &self.entry))
    }
}

/// Insert `entry` into `content`.
///
/// - empty content gets the header and the entry
/// - content without a recognizable version heading keeps its text below a
///   fresh header and the entry
/// - otherwise the entry goes right above the first version heading
pub fn update_changelog(content: &str, entry: &str) -> String {
    match VERSION_HEADING.find(content) {
        None if content.is_empty() => format!("{HEADER}\n{entry}"),
        None => format!("{HEADER}\n{entry}\n{content}"),
        Some(heading) => {
            let (before, after) = content.split_at(heading.start());
            let spliced = format!("{before}\n{entry}{after}");
            format!("{}\n", spliced.trim())
        }
    }
}
