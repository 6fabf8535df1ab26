//! Changelog entry rendering.
//!
//! Commits are turned into notes by a [`NoteBuilder`], grouped into
//! sections, and rendered in the fixed order of [`SECTIONS`]:
//!
//! ```text
//! ## v1.2.3 (2025-08-08)
//!
//! ### Features
//!
//! - Add the thing ([#12](https://github.com/o/r/pull/12))
//! ```

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use regex::Regex;
use tracing::trace;

use crate::model::Commit;
use crate::version::Version;

/// Section keys and their headings, in rendering order.
pub const SECTIONS: &[(&str, &str)] = &[
    ("feature", "Features"),
    ("fix", "Bug Fixes"),
    ("perf", "Performance Improvements"),
    ("deps", "Dependencies"),
    ("revert", "Reverts"),
    ("docs", "Documentation"),
    ("style", "Styles"),
    ("chore", "Miscellaneous Chores"),
    ("refactor", "Code Refactoring"),
    ("test", "Tests"),
    ("build", "Build System"),
    ("ci", "Continuous Integration"),
    ("other", "Other"),
];

/// Section used for accepted notes with no known section label.
pub const DEFAULT_SECTION: &str = "other";

static PULL_REQUEST_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(#(\d+)\)").expect("reference pattern is valid"));

/// One line of a changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogNote {
    /// Section key (one of [`SECTIONS`]).
    pub section: String,
    /// Note text, rendered as a bullet.
    pub text: String,
}

/// Turns a commit into a changelog note, or drops it.
pub trait NoteBuilder {
    /// Build the note for `commit`, or `None` to leave it out.
    fn build_note(
        &self,
        commit: &Commit,
        sections: &[&str],
        default_section: &str,
    ) -> Option<ChangelogNote>;
}

/// Notes from pull request merge commits.
///
/// Only commits that are their pull request's own merge commit produce a
/// note. The section is the first label naming a known section.
#[derive(Debug, Clone, Copy, Default)]
pub struct PullRequestNoteBuilder;

impl NoteBuilder for PullRequestNoteBuilder {
    fn build_note(
        &self,
        commit: &Commit,
        sections: &[&str],
        default_section: &str,
    ) -> Option<ChangelogNote> {
        let pull_request = commit.pull_request.as_ref()?;
        if pull_request.sha != pull_request.merge_commit_oid {
            return None;
        }

        let section = pull_request
            .labels
            .iter()
            .find(|label| sections.contains(&label.as_str()))
            .map_or(default_section, String::as_str);
        let subject = commit.message.lines().next().unwrap_or_default();

        Some(ChangelogNote {
            section: section.to_string(),
            text: link_pull_request_reference(subject, &pull_request.permalink),
        })
    }
}

/// Rewrite the first `(#123)` into a Markdown link to `permalink`.
fn link_pull_request_reference(text: &str, permalink: &str) -> String {
    PULL_REQUEST_REFERENCE
        .replace(text, |caps: &regex::Captures<'_>| {
            format!("([#{}]({permalink}))", &caps[1])
        })
        .into_owned()
}

/// Render the changelog entry for `version` dated `date`.
pub fn build_changelog(
    commits: &[Commit],
    notes: &dyn NoteBuilder,
    version: &Version,
    date: NaiveDate,
) -> String {
    let keys: Vec<&str> = SECTIONS.iter().map(|(key, _)| *key).collect();

    let mut by_section: HashMap<String, Vec<String>> = HashMap::new();
    for commit in commits {
        match notes.build_note(commit, &keys, DEFAULT_SECTION) {
            Some(note) => by_section.entry(note.section).or_default().push(note.text),
            None => trace!(sha = %commit.sha, "no changelog note for commit"),
        }
    }

    let mut body = format!("## v{version} ({})\n", date.format("%Y-%m-%d"));
    for (key, heading) in SECTIONS {
        let Some(section) = by_section.get(*key) else {
            continue;
        };
        let _ = write!(body, "\n### {heading}\n");
        for note in section {
            let _ = write!(body, "\n- {note}");
        }
        body.push('\n');
    }
    body
}

/// [`build_changelog`] dated with today's local calendar date.
pub fn build_changelog_today(
    commits: &[Commit],
    notes: &dyn NoteBuilder,
    version: &Version,
) -> String {
    build_changelog(commits, notes, version, Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::model::PullRequest;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, 9, 4).unwrap()
    }

    fn commit(sha: &str) -> Commit {
        Commit {
            sha: sha.to_string(),
            message: "Message".to_string(),
            is_merge_commit: false,
            pull_request: None,
        }
    }

    struct FixedNotes(fn(&Commit) -> Option<(&'static str, &'static str)>);

    impl NoteBuilder for FixedNotes {
        fn build_note(&self, commit: &Commit, _: &[&str], _: &str) -> Option<ChangelogNote> {
            (self.0)(commit).map(|(section, text)| ChangelogNote {
                section: section.to_string(),
                text: text.to_string(),
            })
        }
    }

    #[test]
    fn header_only_without_notes() {
        let notes = FixedNotes(|_| None);
        let result = build_changelog(&[commit("a")], &notes, &Version::new(1, 2, 3), date());
        assert_eq!(result, "## v1.2.3 (2000-09-04)\n");
    }

    #[test]
    fn sections_render_in_fixed_order() {
        let notes = FixedNotes(|c| match c.sha.as_str() {
            "a" => Some(("fix", "Fix broken thing")),
            "b" => Some(("feature", "Add shiny thing")),
            _ => None,
        });
        let result = build_changelog(
            &[commit("a"), commit("b")],
            &notes,
            &Version::new(1, 2, 3),
            date(),
        );
        assert_eq!(
            result,
            "## v1.2.3 (2000-09-04)\n\
             \n\
             ### Features\n\
             \n\
             - Add shiny thing\n\
             \n\
             ### Bug Fixes\n\
             \n\
             - Fix broken thing\n"
        );
    }

    #[test]
    fn notes_keep_insertion_order_within_section() {
        let notes = FixedNotes(|c| match c.sha.as_str() {
            "a" => Some(("docs", "first")),
            "b" => Some(("docs", "second")),
            _ => None,
        });
        let result = build_changelog(
            &[commit("a"), commit("b")],
            &notes,
            &Version::new(1, 0, 0),
            date(),
        );
        assert!(result.ends_with("### Documentation\n\n- first\n- second\n"));
        assert!(!result.contains("### Features"));
        assert!(!result.contains("### Bug Fixes"));
    }

    #[test]
    fn passes_all_sections_and_default() {
        struct Recording(RefCell<Vec<(Vec<String>, String)>>);
        impl NoteBuilder for Recording {
            fn build_note(&self, _: &Commit, sections: &[&str], default: &str) -> Option<ChangelogNote> {
                self.0.borrow_mut().push((
                    sections.iter().map(ToString::to_string).collect(),
                    default.to_string(),
                ));
                None
            }
        }

        let notes = Recording(RefCell::new(Vec::new()));
        build_changelog(&[commit("a")], &notes, &Version::new(1, 0, 0), date());
        let calls = notes.0.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.len(), SECTIONS.len());
        assert_eq!(calls[0].0[0], "feature");
        assert_eq!(calls[0].1, "other");
    }

    fn pull_request_commit(labels: &[&str], merged: bool) -> Commit {
        Commit {
            sha: "abc".to_string(),
            message: "Add widgets (#42)\n\nLonger description (#7)".to_string(),
            is_merge_commit: merged,
            pull_request: Some(PullRequest {
                sha: Some("abc".to_string()),
                number: 42,
                permalink: "https://github.com/o/r/pull/42".to_string(),
                merge_commit_oid: Some(if merged { "abc" } else { "def" }.to_string()),
                labels: labels.iter().map(ToString::to_string).collect(),
                ..PullRequest::default()
            }),
        }
    }

    #[test]
    fn pull_request_note_links_reference() {
        let keys: Vec<&str> = SECTIONS.iter().map(|(k, _)| *k).collect();
        let note = PullRequestNoteBuilder
            .build_note(&pull_request_commit(&["feature"], true), &keys, DEFAULT_SECTION)
            .unwrap();
        assert_eq!(note.section, "feature");
        assert_eq!(
            note.text,
            "Add widgets ([#42](https://github.com/o/r/pull/42))"
        );
    }

    #[test]
    fn pull_request_note_defaults_section() {
        let keys: Vec<&str> = SECTIONS.iter().map(|(k, _)| *k).collect();
        let note = PullRequestNoteBuilder
            .build_note(&pull_request_commit(&["enhancement"], true), &keys, DEFAULT_SECTION)
            .unwrap();
        assert_eq!(note.section, "other");
    }

    #[test]
    fn pull_request_note_requires_merge_commit() {
        let keys: Vec<&str> = SECTIONS.iter().map(|(k, _)| *k).collect();
        assert!(
            PullRequestNoteBuilder
                .build_note(&pull_request_commit(&["fix"], false), &keys, DEFAULT_SECTION)
                .is_none()
        );
        assert!(
            PullRequestNoteBuilder
                .build_note(&commit("a"), &keys, DEFAULT_SECTION)
                .is_none()
        );
    }

    #[test]
    fn only_first_reference_is_linked() {
        assert_eq!(
            link_pull_request_reference("a (#1) b (#2)", "u"),
            "a ([#1](u)) b (#2)"
        );
    }
}
