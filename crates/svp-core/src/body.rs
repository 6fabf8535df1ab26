//! The release pull request body envelope.
//!
//! A release pull request carries its changelog between two `---` lines so
//! it reads well on the forge and can be parsed back once merged.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::version::Version;

/// First line of every release pull request body.
pub const HEADER: &str = ":bowtie: I have created a release";

/// Last line of every release pull request body.
pub const FOOTER: &str =
    "This pull request was generated with [Release SVP](https://github.com/johanflint/release-svp).";

/// Line separating the header and footer from the notes.
pub const DELIMITER: &str = "---";

static RELEASE_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#{2,} v?\[?(?P<version>\d+\.\d+\.\d+[^\]\s]*)\]?")
        .expect("release heading pattern is valid")
});

/// A body split at its delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestBody {
    /// Text before the first delimiter, trimmed.
    pub header: String,
    /// Text between the delimiters.
    pub content: String,
    /// Text after the last delimiter.
    pub footer: String,
}

/// Version and notes recovered from a merged release pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseNotes {
    /// Released version.
    pub version: Version,
    /// The whole changelog entry.
    pub notes: String,
}

/// Wrap a rendered changelog entry into a pull request body.
pub fn wrap(changelog: &str) -> String {
    format!("{HEADER}\n{DELIMITER}\n\n\n{changelog}\n\n{DELIMITER}\n{FOOTER}")
}

/// Split a body into header, content and footer.
///
/// Returns `None` when there is no delimiter line. With a single delimiter
/// the content runs to the end of the body.
pub fn unwrap(body: &str) -> Option<PullRequestBody> {
    let lines: Vec<&str> = body.lines().collect();
    let first = lines.iter().position(|line| *line == DELIMITER)?;
    let last = lines.iter().rposition(|line| *line == DELIMITER)?;

    let (content, footer) = if last == first {
        (lines[first + 1..].join("\n"), String::new())
    } else {
        (lines[first + 1..last].join("\n"), lines[last + 1..].join("\n"))
    };

    Some(PullRequestBody {
        header: lines[..first].join("\n").trim().to_string(),
        content,
        footer,
    })
}

/// Recover the released version and notes from a merged pull request body.
pub fn extract_release(body: &str, pull_request_number: u64) -> Option<ReleaseNotes> {
    let Some(parsed) = unwrap(body) else {
        warn!(pull_request = pull_request_number, "unable to parse pull request body");
        return None;
    };

    let content = parsed.content.trim();
    let version = RELEASE_HEADING
        .captures(content)
        .and_then(|caps| Version::parse(&caps["version"]).ok());
    let Some(version) = version else {
        warn!(pull_request = pull_request_number, "no version found in release notes");
        return None;
    };

    Some(ReleaseNotes {
        version,
        notes: content.to_string(),
    })
}
