//! Semantic version values.
//!
//! [`Version`] is an immutable `MAJOR.MINOR.PATCH[-pre][+build]` value.
//! Parsing and rendering round-trip exactly; bumping always produces a new
//! value. Versions carry no ordering: the engine only ever needs equality,
//! parsing and increments.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::versioning::BumpLevel;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<major>\d+)\.(?P<minor>\d+)\.(?P<patch>\d+)(?:-(?P<pre>[^+]+))?(?:\+(?P<build>.+))?$")
        .expect("version pattern is valid")
});

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?(?P<version>\d+\.\d+\.\d+.*)$").expect("tag pattern is valid")
});

/// Errors from version operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The text is not a `MAJOR.MINOR.PATCH[-pre][+build]` version.
    #[error("unable to parse version string: {0}")]
    Parse(String),

    /// Bumping would overflow a numeric component.
    #[error("cannot bump {component} of {version}: component overflows")]
    Overflow {
        /// The version being bumped.
        version: String,
        /// `major`, `minor` or `patch`.
        component: &'static str,
    },
}

/// Result alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// A semantic version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    /// Major component.
    pub major: u64,
    /// Minor component.
    pub minor: u64,
    /// Patch component.
    pub patch: u64,
    /// Pre-release identifier (without the leading `-`).
    pub pre_release: Option<String>,
    /// Build metadata (without the leading `+`).
    pub build: Option<String>,
}

impl Version {
    /// The "no prior release" sentinel, `0.0.0`.
    pub const UNRELEASED: Self = Self::new(0, 0, 0);

    /// Create a plain `MAJOR.MINOR.PATCH` version.
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre_release: None,
            build: None,
        }
    }

    /// Parse a version string.
    ///
    /// The patch component is mandatory: `"1.2"` is rejected.
    pub fn parse(text: &str) -> VersionResult<Self> {
        let caps = VERSION_PATTERN
            .captures(text)
            .ok_or_else(|| VersionError::Parse(text.to_string()))?;

        let number = |name: &str| {
            caps[name]
                .parse::<u64>()
                .map_err(|_| VersionError::Parse(text.to_string()))
        };

        Ok(Self {
            major: number("major")?,
            minor: number("minor")?,
            patch: number("patch")?,
            pre_release: caps.name("pre").map(|m| m.as_str().to_string()),
            build: caps.name("build").map(|m| m.as_str().to_string()),
        })
    }

    /// Whether this is the [`Version::UNRELEASED`] sentinel.
    pub fn is_unreleased(&self) -> bool {
        *self == Self::UNRELEASED
    }

    /// Produce the next version for a bump level.
    ///
    /// Pre-release and build metadata are carried over unchanged. Fails with
    /// [`VersionError::Overflow`] when the bumped component is `u64::MAX`.
    pub fn bump(&self, level: BumpLevel) -> VersionResult<Self> {
        let increment = |value: u64, component: &'static str| {
            value.checked_add(1).ok_or_else(|| VersionError::Overflow {
                version: self.to_string(),
                component,
            })
        };
        let (major, minor, patch) = match level {
            BumpLevel::Major => (increment(self.major, "major")?, 0, 0),
            BumpLevel::Minor => (self.major, increment(self.minor, "minor")?, 0),
            BumpLevel::Patch => (self.major, self.minor, increment(self.patch, "patch")?),
        };
        Ok(Self {
            major,
            minor,
            patch,
            pre_release: self.pre_release.clone(),
            build: self.build.clone(),
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref pre) = self.pre_release {
            write!(f, "-{pre}")?;
        }
        if let Some(ref build) = self.build {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Parse a version out of a tag name such as `v1.2.3` or `1.2.3`.
///
/// Returns `None` for tags that are not version tags.
pub fn parse_version_tag(name: &str) -> Option<Version> {
    let caps = TAG_PATTERN.captures(name)?;
    Version::parse(&caps["version"]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain() {
        assert_eq!(Version::parse("1.2.3").unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn parse_pre_release_and_build() {
        let v = Version::parse("1.2.3-rc.1+build.5").unwrap();
        assert_eq!(v.pre_release.as_deref(), Some("rc.1"));
        assert_eq!(v.build.as_deref(), Some("build.5"));
    }

    #[test]
    fn pre_release_runs_until_plus() {
        let v = Version::parse("1.0.0-alpha-beta+exp.sha.5114f85").unwrap();
        assert_eq!(v.pre_release.as_deref(), Some("alpha-beta"));
        assert_eq!(v.build.as_deref(), Some("exp.sha.5114f85"));
    }

    #[test]
    fn build_without_pre_release() {
        let v = Version::parse("2.0.0+20240101").unwrap();
        assert!(v.pre_release.is_none());
        assert_eq!(v.build.as_deref(), Some("20240101"));
    }

    #[test]
    fn patch_is_mandatory() {
        assert_eq!(
            Version::parse("1.2"),
            Err(VersionError::Parse("1.2".to_string()))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(Version::parse("not-a-version").is_err());
        assert!(Version::parse("").is_err());
        assert!(Version::parse("v1.2.3").is_err());
    }

    #[test]
    fn rejects_overflowing_components() {
        assert!(Version::parse("99999999999999999999.0.0").is_err());
    }

    #[test]
    fn display_round_trips() {
        for text in [
            "0.0.0",
            "1.2.3",
            "10.20.30",
            "1.0.0-rc.1",
            "1.0.0+build",
            "1.0.0-x.7.z.92+meta-data",
        ] {
            assert_eq!(Version::parse(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn bump_major_resets_minor_and_patch() {
        let v = Version::parse("1.2.3-rc.1+b").unwrap();
        let next = v.bump(BumpLevel::Major).unwrap();
        assert_eq!((next.major, next.minor, next.patch), (2, 0, 0));
        assert_eq!(next.pre_release.as_deref(), Some("rc.1"));
        assert_eq!(next.build.as_deref(), Some("b"));
    }

    #[test]
    fn bump_minor_resets_patch() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(BumpLevel::Minor), Ok(Version::new(1, 3, 0)));
    }

    #[test]
    fn bump_patch() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(BumpLevel::Patch), Ok(Version::new(1, 2, 4)));
    }

    #[test]
    fn bump_does_not_mutate() {
        let v = Version::new(1, 2, 3);
        let _ = v.bump(BumpLevel::Major);
        assert_eq!(v, Version::new(1, 2, 3));
    }

    #[test]
    fn bump_from_unreleased() {
        assert_eq!(
            Version::UNRELEASED.bump(BumpLevel::Patch),
            Ok(Version::new(0, 0, 1))
        );
        assert!(Version::UNRELEASED.is_unreleased());
    }

    #[test]
    fn bump_past_u64_max_is_an_error() {
        let v = parse_version_tag("v18446744073709551615.0.0").unwrap();
        assert_eq!(
            v.bump(BumpLevel::Major),
            Err(VersionError::Overflow {
                version: "18446744073709551615.0.0".into(),
                component: "major",
            })
        );
        assert_eq!(v.bump(BumpLevel::Minor), Ok(Version::new(u64::MAX, 1, 0)));

        let patch = Version::new(1, 0, u64::MAX);
        assert!(matches!(
            patch.bump(BumpLevel::Patch),
            Err(VersionError::Overflow { component: "patch", .. })
        ));
    }

    #[test]
    fn tag_with_and_without_prefix() {
        assert_eq!(parse_version_tag("v1.2.3"), Some(Version::new(1, 2, 3)));
        assert_eq!(parse_version_tag("1.2.3"), Some(Version::new(1, 2, 3)));
    }

    #[test]
    fn non_version_tags_are_skipped() {
        assert_eq!(parse_version_tag("latest"), None);
        assert_eq!(parse_version_tag("v1.2"), None);
        assert_eq!(parse_version_tag("release-1.2.3"), None);
    }

    #[test]
    fn serde_as_string() {
        let v = Version::parse("1.2.3-beta").unwrap();
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"1.2.3-beta\"");
        let parsed: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, v);
    }
}
