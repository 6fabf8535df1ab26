//! `Cargo.toml` and `Cargo.lock` version rewrites.
//!
//! Both files are edited with `toml_edit`, so comments, ordering and
//! formatting survive. Every edit is a pure `content -> content` step built
//! on [`edit_toml`].

use std::collections::BTreeMap;
use std::fmt;

use toml_edit::{DocumentMut, Item, Value};
use tracing::{debug, warn};

use crate::update::{UpdateError, Updater};
use crate::version::Version;

/// One step of a structural path into a TOML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TomlKey<'a> {
    /// A table key.
    Key(&'a str),
    /// A position in an array or array of tables.
    Index(usize),
}

impl fmt::Display for TomlKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

fn render_path(path: &[TomlKey<'_>]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

fn parse_document(content: &str) -> Result<DocumentMut, UpdateError> {
    content
        .parse::<DocumentMut>()
        .map_err(|e| UpdateError::Toml(e.to_string()))
}

/// Replace the value at `path` with the string `value`.
///
/// The value must already exist; its surrounding whitespace and comments are
/// kept. Returns the re-rendered document.
pub fn edit_toml(content: &str, path: &[TomlKey<'_>], value: &str) -> Result<String, UpdateError> {
    let missing = || UpdateError::MissingPath(render_path(path));

    let mut doc = parse_document(content)?;
    let mut item: &mut Item = doc.as_item_mut();
    for key in path {
        item = match key {
            TomlKey::Key(name) => item.get_mut(*name),
            TomlKey::Index(index) => item.get_mut(*index),
        }
        .filter(|next| !next.is_none())
        .ok_or_else(missing)?;
    }

    let old = item.as_value().ok_or_else(missing)?;
    let mut new = Value::from(value);
    *new.decor_mut() = old.decor().clone();
    *item = Item::Value(new);

    Ok(doc.to_string())
}

/// The `package.name` declared by a manifest, if any.
pub fn package_name(manifest: &str) -> Result<Option<String>, UpdateError> {
    let doc = parse_document(manifest)?;
    Ok(doc
        .get("package")
        .and_then(|package| package.get("name"))
        .and_then(Item::as_str)
        .map(str::to_string))
}

/// Rewrites `package.version` in a `Cargo.toml`.
#[derive(Debug, Clone)]
pub struct CargoToml {
    version: Version,
}

impl CargoToml {
    /// Updater setting the package version to `version`.
    pub const fn new(version: Version) -> Self {
        Self { version }
    }
}

impl Updater for CargoToml {
    fn update_content(&self, content: Option<&str>) -> Result<String, UpdateError> {
        let Some(content) = content.filter(|c| !c.is_empty()) else {
            return Ok(String::new());
        };

        let doc = parse_document(content)?;
        let declared = doc
            .get("package")
            .and_then(|package| package.get("version"))
            .and_then(Item::as_str);
        if declared.is_none() {
            warn!("Cargo.toml has no literal package.version, leaving it untouched");
            return Ok(content.to_string());
        }

        edit_toml(
            content,
            &[TomlKey::Key("package"), TomlKey::Key("version")],
            &self.version.to_string(),
        )
    }
}

/// Rewrites the `version` of every `[[package]]` in a `Cargo.lock` whose
/// name is being released.
#[derive(Debug, Clone, Default)]
pub struct CargoLock {
    versions: BTreeMap<String, Version>,
}

impl CargoLock {
    /// Updater for the given `name -> version` map.
    pub const fn new(versions: BTreeMap<String, Version>) -> Self {
        Self { versions }
    }
}

impl Updater for CargoLock {
    fn update_content(&self, content: Option<&str>) -> Result<String, UpdateError> {
        let content = content.unwrap_or_default();
        let doc = parse_document(content)?;

        let targets: Vec<(usize, &Version)> = doc
            .get("package")
            .and_then(Item::as_array_of_tables)
            .map(|packages| {
                packages
                    .iter()
                    .enumerate()
                    .filter_map(|(index, package)| {
                        let name = package.get("name")?.as_str()?;
                        self.versions.get(name).map(|version| (index, version))
                    })
                    .collect()
            })
            .unwrap_or_default();

        debug!(count = targets.len(), "rewriting lockfile entries");

        // Each edit re-parses the previous edit's output.
        targets
            .into_iter()
            .try_fold(content.to_string(), |current, (index, version)| {
                edit_toml(
                    &current,
                    &[
                        TomlKey::Key("package"),
                        TomlKey::Index(index),
                        TomlKey::Key("version"),
                    ],
                    &version.to_string(),
                )
            })
    }
}
