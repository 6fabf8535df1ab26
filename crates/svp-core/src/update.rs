//! File edits staged on a release pull request.
//!
//! An [`Update`] names a file and an [`Updater`]: a pure transformation from
//! the file's current content (if any) to its new content. Writing the
//! result is the repository's job.

use std::fmt;

use thiserror::Error;
use tracing::warn;

use crate::repository::{RepositoryError, RepositoryResult};

/// Errors from content transformations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateError {
    /// The existing content is not a valid TOML document.
    #[error("invalid TOML document: {0}")]
    Toml(String),

    /// A structural path does not exist in the document.
    #[error("no value at '{0}'")]
    MissingPath(String),
}

/// Transforms a file's content.
pub trait Updater {
    /// Produce new content from the existing content (`None` if the file is new).
    fn update_content(&self, content: Option<&str>) -> Result<String, UpdateError>;
}

/// One file edit.
pub struct Update {
    /// Repository-relative path.
    pub path: String,
    /// Whether the file may be created when missing.
    pub create_if_missing: bool,
    /// The content transformation.
    pub updater: Box<dyn Updater>,
}

impl fmt::Debug for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Update")
            .field("path", &self.path)
            .field("create_if_missing", &self.create_if_missing)
            .finish_non_exhaustive()
    }
}

/// Errors from [`render_update`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Reading the existing file failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The updater rejected the content.
    #[error("failed to update '{path}': {source}")]
    Update {
        /// File being updated.
        path: String,
        /// Underlying updater error.
        source: UpdateError,
    },
}

/// Compute the new content of `update` given what reading the file returned.
///
/// A missing file is rendered from empty content when the update may create
/// it, and skipped (`Ok(None)`) with a warning otherwise. Any other read
/// failure propagates.
pub fn render_update(
    update: &Update,
    existing: RepositoryResult<String>,
) -> Result<Option<String>, RenderError> {
    let existing = match existing {
        Ok(content) => Some(content),
        Err(RepositoryError::NotFound { branch, .. }) if !update.create_if_missing => {
            warn!(path = %update.path, %branch, "file does not exist, skipping update");
            return Ok(None);
        }
        Err(RepositoryError::NotFound { .. }) => None,
        Err(err) => return Err(err.into()),
    };

    let content = update
        .updater
        .update_content(existing.as_deref())
        .map_err(|source| RenderError::Update {
            path: update.path.clone(),
            source,
        })?;
    Ok(Some(content))
}
