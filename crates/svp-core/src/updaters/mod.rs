//! Concrete [`Updater`](crate::update::Updater) implementations.

pub mod cargo;
pub mod changelog;

pub use cargo::{CargoLock, CargoToml};
pub use changelog::ChangelogUpdater;
