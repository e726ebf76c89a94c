//! Authority directory: the read-only listing the matcher consults.
//!
//! A directory is loaded once into an immutable [`StaticDirectory`] snapshot.
//! Reloads build a new snapshot and publish it through [`SharedDirectory`],
//! so a match always runs against a single consistent version.

mod shared;
mod snapshot;
mod source;

pub use shared::{PublishedDirectory, SharedDirectory};
pub use snapshot::{DirectoryStats, StaticDirectory};
pub use source::{read_csv_authorities, DirectoryFormat, DirectorySource};

use std::sync::Arc;

use crate::models::Authority;

/// Read access to a set of authorities.
pub trait AuthorityDirectory: Send + Sync {
    /// All authorities in directory order.
    fn list_authorities(&self) -> &[Authority];

    /// Look up an authority by its contact handle (see [`normalize_handle`]).
    fn authority_by_handle(&self, handle: &str) -> Option<&Authority> {
        let wanted = normalize_handle(handle);
        self.list_authorities()
            .iter()
            .find(|a| normalize_handle(&a.handle) == wanted)
    }
}

impl AuthorityDirectory for Vec<Authority> {
    fn list_authorities(&self) -> &[Authority] {
        self
    }
}

impl<D: AuthorityDirectory + ?Sized> AuthorityDirectory for Arc<D> {
    fn list_authorities(&self) -> &[Authority] {
        (**self).list_authorities()
    }

    fn authority_by_handle(&self, handle: &str) -> Option<&Authority> {
        (**self).authority_by_handle(handle)
    }
}

/// Canonical form of a handle: trimmed, one leading `@` removed, ASCII lowercase.
pub fn normalize_handle(handle: &str) -> String {
    let trimmed = handle.trim();
    trimmed
        .strip_prefix('@')
        .unwrap_or(trimmed)
        .to_ascii_lowercase()
}
