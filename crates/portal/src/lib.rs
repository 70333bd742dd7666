//! Client portal services.
//!
//! [`Portal`] bundles the owner-scoped services on top of a [`Database`] and
//! a [`BlobStore`]:
//!
//! - [`Catalog`]: exercises, sets and daily routines with live feeds
//! - [`Programs`]: composing and browsing workout programs
//! - [`ActiveFlow`]: the single active program, its goals, and the archive
//! - [`ProfileManager`]: client profiles
//!
//! Every operation takes the signed-in [`Identity`] and only touches that
//! user's records.

pub mod active;
pub mod blob;
pub mod catalog;
pub mod error;
pub mod feed;
pub mod identity;
pub mod library;
pub mod profile;
pub mod programs;

use std::sync::Arc;

use database::Database;

pub use active::{ActiveFlow, ActiveProgramView, GoalsSubmission, Photo};
pub use blob::{BlobError, BlobStore, LocalBlobStore, MemoryBlobStore};
pub use catalog::Catalog;
pub use error::{BackendError, PortalError, Result};
pub use feed::{Feed, Snapshot, Subscription};
pub use identity::{AuthProvider, Identity, StaticTokenAuth, TokenSpecError};
pub use library::LibraryWatcher;
pub use profile::{ProfileLoad, ProfileManager, ProfileSession, ProfileState};
pub use programs::Programs;

/// All portal services over one database and blob store.
#[derive(Clone)]
pub struct Portal {
    catalog: Catalog,
    programs: Programs,
    active: ActiveFlow,
    profiles: ProfileManager,
}

impl Portal {
    pub fn new(database: Database, blobs: Arc<dyn BlobStore>) -> Self {
        let catalog = Catalog::new(database.clone());
        Self {
            programs: Programs::new(database.clone(), catalog.clone()),
            active: ActiveFlow::new(database.clone(), blobs),
            profiles: ProfileManager::new(database),
            catalog,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn programs(&self) -> &Programs {
        &self.programs
    }

    pub fn active(&self) -> &ActiveFlow {
        &self.active
    }

    pub fn profiles(&self) -> &ProfileManager {
        &self.profiles
    }
}
