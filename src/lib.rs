//! Mediagate - Access-control decisions for a multi-tenant media platform
//!
//! A [`Gate`] answers two kinds of question about an [`AccessSubject`]:
//! point decisions ("may this user edit this song?") and collection scopes
//! ("which songs may this user see?"). Both are derived from the same rule
//! trees in [`scope`], so a row is in a scope exactly when the point
//! `access` decision allows it.
//!
//! Persisted users and the manager ↔ artist relation live behind the
//! [`Directory`] trait; [`Store`] is the LMDB-backed implementation.

pub mod config;
pub mod constants;
pub mod db;
pub mod delegation;
pub mod directory;
pub mod error;
pub mod gate;
pub mod policy;
pub mod resource;
pub mod role;
pub mod scope;
pub mod store;
pub mod subject;
pub mod tx;

pub use config::{Settings, StoreOptions};
pub use delegation::can_edit_artist_content;
pub use directory::{Directory, MemoryDirectory};
pub use error::{AccessError, Result};
pub use gate::Gate;
pub use policy::Decision;
pub use resource::{
    CatalogDescriptor, GenreDescriptor, Placeholder, PodcastDescriptor, PodcastLink, Provenance,
    RadioStationDescriptor, Resource, ResourceKind, SongDescriptor, Uploader, UserDescriptor, UserRef,
};
pub use role::Role;
pub use scope::{Predicate, Scope, SqlFilter};
pub use store::Store;
pub use subject::{has_permission, AccessSubject, Identity};
pub use tx::Tx;
