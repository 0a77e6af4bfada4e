//! Read seam onto the persisted identity data and the manager ↔ artist relation
//!
//! The engine never caches what a directory returns: every decision that
//! depends on the relation asks again.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::subject::Identity;

pub trait Directory {
    /// The persisted identity record for a user, if any
    fn identity(&self, user: u64) -> Result<Option<Identity>>;

    /// Artists currently linked to a manager
    fn managed_artists(&self, manager: u64) -> Result<BTreeSet<u64>>;

    /// Number of managers currently linked to an artist
    fn manager_count(&self, artist: u64) -> Result<usize>;
}

impl<T: Directory + ?Sized> Directory for &T {
    fn identity(&self, user: u64) -> Result<Option<Identity>> {
        (**self).identity(user)
    }

    fn managed_artists(&self, manager: u64) -> Result<BTreeSet<u64>> {
        (**self).managed_artists(manager)
    }

    fn manager_count(&self, artist: u64) -> Result<usize> {
        (**self).manager_count(artist)
    }
}

/// In-memory directory for callers that already hold the relation
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    users: BTreeMap<u64, Identity>,
    links: BTreeSet<(u64, u64)>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identity: Identity) -> &mut Self {
        self.users.insert(identity.id, identity);
        self
    }

    /// Link a manager to an artist (idempotent)
    pub fn link(&mut self, manager: u64, artist: u64) -> &mut Self {
        self.links.insert((manager, artist));
        self
    }

    pub fn unlink(&mut self, manager: u64, artist: u64) -> bool {
        self.links.remove(&(manager, artist))
    }

    pub fn identity_mut(&mut self, user: u64) -> Option<&mut Identity> {
        self.users.get_mut(&user)
    }
}

impl Directory for MemoryDirectory {
    fn identity(&self, user: u64) -> Result<Option<Identity>> {
        Ok(self.users.get(&user).cloned())
    }

    fn managed_artists(&self, manager: u64) -> Result<BTreeSet<u64>> {
        Ok(self
            .links
            .range((manager, 0)..=(manager, u64::MAX))
            .map(|(_, a)| *a)
            .collect())
    }

    fn manager_count(&self, artist: u64) -> Result<usize> {
        Ok(self.links.iter().filter(|(_, a)| *a == artist).count())
    }
}
