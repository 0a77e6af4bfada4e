//! Transaction wrapper for batched writes

use heed::RwTxn;
use tracing::debug;

use crate::db::{current_epoch, Dbs, NEXT_USER_ID};
use crate::error::{err, AccessError, Result};
use crate::role::Role;
use crate::subject::Identity;

/// Write transaction over the directory tables. Changes become visible on commit.
pub struct Tx<'a> {
    txn: RwTxn<'a>,
    dbs: &'a Dbs,
}

fn missing(user: u64) -> AccessError {
    AccessError::InvalidArgument(format!("user {user} does not exist"))
}

impl<'a> Tx<'a> {
    #[inline]
    pub(crate) fn new(txn: RwTxn<'a>, dbs: &'a Dbs) -> Self {
        Tx { txn, dbs }
    }

    #[inline]
    pub(crate) fn commit(self) -> Result<()> {
        self.txn.commit().map_err(err)
    }

    fn next_id(&self) -> Result<u64> {
        Ok(self.dbs.meta.get(&self.txn, NEXT_USER_ID).map_err(err)?.unwrap_or(1))
    }

    fn load(&self, id: u64) -> Result<Identity> {
        self.dbs.users.get(&self.txn, &id).map_err(err)?.ok_or_else(|| missing(id))
    }

    fn save(&mut self, identity: &Identity) -> Result<()> {
        self.dbs.users.put(&mut self.txn, &identity.id, identity).map_err(err)
    }

    /// Drop every artist link held by `manager`
    fn drop_managed(&mut self, manager: u64) -> Result<()> {
        for artist in self.dbs.managers.list_fwd(&self.txn, manager)? {
            self.dbs.managers.del(&mut self.txn, manager, artist)?;
        }
        debug!(manager, "managed artists dropped");
        Ok(())
    }

    pub fn user(&self, id: u64) -> Result<Option<Identity>> {
        self.dbs.users.get(&self.txn, &id).map_err(err)
    }

    /// Create a user with a fresh id and a single role
    pub fn create_user(&mut self, email: &str, organization_id: u64, role: Role) -> Result<Identity> {
        let id = self.next_id()?;
        let identity = Identity::new(id, email, organization_id, role);
        self.put_user(&identity)?;
        Ok(identity)
    }

    /// Insert or replace a user record under its own id. Replacing a Manager
    /// with a record of any other role drops the old record's artist links.
    pub fn put_user(&mut self, identity: &Identity) -> Result<()> {
        if identity.id == 0 {
            return Err(AccessError::InvalidArgument("user id 0 is reserved".into()));
        }
        let next = identity
            .id
            .checked_add(1)
            .ok_or_else(|| AccessError::InvalidArgument(format!("user id {} is out of range", identity.id)))?;
        let was_manager = match self.user(identity.id)? {
            Some(prev) => matches!(prev.role(), Ok(Role::Manager)),
            None => false,
        };
        self.save(identity)?;
        if was_manager && !matches!(identity.role(), Ok(Role::Manager)) {
            self.drop_managed(identity.id)?;
        }
        if identity.id >= self.next_id()? {
            self.dbs.meta.put(&mut self.txn, NEXT_USER_ID, &next).map_err(err)?;
        }
        Ok(())
    }

    /// Replace the user's role. Leaving the Manager role drops the user's artist links.
    pub fn set_role(&mut self, id: u64, role: Role) -> Result<()> {
        let mut identity = self.load(id)?;
        identity.roles = vec![role.as_str().to_string()];
        self.save(&identity)?;
        if role != Role::Manager {
            self.drop_managed(id)?;
        }
        Ok(())
    }

    pub fn set_verified(&mut self, id: u64, verified: bool) -> Result<()> {
        let mut identity = self.load(id)?;
        identity.verified = verified;
        self.save(&identity)
    }

    pub fn set_organization(&mut self, id: u64, organization_id: u64) -> Result<()> {
        let mut identity = self.load(id)?;
        identity.organization_id = organization_id;
        self.save(&identity)
    }

    /// Link a Manager to an artist. Idempotent.
    pub fn assign_artist(&mut self, manager: u64, artist: u64) -> Result<()> {
        let identity = self.load(manager)?;
        if identity.role()? != Role::Manager {
            return Err(AccessError::InvalidArgument(format!("user {manager} is not a manager")));
        }
        if self.dbs.managers.contains(&self.txn, manager, artist)? {
            return Ok(());
        }
        self.dbs.managers.put(&mut self.txn, manager, artist, current_epoch())?;
        debug!(manager, artist, "artist assigned");
        Ok(())
    }

    /// Unlink a Manager from an artist. Returns false if there was no link.
    pub fn remove_artist(&mut self, manager: u64, artist: u64) -> Result<bool> {
        let removed = self.dbs.managers.del(&mut self.txn, manager, artist)?;
        if removed {
            debug!(manager, artist, "artist removed");
        }
        Ok(removed)
    }

    /// Delete a user with every manager link on either side
    pub fn delete_user(&mut self, id: u64) -> Result<bool> {
        self.dbs.managers.purge(&mut self.txn, id)?;
        self.dbs.users.delete(&mut self.txn, &id).map_err(err)
    }
}
