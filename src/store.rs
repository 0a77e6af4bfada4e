//! LMDB-backed directory: users and the manager ↔ artist relation

use std::collections::BTreeSet;

use heed::{Env, EnvOpenOptions, RoTxn};
use tracing::info;

use crate::config::StoreOptions;
use crate::db::{Dbs, MAX_DBS};
use crate::directory::Directory;
use crate::error::{err, Result};
use crate::subject::Identity;
use crate::tx::Tx;

pub struct Store {
    env: Env,
    dbs: Dbs,
}

impl Store {
    /// Open or create the store at `options.path`
    pub fn open(options: &StoreOptions) -> Result<Self> {
        std::fs::create_dir_all(&options.path).map_err(err)?;
        // SAFETY: LMDB requires no other processes access this path concurrently during open.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(options.map_size)
                .max_readers(options.max_readers)
                .max_dbs(MAX_DBS)
                .open(&options.path)
                .map_err(err)?
        };
        let dbs = Dbs::create(&env)?;
        info!(path = %options.path.display(), "store opened");
        Ok(Store { env, dbs })
    }

    /// Execute a read-only operation
    #[inline]
    pub fn read<T, F: FnOnce(&Dbs, &RoTxn) -> Result<T>>(&self, f: F) -> Result<T> {
        f(&self.dbs, &self.env.read_txn().map_err(err)?)
    }

    /// Execute a write operation, committing only if `f` succeeds
    pub fn transact<T, F: FnOnce(&mut Tx<'_>) -> Result<T>>(&self, f: F) -> Result<T> {
        let mut tx = Tx::new(self.env.write_txn().map_err(err)?, &self.dbs);
        let r = f(&mut tx)?;
        tx.commit()?;
        Ok(r)
    }

    pub fn user(&self, id: u64) -> Result<Option<Identity>> {
        self.read(|d, tx| d.users.get(tx, &id).map_err(err))
    }

    pub fn managed_artists(&self, manager: u64) -> Result<BTreeSet<u64>> {
        self.read(|d, tx| d.managers.list_fwd(tx, manager))
    }

    pub fn managers_of(&self, artist: u64) -> Result<BTreeSet<u64>> {
        self.read(|d, tx| d.managers.list_rev(tx, artist))
    }

    pub fn manager_count(&self, artist: u64) -> Result<usize> {
        self.read(|d, tx| d.managers.count_rev(tx, artist))
    }

    /// Every user record, in id order
    pub fn list_users(&self) -> Result<Vec<Identity>> {
        self.read(|d, tx| {
            let mut r = Vec::new();
            for item in d.users.iter(tx).map_err(err)? {
                let (_, identity) = item.map_err(err)?;
                r.push(identity);
            }
            Ok(r)
        })
    }

    /// Clear all tables (for testing)
    pub fn clear_all(&self) -> Result<()> {
        let mut txn = self.env.write_txn().map_err(err)?;
        self.dbs.users.clear(&mut txn).map_err(err)?;
        self.dbs.managers.clear(&mut txn)?;
        self.dbs.meta.clear(&mut txn).map_err(err)?;
        txn.commit().map_err(err)
    }
}

impl Directory for Store {
    fn identity(&self, user: u64) -> Result<Option<Identity>> {
        self.user(user)
    }

    fn managed_artists(&self, manager: u64) -> Result<BTreeSet<u64>> {
        Store::managed_artists(self, manager)
    }

    fn manager_count(&self, artist: u64) -> Result<usize> {
        Store::manager_count(self, artist)
    }
}
