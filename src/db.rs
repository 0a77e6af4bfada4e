//! Database types: table handles and key encoding

use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use heed::types::{Bytes, SerdeJson, Str, U64};
use heed::{Database, Env, RoTxn, RwTxn};

use crate::error::{err, Result};
use crate::subject::Identity;

// Database type aliases
pub type Db = Database<Bytes, U64<byteorder::BigEndian>>;
pub type DbU64 = Database<Str, U64<byteorder::BigEndian>>;
pub type DbUsers = Database<U64<byteorder::BigEndian>, SerdeJson<Identity>>;

/// Create a 16-byte key from two u64 values
#[inline]
pub fn key(a: u64, b: u64) -> [u8; 16] {
    let mut k = [0u8; 16];
    k[..8].copy_from_slice(&a.to_be_bytes());
    k[8..].copy_from_slice(&b.to_be_bytes());
    k
}

#[inline]
fn tail(k: &[u8]) -> Option<u64> {
    let bytes: [u8; 8] = k.get(8..16)?.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}

/// Bidirectional index: fwd[a,b] and rev[b,a] stay in sync
pub struct BiPair {
    pub fwd: Db,
    pub rev: Db,
}

impl BiPair {
    #[inline]
    pub fn contains(&self, tx: &RoTxn, a: u64, b: u64) -> Result<bool> {
        Ok(self.fwd.get(tx, &key(a, b)).map_err(err)?.is_some())
    }

    #[inline]
    pub fn put(&self, tx: &mut RwTxn, a: u64, b: u64, v: u64) -> Result<()> {
        self.fwd.put(tx, &key(a, b), &v).map_err(err)?;
        self.rev.put(tx, &key(b, a), &v).map_err(err)
    }

    #[inline]
    pub fn del(&self, tx: &mut RwTxn, a: u64, b: u64) -> Result<bool> {
        let r = self.fwd.delete(tx, &key(a, b)).map_err(err)?;
        self.rev.delete(tx, &key(b, a)).map_err(err)?;
        Ok(r)
    }

    pub fn list_fwd(&self, tx: &RoTxn, a: u64) -> Result<BTreeSet<u64>> {
        Self::list_pfx(tx, &self.fwd, a)
    }

    pub fn list_rev(&self, tx: &RoTxn, b: u64) -> Result<BTreeSet<u64>> {
        Self::list_pfx(tx, &self.rev, b)
    }

    pub fn count_rev(&self, tx: &RoTxn, b: u64) -> Result<usize> {
        Ok(self.rev.prefix_iter(tx, &b.to_be_bytes()).map_err(err)?.count())
    }

    /// Drop every pair that has `id` on either side
    pub fn purge(&self, tx: &mut RwTxn, id: u64) -> Result<()> {
        for b in self.list_fwd(tx, id)? {
            self.del(tx, id, b)?;
        }
        for a in self.list_rev(tx, id)? {
            self.del(tx, a, id)?;
        }
        Ok(())
    }

    pub fn clear(&self, tx: &mut RwTxn) -> Result<()> {
        self.fwd.clear(tx).map_err(err)?;
        self.rev.clear(tx).map_err(err)
    }

    fn list_pfx(tx: &RoTxn, db: &Db, pfx: u64) -> Result<BTreeSet<u64>> {
        let mut r = BTreeSet::new();
        for item in db.prefix_iter(tx, &pfx.to_be_bytes()).map_err(err)? {
            let (k, _) = item.map_err(err)?;
            if let Some(b) = tail(k) {
                r.insert(b);
            }
        }
        Ok(r)
    }
}

/// All database handles
pub struct Dbs {
    /// user id -> identity record
    pub users: DbUsers,
    /// manager -> artist (fwd), artist -> manager (rev); value is the link time
    pub managers: BiPair,
    /// counters
    pub meta: DbU64,
}

pub(crate) const MAX_DBS: u32 = 4;
pub(crate) const NEXT_USER_ID: &str = "next_user_id";

impl Dbs {
    /// Open or create every table in one write transaction
    pub(crate) fn create(env: &Env) -> Result<Self> {
        let mut tx = env.write_txn().map_err(err)?;
        let d = Dbs {
            users: env.create_database(&mut tx, Some("users")).map_err(err)?,
            managers: BiPair {
                fwd: env.create_database(&mut tx, Some("managers")).map_err(err)?,
                rev: env.create_database(&mut tx, Some("managers_rev")).map_err(err)?,
            },
            meta: env.create_database(&mut tx, Some("meta")).map_err(err)?,
        };
        tx.commit().map_err(err)?;
        Ok(d)
    }
}

/// Seconds since the Unix epoch; zero if the clock is before it
#[inline]
pub fn current_epoch() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}
