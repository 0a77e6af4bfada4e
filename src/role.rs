//! Role catalog: the ordered role set and the static grants per role

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// A user's single role. Ordering follows the level (`User < … < Admin`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Artist,
    Manager,
    Moderator,
    Admin,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Admin, Role::Moderator, Role::Manager, Role::Artist, Role::User];

    /// Role assigned to accounts created without an explicit role
    pub fn default_role() -> Self {
        Role::User
    }

    #[inline]
    pub fn level(self) -> u8 {
        match self {
            Role::Admin => ADMIN_LEVEL,
            Role::Moderator => MODERATOR_LEVEL,
            Role::Manager => MANAGER_LEVEL,
            Role::Artist => ARTIST_LEVEL,
            Role::User => USER_LEVEL,
        }
    }

    /// Permission mask granted statically to this role
    #[inline]
    pub fn grants(self) -> u64 {
        match self {
            Role::Admin => ADMIN_GRANTS,
            Role::Moderator => MODERATOR_GRANTS,
            Role::Manager => MANAGER_GRANTS,
            Role::Artist => ARTIST_GRANTS,
            Role::User => USER_GRANTS,
        }
    }

    /// Check if this role holds every bit of `required`
    #[inline]
    pub fn has(self, required: u64) -> bool {
        (self.grants() & required) == required
    }

    #[inline]
    pub fn greater_than(self, other: Role) -> bool {
        self.level() > other.level()
    }

    #[inline]
    pub fn less_than(self, other: Role) -> bool {
        self.level() < other.level()
    }

    /// Reflexive: a role can manage its peers
    #[inline]
    pub fn can_manage(self, other: Role) -> bool {
        self.level() >= other.level()
    }

    /// Roles can only be handed out strictly below one's own
    #[inline]
    pub fn can_assign(self, other: Role) -> bool {
        self.greater_than(other)
    }

    /// Admin and Moderator
    #[inline]
    pub fn is_elevated(self) -> bool {
        self.level() >= MODERATOR_LEVEL
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::Manager => "manager",
            Role::Artist => "artist",
            Role::User => "user",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Moderator => "Moderator",
            Role::Manager => "Manager",
            Role::Artist => "Artist",
            Role::User => "User",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Role::Admin => "Full system access and configuration.",
            Role::Moderator => "Manage users in their organization and publish content.",
            Role::Manager => "Manage a group of artists and upload content on their behalf.",
            Role::Artist => "Upload and manage their own content (private by default).",
            Role::User => "Listen and download public content.",
        }
    }

    /// Roles `self` may hand out, highest first
    pub fn assignable(self) -> Vec<Role> {
        Role::ALL.into_iter().filter(|r| self.can_assign(*r)).collect()
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::default_role()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "moderator" => Ok(Role::Moderator),
            "manager" => Ok(Role::Manager),
            "artist" => Ok(Role::Artist),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}
