//! The acting principal: persisted identity and the per-request access subject

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Settings;
use crate::directory::Directory;
use crate::error::{AccessError, Result};
use crate::resource::{UserDescriptor, UserRef};
use crate::role::Role;

fn default_true() -> bool {
    true
}

/// A persisted user record as the identity collaborator stores it.
///
/// The record can hold any number of role names; only a record with exactly
/// one known role can act as a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: u64,
    pub email: String,
    pub organization_id: u64,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub verified: bool,
    /// Set while an invitation is pending
    #[serde(default)]
    pub invitation_token: Option<String>,
    #[serde(default = "default_true")]
    pub include_public_media: bool,
}

impl Identity {
    pub fn new(id: u64, email: impl Into<String>, organization_id: u64, role: Role) -> Self {
        Identity {
            id,
            email: email.into(),
            organization_id,
            roles: vec![role.as_str().to_string()],
            verified: false,
            invitation_token: None,
            include_public_media: true,
        }
    }

    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    pub fn invited(mut self, token: impl Into<String>) -> Self {
        self.invitation_token = Some(token.into());
        self
    }

    pub fn include_public_media(mut self, include: bool) -> Self {
        self.include_public_media = include;
        self
    }

    /// The single role of this identity
    pub fn role(&self) -> Result<Role> {
        match self.roles.as_slice() {
            [one] => one.parse().map_err(|e| {
                AccessError::Configuration(format!("user {}: {}", self.id, e))
            }),
            [] => Err(AccessError::Configuration(format!("user {} has no role", self.id))),
            many => Err(AccessError::Configuration(format!(
                "user {} has {} roles, expected exactly one",
                self.id,
                many.len()
            ))),
        }
    }

    #[inline]
    pub fn is_prospect(&self) -> bool {
        self.invitation_token.is_some()
    }

    pub fn user_ref(&self) -> UserRef {
        UserRef::new(self.id, self.organization_id)
    }

    /// Project this record into a management-action target
    pub fn descriptor(&self) -> Result<UserDescriptor> {
        Ok(UserDescriptor {
            id: self.id,
            role: self.role()?,
            organization_id: self.organization_id,
            verified: self.verified,
            is_prospect: self.is_prospect(),
        })
    }
}

/// Snapshot of the acting principal, built once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessSubject {
    pub id: u64,
    pub role: Role,
    pub organization_id: u64,
    pub verified: bool,
    /// Artists linked to this subject; empty unless the subject is a Manager
    pub managed_artist_ids: BTreeSet<u64>,
    pub include_public_media: bool,
    pub anonymous: bool,
}

impl AccessSubject {
    pub fn new(id: u64, role: Role, organization_id: u64) -> Self {
        AccessSubject {
            id,
            role,
            organization_id,
            verified: false,
            managed_artist_ids: BTreeSet::new(),
            include_public_media: true,
            anonymous: false,
        }
    }

    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    pub fn managing(mut self, artists: impl IntoIterator<Item = u64>) -> Self {
        self.managed_artist_ids.extend(artists);
        self
    }

    pub fn include_public_media(mut self, include: bool) -> Self {
        self.include_public_media = include;
        self
    }

    pub fn anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = anonymous;
        self
    }

    /// Build a subject from a persisted identity, reading the managed artists
    /// from the directory.
    pub fn build<D: Directory + ?Sized>(identity: &Identity, directory: &D, settings: &Settings) -> Result<Self> {
        let role = identity.role().inspect_err(|e| warn!(user = identity.id, error = %e, "cannot build subject"))?;
        let managed_artist_ids = if role == Role::Manager {
            directory.managed_artists(identity.id)?
        } else {
            BTreeSet::new()
        };
        Ok(AccessSubject {
            id: identity.id,
            role,
            organization_id: identity.organization_id,
            verified: identity.verified,
            managed_artist_ids,
            include_public_media: identity.include_public_media,
            anonymous: settings.is_anonymous_email(&identity.email),
        })
    }

    /// Admin or Moderator
    #[inline]
    pub fn elevated(&self) -> bool {
        self.role.is_elevated()
    }

    #[inline]
    pub fn is(&self, role: Role) -> bool {
        self.role == role
    }

    #[inline]
    pub fn manages(&self, artist: u64) -> bool {
        self.managed_artist_ids.contains(&artist)
    }

    /// Check the static grants of the subject's role
    #[inline]
    pub fn has_permission(&self, permission: u64) -> bool {
        self.role.has(permission)
    }

    #[inline]
    pub fn can_manage(&self, other: Role) -> bool {
        self.role.can_manage(other)
    }
}

/// Check the static grants of a subject's role
#[inline]
pub fn has_permission(subject: &AccessSubject, permission: u64) -> bool {
    subject.has_permission(permission)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MANAGE_ARTISTS, UPLOAD_CONTENT};
    use crate::directory::MemoryDirectory;

    #[test]
    fn exactly_one_role_is_required() {
        let mut id = Identity::new(1, "a@x.org", 1, Role::Artist);
        assert_eq!(id.role().unwrap(), Role::Artist);

        id.roles.clear();
        assert!(matches!(id.role(), Err(AccessError::Configuration(_))));

        id.roles = vec!["artist".into(), "manager".into()];
        assert!(matches!(id.role(), Err(AccessError::Configuration(_))));

        id.roles = vec!["superuser".into()];
        assert!(matches!(id.role(), Err(AccessError::Configuration(_))));
    }

    #[test]
    fn managed_artists_only_load_for_managers() {
        let mut dir = MemoryDirectory::new();
        dir.link(5, 20).link(6, 21);
        let settings = Settings::default();

        let manager = AccessSubject::build(&Identity::new(5, "m@x.org", 1, Role::Manager), &dir, &settings).unwrap();
        assert!(manager.manages(20));

        // A stale link left behind after a demotion grants nothing
        let demoted = AccessSubject::build(&Identity::new(6, "d@x.org", 1, Role::Artist), &dir, &settings).unwrap();
        assert!(demoted.managed_artist_ids.is_empty());
    }

    #[test]
    fn anonymous_flag_follows_email_domain() {
        let dir = MemoryDirectory::new();
        let settings = Settings::default();
        let anon = AccessSubject::build(&Identity::new(9, "guest@sin.email", 1, Role::User), &dir, &settings).unwrap();
        assert!(anon.anonymous);
        let named = AccessSubject::build(&Identity::new(8, "guest@example.com", 1, Role::User), &dir, &settings).unwrap();
        assert!(!named.anonymous);
    }

    #[test]
    fn permission_lookup_uses_role_grants() {
        let s = AccessSubject::new(1, Role::Manager, 1);
        assert!(has_permission(&s, MANAGE_ARTISTS | UPLOAD_CONTENT));
        assert!(!has_permission(&AccessSubject::new(2, Role::Moderator, 1), MANAGE_ARTISTS));
    }

    #[test]
    fn prospects_project_to_descriptors() {
        let d = Identity::new(3, "p@x.org", 2, Role::Artist).invited("tok").descriptor().unwrap();
        assert!(d.is_prospect);
        assert_eq!(d.role, Role::Artist);
        assert_eq!(d.organization_id, 2);
    }
}
