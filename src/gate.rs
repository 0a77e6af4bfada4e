//! Entry point: builds subjects and answers decision and scope queries

use tracing::{debug, instrument};

use crate::config::Settings;
use crate::delegation;
use crate::directory::Directory;
use crate::error::{AccessError, Result};
use crate::policy::{self, Decision};
use crate::resource::{Resource, ResourceKind, Uploader};
use crate::scope::Scope;
use crate::subject::{AccessSubject, Identity};

/// Access-control engine over one directory.
///
/// Holds no per-request state. Every decision re-reads what it needs from the
/// directory, so relation changes are visible to the next call.
pub struct Gate<D> {
    directory: D,
    settings: Settings,
}

impl<D: Directory> Gate<D> {
    pub fn new(directory: D, settings: Settings) -> Self {
        Gate { directory, settings }
    }

    #[inline]
    pub fn directory(&self) -> &D {
        &self.directory
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Load a user and build their subject for one request
    #[instrument(level = "debug", skip(self))]
    pub fn build_subject(&self, user_id: u64) -> Result<AccessSubject> {
        let identity = self
            .directory
            .identity(user_id)?
            .ok_or_else(|| AccessError::Configuration(format!("user {user_id} does not exist")))?;
        self.subject_for(&identity)
    }

    /// Build a subject from an identity the caller already loaded
    pub fn subject_for(&self, identity: &Identity) -> Result<AccessSubject> {
        AccessSubject::build(identity, &self.directory, &self.settings)
    }

    /// Decide `action` on `resource`. Unknown actions are errors, never denials.
    #[instrument(
        level = "debug",
        skip_all,
        fields(
            subject = subject.id,
            role = %subject.role,
            kind = %resource.kind(),
            action = %action,
        )
    )]
    pub fn decide(&self, subject: &AccessSubject, resource: Resource<'_>, action: &str) -> Result<Decision> {
        let decision = policy::decide(&self.directory, subject, resource, action)
            .inspect_err(|e| debug!(error = %e, "rejected"))?;
        debug!(?decision, "decided");
        Ok(decision)
    }

    /// The subject's view of a listable collection
    #[instrument(level = "debug", skip_all, fields(subject = subject.id, kind = %kind))]
    pub fn scope(&self, subject: &AccessSubject, kind: ResourceKind) -> Result<Scope> {
        let scope = Scope::new(subject, kind)?;
        debug!(unrestricted = scope.is_unrestricted(), "scoped");
        Ok(scope)
    }

    pub fn can_edit_artist_content(&self, subject: &AccessSubject, artist: u64, uploaded_by: Uploader) -> Result<bool> {
        delegation::can_edit_artist_content(&self.directory, subject, artist, uploaded_by)
    }
}
