//! Users as the target of management actions

use crate::constants::MANAGE_ARTISTS;
use crate::error::{AccessError, Result};
use crate::resource::{ResourceKind, UserDescriptor};
use crate::role::Role;
use crate::subject::AccessSubject;

use super::Decision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserAction {
    Manage,
    Upload,
    Update,
    Edit,
    Destroy,
    Verify,
    UploadAs,
    AssignCoOwner,
}

impl UserAction {
    pub fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "manage" => UserAction::Manage,
            "upload" => UserAction::Upload,
            "update" => UserAction::Update,
            "edit" => UserAction::Edit,
            "destroy" => UserAction::Destroy,
            "verify" => UserAction::Verify,
            "upload_as" => UserAction::UploadAs,
            "assign_co_owner" => UserAction::AssignCoOwner,
            other => return Err(AccessError::invalid_action(ResourceKind::User, other)),
        })
    }

    /// Class-level actions need no target user
    pub fn needs_target(self) -> bool {
        !matches!(self, UserAction::Manage | UserAction::Upload)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserAction::Manage => "manage",
            UserAction::Upload => "upload",
            UserAction::Update => "update",
            UserAction::Edit => "edit",
            UserAction::Destroy => "destroy",
            UserAction::Verify => "verify",
            UserAction::UploadAs => "upload_as",
            UserAction::AssignCoOwner => "assign_co_owner",
        }
    }
}

fn class_level(subject: &AccessSubject, action: UserAction) -> bool {
    match action {
        UserAction::Manage => subject.elevated() || subject.has_permission(MANAGE_ARTISTS),
        _ => subject.role >= Role::Artist,
    }
}

/// Decide an action against the user collection as a whole
pub fn decide_collection(subject: &AccessSubject, action: UserAction) -> Result<Decision> {
    if action.needs_target() {
        return Err(AccessError::invalid_action(ResourceKind::User, action.as_str()));
    }
    Ok(class_level(subject, action).into())
}

pub fn decide(subject: &AccessSubject, target: &UserDescriptor, action: UserAction) -> Decision {
    let managed = subject.manages(target.id);
    let allowed = match action {
        UserAction::Manage | UserAction::Upload => class_level(subject, action),
        UserAction::Update | UserAction::Edit => {
            if target.is_prospect {
                false
            } else if subject.elevated() {
                subject.can_manage(target.role)
            } else if subject.is(Role::Manager) {
                target.id == subject.id || (managed && subject.can_manage(target.role))
            } else {
                false
            }
        }
        UserAction::Destroy => {
            if target.id == subject.id {
                false
            } else if subject.elevated() {
                subject.can_manage(target.role)
            } else if subject.is(Role::Manager) {
                managed && subject.can_manage(target.role)
            } else {
                false
            }
        }
        UserAction::Verify => {
            if target.is_prospect {
                false
            } else if subject.elevated() {
                subject.can_manage(target.role)
            } else if subject.is(Role::Manager) {
                subject.verified && target.role == Role::Artist && managed
            } else {
                false
            }
        }
        UserAction::UploadAs => {
            target.id == subject.id || subject.elevated() || (subject.is(Role::Manager) && managed)
        }
        UserAction::AssignCoOwner => {
            target.role == Role::Artist
                && match subject.role {
                    Role::Admin => true,
                    Role::Moderator => target.organization_id == subject.organization_id,
                    Role::Manager => managed,
                    Role::Artist | Role::User => false,
                }
        }
    };
    allowed.into()
}
