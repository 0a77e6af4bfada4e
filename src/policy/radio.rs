//! Radio stations

use crate::delegation::can_edit_artist_content;
use crate::directory::Directory;
use crate::error::{AccessError, Result};
use crate::resource::{RadioStationDescriptor, ResourceKind};
use crate::subject::AccessSubject;

use super::Decision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadioAction {
    Access,
    Edit,
    Update,
    Delete,
    Publish,
}

impl RadioAction {
    pub fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "access" => RadioAction::Access,
            "edit" => RadioAction::Edit,
            "update" => RadioAction::Update,
            "delete" => RadioAction::Delete,
            "publish" => RadioAction::Publish,
            other => return Err(AccessError::invalid_action(ResourceKind::RadioStation, other)),
        })
    }
}

pub fn decide<D: Directory + ?Sized>(
    directory: &D,
    subject: &AccessSubject,
    station: &RadioStationDescriptor,
    action: RadioAction,
) -> Result<Decision> {
    let owned = station.owner.id == subject.id;
    let uploaded = station.uploaded_by.is(subject.id);
    let delegated = || can_edit_artist_content(directory, subject, station.owner.id, station.uploaded_by);

    let allowed = match action {
        RadioAction::Access => {
            subject.elevated() || owned || station.is_public || uploaded || delegated()?
        }
        RadioAction::Edit | RadioAction::Update | RadioAction::Delete => {
            subject.elevated() || owned || delegated()? || uploaded
        }
        RadioAction::Publish => subject.elevated() || (subject.verified && (owned || delegated()?)),
    };
    Ok(allowed.into())
}
