//! Songs and podcast episodes

use crate::delegation::can_edit_artist_content;
use crate::directory::Directory;
use crate::error::{AccessError, Result};
use crate::resource::{ResourceKind, SongDescriptor};
use crate::scope;
use crate::subject::AccessSubject;

use super::Decision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SongAction {
    Access,
    Own,
    Edit,
    Delete,
    Publish,
    Download,
}

impl SongAction {
    pub fn parse(kind: ResourceKind, name: &str) -> Result<Self> {
        Ok(match name {
            "access" => SongAction::Access,
            "own" => SongAction::Own,
            "edit" => SongAction::Edit,
            "delete" => SongAction::Delete,
            "publish" => SongAction::Publish,
            "download" => SongAction::Download,
            other => return Err(AccessError::invalid_action(kind, other)),
        })
    }
}

/// Ownership, co-ownership, provenance or delegation, without the elevated bypass
fn editable<D: Directory + ?Sized>(directory: &D, subject: &AccessSubject, song: &SongDescriptor) -> Result<bool> {
    if song.owner.id == subject.id || song.artist_user == Some(subject.id) || song.uploaded_by.is(subject.id) {
        return Ok(true);
    }
    can_edit_artist_content(directory, subject, song.owner.id, song.uploaded_by)
}

/// Visibility is the song collection rule applied to this one row
pub fn access<D: Directory + ?Sized>(directory: &D, subject: &AccessSubject, song: &SongDescriptor) -> Result<bool> {
    scope::songs(subject).includes(song, directory)
}

pub fn decide<D: Directory + ?Sized>(
    directory: &D,
    subject: &AccessSubject,
    song: &SongDescriptor,
    action: SongAction,
) -> Result<Decision> {
    let allowed = match action {
        SongAction::Access => access(directory, subject, song)?,
        SongAction::Own => song.owner.id == subject.id,
        SongAction::Edit | SongAction::Delete => subject.elevated() || editable(directory, subject, song)?,
        SongAction::Publish => subject.elevated() || (subject.verified && editable(directory, subject, song)?),
        SongAction::Download => !subject.anonymous && access(directory, subject, song)?,
    };
    Ok(allowed.into())
}
