//! Genres

use crate::directory::Directory;
use crate::error::{AccessError, Result};
use crate::resource::{GenreDescriptor, ResourceKind};
use crate::scope;
use crate::subject::AccessSubject;

use super::Decision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenreAction {
    Access,
}

impl GenreAction {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "access" => Ok(GenreAction::Access),
            other => Err(AccessError::invalid_action(ResourceKind::Genre, other)),
        }
    }
}

/// A genre is reachable when at least one of its songs is
pub fn decide<D: Directory + ?Sized>(
    directory: &D,
    subject: &AccessSubject,
    genre: &GenreDescriptor,
    action: GenreAction,
) -> Result<Decision> {
    match action {
        GenreAction::Access => Ok(scope::genres(subject).includes(genre, directory)?.into()),
    }
}
