//! Albums and artists
//!
//! Both follow the same rule: the entity is editable by whoever could edit at
//! least one of its songs through ownership, upload or delegation. System
//! placeholders ("Unknown", "Various") are never editable.

use std::collections::BTreeSet;

use crate::delegation::can_edit_artist_content;
use crate::directory::Directory;
use crate::error::{AccessError, Result};
use crate::resource::{CatalogDescriptor, ResourceKind, Uploader};
use crate::subject::AccessSubject;

use super::Decision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogAction {
    Access,
    Edit,
    Update,
    /// Manage cached third-party encyclopedia data
    FetchEncyclopedia,
}

impl CatalogAction {
    pub fn parse(kind: ResourceKind, name: &str) -> Result<Self> {
        Ok(match name {
            "access" => CatalogAction::Access,
            "edit" => CatalogAction::Edit,
            "update" => CatalogAction::Update,
            "fetch_encyclopedia" | "fetchEncyclopedia" => CatalogAction::FetchEncyclopedia,
            other => return Err(AccessError::invalid_action(kind, other)),
        })
    }
}

fn editable<D: Directory + ?Sized>(directory: &D, subject: &AccessSubject, entity: &CatalogDescriptor) -> Result<bool> {
    if entity.placeholder.is_some() {
        return Ok(false);
    }
    if subject.elevated() || entity.owned_by(subject.id) {
        return Ok(true);
    }
    if entity.songs.is_empty() {
        return Ok(false);
    }
    if entity.songs.iter().any(|p| p.owner_id == subject.id || p.uploaded_by.is(subject.id)) {
        return Ok(true);
    }
    let Some(artist) = entity.owner else {
        return Ok(false);
    };
    let uploaders: BTreeSet<Uploader> = entity.songs.iter().map(|p| p.uploaded_by).collect();
    for uploaded_by in uploaders {
        if can_edit_artist_content(directory, subject, artist, uploaded_by)? {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn decide<D: Directory + ?Sized>(
    directory: &D,
    subject: &AccessSubject,
    entity: &CatalogDescriptor,
    action: CatalogAction,
) -> Result<Decision> {
    let allowed = match action {
        // No public or organization bypass at entity level
        CatalogAction::Access => {
            subject.elevated() || entity.owned_by(subject.id) || editable(directory, subject, entity)?
        }
        CatalogAction::Edit | CatalogAction::Update => editable(directory, subject, entity)?,
        CatalogAction::FetchEncyclopedia => {
            entity.placeholder.is_none() && (subject.elevated() || entity.owned_by(subject.id))
        }
    };
    Ok(allowed.into())
}
