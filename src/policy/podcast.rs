//! Podcasts

use crate::directory::Directory;
use crate::error::{AccessError, Result};
use crate::resource::{PodcastDescriptor, ResourceKind};
use crate::scope;
use crate::subject::AccessSubject;

use super::Decision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PodcastAction {
    Access,
    View,
    Edit,
    Update,
    Delete,
    Publish,
}

impl PodcastAction {
    pub fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "access" => PodcastAction::Access,
            "view" => PodcastAction::View,
            "edit" => PodcastAction::Edit,
            "update" => PodcastAction::Update,
            "delete" => PodcastAction::Delete,
            "publish" => PodcastAction::Publish,
            other => return Err(AccessError::invalid_action(ResourceKind::Podcast, other)),
        })
    }
}

pub fn decide<D: Directory + ?Sized>(
    directory: &D,
    subject: &AccessSubject,
    podcast: &PodcastDescriptor,
    action: PodcastAction,
) -> Result<Decision> {
    let editable = || -> Result<bool> {
        Ok(subject.elevated() || scope::podcast_editable(subject).includes(podcast, directory)?)
    };
    let allowed = match action {
        PodcastAction::Access | PodcastAction::View => scope::podcasts(subject).includes(podcast, directory)?,
        PodcastAction::Edit | PodcastAction::Update | PodcastAction::Delete => editable()?,
        PodcastAction::Publish => subject.elevated() || (subject.verified && editable()?),
    };
    Ok(allowed.into())
}
