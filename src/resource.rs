//! Resource descriptors: the minimal read-only projections a decision needs
//!
//! Descriptors are built by the caller from data it has already loaded. They
//! never fail to construct and carry no persistent state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Kinds of resources the engine decides on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Song,
    Episode,
    Album,
    Artist,
    Podcast,
    RadioStation,
    User,
    Genre,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Song => "song",
            ResourceKind::Episode => "episode",
            ResourceKind::Album => "album",
            ResourceKind::Artist => "artist",
            ResourceKind::Podcast => "podcast",
            ResourceKind::RadioStation => "radio_station",
            ResourceKind::User => "user",
            ResourceKind::Genre => "genre",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upload provenance. `Unset` marks legacy content that predates provenance
/// tracking and is never the same thing as "uploaded by the owner".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Uploader {
    #[default]
    Unset,
    User(u64),
}

impl Uploader {
    #[inline]
    pub fn is(self, id: u64) -> bool {
        self == Uploader::User(id)
    }

    #[inline]
    pub fn id(self) -> Option<u64> {
        match self {
            Uploader::Unset => None,
            Uploader::User(id) => Some(id),
        }
    }
}

impl From<Option<u64>> for Uploader {
    fn from(id: Option<u64>) -> Self {
        id.map_or(Uploader::Unset, Uploader::User)
    }
}

/// A user reference with the organization it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRef {
    pub id: u64,
    pub organization_id: u64,
}

impl UserRef {
    pub fn new(id: u64, organization_id: u64) -> Self {
        UserRef { id, organization_id }
    }
}

/// Parent podcast fields joined onto an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodcastLink {
    pub id: u64,
    pub added_by: Option<UserRef>,
    pub is_public: bool,
}

/// A song or, when `podcast` is set, a podcast episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongDescriptor {
    pub id: u64,
    pub owner: UserRef,
    pub uploaded_by: Uploader,
    /// Explicit co-owner artist
    pub artist_user: Option<u64>,
    pub is_public: bool,
    pub podcast: Option<PodcastLink>,
}

impl SongDescriptor {
    pub fn new(id: u64, owner: UserRef) -> Self {
        SongDescriptor {
            id,
            owner,
            uploaded_by: Uploader::Unset,
            artist_user: None,
            is_public: false,
            podcast: None,
        }
    }

    pub fn uploaded_by(mut self, uploader: u64) -> Self {
        self.uploaded_by = Uploader::User(uploader);
        self
    }

    pub fn co_owned_by(mut self, artist_user: u64) -> Self {
        self.artist_user = Some(artist_user);
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    pub fn in_podcast(mut self, podcast: PodcastLink) -> Self {
        self.podcast = Some(podcast);
        self
    }

    #[inline]
    pub fn is_episode(&self) -> bool {
        self.podcast.is_some()
    }

    pub fn kind(&self) -> ResourceKind {
        if self.is_episode() {
            ResourceKind::Episode
        } else {
            ResourceKind::Song
        }
    }

    /// Ownership and provenance of this song, as seen from its album or artist
    pub fn provenance(&self) -> Provenance {
        Provenance { owner_id: self.owner.id, uploaded_by: self.uploaded_by }
    }
}

/// System placeholder entities that are never editable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placeholder {
    Unknown,
    Various,
}

/// Owner and uploader of one song belonging to an album or artist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub owner_id: u64,
    pub uploaded_by: Uploader,
}

/// Album or Artist. Ownership flows through the user linked to the artist.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogDescriptor {
    pub id: u64,
    pub owner: Option<u64>,
    pub placeholder: Option<Placeholder>,
    pub songs: Vec<Provenance>,
}

impl CatalogDescriptor {
    pub fn new(id: u64, owner: Option<u64>) -> Self {
        CatalogDescriptor { id, owner, ..Default::default() }
    }

    pub fn placeholder(mut self, placeholder: Placeholder) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn with_songs<'a>(mut self, songs: impl IntoIterator<Item = &'a SongDescriptor>) -> Self {
        self.songs.extend(songs.into_iter().map(SongDescriptor::provenance));
        self
    }

    #[inline]
    pub fn owned_by(&self, user: u64) -> bool {
        self.owner == Some(user)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodcastDescriptor {
    pub id: u64,
    pub added_by: Option<UserRef>,
    pub is_public: bool,
}

impl PodcastDescriptor {
    pub fn link(&self) -> PodcastLink {
        PodcastLink { id: self.id, added_by: self.added_by, is_public: self.is_public }
    }

    #[inline]
    pub fn added_by_id(&self) -> Option<u64> {
        self.added_by.map(|u| u.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioStationDescriptor {
    pub id: u64,
    pub owner: UserRef,
    pub uploaded_by: Uploader,
    pub is_public: bool,
}

/// A user as the target of a management action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDescriptor {
    pub id: u64,
    pub role: Role,
    pub organization_id: u64,
    pub verified: bool,
    /// Pending invitation, not yet accepted
    pub is_prospect: bool,
}

/// A genre and the songs associated with it
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenreDescriptor {
    pub id: u64,
    pub songs: Vec<SongDescriptor>,
}

/// A resource handed to [`crate::Gate::decide`]
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Song(&'a SongDescriptor),
    Album(&'a CatalogDescriptor),
    Artist(&'a CatalogDescriptor),
    Podcast(&'a PodcastDescriptor),
    RadioStation(&'a RadioStationDescriptor),
    /// The user collection, for class-level actions (`manage`, `upload`)
    Users,
    User(&'a UserDescriptor),
    Genre(&'a GenreDescriptor),
}

impl Resource<'_> {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Song(s) => s.kind(),
            Resource::Album(_) => ResourceKind::Album,
            Resource::Artist(_) => ResourceKind::Artist,
            Resource::Podcast(_) => ResourceKind::Podcast,
            Resource::RadioStation(_) => ResourceKind::RadioStation,
            Resource::Users | Resource::User(_) => ResourceKind::User,
            Resource::Genre(_) => ResourceKind::Genre,
        }
    }
}
