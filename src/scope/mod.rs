//! Collection scoping: the set-decision form of the access rules
//!
//! A [`Scope`] wraps a [`Predicate`] tree built from a subject. The same tree is
//! evaluated in memory against descriptors (point decisions use this) and
//! rendered to a parameterized SQL filter for the storage layer, so a listing
//! and a single `access` check can never disagree.

mod sql;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::delegation;
use crate::directory::Directory;
use crate::error::{AccessError, Result};
use crate::resource::{GenreDescriptor, PodcastDescriptor, ResourceKind, SongDescriptor, Uploader};
use crate::role::Role;
use crate::subject::AccessSubject;

pub use sql::SqlFilter;

/// Storage fields the rules read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    SongOwner,
    SongUploadedBy,
    SongArtistUser,
    SongPublic,
    SongPodcast,
    /// Adder of the podcast (the parent podcast when scoping songs)
    PodcastAddedBy,
    PodcastPublic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Null,
    Id(u64),
    Bool(bool),
}

impl Value {
    #[inline]
    pub fn id(self) -> Option<u64> {
        match self {
            Value::Id(id) => Some(id),
            _ => None,
        }
    }
}

impl From<Option<u64>> for Value {
    fn from(id: Option<u64>) -> Self {
        id.map_or(Value::Null, Value::Id)
    }
}

/// A filter over one collection. Comparisons follow SQL: NULL never matches
/// `=` or `<>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    All,
    Nothing,
    Eq(Column, Value),
    Ne(Column, Value),
    IsNull(Column),
    NotNull(Column),
    In(Column, BTreeSet<u64>),
    /// The user referenced by `user` belongs to `organization_id`
    SameOrganization { user: Column, organization_id: u64 },
    /// `manager` may edit the row through delegation from its owner
    Delegated { owner: Column, uploaded_by: Column, manager: u64, managed: BTreeSet<u64> },
    /// At least one associated song satisfies the inner predicate
    AnySong(Box<Predicate>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Conjunction with constant folding
    pub fn and(parts: impl IntoIterator<Item = Predicate>) -> Predicate {
        let mut out = Vec::new();
        for p in parts {
            match p {
                Predicate::All => {}
                Predicate::Nothing => return Predicate::Nothing,
                p => out.push(p),
            }
        }
        match out.len() {
            0 => Predicate::All,
            1 => out.remove(0),
            _ => Predicate::And(out),
        }
    }

    /// Disjunction with constant folding
    pub fn or(parts: impl IntoIterator<Item = Predicate>) -> Predicate {
        let mut out = Vec::new();
        for p in parts {
            match p {
                Predicate::Nothing => {}
                Predicate::All => return Predicate::All,
                p => out.push(p),
            }
        }
        match out.len() {
            0 => Predicate::Nothing,
            1 => out.remove(0),
            _ => Predicate::Or(out),
        }
    }

    /// Evaluate against one loaded row
    pub fn includes<R: Row + ?Sized, D: Directory + ?Sized>(&self, row: &R, directory: &D) -> Result<bool> {
        Ok(match self {
            Predicate::All => true,
            Predicate::Nothing => false,
            Predicate::Eq(c, v) => *v != Value::Null && row.value(*c) == *v,
            Predicate::Ne(c, v) => {
                let actual = row.value(*c);
                *v != Value::Null && actual != Value::Null && actual != *v
            }
            Predicate::IsNull(c) => row.value(*c) == Value::Null,
            Predicate::NotNull(c) => row.value(*c) != Value::Null,
            Predicate::In(c, ids) => row.value(*c).id().is_some_and(|id| ids.contains(&id)),
            Predicate::SameOrganization { user, organization_id } => row.organization(*user) == Some(*organization_id),
            Predicate::Delegated { owner, uploaded_by, manager, managed } => match row.value(*owner).id() {
                Some(artist) => {
                    let uploader = Uploader::from(row.value(*uploaded_by).id());
                    delegation::resolve(directory, *manager, managed, artist, uploader)?
                }
                None => false,
            },
            Predicate::AnySong(inner) => {
                for song in row.songs() {
                    if inner.includes(song, directory)? {
                        return Ok(true);
                    }
                }
                false
            }
            Predicate::And(parts) => {
                for p in parts {
                    if !p.includes(row, directory)? {
                        return Ok(false);
                    }
                }
                true
            }
            Predicate::Or(parts) => {
                for p in parts {
                    if p.includes(row, directory)? {
                        return Ok(true);
                    }
                }
                false
            }
        })
    }

    fn references(&self, column: Column) -> bool {
        match self {
            Predicate::All | Predicate::Nothing => false,
            Predicate::Eq(c, _) | Predicate::Ne(c, _) | Predicate::IsNull(c) | Predicate::NotNull(c) | Predicate::In(c, _) => {
                *c == column
            }
            Predicate::SameOrganization { user, .. } => *user == column,
            Predicate::Delegated { owner, uploaded_by, .. } => *owner == column || *uploaded_by == column,
            Predicate::AnySong(inner) => inner.references(column),
            Predicate::And(parts) | Predicate::Or(parts) => parts.iter().any(|p| p.references(column)),
        }
    }
}

/// A loaded row the predicate can be evaluated against
pub trait Row {
    fn value(&self, column: Column) -> Value;

    /// Organization of the user referenced by `user`
    fn organization(&self, user: Column) -> Option<u64>;

    fn songs(&self) -> &[SongDescriptor] {
        &[]
    }
}

impl Row for SongDescriptor {
    fn value(&self, column: Column) -> Value {
        match column {
            Column::SongOwner => Value::Id(self.owner.id),
            Column::SongUploadedBy => self.uploaded_by.id().into(),
            Column::SongArtistUser => self.artist_user.into(),
            Column::SongPublic => Value::Bool(self.is_public),
            Column::SongPodcast => self.podcast.map(|p| p.id).into(),
            Column::PodcastAddedBy => self.podcast.and_then(|p| p.added_by).map(|u| u.id).into(),
            Column::PodcastPublic => self.podcast.map_or(Value::Null, |p| Value::Bool(p.is_public)),
        }
    }

    fn organization(&self, user: Column) -> Option<u64> {
        match user {
            Column::SongOwner => Some(self.owner.organization_id),
            Column::PodcastAddedBy => self.podcast.and_then(|p| p.added_by).map(|u| u.organization_id),
            _ => None,
        }
    }
}

impl Row for PodcastDescriptor {
    fn value(&self, column: Column) -> Value {
        match column {
            Column::PodcastAddedBy => self.added_by_id().into(),
            Column::PodcastPublic => Value::Bool(self.is_public),
            _ => Value::Null,
        }
    }

    fn organization(&self, user: Column) -> Option<u64> {
        match user {
            Column::PodcastAddedBy => self.added_by.map(|u| u.organization_id),
            _ => None,
        }
    }
}

impl Row for GenreDescriptor {
    fn value(&self, _column: Column) -> Value {
        Value::Null
    }

    fn organization(&self, _user: Column) -> Option<u64> {
        None
    }

    fn songs(&self) -> &[SongDescriptor] {
        &self.songs
    }
}

// ============================================================================
// Rule builders
// ============================================================================

/// Podcasts a Manager reaches through the artists they manage
fn managed_adders(subject: &AccessSubject) -> Predicate {
    if subject.is(Role::Manager) && !subject.managed_artist_ids.is_empty() {
        Predicate::In(Column::PodcastAddedBy, subject.managed_artist_ids.clone())
    } else {
        Predicate::Nothing
    }
}

/// Edit right on a podcast, excluding the elevated bypass
pub fn podcast_editable(subject: &AccessSubject) -> Predicate {
    Predicate::or([Predicate::Eq(Column::PodcastAddedBy, Value::Id(subject.id)), managed_adders(subject)])
}

/// Podcast visibility, excluding the elevated bypass
pub fn podcast_visible(subject: &AccessSubject) -> Predicate {
    Predicate::or([
        Predicate::and([
            Predicate::Eq(Column::PodcastPublic, Value::Bool(true)),
            Predicate::SameOrganization { user: Column::PodcastAddedBy, organization_id: subject.organization_id },
        ]),
        podcast_editable(subject),
    ])
}

/// Delegated edit right on songs owned by a managed artist
pub fn song_delegated(subject: &AccessSubject) -> Predicate {
    if subject.managed_artist_ids.is_empty() {
        return Predicate::Nothing;
    }
    Predicate::Delegated {
        owner: Column::SongOwner,
        uploaded_by: Column::SongUploadedBy,
        manager: subject.id,
        managed: subject.managed_artist_ids.clone(),
    }
}

/// Songs and episodes visible to the subject
pub fn songs(subject: &AccessSubject) -> Predicate {
    if subject.elevated() {
        return Predicate::All;
    }
    let me = Value::Id(subject.id);
    let shared = if subject.include_public_media {
        Predicate::and([
            Predicate::IsNull(Column::SongPodcast),
            Predicate::Eq(Column::SongPublic, Value::Bool(true)),
            Predicate::SameOrganization { user: Column::SongOwner, organization_id: subject.organization_id },
            Predicate::Ne(Column::SongOwner, me),
        ])
    } else {
        Predicate::Nothing
    };
    Predicate::or([
        Predicate::Eq(Column::SongOwner, me),
        Predicate::Eq(Column::SongArtistUser, me),
        Predicate::Eq(Column::SongUploadedBy, me),
        song_delegated(subject),
        Predicate::and([Predicate::NotNull(Column::SongPodcast), podcast_visible(subject)]),
        shared,
    ])
}

/// Podcasts visible to the subject
pub fn podcasts(subject: &AccessSubject) -> Predicate {
    if subject.elevated() {
        return Predicate::All;
    }
    podcast_visible(subject)
}

/// Genres with at least one visible song
pub fn genres(subject: &AccessSubject) -> Predicate {
    Predicate::AnySong(Box::new(songs(subject)))
}

/// A subject's view of one listable collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    kind: ResourceKind,
    predicate: Predicate,
}

impl Scope {
    /// Build the scope for a listable kind. Episodes are listed with songs.
    pub fn new(subject: &AccessSubject, kind: ResourceKind) -> Result<Self> {
        let (kind, predicate) = match kind {
            ResourceKind::Song | ResourceKind::Episode => (ResourceKind::Song, songs(subject)),
            ResourceKind::Podcast => (kind, podcasts(subject)),
            ResourceKind::Genre => (kind, genres(subject)),
            other => return Err(AccessError::invalid_action(other, "list")),
        };
        Ok(Scope { kind, predicate })
    }

    #[inline]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    #[inline]
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// True when no row is filtered out
    pub fn is_unrestricted(&self) -> bool {
        self.predicate == Predicate::All
    }

    /// Whether a loaded row of this scope's kind is part of the collection
    pub fn includes<R: Row + ?Sized, D: Directory + ?Sized>(&self, row: &R, directory: &D) -> Result<bool> {
        self.predicate.includes(row, directory)
    }

    /// Render as a parameterized filter for the storage query builder
    pub fn to_sql(&self) -> SqlFilter {
        sql::render(self.kind, &self.predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryDirectory;
    use crate::resource::{PodcastLink, UserRef};

    #[test]
    fn constant_folding() {
        let eq = Predicate::Eq(Column::SongOwner, Value::Id(1));
        assert_eq!(Predicate::and([Predicate::All, eq.clone()]), eq);
        assert_eq!(Predicate::and([Predicate::Nothing, eq.clone()]), Predicate::Nothing);
        assert_eq!(Predicate::or([Predicate::Nothing, eq.clone()]), eq);
        assert_eq!(Predicate::or([Predicate::All, eq.clone()]), Predicate::All);
        assert_eq!(Predicate::or(Vec::new()), Predicate::Nothing);
        assert_eq!(Predicate::and(Vec::new()), Predicate::All);
    }

    #[test]
    fn null_never_compares_equal_or_unequal() {
        let dir = MemoryDirectory::new();
        let song = SongDescriptor::new(1, UserRef::new(2, 1));
        assert!(!Predicate::Eq(Column::SongUploadedBy, Value::Id(2)).includes(&song, &dir).unwrap());
        assert!(!Predicate::Ne(Column::SongUploadedBy, Value::Id(2)).includes(&song, &dir).unwrap());
        assert!(Predicate::IsNull(Column::SongUploadedBy).includes(&song, &dir).unwrap());
    }

    #[test]
    fn episodes_follow_their_podcast() {
        let dir = MemoryDirectory::new();
        let viewer = AccessSubject::new(9, Role::User, 1);
        let podcast = PodcastLink { id: 4, added_by: Some(UserRef::new(3, 1)), is_public: true };
        let episode = SongDescriptor::new(1, UserRef::new(3, 1)).in_podcast(podcast);
        assert!(songs(&viewer).includes(&episode, &dir).unwrap());

        let private = episode.clone().in_podcast(PodcastLink { is_public: false, ..podcast });
        assert!(!songs(&viewer).includes(&private, &dir).unwrap());

        // A public song flag does not expose an episode of a private podcast
        assert!(!songs(&viewer).includes(&private.public(true), &dir).unwrap());
    }

    #[test]
    fn preference_gates_shared_songs() {
        let dir = MemoryDirectory::new();
        let song = SongDescriptor::new(1, UserRef::new(3, 1)).public(true);
        let viewer = AccessSubject::new(9, Role::User, 1);
        assert!(songs(&viewer).includes(&song, &dir).unwrap());
        let hidden = viewer.include_public_media(false);
        assert!(!songs(&hidden).includes(&song, &dir).unwrap());
    }

    #[test]
    fn elevated_subjects_are_unrestricted_except_for_empty_genres() {
        let dir = MemoryDirectory::new();
        let admin = AccessSubject::new(1, Role::Admin, 1);
        assert!(Scope::new(&admin, ResourceKind::Song).unwrap().is_unrestricted());
        assert!(Scope::new(&admin, ResourceKind::Podcast).unwrap().is_unrestricted());
        let genres = Scope::new(&admin, ResourceKind::Genre).unwrap();
        assert!(!genres.includes(&GenreDescriptor { id: 1, songs: vec![] }, &dir).unwrap());
    }

    #[test]
    fn unlisted_kinds_have_no_scope() {
        let s = AccessSubject::new(1, Role::User, 1);
        assert!(matches!(
            Scope::new(&s, ResourceKind::RadioStation),
            Err(AccessError::InvalidAction { kind: ResourceKind::RadioStation, .. })
        ));
    }
}
