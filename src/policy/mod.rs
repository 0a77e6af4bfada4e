//! Decision procedures, one module per resource kind
//!
//! Every procedure is a pure function of the subject, the descriptor and the
//! action. The only outside read is the manager count the delegation resolver
//! asks the directory for.

pub mod catalog;
pub mod genre;
pub mod podcast;
pub mod radio;
pub mod song;
pub mod user;

use serde::{Deserialize, Serialize};

use crate::directory::Directory;
use crate::error::Result;
use crate::resource::{Resource, ResourceKind};
use crate::subject::AccessSubject;

pub use catalog::CatalogAction;
pub use genre::GenreAction;
pub use podcast::PodcastAction;
pub use radio::RadioAction;
pub use song::SongAction;
pub use user::UserAction;

/// Outcome of a point decision. Deny is an ordinary value, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    #[inline]
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }

    #[inline]
    pub fn is_denied(self) -> bool {
        self == Decision::Deny
    }
}

impl From<bool> for Decision {
    #[inline]
    fn from(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// Dispatch an action, given by name, to the procedure for the resource's kind
pub fn decide<D: Directory + ?Sized>(
    directory: &D,
    subject: &AccessSubject,
    resource: Resource<'_>,
    action: &str,
) -> Result<Decision> {
    match resource {
        Resource::Song(s) => song::decide(directory, subject, s, SongAction::parse(s.kind(), action)?),
        Resource::Album(a) => catalog::decide(directory, subject, a, CatalogAction::parse(ResourceKind::Album, action)?),
        Resource::Artist(a) => catalog::decide(directory, subject, a, CatalogAction::parse(ResourceKind::Artist, action)?),
        Resource::Podcast(p) => podcast::decide(directory, subject, p, PodcastAction::parse(action)?),
        Resource::RadioStation(r) => radio::decide(directory, subject, r, RadioAction::parse(action)?),
        Resource::Users => user::decide_collection(subject, UserAction::parse(action)?),
        Resource::User(t) => Ok(user::decide(subject, t, UserAction::parse(action)?)),
        Resource::Genre(g) => genre::decide(directory, subject, g, GenreAction::parse(action)?),
    }
}
