//! Delegation resolver: may a manager act on a managed artist's content?
//!
//! A sole manager may edit everything the artist owns. Once an artist has two
//! or more managers, each of them is limited to what they uploaded themselves
//! and what the artist uploaded. Content without provenance stays editable.

use std::collections::BTreeSet;

use tracing::trace;

use crate::directory::Directory;
use crate::error::Result;
use crate::resource::Uploader;
use crate::subject::AccessSubject;

/// Check whether `subject` may edit content owned by `artist` and uploaded by
/// `uploaded_by`. The manager count is read from the directory on every call.
pub fn can_edit_artist_content<D: Directory + ?Sized>(
    directory: &D,
    subject: &AccessSubject,
    artist: u64,
    uploaded_by: Uploader,
) -> Result<bool> {
    resolve(directory, subject.id, &subject.managed_artist_ids, artist, uploaded_by)
}

/// The resolver over the raw fields it needs. Shared with the collection
/// predicate so both shapes evaluate the same rule.
pub(crate) fn resolve<D: Directory + ?Sized>(
    directory: &D,
    manager: u64,
    managed: &BTreeSet<u64>,
    artist: u64,
    uploaded_by: Uploader,
) -> Result<bool> {
    if !managed.contains(&artist) {
        return Ok(false);
    }
    let uploader = match uploaded_by {
        Uploader::Unset => return Ok(true),
        Uploader::User(id) => id,
    };
    if uploader == manager || uploader == artist {
        return Ok(true);
    }
    let count = directory.manager_count(artist)?;
    trace!(manager, artist, uploader, count, "sole manager check");
    Ok(count == 1)
}
