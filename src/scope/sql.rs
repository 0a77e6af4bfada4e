//! SQL rendering of collection predicates
//!
//! Output is a WHERE fragment with `?` placeholders, the bound values in order,
//! and the joins the fragment expects on the base query.

use crate::constants::MANAGER_TABLE;
use crate::resource::ResourceKind;

use super::{Column, Predicate, Value};

const PODCAST_JOIN: &str = "LEFT JOIN podcasts AS podcasts_a11y ON songs.podcast_id = podcasts_a11y.id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFilter {
    pub joins: Vec<String>,
    pub clause: String,
    pub params: Vec<Value>,
}

/// Table the podcast columns resolve against
#[derive(Clone, Copy)]
enum PodcastTable {
    Joined,
    Base,
}

impl Column {
    fn sql(self, podcasts: PodcastTable) -> &'static str {
        match (self, podcasts) {
            (Column::SongOwner, _) => "songs.owner_id",
            (Column::SongUploadedBy, _) => "songs.uploaded_by_id",
            (Column::SongArtistUser, _) => "songs.artist_user_id",
            (Column::SongPublic, _) => "songs.is_public",
            (Column::SongPodcast, _) => "songs.podcast_id",
            (Column::PodcastAddedBy, PodcastTable::Joined) => "podcasts_a11y.added_by",
            (Column::PodcastPublic, PodcastTable::Joined) => "podcasts_a11y.is_public",
            (Column::PodcastAddedBy, PodcastTable::Base) => "podcasts.added_by",
            (Column::PodcastPublic, PodcastTable::Base) => "podcasts.is_public",
        }
    }
}

struct Writer {
    podcasts: PodcastTable,
    params: Vec<Value>,
}

impl Writer {
    fn placeholders(&mut self, ids: impl IntoIterator<Item = u64>) -> String {
        let marks: Vec<&str> = ids
            .into_iter()
            .map(|id| {
                self.params.push(Value::Id(id));
                "?"
            })
            .collect();
        marks.join(", ")
    }

    fn write(&mut self, p: &Predicate) -> String {
        match p {
            Predicate::All => "TRUE".into(),
            Predicate::Nothing => "FALSE".into(),
            Predicate::Eq(c, v) => {
                self.params.push(*v);
                format!("{} = ?", c.sql(self.podcasts))
            }
            Predicate::Ne(c, v) => {
                self.params.push(*v);
                format!("{} <> ?", c.sql(self.podcasts))
            }
            Predicate::IsNull(c) => format!("{} IS NULL", c.sql(self.podcasts)),
            Predicate::NotNull(c) => format!("{} IS NOT NULL", c.sql(self.podcasts)),
            Predicate::In(_, ids) if ids.is_empty() => "FALSE".into(),
            Predicate::In(c, ids) => {
                let marks = self.placeholders(ids.iter().copied());
                format!("{} IN ({})", c.sql(self.podcasts), marks)
            }
            Predicate::SameOrganization { user, organization_id } => {
                self.params.push(Value::Id(*organization_id));
                format!(
                    "EXISTS (SELECT 1 FROM users WHERE users.id = {} AND users.organization_id = ?)",
                    user.sql(self.podcasts)
                )
            }
            Predicate::Delegated { managed, .. } if managed.is_empty() => "FALSE".into(),
            Predicate::Delegated { owner, uploaded_by, manager, managed } => {
                let owner = owner.sql(self.podcasts);
                let up = uploaded_by.sql(self.podcasts);
                let marks = self.placeholders(managed.iter().copied());
                self.params.push(Value::Id(*manager));
                format!(
                    "({owner} IN ({marks}) AND ({up} IS NULL OR {up} = ? OR {up} = {owner} OR \
                     (SELECT COUNT(*) FROM {MANAGER_TABLE} WHERE {MANAGER_TABLE}.artist_id = {owner}) = 1))"
                )
            }
            Predicate::AnySong(inner) => {
                let outer = std::mem::replace(&mut self.podcasts, PodcastTable::Joined);
                let inner = self.write(inner);
                self.podcasts = outer;
                format!(
                    "EXISTS (SELECT 1 FROM genre_song INNER JOIN songs ON songs.id = genre_song.song_id {PODCAST_JOIN} \
                     WHERE genre_song.genre_id = genres.id AND {inner})"
                )
            }
            Predicate::And(parts) => self.join(parts, " AND "),
            Predicate::Or(parts) => self.join(parts, " OR "),
        }
    }

    fn join(&mut self, parts: &[Predicate], sep: &str) -> String {
        let rendered: Vec<String> = parts.iter().map(|p| self.write(p)).collect();
        format!("({})", rendered.join(sep))
    }
}

pub(super) fn render(kind: ResourceKind, predicate: &Predicate) -> SqlFilter {
    let podcasts = match kind {
        ResourceKind::Podcast => PodcastTable::Base,
        _ => PodcastTable::Joined,
    };
    let mut w = Writer { podcasts, params: Vec::new() };
    let clause = w.write(predicate);
    let needs_join = kind == ResourceKind::Song
        && (predicate.references(Column::PodcastAddedBy) || predicate.references(Column::PodcastPublic));
    SqlFilter {
        joins: if needs_join { vec![PODCAST_JOIN.to_string()] } else { Vec::new() },
        clause,
        params: w.params,
    }
}
