//! Collection scopes executed as SQL against an in-memory SQLite catalog must
//! select exactly the rows the in-memory evaluation includes.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use mediagate::scope::{Row, Value};
use mediagate::{
    AccessSubject, Gate, GenreDescriptor, Identity, MemoryDirectory, PodcastDescriptor, ResourceKind, Role, Scope,
    Settings, SongDescriptor, UserRef,
};
use rusqlite::{params, params_from_iter, Connection};

const SCHEMA: &str = "
    CREATE TABLE users (id INTEGER PRIMARY KEY, organization_id INTEGER NOT NULL);
    CREATE TABLE podcasts (id INTEGER PRIMARY KEY, added_by INTEGER, is_public INTEGER NOT NULL);
    CREATE TABLE songs (
        id INTEGER PRIMARY KEY,
        owner_id INTEGER NOT NULL,
        uploaded_by_id INTEGER,
        artist_user_id INTEGER,
        is_public INTEGER NOT NULL,
        podcast_id INTEGER
    );
    CREATE TABLE genres (id INTEGER PRIMARY KEY);
    CREATE TABLE genre_song (genre_id INTEGER NOT NULL, song_id INTEGER NOT NULL);
    CREATE TABLE manager_artist (
        manager_id INTEGER NOT NULL,
        artist_id INTEGER NOT NULL,
        UNIQUE (manager_id, artist_id)
    );
    CREATE INDEX manager_artist_artist_id ON manager_artist (artist_id);
";

// ============================================================================
// Catalog
// ============================================================================

const ORG_A: u64 = 1;
const ORG_B: u64 = 2;

/// (id, role, organization)
const USERS: &[(u64, Role, u64)] = &[
    (1, Role::Admin, ORG_A),
    (2, Role::Moderator, ORG_A),
    (10, Role::Manager, ORG_A),
    (11, Role::Manager, ORG_A),
    (12, Role::Manager, ORG_B),
    (13, Role::Manager, ORG_A),
    (20, Role::Artist, ORG_A),
    (21, Role::Artist, ORG_A),
    (22, Role::Artist, ORG_B),
    (23, Role::Artist, ORG_A),
    (30, Role::User, ORG_A),
    (31, Role::User, ORG_B),
];

/// (manager, artist)
const LINKS: &[(u64, u64)] = &[(10, 20), (11, 20), (10, 21), (12, 22)];

struct Catalog {
    directory: MemoryDirectory,
    songs: Vec<SongDescriptor>,
    podcasts: Vec<PodcastDescriptor>,
    genres: Vec<GenreDescriptor>,
}

fn user(id: u64) -> UserRef {
    let org = USERS.iter().find(|(u, _, _)| *u == id).map_or(ORG_A, |(_, _, org)| *org);
    UserRef::new(id, org)
}

fn catalog() -> Catalog {
    let mut directory = MemoryDirectory::new();
    for &(id, role, org) in USERS {
        directory.insert(Identity::new(id, format!("u{id}@label.test"), org, role).verified(id == 12));
    }
    for &(m, a) in LINKS {
        directory.link(m, a);
    }

    let podcast = |id, added_by: Option<u64>, is_public| PodcastDescriptor { id, added_by: added_by.map(user), is_public };
    let podcasts = vec![
        podcast(1, Some(21), true),
        podcast(2, Some(20), false),
        podcast(3, Some(31), true),
        podcast(4, None, true),
        podcast(5, Some(22), false),
    ];
    let link = |id: u64| podcasts[id as usize - 1].link();

    let songs = vec![
        SongDescriptor::new(100, user(20)).uploaded_by(10),
        SongDescriptor::new(101, user(20)).uploaded_by(11),
        SongDescriptor::new(102, user(20)).uploaded_by(20),
        // Legacy upload without an uploader
        SongDescriptor::new(103, user(20)).public(true),
        SongDescriptor::new(104, user(21)).uploaded_by(30),
        SongDescriptor::new(105, user(20)).uploaded_by(30),
        SongDescriptor::new(106, user(23)).uploaded_by(23).co_owned_by(30),
        SongDescriptor::new(107, user(22)).uploaded_by(12).public(true),
        SongDescriptor::new(108, user(23)).uploaded_by(23).public(true),
        SongDescriptor::new(109, user(21)).in_podcast(link(1)),
        SongDescriptor::new(110, user(20)).uploaded_by(20).in_podcast(link(2)),
        SongDescriptor::new(111, user(31)).public(true).in_podcast(link(3)),
        SongDescriptor::new(112, user(23)).public(true).in_podcast(link(4)),
        SongDescriptor::new(113, user(22)).uploaded_by(12).in_podcast(link(5)),
        SongDescriptor::new(114, user(13)).uploaded_by(13).public(true),
    ];

    let by_id: BTreeMap<u64, &SongDescriptor> = songs.iter().map(|s| (s.id, s)).collect();
    let genre = |id, members: &[u64]| GenreDescriptor {
        id,
        songs: members.iter().map(|m| by_id[m].clone()).collect(),
    };
    let genres = vec![
        genre(1, &[100, 101]),
        genre(2, &[108]),
        genre(3, &[111, 112]),
        genre(4, &[113]),
        genre(5, &[]),
        genre(6, &[106, 107]),
        genre(7, &[104, 105]),
    ];

    Catalog { directory, songs, podcasts, genres }
}

fn bool_int(b: bool) -> i64 {
    i64::from(b)
}

fn open(c: &Catalog) -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    for &(id, _, org) in USERS {
        conn.execute("INSERT INTO users (id, organization_id) VALUES (?1, ?2)", params![id as i64, org as i64])
            .unwrap();
    }
    for &(m, a) in LINKS {
        conn.execute("INSERT INTO manager_artist (manager_id, artist_id) VALUES (?1, ?2)", params![m as i64, a as i64])
            .unwrap();
    }
    for p in &c.podcasts {
        conn.execute(
            "INSERT INTO podcasts (id, added_by, is_public) VALUES (?1, ?2, ?3)",
            params![p.id as i64, p.added_by_id().map(|u| u as i64), bool_int(p.is_public)],
        )
        .unwrap();
    }
    for s in &c.songs {
        conn.execute(
            "INSERT INTO songs (id, owner_id, uploaded_by_id, artist_user_id, is_public, podcast_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                s.id as i64,
                s.owner.id as i64,
                s.uploaded_by.id().map(|u| u as i64),
                s.artist_user.map(|u| u as i64),
                bool_int(s.is_public),
                s.podcast.map(|p| p.id as i64),
            ],
        )
        .unwrap();
    }
    for g in &c.genres {
        conn.execute("INSERT INTO genres (id) VALUES (?1)", params![g.id as i64]).unwrap();
        for s in &g.songs {
            conn.execute("INSERT INTO genre_song (genre_id, song_id) VALUES (?1, ?2)", params![g.id as i64, s.id as i64])
                .unwrap();
        }
    }
    conn
}

// ============================================================================
// Execution
// ============================================================================

fn bind(params: &[Value]) -> Vec<rusqlite::types::Value> {
    params
        .iter()
        .map(|v| match *v {
            Value::Null => rusqlite::types::Value::Null,
            Value::Id(id) => rusqlite::types::Value::Integer(id as i64),
            Value::Bool(b) => rusqlite::types::Value::Integer(bool_int(b)),
        })
        .collect()
}

fn table(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Song => "songs",
        ResourceKind::Podcast => "podcasts",
        ResourceKind::Genre => "genres",
        other => panic!("{other} is not listable"),
    }
}

fn selected(conn: &Connection, scope: &Scope) -> BTreeSet<u64> {
    let filter = scope.to_sql();
    let table = table(scope.kind());
    let sql = format!("SELECT {table}.id FROM {table} {} WHERE {}", filter.joins.join(" "), filter.clause);
    let mut stmt = conn.prepare(&sql).unwrap_or_else(|e| panic!("{e}: {sql}"));
    let rows = stmt.query_map(params_from_iter(bind(&filter.params)), |r| r.get::<_, i64>(0)).unwrap();
    rows.map(|id| id.unwrap() as u64).collect()
}

fn included<R: Row>(c: &Catalog, scope: &Scope, rows: &[R], id: impl Fn(&R) -> u64) -> BTreeSet<u64> {
    rows.iter().filter(|r| scope.includes(*r, &c.directory).unwrap()).map(id).collect()
}

/// Every listable kind, selected both ways, for one subject
fn assert_agrees(c: &Catalog, conn: &Connection, s: &AccessSubject) -> HashMap<ResourceKind, BTreeSet<u64>> {
    let mut out = HashMap::new();
    for kind in [ResourceKind::Song, ResourceKind::Podcast, ResourceKind::Genre] {
        let scope = Scope::new(s, kind).unwrap();
        let expected = match kind {
            ResourceKind::Song => included(c, &scope, &c.songs, |r| r.id),
            ResourceKind::Podcast => included(c, &scope, &c.podcasts, |r| r.id),
            _ => included(c, &scope, &c.genres, |r| r.id),
        };
        assert_eq!(selected(conn, &scope), expected, "{kind} for user {} ({})", s.id, s.role);
        out.insert(kind, expected);
    }
    out
}

fn subjects(c: &Catalog) -> Vec<AccessSubject> {
    let gate = Gate::new(c.directory.clone(), Settings::default());
    let mut out: Vec<AccessSubject> = USERS.iter().map(|(id, _, _)| gate.build_subject(*id).unwrap()).collect();
    let private: Vec<AccessSubject> = out.iter().map(|s| s.clone().include_public_media(false)).collect();
    out.extend(private);
    out
}

// ============================================================================
// Agreement
// ============================================================================

#[test]
fn sql_selects_what_memory_includes_for_every_role() {
    let c = catalog();
    let conn = open(&c);
    for s in subjects(&c) {
        assert_agrees(&c, &conn, &s);
    }
}

#[test]
fn elevated_roles_see_every_row() {
    let c = catalog();
    let conn = open(&c);
    for id in [1, 2] {
        let gate = Gate::new(c.directory.clone(), Settings::default());
        let seen = assert_agrees(&c, &conn, &gate.build_subject(id).unwrap());
        assert_eq!(seen[&ResourceKind::Song].len(), c.songs.len());
        assert_eq!(seen[&ResourceKind::Podcast].len(), c.podcasts.len());
        // A genre is reached through its songs, so empty genres stay hidden
        let stocked = c.genres.iter().filter(|g| !g.songs.is_empty()).count();
        assert_eq!(seen[&ResourceKind::Genre].len(), stocked);
    }
}

#[test]
fn shared_artist_content_is_siloed_between_managers() {
    let c = catalog();
    let conn = open(&c);
    let gate = Gate::new(c.directory.clone(), Settings::default());

    let m1 = assert_agrees(&c, &conn, &gate.build_subject(10).unwrap());
    let songs = &m1[&ResourceKind::Song];
    assert!(songs.contains(&100));
    assert!(!songs.contains(&101));
    // Sole manager of the owner
    assert!(songs.contains(&104));
    assert!(!songs.contains(&105));
    // Legacy upload
    assert!(songs.contains(&103));

    let m2 = assert_agrees(&c, &conn, &gate.build_subject(11).unwrap());
    let songs = &m2[&ResourceKind::Song];
    assert!(songs.contains(&101));
    assert!(!songs.contains(&100));
    assert!(m2[&ResourceKind::Genre].contains(&1));
    assert!(!m2[&ResourceKind::Genre].contains(&5));
}

#[test]
fn removing_a_shared_link_widens_the_remaining_manager() {
    let mut c = catalog();
    c.directory.unlink(11, 20);
    let conn = open(&c);
    conn.execute("DELETE FROM manager_artist WHERE manager_id = 11 AND artist_id = 20", []).unwrap();

    let gate = Gate::new(c.directory.clone(), Settings::default());
    let m1 = assert_agrees(&c, &conn, &gate.build_subject(10).unwrap());
    assert!(m1[&ResourceKind::Song].contains(&101));
    assert!(m1[&ResourceKind::Song].contains(&105));
}

#[test]
fn podcasts_follow_organization_and_managed_adders() {
    let c = catalog();
    let conn = open(&c);
    let gate = Gate::new(c.directory.clone(), Settings::default());

    let m1 = assert_agrees(&c, &conn, &gate.build_subject(10).unwrap());
    // Public in the organization, plus the private one added by a managed artist
    assert_eq!(m1[&ResourceKind::Podcast], BTreeSet::from([1, 2]));

    let outsider = assert_agrees(&c, &conn, &gate.build_subject(31).unwrap());
    assert_eq!(outsider[&ResourceKind::Podcast], BTreeSet::from([3]));
}

#[test]
fn opting_out_of_public_media_hides_shared_songs() {
    let c = catalog();
    let conn = open(&c);
    let gate = Gate::new(c.directory.clone(), Settings::default());
    let listener = gate.build_subject(30).unwrap();

    let with = assert_agrees(&c, &conn, &listener);
    let without = assert_agrees(&c, &conn, &listener.clone().include_public_media(false));
    assert!(with[&ResourceKind::Song].contains(&108));
    assert!(!without[&ResourceKind::Song].contains(&108));
    // Co-owned songs stay visible
    assert!(without[&ResourceKind::Song].contains(&106));
}
