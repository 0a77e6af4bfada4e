//! Permission bits, role grants and fixed identifiers

// Permission bit constants
pub const MANAGE_SETTINGS: u64 = 1;
pub const MANAGE_ALL_USERS: u64 = 1 << 1;
pub const MANAGE_ORG_USERS: u64 = 1 << 2;
pub const MANAGE_ARTISTS: u64 = 1 << 3;
pub const UPLOAD_CONTENT: u64 = 1 << 4;
pub const PUBLISH_CONTENT: u64 = 1 << 5;

pub const ALL_PERMISSIONS: u64 = MANAGE_SETTINGS
    | MANAGE_ALL_USERS
    | MANAGE_ORG_USERS
    | MANAGE_ARTISTS
    | UPLOAD_CONTENT
    | PUBLISH_CONTENT;

// Static grants per role. Level alone never implies a bit.
pub const ADMIN_GRANTS: u64 = ALL_PERMISSIONS;
pub const MODERATOR_GRANTS: u64 = MANAGE_ORG_USERS | UPLOAD_CONTENT | PUBLISH_CONTENT;
pub const MANAGER_GRANTS: u64 = MANAGE_ARTISTS | UPLOAD_CONTENT;
pub const ARTIST_GRANTS: u64 = UPLOAD_CONTENT;
pub const USER_GRANTS: u64 = 0;

// Role levels
pub const ADMIN_LEVEL: u8 = 5;
pub const MODERATOR_LEVEL: u8 = 4;
pub const MANAGER_LEVEL: u8 = 3;
pub const ARTIST_LEVEL: u8 = 2;
pub const USER_LEVEL: u8 = 1;

/// Email domain reserved for anonymous sessions
pub const ANONYMOUS_DOMAIN: &str = "sin.email";

/// Join table holding the manager ↔ artist relation in the storage schema
pub const MANAGER_TABLE: &str = "manager_artist";

// Permission name mappings
const PERMISSIONS: &[(&str, u64)] = &[
    ("manage settings", MANAGE_SETTINGS),
    ("manage all users", MANAGE_ALL_USERS),
    ("manage org users", MANAGE_ORG_USERS),
    ("manage artists", MANAGE_ARTISTS),
    ("upload content", UPLOAD_CONTENT),
    ("publish content", PUBLISH_CONTENT),
];

/// Convert a permission mask to a list of permission names
pub fn permission_names(mask: u64) -> Vec<&'static str> {
    PERMISSIONS
        .iter()
        .filter(|(_, b)| mask & b == *b)
        .map(|(n, _)| *n)
        .collect()
}

/// Convert a list of permission names to a mask. Unknown names are ignored.
pub fn parse_permissions(names: &[&str]) -> u64 {
    names
        .iter()
        .filter_map(|n| PERMISSIONS.iter().find(|(k, _)| k == n).map(|(_, v)| v))
        .fold(0, |a, b| a | b)
}
