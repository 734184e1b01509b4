//! Project-specific utilities live here.

use uuid::Uuid;

/// Generate a new opaque record identifier (random 128-bit UUID, hyphenated form).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Whether `candidate` parses as a UUID. Never panics.
pub fn is_valid_id(candidate: &str) -> bool {
    Uuid::parse_str(candidate).is_ok()
}
