//! Custom types shared by entities and API responses

use chrono::{DateTime as ChronoDateTime, Utc};

/// Database DateTime type used across all Rulehub crates
///
/// This is the canonical datetime type for TIMESTAMPTZ columns.
pub type DBDateTime = ChronoDateTime<Utc>;

/// Standard UTC DateTime type used in API responses
///
/// Serializes as ISO 8601 with a 'Z' suffix. When used with utoipa, add
/// `#[schema(value_type = String, format = DateTime)]` to the field.
pub type UtcDateTime = ChronoDateTime<Utc>;
