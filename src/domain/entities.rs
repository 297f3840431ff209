//! Domain entities mirrored from persistent storage.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Identifier value meaning "not assigned yet".
pub const UNSET_CAKE_ID: i64 = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CakeRecord {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub rating: f32,
    pub image: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
}

impl CakeRecord {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
