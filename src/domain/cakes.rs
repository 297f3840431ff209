//! Cake payload rules and lifecycle helpers.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::entities::CakeRecord;
use crate::domain::error::{Constraint, ValidationErrors};

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 60;
pub const DESCRIPTION_MIN_CHARS: usize = 3;
pub const RATING_MAX: f32 = 10.0;

/// Client supplied fields for both create and update.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CakeDraft {
    pub title: String,
    pub description: String,
    pub rating: f32,
    pub image: String,
}

impl CakeDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title_len = self.title.chars().count();
        if title_len < TITLE_MIN_CHARS {
            errors.push("title", Constraint::Min);
        } else if title_len > TITLE_MAX_CHARS {
            errors.push("title", Constraint::Max);
        }

        if self.description.chars().count() < DESCRIPTION_MIN_CHARS {
            errors.push("description", Constraint::Min);
        }

        if self.rating.is_nan() || self.rating <= 0.0 {
            errors.push("rating", Constraint::Gt);
        } else if self.rating > RATING_MAX {
            errors.push("rating", Constraint::Lte);
        }

        errors.into_result()
    }

    /// Build a fresh, not yet persisted record stamped with `now`.
    pub fn into_new_record(self, now: OffsetDateTime) -> CakeRecord {
        CakeRecord {
            id: crate::domain::entities::UNSET_CAKE_ID,
            title: self.title,
            description: self.description,
            rating: self.rating,
            image: self.image,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn apply_to(self, record: &mut CakeRecord, now: OffsetDateTime) {
        record.title = self.title;
        record.description = self.description;
        record.rating = self.rating;
        record.image = self.image;
        record.updated_at = now;
    }
}

/// Current UTC time truncated to the microsecond precision PostgreSQL keeps.
pub fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_microsecond(now.microsecond()).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> CakeDraft {
        CakeDraft {
            title: "Lemon cheesecake".to_string(),
            description: "A cheesecake made of lemon".to_string(),
            rating: 7.0,
            image: "https://img.example/lemon.jpg".to_string(),
        }
    }

    #[test]
    fn accepts_boundary_values() {
        let mut candidate = draft();
        candidate.title = "abc".to_string();
        candidate.description = "abc".to_string();
        candidate.rating = 10.0;
        assert!(candidate.validate().is_ok());

        candidate.title = "x".repeat(TITLE_MAX_CHARS);
        candidate.rating = f32::MIN_POSITIVE;
        assert!(candidate.validate().is_ok());
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        let mut candidate = draft();
        candidate.title = "ケーキ".to_string();
        assert!(candidate.validate().is_ok());

        candidate.title = "ケ".repeat(TITLE_MAX_CHARS + 1);
        let errors = candidate.validate().expect_err("title too long");
        assert_eq!(errors.constraint_for("title"), Some(Constraint::Max));
    }

    #[test]
    fn reports_every_offending_field() {
        let candidate = CakeDraft {
            title: "ab".to_string(),
            description: "".to_string(),
            rating: 0.0,
            image: String::new(),
        };

        let errors = candidate.validate().expect_err("invalid draft");
        assert_eq!(errors.violations().len(), 3);
        assert_eq!(errors.constraint_for("title"), Some(Constraint::Min));
        assert_eq!(errors.constraint_for("description"), Some(Constraint::Min));
        assert_eq!(errors.constraint_for("rating"), Some(Constraint::Gt));
        assert_eq!(errors.constraint_for("image"), None);
    }

    #[test]
    fn rating_bounds() {
        let mut candidate = draft();
        candidate.rating = 10.5;
        let errors = candidate.validate().expect_err("rating above max");
        assert_eq!(errors.constraint_for("rating"), Some(Constraint::Lte));

        candidate.rating = -1.0;
        let errors = candidate.validate().expect_err("negative rating");
        assert_eq!(errors.constraint_for("rating"), Some(Constraint::Gt));

        candidate.rating = f32::NAN;
        assert!(candidate.validate().is_err());
    }

    #[test]
    fn field_map_is_serialized_by_field_name() {
        let mut candidate = draft();
        candidate.title = "a".to_string();
        let errors = candidate.validate().expect_err("short title");

        let json = serde_json::to_value(&errors).expect("serialize");
        assert_eq!(json["title"], "Failed on the 'min' tag");
    }

    #[test]
    fn new_record_shares_creation_and_update_time() {
        let now = now_utc();
        let record = draft().into_new_record(now);
        assert_eq!(record.created_at, record.updated_at);
        assert_eq!(record.deleted_at, None);
        assert_eq!(record.id, crate::domain::entities::UNSET_CAKE_ID);
    }

    #[test]
    fn now_is_truncated_to_microseconds() {
        let now = now_utc();
        assert_eq!(now.nanosecond() % 1_000, 0);
    }
}
