use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::Testimonial;
use crate::{error::AppError, media::form::FormData};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub message: String,
    pub rating: i16,
    pub designation: Option<String>,
    pub position: i32,
    pub image_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Testimonial> for TestimonialResponse {
    fn from(t: Testimonial) -> Self {
        Self {
            id: t.id,
            user_id: t.owner_id,
            name: t.name,
            message: t.message,
            rating: t.rating,
            designation: t.designation,
            position: t.position,
            image_url: t.image.map(|m| m.url),
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TestimonialEnvelope {
    pub message: String,
    pub testimonial: TestimonialResponse,
}

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;
pub const DEFAULT_RATING: i16 = 5;

fn check_rating(rating: i16) -> Result<i16, AppError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(rating)
    } else {
        Err(AppError::validation(format!(
            "rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )))
    }
}

#[derive(Debug, Clone)]
pub struct TestimonialInput {
    pub user_id: Option<Uuid>,
    pub name: String,
    pub message: String,
    pub rating: i16,
    pub designation: Option<String>,
}

impl TestimonialInput {
    pub fn from_form(form: &FormData) -> Result<Self, AppError> {
        let rating = form.parsed::<i16>("rating")?.unwrap_or(DEFAULT_RATING);
        Ok(Self {
            user_id: form.uuid("userId")?,
            name: form.required("name")?,
            message: form.required("message")?,
            rating: check_rating(rating)?,
            designation: form.text("designation"),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct TestimonialPatch {
    pub name: Option<String>,
    pub message: Option<String>,
    pub rating: Option<i16>,
    pub designation: Option<String>,
}

impl TestimonialPatch {
    pub fn from_form(form: &FormData) -> Result<Self, AppError> {
        Ok(Self {
            name: form.text("name"),
            message: form.text("message"),
            rating: form.parsed::<i16>("rating")?.map(check_rating).transpose()?,
            designation: form.text("designation"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_defaults_to_five() {
        let form = FormData::from_pairs(&[("name", "Asha"), ("message", "Cleared JEE")]);
        let input = TestimonialInput::from_form(&form).unwrap();
        assert_eq!(input.rating, 5);
        assert_eq!(input.designation, None);
    }

    #[test]
    fn rating_out_of_range_is_rejected() {
        for bad in ["0", "6", "-1", "four"] {
            let form = FormData::from_pairs(&[("name", "A"), ("message", "m"), ("rating", bad)]);
            assert!(
                matches!(TestimonialInput::from_form(&form), Err(AppError::Validation(_))),
                "rating {bad} accepted"
            );
        }
        let patch = FormData::from_pairs(&[("rating", "9")]);
        assert!(TestimonialPatch::from_form(&patch).is_err());
    }

    #[test]
    fn message_is_required() {
        let form = FormData::from_pairs(&[("name", "A"), ("rating", "4")]);
        assert!(TestimonialInput::from_form(&form).is_err());
    }
}
