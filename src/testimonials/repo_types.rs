use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::media::StoredMedia;

#[derive(Debug, Clone)]
pub struct Testimonial {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub message: String,
    pub rating: i16,
    pub designation: Option<String>,
    pub position: i32,
    pub image: Option<StoredMedia>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct TestimonialRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub message: String,
    pub rating: i16,
    pub designation: Option<String>,
    pub position: i32,
    pub image_key: Option<String>,
    pub image_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<TestimonialRow> for Testimonial {
    fn from(r: TestimonialRow) -> Self {
        Self {
            id: r.id,
            owner_id: r.owner_id,
            name: r.name,
            message: r.message,
            rating: r.rating,
            designation: r.designation,
            position: r.position,
            image: StoredMedia::from_columns(r.image_key, r.image_url),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTestimonial {
    pub owner_id: Uuid,
    pub name: String,
    pub message: String,
    pub rating: i16,
    pub designation: Option<String>,
    pub image: Option<StoredMedia>,
}

#[derive(Debug, Clone, Default)]
pub struct TestimonialChanges {
    pub name: Option<String>,
    pub message: Option<String>,
    pub rating: Option<i16>,
    pub designation: Option<String>,
    pub image: Option<StoredMedia>,
}
