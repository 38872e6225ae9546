use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::media::StoredMedia;

/// A teacher shown on the coach's site.
#[derive(Debug, Clone)]
pub struct FacultyMember {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub designation: Option<String>,
    pub subject: Option<String>,
    pub bio: Option<String>,
    pub experience_years: Option<i16>,
    pub position: i32,
    pub photo: Option<StoredMedia>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct FacultyRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub designation: Option<String>,
    pub subject: Option<String>,
    pub bio: Option<String>,
    pub experience_years: Option<i16>,
    pub position: i32,
    pub photo_key: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<FacultyRow> for FacultyMember {
    fn from(r: FacultyRow) -> Self {
        Self {
            id: r.id,
            owner_id: r.owner_id,
            name: r.name,
            designation: r.designation,
            subject: r.subject,
            bio: r.bio,
            experience_years: r.experience_years,
            position: r.position,
            photo: StoredMedia::from_columns(r.photo_key, r.photo_url),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewFacultyMember {
    pub owner_id: Uuid,
    pub name: String,
    pub designation: Option<String>,
    pub subject: Option<String>,
    pub bio: Option<String>,
    pub experience_years: Option<i16>,
    pub photo: Option<StoredMedia>,
}

#[derive(Debug, Clone, Default)]
pub struct FacultyChanges {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub subject: Option<String>,
    pub bio: Option<String>,
    pub experience_years: Option<i16>,
    pub photo: Option<StoredMedia>,
}
