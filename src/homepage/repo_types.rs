use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub title: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct Homepage {
    pub owner_id: Uuid,
    pub about_title: Option<String>,
    pub about_body: Option<String>,
    pub achievements: Vec<Achievement>,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct HomepageRow {
    pub owner_id: Uuid,
    pub about_title: Option<String>,
    pub about_body: Option<String>,
    pub achievements: Json<Vec<Achievement>>,
    pub updated_at: OffsetDateTime,
}

impl From<HomepageRow> for Homepage {
    fn from(r: HomepageRow) -> Self {
        Self {
            owner_id: r.owner_id,
            about_title: r.about_title,
            about_body: r.about_body,
            achievements: r.achievements.0,
            updated_at: r.updated_at,
        }
    }
}

/// Absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct HomepageChanges {
    pub about_title: Option<String>,
    pub about_body: Option<String>,
    pub achievements: Option<Vec<Achievement>>,
}
