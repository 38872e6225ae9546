use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::media::StoredMedia;

#[derive(Debug, Clone)]
pub struct Banner {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub link_url: Option<String>,
    pub position: i32,
    pub image: Option<StoredMedia>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct BannerRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub link_url: Option<String>,
    pub position: i32,
    pub image_key: Option<String>,
    pub image_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<BannerRow> for Banner {
    fn from(r: BannerRow) -> Self {
        Self {
            id: r.id,
            owner_id: r.owner_id,
            title: r.title,
            subtitle: r.subtitle,
            link_url: r.link_url,
            position: r.position,
            image: StoredMedia::from_columns(r.image_key, r.image_url),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewBanner {
    pub owner_id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub link_url: Option<String>,
    pub image: Option<StoredMedia>,
}

#[derive(Debug, Clone, Default)]
pub struct BannerChanges {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub link_url: Option<String>,
    pub image: Option<StoredMedia>,
}
