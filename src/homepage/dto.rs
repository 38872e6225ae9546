use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::Achievement;
use crate::{
    banners::dto::BannerResponse, faculty::dto::FacultyResponse,
    testimonials::dto::TestimonialResponse, users::dto::PublicUser,
};

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct About {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Everything a coach's public site renders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomepageView {
    pub owner: PublicUser,
    pub about: About,
    pub achievements: Vec<Achievement>,
    pub banners: Vec<BannerResponse>,
    pub testimonials: Vec<TestimonialResponse>,
    pub faculty: Vec<FacultyResponse>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHomepageRequest {
    /// Admins may edit another coach's page.
    pub user_id: Option<Uuid>,
    pub about_title: Option<String>,
    pub about_body: Option<String>,
    pub achievements: Option<Vec<Achievement>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomepageResponse {
    pub user_id: Uuid,
    pub about: About,
    pub achievements: Vec<Achievement>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct HomepageEnvelope {
    pub message: String,
    pub homepage: HomepageResponse,
}
