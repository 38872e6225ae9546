use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::FacultyMember;
use crate::{error::AppError, media::form::FormData};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub designation: Option<String>,
    pub subject: Option<String>,
    pub bio: Option<String>,
    pub experience_years: Option<i16>,
    pub position: i32,
    pub photo_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<FacultyMember> for FacultyResponse {
    fn from(f: FacultyMember) -> Self {
        Self {
            id: f.id,
            user_id: f.owner_id,
            name: f.name,
            designation: f.designation,
            subject: f.subject,
            bio: f.bio,
            experience_years: f.experience_years,
            position: f.position,
            photo_url: f.photo.map(|m| m.url),
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FacultyEnvelope {
    pub message: String,
    pub faculty: FacultyResponse,
}

pub const MAX_EXPERIENCE_YEARS: i16 = 80;

fn experience(form: &FormData) -> Result<Option<i16>, AppError> {
    match form.parsed::<i16>("experienceYears")? {
        Some(y) if !(0..=MAX_EXPERIENCE_YEARS).contains(&y) => Err(AppError::validation(format!(
            "experienceYears must be between 0 and {}",
            MAX_EXPERIENCE_YEARS
        ))),
        other => Ok(other),
    }
}

#[derive(Debug, Clone)]
pub struct FacultyInput {
    pub user_id: Option<Uuid>,
    pub name: String,
    pub designation: Option<String>,
    pub subject: Option<String>,
    pub bio: Option<String>,
    pub experience_years: Option<i16>,
}

impl FacultyInput {
    pub fn from_form(form: &FormData) -> Result<Self, AppError> {
        Ok(Self {
            user_id: form.uuid("userId")?,
            name: form.required("name")?,
            designation: form.text("designation"),
            subject: form.text("subject"),
            bio: form.text("bio"),
            experience_years: experience(form)?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct FacultyPatch {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub subject: Option<String>,
    pub bio: Option<String>,
    pub experience_years: Option<i16>,
}

impl FacultyPatch {
    pub fn from_form(form: &FormData) -> Result<Self, AppError> {
        Ok(Self {
            name: form.text("name"),
            designation: form.text("designation"),
            subject: form.text("subject"),
            bio: form.text("bio"),
            experience_years: experience(form)?,
        })
    }
}
