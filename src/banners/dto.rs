use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::Banner;
use crate::{error::AppError, media::form::FormData};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub link_url: Option<String>,
    pub position: i32,
    pub image_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Banner> for BannerResponse {
    fn from(b: Banner) -> Self {
        Self {
            id: b.id,
            user_id: b.owner_id,
            title: b.title,
            subtitle: b.subtitle,
            link_url: b.link_url,
            position: b.position,
            image_url: b.image.map(|m| m.url),
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BannerEnvelope {
    pub message: String,
    pub banner: BannerResponse,
}

/// Validated create form.
#[derive(Debug, Clone)]
pub struct BannerInput {
    /// Admins may create on behalf of another user.
    pub user_id: Option<Uuid>,
    pub title: String,
    pub subtitle: Option<String>,
    pub link_url: Option<String>,
}

impl BannerInput {
    pub fn from_form(form: &FormData) -> Result<Self, AppError> {
        Ok(Self {
            user_id: form.uuid("userId")?,
            title: form.required("title")?,
            subtitle: form.text("subtitle"),
            link_url: form.text("linkUrl"),
        })
    }
}

/// Validated update form; absent fields stay as they are.
#[derive(Debug, Clone, Default)]
pub struct BannerPatch {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub link_url: Option<String>,
}

impl BannerPatch {
    pub fn from_form(form: &FormData) -> Self {
        Self {
            title: form.text("title"),
            subtitle: form.text("subtitle"),
            link_url: form.text("linkUrl"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_form_requires_title() {
        let form = FormData::from_pairs(&[("subtitle", "Admissions open")]);
        assert!(matches!(BannerInput::from_form(&form), Err(AppError::Validation(_))));
    }

    #[test]
    fn create_form_rejects_bad_owner_id() {
        let form = FormData::from_pairs(&[("title", "JEE 2026"), ("userId", "nope")]);
        assert!(BannerInput::from_form(&form).is_err());
    }

    #[test]
    fn create_form_reads_fields() {
        let form = FormData::from_pairs(&[("title", " JEE 2026 "), ("linkUrl", "/admissions")]);
        let input = BannerInput::from_form(&form).unwrap();
        assert_eq!(input.title, "JEE 2026");
        assert_eq!(input.link_url.as_deref(), Some("/admissions"));
        assert_eq!(input.subtitle, None);
    }
}
