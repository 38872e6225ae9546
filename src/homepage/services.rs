use tracing::info;
use uuid::Uuid;

use super::{
    dto::{About, HomepageView, UpdateHomepageRequest},
    repo_types::{Achievement, Homepage, HomepageChanges},
};
use crate::{
    auth::gate::CurrentUser, error::AppError, state::AppState, users::dto::PublicUser,
    users::services::resolve_owner,
};

pub const MAX_ACHIEVEMENTS: usize = 20;

fn clean_achievements(items: Vec<Achievement>) -> Result<Vec<Achievement>, AppError> {
    if items.len() > MAX_ACHIEVEMENTS {
        return Err(AppError::validation(format!(
            "at most {} achievements allowed",
            MAX_ACHIEVEMENTS
        )));
    }
    items
        .into_iter()
        .map(|a| {
            let title = a.title.trim().to_string();
            let value = a.value.trim().to_string();
            if title.is_empty() || value.is_empty() {
                return Err(AppError::validation("achievement title and value are required"));
            }
            Ok(Achievement { title, value })
        })
        .collect()
}

/// Public composition of profile, about-us, achievements and the owner's collections.
pub async fn view(st: &AppState, owner_id: Uuid) -> Result<HomepageView, AppError> {
    let owner = st
        .users
        .find_by_id(owner_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let page = st.homepages.get(owner_id).await?;
    let banners = st.banners.list(Some(owner_id)).await?;
    let testimonials = st.testimonials.list(Some(owner_id)).await?;
    let faculty = st.faculty.list(Some(owner_id)).await?;

    let (about, achievements, updated_at) = match page {
        Some(p) => (
            About {
                title: p.about_title,
                body: p.about_body,
            },
            p.achievements,
            Some(p.updated_at),
        ),
        None => (About::default(), Vec::new(), None),
    };

    Ok(HomepageView {
        owner: PublicUser::from(&owner),
        about,
        achievements,
        banners: banners.into_iter().map(Into::into).collect(),
        testimonials: testimonials.into_iter().map(Into::into).collect(),
        faculty: faculty.into_iter().map(Into::into).collect(),
        updated_at,
    })
}

pub async fn update(
    st: &AppState,
    actor: &CurrentUser,
    req: UpdateHomepageRequest,
) -> Result<Homepage, AppError> {
    let owner_id = resolve_owner(st, actor, req.user_id).await?;
    let changes = HomepageChanges {
        about_title: req.about_title.map(|v| v.trim().to_string()),
        about_body: req.about_body.map(|v| v.trim().to_string()),
        achievements: req.achievements.map(clean_achievements).transpose()?,
    };
    let page = st.homepages.upsert(owner_id, changes).await?;
    info!(%owner_id, achievements = page.achievements.len(), "homepage saved");
    Ok(page)
}
