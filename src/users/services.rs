use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{CreateUserRequest, UpdateUserRequest},
    repo_types::{NewUser, Role, User, UserChanges},
};
use crate::{
    auth::{
        gate::CurrentUser,
        password::{hash_password, validate_new_password},
        services::{normalize_email, optional_text, required_text},
    },
    config::AdminSeed,
    error::AppError,
    media::services::{self as media, UploadItem},
    state::AppState,
};

const MEDIA_FOLDER: &str = "avatars";

/// Owner a write is performed for: the caller, or the named user when an admin asks.
pub async fn resolve_owner(
    st: &AppState,
    actor: &CurrentUser,
    requested: Option<Uuid>,
) -> Result<Uuid, AppError> {
    match requested {
        None => Ok(actor.0.id),
        Some(id) if id == actor.0.id => Ok(id),
        Some(_) if !actor.is_admin() => Err(AppError::Forbidden("Access denied".into())),
        Some(id) => {
            let owner = st
                .users
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::not_found("User not found"))?;
            Ok(owner.id)
        }
    }
}

pub async fn list(st: &AppState) -> Result<Vec<User>, AppError> {
    Ok(st.users.list().await?)
}

pub async fn get(st: &AppState, actor: &CurrentUser, id: Uuid) -> Result<User, AppError> {
    actor.ensure_can_manage(id)?;
    st.users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

/// Admin-created accounts skip mailbox verification.
pub async fn create(st: &AppState, req: CreateUserRequest) -> Result<User, AppError> {
    let email = normalize_email(&req.email)?;
    let name = required_text(&req.name, "name")?;
    let password_hash = match req.password.as_deref() {
        Some(p) => {
            validate_new_password(p)?;
            Some(hash_password(p).map_err(AppError::internal)?)
        }
        None => None,
    };

    let user = st
        .users
        .insert(NewUser {
            email,
            name,
            mobile: optional_text(req.mobile),
            password_hash,
            role: req.role.unwrap_or(Role::User),
            is_verified: true,
        })
        .await?;
    info!(user_id = %user.id, role = user.role.as_str(), "user created by admin");
    Ok(user)
}

pub async fn update(
    st: &AppState,
    actor: &CurrentUser,
    id: Uuid,
    req: UpdateUserRequest,
) -> Result<User, AppError> {
    actor.ensure_can_manage(id)?;
    if !actor.is_admin() && (req.role.is_some() || req.is_verified.is_some()) {
        return Err(AppError::Forbidden(
            "Only admins can change role or verification".into(),
        ));
    }
    let name = req
        .name
        .as_deref()
        .map(|n| required_text(n, "name"))
        .transpose()?;

    let user = st
        .users
        .update(
            id,
            UserChanges {
                name,
                mobile: req
                    .mobile
                    .map(|m| Some(m.trim().to_string()).filter(|m| !m.is_empty())),
                role: req.role,
                is_verified: req.is_verified,
                ..Default::default()
            },
        )
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    info!(user_id = %id, "user updated");
    Ok(user)
}

pub async fn set_avatar(
    st: &AppState,
    actor: &CurrentUser,
    id: Uuid,
    image: Option<UploadItem>,
) -> Result<User, AppError> {
    let existing = get(st, actor, id).await?;
    let item = image.ok_or_else(|| AppError::validation("image is required"))?;

    let avatar = media::upload(st, MEDIA_FOLDER, id, item).await?;
    let updated = st
        .users
        .update(
            id,
            UserChanges {
                avatar: Some(avatar.clone()),
                ..Default::default()
            },
        )
        .await
        .map_err(AppError::from)
        .and_then(|u| u.ok_or_else(|| AppError::not_found("User not found")));
    let user = media::rollback_on_err(st, Some(&avatar), updated).await?;

    media::discard_opt(st, existing.avatar.as_ref()).await;
    info!(user_id = %id, "avatar replaced");
    Ok(user)
}

/// Removes the user along with everything their site shows.
pub async fn delete(st: &AppState, actor: &CurrentUser, id: Uuid) -> Result<(), AppError> {
    if actor.0.id == id {
        return Err(AppError::validation("You cannot delete your own account"));
    }
    let user = st
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let banners = st.banners.delete_by_owner(id).await?;
    let testimonials = st.testimonials.delete_by_owner(id).await?;
    let faculty = st.faculty.delete_by_owner(id).await?;
    st.homepages.delete(id).await?;
    if !st.users.delete(id).await? {
        return Err(AppError::not_found("User not found"));
    }

    let images = banners
        .iter()
        .filter_map(|b| b.image.as_ref())
        .chain(testimonials.iter().filter_map(|t| t.image.as_ref()))
        .chain(faculty.iter().filter_map(|f| f.photo.as_ref()))
        .chain(user.avatar.as_ref());
    for image in images {
        media::discard(st, image).await;
    }
    info!(
        user_id = %id,
        banners = banners.len(),
        testimonials = testimonials.len(),
        faculty = faculty.len(),
        "user deleted"
    );
    Ok(())
}

/// Creates the configured admin on first boot.
pub async fn seed_admin(st: &AppState, seed: &AdminSeed) -> Result<(), AppError> {
    let email = normalize_email(&seed.email)?;
    if let Some(existing) = st.users.find_by_email(&email).await? {
        if existing.role != Role::Admin {
            warn!(%email, "seed admin email belongs to a non-admin account");
        }
        return Ok(());
    }
    validate_new_password(&seed.password)?;
    let password_hash = hash_password(&seed.password).map_err(AppError::internal)?;
    st.users
        .insert(NewUser {
            email: email.clone(),
            name: "Administrator".into(),
            mobile: None,
            password_hash: Some(password_hash),
            role: Role::Admin,
            is_verified: true,
        })
        .await?;
    info!(%email, "admin account seeded");
    Ok(())
}
