use tracing::info;
use uuid::Uuid;

use super::{
    dto::{FacultyInput, FacultyPatch},
    repo_types::{FacultyChanges, FacultyMember, NewFacultyMember},
};
use crate::{
    auth::gate::CurrentUser,
    error::AppError,
    media::services::{self as media, UploadItem},
    ordering::ensure_permutation,
    state::AppState,
    users::services::resolve_owner,
};

const MEDIA_FOLDER: &str = "faculty";

pub async fn list(st: &AppState, owner_id: Option<Uuid>) -> Result<Vec<FacultyMember>, AppError> {
    Ok(st.faculty.list(owner_id).await?)
}

pub async fn get(st: &AppState, id: Uuid) -> Result<FacultyMember, AppError> {
    st.faculty
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Faculty member not found"))
}

pub async fn create(
    st: &AppState,
    actor: &CurrentUser,
    input: FacultyInput,
    photo: Option<UploadItem>,
) -> Result<FacultyMember, AppError> {
    let owner_id = resolve_owner(st, actor, input.user_id).await?;
    let photo = media::upload_opt(st, MEDIA_FOLDER, owner_id, photo).await?;

    let created = st
        .faculty
        .insert(NewFacultyMember {
            owner_id,
            name: input.name,
            designation: input.designation,
            subject: input.subject,
            bio: input.bio,
            experience_years: input.experience_years,
            photo: photo.clone(),
        })
        .await
        .map_err(AppError::from);
    let member = media::rollback_on_err(st, photo.as_ref(), created).await?;

    info!(faculty_id = %member.id, %owner_id, "faculty member added");
    Ok(member)
}

pub async fn update(
    st: &AppState,
    actor: &CurrentUser,
    id: Uuid,
    patch: FacultyPatch,
    photo: Option<UploadItem>,
) -> Result<FacultyMember, AppError> {
    let existing = get(st, id).await?;
    actor.ensure_can_manage(existing.owner_id)?;

    let photo = media::upload_opt(st, MEDIA_FOLDER, existing.owner_id, photo).await?;
    let updated = st
        .faculty
        .update(
            id,
            FacultyChanges {
                name: patch.name,
                designation: patch.designation,
                subject: patch.subject,
                bio: patch.bio,
                experience_years: patch.experience_years,
                photo: photo.clone(),
            },
        )
        .await
        .map_err(AppError::from)
        .and_then(|f| f.ok_or_else(|| AppError::not_found("Faculty member not found")));
    let member = media::rollback_on_err(st, photo.as_ref(), updated).await?;

    if photo.is_some() {
        media::discard_opt(st, existing.photo.as_ref()).await;
    }
    info!(faculty_id = %id, "faculty member updated");
    Ok(member)
}

pub async fn delete(st: &AppState, actor: &CurrentUser, id: Uuid) -> Result<(), AppError> {
    let existing = get(st, id).await?;
    actor.ensure_can_manage(existing.owner_id)?;

    let removed = st
        .faculty
        .delete(id)
        .await?
        .ok_or_else(|| AppError::not_found("Faculty member not found"))?;
    media::discard_opt(st, removed.photo.as_ref()).await;
    info!(faculty_id = %id, "faculty member removed");
    Ok(())
}

pub async fn reorder(
    st: &AppState,
    actor: &CurrentUser,
    ids: Vec<Uuid>,
) -> Result<Vec<FacultyMember>, AppError> {
    let owner_id = actor.0.id;
    let current: Vec<Uuid> = st
        .faculty
        .list(Some(owner_id))
        .await?
        .iter()
        .map(|f| f.id)
        .collect();
    ensure_permutation(&current, &ids)?;
    st.faculty.reorder(owner_id, &ids).await?;
    Ok(st.faculty.list(Some(owner_id)).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::{NewUser, Role};
    use bytes::Bytes;

    async fn actor(st: &AppState, role: Role) -> CurrentUser {
        let user = st
            .users
            .insert(NewUser {
                email: format!("{}@example.com", Uuid::new_v4()),
                name: "Coach".into(),
                mobile: None,
                password_hash: None,
                role,
                is_verified: true,
            })
            .await
            .unwrap();
        CurrentUser(user)
    }

    fn input(name: &str) -> FacultyInput {
        FacultyInput {
            user_id: None,
            name: name.into(),
            designation: Some("HOD".into()),
            subject: Some("Chemistry".into()),
            bio: None,
            experience_years: Some(15),
        }
    }

    fn photo() -> Option<UploadItem> {
        Some(UploadItem {
            body: Bytes::from_static(b"webp"),
            content_type: "image/webp".into(),
        })
    }

    #[tokio::test]
    async fn create_update_delete_manages_photo() {
        let (st, fakes) = AppState::fake();
        let me = actor(&st, Role::User).await;
        let created = create(&st, &me, input("S. Iyer"), photo()).await.unwrap();
        let old_key = created.photo.clone().unwrap().key;
        assert_eq!(get(&st, created.id).await.unwrap().subject.as_deref(), Some("Chemistry"));

        let patch = FacultyPatch {
            bio: Some("IIT Bombay alumna".into()),
            ..Default::default()
        };
        let updated = update(&st, &me, created.id, patch, photo()).await.unwrap();
        assert_eq!(updated.designation.as_deref(), Some("HOD"));
        assert_eq!(updated.bio.as_deref(), Some("IIT Bombay alumna"));
        let new_key = updated.photo.unwrap().key;
        assert!(!fakes.storage.contains(&old_key));

        delete(&st, &me, created.id).await.unwrap();
        assert!(!fakes.storage.contains(&new_key));
        assert!(matches!(
            delete(&st, &me, created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn strangers_cannot_edit() {
        let (st, _) = AppState::fake();
        let me = actor(&st, Role::User).await;
        let other = actor(&st, Role::User).await;
        let created = create(&st, &me, input("A"), None).await.unwrap();
        assert!(matches!(
            delete(&st, &other, created.id).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn reorder_is_an_exact_permutation() {
        let (st, _) = AppState::fake();
        let me = actor(&st, Role::User).await;
        let a = create(&st, &me, input("A"), None).await.unwrap();
        let b = create(&st, &me, input("B"), None).await.unwrap();

        let ordered = reorder(&st, &me, vec![b.id, a.id]).await.unwrap();
        assert_eq!(ordered[0].name, "B");
        assert!(reorder(&st, &me, vec![a.id, a.id]).await.is_err());
    }
}
