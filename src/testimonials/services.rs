use tracing::info;
use uuid::Uuid;

use super::{
    dto::{TestimonialInput, TestimonialPatch},
    repo_types::{NewTestimonial, Testimonial, TestimonialChanges},
};
use crate::{
    auth::gate::CurrentUser,
    error::AppError,
    media::services::{self as media, UploadItem},
    ordering::ensure_permutation,
    state::AppState,
    users::services::resolve_owner,
};

const MEDIA_FOLDER: &str = "testimonials";

pub async fn list(st: &AppState, owner_id: Option<Uuid>) -> Result<Vec<Testimonial>, AppError> {
    Ok(st.testimonials.list(owner_id).await?)
}

pub async fn get(st: &AppState, id: Uuid) -> Result<Testimonial, AppError> {
    st.testimonials
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Testimonial not found"))
}

pub async fn create(
    st: &AppState,
    actor: &CurrentUser,
    input: TestimonialInput,
    image: Option<UploadItem>,
) -> Result<Testimonial, AppError> {
    let owner_id = resolve_owner(st, actor, input.user_id).await?;
    let image = media::upload_opt(st, MEDIA_FOLDER, owner_id, image).await?;

    let created = st
        .testimonials
        .insert(NewTestimonial {
            owner_id,
            name: input.name,
            message: input.message,
            rating: input.rating,
            designation: input.designation,
            image: image.clone(),
        })
        .await
        .map_err(AppError::from);
    let testimonial = media::rollback_on_err(st, image.as_ref(), created).await?;

    info!(testimonial_id = %testimonial.id, %owner_id, "testimonial created");
    Ok(testimonial)
}

pub async fn update(
    st: &AppState,
    actor: &CurrentUser,
    id: Uuid,
    patch: TestimonialPatch,
    image: Option<UploadItem>,
) -> Result<Testimonial, AppError> {
    let existing = get(st, id).await?;
    actor.ensure_can_manage(existing.owner_id)?;

    let image = media::upload_opt(st, MEDIA_FOLDER, existing.owner_id, image).await?;
    let updated = st
        .testimonials
        .update(
            id,
            TestimonialChanges {
                name: patch.name,
                message: patch.message,
                rating: patch.rating,
                designation: patch.designation,
                image: image.clone(),
            },
        )
        .await
        .map_err(AppError::from)
        .and_then(|t| t.ok_or_else(|| AppError::not_found("Testimonial not found")));
    let testimonial = media::rollback_on_err(st, image.as_ref(), updated).await?;

    if image.is_some() {
        media::discard_opt(st, existing.image.as_ref()).await;
    }
    info!(testimonial_id = %id, "testimonial updated");
    Ok(testimonial)
}

pub async fn delete(st: &AppState, actor: &CurrentUser, id: Uuid) -> Result<(), AppError> {
    let existing = get(st, id).await?;
    actor.ensure_can_manage(existing.owner_id)?;

    let removed = st
        .testimonials
        .delete(id)
        .await?
        .ok_or_else(|| AppError::not_found("Testimonial not found"))?;
    media::discard_opt(st, removed.image.as_ref()).await;
    info!(testimonial_id = %id, "testimonial deleted");
    Ok(())
}

pub async fn reorder(
    st: &AppState,
    actor: &CurrentUser,
    ids: Vec<Uuid>,
) -> Result<Vec<Testimonial>, AppError> {
    let owner_id = actor.0.id;
    let current: Vec<Uuid> = st
        .testimonials
        .list(Some(owner_id))
        .await?
        .iter()
        .map(|t| t.id)
        .collect();
    ensure_permutation(&current, &ids)?;
    st.testimonials.reorder(owner_id, &ids).await?;
    Ok(st.testimonials.list(Some(owner_id)).await?)
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

    fn input(name: &str, rating: i16) -> TestimonialInput {
        TestimonialInput {
            user_id: None,
            name: name.into(),
            message: "Best faculty in town".into(),
            rating,
            designation: None,
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let (st, _) = AppState::fake();
        let me = actor(&st, Role::User).await;
        let created = create(&st, &me, input("A", 5), None).await.unwrap();

        let fetched = get(&st, created.id).await.unwrap();
        assert_eq!(fetched.name, "A");
        assert_eq!(fetched.rating, 5);
        assert_eq!(fetched.owner_id, me.0.id);
        assert!(fetched.image.is_none());
    }

    #[tokio::test]
    async fn delete_twice_is_not_found() {
        let (st, fakes) = AppState::fake();
        let me = actor(&st, Role::User).await;
        let image = Some(UploadItem {
            body: Bytes::from_static(b"png"),
            content_type: "image/png".into(),
        });
        let created = create(&st, &me, input("A", 4), image).await.unwrap();
        let key = created.image.unwrap().key;
        assert!(fakes.storage.contains(&key));

        delete(&st, &me, created.id).await.unwrap();
        assert!(!fakes.storage.contains(&key));
        assert!(matches!(
            delete(&st, &me, created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_keeps_untouched_fields() {
        let (st, _) = AppState::fake();
        let me = actor(&st, Role::User).await;
        let created = create(&st, &me, input("A", 5), None).await.unwrap();

        let patch = TestimonialPatch {
            rating: Some(3),
            designation: Some("Parent".into()),
            ..Default::default()
        };
        let updated = update(&st, &me, created.id, patch, None).await.unwrap();
        assert_eq!(updated.rating, 3);
        assert_eq!(updated.designation.as_deref(), Some("Parent"));
        assert_eq!(updated.message, "Best faculty in town");
    }

    #[tokio::test]
    async fn strangers_are_forbidden() {
        let (st, _) = AppState::fake();
        let me = actor(&st, Role::User).await;
        let other = actor(&st, Role::User).await;
        let created = create(&st, &me, input("A", 5), None).await.unwrap();

        let err = update(&st, &other, created.id, TestimonialPatch::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn reorder_requires_every_record() {
        let (st, _) = AppState::fake();
        let me = actor(&st, Role::User).await;
        let a = create(&st, &me, input("A", 5), None).await.unwrap();
        let b = create(&st, &me, input("B", 5), None).await.unwrap();

        let ordered = reorder(&st, &me, vec![b.id, a.id]).await.unwrap();
        assert_eq!(ordered[0].id, b.id);
        assert_eq!(ordered[1].position, 1);
        assert!(reorder(&st, &me, vec![b.id]).await.is_err());
    }
}
