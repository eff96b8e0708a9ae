use crate::entities::{profile_entity as profiles, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::external::MediaStorage;
use crate::models::*;
use crate::services::UserService;
use crate::utils::{check_measurement, validate_email};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct ProfileService {
    pool: DatabaseConnection,
    user_service: UserService,
    media: MediaStorage,
}

impl ProfileService {
    pub fn new(pool: DatabaseConnection, media: MediaStorage) -> Self {
        let user_service = UserService::new(pool.clone());
        Self {
            pool,
            user_service,
            media,
        }
    }

    /// At most one profile per identity: insert-if-absent keyed on the unique `user_id`.
    pub async fn get_or_create_in<C: ConnectionTrait>(
        conn: &C,
        user: &users::Model,
    ) -> AppResult<profiles::Model> {
        let find = || {
            profiles::Entity::find()
                .filter(profiles::Column::UserId.eq(user.id))
                .one(conn)
        };
        if let Some(profile) = find().await? {
            return Ok(profile);
        }

        let model = profiles::ActiveModel {
            user_id: Set(user.id),
            name: Set(String::new()),
            email: Set(user.email.clone().unwrap_or_default()),
            profile_photo: Set(None),
            height: Set(None),
            weight: Set(None),
            medical_notes: Set(String::new()),
            emergency_contact: Set(String::new()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        profiles::Entity::insert(model)
            .on_conflict(
                OnConflict::column(profiles::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;

        find().await?.ok_or_else(|| {
            AppError::InternalError(format!("Profile for user {} vanished after insert", user.id))
        })
    }

    /// Last write wins on name and email; the other fields are left alone.
    pub async fn upsert_contact_in<C: ConnectionTrait>(
        conn: &C,
        user: &users::Model,
        name: Option<&str>,
        email: Option<&str>,
    ) -> AppResult<profiles::Model> {
        let profile = Self::get_or_create_in(conn, user).await?;
        let mut model = profile.into_active_model();
        if let Some(name) = name {
            model.name = Set(name.to_string());
        }
        if let Some(email) = email {
            model.email = Set(email.to_string());
        }
        model.updated_at = Set(Utc::now());
        Ok(model.update(conn).await?)
    }

    /// Existing profile only; nothing is created.
    pub async fn find_profile(&self, user_id: i64) -> AppResult<Option<ProfileResponse>> {
        let profile = profiles::Entity::find()
            .filter(profiles::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?;
        Ok(profile.map(ProfileResponse::from))
    }

    /// 获取个人资料（首次访问时自动创建）
    pub async fn get_profile(&self, user_id: i64) -> AppResult<ProfileResponse> {
        let user = self.user_service.get_active_user(user_id).await?;
        let profile = Self::get_or_create_in(&self.pool, &user).await?;
        Ok(ProfileResponse::from(profile))
    }

    /// 更新个人资料
    pub async fn update_profile(
        &self,
        user_id: i64,
        request: UpdateProfileRequest,
    ) -> AppResult<ProfileResponse> {
        let name = request.name.unwrap_or_default().trim().to_string();
        let email = request.email.unwrap_or_default().trim().to_string();
        validate_email(&email)?;
        let height = check_measurement("height", request.height)?;
        let weight = check_measurement("weight", request.weight)?;

        let user = self.user_service.get_active_user(user_id).await?;

        let txn = self.pool.begin().await?;
        let mut model = Self::get_or_create_in(&txn, &user).await?.into_active_model();
        model.name = Set(name);
        model.email = Set(email.clone());
        model.height = Set(height);
        model.weight = Set(weight);
        model.medical_notes = Set(request.medical_notes.unwrap_or_default());
        model.emergency_contact = Set(request.emergency_contact.unwrap_or_default());
        model.updated_at = Set(Utc::now());
        let profile = model.update(&txn).await?;

        if !email.is_empty() {
            UserService::set_email_in(&txn, user.id, &email).await?;
        }
        txn.commit().await?;

        Ok(ProfileResponse::from(profile))
    }

    /// Rejects an unusable photo before anything is written.
    pub fn check_photo(&self, content_type: &str, bytes: &[u8]) -> AppResult<()> {
        self.media.check_profile_photo(content_type, bytes).map(|_| ())
    }

    pub async fn update_photo(
        &self,
        user_id: i64,
        content_type: &str,
        bytes: &[u8],
    ) -> AppResult<ProfileResponse> {
        let user = self.user_service.get_active_user(user_id).await?;
        let reference = self.media.store_profile_photo(content_type, bytes).await?;

        let mut model = Self::get_or_create_in(&self.pool, &user)
            .await?
            .into_active_model();
        model.profile_photo = Set(Some(reference));
        model.updated_at = Set(Utc::now());
        let profile = model.update(&self.pool).await?;

        Ok(ProfileResponse::from(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaConfig;
    use crate::test_support::*;
    use sea_orm::PaginatorTrait;

    fn service(db: &DatabaseConnection) -> ProfileService {
        let root = std::env::temp_dir().join(format!("fitzone-profile-{}", uuid::Uuid::new_v4()));
        ProfileService::new(
            db.clone(),
            MediaStorage::new(&MediaConfig {
                root: root.to_string_lossy().to_string(),
                max_upload_bytes: 1024,
            }),
        )
    }

    #[actix_web::test]
    async fn test_first_visit_creates_empty_profile_once() {
        let db = setup_db().await;
        let user = UserService::get_or_create_in(&db, "5551234567").await.unwrap();
        let profiles = service(&db);

        let first = profiles.get_profile(user.id).await.unwrap();
        let second = profiles.get_profile(user.id).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.name, "");
        assert_eq!(first.bmi, None);
        assert_eq!(profiles::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn test_update_profile_overwrites_and_copies_email() {
        let db = setup_db().await;
        let user = UserService::get_or_create_in(&db, "5551234567").await.unwrap();
        let profiles = service(&db);

        let updated = profiles
            .update_profile(
                user.id,
                UpdateProfileRequest {
                    name: Some("Updated Name".to_string()),
                    email: Some("updated@example.com".to_string()),
                    height: Some(175.0),
                    weight: Some(70.0),
                    medical_notes: Some("none".to_string()),
                    emergency_contact: Some("5550001111".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Updated Name");
        assert_eq!(updated.bmi, Some(22.86));

        let reloaded = UserService::find_by_phone(&db, "5551234567").await.unwrap().unwrap();
        assert_eq!(reloaded.email.as_deref(), Some("updated@example.com"));

        let cleared = profiles
            .update_profile(user.id, UpdateProfileRequest::default())
            .await
            .unwrap();
        assert_eq!(cleared.height, None);
        assert_eq!(cleared.bmi, None);
        assert_eq!(cleared.name, "");
    }

    #[actix_web::test]
    async fn test_update_profile_validation_writes_nothing() {
        let db = setup_db().await;
        let user = UserService::get_or_create_in(&db, "5551234567").await.unwrap();
        let profiles = service(&db);

        let bad_email = profiles
            .update_profile(
                user.id,
                UpdateProfileRequest {
                    email: Some("nope".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(bad_email, Err(AppError::ValidationError(_))));

        let bad_height = profiles
            .update_profile(
                user.id,
                UpdateProfileRequest {
                    height: Some(-1.0),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(bad_height, Err(AppError::ValidationError(_))));
        assert_eq!(profiles::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn test_upsert_contact_last_write_wins() {
        let db = setup_db().await;
        let user = UserService::get_or_create_in(&db, "5551234567").await.unwrap();

        ProfileService::upsert_contact_in(&db, &user, Some("First"), Some("a@example.com"))
            .await
            .unwrap();
        let profile =
            ProfileService::upsert_contact_in(&db, &user, Some("Second"), None).await.unwrap();
        assert_eq!(profile.name, "Second");
        assert_eq!(profile.email, "a@example.com");
    }

    #[actix_web::test]
    async fn test_update_photo_records_reference() {
        let db = setup_db().await;
        let user = UserService::get_or_create_in(&db, "5551234567").await.unwrap();
        let profiles = service(&db);

        let profile = profiles
            .update_photo(user.id, "image/jpeg", b"jpeg-bytes")
            .await
            .unwrap();
        let reference = profile.profile_photo.unwrap();
        assert!(reference.starts_with("profiles/") && reference.ends_with(".jpg"));

        assert!(profiles.update_photo(user.id, "text/html", b"<p>").await.is_err());
    }
}
