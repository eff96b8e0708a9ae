use crate::entities::{profile_entity as profiles, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::utils::{hash_password, normalize_phone, validate_password, verify_password};
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn find_by_phone<C: ConnectionTrait>(
        conn: &C,
        phone: &str,
    ) -> AppResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Phone.eq(phone))
            .one(conn)
            .await?)
    }

    /// Find-or-insert by phone. Never touches an existing identity, so a verified
    /// member stays verified when they request a new code.
    ///
    /// The insert is `ON CONFLICT (phone) DO NOTHING` followed by a re-read, which
    /// resolves two concurrent first requests for the same phone to one row.
    pub async fn get_or_create_in<C: ConnectionTrait>(
        conn: &C,
        phone: &str,
    ) -> AppResult<users::Model> {
        if let Some(user) = Self::find_by_phone(conn, phone).await? {
            return Ok(user);
        }

        let model = users::ActiveModel {
            phone: Set(phone.to_string()),
            email: Set(None),
            password_hash: Set(None),
            is_verified: Set(false),
            is_active: Set(true),
            is_staff: Set(false),
            is_superuser: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        users::Entity::insert(model)
            .on_conflict(
                OnConflict::column(users::Column::Phone)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;

        Self::find_by_phone(conn, phone).await?.ok_or_else(|| {
            AppError::InternalError(format!("Identity for {phone} vanished after insert"))
        })
    }

    pub async fn mark_verified_in<C: ConnectionTrait>(
        conn: &C,
        mut user: users::Model,
    ) -> AppResult<users::Model> {
        if !user.is_verified {
            users::Entity::update_many()
                .col_expr(users::Column::IsVerified, Expr::value(true))
                .filter(users::Column::Id.eq(user.id))
                .exec(conn)
                .await?;
            user.is_verified = true;
        }
        Ok(user)
    }

    pub async fn set_email_in<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        email: &str,
    ) -> AppResult<()> {
        users::Entity::update_many()
            .col_expr(users::Column::Email, Expr::value(email.to_string()))
            .filter(users::Column::Id.eq(user_id))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Resolve the identity behind a session or token. A missing or disabled
    /// identity is an authorization failure, not a 404.
    pub async fn get_active_user(&self, user_id: i64) -> AppResult<users::Model> {
        match users::Entity::find_by_id(user_id).one(&self.pool).await? {
            Some(user) if user.is_active => Ok(user),
            Some(_) => Err(AppError::AuthError("User account is disabled".to_string())),
            None => Err(AppError::AuthError("User not found".to_string())),
        }
    }

    /// Profile name when one is set, otherwise the phone number.
    pub async fn full_name<C: ConnectionTrait>(conn: &C, user: &users::Model) -> AppResult<String> {
        let profile = profiles::Entity::find()
            .filter(profiles::Column::UserId.eq(user.id))
            .one(conn)
            .await?;
        Ok(match profile {
            Some(p) if !p.name.trim().is_empty() => p.name,
            _ => user.phone.clone(),
        })
    }

    /// 创建管理员账号（带密码，可登录后台）
    pub async fn create_superuser(&self, phone: &str, password: &str) -> AppResult<users::Model> {
        let phone = normalize_phone(phone)?;
        validate_password(password)?;

        if Self::find_by_phone(&self.pool, &phone).await?.is_some() {
            return Err(AppError::ValidationError(
                "phone: A user with this phone number already exists.".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;
        let user = users::ActiveModel {
            phone: Set(phone),
            email: Set(None),
            password_hash: Set(Some(password_hash)),
            is_verified: Set(true),
            is_active: Set(true),
            is_staff: Set(true),
            is_superuser: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Superuser created: {}", user.id);
        Ok(user)
    }
}

pub fn has_usable_password(user: &users::Model) -> bool {
    user.password_hash.is_some()
}

/// Members without a usable password never match.
pub fn check_password(user: &users::Model, password: &str) -> AppResult<bool> {
    match &user.password_hash {
        Some(hash) => verify_password(password, hash),
        None => Ok(false),
    }
}
