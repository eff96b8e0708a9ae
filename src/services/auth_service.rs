use crate::entities::otp_entity::{self as otps, OTP_TTL_SECONDS};
use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult, OtpFailure};
use crate::external::Notifier;
use crate::models::*;
use crate::services::UserService;
use crate::utils::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

/// OTP issuance and verification, shared by the web session flow and the token API.
#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
    user_service: UserService,
    notifier: Notifier,
    expose_code: bool,
}

impl AuthService {
    pub fn new(
        pool: DatabaseConnection,
        jwt_service: JwtService,
        notifier: Notifier,
        expose_code: bool,
    ) -> Self {
        let user_service = UserService::new(pool.clone());
        Self {
            pool,
            jwt_service,
            user_service,
            notifier,
            expose_code,
        }
    }

    /// 发送验证码
    ///
    /// Nothing is written when the phone fails validation. SMS delivery is best
    /// effort: the challenge stands even if the provider rejects the message.
    pub async fn request_otp(&self, raw_phone: &str) -> AppResult<RequestOtpResponse> {
        let phone = normalize_phone(raw_phone)?;
        let code = generate_six_digit_code();

        let txn = self.pool.begin().await?;
        UserService::get_or_create_in(&txn, &phone).await?;
        otps::ActiveModel {
            phone: Set(phone.clone()),
            code: Set(code.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        let body = format!(
            "Your FitZone verification code is {code}. It is valid for {} minutes.",
            OTP_TTL_SECONDS / 60
        );
        if let Err(e) = self.notifier.send_sms(&phone, &body).await {
            log::warn!("OTP delivery to {phone} failed: {e}");
        }

        Ok(RequestOtpResponse {
            phone,
            expires_in: OTP_TTL_SECONDS,
            otp: self.expose_code.then_some(code),
        })
    }

    /// Check `code` against the most recent challenge for the phone and mark the
    /// identity verified. Safe to repeat with the same code until it expires.
    pub async fn verify_otp(&self, raw_phone: &str, code: &str) -> AppResult<users::Model> {
        let phone = normalize_phone(raw_phone)?;

        let latest = otps::Entity::find()
            .filter(otps::Column::Phone.eq(&phone))
            .order_by_desc(otps::Column::CreatedAt)
            .order_by_desc(otps::Column::Id)
            .one(&self.pool)
            .await?
            .ok_or(OtpFailure::NotFound)?;

        if latest.is_expired_at(Utc::now()) {
            return Err(OtpFailure::Expired.into());
        }
        if latest.code != code {
            return Err(OtpFailure::Mismatch.into());
        }

        let txn = self.pool.begin().await?;
        let user = UserService::get_or_create_in(&txn, &phone).await?;
        let user = UserService::mark_verified_in(&txn, user).await?;
        txn.commit().await?;

        log::info!("Phone verified for user {}", user.id);
        Ok(user)
    }

    /// Verify, then issue an access/refresh pair bound to the identity id.
    pub async fn login_with_otp(&self, request: VerifyOtpRequest) -> AppResult<AuthResponse> {
        let user = self.verify_otp(&request.phone, &request.otp).await?;
        if !user.is_active {
            return Err(AppError::AuthError("User account is disabled".to_string()));
        }

        let access = self.jwt_service.generate_access_token(user.id, &user.phone)?;
        let refresh = self.jwt_service.generate_refresh_token(user.id, &user.phone)?;

        Ok(AuthResponse {
            user: UserResponse::from(user),
            tokens: AuthTokens { access, refresh },
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<RefreshResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user = self.user_service.get_active_user(claims.user_id()?).await?;

        let access = self.jwt_service.generate_access_token(user.id, &user.phone)?;
        Ok(RefreshResponse {
            access,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    pub async fn current_user(&self, user_id: i64) -> AppResult<UserResponse> {
        let user = self.user_service.get_active_user(user_id).await?;
        Ok(UserResponse::from(user))
    }
}
