use crate::entities::{PreferredTime, booking_entity as bookings};
use crate::error::{AppError, AppResult};
use crate::external::Notifier;
use crate::models::*;
use crate::services::{CatalogService, ProfileService, UserService};
use crate::utils::{non_blank, validate_email};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

const CONFIRMATION_SUBJECT: &str = "FitZone - Booking Confirmation";

/// Validated booking input, produced before anything is written.
struct BookingDraft {
    program: ProgramResponse,
    trainer: Option<TrainerResponse>,
    preferred_date: NaiveDate,
    preferred_time: PreferredTime,
    message: String,
    name: Option<String>,
    email: Option<String>,
}

#[derive(Clone)]
pub struct BookingService {
    pool: DatabaseConnection,
    user_service: UserService,
    catalog_service: CatalogService,
    notifier: Notifier,
}

impl BookingService {
    pub fn new(pool: DatabaseConnection, notifier: Notifier) -> Self {
        let user_service = UserService::new(pool.clone());
        let catalog_service = CatalogService::new(pool.clone());
        Self {
            pool,
            user_service,
            catalog_service,
            notifier,
        }
    }

    async fn prepare(&self, request: CreateBookingRequest) -> AppResult<BookingDraft> {
        let date = non_blank(request.preferred_date.as_deref());
        let time = non_blank(request.preferred_time.as_deref());

        let mut missing = Vec::new();
        if request.program.is_none() {
            missing.push("program");
        }
        if date.is_none() {
            missing.push("preferred_date");
        }
        if time.is_none() {
            missing.push("preferred_time");
        }
        let (Some(program_id), Some(date), Some(time)) = (request.program, date, time) else {
            return Err(AppError::ValidationError(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        };

        let preferred_date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| {
            AppError::ValidationError(
                "preferred_date: Date has wrong format. Use YYYY-MM-DD.".to_string(),
            )
        })?;
        let preferred_time: PreferredTime = time
            .parse()
            .map_err(|e| AppError::ValidationError(format!("preferred_time: {e}")))?;

        let email = non_blank(request.email.as_deref());
        if let Some(email) = &email {
            validate_email(email)?;
        }

        let program = self.catalog_service.get_program(program_id).await?.into();
        let trainer = match request.trainer {
            Some(id) => Some(self.catalog_service.get_trainer(id).await?.into()),
            None => None,
        };

        Ok(BookingDraft {
            program,
            trainer,
            preferred_date,
            preferred_time,
            message: request.message.unwrap_or_default(),
            name: non_blank(request.name.as_deref()),
            email,
        })
    }

    /// 创建预约
    ///
    /// Profile upsert and booking insert commit together. The confirmation email is
    /// sent afterwards and its failure never reaches the caller.
    pub async fn create_booking(
        &self,
        user_id: i64,
        request: CreateBookingRequest,
    ) -> AppResult<BookingResponse> {
        let user = self.user_service.get_active_user(user_id).await?;
        let draft = self.prepare(request).await?;

        let txn = self.pool.begin().await?;
        if draft.name.is_some() || draft.email.is_some() {
            ProfileService::upsert_contact_in(
                &txn,
                &user,
                draft.name.as_deref(),
                draft.email.as_deref(),
            )
            .await?;
        }
        if let Some(email) = &draft.email {
            UserService::set_email_in(&txn, user.id, email).await?;
        }
        let user_name = match &draft.name {
            Some(name) => name.clone(),
            None => UserService::full_name(&txn, &user).await?,
        };
        let booking = bookings::ActiveModel {
            user_id: Set(user.id),
            user_name: Set(user_name),
            user_phone: Set(user.phone.clone()),
            program_id: Set(draft.program.id),
            trainer_id: Set(draft.trainer.as_ref().map(|t| t.id)),
            preferred_date: Set(draft.preferred_date),
            preferred_time: Set(draft.preferred_time),
            message: Set(draft.message.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!("Booking {} created for user {}", booking.id, user.id);

        if let Some(to) = draft.email.clone().or(user.email.clone()) {
            self.send_confirmation(&to, &booking, &draft).await;
        }

        Ok(BookingResponse::new(booking, Some(draft.program), draft.trainer))
    }

    async fn send_confirmation(&self, to: &str, booking: &bookings::Model, draft: &BookingDraft) {
        let trainer_name = draft
            .trainer
            .as_ref()
            .map(|t| t.name.as_str())
            .unwrap_or("our team");
        let body = format!(
            "Dear {},\n\nYour class booking for {} with {} on {} ({}) has been confirmed.\n\nSee you at the gym!\n\nFitZone Team",
            booking.user_name,
            draft.program.title,
            trainer_name,
            booking.preferred_date.format("%Y-%m-%d"),
            booking.preferred_time.label(),
        );
        if let Err(e) = self.notifier.send_email(to, CONFIRMATION_SUBJECT, &body).await {
            log::warn!("Booking {} confirmation email failed: {e}", booking.id);
        }
    }

    async fn with_details(&self, models: Vec<bookings::Model>) -> AppResult<Vec<BookingResponse>> {
        let program_ids: Vec<i64> = models.iter().map(|b| b.program_id).collect();
        let trainer_ids: Vec<i64> = models.iter().filter_map(|b| b.trainer_id).collect();
        let programs = self.catalog_service.programs_by_ids(&program_ids).await?;
        let trainers = self.catalog_service.trainers_by_ids(&trainer_ids).await?;

        Ok(models
            .into_iter()
            .map(|b| {
                let program = programs.get(&b.program_id).cloned();
                let trainer = b.trainer_id.and_then(|id| trainers.get(&id).cloned());
                BookingResponse::new(b, program, trainer)
            })
            .collect())
    }

    /// 预约列表（最新在前）
    pub async fn list_bookings(&self, user_id: i64) -> AppResult<Vec<BookingResponse>> {
        let models = bookings::Entity::find()
            .filter(bookings::Column::UserId.eq(user_id))
            .order_by_desc(bookings::Column::CreatedAt)
            .order_by_desc(bookings::Column::Id)
            .all(&self.pool)
            .await?;
        self.with_details(models).await
    }

    pub async fn list_upcoming(
        &self,
        user_id: i64,
        today: NaiveDate,
    ) -> AppResult<Vec<BookingResponse>> {
        let models = bookings::Entity::find()
            .filter(bookings::Column::UserId.eq(user_id))
            .filter(bookings::Column::PreferredDate.gte(today))
            .order_by_desc(bookings::Column::CreatedAt)
            .order_by_desc(bookings::Column::Id)
            .all(&self.pool)
            .await?;
        self.with_details(models).await
    }

    /// Another member's booking id is reported as not found.
    pub async fn get_booking(&self, user_id: i64, booking_id: i64) -> AppResult<BookingResponse> {
        let booking = bookings::Entity::find_by_id(booking_id)
            .filter(bookings::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        let mut detailed = self.with_details(vec![booking]).await?;
        detailed
            .pop()
            .ok_or_else(|| AppError::InternalError("Booking lookup returned nothing".to_string()))
    }
}
