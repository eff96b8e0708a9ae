use crate::entities::{PreferredTime, booking_entity as bookings};
use crate::models::{ProgramResponse, TrainerResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Booking submission shared by the API and the web form.
///
/// Required fields are `Option` so that a missing value is reported as a
/// validation error with the field name rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    #[schema(example = 1)]
    pub program: Option<i64>,
    #[schema(example = 2)]
    pub trainer: Option<i64>,
    #[schema(example = "2026-11-02")]
    pub preferred_date: Option<String>,
    #[schema(example = "morning")]
    pub preferred_time: Option<String>,
    pub message: Option<String>,
    /// Display name to store on the profile and snapshot on the booking.
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingResponse {
    pub id: i64,
    pub user: i64,
    pub user_name: String,
    pub user_phone: String,
    pub program: i64,
    pub program_details: Option<ProgramResponse>,
    pub trainer: Option<i64>,
    pub trainer_details: Option<TrainerResponse>,
    pub preferred_date: NaiveDate,
    pub preferred_time: PreferredTime,
    pub time_display: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl BookingResponse {
    pub fn new(
        booking: bookings::Model,
        program: Option<ProgramResponse>,
        trainer: Option<TrainerResponse>,
    ) -> Self {
        Self {
            id: booking.id,
            user: booking.user_id,
            user_name: booking.user_name,
            user_phone: booking.user_phone,
            program: booking.program_id,
            program_details: program,
            trainer: booking.trainer_id,
            trainer_details: trainer,
            preferred_date: booking.preferred_date,
            time_display: booking.preferred_time.label().to_string(),
            preferred_time: booking.preferred_time,
            message: booking.message,
            created_at: booking.created_at,
        }
    }
}
