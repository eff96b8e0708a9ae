use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(10))")]
#[serde(rename_all = "snake_case")]
pub enum PreferredTime {
    #[sea_orm(string_value = "morning")]
    Morning,
    #[sea_orm(string_value = "afternoon")]
    Afternoon,
    #[sea_orm(string_value = "evening")]
    Evening,
}

impl PreferredTime {
    pub fn label(&self) -> &'static str {
        match self {
            PreferredTime::Morning => "Morning (6AM - 12PM)",
            PreferredTime::Afternoon => "Afternoon (12PM - 6PM)",
            PreferredTime::Evening => "Evening (6PM - 10PM)",
        }
    }
}

impl std::fmt::Display for PreferredTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreferredTime::Morning => write!(f, "morning"),
            PreferredTime::Afternoon => write!(f, "afternoon"),
            PreferredTime::Evening => write!(f, "evening"),
        }
    }
}

impl std::str::FromStr for PreferredTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "morning" => Ok(PreferredTime::Morning),
            "afternoon" => Ok(PreferredTime::Afternoon),
            "evening" => Ok(PreferredTime::Evening),
            other => Err(format!("\"{other}\" is not a valid choice")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    // snapshot of the member at booking time, not kept in sync with later edits
    pub user_name: String,
    pub user_phone: String,
    pub program_id: i64,
    pub trainer_id: Option<i64>,
    pub preferred_date: NaiveDate,
    pub preferred_time: PreferredTime,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
