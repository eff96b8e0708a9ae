use chrono::{DateTime, Duration, Utc};
use sea_orm::entity::prelude::*;

/// Lifetime of an OTP challenge, counted from `created_at`.
pub const OTP_TTL_SECONDS: i64 = 300;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "otps")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub phone: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.created_at + Duration::seconds(OTP_TTL_SECONDS)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge_at(created_at: DateTime<Utc>) -> Model {
        Model {
            id: 1,
            phone: "5551234567".to_string(),
            code: "123456".to_string(),
            created_at,
        }
    }

    #[test]
    fn test_not_expired_inside_window() {
        let t = Utc::now();
        let otp = challenge_at(t);
        assert!(!otp.is_expired_at(t));
        assert!(!otp.is_expired_at(t + Duration::seconds(4 * 60 + 59)));
    }

    #[test]
    fn test_exactly_five_minutes_is_still_valid() {
        let t = Utc::now();
        assert!(!challenge_at(t).is_expired_at(t + Duration::minutes(5)));
    }

    #[test]
    fn test_expired_after_window() {
        let t = Utc::now();
        let otp = challenge_at(t);
        assert!(otp.is_expired_at(t + Duration::seconds(5 * 60 + 1)));
        assert!(otp.is_expired_at(t + Duration::minutes(6)));
    }
}
