use crate::entities::profile_entity as profiles;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// BMI from height in centimetres and weight in kilograms, rounded to two decimals.
/// Absent (not zero) unless both measurements are set.
pub fn compute_bmi(height_cm: Option<f64>, weight_kg: Option<f64>) -> Option<f64> {
    match (height_cm, weight_kg) {
        (Some(h), Some(w)) if h > 0.0 && w > 0.0 => {
            let height_m = h / 100.0;
            let bmi = w / (height_m * height_m);
            Some((bmi * 100.0).round() / 100.0)
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub id: i64,
    pub user: i64,
    pub name: String,
    pub email: String,
    pub profile_photo: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub bmi: Option<f64>,
    pub medical_notes: String,
    pub emergency_contact: String,
    pub updated_at: DateTime<Utc>,
}

impl From<profiles::Model> for ProfileResponse {
    fn from(p: profiles::Model) -> Self {
        Self {
            id: p.id,
            user: p.user_id,
            bmi: compute_bmi(p.height, p.weight),
            name: p.name,
            email: p.email,
            profile_photo: p.profile_photo,
            height: p.height,
            weight: p.weight,
            medical_notes: p.medical_notes,
            emergency_contact: p.emergency_contact,
            updated_at: p.updated_at,
        }
    }
}

/// Full overwrite of the editable profile fields; omitted fields are cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,
    #[schema(example = 175.0)]
    pub height: Option<f64>,
    #[schema(example = 70.0)]
    pub weight: Option<f64>,
    pub medical_notes: Option<String>,
    pub emergency_contact: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_calculated_correctly() {
        // 70 / (1.75^2) = 22.857...
        assert_eq!(compute_bmi(Some(175.0), Some(70.0)), Some(22.86));
    }

    #[test]
    fn test_bmi_absent_without_both_measurements() {
        assert_eq!(compute_bmi(None, Some(70.0)), None);
        assert_eq!(compute_bmi(Some(175.0), None), None);
        assert_eq!(compute_bmi(None, None), None);
    }

    #[test]
    fn test_bmi_absent_for_zero_height() {
        assert_eq!(compute_bmi(Some(0.0), Some(70.0)), None);
    }
}
