use crate::error::{AppError, AppResult};

/// 输入的原始手机号最长字符数
pub const MAX_RAW_PHONE_LEN: usize = 20;
/// 去除非数字字符后至少需要的位数
pub const MIN_PHONE_DIGITS: usize = 10;

/// Strip everything but digits and require at least ten of them.
///
/// The normalized value is the natural key of an identity, so every entry
/// point (OTP request, OTP verify, staff creation) goes through here.
pub fn normalize_phone(raw: &str) -> AppResult<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::ValidationError(
            "phone: This field is required.".to_string(),
        ));
    }
    if raw.chars().count() > MAX_RAW_PHONE_LEN {
        return Err(AppError::ValidationError(format!(
            "phone: Ensure this field has no more than {MAX_RAW_PHONE_LEN} characters."
        )));
    }

    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < MIN_PHONE_DIGITS {
        return Err(AppError::ValidationError(
            "phone: Phone number too short".to_string(),
        ));
    }

    Ok(digits)
}
