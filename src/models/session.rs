use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

/// Where a web visitor stands in the login cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    PendingVerification { phone: String },
    Authenticated { user_id: i64 },
}

/// Payload of a server-side web session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash: Option<FlashMessage>,
}

impl SessionData {
    pub fn state(&self) -> SessionState {
        match (self.user_id, &self.otp_phone) {
            (Some(user_id), _) => SessionState::Authenticated { user_id },
            (None, Some(phone)) => SessionState::PendingVerification {
                phone: phone.clone(),
            },
            (None, None) => SessionState::Anonymous,
        }
    }

    /// After a successful OTP request. A fresh request ends any earlier login,
    /// so a session is never both pending and authenticated.
    pub fn begin_verification(&mut self, phone: String) {
        self.user_id = None;
        self.otp_phone = Some(phone);
    }

    /// After a successful OTP verification; the pending marker is consumed.
    pub fn authenticate(&mut self, user_id: i64) {
        self.user_id = Some(user_id);
        self.otp_phone = None;
    }

    pub fn flash(&mut self, level: FlashLevel, text: impl Into<String>) {
        self.flash = Some(FlashMessage {
            level,
            text: text.into(),
        });
    }

    pub fn take_flash(&mut self) -> Option<FlashMessage> {
        self.flash.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_cycle() {
        let mut data = SessionData::default();
        assert_eq!(data.state(), SessionState::Anonymous);

        data.begin_verification("5551234567".to_string());
        assert_eq!(
            data.state(),
            SessionState::PendingVerification {
                phone: "5551234567".to_string()
            }
        );

        data.authenticate(7);
        assert_eq!(data.state(), SessionState::Authenticated { user_id: 7 });
        assert!(data.otp_phone.is_none());
    }

    #[test]
    fn test_new_otp_request_drops_login() {
        let mut data = SessionData::default();
        data.authenticate(7);
        data.begin_verification("5559876543".to_string());
        assert_eq!(
            data.state(),
            SessionState::PendingVerification {
                phone: "5559876543".to_string()
            }
        );
    }

    #[test]
    fn test_flash_is_one_shot() {
        let mut data = SessionData::default();
        data.flash(FlashLevel::Success, "OTP sent successfully");
        assert_eq!(data.take_flash().unwrap().text, "OTP sent successfully");
        assert!(data.take_flash().is_none());
    }

    #[test]
    fn test_serialized_form_omits_empty_fields() {
        let json = serde_json::to_string(&SessionData::default()).unwrap();
        assert_eq!(json, "{}");
        let back: SessionData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.state(), SessionState::Anonymous);
    }
}
