use crate::error::AppResult;
use crate::external::{MailService, TwilioService};
use async_trait::async_trait;
use std::sync::Arc;

/// Outbound delivery channel. Callers treat every send as best effort.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send_sms(&self, phone: &str, body: &str) -> AppResult<()>;

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

pub type Notifier = Arc<dyn NotificationSink>;

/// Twilio for SMS, the mail API for email.
pub struct ExternalNotifier {
    twilio: TwilioService,
    mailer: MailService,
}

impl ExternalNotifier {
    pub fn new(twilio: TwilioService, mailer: MailService) -> Self {
        Self { twilio, mailer }
    }

    pub fn into_notifier(self) -> Notifier {
        Arc::new(self)
    }
}

#[async_trait]
impl NotificationSink for ExternalNotifier {
    async fn send_sms(&self, phone: &str, body: &str) -> AppResult<()> {
        self.twilio.send_sms(phone, body).await
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        self.mailer.send(to, subject, body).await
    }
}
