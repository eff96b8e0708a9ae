use crate::error::{AppError, AppResult};
use crate::models::SessionData;
use crate::services::{SESSION_COOKIE, SessionService};
use actix_web::{Error, FromRequest, HttpRequest, HttpResponse, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

/// Web session resolved from the `fitzone_session` cookie.
///
/// Changes are written back by `respond`, which also sets the cookie.
pub struct WebSession {
    key: Option<String>,
    data: SessionData,
    renew: bool,
}

impl WebSession {
    pub fn data(&self) -> &SessionData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut SessionData {
        &mut self.data
    }

    /// Issue a new key on the next `respond`, dropping the stored record under the old one.
    pub fn cycle_key(&mut self) {
        self.renew = true;
    }

    /// Forget everything and start over under a new key.
    pub fn flush(&mut self) {
        self.data = SessionData::default();
        self.renew = true;
    }

    pub async fn respond(
        self,
        sessions: &SessionService,
        mut response: HttpResponse,
    ) -> AppResult<HttpResponse> {
        let key = match self.key {
            Some(old) if self.renew => {
                sessions.delete(&old).await?;
                None
            }
            other => other,
        };

        let cookie = if self.data == SessionData::default() {
            match key {
                Some(key) => {
                    sessions.delete(&key).await?;
                    sessions.removal_cookie()
                }
                None if self.renew => sessions.removal_cookie(),
                None => return Ok(response),
            }
        } else {
            let key = key.unwrap_or_else(|| sessions.new_key());
            sessions.save(&key, &self.data).await?;
            sessions.cookie(key)
        };

        response
            .add_cookie(&cookie)
            .map_err(|e| AppError::InternalError(format!("Failed to set session cookie: {e}")))?;
        Ok(response)
    }
}

impl FromRequest for WebSession {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let sessions = req.app_data::<web::Data<SessionService>>().cloned();
        let key = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());

        Box::pin(async move {
            let sessions = sessions.ok_or_else(|| {
                AppError::ConfigError("SessionService is not registered".to_string())
            })?;

            let (key, data) = match key {
                Some(key) => match sessions.load(&key).await? {
                    Some(data) => (Some(key), data),
                    // unknown or expired key: start a fresh session
                    None => (None, SessionData::default()),
                },
                None => (None, SessionData::default()),
            };

            Ok(WebSession {
                key,
                data,
                renew: false,
            })
        })
    }
}
