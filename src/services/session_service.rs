use crate::config::SessionConfig;
use crate::entities::web_session_entity as web_sessions;
use crate::error::AppResult;
use crate::models::SessionData;
use crate::utils::generate_session_key;
use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use chrono::{Duration, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

pub const SESSION_COOKIE: &str = "fitzone_session";

/// Database-backed store for web sessions, keyed by the cookie value.
#[derive(Clone)]
pub struct SessionService {
    pool: DatabaseConnection,
    ttl_secs: i64,
    cookie_secure: bool,
    purge_interval_secs: i64,
    /// Unix seconds of the last purge, shared by all clones.
    last_purge: Arc<AtomicI64>,
}

impl SessionService {
    pub fn new(pool: DatabaseConnection, config: &SessionConfig) -> Self {
        Self {
            pool,
            ttl_secs: config.ttl_secs,
            cookie_secure: config.cookie_secure,
            purge_interval_secs: i64::try_from(config.purge_interval_secs).unwrap_or(i64::MAX),
            last_purge: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Expired or undecodable sessions read as absent.
    pub async fn load(&self, key: &str) -> AppResult<Option<SessionData>> {
        let record = web_sessions::Entity::find_by_id(key.to_string())
            .filter(web_sessions::Column::ExpiresAt.gt(Utc::now()))
            .one(&self.pool)
            .await?;

        Ok(record.and_then(|r| match serde_json::from_str(&r.data) {
            Ok(data) => Some(data),
            Err(e) => {
                log::warn!("Discarding unreadable session payload: {e}");
                None
            }
        }))
    }

    /// Insert or replace the session, pushing its expiry forward.
    pub async fn save(&self, key: &str, data: &SessionData) -> AppResult<()> {
        let model = web_sessions::ActiveModel {
            id: Set(key.to_string()),
            data: Set(serde_json::to_string(data)?),
            expires_at: Set(Utc::now() + Duration::seconds(self.ttl_secs)),
        };
        web_sessions::Entity::insert(model)
            .on_conflict(
                OnConflict::column(web_sessions::Column::Id)
                    .update_columns([
                        web_sessions::Column::Data,
                        web_sessions::Column::ExpiresAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;

        self.purge_if_due().await;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> AppResult<()> {
        web_sessions::Entity::delete_by_id(key.to_string())
            .exec(&self.pool)
            .await?;
        Ok(())
    }

    /// 清理过期会话
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let result = web_sessions::Entity::delete_many()
            .filter(web_sessions::Column::ExpiresAt.lte(Utc::now()))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected)
    }

    /// Purge on the write path, at most once per interval across all workers.
    async fn purge_if_due(&self) {
        let now = Utc::now().timestamp();
        let last = self.last_purge.load(Ordering::Relaxed);
        if now.saturating_sub(last) < self.purge_interval_secs {
            return;
        }
        if self
            .last_purge
            .compare_exchange(last, now, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        match self.purge_expired().await {
            Ok(0) => {}
            Ok(n) => log::info!("Purged {n} expired web sessions"),
            Err(e) => log::warn!("Failed to purge expired web sessions: {e}"),
        }
    }

    pub fn new_key(&self) -> String {
        generate_session_key()
    }

    pub fn cookie(&self, key: String) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, key)
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::seconds(self.ttl_secs))
            .finish()
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "")
            .path("/")
            .http_only(true)
            .finish();
        cookie.make_removal();
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FlashLevel, SessionState};
    use crate::test_support::setup_db;
    use sea_orm::{ActiveModelTrait, PaginatorTrait};

    fn service(db: &DatabaseConnection) -> SessionService {
        SessionService::new(
            db.clone(),
            &SessionConfig {
                ttl_secs: 3600,
                ..SessionConfig::default()
            },
        )
    }

    #[actix_web::test]
    async fn test_save_load_and_overwrite() {
        let db = setup_db().await;
        let sessions = service(&db);
        let key = sessions.new_key();
        assert!(sessions.load(&key).await.unwrap().is_none());

        let mut data = SessionData::default();
        data.begin_verification("5551234567".to_string());
        data.flash(FlashLevel::Success, "OTP sent successfully");
        sessions.save(&key, &data).await.unwrap();
        assert_eq!(sessions.load(&key).await.unwrap(), Some(data.clone()));

        data.authenticate(3);
        sessions.save(&key, &data).await.unwrap();
        let loaded = sessions.load(&key).await.unwrap().unwrap();
        assert_eq!(loaded.state(), SessionState::Authenticated { user_id: 3 });
        assert_eq!(web_sessions::Entity::find().count(&db).await.unwrap(), 1);

        sessions.delete(&key).await.unwrap();
        assert!(sessions.load(&key).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_expired_sessions_are_ignored_and_purged() {
        let db = setup_db().await;
        let sessions = service(&db);
        web_sessions::ActiveModel {
            id: Set("stale".to_string()),
            data: Set("{\"user_id\":1}".to_string()),
            expires_at: Set(Utc::now() - Duration::seconds(1)),
        }
        .insert(&db)
        .await
        .unwrap();

        assert!(sessions.load("stale").await.unwrap().is_none());
        assert_eq!(sessions.purge_expired().await.unwrap(), 1);
    }

    async fn insert_expired(db: &DatabaseConnection, key: &str) {
        web_sessions::ActiveModel {
            id: Set(key.to_string()),
            data: Set("{\"flash\":{\"level\":\"info\",\"text\":\"Please login to view your profile.\"}}".to_string()),
            expires_at: Set(Utc::now() - Duration::seconds(5)),
        }
        .insert(db)
        .await
        .unwrap();
    }

    #[actix_web::test]
    async fn test_save_purges_abandoned_sessions() {
        let db = setup_db().await;
        let sessions = SessionService::new(
            db.clone(),
            &SessionConfig {
                purge_interval_secs: 0,
                ..SessionConfig::default()
            },
        );
        insert_expired(&db, "abandoned-1").await;
        insert_expired(&db, "abandoned-2").await;

        sessions.save("live", &SessionData::default()).await.unwrap();
        assert_eq!(web_sessions::Entity::find().count(&db).await.unwrap(), 1);
        assert!(sessions.load("live").await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn test_save_purges_at_most_once_per_interval() {
        let db = setup_db().await;
        let sessions = SessionService::new(db.clone(), &SessionConfig::default());
        sessions.save("first", &SessionData::default()).await.unwrap();

        insert_expired(&db, "abandoned").await;
        sessions.clone().save("second", &SessionData::default()).await.unwrap();
        assert_eq!(web_sessions::Entity::find().count(&db).await.unwrap(), 3);
    }

    #[test]
    fn test_cookie_attributes() {
        let sessions = SessionService::new(
            DatabaseConnection::Disconnected,
            &SessionConfig {
                ttl_secs: 60,
                cookie_secure: true,
                purge_interval_secs: 3600,
            },
        );
        let cookie = sessions.cookie("abc".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(60)));
    }
}
