//! Fixtures shared by the service and handler tests.

use crate::config::{MediaConfig, SessionConfig};
use crate::entities::{program_entity as programs, trainer_entity as trainers};
use crate::error::{AppError, AppResult};
use crate::external::{MediaStorage, NotificationSink, Notifier};
use crate::middlewares::AuthMiddleware;
use crate::services::*;
use crate::utils::JwtService;
use actix_web::web;
use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use std::sync::{Arc, Mutex};

/// Fresh in-memory SQLite database with all migrations applied.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("failed to run migrations");
    db
}

pub async fn seed_program(db: &DatabaseConnection, title: &str) -> programs::Model {
    programs::ActiveModel {
        title: Set(title.to_string()),
        description: Set(format!("{title} description")),
        duration: Set("3 months".to_string()),
        price: Set(Some(49.99)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to seed program")
}

pub async fn seed_trainer(db: &DatabaseConnection, name: &str) -> trainers::Model {
    trainers::ActiveModel {
        name: Set(name.to_string()),
        specialization: Set("Strength".to_string()),
        bio: Set(String::new()),
        experience: Set("5 years".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to seed trainer")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Sms { phone: String, body: String },
    Email { to: String, subject: String, body: String },
}

/// Records every message; optionally fails each send after recording it.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Sent>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn outcome(&self) -> AppResult<()> {
        if self.fail {
            Err(AppError::ExternalApiError("delivery refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn send_sms(&self, phone: &str, body: &str) -> AppResult<()> {
        self.sent.lock().unwrap().push(Sent::Sms {
            phone: phone.to_string(),
            body: body.to_string(),
        });
        self.outcome()
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        self.sent.lock().unwrap().push(Sent::Email {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        self.outcome()
    }
}

pub fn as_notifier(recorder: &Arc<RecordingNotifier>) -> Notifier {
    recorder.clone()
}

/// Every service wired against one in-memory database and a recording notifier.
pub struct TestContext {
    pub db: DatabaseConnection,
    pub notifier: Arc<RecordingNotifier>,
    pub jwt: JwtService,
    pub auth: AuthService,
    pub users: UserService,
    pub catalog: CatalogService,
    pub bookings: BookingService,
    pub profiles: ProfileService,
    pub sessions: SessionService,
}

impl TestContext {
    pub async fn new() -> Self {
        let db = setup_db().await;
        let notifier = RecordingNotifier::new();
        let jwt = JwtService::new("test-secret", 3600, 86_400);
        let media_root =
            std::env::temp_dir().join(format!("fitzone-media-{}", uuid::Uuid::new_v4()));
        let media = MediaStorage::new(&MediaConfig {
            root: media_root.to_string_lossy().to_string(),
            max_upload_bytes: 1024 * 1024,
        });

        Self {
            auth: AuthService::new(db.clone(), jwt.clone(), as_notifier(&notifier), true),
            users: UserService::new(db.clone()),
            catalog: CatalogService::new(db.clone()),
            bookings: BookingService::new(db.clone(), as_notifier(&notifier)),
            profiles: ProfileService::new(db.clone(), media),
            sessions: SessionService::new(db.clone(), &SessionConfig::default()),
            db,
            notifier,
            jwt,
        }
    }

    pub fn auth_middleware(&self) -> AuthMiddleware {
        AuthMiddleware::new(self.jwt.clone())
    }

    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.auth.clone()))
            .app_data(web::Data::new(self.users.clone()))
            .app_data(web::Data::new(self.catalog.clone()))
            .app_data(web::Data::new(self.bookings.clone()))
            .app_data(web::Data::new(self.profiles.clone()))
            .app_data(web::Data::new(self.sessions.clone()));
    }

    /// Bearer header value for a fresh verified member.
    pub async fn bearer_for(&self, phone: &str) -> (i64, String) {
        let user = UserService::get_or_create_in(&self.db, phone)
            .await
            .expect("failed to create member");
        let token = self
            .jwt
            .generate_access_token(user.id, &user.phone)
            .expect("failed to sign token");
        (user.id, format!("Bearer {token}"))
    }
}
