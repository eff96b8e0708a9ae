use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::{Context, anyhow};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use fitzone_backend::{
    commands::{self, Command},
    config::Config,
    database::{create_pool, run_migrations},
    external::{ExternalNotifier, MailService, MediaStorage, TwilioService},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = commands::parse_args(&args)?;

    // 加载配置
    let config = Config::from_toml().map_err(|e| anyhow!("Failed to load configuration: {e}"))?;

    if let Command::CreateSuperuser { phone, password } = command {
        return commands::create_superuser(&config, &phone, &password).await;
    }

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database connection pool")?;

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    // 外部服务
    let twilio_service = TwilioService::new(config.twilio.clone());
    let mail_service =
        MailService::new(config.email.clone()).context("Failed to build mail client")?;
    if !twilio_service.is_enabled() {
        log::warn!("Twilio credentials missing, OTP codes will only be logged at debug level");
    }
    if !mail_service.is_enabled() {
        log::warn!("Email API key missing, booking confirmations are disabled");
    }
    let notifier = ExternalNotifier::new(twilio_service, mail_service).into_notifier();
    let media = MediaStorage::new(&config.media);
    log::info!("Storing uploaded media under {}", media.root().display());

    // 创建服务
    let auth_service = AuthService::new(
        pool.clone(),
        jwt_service.clone(),
        notifier.clone(),
        config.otp.expose_code,
    );
    let user_service = UserService::new(pool.clone());
    let catalog_service = CatalogService::new(pool.clone());
    let booking_service = BookingService::new(pool.clone(), notifier);
    let profile_service = ProfileService::new(pool.clone(), media);
    let session_service = SessionService::new(pool.clone(), &config.session);

    match session_service.purge_expired().await {
        Ok(0) => {}
        Ok(n) => log::info!("Purged {n} expired web sessions"),
        Err(e) => log::error!("Failed to purge expired web sessions: {e}"),
    }

    let upload_limit = config.media.max_upload_bytes;
    let cors_config = config.cors.clone();
    if cors_config.allowed_origins.is_empty() {
        log::warn!("No CORS origins configured, any origin may send credentials");
    }

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors(&cors_config))
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::PayloadConfig::new(upload_limit))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(catalog_service.clone()))
            .app_data(web::Data::new(booking_service.clone()))
            .app_data(web::Data::new(profile_service.clone()))
            .app_data(web::Data::new(session_service.clone()))
            .configure(swagger_config)
            .configure(handlers::web_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::booking_config)
                    .configure(handlers::profile_config)
                    .configure(handlers::catalog_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
