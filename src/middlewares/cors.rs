use crate::config::CorsConfig;
use actix_cors::Cors;

pub fn create_cors(config: &CorsConfig) -> Cors {
    let cors = if config.allowed_origins.is_empty() {
        // 未配置来源时允许任意来源
        Cors::default().allowed_origin_fn(|_, _req_head| true)
    } else {
        config
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
        .allow_any_header()
        // session cookie for the /booking pages
        .supports_credentials()
        .max_age(3600)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
    use actix_web::{App, HttpResponse, test, web};

    async fn allow_origin_for(config: &CorsConfig, origin: &str) -> Option<String> {
        let app = test::init_service(
            App::new()
                .wrap(create_cors(config))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((ORIGIN, origin))
            .to_request();
        let resp = test::call_service(&app, req).await;
        resp.headers()
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    #[actix_web::test]
    async fn test_configured_origins_only() {
        let config = CorsConfig {
            allowed_origins: vec!["https://fitzone.example".to_string()],
        };
        assert_eq!(
            allow_origin_for(&config, "https://fitzone.example").await.as_deref(),
            Some("https://fitzone.example")
        );
        assert_eq!(allow_origin_for(&config, "https://other.example").await, None);
    }

    #[actix_web::test]
    async fn test_empty_list_allows_any_origin() {
        let config = CorsConfig::default();
        assert_eq!(
            allow_origin_for(&config, "http://localhost:3000").await.as_deref(),
            Some("http://localhost:3000")
        );
    }
}
