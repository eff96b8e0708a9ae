use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::AuthService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/auth/request-otp",
    tag = "auth",
    request_body = RequestOtpRequest,
    responses(
        (status = 200, description = "OTP issued", body = RequestOtpResponse),
        (status = 400, description = "Invalid phone number")
    )
)]
pub async fn request_otp(
    auth_service: web::Data<AuthService>,
    request: web::Json<RequestOtpRequest>,
) -> Result<HttpResponse> {
    match auth_service.request_otp(&request.phone).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "OTP sent successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/verify-otp",
    tag = "auth",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Verified; tokens issued", body = AuthResponse),
        (status = 400, description = "OTP_NOT_FOUND, OTP_EXPIRED or OTP_MISMATCH")
    )
)]
pub async fn verify_otp(
    auth_service: web::Data<AuthService>,
    request: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse> {
    match auth_service.login_with_otp(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh(
    auth_service: web::Data<AuthService>,
    request: web::Json<RefreshRequest>,
) -> Result<HttpResponse> {
    match auth_service.refresh_token(&request.refresh).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current identity", body = UserResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(auth_service: web::Data<AuthService>, req: HttpRequest) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match auth_service.current_user(user_id).await {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/request-otp", web::post().to(request_otp))
            .route("/verify-otp", web::post().to(verify_otp))
            .route("/refresh", web::post().to(refresh))
            .route("/me", web::get().to(me)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestContext;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_otp_login_round() {
        let ctx = TestContext::new().await;
        let app = test::init_service(
            App::new()
                .wrap(ctx.auth_middleware())
                .configure(|cfg| ctx.register(cfg))
                .service(web::scope("/api/v1").configure(auth_config)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/request-otp")
            .set_json(json!({"phone": "555-123-4567"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["phone"], "5551234567");
        let code = body["data"]["otp"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/verify-otp")
            .set_json(json!({"phone": "5551234567", "otp": "000000"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "OTP_MISMATCH");

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/verify-otp")
            .set_json(json!({"phone": "5551234567", "otp": code}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["user"]["is_verified"], true);
        let access = body["data"]["tokens"]["access"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(("Authorization", format!("Bearer {access}")))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["phone"], "5551234567");
    }

    #[actix_web::test]
    async fn test_me_requires_token() {
        let ctx = TestContext::new().await;
        let app = test::init_service(
            App::new()
                .wrap(ctx.auth_middleware())
                .configure(|cfg| ctx.register(cfg))
                .service(web::scope("/api/v1").configure(auth_config)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/auth/me").to_request();
        let resp = test::try_call_service(&app, req).await;
        let status = match resp {
            Ok(resp) => resp.status(),
            Err(e) => e.as_response_error().status_code(),
        };
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_request();
        let status = match test::try_call_service(&app, req).await {
            Ok(resp) => resp.status(),
            Err(e) => e.as_response_error().status_code(),
        };
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_invalid_phone_is_validation_error() {
        let ctx = TestContext::new().await;
        let app = test::init_service(
            App::new()
                .configure(|cfg| ctx.register(cfg))
                .service(web::scope("/api/v1").configure(auth_config)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/request-otp")
            .set_json(json!({"phone": "12345"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
