use crate::error::AppError;
use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::ProfileService;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/profiles/me",
    tag = "profile",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Caller's profile with BMI", body = ProfileResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_profile(
    profile_service: web::Data<ProfileService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match profile_service.get_profile(user_id).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/profiles/me",
    tag = "profile",
    request_body = UpdateProfileRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Profile replaced", body = ProfileResponse),
        (status = 400, description = "Invalid email or measurement")
    )
)]
pub async fn update_profile(
    profile_service: web::Data<ProfileService>,
    req: HttpRequest,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match profile_service
        .update_profile(user_id, request.into_inner())
        .await
    {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile,
            "message": "Profile updated successfully!"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// Raw image upload; the body is the file itself.
#[utoipa::path(
    put,
    path = "/profiles/me/photo",
    tag = "profile",
    request_body(content = Vec<u8>, content_type = "image/*"),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Photo stored", body = ProfileResponse),
        (status = 400, description = "Not an accepted image")
    )
)]
pub async fn upload_photo(
    profile_service: web::Data<ProfileService>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    let Some(content_type) = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return Ok(AppError::ValidationError(
            "profile_photo: Content-Type header is required.".to_string(),
        )
        .error_response());
    };

    match profile_service
        .update_photo(user_id, content_type, &body)
        .await
    {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn profile_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/profiles")
            .route("/me", web::get().to(get_profile))
            .route("/me", web::put().to(update_profile))
            .route("/me/photo", web::put().to(upload_photo)),
    );
}
