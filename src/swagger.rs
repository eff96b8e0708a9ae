use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::PreferredTime;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::request_otp,
        handlers::auth::verify_otp,
        handlers::auth::refresh,
        handlers::auth::me,
        handlers::booking::list_bookings,
        handlers::booking::upcoming_bookings,
        handlers::booking::get_booking,
        handlers::booking::create_booking,
        handlers::profile::get_profile,
        handlers::profile::update_profile,
        handlers::profile::upload_photo,
        handlers::catalog::list_programs,
        handlers::catalog::get_program,
        handlers::catalog::list_trainers,
        handlers::catalog::get_trainer,
    ),
    components(
        schemas(
            UserResponse,
            RequestOtpRequest,
            RequestOtpResponse,
            VerifyOtpRequest,
            AuthTokens,
            AuthResponse,
            RefreshRequest,
            RefreshResponse,
            CreateBookingRequest,
            BookingResponse,
            PreferredTime,
            ProfileResponse,
            UpdateProfileRequest,
            ProgramResponse,
            TrainerResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Phone OTP login and tokens"),
        (name = "booking", description = "Class bookings"),
        (name = "profile", description = "Member profile"),
        (name = "catalog", description = "Programs and trainers"),
    ),
    info(
        title = "FitZone Backend API",
        version = "1.0.0",
        description = "FitZone member booking REST API"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_api_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/auth/verify-otp"));
        assert!(paths.contains_key("/bookings/{id}"));
        assert!(paths.contains_key("/profiles/me/photo"));
        assert!(
            doc.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("bearer_auth"))
        );
    }
}
