use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::BookingService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;

#[utoipa::path(
    get,
    path = "/bookings",
    tag = "booking",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Caller's bookings, newest first", body = [BookingResponse]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_bookings(
    booking_service: web::Data<BookingService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match booking_service.list_bookings(user_id).await {
        Ok(bookings) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": bookings
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/bookings/upcoming",
    tag = "booking",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Bookings dated today or later", body = [BookingResponse]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn upcoming_bookings(
    booking_service: web::Data<BookingService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    let today = Utc::now().date_naive();
    match booking_service.list_upcoming(user_id, today).await {
        Ok(bookings) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": bookings
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "booking",
    params(("id" = i64, Path, description = "Booking id")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Booking", body = BookingResponse),
        (status = 404, description = "Not one of the caller's bookings")
    )
)]
pub async fn get_booking(
    booking_service: web::Data<BookingService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match booking_service.get_booking(user_id, path.into_inner()).await {
        Ok(booking) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": booking
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/bookings",
    tag = "booking",
    request_body = CreateBookingRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Booking created", body = BookingResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 404, description = "Unknown program or trainer")
    )
)]
pub async fn create_booking(
    booking_service: web::Data<BookingService>,
    req: HttpRequest,
    request: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match booking_service
        .create_booking(user_id, request.into_inner())
        .await
    {
        Ok(booking) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": booking,
            "message": "Booking created"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn booking_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::get().to(list_bookings))
            .route("", web::post().to(create_booking))
            .route("/upcoming", web::get().to(upcoming_bookings))
            .route("/{id}", web::get().to(get_booking)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_create_and_read_back() {
        let ctx = TestContext::new().await;
        let program = seed_program(&ctx.db, "Yoga").await;
        let (_, bearer) = ctx.bearer_for("5551234567").await;
        let (_, other_bearer) = ctx.bearer_for("5559876543").await;
        let app = test::init_service(
            App::new()
                .wrap(ctx.auth_middleware())
                .configure(|cfg| ctx.register(cfg))
                .service(web::scope("/api/v1").configure(booking_config)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/bookings")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({
                "program": program.id,
                "preferred_date": "2030-05-01",
                "preferred_time": "evening"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let booking_id = body["data"]["id"].as_i64().unwrap();
        assert_eq!(body["data"]["time_display"], "Evening (6PM - 10PM)");
        assert_eq!(body["data"]["trainer"], Value::Null);

        let req = test::TestRequest::get()
            .uri("/api/v1/bookings/upcoming")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/bookings/{booking_id}"))
            .insert_header(("Authorization", other_bearer))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_missing_program_is_rejected() {
        let ctx = TestContext::new().await;
        let (_, bearer) = ctx.bearer_for("5551234567").await;
        let app = test::init_service(
            App::new()
                .wrap(ctx.auth_middleware())
                .configure(|cfg| ctx.register(cfg))
                .service(web::scope("/api/v1").configure(booking_config)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/bookings")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({"preferred_date": "2030-05-01", "preferred_time": "evening"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri("/api/v1/bookings")
            .insert_header(("Authorization", bearer))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }
}
