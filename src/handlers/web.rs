//! Cookie-session booking pages. Every state change answers with a 302 redirect
//! and leaves a one-shot flash message in the session; the GET views return
//! their page context as JSON.

use crate::error::{AppError, AppResult, OtpFailure};
use crate::middlewares::WebSession;
use crate::models::*;
use crate::services::{
    AuthService, BookingService, CatalogService, ProfileService, SessionService, UserService,
};
use crate::utils::{non_blank, parse_measurement};
use actix_multipart::{Multipart, MultipartError};
use actix_web::http::header::LOCATION;
use actix_web::{Either, HttpResponse, ResponseError, Result, web};
use futures_util::TryStreamExt;
use serde::Deserialize;
use serde_json::json;

const SEND_OTP_PAGE: &str = "/booking/send-otp/";
const VERIFY_OTP_PAGE: &str = "/booking/verify-otp/";
const BOOKING_PAGE: &str = "/booking/";
const PROFILE_PAGE: &str = "/booking/profile/";
const HOME_PAGE: &str = "/";

#[derive(Debug, Deserialize)]
pub struct SendOtpForm {
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpForm {
    #[serde(default)]
    pub otp: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BookingForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub program: Option<String>,
    pub trainer: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub emergency_contact: Option<String>,
    pub medical_notes: Option<String>,
}

/// Image file posted with the profile form.
struct PhotoUpload {
    content_type: String,
    bytes: Vec<u8>,
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::ValidationError(format!("Malformed form data: {e}"))
}

/// Reads a `multipart/form-data` profile form. An empty file input counts as no photo.
async fn read_profile_multipart(
    mut payload: Multipart,
) -> AppResult<(ProfileForm, Option<PhotoUpload>)> {
    let mut form = ProfileForm::default();
    let mut photo = None;

    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let content_type = field.content_type().map(|mime| mime.to_string());
        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
            bytes.extend_from_slice(&chunk);
        }

        if name == "profile_photo" {
            if !bytes.is_empty() {
                photo = Some(PhotoUpload {
                    content_type: content_type.unwrap_or_default(),
                    bytes,
                });
            }
            continue;
        }

        let value = String::from_utf8(bytes)
            .map_err(|_| AppError::ValidationError(format!("{name}: Enter valid text.")))?;
        match name.as_str() {
            "name" => form.name = Some(value),
            "email" => form.email = Some(value),
            "height" => form.height = Some(value),
            "weight" => form.weight = Some(value),
            "emergency_contact" => form.emergency_contact = Some(value),
            "medical_notes" => form.medical_notes = Some(value),
            _ => {}
        }
    }

    Ok((form, photo))
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .finish()
}

async fn finish(
    session: WebSession,
    sessions: &SessionService,
    response: HttpResponse,
) -> Result<HttpResponse> {
    match session.respond(sessions, response).await {
        Ok(response) => Ok(response),
        Err(e) => Ok(e.error_response()),
    }
}

/// Flash and redirect, the common ending of every form post.
async fn flash_redirect(
    mut session: WebSession,
    sessions: &SessionService,
    level: FlashLevel,
    text: impl Into<String>,
    location: &str,
) -> Result<HttpResponse> {
    session.data_mut().flash(level, text);
    finish(session, sessions, redirect(location)).await
}

/// Active member behind the session. A stale id (deleted or disabled member) logs the visitor out.
async fn session_member(
    session: &mut WebSession,
    users: &UserService,
) -> AppResult<Option<UserResponse>> {
    let SessionState::Authenticated { user_id } = session.data().state() else {
        return Ok(None);
    };
    match users.get_active_user(user_id).await {
        Ok(user) => Ok(Some(UserResponse::from(user))),
        Err(AppError::AuthError(msg)) => {
            log::warn!("Dropping web session for user {user_id}: {msg}");
            session.flush();
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn validation_message(e: &AppError) -> Option<String> {
    match e {
        AppError::ValidationError(msg) | AppError::NotFound(msg) => Some(msg.clone()),
        _ => None,
    }
}

/// Context for both OTP pages: the phone awaiting a code, if any.
pub async fn otp_page(session: WebSession) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": { "otp_phone": session.data().otp_phone }
    })))
}

pub async fn send_otp(
    auth_service: web::Data<AuthService>,
    sessions: web::Data<SessionService>,
    mut session: WebSession,
    form: web::Form<SendOtpForm>,
) -> Result<HttpResponse> {
    match auth_service.request_otp(&form.phone).await {
        Ok(issued) => {
            session.data_mut().begin_verification(issued.phone);
            flash_redirect(
                session,
                &sessions,
                FlashLevel::Success,
                "OTP sent successfully",
                VERIFY_OTP_PAGE,
            )
            .await
        }
        Err(AppError::ValidationError(msg)) => {
            flash_redirect(session, &sessions, FlashLevel::Error, msg, SEND_OTP_PAGE).await
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn verify_otp(
    auth_service: web::Data<AuthService>,
    sessions: web::Data<SessionService>,
    mut session: WebSession,
    form: web::Form<VerifyOtpForm>,
) -> Result<HttpResponse> {
    let SessionState::PendingVerification { phone } = session.data().state() else {
        let text = OtpFailure::NotFound.to_string();
        return flash_redirect(session, &sessions, FlashLevel::Error, text, SEND_OTP_PAGE).await;
    };

    match auth_service.verify_otp(&phone, &form.otp).await {
        Ok(user) => {
            session.cycle_key();
            session.data_mut().authenticate(user.id);
            flash_redirect(
                session,
                &sessions,
                FlashLevel::Success,
                "Login successful",
                BOOKING_PAGE,
            )
            .await
        }
        Err(AppError::Otp(failure)) => {
            let location = match failure {
                OtpFailure::Mismatch => VERIFY_OTP_PAGE,
                OtpFailure::NotFound | OtpFailure::Expired => SEND_OTP_PAGE,
            };
            let text = failure.to_string();
            flash_redirect(session, &sessions, FlashLevel::Error, text, location).await
        }
        Err(AppError::ValidationError(msg)) => {
            flash_redirect(session, &sessions, FlashLevel::Error, msg, SEND_OTP_PAGE).await
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn booking_page(
    users: web::Data<UserService>,
    profiles: web::Data<ProfileService>,
    catalog: web::Data<CatalogService>,
    sessions: web::Data<SessionService>,
    mut session: WebSession,
) -> Result<HttpResponse> {
    let user = match session_member(&mut session, &users).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return flash_redirect(
                session,
                &sessions,
                FlashLevel::Info,
                "Please login using your mobile number.",
                SEND_OTP_PAGE,
            )
            .await;
        }
        Err(e) => return Ok(e.error_response()),
    };

    let context = async {
        let profile = profiles.find_profile(user.id).await?;
        let programs = catalog.list_programs().await?;
        let trainers = catalog.list_trainers().await?;
        Ok::<_, AppError>(json!({
            "user": user,
            "profile": profile,
            "programs": programs,
            "trainers": trainers,
        }))
    };
    match context.await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn submit_booking(
    users: web::Data<UserService>,
    bookings: web::Data<BookingService>,
    sessions: web::Data<SessionService>,
    mut session: WebSession,
    form: web::Form<BookingForm>,
) -> Result<HttpResponse> {
    let user = match session_member(&mut session, &users).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return flash_redirect(
                session,
                &sessions,
                FlashLevel::Error,
                "Please login using your mobile number.",
                SEND_OTP_PAGE,
            )
            .await;
        }
        Err(e) => return Ok(e.error_response()),
    };

    let form = form.into_inner();
    let name = non_blank(form.name.as_deref());
    let email = non_blank(form.email.as_deref());
    let program = non_blank(form.program.as_deref());
    let date = non_blank(form.date.as_deref());
    let time = non_blank(form.time.as_deref());
    if [&name, &email, &program, &date, &time].iter().any(|v| v.is_none()) {
        return flash_redirect(
            session,
            &sessions,
            FlashLevel::Error,
            "Please fill all required fields.",
            BOOKING_PAGE,
        )
        .await;
    }

    let parse_id = |field: &str, value: Option<String>| -> AppResult<Option<i64>> {
        value
            .map(|v| {
                v.parse::<i64>()
                    .map_err(|_| AppError::ValidationError(format!("{field}: Select a valid choice.")))
            })
            .transpose()
    };
    let ids = parse_id("program", program)
        .and_then(|p| Ok((p, parse_id("trainer", non_blank(form.trainer.as_deref()))?)));
    let (program, trainer) = match ids {
        Ok(ids) => ids,
        Err(e) => {
            return match validation_message(&e) {
                Some(text) => {
                    flash_redirect(session, &sessions, FlashLevel::Error, text, BOOKING_PAGE).await
                }
                None => Ok(e.error_response()),
            };
        }
    };

    let request = CreateBookingRequest {
        program,
        trainer,
        preferred_date: date,
        preferred_time: time,
        message: form.message,
        name,
        email,
    };
    match bookings.create_booking(user.id, request).await {
        Ok(_) => {
            flash_redirect(
                session,
                &sessions,
                FlashLevel::Success,
                "Your class has been booked successfully! Check your email for confirmation.",
                HOME_PAGE,
            )
            .await
        }
        Err(e) => match validation_message(&e) {
            Some(text) => {
                flash_redirect(session, &sessions, FlashLevel::Error, text, BOOKING_PAGE).await
            }
            None => Ok(e.error_response()),
        },
    }
}

pub async fn profile_page(
    users: web::Data<UserService>,
    profiles: web::Data<ProfileService>,
    bookings: web::Data<BookingService>,
    sessions: web::Data<SessionService>,
    mut session: WebSession,
) -> Result<HttpResponse> {
    let user = match session_member(&mut session, &users).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return flash_redirect(
                session,
                &sessions,
                FlashLevel::Info,
                "Please login to view your profile.",
                SEND_OTP_PAGE,
            )
            .await;
        }
        Err(e) => return Ok(e.error_response()),
    };

    let context = async {
        let profile = profiles.get_profile(user.id).await?;
        let bookings = bookings.list_bookings(user.id).await?;
        Ok::<_, AppError>(json!({
            "user": user,
            "profile": profile,
            "bookings": bookings,
        }))
    };
    match context.await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn update_profile(
    users: web::Data<UserService>,
    profiles: web::Data<ProfileService>,
    sessions: web::Data<SessionService>,
    mut session: WebSession,
    form: Either<web::Form<ProfileForm>, Multipart>,
) -> Result<HttpResponse> {
    let user = match session_member(&mut session, &users).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return flash_redirect(
                session,
                &sessions,
                FlashLevel::Error,
                "Please login to update your profile.",
                SEND_OTP_PAGE,
            )
            .await;
        }
        Err(e) => return Ok(e.error_response()),
    };

    let parsed = match form {
        Either::Left(form) => Ok((form.into_inner(), None)),
        Either::Right(payload) => read_profile_multipart(payload).await,
    };
    let result = async {
        let (form, photo) = parsed?;
        let request = UpdateProfileRequest {
            name: form.name,
            email: form.email,
            height: parse_measurement("height", form.height.as_deref())?,
            weight: parse_measurement("weight", form.weight.as_deref())?,
            medical_notes: form.medical_notes,
            emergency_contact: form.emergency_contact,
        };
        if let Some(photo) = &photo {
            profiles.check_photo(&photo.content_type, &photo.bytes)?;
        }
        let mut profile = profiles.update_profile(user.id, request).await?;
        if let Some(photo) = photo {
            profile = profiles
                .update_photo(user.id, &photo.content_type, &photo.bytes)
                .await?;
        }
        Ok::<_, AppError>(profile)
    }
    .await;

    match result {
        Ok(_) => {
            flash_redirect(
                session,
                &sessions,
                FlashLevel::Success,
                "Profile updated successfully!",
                PROFILE_PAGE,
            )
            .await
        }
        Err(e) => match validation_message(&e) {
            Some(text) => {
                flash_redirect(session, &sessions, FlashLevel::Error, text, PROFILE_PAGE).await
            }
            None => Ok(e.error_response()),
        },
    }
}

pub async fn logout(
    sessions: web::Data<SessionService>,
    mut session: WebSession,
) -> Result<HttpResponse> {
    session.flush();
    flash_redirect(
        session,
        &sessions,
        FlashLevel::Success,
        "Logged out successfully",
        SEND_OTP_PAGE,
    )
    .await
}

/// Pops the pending flash message, if any.
pub async fn messages(
    sessions: web::Data<SessionService>,
    mut session: WebSession,
) -> Result<HttpResponse> {
    let flash = session.data_mut().take_flash();
    let response = HttpResponse::Ok().json(json!({
        "success": true,
        "data": flash
    }));
    finish(session, &sessions, response).await
}

pub fn web_config(cfg: &mut web::ServiceConfig) {
    cfg.route(HOME_PAGE, web::get().to(messages)).service(
        web::scope("/booking")
            .route("/", web::get().to(booking_page))
            .route("/", web::post().to(submit_booking))
            .route("/send-otp/", web::get().to(otp_page))
            .route("/send-otp/", web::post().to(send_otp))
            .route("/verify-otp/", web::get().to(otp_page))
            .route("/verify-otp/", web::post().to(verify_otp))
            .route("/profile/", web::get().to(profile_page))
            .route("/profile/", web::post().to(update_profile))
            .route("/logout/", web::get().to(logout))
            .route("/messages/", web::get().to(messages)),
    );
}
