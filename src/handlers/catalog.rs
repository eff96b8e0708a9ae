use crate::models::*;
use crate::services::CatalogService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/programs",
    tag = "catalog",
    responses(
        (status = 200, description = "All programs by title", body = [ProgramResponse])
    )
)]
pub async fn list_programs(catalog_service: web::Data<CatalogService>) -> Result<HttpResponse> {
    match catalog_service.list_programs().await {
        Ok(programs) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": programs
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/programs/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Program id")),
    responses(
        (status = 200, description = "Program", body = ProgramResponse),
        (status = 404, description = "No such program")
    )
)]
pub async fn get_program(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match catalog_service.get_program(path.into_inner()).await {
        Ok(program) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ProgramResponse::from(program)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/trainers",
    tag = "catalog",
    responses(
        (status = 200, description = "All trainers by name", body = [TrainerResponse])
    )
)]
pub async fn list_trainers(catalog_service: web::Data<CatalogService>) -> Result<HttpResponse> {
    match catalog_service.list_trainers().await {
        Ok(trainers) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": trainers
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/trainers/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Trainer id")),
    responses(
        (status = 200, description = "Trainer", body = TrainerResponse),
        (status = 404, description = "No such trainer")
    )
)]
pub async fn get_trainer(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match catalog_service.get_trainer(path.into_inner()).await {
        Ok(trainer) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": TrainerResponse::from(trainer)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn catalog_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/programs")
            .route("", web::get().to(list_programs))
            .route("/{id}", web::get().to(get_program)),
    )
    .service(
        web::scope("/trainers")
            .route("", web::get().to(list_trainers))
            .route("/{id}", web::get().to(get_trainer)),
    );
}
