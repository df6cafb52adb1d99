use actix_web::{web, HttpResponse};
use validator::Validate;
use crate::models::{CreateProfileRequest, UpdateProfileRequest, UserQuery};
use crate::routes::{validation_failed, AppState};
use crate::services::CofounderError;

/// Configure reference data and founder profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/reference/skills", web::get().to(list_skills))
        .route("/reference/industries", web::get().to(list_industries))
        .route("/reference/work-styles", web::get().to(list_work_styles))
        .route("/founders/profile", web::get().to(get_profile))
        .route("/founders/profile", web::post().to(create_profile))
        .route("/founders/profile/{profile_id}", web::put().to(update_profile));
}

async fn list_skills(state: web::Data<AppState>) -> Result<HttpResponse, CofounderError> {
    Ok(HttpResponse::Ok().json(state.service.list_skills().await?))
}

async fn list_industries(state: web::Data<AppState>) -> Result<HttpResponse, CofounderError> {
    Ok(HttpResponse::Ok().json(state.service.list_industries().await?))
}

async fn list_work_styles(state: web::Data<AppState>) -> Result<HttpResponse, CofounderError> {
    Ok(HttpResponse::Ok().json(state.service.list_work_styles().await?))
}

/// GET /api/v1/founders/profile?userId=
async fn get_profile(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, CofounderError> {
    if let Err(errors) = query.validate() {
        return Ok(validation_failed(errors));
    }

    let profile = state.service.get_own_profile(&query.user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Create the caller's founder profile
///
/// POST /api/v1/founders/profile
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "skills": ["skillId"],
///   "industries": ["industryId"],
///   "startupStage": "idea|prototype|mvp|growth|scaling",
///   "workStyle": ["workStyleId"],
///   "goals": "string",
///   "experience": "string",
///   "seeking": "string"
/// }
/// ```
async fn create_profile(
    state: web::Data<AppState>,
    req: web::Json<CreateProfileRequest>,
) -> Result<HttpResponse, CofounderError> {
    if let Err(errors) = req.validate() {
        return Ok(validation_failed(errors));
    }

    let profile = state.service.create_profile(&req.user_id, &req.profile).await?;
    Ok(HttpResponse::Created().json(profile))
}

/// PUT /api/v1/founders/profile/{profileId}
///
/// Only the fields present in the body are changed.
async fn update_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, CofounderError> {
    if let Err(errors) = req.validate() {
        return Ok(validation_failed(errors));
    }

    let profile_id = path.into_inner();
    let profile = state
        .service
        .update_profile(&profile_id, &req.user_id, &req.update)
        .await?;

    Ok(HttpResponse::Ok().json(profile))
}
