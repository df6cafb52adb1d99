use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{ErrorResponse, SavedProfilesResponse, ToggleSavedRequest, ToggleSavedResponse, UserQuery};
use crate::routes::{validation_failed, AppState};
use crate::services::StoreError;

/// Configure saved-profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/saved", web::get().to(get_saved_profiles))
        .route("/saved/toggle", web::post().to(toggle_saved));
}

fn store_unavailable(err: StoreError) -> HttpResponse {
    tracing::error!("Saved profile store failed: {}", err);
    HttpResponse::BadGateway().json(ErrorResponse {
        error: "upstream_error".to_string(),
        message: "Saved profiles are unavailable, try again later".to_string(),
        status_code: 502,
    })
}

/// GET /api/v1/saved?userId=
async fn get_saved_profiles(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_failed(errors);
    }

    match state.saved.list(&query.user_id).await {
        Ok(saved_profiles) => HttpResponse::Ok().json(SavedProfilesResponse {
            user_id: query.user_id.clone(),
            count: saved_profiles.len(),
            saved_profiles,
        }),
        Err(e) => store_unavailable(e),
    }
}

/// Toggle a bookmark
///
/// POST /api/v1/saved/toggle
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "profileId": "string"
/// }
/// ```
async fn toggle_saved(
    state: web::Data<AppState>,
    req: web::Json<ToggleSavedRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    match state.saved.toggle(&req.user_id, &req.profile_id).await {
        Ok(saved) => HttpResponse::Ok().json(ToggleSavedResponse {
            profile_id: req.profile_id.clone(),
            saved,
        }),
        Err(e) => store_unavailable(e),
    }
}
