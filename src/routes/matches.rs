use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{
    HealthResponse, PotentialMatchesRequest, PotentialMatchesResponse, RespondToMatchRequest,
    SendMatchRequest, UserQuery,
};
use crate::routes::{validation_failed, AppState};
use crate::services::CofounderError;

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/potential", web::post().to(potential_matches))
        .route("/matches/request", web::post().to(send_match_request))
        .route("/matches/received", web::get().to(received_requests))
        .route("/matches/sent", web::get().to(sent_requests))
        .route("/matches/accepted", web::get().to(accepted_matches))
        .route("/matches/{match_id}/respond", web::post().to(respond_to_match));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.saved.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Ranked potential co-founders
///
/// POST /api/v1/matches/potential
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "search": "fin",
///   "skills": ["skillId"],
///   "industries": ["industryId"],
///   "startupStage": ["idea", "mvp"],
///   "workStyles": ["workStyleId"],
///   "limit": 20
/// }
/// ```
async fn potential_matches(
    state: web::Data<AppState>,
    req: web::Json<PotentialMatchesRequest>,
) -> Result<HttpResponse, CofounderError> {
    if let Err(errors) = req.validate() {
        return Ok(validation_failed(errors));
    }

    let filter = req.filter();
    let result = state
        .service
        .potential_matches(&req.user_id, &filter, req.limit.map(usize::from))
        .await?;

    tracing::info!(
        "Returning {} matches for user {} ({} candidates, {} after filters)",
        result.matches.len(),
        req.user_id,
        result.total_candidates,
        result.total_results
    );

    Ok(HttpResponse::Ok().json(PotentialMatchesResponse {
        matches: result.matches,
        total_candidates: result.total_candidates,
        total_results: result.total_results,
    }))
}

/// Send a match request
///
/// POST /api/v1/matches/request
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "matchedFounderId": "string"
/// }
/// ```
async fn send_match_request(
    state: web::Data<AppState>,
    req: web::Json<SendMatchRequest>,
) -> Result<HttpResponse, CofounderError> {
    if let Err(errors) = req.validate() {
        return Ok(validation_failed(errors));
    }

    let record = state
        .service
        .send_match_request(&req.user_id, &req.matched_founder_id)
        .await?;

    Ok(HttpResponse::Created().json(record))
}

/// Accept or reject a received request
///
/// POST /api/v1/matches/{matchId}/respond
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "status": "accepted|rejected"
/// }
/// ```
async fn respond_to_match(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<RespondToMatchRequest>,
) -> Result<HttpResponse, CofounderError> {
    if let Err(errors) = req.validate() {
        return Ok(validation_failed(errors));
    }

    let match_id = path.into_inner();
    let record = state
        .service
        .respond_to_match(&req.user_id, &match_id, req.status)
        .await?;

    Ok(HttpResponse::Ok().json(record))
}

/// GET /api/v1/matches/received?userId=
async fn received_requests(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, CofounderError> {
    if let Err(errors) = query.validate() {
        return Ok(validation_failed(errors));
    }

    let received = state.service.received_requests(&query.user_id).await?;
    Ok(HttpResponse::Ok().json(received))
}

/// GET /api/v1/matches/sent?userId=
async fn sent_requests(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, CofounderError> {
    if let Err(errors) = query.validate() {
        return Ok(validation_failed(errors));
    }

    let sent = state.service.sent_requests(&query.user_id).await?;
    Ok(HttpResponse::Ok().json(sent))
}

/// GET /api/v1/matches/accepted?userId=
async fn accepted_matches(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, CofounderError> {
    if let Err(errors) = query.validate() {
        return Ok(validation_failed(errors));
    }

    let accepted = state.service.accepted_matches(&query.user_id).await?;
    Ok(HttpResponse::Ok().json(accepted))
}
