use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use costart_match::config::{BackendKind, BackendSettings, Settings};
use costart_match::core::Matcher;
use costart_match::models::RelevanceWeights;
use costart_match::routes::{self, AppState};
use costart_match::services::{
    CacheManager, CofounderService, FounderRepository, InMemoryRepository, InMemorySavedStore,
    PostgresClient, PostgrestClient, ReferenceData, SavedProfileStore,
};
use std::io;
use std::sync::Arc;
use tracing::{info, warn, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(settings: &Settings) {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn build_repository(backend: &BackendSettings) -> io::Result<Arc<dyn FounderRepository>> {
    match backend.kind {
        BackendKind::Postgrest => {
            let (Some(url), Some(api_key)) = (backend.url.clone(), backend.api_key.clone()) else {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "backend.url and backend.api_key are required for the postgrest backend",
                ));
            };

            let client = PostgrestClient::new(
                url,
                api_key,
                backend.timeout_secs.unwrap_or(10),
                backend.tables.clone(),
            )
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

            info!("PostgREST backend initialized");
            Ok(Arc::new(client))
        }
        BackendKind::Memory => {
            let data = match &backend.seed_path {
                Some(path) => {
                    let raw = std::fs::read_to_string(path)?;
                    serde_json::from_str::<ReferenceData>(&raw)
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
                }
                None => ReferenceData::default(),
            };

            warn!(
                "Using in-memory backend ({} skills, {} industries, {} work styles); data is lost on restart",
                data.skills.len(),
                data.industries.len(),
                data.work_styles.len()
            );
            Ok(Arc::new(InMemoryRepository::from_reference_data(data)))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    init_logging(&settings);

    info!("Starting CoStart co-founder matching service...");

    let repository = build_repository(&settings.backend)?;

    // Redis is optional; the L1 tier is always there
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match &settings.cache.redis_url {
        Some(redis_url) => match CacheManager::new(redis_url, l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!("Cache manager initialized with Redis (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
                c
            }
            Err(e) => {
                error!("Failed to connect to Redis ({}), using in-process cache only", e);
                CacheManager::local(l1_cache_size, cache_ttl)
            }
        },
        None => CacheManager::local(l1_cache_size, cache_ttl),
    };

    let saved: Arc<dyn SavedProfileStore> = match &settings.database {
        Some(db) => {
            let client = PostgresClient::from_settings(
                &db.url,
                db.max_connections,
                db.min_connections,
                db.acquire_timeout_secs,
                db.idle_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                io::Error::new(io::ErrorKind::Other, e)
            })?;
            info!("PostgreSQL saved profile store initialized");
            Arc::new(client)
        }
        None => {
            warn!("No database configured, saved profiles are kept in memory");
            Arc::new(InMemorySavedStore::new())
        }
    };

    let weights = RelevanceWeights::from(&settings.scoring.weights);
    let matcher = Matcher::new(weights);

    info!("Matcher initialized with weights: {:?}", weights);

    let options = settings.matching.options();
    info!(
        "Matching limits: default {}, max {}, rematch policy {:?}",
        options.default_limit, options.max_limit, options.rematch_policy
    );

    let app_state = AppState {
        service: Arc::new(CofounderService::new(repository, Arc::new(cache), matcher, options)),
        saved,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
