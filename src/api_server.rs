// Axum API server module
//
// Purpose: REST surface for the advisory engine, chat assistant, and
// weather proxy, with per-client rate limiting on every public endpoint.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use moka::future::Cache;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use crate::advisor::{AdvisoryEngine, NutrientSample, SoilClimateSample};
use crate::chat::{ChatError, ChatRequest, ChatService};
use crate::config::Settings;
use crate::error::AdvisorError;
use crate::rate_limiter::RateLimiter;
use crate::weather::{WeatherClient, WeatherError, WeatherQuery};

/// TTL for proxied weather responses.
const WEATHER_CACHE_TTL: Duration = Duration::from_secs(300);

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub advisor: Arc<AdvisoryEngine>,
    pub limiter: RateLimiter,
    pub chat: Arc<ChatService>,
    pub weather: Arc<WeatherClient>,
    pub cache: Cache<String, Value>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        tracing::info!("Initializing advisory engine...");
        let advisor = Arc::new(AdvisoryEngine::new());

        tracing::info!(
            "Initializing rate limiter ({} requests per {:?})...",
            settings.rate_limit,
            settings.rate_limit_window
        );
        let limiter = RateLimiter::with_window(settings.rate_limit, settings.rate_limit_window);

        tracing::info!("Initializing chat service...");
        let chat = Arc::new(ChatService::new(&settings)?);

        tracing::info!("Initializing weather client...");
        let weather = Arc::new(WeatherClient::new(&settings)?);

        let cache = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(WEATHER_CACHE_TTL)
            .build();

        Ok(Self {
            advisor,
            limiter,
            chat,
            weather,
            cache,
            settings,
        })
    }

    /// State with an engine carrying injected models (used when trained
    /// model bindings are wired in).
    pub fn with_advisor(settings: Settings, advisor: AdvisoryEngine) -> anyhow::Result<Self> {
        let mut state = Self::new(settings)?;
        state.advisor = Arc::new(advisor);
        Ok(state)
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let cors = if state.settings.allow_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .settings
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        // Health
        .route("/", get(root))
        .route("/health", get(health_check))

        // Advisory endpoints
        .route("/predict/crop", post(recommend_crop))
        .route("/predict/fertilizer", post(recommend_fertilizer))

        // Chat assistant
        .route("/chat", post(chat))

        // Weather proxy
        .route("/api/weather", get(current_weather))
        .route("/api/weather/forecast", get(weather_forecast))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Client identity for rate limiting. Behind the reverse proxy the first
/// `x-forwarded-for` hop is the real client.
fn client_id(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn root() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "farm-advisor-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn recommend_crop(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(sample): Json<SoilClimateSample>,
) -> Result<Json<Value>, AppError> {
    state.limiter.admit(&client_id(&headers))?;
    sample.validate()?;

    let recommendations = state.advisor.recommend_crop(&sample)?;
    Ok(Json(json!({
        "success": true,
        "recommendations": recommendations,
    })))
}

async fn recommend_fertilizer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(sample): Json<NutrientSample>,
) -> Result<Json<Value>, AppError> {
    state.limiter.admit(&client_id(&headers))?;
    sample.validate()?;

    let outcome = state.advisor.recommend_fertilizer(&sample)?;
    let details = serde_json::to_value(&outcome.advice)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // With a model the rule block nests under `details`; without one it is
    // the response body itself.
    let body = match outcome.prediction {
        Some(label) => json!({
            "success": true,
            "prediction": label,
            "details": details,
        }),
        None => {
            let mut body = details;
            body["success"] = json!(true);
            body
        }
    };
    Ok(Json(body))
}

async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Value>, AppError> {
    state.limiter.admit(&client_id(&headers))?;
    request.validate()?;

    let response = state.chat.reply(&request).await?;
    Ok(Json(json!({
        "reply": response.reply,
        "tokens_used": response.tokens_used,
        "mock": response.mock,
    })))
}

async fn current_weather(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<Value>, AppError> {
    state.limiter.admit(&client_id(&headers))?;

    let cache_key = format!("weather:{:.3}:{:.3}:{}", query.lat, query.lon, query.units);
    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("cache hit for {}", cache_key);
        return Ok(Json(cached));
    }

    let payload = state.weather.current(&query).await?;
    state.cache.insert(cache_key, payload.clone()).await;
    Ok(Json(payload))
}

async fn weather_forecast(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<Value>, AppError> {
    state.limiter.admit(&client_id(&headers))?;

    let cache_key = format!("forecast:{:.3}:{:.3}:{}", query.lat, query.lon, query.units);
    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("cache hit for {}", cache_key);
        return Ok(Json(cached));
    }

    let payload = state.weather.forecast(&query).await?;
    state.cache.insert(cache_key, payload.clone()).await;
    Ok(Json(payload))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    RateLimited(Duration),
    Invalid(String),
    Prediction(String),
    Upstream(String),
    Unavailable(String),
    Internal(String),
}

impl From<AdvisorError> for AppError {
    fn from(err: AdvisorError) -> Self {
        match err {
            AdvisorError::RateLimitExceeded { retry_after } => AppError::RateLimited(retry_after),
            AdvisorError::InvalidInput(msg) => AppError::Invalid(msg),
            AdvisorError::PredictionFailed(msg) => AppError::Prediction(msg),
        }
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Upstream(msg) => AppError::Upstream(msg),
            ChatError::Unreachable => AppError::Unavailable(err.to_string()),
        }
    }
}

impl From<WeatherError> for AppError {
    fn from(err: WeatherError) -> Self {
        match err {
            WeatherError::Upstream(status) => {
                AppError::Upstream(format!("Weather provider returned {}", status))
            }
            WeatherError::Unreachable => AppError::Unavailable(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            AppError::RateLimited(retry_after) => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "error": "Too many requests. Please wait a moment.",
                    "retry_after_secs": retry_after.as_secs(),
                }),
            ),
            AppError::Invalid(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": msg }),
            ),
            AppError::Prediction(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": format!("Prediction error: {}", msg) }),
            ),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, json!({ "error": msg })),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": msg })),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg })),
        };

        (status, Json(body)).into_response()
    }
}
