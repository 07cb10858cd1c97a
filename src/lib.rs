//! Farm Advisor Backend
//!
//! Request-routing and advisory layer for an agriculture assistant:
//! - `rate_limiter`: per-client sliding-window admission control
//! - `advisor/`: local, explainable crop and fertilizer recommendations
//!   with optional injected predictive models
//! - `chat`: agriculture-restricted chat assistant (provider or mock)
//! - `weather`: weather provider proxy with demo fallback
//! - `api_server`: Axum REST surface tying the pieces together

pub mod advisor;
pub mod api_server;
pub mod chat;
pub mod config;
pub mod error;
pub mod rate_limiter;
pub mod weather;

// Re-export commonly used types
pub use advisor::{AdvisoryEngine, CropRecommendation, NutrientSample, SoilClimateSample};
pub use api_server::{create_router, AppState};
pub use config::Settings;
pub use error::AdvisorError;
pub use rate_limiter::RateLimiter;
