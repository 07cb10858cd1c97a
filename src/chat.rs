//! Chat Assistant
//!
//! Validated chat requests are answered either by an OpenAI-compatible
//! provider or by a deterministic keyword-routed mock bank (for demos and
//! offline operation). Provider failures are sanitized before they reach a
//! client: billing, quota, and credential details never leave the server.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Settings;
use crate::error::AdvisorError;

/// Upper bounds enforced on inbound chat payloads.
pub const MAX_MESSAGE_CHARS: usize = 2000;
pub const MAX_HISTORY_MESSAGES: usize = 10;
pub const MAX_HISTORY_CONTENT_CHARS: usize = 4000;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);
const TEMPERATURE: f64 = 0.3;
const MAX_TOKENS: u32 = 800;

/// System prompt pinning the assistant to agriculture topics.
pub const SYSTEM_PROMPT: &str = "\
You are a multilingual agricultural assistant embedded in a farming app. \
You help farmers with crops, soil, fertilizers, pests, irrigation, weather \
planning, and app features only. Detect the language the user writes in and \
reply in that language and script. If a question is unrelated to agriculture \
or the app, politely decline and ask for a farming-related question. Keep \
answers practical and concise, formatted as short markdown sections.";

/// One prior turn of the conversation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Inbound chat request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), AdvisorError> {
        if self.message.trim().is_empty() {
            return Err(AdvisorError::invalid("message must not be empty"));
        }
        if self.message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(AdvisorError::invalid(format!(
                "message exceeds {} characters",
                MAX_MESSAGE_CHARS
            )));
        }
        if self.history.len() > MAX_HISTORY_MESSAGES {
            return Err(AdvisorError::invalid(format!(
                "history exceeds {} messages",
                MAX_HISTORY_MESSAGES
            )));
        }
        for msg in &self.history {
            if msg.role != "user" && msg.role != "assistant" {
                return Err(AdvisorError::invalid(format!(
                    "history role must be 'user' or 'assistant', got {:?}",
                    msg.role
                )));
            }
            if msg.content.is_empty() || msg.content.chars().count() > MAX_HISTORY_CONTENT_CHARS {
                return Err(AdvisorError::invalid(format!(
                    "history content must be 1–{} characters",
                    MAX_HISTORY_CONTENT_CHARS
                )));
            }
        }
        Ok(())
    }
}

/// Outbound chat reply.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub tokens_used: Option<u32>,
    pub mock: bool,
}

/// Failures of the provider path. Validation problems are `AdvisorError`.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Provider returned an error or an unusable payload.
    #[error("{0}")]
    Upstream(String),

    /// Provider could not be reached in time.
    #[error("AI service did not respond. Please try again.")]
    Unreachable,
}

// ============================================================================
// Service
// ============================================================================

/// Chat backend selected at startup from settings.
pub struct ChatService {
    provider: Option<ChatProvider>,
}

struct ChatProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatService {
    /// Build from settings. No API key (or `MOCK_CHAT`) selects mock mode.
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let provider = match (&settings.chat_api_key, settings.mock_chat) {
            (Some(key), false) => {
                let http = reqwest::Client::builder()
                    .timeout(PROVIDER_TIMEOUT)
                    .build()?;
                Some(ChatProvider {
                    http,
                    base_url: settings.chat_base_url.trim_end_matches('/').to_string(),
                    api_key: key.clone(),
                    model: settings.chat_model.clone(),
                })
            }
            _ => {
                tracing::info!("chat running in mock mode");
                None
            }
        };
        Ok(ChatService { provider })
    }

    pub fn is_mock(&self) -> bool {
        self.provider.is_none()
    }

    /// Answer a validated chat request.
    pub async fn reply(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        match &self.provider {
            Some(provider) => provider.complete(request).await,
            None => Ok(ChatResponse {
                reply: mock_reply(&request.message),
                tokens_used: None,
                mock: true,
            }),
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    usage: Option<CompletionUsage>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionChoiceMessage,
}

#[derive(Deserialize)]
struct CompletionChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct CompletionUsage {
    total_tokens: u32,
}

impl ChatProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        messages.push(WireMessage {
            role: "system",
            content: SYSTEM_PROMPT,
        });

        // Only the most recent turns are forwarded
        let start = request.history.len().saturating_sub(MAX_HISTORY_MESSAGES);
        for msg in &request.history[start..] {
            messages.push(WireMessage {
                role: &msg.role,
                content: &msg.content,
            });
        }
        messages.push(WireMessage {
            role: "user",
            content: &request.message,
        });

        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    ChatError::Unreachable
                } else {
                    ChatError::Upstream(sanitize_provider_error(&e.to_string()))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!("chat provider returned {}: {}", status, detail);
            return Err(ChatError::Upstream(sanitize_provider_error(&format!(
                "{} {}",
                status, detail
            ))));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|_| ChatError::Upstream("AI service returned an unexpected reply.".to_string()))?;

        let reply = parsed
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| ChatError::Upstream("AI service returned an empty reply.".to_string()))?;

        Ok(ChatResponse {
            reply,
            tokens_used: parsed.usage.map(|u| u.total_tokens),
            mock: false,
        })
    }
}

/// Reduce a raw provider error to a safe user-facing message. Billing URLs,
/// team identifiers, and API keys must never reach a client.
pub fn sanitize_provider_error(raw: &str) -> String {
    let lowered = raw.to_lowercase();

    let billing = ["credit", "billing", "license", "quota", "console.", "platform.openai", "team/"];
    if billing.iter().any(|kw| lowered.contains(kw)) {
        return "The AI service is temporarily unavailable due to account limits. \
                Please try again later or contact support."
            .to_string();
    }
    if raw.contains("401") || lowered.contains("invalid_api_key") || lowered.contains("api key") {
        return "AI service authentication failed. Please contact the administrator.".to_string();
    }
    if raw.contains("404") || lowered.contains("not found") {
        return "AI model not available. Please contact the administrator.".to_string();
    }
    "AI service encountered an error. Please try again.".to_string()
}

// ============================================================================
// Mock bank
// ============================================================================

const DISEASE_KEYWORDS: &[&str] = &[
    "disease", "blight", "rot", "rust", "mildew", "fungus", "fungal", "bacterial",
    "virus", "pest", "insect", "yellowing", "wilting", "wilt", "spot", "lesion",
    "infect", "symptom", "treatment", "cure",
];

const FERTILIZER_KEYWORDS: &[&str] = &[
    "fertilizer", "fertiliser", "npk", "nitrogen", "phosphorus", "potassium",
    "urea", "dap", "compost", "manure", "nutrient", "deficiency", "soil health",
];

const CROP_KEYWORDS: &[&str] = &[
    "rice", "wheat", "maize", "corn", "tomato", "potato", "onion", "cotton",
    "mango", "banana", "sugarcane", "grow", "crop", "seed", "sow", "plant",
    "harvest", "yield", "cultivat", "farm",
];

const PLATFORM_KEYWORDS: &[&str] = &[
    "app", "application", "dashboard", "feature", "marketplace", "sensor",
    "how do i use", "what is", "how does",
];

const OFF_TOPIC_KEYWORDS: &[&str] = &[
    "movie", "song", "music", "cricket", "football", "sport", "politics",
    "stock", "bitcoin", "crypto", "recipe", "programming", "comedian", "actor",
];

const OFF_TOPIC_REPLY: &str = "I am designed specifically for agriculture and \
farming assistance. Please ask a farming-related question.";

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| haystack.contains(kw))
}

/// Deterministic canned reply for mock mode, routed by keyword category.
pub fn mock_reply(message: &str) -> String {
    let text = message.to_lowercase();

    let on_topic = contains_any(&text, CROP_KEYWORDS)
        || contains_any(&text, DISEASE_KEYWORDS)
        || contains_any(&text, FERTILIZER_KEYWORDS)
        || contains_any(&text, PLATFORM_KEYWORDS);

    if contains_any(&text, OFF_TOPIC_KEYWORDS) && !on_topic {
        return OFF_TOPIC_REPLY.to_string();
    }

    if contains_any(&text, DISEASE_KEYWORDS) {
        return "**Plant Health Check**\n\n\
                Common signs: yellowing leaves (nutrient deficiency or overwatering), \
                dark spots (fungal infection), wilting (root stress or pests).\n\n\
                - Remove and destroy affected leaves\n\
                - Avoid overhead watering; water at the base in the morning\n\
                - Apply neem oil spray (5 ml/l) for mild fungal and insect problems\n\
                - Use the disease detection feature with a clear leaf photo for a \
                specific diagnosis"
            .to_string();
    }

    if contains_any(&text, FERTILIZER_KEYWORDS) {
        return "**Fertilizer Basics**\n\n\
                Balanced nutrition needs all three majors: nitrogen for leaf growth, \
                phosphorus for roots and flowering, potassium for fruit quality and \
                stress tolerance.\n\n\
                - Test your soil before applying anything\n\
                - Apply nitrogen in split doses, not all at once\n\
                - Combine mineral fertilizer with compost or FYM\n\
                - The fertilizer advisory tool gives crop-specific doses from your \
                soil values"
            .to_string();
    }

    if contains_any(&text, CROP_KEYWORDS) {
        if text.contains("rice") {
            return "**Rice Cultivation**\n\n\
                    Suits clayey, water-retentive soil (pH 5.5–7.0), Kharif season. \
                    Transplant 20–25 day seedlings, keep 2–5 cm standing water, apply \
                    120:60:60 NPK kg/ha in splits, and drain the field 10 days before \
                    harvest."
                .to_string();
        }
        if text.contains("wheat") {
            return "**Wheat Cultivation**\n\n\
                    Cool-season Rabi cereal for loamy soil. Sow November at 100 kg/ha \
                    seed rate, irrigate at crown-root initiation and grain filling, \
                    apply 120:60:40 NPK kg/ha with nitrogen in two splits."
                .to_string();
        }
        if text.contains("tomato") {
            return "**Tomato Cultivation**\n\n\
                    Warm-season crop for well-drained loam (pH 6.0–7.0). Transplant \
                    4-week seedlings, stake early, mulch to hold moisture, and watch \
                    for early blight after rain."
                .to_string();
        }
        return "**Crop Planning**\n\n\
                Choose crops that match your soil nutrients, pH, temperature, and \
                rainfall. The crop recommendation tool ranks suitable crops from \
                your soil test values. Try it from the dashboard."
            .to_string();
    }

    if contains_any(&text, PLATFORM_KEYWORDS) {
        return "**What this app offers**\n\n\
                - Crop recommendation from soil and climate values\n\
                - Fertilizer advisory from your NPK levels\n\
                - Disease detection from leaf photos\n\
                - Local weather and 5-day forecast\n\
                - A marketplace to buy and sell produce and equipment"
            .to_string();
    }

    "Hello! I can help with crops, soil, fertilizers, plant diseases, and using \
     this app. What would you like to know?"
        .to_string()
}
