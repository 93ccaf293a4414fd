// src/handlers.rs
use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse, Responder};
use log::{debug, error, info};
use std::sync::Arc;

use crate::completion::{CompletionClient, CompletionRequest};
use crate::decision_parser::parse_decision;
use crate::errors::WebhookError;
use crate::normalizer::normalize;
use crate::prompt::{build_prompt, PromptVariant};
use crate::trade_log::TradeLog;
use crate::types::{FreeFormWebhookResponse, LogRecord, StructuredWebhookResponse};

pub struct AppState {
    pub completion: Arc<dyn CompletionClient>,
    pub trade_log: Arc<TradeLog>,
    pub model: String,
    pub variant: PromptVariant,
}

/// Largest webhook body accepted before answering with the usual 400 error body.
pub const MAX_BODY_BYTES: usize = 256 * 1024;

fn body_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let err = WebhookError::from(err);
    error!("❌ Error handling webhook [{}]: {}", err.kind(), err);
    err.into()
}

/// Registers `GET /` and `POST /webhook`. Expects `web::Data<AppState>` on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Any content type is decoded as JSON; size and decode failures share the 400 body.
    let json_config = web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .content_type_required(false)
        .error_handler(body_error);

    cfg.route("/", web::get().to(home)).service(
        web::resource("/webhook")
            .app_data(json_config)
            .route(web::post().to(webhook)),
    );
}

pub async fn home(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().content_type("text/plain; charset=utf-8").body(format!(
        "✅ ChartGPT webhook server with CSV logging ({} prompt).",
        state.variant.as_str()
    ))
}

pub async fn webhook(
    state: web::Data<AppState>,
    payload: web::Json<serde_json::Value>,
) -> Result<HttpResponse, WebhookError> {
    match process_webhook(&state, payload.into_inner()).await {
        Ok(response) => Ok(response),
        Err(e) => {
            error!("❌ Error handling webhook [{}]: {}", e.kind(), e);
            Err(e)
        }
    }
}

async fn process_webhook(
    state: &AppState,
    payload: serde_json::Value,
) -> Result<HttpResponse, WebhookError> {
    debug!("🚀 Parsed payload: {}", payload);

    let input = normalize(&payload);
    let prompt = build_prompt(&input, state.variant);

    let raw_response = state
        .completion
        .complete(CompletionRequest {
            model: &state.model,
            prompt: &prompt,
            temperature: state.variant.temperature(),
        })
        .await?;
    debug!("🧠 GPT reply:\n{}", raw_response);

    let parsed = parse_decision(&raw_response);
    info!(
        "🧠 Decision {} (confidence {}, outcome {:?})",
        parsed.decision.decision, parsed.decision.confidence, parsed.outcome
    );

    let record = LogRecord::now(input, parsed.decision, raw_response);
    state.trade_log.append(&record)?;
    let LogRecord {
        decision,
        raw_response,
        ..
    } = record;

    let response = match state.variant {
        PromptVariant::Structured => HttpResponse::Ok().json(StructuredWebhookResponse {
            status: "success",
            structured_decision: decision,
            raw_response,
        }),
        PromptVariant::FreeForm => HttpResponse::Ok().json(FreeFormWebhookResponse {
            decision: raw_response,
        }),
    };
    Ok(response)
}
