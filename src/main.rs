// src/main.rs
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::io::{Error, ErrorKind};
use std::sync::Arc;

use chartgpt_webhook::completion::{CompletionClient, OpenAiClient};
use chartgpt_webhook::config::AppConfig;
use chartgpt_webhook::handlers::{self, AppState};
use chartgpt_webhook::logging;
use chartgpt_webhook::trade_log::TradeLog;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    logging::init();

    let config = AppConfig::from_env().map_err(|e| Error::new(ErrorKind::InvalidInput, e))?;

    let trade_log = Arc::new(
        TradeLog::open(&config.trade_log_path).map_err(|e| Error::new(ErrorKind::Other, e))?,
    );
    let completion: Arc<dyn CompletionClient> = Arc::new(
        OpenAiClient::new(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.completion_timeout,
        )
        .map_err(|e| Error::new(ErrorKind::Other, e))?,
    );

    let state = web::Data::new(AppState {
        completion,
        trade_log: trade_log.clone(),
        model: config.openai_model.clone(),
        variant: config.prompt_variant,
    });

    log::info!(
        "Starting server on http://{}:{} (model {}, {} prompt, log {:?})",
        config.host,
        config.port,
        config.openai_model,
        config.prompt_variant.as_str(),
        trade_log.path()
    );
    log::info!("  GET  /");
    log::info!("  POST /webhook");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
