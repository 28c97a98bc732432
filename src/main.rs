mod config;
mod model;
mod prompt;
mod sanitize;
mod session;
mod web;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use log::{error, info};

use config::Config;
use model::{CompletionBackend, OpenAiClient};
use sanitize::Sanitizer;
use session::SessionStore;
use web::routes;

// App state structure
struct AppState {
    sessions: Arc<SessionStore>,
    completion: Arc<dyn CompletionBackend>,
    sanitizer: Sanitizer,
    system_prompt: String,
}

impl AppState {
    fn new(
        completion: Arc<dyn CompletionBackend>,
        system_prompt: String,
        max_history_turns: usize,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            sessions: Arc::new(SessionStore::new(max_history_turns)),
            completion,
            sanitizer: Sanitizer::new().context("failed to compile sanitizer patterns")?,
            system_prompt,
        })
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting chat relay");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let completion: Arc<dyn CompletionBackend> = match OpenAiClient::new(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to initialize completion client: {:#}", e);
            std::process::exit(1);
        }
    };

    let system_prompt = config
        .system_prompt
        .clone()
        .unwrap_or_else(|| prompt::DEFAULT_SYSTEM_PROMPT.to_string());

    let app_state = Data::new(AppState::new(
        completion,
        system_prompt,
        config.max_history_turns,
    )?);

    info!("Listening on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?
    .run()
    .await?;

    Ok(())
}
