use actix_web::web;

use crate::web::error::RelayError;
use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| RelayError::InvalidBody(err.to_string()).into());

    cfg.service(
        web::scope("/api")
            .app_data(json_config)
            .route("/chat", web::post().to(handlers::chat)),
    )
    .route("/health", web::get().to(handlers::health_check));
}
