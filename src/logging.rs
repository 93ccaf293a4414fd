// src/logging.rs
use std::path::Path;

pub const LOG4RS_CONFIG: &str = "log4rs.yaml";

/// Uses `log4rs.yaml` when it is present, otherwise env_logger (`RUST_LOG`,
/// defaulting to info).
pub fn init() {
    if Path::new(LOG4RS_CONFIG).exists() {
        match log4rs::init_file(LOG4RS_CONFIG, Default::default()) {
            Ok(()) => {
                log::info!("Logging configured from {}", LOG4RS_CONFIG);
                return;
            }
            Err(e) => eprintln!("Failed to initialize log4rs from {}: {}", LOG4RS_CONFIG, e),
        }
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("chartgpt_webhook=debug,info"));
}
