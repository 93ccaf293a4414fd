// src/lib.rs
pub mod completion;
pub mod config;
pub mod decision_parser;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod normalizer;
pub mod prompt;
pub mod trade_log;
pub mod types;
