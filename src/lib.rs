pub mod asr;
pub mod config;
pub mod error;
pub mod llm;
pub mod messages;
pub mod openai_service;
pub mod relay;
pub mod routes;
pub mod state;
pub mod websocket;

pub use config::Config;
pub use error::{RelayError, RelayResult, UpstreamError};
pub use state::AppState;
