pub mod ai;
pub mod config;
pub mod error;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use ai::{extract_answer, GeminiClient, Generate, GenerateRequest, GenerateResponse, NO_RESPONSE};
pub use config::Config;
pub use error::{ChatError, ConfigError};
pub use session::{ChatSession, SOMETHING_WENT_WRONG};
pub use state::{Exchange, SessionState, Theme};
