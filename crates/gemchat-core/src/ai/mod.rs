pub mod gemini;

pub use gemini::{
    extract_answer, GeminiClient, Generate, GenerateRequest, GenerateResponse, NO_RESPONSE,
};
