pub mod gemini;

pub use gemini::{GeminiClient, DEFAULT_API_URL};
