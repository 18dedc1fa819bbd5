pub mod cases;
pub mod gemini;
pub mod prompts;
pub mod render;
pub mod secrets;
pub mod types;
