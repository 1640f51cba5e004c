pub mod catalog;
pub mod chatbot;
pub mod gemini;
pub mod usage;
