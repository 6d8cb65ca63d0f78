pub mod logger;
pub mod text_input;
