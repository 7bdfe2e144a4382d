mod json_reader;
mod log_reader;

pub use json_reader::JsonObjectReader;
pub use log_reader::LogMessageReader;
