pub mod analysis;
mod app;
pub mod caption;
pub mod config;
pub mod doctor;
pub mod engines;
pub mod image;
pub mod ocr;
pub mod session;
mod telemetry;
pub mod tts;
pub mod voice;

pub use app::logging::{init_logging, log_debug, log_file_path};
pub use telemetry::init_tracing;
