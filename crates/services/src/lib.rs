#![forbid(unsafe_code)]

pub mod error;
pub mod picker;
pub mod quiz_service;
pub mod settings;

pub use quiz_core::Clock;

pub use error::QuizServiceError;
pub use picker::RandomPicker;
pub use quiz_service::QuizService;
pub use settings::QuizSettings;
