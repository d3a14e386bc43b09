#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod model;
pub mod picker;
pub mod time;

pub use error::QuizError;
pub use time::Clock;
