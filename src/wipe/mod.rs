mod error;
mod orchestrator;
mod retry;
mod sleep;

pub use error::WipeError;
pub use orchestrator::{Pass, PassSummary, Wiper};
pub use retry::RetryPolicy;
pub use sleep::TokioSleeper;
