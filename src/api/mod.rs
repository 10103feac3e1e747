mod client;
mod response;
mod types;

pub use client::{ApiClient, ApiError};
pub use response::{RemoteResponse, Reply};
pub use types::{Channel, Guild, Relationship};
