pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use auth::{AuthContext, UnauthorizedHandler};
pub use client::ApiClient;
pub use error::RequestError;
