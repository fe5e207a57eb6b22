mod error;
pub use error::ApiError;

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::{HttpApi, location_path};

#[cfg(feature = "http")]
pub use axum;
