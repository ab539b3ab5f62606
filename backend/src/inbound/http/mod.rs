//! HTTP inbound adapter exposing the form endpoints.

pub mod error;
pub mod health;
pub mod home;
pub mod properties;
pub mod redirect;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod uploads;
pub mod users;
pub mod validation;

pub use error::ApiResult;
