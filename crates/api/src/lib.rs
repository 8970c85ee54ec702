#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Flowscope API
//!
//! The HTTP surface of a Flowscope process.
//!
//! - `POST /debug/{id}/{state}` -- enable (200) or disable (201) a debug
//!   node; requires the `debug.write` permission
//! - `GET /debug/view/{*path}` -- static viewer assets, dotfiles denied
//!
//! Authorization is pluggable through [`Authorizer`]; [`TokenAuthorizer`]
//! maps bearer tokens to permission sets and [`AllowAll`] disables checks.

pub mod auth;
pub mod error;
pub mod routes;
pub mod server;

pub use auth::{AllowAll, Authorizer, DEBUG_WRITE, TokenAuthorizer};
pub use error::ApiError;
pub use routes::{AppState, router};
pub use server::serve;
