//! # Auth Module
//!
//! Handles all authentication-related functionality:
//! - Google OAuth login (server redirect flow)
//! - Signed, stateless session cookies
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use models::User;
pub use routes::auth_routes;
