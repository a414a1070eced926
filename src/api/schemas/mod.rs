pub mod auth;
pub mod diagnostics;
pub mod library;
