pub mod library;
pub mod session;
pub mod token;
