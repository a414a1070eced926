pub mod auth_service;
pub mod library_service;
pub mod platform;
pub mod token_service;

#[cfg(test)]
pub(crate) mod testing;
