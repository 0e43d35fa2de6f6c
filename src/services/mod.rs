//! Domain operations. Handlers stay thin and call into these; every
//! function returns `AppError` so the HTTP mapping lives in one place.

pub mod auth;
pub mod pin;
pub mod profiles;
pub mod tickets;
