pub mod auth;
pub mod constants;
pub mod errors;
pub mod lifecycle;
pub mod logger;
pub mod types;
pub mod utils;
