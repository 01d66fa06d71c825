pub mod client_actors;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod messages;
pub mod session;
