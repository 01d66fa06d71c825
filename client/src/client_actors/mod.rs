pub mod order_session;
pub mod ui_handler;
