pub mod dtos;
pub mod graphql;
pub mod order_status;
pub mod user_role;
