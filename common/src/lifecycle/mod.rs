//! Order lifecycle rules shared by every peer: who may advance an order,
//! how an order is presented, and how live updates replace a snapshot.

pub mod merger;
pub mod presenter;
pub mod status_machine;
