//! HTTP request handlers.

mod health;
mod occupancy;
mod push;

pub use health::{health_check, root};
pub use occupancy::{get_bus_occupancy, update_bus_occupancy};
pub use push::push_data;
