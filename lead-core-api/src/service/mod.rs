pub mod activity;
pub mod aggregation;
pub mod engine;
pub mod lead_service;
pub mod memory_store;
pub mod store;

#[cfg(test)]
pub(crate) mod test_utils;

pub use activity::*;
pub use aggregation::*;
pub use engine::*;
pub use lead_service::*;
pub use memory_store::*;
pub use store::*;
