pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::*;
pub use models::*;
