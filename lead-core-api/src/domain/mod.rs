pub mod catalogue;
pub mod config;
pub mod lead;
pub mod status;

pub use catalogue::*;
pub use config::*;
pub use lead::*;
pub use status::*;
