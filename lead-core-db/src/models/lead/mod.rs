pub mod lead;
pub mod status_history;

pub use lead::*;
pub use status_history::*;
