pub mod identifiable;
pub mod lead;

// Re-exports
pub use identifiable::*;
pub use lead::*;
