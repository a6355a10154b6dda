pub mod append_transition;
pub mod create_batch;
pub mod exist_by_ids;
pub mod find_leads;
pub mod load;
pub mod load_batch;
pub mod load_history;
pub mod load_recent_history;
pub mod load_status_snapshot;
pub mod pagination;

pub use append_transition::*;
pub use create_batch::*;
pub use exist_by_ids::*;
pub use find_leads::*;
pub use load::*;
pub use load_batch::*;
pub use load_history::*;
pub use load_recent_history::*;
pub use load_status_snapshot::*;
pub use pagination::*;
