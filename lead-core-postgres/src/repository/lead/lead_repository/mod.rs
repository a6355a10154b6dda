pub mod repo_impl;
pub mod append_transition;
pub mod create_batch;
pub mod exist_by_ids;
pub mod find_leads;
pub mod load;
pub mod load_batch;
pub mod load_history;
pub mod load_recent_history;
pub mod load_status_snapshot;
#[cfg(test)]
pub mod test_utils;

pub use repo_impl::LeadRepositoryImpl;
