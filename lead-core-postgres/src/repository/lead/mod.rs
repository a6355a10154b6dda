pub mod factory;
pub mod lead_repository;

pub use factory::{LeadRepoFactory, LeadRepositories};
pub use lead_repository::LeadRepositoryImpl;
