pub mod config;
pub mod executor;
pub mod lead_store;
pub mod postgres_repositories;
pub mod repository;
pub mod utils;

pub use config::DatabaseConfig;
pub use executor::Executor;
pub use lead_store::PgLeadStore;
pub use postgres_repositories::{LeadRepositories, PostgresRepositories};
pub use repository::lead::lead_repository::LeadRepositoryImpl;

#[cfg(test)]
pub mod test_helper;
