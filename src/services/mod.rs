// Business logic layer

pub mod report;
pub mod seed_service;

pub use report::{SeedEntry, SeedReport};
pub use seed_service::SeedService;
