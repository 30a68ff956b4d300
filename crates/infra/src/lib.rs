//! Infrastructure layer: in-memory database and repository implementations.

pub mod db;
pub mod repositories;

pub use db::{InMemoryDatabase, MyContext};
pub use repositories::{InMemoryCityRepository, InMemoryCountryRepository, InMemoryUnitOfWork};
