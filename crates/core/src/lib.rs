//! `myrestful-core`: domain entities and persistence ports.
//!
//! This crate contains **pure domain** types (no infrastructure concerns).

pub mod city;
pub mod country;
pub mod entity;
pub mod error;
pub mod id;
pub mod repository;

pub use city::{City, NewCity};
pub use country::{Country, NewCountry};
pub use entity::Entity;
pub use error::{DomainError, DomainResult, RepositoryError};
pub use id::{CityId, CountryId};
pub use repository::{CityRepository, CountryRepository, RepositoryResult, UnitOfWork};
