//! Persistence ports.
//!
//! Implementations live in `myrestful-infra`. Reads observe committed state;
//! writes are staged and only become visible once [`UnitOfWork::save`] runs.

use crate::city::{City, NewCity};
use crate::country::{Country, NewCountry};
use crate::error::RepositoryError;
use crate::id::{CityId, CountryId};

pub type RepositoryResult<T> = Result<T, RepositoryError>;

pub trait CountryRepository: Send + Sync {
    fn list(&self) -> RepositoryResult<Vec<Country>>;

    fn get(&self, id: CountryId) -> RepositoryResult<Option<Country>>;

    fn exists(&self, id: CountryId) -> RepositoryResult<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// Stage a new country (and its cities). The returned country already
    /// carries its assigned identifier.
    fn add(&self, country: NewCountry) -> RepositoryResult<Country>;

    /// Stage removal of a country together with all of its cities.
    fn remove(&self, id: CountryId) -> RepositoryResult<()>;
}

pub trait CityRepository: Send + Sync {
    fn list_for_country(&self, country_id: CountryId) -> RepositoryResult<Vec<City>>;

    fn get_for_country(&self, country_id: CountryId, id: CityId) -> RepositoryResult<Option<City>>;

    fn add(&self, country_id: CountryId, city: NewCity) -> RepositoryResult<City>;

    fn update(&self, city: City) -> RepositoryResult<()>;

    fn remove(&self, id: CityId) -> RepositoryResult<()>;
}

/// Commits every change staged through the repositories sharing this unit of
/// work, all or nothing.
pub trait UnitOfWork: Send + Sync {
    /// Returns the number of staged changes applied.
    fn save(&self) -> RepositoryResult<usize>;
}
