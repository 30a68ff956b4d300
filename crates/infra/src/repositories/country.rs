use std::sync::Arc;

use myrestful_core::{Country, CountryId, CountryRepository, NewCountry, RepositoryResult};

use crate::db::{Change, MyContext};

/// [`CountryRepository`] over a request's [`MyContext`].
#[derive(Debug, Clone)]
pub struct InMemoryCountryRepository {
    context: Arc<MyContext>,
}

impl InMemoryCountryRepository {
    pub fn new(context: Arc<MyContext>) -> Self {
        Self { context }
    }
}

impl CountryRepository for InMemoryCountryRepository {
    fn list(&self) -> RepositoryResult<Vec<Country>> {
        self.context
            .database()
            .read(|t| t.countries.iter().cloned().collect())
    }

    fn get(&self, id: CountryId) -> RepositoryResult<Option<Country>> {
        self.context
            .database()
            .read(|t| t.countries.get(id).cloned())
    }

    fn exists(&self, id: CountryId) -> RepositoryResult<bool> {
        self.context.database().read(|t| t.countries.contains(id))
    }

    fn add(&self, country: NewCountry) -> RepositoryResult<Country> {
        let db = self.context.database();
        let (country, cities) = country.into_country(db.next_country_id()?);

        self.context.stage(Change::AddCountry(country.clone()))?;
        for city in cities {
            let city = city.into_city(db.next_city_id()?, country.id);
            self.context.stage(Change::AddCity(city))?;
        }
        Ok(country)
    }

    fn remove(&self, id: CountryId) -> RepositoryResult<()> {
        self.context.stage(Change::RemoveCountry(id))
    }
}
