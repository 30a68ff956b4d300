use std::sync::Arc;

use myrestful_core::{City, CityId, CityRepository, CountryId, NewCity, RepositoryResult};

use crate::db::{Change, MyContext};

/// [`CityRepository`] over a request's [`MyContext`].
#[derive(Debug, Clone)]
pub struct InMemoryCityRepository {
    context: Arc<MyContext>,
}

impl InMemoryCityRepository {
    pub fn new(context: Arc<MyContext>) -> Self {
        Self { context }
    }
}

impl CityRepository for InMemoryCityRepository {
    fn list_for_country(&self, country_id: CountryId) -> RepositoryResult<Vec<City>> {
        self.context.database().read(|t| {
            t.cities
                .iter()
                .filter(|c| c.country_id == country_id)
                .cloned()
                .collect()
        })
    }

    fn get_for_country(&self, country_id: CountryId, id: CityId) -> RepositoryResult<Option<City>> {
        self.context.database().read(|t| {
            t.cities
                .get(id)
                .filter(|c| c.country_id == country_id)
                .cloned()
        })
    }

    fn add(&self, country_id: CountryId, city: NewCity) -> RepositoryResult<City> {
        let city = city.into_city(self.context.database().next_city_id()?, country_id);
        self.context.stage(Change::AddCity(city.clone()))?;
        Ok(city)
    }

    fn update(&self, city: City) -> RepositoryResult<()> {
        self.context.stage(Change::UpdateCity(city))
    }

    fn remove(&self, id: CityId) -> RepositoryResult<()> {
        self.context.stage(Change::RemoveCity(id))
    }
}
