//! Entity <-> resource mapping.

use myrestful_core::{City, Country, NewCity, NewCountry};

use crate::app::dto::{
    CityAddResource, CityResource, CityUpdateResource, CountryAddResource, CountryResource,
};

impl From<City> for CityResource {
    fn from(city: City) -> Self {
        Self {
            id: city.id,
            country_id: city.country_id,
            name: city.name,
            description: city.description,
        }
    }
}

impl From<Country> for CountryResource {
    fn from(country: Country) -> Self {
        Self {
            id: country.id,
            english_name: country.english_name,
            chinese_name: country.chinese_name,
            abbreviation: country.abbreviation,
            cities: Vec::new(),
        }
    }
}

impl CountryResource {
    pub fn with_cities(country: Country, cities: Vec<City>) -> Self {
        Self {
            cities: cities.into_iter().map(CityResource::from).collect(),
            ..Self::from(country)
        }
    }
}

impl From<CityAddResource> for NewCity {
    fn from(resource: CityAddResource) -> Self {
        Self {
            name: resource.name,
            description: resource.description,
        }
    }
}

impl From<CountryAddResource> for NewCountry {
    fn from(resource: CountryAddResource) -> Self {
        Self {
            english_name: resource.english_name,
            chinese_name: resource.chinese_name,
            abbreviation: resource.abbreviation,
            cities: resource.cities.into_iter().map(NewCity::from).collect(),
        }
    }
}

impl CityUpdateResource {
    /// Overwrite the mutable fields of `city`; identity and owner are kept.
    pub fn apply_to(self, city: &mut City) {
        city.name = self.name;
        city.description = self.description;
    }
}
