//! City entity.

use crate::entity::Entity;
use crate::id::{CityId, CountryId};

/// A persisted city, owned by exactly one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    pub id: CityId,
    pub country_id: CountryId,
    pub name: String,
    pub description: Option<String>,
}

impl Entity for City {
    type Id = CityId;
    const NAME: &'static str = "city";

    fn id(&self) -> CityId {
        self.id
    }
}

/// A city that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewCity {
    pub name: String,
    pub description: Option<String>,
}

impl NewCity {
    pub fn into_city(self, id: CityId, country_id: CountryId) -> City {
        City {
            id,
            country_id,
            name: self.name,
            description: self.description,
        }
    }
}
