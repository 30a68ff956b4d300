//! Country entity.

use crate::city::NewCity;
use crate::entity::Entity;
use crate::id::CountryId;

/// A persisted country. Owns zero or more [`crate::City`] rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    pub id: CountryId,
    pub english_name: String,
    pub chinese_name: String,
    pub abbreviation: String,
}

impl Entity for Country {
    type Id = CountryId;
    const NAME: &'static str = "country";

    fn id(&self) -> CountryId {
        self.id
    }
}

/// A country that has not been assigned an identifier yet, optionally with
/// the cities created alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewCountry {
    pub english_name: String,
    pub chinese_name: String,
    pub abbreviation: String,
    pub cities: Vec<NewCity>,
}

impl NewCountry {
    pub fn into_country(self, id: CountryId) -> (Country, Vec<NewCity>) {
        let country = Country {
            id,
            english_name: self.english_name,
            chinese_name: self.chinese_name,
            abbreviation: self.abbreviation,
        };
        (country, self.cities)
    }
}
