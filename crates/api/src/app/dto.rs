//! Wire resources.
//!
//! Every resource is written and read through both the JSON and the XML
//! formatter, so field names are shared (camelCase) and collections are
//! plain sequences. In XML a sequence field becomes repeated elements named
//! after the field.

use serde::{Deserialize, Serialize};

use myrestful_core::{CityId, CountryId};

// -------------------------
// Output resources
// -------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryResource {
    pub id: CountryId,
    pub english_name: String,
    pub chinese_name: String,
    pub abbreviation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cities: Vec<CityResource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityResource {
    pub id: CityId,
    pub country_id: CountryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// -------------------------
// Input resources
// -------------------------
//
// Missing text fields decode as empty strings so that the validators, not the
// formatter, report them.

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryAddResource {
    #[serde(default)]
    pub english_name: String,
    #[serde(default)]
    pub chinese_name: String,
    #[serde(default)]
    pub abbreviation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cities: Vec<CityAddResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityAddResource {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityUpdateResource {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Fields shared by the city add and update resources.
pub trait CityAddOrUpdateResource {
    fn name(&self) -> &str;
    fn description(&self) -> Option<&str>;
}

impl CityAddOrUpdateResource for CityAddResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl CityAddOrUpdateResource for CityUpdateResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
