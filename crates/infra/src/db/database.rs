use std::sync::RwLock;
use std::sync::atomic::{AtomicI32, Ordering};

use myrestful_core::{City, CityId, Country, CountryId, RepositoryError};

use super::table::Table;

/// Committed rows of every table.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub countries: Table<Country>,
    pub cities: Table<City>,
}

/// Process-wide, volatile store shared by every request.
///
/// Contents are lost when the process exits. Identifier sequences start at 1
/// and are never reused, even if the change that consumed an id is discarded;
/// once a sequence reaches `i32::MAX` further ids are refused.
///
/// A commit copies every table before applying its changes, so each write
/// costs time proportional to the whole store.
#[derive(Debug)]
pub struct InMemoryDatabase {
    name: String,
    tables: RwLock<Tables>,
    country_seq: AtomicI32,
    city_seq: AtomicI32,
}

impl InMemoryDatabase {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: RwLock::new(Tables::default()),
            country_seq: AtomicI32::new(0),
            city_seq: AtomicI32::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn next_country_id(&self) -> Result<CountryId, RepositoryError> {
        next_id(&self.country_seq, "country").map(CountryId::new)
    }

    pub(crate) fn next_city_id(&self) -> Result<CityId, RepositoryError> {
        next_id(&self.city_seq, "city").map(CityId::new)
    }

    /// Run `f` against a consistent snapshot of the committed tables.
    pub fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> Result<R, RepositoryError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| RepositoryError::Poisoned("tables"))?;
        Ok(f(&tables))
    }

    /// Apply `f` to a working copy of the tables and publish it only if `f`
    /// succeeds, so a failed commit leaves the store untouched.
    pub(crate) fn commit<R>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<R, RepositoryError>,
    ) -> Result<R, RepositoryError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| RepositoryError::Poisoned("tables"))?;
        let mut working = tables.clone();
        let out = f(&mut working)?;
        *tables = working;
        Ok(out)
    }
}

/// Advance a sequence holding the last issued id.
fn next_id(seq: &AtomicI32, entity: &'static str) -> Result<i32, RepositoryError> {
    seq.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| last.checked_add(1))
        .map(|last| last + 1)
        .map_err(|_| RepositoryError::SequenceExhausted(entity))
}

impl Default for InMemoryDatabase {
    fn default() -> Self {
        Self::named("MyDatabase")
    }
}
