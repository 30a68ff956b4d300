use std::sync::{Arc, Mutex};

use myrestful_core::{City, CityId, Country, CountryId, RepositoryError};

use super::database::{InMemoryDatabase, Tables};

/// A write staged against the store, applied on commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    AddCountry(Country),
    RemoveCountry(CountryId),
    AddCity(City),
    UpdateCity(City),
    RemoveCity(CityId),
}

impl Change {
    fn apply(self, tables: &mut Tables) -> Result<(), RepositoryError> {
        match self {
            Change::AddCountry(country) => tables.countries.insert(country)?,
            Change::RemoveCountry(id) => {
                tables.countries.remove(id)?;
                tables.cities.retain(|city| city.country_id != id);
            }
            Change::AddCity(city) => {
                if !tables.countries.contains(city.country_id) {
                    return Err(RepositoryError::NotFound {
                        entity: "country",
                        id: city.country_id.value(),
                    });
                }
                tables.cities.insert(city)?;
            }
            Change::UpdateCity(city) => tables.cities.replace(city)?,
            Change::RemoveCity(id) => {
                tables.cities.remove(id)?;
            }
        }
        Ok(())
    }
}

/// Per-request database session over the shared [`InMemoryDatabase`].
///
/// Repositories stage changes here; the unit of work commits them.
#[derive(Debug)]
pub struct MyContext {
    database: Arc<InMemoryDatabase>,
    pending: Mutex<Vec<Change>>,
}

impl MyContext {
    pub fn new(database: Arc<InMemoryDatabase>) -> Self {
        Self {
            database,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn database(&self) -> &InMemoryDatabase {
        &self.database
    }

    pub fn pending_changes(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub(crate) fn stage(&self, change: Change) -> Result<(), RepositoryError> {
        self.pending
            .lock()
            .map_err(|_| RepositoryError::Poisoned("change tracker"))?
            .push(change);
        Ok(())
    }

    /// Commit every staged change atomically.
    ///
    /// On failure nothing is applied and the staged changes are kept.
    pub(crate) fn save_changes(&self) -> Result<usize, RepositoryError> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| RepositoryError::Poisoned("change tracker"))?;
        if pending.is_empty() {
            return Ok(0);
        }

        let changes = pending.clone();
        let applied = self.database.commit(move |tables| {
            let count = changes.len();
            for change in changes {
                change.apply(tables)?;
            }
            Ok(count)
        })?;

        pending.clear();
        tracing::debug!(
            database = self.database.name(),
            changes = applied,
            "committed staged changes"
        );
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn country(id: i32) -> Country {
        Country {
            id: CountryId::new(id),
            english_name: "Japan".into(),
            chinese_name: "日本".into(),
            abbreviation: "JP".into(),
        }
    }

    fn city(id: i32, country_id: i32) -> City {
        City {
            id: CityId::new(id),
            country_id: CountryId::new(country_id),
            name: "Tokyo".into(),
            description: None,
        }
    }

    #[test]
    fn staged_changes_are_invisible_until_saved() {
        let db = Arc::new(InMemoryDatabase::named("visibility"));
        let ctx = MyContext::new(db.clone());

        ctx.stage(Change::AddCountry(country(1))).unwrap();
        assert_eq!(ctx.pending_changes(), 1);
        assert_eq!(db.read(|t| t.countries.len()).unwrap(), 0);

        assert_eq!(ctx.save_changes().unwrap(), 1);
        assert_eq!(ctx.pending_changes(), 0);
        assert_eq!(db.read(|t| t.countries.len()).unwrap(), 1);
    }

    #[test]
    fn removing_a_country_cascades_to_its_cities() {
        let db = Arc::new(InMemoryDatabase::named("cascade"));
        let ctx = MyContext::new(db.clone());
        ctx.stage(Change::AddCountry(country(1))).unwrap();
        ctx.stage(Change::AddCountry(country(2))).unwrap();
        ctx.stage(Change::AddCity(city(1, 1))).unwrap();
        ctx.stage(Change::AddCity(city(2, 2))).unwrap();
        ctx.save_changes().unwrap();

        ctx.stage(Change::RemoveCountry(CountryId::new(1))).unwrap();
        ctx.save_changes().unwrap();

        let remaining: Vec<_> = db
            .read(|t| t.cities.iter().map(|c| c.id).collect())
            .unwrap();
        assert_eq!(remaining, vec![CityId::new(2)]);
    }

    #[test]
    fn failed_save_applies_nothing_and_keeps_changes() {
        let db = Arc::new(InMemoryDatabase::named("atomic"));
        let ctx = MyContext::new(db.clone());
        ctx.stage(Change::AddCountry(country(1))).unwrap();
        ctx.stage(Change::AddCity(city(1, 99))).unwrap();

        let err = ctx.save_changes().unwrap_err();
        assert_eq!(err, RepositoryError::NotFound { entity: "country", id: 99 });
        assert_eq!(ctx.pending_changes(), 2);
        assert_eq!(db.read(|t| t.countries.len()).unwrap(), 0);
    }

    #[test]
    fn colliding_insert_fails_the_whole_save() {
        let db = Arc::new(InMemoryDatabase::named("duplicate"));
        let first = MyContext::new(db.clone());
        first.stage(Change::AddCountry(country(1))).unwrap();
        first.save_changes().unwrap();

        let second = MyContext::new(db.clone());
        second.stage(Change::AddCountry(country(2))).unwrap();
        second.stage(Change::AddCountry(country(1))).unwrap();

        let err = second.save_changes().unwrap_err();
        assert_eq!(err, RepositoryError::Duplicate { entity: "country", id: 1 });
        assert_eq!(db.read(|t| t.countries.len()).unwrap(), 1);
    }
}
