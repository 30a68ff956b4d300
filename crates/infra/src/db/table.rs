use std::collections::BTreeMap;

use myrestful_core::{Entity, RepositoryError};

/// Rows of one entity type, ordered by identifier.
#[derive(Debug, Clone)]
pub struct Table<E: Entity> {
    rows: BTreeMap<E::Id, E>,
}

impl<E: Entity> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<E> Table<E>
where
    E: Entity + Clone,
    E::Id: Into<i32>,
{
    pub fn get(&self, id: E::Id) -> Option<&E> {
        self.rows.get(&id)
    }

    pub fn contains(&self, id: E::Id) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Insert a new row; an existing row with the same id is an error.
    pub fn insert(&mut self, row: E) -> Result<(), RepositoryError> {
        let id = row.id();
        if self.rows.contains_key(&id) {
            return Err(RepositoryError::Duplicate {
                entity: E::NAME,
                id: id.into(),
            });
        }
        self.rows.insert(id, row);
        Ok(())
    }

    /// Replace an existing row; the row must already be present.
    pub fn replace(&mut self, row: E) -> Result<(), RepositoryError> {
        match self.rows.get_mut(&row.id()) {
            Some(slot) => {
                *slot = row;
                Ok(())
            }
            None => Err(Self::missing(row.id())),
        }
    }

    pub fn remove(&mut self, id: E::Id) -> Result<E, RepositoryError> {
        self.rows.remove(&id).ok_or_else(|| Self::missing(id))
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&E) -> bool) {
        self.rows.retain(|_id, row| keep(row));
    }

    fn missing(id: E::Id) -> RepositoryError {
        RepositoryError::NotFound {
            entity: E::NAME,
            id: id.into(),
        }
    }
}
