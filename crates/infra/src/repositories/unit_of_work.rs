use std::sync::Arc;

use myrestful_core::{RepositoryResult, UnitOfWork};

use crate::db::MyContext;

/// [`UnitOfWork`] committing everything staged on one [`MyContext`].
#[derive(Debug, Clone)]
pub struct InMemoryUnitOfWork {
    context: Arc<MyContext>,
}

impl InMemoryUnitOfWork {
    pub fn new(context: Arc<MyContext>) -> Self {
        Self { context }
    }
}

impl UnitOfWork for InMemoryUnitOfWork {
    fn save(&self) -> RepositoryResult<usize> {
        self.context.save_changes()
    }
}
