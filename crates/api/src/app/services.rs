//! Startup wiring: the process-wide service container and the per-request
//! scope built from it.

use std::sync::Arc;

use myrestful_core::{CityRepository, CountryRepository, UnitOfWork};
use myrestful_infra::{
    InMemoryCityRepository, InMemoryCountryRepository, InMemoryDatabase, InMemoryUnitOfWork,
    MyContext,
};

use crate::app::dto::{CityAddResource, CityUpdateResource, CountryAddResource};
use crate::app::validation::{
    CityAddOrUpdateResourceValidator, CityUpdateResourceValidator, CountryAddResourceValidator,
    ValidatorRegistry,
};

/// Constructors for the scoped persistence services. Each receives the
/// request's [`MyContext`], so everything built for one request commits
/// through the same change tracker.
#[derive(Debug, Clone, Copy)]
pub struct Persistence {
    pub countries: fn(Arc<MyContext>) -> Arc<dyn CountryRepository>,
    pub cities: fn(Arc<MyContext>) -> Arc<dyn CityRepository>,
    pub unit_of_work: fn(Arc<MyContext>) -> Arc<dyn UnitOfWork>,
}

fn in_memory_countries(context: Arc<MyContext>) -> Arc<dyn CountryRepository> {
    Arc::new(InMemoryCountryRepository::new(context))
}

fn in_memory_cities(context: Arc<MyContext>) -> Arc<dyn CityRepository> {
    Arc::new(InMemoryCityRepository::new(context))
}

fn in_memory_unit_of_work(context: Arc<MyContext>) -> Arc<dyn UnitOfWork> {
    Arc::new(InMemoryUnitOfWork::new(context))
}

impl Persistence {
    pub fn in_memory() -> Self {
        Self {
            countries: in_memory_countries,
            cities: in_memory_cities,
            unit_of_work: in_memory_unit_of_work,
        }
    }
}

impl Default for Persistence {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Bind each request resource type to its validator.
pub fn register_validators(registry: &mut ValidatorRegistry) {
    registry.register_transient::<CityAddResource, CityAddOrUpdateResourceValidator<CityAddResource>>();
    registry.register_transient::<CityUpdateResource, CityUpdateResourceValidator>();
    registry.register_transient::<CountryAddResource, CountryAddResourceValidator>();
}

/// Services built once at startup and shared by every request.
#[derive(Debug)]
pub struct AppServices {
    database: Arc<InMemoryDatabase>,
    persistence: Persistence,
    validators: ValidatorRegistry,
}

impl AppServices {
    /// Default wiring: in-memory persistence over the named store plus the
    /// resource validators.
    pub fn new(database_name: &str) -> Self {
        let mut validators = ValidatorRegistry::new();
        register_validators(&mut validators);

        tracing::debug!(
            database = database_name,
            validators = validators.len(),
            "registered application services"
        );

        Self {
            database: Arc::new(InMemoryDatabase::named(database_name)),
            persistence: Persistence::in_memory(),
            validators,
        }
    }

    pub fn with_persistence(mut self, persistence: Persistence) -> Self {
        self.persistence = persistence;
        self
    }

    pub fn database(&self) -> &Arc<InMemoryDatabase> {
        &self.database
    }

    pub fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    /// Build the scoped services for one request.
    pub fn begin_scope(&self) -> RequestScope {
        let context = Arc::new(MyContext::new(self.database.clone()));
        RequestScope {
            countries: (self.persistence.countries)(context.clone()),
            cities: (self.persistence.cities)(context.clone()),
            unit_of_work: (self.persistence.unit_of_work)(context.clone()),
            context,
        }
    }
}

/// Persistence services for a single request. Resolving a service twice
/// from the same scope yields the same instance.
pub struct RequestScope {
    context: Arc<MyContext>,
    countries: Arc<dyn CountryRepository>,
    cities: Arc<dyn CityRepository>,
    unit_of_work: Arc<dyn UnitOfWork>,
}

impl RequestScope {
    pub fn context(&self) -> &Arc<MyContext> {
        &self.context
    }

    pub fn countries(&self) -> &Arc<dyn CountryRepository> {
        &self.countries
    }

    pub fn cities(&self) -> &Arc<dyn CityRepository> {
        &self.cities
    }

    pub fn unit_of_work(&self) -> &Arc<dyn UnitOfWork> {
        &self.unit_of_work
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        let pending = self.context.pending_changes();
        if pending > 0 {
            tracing::debug!(pending, "discarding uncommitted changes at end of request");
        }
    }
}
