//! Request validation.
//!
//! Validators are registered per resource type in a [`ValidatorRegistry`]
//! and resolved with transient lifetime (a new instance per resolution). The
//! [`Validated`] extractor decodes the body with the input formatter picked
//! by `Content-Type`, then runs the registered validator (if any) before the
//! handler sees the value.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::app::dto::{
    CityAddOrUpdateResource, CityAddResource, CityUpdateResource, CountryAddResource,
};
use crate::app::errors::ApiError;
use crate::app::negotiation::{Format, accept_header, negotiate};
use crate::app::services::AppServices;

/// One field-level rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub field: String,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Body of a 422 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationProblem {
    pub title: String,
    #[serde(default)]
    pub errors: Vec<ValidationFailure>,
}

impl ValidationProblem {
    pub fn new(errors: Vec<ValidationFailure>) -> Self {
        Self {
            title: "One or more validation errors occurred.".to_string(),
            errors,
        }
    }
}

/// Inspects a resource and reports every rule it breaks. Empty means valid.
pub trait Validator<T>: Send + Sync {
    fn validate(&self, instance: &T) -> Vec<ValidationFailure>;
}

// -------------------------
// Rules
// -------------------------

fn not_empty(failures: &mut Vec<ValidationFailure>, field: &str, value: Option<&str>) {
    if value.is_none_or(|v| v.trim().is_empty()) {
        failures.push(ValidationFailure::new(field, format!("'{field}' must not be empty.")));
    }
}

fn max_length(failures: &mut Vec<ValidationFailure>, field: &str, value: Option<&str>, max: usize) {
    let Some(value) = value else { return };
    let len = value.chars().count();
    if len > max {
        failures.push(ValidationFailure::new(
            field,
            format!("'{field}' must be {max} characters or fewer. You entered {len} characters."),
        ));
    }
}

// -------------------------
// Validators
// -------------------------

/// Rules shared by every city resource.
pub struct CityAddOrUpdateResourceValidator<T> {
    _resource: PhantomData<fn(&T)>,
}

impl<T> Default for CityAddOrUpdateResourceValidator<T> {
    fn default() -> Self {
        Self {
            _resource: PhantomData,
        }
    }
}

impl<T: CityAddOrUpdateResource> CityAddOrUpdateResourceValidator<T> {
    pub const NAME_MAX: usize = 10;
    pub const DESCRIPTION_MAX: usize = 100;

    fn check(&self, prefix: &str, instance: &T, failures: &mut Vec<ValidationFailure>) {
        let name = format!("{prefix}name");
        not_empty(failures, &name, Some(instance.name()));
        max_length(failures, &name, Some(instance.name()), Self::NAME_MAX);
        max_length(
            failures,
            &format!("{prefix}description"),
            instance.description(),
            Self::DESCRIPTION_MAX,
        );
    }
}

impl<T: CityAddOrUpdateResource> Validator<T> for CityAddOrUpdateResourceValidator<T> {
    fn validate(&self, instance: &T) -> Vec<ValidationFailure> {
        let mut failures = Vec::new();
        self.check("", instance, &mut failures);
        failures
    }
}

/// City update: the shared rules plus a mandatory description.
#[derive(Default)]
pub struct CityUpdateResourceValidator {
    base: CityAddOrUpdateResourceValidator<CityUpdateResource>,
}

impl Validator<CityUpdateResource> for CityUpdateResourceValidator {
    fn validate(&self, instance: &CityUpdateResource) -> Vec<ValidationFailure> {
        let mut failures = self.base.validate(instance);
        not_empty(&mut failures, "description", instance.description());
        failures
    }
}

#[derive(Default)]
pub struct CountryAddResourceValidator {
    cities: CityAddOrUpdateResourceValidator<CityAddResource>,
}

impl CountryAddResourceValidator {
    pub const NAME_MAX: usize = 100;
    pub const ABBREVIATION_MAX: usize = 5;
}

impl Validator<CountryAddResource> for CountryAddResourceValidator {
    fn validate(&self, instance: &CountryAddResource) -> Vec<ValidationFailure> {
        let mut failures = Vec::new();

        for (field, value, max) in [
            ("englishName", instance.english_name.as_str(), Self::NAME_MAX),
            ("chineseName", instance.chinese_name.as_str(), Self::NAME_MAX),
            ("abbreviation", instance.abbreviation.as_str(), Self::ABBREVIATION_MAX),
        ] {
            not_empty(&mut failures, field, Some(value));
            max_length(&mut failures, field, Some(value), max);
        }

        for (i, city) in instance.cities.iter().enumerate() {
            self.cities.check(&format!("cities[{i}]."), city, &mut failures);
        }

        failures
    }
}

// -------------------------
// Registry
// -------------------------

type Factory<T> = fn() -> Box<dyn Validator<T>>;

fn construct<T, V>() -> Box<dyn Validator<T>>
where
    V: Validator<T> + Default + 'static,
{
    Box::new(V::default())
}

/// Validators keyed by the resource type they check.
#[derive(Default)]
pub struct ValidatorRegistry {
    factories: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `V` as the validator for `T`; a fresh `V` is built on every
    /// resolution. Re-registering replaces the previous validator.
    pub fn register_transient<T, V>(&mut self)
    where
        T: 'static,
        V: Validator<T> + Default + 'static,
    {
        let factory: Factory<T> = construct::<T, V>;
        self.factories.insert(TypeId::of::<T>(), Box::new(factory));
    }

    pub fn resolve<T: 'static>(&self) -> Option<Box<dyn Validator<T>>> {
        let factory = self
            .factories
            .get(&TypeId::of::<T>())?
            .downcast_ref::<Factory<T>>()?;
        Some(factory())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("registered", &self.factories.len())
            .finish()
    }
}

// -------------------------
// Extractor
// -------------------------

/// A request body that was decoded and passed its registered validator.
#[derive(Debug, Clone)]
pub struct Validated<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send + 'static,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let output = negotiate(accept_header(req.headers())).ok_or(ApiError::NotAcceptable)?;
        let input = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(Format::from_content_type)
            .ok_or(ApiError::UnsupportedMediaType)?;
        let services = req
            .extensions()
            .get::<Arc<AppServices>>()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("application services are not registered"))?;

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::InvalidBody(e.body_text()))?;
        let value: T = input.read(&body).map_err(ApiError::InvalidBody)?;

        if let Some(validator) = services.validators().resolve::<T>() {
            let failures = validator.validate(&value);
            if !failures.is_empty() {
                tracing::debug!(
                    resource = std::any::type_name::<T>(),
                    failures = failures.len(),
                    "request body failed validation"
                );
                return Err(ApiError::Validation {
                    problem: ValidationProblem::new(failures),
                    format: output,
                });
            }
        }

        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fields(failures: &[ValidationFailure]) -> Vec<&str> {
        failures.iter().map(|f| f.field.as_str()).collect()
    }

    fn valid_country() -> CountryAddResource {
        CountryAddResource {
            english_name: "China".into(),
            chinese_name: "中国".into(),
            abbreviation: "CN".into(),
            cities: vec![CityAddResource {
                name: "Beijing".into(),
                description: Some("capital".into()),
            }],
        }
    }

    #[test]
    fn valid_country_has_no_failures() {
        assert!(CountryAddResourceValidator::default().validate(&valid_country()).is_empty());
    }

    #[test]
    fn country_reports_every_missing_field() {
        let failures = CountryAddResourceValidator::default().validate(&CountryAddResource::default());
        assert_eq!(fields(&failures), vec!["englishName", "chineseName", "abbreviation"]);
        assert_eq!(failures[0].message, "'englishName' must not be empty.");
    }

    #[test]
    fn nested_city_failures_are_prefixed() {
        let mut country = valid_country();
        country.cities.push(CityAddResource {
            name: " ".into(),
            description: None,
        });
        let failures = CountryAddResourceValidator::default().validate(&country);
        assert_eq!(fields(&failures), vec!["cities[1].name"]);
    }

    #[test]
    fn city_update_requires_description() {
        let validator = CityUpdateResourceValidator::default();
        let failures = validator.validate(&CityUpdateResource {
            name: "Tokyo".into(),
            description: None,
        });
        assert_eq!(fields(&failures), vec!["description"]);

        assert!(validator
            .validate(&CityUpdateResource {
                name: "Tokyo".into(),
                description: Some("capital".into()),
            })
            .is_empty());
    }

    #[test]
    fn city_add_allows_missing_description() {
        let validator = CityAddOrUpdateResourceValidator::<CityAddResource>::default();
        assert!(validator
            .validate(&CityAddResource {
                name: "Osaka".into(),
                description: None,
            })
            .is_empty());
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let validator = CityAddOrUpdateResourceValidator::<CityAddResource>::default();
        let ten_chars = "乌鲁木齐乌鲁木齐乌鲁".to_string();
        assert_eq!(ten_chars.chars().count(), 10);
        assert!(validator
            .validate(&CityAddResource {
                name: ten_chars,
                description: None,
            })
            .is_empty());
    }

    #[test]
    fn registry_resolves_by_resource_type() {
        let mut registry = ValidatorRegistry::new();
        assert!(registry.is_empty());
        registry.register_transient::<CityUpdateResource, CityUpdateResourceValidator>();

        assert_eq!(registry.len(), 1);
        assert!(registry.resolve::<CityUpdateResource>().is_some());
        assert!(registry.resolve::<CityAddResource>().is_none());
    }

    proptest! {
        #[test]
        fn city_name_limit_is_enforced(name in "[a-zA-Z]{1,30}") {
            let validator = CityAddOrUpdateResourceValidator::<CityAddResource>::default();
            let too_long = name.chars().count() > 10;
            let failures = validator.validate(&CityAddResource { name, description: None });
            prop_assert_eq!(!failures.is_empty(), too_long);
        }

        #[test]
        fn abbreviation_limit_is_enforced(abbr in "[A-Z]{1,12}") {
            let mut country = valid_country();
            let too_long = abbr.len() > 5;
            country.abbreviation = abbr;
            let failures = CountryAddResourceValidator::default().validate(&country);
            prop_assert_eq!(fields(&failures).contains(&"abbreviation"), too_long);
        }
    }

    fn body_request(accept: &str, body: &'static str) -> Request {
        let mut req = axum::http::Request::builder()
            .method("PUT")
            .uri("/")
            .header(axum::http::header::ACCEPT, accept)
            .header(CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body))
            .unwrap();
        req.extensions_mut()
            .insert(Arc::new(AppServices::new("extractor-tests")));
        req
    }

    #[tokio::test]
    async fn unacceptable_accept_is_rejected_before_validation() {
        let req = body_request("text/csv", r#"{"name":""}"#);
        let err = Validated::<CityUpdateResource>::from_request(req, &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotAcceptable));
    }

    #[tokio::test]
    async fn validation_problem_uses_negotiated_format() {
        let req = body_request("application/xml", r#"{"name":""}"#);
        let err = Validated::<CityUpdateResource>::from_request(req, &())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation {
                format: Format::Xml,
                ..
            }
        ));
    }
}
