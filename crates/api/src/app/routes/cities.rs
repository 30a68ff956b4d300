use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use myrestful_core::{CityId, CountryId, NewCity};

use crate::app::dto::{CityAddResource, CityResource, CityUpdateResource};
use crate::app::errors::ApiError;
use crate::app::negotiation::Format;
use crate::app::routes::created;
use crate::app::services::RequestScope;
use crate::app::validation::Validated;

/// City routes, nested under a country.
pub fn router() -> Router {
    Router::new()
        .route("/:country_id/cities", get(list_cities).post(create_city))
        .route(
            "/:country_id/cities/:city_id",
            get(get_city).put(update_city).delete(delete_city),
        )
}

fn parse_ids(country_id: &str, city_id: &str) -> Result<(CountryId, CityId), ApiError> {
    Ok((country_id.parse()?, city_id.parse()?))
}

fn ensure_country(scope: &RequestScope, id: CountryId) -> Result<(), ApiError> {
    if scope.countries().exists(id)? {
        Ok(())
    } else {
        Err(ApiError::NotFound)
    }
}

pub async fn list_cities(
    Extension(scope): Extension<Arc<RequestScope>>,
    format: Format,
    Path(country_id): Path<String>,
) -> Result<Response, ApiError> {
    let country_id: CountryId = country_id.parse()?;
    ensure_country(&scope, country_id)?;

    let items: Vec<CityResource> = scope
        .cities()
        .list_for_country(country_id)?
        .into_iter()
        .map(CityResource::from)
        .collect();
    format.respond_list(StatusCode::OK, "Cities", &items)
}

pub async fn get_city(
    Extension(scope): Extension<Arc<RequestScope>>,
    format: Format,
    Path((country_id, city_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (country_id, city_id) = parse_ids(&country_id, &city_id)?;
    let city = scope
        .cities()
        .get_for_country(country_id, city_id)?
        .ok_or(ApiError::NotFound)?;
    format.respond(StatusCode::OK, "City", &CityResource::from(city))
}

pub async fn create_city(
    Extension(scope): Extension<Arc<RequestScope>>,
    format: Format,
    Path(country_id): Path<String>,
    Validated(body): Validated<CityAddResource>,
) -> Result<Response, ApiError> {
    let country_id: CountryId = country_id.parse()?;
    ensure_country(&scope, country_id)?;

    let city = scope.cities().add(country_id, NewCity::from(body))?;
    scope.unit_of_work().save()?;
    tracing::info!(%country_id, city_id = %city.id, "city created");

    let location = format!("/api/countries/{}/cities/{}", country_id, city.id);
    created(format, &location, "City", &CityResource::from(city))
}

pub async fn update_city(
    Extension(scope): Extension<Arc<RequestScope>>,
    _format: Format,
    Path((country_id, city_id)): Path<(String, String)>,
    Validated(body): Validated<CityUpdateResource>,
) -> Result<Response, ApiError> {
    let (country_id, city_id) = parse_ids(&country_id, &city_id)?;
    let mut city = scope
        .cities()
        .get_for_country(country_id, city_id)?
        .ok_or(ApiError::NotFound)?;

    body.apply_to(&mut city);
    scope.cities().update(city)?;
    scope.unit_of_work().save()?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn delete_city(
    Extension(scope): Extension<Arc<RequestScope>>,
    _format: Format,
    Path((country_id, city_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (country_id, city_id) = parse_ids(&country_id, &city_id)?;
    if scope.cities().get_for_country(country_id, city_id)?.is_none() {
        return Err(ApiError::NotFound);
    }

    scope.cities().remove(city_id)?;
    scope.unit_of_work().save()?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
