use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use myrestful_core::{CountryId, NewCountry};

use crate::app::dto::{CountryAddResource, CountryResource};
use crate::app::errors::ApiError;
use crate::app::negotiation::Format;
use crate::app::routes::{cities, created};
use crate::app::services::RequestScope;
use crate::app::validation::Validated;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_countries).post(create_country))
        .route("/:country_id", get(get_country).delete(delete_country))
        .merge(cities::router())
}

pub async fn list_countries(
    Extension(scope): Extension<Arc<RequestScope>>,
    format: Format,
) -> Result<Response, ApiError> {
    let items: Vec<CountryResource> = scope
        .countries()
        .list()?
        .into_iter()
        .map(CountryResource::from)
        .collect();
    format.respond_list(StatusCode::OK, "Countries", &items)
}

pub async fn get_country(
    Extension(scope): Extension<Arc<RequestScope>>,
    format: Format,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: CountryId = id.parse()?;
    let country = scope.countries().get(id)?.ok_or(ApiError::NotFound)?;
    let cities = scope.cities().list_for_country(id)?;
    format.respond(StatusCode::OK, "Country", &CountryResource::with_cities(country, cities))
}

pub async fn create_country(
    Extension(scope): Extension<Arc<RequestScope>>,
    format: Format,
    Validated(body): Validated<CountryAddResource>,
) -> Result<Response, ApiError> {
    let country = scope.countries().add(NewCountry::from(body))?;
    scope.unit_of_work().save()?;
    tracing::info!(country_id = %country.id, "country created");

    let cities = scope.cities().list_for_country(country.id)?;
    let location = format!("/api/countries/{}", country.id);
    created(format, &location, "Country", &CountryResource::with_cities(country, cities))
}

pub async fn delete_country(
    Extension(scope): Extension<Arc<RequestScope>>,
    _format: Format,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: CountryId = id.parse()?;
    if !scope.countries().exists(id)? {
        return Err(ApiError::NotFound);
    }

    scope.countries().remove(id)?;
    scope.unit_of_work().save()?;
    tracing::info!(country_id = %id, "country deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}
