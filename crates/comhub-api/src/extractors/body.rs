//! JSON body and query-string extractors that reject with the API error
//! envelope instead of Axum's plain-text responses.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use comhub_core::error::AppError;

use crate::error::ApiError;

fn json_error(rejection: JsonRejection) -> ApiError {
    let err = match rejection {
        JsonRejection::JsonDataError(e) => {
            AppError::validation(e.body_text()).with_code("INVALID_BODY")
        }
        JsonRejection::MissingJsonContentType(e) => {
            AppError::bad_request(e.body_text()).with_code("UNSUPPORTED_MEDIA_TYPE")
        }
        other => AppError::bad_request(other.body_text()).with_code("INVALID_BODY"),
    };
    ApiError(err)
}

/// A JSON body, deserialized only.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_error)?;
        Ok(Self(value))
    }
}

/// A JSON body that is deserialized, then checked with `validator`.
///
/// All field problems are reported together as a `422` with a
/// `field -> [messages]` map in `details`.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonBody(value) = JsonBody::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Typed query parameters.
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| {
                AppError::bad_request(e.body_text()).with_code("INVALID_QUERY")
            })?;
        Ok(Self(value))
    }
}
