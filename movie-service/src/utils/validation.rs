use axum::{
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use validator::Validate;

/// Path parameters that are deserialized and validated before the handler runs.
pub struct ValidatedPath<T>(pub T);

/// Query parameters that are deserialized and validated before the handler runs.
pub struct ValidatedQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid path: {}", e)))?;

        value.validate()?;
        Ok(ValidatedPath(value))
    }
}

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid query: {}", e)))?;

        value.validate()?;
        Ok(ValidatedQuery(value))
    }
}
