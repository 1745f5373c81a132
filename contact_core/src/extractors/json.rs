//! JSON extractor that ignores the request content type

use axum::{
    async_trait,
    body::{Body, Bytes},
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Parses the raw request body as JSON whatever `Content-Type` says.
///
/// Any read or parse failure is rejected as [`AppError::InvalidBody`].
pub struct LenientJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::InvalidBody(rejection.body_text()))?;

        serde_json::from_slice(&bytes)
            .map(LenientJson)
            .map_err(|e| AppError::InvalidBody(e.to_string()))
    }
}
