//! Extractors and response helpers shared by the resource routes.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bookapi_http::AppError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::utils;

/// Thin reference to another resource inside a request body: `{"id": 3}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: i64,
}

/// Integer id from a single-segment path parameter.
///
/// Rejects with the JSON error body instead of axum's plain-text one.
#[derive(Debug, Clone, Copy)]
pub struct ResourceId(pub i64);

impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
        Ok(ResourceId(id))
    }
}

/// JSON request body; a missing or unparseable body is a 400
#[derive(Debug)]
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
        Ok(Payload(value))
    }
}

/// `201 Created` with a `Location` header and the created resource as body
pub fn created<T: Serialize>(module: &str, id: i64, body: T) -> Response {
    (
        StatusCode::CREATED,
        [(header::LOCATION, utils::resource_location(module, id))],
        Json(body),
    )
        .into_response()
}
