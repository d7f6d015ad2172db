//! `Query` and `Json` wrappers whose rejections render as `ApiError` JSON
//! instead of axum's plain-text bodies.

use axum::extract::{FromRequest, FromRequestParts, Json, Query};

use crate::api::error::ApiError;

#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
