use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::cakes::CakeError;
use crate::application::error::ErrorReport;
use crate::application::repos::RepoError;

const SOURCE: &str = "infra::http::cakes";

pub mod codes {
    pub const VALIDATION: &str = "validation_failed";
    pub const INVALID_ARGUMENT: &str = "invalid_argument";
    pub const NOT_FOUND: &str = "not_found";
    pub const ALREADY_DELETED: &str = "already_deleted";
    pub const INTERNAL: &str = "internal_error";
}

/// `{"success": …, "data": …}` wrapper shared by every API response.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub code: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<&'static str, String>>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorBody,
    report: ErrorReport,
}

impl ApiError {
    fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                code,
                message,
                fields: None,
            },
            report: ErrorReport::from_message(SOURCE, status, detail),
        }
    }

    pub fn invalid_argument(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_ARGUMENT,
            "invalid argument",
            detail,
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<CakeError> for ApiError {
    fn from(err: CakeError) -> Self {
        match err {
            CakeError::Validation(errors) => {
                let mut api = Self::new(
                    StatusCode::BAD_REQUEST,
                    codes::VALIDATION,
                    "validation failed",
                    errors.to_string(),
                );
                api.body.fields = Some(errors.to_field_map());
                api
            }
            CakeError::InvalidArgument(argument) => {
                Self::invalid_argument(format!("invalid argument `{argument}`"))
            }
            CakeError::NotFound | CakeError::Repo(RepoError::NotFound) => Self::new(
                StatusCode::NOT_FOUND,
                codes::NOT_FOUND,
                "record not found",
                "record not found",
            ),
            CakeError::AlreadyDeleted => Self::new(
                StatusCode::BAD_REQUEST,
                codes::ALREADY_DELETED,
                "record already deleted",
                "record already deleted",
            ),
            CakeError::Repo(repo) => {
                let mut api = Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    codes::INTERNAL,
                    "internal system error",
                    String::new(),
                );
                api.report = ErrorReport::from_error(SOURCE, api.status, &repo);
                api
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let envelope = Envelope {
            success: false,
            data: self.body,
        };
        let mut response = (self.status, Json(envelope)).into_response();
        self.report.attach(&mut response);
        response
    }
}
