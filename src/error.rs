use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use derive_more::From;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ErrorVerbosity {
    /// Server returns an empty response with [`StatusCode::NO_CONTENT`] for all errors.
    None,
    /// Server returns only the appropriate status code.
    StatusCode,
    /// Server returns only the message with the appropriate status code.
    Message,
    /// Server returns the message, the error type with cleared error content and the appropriate status code.
    Type,
    /// Server returns the message, the error type with the error content and the appropriate status code.
    Full,
}

impl Default for ErrorVerbosity {
    fn default() -> Self {
        ErrorVerbosity::Full
    }
}

impl ErrorVerbosity {
    pub fn should_generate_type(&self) -> bool {
        matches!(self, ErrorVerbosity::Type | ErrorVerbosity::Full)
    }

    pub fn should_generate_error_reason(&self) -> bool {
        matches!(self, ErrorVerbosity::Full)
    }
}

pub trait ErrorVerbosityProvider {
    fn error_verbosity(&self) -> ErrorVerbosity;
}

/// Maps any error into an [`InternalServerError`] using the verbosity of the given state.
///
/// ```ignore
/// state.books().list().await.map_err(server_error!(state))?;
/// ```
#[macro_export]
macro_rules! server_error {
    ($state:expr) => {
        |err| {
            use $crate::error::ErrorVerbosityProvider as _;

            $crate::error::InternalServerError::from_generic_error($state.error_verbosity(), err)
        }
    };
}

#[derive(Debug, Serialize)]
struct ApiErrorResponse {
    #[serde(flatten)]
    error: ApiError,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorMessage {
    message: &'static str,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status_code = self.error.status_code();

        match self.error.verbosity() {
            ErrorVerbosity::None => StatusCode::NO_CONTENT.into_response(),
            ErrorVerbosity::StatusCode => status_code.into_response(),
            ErrorVerbosity::Message => (
                status_code,
                Json(ErrorMessage {
                    message: self.message,
                }),
            )
                .into_response(),
            ErrorVerbosity::Type | ErrorVerbosity::Full => (status_code, Json(self)).into_response(),
        }
    }
}

#[derive(Debug, From, Serialize)]
#[serde(tag = "error_type", content = "error")]
/// API error
pub enum ApiError {
    /// Internal server error
    ///
    /// This error is returned when an internal server error occurs, e.g. the database is unreachable.
    InternalServerError(InternalServerError),
    /// Query error
    ///
    /// This error is returned when the query parameters are not as expected.
    Query(QueryError),
    /// Body error
    ///
    /// This error is returned when the body is not as expected.
    Body(BodyError),
    /// Path error
    ///
    /// This error is returned when the path is not as expected.
    Path(PathError),
    /// Method not allowed
    ///
    /// This error is returned when the method is not served by this service.
    MethodNotAllowed(MethodNotAllowedError),
    /// Not found error
    ///
    /// This error is returned when the requested route does not exist.
    NotFound(NotFoundError),
}

impl ApiError {
    fn verbosity(&self) -> ErrorVerbosity {
        match self {
            ApiError::InternalServerError(err) => err.verbosity,
            ApiError::Query(err) => err.verbosity,
            ApiError::Body(err) => err.verbosity,
            ApiError::Path(err) => err.verbosity,
            ApiError::MethodNotAllowed(err) => err.verbosity,
            ApiError::NotFound(err) => err.verbosity,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::InternalServerError(_) => "An internal server error has occurred",
            ApiError::Query(_) => "Failed to parse query parameters",
            ApiError::Body(_) => "Failed to parse request body",
            ApiError::Path(_) => "Failed to parse path parameters",
            ApiError::MethodNotAllowed(_) => "Method not allowed",
            ApiError::NotFound(_) => "The requested resource was not found",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Query(_) | ApiError::Body(_) | ApiError::Path(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<ApiError> for ApiErrorResponse {
    fn from(error: ApiError) -> Self {
        let message = error.message();

        ApiErrorResponse { error, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ApiErrorResponse::from(self).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct InternalServerError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
    internal_server_error: Option<String>,
}

impl InternalServerError {
    pub fn from_generic_error<E: Into<anyhow::Error>>(verbosity: ErrorVerbosity, err: E) -> Self {
        let err: anyhow::Error = err.into();
        let err = format!("{err:#}");
        tracing::error!(%err, "Internal server error");

        let internal_server_error = verbosity.should_generate_error_reason().then_some(err);

        InternalServerError {
            verbosity,
            internal_server_error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
    query_error_reason: Option<String>,
    query_expected_schema: Option<String>,
}

impl QueryError {
    pub fn from_query_rejection(
        verbosity: ErrorVerbosity,
        query_rejection: QueryRejection,
        query_expected_schema: String,
    ) -> Self {
        let (query_error_reason, query_expected_schema) =
            match verbosity.should_generate_error_reason() {
                true => (
                    Some(query_rejection.body_text()),
                    Some(query_expected_schema),
                ),
                false => (None, None),
            };

        QueryError {
            verbosity,
            query_error_reason,
            query_expected_schema,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BodyError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
    body_error_reason: Option<String>,
    body_expected_schema: Option<String>,
}

impl BodyError {
    pub fn new(
        verbosity: ErrorVerbosity,
        body_error_reason: String,
        body_expected_schema: String,
    ) -> Self {
        let (body_error_reason, body_expected_schema) =
            match verbosity.should_generate_error_reason() {
                true => (Some(body_error_reason), Some(body_expected_schema)),
                false => (None, None),
            };

        BodyError {
            verbosity,
            body_error_reason,
            body_expected_schema,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PathError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
    path_error_reason: Option<String>,
}

impl PathError {
    pub fn from_path_rejection(verbosity: ErrorVerbosity, path_rejection: PathRejection) -> Self {
        let path_error_reason = verbosity
            .should_generate_error_reason()
            .then(|| path_rejection.body_text());

        PathError {
            verbosity,
            path_error_reason,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MethodNotAllowedError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
}

impl MethodNotAllowedError {
    pub fn new(verbosity: ErrorVerbosity) -> Self {
        MethodNotAllowedError { verbosity }
    }
}

#[derive(Debug, Serialize)]
pub struct NotFoundError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
}

impl NotFoundError {
    pub fn new(verbosity: ErrorVerbosity) -> Self {
        NotFoundError { verbosity }
    }
}

/// An error specific to one route, e.g. a book that does not exist.
pub trait ResourceErrorProvider {
    type Context: Serialize;

    fn status_code(&self) -> StatusCode;

    fn message(&self) -> &'static str;

    fn context(&self) -> Self::Context;
}

#[derive(Debug, Serialize)]
struct ResourceErrorResponse<T, C> {
    message: &'static str,
    #[serde(flatten)]
    error: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<C>,
}

/// Error returned by routes that have their own error types.
///
/// Errors shared by all routes still surface as [`ApiError`]s.
#[derive(Debug)]
pub enum ResourceError<T> {
    Api(ApiError),
    Resource {
        verbosity: ErrorVerbosity,
        error_type: T,
    },
}

impl<T> ResourceError<T> {
    pub fn new(verbosity: ErrorVerbosity, error_type: T) -> Self {
        ResourceError::Resource {
            verbosity,
            error_type,
        }
    }
}

impl<T> From<ApiError> for ResourceError<T> {
    fn from(error: ApiError) -> Self {
        ResourceError::Api(error)
    }
}

impl<T> From<InternalServerError> for ResourceError<T> {
    fn from(error: InternalServerError) -> Self {
        ResourceError::Api(error.into())
    }
}

impl<T> IntoResponse for ResourceError<T>
where
    T: ResourceErrorProvider + Serialize,
{
    fn into_response(self) -> Response {
        let (verbosity, error_type) = match self {
            ResourceError::Api(error) => return error.into_response(),
            ResourceError::Resource {
                verbosity,
                error_type,
            } => (verbosity, error_type),
        };

        let status_code = error_type.status_code();
        let message = error_type.message();

        match verbosity {
            ErrorVerbosity::None => StatusCode::NO_CONTENT.into_response(),
            ErrorVerbosity::StatusCode => status_code.into_response(),
            ErrorVerbosity::Message => (status_code, Json(ErrorMessage { message })).into_response(),
            ErrorVerbosity::Type | ErrorVerbosity::Full => {
                let context = verbosity
                    .should_generate_error_reason()
                    .then(|| error_type.context());
                let error = verbosity.should_generate_type().then_some(error_type);

                let response = ResourceErrorResponse {
                    message,
                    error,
                    context,
                };

                (status_code, Json(response)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body is readable")
            .to_bytes();

        serde_json::from_slice(&bytes).expect("body is json")
    }

    #[tokio::test]
    async fn full_verbosity_includes_reason() {
        let error: ApiError = InternalServerError::from_generic_error(
            ErrorVerbosity::Full,
            anyhow::anyhow!("disk on fire"),
        )
        .into();

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error_type"], "InternalServerError");
        assert_eq!(body["error"]["internal_server_error"], "disk on fire");
        assert_eq!(body["message"], "An internal server error has occurred");
    }

    #[tokio::test]
    async fn message_verbosity_hides_reason() {
        let error: ApiError = InternalServerError::from_generic_error(
            ErrorVerbosity::Message,
            anyhow::anyhow!("disk on fire"),
        )
        .into();

        let body = body_json(error.into_response()).await;

        assert_eq!(
            body,
            serde_json::json!({ "message": "An internal server error has occurred" })
        );
    }

    #[tokio::test]
    async fn none_verbosity_returns_no_content() {
        let error: ApiError = NotFoundError::new(ErrorVerbosity::None).into();

        assert_eq!(error.into_response().status(), StatusCode::NO_CONTENT);
    }
}
