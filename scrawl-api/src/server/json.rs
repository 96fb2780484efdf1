//! JSON request/response plumbing for the view-model surface.

use crate::server::ServerError;
use axum::{
    Json as AxumJson,
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use headers::ContentType;
use scrawl_common::forms::FormErrors;
use serde::Serialize;

/// Extractor and response wrapper; both an incoming rejection and an
/// outgoing serialization failure surface as a [`ServerError`].
#[derive(FromRequest, Debug, Clone, Copy, Default)]
#[from_request(via(AxumJson), rejection(ServerError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(body) => (TypedHeader(ContentType::json()), body).into_response(),
            Err(err) => ServerError::JsonResponse(err).into_response(),
        }
    }
}

/// Body of every non-redirect error reply: the status code, plus the
/// field-level messages when a form submission failed validation.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct ErrorBody {
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<FormErrors>,
}

impl ErrorBody {
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status: status.as_u16(),
            errors: None,
        }
    }

    #[must_use]
    pub fn with_errors(status: StatusCode, errors: FormErrors) -> Self {
        Self {
            status: status.as_u16(),
            errors: Some(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::server::json::ErrorBody;
    use axum::http::StatusCode;
    use scrawl_common::forms::FormErrors;
    use serde_json::json;

    #[test]
    fn error_body_omits_absent_field_errors() {
        let body = serde_json::to_value(ErrorBody::new(StatusCode::NOT_FOUND)).unwrap();
        assert_eq!(body, json!({ "status": 404 }));
    }

    #[test]
    fn error_body_carries_field_errors() {
        let errors = FormErrors::single("text", "Post text must not be empty");
        let body = ErrorBody::with_errors(StatusCode::UNPROCESSABLE_ENTITY, errors);

        let value = serde_json::to_value(body).unwrap();
        assert_eq!(value["status"], 422);
        assert_eq!(value["errors"][0]["field"], "text");
    }
}
