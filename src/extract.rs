use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::ApiError;

/// `axum::Json` with the rejection routed through [`ApiError`], so a
/// malformed body comes back as `{"success": false, "message": ...}`
/// like every other failure instead of axum's plain-text default.
#[derive(Debug)]
pub struct Json<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Json(value)),
            Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
        }
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request as HttpRequest, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        name: String,
    }

    async fn extract(body: &str, content_type: Option<&str>) -> Result<Json<Payload>, ApiError> {
        let mut builder = HttpRequest::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        let req = builder.body(Body::from(body.to_owned())).expect("request");
        Json::<Payload>::from_request(req, &()).await
    }

    #[tokio::test]
    async fn valid_json_passes_through() {
        let Json(p) = extract(r#"{"name":"Tomato"}"#, Some("application/json"))
            .await
            .expect("extract");
        assert_eq!(p.name, "Tomato");
    }

    #[tokio::test]
    async fn malformed_json_keeps_the_error_envelope() {
        let err = extract("{not json", Some("application/json"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let resp = err.into_response();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().is_some());
    }

    #[tokio::test]
    async fn missing_content_type_is_also_enveloped() {
        let err = extract(r#"{"name":"Tomato"}"#, None).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
