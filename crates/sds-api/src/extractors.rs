//! # Extraction Helpers
//!
//! Handlers take `Result<Json<T>, JsonRejection>` (or the query equivalent)
//! and pass it through these helpers so that malformed input comes back in
//! the standard error body instead of axum's plain-text rejection.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::Json;

use crate::error::AppError;

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
///
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
///     // use req...
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract query parameters, mapping parse errors to [`AppError::BadRequest`].
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Page {
        page: u32,
    }

    #[test]
    fn extract_json_passes_value_through() {
        let value = extract_json(Ok(Json(7_u32))).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn extract_query_maps_rejection_to_bad_request() {
        let uri: Uri = "/sds/search/?page=first".parse().unwrap();
        let result = extract_query(Query::<Page>::try_from_uri(&uri));
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let uri: Uri = "/sds/search/?page=3".parse().unwrap();
        let page = extract_query(Query::<Page>::try_from_uri(&uri)).unwrap();
        assert_eq!(page.page, 3);
    }
}
