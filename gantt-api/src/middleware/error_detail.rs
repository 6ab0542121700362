/// Development-mode error detail
///
/// 500 responses carry their real message in an
/// [`InternalErrorDetail`](crate::error::InternalErrorDetail) extension and a
/// generic body. With `APP_ENV=development` this layer swaps the body for the
/// detail so local debugging does not need the server logs.

use crate::error::InternalErrorDetail;
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use gantt_shared::wire::ErrorBody;

pub async fn expose_internal_errors(req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    if response.status() != StatusCode::INTERNAL_SERVER_ERROR {
        return response;
    }
    match response.extensions().get::<InternalErrorDetail>() {
        Some(InternalErrorDetail(detail)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: detail.clone(),
            }),
        )
            .into_response(),
        None => response,
    }
}
