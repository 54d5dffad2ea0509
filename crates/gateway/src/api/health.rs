//! `GET /health` (spec §6): 200 when operational.

use axum::http::StatusCode;

pub async fn handle() -> StatusCode {
    StatusCode::OK
}
