use axum::{Router, routing::any};
use std::sync::Arc;

use crate::{ApiState, handlers};

// Non-POST requests reach the handler so it can reject them with 400.
pub fn routes() -> Router<Arc<ApiState>> {
    Router::new().route("/telegram/webhook", any(handlers::telegram::inbound_update))
}
