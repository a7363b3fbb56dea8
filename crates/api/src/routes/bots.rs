use axum::{
    Router,
    routing::{delete, get, put},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/users/:user_id/bots",
            get(handlers::bots::list_bots).post(handlers::bots::create_bot),
        )
        .route("/api/users/:user_id/bots/link", get(handlers::bots::bot_link))
        .route("/api/users/:user_id/bots/:id", delete(handlers::bots::delete_bot))
        .route(
            "/api/users/:user_id/bots/:id/activate",
            put(handlers::bots::activate_bot),
        )
}
