use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Extension, Router,
};
use futures::stream;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use super::hub::NotificationHub;
use crate::auth::Caller;
use crate::response::failure;

/// Server-sent-event stream of the caller's notifications.
pub fn notification_router(hub: Arc<NotificationHub>) -> Router {
    Router::new()
        .route("/api/v1/notifications/stream", get(stream_handler))
        .with_state(hub)
}

pub(crate) async fn stream_handler(
    State(hub): State<Arc<NotificationHub>>,
    Extension(caller): Extension<Caller>,
) -> Response {
    let receiver = match hub.subscribe(&caller.user_id) {
        Ok(receiver) => receiver,
        Err(err) => {
            error!(error = %err, user_id = %caller.user_id, "failed to open notification stream");
            return failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to open notification stream",
            );
        }
    };
    info!(user_id = %caller.user_id, "notification stream opened");

    let events = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(notification) => {
                    let event = Event::default()
                        .event(notification.kind.label())
                        .json_data(&notification);
                    return Some((event, receiver));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "notification stream lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}
