//! Server-sent stream of library snapshots.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream};
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::Result;
use crate::state::AppState;

/// Emits a `library` event with the user's routines, sets and exercises
/// once all three are loaded and again after every change. Closing the
/// connection drops the subscriptions.
pub async fn events(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>>> {
    let watcher = state.portal.catalog().watch_library(&identity).await?;
    info!("Library stream opened for {}", identity.user_id);

    let events = stream::unfold(watcher, |mut watcher| async move {
        let library = watcher.next().await?;
        let event = Event::default().event("library").json_data(&library);
        Some((event, watcher))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
