//! Comment handlers, including the live comment stream.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use actix_web::http::header;
use actix_web::web::Bytes;
use actix_web::{HttpResponse, web};
use futures::Stream;
use tokio::sync::mpsc;
use uuid::Uuid;

use murmur_core::domain::PostEvent;
use murmur_core::ports::{EventBus, EventHandler, Subscription};
use murmur_shared::dto::AddCommentRequest;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const STREAM_BUFFER: usize = 32;

/// GET /api/posts/{id}/comments
pub async fn list_comments(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let comments = state.actions.list_comments(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// POST /api/posts/{id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<AddCommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .actions
        .add_comment(path.into_inner(), &identity.comment_author(), &body.content)
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// GET /api/posts/{id}/comments/stream
///
/// Server-Sent Events: the existing comments first, then every event
/// published for the post. The stream ends when the post is deleted.
pub async fn stream_comments(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    state.actions.get_post(post_id).await?;

    let (tx, rx) = mpsc::channel(STREAM_BUFFER);
    let handler: EventHandler = Box::new(move |event| {
        let tx = tx.clone();
        Box::pin(async move {
            // A closed receiver means the client is gone; the drop guard unsubscribes.
            let _ = tx.send(event).await;
        })
    });

    // Subscribe before listing so nothing falls between the two.
    let subscription = state
        .events
        .subscribe(post_id, handler)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let backlog = match state.actions.list_comments(post_id).await {
        Ok(comments) => comments,
        Err(e) => {
            release(state.events.clone(), subscription);
            return Err(e.into());
        }
    };

    tracing::info!(post_id = %post_id, backlog = backlog.len(), "Comment stream opened");

    let stream = CommentStream {
        backlog: backlog
            .into_iter()
            .map(|comment| PostEvent::CommentAdded { comment })
            .collect::<Vec<_>>()
            .into_iter(),
        rx,
        events: state.events.clone(),
        subscription: Some(subscription),
        finished: false,
    };

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(stream))
}

fn release(events: Arc<dyn EventBus>, subscription: Subscription) {
    actix_web::rt::spawn(async move {
        if let Err(e) = events.unsubscribe(subscription).await {
            tracing::warn!(post_id = %subscription.post_id, error = %e, "Failed to unsubscribe");
        }
    });
}

fn event_name(event: &PostEvent) -> &'static str {
    match event {
        PostEvent::CommentAdded { .. } => "comment_added",
        PostEvent::LikeToggled { .. } => "like_toggled",
        PostEvent::PostDeleted { .. } => "post_deleted",
    }
}

fn sse_frame(event: &PostEvent) -> Result<Bytes, actix_web::Error> {
    let data = serde_json::to_string(event)?;
    Ok(Bytes::from(format!(
        "event: {}\ndata: {}\n\n",
        event_name(event),
        data
    )))
}

/// Event stream for one post. Unsubscribes when the client disconnects.
struct CommentStream {
    backlog: std::vec::IntoIter<PostEvent>,
    rx: mpsc::Receiver<PostEvent>,
    events: Arc<dyn EventBus>,
    subscription: Option<Subscription>,
    finished: bool,
}

impl Stream for CommentStream {
    type Item = Result<Bytes, actix_web::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        let event = match self.backlog.next() {
            Some(event) => event,
            None => match ready!(self.rx.poll_recv(cx)) {
                Some(event) => event,
                None => return Poll::Ready(None),
            },
        };

        if matches!(event, PostEvent::PostDeleted { .. }) {
            self.finished = true;
        }

        Poll::Ready(Some(sse_frame(&event)))
    }
}

impl Drop for CommentStream {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            tracing::info!(post_id = %subscription.post_id, "Comment stream closed");
            release(self.events.clone(), subscription);
        }
    }
}
