use std::convert::Infallible;
use std::sync::Arc;

use actix_web::http::header::CACHE_CONTROL;
use actix_web::{rt, web, HttpResponse, Responder};
use bytes::Bytes;
use futures::StreamExt;
use log::{debug, error, info, warn};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::model::{DeltaStream, UpstreamError};
use crate::prompt;
use crate::session::{SessionGuard, SessionStore};
use crate::web::error::RelayError;
use crate::web::models::{ChatRequest, Message};
use crate::web::sse;
use crate::AppState;

const RELAY_BUFFER: usize = 32;

type Frames = mpsc::Sender<Result<Bytes, Infallible>>;

// Health check endpoint
pub async fn health_check(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "sessions": data.sessions.session_count(),
    }))
}

// Chat API endpoint: relays the completion as an event stream
pub async fn chat(
    data: web::Data<AppState>,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse, RelayError> {
    let req = req.into_inner();
    let request_id = Uuid::new_v4();
    let session_id = req.session_id().to_string();

    if data.sessions.is_locked(&session_id) {
        warn!("[{}] Session {} is busy", request_id, session_id);
        return Err(RelayError::SessionBusy);
    }
    // Re-checked atomically; another request may have won the race.
    let guard = data
        .sessions
        .try_acquire(&session_id)
        .ok_or(RelayError::SessionBusy)?;

    let raw = req
        .message
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .ok_or(RelayError::MissingMessage)?;
    let message = data.sanitizer.clean(raw);

    info!("[{}] Chat request from session {}: {}", request_id, session_id, message);

    let history = data.sessions.history(&session_id);
    let messages = prompt::assemble(&data.system_prompt, &history, &message);

    let deltas = data.completion.stream_chat(messages).await.map_err(|e| {
        error!("[{}] Completion request failed: {}", request_id, e);
        e
    })?;

    // From here on the status line is committed; failures go in-band.
    let (tx, rx) = mpsc::channel(RELAY_BUFFER);
    rt::spawn(relay(
        deltas,
        tx,
        guard,
        Arc::clone(&data.sessions),
        message,
        request_id,
    ));

    Ok(HttpResponse::Ok()
        .content_type(sse::CONTENT_TYPE)
        .insert_header((CACHE_CONTROL, "no-cache"))
        .streaming(ReceiverStream::new(rx)))
}

enum RelayFailure {
    ClientGone,
    Upstream(UpstreamError),
}

/// Forwards deltas to the client, then commits the exchange. The session is
/// released before the frame channel closes, so by the time a client sees
/// the end of the body it can send the next request.
async fn relay(
    mut deltas: DeltaStream,
    tx: Frames,
    guard: SessionGuard,
    sessions: Arc<SessionStore>,
    message: String,
    request_id: Uuid,
) {
    let outcome = forward_deltas(&mut deltas, &tx).await;
    drop(deltas);

    match outcome {
        Ok(reply) => {
            if tx.send(Ok(sse::done_frame())).await.is_err() {
                debug!("[{}] Client left before [DONE]", request_id);
            }
            info!(
                "[{}] Reply length: {} characters",
                request_id,
                reply.chars().count()
            );
            sessions.append_exchange(
                guard.session_id(),
                Message::user(message),
                Message::assistant(reply),
            );
        }
        Err(RelayFailure::ClientGone) => {
            warn!("[{}] Client disconnected, discarding partial reply", request_id);
        }
        Err(RelayFailure::Upstream(e)) => {
            error!("[{}] Completion stream failed: {}", request_id, e);
            // Nothing left to do if the client is already gone.
            let _ = tx.send(Ok(sse::error_frame(&e.to_string()))).await;
        }
    }

    drop(guard);
    drop(tx);
}

async fn forward_deltas(deltas: &mut DeltaStream, tx: &Frames) -> Result<String, RelayFailure> {
    let mut reply = String::new();
    while let Some(delta) = deltas.next().await {
        let delta = delta.map_err(RelayFailure::Upstream)?;
        if delta.is_empty() {
            continue;
        }
        reply.push_str(&delta);
        tx.send(Ok(sse::delta_frame(&delta)))
            .await
            .map_err(|_| RelayFailure::ClientGone)?;
    }
    Ok(reply)
}
