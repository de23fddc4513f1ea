//! Loopback redirect receiver for the installed-app authorization flow.
//!
//! A one-route axum server answers the browser redirect. The first
//! authorization outcome is handed back over a oneshot channel and the
//! server is shut down gracefully.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::AuthError;

/// How long in-flight responses get to drain after the code arrives
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

const SUCCESS_MESSAGE: &str =
    "The authentication flow has completed. You may close this window.";
const DENIED_MESSAGE: &str = "Authorization was not granted. You may close this window.";

/// Query parameters Google appends to the redirect URI
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// What a request to the redirect URI carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    Code { code: String, state: Option<String> },
    Denied(String),
    /// Not an authorization redirect
    Other,
}

impl From<CallbackParams> for Callback {
    fn from(params: CallbackParams) -> Self {
        match (params.code, params.error) {
            (_, Some(error)) => Callback::Denied(error),
            (Some(code), None) => Callback::Code {
                code,
                state: params.state,
            },
            (None, None) => Callback::Other,
        }
    }
}

type Outcome = Result<String, AuthError>;

#[derive(Clone)]
struct RedirectState {
    expected_state: Arc<str>,
    outcome: Arc<Mutex<Option<oneshot::Sender<Outcome>>>>,
}

impl RedirectState {
    /// Report the first outcome; later redirects are answered but ignored
    fn finish(&self, outcome: Outcome) {
        let sender = match self.outcome.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(sender) = sender {
            let _ = sender.send(outcome);
        }
    }
}

async fn handle_redirect(
    State(redirect): State<RedirectState>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, &'static str) {
    match Callback::from(params) {
        Callback::Other => (StatusCode::NOT_FOUND, "Not found"),
        Callback::Denied(reason) => {
            redirect.finish(Err(AuthError::Denied(reason)));
            (StatusCode::OK, DENIED_MESSAGE)
        }
        Callback::Code { code, state } => {
            if state.as_deref() != Some(&*redirect.expected_state) {
                redirect.finish(Err(AuthError::StateMismatch));
                return (StatusCode::BAD_REQUEST, "State mismatch");
            }
            redirect.finish(Ok(code));
            (StatusCode::OK, SUCCESS_MESSAGE)
        }
    }
}

/// Serve the redirect URI on `listener` until an authorization redirect
/// arrives or `timeout` elapses, and return the code. The `state` must
/// match `expected_state`.
pub async fn wait_for_code(
    listener: TcpListener,
    expected_state: &str,
    timeout: Duration,
) -> Result<String, AuthError> {
    let (outcome_tx, outcome_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = Router::new()
        .route("/", get(handle_redirect))
        .with_state(RedirectState {
            expected_state: Arc::from(expected_state),
            outcome: Arc::new(Mutex::new(Some(outcome_tx))),
        });

    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    let outcome = tokio::time::timeout(timeout, outcome_rx).await;

    let _ = shutdown_tx.send(());
    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(Ok(Err(e))) => warn!(error = %e, "Authorization callback server failed"),
        Err(_) => debug!("Callback server still draining idle connections"),
        _ => {}
    }

    match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(AuthError::CallbackClosed),
        Err(_) => Err(AuthError::CallbackTimeout(timeout)),
    }
}
