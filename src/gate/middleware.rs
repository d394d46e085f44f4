//! axum middleware running the gate in front of every request.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{login::submitted_password, Gatekeeper, Outcome};

/// Gate middleware, installed with `axum::middleware::from_fn_with_state`.
///
/// Login submissions are answered here and never reach the upstream unless the
/// gate is disabled. Everything else is either forwarded to `next` untouched or
/// rejected.
pub async fn guard(State(gate): State<Arc<Gatekeeper>>, request: Request, next: Next) -> Response {
    let is_login = gate.is_login_submission(request.method(), request.uri().path());

    let outcome = if is_login && gate.is_enabled() {
        // The body is consumed here; a login submission is never forwarded.
        let submitted = submitted_password(request).await;
        return gate.respond(gate.login(submitted));
    } else if is_login {
        Outcome::Forward
    } else {
        gate.authorize(request.uri().path(), request.headers())
    };

    match outcome {
        Outcome::Forward => next.run(request).await,
        outcome => gate.respond(outcome),
    }
}
