use axum::http::HeaderMap;
use serde_json::Value;

use crate::error::AppError;
use crate::rate_limit::FormKind;
use crate::state::SharedState;

use super::honeypot;
use super::metadata::{self, PeerAddr};

pub enum Admission {
    /// Honeypot tripped: answer success and store nothing.
    Spam,
    Accepted { metadata: Value },
}

/// Checks shared by every public form, in order: rate limit, then honeypot.
/// Field validation is left to the caller.
pub fn admit(
    state: &SharedState,
    form: FormKind,
    headers: &HeaderMap,
    peer: PeerAddr,
    data: &Value,
) -> Result<Admission, AppError> {
    let ip = metadata::client_ip(headers, peer.0, &state.config.trusted_proxies);

    if let Err(retry_after) = state.form_limiter.check(form, ip) {
        tracing::warn!(%ip, ?form, "form rate limit exceeded");
        return Err(AppError::RateLimited(format!(
            "Demasiados envíos. Intenta de nuevo en {retry_after} segundos"
        )));
    }

    if honeypot::is_spam(data) {
        tracing::info!(%ip, ?form, "honeypot tripped, discarding submission");
        return Ok(Admission::Spam);
    }

    Ok(Admission::Accepted {
        metadata: metadata::extract(headers, ip),
    })
}
