//! Request extractors: the authorized principal and the client key used
//! for admission control.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};

use auth_adapters::Principal;
use domains::DomainError;

use crate::error::ApiError;
use crate::state::AppState;

/// The principal asserted by the request's bearer token. Handlers take this
/// extractor to require authorization; absence or invalidity of the token
/// yields the uniform 401 + challenge before the handler body runs.
pub struct CurrentAdmin(pub Principal);

impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(unauthorized)?;
        let principal = state
            .authenticator
            .authorize(token)
            .map_err(|_| unauthorized())?;
        Ok(Self(principal))
    }
}

fn unauthorized() -> ApiError {
    DomainError::unauthorized("Could not validate credentials").into()
}

/// The admission key for the requesting client, `None` when it cannot be
/// determined (the login handler then fails closed). Extraction itself
/// never fails.
pub struct ClientKey(pub Option<String>);

impl FromRequestParts<AppState> for ClientKey {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0);
        Ok(Self(client_key(
            &parts.headers,
            peer,
            state.trust_proxy_headers,
        )))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Determines the client key for admission control.
///
/// Proxy headers (X-Forwarded-For, X-Real-IP) are honored only when the
/// deployment says it sits behind a proxy that strips client-supplied
/// values; otherwise the peer address is the only trusted source. `None`
/// means the key cannot be determined — the caller fails closed.
pub fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy_headers: bool,
) -> Option<String> {
    if trust_proxy_headers {
        if let Some(forwarded) = headers.get("x-forwarded-for") {
            if let Ok(forwarded) = forwarded.to_str() {
                // first address in the chain is the original client
                if let Some(first) = forwarded.split(',').next() {
                    let first = first.trim();
                    if !first.is_empty() {
                        return Some(first.to_string());
                    }
                }
            }
        }
        if let Some(real_ip) = headers.get("x-real-ip") {
            if let Ok(real_ip) = real_ip.to_str() {
                let real_ip = real_ip.trim();
                if !real_ip.is_empty() {
                    return Some(real_ip.to_string());
                }
            }
        }
    }

    peer.map(|addr| addr.ip().to_string())
}
