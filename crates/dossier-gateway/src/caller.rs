// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller identity extraction.
//!
//! The address comes from `X-Forwarded-For` (first hop), then `X-Real-IP`,
//! then the peer socket address. Missing values become `"unknown"`.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, header, request::Parts};
use dossier_ledger::CallerInfo;
use dossier_ledger::session::UNKNOWN;

/// Extractor wrapping the inferred [`CallerInfo`].
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub CallerInfo);

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self(caller_info(&parts.headers, peer)))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Infer the caller from request headers and the peer address.
pub fn caller_info(headers: &HeaderMap, peer: Option<SocketAddr>) -> CallerInfo {
    let forwarded = header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let ip_address = forwarded
        .or_else(|| header_str(headers, "x-real-ip"))
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN.to_string());

    let user_agent = header_str(headers, header::USER_AGENT.as_str())
        .unwrap_or(UNKNOWN)
        .to_string();

    CallerInfo::new(ip_address, user_agent)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn forwarded_for_first_hop_wins() {
        let h = headers(&[
            ("x-forwarded-for", "198.51.100.4, 10.0.0.1"),
            ("x-real-ip", "10.0.0.2"),
            ("user-agent", "curl/8.0"),
        ]);
        let peer = "127.0.0.1:9000".parse().ok();
        let caller = caller_info(&h, peer);
        assert_eq!(caller.ip_address, "198.51.100.4");
        assert_eq!(caller.user_agent, "curl/8.0");
    }

    #[test]
    fn real_ip_then_peer_then_unknown() {
        let caller = caller_info(&headers(&[("x-real-ip", "10.0.0.2")]), None);
        assert_eq!(caller.ip_address, "10.0.0.2");

        let peer = "192.0.2.9:1234".parse().ok();
        let caller = caller_info(&HeaderMap::new(), peer);
        assert_eq!(caller.ip_address, "192.0.2.9");

        let caller = caller_info(&HeaderMap::new(), None);
        assert_eq!(caller.ip_address, "unknown");
        assert_eq!(caller.user_agent, "unknown");
    }

    #[test]
    fn empty_forwarded_header_is_ignored() {
        let caller = caller_info(&headers(&[("x-forwarded-for", " ")]), None);
        assert_eq!(caller.ip_address, "unknown");
    }
}
