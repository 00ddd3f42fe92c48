//! Client Fingerprint
//!
//! Derives the per-client rate-limit key from network origin and user agent.

use std::fmt;
use std::net::SocketAddr;

use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD, Engine as _};

const UNKNOWN: &str = "unknown";

/// Opaque, deterministic client identifier. Never persisted beyond a rate window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientFingerprint(String);

impl ClientFingerprint {
    /// Encodes `ip:user_agent`, substituting `unknown` for missing parts.
    pub fn from_parts(ip: Option<&str>, user_agent: Option<&str>) -> Self {
        let ip = ip.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(UNKNOWN);
        let user_agent = user_agent.filter(|s| !s.is_empty()).unwrap_or(UNKNOWN);
        Self(STANDARD.encode(format!("{ip}:{user_agent}")))
    }

    /// Builds the fingerprint from proxy headers, falling back to the socket peer.
    ///
    /// Origin precedence: first `X-Forwarded-For` hop, `X-Real-IP`, peer address.
    pub fn from_request(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

        let peer_ip = peer.map(|addr| addr.ip().to_string());
        let ip = header("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| header("x-real-ip"))
            .or(peer_ip.as_deref());

        Self::from_parts(ip, header("user-agent"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
