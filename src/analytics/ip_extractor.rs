//! Resolution of the address that gets hashed into a visitor identifier
//!
//! Behind a reverse proxy the socket peer is the proxy, so the client address
//! has to come from forwarding headers. Those headers are only believed when
//! the deployment says which proxies sit in front of it.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};
use tracing::warn;

use crate::config::{AnalyticsConfig, TrustedProxyMode};

/// Resolve the client address according to `config.trusted_proxy_mode`.
///
/// Returns `None` only when no header applies and `socket_addr` is absent.
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<IpAddr>,
    config: &AnalyticsConfig,
) -> Option<IpAddr> {
    match config.trusted_proxy_mode {
        TrustedProxyMode::Cloudflare => extract_cloudflare_ip(headers).or_else(|| {
            warn!("CF-Connecting-IP header missing in Cloudflare mode, using socket address");
            socket_addr
        }),
        TrustedProxyMode::Standard => {
            if let Some(peer) = socket_addr {
                if !config.trusted_proxies.is_empty() && !is_trusted(peer, config) {
                    // Headers from an untrusted peer can be forged
                    return Some(peer);
                }
            }
            extract_standard_ip(headers, config).or(socket_addr)
        }
        TrustedProxyMode::None => socket_addr,
    }
}

fn extract_cloudflare_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("cf-connecting-ip")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

/// `Forwarded` wins over `X-Forwarded-For` when both are present
fn extract_standard_ip(headers: &HeaderMap, config: &AnalyticsConfig) -> Option<IpAddr> {
    let forwarded = forwarded_chain(headers);
    if !forwarded.is_empty() {
        return select_from_chain(&forwarded, config);
    }

    select_from_chain(&x_forwarded_for_chain(headers), config)
}

/// Parse the `for=` nodes of an RFC 7239 Forwarded header, client first
fn forwarded_chain(headers: &HeaderMap) -> Vec<IpAddr> {
    let Some(forwarded) = headers.get("forwarded").and_then(|h| h.to_str().ok()) else {
        return Vec::new();
    };

    // Forwarded: for=192.0.2.60;proto=http;by=203.0.113.43, for="[2001:db8::1]:4711"
    forwarded
        .split(',')
        .flat_map(|element| element.split(';'))
        .filter_map(|param| {
            let (key, value) = param.trim().split_once('=')?;
            if !key.trim().eq_ignore_ascii_case("for") {
                return None;
            }
            parse_forwarded_node(value.trim())
        })
        .collect()
}

fn parse_forwarded_node(value: &str) -> Option<IpAddr> {
    let value = value.trim_matches('"');

    if let Some(rest) = value.strip_prefix('[') {
        return rest.split(']').next()?.parse::<IpAddr>().ok();
    }

    if let Ok(ip) = value.parse::<IpAddr>() {
        return Some(ip);
    }

    if let Ok(addr) = value.parse::<SocketAddr>() {
        return Some(addr.ip());
    }

    // IPv4 with port
    value.split_once(':')?.0.parse::<IpAddr>().ok()
}

/// Parse X-Forwarded-For, client first
fn x_forwarded_for_chain(headers: &HeaderMap) -> Vec<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .map(|xff| {
            xff.split(',')
                .filter_map(|s| s.trim().parse::<IpAddr>().ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Pick the client address from a proxy chain using right-to-left trust validation
fn select_from_chain(ips: &[IpAddr], config: &AnalyticsConfig) -> Option<IpAddr> {
    if ips.is_empty() {
        return None;
    }

    // A fixed hop count overrides CIDR trust
    if let Some(hops) = config.num_trusted_proxies {
        return match ips.len().checked_sub(hops.saturating_add(1)) {
            Some(index) => ips.get(index).copied(),
            None => ips.first().copied(),
        };
    }

    // First address from the right that is not a trusted proxy
    if !config.trusted_proxies.is_empty() {
        return ips
            .iter()
            .rev()
            .find(|ip| !is_trusted(**ip, config))
            .or_else(|| ips.first())
            .copied();
    }

    // Nothing configured: the nearest hop is the only one not client-controlled
    ips.last().copied()
}

fn is_trusted(ip: IpAddr, config: &AnalyticsConfig) -> bool {
    config.trusted_proxies.iter().any(|net| net.contains(&ip))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config(mode: TrustedProxyMode) -> AnalyticsConfig {
        AnalyticsConfig {
            hash_secret: "test".to_string(),
            trusted_proxy_mode: mode,
            trusted_proxies: vec![],
            num_trusted_proxies: None,
            query_timeout_secs: 10,
            retention_days: None,
        }
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_none_mode_ignores_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.1"));
        let config = config(TrustedProxyMode::None);

        let result = extract_client_ip(&headers, Some(ip("192.168.1.1")), &config);
        assert_eq!(result, Some(ip("192.168.1.1")));
    }

    #[test]
    fn test_missing_socket_address_yields_none() {
        let headers = HeaderMap::new();
        let config = config(TrustedProxyMode::None);

        assert_eq!(extract_client_ip(&headers, None, &config), None);
    }

    #[test]
    fn test_cloudflare_header_wins_over_socket() {
        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", HeaderValue::from_static("203.0.113.1"));
        let config = config(TrustedProxyMode::Cloudflare);

        let result = extract_client_ip(&headers, Some(ip("192.168.1.1")), &config);
        assert_eq!(result, Some(ip("203.0.113.1")));
    }

    #[test]
    fn test_cloudflare_falls_back_to_socket() {
        let headers = HeaderMap::new();
        let config = config(TrustedProxyMode::Cloudflare);

        let result = extract_client_ip(&headers, Some(ip("192.168.1.1")), &config);
        assert_eq!(result, Some(ip("192.168.1.1")));
    }

    #[test]
    fn test_nearest_hop_used_without_trust_settings() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.1, 198.51.100.1"),
        );
        let config = config(TrustedProxyMode::Standard);

        let result = extract_client_ip(&headers, Some(ip("192.168.1.1")), &config);
        assert_eq!(result, Some(ip("198.51.100.1")));
    }

    #[test]
    fn test_num_trusted_proxies_skips_from_right() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.1, 198.51.100.1, 10.0.0.2"),
        );
        let mut config = config(TrustedProxyMode::Standard);
        config.num_trusted_proxies = Some(1);

        let result = extract_client_ip(&headers, Some(ip("10.0.0.1")), &config);
        assert_eq!(result, Some(ip("198.51.100.1")));
    }

    #[test]
    fn test_hop_count_larger_than_chain_yields_leftmost() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.1, 198.51.100.1"),
        );
        let mut config = config(TrustedProxyMode::Standard);
        config.num_trusted_proxies = Some(usize::MAX);

        let result = extract_client_ip(&headers, Some(ip("10.0.0.1")), &config);
        assert_eq!(result, Some(ip("203.0.113.1")));
    }

    #[test]
    fn test_trusted_cidrs_walk_right_to_left() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.1, 198.51.100.1, 10.0.0.2"),
        );
        let mut config = config(TrustedProxyMode::Standard);
        config.trusted_proxies = vec!["10.0.0.0/8".parse().unwrap()];

        let result = extract_client_ip(&headers, Some(ip("10.0.0.1")), &config);
        assert_eq!(result, Some(ip("198.51.100.1")));
    }

    #[test]
    fn test_untrusted_peer_headers_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.1"));
        let mut config = config(TrustedProxyMode::Standard);
        config.trusted_proxies = vec!["10.0.0.0/8".parse().unwrap()];

        let result = extract_client_ip(&headers, Some(ip("198.51.100.9")), &config);
        assert_eq!(result, Some(ip("198.51.100.9")));
    }

    #[test]
    fn test_forwarded_header_preferred() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "forwarded",
            HeaderValue::from_static("for=\"[2001:db8::1]:4711\";proto=https, for=192.0.2.60:8080"),
        );
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.1"));
        let mut config = config(TrustedProxyMode::Standard);
        config.num_trusted_proxies = Some(1);

        let result = extract_client_ip(&headers, Some(ip("10.0.0.1")), &config);
        assert_eq!(result, Some(ip("2001:db8::1")));
    }
}
