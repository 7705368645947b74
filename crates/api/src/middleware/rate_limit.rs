//! Rate limiting middleware
//!
//! Implements per-client rate limiting using `tower-governor`.

use axum::{extract::ConnectInfo, http::Request};
use std::net::{IpAddr, SocketAddr};
use tower_governor::{errors::GovernorError, key_extractor::KeyExtractor};

// Public feeds and API: 300 requests/minute = 1 request every 200ms
pub const PUBLIC_PERIOD_MS: u64 = 200;
pub const PUBLIC_BURST_SIZE: u32 = 300;

/// Keys requests by the originating client IP
///
/// Calendar apps poll the feeds from behind proxies, so forwarded headers win
/// over the peer address.
#[derive(Clone)]
pub struct ClientIpKeyExtractor;

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<B>(&self, req: &Request<B>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        // 1. X-Forwarded-For: first entry is the client
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|val| val.split(',').next())
            .and_then(|client_ip| client_ip.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // 2. X-Real-IP
        if let Some(ip) = headers
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .and_then(|val| val.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // 3. Direct connection
        if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
            return Ok(addr.ip());
        }

        Err(GovernorError::UnableToExtractKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use std::convert::Infallible;
    use std::time::Duration;
    use tower::{Service, ServiceBuilder, ServiceExt};
    use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};

    #[test]
    fn test_key_from_peer_address() {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        let mut req = Request::new(Body::empty());
        req.extensions_mut().insert(ConnectInfo(addr));

        assert_eq!(ClientIpKeyExtractor.extract(&req).unwrap(), addr.ip());
    }

    #[test]
    fn test_key_prefers_forwarded_headers() {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        let mut req = Request::new(Body::empty());
        req.extensions_mut().insert(ConnectInfo(addr));
        req.headers_mut()
            .insert("x-forwarded-for", "203.0.113.195, 10.0.0.1".parse().unwrap());

        let key = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(key, "203.0.113.195".parse::<IpAddr>().unwrap());

        let mut req = Request::new(Body::empty());
        req.headers_mut().insert("x-real-ip", "198.51.100.7".parse().unwrap());

        let key = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(key, "198.51.100.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_key_missing() {
        let req = Request::new(Body::empty());
        assert!(ClientIpKeyExtractor.extract(&req).is_err());
    }

    #[tokio::test]
    async fn test_rate_limiting() {
        // 2 requests per burst, replenish slowly
        let config = GovernorConfigBuilder::default()
            .period(Duration::from_secs(1))
            .burst_size(2)
            .key_extractor(ClientIpKeyExtractor)
            .finish()
            .unwrap();

        let mut service = ServiceBuilder::new()
            .layer(GovernorLayer::new(config))
            .service_fn(|_req: Request<Body>| async {
                Ok::<_, Infallible>(axum::response::Response::new(Body::empty()))
            });

        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();

        for _ in 0..2 {
            let mut req = Request::new(Body::empty());
            req.extensions_mut().insert(ConnectInfo(addr));
            let res = service.ready().await.unwrap().call(req).await.unwrap();
            assert_eq!(res.status(), 200);
        }

        let mut req = Request::new(Body::empty());
        req.extensions_mut().insert(ConnectInfo(addr));
        match service.ready().await.unwrap().call(req).await {
            Ok(res) => assert_eq!(res.status(), 429),
            Err(e) => panic!("Expected 429 response, got error: {:?}", e),
        }
    }
}
