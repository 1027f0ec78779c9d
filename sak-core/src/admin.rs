use std::net::SocketAddr;

use async_trait::async_trait;
use futures::future::join_all;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use serde_json::json;
use tracing::debug;

use crate::errors::*;
use crate::k8s::TargetSnapshot;
use crate::prelude::*;

/// Client side of the Scalar Admin interface, addressed to a fixed list of pod
/// endpoints resolved once at construction.  Both operations fan out to every
/// endpoint and fail if any endpoint fails.
#[cfg_attr(any(test, feature = "mock"), automock)]
#[async_trait]
pub trait RequestCoordinator {
    async fn pause(&self, drain: bool, max_pause_wait_time: Option<i64>) -> EmptyResult;
    async fn unpause(&self) -> EmptyResult;
}

/// Builds a coordinator bound to the fleet captured in a snapshot.  The Pauser
/// goes through this seam so its saga can be driven against mocks.
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait CoordinatorFactory {
    fn build(&self, target: &TargetSnapshot) -> anyhow::Result<Box<dyn RequestCoordinator + Send + Sync>>;
}

/// Wire-encryption settings for the admin interface.  The authority override
/// is the server name expected in the targets' certificates; connections still
/// dial the pod IPs.
#[derive(Clone, Debug, Default)]
pub struct TlsOptions {
    pub ca_root_cert_pem: Option<String>,
    pub override_authority: Option<String>,
}

pub struct HttpRequestCoordinator {
    endpoints: Vec<Endpoint>,
}

struct Endpoint {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRequestCoordinator {
    pub fn new(addrs: Vec<SocketAddr>) -> anyhow::Result<HttpRequestCoordinator> {
        HttpRequestCoordinator::with_tls(addrs, None)
    }

    pub fn with_tls(addrs: Vec<SocketAddr>, tls: Option<&TlsOptions>) -> anyhow::Result<HttpRequestCoordinator> {
        let endpoints = addrs
            .into_iter()
            .map(|addr| Endpoint::new(addr, tls))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(HttpRequestCoordinator { endpoints })
    }

    async fn broadcast(&self, path: &str, body: serde_json::Value) -> EmptyResult {
        let requests = self.endpoints.iter().map(|ep| ep.post(path, &body));
        for result in join_all(requests).await {
            result?;
        }
        Ok(())
    }
}

#[async_trait]
impl RequestCoordinator for HttpRequestCoordinator {
    async fn pause(&self, drain: bool, max_pause_wait_time: Option<i64>) -> EmptyResult {
        self.broadcast(ADMIN_PAUSE_PATH, json!({"drain": drain, "maxPauseWaitTime": max_pause_wait_time}))
            .await
    }

    async fn unpause(&self) -> EmptyResult {
        self.broadcast(ADMIN_UNPAUSE_PATH, json!({})).await
    }
}

impl Endpoint {
    fn new(addr: SocketAddr, tls: Option<&TlsOptions>) -> anyhow::Result<Endpoint> {
        let mut builder = reqwest::Client::builder();

        let (scheme, host_port) = match tls {
            None => ("http", addr.to_string()),
            Some(opts) => {
                if let Some(pem) = &opts.ca_root_cert_pem {
                    builder = builder.add_root_certificate(reqwest::Certificate::from_pem(pem.as_bytes())?);
                }
                match &opts.override_authority {
                    // Dial the pod IP but verify the certificate under the overridden name
                    Some(authority) => {
                        builder = builder.resolve(authority, addr);
                        ("https", format!("{authority}:{}", addr.port()))
                    },
                    None => ("https", addr.to_string()),
                }
            },
        };

        Ok(Endpoint {
            base_url: format!("{scheme}://{host_port}"),
            client: builder.build()?,
        })
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> EmptyResult {
        let url = format!("{}{path}", self.base_url);
        debug!("requesting {url}");
        self.client.post(&url).json(body).send().await?.error_for_status()?;
        Ok(())
    }
}

pub struct HttpCoordinatorFactory {
    tls: Option<TlsOptions>,
}

impl HttpCoordinatorFactory {
    pub fn new(tls: Option<TlsOptions>) -> HttpCoordinatorFactory {
        HttpCoordinatorFactory { tls }
    }
}

impl CoordinatorFactory for HttpCoordinatorFactory {
    fn build(&self, target: &TargetSnapshot) -> anyhow::Result<Box<dyn RequestCoordinator + Send + Sync>> {
        let coordinator = HttpRequestCoordinator::with_tls(target.admin_endpoints()?, self.tls.as_ref())?;
        Ok(Box::new(coordinator))
    }
}
