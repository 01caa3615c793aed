use crate::error::{Result, ReviewError};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("bounty-node/", env!("CARGO_PKG_VERSION"));

pub(crate) fn build_client(service: &'static str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ReviewError::Transport {
            service,
            reason: e.to_string(),
        })
}

pub(crate) async fn send_json<T: DeserializeOwned>(
    service: &'static str,
    request: RequestBuilder,
) -> Result<T> {
    let response = request.send().await.map_err(|e| ReviewError::Transport {
        service,
        reason: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        debug!(service, status = status.as_u16(), "Upstream request rejected");
        return Err(ReviewError::Upstream {
            service,
            status: status.as_u16(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ReviewError::InvalidResponse {
            service,
            reason: e.to_string(),
        })
}
