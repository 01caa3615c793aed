use crate::error::{Result, VerificationError};
use crate::platform::Platform;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
const USER_AGENT: &str = concat!("bounty-node/", env!("CARGO_PKG_VERSION"));

pub(crate) fn build_client(platform: Platform, timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| VerificationError::Transport {
            platform,
            reason: e.to_string(),
        })
}

/// Send a request and decode a JSON body, mapping platform status codes onto
/// [`VerificationError`].
pub(crate) async fn send_json<T: DeserializeOwned>(
    platform: Platform,
    request: RequestBuilder,
) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| VerificationError::Transport {
            platform,
            reason: e.to_string(),
        })?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!(platform = %platform, "Platform rate limit hit");
        return Err(VerificationError::RateLimited { platform });
    }
    if !status.is_success() {
        debug!(platform = %platform, status = status.as_u16(), "Platform request rejected");
        return Err(VerificationError::Upstream {
            platform,
            status: status.as_u16(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| VerificationError::InvalidResponse {
            platform,
            reason: e.to_string(),
        })
}
