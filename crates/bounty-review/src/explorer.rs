//! Verified contract source from block explorers.
//!
//! Three explorer families are spoken: Etherscan-compatible `getsourcecode`,
//! Blockscout v2 and NodeReal's opBNB verifier.

use crate::error::{Result, ReviewError};
use crate::http::{build_client, send_json};
use async_trait::async_trait;
use bounty_types::ContractNetwork;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "block explorer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorerKind {
    Etherscan,
    Blockscout,
    NodeReal,
}

/// Which API key an Etherscan-family explorer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySlot {
    Etherscan,
    Lineascan,
    Mantlescan,
    Bscscan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplorerEndpoint {
    pub kind: ExplorerKind,
    pub base_url: &'static str,
    pub key: Option<ApiKeySlot>,
}

pub fn explorer_endpoint(network: ContractNetwork) -> ExplorerEndpoint {
    use ContractNetwork::*;
    use ExplorerKind::*;

    let (kind, base_url, key) = match network {
        Mantle => (Etherscan, "https://api.mantlescan.xyz/api", Some(ApiKeySlot::Mantlescan)),
        MantleSepolia => (
            Etherscan,
            "https://api-sepolia.mantlescan.xyz/api",
            Some(ApiKeySlot::Mantlescan),
        ),
        Linea => (Etherscan, "https://api.lineascan.build/api", Some(ApiKeySlot::Lineascan)),
        LineaSepolia => (
            Etherscan,
            "https://api-sepolia.lineascan.build/api",
            Some(ApiKeySlot::Lineascan),
        ),
        Ethereum => (Etherscan, "https://api.etherscan.io/api", Some(ApiKeySlot::Etherscan)),
        Sepolia => (
            Etherscan,
            "https://api-sepolia.etherscan.io/api",
            Some(ApiKeySlot::Etherscan),
        ),
        Bsc => (Etherscan, "https://api.bscscan.com/api", Some(ApiKeySlot::Bscscan)),
        BscTestnet => (Etherscan, "https://api-testnet.bscscan.com/api", Some(ApiKeySlot::Bscscan)),
        FlowEvm => (Blockscout, "https://evm.flowscan.io/api/v2", None),
        FlowEvmTestnet => (Blockscout, "https://evm-testnet.flowscan.io/api/v2", None),
        MonadDevnet => (
            Blockscout,
            "https://explorer.monad-devnet.devnet101.com/api/v2",
            None,
        ),
        OpBnb => (NodeReal, "https://op-bnb-mainnet-explorer-api.nodereal.io/api", None),
        OpBnbTestnet => (NodeReal, "https://op-bnb-testnet-explorer-api.nodereal.io/api", None),
    };

    ExplorerEndpoint {
        kind,
        base_url,
        key,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerKeys {
    pub etherscan_api_key: String,
    pub lineascan_api_key: String,
    pub mantlescan_api_key: String,
    pub bscscan_api_key: String,
}

impl ExplorerKeys {
    fn get(&self, slot: ApiKeySlot) -> &str {
        match slot {
            ApiKeySlot::Etherscan => &self.etherscan_api_key,
            ApiKeySlot::Lineascan => &self.lineascan_api_key,
            ApiKeySlot::Mantlescan => &self.mantlescan_api_key,
            ApiKeySlot::Bscscan => &self.bscscan_api_key,
        }
    }
}

#[async_trait]
pub trait ExplorerSource: Send + Sync {
    /// Flattened verified source, or an empty string when the contract is not
    /// verified.
    async fn contract_source(&self, network: ContractNetwork, address: &str) -> Result<String>;
}

pub struct ExplorerClient {
    client: Client,
    keys: ExplorerKeys,
}

impl ExplorerClient {
    pub fn new(keys: ExplorerKeys, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(SERVICE, timeout)?,
            keys,
        })
    }

    async fn etherscan(&self, base_url: &str, key: &str, address: &str) -> Result<String> {
        let request = self.client.get(base_url).query(&[
            ("module", "contract"),
            ("action", "getsourcecode"),
            ("address", address),
            ("apikey", key),
        ]);
        let response: Value = send_json(SERVICE, request).await?;

        // `result` is a string on API-level errors
        match response.get("result") {
            Some(Value::Array(entries)) => Ok(entries
                .first()
                .and_then(|entry| entry.get("SourceCode"))
                .and_then(Value::as_str)
                .map(flatten_etherscan_source)
                .unwrap_or_default()),
            _ => Err(ReviewError::InvalidResponse {
                service: SERVICE,
                reason: response
                    .get("result")
                    .and_then(Value::as_str)
                    .unwrap_or("missing result")
                    .to_string(),
            }),
        }
    }

    async fn blockscout(&self, base_url: &str, address: &str) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/smart-contracts/{}", base_url, address))
            .send()
            .await
            .map_err(|e| ReviewError::Transport {
                service: SERVICE,
                reason: e.to_string(),
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(String::new());
        }
        if !response.status().is_success() {
            return Err(ReviewError::Upstream {
                service: SERVICE,
                status: response.status().as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ReviewError::InvalidResponse {
                service: SERVICE,
                reason: e.to_string(),
            })?;
        Ok(flatten_blockscout_source(&body))
    }

    async fn nodereal(&self, base_url: &str, address: &str) -> Result<String> {
        let request = self
            .client
            .post(format!("{}/contract/preverify", base_url))
            .json(&serde_json::json!({ "address": address }));
        let response: Value = send_json(SERVICE, request).await?;

        Ok(response
            .pointer("/data/input_json/sources")
            .and_then(Value::as_object)
            .map(flatten_sources)
            .unwrap_or_default())
    }
}

#[async_trait]
impl ExplorerSource for ExplorerClient {
    async fn contract_source(&self, network: ContractNetwork, address: &str) -> Result<String> {
        let endpoint = explorer_endpoint(network);
        debug!(network = %network, address, "Fetching contract source");

        match endpoint.kind {
            ExplorerKind::Etherscan => {
                let key = endpoint.key.map(|slot| self.keys.get(slot)).unwrap_or("");
                self.etherscan(endpoint.base_url, key, address).await
            }
            ExplorerKind::Blockscout => self.blockscout(endpoint.base_url, address).await,
            ExplorerKind::NodeReal => self.nodereal(endpoint.base_url, address).await,
        }
    }
}

/// Dependency sources are left out of the review.
fn is_library_path(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("lib/") || lower.contains('@')
}

/// Render a standard-JSON `sources` map as `File: <name>` blocks.
pub fn flatten_sources(sources: &Map<String, Value>) -> String {
    sources
        .iter()
        .filter(|(name, _)| !is_library_path(name))
        .map(|(name, file)| {
            let content = match file {
                Value::String(text) => text.as_str(),
                other => other.get("content").and_then(Value::as_str).unwrap_or(""),
            };
            format!("File: {}\n{}", name, content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Etherscan returns single-file source verbatim, standard-JSON input wrapped
/// in an extra pair of braces, and plain multi-file JSON as-is.
pub fn flatten_etherscan_source(source: &str) -> String {
    let trimmed = source.trim();

    if trimmed.starts_with("{{") && trimmed.ends_with("}}") {
        if let Ok(input) = serde_json::from_str::<Value>(&trimmed[1..trimmed.len() - 1]) {
            if let Some(sources) = input.get("sources").and_then(Value::as_object) {
                return flatten_sources(sources);
            }
        }
    } else if trimmed.starts_with('{') {
        if let Ok(Value::Object(files)) = serde_json::from_str::<Value>(trimmed) {
            return flatten_sources(&files);
        }
    }

    source.to_string()
}

fn flatten_blockscout_source(body: &Value) -> String {
    let Some(source) = body.get("source_code").and_then(Value::as_str) else {
        return String::new();
    };

    let mut blocks = Vec::new();
    match serde_json::from_str::<Value>(source) {
        Ok(Value::Object(files)) => blocks.push(flatten_sources(&files)),
        _ => match body.get("file_path").and_then(Value::as_str) {
            Some(path) => blocks.push(format!("File: {}\n{}", path, source)),
            None => blocks.push(source.to_string()),
        },
    }

    if let Some(extra) = body.get("additional_sources").and_then(Value::as_array) {
        for file in extra {
            let path = file.get("file_path").and_then(Value::as_str).unwrap_or("");
            if path.is_empty() || is_library_path(path) {
                continue;
            }
            let content = file.get("source_code").and_then(Value::as_str).unwrap_or("");
            blocks.push(format!("File: {}\n{}", path, content));
        }
    }

    blocks.retain(|block| !block.is_empty());
    blocks.join("\n\n")
}
