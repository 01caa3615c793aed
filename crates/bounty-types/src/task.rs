//! Task configuration as authored by the board owner.

use crate::error::{Result, TypesError};
use crate::proof::{non_empty, ProofType};
use crate::social::XAction;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chains whose block explorer can serve verified contract source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractNetwork {
    #[serde(rename = "Mantle")]
    Mantle,
    #[serde(rename = "Mantle Sepolia")]
    MantleSepolia,
    #[serde(rename = "Linea")]
    Linea,
    #[serde(rename = "Linea Sepolia")]
    LineaSepolia,
    #[serde(rename = "Ethereum")]
    Ethereum,
    #[serde(rename = "Sepolia")]
    Sepolia,
    #[serde(rename = "Flow EVM")]
    FlowEvm,
    #[serde(rename = "Flow EVM Testnet")]
    FlowEvmTestnet,
    #[serde(rename = "BSC")]
    Bsc,
    #[serde(rename = "BSC Testnet")]
    BscTestnet,
    #[serde(rename = "opBNB")]
    OpBnb,
    #[serde(rename = "opBNB Testnet")]
    OpBnbTestnet,
    #[serde(rename = "Monad Devnet")]
    MonadDevnet,
}

impl ContractNetwork {
    pub const ALL: [ContractNetwork; 13] = [
        ContractNetwork::Mantle,
        ContractNetwork::MantleSepolia,
        ContractNetwork::Linea,
        ContractNetwork::LineaSepolia,
        ContractNetwork::Ethereum,
        ContractNetwork::Sepolia,
        ContractNetwork::FlowEvm,
        ContractNetwork::FlowEvmTestnet,
        ContractNetwork::Bsc,
        ContractNetwork::BscTestnet,
        ContractNetwork::OpBnb,
        ContractNetwork::OpBnbTestnet,
        ContractNetwork::MonadDevnet,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ContractNetwork::Mantle => "Mantle",
            ContractNetwork::MantleSepolia => "Mantle Sepolia",
            ContractNetwork::Linea => "Linea",
            ContractNetwork::LineaSepolia => "Linea Sepolia",
            ContractNetwork::Ethereum => "Ethereum",
            ContractNetwork::Sepolia => "Sepolia",
            ContractNetwork::FlowEvm => "Flow EVM",
            ContractNetwork::FlowEvmTestnet => "Flow EVM Testnet",
            ContractNetwork::Bsc => "BSC",
            ContractNetwork::BscTestnet => "BSC Testnet",
            ContractNetwork::OpBnb => "opBNB",
            ContractNetwork::OpBnbTestnet => "opBNB Testnet",
            ContractNetwork::MonadDevnet => "Monad Devnet",
        }
    }
}

impl Default for ContractNetwork {
    fn default() -> Self {
        ContractNetwork::FlowEvm
    }
}

impl fmt::Display for ContractNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContractNetwork {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|network| network.name() == s)
            .ok_or_else(|| TypesError::UnknownNetwork(s.to_string()))
    }
}

/// What a task demands from its submitters.
///
/// Field names follow the JSON the web client stores in the task's `config`
/// string, including the capitalised social target fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    #[serde(rename = "taskType")]
    pub task_type: Vec<ProofType>,
    #[serde(rename = "aiReview")]
    pub ai_review: bool,
    #[serde(rename = "aiReviewPrompt", skip_serializing_if = "Option::is_none")]
    pub ai_review_prompt: Option<String>,
    /// Raw network name; resolved by [`TaskConfig::network`] only when a
    /// contract proof is reviewed.
    #[serde(
        rename = "contractNetwork",
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub contract_network: Option<String>,

    #[serde(rename = "XFollowUsername", skip_serializing_if = "Option::is_none")]
    pub x_follow_username: Option<String>,
    #[serde(rename = "XLikeId", skip_serializing_if = "Option::is_none")]
    pub x_like_id: Option<String>,
    #[serde(rename = "XRetweetId", skip_serializing_if = "Option::is_none")]
    pub x_retweet_id: Option<String>,
    #[serde(rename = "XPostContent", skip_serializing_if = "Option::is_none")]
    pub x_post_content: Option<String>,
    #[serde(rename = "DiscordChannelId", skip_serializing_if = "Option::is_none")]
    pub discord_channel_id: Option<String>,
}

/// Social actions a task requires, derived from its target fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SocialRequirements {
    /// At most one X action is checked; see [`TaskConfig::social_requirements`].
    pub x_action: Option<(XAction, String)>,
    pub discord_guild_id: Option<String>,
}

impl SocialRequirements {
    pub fn is_empty(&self) -> bool {
        self.x_action.is_none() && self.discord_guild_id.is_none()
    }
}

impl TaskConfig {
    /// Parse the JSON `config` string of a task. An empty string is the empty
    /// configuration.
    pub fn from_json(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw).map_err(|e| TypesError::InvalidTaskConfig(e.to_string()))
    }

    pub fn ai_review_prompt(&self) -> Option<&str> {
        non_empty(&self.ai_review_prompt)
    }

    /// The configured network, Flow EVM when none is set.
    pub fn network(&self) -> Result<ContractNetwork> {
        match non_empty(&self.contract_network) {
            Some(name) => name.parse(),
            None => Ok(ContractNetwork::default()),
        }
    }

    /// An AI-reviewed task must carry a prompt for the reviewer.
    pub fn validate(&self) -> Result<()> {
        if self.ai_review && self.ai_review_prompt().is_none() {
            return Err(TypesError::InvalidTaskConfig(
                "AI review prompt is required when AI review is enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// The first non-empty of follow, like, retweet decides the X action.
    pub fn social_requirements(&self) -> SocialRequirements {
        let x_action = if let Some(username) = non_empty(&self.x_follow_username) {
            Some((XAction::Follow, username.to_string()))
        } else if let Some(tweet_id) = non_empty(&self.x_like_id) {
            Some((XAction::Like, tweet_id.to_string()))
        } else {
            non_empty(&self.x_retweet_id).map(|id| (XAction::Retweet, id.to_string()))
        };

        SocialRequirements {
            x_action,
            discord_guild_id: non_empty(&self.discord_channel_id).map(str::to_string),
        }
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

/// The subset of an on-chain task the review service needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskDetail {
    pub name: String,
    pub description: String,
    /// JSON-encoded [`TaskConfig`]
    pub config: String,
    pub allow_self_check: bool,
}

impl TaskDetail {
    pub fn task_config(&self) -> Result<TaskConfig> {
        TaskConfig::from_json(&self.config)
    }
}
