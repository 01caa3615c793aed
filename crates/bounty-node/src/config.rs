use anyhow::{bail, Context, Result};
use bounty_crypto::{Address, AttestationSigner, ProfileDomain, SigningScheme, TokenCipher};
use bounty_review::{ExplorerKeys, DEFAULT_GEMINI_API_URL, DEFAULT_GITHUB_API_URL};
use bounty_social::{DEFAULT_DISCORD_API_URL, DEFAULT_TWITTER_API_URL};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

/// Linea Sepolia, where the profile portal is deployed.
pub const DEFAULT_PROFILE_CHAIN_ID: u64 = 59141;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub api: ApiConfig,
    pub signer: SignerConfig,
    pub encryption: EncryptionConfig,
    pub ai: AiConfig,
    pub github: GithubConfig,
    pub explorers: ExplorerKeys,
    pub social: SocialConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Timeout for each outbound platform, GitHub and explorer request
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_secs: 15,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    /// `0x`-prefixed secp256k1 key whose address the BountyBoard contract trusts
    pub private_key: String,
    pub scheme: SigningScheme,
    pub profile_chain_id: u64,
    pub profile_verifying_contract: Option<String>,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            private_key: String::new(),
            scheme: SigningScheme::default(),
            profile_chain_id: DEFAULT_PROFILE_CHAIN_ID,
            profile_verifying_contract: None,
        }
    }
}

impl fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerConfig")
            .field("private_key", &"<redacted>")
            .field("scheme", &self.scheme)
            .field("profile_chain_id", &self.profile_chain_id)
            .field("profile_verifying_contract", &self.profile_verifying_contract)
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionConfig {
    /// Base64 AES-256 key shared with the web client
    pub key: String,
}

impl fmt::Debug for EncryptionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionConfig { key: <redacted> }")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub api_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GEMINI_API_URL.to_string(),
            api_key: String::new(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_url: String,
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    pub twitter_api_url: String,
    pub discord_api_url: String,
    pub github_api_url: String,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            twitter_api_url: DEFAULT_TWITTER_API_URL.to_string(),
            discord_api_url: DEFAULT_DISCORD_API_URL.to_string(),
            github_api_url: bounty_social::DEFAULT_GITHUB_API_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty`, `json` or `compact`
    pub format: String,
    pub file_output: Option<PathBuf>,
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_output: None,
            module_filters: HashMap::new(),
        }
    }
}

impl NodeConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        // Env overrides are applied by the caller to keep CLI > env > file
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = env::var("API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = env::var("API_PORT") {
            if let Ok(port) = port.parse() {
                self.api.port = port;
            }
        }

        if let Ok(key) = env::var("SIGNER_ADDRESS_PRIVATE_KEY") {
            self.signer.private_key = key;
        }
        if let Ok(scheme) = env::var("SIGNER_SCHEME") {
            if let Ok(scheme) = scheme.parse() {
                self.signer.scheme = scheme;
            }
        }
        if let Ok(chain_id) = env::var("PROFILE_CHAIN_ID") {
            if let Ok(chain_id) = chain_id.parse() {
                self.signer.profile_chain_id = chain_id;
            }
        }
        if let Ok(portal) = env::var("PORTAL_ADDRESS") {
            if !portal.is_empty() {
                self.signer.profile_verifying_contract = Some(portal);
            }
        }

        if let Ok(key) = env::var("ENCRYPTION_KEY") {
            self.encryption.key = key;
        }

        if let Ok(url) = env::var("GEMINI_API_URL") {
            self.ai.api_url = url;
        }
        if let Ok(key) = env::var("GOOGLE_API_KEY") {
            self.ai.api_key = key;
        }

        if let Ok(url) = env::var("GITHUB_API_URL") {
            self.github.api_url = url;
        }
        if let Ok(token) = env::var("GITHUB_TOKEN") {
            if !token.is_empty() {
                self.github.token = Some(token);
            }
        }

        // Explorer keys
        if let Ok(key) = env::var("ETHERSCAN_API_KEY") {
            self.explorers.etherscan_api_key = key;
        }
        if let Ok(key) = env::var("LINEASCAN_API_KEY") {
            self.explorers.lineascan_api_key = key;
        }
        if let Ok(key) = env::var("MANTLESCAN_API_KEY") {
            self.explorers.mantlescan_api_key = key;
        }
        if let Ok(key) = env::var("BSCSCAN_API_KEY") {
            self.explorers.bscscan_api_key = key;
        }

        if let Ok(url) = env::var("TWITTER_API_URL") {
            self.social.twitter_api_url = url;
        }
        if let Ok(url) = env::var("DISCORD_API_URL") {
            self.social.discord_api_url = url;
        }
    }

    /// Fail fast on anything that would otherwise surface per request.
    pub fn validate(&self) -> Result<()> {
        self.attestation_signer()?;
        self.token_cipher()?;
        self.profile_domain()?;

        if self.ai.api_key.is_empty() {
            tracing::warn!("GOOGLE_API_KEY is not set; every AI review will be rejected");
        }
        Ok(())
    }

    pub fn attestation_signer(&self) -> Result<AttestationSigner> {
        if self.signer.private_key.trim().is_empty() {
            bail!("SIGNER_ADDRESS_PRIVATE_KEY is not configured");
        }
        AttestationSigner::from_hex(&self.signer.private_key, self.signer.scheme)
            .context("loading signing key")
    }

    pub fn token_cipher(&self) -> Result<TokenCipher> {
        TokenCipher::from_base64_key(&self.encryption.key).context("loading ENCRYPTION_KEY")
    }

    /// `None` when no verifying contract is configured; profile signing is then
    /// unavailable.
    pub fn profile_domain(&self) -> Result<Option<ProfileDomain>> {
        let Some(contract) = self
            .signer
            .profile_verifying_contract
            .as_deref()
            .filter(|c| !c.is_empty())
        else {
            return Ok(None);
        };

        let verifying_contract: Address = contract
            .parse()
            .with_context(|| format!("invalid PORTAL_ADDRESS {}", contract))?;
        Ok(Some(ProfileDomain {
            chain_id: self.signer.profile_chain_id,
            verifying_contract,
        }))
    }
}
