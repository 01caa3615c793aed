//! Gathers the evidence behind each required proof kind into text blocks.

use crate::error::{Result, ReviewError};
use crate::explorer::ExplorerSource;
use crate::github::{GithubSource, PullRequestFile, PullRequestRef};
use bounty_types::{ContractNetwork, ProofType, SubmissionProof, TaskConfig};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ContentCollector {
    github: Arc<dyn GithubSource>,
    explorer: Arc<dyn ExplorerSource>,
}

impl ContentCollector {
    pub fn new(github: Arc<dyn GithubSource>, explorer: Arc<dyn ExplorerSource>) -> Self {
        Self { github, explorer }
    }

    /// One `<kind>: <content>` block per proof kind with evidence, joined by
    /// blank lines, in the order the kinds are listed.
    pub async fn collect(
        &self,
        proof_types: &[ProofType],
        proof: &SubmissionProof,
        config: Option<&TaskConfig>,
    ) -> Result<String> {
        let mut blocks = Vec::new();

        for proof_type in proof_types {
            let content = match proof_type {
                ProofType::PlainText => proof.text.clone().unwrap_or_default(),
                ProofType::Image => proof.image.clone().unwrap_or_default(),
                ProofType::GithubPullRequest => match present(&proof.github) {
                    Some(url) => self
                        .pull_request_block(url)
                        .await
                        .map_err(|e| ReviewError::processing(proof_type, e))?,
                    None => String::new(),
                },
                ProofType::ContractVerification => match present(&proof.contract) {
                    Some(address) => self
                        .contract_block(config, address)
                        .await
                        .map_err(|e| ReviewError::processing(proof_type, e))?,
                    None => String::new(),
                },
                other => {
                    warn!(proof_type = %other, "Skipping proof type without reviewable content");
                    continue;
                }
            };

            if content.trim().is_empty() {
                debug!(proof_type = %proof_type, "No evidence for proof type");
                continue;
            }
            blocks.push(format!("{}: {}", proof_type, content));
        }

        if blocks.is_empty() {
            return Err(ReviewError::NoValidProof);
        }
        Ok(blocks.join("\n\n"))
    }

    async fn pull_request_block(&self, url: &str) -> Result<String> {
        let pr_ref = PullRequestRef::parse(url)?;
        let pr = self.github.pull_request(&pr_ref).await?;
        let files = self.github.pull_request_files(&pr_ref).await?;

        let mut sections = Vec::with_capacity(files.len());
        for file in &files {
            sections.push(self.file_section(&pr_ref, &pr.head.sha, file).await);
        }

        let description = pr
            .body
            .as_deref()
            .filter(|body| !body.trim().is_empty())
            .unwrap_or("No description provided");

        Ok(format!(
            "PR Title: {}\nPR Description: {}\nPR State: {}\nPR Branch: {} -> {}\nChanged Files:\n{}",
            pr.title,
            description,
            pr.state,
            pr.head.name,
            pr.base.name,
            sections.join("\n\n")
        ))
    }

    /// A failed content fetch degrades to a status line.
    async fn file_section(&self, pr: &PullRequestRef, head_sha: &str, file: &PullRequestFile) -> String {
        if file.status == "removed" {
            return format!("File: {}\nStatus: Removed", file.filename);
        }

        match self
            .github
            .file_content(&pr.owner, &pr.repo, &file.filename, head_sha)
            .await
        {
            Ok(Some(content)) => format!(
                "File: {}\nStatus: {}\nChanges: {} additions, {} deletions\nContent:\n```\n{}\n```\n",
                file.filename, file.status, file.additions, file.deletions, content
            ),
            Ok(None) => format!(
                "File: {}\nStatus: {} (Binary file or too large)",
                file.filename, file.status
            ),
            Err(e) => {
                warn!(file = %file.filename, error = %e, "Failed to fetch PR file content");
                format!(
                    "File: {}\nStatus: {}\nError: Failed to fetch content",
                    file.filename, file.status
                )
            }
        }
    }

    async fn contract_block(&self, config: Option<&TaskConfig>, address: &str) -> Result<String> {
        let network = match config {
            Some(config) => config.network()?,
            None => ContractNetwork::default(),
        };
        if !is_contract_address(address) {
            return Err(ReviewError::InvalidProof(format!(
                "not a contract address: {}",
                address
            )));
        }
        self.explorer.contract_source(network, address).await
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn is_contract_address(address: &str) -> bool {
    address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit())
}
