//! EIP-712 signatures over user profile claims.

use crate::attestation::AttestationSigner;
use crate::error::Result;
use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::{Eip712Domain, SolStruct};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

alloy::sol! {
    struct UserProfile {
        string nickname;
        string avatar;
        string socialAccount;
        address subject;
    }
}

const DOMAIN_NAME: &str = "UserProfile";
const DOMAIN_VERSION: &str = "1";

/// Chain and contract that verify profile signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileDomain {
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl ProfileDomain {
    pub fn eip712(&self) -> Eip712Domain {
        Eip712Domain::new(
            Some(Cow::Borrowed(DOMAIN_NAME)),
            Some(Cow::Borrowed(DOMAIN_VERSION)),
            Some(U256::from(self.chain_id)),
            Some(self.verifying_contract),
            None,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileClaim {
    pub nickname: String,
    pub avatar: String,
    pub social_account: String,
    pub subject: Address,
}

impl UserProfileClaim {
    pub fn signing_hash(&self, domain: &ProfileDomain) -> B256 {
        let typed = UserProfile {
            nickname: self.nickname.clone(),
            avatar: self.avatar.clone(),
            socialAccount: self.social_account.clone(),
            subject: self.subject,
        };
        typed.eip712_signing_hash(&domain.eip712())
    }
}

/// Response body for a signed profile; echoes the claim minus the subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSignature {
    pub signature: String,
    pub nickname: String,
    pub avatar: String,
    pub social_account: String,
}

impl AttestationSigner {
    /// Typed-data signatures ignore the attestation scheme; EIP-712 carries its
    /// own prefix.
    pub fn sign_profile(
        &self,
        claim: &UserProfileClaim,
        domain: &ProfileDomain,
    ) -> Result<ProfileSignature> {
        let signature = self.sign_digest(&claim.signing_hash(domain))?;
        Ok(ProfileSignature {
            signature,
            nickname: claim.nickname.clone(),
            avatar: claim.avatar.clone(),
            social_account: claim.social_account.clone(),
        })
    }
}
