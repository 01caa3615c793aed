//! Chains the self-check flow can attest for, and where the BountyBoard
//! contract lives on each.

use bounty_crypto::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainInfo {
    pub name: &'static str,
    pub chain_id: u64,
    bounty_board: Option<&'static str>,
}

impl ChainInfo {
    /// Deployed BountyBoard address, `None` when the chain is known but has no
    /// deployment.
    pub fn bounty_board(&self) -> Option<Address> {
        self.bounty_board.and_then(|addr| addr.parse().ok())
    }
}

pub const SUPPORTED_CHAINS: &[ChainInfo] = &[
    ChainInfo {
        name: "Linea Sepolia Testnet",
        chain_id: 59141,
        bounty_board: Some("0x47411c8857288da4246101c62653e1ec2F229590"),
    },
    ChainInfo {
        name: "Anvil",
        chain_id: 31337,
        bounty_board: Some("0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"),
    },
    ChainInfo {
        name: "Flow EVM Testnet",
        chain_id: 545,
        bounty_board: Some("0x09D61437f07838AB892Bd92386EC39462BfE1972"),
    },
    ChainInfo {
        name: "opBNB Testnet",
        chain_id: 5611,
        bounty_board: Some("0x397e12962a9dCed668FD5b7B2bfAfE585bdad323"),
    },
    ChainInfo {
        name: "Mantle Sepolia Testnet",
        chain_id: 5003,
        bounty_board: Some("0x397e12962a9dCed668FD5b7B2bfAfE585bdad323"),
    },
    ChainInfo {
        name: "Monad Devnet",
        chain_id: 20143,
        bounty_board: Some("0x397e12962a9dCed668FD5b7B2bfAfE585bdad323"),
    },
    ChainInfo {
        name: "Sepolia",
        chain_id: 11155111,
        bounty_board: None,
    },
];

pub fn find_chain(name: &str) -> Option<&'static ChainInfo> {
    SUPPORTED_CHAINS.iter().find(|chain| chain.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployed_addresses_parse() {
        for chain in SUPPORTED_CHAINS {
            assert_eq!(
                chain.bounty_board.is_some(),
                chain.bounty_board().is_some(),
                "{}",
                chain.name
            );
        }
    }

    #[test]
    fn test_lookup_is_exact() {
        assert_eq!(find_chain("Anvil").map(|c| c.chain_id), Some(31337));
        assert!(find_chain("anvil").is_none());
        assert!(find_chain("Sepolia").unwrap().bounty_board().is_none());
    }
}
