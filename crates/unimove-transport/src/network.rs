//! Public endpoints per chain and network.
//!
//! Sui and IOTA run the same four network tiers. IOTA additionally publishes
//! a discovery table ([`iota_networks`]) describing each network's explorer,
//! chain identifier and auxiliary services; Sui has no equivalent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unimove_types::ChainId;

/// A network tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
    Localnet,
}

impl Network {
    pub const ALL: [Network; 4] = [
        Network::Mainnet,
        Network::Testnet,
        Network::Devnet,
        Network::Localnet,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Localnet => "localnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A network name outside the four known tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownNetwork(pub String);

impl fmt::Display for UnknownNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown network '{}' (expected mainnet, testnet, devnet or localnet)",
            self.0
        )
    }
}

impl std::error::Error for UnknownNetwork {}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Network::ALL
            .into_iter()
            .find(|n| n.as_str() == lower)
            .ok_or_else(|| UnknownNetwork(s.to_string()))
    }
}

/// JSON-RPC fullnode URL.
pub fn fullnode_url(chain: ChainId, network: Network) -> &'static str {
    match (chain, network) {
        (ChainId::Sui, Network::Mainnet) => "https://fullnode.mainnet.sui.io:443",
        (ChainId::Sui, Network::Testnet) => "https://fullnode.testnet.sui.io:443",
        (ChainId::Sui, Network::Devnet) => "https://fullnode.devnet.sui.io:443",
        (ChainId::Iota, Network::Mainnet) => "https://api.mainnet.iota.cafe",
        (ChainId::Iota, Network::Testnet) => "https://api.testnet.iota.cafe",
        (ChainId::Iota, Network::Devnet) => "https://api.devnet.iota.cafe",
        (_, Network::Localnet) => "http://127.0.0.1:9000",
    }
}

pub fn graphql_url(chain: ChainId, network: Network) -> &'static str {
    match (chain, network) {
        (ChainId::Sui, Network::Mainnet) => "https://graphql.mainnet.sui.io/graphql",
        (ChainId::Sui, Network::Testnet) => "https://graphql.testnet.sui.io/graphql",
        (ChainId::Sui, Network::Devnet) => "https://graphql.devnet.sui.io/graphql",
        (ChainId::Sui, Network::Localnet) => "http://127.0.0.1:9125/graphql",
        (ChainId::Iota, Network::Mainnet) => "https://graphql.mainnet.iota.cafe",
        (ChainId::Iota, Network::Testnet) => "https://graphql.testnet.iota.cafe",
        (ChainId::Iota, Network::Devnet) => "https://graphql.devnet.iota.cafe",
        (ChainId::Iota, Network::Localnet) => "http://127.0.0.1:9125",
    }
}

/// Faucet host; mainnet has none.
pub fn faucet_host(chain: ChainId, network: Network) -> Option<&'static str> {
    match (chain, network) {
        (_, Network::Mainnet) => None,
        (ChainId::Sui, Network::Testnet) => Some("https://faucet.testnet.sui.io"),
        (ChainId::Sui, Network::Devnet) => Some("https://faucet.devnet.sui.io"),
        (ChainId::Iota, Network::Testnet) => Some("https://faucet.testnet.iota.cafe"),
        (ChainId::Iota, Network::Devnet) => Some("https://faucet.devnet.iota.cafe"),
        (_, Network::Localnet) => Some("http://127.0.0.1:9123"),
    }
}

/// Guess the network tier from an endpoint URL.
pub fn infer_network_from_url(url: &str) -> Option<Network> {
    let lower = url.to_lowercase();
    if lower.contains("testnet") {
        Some(Network::Testnet)
    } else if lower.contains("devnet") {
        Some(Network::Devnet)
    } else if lower.contains("mainnet") {
        Some(Network::Mainnet)
    } else if lower.contains("127.0.0.1") || lower.contains("localhost") {
        Some(Network::Localnet)
    } else {
        None
    }
}

/// One entry of the IOTA network discovery table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfiguration {
    pub id: Network,
    pub name: &'static str,
    pub url: &'static str,
    pub explorer: &'static str,
    /// Wallet-standard chain identifier, e.g. `iota:mainnet`.
    pub chain: &'static str,
    pub faucet: Option<&'static str>,
    pub graphql: Option<&'static str>,
}

const IOTA_EXPLORER: &str = "https://explorer.iota.org";

/// IOTA's apps backend (coin metadata, feature flags).
pub const IOTA_APPS_BACKEND: &str = "https://apps-backend.iota.org";

static IOTA_NETWORKS: [NetworkConfiguration; 4] = [
    NetworkConfiguration {
        id: Network::Mainnet,
        name: "IOTA Mainnet",
        url: "https://api.mainnet.iota.cafe",
        explorer: IOTA_EXPLORER,
        chain: "iota:mainnet",
        faucet: None,
        graphql: Some("https://graphql.mainnet.iota.cafe"),
    },
    NetworkConfiguration {
        id: Network::Testnet,
        name: "IOTA Testnet",
        url: "https://api.testnet.iota.cafe",
        explorer: IOTA_EXPLORER,
        chain: "iota:testnet",
        faucet: Some("https://faucet.testnet.iota.cafe"),
        graphql: Some("https://graphql.testnet.iota.cafe"),
    },
    NetworkConfiguration {
        id: Network::Devnet,
        name: "IOTA Devnet",
        url: "https://api.devnet.iota.cafe",
        explorer: IOTA_EXPLORER,
        chain: "iota:devnet",
        faucet: Some("https://faucet.devnet.iota.cafe"),
        graphql: Some("https://graphql.devnet.iota.cafe"),
    },
    NetworkConfiguration {
        id: Network::Localnet,
        name: "Local Network",
        url: "http://127.0.0.1:9000",
        explorer: IOTA_EXPLORER,
        chain: "iota:localnet",
        faucet: Some("http://127.0.0.1:9123"),
        graphql: None,
    },
];

/// The IOTA discovery table, mainnet first.
pub fn iota_networks() -> &'static [NetworkConfiguration] {
    &IOTA_NETWORKS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_from_str() {
        assert_eq!("TestNet".parse::<Network>().unwrap(), Network::Testnet);
        let err = "moonnet".parse::<Network>().unwrap_err();
        assert!(err.to_string().contains("moonnet"));
    }

    #[test]
    fn test_fullnode_urls_differ_per_chain() {
        assert_ne!(
            fullnode_url(ChainId::Sui, Network::Testnet),
            fullnode_url(ChainId::Iota, Network::Testnet)
        );
        assert_eq!(
            fullnode_url(ChainId::Sui, Network::Localnet),
            fullnode_url(ChainId::Iota, Network::Localnet)
        );
    }

    #[test]
    fn test_infer_network_from_url() {
        for chain in ChainId::ALL {
            for network in Network::ALL {
                assert_eq!(
                    infer_network_from_url(fullnode_url(chain, network)),
                    Some(network)
                );
            }
        }
        assert_eq!(infer_network_from_url("https://rpc.example.com"), None);
    }

    #[test]
    fn test_iota_table_matches_endpoint_functions() {
        for entry in iota_networks() {
            assert_eq!(entry.url, fullnode_url(ChainId::Iota, entry.id));
            assert_eq!(entry.faucet, faucet_host(ChainId::Iota, entry.id));
            assert!(entry.chain.ends_with(entry.id.as_str()));
        }
    }

    #[test]
    fn test_mainnet_has_no_faucet() {
        assert!(faucet_host(ChainId::Sui, Network::Mainnet).is_none());
        assert!(faucet_host(ChainId::Iota, Network::Mainnet).is_none());
    }
}
