//! Static chain metadata used to label wallets and validate network selections.

use std::{collections::HashMap, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use url::Url;

pub const MAINNET: u64 = 1;
pub const GOERLI: u64 = 5;
pub const OPTIMISM: u64 = 10;
pub const BINANCE_SMART_CHAIN_MAINNET: u64 = 56;
pub const BINANCE_SMART_CHAIN_TESTNET: u64 = 97;
pub const POLYGON: u64 = 137;
pub const FANTOM: u64 = 250;
pub const OPTIMISM_GOERLI: u64 = 420;
pub const FANTOM_TESTNET: u64 = 4002;
pub const ARBITRUM: u64 = 42161;
pub const AVALANCHE_FUJI_TESTNET: u64 = 43113;
pub const AVALANCHE: u64 = 43114;
pub const MUMBAI: u64 = 80001;
pub const ARBITRUM_GOERLI: u64 = 421613;

/// Display name of the record returned for chains nobody knows about.
pub const UNSUPPORTED_CHAIN_NAME: &str = "Unsupported Chain";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkIcon {
    Ethereum,
    Polygon,
    Fantom,
    Avalanche,
    Optimism,
    Arbitrum,
    BinanceCoin,
    Solana,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkMetadata {
    pub chain_id: u64,
    pub chain_name: String,
    pub symbol: String,
    pub is_testnet: bool,
    pub icon: NetworkIcon,
}

impl NetworkMetadata {
    /// Sentinel record for identifiers missing from every table.
    pub fn unsupported(chain_id: u64) -> Self {
        Self {
            chain_id,
            chain_name: UNSUPPORTED_CHAIN_NAME.to_string(),
            symbol: String::new(),
            is_testnet: false,
            icon: NetworkIcon::Unknown,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        self.icon == NetworkIcon::Unknown && self.chain_name == UNSUPPORTED_CHAIN_NAME
    }
}

struct BuiltinNetwork {
    chain_id: u64,
    chain_name: &'static str,
    symbol: &'static str,
    is_testnet: bool,
    icon: NetworkIcon,
}

const BUILTIN_NETWORKS: &[BuiltinNetwork] = &[
    BuiltinNetwork {
        chain_id: MAINNET,
        chain_name: "Ethereum",
        symbol: "ETH",
        is_testnet: false,
        icon: NetworkIcon::Ethereum,
    },
    BuiltinNetwork {
        chain_id: GOERLI,
        chain_name: "Goerli",
        symbol: "GOR",
        is_testnet: true,
        icon: NetworkIcon::Ethereum,
    },
    BuiltinNetwork {
        chain_id: POLYGON,
        chain_name: "Polygon",
        symbol: "MATIC",
        is_testnet: false,
        icon: NetworkIcon::Polygon,
    },
    BuiltinNetwork {
        chain_id: MUMBAI,
        chain_name: "Mumbai",
        symbol: "MATIC",
        is_testnet: true,
        icon: NetworkIcon::Polygon,
    },
    BuiltinNetwork {
        chain_id: FANTOM,
        chain_name: "Fantom",
        symbol: "FTM",
        is_testnet: false,
        icon: NetworkIcon::Fantom,
    },
    BuiltinNetwork {
        chain_id: FANTOM_TESTNET,
        chain_name: "Fantom Testnet",
        symbol: "FTM",
        is_testnet: true,
        icon: NetworkIcon::Fantom,
    },
    BuiltinNetwork {
        chain_id: AVALANCHE,
        chain_name: "Avalanche",
        symbol: "AVAX",
        is_testnet: false,
        icon: NetworkIcon::Avalanche,
    },
    BuiltinNetwork {
        chain_id: AVALANCHE_FUJI_TESTNET,
        chain_name: "Avalanche Fuji Testnet",
        symbol: "AVAX",
        is_testnet: true,
        icon: NetworkIcon::Avalanche,
    },
    BuiltinNetwork {
        chain_id: OPTIMISM,
        chain_name: "Optimism",
        symbol: "ETH",
        is_testnet: false,
        icon: NetworkIcon::Optimism,
    },
    BuiltinNetwork {
        chain_id: OPTIMISM_GOERLI,
        chain_name: "Optimism Goerli",
        symbol: "ETH",
        is_testnet: true,
        icon: NetworkIcon::Optimism,
    },
    BuiltinNetwork {
        chain_id: ARBITRUM,
        chain_name: "Arbitrum",
        symbol: "ETH",
        is_testnet: false,
        icon: NetworkIcon::Arbitrum,
    },
    BuiltinNetwork {
        chain_id: ARBITRUM_GOERLI,
        chain_name: "Arbitrum Goerli",
        symbol: "AGOR",
        is_testnet: true,
        icon: NetworkIcon::Arbitrum,
    },
    BuiltinNetwork {
        chain_id: BINANCE_SMART_CHAIN_MAINNET,
        chain_name: "Binance Smart Chain",
        symbol: "BNB",
        is_testnet: false,
        icon: NetworkIcon::BinanceCoin,
    },
    BuiltinNetwork {
        chain_id: BINANCE_SMART_CHAIN_TESTNET,
        chain_name: "Binance Smart Chain Testnet",
        symbol: "TBNB",
        is_testnet: true,
        icon: NetworkIcon::BinanceCoin,
    },
];

const FAUCETS: &[(u64, &str)] = &[
    (GOERLI, "https://faucet.paradigm.xyz/"),
    (MUMBAI, "https://mumbaifaucet.com"),
    (AVALANCHE_FUJI_TESTNET, "https://faucet.avax.network/"),
    (FANTOM_TESTNET, "https://faucet.fantom.network/"),
    (BINANCE_SMART_CHAIN_TESTNET, "https://testnet.binance.org/faucet-smart"),
    (OPTIMISM_GOERLI, "https://app.optimism.io/bridge/deposit"),
    (ARBITRUM_GOERLI, "https://bridge.arbitrum.io/?l2ChainId=421613"),
];

fn builtin(chain_id: u64) -> Option<&'static BuiltinNetwork> {
    BUILTIN_NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

/// Looks a chain up in the built-in table. Never fails: unknown ids come back
/// as the [`NetworkMetadata::unsupported`] sentinel.
pub fn lookup(chain_id: u64) -> NetworkMetadata {
    match builtin(chain_id) {
        Some(n) => NetworkMetadata {
            chain_id,
            chain_name: n.chain_name.to_string(),
            symbol: n.symbol.to_string(),
            is_testnet: n.is_testnet,
            icon: n.icon,
        },
        None => NetworkMetadata::unsupported(chain_id),
    }
}

pub fn faucet(chain_id: u64) -> Option<Url> {
    FAUCETS.iter().find(|(id, _)| *id == chain_id).and_then(|(_, url)| Url::parse(url).ok())
}

/// Chain description reported by the connector framework for chains outside
/// the built-in table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub native_symbol: Option<String>,
    #[serde(default)]
    pub testnet: bool,
}

/// Built-in metadata plus whatever extra chains the wallet framework knows about.
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    extra: HashMap<u64, ChainDescriptor>,
    rpc_overrides: HashMap<u64, Url>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rpc_overrides(mut self, overrides: HashMap<u64, Url>) -> Self {
        self.rpc_overrides = overrides;
        self
    }

    pub fn register(&mut self, descriptor: ChainDescriptor) {
        self.extra.insert(descriptor.id, descriptor);
    }

    pub fn lookup(&self, chain_id: u64) -> NetworkMetadata {
        if builtin(chain_id).is_some() {
            return lookup(chain_id);
        }

        match self.extra.get(&chain_id) {
            Some(descriptor) => NetworkMetadata {
                chain_id,
                chain_name: descriptor.name.clone(),
                symbol: descriptor.native_symbol.clone().unwrap_or_default(),
                is_testnet: descriptor.testnet,
                icon: NetworkIcon::Unknown,
            },
            None => NetworkMetadata::unsupported(chain_id),
        }
    }

    pub fn is_supported(&self, chain_id: u64) -> bool {
        builtin(chain_id).is_some() || self.extra.contains_key(&chain_id)
    }

    /// All known chain ids, built-ins first in table order.
    pub fn supported_chains(&self) -> Vec<u64> {
        let mut chains = BUILTIN_NETWORKS.iter().map(|n| n.chain_id).collect::<Vec<_>>();
        let mut extra =
            self.extra.keys().copied().filter(|id| builtin(*id).is_none()).collect::<Vec<_>>();
        extra.sort_unstable();
        chains.extend(extra);
        chains
    }

    pub fn rpc_url(&self, chain_id: u64) -> Option<&Url> {
        self.rpc_overrides.get(&chain_id)
    }
}

/// Solana clusters the dashboard can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolanaNetwork {
    #[default]
    MainnetBeta,
    Devnet,
    Testnet,
    Localnet,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown solana network {0}")]
pub struct UnknownSolanaNetwork(pub String);

impl SolanaNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainnetBeta => "mainnet-beta",
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
            Self::Localnet => "localnet",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MainnetBeta => "Mainnet Beta",
            Self::Devnet => "Devnet",
            Self::Testnet => "Testnet",
            Self::Localnet => "Localnet",
        }
    }

    pub fn is_testnet(&self) -> bool {
        !matches!(self, Self::MainnetBeta)
    }

    pub fn default_rpc(&self) -> &'static str {
        match self {
            Self::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Self::Devnet => "https://api.devnet.solana.com",
            Self::Testnet => "https://api.testnet.solana.com",
            Self::Localnet => "http://127.0.0.1:8899",
        }
    }

    pub fn rpc_url(&self) -> Option<Url> {
        Url::parse(self.default_rpc()).ok()
    }

    /// CAIP-2 reference: the truncated genesis hash, or the cluster name for
    /// a local validator.
    pub fn caip_reference(&self) -> &'static str {
        match self {
            Self::MainnetBeta => "5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp",
            Self::Devnet => "EtWTRABZaYq6iMfeYKouRu166VU2xqa1",
            Self::Testnet => "4uhcVJyU9pJkvQyS88uRDiswHXSCkY3z",
            Self::Localnet => "localnet",
        }
    }

    pub fn from_caip_reference(reference: &str) -> Option<Self> {
        [Self::MainnetBeta, Self::Devnet, Self::Testnet, Self::Localnet]
            .into_iter()
            .find(|n| n.caip_reference() == reference || n.as_str() == reference)
    }

    pub fn metadata(&self) -> NetworkMetadata {
        NetworkMetadata {
            chain_id: 0,
            chain_name: format!("Solana {}", self.display_name()),
            symbol: "SOL".to_string(),
            is_testnet: self.is_testnet(),
            icon: NetworkIcon::Solana,
        }
    }
}

impl FromStr for SolanaNetwork {
    type Err = UnknownSolanaNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet-beta" | "mainnet" => Ok(Self::MainnetBeta),
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            "localnet" | "localhost" => Ok(Self::Localnet),
            _ => Err(UnknownSolanaNetwork(s.to_string())),
        }
    }
}

impl Display for SolanaNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_chains_have_name_and_symbol() {
        for network in BUILTIN_NETWORKS {
            let metadata = lookup(network.chain_id);
            assert!(!metadata.chain_name.is_empty());
            assert!(!metadata.symbol.is_empty());
            assert!(!metadata.is_unsupported());
            assert_eq!(metadata.chain_id, network.chain_id);
        }
    }

    #[test]
    fn test_unknown_chain_returns_sentinel() {
        for chain_id in [0, 2, 31337, u64::MAX] {
            let metadata = lookup(chain_id);
            assert_eq!(metadata, NetworkMetadata::unsupported(chain_id));
            assert_eq!(metadata.chain_name, "Unsupported Chain");
            assert!(metadata.symbol.is_empty());
            assert!(!metadata.is_testnet);
            assert_eq!(metadata.icon, NetworkIcon::Unknown);
        }
    }

    #[test]
    fn test_registry_prefers_builtin_over_descriptor() {
        let mut registry = NetworkRegistry::new();
        registry.register(ChainDescriptor {
            id: MAINNET,
            name: "Renamed".to_string(),
            native_symbol: None,
            testnet: true,
        });
        assert_eq!(registry.lookup(MAINNET).chain_name, "Ethereum");
    }

    #[test]
    fn test_registry_uses_framework_descriptor() {
        let mut registry = NetworkRegistry::new();
        assert!(!registry.is_supported(31337));
        registry.register(ChainDescriptor {
            id: 31337,
            name: "Localhost".to_string(),
            native_symbol: Some("ETH".to_string()),
            testnet: true,
        });

        let metadata = registry.lookup(31337);
        assert!(registry.is_supported(31337));
        assert_eq!(metadata.chain_name, "Localhost");
        assert_eq!(metadata.symbol, "ETH");
        assert!(metadata.is_testnet);
        assert_eq!(registry.supported_chains().last(), Some(&31337));
    }

    #[test]
    fn test_faucets_only_for_testnets() {
        assert!(faucet(GOERLI).is_some());
        assert!(faucet(MAINNET).is_none());
        for (chain_id, _) in FAUCETS {
            assert!(lookup(*chain_id).is_testnet);
        }
    }

    #[test]
    fn test_solana_network_names() {
        assert_eq!("mainnet-beta".parse::<SolanaNetwork>().unwrap(), SolanaNetwork::MainnetBeta);
        assert_eq!(SolanaNetwork::from_caip_reference("devnet"), Some(SolanaNetwork::Devnet));
        assert!("moonnet".parse::<SolanaNetwork>().is_err());
        assert!(SolanaNetwork::Devnet.rpc_url().is_some());
        assert!(!SolanaNetwork::MainnetBeta.metadata().is_testnet);
    }
}
