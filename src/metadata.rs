use std::{fmt::Display, num::ParseIntError, str::FromStr};

use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::{
    domain::{Account, AddressError, Ecosystem},
    network::SolanaNetwork,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Redirects {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub universal: Option<String>,
}

/// Describes the dApp to wallets during a handshake.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DappMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub icons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<Redirects>,
}

impl DappMetadata {
    pub fn from(name: &str, description: &str, url: &str, icons: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            url: url.to_string(),
            icons,
            redirect: None,
        }
    }
}

impl Default for DappMetadata {
    fn default() -> Self {
        Self::from("wallet-session", "", "http://localhost", Vec::new())
    }
}

/// EVM JSON-RPC methods the session knows how to classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    #[serde(rename = "personal_sign")]
    Sign,
    #[serde(rename = "eth_sign")]
    EthSign,
    #[serde(rename = "eth_signTypedData")]
    SignTypedData,
    #[serde(rename = "eth_signTypedData_v4")]
    SignTypedDataV4,
    #[serde(rename = "eth_signTransaction")]
    SignTransaction,
    #[serde(rename = "eth_sendTransaction")]
    SendTransaction,
    #[serde(rename = "wallet_switchEthereumChain")]
    SwitchChain,
    #[serde(rename = "wallet_addEthereumChain")]
    AddChain,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Sign => "personal_sign",
            Method::EthSign => "eth_sign",
            Method::SignTypedData => "eth_signTypedData",
            Method::SignTypedDataV4 => "eth_signTypedData_v4",
            Method::SignTransaction => "eth_signTransaction",
            Method::SendTransaction => "eth_sendTransaction",
            Method::SwitchChain => "wallet_switchEthereumChain",
            Method::AddChain => "wallet_addEthereumChain",
        }
    }

    /// Whether the method signs or submits something on the wallet's current chain.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Method::SwitchChain | Method::AddChain)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown method {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal_sign" => Ok(Method::Sign),
            "eth_sign" => Ok(Method::EthSign),
            "eth_signTypedData" => Ok(Method::SignTypedData),
            "eth_signTypedData_v4" => Ok(Method::SignTypedDataV4),
            "eth_signTransaction" => Ok(Method::SignTransaction),
            "eth_sendTransaction" => Ok(Method::SendTransaction),
            "wallet_switchEthereumChain" => Ok(Method::SwitchChain),
            "wallet_addEthereumChain" => Ok(Method::AddChain),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// CAIP-2 chain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    Eip155(u64),
    Solana(SolanaNetwork),
}

#[derive(Debug, Clone, Error)]
pub enum ChainError {
    #[error("Chain information provided in bad format")]
    BadFormat,

    #[error("Invalid chain type")]
    InvalidType,

    #[error("Unknown solana network")]
    UnknownNetwork,

    #[error(transparent)]
    ParseIntError(#[from] ParseIntError),
}

impl Chain {
    pub fn ecosystem(&self) -> Ecosystem {
        match self {
            Self::Eip155(_) => Ecosystem::Evm,
            Self::Solana(_) => Ecosystem::Solana,
        }
    }

    fn from_parts(namespace: &str, reference: &str) -> Result<Self, ChainError> {
        match namespace.to_lowercase().as_str() {
            "eip155" => Ok(Self::Eip155(reference.parse::<u64>()?)),
            "solana" => SolanaNetwork::from_caip_reference(reference)
                .map(Self::Solana)
                .ok_or(ChainError::UnknownNetwork),
            _ => Err(ChainError::InvalidType),
        }
    }
}

impl FromStr for Chain {
    type Err = ChainError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components = s.split(':').collect::<Vec<_>>();
        if components.len() != 2 {
            return Err(ChainError::BadFormat);
        }

        Self::from_parts(components[0], components[1])
    }
}

impl Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eip155(chain_id) => write!(f, "eip155:{chain_id}"),
            Self::Solana(network) => write!(f, "solana:{}", network.caip_reference()),
        }
    }
}

impl Serialize for Chain {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{self}"))
    }
}

impl<'de> Deserialize<'de> for Chain {
    fn deserialize<D>(deserializer: D) -> Result<Chain, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        s.parse::<Chain>().map_err(D::Error::custom)
    }
}

/// CAIP-10 account identifier, an [`Account`] pinned to a [`Chain`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionAccount {
    pub chain: Chain,
    pub account: Account,
}

#[derive(Debug, Clone, Error)]
pub enum SessionAccountError {
    #[error("Account information provided in bad format")]
    BadFormat,

    #[error("Account does not belong to the chain's ecosystem")]
    EcosystemMismatch,

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("Account address in bad format: {0}")]
    Address(#[from] AddressError),
}

impl SessionAccount {
    pub fn new(chain: Chain, account: Account) -> Result<Self, SessionAccountError> {
        if chain.ecosystem() != account.ecosystem() {
            return Err(SessionAccountError::EcosystemMismatch);
        }
        Ok(Self { chain, account })
    }
}

impl FromStr for SessionAccount {
    type Err = SessionAccountError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components = s.split(':').collect::<Vec<_>>();
        if components.len() != 3 {
            return Err(SessionAccountError::BadFormat);
        }

        let chain = Chain::from_parts(components[0], components[1])?;
        let account = Account::parse(chain.ecosystem(), components[2])?;

        Ok(SessionAccount { chain, account })
    }
}

impl Display for SessionAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.chain, self.account)
    }
}

impl Serialize for SessionAccount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{self}"))
    }
}

impl<'de> Deserialize<'de> for SessionAccount {
    fn deserialize<D>(deserializer: D) -> Result<SessionAccount, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        s.parse::<SessionAccount>().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EvmAddress, SolanaPublicKey};

    #[test]
    fn test_chain_parse() {
        assert_eq!("eip155:137".parse::<Chain>().unwrap(), Chain::Eip155(137));
        assert_eq!(
            "solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1".parse::<Chain>().unwrap(),
            Chain::Solana(SolanaNetwork::Devnet)
        );
        assert!(matches!("eip155".parse::<Chain>(), Err(ChainError::BadFormat)));
        assert!(matches!("cosmos:hub".parse::<Chain>(), Err(ChainError::InvalidType)));
        assert!(matches!("eip155:abc".parse::<Chain>(), Err(ChainError::ParseIntError(_))));
    }

    #[test]
    fn test_session_account_display() {
        let address: EvmAddress = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse().unwrap();
        let account = SessionAccount::new(Chain::Eip155(1), Account::Evm(address)).unwrap();
        let encoded = account.to_string();
        assert_eq!(encoded, "eip155:1:0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        assert_eq!(encoded.parse::<SessionAccount>().unwrap(), account);
    }

    #[test]
    fn test_session_account_rejects_cross_ecosystem() {
        let key = SolanaPublicKey::from_bytes([9u8; 32]);
        assert!(matches!(
            SessionAccount::new(Chain::Eip155(1), Account::Solana(key)),
            Err(SessionAccountError::EcosystemMismatch)
        ));
    }

    #[test]
    fn test_method_classification() {
        assert!("eth_sendTransaction".parse::<Method>().unwrap().is_mutating());
        assert!(!"wallet_switchEthereumChain".parse::<Method>().unwrap().is_mutating());
        assert!("eth_call".parse::<Method>().is_err());
    }
}
