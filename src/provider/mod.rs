//! Wallet providers are the opaque backends behind a connector: a browser
//! extension, a WalletConnect pairing, an embedded custodial wallet or a
//! Solana wallet adapter. The session only ever talks to them through
//! [`WalletProvider`].

#[cfg(target_arch = "wasm32")]
pub mod eip1193;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::Account;

/// EIP-1193 provider error codes.
pub const CODE_USER_REJECTED: i64 = 4001;
pub const CODE_UNAUTHORIZED: i64 = 4100;
pub const CODE_UNSUPPORTED_METHOD: i64 = 4200;
pub const CODE_DISCONNECTED: i64 = 4900;
pub const CODE_CHAIN_DISCONNECTED: i64 = 4901;
pub const CODE_UNRECOGNIZED_CHAIN: i64 = 4902;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("User rejected the request")]
    UserRejected,

    /// The user closed the wallet picker without choosing anything.
    #[error("No wallet selected")]
    NotSelected,

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Unsupported method")]
    UnsupportedMethod,

    #[error("Unrecognized chain {0}")]
    UnrecognizedChain(u64),

    #[error("Provider disconnected")]
    Disconnected,

    #[error("Provider error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl ProviderError {
    pub fn from_code(code: i64, message: impl Into<String>) -> Self {
        match code {
            CODE_USER_REJECTED => Self::UserRejected,
            CODE_UNAUTHORIZED => Self::Unauthorized,
            CODE_UNSUPPORTED_METHOD => Self::UnsupportedMethod,
            CODE_DISCONNECTED | CODE_CHAIN_DISCONNECTED => Self::Disconnected,
            _ => Self::Rpc { code, message: message.into() },
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::UserRejected => CODE_USER_REJECTED,
            Self::Unauthorized => CODE_UNAUTHORIZED,
            Self::UnsupportedMethod => CODE_UNSUPPORTED_METHOD,
            Self::Disconnected => CODE_DISCONNECTED,
            Self::UnrecognizedChain(_) => CODE_UNRECOGNIZED_CHAIN,
            Self::NotSelected | Self::Unavailable(_) => -32603,
            Self::Rpc { code, .. } => *code,
        }
    }
}

/// Parameters handed to a provider when the user picks it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    /// Chain the application would like the wallet to be on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// Login for connectors that run their own modal flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Result of a successful provider handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConnection {
    pub account: Account,
    /// Chain the wallet reports. `None` for ecosystems without chain ids.
    pub chain_id: Option<u64>,
}

/// Notifications a provider pushes after the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    ChainChanged(u64),
    AccountsChanged(Vec<String>),
    Disconnected,
}

#[async_trait(?Send)]
pub trait WalletProvider {
    async fn connect(&self, request: ConnectRequest) -> Result<ProviderConnection, ProviderError>;

    async fn disconnect(&self) -> Result<(), ProviderError>;

    async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ProviderError>;

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError>;

    fn is_ready(&self) -> bool {
        true
    }
}

/// Parses an EIP-1193 `eth_chainId` result (`"0x89"`) or a decimal string.
pub fn parse_chain_id(value: &str) -> Option<u64> {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => value.parse::<u64>().ok(),
    }
}

pub fn format_chain_id(chain_id: u64) -> String {
    format!("0x{chain_id:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ProviderError::from_code(4001, "denied"), ProviderError::UserRejected);
        assert_eq!(ProviderError::from_code(4901, ""), ProviderError::Disconnected);
        assert_eq!(
            ProviderError::from_code(-32000, "gas"),
            ProviderError::Rpc { code: -32000, message: "gas".to_string() }
        );
        assert_eq!(ProviderError::UnrecognizedChain(5).code(), 4902);
    }

    #[test]
    fn test_chain_id_encoding() {
        assert_eq!(parse_chain_id("0x89"), Some(137));
        assert_eq!(parse_chain_id("137"), Some(137));
        assert_eq!(parse_chain_id("0xzz"), None);
        assert_eq!(format_chain_id(137), "0x89");
    }
}
