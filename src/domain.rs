use std::{fmt::Display, str::FromStr, sync::Arc};

use ethers::{types::H160, utils::to_checksum};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::new_type;

/// Length in bytes of a Solana public key.
pub const SOLANA_PUBLIC_KEY_LENGTH: usize = 32;

const EVM_ADDRESS_HEX_LENGTH: usize = 40;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address is empty")]
    Empty,

    #[error("Invalid address length")]
    Length,

    #[error("Invalid address encoding")]
    Encoding,

    #[error("Address checksum mismatch")]
    Checksum,
}

/// Blockchain family a connector or account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Evm,
    Solana,
}

impl Ecosystem {
    pub const ALL: [Ecosystem; 2] = [Ecosystem::Evm, Ecosystem::Solana];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Evm => "evm",
            Self::Solana => "solana",
        }
    }
}

impl Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

new_type!(
    #[doc = "Stable identifier of a registered connector, e.g. `metamask`."]
    #[as_ref(forward)]
    #[from(forward)]
    ConnectorId: Arc<str>
);

/// A syntactically valid EVM address.
///
/// Parsing accepts the `0x` prefix optionally. Mixed-case input has to carry a
/// valid EIP-55 checksum, single-case input is taken as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EvmAddress(pub H160);

impl EvmAddress {
    pub fn zero() -> Self {
        Self(H160::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn as_h160(&self) -> &H160 {
        &self.0
    }

    #[inline]
    pub fn to_checksum(&self) -> String {
        to_checksum(&self.0, None)
    }

    /// Cheap syntactic check, the equivalent of a form-level `isAddress`.
    pub fn is_valid(input: &str) -> bool {
        input.parse::<Self>().is_ok()
    }
}

impl From<H160> for EvmAddress {
    fn from(value: H160) -> Self {
        Self(value)
    }
}

impl From<EvmAddress> for H160 {
    fn from(value: EvmAddress) -> Self {
        value.0
    }
}

impl FromStr for EvmAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }

        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if hex.len() != EVM_ADDRESS_HEX_LENGTH {
            return Err(AddressError::Length);
        }

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressError::Encoding);
        }

        let address = H160::from_str(hex).map_err(|_| AddressError::Encoding)?;

        let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper && to_checksum(&address, None)[2..] != *hex {
            return Err(AddressError::Checksum);
        }

        Ok(Self(address))
    }
}

impl Display for EvmAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl Serialize for EvmAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for EvmAddress {
    fn deserialize<D>(deserializer: D) -> Result<EvmAddress, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<EvmAddress>().map_err(D::Error::custom)
    }
}

/// Base58-encoded ed25519 public key identifying a Solana wallet.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SolanaPublicKey(pub [u8; SOLANA_PUBLIC_KEY_LENGTH]);

impl SolanaPublicKey {
    pub fn from_bytes(bytes: [u8; SOLANA_PUBLIC_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl FromStr for SolanaPublicKey {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }

        let decoded = bs58::decode(trimmed).into_vec().map_err(|_| AddressError::Encoding)?;
        let bytes: [u8; SOLANA_PUBLIC_KEY_LENGTH] =
            decoded.try_into().map_err(|_| AddressError::Length)?;

        Ok(Self(bytes))
    }
}

impl Display for SolanaPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl Serialize for SolanaPublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for SolanaPublicKey {
    fn deserialize<D>(deserializer: D) -> Result<SolanaPublicKey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<SolanaPublicKey>().map_err(D::Error::custom)
    }
}

/// Ecosystem-tagged wallet identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Account {
    Evm(EvmAddress),
    Solana(SolanaPublicKey),
}

impl Account {
    pub fn parse(ecosystem: Ecosystem, value: &str) -> Result<Self, AddressError> {
        match ecosystem {
            Ecosystem::Evm => Ok(Self::Evm(value.parse()?)),
            Ecosystem::Solana => Ok(Self::Solana(value.parse()?)),
        }
    }

    pub fn ecosystem(&self) -> Ecosystem {
        match self {
            Self::Evm(_) => Ecosystem::Evm,
            Self::Solana(_) => Ecosystem::Solana,
        }
    }

    pub fn as_evm(&self) -> Option<&EvmAddress> {
        match self {
            Self::Evm(address) => Some(address),
            Self::Solana(_) => None,
        }
    }

    pub fn as_solana(&self) -> Option<&SolanaPublicKey> {
        match self {
            Self::Solana(key) => Some(key),
            Self::Evm(_) => None,
        }
    }
}

impl Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Evm(address) => address.fmt(f),
            Self::Solana(key) => key.fmt(f),
        }
    }
}

impl From<EvmAddress> for Account {
    fn from(value: EvmAddress) -> Self {
        Self::Evm(value)
    }
}

impl From<SolanaPublicKey> for Account {
    fn from(value: SolanaPublicKey) -> Self {
        Self::Solana(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn test_parses_checksummed_address() {
        let address = CHECKSUMMED.parse::<EvmAddress>().unwrap();
        assert_eq!(address.to_string(), CHECKSUMMED);
    }

    #[test]
    fn test_accepts_single_case_address() {
        let lower = CHECKSUMMED.to_lowercase();
        let upper = format!("0x{}", CHECKSUMMED[2..].to_uppercase());
        assert_eq!(lower.parse::<EvmAddress>().unwrap().to_string(), CHECKSUMMED);
        assert_eq!(upper.parse::<EvmAddress>().unwrap().to_string(), CHECKSUMMED);
    }

    #[test]
    fn test_accepts_missing_prefix() {
        assert!(EvmAddress::is_valid(&CHECKSUMMED[2..]));
    }

    #[test]
    fn test_rejects_bad_checksum() {
        let broken = CHECKSUMMED.replace("aAeb", "AaEb");
        assert_eq!(broken.parse::<EvmAddress>(), Err(AddressError::Checksum));
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        assert_eq!("".parse::<EvmAddress>(), Err(AddressError::Empty));
        assert_eq!("0x1234".parse::<EvmAddress>(), Err(AddressError::Length));
        assert_eq!(
            "0xzzzzb6053f3e94c9b9a09f33669435e7ef1beaed".parse::<EvmAddress>(),
            Err(AddressError::Encoding)
        );
    }

    #[test]
    fn test_solana_key_roundtrip() {
        let key = SolanaPublicKey::from_bytes([7u8; SOLANA_PUBLIC_KEY_LENGTH]);
        let encoded = key.to_string();
        assert_eq!(encoded.parse::<SolanaPublicKey>().unwrap(), key);
    }

    #[test]
    fn test_solana_key_rejects_wrong_length() {
        let short = bs58::encode([1u8; 16]).into_string();
        assert_eq!(short.parse::<SolanaPublicKey>(), Err(AddressError::Length));
        assert_eq!("0OIl".parse::<SolanaPublicKey>(), Err(AddressError::Encoding));
    }

    #[test]
    fn test_account_ecosystem() {
        let evm = Account::parse(Ecosystem::Evm, CHECKSUMMED).unwrap();
        assert_eq!(evm.ecosystem(), Ecosystem::Evm);
        assert!(evm.as_solana().is_none());

        let key = SolanaPublicKey::from_bytes([3u8; SOLANA_PUBLIC_KEY_LENGTH]).to_string();
        let sol = Account::parse(Ecosystem::Solana, &key).unwrap();
        assert_eq!(sol.ecosystem(), Ecosystem::Solana);
        assert_eq!(sol.to_string(), key);
    }
}
