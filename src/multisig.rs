//! Gnosis Safe support: a multisig account is derived from the connected
//! personal wallet plus a safe address and chain, without a wallet handshake.

use serde::{Deserialize, Serialize};

use super::{
    domain::{AddressError, EvmAddress},
    network::{self, NetworkRegistry},
};

/// Network prefixes used by the Safe web app (`eth:0x…`).
pub const SAFE_PREFIXES: &[(&str, u64)] = &[
    ("eth", network::MAINNET),
    ("matic", network::POLYGON),
    ("avax", network::AVALANCHE),
    ("bnb", network::BINANCE_SMART_CHAIN_MAINNET),
    ("oeth", network::OPTIMISM),
    ("gor", network::GOERLI),
];

/// Chains without Safe infrastructure the connector can use.
pub const DENIED_SAFE_CHAINS: &[u64] = &[
    network::FANTOM,
    network::MUMBAI,
    network::OPTIMISM,
    network::OPTIMISM_GOERLI,
    network::ARBITRUM,
    network::ARBITRUM_GOERLI,
    network::FANTOM_TESTNET,
    network::AVALANCHE_FUJI_TESTNET,
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Safe address is required")]
    MissingAddress,

    #[error("Not a valid address: {0}")]
    InvalidAddress(AddressError),

    #[error("Not a valid network: {0}")]
    InvalidNetwork(String),

    #[error("Network {0} is not supported")]
    UnsupportedNetwork(u64),

    #[error("Gnosis Safe is not available on chain {0}")]
    MultisigUnsupportedOnChain(u64),
}

pub fn chain_for_prefix(prefix: &str) -> Option<u64> {
    SAFE_PREFIXES.iter().find(|(p, _)| *p == prefix).map(|(_, chain_id)| *chain_id)
}

pub fn prefix_for_chain(chain_id: u64) -> Option<&'static str> {
    SAFE_PREFIXES.iter().find(|(_, id)| *id == chain_id).map(|(prefix, _)| *prefix)
}

pub fn is_denied(chain_id: u64) -> bool {
    DENIED_SAFE_CHAINS.contains(&chain_id)
}

/// Where a safe lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeLocation {
    pub safe_address: EvmAddress,
    pub safe_chain_id: u64,
}

/// Splits `"<prefix>:<address>"` as copied from the Safe web app. Returns
/// `None` unless the prefix is known and the address is valid.
pub fn parse_safe_shorthand(input: &str) -> Option<SafeLocation> {
    let (prefix, address) = input.trim().split_once(':')?;
    let safe_chain_id = chain_for_prefix(prefix)?;
    let safe_address = address.parse::<EvmAddress>().ok()?;
    Some(SafeLocation { safe_address, safe_chain_id })
}

/// Raw form input for connecting a safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeForm {
    pub safe_address: String,
    pub safe_chain_id: String,
}

impl Default for SafeForm {
    fn default() -> Self {
        Self { safe_address: String::new(), safe_chain_id: "-1".to_string() }
    }
}

impl SafeForm {
    /// Applies pasted text. Shorthand input fills both fields, keeping the
    /// address exactly as pasted, and returns `true`; anything else leaves
    /// the form untouched so the regular paste goes through.
    pub fn apply_paste(&mut self, text: &str) -> bool {
        if !text.contains(":0x") {
            return false;
        }

        match (parse_safe_shorthand(text), text.trim().split_once(':')) {
            (Some(location), Some((_, address))) => {
                self.safe_address = address.to_string();
                self.safe_chain_id = location.safe_chain_id.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn address_error(&self) -> Option<ValidationError> {
        validate_safe_address(&self.safe_address).err()
    }

    pub fn submit(&self, registry: &NetworkRegistry) -> Result<SafeLocation, ValidationError> {
        let safe_address = validate_safe_address(&self.safe_address)?;
        let safe_chain_id = self
            .safe_chain_id
            .trim()
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidNetwork(self.safe_chain_id.clone()))?;
        validate_safe_chain(safe_chain_id, registry)?;
        Ok(SafeLocation { safe_address, safe_chain_id })
    }
}

pub fn validate_safe_address(input: &str) -> Result<EvmAddress, ValidationError> {
    if input.trim().is_empty() {
        return Err(ValidationError::MissingAddress);
    }
    input.parse::<EvmAddress>().map_err(ValidationError::InvalidAddress)
}

pub fn validate_safe_chain(chain_id: u64, registry: &NetworkRegistry) -> Result<(), ValidationError> {
    if !registry.is_supported(chain_id) {
        return Err(ValidationError::UnsupportedNetwork(chain_id));
    }
    if is_denied(chain_id) {
        return Err(ValidationError::MultisigUnsupportedOnChain(chain_id));
    }
    Ok(())
}

/// A safe operated through a personal wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultisigAccount {
    pub safe: EvmAddress,
    pub chain_id: u64,
    pub personal: EvmAddress,
}

impl MultisigAccount {
    /// Shorthand the Safe web app understands, when the chain has a prefix.
    pub fn shorthand(&self) -> Option<String> {
        prefix_for_chain(self.chain_id).map(|prefix| format!("{prefix}:{}", self.safe))
    }
}

/// Validates the safe inputs and derives the multisig account. Pure: the
/// address is checked before anything else and no network call is made.
pub fn compose_multisig_account(
    personal: EvmAddress,
    safe_address: &str,
    safe_chain_id: u64,
    registry: &NetworkRegistry,
) -> Result<MultisigAccount, ValidationError> {
    let safe = validate_safe_address(safe_address)?;
    validate_safe_chain(safe_chain_id, registry)?;
    Ok(MultisigAccount { safe, chain_id: safe_chain_id, personal })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAFE: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const PERSONAL: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

    fn personal() -> EvmAddress {
        PERSONAL.parse().unwrap()
    }

    #[test]
    fn test_shorthand_mainnet() {
        let location = parse_safe_shorthand(&format!("eth:{SAFE}")).unwrap();
        assert_eq!(location.safe_chain_id, network::MAINNET);
        assert_eq!(location.safe_address.to_string(), SAFE);
    }

    #[test]
    fn test_paste_fills_form() {
        let mut form = SafeForm::default();
        assert!(form.apply_paste(&format!("matic:{SAFE}")));
        assert_eq!(form.safe_address, SAFE);
        assert_eq!(form.safe_chain_id, "137");
    }

    #[test]
    fn test_paste_keeps_address_text() {
        let pasted = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
        let mut form = SafeForm::default();
        assert!(form.apply_paste(&format!("eth:{pasted}")));
        assert_eq!(form.safe_address, pasted);
        assert_eq!(form.safe_chain_id, "1");
        assert_eq!(form.submit(&NetworkRegistry::new()).unwrap().safe_address.to_string(), SAFE);
    }

    #[test]
    fn test_paste_with_unknown_prefix_leaves_form() {
        let mut form = SafeForm { safe_address: "0x1".to_string(), safe_chain_id: "5".to_string() };
        let before = form.clone();
        assert!(!form.apply_paste(&format!("ftm:{SAFE}")));
        assert!(!form.apply_paste(SAFE));
        assert!(!form.apply_paste("eth:0xnothex"));
        assert_eq!(form, before);
    }

    #[test]
    fn test_compose_rejects_bad_address() {
        let registry = NetworkRegistry::new();
        assert_eq!(
            compose_multisig_account(personal(), "", network::MAINNET, &registry),
            Err(ValidationError::MissingAddress)
        );
        assert!(matches!(
            compose_multisig_account(personal(), "0x123", network::MAINNET, &registry),
            Err(ValidationError::InvalidAddress(AddressError::Length))
        ));
        // address errors win over chain errors
        assert!(matches!(
            compose_multisig_account(personal(), "nope", network::FANTOM, &registry),
            Err(ValidationError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_compose_rejects_denied_chains() {
        let registry = NetworkRegistry::new();
        for chain_id in DENIED_SAFE_CHAINS {
            assert_eq!(
                compose_multisig_account(personal(), SAFE, *chain_id, &registry),
                Err(ValidationError::MultisigUnsupportedOnChain(*chain_id))
            );
        }
    }

    #[test]
    fn test_compose_rejects_unknown_chain() {
        assert_eq!(
            compose_multisig_account(personal(), SAFE, 31337, &NetworkRegistry::new()),
            Err(ValidationError::UnsupportedNetwork(31337))
        );
    }

    #[test]
    fn test_compose_success() {
        let account =
            compose_multisig_account(personal(), SAFE, network::POLYGON, &NetworkRegistry::new())
                .unwrap();
        assert_eq!(account.safe.to_string(), SAFE);
        assert_eq!(account.personal, personal());
        assert_eq!(account.shorthand(), Some(format!("matic:{SAFE}")));
    }

    #[test]
    fn test_form_submit() {
        let registry = NetworkRegistry::new();
        let form = SafeForm::default();
        assert_eq!(form.address_error(), Some(ValidationError::MissingAddress));
        assert_eq!(form.submit(&registry), Err(ValidationError::MissingAddress));

        let form = SafeForm { safe_address: SAFE.to_string(), safe_chain_id: "-1".to_string() };
        assert_eq!(form.submit(&registry), Err(ValidationError::InvalidNetwork("-1".to_string())));

        let form = SafeForm { safe_address: SAFE.to_string(), safe_chain_id: "5".to_string() };
        assert_eq!(form.submit(&registry).unwrap().safe_chain_id, network::GOERLI);
    }
}
