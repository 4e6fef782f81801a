use std::{fmt, rc::Rc};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{
    config::SessionConfig,
    domain::{ConnectorId, Ecosystem},
    provider::WalletProvider,
};

/// What a connector can do, fixed when the connector is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// The wallet can be asked to change its active chain.
    pub supports_network_switch: bool,
    /// Connecting needs extra user input (an email, a safe address).
    pub requires_modal_flow: bool,
    /// A stored reconnect hint may be acted on without user interaction.
    pub auto_reconnect: bool,
    /// The connector performs its own handshake, as opposed to being
    /// composed on top of another account.
    pub direct_connect: bool,
}

/// Closed set of connector backends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConnectorKind {
    MetaMask,
    WalletConnect,
    CoinbaseWallet,
    /// Any other `window.ethereum`, such as an in-app mobile browser.
    Injected,
    EmbeddedEmail,
    GnosisSafe,
    SolanaAdapter { name: String },
}

impl ConnectorKind {
    pub fn ecosystem(&self) -> Ecosystem {
        match self {
            Self::SolanaAdapter { .. } => Ecosystem::Solana,
            _ => Ecosystem::Evm,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            Self::MetaMask | Self::WalletConnect | Self::CoinbaseWallet | Self::Injected => {
                Capabilities {
                    supports_network_switch: true,
                    requires_modal_flow: false,
                    auto_reconnect: true,
                    direct_connect: true,
                }
            }
            Self::EmbeddedEmail => Capabilities {
                supports_network_switch: false,
                requires_modal_flow: true,
                auto_reconnect: false,
                direct_connect: true,
            },
            Self::GnosisSafe => Capabilities {
                supports_network_switch: false,
                requires_modal_flow: true,
                auto_reconnect: false,
                direct_connect: false,
            },
            Self::SolanaAdapter { .. } => Capabilities {
                supports_network_switch: false,
                requires_modal_flow: false,
                auto_reconnect: true,
                direct_connect: true,
            },
        }
    }

    pub fn default_id(&self) -> ConnectorId {
        match self {
            Self::MetaMask => ConnectorId::from("metamask"),
            Self::WalletConnect => ConnectorId::from("walletConnect"),
            Self::CoinbaseWallet => ConnectorId::from("walletLink"),
            Self::Injected => ConnectorId::from("injected"),
            Self::EmbeddedEmail => ConnectorId::from("magic"),
            Self::GnosisSafe => ConnectorId::from("gnosis"),
            Self::SolanaAdapter { name } => ConnectorId::from(name.to_lowercase()),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Self::MetaMask => "MetaMask".to_string(),
            Self::WalletConnect => "WalletConnect".to_string(),
            Self::CoinbaseWallet => "Coinbase Wallet".to_string(),
            Self::Injected => "Mobile Wallet".to_string(),
            Self::EmbeddedEmail => "Email Wallet".to_string(),
            Self::GnosisSafe => "Gnosis Safe".to_string(),
            Self::SolanaAdapter { name } => name.clone(),
        }
    }
}

/// Supplies the provider object backing a connector kind. Returning `None`
/// leaves the kind out of the registry.
pub trait ProviderFactory {
    fn provider(
        &self,
        kind: &ConnectorKind,
        config: &SessionConfig,
    ) -> Option<Rc<dyn WalletProvider>>;
}

#[derive(Clone)]
pub struct Connector {
    pub id: ConnectorId,
    pub display_name: String,
    pub kind: ConnectorKind,
    provider: Option<Rc<dyn WalletProvider>>,
}

impl Connector {
    pub fn new(kind: ConnectorKind, provider: Rc<dyn WalletProvider>) -> Self {
        Self {
            id: kind.default_id(),
            display_name: kind.display_name(),
            kind,
            provider: Some(provider),
        }
    }

    /// A connector without a handshake of its own, such as the multisig wrapper.
    pub fn composed(kind: ConnectorKind) -> Self {
        Self { id: kind.default_id(), display_name: kind.display_name(), kind, provider: None }
    }

    pub fn with_id(mut self, id: impl Into<ConnectorId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_name = display_name.to_string();
        self
    }

    pub fn ecosystem(&self) -> Ecosystem {
        self.kind.ecosystem()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    pub fn ready(&self) -> bool {
        match &self.provider {
            Some(provider) => provider.is_ready(),
            None => true,
        }
    }

    pub fn provider(&self) -> Option<Rc<dyn WalletProvider>> {
        self.provider.clone()
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("kind", &self.kind)
            .field("ready", &self.ready())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConnectorRegistry {
    connectors: Vec<Connector>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The dashboard's default line-up. The embedded email connector is only
    /// registered when an API key is configured.
    pub fn standard(config: &SessionConfig, factory: &dyn ProviderFactory) -> Self {
        let mut registry = Self::new();

        for kind in [
            ConnectorKind::MetaMask,
            ConnectorKind::WalletConnect,
            ConnectorKind::CoinbaseWallet,
            ConnectorKind::Injected,
        ] {
            registry.register_from(kind, config, factory);
        }

        registry.register(Connector::composed(ConnectorKind::GnosisSafe));

        if config.embedded_wallet_key().is_some() {
            registry.register_from(ConnectorKind::EmbeddedEmail, config, factory);
        } else {
            debug!("No embedded wallet key configured, skipping email connector");
        }

        registry.register_from(
            ConnectorKind::SolanaAdapter { name: "Phantom".to_string() },
            config,
            factory,
        );

        registry
    }

    fn register_from(
        &mut self,
        kind: ConnectorKind,
        config: &SessionConfig,
        factory: &dyn ProviderFactory,
    ) {
        match factory.provider(&kind, config) {
            Some(provider) => self.register(Connector::new(kind, provider)),
            None => debug!("No provider available for {}", kind.display_name()),
        }
    }

    /// Adds a connector. A connector registered under an existing id replaces it.
    pub fn register(&mut self, connector: Connector) {
        match self.connectors.iter_mut().find(|c| c.id == connector.id) {
            Some(existing) => {
                warn!("Replacing connector {}", connector.id);
                *existing = connector;
            }
            None => self.connectors.push(connector),
        }
    }

    pub fn get(&self, id: &ConnectorId) -> Option<&Connector> {
        self.connectors.iter().find(|c| &c.id == id)
    }

    /// Every connector of the ecosystem in registration order, ready or not.
    pub fn list(&self, ecosystem: Ecosystem) -> Vec<&Connector> {
        self.connectors.iter().filter(|c| c.ecosystem() == ecosystem).collect()
    }

    /// Connectors a user can pick right now.
    pub fn choices(&self, ecosystem: Ecosystem) -> Vec<&Connector> {
        self.list(ecosystem)
            .into_iter()
            .filter(|c| c.ready() && c.capabilities().direct_connect)
            .collect()
    }

    pub fn multisig(&self) -> Option<&Connector> {
        self.connectors.iter().find(|c| c.kind == ConnectorKind::GnosisSafe)
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;

    struct AllMocks;

    impl ProviderFactory for AllMocks {
        fn provider(
            &self,
            kind: &ConnectorKind,
            _config: &SessionConfig,
        ) -> Option<Rc<dyn WalletProvider>> {
            match kind {
                ConnectorKind::CoinbaseWallet => Some(Rc::new(MockProvider::unready())),
                ConnectorKind::Injected => None,
                _ => Some(Rc::new(MockProvider::new())),
            }
        }
    }

    fn ids(connectors: Vec<&Connector>) -> Vec<String> {
        connectors.into_iter().map(|c| c.id.to_string()).collect()
    }

    #[test]
    fn test_standard_registry_order() {
        let registry = ConnectorRegistry::standard(&SessionConfig::default(), &AllMocks);
        assert_eq!(
            ids(registry.list(Ecosystem::Evm)),
            vec!["metamask", "walletConnect", "walletLink", "gnosis"]
        );
        assert_eq!(ids(registry.list(Ecosystem::Solana)), vec!["phantom"]);
    }

    struct MobileBrowser;

    impl ProviderFactory for MobileBrowser {
        fn provider(
            &self,
            kind: &ConnectorKind,
            _config: &SessionConfig,
        ) -> Option<Rc<dyn WalletProvider>> {
            match kind {
                ConnectorKind::Injected | ConnectorKind::WalletConnect => {
                    Some(Rc::new(MockProvider::new()))
                }
                _ => None,
            }
        }
    }

    #[test]
    fn test_injected_fallback_is_mobile_wallet() {
        let registry = ConnectorRegistry::standard(&SessionConfig::default(), &MobileBrowser);
        assert_eq!(ids(registry.choices(Ecosystem::Evm)), vec!["walletConnect", "injected"]);
        let injected = registry.get(&ConnectorId::from("injected")).unwrap();
        assert_eq!(injected.display_name, "Mobile Wallet");
        assert!(injected.capabilities().auto_reconnect);
    }

    #[test]
    fn test_embedded_connector_gated_by_key() {
        let config = SessionConfig::default().with_embedded_wallet_key("pk_live_123");
        let registry = ConnectorRegistry::standard(&config, &AllMocks);
        let magic = registry.get(&ConnectorId::from("magic")).unwrap();
        assert_eq!(magic.display_name, "Email Wallet");
        assert!(magic.capabilities().requires_modal_flow);

        let blank = SessionConfig::default().with_embedded_wallet_key("");
        assert!(ConnectorRegistry::standard(&blank, &AllMocks)
            .get(&ConnectorId::from("magic"))
            .is_none());
    }

    #[test]
    fn test_choices_filter_unready_and_composed() {
        let registry = ConnectorRegistry::standard(&SessionConfig::default(), &AllMocks);
        assert_eq!(ids(registry.choices(Ecosystem::Evm)), vec!["metamask", "walletConnect"]);
        assert!(registry.get(&ConnectorId::from("walletLink")).is_some());
        assert!(registry.multisig().is_some());
    }

    #[test]
    fn test_register_replaces_same_id() {
        let mut registry = ConnectorRegistry::new();
        registry.register(Connector::new(ConnectorKind::MetaMask, Rc::new(MockProvider::new())));
        registry.register(
            Connector::new(ConnectorKind::MetaMask, Rc::new(MockProvider::unready()))
                .with_display_name("Browser Wallet"),
        );
        assert_eq!(registry.len(), 1);
        let connector = registry.get(&ConnectorId::from("metamask")).unwrap();
        assert_eq!(connector.display_name, "Browser Wallet");
        assert!(!connector.ready());
    }

    #[test]
    fn test_capabilities_by_kind() {
        assert!(ConnectorKind::MetaMask.capabilities().supports_network_switch);
        assert!(!ConnectorKind::EmbeddedEmail.capabilities().supports_network_switch);
        assert!(!ConnectorKind::GnosisSafe.capabilities().direct_connect);
        assert_eq!(
            ConnectorKind::SolanaAdapter { name: "Phantom".into() }.ecosystem(),
            Ecosystem::Solana
        );
    }
}
