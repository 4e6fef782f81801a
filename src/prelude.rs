pub use crate::{
    config::{ConnectOrdering, SessionConfig},
    connector::{Capabilities, Connector, ConnectorKind, ConnectorRegistry, ProviderFactory},
    domain::{Account, ConnectorId, Ecosystem, EvmAddress, SolanaPublicKey},
    event::Event,
    hint::{HintStore, MemoryHintStore, ReconnectHint},
    metadata::{Chain, DappMetadata, Method, SessionAccount},
    multisig::{MultisigAccount, SafeForm, SafeLocation, ValidationError},
    network::{NetworkMetadata, NetworkRegistry, SolanaNetwork},
    provider::{ProviderError, WalletEvent, WalletProvider},
    ConnectOptions, ConnectOutcome, Error, Session, State,
};

#[cfg(target_arch = "wasm32")]
pub use crate::{hint::LocalStorageHintStore, provider::eip1193::BrowserProviders};
