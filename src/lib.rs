pub mod config;
pub mod connector;
pub mod domain;
pub mod event;
pub mod hint;
pub mod macros;
pub mod metadata;
pub mod multisig;
pub mod network;
pub mod prelude;
pub mod provider;


use std::{cell::RefCell, rc::Rc};

use self::{
    config::{ConnectOrdering, SessionConfig},
    connector::{Connector, ConnectorRegistry},
    domain::{Account, ConnectorId, Ecosystem, EvmAddress},
    hint::{HintStore, ReconnectHint},
    metadata::{Chain, Method, SessionAccount},
    multisig::{compose_multisig_account, MultisigAccount, ValidationError},
    network::{ChainDescriptor, NetworkMetadata, NetworkRegistry, SolanaNetwork},
    provider::{ConnectRequest, ProviderConnection, ProviderError, WalletEvent},
};

use log::{debug, error, info, warn};

const ANALYTICS_TARGET: &str = "wallet_session::analytics";

/// Where an ecosystem's wallet stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Disconnected,
    Connecting,
    ConnectedPersonal,
    ConnectedMultisig,
    NetworkMismatch,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("User rejected the request")]
    UserRejected,

    #[error("No wallet selected")]
    NotSelected,

    #[error("Connector unavailable: {0}")]
    ConnectorUnavailable(String),

    #[error("Invalid address: {0}")]
    InvalidAddressInput(ValidationError),

    #[error("Invalid network selection: {0}")]
    InvalidNetworkSelection(String),

    #[error("Multisig is not supported on chain {0}")]
    MultisigUnsupportedOnChain(u64),

    #[error("Connector does not support switching networks")]
    NetworkSwitchUnsupported,

    #[error("Wallet is on chain {wallet:?}, expected {desired}")]
    NetworkMismatch { wallet: Option<u64>, desired: u64 },

    #[error("Not connected")]
    NotConnected,

    #[error("Unknown connector {0}")]
    UnknownConnector(ConnectorId),

    #[error("Connector {0} requires its own sign-in flow")]
    ModalFlowRequired(ConnectorId),

    #[error("Connection attempt superseded by a newer one")]
    Superseded,

    #[error(transparent)]
    Provider(ProviderError),
}

impl From<ProviderError> for Error {
    fn from(value: ProviderError) -> Self {
        match value {
            ProviderError::UserRejected => Self::UserRejected,
            ProviderError::NotSelected => Self::NotSelected,
            ProviderError::Unavailable(reason) => Self::ConnectorUnavailable(reason),
            ProviderError::UnrecognizedChain(chain_id) => {
                Self::InvalidNetworkSelection(format!("wallet does not know chain {chain_id}"))
            }
            other => Self::Provider(other),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(value: ValidationError) -> Self {
        match value {
            ValidationError::MissingAddress | ValidationError::InvalidAddress(_) => {
                Self::InvalidAddressInput(value)
            }
            ValidationError::InvalidNetwork(input) => Self::InvalidNetworkSelection(input),
            ValidationError::UnsupportedNetwork(chain_id) => {
                Self::InvalidNetworkSelection(format!("unsupported chain {chain_id}"))
            }
            ValidationError::MultisigUnsupportedOnChain(chain_id) => {
                Self::MultisigUnsupportedOnChain(chain_id)
            }
        }
    }
}

/// Extra input for a connection attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    pub email: Option<String>,
}

impl ConnectOptions {
    pub fn email(email: &str) -> Self {
        Self { email: Some(email.to_string()) }
    }
}

/// How a `connect` call ended. Closing the wallet picker is not an error.
#[derive(Debug)]
pub enum ConnectOutcome {
    Connected(Account),
    NotSelected,
    Superseded,
    Failed(Error),
}

impl ConnectOutcome {
    pub fn into_result(self) -> Result<Account, Error> {
        match self {
            Self::Connected(account) => Ok(account),
            Self::NotSelected => Err(Error::NotSelected),
            Self::Superseded => Err(Error::Superseded),
            Self::Failed(err) => Err(err),
        }
    }

    pub fn account(&self) -> Option<&Account> {
        match self {
            Self::Connected(account) => Some(account),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    account: Option<Account>,
    connector: Option<ConnectorId>,
    latest_attempt: Option<u64>,
    in_flight: usize,
}

#[derive(Debug, Default)]
struct Inner {
    evm: Slot,
    solana: Slot,
    multisig: Option<MultisigAccount>,
    wallet_chain: Option<u64>,
    desired_chain: Option<u64>,
    mismatch_reported: bool,
    next_attempt: u64,
}

impl Inner {
    fn slot(&self, ecosystem: Ecosystem) -> &Slot {
        match ecosystem {
            Ecosystem::Evm => &self.evm,
            Ecosystem::Solana => &self.solana,
        }
    }

    fn slot_mut(&mut self, ecosystem: Ecosystem) -> &mut Slot {
        match ecosystem {
            Ecosystem::Evm => &mut self.evm,
            Ecosystem::Solana => &mut self.solana,
        }
    }

    /// Chain the active EVM account operates on.
    fn active_chain(&self) -> Option<u64> {
        match &self.multisig {
            Some(multisig) => Some(multisig.chain_id),
            None => self.wallet_chain,
        }
    }

    fn mismatch(&self) -> Option<(Option<u64>, u64)> {
        self.evm.account?;
        let desired = self.desired_chain?;
        let wallet = self.active_chain();
        if wallet == Some(desired) {
            None
        } else {
            Some((wallet, desired))
        }
    }

    /// Reports a transition into or out of a mismatch.
    fn refresh_mismatch(&mut self) -> Option<event::Event> {
        let mismatch = self.mismatch();
        if mismatch.is_some() == self.mismatch_reported {
            return None;
        }
        self.mismatch_reported = mismatch.is_some();
        match mismatch {
            Some((wallet, desired)) => Some(event::Event::NetworkMismatch { wallet, desired }),
            None => Some(event::Event::MismatchResolved),
        }
    }

    fn drop_account(&mut self, ecosystem: Ecosystem) -> Option<ConnectorId> {
        let slot = self.slot_mut(ecosystem);
        slot.account = None;
        let connector = slot.connector.take();
        if ecosystem == Ecosystem::Evm {
            self.multisig = None;
            self.wallet_chain = None;
        }
        connector
    }
}

/// Wallet session shared by everything that renders or uses wallet state.
///
/// Cloning is cheap and every clone observes the same session. All mutation
/// happens through the methods below on a single thread.
#[derive(Clone)]
pub struct Session {
    config: Rc<SessionConfig>,
    registry: Rc<ConnectorRegistry>,
    networks: Rc<RefCell<NetworkRegistry>>,
    hints: Rc<dyn HintStore>,
    inner: Rc<RefCell<Inner>>,
    listener: Option<Rc<dyn Fn(event::Event)>>,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        registry: ConnectorRegistry,
        hints: impl HintStore + 'static,
        listener: Option<Box<dyn Fn(event::Event) + 'static>>,
    ) -> Self {
        let networks = NetworkRegistry::new().with_rpc_overrides(config.rpc_overrides.clone());
        let inner = Inner { desired_chain: config.desired_chain_id, ..Inner::default() };

        Self {
            config: Rc::new(config),
            registry: Rc::new(registry),
            networks: Rc::new(RefCell::new(networks)),
            hints: Rc::new(hints),
            inner: Rc::new(RefCell::new(inner)),
            listener: listener.map(Rc::from),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn registry(&self) -> &ConnectorRegistry {
        &self.registry
    }

    pub fn state(&self, ecosystem: Ecosystem) -> State {
        let inner = self.inner.borrow();
        let slot = inner.slot(ecosystem);
        match slot.account {
            None if slot.in_flight > 0 => State::Connecting,
            None => State::Disconnected,
            Some(_) if ecosystem == Ecosystem::Solana => State::ConnectedPersonal,
            Some(_) if inner.mismatch().is_some() => State::NetworkMismatch,
            Some(_) if inner.multisig.is_some() => State::ConnectedMultisig,
            Some(_) => State::ConnectedPersonal,
        }
    }

    /// The active account. For EVM this is the safe while one is composed.
    pub fn account(&self, ecosystem: Ecosystem) -> Option<Account> {
        let inner = self.inner.borrow();
        match (ecosystem, &inner.multisig) {
            (Ecosystem::Evm, Some(multisig)) => Some(Account::Evm(multisig.safe)),
            _ => inner.slot(ecosystem).account,
        }
    }

    pub fn personal_account(&self) -> Option<EvmAddress> {
        self.inner.borrow().evm.account.and_then(|account| account.as_evm().copied())
    }

    pub fn multisig(&self) -> Option<MultisigAccount> {
        self.inner.borrow().multisig
    }

    pub fn is_multisig(&self) -> bool {
        self.inner.borrow().multisig.is_some()
    }

    pub fn active_connector(&self, ecosystem: Ecosystem) -> Option<Connector> {
        if ecosystem == Ecosystem::Evm && self.is_multisig() {
            return self.registry.multisig().cloned();
        }
        let id = self.inner.borrow().slot(ecosystem).connector.clone()?;
        self.registry.get(&id).cloned()
    }

    pub fn evm_chain_id(&self) -> Option<u64> {
        self.inner.borrow().active_chain()
    }

    pub fn network(&self) -> Option<NetworkMetadata> {
        let chain_id = self.evm_chain_id()?;
        Some(self.networks.borrow().lookup(chain_id))
    }

    pub fn lookup_network(&self, chain_id: u64) -> NetworkMetadata {
        self.networks.borrow().lookup(chain_id)
    }

    /// Records a chain the wallet framework reported metadata for.
    pub fn register_chain(&self, descriptor: ChainDescriptor) {
        self.networks.borrow_mut().register(descriptor);
    }

    pub fn solana_network(&self) -> SolanaNetwork {
        self.config.solana_network
    }

    pub fn desired_chain(&self) -> Option<u64> {
        self.inner.borrow().desired_chain
    }

    pub fn set_desired_chain(&self, chain_id: Option<u64>) {
        let events = {
            let mut inner = self.inner.borrow_mut();
            inner.desired_chain = chain_id;
            inner.refresh_mismatch()
        };
        self.emit(events);
    }

    /// `(wallet chain, desired chain)` while they disagree.
    pub fn mismatch(&self) -> Option<(Option<u64>, u64)> {
        self.inner.borrow().mismatch()
    }

    pub fn is_mismatched(&self) -> bool {
        self.mismatch().is_some()
    }

    /// Whether the UI may offer a network switch for the active EVM wallet.
    pub fn can_switch_network(&self) -> bool {
        if self.is_multisig() {
            return false;
        }
        self.active_connector(Ecosystem::Evm)
            .map(|c| c.capabilities().supports_network_switch)
            .unwrap_or(false)
    }

    pub async fn connect(&self, connector_id: &ConnectorId, options: ConnectOptions) -> ConnectOutcome {
        let connector = match self.registry.get(connector_id) {
            Some(connector) => connector.clone(),
            None => return ConnectOutcome::Failed(Error::UnknownConnector(connector_id.clone())),
        };
        let capabilities = connector.capabilities();

        if !capabilities.direct_connect {
            return ConnectOutcome::Failed(Error::ConnectorUnavailable(format!(
                "{} cannot be connected directly",
                connector.display_name
            )));
        }

        let provider = match connector.provider() {
            Some(provider) if connector.ready() => provider,
            _ => {
                return ConnectOutcome::Failed(Error::ConnectorUnavailable(format!(
                    "{} is not ready",
                    connector.display_name
                )))
            }
        };

        if capabilities.requires_modal_flow && options.email.is_none() {
            return ConnectOutcome::Failed(Error::ModalFlowRequired(connector.id.clone()));
        }

        let ecosystem = connector.ecosystem();
        let (attempt, chain_id) = {
            let mut inner = self.inner.borrow_mut();
            inner.next_attempt += 1;
            let attempt = inner.next_attempt;
            let slot = inner.slot_mut(ecosystem);
            slot.latest_attempt = Some(attempt);
            slot.in_flight += 1;
            let chain_id = match ecosystem {
                Ecosystem::Evm => inner.desired_chain,
                Ecosystem::Solana => None,
            };
            (attempt, chain_id)
        };

        info!(target: ANALYTICS_TARGET, "wallet_connected_attempt connector={}", connector.id);
        let result = provider.connect(ConnectRequest { chain_id, email: options.email }).await;
        self.resolve_connect(&connector, attempt, result).await
    }

    async fn resolve_connect(
        &self,
        connector: &Connector,
        attempt: u64,
        result: Result<ProviderConnection, ProviderError>,
    ) -> ConnectOutcome {
        let ecosystem = connector.ecosystem();
        let superseded = {
            let mut inner = self.inner.borrow_mut();
            let slot = inner.slot_mut(ecosystem);
            slot.in_flight = slot.in_flight.saturating_sub(1);
            let latest = slot.latest_attempt == Some(attempt);
            if latest {
                slot.latest_attempt = None;
            }
            !latest && self.config.connect_ordering == ConnectOrdering::LatestAttempt
        };

        let connection = match result {
            Ok(connection) if superseded => {
                debug!("Dropping superseded connection {} from {}", connection.account, connector.id);
                return ConnectOutcome::Superseded;
            }
            Ok(connection) if connection.account.ecosystem() != ecosystem => {
                return self.connect_failed(
                    connector,
                    Error::ConnectorUnavailable(format!(
                        "{} returned a {} account",
                        connector.display_name,
                        connection.account.ecosystem()
                    )),
                );
            }
            Ok(connection) => connection,
            Err(ProviderError::NotSelected) => {
                debug!("No wallet selected for {}", connector.id);
                return ConnectOutcome::NotSelected;
            }
            Err(err) => return self.connect_failed(connector, err.into()),
        };

        let account = connection.account;
        let (previous, mut events) = {
            let mut inner = self.inner.borrow_mut();
            let slot = inner.slot_mut(ecosystem);
            let previous = slot.connector.replace(connector.id.clone()).filter(|id| id != &connector.id);
            slot.account = Some(account);

            let mut events = vec![event::Event::Connected { ecosystem, account }];
            if ecosystem == Ecosystem::Evm {
                inner.multisig = None;
                inner.wallet_chain = connection.chain_id;
                if let Some(chain_id) = connection.chain_id {
                    events.push(event::Event::ChainChanged(chain_id));
                }
                events.extend(inner.refresh_mismatch());
            }
            (previous, events)
        };

        self.save_hint(ecosystem, &connector.id, Some(account), connection.chain_id);
        info!(target: ANALYTICS_TARGET, "wallet_connected connector={}", connector.id);

        if let Some(previous) = previous {
            debug!("Replacing connector {previous} with {}", connector.id);
            if let Some(provider) = self.registry.get(&previous).and_then(|c| c.provider()) {
                if let Err(err) = provider.disconnect().await {
                    warn!("Failed to disconnect previous connector {previous}: {err}");
                }
            }
        }

        events.insert(0, event::Event::AccountsChanged(vec![account]));
        self.emit(events);
        ConnectOutcome::Connected(account)
    }

    fn connect_failed(&self, connector: &Connector, err: Error) -> ConnectOutcome {
        error!("Failed to connect {}: {err}", connector.id);
        info!(target: ANALYTICS_TARGET, "wallet_connected_fail connector={}", connector.id);
        self.notify(event::Event::ConnectFailed {
            connector: connector.id.clone(),
            reason: err.to_string(),
        });
        ConnectOutcome::Failed(err)
    }

    /// Clears the active account of `ecosystem`.
    ///
    /// With a safe composed, `keep_previous` steps back to the personal
    /// wallet. Otherwise it controls whether the next page load reconnects.
    pub async fn disconnect(&self, ecosystem: Ecosystem, keep_previous: bool) -> Result<(), Error> {
        if ecosystem == Ecosystem::Evm && keep_previous {
            let events = {
                let mut inner = self.inner.borrow_mut();
                match inner.multisig.take() {
                    Some(multisig) => {
                        let mut events =
                            vec![event::Event::AccountsChanged(vec![Account::Evm(multisig.personal)])];
                        if let Some(chain_id) = inner.wallet_chain {
                            events.push(event::Event::ChainChanged(chain_id));
                        }
                        events.extend(inner.refresh_mismatch());
                        Some(events)
                    }
                    None => None,
                }
            };

            if let Some(events) = events {
                debug!("Switched back to personal wallet");
                self.emit(events);
                return Ok(());
            }
        }

        let (connector, events) = {
            let mut inner = self.inner.borrow_mut();
            let connector = inner.drop_account(ecosystem);
            let events = inner.refresh_mismatch();
            (connector, events)
        };

        if !keep_previous {
            if let Err(err) = self.hints.clear(ecosystem) {
                warn!("Failed to clear reconnect hint: {err}");
            }
        }

        let connector = match connector {
            Some(connector) => connector,
            None => return Ok(()),
        };

        if let Some(provider) = self.registry.get(&connector).and_then(|c| c.provider()) {
            if let Err(err) = provider.disconnect().await {
                error!("Failed to disconnect {connector}: {err}");
            }
        }

        let mut all = vec![event::Event::Disconnected { ecosystem }];
        all.extend(events);
        self.emit(all);
        Ok(())
    }

    /// Reconnects from stored hints, as on a fresh page load. Connectors that
    /// need user input are never reconnected silently.
    pub async fn restore(&self) -> Vec<(Ecosystem, ConnectOutcome)> {
        let mut outcomes = Vec::new();

        for ecosystem in Ecosystem::ALL {
            let hint = match self.hints.load(ecosystem) {
                Ok(Some(hint)) => hint,
                Ok(None) => continue,
                Err(err) => {
                    warn!("Discarding unreadable reconnect hint for {ecosystem}: {err}");
                    if let Err(err) = self.hints.clear(ecosystem) {
                        warn!("Failed to clear reconnect hint: {err}");
                    }
                    continue;
                }
            };

            if self.inner.borrow().slot(ecosystem).account.is_some() {
                continue;
            }

            let eligible = self
                .registry
                .get(&hint.connector_id)
                .map(|c| c.ready() && c.capabilities().auto_reconnect)
                .unwrap_or(false);
            if !eligible {
                debug!("Not reconnecting {} for {ecosystem}", hint.connector_id);
                continue;
            }

            debug!("Reconnecting {} for {ecosystem}", hint.connector_id);
            let outcome = self.connect(&hint.connector_id, ConnectOptions::default()).await;
            outcomes.push((ecosystem, outcome));
        }

        outcomes
    }

    /// Asks the wallet to change chains. Connectors that cannot switch, and
    /// composed safes, are refused up front.
    pub async fn switch_network(&self, chain_id: u64) -> Result<(), Error> {
        let (connector_id, multisig) = {
            let inner = self.inner.borrow();
            (inner.evm.connector.clone(), inner.multisig.is_some())
        };
        let connector_id = connector_id.ok_or(Error::NotConnected)?;
        if multisig {
            return Err(Error::NetworkSwitchUnsupported);
        }

        let connector = self
            .registry
            .get(&connector_id)
            .ok_or_else(|| Error::UnknownConnector(connector_id.clone()))?;
        if !connector.capabilities().supports_network_switch {
            return Err(Error::NetworkSwitchUnsupported);
        }
        let provider = connector
            .provider()
            .ok_or_else(|| Error::ConnectorUnavailable(connector.display_name.clone()))?;

        provider.switch_chain(chain_id).await.map_err(|err| {
            warn!("Failed to switch {connector_id} to chain {chain_id}: {err}");
            Error::from(err)
        })?;

        self.apply_chain(chain_id);
        Ok(())
    }

    /// Feeds a provider notification into the session.
    pub fn handle_wallet_event(&self, ecosystem: Ecosystem, wallet_event: WalletEvent) {
        match wallet_event {
            WalletEvent::ChainChanged(chain_id) if ecosystem == Ecosystem::Evm => {
                self.apply_chain(chain_id)
            }
            WalletEvent::ChainChanged(_) => debug!("Ignoring chain change for {ecosystem}"),
            WalletEvent::AccountsChanged(accounts) => self.apply_accounts(ecosystem, &accounts),
            WalletEvent::Disconnected => self.drop_by_wallet(ecosystem),
        }
    }

    fn apply_chain(&self, chain_id: u64) {
        let events = {
            let mut inner = self.inner.borrow_mut();
            if inner.evm.account.is_none() {
                return;
            }
            let changed = inner.wallet_chain != Some(chain_id);
            inner.wallet_chain = Some(chain_id);

            let mut events = Vec::new();
            if changed && inner.multisig.is_none() {
                events.push(event::Event::ChainChanged(chain_id));
            }
            events.extend(inner.refresh_mismatch());
            events
        };
        self.emit(events);
    }

    fn apply_accounts(&self, ecosystem: Ecosystem, raw: &[String]) {
        let accounts = raw
            .iter()
            .filter_map(|value| match Account::parse(ecosystem, value) {
                Ok(account) => Some(account),
                Err(err) => {
                    warn!("Ignoring malformed {ecosystem} account {value}: {err}");
                    None
                }
            })
            .collect::<Vec<_>>();

        let first = match accounts.first() {
            Some(first) => *first,
            None if raw.is_empty() => return self.drop_by_wallet(ecosystem),
            None => return,
        };

        let (events, hint) = {
            let mut inner = self.inner.borrow_mut();
            let slot = inner.slot_mut(ecosystem);
            if slot.account.is_none() || slot.account == Some(first) {
                return;
            }
            slot.account = Some(first);
            let hint = slot.connector.clone();

            let mut events = Vec::new();
            if ecosystem == Ecosystem::Evm && inner.multisig.take().is_some() {
                debug!("Personal wallet changed, dropping composed safe");
                events.extend(inner.refresh_mismatch());
            }
            events.insert(0, event::Event::AccountsChanged(accounts));
            (events, hint.map(|id| (id, inner.wallet_chain)))
        };

        if let Some((connector_id, chain_id)) = hint {
            self.save_hint(ecosystem, &connector_id, Some(first), chain_id);
        }
        self.emit(events);
    }

    fn drop_by_wallet(&self, ecosystem: Ecosystem) {
        let (connector, events) = {
            let mut inner = self.inner.borrow_mut();
            let connector = inner.drop_account(ecosystem);
            (connector, inner.refresh_mismatch())
        };
        if connector.is_none() {
            return;
        }

        debug!("Wallet ended the {ecosystem} session");
        if let Err(err) = self.hints.clear(ecosystem) {
            warn!("Failed to clear reconnect hint: {err}");
        }
        let mut all = vec![event::Event::Disconnected { ecosystem }];
        all.extend(events);
        self.emit(all);
    }

    /// Derives a multisig account from the connected personal wallet. No
    /// wallet handshake happens; the personal wallet has to be on the safe's
    /// chain already.
    pub fn compose_multisig(
        &self,
        safe_address: &str,
        safe_chain_id: u64,
    ) -> Result<MultisigAccount, Error> {
        if self.registry.multisig().is_none() {
            return Err(Error::ConnectorUnavailable("no multisig connector registered".to_string()));
        }

        let (personal, wallet_chain) = {
            let inner = self.inner.borrow();
            (inner.evm.account.and_then(|a| a.as_evm().copied()), inner.wallet_chain)
        };

        let multisig = {
            let networks = self.networks.borrow();
            let personal = personal.ok_or(Error::NotConnected)?;
            compose_multisig_account(personal, safe_address, safe_chain_id, &networks)?
        };

        if wallet_chain != Some(safe_chain_id) {
            return Err(Error::NetworkMismatch { wallet: wallet_chain, desired: safe_chain_id });
        }

        let events = {
            let mut inner = self.inner.borrow_mut();
            inner.multisig = Some(multisig);
            let mut events = vec![
                event::Event::MultisigConnected { safe: multisig.safe, chain_id: safe_chain_id },
                event::Event::AccountsChanged(vec![Account::Evm(multisig.safe)]),
            ];
            events.extend(inner.refresh_mismatch());
            events
        };

        info!(target: ANALYTICS_TARGET, "wallet_connected connector=gnosis");
        self.emit(events);
        Ok(multisig)
    }

    /// Forwards a JSON-RPC request to the active EVM wallet. Signing and
    /// sending are refused while the wallet is on the wrong chain.
    pub async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, Error> {
        let (connector_id, mismatch) = {
            let inner = self.inner.borrow();
            (inner.evm.connector.clone(), inner.mismatch())
        };
        let connector_id = connector_id.ok_or(Error::NotConnected)?;

        if let Some((wallet, desired)) = mismatch {
            let mutating = method.parse::<Method>().map(|m| m.is_mutating()).unwrap_or(false);
            if mutating {
                return Err(Error::NetworkMismatch { wallet, desired });
            }
        }

        let provider = self
            .registry
            .get(&connector_id)
            .and_then(|c| c.provider())
            .ok_or_else(|| Error::UnknownConnector(connector_id.clone()))?;

        Ok(provider.request(method, params).await?)
    }

    fn save_hint(
        &self,
        ecosystem: Ecosystem,
        connector_id: &ConnectorId,
        account: Option<Account>,
        chain_id: Option<u64>,
    ) {
        let chain = match ecosystem {
            Ecosystem::Evm => chain_id.map(Chain::Eip155),
            Ecosystem::Solana => Some(Chain::Solana(self.config.solana_network)),
        };
        let account = match (chain, account) {
            (Some(chain), Some(account)) => SessionAccount::new(chain, account).ok(),
            _ => None,
        };

        if let Err(err) = self.hints.save(ecosystem, &ReconnectHint::new(connector_id.clone(), account)) {
            warn!("Failed to store reconnect hint: {err}");
        }
    }

    fn emit(&self, events: impl IntoIterator<Item = event::Event>) {
        for event in events {
            self.notify(event);
        }
    }

    fn notify(&self, event: event::Event) {
        if let Some(l) = &self.listener {
            l(event);
        }
    }
}
