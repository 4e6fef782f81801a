use super::domain::{Account, ConnectorId, Ecosystem, EvmAddress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Connected { ecosystem: Ecosystem, account: Account },
    Disconnected { ecosystem: Ecosystem },
    ChainChanged(u64),
    AccountsChanged(Vec<Account>),
    NetworkMismatch { wallet: Option<u64>, desired: u64 },
    MismatchResolved,
    MultisigConnected { safe: EvmAddress, chain_id: u64 },
    ConnectFailed { connector: ConnectorId, reason: String },
}
