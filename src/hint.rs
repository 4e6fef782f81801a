use std::{cell::RefCell, collections::HashMap, rc::Rc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    domain::{ConnectorId, Ecosystem},
    metadata::SessionAccount,
};

#[derive(Debug, thiserror::Error)]
pub enum HintStoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Corrupted(#[from] serde_json::Error),
}

/// What the next page load needs to silently reconnect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconnectHint {
    pub connector_id: ConnectorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<SessionAccount>,
    pub saved_at: DateTime<Utc>,
}

impl ReconnectHint {
    pub fn new(connector_id: ConnectorId, account: Option<SessionAccount>) -> Self {
        Self { connector_id, account, saved_at: Utc::now() }
    }
}

pub trait HintStore {
    fn load(&self, ecosystem: Ecosystem) -> Result<Option<ReconnectHint>, HintStoreError>;
    fn save(&self, ecosystem: Ecosystem, hint: &ReconnectHint) -> Result<(), HintStoreError>;
    fn clear(&self, ecosystem: Ecosystem) -> Result<(), HintStoreError>;
}

/// Storage key a hint is kept under.
pub fn storage_key(ecosystem: Ecosystem) -> String {
    format!("wallet-session.{ecosystem}.reconnect")
}

/// In-process store. Clones share the same entries, which lets tests simulate
/// a reload by handing the store to a fresh session.
#[derive(Debug, Clone, Default)]
pub struct MemoryHintStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryHintStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HintStore for MemoryHintStore {
    fn load(&self, ecosystem: Ecosystem) -> Result<Option<ReconnectHint>, HintStoreError> {
        match self.entries.borrow().get(&storage_key(ecosystem)) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, ecosystem: Ecosystem, hint: &ReconnectHint) -> Result<(), HintStoreError> {
        let raw = serde_json::to_string(hint)?;
        self.entries.borrow_mut().insert(storage_key(ecosystem), raw);
        Ok(())
    }

    fn clear(&self, ecosystem: Ecosystem) -> Result<(), HintStoreError> {
        self.entries.borrow_mut().remove(&storage_key(ecosystem));
        Ok(())
    }
}

/// Hints kept in the browser's `localStorage`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageHintStore;

#[cfg(target_arch = "wasm32")]
impl HintStore for LocalStorageHintStore {
    fn load(&self, ecosystem: Ecosystem) -> Result<Option<ReconnectHint>, HintStoreError> {
        use gloo::storage::{errors::StorageError, LocalStorage, Storage};

        match LocalStorage::get::<ReconnectHint>(storage_key(ecosystem)) {
            Ok(hint) => Ok(Some(hint)),
            Err(StorageError::KeyNotFound(_)) => Ok(None),
            Err(StorageError::SerdeError(err)) => Err(err.into()),
            Err(err) => Err(HintStoreError::Unavailable(err.to_string())),
        }
    }

    fn save(&self, ecosystem: Ecosystem, hint: &ReconnectHint) -> Result<(), HintStoreError> {
        use gloo::storage::{LocalStorage, Storage};

        LocalStorage::set(storage_key(ecosystem), hint)
            .map_err(|err| HintStoreError::Unavailable(err.to_string()))
    }

    fn clear(&self, ecosystem: Ecosystem) -> Result<(), HintStoreError> {
        use gloo::storage::{LocalStorage, Storage};

        LocalStorage::delete(storage_key(ecosystem));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Account, EvmAddress},
        metadata::Chain,
    };

    #[test]
    fn test_memory_store_shared_between_clones() {
        let store = MemoryHintStore::new();
        let reloaded = store.clone();
        let address: EvmAddress = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse().unwrap();
        let hint = ReconnectHint::new(
            ConnectorId::from("metamask"),
            Some(SessionAccount::new(Chain::Eip155(1), Account::Evm(address)).unwrap()),
        );

        store.save(Ecosystem::Evm, &hint).unwrap();
        assert_eq!(reloaded.load(Ecosystem::Evm).unwrap(), Some(hint));
        assert_eq!(reloaded.load(Ecosystem::Solana).unwrap(), None);

        reloaded.clear(Ecosystem::Evm).unwrap();
        assert_eq!(store.load(Ecosystem::Evm).unwrap(), None);
    }

    #[test]
    fn test_corrupted_entry() {
        let store = MemoryHintStore::new();
        store.entries.borrow_mut().insert(storage_key(Ecosystem::Evm), "{".to_string());
        assert!(matches!(store.load(Ecosystem::Evm), Err(HintStoreError::Corrupted(_))));
    }
}
