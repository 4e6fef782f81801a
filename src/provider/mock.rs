use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
};

use async_trait::async_trait;
use futures::channel::oneshot;

use super::{ConnectRequest, ProviderConnection, ProviderError, WalletProvider};

type ConnectResult = Result<ProviderConnection, ProviderError>;

enum Scripted {
    Now(ConnectResult),
    Later(oneshot::Receiver<ConnectResult>),
}

/// Provider whose handshakes are scripted by the test.
#[derive(Default)]
pub(crate) struct MockProvider {
    ready: Cell<bool>,
    connects: RefCell<VecDeque<Scripted>>,
    switch_error: RefCell<Option<ProviderError>>,
    pub connect_calls: Cell<usize>,
    pub disconnect_calls: Cell<usize>,
    pub switch_calls: Cell<usize>,
    pub request_calls: Cell<usize>,
    pub last_request: RefCell<Option<ConnectRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        let provider = Self::default();
        provider.ready.set(true);
        provider
    }

    pub fn unready() -> Self {
        Self::default()
    }

    pub fn respond(&self, result: ConnectResult) -> &Self {
        self.connects.borrow_mut().push_back(Scripted::Now(result));
        self
    }

    /// Queues a handshake that resolves when the returned sender fires.
    pub fn defer(&self) -> oneshot::Sender<ConnectResult> {
        let (tx, rx) = oneshot::channel();
        self.connects.borrow_mut().push_back(Scripted::Later(rx));
        tx
    }

    pub fn fail_switch(&self, error: ProviderError) {
        *self.switch_error.borrow_mut() = Some(error);
    }
}

#[async_trait(?Send)]
impl WalletProvider for MockProvider {
    async fn connect(&self, request: ConnectRequest) -> Result<ProviderConnection, ProviderError> {
        self.connect_calls.set(self.connect_calls.get() + 1);
        *self.last_request.borrow_mut() = Some(request);
        let scripted = self.connects.borrow_mut().pop_front();
        match scripted {
            Some(Scripted::Now(result)) => result,
            Some(Scripted::Later(rx)) => rx.await.unwrap_or(Err(ProviderError::Disconnected)),
            None => Err(ProviderError::Unavailable("nothing scripted".to_string())),
        }
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        self.disconnect_calls.set(self.disconnect_calls.get() + 1);
        Ok(())
    }

    async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ProviderError> {
        self.request_calls.set(self.request_calls.get() + 1);
        Ok(serde_json::json!({ "method": method, "params": params }))
    }

    async fn switch_chain(&self, _chain_id: u64) -> Result<(), ProviderError> {
        self.switch_calls.set(self.switch_calls.get() + 1);
        match self.switch_error.borrow_mut().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn is_ready(&self) -> bool {
        self.ready.get()
    }
}
