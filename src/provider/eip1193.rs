use std::rc::Rc;

use async_trait::async_trait;
use js_sys::{Function, Object, Promise, Reflect};
use log::{debug, error};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use super::{
    format_chain_id, parse_chain_id, ConnectRequest, ProviderConnection, ProviderError,
    WalletProvider, CODE_UNRECOGNIZED_CHAIN,
};
use crate::{
    config::SessionConfig,
    connector::{ConnectorKind, ProviderFactory},
    domain::{Account, Ecosystem},
};

/// Browser-injected provider found at `window.ethereum`.
#[derive(Clone)]
pub struct InjectedProvider {
    ethereum: Option<Object>,
}

impl InjectedProvider {
    pub fn detect() -> Self {
        let window = JsValue::from(gloo_utils::window());
        let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum"))
            .ok()
            .filter(|value| !value.is_undefined() && !value.is_null())
            .and_then(|value| value.dyn_into::<Object>().ok());

        if ethereum.is_none() {
            debug!("No injected provider found");
        }

        Self { ethereum }
    }

    pub fn is_metamask(&self) -> bool {
        self.flag("isMetaMask")
    }

    pub fn is_coinbase_wallet(&self) -> bool {
        self.flag("isCoinbaseWallet")
    }

    fn flag(&self, name: &str) -> bool {
        self.ethereum
            .as_ref()
            .and_then(|eth| Reflect::get(eth, &JsValue::from_str(name)).ok())
            .and_then(|value| value.as_bool())
            .unwrap_or(false)
    }

    async fn raw_request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ProviderError> {
        let ethereum = self
            .ethereum
            .as_ref()
            .ok_or_else(|| ProviderError::Unavailable("no injected provider".to_string()))?;

        let request = Object::new();
        Reflect::set(&request, &JsValue::from_str("method"), &JsValue::from_str(method))
            .map_err(js_error)?;
        if let Some(params) = params {
            let value = params
                .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
                .map_err(|err| ProviderError::Unavailable(err.to_string()))?;
            Reflect::set(&request, &JsValue::from_str("params"), &value).map_err(js_error)?;
        }

        let function = Reflect::get(ethereum, &JsValue::from_str("request"))
            .map_err(js_error)?
            .dyn_into::<Function>()
            .map_err(js_error)?;
        let promise = function
            .call1(ethereum, &request)
            .map_err(js_error)?
            .dyn_into::<Promise>()
            .map_err(js_error)?;
        let result = JsFuture::from(promise).await.map_err(js_error)?;

        if result.is_undefined() || result.is_null() {
            return Ok(serde_json::Value::Null);
        }

        serde_wasm_bindgen::from_value(result)
            .map_err(|err| ProviderError::Rpc { code: -32700, message: err.to_string() })
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        let value = self.raw_request("eth_chainId", None).await?;
        value
            .as_str()
            .and_then(parse_chain_id)
            .ok_or_else(|| ProviderError::Rpc { code: -32700, message: format!("bad chain id {value}") })
    }
}

#[async_trait(?Send)]
impl WalletProvider for InjectedProvider {
    async fn connect(&self, _request: ConnectRequest) -> Result<ProviderConnection, ProviderError> {
        let accounts = self.raw_request("eth_requestAccounts", None).await?;
        let first = accounts
            .as_array()
            .and_then(|accounts| accounts.first())
            .and_then(|account| account.as_str())
            .ok_or(ProviderError::Unauthorized)?;
        let account = Account::parse(Ecosystem::Evm, first).map_err(|err| {
            error!("Injected provider returned a malformed account: {err}");
            ProviderError::Rpc { code: -32700, message: err.to_string() }
        })?;
        let chain_id = self.chain_id().await?;

        Ok(ProviderConnection { account, chain_id: Some(chain_id) })
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        // Injected wallets keep their own permission list; nothing to revoke.
        Ok(())
    }

    async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ProviderError> {
        self.raw_request(method, params).await
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
        let params = serde_json::json!([{ "chainId": format_chain_id(chain_id) }]);
        match self.raw_request("wallet_switchEthereumChain", Some(params)).await {
            Ok(_) => Ok(()),
            Err(ProviderError::Rpc { code: CODE_UNRECOGNIZED_CHAIN, .. }) => {
                Err(ProviderError::UnrecognizedChain(chain_id))
            }
            Err(err) => Err(err),
        }
    }

    fn is_ready(&self) -> bool {
        self.ethereum.is_some()
    }
}

/// Backs the browser-extension connectors with whatever `window.ethereum`
/// turns out to be.
#[derive(Clone, Default)]
pub struct BrowserProviders;

impl ProviderFactory for BrowserProviders {
    fn provider(
        &self,
        kind: &ConnectorKind,
        _config: &SessionConfig,
    ) -> Option<Rc<dyn WalletProvider>> {
        let injected = InjectedProvider::detect();
        match kind {
            ConnectorKind::MetaMask if injected.is_metamask() => Some(Rc::new(injected)),
            ConnectorKind::CoinbaseWallet if injected.is_coinbase_wallet() => Some(Rc::new(injected)),
            ConnectorKind::Injected => Some(Rc::new(injected)),
            _ => None,
        }
    }
}

fn js_error(value: JsValue) -> ProviderError {
    let code = Reflect::get(&value, &JsValue::from_str("code")).ok().and_then(|c| c.as_f64());
    let message = gloo_utils::errors::JsError::try_from(value.clone())
        .map(|err| err.to_string())
        .ok()
        .or_else(|| {
            Reflect::get(&value, &JsValue::from_str("message")).ok().and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"));

    match code {
        Some(code) => ProviderError::from_code(code as i64, message),
        None => ProviderError::Unavailable(message),
    }
}
