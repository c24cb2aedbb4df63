//! Typed wrappers over the JavaScript globals the page exposes: the Farcaster
//! miniapp SDK (published by `index.html` as `window.__FARCASTER_MINIAPP_SDK__`)
//! and EIP-1193 wallet providers.

use async_trait::async_trait;
use js_sys::{Array, Function, Promise, Reflect};
use leptos::*;
use miniapp_core::chains::default_chain;
use miniapp_core::host::{
    AddMiniAppOutcome, ConnectorInfo, HostResponse, MiniAppHost, SessionContext, WalletAccount,
    WalletConnector,
};
use miniapp_core::HostError;
use serde::Serialize;
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

const SDK_GLOBAL: &str = "__FARCASTER_MINIAPP_SDK__";

pub const FARCASTER_CONNECTOR: &str = "farcaster";
pub const INJECTED_CONNECTOR: &str = "injected";

fn js_error(value: JsValue) -> HostError {
    let name = Reflect::get(&value, &JsValue::from_str("name"))
        .ok()
        .and_then(|n| n.as_string())
        .unwrap_or_default();
    if name.ends_with("RejectedByUser") {
        return HostError::RejectedByUser;
    }
    let message = Reflect::get(&value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"));
    HostError::Call(message)
}

fn global(name: &str) -> Option<JsValue> {
    let window = web_sys::window()?;
    let value = Reflect::get(&window, &JsValue::from_str(name)).ok()?;
    (!value.is_undefined() && !value.is_null()).then_some(value)
}

fn property(target: &JsValue, path: &[&str]) -> Result<JsValue, HostError> {
    let mut current = target.clone();
    for key in path {
        current = Reflect::get(&current, &JsValue::from_str(key))
            .map_err(|_| HostError::Unavailable(format!("failed to access {key}")))?;
        if current.is_undefined() || current.is_null() {
            return Err(HostError::Unavailable(format!("{key} is not defined")));
        }
    }
    Ok(current)
}

/// Calls `target[name](...args)` and awaits the result if it is a promise.
async fn call_method(target: &JsValue, name: &str, args: &[JsValue]) -> Result<JsValue, HostError> {
    let method = property(target, &[name])?
        .dyn_into::<Function>()
        .map_err(|_| HostError::Unavailable(format!("{name} is not a function")))?;
    let argv: Array = args.iter().collect();
    let result = method.apply(target, &argv).map_err(js_error)?;
    JsFuture::from(Promise::resolve(&result))
        .await
        .map_err(js_error)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, HostError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| HostError::Decode(e.to_string()))
}

fn sdk() -> Result<JsValue, HostError> {
    global(SDK_GLOBAL).ok_or_else(|| HostError::Unavailable("miniapp SDK not loaded".into()))
}

/// The miniapp SDK of the embedding Farcaster client.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsHost;

#[async_trait(?Send)]
impl MiniAppHost for JsHost {
    async fn is_in_mini_app(&self) -> Result<bool, HostError> {
        let Some(sdk) = global(SDK_GLOBAL) else {
            debug!("miniapp SDK global missing, assuming plain browser");
            return Ok(false);
        };
        let value = call_method(&sdk, "isInMiniApp", &[]).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn context(&self) -> Result<SessionContext, HostError> {
        let pending = property(&sdk()?, &["context"])?;
        let value = JsFuture::from(Promise::resolve(&pending))
            .await
            .map_err(js_error)?;
        serde_wasm_bindgen::from_value(value).map_err(|e| HostError::Decode(e.to_string()))
    }

    async fn quick_auth_fetch(&self, path: &str) -> Result<HostResponse, HostError> {
        let quick_auth = property(&sdk()?, &["quickAuth"])?;
        let response = call_method(&quick_auth, "fetch", &[JsValue::from_str(path)]).await?;
        let status = property(&response, &["status"])?
            .as_f64()
            .ok_or_else(|| HostError::Decode("response status is not a number".into()))?;
        let body = call_method(&response, "text", &[])
            .await?
            .as_string()
            .unwrap_or_default();
        Ok(HostResponse {
            status: status as u16,
            body,
        })
    }

    async fn ready(&self) -> Result<(), HostError> {
        let actions = property(&sdk()?, &["actions"])?;
        call_method(&actions, "ready", &[]).await.map(|_| ())
    }

    async fn add_mini_app(&self) -> Result<AddMiniAppOutcome, HostError> {
        let actions = property(&sdk()?, &["actions"])?;
        call_method(&actions, "addMiniApp", &[]).await?;
        Ok(AddMiniAppOutcome { added: true })
    }
}

fn provider(connector_id: &str) -> Result<JsValue, HostError> {
    match connector_id {
        FARCASTER_CONNECTOR => property(&sdk()?, &["wallet", "ethProvider"]),
        INJECTED_CONNECTOR => global("ethereum")
            .ok_or_else(|| HostError::Unavailable("no injected wallet".into())),
        other => Err(HostError::Unavailable(format!("unknown connector {other}"))),
    }
}

async fn request(provider: &JsValue, body: serde_json::Value) -> Result<JsValue, HostError> {
    call_method(provider, "request", &[to_js(&body)?]).await
}

async fn request_accounts(provider: &JsValue, method: &str) -> Result<Vec<String>, HostError> {
    let accounts = request(provider, serde_json::json!({ "method": method })).await?;
    serde_wasm_bindgen::from_value(accounts).map_err(|e| HostError::Decode(e.to_string()))
}

async fn switch_to_default_chain(provider: &JsValue) -> Result<(), HostError> {
    let chain_id = format!("{:#x}", default_chain().id);
    request(
        provider,
        serde_json::json!({
            "method": "wallet_switchEthereumChain",
            "params": [{ "chainId": chain_id }],
        }),
    )
    .await
    .map(|_| ())
}

/// Wallet connection state, held in a signal so views and the user resolver
/// react to connects and disconnects.
#[derive(Clone, Copy)]
pub struct JsWallet {
    account: RwSignal<WalletAccount>,
    connector: RwSignal<Option<String>>,
}

impl JsWallet {
    pub fn new() -> Self {
        Self {
            account: create_rw_signal(WalletAccount::default()),
            connector: create_rw_signal(None),
        }
    }

    /// The current account, notifying readers only when its value changes.
    pub fn account_memo(&self) -> Memo<WalletAccount> {
        let account = self.account;
        create_memo(move |_| account.get())
    }

    /// Native balance of `address` in wei, read through the active connector.
    pub async fn balance(&self, address: &str) -> Result<u128, HostError> {
        let connector = self
            .connector
            .get_untracked()
            .ok_or_else(|| HostError::Unavailable("no wallet connected".into()))?;
        let value = request(
            &provider(&connector)?,
            serde_json::json!({ "method": "eth_getBalance", "params": [address, "latest"] }),
        )
        .await?;
        let hex = value
            .as_string()
            .ok_or_else(|| HostError::Decode("balance is not a string".into()))?;
        u128::from_str_radix(hex.trim_start_matches("0x"), 16)
            .map_err(|e| HostError::Decode(e.to_string()))
    }

    /// Picks up an already-authorized account without prompting.
    pub async fn restore(&self) {
        for connector in self.connectors() {
            let Ok(provider) = provider(&connector.id) else {
                continue;
            };
            match request_accounts(&provider, "eth_accounts").await {
                Ok(accounts) => {
                    if let Some(address) = accounts.into_iter().next() {
                        self.connector.set(Some(connector.id.clone()));
                        self.account.set(WalletAccount {
                            address: Some(address),
                            is_connected: true,
                        });
                        return;
                    }
                }
                Err(err) => debug!(%err, connector = %connector.id, "no account to restore"),
            }
        }
    }
}

#[async_trait(?Send)]
impl WalletConnector for JsWallet {
    fn account(&self) -> WalletAccount {
        self.account.get()
    }

    fn connectors(&self) -> Vec<ConnectorInfo> {
        let mut out = Vec::new();
        if provider(FARCASTER_CONNECTOR).is_ok() {
            out.push(ConnectorInfo {
                id: FARCASTER_CONNECTOR.into(),
                name: "Farcaster Wallet".into(),
            });
        }
        if provider(INJECTED_CONNECTOR).is_ok() {
            out.push(ConnectorInfo {
                id: INJECTED_CONNECTOR.into(),
                name: "Browser Wallet".into(),
            });
        }
        out
    }

    async fn connect(&self, connector_id: &str) -> Result<WalletAccount, HostError> {
        let provider = provider(connector_id)?;
        let accounts = request_accounts(&provider, "eth_requestAccounts").await?;
        if let Err(err) = switch_to_default_chain(&provider).await {
            debug!(%err, chain = default_chain().name, "chain switch declined");
        }
        self.connector.set(Some(connector_id.to_string()));
        let account = WalletAccount {
            is_connected: !accounts.is_empty(),
            address: accounts.into_iter().next(),
        };
        self.account.set(account.clone());
        Ok(account)
    }

    async fn disconnect(&self) -> Result<(), HostError> {
        self.connector.set(None);
        self.account.set(WalletAccount::default());
        Ok(())
    }
}

pub async fn copy_to_clipboard(text: &str) -> Result<(), HostError> {
    let clipboard = global("navigator")
        .ok_or_else(|| HostError::Unavailable("navigator not available".into()))
        .and_then(|nav| property(&nav, &["clipboard"]))?;
    call_method(&clipboard, "writeText", &[JsValue::from_str(text)])
        .await
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn account_memo_ignores_identical_updates() {
        let runtime = create_runtime();
        let wallet = JsWallet::new();
        let account = wallet.account_memo();
        let runs = Rc::new(Cell::new(0));
        let observed = {
            let runs = runs.clone();
            create_memo(move |_| {
                runs.set(runs.get() + 1);
                account.get()
            })
        };
        let connected = WalletAccount {
            address: Some("0xabc".into()),
            is_connected: true,
        };

        observed.get();
        assert_eq!(runs.get(), 1);

        wallet.account.set(WalletAccount::default());
        observed.get();
        assert_eq!(runs.get(), 1);

        wallet.account.set(connected.clone());
        assert_eq!(observed.get(), connected);
        assert_eq!(runs.get(), 2);

        wallet.account.set(connected);
        observed.get();
        assert_eq!(runs.get(), 2);

        runtime.dispose();
    }
}
