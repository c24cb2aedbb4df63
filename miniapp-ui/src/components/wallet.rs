use crate::bridge::JsWallet;
use crate::components::button::{Button, ButtonSize, ButtonVariant};
use crate::hooks::use_user_context;
use leptos::*;
use miniapp_core::format::{format_balance, truncate_address};
use miniapp_core::host::WalletConnector;
use tracing::{error, warn};
use wasm_bindgen_futures::spawn_local;
use web_sys::MouseEvent;

pub fn connect(wallet: JsWallet, connector_id: String) {
    spawn_local(async move {
        if let Err(err) = wallet.connect(&connector_id).await {
            warn!(%err, connector = %connector_id, "wallet connection failed");
        }
    });
}

pub fn disconnect(wallet: JsWallet) {
    spawn_local(async move {
        if let Err(err) = wallet.disconnect().await {
            error!(%err, "wallet disconnect failed");
        }
    });
}

/// Button text for a connector; `compact` is the navbar's short form.
pub fn connector_label(name: &str, compact: bool) -> String {
    if compact {
        "Connect".to_string()
    } else {
        format!("Connect {name}")
    }
}

/// One button per available connector.
#[component]
pub fn ConnectorButtons(#[prop(optional)] size: ButtonSize, #[prop(optional)] compact: bool) -> impl IntoView {
    let wallet = use_user_context().wallet;
    wallet
        .connectors()
        .into_iter()
        .map(|connector| {
            let id = connector.id.clone();
            let label = connector_label(&connector.name, compact);
            view! {
              <Button size=size on_click=move |_: MouseEvent| connect(wallet, id.clone())>
                {label}
              </Button>
            }
        })
        .collect_view()
}

#[component]
pub fn ConnectWallet() -> impl IntoView {
    let wallet = use_user_context().wallet;
    let balance = create_local_resource(
        move || wallet.account().connected_address(),
        move |address| async move {
            let address = address?;
            match wallet.balance(&address).await {
                Ok(wei) => Some(format!("{} ETH", format_balance(wei, 18))),
                Err(err) => {
                    warn!(%err, "balance lookup failed");
                    None
                }
            }
        },
    );

    view! {
      <Show
        when=move || wallet.account().is_connected
        fallback=|| view! {
          <div class="card">
            <h2>"Connect Wallet"</h2>
            <div class="stack">
              <ConnectorButtons />
            </div>
          </div>
        }
      >
        <div class="card center">
          <h2>"Wallet Connected"</h2>
          <p class="meta">
            {move || {
                wallet
                    .account()
                    .address
                    .map(|a| truncate_address(&a, 6))
                    .unwrap_or_else(|| "No address connected".to_string())
            }}
          </p>
          <p class="mono">{move || balance.get().flatten()}</p>
          <Button variant=ButtonVariant::Destructive on_click=move |_: MouseEvent| disconnect(wallet)>
            "Disconnect"
          </Button>
        </div>
      </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_label_drops_connector_name() {
        assert_eq!(connector_label("Farcaster Wallet", false), "Connect Farcaster Wallet");
        assert_eq!(connector_label("Farcaster Wallet", true), "Connect");
    }
}
