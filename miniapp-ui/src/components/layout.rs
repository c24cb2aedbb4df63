use crate::bridge;
use crate::components::button::{Button, ButtonSize, ButtonVariant};
use crate::components::wallet::{disconnect, ConnectorButtons};
use crate::hooks::use_user_context;
use leptos::*;
use miniapp_core::format::{short_address, truncate_address};
use miniapp_core::host::WalletConnector;
use std::time::Duration;
use tracing::error;
use wasm_bindgen_futures::spawn_local;
use web_sys::MouseEvent;

pub const APP_TITLE: &str = "Farcaster Miniapp";

const COPIED_RESET: Duration = Duration::from_secs(2);

#[component]
pub fn Banner() -> impl IntoView {
    view! {
      <div class="banner">
        <a href="https://minidev.fun" target="_blank" rel="noopener">
          <span class="meta">"Made with"</span>
          <img src="/minidev-logo.png" alt="MiniDev Logo" width="96" height="24" />
        </a>
      </div>
    }
}

#[component]
fn MiniAppIdentity() -> impl IntoView {
    let user = use_user_context().user;
    move || {
        user.with(|vm| {
            let address = vm.address.clone()?;
            let label = vm
                .label()
                .map(ToString::to_string)
                .unwrap_or_else(|| format!("@{}", vm.username.clone().unwrap_or_default()));
            Some(view! {
              <div class="identity">
                <span class="name">{label}</span>
                <span class="mono meta">{short_address(&address)}</span>
              </div>
            })
        })
    }
}

#[component]
fn WalletControls() -> impl IntoView {
    let wallet = use_user_context().wallet;
    let copied = create_rw_signal(false);

    let copy = move |address: String| {
        spawn_local(async move {
            match bridge::copy_to_clipboard(&address).await {
                Ok(()) => {
                    copied.set(true);
                    set_timeout(move || copied.set(false), COPIED_RESET);
                }
                Err(err) => error!(%err, "failed to copy"),
            }
        });
    };

    move || match wallet.account().connected_address() {
        Some(address) => {
            let for_copy = address.clone();
            view! {
              <div class="row">
                <div class="address-chip">
                  <span class="mono meta">{truncate_address(&address, 6)}</span>
                  <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Icon
                    title="Copy address"
                    on_click=move |_: MouseEvent| copy(for_copy.clone())
                  >
                    {move || if copied.get() { "✓" } else { "⧉" }}
                  </Button>
                </div>
                <Button
                  variant=ButtonVariant::Destructive
                  size=ButtonSize::Sm
                  on_click=move |_: MouseEvent| disconnect(wallet)
                >
                  "Disconnect"
                </Button>
              </div>
            }
            .into_view()
        }
        None => view! { <ConnectorButtons size=ButtonSize::Sm compact=true /> }.into_view(),
    }
}

#[component]
pub fn Navbar() -> impl IntoView {
    let user = use_user_context().user;

    view! {
      <nav class="navbar">
        <h1 class="title">{APP_TITLE}</h1>
        <div class="row">
          <Show when=move || user.with(|vm| vm.is_mini_app) fallback=|| view! { <WalletControls /> }>
            <MiniAppIdentity />
          </Show>
        </div>
      </nav>
    }
}

#[component]
pub fn Footer() -> impl IntoView {
    view! {
      <footer class="footer">
        <p class="meta">"Build Farcaster miniapps with AI"</p>
      </footer>
    }
}

#[component]
pub fn Layout(children: Children) -> impl IntoView {
    view! {
      <div class="layout">
        <Banner />
        <Navbar />
        <main class="main">{children()}</main>
        <Footer />
      </div>
    }
}
