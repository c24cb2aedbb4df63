use crate::bridge::{JsHost, JsWallet};
use crate::components::layout::Layout;
use crate::components::neynar_panel::NeynarPanel;
use crate::components::tabs::{TabItem, Tabs};
use crate::components::wallet::ConnectWallet;
use crate::hooks::provide_user;
use leptos::*;
use wasm_bindgen_futures::spawn_local;

fn tabs() -> Vec<TabItem> {
    vec![
        TabItem {
            id: "tab1",
            title: "Tab1",
            content: ViewFn::from(|| {
                view! {
                  <div class="stack">
                    <h1>"Tab 1 Content"</h1>
                    <NeynarPanel />
                  </div>
                }
            }),
        },
        TabItem {
            id: "tab2",
            title: "Tab2",
            content: ViewFn::from(|| {
                view! {
                  <div class="stack">
                    <h1>"Tab 2 Content"</h1>
                    <ConnectWallet />
                  </div>
                }
            }),
        },
    ]
}

#[component]
pub fn App() -> impl IntoView {
    let wallet = JsWallet::new();
    let ctx = provide_user(JsHost, wallet);
    spawn_local(async move { wallet.restore().await });

    let user = ctx.user;
    let error = move || user.with(|vm| vm.error.clone());

    view! {
      <Layout>
        <Show
          when=move || !user.with(|vm| vm.is_loading)
          fallback=|| view! { <div class="center fill">"Loading..."</div> }
        >
          <div class="container">
            <Show when=move || error().is_some() fallback=|| ()>
              <pre class="error">{move || error().unwrap_or_default()}</pre>
            </Show>
            <Tabs tabs=tabs() default_tab="tab1" />
          </div>
        </Show>
      </Layout>
    }
}
