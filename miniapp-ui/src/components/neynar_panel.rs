use crate::bridge::JsHost;
use crate::components::button::Button;
use crate::hooks::{use_neynar, use_user_context};
use leptos::*;
use miniapp_core::host::SessionContext;
use miniapp_core::neynar::add_mini_app;
use wasm_bindgen_futures::spawn_local;
use web_sys::MouseEvent;

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

#[component]
pub fn NeynarPanel() -> impl IntoView {
    let ctx = use_user_context();
    let neynar = use_neynar();

    let add = move |_: MouseEvent| {
        let state = neynar.get_untracked();
        spawn_local(async move {
            let outcome = add_mini_app(&JsHost, &state).await;
            if outcome.added {
                ctx.session.update(|session| {
                    let session = session.get_or_insert_with(SessionContext::default);
                    session.client.get_or_insert_with(Default::default).added = true;
                });
            }
        });
    };

    move || {
        let state = neynar.get();
        if !state.is_sdk_loaded {
            return view! {
              <div class="card">
                <h3>"Neynar SDK"</h3>
                <p class="meta">
                  "Neynar SDK is not loaded. This feature is only available in Farcaster miniapps."
                </p>
              </div>
            }
            .into_view();
        }

        let context_json = state.context_json();
        view! {
          <div class="card stack">
            <h3>"Neynar SDK Integration"</h3>
            <div class="meta">
              <p>"SDK Loaded: " {yes_no(state.is_sdk_loaded)}</p>
              <p>"App Installed: " {yes_no(state.is_installed)}</p>
            </div>
            {context_json.map(|json| view! { <pre class="context">{json}</pre> })}
            {if state.is_installed {
                view! { <p class="meta">"This mini app is installed on your home screen"</p> }.into_view()
            } else {
                view! { <Button class="wide" on_click=add>"Add Mini App to Home"</Button> }.into_view()
            }}
          </div>
        }
        .into_view()
    }
}
