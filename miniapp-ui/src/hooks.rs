use crate::bridge::{JsHost, JsWallet};
use leptos::*;
use miniapp_core::host::{MiniAppHost, SessionContext, WalletConnector};
use miniapp_core::neynar::NeynarView;
use miniapp_core::{resolve_user, MountGuard, UserViewModel};
use wasm_bindgen_futures::spawn_local;

/// Identity state shared by every view under `App`.
#[derive(Clone, Copy)]
pub struct UserContext {
    pub user: RwSignal<UserViewModel>,
    pub session: RwSignal<Option<SessionContext>>,
    pub wallet: JsWallet,
}

/// Starts user resolution and makes the result available through
/// [`use_user`]. Resolution re-runs whenever the wallet account changes; a
/// run superseded by a newer one, or outliving the owning view, is discarded.
pub fn provide_user(host: JsHost, wallet: JsWallet) -> UserContext {
    let user = create_rw_signal(UserViewModel::default());
    let session = create_rw_signal(None::<SessionContext>);
    let current = store_value(None::<MountGuard>);
    let account = wallet.account_memo();

    create_effect(move |_| {
        let account = account.get();
        let guard = MountGuard::new();
        if let Some(previous) = current.get_value() {
            previous.unmount();
        }
        current.set_value(Some(guard.clone()));

        spawn_local(async move {
            resolve_user(&host, &account, &guard, |t| user.update(|vm| vm.transition(t))).await;
        });
    });

    create_effect(move |_| {
        if user.with(|vm| vm.is_mini_app && !vm.is_loading) && session.with_untracked(Option::is_none) {
            spawn_local(async move {
                if let Ok(context) = host.context().await {
                    session.set(Some(context));
                }
            });
        }
    });

    on_cleanup(move || {
        if let Some(guard) = current.get_value() {
            guard.unmount();
        }
    });

    let ctx = UserContext {
        user,
        session,
        wallet,
    };
    provide_context(ctx);
    ctx
}

pub fn use_user_context() -> UserContext {
    expect_context::<UserContext>()
}

pub fn use_user() -> ReadSignal<UserViewModel> {
    use_user_context().user.read_only()
}

pub fn use_neynar() -> Signal<NeynarView> {
    let ctx = use_user_context();
    Signal::derive(move || {
        ctx.user
            .with(|vm| NeynarView::from_session(vm, ctx.session.get()))
    })
}
