//! Dual-mode user resolution.
//!
//! Inside the Farcaster client the identity comes from the host session
//! context, optionally enriched through `GET /api/me`. In a plain browser it
//! comes from the wallet connector. Either way the outcome is a single
//! [`UserViewModel`] handed to `apply`, unless the owning view unmounted
//! while the resolution was in flight.

use crate::environment::{self, HostEnvironment};
use crate::host::{MiniAppHost, WalletAccount};
use crate::user::{Transition, UserViewModel};
use api_contract::MeResponse;
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, error, warn};

pub const ME_PATH: &str = "/api/me";

pub const NO_USER_ERROR: &str = "Unable to get user data from Farcaster";
pub const HOST_AUTH_ERROR: &str = "Farcaster authentication failed";
pub const INIT_ERROR: &str = "Failed to initialize user data";

/// Liveness flag shared between a mounted view and its in-flight resolution.
#[derive(Clone, Debug)]
pub struct MountGuard(Rc<Cell<bool>>);

impl MountGuard {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_mounted(&self) -> bool {
        self.0.get()
    }

    pub fn unmount(&self) {
        self.0.set(false);
    }
}

impl Default for MountGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one resolution attempt. Returns the settled view-model, or `None`
/// when the guard was unmounted before it could be applied.
pub async fn resolve_user<H, F>(
    host: &H,
    wallet: &WalletAccount,
    guard: &MountGuard,
    mut apply: F,
) -> Option<UserViewModel>
where
    H: MiniAppHost + ?Sized,
    F: FnMut(Transition),
{
    if !guard.is_mounted() {
        return None;
    }
    apply(Transition::Loading);

    match environment::detect(host).await {
        Ok(HostEnvironment::MiniApp) => resolve_mini_app(host, guard, &mut apply).await,
        Ok(HostEnvironment::Browser) => settle(
            guard,
            &mut apply,
            UserViewModel::from_wallet(wallet.connected_address()),
        ),
        Err(err) => {
            error!(%err, "error initializing user");
            settle(guard, &mut apply, UserViewModel::failed(false, INIT_ERROR))
        }
    }
}

async fn resolve_mini_app<H, F>(host: &H, guard: &MountGuard, apply: &mut F) -> Option<UserViewModel>
where
    H: MiniAppHost + ?Sized,
    F: FnMut(Transition),
{
    let context = match host.context().await {
        Ok(context) => context,
        Err(err) => {
            error!(%err, "farcaster authentication failed");
            return settle(guard, apply, UserViewModel::failed(true, HOST_AUTH_ERROR));
        }
    };

    let Some(user) = context.user else {
        return settle(guard, apply, UserViewModel::failed(true, NO_USER_ERROR));
    };
    if !guard.is_mounted() {
        return None;
    }

    let enriched = fetch_primary_address(host).await;
    let resolved = settle(guard, apply, UserViewModel::from_farcaster(user, enriched))?;

    if let Err(err) = host.ready().await {
        warn!(%err, "host ready signal failed");
    }
    Some(resolved)
}

async fn fetch_primary_address<H>(host: &H) -> Option<String>
where
    H: MiniAppHost + ?Sized,
{
    let response = match host.quick_auth_fetch(ME_PATH).await {
        Ok(response) => response,
        Err(err) => {
            warn!(%err, "failed to fetch additional user data from API");
            return None;
        }
    };
    if !response.is_ok() {
        debug!(status = response.status, "user enrichment skipped");
        return None;
    }
    match serde_json::from_str::<MeResponse>(&response.body) {
        Ok(me) => me.primary_address,
        Err(err) => {
            warn!(%err, "failed to decode additional user data");
            None
        }
    }
}

fn settle<F>(guard: &MountGuard, apply: &mut F, view: UserViewModel) -> Option<UserViewModel>
where
    F: FnMut(Transition),
{
    if !guard.is_mounted() {
        return None;
    }
    apply(Transition::Settled(view.clone()));
    Some(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::host::{AddMiniAppOutcome, HostResponse, SessionContext};
    use crate::user::FarcasterUser;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use std::cell::RefCell;

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Step {
        Context,
        Fetch,
    }

    struct FakeHost {
        in_mini_app: Result<bool, HostError>,
        context: Result<SessionContext, HostError>,
        me: Result<HostResponse, HostError>,
        ready_calls: Cell<usize>,
        fetch_calls: Cell<usize>,
        unmount_at: Option<(Step, MountGuard)>,
    }

    impl FakeHost {
        fn mini_app(user: Option<FarcasterUser>) -> Self {
            Self {
                in_mini_app: Ok(true),
                context: Ok(SessionContext { user, client: None }),
                me: Ok(HostResponse {
                    status: 200,
                    body: r#"{"fid":7,"primaryAddress":"0xfrom-api"}"#.into(),
                }),
                ready_calls: Cell::new(0),
                fetch_calls: Cell::new(0),
                unmount_at: None,
            }
        }

        fn browser() -> Self {
            Self {
                in_mini_app: Ok(false),
                ..Self::mini_app(None)
            }
        }

        fn hit(&self, step: Step) {
            if let Some((at, guard)) = &self.unmount_at {
                if *at == step {
                    guard.unmount();
                }
            }
        }
    }

    #[async_trait(?Send)]
    impl MiniAppHost for FakeHost {
        async fn is_in_mini_app(&self) -> Result<bool, HostError> {
            self.in_mini_app.clone()
        }

        async fn context(&self) -> Result<SessionContext, HostError> {
            self.hit(Step::Context);
            self.context.clone()
        }

        async fn quick_auth_fetch(&self, path: &str) -> Result<HostResponse, HostError> {
            assert_eq!(path, ME_PATH);
            self.fetch_calls.set(self.fetch_calls.get() + 1);
            self.hit(Step::Fetch);
            self.me.clone()
        }

        async fn ready(&self) -> Result<(), HostError> {
            self.ready_calls.set(self.ready_calls.get() + 1);
            Ok(())
        }

        async fn add_mini_app(&self) -> Result<AddMiniAppOutcome, HostError> {
            Ok(AddMiniAppOutcome { added: true })
        }
    }

    fn alice() -> FarcasterUser {
        FarcasterUser {
            fid: 7,
            username: Some("alice".into()),
            display_name: Some("Alice".into()),
            ..FarcasterUser::default()
        }
    }

    fn run(host: &FakeHost, wallet: WalletAccount, guard: &MountGuard) -> (Option<UserViewModel>, Vec<Transition>) {
        let seen = RefCell::new(Vec::new());
        let out = block_on(resolve_user(host, &wallet, guard, |t| seen.borrow_mut().push(t)));
        (out, seen.into_inner())
    }

    #[test]
    fn mini_app_user_is_resolved_and_enriched() {
        let host = FakeHost::mini_app(Some(alice()));
        let (out, seen) = run(&host, WalletAccount::default(), &MountGuard::new());

        let vm = out.expect("settled");
        assert!(vm.is_mini_app);
        assert!(!vm.is_loading);
        assert_eq!(vm.fid, Some(7));
        assert_eq!(vm.username.as_deref(), Some("alice"));
        assert_eq!(vm.address.as_deref(), Some("0xfrom-api"));
        assert_eq!(seen, vec![Transition::Loading, Transition::Settled(vm)]);
        assert_eq!(host.ready_calls.get(), 1);
    }

    #[test]
    fn enrichment_failure_falls_back_to_context() {
        let mut host = FakeHost::mini_app(Some(FarcasterUser {
            primary_address: Some("0xcontext".into()),
            ..alice()
        }));
        host.me = Err(HostError::Call("network down".into()));
        let (out, _) = run(&host, WalletAccount::default(), &MountGuard::new());

        let vm = out.expect("settled");
        assert_eq!(vm.address.as_deref(), Some("0xcontext"));
        assert_eq!(vm.error, None);
        assert_eq!(host.ready_calls.get(), 1);
    }

    #[test]
    fn unauthorized_enrichment_is_ignored() {
        let mut host = FakeHost::mini_app(Some(alice()));
        host.me = Ok(HostResponse {
            status: 401,
            body: r#"{"error":"Invalid token"}"#.into(),
        });
        let (out, _) = run(&host, WalletAccount::default(), &MountGuard::new());

        let vm = out.expect("settled");
        assert_eq!(vm.address, None);
        assert_eq!(vm.error, None);
    }

    #[test]
    fn mini_app_without_user_reports_error() {
        let host = FakeHost::mini_app(None);
        let (out, _) = run(&host, WalletAccount::default(), &MountGuard::new());

        let vm = out.expect("settled");
        assert!(vm.is_mini_app);
        assert!(!vm.is_loading);
        assert_eq!(vm.error.as_deref(), Some(NO_USER_ERROR));
        assert_eq!(host.fetch_calls.get(), 0);
        assert_eq!(host.ready_calls.get(), 0);
    }

    #[test]
    fn context_failure_is_surfaced() {
        let mut host = FakeHost::mini_app(None);
        host.context = Err(HostError::Call("context rejected".into()));
        let (out, _) = run(&host, WalletAccount::default(), &MountGuard::new());

        let vm = out.expect("settled");
        assert!(vm.is_mini_app);
        assert_eq!(vm.error.as_deref(), Some(HOST_AUTH_ERROR));
    }

    #[test]
    fn detection_failure_is_surfaced() {
        let mut host = FakeHost::browser();
        host.in_mini_app = Err(HostError::Unavailable("no sdk".into()));
        let (out, _) = run(&host, WalletAccount::default(), &MountGuard::new());

        let vm = out.expect("settled");
        assert!(!vm.is_mini_app);
        assert!(!vm.is_loading);
        assert_eq!(vm.error.as_deref(), Some(INIT_ERROR));
    }

    #[test]
    fn browser_without_wallet_has_no_address() {
        let host = FakeHost::browser();
        let (out, _) = run(&host, WalletAccount::default(), &MountGuard::new());

        let vm = out.expect("settled");
        assert!(!vm.is_mini_app);
        assert!(!vm.is_loading);
        assert_eq!(vm.address, None);
        assert_eq!(host.fetch_calls.get(), 0);
    }

    #[test]
    fn browser_uses_connected_wallet() {
        let host = FakeHost::browser();
        let wallet = WalletAccount {
            address: Some("0xwallet".into()),
            is_connected: true,
        };
        let (out, _) = run(&host, wallet, &MountGuard::new());

        assert_eq!(out.and_then(|vm| vm.address).as_deref(), Some("0xwallet"));
    }

    #[test]
    fn unmount_during_context_read_discards_result() {
        let guard = MountGuard::new();
        let mut host = FakeHost::mini_app(Some(alice()));
        host.unmount_at = Some((Step::Context, guard.clone()));
        let (out, seen) = run(&host, WalletAccount::default(), &guard);

        assert_eq!(out, None);
        assert_eq!(seen, vec![Transition::Loading]);
        assert_eq!(host.fetch_calls.get(), 0);
        assert_eq!(host.ready_calls.get(), 0);
    }

    #[test]
    fn unmount_during_enrichment_discards_result() {
        let guard = MountGuard::new();
        let mut host = FakeHost::mini_app(Some(alice()));
        host.unmount_at = Some((Step::Fetch, guard.clone()));
        let (out, seen) = run(&host, WalletAccount::default(), &guard);

        assert_eq!(out, None);
        assert_eq!(seen, vec![Transition::Loading]);
        assert_eq!(host.ready_calls.get(), 0);
    }

    #[test]
    fn unmounted_guard_applies_nothing() {
        let guard = MountGuard::new();
        guard.unmount();
        let (out, seen) = run(&FakeHost::browser(), WalletAccount::default(), &guard);

        assert_eq!(out, None);
        assert!(seen.is_empty());
    }
}
