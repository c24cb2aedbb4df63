//! Host SDK state exposed to the "add to home" panel. Outside the miniapp
//! everything reads as unloaded and no host call is ever made.

use crate::error::HostError;
use crate::host::{AddMiniAppOutcome, MiniAppHost, SessionContext};
use crate::user::UserViewModel;
use tracing::{error, info, warn};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NeynarView {
    pub is_sdk_loaded: bool,
    pub context: Option<SessionContext>,
    pub is_installed: bool,
}

impl NeynarView {
    pub fn from_session(user: &UserViewModel, context: Option<SessionContext>) -> Self {
        if !user.is_mini_app {
            return Self::default();
        }
        let is_installed = context
            .as_ref()
            .and_then(|c| c.client.as_ref())
            .is_some_and(|client| client.added);
        Self {
            is_sdk_loaded: context.is_some(),
            context,
            is_installed,
        }
    }

    pub fn context_json(&self) -> Option<String> {
        self.context
            .as_ref()
            .and_then(|c| serde_json::to_string_pretty(c).ok())
    }
}

pub async fn add_mini_app<H>(host: &H, view: &NeynarView) -> AddMiniAppOutcome
where
    H: MiniAppHost + ?Sized,
{
    if !view.is_sdk_loaded {
        warn!("miniapp SDK not loaded");
        return AddMiniAppOutcome::default();
    }
    match host.add_mini_app().await {
        Ok(outcome) => {
            info!(added = outcome.added, "mini app add request sent");
            outcome
        }
        Err(HostError::RejectedByUser) => {
            info!("user cancelled adding mini app");
            AddMiniAppOutcome::default()
        }
        Err(err) => {
            error!(%err, "error adding mini app");
            AddMiniAppOutcome::default()
        }
    }
}
