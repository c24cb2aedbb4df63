//! Seams to the two identity sources: the embedding client's miniapp SDK and
//! the browser wallet connector. Both run on the single-threaded event loop,
//! so neither trait requires `Send`.

use crate::error::HostError;
use crate::user::FarcasterUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    #[serde(default)]
    pub client_fid: Option<u64>,
    #[serde(default)]
    pub added: bool,
}

/// Session context object handed over by the host client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    #[serde(default)]
    pub user: Option<FarcasterUser>,
    #[serde(default)]
    pub client: Option<ClientInfo>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostResponse {
    pub status: u16,
    pub body: String,
}

impl HostResponse {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddMiniAppOutcome {
    pub added: bool,
}

#[async_trait(?Send)]
pub trait MiniAppHost {
    async fn is_in_mini_app(&self) -> Result<bool, HostError>;

    async fn context(&self) -> Result<SessionContext, HostError>;

    /// GET `path` on the app's own origin with the host's bearer session token.
    async fn quick_auth_fetch(&self, path: &str) -> Result<HostResponse, HostError>;

    /// Tells the host the app has rendered and its splash screen can go.
    async fn ready(&self) -> Result<(), HostError>;

    async fn add_mini_app(&self) -> Result<AddMiniAppOutcome, HostError>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalletAccount {
    pub address: Option<String>,
    pub is_connected: bool,
}

impl WalletAccount {
    pub fn connected_address(&self) -> Option<String> {
        if self.is_connected {
            self.address.clone()
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectorInfo {
    pub id: String,
    pub name: String,
}

#[async_trait(?Send)]
pub trait WalletConnector {
    /// Current account state. Cheap, read on every render.
    fn account(&self) -> WalletAccount;

    fn connectors(&self) -> Vec<ConnectorInfo>;

    async fn connect(&self, connector_id: &str) -> Result<WalletAccount, HostError>;

    async fn disconnect(&self) -> Result<(), HostError>;
}
