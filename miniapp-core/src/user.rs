use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// User as described by the host's session context.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarcasterUser {
    pub fid: u64,
    #[serde(default)]
    pub primary_address: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub pfp_url: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
}

/// Unified identity consumed by the UI, whichever source it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserViewModel {
    pub address: Option<String>,
    pub fid: Option<u64>,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub pfp_url: Option<String>,
    pub location: Option<Location>,
    pub is_mini_app: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for UserViewModel {
    fn default() -> Self {
        Self {
            address: None,
            fid: None,
            username: None,
            display_name: None,
            pfp_url: None,
            location: None,
            is_mini_app: false,
            is_loading: true,
            error: None,
        }
    }
}

impl UserViewModel {
    pub fn from_farcaster(user: FarcasterUser, enriched_address: Option<String>) -> Self {
        Self {
            address: user.primary_address.or(enriched_address),
            fid: Some(user.fid),
            username: user.username,
            display_name: user.display_name,
            pfp_url: user.pfp_url,
            location: user.location,
            is_mini_app: true,
            is_loading: false,
            error: None,
        }
    }

    pub fn from_wallet(address: Option<String>) -> Self {
        Self {
            address,
            is_mini_app: false,
            is_loading: false,
            ..Self::default()
        }
    }

    pub fn failed(is_mini_app: bool, message: impl Into<String>) -> Self {
        Self {
            is_mini_app,
            is_loading: false,
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Name shown in the navbar: display name, then username.
    pub fn label(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.username.as_deref())
    }

    pub fn transition(&mut self, transition: Transition) {
        match transition {
            Transition::Loading => {
                self.is_loading = true;
                self.error = None;
            }
            Transition::Settled(next) => *self = next,
        }
    }
}

/// A state change emitted by the resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Loading,
    Settled(UserViewModel),
}
