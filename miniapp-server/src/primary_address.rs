use api_contract::{validate_primary_address, MeResponse, PrimaryAddressResponse};
use async_trait::async_trait;
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "https://api.farcaster.xyz";

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("primary address transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("primary address lookup returned {0}")]
    Invalid(String),
}

#[async_trait]
pub trait AddressLookup: Send + Sync + 'static {
    /// Ethereum primary address of `fid`, `None` when the lookup has none.
    async fn primary_address(&self, fid: u64) -> Result<Option<String>, LookupError>;
}

pub struct FarcasterApi {
    http: reqwest::Client,
    base_url: String,
}

impl FarcasterApi {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AddressLookup for FarcasterApi {
    async fn primary_address(&self, fid: u64) -> Result<Option<String>, LookupError> {
        let url = format!("{}/fc/primary-address", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("fid", fid.to_string().as_str()), ("protocol", "ethereum")])
            .send()
            .await?;

        if !resp.status().is_success() {
            debug!(fid, status = %resp.status(), "no primary address");
            return Ok(None);
        }

        let body: PrimaryAddressResponse = resp.json().await?;
        let address = validate_primary_address(&body, fid).map_err(LookupError::Invalid)?;
        Ok(Some(address.to_string()))
    }
}

/// Builds the `/api/me` body for an authenticated fid. Lookup failures only
/// drop the address.
pub async fn resolve_user(lookup: &dyn AddressLookup, fid: u64) -> MeResponse {
    let primary_address = match lookup.primary_address(fid).await {
        Ok(address) => address,
        Err(err) => {
            warn!(fid, %err, "error resolving user");
            None
        }
    };
    MeResponse {
        fid,
        primary_address,
    }
}
