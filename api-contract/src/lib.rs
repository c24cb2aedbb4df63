use serde::{Deserialize, Serialize};

/// Body of a successful `GET /api/me`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub fid: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_address: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub const MISSING_AUTHORIZATION: &'static str = "Missing or invalid authorization header";
    pub const INVALID_TOKEN: &'static str = "Invalid token";
    pub const AUTHENTICATION_FAILED: &'static str = "Authentication failed";

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressProtocol {
    Ethereum,
    Solana,
}

/// Shape returned by the Farcaster `fc/primary-address` lookup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrimaryAddressResponse {
    pub result: PrimaryAddressResult,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrimaryAddressResult {
    pub address: PrimaryAddress,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrimaryAddress {
    pub fid: u64,
    pub protocol: AddressProtocol,
    pub address: String,
}

pub fn validate_primary_address(
    response: &PrimaryAddressResponse,
    fid: u64,
) -> Result<&str, String> {
    let entry = &response.result.address;
    if entry.fid != fid {
        return Err(format!("lookup answered for fid {} instead of {fid}", entry.fid));
    }
    if entry.protocol != AddressProtocol::Ethereum {
        return Err(format!("unexpected protocol {:?}", entry.protocol));
    }
    if entry.address.trim().is_empty() {
        return Err("address is required".into());
    }
    Ok(&entry.address)
}
