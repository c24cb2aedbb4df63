#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chain {
    pub id: u64,
    pub name: &'static str,
    pub rpc_url: &'static str,
    pub testnet: bool,
}

pub const BASE_SEPOLIA: Chain = Chain {
    id: 84532,
    name: "Base Sepolia",
    rpc_url: "https://sepolia.base.org",
    testnet: true,
};

pub const BASE: Chain = Chain {
    id: 8453,
    name: "Base",
    rpc_url: "https://mainnet.base.org",
    testnet: false,
};

/// Supported chains; the first one is the default.
pub const SUPPORTED_CHAINS: [Chain; 2] = [BASE_SEPOLIA, BASE];

pub fn default_chain() -> Chain {
    SUPPORTED_CHAINS[0]
}

pub fn chain_by_id(id: u64) -> Option<Chain> {
    SUPPORTED_CHAINS.iter().copied().find(|c| c.id == id)
}
