#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("host SDK unavailable: {0}")]
    Unavailable(String),
    #[error("host call failed: {0}")]
    Call(String),
    #[error("host returned undecodable data: {0}")]
    Decode(String),
    #[error("request rejected by user")]
    RejectedByUser,
}
