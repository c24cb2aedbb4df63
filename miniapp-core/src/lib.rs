pub mod chains;
pub mod environment;
pub mod error;
pub mod format;
pub mod host;
pub mod neynar;
pub mod resolver;
pub mod user;

pub use error::HostError;
pub use resolver::{resolve_user, MountGuard};
pub use user::{FarcasterUser, Location, Transition, UserViewModel};
