use crate::error::HostError;
use crate::host::MiniAppHost;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEnvironment {
    MiniApp,
    Browser,
}

pub async fn detect<H>(host: &H) -> Result<HostEnvironment, HostError>
where
    H: MiniAppHost + ?Sized,
{
    if host.is_in_mini_app().await? {
        Ok(HostEnvironment::MiniApp)
    } else {
        Ok(HostEnvironment::Browser)
    }
}
