//! Handler as type: constructed once with its dependencies, called directly.

use async_trait::async_trait;

use crate::ddd::Command;

/// Handler for command `C`. The outcome comes back as a typed `Result`; nothing is thrown across
/// a queue boundary.
#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Command + 'static,
{
    type Output;
    type Error;

    async fn handle(&self, cmd: C) -> Result<Self::Output, Self::Error>;
}
