//! Handler for the `refresh` command.

use crate::app::Advisor;
use crate::cli::output;
use crate::config::Config;
use crate::error::Result;

/// Drop cached market data.
pub async fn execute(config: Config) -> Result<()> {
    let advisor = Advisor::open(config).await?;
    advisor.refresh()?;
    output::note("Market caches cleared; the next query refetches.");
    Ok(())
}
