use anyhow::Result;
use treedoc::{cli::init_logging, cli::parse_restore_args, run_restore};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = parse_restore_args()?;
    init_logging(config.verbosity);
    run_restore(&config).await?;
    Ok(())
}
