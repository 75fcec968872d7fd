use anyhow::Result;
use treedoc::{cli::init_logging, cli::parse_collect_args, run_collect};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = parse_collect_args()?;
    init_logging(config.verbosity);
    run_collect(&config).await?;
    Ok(())
}
