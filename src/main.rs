use clap::Parser;

use goalcast::cli::{Cli, run};
use goalcast::config::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);
    run(cli).await
}
