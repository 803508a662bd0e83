//! geowx - classify drawn map regions by historical weather.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "geowx",
    version,
    about = "Polygon weather classification toolkit"
)]
struct Cli {
    #[command(flatten)]
    options: geowx_cmd::GlobalOptions,

    #[command(subcommand)]
    command: geowx_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    geowx_cmd::run(cli.options, cli.command).await
}
