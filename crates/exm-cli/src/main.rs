use anyhow::Result;
use tracing_subscriber::EnvFilter;

use exm_cli::cli::{Cli, Command};
use exm_db::Connection;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::init();

    let conn = Connection::open(&cli.db).await?;
    let config = cli.controller_config();
    let sync = cli.sync_service(&conn);
    match cli.command {
        Command::Init(cmd) => cmd.run(&conn, &cli.db).await,
        Command::Group(cmd) => cmd.run(&conn).await,
        Command::Member(cmd) => cmd.run(&conn).await,
        Command::Category(cmd) => cmd.run(&conn).await,
        Command::Expense(cmd) => cmd.run(&conn).await,
        Command::ListExpenses(cmd) => cmd.run(&conn, sync, config).await,
        Command::Refresh(cmd) => cmd.run(&conn, sync, config).await,
    }?;

    Ok(())
}
