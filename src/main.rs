use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

use class10::cli::{Cli, Command};
use class10::commands::{self, Services};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    class10::logging::init().context("init logging")?;

    let cli = Cli::parse();
    tracing::debug!(data_dir = %cli.storage.data_dir.display(), fallback = %cli.storage.fallback, "parsed cli");

    let services = Services::from_args(&cli.storage).context("set up storage")?;

    match cli.command {
        Command::Subjects => commands::subjects(&services).await.context("subjects")?,
        Command::Show(args) => commands::show(&services, args).await.context("show")?,
        Command::ToggleWatched(args) => commands::toggle_watched(&services, args)
            .await
            .context("toggle-watched")?,
        Command::Login(args) => commands::login(&services, args).await.context("login")?,
        Command::Logout => commands::logout(&services).await.context("logout")?,
        Command::Upsert(args) => commands::upsert_content(&services, args)
            .await
            .context("upsert")?,
        Command::Summary => commands::print_summary(&services)
            .await
            .context("summary")?,
        Command::Slug(args) => commands::slug(args),
    }

    Ok(())
}
