use std::net::SocketAddr;

use anyhow::Context as _;
use clap::Parser;

use class10::app::routes::router;
use class10::app::state::AppState;
use class10::cli::StorageArgs;
use class10::commands::Services;

#[derive(Debug, Parser)]
#[command(author, version, about = "Serve the student and admin pages")]
struct AppArgs {
    #[arg(long, env = "CLASS10_ADDR", default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    #[command(flatten)]
    storage: StorageArgs,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    class10::logging::init_with_default(class10::logging::APP_DEFAULT_FILTER)?;

    let args = AppArgs::parse();
    tracing::info!(
        addr = %args.addr,
        data_dir = %args.storage.data_dir.display(),
        fallback = %args.storage.fallback,
        "starting class10-app"
    );

    let services = Services::from_args(&args.storage).context("set up storage")?;
    let app = router(AppState::new(services));

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {}: {err}", args.addr))?;
    tracing::info!(addr = %args.addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
