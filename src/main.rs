use book_finder::config::Config;
use book_finder::explorer::{Explorer, HELP};
use book_finder::routes::{router, AppState};
use book_finder::services::client::OpenLibraryClient;
use book_finder::services::controller::Transport;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

async fn serve(config: Arc<Config>, transport: Transport) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("0.0.0.0:{}", config.port);
    let app = router(AppState { transport, config });

    info!("Book finder service starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn explore(config: Arc<Config>, transport: Transport) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = std::io::stdout();
    let mut explorer = Explorer::new(config, transport, stdout.lock());
    explorer.run(BufReader::new(tokio::io::stdin())).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("book_finder=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Arc::new(Config::from_env()?);
    let transport: Transport = Arc::new(OpenLibraryClient::new());

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("--serve") => serve(config, transport).await?,
        Some("--help") | Some("-h") => {
            println!("Usage: book-finder [--serve]\n\n{}", HELP);
        }
        None => explore(config, transport).await?,
        Some(other) => {
            error!("Unknown argument: {}", other);
            info!("Usage: book-finder [--serve]");
            std::process::exit(1);
        }
    }

    Ok(())
}
