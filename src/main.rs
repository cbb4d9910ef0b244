use std::error::Error;

use tracing::{Level, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // `.env` is optional; real environment variables always win.
    let dotenv = dotenvy::dotenv();

    ai_llm_service::telemetry::init("info", Level::INFO);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => info!("no .env file; using process environment"),
        Err(e) => warn!(error = %e, ".env file is invalid; ignoring it"),
    }

    api::start().await?;

    Ok(())
}
