#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use chrono::Local;
    use spaced_review::{Tracker, TrackerConfig, http_api};
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spaced_review=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let addr: SocketAddr = std::env::var("SPACED_REVIEW_HTTP_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()?;

    let config = match std::env::var("SPACED_REVIEW_CONFIG") {
        Ok(path) => TrackerConfig::from_json_file(path)?,
        Err(_) => TrackerConfig::default(),
    };
    let tracker = Tracker::open(config, Local::now().date_naive())?;

    println!("spaced-review HTTP API listening on http://{addr}");
    http_api::serve(addr, tracker).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
