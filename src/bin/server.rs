use anyhow::{Context, Result};
use clap::Parser;
use htmlshot::server::DEFAULT_BODY_LIMIT;
use htmlshot::{ChromeRenderer, RenderConfig, UploadHandler, UploadServer, WebhookForwarder, DEFAULT_QUALITY, WEBHOOK_URL_ENV};

/// Accept HTML uploads on POST /upload, render them and post the screenshot
/// to the webhook in DISCORD_WEBHOOK_URL.
#[derive(Parser, Debug)]
#[command(name = "htmlshot-server", version, about)]
struct Args {
    /// Interface to listen on
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Screenshot quality; 100 renders a lossless PNG, lower values JPEG
    #[arg(short, long, default_value_t = DEFAULT_QUALITY, value_parser = clap::value_parser!(u8).range(0..=100))]
    quality: u8,

    /// Largest accepted upload body in bytes
    #[arg(long, default_value_t = DEFAULT_BODY_LIMIT)]
    max_body_bytes: u64,

    /// Run Chrome without its sandbox (needed when running as root)
    #[arg(long)]
    no_sandbox: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let args = Args::parse();

    let renderer = ChromeRenderer::new(RenderConfig {
        quality: args.quality,
        sandbox: !args.no_sandbox,
        ..Default::default()
    });
    let handler = UploadHandler::new(renderer, WebhookForwarder::from_env()).with_body_limit(args.max_body_bytes);

    let server = UploadServer::bind((args.host.as_str(), args.port), handler)
        .with_context(|| format!("Failed to listen on {}:{}", args.host, args.port))?;

    // Read again per request, so this is only a hint
    if std::env::var(WEBHOOK_URL_ENV).map_or(true, |v| v.trim().is_empty()) {
        log::warn!("{} is not set; uploads will fail until it is", WEBHOOK_URL_ENV);
    }

    log::info!("htmlshot-server v{} starting", env!("CARGO_PKG_VERSION"));
    println!("Listening on port {}...", args.port);
    server.run();
    Ok(())
}
