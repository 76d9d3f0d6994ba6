use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use htmlshot::{ChromeRenderer, RenderConfig, Renderer, Viewport, DEFAULT_QUALITY};

/// Render an HTML file to an image with headless Chrome.
#[derive(Parser, Debug)]
#[command(name = "htmlshot", version, about)]
struct Args {
    /// HTML file to render
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the image (overwritten if it exists)
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,

    /// Screenshot quality; 100 writes a lossless PNG, lower values JPEG
    #[arg(short, long, default_value_t = DEFAULT_QUALITY, value_parser = clap::value_parser!(u8).range(0..=100))]
    quality: u8,

    /// Initial window width
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Initial window height
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Run Chrome without its sandbox (needed when running as root)
    #[arg(long)]
    no_sandbox: bool,
}

fn run(args: &Args) -> Result<()> {
    let input = std::fs::canonicalize(&args.input)
        .with_context(|| format!("Cannot open input {}", args.input.display()))?;
    if !input.is_file() {
        bail!("Input {} is not a file", input.display());
    }

    let renderer = ChromeRenderer::new(RenderConfig {
        viewport: Viewport {
            width: args.width,
            height: args.height,
        },
        quality: args.quality,
        sandbox: !args.no_sandbox,
    });

    log::info!("Rendering {}", input.display());
    let image = renderer
        .render_file(&input)
        .with_context(|| format!("Failed to render {}", input.display()))?;

    std::fs::write(&args.output, &image)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    log::info!("Wrote {} bytes", image.len());
    println!("Screenshot saved to {}", args.output.display());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
