use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use ssrlink::subconverter::{load_config, plan_profiles, render_table, ProfileEntry, Shortener};

pub struct Options<'a> {
    pub config: &'a Path,
    pub shorten: bool,
    pub copy: bool,
}

pub fn run(opts: Options) -> Result<()> {
    info!("Loading configuration: {}", opts.config.display());
    let config = load_config(opts.config).context("Failed to load configuration")?;
    let entries = plan_profiles(&config).context("Failed to build profile URLs")?;
    info!("{} profile URLs generated", entries.len());

    let short_urls = if opts.shorten {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Error initializing Tokio runtime")?;
        let shortener = Shortener::new(config.subconverter.shortener.as_str())
            .context("Failed to create shortener client")?;
        runtime.block_on(async {
            tokio::select! {
                res = shorten_all(&shortener, &entries) => res,
                _ = tokio::signal::ctrl_c() => Err(anyhow::anyhow!("Interrupted")),
            }
        })?
    } else {
        vec![String::new(); entries.len()]
    };

    let table = render_table(entries.iter().zip(short_urls.iter().map(String::as_str)));
    println!("{}", table);

    if opts.copy {
        copy_to_clipboard(&table);
    }
    Ok(())
}

async fn shorten_all(shortener: &Shortener, entries: &[ProfileEntry]) -> Result<Vec<String>> {
    let mut short_urls = Vec::with_capacity(entries.len());
    for entry in entries {
        let short_url = shortener
            .shorten(entry.url.as_str())
            .await
            .with_context(|| format!("Failed to shorten {} {} URL", entry.service, entry.kind))?;
        short_urls.push(short_url);
    }
    Ok(short_urls)
}

fn copy_to_clipboard(text: &str) {
    match set_clipboard_text(text) {
        Ok(()) => info!("Table copied to clipboard"),
        Err(e) => warn!(
            "Failed to copy to clipboard, copy the table above manually: {}",
            e
        ),
    }
}

/// X11 and Wayland selections disappear with their owner, so block until
/// another program takes the clipboard over.
#[cfg(target_os = "linux")]
fn set_clipboard_text(text: &str) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;

    let mut clipboard = arboard::Clipboard::new()?;
    info!("Serving the table on the clipboard until it is replaced");
    clipboard.set().wait().text(text)
}

#[cfg(not(target_os = "linux"))]
fn set_clipboard_text(text: &str) -> Result<(), arboard::Error> {
    arboard::Clipboard::new()?.set_text(text)
}
