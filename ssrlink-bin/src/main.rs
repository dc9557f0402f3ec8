mod convert;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{arg, value_parser, ArgMatches, Command};
use log::debug;

use ssrlink::{decode_share_link, encode_share_link, SsrRecord};

fn main() -> Result<()> {
    let args = get_args();
    init_log(&args);
    try_main(&args)
}

fn get_args() -> ArgMatches {
    clap::command!("ssrlink")
        .subcommand_required(true)
        .arg(arg!(-v --verbose "Turn on verbose logging").global(true))
        .subcommand(
            Command::new("decode")
                .about("Decode an ssr:// link and print it as JSON")
                .arg(arg!(<LINK> "The ssr:// link to decode")),
        )
        .subcommand(
            Command::new("encode")
                .about("Encode a JSON record into an ssr:// link")
                .arg(arg!([JSON] "The record as JSON. Read from stdin if missing")),
        )
        .subcommand(
            Command::new("table")
                .about("Generate subscription URLs for all services and render them as a Markdown table")
                .arg(
                    arg!(-c --config <PATH> "Path to the configuration file")
                        .value_parser(value_parser!(PathBuf))
                        .required(false)
                        .default_value("subconverter.toml"),
                )
                .arg(arg!(--"no-shorten" "Do not call the link shortener"))
                .arg(arg!(--"no-copy" "Do not copy the table to the clipboard")),
        )
        .get_matches()
}

fn init_log(args: &ArgMatches) {
    let is_verbose = args.get_flag("verbose");
    let colors = fern::colors::ColoredLevelConfig::new();
    let default_level;
    #[cfg(debug_assertions)]
    {
        default_level = log::LevelFilter::Debug;
    }
    #[cfg(not(debug_assertions))]
    {
        default_level = log::LevelFilter::Info;
    }
    let level = if is_verbose {
        log::LevelFilter::Debug
    } else {
        default_level
    };

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S%.3f]"),
                record.target(),
                colors.color(record.level()),
                message
            ))
        })
        .level(level)
        // Keep stdout clean for decoded records, links and tables.
        .chain(std::io::stderr())
        .apply()
        .expect("Cannot set up logger");
}

fn try_main(args: &ArgMatches) -> Result<()> {
    match args.subcommand() {
        Some(("decode", sub)) => {
            let link = sub.get_one::<String>("LINK").expect("LINK is required");
            let record = decode_share_link(link).context("Failed to decode link")?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Some(("encode", sub)) => {
            let json = match sub.get_one::<String>("JSON") {
                Some(json) => json.clone(),
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read record from stdin")?;
                    buf
                }
            };
            let record: SsrRecord = serde_json::from_str(&json).context("Invalid record")?;
            debug!(
                "Encoding {}:{} ({})",
                record.server,
                record.port,
                record.remarks().unwrap_or_default()
            );
            let link = encode_share_link(&record).context("Failed to encode record")?;
            println!("{}", link);
        }
        Some(("table", sub)) => {
            let config = sub
                .get_one::<PathBuf>("config")
                .expect("config has a default value");
            convert::run(convert::Options {
                config,
                shorten: !sub.get_flag("no-shorten"),
                copy: !sub.get_flag("no-copy"),
            })?;
        }
        _ => unreachable!("subcommand is required"),
    }
    Ok(())
}
