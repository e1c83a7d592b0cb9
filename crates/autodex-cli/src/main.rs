// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use autodex_app::{AppState, Browser, Catalog};
use autodex_db::Store;
use autodex_source::{Client, DataSource, DirectorySource};
use config::{Config, DataLocation};
use runtime::CatalogRuntime;
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `autodex --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let db_path = config.db_path()?;
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    init_logging(&config)?;

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or AUTODEX_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;

    let location = options
        .data_override
        .clone()
        .unwrap_or_else(|| config.data_location());
    let source = build_source(&location, config.timeout()?).with_context(|| {
        format!(
            "invalid [data] config in {}; fix base_url/data_dir/timeout values",
            options.config_path.display()
        )
    })?;

    let catalog = load_catalog_with_notice(&source, &mut io::stderr())?;
    if options.check_only {
        info!(source = %source, trims = catalog.trim_count(), "startup check passed");
        return Ok(());
    }

    let theme = store.get_theme().unwrap_or_else(|error| {
        warn!(error = format!("{error:#}"), "ignoring stored theme");
        autodex_app::Theme::default()
    });
    let mut state = AppState {
        view: config.default_view(),
        theme,
        ..AppState::default()
    };

    let mut browser = Browser::new(catalog);
    let mut runtime = CatalogRuntime::new(source, &store);
    autodex_tui::run_app(&mut state, &mut browser, &mut runtime)
}

/// The catalog loads before the browser takes over the terminal, so the
/// loading notice goes to `out` and is cleared once the fetch settles.
fn load_catalog_with_notice(source: &DataSource, out: &mut impl Write) -> Result<Catalog> {
    write!(out, "loading catalog from {source}...")?;
    out.flush()?;
    let loaded = source.load_catalog();
    write!(out, "\r\x1b[2K")?;
    out.flush()?;
    match loaded {
        Ok(catalog) => Ok(catalog),
        Err(error) => {
            error!(source = %source, error = format!("{error:#}"), "catalog load failed");
            Err(error).with_context(|| format!("load catalog from {source}"))
        }
    }
}

fn build_source(location: &DataLocation, timeout: Duration) -> Result<DataSource> {
    match location {
        DataLocation::Url(base_url) => Ok(DataSource::Http(Client::new(base_url, timeout)?)),
        DataLocation::Directory(root) => Ok(DataSource::Directory(DirectorySource::new(root)?)),
    }
}

/// Logs go to a file because the browser owns the terminal. `AUTODEX_LOG`
/// overrides the configured level with any `EnvFilter` directive.
fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path()?;
    let file = open_log_file(&path)?;
    let filter = match env::var("AUTODEX_LOG") {
        Ok(directive) if !directive.trim().is_empty() => EnvFilter::try_new(&directive)
            .with_context(|| format!("invalid AUTODEX_LOG filter {directive:?}"))?,
        _ => EnvFilter::try_new(config.log_level())
            .with_context(|| format!("invalid log.level {:?}", config.log_level()))?,
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].path to a writable file",
                path.display()
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    data_override: Option<DataLocation>,
    print_config_path: bool,
    print_db_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        data_override: None,
        print_config_path: false,
        print_db_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--data-dir" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--data-dir requires a directory path"))?;
                set_data_override(
                    &mut options,
                    DataLocation::Directory(PathBuf::from(value.as_ref())),
                )?;
            }
            "--base-url" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--base-url requires a URL"))?;
                set_data_override(&mut options, DataLocation::Url(value.as_ref().to_owned()))?;
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                bail!("unknown argument {unknown:?}; run with --help to see supported options");
            }
        }
    }

    Ok(options)
}

fn set_data_override(options: &mut CliOptions, location: DataLocation) -> Result<()> {
    if options.data_override.is_some() {
        bail!("pass only one of --data-dir or --base-url");
    }
    options.data_override = Some(location);
    Ok(())
}

fn print_help() {
    println!("autodex");
    println!("  --config <path>          Use a specific config path");
    println!("  --data-dir <path>        Read the catalog from a local export");
    println!("  --base-url <url>         Read the catalog from this server root");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config, database, and catalog, then exit");
    println!("  --help                   Show this help");
}
