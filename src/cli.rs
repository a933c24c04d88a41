//! Command-line harness around [`GanttFilter`].
//!
//! Each subcommand bootstraps a controller for `--root`, performs one
//! operation against the configured API and prints JSON to stdout.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::api::HttpGanttApi;
use crate::behavior::{ItemStore, ResultMode};
use crate::config::FilterConfig;
use crate::controller::GanttFilter;
use crate::query::Query;

#[derive(Parser, Debug)]
#[command(
    name = "gantt-filter",
    version,
    about = "Inspect and manage Gantt filter state against a remote API"
)]
pub struct Cli {
    /// Config file (defaults to ~/.config/gantt-filter/config.toml)
    #[arg(long, global = true, env = "GANTT_FILTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Load option values and show the selection restored from --query
    Options {
        #[arg(long)]
        root: String,
        /// Initial selection in URL query form, e.g. "search=x&donors[]=1"
        #[arg(long, default_value = "")]
        query: String,
    },
    /// List saved presets
    Presets {
        #[arg(long)]
        root: String,
    },
    /// Save the selection given by --query as a named preset
    SavePreset {
        #[arg(long)]
        root: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Delete the preset at --index
    RemovePreset {
        #[arg(long)]
        root: String,
        #[arg(long)]
        index: usize,
    },
    /// Show the parameters a saved preset expands to
    ApplyPreset {
        #[arg(long)]
        root: String,
        #[arg(long)]
        index: usize,
    },
    /// Fetch the dataset, filter it with --query and apply a result mode
    Data {
        #[arg(long)]
        root: String,
        #[arg(long, default_value = "")]
        query: String,
        /// Result mode; defaults to the configured one
        #[arg(long, value_enum)]
        mode: Option<ResultMode>,
    },
}

pub fn parse_cli<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Install the stderr subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "gantt_filter=info",
        1 => "gantt_filter=debug",
        _ => "gantt_filter=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<FilterConfig> {
    let config = FilterConfig::resolve(cli.config.as_deref(), cli.api_url.as_deref())
        .with_context(|| match &cli.config {
            Some(path) => format!("loading config from {}", path.display()),
            None => "loading default config".to_string(),
        })?;
    debug!(base_url = %config.api.base_url, mode = %config.result_mode, "config loaded");
    Ok(config)
}

async fn bootstrap(
    config: &FilterConfig,
    root: &str,
    query: &str,
) -> Result<GanttFilter<HttpGanttApi>> {
    let api = HttpGanttApi::new(&config.api).context("building api client")?;
    let mut filter = GanttFilter::new(api, root).with_result_mode(config.result_mode);
    filter
        .initialize(&Query::from_url_query(query))
        .await
        .with_context(|| format!("initializing filter for root {root}"))?;
    Ok(filter)
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run_with_parsed(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Options { root, query } => {
            let filter = bootstrap(&config, root, query).await?;
            let fields: serde_json::Map<String, serde_json::Value> = filter
                .options()
                .map(|option| (option.name().to_string(), json!(option.available_count())))
                .collect();
            print_json(&json!({
                "root": filter.root_uid(),
                "loading": filter.is_loading(),
                "available": fields,
                "params": filter.params(),
            }))
        }
        Commands::Presets { root } => {
            let filter = bootstrap(&config, root, "").await?;
            print_json(&json!({ "userFilters": filter.user_presets() }))
        }
        Commands::SavePreset { root, name, query } => {
            let mut filter = bootstrap(&config, root, query).await?;
            let index = filter
                .save_user_preset(name.clone())
                .await
                .context("saving preset")?;
            print_json(&json!({ "saved": index, "userFilters": filter.user_presets() }))
        }
        Commands::RemovePreset { root, index } => {
            let mut filter = bootstrap(&config, root, "").await?;
            let removed = filter
                .remove_user_preset(*index)
                .await
                .context("removing preset")?;
            print_json(&json!({ "removed": removed, "userFilters": filter.user_presets() }))
        }
        Commands::ApplyPreset { root, index } => {
            let mut filter = bootstrap(&config, root, "").await?;
            filter.choose_user_preset(Some(*index))?;
            print_json(&json!({
                "preset": filter.active_preset(),
                "params": filter.params(),
                "url": filter.params().to_url_query(),
            }))
        }
        Commands::Data { root, query, mode } => {
            let mut filter = bootstrap(&config, root, query).await?;
            if let Some(mode) = mode {
                filter.set_result_mode(*mode);
            }
            let everything = filter
                .fetch_filtered_data(&Query::new())
                .await
                .context("fetching full dataset")?;
            let items = ItemStore::from_payload(&everything);
            let matching = filter.refresh(&items).await.context("fetching filtered dataset")?;
            print_json(&json!({
                "mode": filter.result_mode(),
                "params": filter.params(),
                "total": items.len(),
                "matching": matching,
                "visible": items.visible_uids(),
                "highlighted": items.highlighted_uids(),
            }))
        }
    }
}
