use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use kube::config::{KubeConfigOptions, Kubeconfig};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{fmt, layer::SubscriberExt as _};

use crate::ansible::Inventory;
use crate::clusters::ApiNodeLister;
use crate::clusters::access::SecretCredentialResolver;
use crate::config::GlobalConfig;

mod ansible;
mod clusters;
mod config;

/// Builds an Ansible inventory from the nodes of the configured Kubernetes
/// clusters.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Inventory source document
    #[arg(long, env = "K8S_NODES_CONFIG")]
    config: PathBuf,

    /// Output format for the rendered inventory
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    format: OutputFormat,

    /// Management cluster kubeconfig; overrides the document's `kubeconfig`
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use; overrides the document's `context`
    #[arg(long)]
    context: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Yaml,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let args = Args::parse();

    let config = GlobalConfig::load(&args.config)?;

    let kubeconfig_path = args.kubeconfig.or_else(|| config.kubeconfig.clone());
    let context = args.context.or_else(|| config.context.clone());

    let client = management_client(kubeconfig_path.as_deref(), context.as_deref()).await?;

    let credentials = SecretCredentialResolver::new(client);
    let mut inventory = Inventory::new();

    let failures =
        clusters::build_inventory(&config, &credentials, &ApiNodeLister, &mut inventory).await;

    let rendered = match args.format {
        OutputFormat::Yaml => ansible::render_yaml(&inventory)?,
        OutputFormat::Json => ansible::render_json(&inventory)?,
    };
    print!("{rendered}");

    if !failures.is_empty() {
        info!(
            "inventory is partial: {} of {} clusters failed",
            failures.len(),
            config.clusters.len()
        );
    }

    Ok(())
}

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the rendered inventory; diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .expect("tracing-subscriber setup failed");
}

/// Client for the management cluster that holds the kubeconfig secrets.
/// With no explicit kubeconfig or context, falls back to the inferred
/// configuration (in-cluster service account or the default kubeconfig).
async fn management_client(
    path: Option<&Path>,
    context: Option<&str>,
) -> anyhow::Result<kube::Client> {
    if path.is_none() && context.is_none() {
        return Ok(kube::Client::try_default().await?);
    }

    let kubeconfig = match path {
        Some(path) => Kubeconfig::read_from(path)
            .with_context(|| format!("reading kubeconfig {}", path.display()))?,
        None => Kubeconfig::read().context("reading default kubeconfig")?,
    };

    let options = KubeConfigOptions {
        context: context.map(str::to_owned),
        ..KubeConfigOptions::default()
    };
    let config = kube::Config::from_custom_kubeconfig(kubeconfig, &options).await?;

    Ok(kube::Client::try_from(config)?)
}
