use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use feedcircuit::capture::{capture_base, capture_current_tab, FixedTab, LineSink};
use feedcircuit::config::Config;
use feedcircuit::dispatch::{
    Dispatcher, Failure, HostError, HostSurface, HttpTransport, Success,
};
use feedcircuit::selection::{CheckboxControl, TogglePolicy, ViewContext};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "feedcircuit", about = "Manage the Feedcircuit read-later selection")]
struct Args {
    /// Server base URL (overrides config file and FEEDCIRCUIT_BASE_URL)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Config file (defaults to ~/.config/feedcircuit/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a checkbox change from one of the list views
    Toggle {
        #[arg(long, value_enum)]
        view: View,

        /// Override the view's default toggle policy
        #[arg(long, value_enum)]
        policy: Option<Policy>,

        /// New checkbox state
        #[arg(long)]
        checked: bool,

        /// Class attribute of the control
        #[arg(long, default_value = "")]
        class: String,

        /// Control value (the item id)
        #[arg(long)]
        value: String,

        /// Item url, as rendered on the feed list
        #[arg(long)]
        url: Option<String>,
    },
    /// Archive an item, then reload the opener and close
    Archive { id: String },
    /// Remove an item from the selection, then reload the opener and close
    Unselect { id: String },
    /// Add a page URL to the selection, as the browser popup does
    Capture { url: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum View {
    FeedList,
    SelectedList,
}

impl From<View> for ViewContext {
    fn from(view: View) -> Self {
        match view {
            View::FeedList => ViewContext::FeedList,
            View::SelectedList => ViewContext::SelectedList,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    Plain,
    Inverted,
    MarkerFlip,
}

impl From<Policy> for TogglePolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Plain => TogglePolicy::Plain,
            Policy::Inverted => TogglePolicy::Inverted,
            Policy::MarkerFlip => TogglePolicy::MarkerFlip,
        }
    }
}

/// A terminal has no opener window; closing just ends the command.
struct TerminalHost;

impl HostSurface for TerminalHost {
    fn reload_opener(&self) -> Result<(), HostError> {
        tracing::debug!("No opener window in terminal session");
        Err(HostError::OpenerUnavailable)
    }

    fn close_self(&self) {
        tracing::debug!("Close requested");
    }
}

fn report(label: &str, outcome: Result<Success, Failure>) {
    // Failures were already handed to the dispatcher's failure handler.
    if let Ok(success) = outcome {
        println!("{}: status {}", label, success.status.code());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_path = args.config.clone().or_else(Config::default_path);
    let mut config = match &config_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    }
    .with_env_overrides();
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }

    let client = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;

    if let Command::Capture { url } = &args.command {
        let base = capture_base(&config.capture_host).context("Invalid capture host")?;
        let transport = HttpTransport::new(client, base, config.request_timeout());
        let mut sink = LineSink(std::io::stdout());
        if let Err(e) = capture_current_tab(&FixedTab(url.clone()), &transport, &mut sink).await {
            tracing::debug!(error = %e, "Capture did not complete");
        }
        return Ok(());
    }

    let base = config.base_url().context("Invalid base URL")?;
    let transport = HttpTransport::new(client, base, config.request_timeout());
    let dispatcher = Dispatcher::new(Arc::new(transport), Arc::new(TerminalHost))
        .strict_reload_gate(config.strict_reload_gate);

    match args.command {
        Command::Toggle {
            view,
            policy,
            checked,
            class,
            value,
            url,
        } => {
            let context = ViewContext::from(view);
            let control = CheckboxControl {
                checked,
                class_name: class,
                value,
                url,
            };
            let outcome = dispatcher
                .toggle(context, policy.map(Into::into), &control.to_input(context))
                .await;
            report("toggle", outcome);
        }
        Command::Archive { id } => report("archive", dispatcher.archive(id).await),
        Command::Unselect { id } => report("unselect", dispatcher.unselect_and_close(id).await),
        Command::Capture { .. } => {}
    }

    Ok(())
}
