use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use followclean_core::config_file::{self, ConfigFile};
use followclean_core::page::snapshot::SnapshotPage;
use followclean_core::{
    AccountScanner, Config, CoreEvent, HostPage, LogEntry, UnfollowExecutor, load_accounts,
    save_accounts,
};
use followclean_webdriver::{SessionOptions, WebDriverPage};

mod output;

use output::ColorMode;

/// followclean: scan the accounts you follow and unfollow a saved selection
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scroll the following list and write every account, oldest first, as JSON
    Scan {
        #[command(flatten)]
        source: SourceArgs,

        /// Write the account list here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Unfollow every account in a JSON list, in order
    Unfollow {
        #[command(flatten)]
        source: SourceArgs,

        /// Account list as written by `scan`
        #[arg(long)]
        list: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Also write it to the platform config file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Use a saved copy of the following page (nothing is really unfollowed)
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// WebDriver endpoint (chromedriver), e.g. http://localhost:9515
    #[arg(long)]
    webdriver: Option<String>,

    /// Following page to open once the session starts
    #[arg(long)]
    following_url: Option<String>,

    /// Attach to a Chrome started with --remote-debugging-port (host:port)
    #[arg(long)]
    debugger_address: Option<String>,

    /// Start a headless browser when not attaching
    #[arg(long)]
    headless: bool,
}

/// Where the accounts live.
enum Source {
    Snapshot(Arc<SnapshotPage>),
    WebDriver(Arc<WebDriverPage>),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("followclean=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let file = config_file::load_config();
    let config = file.to_config();

    match cli.command {
        Command::Scan {
            source,
            output,
            no_color,
        } => {
            let color = ColorMode(!no_color);
            let accounts = match open_source(source, &file).await? {
                Source::Snapshot(page) => scan(page, &config).await?,
                Source::WebDriver(page) => {
                    let accounts = scan(page.clone(), &config).await;
                    close(page).await;
                    accounts?
                }
            };
            match output {
                Some(path) => {
                    save_accounts(&path, &accounts)?;
                    info!(path = %path.display(), count = accounts.len(), "account list written");
                }
                None => output::write_accounts(&mut std::io::stdout().lock(), &accounts)?,
            }
            output::print_scan_summary(&mut std::io::stderr(), &accounts, color)?;
            Ok(())
        }
        Command::Unfollow {
            source,
            list,
            no_color,
        } => {
            if !list.exists() {
                anyhow::bail!("Account list not found: {}", list.display());
            }
            let accounts = load_accounts(&list)
                .with_context(|| format!("could not read account list {}", list.display()))?;
            let color = ColorMode(!no_color);
            match open_source(source, &file).await? {
                Source::Snapshot(page) => unfollow(page, &config, &accounts, color).await,
                Source::WebDriver(page) => {
                    let result = unfollow(page.clone(), &config, &accounts, color).await;
                    close(page).await;
                    result
                }
            }
        }
        Command::Config { init } => {
            let effective = file.with_defaults();
            if init {
                let path = config_file::save_config(&effective)?;
                eprintln!("Wrote {}", path.display());
            }
            output::write_config(&mut std::io::stdout().lock(), &effective)
        }
    }
}

/// Resolve the page: CLI flags > env vars > config file.
async fn open_source(args: SourceArgs, file: &ConfigFile) -> anyhow::Result<Source> {
    if let Some(path) = args.snapshot {
        if !path.exists() {
            anyhow::bail!("Snapshot file not found: {}", path.display());
        }
        let page = SnapshotPage::from_file(&path)?;
        info!(path = %path.display(), cards = page.card_count(), "snapshot loaded");
        return Ok(Source::Snapshot(Arc::new(page)));
    }

    let section = file.webdriver.clone().unwrap_or_default();
    let url = args
        .webdriver
        .or_else(|| std::env::var("WEBDRIVER_URL").ok())
        .or(section.url)
        .context("no page source: pass --snapshot FILE or --webdriver URL (or set WEBDRIVER_URL)")?;
    let following_url = args
        .following_url
        .or_else(|| std::env::var("FOLLOWING_URL").ok())
        .or(section.following_url);
    let options = SessionOptions {
        debugger_address: args.debugger_address.or(section.debugger_address),
        headless: args.headless,
    };

    let page = WebDriverPage::connect(&url, &options)
        .await
        .with_context(|| format!("could not open a WebDriver session at {url}"))?;
    if let Some(following) = following_url.as_deref() {
        page.navigate(following).await?;
    }
    Ok(Source::WebDriver(Arc::new(page)))
}

async fn close(page: Arc<WebDriverPage>) {
    if let Err(e) = page.close().await {
        tracing::warn!(error = %e, "failed to close WebDriver session");
    }
}

async fn scan<P: HostPage>(
    page: Arc<P>,
    config: &Config,
) -> anyhow::Result<Vec<followclean_core::Account>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message("Scanning following list...");

    let scanner = AccountScanner::new(page, config.scan.clone());
    let bar = spinner.clone();
    let accounts = scanner
        .scan(move |count| bar.set_message(format!("Scanning following list... {count} found")))
        .await
        .context("a scan is already running")?;

    spinner.finish_and_clear();
    Ok(accounts)
}

async fn unfollow<P: HostPage>(
    page: Arc<P>,
    config: &Config,
    accounts: &[followclean_core::Account],
    color: ColorMode,
) -> anyhow::Result<()> {
    let total = accounts.len();
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_clone.cancel();
        }
    });

    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/dim}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    bar.enable_steady_tick(Duration::from_millis(120));

    let executor = UnfollowExecutor::new(page, config.execute.clone());
    let progress = bar.clone();
    let summary = executor
        .run(accounts, &cancel, move |event| match event {
            CoreEvent::UnfollowStarted { account, .. } => {
                progress.set_message(format!("{} ({})", account.display_name, account.handle));
            }
            CoreEvent::UnfollowProgress {
                index,
                total,
                account,
                outcome,
            } => {
                let entry = LogEntry { account, outcome };
                progress.println(output::outcome_line(index, total, &entry, color));
                progress.inc(1);
            }
            _ => {}
        })
        .await;
    bar.finish_and_clear();

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", output::summary_line(&summary, color))?;
    if summary.stopped_early {
        writeln!(stdout, "Interrupted; the remaining accounts are still followed.")?;
    }
    Ok(())
}
