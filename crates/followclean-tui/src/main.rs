use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use ratatui::Terminal;
use ratatui::crossterm::event;
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::CrosstermBackend;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use followclean_core::config_file;
use followclean_core::page::snapshot::SnapshotPage;
use followclean_core::{Config, CoreEvent, Effect, HostPage, OrderMode, ScanAck, bridge};
use followclean_webdriver::{SessionOptions, WebDriverPage};

mod action;
mod app;
mod input;
mod theme;
mod view;

use action::Action;
use app::App;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// followclean: swipe through the accounts you follow, then unfollow the rejects.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Review a saved copy of the following page instead of a live browser
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

    /// Initial card order: oldest or random
    #[arg(long)]
    order: Option<String>,

    /// Fixed shuffle seed
    #[arg(long)]
    seed: Option<u64>,

    /// Disable the card slide animation
    #[arg(long)]
    no_animate: bool,

    /// Color theme: hacker (default) or modern
    #[arg(long)]
    theme: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let _log_guard = init_logging();

    // CLI flags > env vars > config file > defaults
    let file = config_file::load_config();
    let mut config = file.to_config();
    if let Some(order) = args.order.as_deref() {
        config.review.default_order = OrderMode::from_str_loose(order)
            .with_context(|| format!("unknown order '{order}' (expected oldest or random)"))?;
    }
    if args.seed.is_some() {
        config.review.seed = args.seed;
    }
    if args.no_animate {
        config.review.animate = false;
    }

    let display = file.display.clone().unwrap_or_default();
    let theme_name = args
        .theme
        .or(display.theme)
        .unwrap_or_else(|| "hacker".to_string());
    let fps = display.fps.unwrap_or(10).clamp(1, 120);
    let theme = theme::Theme::by_name(&theme_name);

    if let Some(path) = args.snapshot {
        if !path.exists() {
            anyhow::bail!("Snapshot file not found: {}", path.display());
        }
        let page = SnapshotPage::from_file(&path)?;
        info!(path = %path.display(), cards = page.card_count(), "snapshot loaded");
        let label = format!("snapshot: {}", path.display());
        let app = App::new(config.review.clone(), theme, label);
        return run_app(Arc::new(page), config, app, fps).await;
    }

    let webdriver = file.webdriver.clone().unwrap_or_default();
    let url = args
        .webdriver
        .or_else(|| std::env::var("WEBDRIVER_URL").ok())
        .or(webdriver.url)
        .context("no page source: pass --snapshot FILE or --webdriver URL (or set WEBDRIVER_URL)")?;
    let following_url = args
        .following_url
        .or_else(|| std::env::var("FOLLOWING_URL").ok())
        .or(webdriver.following_url);
    let options = SessionOptions {
        debugger_address: args.debugger_address.or(webdriver.debugger_address),
        headless: args.headless,
    };

    let page = WebDriverPage::connect(&url, &options)
        .await
        .with_context(|| format!("could not open a WebDriver session at {url}"))?;
    if let Some(following) = following_url.as_deref() {
        page.navigate(following).await?;
    }
    let app = App::new(config.review.clone(), theme, format!("webdriver: {url}"));
    let page = Arc::new(page);
    let result = run_app(page.clone(), config, app, fps).await;
    if let Err(e) = page.close().await {
        warn!(error = %e, "failed to close WebDriver session");
    }
    result
}

/// The terminal belongs to the UI, so logs go to a daily file in the cache dir.
fn init_logging() -> Option<WorkerGuard> {
    let dir = dirs::cache_dir()?.join("followclean");
    std::fs::create_dir_all(&dir).ok()?;
    let appender = tracing_appender::rolling::daily(&dir, "followclean-tui.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("followclean=info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

async fn run_app<P>(page: Arc<P>, config: Config, mut app: App, fps: u32) -> anyhow::Result<()>
where
    P: HostPage + 'static,
{
    let (bridge, mut events) = bridge::spawn(page, config);

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Install panic hook that restores terminal before printing panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    // Drain any stray input events (e.g. Enter keypress from launching the command)
    while event::poll(Duration::from_millis(50)).unwrap_or(false) {
        let _ = event::read();
    }

    let tick_rate = Duration::from_millis(1000 / fps as u64);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| app.view(f))?;

        tokio::select! {
            Some(core_event) = events.recv() => {
                app.update(Action::Backend(core_event));
                // Drain any additional queued backend events
                while let Ok(evt) = events.try_recv() {
                    app.update(Action::Backend(evt));
                }
            }
            _ = async {
                if event::poll(tick_rate).unwrap_or(false)
                    && let Ok(evt) = event::read()
                {
                    app.update(input::map_event(&evt));
                }
            } => {}
        }

        if last_tick.elapsed() >= tick_rate {
            app.update(Action::Tick);
            last_tick = Instant::now();
        }

        for effect in app.take_effects() {
            match effect {
                // The backend answers before doing any page work.
                Effect::StartScan => match bridge.start_scan().await {
                    Ok(ScanAck { started: true }) => info!("scan started"),
                    Ok(ScanAck { started: false }) => {
                        warn!("scan refused, backend busy");
                        app.update(Action::Backend(CoreEvent::ScanRefused));
                    }
                    Err(_) => {
                        warn!("backend dropped the scan request");
                        app.update(Action::Backend(CoreEvent::ScanRefused));
                    }
                },
                Effect::Execute(accounts) => bridge.execute(accounts),
                Effect::Cancel => bridge.cancel(),
                Effect::Review(_) => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(())
}
