use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use clusterwatch::engine::SnapshotEngine;
use clusterwatch::headless::NdjsonSink;
use clusterwatch::logging::{self, LogTarget, LOG_FILE};
use clusterwatch::source::ChannelSource;
use clusterwatch::ui::Theme;
use clusterwatch::{input, ui, App, Monitor, MonitorBuilder, MonitorHandle, Overrides, Settings};
use clusterwatch_adapters::mongo::MongoAdapter;
use clusterwatch_adapters::ClusterClient;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "clusterwatch", version)]
#[command(about = "Watch document counts change across a MongoDB replica set")]
struct Args {
    /// MongoDB connection string, e.g. mongodb://db1,db2/?replicaSet=rs0
    #[arg(short, long)]
    connect: Option<String>,

    /// Config file (TOML, YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Milliseconds between polls
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// Snapshot each node through a direct connection to it
    #[arg(long)]
    per_member: bool,

    /// Print events as NDJSON instead of running the terminal UI
    #[arg(long, conflicts_with = "browse")]
    headless: bool,

    /// List a database's collections with document counts and exit
    #[arg(short, long, value_name = "DATABASE")]
    browse: Option<String>,

    /// Log filter used when RUST_LOG is unset (e.g. "debug")
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            connection_string: self.connect.clone(),
            poll_interval_ms: self.interval_ms,
            per_member_targeting: self.per_member.then_some(true),
            log_level: self.log_level.clone(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref(), args.overrides())
        .context("Failed to load configuration")?;

    // The terminal UI owns stdout, so its logs go to a file
    let target = if args.headless || args.browse.is_some() {
        LogTarget::Stderr
    } else {
        LogTarget::File(Path::new(LOG_FILE))
    };
    logging::init(&settings.log_level, target)?;

    let rt = Runtime::new()?;
    let client = rt.block_on(connect(&settings))?;

    if let Some(ref database) = args.browse {
        return rt.block_on(browse(client.as_ref(), database, &settings));
    }

    if args.headless {
        return rt.block_on(run_headless(client, &settings));
    }

    run_with_tui(&rt, client, &settings)
}

async fn connect(settings: &Settings) -> Result<Arc<dyn ClusterClient>> {
    let adapter = MongoAdapter::builder()
        .endpoint(&settings.connection_string)
        .connect()
        .await
        .context("Failed to connect to cluster")?;
    info!(endpoint = adapter.description(), "Connected");
    Ok(Arc::new(adapter))
}

fn monitor_builder(client: Arc<dyn ClusterClient>, settings: &Settings) -> MonitorBuilder {
    Monitor::builder()
        .client(client)
        .interval(settings.poll_interval())
        .filter(settings.filter())
        .per_member_targeting(settings.per_member_targeting)
}

/// Print the collections of one database with their document counts.
async fn browse(client: &dyn ClusterClient, database: &str, settings: &Settings) -> Result<()> {
    let counts = SnapshotEngine::new(settings.filter())
        .browse(client, database)
        .await
        .with_context(|| format!("Failed to browse database {database}"))?;

    if counts.is_empty() {
        println!("No collections in {database}");
        return Ok(());
    }

    let width = counts.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    println!("Collections in {database}:");
    for (name, count) in counts {
        println!("  {name:<width$}  {count:>12}");
    }
    Ok(())
}

/// Run without a terminal UI until interrupted.
async fn run_headless(client: Arc<dyn ClusterClient>, settings: &Settings) -> Result<()> {
    let (sink, writer) = NdjsonSink::spawn();
    let monitor = monitor_builder(client, settings)
        .sink(sink)
        .connect()
        .await
        .context("Failed to start monitor")?;

    let handle = monitor.start();
    tokio::signal::ctrl_c().await?;
    info!("Interrupted, stopping monitor");

    handle.stop();
    // Dropping the monitor closes the sink so the writer can drain and exit
    drop(handle.join().await?);
    writer.await?;
    Ok(())
}

/// Run the monitor on the runtime and the terminal UI on this thread.
fn run_with_tui(rt: &Runtime, client: Arc<dyn ClusterClient>, settings: &Settings) -> Result<()> {
    let (tx, source) = ChannelSource::create(client.description());

    let monitor = rt
        .block_on(monitor_builder(client, settings).sink(tx).connect())
        .context("Failed to start monitor")?;
    let handle = {
        let _guard = rt.enter();
        monitor.start()
    };

    let result = run_tui(Box::new(source), &handle);

    handle.stop();
    rt.block_on(handle.join())?;
    result
}

fn run_tui(source: Box<ChannelSource>, handle: &MonitorHandle) -> Result<()> {
    // Detect the theme before raw mode, the query needs a cooked terminal
    let theme = Theme::auto_detect();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(source, theme);
    app.poll_events();

    let result = run_app(&mut terminal, &mut app, handle);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    handle: &MonitorHandle,
) -> Result<()> {
    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        if let Some(event) = input::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => input::handle_key_event(app, key),
                Event::Mouse(mouse) => input::handle_mouse_event(app, mouse),
                _ => {}
            }
        }

        if app.take_rediscover_request() {
            handle.rediscover();
        }

        app.poll_events();
    }

    Ok(())
}
