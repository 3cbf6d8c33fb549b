use anyhow::Result;
use clap::Parser;
use jikanwari::client::DataSource;
use jikanwari::config::Config;
use std::path::PathBuf;

/// School timetable dashboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path or http(s) URL of the timetable JSON (overrides the config file)
    #[arg(short, long)]
    data: Option<String>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = jikanwari::logging::init();

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);
        tracing::error!("panic: {}", info);
        default_hook(info);
    }));

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            eprintln!("Ignoring config: {:#}", e);
            Config::default()
        }),
    };
    let source = DataSource::parse(args.data.as_deref().unwrap_or(&config.data_source));
    tracing::info!(source = %source.key(), "starting");

    jikanwari::tui::run(config, source).await
}
