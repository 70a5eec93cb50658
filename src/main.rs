use std::{env, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};

use timespend::{
    ConsoleDisplay, DisplaySink, IntervalLog, JsonFileBackend, RefreshConfig, RefreshController,
    ToggleResult, TrackerController,
};

fn data_dir() -> PathBuf {
    if let Some(dir) = env::var_os("TIMESPEND_DATA_DIR") {
        return PathBuf::from(dir);
    }
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".timespend"),
        None => PathBuf::from(".timespend"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let dir = data_dir();
    info!("timespend starting up, data dir {}", dir.display());

    let backend = JsonFileBackend::new(dir)?;
    let log = IntervalLog::load(Box::new(backend));
    let display: Arc<dyn DisplaySink> = Arc::new(ConsoleDisplay::new());
    let tracker = TrackerController::new(log, display.clone());

    let mut refresh = RefreshController::new();
    refresh.start_refresh(tracker.clone(), display.clone(), RefreshConfig::default())?;

    println!("commands: <enter> toggle | reset | export [path] | import <path> | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                if !handle_command(&tracker, line.trim()).await? {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    refresh.stop_refresh().await?;
    println!();
    Ok(())
}

async fn handle_command(tracker: &TrackerController, line: &str) -> Result<bool> {
    let (command, arg) = match line.split_once(' ') {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    match command {
        "" | "toggle" | "t" => match tracker.toggle().await {
            ToggleResult::Started => println!("\ntimer started"),
            ToggleResult::Completed(interval) => {
                println!("\nrecorded {}ms", interval.duration_ms());
            }
        },
        "reset" | "r" => {
            tracker.reset().await;
            println!("\nlog cleared");
        }
        "export" | "e" => {
            let path = if arg.is_empty() { "timespend-export.json" } else { arg };
            let bytes = tracker.export_json().await?;
            tokio::fs::write(path, bytes)
                .await
                .with_context(|| format!("failed to write export to {path}"))?;
            println!("\nexported to {path}");
        }
        "import" | "i" => {
            if arg.is_empty() {
                println!("\nusage: import <path>");
                return Ok(true);
            }
            let payload = tokio::fs::read_to_string(arg)
                .await
                .with_context(|| format!("failed to read {arg}"))?;
            match tracker.import_json(&payload).await {
                Ok(count) => println!("\nimported {count} intervals"),
                Err(err) => println!("\nimport rejected: {err}"),
            }
        }
        "quit" | "q" | "exit" => return Ok(false),
        other => println!("\nunknown command: {other}"),
    }

    Ok(true)
}
