//! `sidebar`: query-driven sidebars and tree mirrors for outline files

mod cli;
mod output;
mod workspace;

use anyhow::{bail, Context, Result};
use cli::{Action, Global};
use sidebar_view::{SidebarConfig, SurfaceId};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use workspace::{QueryRequest, Workspace};

const MIN_INTERVAL: Duration = Duration::from_millis(50);

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env("SIDEBAR_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        fmt.json().init();
    } else {
        fmt.init();
    }
}

/// Run `f` on the blocking pool, abandoning it after `timeout`
async fn run_blocking<T, F>(timeout: Duration, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(f)).await {
        Ok(joined) => joined.context("command task failed")?,
        Err(_) => bail!("timed out after {}ms", timeout.as_millis()),
    }
}

fn load_config(global: &Global) -> Result<SidebarConfig> {
    match &global.config {
        Some(path) => SidebarConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(SidebarConfig::default()),
    }
}

async fn watch(
    global: &Global,
    config: SidebarConfig,
    files: Vec<PathBuf>,
    interval: Duration,
) -> Result<()> {
    let (mut ws, mut ids) = run_blocking(global.timeout, move || {
        let ws = Workspace::open(config, &files)?;
        let ids = ws.show_default()?;
        print!("{}", ws.render(&ids, false)?);
        Ok((ws, ids))
    })
    .await?;

    let mut ticker = tokio::time::interval(interval.max(MIN_INTERVAL));
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("stopping watch");
                return Ok(());
            }
            _ = ticker.tick() => {
                let (next_ws, next_ids): (Workspace, Vec<SurfaceId>) =
                    run_blocking(global.timeout, move || {
                        let mut ws = ws;
                        if ws.reload()? {
                            let ids = ws.refresh(&ids)?;
                            println!();
                            print!("{}", ws.render(&ids, false)?);
                            Ok((ws, ids))
                        } else {
                            Ok((ws, ids))
                        }
                    })
                    .await?;
                ws = next_ws;
                ids = next_ids;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::command().get_matches();
    let (global, action) = cli::parse(&matches)?;
    init_tracing(global.log_json);
    let config = load_config(&global)?;

    let out = match action {
        Action::Show { files, json } => {
            run_blocking(global.timeout, move || {
                let ws = Workspace::open(config, &files)?;
                let ids = ws.show_default()?;
                ws.render(&ids, json)
            })
            .await?
        }
        Action::Query {
            files,
            query,
            narrow,
            group_by,
            sort,
            title,
            json,
        } => {
            let request = QueryRequest {
                query,
                narrow,
                group_by,
                sort,
                title,
            };
            run_blocking(global.timeout, move || {
                let ws = Workspace::open(config, &files)?;
                let ids = ws.show_query(request)?;
                ws.render(&ids, json)
            })
            .await?
        }
        Action::Tree { file, at } => {
            run_blocking(global.timeout, move || {
                Workspace::open(config, &[file])?.tree(at)
            })
            .await?
        }
        Action::Jump { file, at, depth } => {
            run_blocking(global.timeout, move || {
                Workspace::open(config, &[file])?.jump(at, depth)
            })
            .await?
        }
        Action::Refresh {
            files,
            watch: true,
            interval,
        } => {
            if interval < MIN_INTERVAL {
                warn!(?interval, "polling interval raised to {MIN_INTERVAL:?}");
            }
            return watch(&global, config, files, interval).await;
        }
        Action::Refresh { files, .. } => {
            run_blocking(global.timeout, move || {
                let ws = Workspace::open(config, &files)?;
                let ids = ws.show_default()?;
                let ids = ws.refresh(&ids)?;
                ws.render(&ids, false)
            })
            .await?
        }
    };
    print!("{out}");
    Ok(())
}
