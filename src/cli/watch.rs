//! `watch`: initial build, then watcher, live reload and dev server until
//! Ctrl+C.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::core::register_server;
use crate::pipeline::{self, TaskContext};
use crate::reload::{ReloadHub, start_ws_server};
use crate::serve;
use crate::watch::SourceWatcher;

/// How long to wait for the watch loop after the server stopped.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

pub async fn run(ctx: TaskContext) -> Result<()> {
    let config = Arc::clone(&ctx.config);
    let hub = ReloadHub::start();
    let ctx = ctx.with_reload(hub.clone());

    // Subscribe first so edits made during the initial build still count.
    let watcher = SourceWatcher::new(&config)?;

    let report = pipeline::build(&ctx).await;
    report.log();
    if !report.is_success() {
        crate::log!("watch"; "initial build had failures, watching anyway");
    }

    let ws_port = start_ws_server(Arc::clone(&hub), config.serve.interface, config.serve.reload_port)?;
    crate::debug!("reload"; "ws://{}:{}", config.serve.interface, ws_port);

    let server = serve::bind(&config, ws_port)?;
    let (shutdown_tx, shutdown_rx) = crossbeam::channel::unbounded();
    register_server(server.handle(), shutdown_tx);

    let watch = tokio::spawn(watcher.run(ctx.quiet(), shutdown_rx));
    let served = tokio::task::spawn_blocking(move || server.run()).await;

    if tokio::time::timeout(SHUTDOWN_GRACE, watch).await.is_err() {
        crate::debug!("watch"; "watch loop did not stop in time");
    }
    crate::debug!("reload"; "closing {} client(s)", hub.client_count());
    hub.close_all();

    served?
}
