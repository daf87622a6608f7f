use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use notify::{Config as NotifyConfig, Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::actor::dock::{self, Event as DockEvent};
use crate::common::config::Config;

/// Polls the config file and pushes every valid change to the dock.
pub struct ConfigWatcher {
    file: PathBuf,
    dock_tx: dock::Sender,
}

impl ConfigWatcher {
    pub fn new(file: PathBuf, dock_tx: dock::Sender) -> Self { ConfigWatcher { file, dock_tx } }

    pub fn spawn(self) -> std::io::Result<thread::JoinHandle<()>> {
        thread::Builder::new().name("config-watcher".to_string()).spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(e) => {
                    warn!("config-watcher: no runtime: {e:?}");
                    return;
                }
            };
            runtime.block_on(async move {
                if let Err(e) = self.run().await {
                    warn!("config-watcher: error: {e:?}");
                }
            })
        })
    }

    async fn run(self) -> notify::Result<()> {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<notify::Result<Event>>();

        let mut watcher = PollWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            NotifyConfig::default()
                .with_poll_interval(Duration::from_secs(1))
                .with_compare_contents(true),
        )?;

        watcher.watch(&self.file, RecursiveMode::NonRecursive)?;

        info!("watching {:?}", self.file);

        while let Some(res) = rx.recv().await {
            match res {
                Ok(event) if self.is_relevant(&event) => {
                    debug!("change detected: {:?}", event.kind);
                    self.reload();
                }
                Ok(event) => debug!("ignoring unrelated event: {:?}", event.kind),
                Err(e) => warn!("watch error: {e:?}"),
            }
            if self.dock_tx.is_closed() {
                debug!("dock gone, exiting");
                break;
            }
        }

        Ok(())
    }

    fn is_relevant(&self, event: &Event) -> bool {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) => event
                .paths
                .iter()
                .any(|p| p == &self.file || p.file_name() == self.file.file_name()),
            _ => false,
        }
    }

    /// Re-reads the file, repairing out-of-range values. A file that fails
    /// to parse is reported and leaves the dock on its current config; a
    /// deleted file falls back to the defaults.
    fn reload(&self) {
        let mut config = match Config::read_or_default(&self.file) {
            Ok(config) => config,
            Err(e) => {
                warn!("config reload failed: {e:#}");
                return;
            }
        };
        for issue in config.validate() {
            warn!("config: {issue}");
        }
        let fixes = config.auto_fix_values();
        if fixes > 0 {
            info!(fixes, "applied config fixes");
        }
        info!("config reloaded");
        self.dock_tx.send(DockEvent::ConfigUpdated(config.dock));
    }
}
