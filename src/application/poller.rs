// Poller - Drives the fetch/render cycle on a self-rescheduling timer
use crate::application::reading_source::ReadingSource;
use crate::application::status_service::StatusService;
use crate::application::status_sink::{Notice, StatusSink};
use crate::infrastructure::config::{Settings, load_settings};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

#[derive(Debug)]
enum PollCommand {
    Refresh { reply: oneshot::Sender<Notice> },
    UpdateSettings(Box<Settings>),
    Shutdown,
}

#[derive(Debug, Error)]
#[error("poller is not running")]
pub struct PollerStopped;

/// Cloneable handle used by the HTTP surface and signal handlers.
#[derive(Clone)]
pub struct PollerHandle {
    commands: mpsc::Sender<PollCommand>,
    active: Arc<AtomicBool>,
}

impl PollerHandle {
    /// Run a cycle now and report the last entry's timestamp.
    /// The scheduled deadline is left alone.
    pub async fn refresh(&self) -> Result<Notice, PollerStopped> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(PollCommand::Refresh { reply })
            .await
            .map_err(|_| PollerStopped)?;
        rx.await.map_err(|_| PollerStopped)
    }

    /// Swap in a new configuration snapshot, tick immediately and re-arm.
    pub async fn update_settings(&self, settings: Settings) -> Result<(), PollerStopped> {
        self.commands
            .send(PollCommand::UpdateSettings(Box::new(settings)))
            .await
            .map_err(|_| PollerStopped)
    }

    /// Re-read the configuration file and hand the snapshot to the poller.
    /// On failure the previous snapshot stays in force.
    pub async fn reload(&self) -> anyhow::Result<Settings> {
        let settings = load_settings()?;
        self.update_settings(settings.clone()).await?;
        Ok(settings)
    }

    /// Stop scheduling. An in-flight fetch finishes but its result is dropped.
    pub async fn shutdown(&self) {
        self.active.store(false, Ordering::SeqCst);
        let _ = self.commands.send(PollCommand::Shutdown).await;
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Shut down and wait up to `grace` for the task to finish. A fetch that
    /// is still hanging after that is aborted. Returns whether the task
    /// stopped on its own.
    pub async fn shutdown_and_join(&self, mut task: JoinHandle<()>, grace: Duration) -> bool {
        self.shutdown().await;
        match tokio::time::timeout(grace, &mut task).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::error!("Poller task failed: {}", e);
                false
            }
            Err(_) => {
                tracing::warn!("Poller still busy after {:?}, aborting in-flight fetch", grace);
                task.abort();
                false
            }
        }
    }
}

pub struct Poller {
    service: StatusService,
    sink: Arc<dyn StatusSink>,
    settings: Settings,
    commands: mpsc::Receiver<PollCommand>,
    active: Arc<AtomicBool>,
}

impl Poller {
    /// Spawn the polling task. The first cycle runs before any command is served.
    pub fn spawn(
        source: Arc<dyn ReadingSource>,
        sink: Arc<dyn StatusSink>,
        settings: Settings,
    ) -> (PollerHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(16);
        let active = Arc::new(AtomicBool::new(true));

        let poller = Poller {
            service: StatusService::new(source, sink.clone(), active.clone()),
            sink,
            settings,
            commands: rx,
            active: active.clone(),
        };
        let task = tokio::spawn(poller.run());

        (PollerHandle { commands: tx, active }, task)
    }

    async fn run(mut self) {
        tracing::info!(
            "Poller started, interval {:?}, host {:?}",
            self.settings.update_interval,
            self.settings.connection.host
        );

        let mut deadline = self.tick().await;

        // A shutdown can land while a tick or queued command is already due,
        // so the flag is checked again before every cycle.
        while self.is_active() {
            tokio::select! {
                _ = sleep_until(deadline) => {
                    if !self.is_active() {
                        break;
                    }
                    deadline = self.tick().await;
                }
                command = self.commands.recv() => match command {
                    Some(_) if !self.is_active() => break,
                    Some(PollCommand::Refresh { reply }) => {
                        if self.service.run_cycle(&self.settings).await.is_none() {
                            break;
                        }
                        let notice = self.service.timestamp_notice();
                        self.sink.notify(notice.clone());
                        let _ = reply.send(notice);
                    }
                    Some(PollCommand::UpdateSettings(settings)) => {
                        tracing::info!("Configuration changed, interval {:?}", settings.update_interval);
                        self.settings = *settings;
                        deadline = self.tick().await;
                    }
                    Some(PollCommand::Shutdown) | None => break,
                },
            }
        }

        tracing::info!("Poller stopped");
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Run one cycle to completion, then compute the next deadline from the
    /// interval in force at that moment.
    async fn tick(&mut self) -> Instant {
        if self.is_active() {
            self.service.run_cycle(&self.settings).await;
        }
        Instant::now() + self.settings.update_interval
    }
}
