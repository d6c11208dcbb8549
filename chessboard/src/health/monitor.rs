use std::sync::Arc;
use std::time::Duration;

use chess_client::ChessBackend;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::Instrument;

use super::tracker::{BannerEvent, HealthDisplay, HealthStatus, HealthTracker, HideToken};

/// Whether the user can currently see the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Probe loop driving a [`HealthTracker`].
pub struct HealthMonitor {
    backend: Arc<dyn ChessBackend>,
    interval: Duration,
    hide_delay: Duration,
    tracker: HealthTracker,
    display_tx: watch::Sender<HealthDisplay>,
    event_tx: broadcast::Sender<BannerEvent>,
}

impl HealthMonitor {
    pub fn new(backend: Arc<dyn ChessBackend>, interval: Duration, hide_delay: Duration) -> Self {
        let (display_tx, _) = watch::channel(HealthDisplay::default());
        let (event_tx, _) = broadcast::channel(32);
        Self {
            backend,
            interval,
            hide_delay,
            tracker: HealthTracker::new(),
            display_tx,
            event_tx,
        }
    }

    pub fn display(&self) -> watch::Receiver<HealthDisplay> {
        self.display_tx.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<BannerEvent> {
        self.event_tx.subscribe()
    }

    /// One liveness sample. Never fails: any backend error counts as down.
    pub async fn probe(&self) -> HealthStatus {
        probe(self.backend.as_ref()).await
    }

    /// Run until `shutdown` fires or the visibility sender is dropped.
    pub async fn run(
        self,
        visibility: watch::Receiver<Visibility>,
        shutdown: oneshot::Receiver<()>,
    ) {
        self.run_inner(visibility, shutdown)
            .instrument(tracing::info_span!("health"))
            .await;
    }

    async fn run_inner(
        mut self,
        mut visibility: watch::Receiver<Visibility>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Health monitor started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let hide_timer = tokio::time::sleep(self.hide_delay);
        tokio::pin!(hide_timer);
        let mut armed: Option<HideToken> = None;

        // Probe results land here; the loop itself never awaits the backend.
        let (sample_tx, mut sample_rx) = mpsc::unbounded_channel::<HealthStatus>();
        let mut probing = false;

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => break,

                changed = visibility.changed() => {
                    if changed.is_err() {
                        tracing::debug!("Visibility source closed");
                        break;
                    }
                    let now_visible = *visibility.borrow_and_update() == Visibility::Visible;
                    if now_visible {
                        self.start_probe(&mut probing, &sample_tx);
                    }
                }

                _ = &mut hide_timer, if armed.is_some() => {
                    if let Some(token) = armed.take() {
                        let event = self.tracker.hide_elapsed(token);
                        self.publish(event);
                    }
                }

                Some(status) = sample_rx.recv() => {
                    probing = false;
                    self.record(status);
                }

                _ = ticker.tick() => self.start_probe(&mut probing, &sample_tx),
            }

            let token = self.tracker.hide_token();
            if token != armed {
                armed = token;
                if armed.is_some() {
                    hide_timer.as_mut().reset(Instant::now() + self.hide_delay);
                }
            }
        }

        tracing::info!("Health monitor stopped");
    }

    /// Spawn a probe unless one is already in flight.
    fn start_probe(&self, probing: &mut bool, sample_tx: &mpsc::UnboundedSender<HealthStatus>) {
        if *probing {
            tracing::debug!("Probe already in flight");
            return;
        }
        *probing = true;

        let backend = Arc::clone(&self.backend);
        let sample_tx = sample_tx.clone();
        tokio::spawn(
            async move {
                // The monitor may have stopped; nobody is left to tell.
                let _ = sample_tx.send(probe(backend.as_ref()).await);
            }
            .in_current_span(),
        );
    }

    fn record(&mut self, status: HealthStatus) {
        let previous = self.tracker.status();
        tracing::debug!(%status, "Health sample");

        let event = self.tracker.observe(status);
        if status != previous {
            tracing::info!(from = %previous, to = %status, "Backend health changed");
        }
        self.publish(event);
    }

    fn publish(&self, event: Option<BannerEvent>) {
        if let Some(event) = event {
            let _ = self.event_tx.send(event);
        }
        let display = self.tracker.display();
        self.display_tx.send_if_modified(|current| {
            if *current == display {
                return false;
            }
            *current = display;
            true
        });
    }
}

async fn probe(backend: &dyn ChessBackend) -> HealthStatus {
    match backend.health().await {
        Ok(()) => HealthStatus::Up,
        Err(e) => {
            tracing::debug!(error = %e, "Health probe failed");
            HealthStatus::Down
        }
    }
}

/// Owns a spawned monitor. Dropping it stops the monitor.
pub struct HealthHandle {
    display_rx: watch::Receiver<HealthDisplay>,
    event_tx: broadcast::Sender<BannerEvent>,
    visibility_tx: watch::Sender<Visibility>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl HealthHandle {
    pub fn display(&self) -> HealthDisplay {
        *self.display_rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<HealthDisplay> {
        self.display_rx.clone()
    }

    pub fn events(&self) -> broadcast::Receiver<BannerEvent> {
        self.event_tx.subscribe()
    }

    /// Report a visibility change; becoming visible triggers an immediate probe.
    pub fn set_visibility(&self, visibility: Visibility) {
        self.visibility_tx.send_if_modified(|current| {
            if *current == visibility {
                return false;
            }
            *current = visibility;
            true
        });
    }

    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Spawn a monitor on the current runtime, starting out visible.
pub fn spawn_health_monitor(
    backend: Arc<dyn ChessBackend>,
    interval: Duration,
    hide_delay: Duration,
) -> HealthHandle {
    let monitor = HealthMonitor::new(backend, interval, hide_delay);
    let display_rx = monitor.display();
    let event_tx = monitor.event_tx.clone();
    let (visibility_tx, visibility_rx) = watch::channel(Visibility::Visible);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    tokio::spawn(monitor.run(visibility_rx, shutdown_rx));

    HealthHandle {
        display_rx,
        event_tx,
        visibility_tx,
        shutdown_tx: Some(shutdown_tx),
    }
}
