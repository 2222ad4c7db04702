//! The monitor loop: periodic poll/display and sample/notify tasks.
//!
//! Two tasks share one latest-reading cell. The poll task fetches,
//! classifies, and emits a display event every tick; the sample task
//! periodically persists whatever the poll task last saw and, in notify
//! mode, raises an alert notice. Neither task ever terminates on its own;
//! shutdown is whole-loop via a watch channel.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use tokio::sync::{watch, RwLock};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::classify::{Classifier, WarningTier};
use crate::client::{SensorClient, SensorReading};
use crate::sink::{EventSink, ReadingEvent};
use crate::store::SampleLog;

/// Timestamp format for persisted samples.
const SAMPLE_TIME_FORMAT: &str = "%H:%M:%S %d/%m/%Y";

/// Cadences and notification behavior for a monitor run.
#[derive(Debug, Clone, Copy)]
pub struct MonitorOptions {
    /// How often the sensor is polled for display
    pub poll_interval: Duration,
    /// How often the latest reading is persisted
    pub sample_interval: Duration,
    /// Raise an alert notice on every sample tick (the background
    /// monitoring variant)
    pub notify: bool,
}

/// Latest successfully classified reading, shared between the two tasks.
#[derive(Debug, Clone, Copy)]
pub struct LatestReading {
    pub reading: SensorReading,
    pub tier: WarningTier,
    pub extended: bool,
}

type SharedLatest = Arc<RwLock<Option<LatestReading>>>;

/// Owns the two periodic tasks for one monitoring run.
pub struct Monitor {
    client: SensorClient,
    classifier: Classifier,
    samples: SampleLog,
    sink: Arc<dyn EventSink>,
    options: MonitorOptions,
}

impl Monitor {
    pub fn new(
        client: SensorClient,
        classifier: Classifier,
        samples: SampleLog,
        sink: Arc<dyn EventSink>,
        options: MonitorOptions,
    ) -> Self {
        Self {
            client,
            classifier,
            samples,
            sink,
            options,
        }
    }

    /// Run both tasks until `shutdown` fires, then join them.
    pub async fn run(self, shutdown: watch::Receiver<bool>) {
        let latest: SharedLatest = Arc::new(RwLock::new(None));

        let poll = tokio::spawn(poll_task(
            self.client,
            self.classifier,
            Arc::clone(&latest),
            Arc::clone(&self.sink),
            self.options.poll_interval,
            shutdown.clone(),
        ));
        let sample = tokio::spawn(sample_task(
            self.samples,
            latest,
            self.sink,
            self.options,
            shutdown,
        ));

        if let Err(e) = poll.await {
            error!("poll task failed: {e}");
        }
        if let Err(e) = sample.await {
            error!("sample task failed: {e}");
        }
    }
}

/// Fetch, classify, and emit a display event once per interval.
async fn poll_task(
    client: SensorClient,
    classifier: Classifier,
    latest: SharedLatest,
    sink: Arc<dyn EventSink>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tier: Option<WarningTier> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }

        let reading = match client.fetch().await {
            Ok(reading) => reading,
            Err(e) => {
                // The previous reading stays on display; the sink only
                // learns the connection is down.
                warn!("sensor fetch failed: {e}");
                sink.connectivity_error(&e);
                continue;
            }
        };

        match classifier.classify(reading.temperature, Utc::now()) {
            Ok(classification) => {
                let tier_changed = last_tier.is_some_and(|t| t != classification.tier);
                last_tier = Some(classification.tier);

                *latest.write().await = Some(LatestReading {
                    reading,
                    tier: classification.tier,
                    extended: classification.extended,
                });

                debug!(
                    temperature = reading.temperature,
                    humidity = reading.humidity,
                    endpoint_alert = reading.alert,
                    tier = %classification.tier,
                    extended = classification.extended,
                    "reading classified"
                );
                sink.reading(&ReadingEvent {
                    temperature: reading.temperature,
                    humidity: reading.humidity,
                    tier: classification.tier,
                    extended: classification.extended,
                    tier_changed,
                });
            }
            Err(e) => {
                // Keep polling; the window store may recover next tick.
                error!("alert window update failed: {e}");
            }
        }
    }
}

/// Persist the latest reading once per interval, notifying in notify mode.
async fn sample_task(
    samples: SampleLog,
    latest: SharedLatest,
    sink: Arc<dyn EventSink>,
    options: MonitorOptions,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(options.sample_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Consume the immediate first tick: a full interval should pass before
    // the first sample, and there is rarely a reading to persist yet anyway.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }

        let snapshot = *latest.read().await;
        let Some(current) = snapshot else {
            debug!("no reading observed yet, skipping sample");
            continue;
        };

        let time = Local::now().format(SAMPLE_TIME_FORMAT).to_string();
        match samples
            .append(
                current.reading.temperature,
                current.reading.humidity,
                &time,
                current.tier.label(),
            )
            .await
        {
            Ok(id) => info!(id, tier = current.tier.label(), "sample persisted"),
            // Skipped until the next cycle; no retry queue.
            Err(e) => error!("sample persist failed: {e}"),
        }

        if options.notify {
            sink.alert_notice(current.tier, current.extended);
        }
    }
}
