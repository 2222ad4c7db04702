//! Outbound event boundary for display and notification.
//!
//! The monitor never renders anything itself; it hands events to an
//! [`EventSink`]. A console implementation ships here, and host-specific
//! sinks (UI, OS notifications) plug in the same way.

use chrono::Local;

use crate::classify::WarningTier;
use crate::client::FetchError;

/// A classified reading ready for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingEvent {
    pub temperature: f64,
    pub humidity: f64,
    pub tier: WarningTier,
    pub extended: bool,
    /// True when the tier differs from the previously emitted reading.
    /// Display-only: lets a sink animate the transition.
    pub tier_changed: bool,
}

/// Receives monitor output. One method per event kind.
///
/// Sinks must not fail the loop: one that cannot deliver (say, a missing
/// notification permission on the host) degrades silently while data
/// collection continues.
pub trait EventSink: Send + Sync {
    /// A fresh classified reading, once per successful poll.
    fn reading(&self, event: &ReadingEvent);

    /// The poll failed; the previous reading remains current.
    fn connectivity_error(&self, error: &FetchError);

    /// Periodic notice of the current tier (background monitoring only).
    fn alert_notice(&self, tier: WarningTier, extended: bool);
}

/// Renders events as console lines.
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn reading(&self, event: &ReadingEvent) {
        let extended = if event.extended { " (extended)" } else { "" };
        let changed = if event.tier_changed { "  <- tier change" } else { "" };
        println!(
            "[{}] {:>5.1} C  {:>5.1} %RH  {}{}{}",
            Local::now().format("%H:%M:%S"),
            event.temperature,
            event.humidity,
            event.tier.label(),
            extended,
            changed,
        );
    }

    fn connectivity_error(&self, error: &FetchError) {
        println!(
            "[{}] connection error: {error}",
            Local::now().format("%H:%M:%S"),
        );
    }

    fn alert_notice(&self, tier: WarningTier, extended: bool) {
        let message = match (tier, extended) {
            (WarningTier::Alert, true) => {
                "EXTENDED ALERT: temperature above safe range for over 3 minutes"
            }
            (WarningTier::Alert, false) => "ALERT: temperature above safe range",
            (WarningTier::Warning, _) => "Warning: temperature approaching unsafe range",
            (WarningTier::Safe, _) => "Conditions normal",
        };
        println!("[{}] {message}", Local::now().format("%H:%M:%S"));
    }
}
