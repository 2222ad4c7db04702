//! Warning-tier classification with time-windowed escalation.
//!
//! Temperature maps to a tier through fixed thresholds; an `Alert` that has
//! persisted for three minutes escalates to an extended alert. The start of
//! the current alert episode lives in an injected [`AlertWindowStore`] so it
//! survives restarts and can be faked in tests. All time is passed in by the
//! caller; this module never reads a clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{AlertWindowStore, StoreError};

/// Temperature at or above which a reading is an alert, in degrees Celsius.
pub const ALERT_THRESHOLD_C: f64 = 8.0;

/// Temperature at or above which a reading is a warning, in degrees Celsius.
pub const WARNING_THRESHOLD_C: f64 = 6.0;

/// How long an alert must persist before it counts as extended.
pub const EXTENDED_ALERT_AFTER_SECS: i64 = 180;

/// Safety tier derived from temperature alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningTier {
    Safe,
    Warning,
    Alert,
}

impl WarningTier {
    /// Stable label used in persistence and display.
    pub fn label(&self) -> &'static str {
        match self {
            WarningTier::Safe => "SAFE",
            WarningTier::Warning => "WARNING",
            WarningTier::Alert => "ALERT",
        }
    }

    /// Human-readable description of the tier.
    pub fn description(&self) -> &'static str {
        match self {
            WarningTier::Safe => "Conditions normal",
            WarningTier::Warning => "Temperature approaching unsafe range",
            WarningTier::Alert => "Temperature above safe range",
        }
    }
}

impl std::fmt::Display for WarningTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of classifying one temperature reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub tier: WarningTier,
    /// Only meaningful for [`WarningTier::Alert`]: the episode has lasted
    /// at least [`EXTENDED_ALERT_AFTER_SECS`].
    pub extended: bool,
}

/// Tier state machine over an injected alert-window store.
///
/// The classifier is the sole owner of the alert window: entering `Alert`
/// opens it if unset, leaving `Alert` always clears it, and an already-open
/// window is never reset while the alert holds.
pub struct Classifier {
    window: Box<dyn AlertWindowStore + Send + Sync>,
}

impl Classifier {
    pub fn new(window: Box<dyn AlertWindowStore + Send + Sync>) -> Self {
        Self { window }
    }

    /// Classify a temperature reading taken at `now`.
    ///
    /// Boundaries are closed on the lower bound of each band: exactly 8.0 is
    /// `Alert` and exactly 6.0 is `Warning`. Humidity never affects the tier.
    pub fn classify(
        &self,
        temperature: f64,
        now: DateTime<Utc>,
    ) -> Result<Classification, StoreError> {
        if temperature >= ALERT_THRESHOLD_C {
            let started_at = match self.window.get()? {
                Some(started_at) => started_at,
                None => {
                    self.window.set(now)?;
                    now
                }
            };
            let extended = (now - started_at).num_seconds() >= EXTENDED_ALERT_AFTER_SECS;
            return Ok(Classification {
                tier: WarningTier::Alert,
                extended,
            });
        }

        // Any exit from the alert band closes the episode.
        if self.window.get()?.is_some() {
            self.window.clear()?;
        }

        let tier = if temperature >= WARNING_THRESHOLD_C {
            WarningTier::Warning
        } else {
            WarningTier::Safe
        };
        Ok(Classification {
            tier,
            extended: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryAlertWindowStore;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn classifier() -> (Classifier, MemoryAlertWindowStore) {
        let store = MemoryAlertWindowStore::new();
        (Classifier::new(Box::new(store.clone())), store)
    }

    #[test]
    fn test_safe_below_warning_threshold() {
        let (classifier, store) = classifier();
        for temp in [-10.0, 0.0, 5.0, 5.9] {
            let c = classifier.classify(temp, t0()).unwrap();
            assert_eq!(c.tier, WarningTier::Safe, "temp {temp}");
            assert!(!c.extended);
        }
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_warning_band_closed_on_lower_bound() {
        let (classifier, _) = classifier();
        assert_eq!(
            classifier.classify(6.0, t0()).unwrap().tier,
            WarningTier::Warning
        );
        assert_eq!(
            classifier.classify(7.9, t0()).unwrap().tier,
            WarningTier::Warning
        );
    }

    #[test]
    fn test_alert_band_closed_on_lower_bound() {
        let (classifier, store) = classifier();
        let c = classifier.classify(8.0, t0()).unwrap();
        assert_eq!(c.tier, WarningTier::Alert);
        assert!(!c.extended);
        assert_eq!(store.get().unwrap(), Some(t0()));
    }

    #[test]
    fn test_warning_clears_open_window() {
        let (classifier, store) = classifier();
        classifier.classify(9.0, t0()).unwrap();
        assert!(store.get().unwrap().is_some());

        let c = classifier
            .classify(7.0, t0() + Duration::seconds(10))
            .unwrap();
        assert_eq!(c.tier, WarningTier::Warning);
        assert!(!c.extended);
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_safe_clears_open_window() {
        let (classifier, store) = classifier();
        classifier.classify(9.0, t0()).unwrap();
        classifier
            .classify(3.0, t0() + Duration::seconds(10))
            .unwrap();
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_repeated_alert_never_resets_window() {
        let (classifier, store) = classifier();
        classifier.classify(8.5, t0()).unwrap();
        for secs in [10, 60, 120] {
            classifier
                .classify(8.5, t0() + Duration::seconds(secs))
                .unwrap();
            assert_eq!(store.get().unwrap(), Some(t0()));
        }
    }

    #[test]
    fn test_extended_after_three_minutes() {
        let (classifier, _) = classifier();
        classifier.classify(9.0, t0()).unwrap();

        let c = classifier
            .classify(9.0, t0() + Duration::seconds(179))
            .unwrap();
        assert!(!c.extended);

        let c = classifier
            .classify(9.0, t0() + Duration::seconds(180))
            .unwrap();
        assert!(c.extended);

        // Stays extended while the alert holds.
        let c = classifier
            .classify(9.0, t0() + Duration::seconds(200))
            .unwrap();
        assert!(c.extended);
    }

    #[test]
    fn test_tier_sequence_safe_warning_alert() {
        let (classifier, store) = classifier();
        let readings = [(5.0, 0), (7.0, 10), (9.0, 20)];
        let mut tiers = Vec::new();
        for (temp, secs) in readings {
            let c = classifier
                .classify(temp, t0() + Duration::seconds(secs))
                .unwrap();
            tiers.push(c.tier);
        }
        assert_eq!(
            tiers,
            [WarningTier::Safe, WarningTier::Warning, WarningTier::Alert]
        );
        assert_eq!(store.get().unwrap(), Some(t0() + Duration::seconds(20)));
    }

    #[test]
    fn test_extended_flips_once_during_sustained_alert() {
        let (classifier, _) = classifier();
        let mut flips = 0;
        let mut last = false;
        for secs in (0..=200).step_by(10) {
            let c = classifier
                .classify(9.0, t0() + Duration::seconds(secs))
                .unwrap();
            if c.extended != last {
                flips += 1;
                last = c.extended;
            }
        }
        assert_eq!(flips, 1);
        assert!(last);
    }

    #[test]
    fn test_tier_labels() {
        assert_eq!(WarningTier::Safe.label(), "SAFE");
        assert_eq!(WarningTier::Warning.label(), "WARNING");
        assert_eq!(WarningTier::Alert.label(), "ALERT");
        assert_eq!(format!("{}", WarningTier::Alert), "ALERT");
    }
}
