//! Alert Manager Implementation

use crate::channels::ChannelKind;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Minimum sample-index distance between dispatched alerts (default: 5)
    pub cooldown_samples: usize,
    /// Upper bound on a single channel delivery (milliseconds)
    pub channel_timeout_ms: u64,
    /// Channels that receive alerts
    pub channels: Vec<ChannelKind>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_samples: 5,
            channel_timeout_ms: 10_000,
            channels: vec![ChannelKind::WhatsApp, ChannelKind::Sms],
        }
    }
}

/// Outcome of a cooldown check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownDecision {
    /// Outside the cooldown window, an alert may be sent
    Ready,
    /// Inside the window opened by `last_alert_index`
    Cooling {
        last_alert_index: usize,
        /// Samples still to pass before the next alert is allowed
        remaining: usize,
    },
}

impl CooldownDecision {
    pub fn is_ready(&self) -> bool {
        matches!(self, CooldownDecision::Ready)
    }
}

/// Cooldown state for one streaming session
///
/// Distance is measured in sample indices, not wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertState {
    last_alert_index: Option<usize>,
    cooldown: usize,
}

impl AlertState {
    /// Fresh state, no alert sent yet
    pub fn new(cooldown: usize) -> Self {
        Self {
            last_alert_index: None,
            cooldown,
        }
    }

    /// Index of the most recent dispatched alert
    pub fn last_alert_index(&self) -> Option<usize> {
        self.last_alert_index
    }

    /// Check whether an alert for `index` is allowed
    pub fn check(&self, index: usize) -> CooldownDecision {
        match self.last_alert_index {
            None => CooldownDecision::Ready,
            Some(last) => {
                let distance = index.saturating_sub(last);
                if distance >= self.cooldown {
                    CooldownDecision::Ready
                } else {
                    CooldownDecision::Cooling {
                        last_alert_index: last,
                        remaining: self.cooldown - distance,
                    }
                }
            }
        }
    }

    /// Mark an alert as dispatched at `index`
    pub fn record(&mut self, index: usize) {
        self.last_alert_index = Some(index);
    }

    /// Forget the last alert
    pub fn reset(&mut self) {
        self.last_alert_index = None;
    }
}

/// Alert manager for cooldown tracking
pub struct AlertManager {
    /// Cooldown state for the current session
    state: AlertState,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(config: AlertConfig) -> Self {
        info!("Creating alert manager with config: {:?}", config);
        Self {
            state: AlertState::new(config.cooldown_samples),
        }
    }

    /// Check if an alert for a fault at `index` should be dispatched
    pub fn should_fire(&mut self, index: usize) -> CooldownDecision {
        let decision = self.state.check(index);
        if let CooldownDecision::Cooling { remaining, .. } = decision {
            debug!("Alert suppressed at {}: {} samples of cooldown left", index, remaining);
        }
        decision
    }

    /// Record that an alert was dispatched at `index`
    pub fn record_fire(&mut self, index: usize) {
        self.state.record(index);
        info!("Alert recorded at sample {}", index);
    }

    /// Current cooldown state
    pub fn state(&self) -> &AlertState {
        &self.state
    }

    /// Reset for a new session
    pub fn clear(&mut self) {
        self.state.reset();
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_fault_always_ready() {
        let state = AlertState::new(5);
        assert_eq!(state.last_alert_index(), None);
        assert!(state.check(0).is_ready());
        assert!(state.check(1000).is_ready());
    }

    #[test]
    fn test_cooldown_window_edges() {
        let mut state = AlertState::new(5);
        state.record(3);

        assert_eq!(
            state.check(7),
            CooldownDecision::Cooling {
                last_alert_index: 3,
                remaining: 1
            }
        );
        assert!(state.check(8).is_ready());
    }

    #[test]
    fn test_zero_cooldown_never_suppresses() {
        let mut state = AlertState::new(0);
        state.record(4);
        assert!(state.check(4).is_ready());
        assert!(state.check(5).is_ready());
    }

    #[test]
    fn test_manager_tracks_last_alert_and_clear() {
        let mut manager = AlertManager::default();

        assert!(manager.should_fire(2).is_ready());
        manager.record_fire(2);
        assert!(!manager.should_fire(5).is_ready());
        assert!(manager.should_fire(9).is_ready());
        manager.record_fire(9);

        assert_eq!(manager.state().last_alert_index(), Some(9));

        manager.clear();
        assert_eq!(manager.state().last_alert_index(), None);
        assert!(manager.should_fire(10).is_ready());
    }

    #[test]
    fn test_config_deserializes_channel_names() {
        let config: AlertConfig =
            serde_json::from_str(r#"{"cooldown_samples": 3, "channels": ["sms"]}"#).unwrap();
        assert_eq!(config.cooldown_samples, 3);
        assert_eq!(config.channels, vec![ChannelKind::Sms]);
        assert_eq!(config.channel_timeout_ms, 10_000);
    }

    proptest! {
        #[test]
        fn prop_ready_iff_distance_reaches_cooldown(
            cooldown in 0usize..20,
            last in 0usize..100,
            gap in 0usize..40,
        ) {
            let mut state = AlertState::new(cooldown);
            state.record(last);
            prop_assert_eq!(state.check(last + gap).is_ready(), gap >= cooldown);
        }
    }
}
