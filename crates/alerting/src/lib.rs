//! Alerting System
//!
//! Provides index-based alert cooldown, localized alert text, and
//! notification channels with per-channel failure isolation.

pub mod channels;
mod dispatcher;
mod i18n;
mod manager;

pub use channels::{
    ChannelKind, Notifier, NotifyError, SmsConfig, SmsNotifier, WhatsAppConfig, WhatsAppNotifier,
};
pub use dispatcher::{DeliveryReport, Dispatcher};
pub use i18n::{Language, Templates};
pub use manager::{AlertConfig, AlertManager, AlertState, CooldownDecision};
