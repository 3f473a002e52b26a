use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn next(self) -> Self {
        match self {
            RiskLevel::Low => RiskLevel::Medium,
            RiskLevel::Medium => RiskLevel::High,
            RiskLevel::High => RiskLevel::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotSettings {
    pub api_key: String,
    pub api_secret: String,
    pub trading_enabled: bool,
    pub max_position_size: f64,
    pub risk_level: RiskLevel,
    pub notifications_enabled: bool,
    pub notification_email: String,
    pub auto_rebalance: bool,
    pub rebalance_threshold: f64,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            trading_enabled: false,
            max_position_size: 1000.0,
            risk_level: RiskLevel::Medium,
            notifications_enabled: true,
            notification_email: String::new(),
            auto_rebalance: true,
            rebalance_threshold: 5.0,
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for BotSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotSettings")
            .field("api_key", &redact(&self.api_key))
            .field("api_secret", &redact(&self.api_secret))
            .field("trading_enabled", &self.trading_enabled)
            .field("max_position_size", &self.max_position_size)
            .field("risk_level", &self.risk_level)
            .field("notifications_enabled", &self.notifications_enabled)
            .field("notification_email", &self.notification_email)
            .field("auto_rebalance", &self.auto_rebalance)
            .field("rebalance_threshold", &self.rebalance_threshold)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    ApiKey,
    ApiSecret,
    TradingEnabled,
    MaxPositionSize,
    RiskLevel,
    NotificationsEnabled,
    NotificationEmail,
    AutoRebalance,
    RebalanceThreshold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Secret,
    Text,
    Number,
    Toggle,
    Choice,
}

impl SettingsField {
    pub const ALL: [SettingsField; 9] = [
        SettingsField::ApiKey,
        SettingsField::ApiSecret,
        SettingsField::TradingEnabled,
        SettingsField::MaxPositionSize,
        SettingsField::RiskLevel,
        SettingsField::NotificationsEnabled,
        SettingsField::NotificationEmail,
        SettingsField::AutoRebalance,
        SettingsField::RebalanceThreshold,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SettingsField::ApiKey => "API Key",
            SettingsField::ApiSecret => "API Secret",
            SettingsField::TradingEnabled => "Enable Trading",
            SettingsField::MaxPositionSize => "Max Position Size (USD)",
            SettingsField::RiskLevel => "Risk Level",
            SettingsField::NotificationsEnabled => "Enable Notifications",
            SettingsField::NotificationEmail => "Notification Email",
            SettingsField::AutoRebalance => "Enable Auto Rebalancing",
            SettingsField::RebalanceThreshold => "Rebalance Threshold (%)",
        }
    }

    pub fn section(self) -> &'static str {
        match self {
            SettingsField::ApiKey | SettingsField::ApiSecret => "API Configuration",
            SettingsField::TradingEnabled
            | SettingsField::MaxPositionSize
            | SettingsField::RiskLevel => "Trading Parameters",
            SettingsField::NotificationsEnabled | SettingsField::NotificationEmail => {
                "Notifications"
            }
            SettingsField::AutoRebalance | SettingsField::RebalanceThreshold => "Auto Rebalancing",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            SettingsField::ApiKey | SettingsField::ApiSecret => FieldKind::Secret,
            SettingsField::NotificationEmail => FieldKind::Text,
            SettingsField::MaxPositionSize | SettingsField::RebalanceThreshold => FieldKind::Number,
            SettingsField::TradingEnabled
            | SettingsField::NotificationsEnabled
            | SettingsField::AutoRebalance => FieldKind::Toggle,
            SettingsField::RiskLevel => FieldKind::Choice,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("{0} must be a number")]
    NotANumber(&'static str),

    #[error("{0} is disabled")]
    Disabled(&'static str),

    #[error("{0} is not editable as text")]
    NotText(&'static str),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsIssue {
    #[error("Max position size must be greater than 0")]
    NonPositivePositionSize,

    #[error("Notification email is required when notifications are enabled")]
    MissingEmail,

    #[error("Notification email is not a valid address")]
    InvalidEmail,

    #[error("Rebalance threshold must be between 0 and 100")]
    ThresholdOutOfRange,
}

impl BotSettings {
    pub fn validate(&self) -> Vec<SettingsIssue> {
        let mut issues = Vec::new();

        if !(self.max_position_size > 0.0) {
            issues.push(SettingsIssue::NonPositivePositionSize);
        }

        if self.notifications_enabled {
            let email = self.notification_email.trim();
            if email.is_empty() {
                issues.push(SettingsIssue::MissingEmail);
            } else if !email_pattern().is_match(email) {
                issues.push(SettingsIssue::InvalidEmail);
            }
        }

        if self.auto_rebalance && !(0.0..=100.0).contains(&self.rebalance_threshold) {
            issues.push(SettingsIssue::ThresholdOutOfRange);
        }

        issues
    }

    /// Whether the field currently accepts input.
    pub fn is_enabled(&self, field: SettingsField) -> bool {
        match field {
            SettingsField::NotificationEmail => self.notifications_enabled,
            SettingsField::RebalanceThreshold => self.auto_rebalance,
            _ => true,
        }
    }

    /// Text shown for a field; secrets are masked.
    pub fn display_value(&self, field: SettingsField) -> String {
        match field {
            SettingsField::ApiKey => "•".repeat(self.api_key.chars().count()),
            SettingsField::ApiSecret => "•".repeat(self.api_secret.chars().count()),
            SettingsField::TradingEnabled => on_off(self.trading_enabled),
            SettingsField::MaxPositionSize => trim_number(self.max_position_size),
            SettingsField::RiskLevel => self.risk_level.label().to_string(),
            SettingsField::NotificationsEnabled => on_off(self.notifications_enabled),
            SettingsField::NotificationEmail => self.notification_email.clone(),
            SettingsField::AutoRebalance => on_off(self.auto_rebalance),
            SettingsField::RebalanceThreshold => trim_number(self.rebalance_threshold),
        }
    }

    /// Raw text to seed an edit buffer with.
    pub fn edit_value(&self, field: SettingsField) -> String {
        match field {
            SettingsField::ApiKey => self.api_key.clone(),
            SettingsField::ApiSecret => self.api_secret.clone(),
            _ => self.display_value(field),
        }
    }

    /// Apply typed input. Numeric fields must parse; on failure the old value stays.
    pub fn set_text(&mut self, field: SettingsField, input: &str) -> Result<(), FieldError> {
        if !self.is_enabled(field) {
            return Err(FieldError::Disabled(field.label()));
        }
        match field {
            SettingsField::ApiKey => self.api_key = input.to_string(),
            SettingsField::ApiSecret => self.api_secret = input.to_string(),
            SettingsField::NotificationEmail => self.notification_email = input.trim().to_string(),
            SettingsField::MaxPositionSize => {
                self.max_position_size = parse_number(field, input)?;
            }
            SettingsField::RebalanceThreshold => {
                self.rebalance_threshold = parse_number(field, input)?;
            }
            _ => return Err(FieldError::NotText(field.label())),
        }
        Ok(())
    }

    /// Toggle a switch or cycle a choice. Returns false for text fields.
    pub fn toggle(&mut self, field: SettingsField) -> bool {
        match field {
            SettingsField::TradingEnabled => self.trading_enabled = !self.trading_enabled,
            SettingsField::NotificationsEnabled => {
                self.notifications_enabled = !self.notifications_enabled
            }
            SettingsField::AutoRebalance => self.auto_rebalance = !self.auto_rebalance,
            SettingsField::RiskLevel => self.risk_level = self.risk_level.next(),
            _ => return false,
        }
        true
    }
}

fn parse_number(field: SettingsField, input: &str) -> Result<f64, FieldError> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(FieldError::NotANumber(field.label()))
}

fn on_off(value: bool) -> String {
    if value { "On" } else { "Off" }.to_string()
}

fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    shown_at: Instant,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.shown_at) >= ttl
    }
}

/// Settings screen state: the draft, cursor, in-progress edit and last notification.
pub struct SettingsForm {
    pub draft: BotSettings,
    selected: usize,
    editing: Option<String>,
    saving: bool,
    notification: Option<Notification>,
    notification_ttl: Duration,
}

impl SettingsForm {
    pub fn new(notification_ttl: Duration) -> Self {
        Self {
            draft: BotSettings::default(),
            selected: 0,
            editing: None,
            saving: false,
            notification: None,
            notification_ttl,
        }
    }

    pub fn selected_field(&self) -> SettingsField {
        SettingsField::ALL[self.selected]
    }

    pub fn select_next(&mut self) {
        if self.editing.is_none() {
            self.selected = (self.selected + 1) % SettingsField::ALL.len();
        }
    }

    pub fn select_prev(&mut self) {
        if self.editing.is_none() {
            self.selected = (self.selected + SettingsField::ALL.len() - 1) % SettingsField::ALL.len();
        }
    }

    pub fn edit_buffer(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Enter on the selected field: toggles switch right away, opens an edit buffer otherwise.
    pub fn activate(&mut self) {
        let field = self.selected_field();
        if self.draft.toggle(field) {
            return;
        }
        if !self.draft.is_enabled(field) {
            self.notify(FieldError::Disabled(field.label()).to_string(), Severity::Error);
            return;
        }
        self.editing = Some(self.draft.edit_value(field));
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(buffer) = self.editing.as_mut() {
            buffer.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(buffer) = self.editing.as_mut() {
            buffer.pop();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn commit_edit(&mut self) -> Result<(), FieldError> {
        let Some(buffer) = self.editing.take() else {
            return Ok(());
        };
        let field = self.selected_field();
        match self.draft.set_text(field, &buffer) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.notify(e.to_string(), Severity::Error);
                Err(e)
            }
        }
    }

    /// Hand back a copy of the draft to submit. Only one save runs at a time.
    /// Validation issues never block a save; they are shown as form warnings.
    pub fn begin_save(&mut self) -> Option<BotSettings> {
        if self.saving {
            return None;
        }
        for issue in self.draft.validate() {
            warn!("Saving settings with warning: {}", issue);
        }
        self.saving = true;
        Some(self.draft.clone())
    }

    pub fn warnings(&self) -> Vec<SettingsIssue> {
        self.draft.validate()
    }

    /// The draft is left as-is either way so a failed save can be retried.
    pub fn finish_save<E: fmt::Display>(&mut self, result: Result<(), E>) {
        self.saving = false;
        match result {
            Ok(()) => {
                info!("Settings saved");
                self.notify("Settings saved successfully", Severity::Success);
            }
            Err(e) => {
                warn!("Failed to save settings: {}", e);
                self.notify("Failed to save settings", Severity::Error);
            }
        }
    }

    fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        self.notification = Some(Notification::new(message, severity));
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// Drop the notification once it has been shown for the configured time.
    pub fn expire_notification(&mut self, now: Instant) {
        if self
            .notification
            .as_ref()
            .is_some_and(|n| n.is_expired(now, self.notification_ttl))
        {
            self.notification = None;
        }
    }
}
