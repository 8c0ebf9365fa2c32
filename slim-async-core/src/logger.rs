//! Action logging with pattern-based filtering and in-memory storage
//!
//! [`ActionLoggerMiddleware`] is a store observer. It logs every action that
//! reaches the reducer through `tracing`, filtered by glob patterns on the
//! action type, and can keep the most recent entries in an [`ActionLog`].
//! Error notifications (`error: true`) are logged at `warn` level and
//! flagged in the log.
//!
//! # Example
//!
//! ```
//! use slim_async_core::logger::{ActionLogConfig, ActionLoggerConfig, ActionLoggerMiddleware};
//! use slim_async_core::{FluxAction, Middleware};
//!
//! let config = ActionLogConfig::new(50, ActionLoggerConfig::new(Some("USER_*"), None));
//! let mut logger = ActionLoggerMiddleware::with_log(config);
//!
//! let action = FluxAction::new("USER_ERROR").with_error(true);
//! logger.before(&action);
//! logger.after(&action, true);
//!
//! let log = logger.log().unwrap();
//! assert_eq!(log.errors().count(), 1);
//! ```

use std::collections::VecDeque;
use std::time::Instant;

use crate::action::ActionSummary;
use crate::store::Middleware;

/// Glob filters on action types.
///
/// Patterns support `*` (any sequence) and `?` (any single character), so
/// `USER_*` selects one operation's three actions and `*_PENDING` selects
/// every pending notification.
#[derive(Debug, Clone, Default)]
pub struct ActionLoggerConfig {
    /// If non-empty, only log actions matching these patterns
    pub include_patterns: Vec<String>,
    /// Exclude actions matching these patterns (applied after include)
    pub exclude_patterns: Vec<String>,
}

impl ActionLoggerConfig {
    /// Build from comma-separated pattern lists.
    ///
    /// ```
    /// use slim_async_core::logger::ActionLoggerConfig;
    ///
    /// let config = ActionLoggerConfig::new(Some("USER_*, CART_*"), Some("*_PENDING"));
    /// assert!(config.should_log("USER_SUCCESS"));
    /// assert!(!config.should_log("CART_PENDING"));
    /// assert!(!config.should_log("TICK"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include_patterns: include.map(split_patterns).unwrap_or_default(),
            exclude_patterns: exclude.map(split_patterns).unwrap_or_default(),
        }
    }

    pub fn with_patterns(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self {
            include_patterns: include,
            exclude_patterns: exclude,
        }
    }

    /// Whether an action type passes the filters.
    pub fn should_log(&self, action_name: &str) -> bool {
        if !self.include_patterns.is_empty()
            && !self
                .include_patterns
                .iter()
                .any(|p| glob_match(p, action_name))
        {
            return false;
        }

        !self
            .exclude_patterns
            .iter()
            .any(|p| glob_match(p, action_name))
    }
}

fn split_patterns(patterns: &str) -> Vec<String> {
    patterns
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// An entry in the action log
#[derive(Debug, Clone)]
pub struct ActionLogEntry {
    /// Action type
    pub name: String,
    /// One-line summary (from `ActionSummary::summary`)
    pub summary: String,
    /// Whether the action was an error notification
    pub error: bool,
    pub timestamp: Instant,
    /// Sequence number for ordering
    pub sequence: u64,
    /// Set once the reducer has run
    pub state_changed: Option<bool>,
}

impl ActionLogEntry {
    pub fn new(name: impl Into<String>, summary: String, error: bool, sequence: u64) -> Self {
        Self {
            name: name.into(),
            summary,
            error,
            timestamp: Instant::now(),
            sequence,
            state_changed: None,
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.timestamp.elapsed()
    }

    /// Elapsed time for display (e.g. "2.3s", "150ms")
    pub fn elapsed_display(&self) -> String {
        let elapsed = self.elapsed();
        if elapsed.as_secs() >= 1 {
            format!("{:.1}s", elapsed.as_secs_f64())
        } else {
            format!("{}ms", elapsed.as_millis())
        }
    }
}

/// Configuration for the action log ring buffer
#[derive(Debug, Clone)]
pub struct ActionLogConfig {
    /// Maximum number of entries to keep
    pub capacity: usize,
    pub filter: ActionLoggerConfig,
}

impl Default for ActionLogConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            filter: ActionLoggerConfig::default(),
        }
    }
}

impl ActionLogConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    pub fn new(capacity: usize, filter: ActionLoggerConfig) -> Self {
        Self { capacity, filter }
    }
}

/// Ring buffer of recent actions; the oldest entry is dropped at capacity.
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<ActionLogEntry>,
    config: ActionLogConfig,
    next_sequence: u64,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new(ActionLogConfig::default())
    }
}

impl ActionLog {
    pub fn new(config: ActionLogConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(config.capacity),
            config,
            next_sequence: 0,
        }
    }

    /// Record an action if it passes the filter.
    pub fn log<A: ActionSummary>(&mut self, action: &A) -> Option<&ActionLogEntry> {
        let name = action.name();
        if !self.config.filter.should_log(name) {
            return None;
        }

        let entry = ActionLogEntry::new(
            name,
            action.summary(),
            action.is_error(),
            self.next_sequence,
        );
        self.next_sequence += 1;

        if self.entries.len() >= self.config.capacity {
            self.entries.pop_front();
        }

        self.entries.push_back(entry);
        self.entries.back()
    }

    /// Record the reducer outcome on the newest entry.
    pub fn update_last_state_changed(&mut self, changed: bool) {
        if let Some(entry) = self.entries.back_mut() {
            entry.state_changed = Some(changed);
        }
    }

    /// All entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter()
    }

    /// The most recent N entries, newest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter().rev().take(count)
    }

    /// Error notifications, oldest first
    pub fn errors(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter().filter(|entry| entry.error)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn config(&self) -> &ActionLogConfig {
        &self.config
    }
}

/// Store observer that logs actions with pattern filtering.
///
/// - **Tracing only** (`new`): logs via `tracing`
/// - **With storage** (`with_log`): also keeps an [`ActionLog`]
#[derive(Debug, Clone)]
pub struct ActionLoggerMiddleware {
    config: ActionLoggerConfig,
    log: Option<ActionLog>,
    /// Whether the last action made it into the log
    last_action_logged: bool,
    active: bool,
}

impl Default for ActionLoggerMiddleware {
    fn default() -> Self {
        Self::new(ActionLoggerConfig::default())
    }
}

impl ActionLoggerMiddleware {
    /// Tracing only, no in-memory storage
    pub fn new(config: ActionLoggerConfig) -> Self {
        Self {
            config,
            log: None,
            last_action_logged: false,
            active: true,
        }
    }

    /// Tracing plus an in-memory log
    pub fn with_log(config: ActionLogConfig) -> Self {
        Self {
            config: config.filter.clone(),
            log: Some(ActionLog::new(config)),
            last_action_logged: false,
            active: true,
        }
    }

    pub fn with_default_log() -> Self {
        Self::with_log(ActionLogConfig::default())
    }

    /// When inactive every hook is a no-op.
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn log(&self) -> Option<&ActionLog> {
        self.log.as_ref()
    }

    pub fn log_mut(&mut self) -> Option<&mut ActionLog> {
        self.log.as_mut()
    }

    pub fn config(&self) -> &ActionLoggerConfig {
        &self.config
    }
}

impl<A: ActionSummary> Middleware<A> for ActionLoggerMiddleware {
    fn before(&mut self, action: &A) {
        if !self.active {
            return;
        }

        let name = action.name();
        if self.config.should_log(name) {
            if action.is_error() {
                tracing::warn!(action = %name, summary = %action.summary(), "error action");
            } else {
                tracing::debug!(action = %name, "action");
            }
        }

        self.last_action_logged = false;
        if let Some(ref mut log) = self.log {
            self.last_action_logged = log.log(action).is_some();
        }
    }

    fn after(&mut self, _action: &A, state_changed: bool) {
        if !self.active || !self.last_action_logged {
            return;
        }
        if let Some(ref mut log) = self.log {
            log.update_last_state_changed(state_changed);
        }
    }
}

/// Glob matching with `*` (zero or more characters) and `?` (exactly one).
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < text.len() {
        match pattern.get(pi) {
            Some('?') => {
                pi += 1;
                ti += 1;
            }
            Some('*') => {
                star = Some((pi, ti));
                pi += 1;
            }
            Some(&c) if c == text[ti] => {
                pi += 1;
                ti += 1;
            }
            _ => match star {
                // Backtrack: let the last star swallow one more character
                Some((star_pi, star_ti)) => {
                    pi = star_pi + 1;
                    ti = star_ti + 1;
                    star = Some((star_pi, star_ti + 1));
                }
                None => return false,
            },
        }
    }

    pattern[pi..].iter().all(|&c| c == '*')
}
