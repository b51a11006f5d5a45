//! Process-wide authentication settings.

/// Environment variable holding the session lifetime in seconds.
pub const SESSION_DURATION_VAR: &str = "SESSION_DURATION";

/// Environment variable holding the session cookie name.
pub const SESSION_NAME_VAR: &str = "SESSION_NAME";

/// Settings read once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Session lifetime in seconds. Zero or less disables expiration.
    pub session_duration: i64,

    /// Name of the cookie carrying the session ID.
    pub session_name: Option<String>,
}

impl Config {
    /// Loads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary key lookup.
    ///
    /// A duration that is missing or not an integer falls back to zero.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let session_duration = lookup(SESSION_DURATION_VAR)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0);

        let session_name = lookup(SESSION_NAME_VAR).filter(|name| !name.is_empty());

        Self {
            session_duration,
            session_name,
        }
    }

    /// Sets the session lifetime in seconds.
    pub fn with_session_duration(mut self, seconds: i64) -> Self {
        self.session_duration = seconds;
        self
    }

    /// Sets the session cookie name.
    pub fn with_session_name(mut self, name: impl Into<String>) -> Self {
        self.session_name = Some(name.into());
        self
    }
}
