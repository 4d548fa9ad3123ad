use std::time::Duration;

/// Transport settings shared by every extension.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Applies to HTTP origins only. Local commands run to completion.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
