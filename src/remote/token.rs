//! Background access-token maintenance.
//!
//! While started, the manager refreshes the access token shortly before it
//! expires and periodically checks that the session is still accepted.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

use super::client::RemoteClient;

/// Refresh one minute before the backend's 15 minute token expiry.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(14 * 60);

/// How often the session is checked.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Owns the scheduled refresh task. Dropping the manager stops the task.
#[derive(Debug)]
pub struct TokenManager {
    refresh_interval: Duration,
    heartbeat_interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl TokenManager {
    pub fn new() -> Self {
        Self::with_intervals(REFRESH_INTERVAL, HEARTBEAT_INTERVAL)
    }

    pub fn with_intervals(refresh_interval: Duration, heartbeat_interval: Duration) -> Self {
        Self {
            refresh_interval,
            heartbeat_interval,
            task: None,
        }
    }

    /// Start refreshing tokens for `client`, replacing any running task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, client: RemoteClient) {
        self.stop();

        let mut refresh = interval_at(Instant::now() + self.refresh_interval, self.refresh_interval);
        let mut heartbeat =
            interval_at(Instant::now() + self.heartbeat_interval, self.heartbeat_interval);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.task = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = refresh.tick() => {
                        if let Err(e) = client.refresh_token().await {
                            warn!(error = %e, "Token refresh failed; session expired");
                            client.set_token(None).await;
                            break;
                        }
                    }
                    _ = heartbeat.tick() => {
                        if let Err(e) = client.heartbeat().await {
                            warn!(error = %e, "Session heartbeat failed");
                        }
                    }
                }
            }
        }));
        info!("Token auto-refresh started");
    }

    /// Stop the scheduled task, if any.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Token auto-refresh stopped");
        }
    }

    /// True while the task is scheduled and has not ended on its own.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Default for TokenManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TokenManager {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemoteConfig;

    fn client() -> RemoteClient {
        RemoteClient::new(&RemoteConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let mut manager = TokenManager::new();
        assert!(!manager.is_running());

        manager.start(client());
        assert!(manager.is_running());

        manager.stop();
        assert!(!manager.is_running());
    }

    #[tokio::test]
    async fn test_restart_replaces_task() {
        let mut manager = TokenManager::new();
        manager.start(client());
        manager.start(client());
        assert!(manager.is_running());
    }
}
