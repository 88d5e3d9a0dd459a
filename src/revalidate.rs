use tokio::sync::broadcast;

/// A request to discard the cached rendering of `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revalidation {
    pub path: String,
}

/// Fire-and-forget channel from mutating actions to the rendering layer.
///
/// Actions call [`Revalidator::revalidate`] after their writes succeed.
/// Anything interested (the server's listener, tests) calls `subscribe`.
#[derive(Clone)]
pub struct Revalidator {
    sender: broadcast::Sender<Revalidation>,
}

impl Revalidator {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Revalidation> {
        self.sender.subscribe()
    }

    /// Signal that `path` is stale. Never blocks and never fails the caller.
    pub fn revalidate(&self, path: &str) {
        let event = Revalidation {
            path: path.to_string(),
        };
        match self.sender.send(event) {
            Ok(listeners) => tracing::debug!(path, listeners, "Revalidation requested"),
            Err(_) => tracing::trace!(path, "Revalidation dropped, no listeners"),
        }
    }
}

impl Default for Revalidator {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Log every revalidation until the channel closes.
pub async fn log_revalidations(mut receiver: broadcast::Receiver<Revalidation>) {
    loop {
        match receiver.recv().await {
            Ok(event) => tracing::info!(path = %event.path, "Revalidating path"),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "Revalidation listener lagged")
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revalidate_without_listeners_is_silent() {
        let revalidator = Revalidator::default();
        revalidator.revalidate("/");
    }

    #[test]
    fn test_subscriber_receives_path() {
        let revalidator = Revalidator::default();
        let mut rx = revalidator.subscribe();

        revalidator.revalidate("/question/1");

        assert_eq!(
            rx.try_recv().unwrap(),
            Revalidation {
                path: "/question/1".to_string()
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_log_revalidations_stops_when_closed() {
        let revalidator = Revalidator::default();
        let rx = revalidator.subscribe();
        revalidator.revalidate("/");
        drop(revalidator);

        log_revalidations(rx).await;
    }
}
