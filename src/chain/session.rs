//! Lazily connected, cached chain handle for the selected endpoint.

use super::{ChainConnector, ChainHandle};
use crate::types::ChainContext;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct ChainSession<C: ChainConnector> {
    connector: C,
    cached: Mutex<Option<(String, Arc<C::Handle>)>>,
}

impl<C: ChainConnector> ChainSession<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            cached: Mutex::new(None),
        }
    }

    /// Handle for `endpoint`, connecting on first use.
    ///
    /// Concurrent callers wait on the same lock, so only one connection is
    /// opened. A failed attempt leaves nothing cached and the next call retries.
    pub async fn handle(&self, endpoint: &str) -> Result<Arc<C::Handle>> {
        let mut cached = self.cached.lock().await;
        if let Some((cached_endpoint, handle)) = cached.as_ref() {
            if cached_endpoint == endpoint {
                return Ok(Arc::clone(handle));
            }
            tracing::debug!("Endpoint changed from {} to {}", cached_endpoint, endpoint);
        }

        let handle = Arc::new(self.connector.connect(endpoint).await?);
        *cached = Some((endpoint.to_string(), Arc::clone(&handle)));
        Ok(handle)
    }

    /// Drop the cached handle; the next [`Self::handle`] call reconnects.
    pub async fn reset(&self) {
        *self.cached.lock().await = None;
    }

    pub async fn is_connected(&self) -> bool {
        self.cached.lock().await.is_some()
    }

    /// Endpoint and precision of the cached connection, if any.
    pub async fn context(&self) -> Option<ChainContext> {
        self.cached
            .lock()
            .await
            .as_ref()
            .map(|(endpoint, handle)| ChainContext {
                endpoint: endpoint.clone(),
                decimal_precision: handle.decimal_precision(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::EncodedCall;
    use anyhow::bail;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubHandle(String);

    impl ChainHandle for StubHandle {
        fn decimal_precision(&self) -> u32 {
            12
        }

        fn build_transfer(&self, _dest: &str, _value: u128) -> Result<EncodedCall> {
            Ok(EncodedCall::new(self.0.as_bytes().to_vec()))
        }

        fn build_proxy(
            &self,
            _real: &str,
            _force_proxy_type: Option<&str>,
            call: EncodedCall,
        ) -> Result<EncodedCall> {
            Ok(call)
        }

        fn build_batch(&self, calls: Vec<EncodedCall>) -> Result<EncodedCall> {
            Ok(EncodedCall::new(calls.into_iter().flat_map(|c| c.into_bytes()).collect()))
        }
    }

    #[derive(Default)]
    struct CountingConnector {
        attempts: Arc<AtomicUsize>,
        fail_first: bool,
    }

    impl ChainConnector for CountingConnector {
        type Handle = StubHandle;

        async fn connect(&self, endpoint: &str) -> Result<StubHandle> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && attempt == 0 {
                bail!("connection refused");
            }
            Ok(StubHandle(endpoint.to_string()))
        }
    }

    #[tokio::test]
    async fn test_handle_is_cached_per_endpoint() {
        let connector = CountingConnector::default();
        let attempts = Arc::clone(&connector.attempts);
        let session = ChainSession::new(connector);

        let first = session.handle("wss://a").await.unwrap();
        let second = session.handle("wss://a").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_new_endpoint_reconnects() {
        let connector = CountingConnector::default();
        let attempts = Arc::clone(&connector.attempts);
        let session = ChainSession::new(connector);

        session.handle("wss://a").await.unwrap();
        let handle = session.handle("wss://b").await.unwrap();
        assert_eq!(handle.0, "wss://b");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_connection_not_cached() {
        let connector = CountingConnector {
            fail_first: true,
            ..Default::default()
        };
        let session = ChainSession::new(connector);

        assert!(session.handle("wss://a").await.is_err());
        assert!(!session.is_connected().await);
        assert!(session.handle("wss://a").await.is_ok());
    }

    #[tokio::test]
    async fn test_context_reports_cached_connection() {
        let session = ChainSession::new(CountingConnector::default());
        assert_eq!(session.context().await, None);

        session.handle("wss://a").await.unwrap();
        let context = session.context().await.unwrap();
        assert_eq!(context.endpoint, "wss://a");
        assert_eq!(context.decimal_precision, 12);
    }

    #[test]
    fn test_reset_forces_reconnect() {
        let connector = CountingConnector::default();
        let attempts = Arc::clone(&connector.attempts);
        let session = ChainSession::new(connector);

        tokio_test::block_on(async {
            session.handle("wss://a").await.unwrap();
            session.reset().await;
            assert!(!session.is_connected().await);
            session.handle("wss://a").await.unwrap();
        });
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
