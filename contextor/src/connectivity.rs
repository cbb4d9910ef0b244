//! Connectivity probe deciding whether online retrieval is possible.
//!
//! The HTTP probe is wrapped in [`CachedProbe`] so a burst of questions
//! triggers at most one network check per TTL window.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use std::{future::Future, pin::Pin};

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ContextorError;

/// Boxed future returned by [`ConnectivityProbe::is_online`].
pub type ProbeFuture<'a> = Pin<Box<dyn Future<Output = bool> + Send + 'a>>;

/// Side-effect-free connectivity check.
pub trait ConnectivityProbe: Send + Sync {
    fn is_online(&self) -> ProbeFuture<'_>;
}

/// Online when a GET to `url` gets any HTTP response within the timeout.
pub struct HttpConnectivityProbe {
    http: reqwest::Client,
    url: String,
}

impl HttpConnectivityProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ContextorError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

impl ConnectivityProbe for HttpConnectivityProbe {
    fn is_online(&self) -> ProbeFuture<'_> {
        Box::pin(async move {
            match self.http.get(&self.url).send().await {
                Ok(_) => true,
                Err(e) => {
                    debug!(url = %self.url, error = %e, "connectivity probe failed");
                    false
                }
            }
        })
    }
}

/// Reuses the inner probe's answer for `ttl`.
pub struct CachedProbe<P> {
    inner: P,
    ttl: Duration,
    last: Mutex<Option<(Instant, bool)>>,
}

impl<P: ConnectivityProbe> CachedProbe<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            last: Mutex::new(None),
        }
    }
}

impl<P: ConnectivityProbe> ConnectivityProbe for CachedProbe<P> {
    fn is_online(&self) -> ProbeFuture<'_> {
        Box::pin(async move {
            // Held across the probe so concurrent callers share one check.
            let mut last = self.last.lock().await;
            if let Some((at, online)) = *last {
                if at.elapsed() < self.ttl {
                    return online;
                }
            }
            let online = self.inner.is_online().await;
            *last = Some((Instant::now(), online));
            debug!(online, "connectivity refreshed");
            online
        })
    }
}

/// Fixed answer; used for `FORCE_OFFLINE` and in tests.
#[derive(Debug, Default)]
pub struct FixedProbe {
    online: AtomicBool,
}

impl FixedProbe {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }
}

impl ConnectivityProbe for FixedProbe {
    fn is_online(&self) -> ProbeFuture<'_> {
        let online = self.online.load(Ordering::Relaxed);
        Box::pin(async move { online })
    }
}
