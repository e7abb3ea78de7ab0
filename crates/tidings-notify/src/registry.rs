//! Runtime selection of the notification back end.
//!
//! # Design
//! - Providers are consulted in registration order; the first one that reports
//!   support and constructs successfully wins.
//! - Construction failures are logged and skipped. The no-op notifier is the
//!   terminal fallback, so resolution never fails.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backends::NoopNotifier;
use crate::error::NotifyResult;
use crate::notifier::Notifier;

/// Capability provider for one back end.
pub trait NotifierProvider: Send + Sync {
    /// Back-end name.
    fn name(&self) -> &'static str;

    /// Whether the back end can run on this host right now.
    fn is_supported(&self) -> bool;

    /// Construct the back end.
    ///
    /// # Errors
    ///
    /// Returns an error when the back end cannot be initialised.
    fn create(&self) -> NotifyResult<Arc<dyn Notifier>>;
}

/// Ordered list of back-end providers.
#[derive(Default)]
pub struct NotifierRegistry {
    providers: Vec<Box<dyn NotifierProvider>>,
}

impl NotifierRegistry {
    /// Empty registry; resolves to the no-op notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider with lower priority than those already registered.
    #[must_use]
    pub fn with_provider(mut self, provider: impl NotifierProvider + 'static) -> Self {
        self.register(Box::new(provider));
        self
    }

    /// In-place variant of [`Self::with_provider`].
    pub fn register(&mut self, provider: Box<dyn NotifierProvider>) {
        self.providers.push(provider);
    }

    /// Names of the registered providers in priority order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|provider| provider.name()).collect()
    }

    /// Pick the first supported back end, falling back to the no-op notifier.
    #[must_use]
    pub fn resolve(&self) -> Arc<dyn Notifier> {
        for provider in &self.providers {
            if !provider.is_supported() {
                debug!(backend = provider.name(), "notifier back end not supported");
                continue;
            }
            match provider.create() {
                Ok(notifier) => {
                    info!(backend = notifier.name(), "selected notifier back end");
                    return notifier;
                }
                Err(error) => {
                    warn!(
                        backend = provider.name(),
                        error = %error,
                        "notifier back end failed to initialise"
                    );
                }
            }
        }
        debug!("falling back to the no-op notifier");
        Arc::new(NoopNotifier)
    }
}
