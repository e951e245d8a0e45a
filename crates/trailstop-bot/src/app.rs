//! Main application orchestration.
//!
//! Wires the credential store, quote client, tracker and notification
//! channels together, then drives two independent periodic tasks:
//! - quote sync: fetch prices and feed the trailing-stop state machine
//! - alert flush: deliver pending breach alerts through the channels
//!
//! One failed iteration never stops a loop; errors are logged and the
//! next tick proceeds. Ctrl-C cancels both loops and exits cleanly.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use trailstop_auth::{CredentialStore, SecretCodec, TokenClient};
use trailstop_core::{Price, Ticker};
use trailstop_notify::{Notifier, NotifierSet, NtfyNotifier};
use trailstop_quotes::QuoteClient;
use trailstop_store::{MemoryStore, StateStore};
use trailstop_tracker::{PositionTracker, TrackerError};

use crate::config::{AppConfig, Secrets};
use crate::error::{AppError, AppResult};

/// Main application.
pub struct Application {
    config: AppConfig,
    tracker: Arc<PositionTracker<MemoryStore>>,
    quotes: Arc<QuoteClient<MemoryStore>>,
    notifier: Arc<NotifierSet>,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application").finish_non_exhaustive()
    }
}

impl Application {
    /// Wire up all components and bootstrap the broker credential.
    ///
    /// Fails fast on configuration problems: a bad encryption key, a
    /// missing seed token on first start, an invalid stop-loss ratio or
    /// an unparseable configured symbol.
    pub async fn new(config: AppConfig, secrets: Secrets) -> AppResult<Self> {
        let store = Arc::new(MemoryStore::new());

        let codec = SecretCodec::from_hex(&secrets.encryption_key_hex)?;
        let token_client = TokenClient::new(
            &config.login_url,
            Some(Duration::from_secs(config.request_timeout_secs)),
        )?;
        let credentials = Arc::new(CredentialStore::new(store.clone(), codec, token_client));
        credentials
            .bootstrap(secrets.seed_refresh_token.as_deref())
            .await?;

        let tracker = Arc::new(PositionTracker::new(store.clone(), config.stop_loss_ratio)?);
        let quotes = Arc::new(QuoteClient::new(
            credentials,
            config.quote_client_config(),
        )?);

        let mut notifier = NotifierSet::new();
        if let Some(ntfy) = &config.ntfy {
            notifier.push(Box::new(NtfyNotifier::new(&ntfy.base_url, &ntfy.topic)?));
        }
        if notifier.is_empty() {
            warn!("No notification channels configured, breaches will only be logged");
        }

        let app = Self {
            config,
            tracker,
            quotes,
            notifier: Arc::new(notifier),
        };
        app.seed_symbols()?;
        Ok(app)
    }

    /// Seed tracking from the configured symbol list.
    ///
    /// An already-tracked symbol keeps its persisted peak; the configured
    /// price never resets accumulated state.
    fn seed_symbols(&self) -> AppResult<()> {
        for symbol in &self.config.symbols {
            let ticker = Ticker::new(&symbol.ticker)
                .map_err(|e| AppError::Config(format!("Bad symbol entry: {e}")))?;
            let price = Price::new(symbol.price)
                .map_err(|e| AppError::Config(format!("Bad price for {ticker}: {e}")))?;
            match self
                .tracker
                .add_symbol(ticker.clone(), price, symbol.currency.clone())
            {
                Ok(()) => {}
                Err(TrackerError::Duplicate(_)) => {
                    debug!(%ticker, "Symbol already tracked, keeping existing state");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Run until Ctrl-C.
    pub async fn run(self) -> AppResult<()> {
        if self.config.discover_positions {
            match self
                .quotes
                .discover_positions(&self.tracker, &self.config.default_currency)
                .await
            {
                Ok(added) => info!(added, "Position discovery complete"),
                Err(e) => {
                    warn!(error = %e, "Position discovery failed, continuing with configured symbols");
                }
            }
        }

        info!(
            symbols = self.tracker.symbols()?.len(),
            channels = self.notifier.len(),
            sync_interval_secs = self.config.sync_interval_secs,
            alert_interval_secs = self.config.alert_interval_secs,
            "Starting periodic tasks"
        );

        let shutdown = CancellationToken::new();
        let sync_handle: JoinHandle<()> = tokio::spawn(sync_loop(
            self.quotes.clone(),
            self.tracker.clone(),
            self.config.sync_interval(),
            shutdown.clone(),
        ));
        let alert_handle: JoinHandle<()> = tokio::spawn(alert_loop(
            self.tracker.clone(),
            self.notifier.clone(),
            self.config.alert_recipient.clone(),
            self.config.alert_interval(),
            shutdown.clone(),
        ));

        tokio::signal::ctrl_c().await?;
        info!("Shutdown signal received");
        shutdown.cancel();

        let _ = sync_handle.await;
        let _ = alert_handle.await;
        info!("Shutdown complete");
        Ok(())
    }
}

/// Periodic quote sync. The first tick fires immediately.
async fn sync_loop<S: StateStore>(
    quotes: Arc<QuoteClient<S>>,
    tracker: Arc<PositionTracker<S>>,
    period: Duration,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = quotes.sync_all(&tracker).await {
                    error!(error = %e, "Quote sync failed, will retry next cycle");
                }
            }
            _ = shutdown.cancelled() => {
                info!("Sync loop stopped");
                break;
            }
        }
    }
}

/// Periodic alert flush, independent of the sync cadence.
async fn alert_loop<S: StateStore, N: Notifier>(
    tracker: Arc<PositionTracker<S>>,
    notifier: Arc<N>,
    recipient: String,
    period: Duration,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match tracker.flush_alerts(notifier.as_ref(), &recipient).await {
                    Ok(outcome) if outcome.notified > 0 => {
                        info!(notified = outcome.notified, "Alerts delivered");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!(error = %e, "Alert flush failed, will retry next cycle");
                    }
                }
            }
            _ = shutdown.cancelled() => {
                info!("Alert loop stopped");
                break;
            }
        }
    }
}
