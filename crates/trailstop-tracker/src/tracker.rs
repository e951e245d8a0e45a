//! The position tracker: trailing stop-loss state machine with a
//! pending-alert set.
//!
//! Breach is not a terminal state. It only toggles membership in the
//! pending set; price updates keep flowing through the same path. The
//! pending set survives cooldown-skipped flushes, so a breach observed
//! during the cooldown window is alerted on a later cycle instead of
//! being lost.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use trailstop_core::{Price, Ticker};
use trailstop_notify::Notifier;
use trailstop_store::{StateStore, StoreError, SymbolRecord};

use crate::alerts::{compose_alert_message, ALERT_SUBJECT};
use crate::error::{TrackerError, TrackerResult};

/// Per-symbol alert cooldown: a breach already alerted within this
/// window stays pending but is not re-sent.
pub const ALERT_COOLDOWN_SECS: i64 = 86_400;

/// Result of one price update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    /// The update raised the peak (and with it the threshold).
    pub new_peak: bool,
    /// The symbol is below its threshold and pending alert.
    pub breached: bool,
}

/// Result of one alert flush pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushOutcome {
    /// Tickers included in the delivered message.
    pub notified: usize,
    /// Pending tickers skipped by the cooldown (still pending).
    pub skipped_cooldown: usize,
}

/// Owns tracked-symbol state and the pending-alert set.
///
/// Internally synchronized: the pending-set mutex also serializes every
/// read-modify-write pass over symbol rows, so the sync and alert tasks
/// can share one instance.
pub struct PositionTracker<S> {
    store: Arc<S>,
    stop_loss_ratio: Decimal,
    pending: Mutex<HashSet<Ticker>>,
}

impl<S: StateStore> PositionTracker<S> {
    /// Create a tracker with the given stop-loss ratio in `(0, 1]`.
    pub fn new(store: Arc<S>, stop_loss_ratio: Decimal) -> TrackerResult<Self> {
        if stop_loss_ratio <= Decimal::ZERO || stop_loss_ratio > Decimal::ONE {
            return Err(TrackerError::InvalidRatio(stop_loss_ratio));
        }
        Ok(Self {
            store,
            stop_loss_ratio,
            pending: Mutex::new(HashSet::new()),
        })
    }

    /// Start tracking a symbol at `peak = current = initial_price`.
    pub fn add_symbol(
        &self,
        ticker: Ticker,
        initial_price: Price,
        currency: impl Into<String>,
    ) -> TrackerResult<()> {
        let _guard = self.pending.lock();
        let stop_loss = initial_price.scale(self.stop_loss_ratio);
        let record = SymbolRecord::new(ticker.clone(), initial_price, stop_loss, currency.into());

        match self.store.insert_symbol(record) {
            Ok(()) => {
                info!(%ticker, price = %initial_price, threshold = %stop_loss, "Symbol tracked");
                Ok(())
            }
            Err(StoreError::DuplicateSymbol(t)) => Err(TrackerError::Duplicate(t)),
            Err(e) => Err(e.into()),
        }
    }

    /// Stop tracking a symbol and drop any pending alert for it.
    pub fn remove_symbol(&self, ticker: &Ticker) -> TrackerResult<()> {
        let mut pending = self.pending.lock();
        match self.store.remove_symbol(ticker) {
            Ok(()) => {
                pending.remove(ticker);
                info!(%ticker, "Symbol untracked");
                Ok(())
            }
            Err(StoreError::SymbolNotFound(t)) => Err(TrackerError::NotFound(t)),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply a new price observation.
    ///
    /// Raising the peak ratchets the threshold to `price * ratio`; the
    /// threshold never moves down. A price below the threshold inserts
    /// the ticker into the pending set idempotently (an already-pending
    /// ticker is not re-stamped).
    pub fn update(&self, ticker: &Ticker, price: Price) -> TrackerResult<UpdateOutcome> {
        let mut pending = self.pending.lock();
        let mut row = self
            .store
            .get_symbol(ticker)?
            .ok_or_else(|| TrackerError::NotFound(ticker.clone()))?;

        row.current_price = price;
        let new_peak = price > row.peak_price;
        if new_peak {
            row.peak_price = price;
            row.stop_loss = price.scale(self.stop_loss_ratio);
            debug!(%ticker, peak = %price, threshold = %row.stop_loss, "New peak");
        }

        let breached = row.current_price < row.stop_loss;
        let threshold = row.stop_loss;
        self.store.update_symbol(row)?;

        if breached && pending.insert(ticker.clone()) {
            warn!(%ticker, price = %price, threshold = %threshold, "Stop-loss breached");
        }

        Ok(UpdateOutcome { new_peak, breached })
    }

    /// Cache a resolved broker symbol id onto the row.
    pub fn cache_broker_id(&self, ticker: &Ticker, broker_symbol_id: u64) -> TrackerResult<()> {
        let _guard = self.pending.lock();
        let mut row = self
            .store
            .get_symbol(ticker)?
            .ok_or_else(|| TrackerError::NotFound(ticker.clone()))?;
        row.broker_symbol_id = Some(broker_symbol_id);
        self.store.update_symbol(row)?;
        Ok(())
    }

    /// Whether a ticker is currently tracked.
    pub fn is_tracked(&self, ticker: &Ticker) -> TrackerResult<bool> {
        Ok(self.store.get_symbol(ticker)?.is_some())
    }

    /// Snapshot of all tracked symbol rows.
    pub fn symbols(&self) -> TrackerResult<Vec<SymbolRecord>> {
        Ok(self.store.list_symbols()?)
    }

    /// Snapshot of the pending-alert set (sorted, for logs and tests).
    pub fn pending_alerts(&self) -> Vec<Ticker> {
        let mut tickers: Vec<_> = self.pending.lock().iter().cloned().collect();
        tickers.sort();
        tickers
    }

    /// Flush pending alerts through the notifier.
    ///
    /// Selects pending tickers outside the 24 h cooldown, composes one
    /// aggregated message and sends it. Bookkeeping is all-or-nothing
    /// per flush: only after a delivered send are the included tickers
    /// stamped and removed from the pending set. A failed send leaves
    /// the set untouched for the next cycle; cooldown-skipped tickers
    /// stay pending as well.
    ///
    /// Selection and stamping each hold the pending lock for the whole
    /// read-modify-write pass (released across the send), so a
    /// concurrent `update` can never be overwritten by a stale stamped
    /// row.
    pub async fn flush_alerts<N: Notifier>(
        &self,
        notifier: &N,
        recipient: &str,
    ) -> TrackerResult<FlushOutcome> {
        let now = Utc::now();
        let cooldown = ChronoDuration::seconds(ALERT_COOLDOWN_SECS);
        let mut due: Vec<SymbolRecord> = Vec::new();
        let mut skipped_cooldown = 0;

        {
            let mut pending = self.pending.lock();
            let mut removed: Vec<Ticker> = Vec::new();
            for ticker in pending.iter() {
                match self.store.get_symbol(ticker)? {
                    // Untracked while pending (removed mid-cycle): drop it.
                    None => removed.push(ticker.clone()),
                    Some(row) => {
                        let in_cooldown = row
                            .last_alerted_at
                            .is_some_and(|at| now - at < cooldown);
                        if in_cooldown {
                            skipped_cooldown += 1;
                        } else {
                            due.push(row);
                        }
                    }
                }
            }
            for ticker in &removed {
                pending.remove(ticker);
            }
        }

        if due.is_empty() {
            if skipped_cooldown > 0 {
                debug!(skipped_cooldown, "No alerts due this flush");
            }
            return Ok(FlushOutcome {
                notified: 0,
                skipped_cooldown,
            });
        }

        due.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        let message = compose_alert_message(&due);
        notifier.send(&message, recipient, ALERT_SUBJECT).await?;

        // Delivered: stamp and clear exactly the included tickers, under
        // the same lock `update` takes. Rows are re-fetched inside the
        // guard so the stamp lands on the latest state.
        {
            let mut pending = self.pending.lock();
            for row in &due {
                if let Some(mut fresh) = self.store.get_symbol(&row.ticker)? {
                    fresh.last_alerted_at = Some(now);
                    self.store.update_symbol(fresh)?;
                }
                pending.remove(&row.ticker);
            }
        }

        info!(
            notified = due.len(),
            skipped_cooldown, "Alert flush delivered"
        );
        Ok(FlushOutcome {
            notified: due.len(),
            skipped_cooldown,
        })
    }
}
