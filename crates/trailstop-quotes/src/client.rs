//! Authenticated, paced, retrying client for the broker market-data API.
//!
//! Every outbound request flows through one retry helper: pace the
//! request behind the minimum inter-request gap, attach a fresh access
//! token, and on HTTP 401 invalidate the credential and retry with a
//! new token, at most once per logical call. Transport failures and
//! 5xx responses are retried up to the attempt cap.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use trailstop_auth::CredentialStore;
use trailstop_core::{Price, Ticker};
use trailstop_store::StateStore;
use trailstop_tracker::{PositionTracker, TrackerError};

use crate::api::{
    AccountsResponse, PositionEntry, PositionsResponse, QuoteEntry, QuotesResponse,
    SymbolSearchResponse,
};
use crate::error::{QuoteError, QuoteResult};

/// Attempts per logical call before giving up.
pub const MAX_ATTEMPTS: u32 = 3;

/// Quote client tuning knobs.
#[derive(Debug, Clone)]
pub struct QuoteClientConfig {
    /// Symbol ids per quotes request.
    pub batch_size: usize,
    /// Minimum gap between any two outbound requests.
    pub min_request_gap: Duration,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for QuoteClientConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            min_request_gap: Duration::from_millis(200),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Counts from one quote sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// Symbols whose price was applied to the tracker.
    pub updated: usize,
    /// Symbols below their stop-loss after this pass.
    pub breached: usize,
    /// Symbols skipped (no resolvable id or no usable price).
    pub skipped: usize,
}

/// Client for the authenticated market-data endpoints.
pub struct QuoteClient<S> {
    client: reqwest::Client,
    credentials: Arc<CredentialStore<S>>,
    batch_size: usize,
    min_request_gap: Duration,
    /// Instant of the last outbound request, for pacing.
    last_request: Mutex<Option<Instant>>,
}

impl<S: StateStore> QuoteClient<S> {
    pub fn new(
        credentials: Arc<CredentialStore<S>>,
        config: QuoteClientConfig,
    ) -> QuoteResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| QuoteError::Http(e.to_string()))?;

        Ok(Self {
            client,
            credentials,
            batch_size: config.batch_size.max(1),
            min_request_gap: config.min_request_gap,
            last_request: Mutex::new(None),
        })
    }

    /// Resolve a ticker to the broker's numeric symbol id.
    ///
    /// The search endpoint is prefix-based, so the result must match the
    /// ticker exactly; "AAPL" must not resolve to "AAPL.TO".
    pub async fn resolve_symbol_id(&self, ticker: &Ticker) -> QuoteResult<u64> {
        let response: SymbolSearchResponse = self
            .get_json(
                "v1/symbols/search",
                &[("prefix", ticker.as_str().to_string())],
            )
            .await?;

        let id = response
            .symbols
            .iter()
            .find(|entry| entry.symbol.eq_ignore_ascii_case(ticker.as_str()))
            .map(|entry| entry.symbol_id)
            .ok_or_else(|| QuoteError::SymbolNotFound(ticker.clone()))?;

        debug!(%ticker, symbol_id = id, "Resolved broker symbol id");
        Ok(id)
    }

    /// Fetch quotes for the given symbol ids, batching requests and
    /// merging the results keyed by id.
    pub async fn fetch_quotes(&self, ids: &[u64]) -> QuoteResult<HashMap<u64, QuoteEntry>> {
        let mut merged = HashMap::with_capacity(ids.len());
        for batch in ids.chunks(self.batch_size) {
            let joined = batch
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(",");
            let response: QuotesResponse = self
                .get_json("v1/markets/quotes", &[("ids", joined)])
                .await?;
            for entry in response.quotes {
                merged.insert(entry.symbol_id, entry);
            }
        }
        Ok(merged)
    }

    /// One full sync pass: resolve missing symbol ids, fetch quotes for
    /// every tracked symbol and feed the prices into the tracker.
    ///
    /// A symbol that fails resolution is skipped for this pass only; the
    /// rest of the cycle proceeds. A failed quote fetch aborts the pass.
    pub async fn sync_all(&self, tracker: &PositionTracker<S>) -> QuoteResult<SyncReport> {
        let rows = tracker.symbols()?;
        if rows.is_empty() {
            debug!("No tracked symbols, nothing to sync");
            return Ok(SyncReport::default());
        }

        let mut report = SyncReport::default();
        let mut by_id = HashMap::with_capacity(rows.len());
        for row in rows {
            let id = match row.broker_symbol_id {
                Some(id) => id,
                None => match self.resolve_symbol_id(&row.ticker).await {
                    // The symbol can vanish between the snapshot and the
                    // cache write (concurrent remove); skip it, same as a
                    // failed resolution.
                    Ok(id) => match tracker.cache_broker_id(&row.ticker, id) {
                        Ok(()) => id,
                        Err(e) => {
                            warn!(ticker = %row.ticker, error = %e, "Caching symbol id failed, skipping this cycle");
                            report.skipped += 1;
                            continue;
                        }
                    },
                    Err(e) => {
                        warn!(ticker = %row.ticker, error = %e, "Symbol resolution failed, skipping this cycle");
                        report.skipped += 1;
                        continue;
                    }
                },
            };
            by_id.insert(id, row);
        }

        let ids: Vec<u64> = by_id.keys().copied().collect();
        if ids.is_empty() {
            return Ok(report);
        }
        let quotes = self.fetch_quotes(&ids).await?;

        for (id, entry) in quotes {
            let Some(row) = by_id.get(&id) else {
                continue;
            };
            let Some(raw_price) = entry.last_trade_price else {
                debug!(ticker = %row.ticker, "Quote has no last trade price, skipping");
                report.skipped += 1;
                continue;
            };
            let price = match Price::new(raw_price) {
                Ok(price) => price,
                Err(e) => {
                    warn!(ticker = %row.ticker, error = %e, "Unusable quote price");
                    report.skipped += 1;
                    continue;
                }
            };
            match tracker.update(&row.ticker, price) {
                Ok(outcome) => {
                    report.updated += 1;
                    if outcome.breached {
                        report.breached += 1;
                    }
                }
                Err(e) => {
                    warn!(ticker = %row.ticker, error = %e, "Price update failed");
                    report.skipped += 1;
                }
            }
        }

        info!(
            updated = report.updated,
            breached = report.breached,
            skipped = report.skipped,
            "Quote sync complete"
        );
        Ok(report)
    }

    /// Fetch open positions across every account visible to the credential.
    pub async fn fetch_account_positions(&self) -> QuoteResult<Vec<PositionEntry>> {
        let accounts: AccountsResponse = self.get_json("v1/accounts", &[]).await?;
        let mut positions = Vec::new();
        for account in accounts.accounts {
            let response: PositionsResponse = self
                .get_json(&format!("v1/accounts/{}/positions", account.number), &[])
                .await?;
            positions.extend(response.positions);
        }
        Ok(positions)
    }

    /// Start tracking every open position not already tracked, seeded at
    /// its current price. Returns the number of symbols added.
    pub async fn discover_positions(
        &self,
        tracker: &PositionTracker<S>,
        default_currency: &str,
    ) -> QuoteResult<usize> {
        let positions = self.fetch_account_positions().await?;
        let mut added = 0;
        for position in positions {
            let ticker = match Ticker::new(&position.symbol) {
                Ok(ticker) => ticker,
                Err(e) => {
                    warn!(symbol = %position.symbol, error = %e, "Skipping unparseable position symbol");
                    continue;
                }
            };
            if tracker.is_tracked(&ticker)? {
                continue;
            }
            let Some(raw_price) = position.current_price else {
                debug!(%ticker, "Position has no current price, skipping");
                continue;
            };
            let price = match Price::new(raw_price) {
                Ok(price) => price,
                Err(e) => {
                    warn!(%ticker, error = %e, "Unusable position price");
                    continue;
                }
            };
            match tracker.add_symbol(ticker.clone(), price, default_currency) {
                Ok(()) => {
                    tracker.cache_broker_id(&ticker, position.symbol_id)?;
                    added += 1;
                }
                // Raced with a concurrent add; the symbol is tracked either way.
                Err(TrackerError::Duplicate(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        if added > 0 {
            info!(added, "Discovered account positions");
        }
        Ok(added)
    }

    /// GET a JSON endpoint relative to the credential's API server, with
    /// pacing, retries and the single-refresh 401 policy.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> QuoteResult<T> {
        let mut refreshed = false;
        let mut last = String::from("no attempt made");

        for attempt in 1..=MAX_ATTEMPTS {
            self.pace().await;
            let access = self.credentials.access_token().await?;
            let url = join_url(&access.api_server, path);

            match self
                .client
                .get(&url)
                .query(query)
                .bearer_auth(&access.token)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<T>()
                            .await
                            .map_err(|e| QuoteError::Parse(e.to_string()));
                    }
                    last = format!("HTTP {}", status.as_u16());
                    if status == StatusCode::UNAUTHORIZED {
                        if refreshed {
                            return Err(QuoteError::Unauthorized);
                        }
                        warn!(path, "Access token rejected, refreshing once");
                        self.credentials.invalidate(&access.token).await?;
                        refreshed = true;
                    } else {
                        warn!(path, status = status.as_u16(), attempt, "Upstream error");
                    }
                }
                Err(e) => {
                    last = e.to_string();
                    warn!(path, attempt, error = %e, "Request failed");
                }
            }
        }

        Err(QuoteError::Upstream {
            attempts: MAX_ATTEMPTS,
            last,
        })
    }

    /// Sleep until the minimum inter-request gap has elapsed. The lock is
    /// held across the sleep so concurrent callers queue up behind it.
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_request_gap {
                sleep(self.min_request_gap - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

fn join_url(api_server: &str, path: &str) -> String {
    format!(
        "{}/{}",
        api_server.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
