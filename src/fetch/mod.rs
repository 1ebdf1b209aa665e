//! Guidance view image fetch pipeline
//!
//! [`GuidanceImageFetcher`] turns banner instructions into decoded bitmaps.
//! Each fetch runs as its own Tokio task: resolve the URL, execute the HTTP
//! request, classify the status, decode the body. The caller gets a
//! [`FetchHandle`] immediately and awaits the outcome at its leisure.
//!
//! Delivery contract:
//! - at most one [`FetchOutcome`] per fetch, never delivered inline with
//!   the scheduling call;
//! - a cancelled fetch delivers nothing at all (the handle resolves to
//!   `None`), never a synthetic failure;
//! - fetches are independent: no deduplication of identical URLs, no
//!   ordering between concurrent fetches.
//!
//! The fetcher owns a root cancellation token. [`cancel_all`] cancels the
//! in-flight group and leaves the fetcher usable; [`shutdown`] cancels the
//! root, after which nothing delivers again.
//!
//! [`cancel_all`]: GuidanceImageFetcher::cancel_all
//! [`shutdown`]: GuidanceImageFetcher::shutdown

pub mod decoder;
pub mod transport;


use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::banner::{self, BannerInstruction};
use crate::config::FetchConfig;
use crate::error::Result;
use crate::types::{FetchId, FetchOutcome, GENERIC_FETCH_FAILURE};

use decoder::{GuessFormatDecoder, ImageDecoder};
use transport::{ImageTransport, ReqwestTransport};

/// In-flight fetches and their cancellation tokens
type InFlightMap = HashMap<FetchId, CancellationToken>;

/// Lock the registry, recovering from a poisoned lock.
///
/// Map updates are whole-entry inserts and removes, so the map is valid
/// even if a fetch task panicked while holding the lock.
fn lock_in_flight(map: &Mutex<InFlightMap>) -> MutexGuard<'_, InFlightMap> {
    match map.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Handle to one scheduled guidance image fetch
///
/// The handle is the only way to observe the fetch result. Dropping it
/// neither cancels nor blocks the fetch; the task simply finishes with
/// nobody listening.
#[derive(Debug)]
pub struct FetchHandle {
    id: FetchId,
    token: CancellationToken,
    outcome_rx: oneshot::Receiver<FetchOutcome>,
}

impl FetchHandle {
    /// Identifier of this fetch
    pub fn id(&self) -> FetchId {
        self.id
    }

    /// Cancel this fetch only
    ///
    /// Other in-flight fetches are unaffected. If the result was already
    /// delivered, cancelling has no effect.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether this fetch has been cancelled (individually, via
    /// [`GuidanceImageFetcher::cancel_all`], or by shutdown)
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for the fetch to finish
    ///
    /// Resolves to `Some` with the single outcome, or `None` if the fetch
    /// was cancelled before delivery. Consumes the handle, so the outcome
    /// can be observed at most once.
    pub async fn outcome(self) -> Option<FetchOutcome> {
        self.outcome_rx.await.ok()
    }
}

/// Fetches guidance view images referenced by banner instructions
///
/// Cloneable: clones share the transport, the in-flight registry, and the
/// root cancellation token, so any clone can cancel work scheduled through
/// another.
#[derive(Clone)]
pub struct GuidanceImageFetcher {
    /// HTTP transport (trait object for pluggable implementations)
    transport: Arc<dyn ImageTransport>,
    /// Bitmap decoder (trait object for pluggable implementations)
    decoder: Arc<dyn ImageDecoder>,
    /// Parent of every per-fetch token; cancelled once, on shutdown
    root_token: CancellationToken,
    /// Registry of in-flight fetches (for group cancellation)
    in_flight: Arc<Mutex<InFlightMap>>,
    /// Monotonic fetch ID source
    next_id: Arc<AtomicU64>,
}

impl GuidanceImageFetcher {
    /// Create a fetcher with the default reqwest transport and decoder
    ///
    /// # Arguments
    ///
    /// * `config` - Fetch settings (connect and request timeouts)
    ///
    /// # Returns
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(
            Arc::new(transport),
            Arc::new(GuessFormatDecoder),
        ))
    }

    /// Create a fetcher with a custom transport and decoder
    ///
    /// Intended for tests and for embedders that already own an HTTP stack.
    pub fn with_transport(
        transport: Arc<dyn ImageTransport>,
        decoder: Arc<dyn ImageDecoder>,
    ) -> Self {
        Self {
            transport,
            decoder,
            root_token: CancellationToken::new(),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Fetch the guidance view image referenced by a banner instruction
    ///
    /// Extracts the image URL from the instruction's view components. If the
    /// banner carries no usable URL the handle resolves to
    /// [`FetchOutcome::NoSource`] without touching the network; otherwise
    /// this behaves like [`fetch_url`](Self::fetch_url).
    ///
    /// Never blocks and never delivers an outcome inline with the call.
    /// Must be called within a Tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `instruction` - The banner instruction to source the image from
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use nav_guidance::{BannerInstruction, FetchConfig, GuidanceImageFetcher};
    /// # async fn example(banner: BannerInstruction) -> nav_guidance::Result<()> {
    /// let fetcher = GuidanceImageFetcher::new(&FetchConfig::default())?;
    /// let handle = fetcher.fetch(&banner);
    /// if let Some(outcome) = handle.outcome().await {
    ///     println!("fetch finished: {}", outcome.kind());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn fetch(&self, instruction: &BannerInstruction) -> FetchHandle {
        match banner::guidance_image_url(instruction) {
            Ok(url) => self.fetch_url(url),
            Err(reason) => {
                tracing::debug!(%reason, "banner instruction has no guidance image source");
                self.resolved_handle(FetchOutcome::NoSource(reason))
            }
        }
    }

    /// Fetch a guidance view image directly by URL
    ///
    /// Schedules the fetch on a background task and returns immediately.
    /// The handle resolves once the image is decoded, the failure is
    /// classified, or the fetch is cancelled. Identical URLs fetch
    /// independently; there is no deduplication.
    ///
    /// Must be called within a Tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `url` - The image URL to request
    pub fn fetch_url(&self, url: &str) -> FetchHandle {
        let id = self.allocate_id();
        let token = self.root_token.child_token();
        let (outcome_tx, outcome_rx) = oneshot::channel();

        lock_in_flight(&self.in_flight).insert(id, token.clone());

        let task = FetchTask {
            id,
            url: url.to_string(),
            transport: Arc::clone(&self.transport),
            decoder: Arc::clone(&self.decoder),
            token: token.clone(),
            in_flight: Arc::clone(&self.in_flight),
        };
        tokio::spawn(task.run(outcome_tx));

        tracing::debug!(fetch_id = %id, url, "guidance image fetch scheduled");
        FetchHandle {
            id,
            token,
            outcome_rx,
        }
    }

    /// Cancel every in-flight fetch
    ///
    /// Cancelled fetches deliver nothing; their handles resolve to `None`.
    /// A no-op when nothing is in flight. The fetcher stays usable: fetches
    /// scheduled afterwards run normally.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use nav_guidance::GuidanceImageFetcher;
    /// # fn example(fetcher: &GuidanceImageFetcher) {
    /// // Banner changed; results for the old banner are now stale.
    /// fetcher.cancel_all();
    /// # }
    /// ```
    pub fn cancel_all(&self) {
        let cancelled: Vec<(FetchId, CancellationToken)> =
            lock_in_flight(&self.in_flight).drain().collect();

        if cancelled.is_empty() {
            return;
        }

        tracing::info!(
            count = cancelled.len(),
            "cancelling all in-flight guidance image fetches"
        );
        for (_, token) in cancelled {
            token.cancel();
        }
    }

    /// Shut the fetcher down
    ///
    /// Cancels the root token: every in-flight fetch is cancelled, and any
    /// fetch scheduled after this point resolves to `None` without running.
    /// Call on teardown so no fetch task outlives its owner.
    pub fn shutdown(&self) {
        tracing::info!("shutting down guidance image fetcher");
        self.root_token.cancel();
        lock_in_flight(&self.in_flight).clear();
    }

    /// Number of fetches currently in flight
    pub fn in_flight(&self) -> usize {
        lock_in_flight(&self.in_flight).len()
    }

    fn allocate_id(&self) -> FetchId {
        FetchId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Build a handle that is already resolved to `outcome`.
    ///
    /// The value sits in the channel until the caller awaits; no caller
    /// code runs inside this method. After shutdown the outcome is withheld
    /// so these handles resolve to `None` like every other fetch.
    fn resolved_handle(&self, outcome: FetchOutcome) -> FetchHandle {
        let id = self.allocate_id();
        let (outcome_tx, outcome_rx) = oneshot::channel();
        if !self.root_token.is_cancelled() {
            let _ = outcome_tx.send(outcome);
        }
        FetchHandle {
            id,
            token: self.root_token.child_token(),
            outcome_rx,
        }
    }
}

/// State moved onto the background task of a single fetch
struct FetchTask {
    id: FetchId,
    url: String,
    transport: Arc<dyn ImageTransport>,
    decoder: Arc<dyn ImageDecoder>,
    token: CancellationToken,
    in_flight: Arc<Mutex<InFlightMap>>,
}

impl FetchTask {
    /// Run the fetch to completion or cancellation.
    ///
    /// The oneshot sender is consumed by exactly one send or dropped
    /// unused, so the handle resolves exactly once either way.
    async fn run(self, outcome_tx: oneshot::Sender<FetchOutcome>) {
        let outcome = tokio::select! {
            _ = self.token.cancelled() => None,
            outcome = self.execute() => Some(outcome),
        };

        // Deregister before delivery so in_flight() is already accurate
        // when the caller observes the outcome.
        lock_in_flight(&self.in_flight).remove(&self.id);

        match outcome {
            Some(outcome) if !self.token.is_cancelled() => {
                tracing::debug!(
                    fetch_id = %self.id,
                    outcome = outcome.kind(),
                    "guidance image fetch finished"
                );
                let _ = outcome_tx.send(outcome);
            }
            _ => {
                tracing::debug!(fetch_id = %self.id, "guidance image fetch cancelled before delivery");
            }
        }
    }

    /// Execute the request and classify the response into an outcome.
    async fn execute(&self) -> FetchOutcome {
        let response = match self.transport.execute(&self.url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    fetch_id = %self.id,
                    url = %self.url,
                    transport = self.transport.name(),
                    error = %e,
                    "guidance image request failed"
                );
                return FetchOutcome::Failure(GENERIC_FETCH_FAILURE.to_string());
            }
        };

        match response.status {
            200 => self.decode_body(&response.body),
            401 => {
                tracing::warn!(
                    fetch_id = %self.id,
                    url = %self.url,
                    "guidance image request rejected as unauthorized"
                );
                // The 401 status message is the one failure reported verbatim.
                FetchOutcome::Failure(response.status_message)
            }
            status => {
                tracing::warn!(
                    fetch_id = %self.id,
                    url = %self.url,
                    status,
                    "unexpected guidance image response status"
                );
                FetchOutcome::Failure(GENERIC_FETCH_FAILURE.to_string())
            }
        }
    }

    fn decode_body(&self, body: &[u8]) -> FetchOutcome {
        match self.decoder.decode(body) {
            Ok(image) => FetchOutcome::Ready(image),
            Err(e) => {
                // A 200 with an undecodable body reports the same generic
                // failure as a transport error; the log keeps them apart.
                tracing::warn!(
                    fetch_id = %self.id,
                    url = %self.url,
                    error = %e,
                    "guidance image decode failed"
                );
                FetchOutcome::Failure(GENERIC_FETCH_FAILURE.to_string())
            }
        }
    }
}
