//! The VCR transport: records, replays, or passes through each call.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::adapters::live::{ReqwestTransport, SystemClock};
use crate::cassette::format::Interaction;
use crate::cassette::store::Cassette;
use crate::config::{AdvancedSettings, ExpirationAction, VcrConfig};
use crate::convert;
use crate::delay;
use crate::error::{StorageError, VcrError};
use crate::mode::Mode;
use crate::ports::clock::Clock;
use crate::ports::transport::{HttpRequest, HttpResponse, Transport, TransportFuture};

/// Where a dispatched response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The wrapped transport produced it.
    Network,
    /// It was rebuilt from a stored interaction.
    Cassette,
}

/// Result of one successful dispatch.
#[derive(Debug)]
pub struct Dispatched {
    /// Response handed back to the caller.
    pub response: HttpResponse,
    /// Where the response came from.
    pub source: Source,
    /// Set when the real call succeeded but storing it failed.
    pub persistence_error: Option<VcrError>,
}

enum Lookup {
    Hit(Interaction),
    Expired(Interaction),
    Miss { method: String, uri: String },
}

/// A [`Transport`] wrapping another transport and a [`Cassette`].
///
/// Everything is fixed at construction; the transport keeps no per-call
/// state, so one instance can serve concurrent calls.
pub struct VcrTransport {
    inner: Box<dyn Transport>,
    cassette: Arc<Cassette>,
    mode: Mode,
    settings: AdvancedSettings,
    clock: Arc<dyn Clock>,
}

impl VcrTransport {
    /// Wrap `inner`, storing interactions in `cassette`.
    pub fn new(inner: impl Transport + 'static, cassette: Arc<Cassette>, mode: Mode) -> Self {
        Self {
            inner: Box::new(inner),
            cassette,
            mode,
            settings: AdvancedSettings::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// A network-backed transport using the cassette `<folder>/<name>.cassette.yaml`.
    pub fn live(folder: impl AsRef<Path>, name: impl Into<String>, mode: Mode) -> Self {
        Self::new(ReqwestTransport::new(), Arc::new(Cassette::new(folder, name)), mode)
    }

    /// A network-backed transport using the mode and folder from `config`.
    pub fn from_config(config: &VcrConfig, name: impl Into<String>) -> Self {
        Self::live(&config.cassette_dir, name, config.mode)
    }

    /// Replace the advanced settings.
    #[must_use]
    pub fn with_settings(mut self, settings: AdvancedSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the clock used to stamp and age interactions.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The operating mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The cassette in use.
    #[must_use]
    pub fn cassette(&self) -> &Arc<Cassette> {
        &self.cassette
    }

    /// The advanced settings in use.
    #[must_use]
    pub fn settings(&self) -> &AdvancedSettings {
        &self.settings
    }

    /// Handle one outbound call according to the mode.
    ///
    /// # Errors
    ///
    /// - [`VcrError::NoMatchFound`] in replay mode when nothing matches.
    /// - [`VcrError::InteractionExpired`] when the match is stale and the
    ///   expiration policy forbids replaying it.
    /// - [`VcrError::Transport`] when the real call fails.
    /// - [`VcrError::Persistence`] when the cassette cannot be read.
    /// - [`VcrError::Cancelled`] when `cancel` fires first.
    ///
    /// A failed write after a successful real call is not an error; it is
    /// reported in [`Dispatched::persistence_error`].
    pub async fn dispatch(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<Dispatched, VcrError> {
        debug!(mode = %self.mode, method = %request.method(), "dispatching request");
        match self.mode {
            Mode::Record => self.record(request, cancel).await,
            Mode::Replay => match self.lookup(&request).await? {
                Lookup::Hit(interaction) => self.replay(&request, &interaction, cancel).await,
                Lookup::Expired(interaction) => Err(expired(&interaction)),
                Lookup::Miss { method, uri } => Err(VcrError::NoMatchFound { method, uri }),
            },
            Mode::Auto => match self.lookup(&request).await? {
                Lookup::Hit(interaction) => self.replay(&request, &interaction, cancel).await,
                Lookup::Expired(_) | Lookup::Miss { .. } => self.record(request, cancel).await,
            },
            Mode::Bypass => {
                let response = self.send_inner(request, cancel).await?;
                Ok(Dispatched { response, source: Source::Network, persistence_error: None })
            }
        }
    }

    /// The cassette contents, loading them off the runtime on first use.
    async fn interactions(&self) -> Result<Arc<Vec<Interaction>>, VcrError> {
        if let Some(cached) = self.cassette.cached() {
            return Ok(cached);
        }
        let cassette = Arc::clone(&self.cassette);
        let loaded = tokio::task::spawn_blocking(move || cassette.read())
            .await
            .map_err(|e| StorageError::Interrupted(e.to_string()))??;
        Ok(loaded)
    }

    /// First stored interaction matching the censored form of `request`.
    async fn lookup(&self, request: &HttpRequest) -> Result<Lookup, VcrError> {
        let received = convert::to_request(request, &self.settings.censors);
        let interactions = self.interactions().await?;
        let Some(found) = interactions
            .iter()
            .find(|stored| self.settings.match_rules.matches(&received, &stored.request))
        else {
            debug!(cassette = %self.cassette.name(), uri = %received.uri, "no match");
            return Ok(Lookup::Miss { method: received.method, uri: received.uri });
        };

        let Some(expiration) = self.settings.expiration else {
            return Ok(Lookup::Hit(found.clone()));
        };
        if !expiration.is_expired(found.recorded_at, self.clock.now()) {
            return Ok(Lookup::Hit(found.clone()));
        }
        match expiration.action {
            ExpirationAction::Warn => {
                warn!(
                    uri = %found.request.uri,
                    recorded_at = %found.recorded_at,
                    "replaying expired interaction"
                );
                Ok(Lookup::Hit(found.clone()))
            }
            ExpirationAction::Fail => Err(expired(found)),
            ExpirationAction::RecordAgain => Ok(Lookup::Expired(found.clone())),
        }
    }

    async fn replay(
        &self,
        request: &HttpRequest,
        interaction: &Interaction,
        cancel: &CancellationToken,
    ) -> Result<Dispatched, VcrError> {
        delay::simulate(self.settings.delay, interaction, cancel).await?;
        let response = convert::to_live_response(interaction, request)?;
        debug!(uri = %interaction.request.uri, "replayed interaction");
        Ok(Dispatched { response, source: Source::Cassette, persistence_error: None })
    }

    async fn record(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<Dispatched, VcrError> {
        let captured = convert::to_request(&request, &self.settings.censors);
        let started = Instant::now();
        let response = self.send_inner(request, cancel).await?;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let interaction = Interaction {
            request: captured,
            response: convert::to_response(&response, &self.settings.censors),
            recorded_at: self.clock.now(),
            duration_ms,
        };
        let persistence_error = self.persist(interaction, cancel).await?;
        Ok(Dispatched { response, source: Source::Network, persistence_error })
    }

    /// Upsert `interaction`, waiting for the write to finish.
    ///
    /// Returns `Err` only on cancellation; storage failures come back as
    /// `Ok(Some(_))` so the caller still gets its response.
    async fn persist(
        &self,
        interaction: Interaction,
        cancel: &CancellationToken,
    ) -> Result<Option<VcrError>, VcrError> {
        let uri = interaction.request.uri.clone();
        let cassette = Arc::clone(&self.cassette);
        let rules = self.settings.match_rules.clone();
        let write =
            tokio::task::spawn_blocking(move || cassette.upsert(interaction, &rules, false));

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(VcrError::Cancelled),
            joined = write => joined
                .map_err(|e| StorageError::Interrupted(e.to_string()))
                .and_then(std::convert::identity),
        };
        match outcome {
            Ok(()) => {
                info!(cassette = %self.cassette.name(), %uri, "recorded interaction");
                Ok(None)
            }
            Err(e) => {
                warn!(
                    cassette = %self.cassette.name(),
                    %uri,
                    error = %e,
                    "failed to persist interaction"
                );
                Ok(Some(VcrError::Persistence(e)))
            }
        }
    }

    async fn send_inner(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, VcrError> {
        if cancel.is_cancelled() {
            return Err(VcrError::Cancelled);
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(VcrError::Cancelled),
            result = self.inner.send(request, cancel.clone()) => result,
        }
    }
}

fn expired(interaction: &Interaction) -> VcrError {
    VcrError::InteractionExpired {
        method: interaction.request.method.clone(),
        uri: interaction.request.uri.clone(),
        recorded_at: interaction.recorded_at,
    }
}

impl Transport for VcrTransport {
    fn send(&self, request: HttpRequest, cancel: CancellationToken) -> TransportFuture<'_> {
        Box::pin(async move {
            let dispatched = self.dispatch(request, &cancel).await?;
            Ok(dispatched.response)
        })
    }
}

impl std::fmt::Debug for VcrTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VcrTransport")
            .field("cassette", &self.cassette)
            .field("mode", &self.mode)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use bytes::Bytes;

    use super::*;
    use crate::adapters::memory::MemoryStorage;
    use crate::ports::storage::CassetteStorage;

    struct SlowLoad {
        inner: MemoryStorage,
        delay: Duration,
    }

    impl CassetteStorage for SlowLoad {
        fn load_all(&self) -> Result<Vec<Interaction>, StorageError> {
            std::thread::sleep(self.delay);
            self.inner.load_all()
        }

        fn save_all(&self, interactions: &[Interaction]) -> Result<(), StorageError> {
            self.inner.save_all(interactions)
        }

        fn erase(&self) -> Result<(), StorageError> {
            self.inner.erase()
        }

        fn location(&self) -> String {
            self.inner.location()
        }
    }

    struct Unreachable;

    impl Transport for Unreachable {
        fn send(&self, _request: HttpRequest, _cancel: CancellationToken) -> TransportFuture<'_> {
            Box::pin(async { Err(VcrError::transport("network must not be used")) })
        }
    }

    struct Echo;

    impl Transport for Echo {
        fn send(&self, request: HttpRequest, _cancel: CancellationToken) -> TransportFuture<'_> {
            Box::pin(async move { Ok(http::Response::new(request.into_body())) })
        }
    }

    fn get(uri: &str) -> HttpRequest {
        http::Request::builder().uri(uri).body(Bytes::new()).unwrap()
    }

    fn vcr(inner: impl Transport + 'static, storage: &MemoryStorage, mode: Mode) -> VcrTransport {
        let cassette = Arc::new(Cassette::with_storage("unit", Box::new(storage.clone())));
        VcrTransport::new(inner, cassette, mode)
    }

    #[tokio::test]
    async fn replay_miss_names_request() {
        let storage = MemoryStorage::new();
        let err = vcr(Unreachable, &storage, Mode::Replay)
            .dispatch(get("https://api.example.com/none"), &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            VcrError::NoMatchFound { method, uri } => {
                assert_eq!(method, "GET");
                assert_eq!(uri, "https://api.example.com/none");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn cancelled_before_send_is_cancellation() {
        let storage = MemoryStorage::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = vcr(Echo, &storage, Mode::Record)
            .dispatch(get("https://api.example.com/"), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(storage.save_count(), 0);
    }

    #[tokio::test]
    async fn cold_cassette_load_does_not_block_the_runtime() {
        let slow = SlowLoad { inner: MemoryStorage::new(), delay: Duration::from_millis(300) };
        let cassette = Arc::new(Cassette::with_storage("slow", Box::new(slow)));
        let vcr = VcrTransport::new(Unreachable, cassette, Mode::Replay);
        let done = AtomicBool::new(false);
        let ticks = AtomicUsize::new(0);

        let dispatch = async {
            let result =
                vcr.dispatch(get("https://api.example.com/"), &CancellationToken::new()).await;
            done.store(true, Ordering::SeqCst);
            result
        };
        let ticker = async {
            while !done.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(10)).await;
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        };
        let (result, ()) = tokio::join!(dispatch, ticker);

        assert!(matches!(result, Err(VcrError::NoMatchFound { .. })));
        assert!(ticks.load(Ordering::SeqCst) >= 5);
        assert!(vcr.cassette().cached().is_some());
    }

    #[tokio::test]
    async fn from_config_uses_configured_mode_and_folder() {
        let dir = std::env::temp_dir().join("httpvcr_from_config");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let env_file = dir.join(".env");
        let cassettes = dir.join("cassettes");
        std::fs::write(
            &env_file,
            format!("VCR_MODE=replay\nVCR_CASSETTE_DIR={}\n", cassettes.display()),
        )
        .unwrap();

        let config = VcrConfig::from_env_file(&env_file).unwrap();
        let vcr = VcrTransport::from_config(&config, "items");
        assert_eq!(vcr.mode(), Mode::Replay);
        assert_eq!(
            vcr.cassette().location(),
            cassettes.join("items.cassette.yaml").display().to_string()
        );

        let err =
            vcr.dispatch(get("https://api.example.com/"), &CancellationToken::new()).await;
        assert!(matches!(err, Err(VcrError::NoMatchFound { .. })));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn vcr_transport_is_itself_a_transport() {
        let storage = MemoryStorage::new();
        let transport: Box<dyn Transport> = Box::new(vcr(Echo, &storage, Mode::Record));
        let request = http::Request::builder()
            .method("POST")
            .uri("https://api.example.com/echo")
            .body(Bytes::from_static(b"ping"))
            .unwrap();
        let response = transport.send(request, CancellationToken::new()).await.unwrap();
        assert_eq!(response.body().as_ref(), b"ping");
        assert_eq!(storage.snapshot().len(), 1);
    }
}
