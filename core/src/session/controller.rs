use crate::catalog::cache::ObjectCache;
use crate::catalog::known::ObjectCatalog;
use crate::catalog::visibility::{FilterCriteria, VisibilityCounts, VisibilityFilterEngine};
use crate::geometry::{CoordinateTransform, DisplayUnit};
use crate::prelude::{SessionError, SessionResult, SessionTag, TransportError};
use crate::session::observer::{FrameUpdate, SessionObserver};
use crate::session::params::SessionParameters;
use crate::stream::decoder::FrameLineDecoder;
use crate::stream::message::{FrameCounters, MessageClassifier, StreamMessage};
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::StreamMetrics;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Starting,
    Live,
    Stopping,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Starting => "starting",
            SessionState::Live => "live",
            SessionState::Stopping => "stopping",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the current session is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Exit,
    Restart(SessionParameters),
    EndOfStream,
    TransportFailure,
}

/// Display settings that persist across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub capacity: usize,
    pub criteria: FilterCriteria,
    pub display_unit: DisplayUnit,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: 5_000,
            criteria: FilterCriteria::accept_all(),
            display_unit: DisplayUnit::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkSummary {
    pub frames: usize,
    pub statuses: usize,
    pub malformed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    Applied(ChunkSummary),
    /// Arrived for a session that is no longer live; dropped untouched.
    Stale,
}

/// Everything owned by one live session. Created on entry, dropped on return to idle.
pub struct SessionContext {
    tag: SessionTag,
    params: SessionParameters,
    cache: ObjectCache,
    decoder: FrameLineDecoder,
    counters: FrameCounters,
    visibility: VisibilityCounts,
}

impl SessionContext {
    fn new(tag: SessionTag, params: SessionParameters, transform: CoordinateTransform) -> Self {
        Self {
            tag,
            params,
            cache: ObjectCache::new(transform),
            decoder: FrameLineDecoder::new(),
            counters: FrameCounters::default(),
            visibility: VisibilityCounts::default(),
        }
    }

    /// Restart edge: same context object, new identity, empty cache.
    fn reset(&mut self, tag: SessionTag, params: SessionParameters) {
        self.tag = tag;
        self.params = params;
        self.cache.clear();
        self.decoder.reset();
        self.counters = FrameCounters::default();
        self.visibility = VisibilityCounts::default();
    }

    pub fn tag(&self) -> SessionTag {
        self.tag
    }

    pub fn params(&self) -> SessionParameters {
        self.params
    }

    pub fn cache(&self) -> &ObjectCache {
        &self.cache
    }

    pub fn counters(&self) -> FrameCounters {
        self.counters
    }

    pub fn visibility(&self) -> VisibilityCounts {
        self.visibility
    }
}

/// Single writer of all session state.
///
/// Every transport event carries the [`SessionTag`] it was issued under; events whose tag
/// is not the active one, or that arrive after the active session began stopping, are
/// discarded before they can touch the cache.
pub struct StreamSessionController<O> {
    state: SessionState,
    sequence: u64,
    context: Option<SessionContext>,
    stop_reason: Option<StopReason>,
    config: SessionConfig,
    catalog: ObjectCatalog,
    classifier: MessageClassifier,
    engine: VisibilityFilterEngine,
    metrics: StreamMetrics,
    observer: O,
    logger: LogManager,
}

impl<O: SessionObserver> StreamSessionController<O> {
    pub fn new(config: SessionConfig, catalog: ObjectCatalog, observer: O) -> Self {
        Self {
            state: SessionState::Idle,
            sequence: 0,
            context: None,
            stop_reason: None,
            config,
            catalog,
            classifier: MessageClassifier::new(),
            engine: VisibilityFilterEngine::new(),
            metrics: StreamMetrics::new(),
            observer,
            logger: LogManager::new("session"),
        }
    }

    /// Shares an existing metrics handle instead of the controller's own.
    pub fn with_metrics(mut self, metrics: StreamMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn active_tag(&self) -> Option<SessionTag> {
        self.context.as_ref().map(SessionContext::tag)
    }

    pub fn context(&self) -> Option<&SessionContext> {
        self.context.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn metrics(&self) -> &StreamMetrics {
        &self.metrics
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Replaces the previously known object set. Only affects first sightings.
    pub fn set_catalog(&mut self, catalog: ObjectCatalog) {
        self.catalog = catalog;
    }

    /// `Idle -> Starting`. Returns the tag the transport request must carry.
    pub fn enter_live(&mut self, params: SessionParameters) -> SessionResult<SessionTag> {
        self.expect_state(&[SessionState::Idle], "enter live mode")?;

        let tag = self.next_tag();
        let transform = CoordinateTransform::new(self.config.display_unit);
        self.context = Some(SessionContext::new(tag, params, transform));
        self.observer.historical_suspended();
        self.logger
            .record(&format!("{} requested with {:?}", tag, params));
        self.transition(SessionState::Starting);
        Ok(tag)
    }

    /// `Starting -> Live` once the transport confirms a readable stream.
    pub fn stream_opened(&mut self, tag: SessionTag) -> bool {
        if !self.accepts(tag, SessionState::Starting) {
            return false;
        }
        self.transition(SessionState::Live);
        true
    }

    /// Decodes, classifies, reconciles and filters one raw chunk.
    pub fn apply_chunk(&mut self, tag: SessionTag, chunk: &[u8]) -> ChunkOutcome {
        if !self.accepts(tag, SessionState::Live) {
            return ChunkOutcome::Stale;
        }
        let Some(context) = self.context.as_mut() else {
            return ChunkOutcome::Stale;
        };

        let lines: Vec<String> = context.decoder.push(chunk).collect();
        ChunkOutcome::Applied(self.apply_lines(tag, lines))
    }

    /// `Live -> Stopping` when the stream ends on its own. Complete records still
    /// buffered are applied first; the unterminated tail is dropped.
    pub fn stream_ended(&mut self, tag: SessionTag) -> bool {
        if !self.accepts(tag, SessionState::Live) {
            return false;
        }
        if let Some(context) = self.context.as_mut() {
            let tail = context.decoder.finish();
            self.metrics.record_discarded_fragment(tail.discarded_bytes);
            self.apply_lines(tag, tail.lines);
        }
        self.begin_stop(StopReason::EndOfStream);
        true
    }

    /// `Starting | Live -> Stopping`, surfacing the failure once.
    pub fn transport_failed(&mut self, tag: SessionTag, error: TransportError) -> bool {
        let current = self.active_tag() == Some(tag);
        if !current || !matches!(self.state, SessionState::Starting | SessionState::Live) {
            self.metrics.record_stale();
            self.logger
                .trace(&format!("ignoring failure from {}: {}", tag, error));
            return false;
        }
        self.logger.diagnostic(&format!("{} failed: {}", tag, error));
        self.observer.transport_failed(&error);
        self.begin_stop(StopReason::TransportFailure);
        true
    }

    /// Explicit exit back to the historical display.
    pub fn request_exit(&mut self) -> SessionResult<()> {
        self.expect_state(&[SessionState::Starting, SessionState::Live], "exit live mode")?;
        self.begin_stop(StopReason::Exit);
        Ok(())
    }

    /// Settings change: stop the current session and start a fresh one with `params`.
    pub fn request_restart(&mut self, params: SessionParameters) -> SessionResult<()> {
        self.expect_state(&[SessionState::Starting, SessionState::Live], "restart")?;
        self.begin_stop(StopReason::Restart(params));
        Ok(())
    }

    /// The in-flight read has been cancelled (or finished). Completes the stop: a restart
    /// moves to `Starting` with a cleared cache and returns the new tag and parameters;
    /// anything else tears the session down and returns to `Idle`.
    pub fn acknowledge_stopped(
        &mut self,
    ) -> SessionResult<Option<(SessionTag, SessionParameters)>> {
        self.expect_state(&[SessionState::Stopping], "acknowledge stop")?;

        match self.stop_reason.take() {
            Some(StopReason::Restart(params)) => {
                let tag = self.next_tag();
                if let Some(context) = self.context.as_mut() {
                    context.reset(tag, params);
                }
                self.logger
                    .record(&format!("restarting as {} with {:?}", tag, params));
                self.transition(SessionState::Starting);
                Ok(Some((tag, params)))
            }
            reason => {
                if let Some(context) = self.context.take() {
                    self.logger.record(&format!(
                        "{} torn down ({:?}), {} objects discarded",
                        context.tag,
                        reason,
                        context.cache.len()
                    ));
                }
                self.transition(SessionState::Idle);
                self.observer.historical_resumed();
                Ok(None)
            }
        }
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) -> VisibilityCounts {
        self.config.criteria = criteria;
        self.refresh_visibility()
    }

    pub fn set_capacity(&mut self, capacity: usize) -> VisibilityCounts {
        self.config.capacity = capacity;
        self.refresh_visibility()
    }

    fn apply_lines(&mut self, tag: SessionTag, lines: Vec<String>) -> ChunkSummary {
        let mut summary = ChunkSummary::default();
        let Some(context) = self.context.as_mut() else {
            return summary;
        };

        for line in lines {
            match self.classifier.accept(&line) {
                Some(StreamMessage::Status(message)) => {
                    summary.statuses += 1;
                    self.metrics.record_status();
                    self.logger.record(&format!("feed status: {}", message.status));
                    self.observer.status(&message);
                }
                Some(StreamMessage::Frame(frame)) => {
                    summary.frames += 1;
                    let reconciled = context.cache.apply_frame(&frame, &self.catalog);
                    self.metrics.record_frame();
                    self.metrics.record_degenerate(reconciled.degenerate);
                    context.counters = frame.counters();
                    context.visibility = self.engine.recompute(
                        &mut context.cache,
                        &self.config.criteria,
                        self.config.capacity,
                    );
                    self.observer.frame_applied(&FrameUpdate {
                        tag,
                        counters: context.counters,
                        visibility: context.visibility,
                        objects: &context.cache,
                    });
                }
                None => {
                    summary.malformed += 1;
                    self.metrics.record_malformed();
                }
            }
        }
        summary
    }

    fn refresh_visibility(&mut self) -> VisibilityCounts {
        let Some(context) = self.context.as_mut() else {
            return VisibilityCounts::default();
        };
        context.visibility =
            self.engine
                .recompute(&mut context.cache, &self.config.criteria, self.config.capacity);
        self.observer
            .visibility_changed(context.visibility, &context.cache);
        context.visibility
    }

    fn begin_stop(&mut self, reason: StopReason) {
        self.stop_reason = Some(reason);
        self.transition(SessionState::Stopping);
    }

    fn accepts(&self, tag: SessionTag, required: SessionState) -> bool {
        if self.active_tag() == Some(tag) && self.state == required {
            return true;
        }
        self.metrics.record_stale();
        self.logger.trace(&format!(
            "discarding event from {} (active {:?}, state {})",
            tag,
            self.active_tag(),
            self.state
        ));
        false
    }

    fn expect_state(&self, allowed: &[SessionState], action: &'static str) -> SessionResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                state: self.state.as_str(),
                action,
            })
        }
    }

    fn next_tag(&mut self) -> SessionTag {
        self.sequence += 1;
        SessionTag(self.sequence)
    }

    fn transition(&mut self, to: SessionState) {
        let from = self.state;
        self.state = to;
        self.logger.trace(&format!("{} -> {}", from, to));
        self.observer.state_changed(from, to);
    }
}
