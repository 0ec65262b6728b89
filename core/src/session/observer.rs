use crate::catalog::cache::ObjectCache;
use crate::catalog::visibility::VisibilityCounts;
use crate::prelude::{SessionTag, TransportError};
use crate::session::controller::SessionState;
use crate::stream::message::{FrameCounters, StatusMessage};

/// What a collaborator sees after a frame has been reconciled and filtered.
pub struct FrameUpdate<'a> {
    pub tag: SessionTag,
    pub counters: FrameCounters,
    pub visibility: VisibilityCounts,
    pub objects: &'a ObjectCache,
}

/// Hooks into the session for the display and UI collaborators. All methods default to
/// doing nothing.
pub trait SessionObserver {
    fn state_changed(&mut self, _from: SessionState, _to: SessionState) {}

    /// Live mode took over; the historical display must stop rendering.
    fn historical_suspended(&mut self) {}

    /// Live mode ended; the historical display may resume.
    fn historical_resumed(&mut self) {}

    fn status(&mut self, _message: &StatusMessage) {}

    fn frame_applied(&mut self, _update: &FrameUpdate<'_>) {}

    /// Criteria or capacity changed outside of a frame.
    fn visibility_changed(&mut self, _counts: VisibilityCounts, _objects: &ObjectCache) {}

    /// Called exactly once per failed session.
    fn transport_failed(&mut self, _error: &TransportError) {}
}

impl SessionObserver for () {}
