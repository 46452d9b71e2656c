//! Capabilities supplied by the presentation layer

/// Intersection observation of rendered elements
///
/// The host implements this over whatever mechanism it has (an
/// `IntersectionObserver` in browsers) and reports changes back through
/// [`ScreenTracker::on_intersection`](crate::ScreenTracker::on_intersection).
pub trait ElementObserver {
    /// Start observing the element with this identifier
    fn observe(&mut self, element_id: &str);
    /// Stop observing; no further notifications are expected for the element
    fn disconnect(&mut self, element_id: &str);
}

/// Observer for hosts that drive intersection notifications themselves
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl ElementObserver for NoopObserver {
    fn observe(&mut self, _element_id: &str) {}
    fn disconnect(&mut self, _element_id: &str) {}
}

/// A list item whose engagement is tracked
///
/// Usually derived: `#[derive(Tracked)]` with
/// `#[tracked(id_field = "...", id_prefix = "...", description_field = "...")]`.
pub trait Tracked {
    /// Stable key of the element across renders
    fn tracking_id(&self) -> String;
    /// Free-text label shown next to the segment
    fn tracking_description(&self) -> String;
}
