use model::{parking::MIN_EDGES, point::Point};
use serde::Serialize;

/// Provisional line between two consecutive ring points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

/// The parking currently being drawn: an ordered list of tapped points with
/// a handle per point and a segment between each consecutive pair.
///
/// Re-activating the handle of the first point closes the ring. Closing is
/// refused (and changes nothing) while the ring has fewer than
/// [`MIN_EDGES`] points.
#[derive(Debug, Clone, Default)]
pub struct RingBuilder {
    points: Vec<Point>,
    segments: Vec<Segment>,
}

impl RingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_point(&mut self, point: Point) {
        if let Some(&previous) = self.points.last() {
            self.segments.push(Segment {
                from: previous,
                to: point,
            });
        }
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Only the first point's handle carries the closure detector.
    pub fn closes_on(&self, handle: usize) -> bool {
        handle == 0 && !self.points.is_empty()
    }

    /// Hands out the collected points and resets the builder.
    ///
    /// Returns `None` without touching anything if the ring is still too
    /// small to become a polygon.
    pub fn close(&mut self) -> Option<Vec<Point>> {
        if self.points.len() < MIN_EDGES {
            return None;
        }
        self.segments.clear();
        Some(std::mem::take(&mut self.points))
    }

    /// Drops the ring and its visuals. Returns how many points were dropped.
    pub fn cancel(&mut self) -> usize {
        self.segments.clear();
        std::mem::take(&mut self.points).len()
    }
}

#[cfg(test)]
mod tests {
    use model::point::Point;

    use super::RingBuilder;

    fn p(lat: f64, lng: f64) -> Point {
        Point::new(lat, lng)
    }

    #[test]
    fn segments_connect_consecutive_points() {
        let mut ring = RingBuilder::new();
        ring.add_point(p(45.0, 15.0));
        assert!(ring.segments().is_empty());

        ring.add_point(p(45.1, 15.0));
        ring.add_point(p(45.1, 15.1));
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.segments().len(), 2);
        assert_eq!(ring.segments()[1].from, p(45.1, 15.0));
        assert_eq!(ring.segments()[1].to, p(45.1, 15.1));
    }

    #[test]
    fn closing_a_small_ring_changes_nothing() {
        let mut ring = RingBuilder::new();
        assert_eq!(ring.close(), None);

        ring.add_point(p(45.0, 15.0));
        ring.add_point(p(45.1, 15.0));
        assert_eq!(ring.close(), None);
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.segments().len(), 1);
    }

    #[test]
    fn closing_hands_out_points_in_tap_order_and_resets() {
        let points = [p(45.0, 15.0), p(45.1, 15.0), p(45.1, 15.1), p(45.0, 15.1)];
        let mut ring = RingBuilder::new();
        points.iter().for_each(|&point| ring.add_point(point));

        assert_eq!(ring.close().as_deref(), Some(&points[..]));
        assert!(ring.is_empty());
        assert!(ring.segments().is_empty());
    }

    #[test]
    fn duplicate_points_are_kept() {
        let mut ring = RingBuilder::new();
        ring.add_point(p(45.0, 15.0));
        ring.add_point(p(45.0, 15.0));
        ring.add_point(p(45.1, 15.1));
        assert_eq!(ring.close().map(|points| points.len()), Some(3));
    }

    #[test]
    fn only_the_first_handle_closes() {
        let mut ring = RingBuilder::new();
        assert!(!ring.closes_on(0));
        ring.add_point(p(45.0, 15.0));
        ring.add_point(p(45.1, 15.0));
        assert!(ring.closes_on(0));
        assert!(!ring.closes_on(1));
    }

    #[test]
    fn cancel_discards_everything() {
        let mut ring = RingBuilder::new();
        ring.add_point(p(45.0, 15.0));
        ring.add_point(p(45.1, 15.0));
        assert_eq!(ring.cancel(), 2);
        assert!(ring.is_empty());
        assert!(ring.segments().is_empty());
    }
}
