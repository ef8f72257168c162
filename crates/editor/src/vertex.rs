use std::fmt;

use model::point::Point;
use serde::Serialize;

use crate::synthesize::ParkingShape;

/// Identifies one scheduled hide. A newer show or hide makes older tickets
/// stale, so a late timer cannot hide handles the user is touching again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HideTicket(u64);

#[derive(Debug, Clone, Default)]
pub struct VertexVisibility {
    visible: bool,
    pending_hide: Option<HideTicket>,
    issued: u64,
}

impl VertexVisibility {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.pending_hide = None;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.pending_hide = None;
        self.visible = false;
    }

    pub fn schedule_hide(&mut self) -> HideTicket {
        self.issued += 1;
        let ticket = HideTicket(self.issued);
        self.pending_hide = Some(ticket);
        ticket
    }

    /// Returns whether the ticket was still current and the handles were
    /// hidden.
    pub fn hide_expired(&mut self, ticket: HideTicket) -> bool {
        if self.pending_hide != Some(ticket) {
            return false;
        }
        self.hide();
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoSuchVertex {
    pub index: usize,
    pub len: usize,
}

impl fmt::Display for NoSuchVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vertex {} does not exist, the polygon has {}", self.index, self.len)
    }
}

impl std::error::Error for NoSuchVertex {}

impl ParkingShape {
    /// Moves vertex `index` of the polygon along with its handle.
    ///
    /// The vertex is removed and reinserted at the same position, so no
    /// other vertex changes its index.
    pub fn drag_vertex(&mut self, index: usize, to: Point) -> Result<(), NoSuchVertex> {
        let len = self.parking.edges.len();
        let handle = self
            .handles
            .get_mut(index)
            .ok_or(NoSuchVertex { index, len })?;
        handle.position = to;

        self.parking.edges.remove(index);
        self.parking.edges.insert(index, to);
        Ok(())
    }

    pub fn show_vertices(&mut self) {
        self.visibility.show();
    }

    pub fn hide_vertices(&mut self) {
        self.visibility.hide();
    }

    pub fn schedule_vertex_hide(&mut self) -> HideTicket {
        self.visibility.schedule_hide()
    }

    pub fn vertex_hide_expired(&mut self, ticket: HideTicket) -> bool {
        self.visibility.hide_expired(ticket)
    }
}

#[cfg(test)]
mod tests {
    use model::point::Point;

    use super::{NoSuchVertex, VertexVisibility};
    use crate::synthesize::synthesize;

    fn square() -> Vec<Point> {
        vec![
            Point::new(45.0, 15.0),
            Point::new(45.1, 15.0),
            Point::new(45.1, 15.1),
            Point::new(45.0, 15.1),
        ]
    }

    #[test]
    fn drag_moves_only_the_dragged_vertex() {
        let mut shape = synthesize(square(), 300.0);
        let to = Point::new(45.2, 15.2);

        shape.drag_vertex(2, to).unwrap();

        let mut expected = square();
        expected[2] = to;
        assert_eq!(shape.edges(), &expected[..]);
        assert_eq!(shape.handles()[2].position, to);
        for (i, handle) in shape.handles().iter().enumerate() {
            assert_eq!(handle.index, i);
            assert_eq!(handle.position, shape.edges()[i]);
        }
    }

    #[test]
    fn repeated_drags_keep_the_vertex_count() {
        let mut shape = synthesize(square(), 300.0);
        for step in 0..10 {
            let to = Point::new(45.0 + step as f64 * 0.01, 15.0);
            shape.drag_vertex(0, to).unwrap();
            shape.drag_vertex(3, to).unwrap();
        }
        assert_eq!(shape.edges().len(), 4);
        assert_eq!(shape.edges()[1], square()[1]);
        assert_eq!(shape.edges()[2], square()[2]);
    }

    #[test]
    fn drag_of_a_missing_vertex_is_refused() {
        let mut shape = synthesize(square(), 300.0);
        assert_eq!(
            shape.drag_vertex(4, Point::new(45.0, 15.0)),
            Err(NoSuchVertex { index: 4, len: 4 })
        );
        assert_eq!(shape.edges(), &square()[..]);
    }

    #[test]
    fn stale_hide_tickets_do_nothing() {
        let mut visibility = VertexVisibility::default();
        visibility.show();
        let first = visibility.schedule_hide();
        visibility.show();
        assert!(!visibility.hide_expired(first));
        assert!(visibility.is_visible());

        let second = visibility.schedule_hide();
        assert!(visibility.hide_expired(second));
        assert!(!visibility.is_visible());
        assert!(!visibility.hide_expired(second));
    }

    #[test]
    fn only_the_latest_schedule_counts() {
        let mut visibility = VertexVisibility::default();
        visibility.show();
        let first = visibility.schedule_hide();
        let second = visibility.schedule_hide();
        assert!(!visibility.hide_expired(first));
        assert!(visibility.hide_expired(second));
    }
}
