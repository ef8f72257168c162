use model::{parking::Parking, point::Point, WithId};
use serde::Serialize;
use utility::id::Id;

use crate::vertex::VertexVisibility;

/// Draggable handle sitting on one polygon vertex. `index` is the position
/// of that vertex in the parking's edge list and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VertexHandle {
    pub index: usize,
    pub position: Point,
}

/// A parking polygon as the map shows it.
///
/// Invariant: `handles[i].index == i` and `handles[i].position ==
/// parking.edges[i]` for every vertex.
#[derive(Debug, Clone)]
pub struct ParkingShape {
    id: Option<Id<Parking>>,
    pub(crate) parking: Parking,
    pub(crate) handles: Vec<VertexHandle>,
    pub(crate) visibility: VertexVisibility,
}

fn handles_for(edges: &[Point]) -> Vec<VertexHandle> {
    edges
        .iter()
        .enumerate()
        .map(|(index, &position)| VertexHandle { index, position })
        .collect()
}

/// Builds the polygon for a closed ring. Vertex handles start out hidden.
pub fn synthesize(ring: Vec<Point>, price: f64) -> ParkingShape {
    ParkingShape {
        id: None,
        handles: handles_for(&ring),
        parking: Parking::new(price, ring),
        visibility: VertexVisibility::default(),
    }
}

impl ParkingShape {
    pub fn from_persisted(persisted: WithId<Parking>) -> Self {
        let mut shape = synthesize(Vec::new(), persisted.content.price);
        shape.confirm(persisted);
        shape
    }

    /// Adopts the identity and the canonical document the backend stored.
    pub fn confirm(&mut self, persisted: WithId<Parking>) {
        self.handles = handles_for(&persisted.content.edges);
        self.parking = persisted.content;
        self.id = Some(persisted.id);
    }

    pub fn id(&self) -> Option<&Id<Parking>> {
        self.id.as_ref()
    }

    pub fn parking(&self) -> &Parking {
        &self.parking
    }

    pub fn edges(&self) -> &[Point] {
        &self.parking.edges
    }

    pub fn handles(&self) -> &[VertexHandle] {
        &self.handles
    }

    pub fn vertices_visible(&self) -> bool {
        self.visibility.is_visible()
    }

    /// Polygon outline including the implicit edge from the last vertex
    /// back to the first.
    pub fn boundary(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let edges = &self.parking.edges;
        edges
            .iter()
            .zip(edges.iter().cycle().skip(1))
            .map(|(&from, &to)| (from, to))
    }
}
