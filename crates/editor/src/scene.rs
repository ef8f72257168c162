use indexmap::IndexMap;
use model::{marker::Marker, WithId};

use crate::{synthesize::ParkingShape, LocalId};

/// Everything that is on the map and backed by the store.
#[derive(Debug, Clone)]
pub struct Scene {
    markers: IndexMap<LocalId, WithId<Marker>>,
    parkings: IndexMap<LocalId, ParkingShape>,
    markers_visible: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            markers: IndexMap::new(),
            parkings: IndexMap::new(),
            markers_visible: true,
        }
    }
}

impl Scene {
    pub fn attach_marker(&mut self, local: LocalId, marker: WithId<Marker>) {
        self.markers.insert(local, marker);
    }

    pub fn attach_parking(&mut self, local: LocalId, parking: ParkingShape) {
        self.parkings.insert(local, parking);
    }

    pub fn detach_marker(&mut self, local: LocalId) -> Option<WithId<Marker>> {
        self.markers.shift_remove(&local)
    }

    pub fn detach_parking(&mut self, local: LocalId) -> Option<ParkingShape> {
        self.parkings.shift_remove(&local)
    }

    pub fn marker_mut(&mut self, local: LocalId) -> Option<&mut WithId<Marker>> {
        self.markers.get_mut(&local)
    }

    pub fn parking_mut(&mut self, local: LocalId) -> Option<&mut ParkingShape> {
        self.parkings.get_mut(&local)
    }

    /// In insertion order.
    pub fn markers(&self) -> impl Iterator<Item = (LocalId, &WithId<Marker>)> {
        self.markers.iter().map(|(&local, marker)| (local, marker))
    }

    /// In insertion order.
    pub fn parkings(&self) -> impl Iterator<Item = (LocalId, &ParkingShape)> {
        self.parkings.iter().map(|(&local, parking)| (local, parking))
    }

    pub fn markers_visible(&self) -> bool {
        self.markers_visible
    }

    /// Shows or hides the whole marker layer. Returns the new state.
    pub fn toggle_markers(&mut self) -> bool {
        self.markers_visible = !self.markers_visible;
        self.markers_visible
    }

    /// Sum of the prices of everything on the map.
    pub fn total_price(&self) -> f64 {
        let markers: f64 = self.markers.values().map(|m| m.content.price).sum();
        let parkings: f64 = self.parkings.values().map(|p| p.parking().price).sum();
        markers + parkings
    }
}
