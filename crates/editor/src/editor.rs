use std::{fmt, time::Duration};

use indexmap::IndexMap;
use model::{
    marker::{Marker, MarkerKind},
    parking::Parking,
    point::Point,
    WithId,
};
use serde::Serialize;
use utility::id::Id;

use crate::{
    config::EditorConfig,
    gateway::{GatewayError, GatewayResult},
    gesture::{route, Gesture, PointerKind, Tool},
    projection::{MercatorViewport, Projection, ScreenPoint},
    ring::{RingBuilder, Segment},
    scene::Scene,
    synthesize::{synthesize, ParkingShape, VertexHandle},
    vertex::HideTicket,
    LocalId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShapeRef {
    Marker(LocalId),
    Parking(LocalId),
}

pub type Annotations = (Vec<WithId<Marker>>, Vec<WithId<Parking>>);

/// Everything the editor reacts to: user intent, usually derived from a
/// [`Gesture`], and the outcome of effects it asked for earlier.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SelectTool(Tool),
    AddPoint(Point),
    /// Tap on the handle of the `n`th ring point.
    RingHandle(usize),
    CloseRing,
    DropMarker {
        kind: MarkerKind,
        at: Point,
    },
    DragVertex {
        parking: LocalId,
        index: usize,
        to: ScreenPoint,
    },
    DragMarker {
        marker: LocalId,
        to: ScreenPoint,
    },
    PointerEnter(LocalId),
    PointerLeave {
        parking: LocalId,
        pointer: PointerKind,
    },
    Delete {
        shape: ShapeRef,
        pointer: PointerKind,
    },
    ToggleMarkers,
    MoveViewport(MercatorViewport),
    Load,

    MarkerCreated {
        local: LocalId,
        result: GatewayResult<WithId<Marker>>,
    },
    ParkingCreated {
        local: LocalId,
        result: GatewayResult<WithId<Parking>>,
    },
    MarkerDeleted {
        local: LocalId,
        result: GatewayResult<()>,
    },
    ParkingDeleted {
        local: LocalId,
        result: GatewayResult<()>,
    },
    Loaded(GatewayResult<Annotations>),
    HideExpired {
        parking: LocalId,
        ticket: HideTicket,
    },
}

/// Work the editor cannot do itself. Each one is answered by exactly one
/// command, except `ScheduleHide` which is answered by `HideExpired` once
/// `delay` has passed.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    CreateMarker { local: LocalId, marker: Marker },
    CreateParking { local: LocalId, parking: Parking },
    DeleteMarker { local: LocalId, id: Id<Marker> },
    DeleteParking { local: LocalId, id: Id<Parking> },
    Load,
    ScheduleHide {
        parking: LocalId,
        ticket: HideTicket,
        delay: Duration,
    },
}

/// Whether the map may still act on the gesture (a drag of a vertex must
/// not pan the map as well).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    #[default]
    Continue,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reaction {
    pub effects: Vec<Effect>,
    pub propagation: Propagation,
}

impl Reaction {
    fn effect(effect: Effect) -> Self {
        Self {
            effects: vec![effect],
            propagation: Propagation::Continue,
        }
    }

    fn stop() -> Self {
        Self {
            effects: Vec::new(),
            propagation: Propagation::Stop,
        }
    }
}

/// Failures the user should hear about.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    MarkerNotSaved(GatewayError),
    ParkingNotSaved(GatewayError),
    MarkerNotDeleted(GatewayError),
    ParkingNotDeleted(GatewayError),
    LoadFailed(GatewayError),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Notice::MarkerNotSaved(e) => write!(f, "Marker could not be saved: {e}"),
            Notice::ParkingNotSaved(e) => write!(f, "Parking could not be saved: {e}"),
            Notice::MarkerNotDeleted(e) => write!(f, "Marker could not be deleted: {e}"),
            Notice::ParkingNotDeleted(e) => write!(f, "Parking could not be deleted: {e}"),
            Notice::LoadFailed(e) => write!(f, "Annotations could not be loaded: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    pub local: LocalId,
    pub marker: WithId<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParkingView {
    pub local: LocalId,
    pub id: Option<Id<Parking>>,
    pub parking: Parking,
    pub handles: Vec<VertexHandle>,
    pub vertices_visible: bool,
}

/// Read only copy of the editor state, as a renderer would consume it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub tool: Tool,
    pub ring: Vec<Point>,
    pub ring_segments: Vec<Segment>,
    pub markers: Vec<MarkerView>,
    pub markers_visible: bool,
    pub parkings: Vec<ParkingView>,
    pub pending_markers: usize,
    pub pending_parkings: usize,
    pub total_price: f64,
}

/// Application state of one editing session.
///
/// Shapes only join the [`Scene`] once the backend confirmed them, so no
/// gesture can ever address a shape that has no backend id yet. While a
/// create or delete request is in flight the shape is parked in one of the
/// `pending_*` or `deleting_*` maps.
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    viewport: MercatorViewport,
    tool: Tool,
    ring: RingBuilder,
    scene: Scene,
    pending_markers: IndexMap<LocalId, Marker>,
    pending_parkings: IndexMap<LocalId, ParkingShape>,
    deleting_markers: IndexMap<LocalId, WithId<Marker>>,
    deleting_parkings: IndexMap<LocalId, ParkingShape>,
    notices: Vec<Notice>,
    next_local: u64,
}

impl Editor {
    pub fn new(config: EditorConfig, viewport: MercatorViewport) -> Self {
        Self {
            config,
            viewport,
            tool: Tool::default(),
            ring: RingBuilder::new(),
            scene: Scene::default(),
            pending_markers: IndexMap::new(),
            pending_parkings: IndexMap::new(),
            deleting_markers: IndexMap::new(),
            deleting_parkings: IndexMap::new(),
            notices: Vec::new(),
            next_local: 0,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn ring(&self) -> &RingBuilder {
        &self.ring
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn allocate(&mut self) -> LocalId {
        self.next_local += 1;
        LocalId::new(self.next_local)
    }

    pub fn dispatch(&mut self, gesture: Gesture) -> Reaction {
        match route(gesture, self.tool, &self.viewport) {
            Some(command) => self.handle(command),
            None => Reaction::default(),
        }
    }

    pub fn handle(&mut self, command: Command) -> Reaction {
        match command {
            Command::SelectTool(tool) => {
                let dropped = self.ring.cancel();
                if dropped > 0 {
                    log::debug!("tool change dropped a ring of {dropped} points");
                }
                self.tool = tool;
                Reaction::default()
            }
            Command::AddPoint(point) => {
                if self.tool == Tool::Parking {
                    self.ring.add_point(point);
                } else {
                    log::debug!("ignoring ring point, the parking tool is not active");
                }
                Reaction::default()
            }
            Command::RingHandle(handle) => {
                if self.tool == Tool::Parking && self.ring.closes_on(handle) {
                    self.close_ring()
                } else {
                    Reaction::default()
                }
            }
            Command::CloseRing => self.close_ring(),
            Command::DropMarker { kind, at } => {
                if self.tool != Tool::Marker(kind) {
                    log::debug!("ignoring {kind} marker, its tool is not active");
                    return Reaction::default();
                }
                let local = self.allocate();
                let marker = Marker::of_kind(kind, at);
                self.pending_markers.insert(local, marker.clone());
                Reaction::effect(Effect::CreateMarker { local, marker })
            }
            Command::DragVertex { parking, index, to } => {
                let to = self.viewport.screen_to_geo(to);
                match self.scene.parking_mut(parking) {
                    Some(shape) => match shape.drag_vertex(index, to) {
                        Ok(()) => Reaction::stop(),
                        Err(why) => {
                            log::warn!("drag on parking {parking}: {why}");
                            Reaction::default()
                        }
                    },
                    None => Reaction::default(),
                }
            }
            Command::DragMarker { marker, to } => {
                let to = self.viewport.screen_to_geo(to);
                match self.scene.marker_mut(marker) {
                    Some(marker) => {
                        marker.content.coordinates = to;
                        Reaction::stop()
                    }
                    None => Reaction::default(),
                }
            }
            Command::PointerEnter(parking) => {
                if let Some(shape) = self.scene.parking_mut(parking) {
                    shape.show_vertices();
                }
                Reaction::default()
            }
            Command::PointerLeave { parking, pointer } => {
                let delay = self.config.hide_delay(pointer);
                match self.scene.parking_mut(parking) {
                    Some(shape) => hide_vertices(parking, shape, delay),
                    None => Reaction::default(),
                }
            }
            Command::Delete { shape, pointer } => self.delete(shape, pointer),
            Command::ToggleMarkers => {
                let visible = self.scene.toggle_markers();
                log::debug!("markers visible: {visible}");
                Reaction::default()
            }
            Command::MoveViewport(viewport) => {
                self.viewport = viewport;
                Reaction::default()
            }
            Command::Load => Reaction::effect(Effect::Load),

            Command::MarkerCreated { local, result } => {
                self.marker_created(local, result);
                Reaction::default()
            }
            Command::ParkingCreated { local, result } => {
                self.parking_created(local, result);
                Reaction::default()
            }
            Command::MarkerDeleted { local, result } => {
                let Some(marker) = self.deleting_markers.shift_remove(&local) else {
                    return Reaction::default();
                };
                match result {
                    Ok(()) => log::info!("deleted marker {}", marker.id),
                    Err(why) => {
                        log::warn!("could not delete marker {}: {why}", marker.id);
                        self.scene.attach_marker(local, marker);
                        self.notices.push(Notice::MarkerNotDeleted(why));
                    }
                }
                Reaction::default()
            }
            Command::ParkingDeleted { local, result } => {
                let Some(shape) = self.deleting_parkings.shift_remove(&local) else {
                    return Reaction::default();
                };
                match result {
                    Ok(()) => log::info!("deleted parking {local}"),
                    Err(why) => {
                        log::warn!("could not delete parking {local}: {why}");
                        self.scene.attach_parking(local, shape);
                        self.notices.push(Notice::ParkingNotDeleted(why));
                    }
                }
                Reaction::default()
            }
            Command::Loaded(result) => {
                match result {
                    Ok((markers, parkings)) => {
                        log::info!(
                            "loaded {} markers and {} parkings",
                            markers.len(),
                            parkings.len()
                        );
                        for marker in markers {
                            if self.knows_marker(&marker.id) {
                                continue;
                            }
                            let local = self.allocate();
                            self.scene.attach_marker(local, marker);
                        }
                        for parking in parkings {
                            if self.knows_parking(&parking.id) {
                                continue;
                            }
                            let local = self.allocate();
                            self.scene
                                .attach_parking(local, ParkingShape::from_persisted(parking));
                        }
                    }
                    Err(why) => {
                        log::warn!("could not load annotations: {why}");
                        self.notices.push(Notice::LoadFailed(why));
                    }
                }
                Reaction::default()
            }
            Command::HideExpired { parking, ticket } => {
                if let Some(shape) = self
                    .scene
                    .parking_mut(parking)
                    .or_else(|| self.deleting_parkings.get_mut(&parking))
                {
                    shape.vertex_hide_expired(ticket);
                }
                Reaction::default()
            }
        }
    }

    fn close_ring(&mut self) -> Reaction {
        let Some(ring) = self.ring.close() else {
            log::debug!("ring of {} points is too small to close", self.ring.len());
            return Reaction::default();
        };
        let local = self.allocate();
        let shape = synthesize(ring, self.config.parking_price);
        let parking = shape.parking().clone();
        self.pending_parkings.insert(local, shape);
        Reaction::effect(Effect::CreateParking { local, parking })
    }

    /// Whether the store document is already represented on the map, or
    /// about to leave it.
    fn knows_marker(&self, id: &Id<Marker>) -> bool {
        self.scene.markers().any(|(_, marker)| &marker.id == id)
            || self.deleting_markers.values().any(|marker| &marker.id == id)
    }

    fn knows_parking(&self, id: &Id<Parking>) -> bool {
        self.scene.parkings().any(|(_, shape)| shape.id() == Some(id))
            || self.deleting_parkings.values().any(|shape| shape.id() == Some(id))
    }

    fn marker_created(&mut self, local: LocalId, result: GatewayResult<WithId<Marker>>) {
        if self.pending_markers.shift_remove(&local).is_none() {
            return;
        }
        match result {
            Ok(marker) if self.knows_marker(&marker.id) => {
                log::debug!("marker {} arrived with a load already", marker.id);
            }
            Ok(marker) => {
                log::info!("created marker {}", marker.id);
                self.scene.attach_marker(local, marker);
            }
            Err(why) => {
                log::warn!("could not create marker: {why}");
                self.notices.push(Notice::MarkerNotSaved(why));
            }
        }
    }

    fn parking_created(&mut self, local: LocalId, result: GatewayResult<WithId<Parking>>) {
        let Some(mut shape) = self.pending_parkings.shift_remove(&local) else {
            return;
        };
        match result {
            Ok(parking) if self.knows_parking(&parking.id) => {
                log::debug!("parking {} arrived with a load already", parking.id);
            }
            Ok(parking) => {
                log::info!("created parking {}", parking.id);
                shape.confirm(parking);
                self.scene.attach_parking(local, shape);
            }
            Err(why) => {
                log::warn!("could not create parking: {why}");
                self.notices.push(Notice::ParkingNotSaved(why));
            }
        }
    }

    fn delete(&mut self, shape: ShapeRef, pointer: PointerKind) -> Reaction {
        match shape {
            ShapeRef::Marker(local) => {
                let Some(marker) = self.scene.detach_marker(local) else {
                    return Reaction::default();
                };
                let id = marker.id.clone();
                self.deleting_markers.insert(local, marker);
                Reaction::effect(Effect::DeleteMarker { local, id })
            }
            ShapeRef::Parking(local) => {
                let Some(mut shape) = self.scene.detach_parking(local) else {
                    return Reaction::default();
                };
                let Some(id) = shape.id().cloned() else {
                    // confirmed shapes always carry their id
                    self.scene.attach_parking(local, shape);
                    return Reaction::default();
                };
                let mut reaction = hide_vertices(local, &mut shape, self.config.hide_delay(pointer));
                self.deleting_parkings.insert(local, shape);
                reaction.effects.push(Effect::DeleteParking { local, id });
                reaction
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tool: self.tool,
            ring: self.ring.points().to_vec(),
            ring_segments: self.ring.segments().to_vec(),
            markers: self
                .scene
                .markers()
                .map(|(local, marker)| MarkerView {
                    local,
                    marker: marker.clone(),
                })
                .collect(),
            markers_visible: self.scene.markers_visible(),
            parkings: self
                .scene
                .parkings()
                .map(|(local, shape)| ParkingView {
                    local,
                    id: shape.id().cloned(),
                    parking: shape.parking().clone(),
                    handles: shape.handles().to_vec(),
                    vertices_visible: shape.vertices_visible(),
                })
                .collect(),
            pending_markers: self.pending_markers.len(),
            pending_parkings: self.pending_parkings.len(),
            total_price: self.scene.total_price(),
        }
    }
}

fn hide_vertices(parking: LocalId, shape: &mut ParkingShape, delay: Duration) -> Reaction {
    if delay.is_zero() {
        shape.hide_vertices();
        return Reaction::default();
    }
    let ticket = shape.schedule_vertex_hide();
    Reaction::effect(Effect::ScheduleHide {
        parking,
        ticket,
        delay,
    })
}
