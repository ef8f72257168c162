use model::marker::MarkerKind;
use serde::{Deserialize, Serialize};

use crate::{
    editor::{Command, ShapeRef},
    projection::{Projection, ScreenPoint},
    LocalId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// The active drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Idle,
    Marker(MarkerKind),
    Parking,
}

/// What a gesture landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Bare map, nothing on top.
    Map,
    /// Handle of a point of the ring being drawn.
    RingHandle(usize),
    Marker(LocalId),
    Parking(LocalId),
    Vertex { parking: LocalId, index: usize },
}

/// Raw input as delivered by the map surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Tap { target: Target, at: ScreenPoint },
    LongPress { target: Target, pointer: PointerKind },
    /// One step of a drag, `at` is the current pointer position.
    Drag { target: Target, at: ScreenPoint },
    PointerEnter { target: Target },
    PointerLeave { target: Target, pointer: PointerKind },
}

fn parking_of(target: Target) -> Option<LocalId> {
    match target {
        Target::Parking(parking) | Target::Vertex { parking, .. } => Some(parking),
        _ => None,
    }
}

/// Maps a gesture to the command it means under `tool`. Gestures without a
/// meaning (taps on existing shapes, drags of the bare map) give `None` and
/// are left to the map.
pub fn route(gesture: Gesture, tool: Tool, projection: &impl Projection) -> Option<Command> {
    match gesture {
        Gesture::Tap {
            target: Target::Map,
            at,
        } => match tool {
            Tool::Parking => Some(Command::AddPoint(projection.screen_to_geo(at))),
            Tool::Marker(kind) => Some(Command::DropMarker {
                kind,
                at: projection.screen_to_geo(at),
            }),
            Tool::Idle => None,
        },
        Gesture::Tap {
            target: Target::RingHandle(handle),
            ..
        } if tool == Tool::Parking => Some(Command::RingHandle(handle)),
        Gesture::Tap { .. } => None,

        Gesture::LongPress {
            target: Target::Marker(marker),
            pointer,
        } => Some(Command::Delete {
            shape: ShapeRef::Marker(marker),
            pointer,
        }),
        Gesture::LongPress {
            target: Target::Parking(parking),
            pointer,
        } => Some(Command::Delete {
            shape: ShapeRef::Parking(parking),
            pointer,
        }),
        Gesture::LongPress { .. } => None,

        Gesture::Drag {
            target: Target::Vertex { parking, index },
            at,
        } => Some(Command::DragVertex {
            parking,
            index,
            to: at,
        }),
        Gesture::Drag {
            target: Target::Marker(marker),
            at,
        } => Some(Command::DragMarker { marker, to: at }),
        Gesture::Drag { .. } => None,

        Gesture::PointerEnter { target } => parking_of(target).map(Command::PointerEnter),
        Gesture::PointerLeave { target, pointer } => {
            parking_of(target).map(|parking| Command::PointerLeave { parking, pointer })
        }
    }
}

#[cfg(test)]
mod tests {
    use model::marker::MarkerKind;

    use super::{route, Gesture, PointerKind, Target, Tool};
    use crate::{
        editor::{Command, ShapeRef},
        projection::{MercatorViewport, Projection, ScreenPoint},
        LocalId,
    };

    const AT: ScreenPoint = ScreenPoint::new(100.0, 200.0);

    fn tap(target: Target) -> Gesture {
        Gesture::Tap { target, at: AT }
    }

    #[test]
    fn map_taps_follow_the_tool() {
        let viewport = MercatorViewport::default();
        let geo = viewport.screen_to_geo(AT);

        assert_eq!(route(tap(Target::Map), Tool::Idle, &viewport), None);
        assert_eq!(
            route(tap(Target::Map), Tool::Parking, &viewport),
            Some(Command::AddPoint(geo))
        );
        assert_eq!(
            route(tap(Target::Map), Tool::Marker(MarkerKind::Bench), &viewport),
            Some(Command::DropMarker {
                kind: MarkerKind::Bench,
                at: geo
            })
        );
    }

    #[test]
    fn ring_handle_taps_count_while_drawing() {
        let viewport = MercatorViewport::default();
        assert_eq!(
            route(tap(Target::RingHandle(0)), Tool::Parking, &viewport),
            Some(Command::RingHandle(0))
        );
        assert_eq!(
            route(tap(Target::RingHandle(2)), Tool::Parking, &viewport),
            Some(Command::RingHandle(2))
        );
        assert_eq!(route(tap(Target::RingHandle(0)), Tool::Idle, &viewport), None);
    }

    #[test]
    fn taps_on_shapes_are_not_map_taps() {
        let viewport = MercatorViewport::default();
        let id = LocalId::new(1);
        assert_eq!(route(tap(Target::Parking(id)), Tool::Parking, &viewport), None);
        assert_eq!(
            route(tap(Target::Marker(id)), Tool::Marker(MarkerKind::Hydrant), &viewport),
            None
        );
    }

    #[test]
    fn long_press_deletes_shapes_only() {
        let viewport = MercatorViewport::default();
        let id = LocalId::new(7);
        let press = |target| Gesture::LongPress {
            target,
            pointer: PointerKind::Touch,
        };

        assert_eq!(
            route(press(Target::Parking(id)), Tool::Idle, &viewport),
            Some(Command::Delete {
                shape: ShapeRef::Parking(id),
                pointer: PointerKind::Touch
            })
        );
        assert_eq!(
            route(press(Target::Marker(id)), Tool::Parking, &viewport),
            Some(Command::Delete {
                shape: ShapeRef::Marker(id),
                pointer: PointerKind::Touch
            })
        );
        assert_eq!(route(press(Target::Map), Tool::Idle, &viewport), None);
        assert_eq!(
            route(press(Target::Vertex { parking: id, index: 0 }), Tool::Idle, &viewport),
            None
        );
    }

    #[test]
    fn vertex_drags_and_pointer_moves_address_the_parking() {
        let viewport = MercatorViewport::default();
        let id = LocalId::new(3);
        let vertex = Target::Vertex { parking: id, index: 2 };

        assert_eq!(
            route(Gesture::Drag { target: vertex, at: AT }, Tool::Idle, &viewport),
            Some(Command::DragVertex {
                parking: id,
                index: 2,
                to: AT
            })
        );
        assert_eq!(
            route(Gesture::Drag { target: Target::Map, at: AT }, Tool::Idle, &viewport),
            None
        );
        assert_eq!(
            route(Gesture::PointerEnter { target: vertex }, Tool::Idle, &viewport),
            Some(Command::PointerEnter(id))
        );
        assert_eq!(
            route(
                Gesture::PointerLeave {
                    target: Target::Parking(id),
                    pointer: PointerKind::Mouse
                },
                Tool::Idle,
                &viewport
            ),
            Some(Command::PointerLeave {
                parking: id,
                pointer: PointerKind::Mouse
            })
        );
    }
}
