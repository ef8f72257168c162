use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use tokio::sync::{mpsc, oneshot};

use crate::{
    editor::{Command, Editor, Effect, Notice, Propagation, Reaction, Snapshot},
    gateway::Gateway,
    gesture::Gesture,
};

const MAILBOX_SIZE: usize = 32;

enum Message {
    Command(Command),
    Gesture(Gesture, oneshot::Sender<Propagation>),
    /// Result of an effect, fed back into the editor.
    Completed(Command),
    Snapshot(oneshot::Sender<Snapshot>),
    Notices(oneshot::Sender<Vec<Notice>>),
    Settle(oneshot::Sender<()>),
}

#[derive(Debug)]
pub enum SessionError {
    SendError,
    ReceiveAnswerError(oneshot::error::RecvError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::SendError => write!(f, "SendError: the session has stopped"),
            Self::ReceiveAnswerError(why) => write!(f, "ReceiveError: {:?}", why),
        }
    }
}

impl std::error::Error for SessionError {}

/// Handle to a running session. Cloning it is cheap; the session stops once
/// every handle is gone and nothing is in flight anymore.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<Message>,
}

impl SessionHandle {
    async fn tell(&self, message: Message) -> Result<(), SessionError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SessionError::SendError)
    }

    async fn ask<R>(
        &self,
        message: impl FnOnce(oneshot::Sender<R>) -> Message,
    ) -> Result<R, SessionError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.tell(message(response_tx)).await?;
        response_rx.await.map_err(SessionError::ReceiveAnswerError)
    }

    pub async fn command(&self, command: Command) -> Result<(), SessionError> {
        self.tell(Message::Command(command)).await
    }

    /// Routes a gesture and reports whether the map may still act on it.
    pub async fn gesture(&self, gesture: Gesture) -> Result<Propagation, SessionError> {
        self.ask(|respond_to| Message::Gesture(gesture, respond_to))
            .await
    }

    pub async fn snapshot(&self) -> Result<Snapshot, SessionError> {
        self.ask(Message::Snapshot).await
    }

    pub async fn take_notices(&self) -> Result<Vec<Notice>, SessionError> {
        self.ask(Message::Notices).await
    }

    /// Resolves once no request or timer is outstanding.
    pub async fn settle(&self) -> Result<(), SessionError> {
        self.ask(Message::Settle).await
    }
}

struct Session<G: Gateway> {
    editor: Editor,
    gateway: Arc<G>,
    mailbox: mpsc::WeakSender<Message>,
    outstanding: usize,
    settle_waiters: Vec<oneshot::Sender<()>>,
}

impl<G: Gateway> Session<G> {
    fn react(&mut self, apply: impl FnOnce(&mut Editor) -> Reaction) -> Propagation {
        let editor = &mut self.editor;
        match panic::catch_unwind(AssertUnwindSafe(|| apply(editor))) {
            Ok(reaction) => {
                for effect in reaction.effects {
                    self.perform(effect);
                }
                reaction.propagation
            }
            Err(why) => {
                log::error!("editor paniced: {:?}", why);
                Propagation::Continue
            }
        }
    }

    fn perform(&mut self, effect: Effect) {
        let Some(mailbox) = self.mailbox.upgrade() else {
            log::debug!("session is shutting down, dropping {:?}", effect);
            return;
        };
        self.outstanding += 1;
        let gateway = Arc::clone(&self.gateway);

        tokio::spawn(async move {
            let completion = match effect {
                Effect::CreateMarker { local, marker } => Command::MarkerCreated {
                    local,
                    result: gateway.create_marker(&marker).await,
                },
                Effect::CreateParking { local, parking } => Command::ParkingCreated {
                    local,
                    result: gateway.create_parking(&parking).await,
                },
                Effect::DeleteMarker { local, id } => Command::MarkerDeleted {
                    local,
                    result: gateway.delete_marker(&id).await,
                },
                Effect::DeleteParking { local, id } => Command::ParkingDeleted {
                    local,
                    result: gateway.delete_parking(&id).await,
                },
                Effect::Load => Command::Loaded(futures::try_join!(
                    gateway.list_markers(),
                    gateway.list_parkings()
                )),
                Effect::ScheduleHide {
                    parking,
                    ticket,
                    delay,
                } => {
                    tokio::time::sleep(delay).await;
                    Command::HideExpired { parking, ticket }
                }
            };
            if mailbox.send(Message::Completed(completion)).await.is_err() {
                log::debug!("session stopped before an effect completed");
            }
        });
    }

    fn receive(&mut self, message: Message) {
        match message {
            Message::Command(command) => {
                self.react(|editor| editor.handle(command));
            }
            Message::Gesture(gesture, respond_to) => {
                let propagation = self.react(|editor| editor.dispatch(gesture));
                respond_to
                    .send(propagation)
                    .unwrap_or_else(|_| log::error!("Can not respond to gesture!"));
            }
            Message::Completed(command) => {
                self.outstanding -= 1;
                self.react(|editor| editor.handle(command));
            }
            Message::Snapshot(respond_to) => respond_to
                .send(self.editor.snapshot())
                .unwrap_or_else(|_| log::error!("Can not respond with snapshot!")),
            Message::Notices(respond_to) => respond_to
                .send(self.editor.take_notices())
                .unwrap_or_else(|_| log::error!("Can not respond with notices!")),
            Message::Settle(respond_to) => self.settle_waiters.push(respond_to),
        }

        if self.outstanding == 0 {
            for waiter in self.settle_waiters.drain(..) {
                let _ = waiter.send(());
            }
        }
    }
}

/// Runs `editor` on its own task. Every state change happens on that task,
/// one message at a time; effects run on helper tasks and report back
/// through the same mailbox.
pub fn run<G: Gateway>(editor: Editor, gateway: Arc<G>) -> SessionHandle {
    let (tx, mut rx) = mpsc::channel(MAILBOX_SIZE);
    let mut session = Session {
        editor,
        gateway,
        mailbox: tx.downgrade(),
        outstanding: 0,
        settle_waiters: Vec::new(),
    };

    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            session.receive(message);
        }
        log::debug!("session stopped");
    });

    SessionHandle { sender: tx }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicU64, Ordering},
            Arc, Mutex,
        },
        time::Duration,
    };

    use annotations::memory::MemoryDatabase;
    use async_trait::async_trait;
    use model::{
        marker::{Marker, MarkerKind},
        parking::Parking,
        point::Point,
        WithId,
    };
    use tokio::net::TcpListener;
    use utility::id::Id;
    use web::{WebConfig, WebState};

    use super::run;
    use crate::{
        config::EditorConfig,
        editor::{Command, Editor, Notice, Propagation, ShapeRef},
        gateway::{Gateway, GatewayError, GatewayResult, HttpGateway},
        gesture::{Gesture, PointerKind, Target, Tool},
        projection::{MercatorViewport, ScreenPoint},
    };

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        ListMarkers,
        ListParkings,
        CreateMarker(Marker),
        CreateParking(Parking),
        DeleteMarker(String),
        DeleteParking(String),
    }

    #[derive(Default)]
    struct FakeGateway {
        calls: Mutex<Vec<Call>>,
        next_id: AtomicU64,
        unreachable: bool,
    }

    impl FakeGateway {
        fn unreachable() -> Self {
            Self {
                unreachable: true,
                ..Self::default()
            }
        }

        fn record(&self, call: Call) -> GatewayResult<String> {
            self.calls.lock().unwrap().push(call);
            if self.unreachable {
                return Err(GatewayError::Transport("connection refused".to_owned()));
            }
            Ok(format!("{:024x}", self.next_id.fetch_add(1, Ordering::Relaxed)))
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Gateway for FakeGateway {
        async fn list_markers(&self) -> GatewayResult<Vec<WithId<Marker>>> {
            self.record(Call::ListMarkers).map(|_| Vec::new())
        }

        async fn create_marker(&self, marker: &Marker) -> GatewayResult<WithId<Marker>> {
            self.record(Call::CreateMarker(marker.clone()))
                .map(|id| WithId::new(Id::new(id), marker.clone()))
        }

        async fn delete_marker(&self, id: &Id<Marker>) -> GatewayResult<()> {
            self.record(Call::DeleteMarker(id.raw())).map(|_| ())
        }

        async fn list_parkings(&self) -> GatewayResult<Vec<WithId<Parking>>> {
            self.record(Call::ListParkings).map(|_| Vec::new())
        }

        async fn create_parking(&self, parking: &Parking) -> GatewayResult<WithId<Parking>> {
            self.record(Call::CreateParking(parking.clone()))
                .map(|id| WithId::new(Id::new(id), parking.clone()))
        }

        async fn delete_parking(&self, id: &Id<Parking>) -> GatewayResult<()> {
            self.record(Call::DeleteParking(id.raw())).map(|_| ())
        }
    }

    fn triangle() -> Vec<Point> {
        vec![
            Point::new(45.0, 15.0),
            Point::new(45.1, 15.0),
            Point::new(45.1, 15.1),
        ]
    }

    fn editor() -> Editor {
        Editor::new(EditorConfig::default(), MercatorViewport::default())
    }

    async fn draw_triangle(session: &super::SessionHandle) {
        session
            .command(Command::SelectTool(Tool::Parking))
            .await
            .unwrap();
        for point in triangle() {
            session.command(Command::AddPoint(point)).await.unwrap();
        }
        // tapping the first point again closes the ring
        session
            .gesture(Gesture::Tap {
                target: Target::RingHandle(0),
                at: ScreenPoint::new(0.0, 0.0),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn closing_a_ring_saves_exactly_one_parking() {
        let gateway = Arc::new(FakeGateway::default());
        let session = run(editor(), gateway.clone());

        draw_triangle(&session).await;
        session.settle().await.unwrap();

        assert_eq!(
            gateway.calls(),
            vec![Call::CreateParking(Parking::new(300.0, triangle()))]
        );
        let snapshot = session.snapshot().await.unwrap();
        assert_eq!(snapshot.parkings.len(), 1);
        assert_eq!(snapshot.parkings[0].parking.edges, triangle());
        assert!(snapshot.parkings[0].id.is_some());
        assert!(snapshot.ring.is_empty());
    }

    #[tokio::test]
    async fn long_press_deletes_with_one_request() {
        let gateway = Arc::new(FakeGateway::default());
        let session = run(editor(), gateway.clone());

        session
            .command(Command::SelectTool(Tool::Marker(MarkerKind::StreetLamp)))
            .await
            .unwrap();
        session
            .command(Command::DropMarker {
                kind: MarkerKind::StreetLamp,
                at: Point::new(45.8, 15.9),
            })
            .await
            .unwrap();
        draw_triangle(&session).await;
        session.settle().await.unwrap();

        let snapshot = session.snapshot().await.unwrap();
        let parking = snapshot.parkings[0].local;
        let propagation = session
            .gesture(Gesture::LongPress {
                target: Target::Parking(parking),
                pointer: PointerKind::Touch,
            })
            .await
            .unwrap();
        assert_eq!(propagation, Propagation::Continue);
        session.settle().await.unwrap();

        let deletes: Vec<_> = gateway
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Call::DeleteParking(_) | Call::DeleteMarker(_)))
            .collect();
        assert_eq!(deletes.len(), 1);
        let snapshot = session.snapshot().await.unwrap();
        assert!(snapshot.parkings.is_empty());
        assert_eq!(snapshot.markers.len(), 1);
    }

    #[tokio::test]
    async fn unreachable_backend_surfaces_notices() {
        let gateway = Arc::new(FakeGateway::unreachable());
        let session = run(editor(), gateway.clone());

        session.command(Command::Load).await.unwrap();
        draw_triangle(&session).await;
        session.settle().await.unwrap();

        let notices = session.take_notices().await.unwrap();
        assert_eq!(notices.len(), 2);
        assert!(notices.iter().any(|n| matches!(n, Notice::LoadFailed(_))));
        assert!(notices.iter().any(|n| matches!(n, Notice::ParkingNotSaved(_))));
        assert!(session.snapshot().await.unwrap().parkings.is_empty());
    }

    #[tokio::test]
    async fn touch_hide_fires_after_the_delay() {
        let config = EditorConfig {
            touch_hide_delay: Duration::from_millis(50),
            ..EditorConfig::default()
        };
        let gateway = Arc::new(FakeGateway::default());
        let session = run(Editor::new(config, MercatorViewport::default()), gateway);

        draw_triangle(&session).await;
        session.settle().await.unwrap();
        let parking = session.snapshot().await.unwrap().parkings[0].local;

        session.command(Command::PointerEnter(parking)).await.unwrap();
        session
            .command(Command::PointerLeave {
                parking,
                pointer: PointerKind::Touch,
            })
            .await
            .unwrap();
        assert!(session.snapshot().await.unwrap().parkings[0].vertices_visible);

        session.settle().await.unwrap();
        assert!(!session.snapshot().await.unwrap().parkings[0].vertices_visible);
    }

    async fn serve(token: Option<&str>) -> String {
        let config = WebConfig {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            api_token: token.map(str::to_owned),
            static_dir: "./resources/www/".to_owned(),
        };
        let app = web::app(WebState::new(MemoryDatabase::new()), &config);
        let listener = TcpListener::bind(config.bind_address).await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service()).await.unwrap();
        });
        format!("http://{address}")
    }

    #[tokio::test]
    async fn parkings_round_trip_through_the_backend() {
        let config = EditorConfig {
            base_url: serve(Some("secret")).await,
            api_token: Some("secret".to_owned()),
            ..EditorConfig::default()
        };
        let gateway = Arc::new(HttpGateway::from_config(&config));
        let session = run(editor(), gateway.clone());

        draw_triangle(&session).await;
        session.settle().await.unwrap();
        assert!(session.take_notices().await.unwrap().is_empty());

        // reloading shows what is already on the map only once
        session.command(Command::Load).await.unwrap();
        session.settle().await.unwrap();
        let snapshot = session.snapshot().await.unwrap();
        assert_eq!(snapshot.parkings.len(), 1);
        assert_eq!(snapshot.total_price, 300.0);

        let stored = gateway.list_parkings().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].content, Parking::new(300.0, triangle()));

        // a fresh session sees the stored parking and can delete it
        let second = run(editor(), gateway.clone());
        second.command(Command::Load).await.unwrap();
        second.settle().await.unwrap();
        let snapshot = second.snapshot().await.unwrap();
        assert_eq!(snapshot.parkings.len(), 1);
        assert_eq!(snapshot.parkings[0].id.as_ref(), Some(&stored[0].id));

        second
            .command(Command::Delete {
                shape: ShapeRef::Parking(snapshot.parkings[0].local),
                pointer: PointerKind::Mouse,
            })
            .await
            .unwrap();
        second.settle().await.unwrap();
        assert!(second.take_notices().await.unwrap().is_empty());
        assert!(gateway.list_parkings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn backend_rejections_reach_the_user() {
        let base_url = serve(Some("secret")).await;

        let unauthorized = HttpGateway::new(&base_url, None);
        assert_eq!(
            unauthorized.list_markers().await,
            Err(GatewayError::Unauthorized)
        );

        let gateway = HttpGateway::new(&base_url, Some("secret".to_owned()));
        let result = gateway
            .create_parking(&Parking::new(300.0, triangle()[..2].to_vec()))
            .await;
        assert!(matches!(result, Err(GatewayError::Rejected { status: 422, .. })));

        let result = gateway
            .delete_marker(&Id::new("000000000000000000000000".to_owned()))
            .await;
        assert!(matches!(result, Err(GatewayError::Rejected { status: 404, .. })));
    }
}
