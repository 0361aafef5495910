// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The viewer task.
//
// One tokio task owns the document backend, the drawable surface and the
// single `ViewerSession`. UI code talks to it through a cloneable
// `ViewerHandle`; every command is answered with a fresh snapshot, and
// render/load outcomes are published as events.
//
// The surface is moved into the running render and handed back when it
// finishes, so two renders can never draw on it at once. The coordinator
// decides what runs next when a render completes.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, instrument, warn};

use artefacto_core::error::{ArtefactoError, LoadError, RenderError, Result};
use artefacto_core::human_errors::{humanize_load_error, humanize_render_error};
use artefacto_core::{
    DocumentBackend, DocumentHandle, Edition, PageHandle, Surface, ViewerConfig, Viewport,
};

use crate::keys::command_for_key;
use crate::session::ViewerSession;
use crate::snapshot::{ViewerEvent, ViewerSnapshot, ViewerState};

/// Stream of viewer events, in the order they happened.
pub type ViewerEvents = mpsc::UnboundedReceiver<ViewerEvent>;

/// Reader actions on an open document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerCommand {
    NextPage,
    PreviousPage,
    GoToPage(u32),
    ZoomIn,
    ZoomOut,
    SetScale(f32),
    Close,
}

enum Request {
    Open {
        file_ref: String,
        title: Option<String>,
        reply: oneshot::Sender<std::result::Result<u32, LoadError>>,
    },
    Command {
        command: ViewerCommand,
        reply: oneshot::Sender<ViewerSnapshot>,
    },
}

/// Cloneable front end to the viewer task.
#[derive(Debug, Clone)]
pub struct ViewerHandle {
    requests: mpsc::UnboundedSender<Request>,
    snapshots: watch::Receiver<ViewerSnapshot>,
}

impl ViewerHandle {
    /// Open `file_ref`, replacing any open document. Resolves once the
    /// document is parsed, with its page count; page 1 is then rendering.
    pub async fn open(&self, file_ref: impl Into<String>) -> Result<u32> {
        self.open_titled(file_ref.into(), None).await
    }

    /// Open a catalog edition, titling the viewer after it.
    pub async fn open_edition(&self, edition: &Edition) -> Result<u32> {
        self.open_titled(edition.file_ref.clone(), Some(edition.viewer_title()))
            .await
    }

    async fn open_titled(&self, file_ref: String, title: Option<String>) -> Result<u32> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Open {
                file_ref,
                title,
                reply,
            })
            .map_err(|_| ArtefactoError::ViewerStopped)?;
        let page_count = response.await.map_err(|_| ArtefactoError::ViewerStopped)??;
        Ok(page_count)
    }

    /// Apply a command and return the resulting state.
    pub async fn send(&self, command: ViewerCommand) -> Result<ViewerSnapshot> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Command { command, reply })
            .map_err(|_| ArtefactoError::ViewerStopped)?;
        response.await.map_err(|_| ArtefactoError::ViewerStopped)
    }

    pub async fn next_page(&self) -> Result<ViewerSnapshot> {
        self.send(ViewerCommand::NextPage).await
    }

    pub async fn previous_page(&self) -> Result<ViewerSnapshot> {
        self.send(ViewerCommand::PreviousPage).await
    }

    pub async fn go_to_page(&self, page: u32) -> Result<ViewerSnapshot> {
        self.send(ViewerCommand::GoToPage(page)).await
    }

    pub async fn zoom_in(&self) -> Result<ViewerSnapshot> {
        self.send(ViewerCommand::ZoomIn).await
    }

    pub async fn zoom_out(&self) -> Result<ViewerSnapshot> {
        self.send(ViewerCommand::ZoomOut).await
    }

    pub async fn set_scale(&self, scale: f32) -> Result<ViewerSnapshot> {
        self.send(ViewerCommand::SetScale(scale)).await
    }

    pub async fn close(&self) -> Result<ViewerSnapshot> {
        self.send(ViewerCommand::Close).await
    }

    /// Handle a key press. Keys only act while a document is open; unbound
    /// keys are ignored.
    pub async fn press_key(&self, key: &str) -> Result<Option<ViewerSnapshot>> {
        if !self.snapshot().is_open() {
            return Ok(None);
        }
        match command_for_key(key) {
            Some(command) => self.send(command).await.map(Some),
            None => Ok(None),
        }
    }

    /// Latest published state.
    pub fn snapshot(&self) -> ViewerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<ViewerSnapshot> {
        self.snapshots.clone()
    }
}

/// Entry point for starting the viewer task.
pub struct Viewer;

impl Viewer {
    /// Spawn the viewer task on the current tokio runtime.
    ///
    /// The viewer takes ownership of `surface`. It stops once every
    /// [`ViewerHandle`] has been dropped, closing any open document first.
    pub fn spawn<B, S>(
        backend: B,
        surface: S,
        config: ViewerConfig,
    ) -> Result<(ViewerHandle, ViewerEvents)>
    where
        B: DocumentBackend<S>,
        S: Surface,
    {
        config.validate()?;

        let (requests_tx, requests_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let idle = ViewerSnapshot::idle(config.clamp_scale(config.initial_scale));
        let (snapshots_tx, snapshots_rx) = watch::channel(idle);

        let task = ViewerTask {
            backend,
            config,
            surface: Some(surface),
            session: None,
            in_flight: None,
            loading: None,
            last_error: None,
            requests: requests_rx,
            events: events_tx,
            snapshots: snapshots_tx,
        };
        tokio::spawn(task.run());

        Ok((
            ViewerHandle {
                requests: requests_tx,
                snapshots: snapshots_rx,
            },
            events_rx,
        ))
    }
}

// ---------------------------------------------------------------------------
// Task internals
// ---------------------------------------------------------------------------

/// A finished render, carrying the surface back to the task.
struct RenderOutcome<S> {
    surface: S,
    page: u32,
    scale: f32,
    result: std::result::Result<Viewport, RenderError>,
}

type RenderTask<S> = Pin<Box<dyn Future<Output = RenderOutcome<S>> + Send>>;

enum Step<S> {
    Rendered(RenderOutcome<S>),
    Request(Option<Request>),
}

struct ViewerTask<B: DocumentBackend<S>, S: Surface> {
    backend: B,
    config: ViewerConfig,
    /// `None` exactly while a render owns it.
    surface: Option<S>,
    session: Option<ViewerSession<B::Document>>,
    in_flight: Option<RenderTask<S>>,
    /// (file_ref, title) of a document being parsed.
    loading: Option<(String, Option<String>)>,
    last_error: Option<String>,
    requests: mpsc::UnboundedReceiver<Request>,
    events: mpsc::UnboundedSender<ViewerEvent>,
    snapshots: watch::Sender<ViewerSnapshot>,
}

impl<B: DocumentBackend<S>, S: Surface> ViewerTask<B, S> {
    async fn run(mut self) {
        info!("viewer started");
        loop {
            let step = tokio::select! {
                outcome = next_outcome(&mut self.in_flight) => Step::Rendered(outcome),
                request = self.requests.recv() => Step::Request(request),
            };

            match step {
                Step::Rendered(outcome) => self.finish_render(outcome),
                Step::Request(Some(request)) => self.handle(request).await,
                Step::Request(None) => break,
            }
        }
        self.close().await;
        info!("viewer stopped");
    }

    async fn handle(&mut self, request: Request) {
        match request {
            Request::Open {
                file_ref,
                title,
                reply,
            } => {
                let result = self.open(file_ref, title).await;
                let _ = reply.send(result);
            }
            Request::Command { command, reply } => {
                match command {
                    ViewerCommand::Close => self.close().await,
                    other => self.navigate(other),
                }
                let _ = reply.send(self.publish());
            }
        }
    }

    #[instrument(skip(self, title))]
    async fn open(
        &mut self,
        file_ref: String,
        title: Option<String>,
    ) -> std::result::Result<u32, LoadError> {
        self.close().await;
        self.last_error = None;
        self.loading = Some((file_ref.clone(), title.clone()));
        self.publish();

        info!("opening document");
        let opened = self.backend.open(&file_ref).await;
        self.loading = None;

        let session = opened.and_then(|document| {
            let page_count = document.page_count();
            ViewerSession::new(document, page_count, file_ref.clone(), title, &self.config)
        });

        match session {
            Ok(session) => {
                let page_count = session.page_count();
                info!(page_count, "document opened");
                self.session = Some(session);
                self.emit(ViewerEvent::Opened {
                    file_ref,
                    page_count,
                });
                if let Some(page) = self.session.as_mut().and_then(|s| s.request_current()) {
                    self.start_render(page);
                }
                self.publish();
                Ok(page_count)
            }
            Err(error) => {
                warn!(%error, "document failed to load");
                self.last_error = Some(humanize_load_error(&error).message);
                self.emit(ViewerEvent::LoadFailed {
                    file_ref,
                    reason: error.to_string(),
                });
                self.publish();
                Err(error)
            }
        }
    }

    fn navigate(&mut self, command: ViewerCommand) {
        let config = &self.config;
        let Some(session) = self.session.as_mut() else {
            debug!(?command, "no document open; command ignored");
            return;
        };

        let start = match command {
            ViewerCommand::NextPage => session.next_page().and_then(|p| session.request_page(p)),
            ViewerCommand::PreviousPage => {
                session.previous_page().and_then(|p| session.request_page(p))
            }
            ViewerCommand::GoToPage(page) => {
                session.go_to_page(page).and_then(|p| session.request_page(p))
            }
            ViewerCommand::ZoomIn => session.zoom_in(config).and_then(|_| session.request_current()),
            ViewerCommand::ZoomOut => {
                session.zoom_out(config).and_then(|_| session.request_current())
            }
            ViewerCommand::SetScale(scale) => {
                let stored = session.set_scale(scale, config);
                debug!(requested = scale, stored, "scale set");
                session.request_current()
            }
            ViewerCommand::Close => None,
        };

        if let Some(page) = start {
            self.start_render(page);
        }
    }

    /// Wait out any in-flight render, then drop the session and its document.
    async fn close(&mut self) {
        if let Some(task) = self.in_flight.take() {
            debug!("waiting for in-flight render before closing");
            let outcome = task.await;
            self.report(outcome);
        }

        if let Some(session) = self.session.take() {
            info!(file_ref = session.file_ref(), "document closed");
            self.emit(ViewerEvent::Closed {
                file_ref: session.file_ref().to_string(),
            });
        }
    }

    fn start_render(&mut self, page: u32) {
        debug_assert!(self.in_flight.is_none(), "render started while another is in flight");

        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(mut surface) = self.surface.take() else {
            warn!(page, "surface unavailable; render skipped");
            return;
        };

        let document = Arc::clone(session.document());
        let scale = session.scale();
        debug!(page, scale, "render started");

        self.in_flight = Some(Box::pin(async move {
            let result = draw_page(document.as_ref(), &mut surface, page, scale).await;
            RenderOutcome {
                surface,
                page,
                scale,
                result,
            }
        }));
    }

    fn finish_render(&mut self, outcome: RenderOutcome<S>) {
        self.report(outcome);

        let next = self.session.as_mut().and_then(|s| s.render_mut().complete());
        if let Some(page) = next {
            self.start_render(page);
        }
        self.publish();
    }

    /// Take the surface back and publish what the render produced.
    fn report(&mut self, outcome: RenderOutcome<S>) {
        let RenderOutcome {
            surface,
            page,
            scale,
            result,
        } = outcome;
        self.surface = Some(surface);

        match result {
            Ok(viewport) => {
                debug!(page, scale, width = viewport.width, height = viewport.height, "page rendered");
                self.last_error = None;
                self.emit(ViewerEvent::PageRendered {
                    page,
                    scale,
                    viewport,
                });
            }
            Err(error) => {
                warn!(page, scale, %error, "page render failed");
                self.last_error = Some(humanize_render_error(&error).message);
                self.emit(ViewerEvent::RenderFailed { page, scale, error });
            }
        }
    }

    fn emit(&self, event: ViewerEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }

    fn snapshot(&self) -> ViewerSnapshot {
        let idle_scale = self.config.clamp_scale(self.config.initial_scale);

        if let Some(session) = &self.session {
            let state = if session.render().is_rendering() {
                ViewerState::Rendering
            } else {
                ViewerState::Ready
            };
            return ViewerSnapshot {
                state,
                file_ref: Some(session.file_ref().to_string()),
                title: session.title().map(str::to_string),
                current_page: Some(session.current_page()),
                page_count: Some(session.page_count()),
                scale: session.scale(),
                last_error: self.last_error.clone(),
            };
        }

        let mut snapshot = ViewerSnapshot::idle(idle_scale);
        snapshot.last_error = self.last_error.clone();
        if let Some((file_ref, title)) = &self.loading {
            snapshot.state = ViewerState::Loading;
            snapshot.file_ref = Some(file_ref.clone());
            snapshot.title = title.clone();
        }
        snapshot
    }

    fn publish(&self) -> ViewerSnapshot {
        let snapshot = self.snapshot();
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }
}

/// Resolves when the in-flight render finishes; never resolves when idle.
async fn next_outcome<S>(slot: &mut Option<RenderTask<S>>) -> RenderOutcome<S> {
    if let Some(task) = slot.as_mut() {
        let outcome = task.await;
        *slot = None;
        return outcome;
    }
    std::future::pending().await
}

/// Fetch, size and draw one page.
async fn draw_page<D, S>(
    document: &D,
    surface: &mut S,
    page: u32,
    scale: f32,
) -> std::result::Result<Viewport, RenderError>
where
    D: DocumentHandle<S>,
    S: Surface,
{
    let page_count = document.page_count();
    if page == 0 || page > page_count {
        return Err(RenderError::PageOutOfRange { page, page_count });
    }

    let handle = document.get_page(page).await?;
    let viewport = handle.viewport(scale);
    viewport.check_drawable(page)?;
    surface.resize(viewport.width, viewport.height);
    handle.render_to(surface, scale).await?;
    Ok(viewport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::Semaphore;

    use artefacto_core::Catalog;

    // -- Scripted backend -----------------------------------------------------

    #[derive(Debug, Default)]
    struct TestSurface {
        width: u32,
        height: u32,
        painted: Vec<u32>,
    }

    impl Surface for TestSurface {
        fn size(&self) -> (u32, u32) {
            (self.width, self.height)
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.width = width;
            self.height = height;
            self.painted.clear();
        }
    }

    /// What the backend saw: every render it was asked for, and how many
    /// ran at the same time.
    #[derive(Debug, Default)]
    struct RenderLog {
        started: Mutex<Vec<(u32, f32)>>,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl RenderLog {
        fn pages(&self) -> Vec<u32> {
            self.started.lock().unwrap().iter().map(|(p, _)| *p).collect()
        }

        fn scales(&self) -> Vec<f32> {
            self.started.lock().unwrap().iter().map(|(_, s)| *s).collect()
        }
    }

    /// Renders block on `gate` until the test hands out permits.
    #[derive(Clone)]
    struct ScriptedBackend {
        documents: HashMap<String, u32>,
        failing_pages: HashSet<u32>,
        gate: Arc<Semaphore>,
        log: Arc<RenderLog>,
    }

    impl ScriptedBackend {
        fn new(permits: usize) -> Self {
            Self {
                documents: HashMap::from([
                    ("three.pdf".to_string(), 3),
                    ("five.pdf".to_string(), 5),
                    ("magazines/2025-06-vol1-n1.pdf".to_string(), 24),
                ]),
                failing_pages: HashSet::new(),
                gate: Arc::new(Semaphore::new(permits)),
                log: Arc::default(),
            }
        }

        /// Renders complete as soon as they start.
        fn immediate() -> Self {
            Self::new(Semaphore::MAX_PERMITS)
        }

        /// Renders wait for `gate.add_permits`.
        fn gated() -> Self {
            Self::new(0)
        }
    }

    struct ScriptedDocument {
        page_count: u32,
        failing_pages: HashSet<u32>,
        gate: Arc<Semaphore>,
        log: Arc<RenderLog>,
    }

    struct ScriptedPage {
        number: u32,
        fails: bool,
        gate: Arc<Semaphore>,
        log: Arc<RenderLog>,
    }

    impl DocumentBackend<TestSurface> for ScriptedBackend {
        type Document = ScriptedDocument;

        async fn open(&self, file_ref: &str) -> std::result::Result<ScriptedDocument, LoadError> {
            match self.documents.get(file_ref) {
                Some(&page_count) => Ok(ScriptedDocument {
                    page_count,
                    failing_pages: self.failing_pages.clone(),
                    gate: Arc::clone(&self.gate),
                    log: Arc::clone(&self.log),
                }),
                None => Err(LoadError::Malformed {
                    file_ref: file_ref.to_string(),
                    reason: "not a PDF".into(),
                }),
            }
        }
    }

    impl DocumentHandle<TestSurface> for ScriptedDocument {
        type Page = ScriptedPage;

        fn page_count(&self) -> u32 {
            self.page_count
        }

        async fn get_page(&self, number: u32) -> std::result::Result<ScriptedPage, RenderError> {
            Ok(ScriptedPage {
                number,
                fails: self.failing_pages.contains(&number),
                gate: Arc::clone(&self.gate),
                log: Arc::clone(&self.log),
            })
        }
    }

    impl PageHandle<TestSurface> for ScriptedPage {
        fn viewport(&self, scale: f32) -> Viewport {
            Viewport::from_points(100.0, 200.0, scale)
        }

        async fn render_to(
            &self,
            surface: &mut TestSurface,
            scale: f32,
        ) -> std::result::Result<(), RenderError> {
            self.log.started.lock().unwrap().push((self.number, scale));
            let active = self.log.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.log.max_active.fetch_max(active, Ordering::SeqCst);

            self.gate.acquire().await.expect("gate closed").forget();

            self.log.active.fetch_sub(1, Ordering::SeqCst);
            if self.fails {
                return Err(RenderError::Raster {
                    page: self.number,
                    reason: "scripted failure".into(),
                });
            }
            surface.painted.push(self.number);
            Ok(())
        }
    }

    // -- Helpers --------------------------------------------------------------

    fn spawn(backend: ScriptedBackend) -> (ViewerHandle, ViewerEvents) {
        Viewer::spawn(backend, TestSurface::default(), ViewerConfig::default()).expect("spawn")
    }

    async fn next_event(events: &mut ViewerEvents) -> ViewerEvent {
        tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for viewer event")
            .expect("viewer stopped")
    }

    /// Skip to the next render outcome, returning (page, scale, succeeded).
    async fn next_render(events: &mut ViewerEvents) -> (u32, f32, bool) {
        loop {
            match next_event(events).await {
                ViewerEvent::PageRendered { page, scale, .. } => return (page, scale, true),
                ViewerEvent::RenderFailed { page, scale, .. } => return (page, scale, false),
                _ => continue,
            }
        }
    }

    // -- Coalescing -----------------------------------------------------------

    #[tokio::test]
    async fn rapid_paging_renders_first_and_last_only() {
        let backend = ScriptedBackend::gated();
        let (gate, log) = (Arc::clone(&backend.gate), Arc::clone(&backend.log));
        let (viewer, mut events) = spawn(backend);

        assert_eq!(viewer.open("three.pdf").await.unwrap(), 3);
        viewer.next_page().await.unwrap();
        viewer.next_page().await.unwrap();
        let snapshot = viewer.next_page().await.unwrap();
        assert_eq!(snapshot.current_page, Some(3));
        assert_eq!(snapshot.state, ViewerState::Rendering);

        gate.add_permits(16);
        assert_eq!(next_render(&mut events).await.0, 1);
        assert_eq!(next_render(&mut events).await.0, 3);

        let snapshot = viewer.go_to_page(3).await.unwrap();
        assert_eq!(snapshot.state, ViewerState::Ready);
        assert_eq!(log.pages(), vec![1, 3]);
        assert_eq!(log.max_active.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn synchronous_completion_renders_every_page_in_order() {
        let backend = ScriptedBackend::immediate();
        let log = Arc::clone(&backend.log);
        let (viewer, mut events) = spawn(backend);

        viewer.open("three.pdf").await.unwrap();
        assert_eq!(next_render(&mut events).await.0, 1);
        viewer.next_page().await.unwrap();
        assert_eq!(next_render(&mut events).await.0, 2);
        viewer.next_page().await.unwrap();
        assert_eq!(next_render(&mut events).await.0, 3);

        let snapshot = viewer.next_page().await.unwrap();
        assert_eq!(snapshot.current_page, Some(3));
        assert_eq!(snapshot.state, ViewerState::Ready);
        assert_eq!(log.pages(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn previous_at_first_page_is_a_no_op() {
        let backend = ScriptedBackend::immediate();
        let log = Arc::clone(&backend.log);
        let (viewer, mut events) = spawn(backend);

        viewer.open("three.pdf").await.unwrap();
        next_render(&mut events).await;

        let snapshot = viewer.previous_page().await.unwrap();
        assert_eq!(snapshot.current_page, Some(1));
        assert_eq!(snapshot.state, ViewerState::Ready);
        assert!(!snapshot.can_go_previous());
        assert_eq!(log.pages(), vec![1]);
    }

    #[tokio::test]
    async fn subscribers_see_page_changes() {
        let backend = ScriptedBackend::immediate();
        let (viewer, mut events) = spawn(backend);
        let mut watcher = viewer.subscribe();

        viewer.open("three.pdf").await.unwrap();
        next_render(&mut events).await;
        drop(watcher.borrow_and_update());

        viewer.next_page().await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), watcher.changed())
            .await
            .expect("timed out waiting for snapshot")
            .expect("viewer stopped");
        assert_eq!(watcher.borrow().current_page, Some(2));
    }

    // -- Loading --------------------------------------------------------------

    #[tokio::test]
    async fn rejected_document_leaves_viewer_idle() {
        let (viewer, mut events) = spawn(ScriptedBackend::immediate());

        let err = viewer.open("bad.pdf").await.unwrap_err();
        assert!(matches!(err, ArtefactoError::Load(LoadError::Malformed { .. })));

        let snapshot = viewer.snapshot();
        assert_eq!(snapshot.state, ViewerState::Idle);
        assert_eq!(snapshot.current_page, None);
        assert_eq!(
            snapshot.last_error.as_deref(),
            Some("Error al cargar el PDF. Por favor, intenta nuevamente.")
        );
        assert!(matches!(
            next_event(&mut events).await,
            ViewerEvent::LoadFailed { file_ref, .. } if file_ref == "bad.pdf"
        ));
    }

    #[tokio::test]
    async fn opening_an_edition_titles_the_viewer() {
        let (viewer, mut events) = spawn(ScriptedBackend::immediate());
        let catalog = Catalog::builtin();
        let edition = catalog.latest().expect("an edition");

        assert_eq!(viewer.open_edition(edition).await.unwrap(), 24);
        assert!(matches!(
            next_event(&mut events).await,
            ViewerEvent::Opened { page_count: 24, .. }
        ));

        let snapshot = viewer.snapshot();
        assert_eq!(
            snapshot.title.as_deref(),
            Some("Artefacto - Junio 2025 - Vol. 1, Nº 1")
        );
        assert_eq!(snapshot.page_label().as_deref(), Some("Página 1 de 24"));
        assert_eq!(snapshot.zoom_label(), "120%");
    }

    #[tokio::test]
    async fn opening_another_document_closes_the_first() {
        let (viewer, mut events) = spawn(ScriptedBackend::immediate());

        viewer.open("three.pdf").await.unwrap();
        next_render(&mut events).await;
        viewer.next_page().await.unwrap();
        next_render(&mut events).await;

        assert_eq!(viewer.open("five.pdf").await.unwrap(), 5);
        assert!(matches!(
            next_event(&mut events).await,
            ViewerEvent::Closed { file_ref } if file_ref == "three.pdf"
        ));
        assert!(matches!(
            next_event(&mut events).await,
            ViewerEvent::Opened { page_count: 5, .. }
        ));
        assert_eq!(next_render(&mut events).await.0, 1);
        assert_eq!(viewer.snapshot().current_page, Some(1));
    }

    // -- Render failures ------------------------------------------------------

    #[tokio::test]
    async fn render_failure_keeps_session_open() {
        let mut backend = ScriptedBackend::immediate();
        backend.failing_pages.insert(2);
        let (viewer, mut events) = spawn(backend);

        viewer.open("five.pdf").await.unwrap();
        assert_eq!(next_render(&mut events).await, (1, 1.2, true));

        viewer.next_page().await.unwrap();
        assert_eq!(next_render(&mut events).await, (2, 1.2, false));

        let snapshot = viewer.go_to_page(2).await.unwrap();
        assert_eq!(snapshot.state, ViewerState::Ready);
        assert_eq!(
            snapshot.last_error.as_deref(),
            Some("No se pudo mostrar la página 2.")
        );

        viewer.next_page().await.unwrap();
        assert_eq!(next_render(&mut events).await, (3, 1.2, true));
        assert_eq!(viewer.go_to_page(3).await.unwrap().last_error, None);
    }

    #[tokio::test]
    async fn queued_page_still_renders_after_failure() {
        let mut backend = ScriptedBackend::gated();
        backend.failing_pages.insert(1);
        let (gate, log) = (Arc::clone(&backend.gate), Arc::clone(&backend.log));
        let (viewer, mut events) = spawn(backend);

        viewer.open("five.pdf").await.unwrap();
        viewer.go_to_page(4).await.unwrap();

        gate.add_permits(16);
        assert_eq!(next_render(&mut events).await, (1, 1.2, false));
        assert_eq!(next_render(&mut events).await, (4, 1.2, true));
        assert_eq!(log.pages(), vec![1, 4]);
    }

    // -- Zoom -----------------------------------------------------------------

    #[tokio::test]
    async fn zoom_re_renders_current_page_and_respects_floor() {
        let backend = ScriptedBackend::immediate();
        let log = Arc::clone(&backend.log);
        let (viewer, mut events) = spawn(backend);

        viewer.open("three.pdf").await.unwrap();
        next_render(&mut events).await;

        let snapshot = viewer.set_scale(0.1).await.unwrap();
        assert_eq!(snapshot.scale, 0.4);
        assert_eq!(next_render(&mut events).await, (1, 0.4, true));

        let snapshot = viewer.zoom_out().await.unwrap();
        assert_eq!(snapshot.scale, 0.4);
        assert_eq!(snapshot.state, ViewerState::Ready);

        let snapshot = viewer.zoom_in().await.unwrap();
        assert_eq!(snapshot.zoom_label(), "60%");
        assert_eq!(next_render(&mut events).await, (1, 0.6, true));

        assert_eq!(log.scales(), vec![1.2, 0.4, 0.6]);
    }

    #[tokio::test]
    async fn oversized_zoom_fails_the_render_and_keeps_the_session() {
        let backend = ScriptedBackend::immediate();
        let log = Arc::clone(&backend.log);
        let (viewer, mut events) = spawn(backend);

        viewer.open("three.pdf").await.unwrap();
        next_render(&mut events).await;

        let snapshot = viewer.set_scale(10_000.0).await.unwrap();
        assert_eq!(snapshot.scale, 10_000.0);
        match next_event(&mut events).await {
            ViewerEvent::RenderFailed {
                page: 1,
                error: RenderError::Raster { .. },
                ..
            } => {}
            other => panic!("unexpected event: {other:?}"),
        }

        let snapshot = viewer.next_page().await.unwrap();
        assert_eq!(snapshot.current_page, Some(2));
        assert!(snapshot.is_open());
        assert_eq!(next_render(&mut events).await, (2, 10_000.0, false));

        viewer.set_scale(1.0).await.unwrap();
        assert_eq!(next_render(&mut events).await, (2, 1.0, true));

        // The oversized requests never reached the backend.
        assert_eq!(log.scales(), vec![1.2, 1.0]);
    }

    #[tokio::test]
    async fn queued_render_uses_latest_scale() {
        let backend = ScriptedBackend::gated();
        let (gate, log) = (Arc::clone(&backend.gate), Arc::clone(&backend.log));
        let (viewer, mut events) = spawn(backend);

        viewer.open("three.pdf").await.unwrap();
        viewer.zoom_in().await.unwrap();
        viewer.zoom_in().await.unwrap();

        gate.add_permits(16);
        assert_eq!(next_render(&mut events).await, (1, 1.2, true));
        assert_eq!(next_render(&mut events).await, (1, 1.6, true));
        assert_eq!(log.pages(), vec![1, 1]);
    }

    // -- Closing --------------------------------------------------------------

    #[tokio::test]
    async fn close_waits_for_in_flight_render() {
        let backend = ScriptedBackend::gated();
        let gate = Arc::clone(&backend.gate);
        let (viewer, mut events) = spawn(backend);

        viewer.open("three.pdf").await.unwrap();
        assert_eq!(viewer.snapshot().state, ViewerState::Rendering);

        let closer = {
            let viewer = viewer.clone();
            tokio::spawn(async move { viewer.close().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!closer.is_finished());
        gate.add_permits(16);
        let snapshot = closer.await.expect("join").expect("close");

        assert_eq!(snapshot.state, ViewerState::Idle);
        assert_eq!(snapshot.current_page, None);
        assert!(matches!(next_event(&mut events).await, ViewerEvent::Opened { .. }));
        assert_eq!(next_render(&mut events).await.0, 1);
        assert!(matches!(next_event(&mut events).await, ViewerEvent::Closed { .. }));
    }

    #[tokio::test]
    async fn commands_without_document_are_ignored() {
        let (viewer, _events) = spawn(ScriptedBackend::immediate());

        let snapshot = viewer.next_page().await.unwrap();
        assert_eq!(snapshot.state, ViewerState::Idle);
        assert_eq!(snapshot.current_page, None);
        assert!(viewer.press_key("ArrowRight").await.unwrap().is_none());
        assert_eq!(viewer.close().await.unwrap().state, ViewerState::Idle);
    }

    #[tokio::test]
    async fn keys_drive_an_open_viewer() {
        let (viewer, mut events) = spawn(ScriptedBackend::immediate());

        viewer.open("three.pdf").await.unwrap();
        next_render(&mut events).await;

        let snapshot = viewer.press_key("ArrowRight").await.unwrap().expect("handled");
        assert_eq!(snapshot.current_page, Some(2));
        next_render(&mut events).await;

        assert!(viewer.press_key("Enter").await.unwrap().is_none());

        let snapshot = viewer.press_key("Escape").await.unwrap().expect("handled");
        assert_eq!(snapshot.state, ViewerState::Idle);
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let config = ViewerConfig {
            min_scale: 0.0,
            ..ViewerConfig::default()
        };
        let result = Viewer::spawn(ScriptedBackend::immediate(), TestSurface::default(), config);
        assert!(matches!(result, Err(ArtefactoError::Config(_))));
    }
}
