//! Interactive drawing session.
//!
//! A [`DrawingSession`] owns the committed boundary, the committed roads and
//! the active [`PlantingConfig`], and is the only thing that mutates them.
//! Input arrives as discrete events (start, add point, undo, cancel, finish,
//! delete last road, clear, config change), either through the named methods
//! or as [`SessionEvent`] values passed to [`DrawingSession::handle`].
//!
//! ## States
//!
//! ```text
//!            start(Boundary)               finish (>= 3 points)
//!   Idle ───────────────────► DrawingBoundary ───────────────────► Idle
//!    │                              │  cancel
//!    │ start(Road)                  └────────────────────────────► Idle
//!    │ (needs a boundary)           finish (>= 2 points)
//!    └────────────────────────► DrawingRoad ─────────────────────► Idle
//! ```
//!
//! Entering or leaving a drawing state clears the pending vertices and their
//! scene markers. Every committing mutation recomputes the layout from
//! scratch and bumps [`DrawingSession::revision`].
//!
//! ## Persistence
//!
//! With a [`KeyValueStore`] attached the session writes its snapshot and
//! config after every change and can [`restore`](DrawingSession::restore)
//! itself later. A failing store is logged and detached; the session keeps
//! working without persistence.

mod library;
mod snapshot;

pub use library::{DesignLibrary, SavedDesign, DESIGNS_KEY, MAX_SAVED_DESIGNS};
pub use snapshot::{
    SessionSnapshot, ViewState, CONFIG_KEY, DEFAULT_VIEW_CENTER, DEFAULT_VIEW_ZOOM, SNAPSHOT_KEY,
};

use crate::catalog::Catalog;
use crate::clipper::ClipperGeometry;
use crate::config::PlantingConfig;
use crate::geometry::{GeoPoint, GeometryService};
use crate::layout::{Boundary, LayoutEngine, LayoutResult, RoadPath, ShapeError};
use crate::scene::{Primitive, PrimitiveId, PrimitiveKind, SceneRegistry};
use crate::services::{normalize_ring, ParcelRegistry, ServiceError, ServiceResult};
use crate::storage::{load_json, save_json, KeyValueStore, StoreError, StoreResult};
use std::fmt;

/// Errors returned by session operations. None of them changes committed
/// state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("invalid boundary: {0}")]
    InvalidBoundary(#[source] ShapeError),

    #[error("invalid road: {0}")]
    InvalidRoad(#[source] ShapeError),

    #[error("a boundary must be committed first")]
    NoBoundary,

    #[error("not currently drawing")]
    NotDrawing,

    #[error("only allowed while idle")]
    NotIdle,

    #[error("invalid point {0}")]
    InvalidPoint(GeoPoint),

    #[error("a parcel lookup is already in progress")]
    Busy,

    #[error("no parcel lookup in progress")]
    NoLookup,

    #[error("external service failed: {0}")]
    External(#[from] ServiceError),

    #[error("unknown {kind} '{id}'")]
    UnknownEntry { kind: &'static str, id: String },
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    DrawingBoundary,
    DrawingRoad,
}

impl Mode {
    pub fn is_drawing(self) -> bool {
        self != Mode::Idle
    }
}

/// What a drawing gesture produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawTarget {
    Boundary,
    Road,
}

/// A discrete input event.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Start(DrawTarget),
    AddPoint(GeoPoint),
    Undo,
    Cancel,
    Finish,
    DeleteLastRoad,
    ClearAll,
    SetConfig(PlantingConfig),
    SetView(ViewState),
}

/// Scene ids of the committed primitives.
#[derive(Debug, Clone, Default)]
struct Markers {
    boundary: Option<PrimitiveId>,
    roads: Vec<PrimitiveId>,
    trees: Vec<PrimitiveId>,
    pending: Vec<PrimitiveId>,
}

/// The interactive front end of the layout engine.
pub struct DrawingSession<G: GeometryService = ClipperGeometry> {
    engine: LayoutEngine<G>,
    catalog: Catalog,
    store: Option<Box<dyn KeyValueStore>>,
    mode: Mode,
    pending: Vec<GeoPoint>,
    boundary: Option<Boundary>,
    roads: Vec<RoadPath>,
    config: PlantingConfig,
    result: Option<LayoutResult>,
    view: ViewState,
    scene: SceneRegistry,
    markers: Markers,
    parcel_lookup_pending: bool,
    revision: u64,
}

impl<G: GeometryService> fmt::Debug for DrawingSession<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawingSession")
            .field("mode", &self.mode)
            .field("pending", &self.pending.len())
            .field("has_boundary", &self.boundary.is_some())
            .field("roads", &self.roads.len())
            .field("config", &self.config)
            .field("persistent", &self.store.is_some())
            .field("revision", &self.revision)
            .finish()
    }
}

impl DrawingSession<ClipperGeometry> {
    /// Non-persistent session over the Clipper backend.
    pub fn new(config: PlantingConfig) -> Self {
        Self::with_engine(LayoutEngine::new(ClipperGeometry::default()), config)
    }

    /// Persistent session over the Clipper backend, restored from `store`.
    pub fn open<S: KeyValueStore + 'static>(store: S) -> Self {
        Self::open_with_engine(LayoutEngine::new(ClipperGeometry::default()), store)
    }
}

impl<G: GeometryService> DrawingSession<G> {
    /// Non-persistent session over any geometry backend.
    pub fn with_engine(engine: LayoutEngine<G>, config: PlantingConfig) -> Self {
        Self {
            engine,
            catalog: Catalog::builtin(),
            store: None,
            mode: Mode::Idle,
            pending: Vec::new(),
            boundary: None,
            roads: Vec::new(),
            config: config.sanitized(),
            result: None,
            view: ViewState::default(),
            scene: SceneRegistry::new(),
            markers: Markers::default(),
            parcel_lookup_pending: false,
            revision: 0,
        }
    }

    /// Persistent session: loads the stored config (missing fields take
    /// defaults) and replays the stored snapshot.
    pub fn open_with_engine<S: KeyValueStore + 'static>(engine: LayoutEngine<G>, store: S) -> Self {
        let mut session = Self::with_engine(engine, PlantingConfig::default()).with_store(store);

        let stored: Option<StoreResult<Option<PlantingConfig>>> =
            session.store.as_deref().map(|s| load_json(s, CONFIG_KEY));
        match stored {
            Some(Ok(Some(config))) => session.config = config.sanitized(),
            Some(Ok(None)) | None => {}
            Some(Err(e)) => log::warn!("ignoring stored config: {}", e),
        }

        session.restore();
        session
    }

    /// Attach a store. Nothing is written until the next change.
    pub fn with_store<S: KeyValueStore + 'static>(mut self, store: S) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Replace the reference catalog.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Vertices of the shape being drawn.
    pub fn pending(&self) -> &[GeoPoint] {
        &self.pending
    }

    pub fn boundary(&self) -> Option<&Boundary> {
        self.boundary.as_ref()
    }

    pub fn roads(&self) -> &[RoadPath] {
        &self.roads
    }

    pub fn config(&self) -> &PlantingConfig {
        &self.config
    }

    /// Latest layout; `None` until a boundary is committed.
    pub fn result(&self) -> Option<&LayoutResult> {
        self.result.as_ref()
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn scene(&self) -> &SceneRegistry {
        &self.scene
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn engine(&self) -> &LayoutEngine<G> {
        &self.engine
    }

    /// Scene id of the committed boundary.
    pub fn boundary_marker(&self) -> Option<PrimitiveId> {
        self.markers.boundary
    }

    /// Scene ids of the committed roads, in road order.
    pub fn road_markers(&self) -> &[PrimitiveId] {
        &self.markers.roads
    }

    /// Scene ids of the tree markers, in result order.
    pub fn tree_markers(&self) -> &[PrimitiveId] {
        &self.markers.trees
    }

    /// Counter bumped by every recomputation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether a store is attached.
    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    pub fn is_parcel_lookup_pending(&self) -> bool {
        self.parcel_lookup_pending
    }

    /// Minimum pass width of the selected machine, if rows are narrower.
    pub fn clearance_warning(&self) -> Option<f64> {
        self.catalog
            .machine(&self.config.machine_id)
            .filter(|m| self.config.lacks_clearance_for(m))
            .map(|m| m.min_pass_width)
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Dispatch an event to the matching operation.
    pub fn handle(&mut self, event: SessionEvent) -> SessionResult<()> {
        match event {
            SessionEvent::Start(target) => self.start(target),
            SessionEvent::AddPoint(p) => self.add_point(p),
            SessionEvent::Undo => {
                self.undo();
                Ok(())
            }
            SessionEvent::Cancel => {
                self.cancel();
                Ok(())
            }
            SessionEvent::Finish => self.finish(),
            SessionEvent::DeleteLastRoad => self.delete_last_road().map(|_| ()),
            SessionEvent::ClearAll => {
                self.clear_all();
                Ok(())
            }
            SessionEvent::SetConfig(config) => {
                self.set_config(config);
                Ok(())
            }
            SessionEvent::SetView(view) => {
                self.set_view(view);
                Ok(())
            }
        }
    }

    /// Begin drawing a boundary or a road.
    ///
    /// Starting while already drawing abandons the current shape.
    pub fn start(&mut self, target: DrawTarget) -> SessionResult<()> {
        let mode = match target {
            DrawTarget::Boundary => Mode::DrawingBoundary,
            DrawTarget::Road => {
                if self.boundary.is_none() {
                    return Err(SessionError::NoBoundary);
                }
                Mode::DrawingRoad
            }
        };
        if self.mode.is_drawing() {
            self.exit_drawing();
        }
        self.enter(mode);
        Ok(())
    }

    /// Append a vertex to the shape being drawn.
    pub fn add_point(&mut self, point: GeoPoint) -> SessionResult<()> {
        if !self.mode.is_drawing() {
            return Err(SessionError::NotDrawing);
        }
        if !point.is_valid() {
            return Err(SessionError::InvalidPoint(point));
        }
        self.pending.push(point);
        let id = self.scene.add(Primitive::PendingVertex(point));
        self.markers.pending.push(id);
        Ok(())
    }

    /// Remove the last pending vertex. No-op when there is none.
    pub fn undo(&mut self) -> Option<GeoPoint> {
        let point = self.pending.pop()?;
        if let Some(id) = self.markers.pending.pop() {
            self.scene.remove(id);
        }
        Some(point)
    }

    /// Abandon the shape being drawn. Committed state is untouched.
    pub fn cancel(&mut self) {
        if self.mode.is_drawing() {
            self.exit_drawing();
        }
    }

    /// Commit the shape being drawn.
    ///
    /// A new boundary replaces the old one and clears every road. On error
    /// the session stays in its drawing state with the vertices intact.
    pub fn finish(&mut self) -> SessionResult<()> {
        match self.mode {
            Mode::Idle => Err(SessionError::NotDrawing),
            Mode::DrawingBoundary => {
                let boundary = Boundary::commit(&self.pending, self.engine.geometry())
                    .map_err(SessionError::InvalidBoundary)?;
                self.exit_drawing();
                self.boundary = Some(boundary);
                self.roads.clear();
                self.persist_snapshot();
                self.recompute();
                Ok(())
            }
            Mode::DrawingRoad => {
                let road = RoadPath::commit(&self.pending).map_err(SessionError::InvalidRoad)?;
                self.exit_drawing();
                self.roads.push(road);
                self.persist_snapshot();
                self.recompute();
                Ok(())
            }
        }
    }

    /// Remove the most recent road.
    pub fn delete_last_road(&mut self) -> SessionResult<Option<RoadPath>> {
        if self.mode.is_drawing() {
            return Err(SessionError::NotIdle);
        }
        let Some(road) = self.roads.pop() else {
            return Ok(None);
        };
        self.persist_snapshot();
        self.recompute();
        Ok(Some(road))
    }

    /// Drop everything that was drawn, including the stored snapshot.
    pub fn clear_all(&mut self) {
        if self.mode.is_drawing() {
            self.exit_drawing();
        }
        self.boundary = None;
        self.roads.clear();
        self.result = None;
        self.scene.clear();
        self.markers = Markers::default();
        self.revision += 1;

        if let Some(store) = self.store.as_deref_mut() {
            if let Err(e) = store.remove(SNAPSHOT_KEY) {
                self.detach_store("clear snapshot", e);
            }
        }
    }

    /// Replace the planting config.
    ///
    /// Out-of-range values are clamped. Recomputes when a boundary exists.
    pub fn set_config(&mut self, config: PlantingConfig) {
        self.config = config.sanitized();
        self.persist_config();
        if self.boundary.is_some() {
            self.recompute();
        }
    }

    /// Switch rootstock and adopt its recommended spacing.
    pub fn select_rootstock(&mut self, id: &str) -> SessionResult<()> {
        let rootstock = self
            .catalog
            .rootstock(id)
            .ok_or_else(|| SessionError::UnknownEntry {
                kind: "rootstock",
                id: id.to_string(),
            })?;
        let mut config = self.config.clone();
        config.apply_rootstock(rootstock);
        self.set_config(config);
        Ok(())
    }

    /// Switch machine, widening rows and roads to its pass width.
    pub fn select_machine(&mut self, id: &str) -> SessionResult<()> {
        let machine = self
            .catalog
            .machine(id)
            .ok_or_else(|| SessionError::UnknownEntry {
                kind: "machine",
                id: id.to_string(),
            })?;
        let mut config = self.config.clone();
        config.apply_machine(machine);
        self.set_config(config);
        Ok(())
    }

    /// Record the viewport. Persisted with the snapshot.
    pub fn set_view(&mut self, view: ViewState) {
        if view.center.is_valid() && view.zoom.is_finite() {
            self.view = view;
            self.persist_snapshot();
        }
    }

    // ========================================================================
    // Parcel lookup
    // ========================================================================

    /// Mark a parcel lookup as in flight and return the point to look up
    /// (the view center).
    pub fn begin_parcel_lookup(&mut self) -> SessionResult<GeoPoint> {
        if self.parcel_lookup_pending {
            return Err(SessionError::Busy);
        }
        self.parcel_lookup_pending = true;
        Ok(self.view.center)
    }

    /// Finish an in-flight lookup with the registry's answer.
    ///
    /// A failed lookup, or a ring that does not make a valid boundary,
    /// leaves committed state unchanged.
    pub fn complete_parcel_lookup(
        &mut self,
        outcome: ServiceResult<Vec<GeoPoint>>,
    ) -> SessionResult<()> {
        if !self.parcel_lookup_pending {
            return Err(SessionError::NoLookup);
        }
        self.parcel_lookup_pending = false;
        let ring = outcome.and_then(|ring| normalize_ring(&ring))?;
        self.load_parcel(&ring)
    }

    /// Look up the parcel under the view center synchronously.
    pub fn lookup_parcel<R: ParcelRegistry + ?Sized>(&mut self, registry: &R) -> SessionResult<()> {
        let at = self.begin_parcel_lookup()?;
        let outcome = registry.lookup(at);
        self.complete_parcel_lookup(outcome)
    }

    /// Replace the boundary with a parcel ring and clear all roads.
    pub fn load_parcel(&mut self, ring: &[GeoPoint]) -> SessionResult<()> {
        let boundary = Boundary::commit(ring, self.engine.geometry())
            .map_err(SessionError::InvalidBoundary)?;
        if self.mode.is_drawing() {
            self.exit_drawing();
        }
        self.boundary = Some(boundary);
        self.roads.clear();
        self.persist_snapshot();
        self.recompute();
        Ok(())
    }

    // ========================================================================
    // Snapshot
    // ========================================================================

    /// The committed inputs and viewport.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            boundary: self.boundary.as_ref().map(|b| b.ring().to_vec()),
            roads: self.roads.iter().map(|r| r.points().to_vec()).collect(),
            view_center: Some(self.view.center),
            view_zoom: Some(self.view.zoom),
        }
    }

    /// Replay a snapshot through the normal commit path.
    ///
    /// All shapes are validated before anything changes.
    pub fn apply_snapshot(&mut self, snapshot: &SessionSnapshot) -> SessionResult<()> {
        let boundary = snapshot
            .boundary
            .as_deref()
            .map(|ring| Boundary::commit(ring, self.engine.geometry()))
            .transpose()
            .map_err(SessionError::InvalidBoundary)?;
        let roads = snapshot
            .roads
            .iter()
            .map(|r| RoadPath::commit(r))
            .collect::<Result<Vec<_>, _>>()
            .map_err(SessionError::InvalidRoad)?;
        if boundary.is_none() && !roads.is_empty() {
            return Err(SessionError::NoBoundary);
        }

        if self.mode.is_drawing() {
            self.exit_drawing();
        }
        self.boundary = boundary;
        self.roads = roads;
        self.view = snapshot.view();
        self.result = None;
        self.recompute();
        Ok(())
    }

    /// Restore from the attached store's snapshot.
    ///
    /// Returns true if a boundary was restored. An unreadable or invalid
    /// snapshot is logged and ignored.
    pub fn restore(&mut self) -> bool {
        let loaded: Option<StoreResult<Option<SessionSnapshot>>> =
            self.store.as_deref().map(|s| load_json(s, SNAPSHOT_KEY));
        let snapshot = match loaded {
            None | Some(Ok(None)) => return false,
            Some(Ok(Some(snapshot))) => snapshot,
            Some(Err(StoreError::Json(e))) => {
                log::warn!("discarding unreadable snapshot: {}", e);
                return false;
            }
            Some(Err(e)) => {
                self.detach_store("read snapshot", e);
                return false;
            }
        };

        match self.apply_snapshot(&snapshot) {
            Ok(()) => {
                log::debug!(
                    "restored snapshot with {} road(s), boundary: {}",
                    self.roads.len(),
                    self.boundary.is_some()
                );
                self.boundary.is_some()
            }
            Err(e) => {
                log::warn!("discarding invalid snapshot: {}", e);
                false
            }
        }
    }

    // ========================================================================
    // Design library
    // ========================================================================

    /// Saved designs, newest first. Empty without a store.
    pub fn saved_designs(&mut self) -> Vec<SavedDesign> {
        self.load_library()
            .map(|library| library.designs().to_vec())
            .unwrap_or_default()
    }

    /// Save the current design under `name` (a default name if blank).
    ///
    /// Returns `None` when nothing is committed yet.
    pub fn save_design(&mut self, name: &str) -> Option<SavedDesign> {
        if self.boundary.is_none() || self.result.is_none() {
            return None;
        }
        let mut library = self.load_library().unwrap_or_default();
        let (boundary, result) = (self.boundary.as_ref()?, self.result.as_ref()?);

        let name = match name.trim() {
            "" => format!("{} {}", self.config.variety_id, library.len() + 1),
            trimmed => trimmed.to_string(),
        };
        let now = chrono::Local::now();
        let design = SavedDesign {
            id: library.fresh_id(now.timestamp_millis()),
            name,
            date: now.date_naive(),
            config: self.config.clone(),
            result: result.summary(),
            boundary: boundary.ring().to_vec(),
            roads: self.roads.iter().map(|r| r.points().to_vec()).collect(),
        };

        library.insert(design.clone());
        self.write_library(&library);
        Some(design)
    }

    /// Delete a saved design. Returns true if it existed.
    pub fn delete_design(&mut self, id: &str) -> bool {
        let Some(mut library) = self.load_library() else {
            return false;
        };
        let removed = library.remove(id).is_some();
        if removed {
            self.write_library(&library);
        }
        removed
    }

    /// Load a saved design: config, boundary and roads are replayed and the
    /// layout recomputed. The stored result summary is not trusted.
    pub fn load_design(&mut self, design: &SavedDesign) -> SessionResult<()> {
        let snapshot = SessionSnapshot {
            boundary: Some(design.boundary.clone()),
            roads: design.roads.clone(),
            view_center: Some(self.view.center),
            view_zoom: Some(self.view.zoom),
        };
        let previous = std::mem::replace(&mut self.config, design.config.sanitized());
        if let Err(e) = self.apply_snapshot(&snapshot) {
            self.config = previous;
            return Err(e);
        }
        self.persist_config();
        self.persist_snapshot();
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn enter(&mut self, mode: Mode) {
        self.clear_pending();
        self.mode = mode;
    }

    fn exit_drawing(&mut self) {
        self.clear_pending();
        self.mode = Mode::Idle;
    }

    fn clear_pending(&mut self) {
        self.pending.clear();
        for id in self.markers.pending.drain(..) {
            self.scene.remove(id);
        }
    }

    fn recompute(&mut self) {
        self.revision += 1;
        self.result = self.boundary.as_ref().map(|boundary| {
            let per_tree = self.catalog.yield_for(&self.config.variety_id);
            self.engine
                .compute(boundary, &self.roads, &self.config, per_tree)
        });
        if let Some(result) = &self.result {
            log::debug!("revision {}: {}", self.revision, result);
        }
        self.sync_scene();
    }

    /// Rebuild the committed primitives from the current state.
    fn sync_scene(&mut self) {
        for kind in [PrimitiveKind::Boundary, PrimitiveKind::Road, PrimitiveKind::Tree] {
            self.scene.remove_kind(kind);
        }

        let scene = &mut self.scene;
        self.markers.boundary = self
            .boundary
            .as_ref()
            .map(|b| scene.add(Primitive::Boundary(b.ring().to_vec())));
        self.markers.roads = self
            .roads
            .iter()
            .enumerate()
            .map(|(index, r)| {
                scene.add(Primitive::Road {
                    index,
                    points: r.points().to_vec(),
                })
            })
            .collect();
        self.markers.trees = self
            .result
            .iter()
            .flat_map(|r| r.tree_positions.iter())
            .map(|t| scene.add(Primitive::Tree(t.position)))
            .collect();
    }

    fn persist_snapshot(&mut self) {
        let snapshot = self.snapshot();
        if let Some(store) = self.store.as_deref_mut() {
            if let Err(e) = save_json(store, SNAPSHOT_KEY, &snapshot) {
                self.detach_store("write snapshot", e);
            }
        }
    }

    fn persist_config(&mut self) {
        let config = self.config.clone();
        if let Some(store) = self.store.as_deref_mut() {
            if let Err(e) = save_json(store, CONFIG_KEY, &config) {
                self.detach_store("write config", e);
            }
        }
    }

    fn load_library(&mut self) -> Option<DesignLibrary> {
        let loaded = DesignLibrary::load(self.store.as_deref()?);
        match loaded {
            Ok(library) => Some(library),
            Err(StoreError::Json(e)) => {
                log::warn!("discarding unreadable design library: {}", e);
                Some(DesignLibrary::new())
            }
            Err(e) => {
                self.detach_store("read design library", e);
                None
            }
        }
    }

    fn write_library(&mut self, library: &DesignLibrary) {
        if let Some(store) = self.store.as_deref_mut() {
            if let Err(e) = library.save(store) {
                self.detach_store("write design library", e);
            }
        }
    }

    fn detach_store(&mut self, action: &str, error: StoreError) {
        log::warn!(
            "failed to {}: {}; continuing without persistence",
            action,
            error
        );
        self.store = None;
    }
}
