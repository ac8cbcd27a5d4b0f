//! Drawing Session Integration Tests
//!
//! These tests drive a [`DrawingSession`] the way a map front end does and
//! check persistence across sessions through a directory-backed store.

use orchard_layout::config::PlantingConfig;
use orchard_layout::geometry::{GeoPoint, LocalFrame};
use orchard_layout::scene::PrimitiveKind;
use orchard_layout::services::{ParcelRegistry, ServiceError, ServiceResult};
use orchard_layout::session::{
    DrawTarget, DrawingSession, Mode, SessionError, SessionEvent, ViewState, DEFAULT_VIEW_CENTER,
};
use orchard_layout::storage::{JsonFileStore, KeyValueStore, MemoryStore};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn at(x: f64, y: f64) -> GeoPoint {
    LocalFrame::new(DEFAULT_VIEW_CENTER).to_geo(x, y)
}

fn plot() -> Vec<GeoPoint> {
    vec![at(-50.0, -50.0), at(50.0, -50.0), at(50.0, 50.0), at(-50.0, 50.0)]
}

fn draw(session: &mut DrawingSession, target: DrawTarget, points: &[GeoPoint]) {
    session.handle(SessionEvent::Start(target)).unwrap();
    for p in points {
        session.handle(SessionEvent::AddPoint(*p)).unwrap();
    }
    session.handle(SessionEvent::Finish).unwrap();
}

/// Registry that always answers with the same ring.
struct FixedRegistry(Vec<GeoPoint>);

impl ParcelRegistry for FixedRegistry {
    fn lookup(&self, _at: GeoPoint) -> ServiceResult<Vec<GeoPoint>> {
        if self.0.is_empty() {
            Err(ServiceError::NotFound)
        } else {
            Ok(self.0.clone())
        }
    }
}

#[test]
fn test_undo_leaves_k_minus_m_points() {
    init();
    for k in 0..6 {
        for m in 0..=k {
            let mut session = DrawingSession::new(PlantingConfig::default());
            session.start(DrawTarget::Boundary).unwrap();
            for i in 0..k {
                session.add_point(at(i as f64, 0.0)).unwrap();
            }
            for _ in 0..m {
                session.handle(SessionEvent::Undo).unwrap();
            }
            assert_eq!(session.pending().len(), k - m);
        }
    }
}

#[test]
fn test_short_boundary_leaves_committed_boundary_unchanged() {
    init();
    let mut session = DrawingSession::new(PlantingConfig::default());
    draw(&mut session, DrawTarget::Boundary, &plot());
    let before = session.boundary().cloned();
    let result = session.result().cloned();

    session.start(DrawTarget::Boundary).unwrap();
    session.add_point(at(0.0, 0.0)).unwrap();
    session.add_point(at(5.0, 0.0)).unwrap();
    assert!(matches!(
        session.finish(),
        Err(SessionError::InvalidBoundary(_))
    ));

    assert_eq!(session.boundary().cloned(), before);
    assert_eq!(session.result().cloned(), result);
}

#[test]
fn test_self_intersecting_boundary_rejected() {
    init();
    let mut session = DrawingSession::new(PlantingConfig::default());
    session.start(DrawTarget::Boundary).unwrap();
    for p in [at(-10.0, -10.0), at(10.0, 10.0), at(10.0, -10.0), at(-10.0, 10.0)] {
        session.add_point(p).unwrap();
    }
    assert!(matches!(
        session.finish(),
        Err(SessionError::InvalidBoundary(_))
    ));
    assert!(session.boundary().is_none());
}

#[test]
fn test_clear_all_resets_everything() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    let mut session = DrawingSession::open(store);

    draw(&mut session, DrawTarget::Boundary, &plot());
    draw(&mut session, DrawTarget::Road, &[at(-60.0, 0.0), at(60.0, 0.0)]);
    draw(&mut session, DrawTarget::Road, &[at(0.0, -60.0), at(0.0, 60.0)]);
    assert_eq!(session.roads().len(), 2);

    session.handle(SessionEvent::ClearAll).unwrap();
    assert!(session.boundary().is_none());
    assert!(session.roads().is_empty());
    assert!(session.result().is_none());
    assert_eq!(session.mode(), Mode::Idle);

    let probe = JsonFileStore::open(dir.path()).unwrap();
    assert_eq!(probe.get("farm-design-cache").unwrap(), None);

    let reopened = DrawingSession::open(JsonFileStore::open(dir.path()).unwrap());
    assert!(reopened.boundary().is_none());
}

#[test]
fn test_restore_reproduces_result() {
    init();
    let dir = tempfile::tempdir().unwrap();

    let (result, config) = {
        let mut session = DrawingSession::open(JsonFileStore::open(dir.path()).unwrap());
        session.set_config(
            PlantingConfig::default()
                .with_spacing(4.5, 3.0)
                .with_row_angle(30.0),
        );
        draw(&mut session, DrawTarget::Boundary, &plot());
        draw(&mut session, DrawTarget::Road, &[at(-60.0, 10.0), at(60.0, -10.0)]);
        session.set_view(ViewState {
            center: at(5.0, 5.0),
            zoom: 17.0,
        });
        (session.result().cloned().unwrap(), session.config().clone())
    };

    let restored = DrawingSession::open(JsonFileStore::open(dir.path()).unwrap());
    assert_eq!(restored.config(), &config);
    assert_eq!(restored.roads().len(), 1);
    assert_eq!(restored.result(), Some(&result));
    assert_eq!(restored.view().zoom, 17.0);
    assert_eq!(restored.scene().count(PrimitiveKind::Tree), result.tree_count);
}

#[test]
fn test_corrupt_snapshot_is_ignored() {
    init();
    let mut store = MemoryStore::new();
    store.set("farm-design-cache", "{\"boundary\": 12}").unwrap();
    store.set("farm-design-config", "{\"rowSpacing\": 6.0}").unwrap();

    let session = DrawingSession::open(store);
    assert!(session.boundary().is_none());
    assert!(session.is_persistent());
    // partial config merges with defaults
    assert_eq!(session.config().row_spacing, 6.0);
    assert_eq!(session.config().tree_spacing, 4.0);
}

#[test]
fn test_parcel_lookup_replaces_boundary() {
    init();
    let mut session = DrawingSession::new(PlantingConfig::default());
    draw(&mut session, DrawTarget::Boundary, &plot());
    draw(&mut session, DrawTarget::Road, &[at(-60.0, 0.0), at(60.0, 0.0)]);

    let err = session.lookup_parcel(&FixedRegistry(Vec::new())).unwrap_err();
    assert_eq!(err, SessionError::External(ServiceError::NotFound));
    assert_eq!(session.roads().len(), 1);

    let parcel = vec![at(-20.0, -20.0), at(20.0, -20.0), at(20.0, 20.0), at(-20.0, 20.0)];
    session.lookup_parcel(&FixedRegistry(parcel)).unwrap();
    assert!(session.roads().is_empty());
    assert!((session.result().unwrap().area_m2 - 1600.0).abs() < 2.0);
    assert!(!session.is_parcel_lookup_pending());
}

#[test]
fn test_saved_designs_survive_reopen() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let saved = {
        let mut session = DrawingSession::open(JsonFileStore::open(dir.path()).unwrap());
        draw(&mut session, DrawTarget::Boundary, &plot());
        session.save_design("north block").unwrap()
    };

    let mut session = DrawingSession::open(JsonFileStore::open(dir.path()).unwrap());
    session.clear_all();
    let designs = session.saved_designs();
    assert_eq!(designs.len(), 1);
    assert_eq!(designs[0], saved);

    session.load_design(&designs[0]).unwrap();
    assert_eq!(session.result().unwrap().tree_count, saved.result.tree_count);
}
