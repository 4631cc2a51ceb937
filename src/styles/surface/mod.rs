//! Molecular surfaces.
//!
//! Triangulation is delegated to a [`SurfaceExtractor`]. Extracted meshes
//! are cached per part, keyed by the part's selection, the surface
//! parameters and a summary of the atom coordinates, so color and filter
//! changes recolor or re-index the cached mesh instead of extracting again.
//! Extraction runs in the prepare step: on a [`SurfaceWorker`] thread when
//! one is configured, inline otherwise.

mod worker;

use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, PoisonError};

use glam::Vec3;
use log::{debug, trace};
use rustc_hash::{FxHashMap, FxHashSet};

use self::worker::ExtractJob;
pub use self::worker::SurfaceWorker;
use crate::error::AdapterError;
use crate::params::{Channel, ChannelSet, ParamSet};
use crate::repr::{
    BuildContext, DataUnit, PrepareContext, SourceAdapter, UnitData,
    UpdateContext, UpdateOutcome,
};
use crate::scene::{
    AttributeData, AttributeMap, BufferKind, BufferSpec, COLOR, INDEX, NORMAL,
    POSITION,
};
use crate::schedule::{completion, Prepare};
use crate::source::{AtomRequest, AtomView, ColorParams, RadiusParams, RadiusType};
use crate::util::hash::{fingerprint_hasher, hash_params, hash_positions_summary};

/// Parameters that change the extracted geometry.
pub const SURFACE_PARAMS: &[&str] = &[
    "surfaceType",
    "probeRadius",
    "smooth",
    "scaleFactor",
    "cutoff",
    "background",
    "lowResolution",
];

const FILTER_SELE: &str = "filterSele";

// ---------------------------------------------------------------------------
// Extraction contract
// ---------------------------------------------------------------------------

/// Geometry settings handed to the extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceParams {
    /// `vws`, `sas`, `ms` or `ses`.
    pub surface_type: String,
    /// Solvent probe radius in Å.
    pub probe_radius: f32,
    /// Smoothing passes.
    pub smooth: u32,
    /// Grid resolution factor.
    pub scale_factor: f32,
    /// Iso-level cutoff.
    pub cutoff: f32,
    /// Include background atoms.
    pub background: bool,
    /// Coarse grid.
    pub low_resolution: bool,
}

impl SurfaceParams {
    /// Read from a parameter snapshot, with the surface table's defaults.
    #[must_use]
    pub fn from_params(params: &ParamSet) -> Self {
        Self {
            surface_type: params.text("surfaceType").unwrap_or("ms").to_owned(),
            probe_radius: params.f64("probeRadius").unwrap_or(1.4) as f32,
            smooth: params.i64("smooth").unwrap_or(2).max(0) as u32,
            scale_factor: params.f64("scaleFactor").unwrap_or(2.0) as f32,
            cutoff: params.f64("cutoff").unwrap_or(0.0) as f32,
            background: params.flag("background"),
            low_resolution: params.flag("lowResolution"),
        }
    }
}

/// Atoms to wrap in a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceInput {
    /// Atom centers.
    pub positions: Vec<Vec3>,
    /// Van der Waals radii, one per atom.
    pub radii: Vec<f32>,
    /// Geometry settings.
    pub params: SurfaceParams,
}

/// A triangulated surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceMesh {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Vertex normals.
    pub normals: Vec<Vec3>,
    /// Triangle vertex indices, three per triangle.
    pub indices: Vec<u32>,
    /// Per vertex, the index into [`SurfaceInput::positions`] of the
    /// closest atom.
    pub atom_index: Vec<u32>,
}

/// Surface triangulation algorithm.
pub trait SurfaceExtractor: Send + Sync {
    /// Triangulate the surface around `input`.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] if no surface can be built.
    fn extract(&self, input: &SurfaceInput) -> Result<SurfaceMesh, AdapterError>;
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

pub(crate) type SurfaceCache = Arc<Mutex<FxHashMap<u64, Arc<SurfaceMesh>>>>;

pub(crate) fn new_cache() -> SurfaceCache {
    Arc::new(Mutex::new(FxHashMap::default()))
}

pub(crate) fn insert_mesh(cache: &SurfaceCache, key: u64, mesh: SurfaceMesh) {
    let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
    drop(cache.insert(key, Arc::new(mesh)));
}

fn cached(cache: &SurfaceCache, key: u64) -> Option<Arc<SurfaceMesh>> {
    let cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
    cache.get(&key).cloned()
}

/// Atoms and radii of a view, as the extractor sees them.
fn surface_input<V: AtomView>(view: &V, params: &ParamSet) -> SurfaceInput {
    let request = AtomRequest {
        position: true,
        radius: Some(RadiusParams {
            radius: RadiusType::Named("vdw".to_owned()),
            scale: 1.0,
        }),
        ..AtomRequest::default()
    };
    let data = view.atom_data(&request);
    SurfaceInput {
        positions: data.position,
        radii: data.radius,
        params: SurfaceParams::from_params(params),
    }
}

fn surface_key(selection: &str, params: &ParamSet, positions: &[Vec3]) -> u64 {
    let mut hasher = fingerprint_hasher();
    selection.hash(&mut hasher);
    hash_params(params, SURFACE_PARAMS, &mut hasher);
    hash_positions_summary(positions, &mut hasher);
    hasher.finish()
}

fn view_key<V: AtomView>(view: &V, params: &ParamSet) -> u64 {
    let positions = view
        .atom_data(&AtomRequest {
            position: true,
            ..AtomRequest::default()
        })
        .position;
    surface_key(view.selection(), params, &positions)
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// Adapter for the `surface` style.
pub struct SurfaceAdapter {
    extractor: Arc<dyn SurfaceExtractor>,
    worker: Option<SurfaceWorker>,
    cache: SurfaceCache,
    /// Cache key per part index, as computed by the last full prepare.
    part_keys: FxHashMap<usize, u64>,
}

impl SurfaceAdapter {
    /// Adapter extracting inline, on the calling thread.
    #[must_use]
    pub fn new(extractor: Arc<dyn SurfaceExtractor>) -> Self {
        Self {
            extractor,
            worker: None,
            cache: new_cache(),
            part_keys: FxHashMap::default(),
        }
    }

    /// Adapter extracting on `worker`.
    #[must_use]
    pub fn with_worker(extractor: Arc<dyn SurfaceExtractor>, worker: SurfaceWorker) -> Self {
        Self {
            worker: Some(worker),
            ..Self::new(extractor)
        }
    }

    /// Number of cached surfaces.
    #[must_use]
    pub fn cached_surfaces(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Per-vertex colors, taken from each vertex's closest atom.
    fn vertex_colors<V: AtomView>(mesh: &SurfaceMesh, view: &V, params: &ParamSet) -> Vec<Vec3> {
        let request = AtomRequest {
            color: Some(ColorParams::from_params(params)),
            ..AtomRequest::default()
        };
        let colors = view.atom_data(&request).color;
        mesh.atom_index
            .iter()
            .map(|&a| colors.get(a as usize).copied().unwrap_or(Vec3::ONE))
            .collect()
    }

    /// Triangle indices, restricted to triangles whose vertices all belong
    /// to atoms matching `filterSele` when it is set.
    fn triangle_indices<V: AtomView>(mesh: &SurfaceMesh, view: &V, params: &ParamSet) -> Vec<u32> {
        let filter = params.text(FILTER_SELE).unwrap_or("");
        if filter.is_empty() {
            return mesh.indices.clone();
        }
        let index_only = AtomRequest {
            index: true,
            ..AtomRequest::default()
        };
        let keep: FxHashSet<u32> = view
            .restrict(filter)
            .atom_data(&index_only)
            .index
            .into_iter()
            .collect();
        let source_index = view.atom_data(&index_only).index;
        let vertex_kept = |v: u32| {
            mesh.atom_index
                .get(v as usize)
                .and_then(|&a| source_index.get(a as usize))
                .is_some_and(|i| keep.contains(i))
        };
        mesh.indices
            .chunks_exact(3)
            .filter(|tri| tri.iter().all(|&v| vertex_kept(v)))
            .flatten()
            .copied()
            .collect()
    }
}

impl<V: AtomView> SourceAdapter<V> for SurfaceAdapter {
    fn prepare(&mut self, ctx: &PrepareContext<'_, V>) -> Result<Prepare, AdapterError> {
        if ctx.update.is_some() {
            return Ok(Prepare::Ready);
        }
        let mut wanted = FxHashSet::default();
        let mut missing = Vec::new();
        self.part_keys.clear();
        for part in ctx.parts {
            let input = surface_input(&part.view, ctx.params);
            let key = surface_key(part.view.selection(), ctx.params, &input.positions);
            drop(self.part_keys.insert(part.index, key));
            if wanted.insert(key) && cached(&self.cache, key).is_none() {
                missing.push((key, input));
            }
        }
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|key, _| wanted.contains(key));
        if missing.is_empty() {
            trace!("all {} surfaces cached", wanted.len());
            return Ok(Prepare::Ready);
        }

        debug!("extracting {} of {} surfaces", missing.len(), wanted.len());
        let Some(worker) = &self.worker else {
            for (key, input) in missing {
                let mesh = self.extractor.extract(&input)?;
                insert_mesh(&self.cache, key, mesh);
            }
            return Ok(Prepare::Ready);
        };
        let (done, pending) = completion();
        worker.submit(ExtractJob {
            inputs: missing,
            extractor: Arc::clone(&self.extractor),
            cache: Arc::clone(&self.cache),
            done,
        });
        Ok(Prepare::Pending(Box::new(pending)))
    }

    fn create_data(
        &mut self,
        ctx: &mut BuildContext<'_>,
        view: &V,
        part: usize,
    ) -> Result<Option<UnitData>, AdapterError> {
        if view.is_empty() {
            return Ok(None);
        }
        // Atoms may have moved since prepare; the follow-up position update
        // then re-extracts.
        let key = self
            .part_keys
            .get(&part)
            .copied()
            .unwrap_or_else(|| view_key(view, ctx.params()));
        let mesh = cached(&self.cache, key).ok_or_else(|| {
            AdapterError::Create(format!("no surface extracted for part {part}"))
        })?;
        if mesh.indices.is_empty() {
            return Ok(None);
        }
        let spec = BufferSpec::new(BufferKind::Mesh, false)
            .attribute(POSITION, AttributeData::Vec3(mesh.positions.clone()))
            .attribute(NORMAL, AttributeData::Vec3(mesh.normals.clone()))
            .attribute(
                COLOR,
                AttributeData::Vec3(Self::vertex_colors(&mesh, view, ctx.params())),
            )
            .attribute(
                INDEX,
                AttributeData::Index(Self::triangle_indices(&mesh, view, ctx.params())),
            );
        Ok(Some(UnitData::new(vec![ctx.create_buffer(spec)?])))
    }

    fn update_data(
        &mut self,
        ctx: &UpdateContext<'_>,
        channels: ChannelSet,
        unit: &mut DataUnit<V>,
    ) -> Result<UpdateOutcome, AdapterError> {
        if channels.contains(Channel::Position) {
            return Ok(UpdateOutcome::NeedsRebuild);
        }
        let Some(mesh) = cached(&self.cache, view_key(&unit.view, ctx.params())) else {
            return Ok(UpdateOutcome::NeedsRebuild);
        };
        let mut attributes = AttributeMap::default();
        if channels.contains(Channel::Color) {
            let colors = Self::vertex_colors(&mesh, &unit.view, ctx.params());
            drop(attributes.insert(COLOR, AttributeData::Vec3(colors)));
        }
        if channels.contains(Channel::Index) {
            let indices = Self::triangle_indices(&mesh, &unit.view, ctx.params());
            drop(attributes.insert(INDEX, AttributeData::Index(indices)));
        }
        if !attributes.is_empty() {
            unit.set_attributes(&attributes);
        }
        Ok(UpdateOutcome::Updated)
    }

    fn dispose(&mut self) {
        self.worker = None;
        self.part_keys.clear();
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl std::fmt::Debug for SurfaceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceAdapter")
            .field("worker", &self.worker)
            .field("cached", &self.cached_surfaces())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::options::Options;
    use crate::params::styles;
    use crate::repr::{ReprState, ReprStatus, Representation};
    use crate::test_support::{
        init_logging, RecordingScene, SphereSurfaces, TestAtom, TestSource,
    };

    fn surface(
        source: TestSource,
        adapter: SurfaceAdapter,
    ) -> Representation<TestSource> {
        init_logging();
        Representation::new(
            "surface",
            styles::surface(),
            Box::new(adapter),
            Arc::new(source),
            &ParamSet::new(),
            Arc::new(Options::default()),
        )
    }

    fn two_chains() -> TestSource {
        TestSource::from_atoms(
            "AAACC"
                .chars()
                .enumerate()
                .map(|(i, chain)| TestAtom {
                    chain,
                    position: Vec3::new(i as f32 * 4.0, 0.0, 0.0),
                })
                .collect(),
        )
    }

    fn index_len(scene: &RecordingScene, repr: &Representation<TestSource>) -> usize {
        let id = repr.data_units()[0].buffer_ids()[0];
        scene.spec(id).unwrap().attributes[INDEX].len()
    }

    #[test]
    fn inline_extraction_builds_a_mesh() {
        let mut scene = RecordingScene::new();
        let extractor = Arc::new(SphereSurfaces::default());
        let mut repr = surface(TestSource::new(2), SurfaceAdapter::new(extractor.clone()));
        repr.build(&mut scene, None).unwrap();

        assert_eq!(extractor.calls(), 1);
        let spec = scene.spec(repr.data_units()[0].buffer_ids()[0]).unwrap();
        assert_eq!(spec.kind, BufferKind::Mesh);
        assert_eq!(spec.attributes[POSITION].len(), 12);
        assert_eq!(spec.attributes[NORMAL].len(), 12);
        assert_eq!(spec.attributes[INDEX].len(), 2 * 8 * 3);
        let grey = Vec3::splat(f32::from(0xDD_u8) / 255.0);
        assert_eq!(spec.attributes[COLOR], AttributeData::Vec3(vec![grey; 12]));
        assert_eq!(spec.params.get("opaqueBack"), Some(&true.into()));
        repr.dispose(&mut scene);
    }

    #[test]
    fn color_changes_reuse_the_cached_mesh() {
        let mut scene = RecordingScene::new();
        let extractor = Arc::new(SphereSurfaces::default());
        let mut repr = surface(TestSource::new(3), SurfaceAdapter::new(extractor.clone()));
        repr.build(&mut scene, None).unwrap();
        let ids = repr.data_units()[0].buffer_ids();

        repr.set_parameters(&mut scene, &ParamSet::new().with("color", "chainid"))
            .unwrap();
        assert_eq!(repr.data_units()[0].buffer_ids(), ids);
        let (_, names) = scene.log.borrow().attributes.last().cloned().unwrap();
        assert_eq!(names, vec![COLOR]);

        repr.build(&mut scene, None).unwrap();
        assert_eq!(extractor.calls(), 1);
        repr.dispose(&mut scene);
    }

    #[test]
    fn surface_parameters_force_extraction() {
        let mut scene = RecordingScene::new();
        let extractor = Arc::new(SphereSurfaces::default());
        let mut repr = surface(TestSource::new(3), SurfaceAdapter::new(extractor.clone()));
        repr.build(&mut scene, None).unwrap();

        repr.set_parameters(&mut scene, &ParamSet::new().with("probeRadius", 2.0))
            .unwrap();
        assert_eq!(extractor.calls(), 2);
        assert_eq!(repr.data_units().len(), 1);
        repr.dispose(&mut scene);
    }

    #[test]
    fn filter_sele_drops_triangles() {
        let mut scene = RecordingScene::new();
        let extractor = Arc::new(SphereSurfaces::default());
        let mut repr = surface(two_chains(), SurfaceAdapter::new(extractor.clone()));
        repr.build(&mut scene, None).unwrap();
        assert_eq!(index_len(&scene, &repr), 5 * 24);

        repr.set_parameters(&mut scene, &ParamSet::new().with("filterSele", ":C"))
            .unwrap();
        let written = scene.log.borrow().attributes.last().cloned().unwrap();
        assert_eq!(written.1, vec![INDEX]);
        assert_eq!(extractor.calls(), 1);

        // A rebuild applies the filter from the start.
        repr.set_parameters(&mut scene, &ParamSet::new().with("opacity", 0.5))
            .unwrap();
        repr.build(&mut scene, None).unwrap();
        assert_eq!(index_len(&scene, &repr), 2 * 24);
        repr.dispose(&mut scene);
    }

    #[test]
    fn moved_atoms_escalate_to_rebuild() {
        let mut scene = RecordingScene::new();
        let extractor = Arc::new(SphereSurfaces::default());
        let mut repr = surface(TestSource::new(3), SurfaceAdapter::new(extractor.clone()));
        repr.build(&mut scene, None).unwrap();
        let ids = repr.data_units()[0].buffer_ids();

        repr.source().translate(Vec3::Z);
        repr.update(&mut scene, ChannelSet::EMPTY.with(Channel::Position))
            .unwrap();
        assert_eq!(extractor.calls(), 2);
        assert_ne!(repr.data_units()[0].buffer_ids(), ids);
        assert_eq!(repr.task_count(), 0);
        repr.dispose(&mut scene);
    }

    #[test]
    fn extractor_failure_is_reported() {
        let mut scene = RecordingScene::new();
        let adapter = SurfaceAdapter::new(Arc::new(SphereSurfaces::failing()));
        let mut repr = surface(TestSource::new(3), adapter);
        let err = repr.build(&mut scene, None).unwrap_err();
        assert!(matches!(
            err,
            crate::ReprError::Adapter(AdapterError::Prepare(_))
        ));
        assert!(repr.data_units().is_empty());
        assert!(!repr.is_busy());
        repr.dispose(&mut scene);
    }

    fn poll_until_idle(
        repr: &mut Representation<TestSource>,
        scene: &mut RecordingScene,
    ) -> ReprStatus {
        for _ in 0..500 {
            let status = repr.poll(scene).unwrap();
            if status != ReprStatus::Busy {
                return status;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        ReprStatus::Busy
    }

    #[test]
    fn worker_extraction_completes_through_poll() {
        let mut scene = RecordingScene::new();
        let extractor = Arc::new(SphereSurfaces::default());
        let worker = SurfaceWorker::new("surface-test").unwrap();
        let adapter = SurfaceAdapter::with_worker(extractor.clone(), worker);
        let mut repr = surface(TestSource::with_three_part_assembly(), adapter);
        repr.build(&mut scene, None).unwrap();
        assert_eq!(repr.state(), ReprState::Preparing);
        assert!(scene.attached.is_empty());

        assert_eq!(poll_until_idle(&mut repr, &mut scene), ReprStatus::Idle);
        assert_eq!(repr.data_units().len(), 2);
        assert_eq!(extractor.calls(), 2);
        assert_eq!(scene.attached.len(), 2);
        repr.dispose(&mut scene);
    }

    #[test]
    fn atoms_moving_during_extraction_still_build() {
        let mut scene = RecordingScene::new();
        let extractor = Arc::new(SphereSurfaces::default());
        let worker = SurfaceWorker::new("surface-test").unwrap();
        let adapter = SurfaceAdapter::with_worker(extractor.clone(), worker);
        let mut repr = surface(TestSource::new(3), adapter);
        repr.build(&mut scene, None).unwrap();
        assert_eq!(repr.state(), ReprState::Preparing);

        repr.source().translate(Vec3::Z);
        repr.update(&mut scene, ChannelSet::EMPTY.with(Channel::Position))
            .unwrap();
        assert_eq!(poll_until_idle(&mut repr, &mut scene), ReprStatus::Idle);

        assert_eq!(repr.data_units().len(), 1);
        assert_eq!(extractor.calls(), 2);
        assert_eq!(scene.attached.len(), 1);
        let spec = scene.spec(repr.data_units()[0].buffer_ids()[0]).unwrap();
        let mean_z = match &spec.attributes[POSITION] {
            AttributeData::Vec3(p) => p.iter().map(|v| v.z).sum::<f32>() / p.len() as f32,
            _ => f32::NAN,
        };
        assert!((mean_z - 1.0).abs() < 1e-4, "mesh built from moved atoms: {mean_z}");
        repr.dispose(&mut scene);
    }

    #[test]
    fn dispose_while_extracting_attaches_nothing() {
        let mut scene = RecordingScene::new();
        let extractor = Arc::new(SphereSurfaces::default());
        let worker = SurfaceWorker::new("surface-test").unwrap();
        let adapter = SurfaceAdapter::with_worker(extractor, worker);
        let mut repr = surface(TestSource::new(4), adapter);
        repr.build(&mut scene, None).unwrap();
        repr.dispose(&mut scene);

        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(repr.poll(&mut scene).unwrap(), ReprStatus::Disposed);
        assert_eq!(scene.created(), 0);
        assert!(scene.attached.is_empty());
    }
}
