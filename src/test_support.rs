//! In-memory scene, source and adapter doubles shared by unit tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use glam::{Mat4, Vec3};

use crate::error::AdapterError;
use crate::params::{ChannelSet, ParamSet};
use crate::repr::{
    BuildContext, DataUnit, PrepareContext, SourceAdapter, UnitData,
    UpdateContext, UpdateOutcome,
};
use crate::scene::{
    AttributeData, AttributeMap, BufferId, BufferKind, BufferSpec,
    GeometryBuffer, SceneGraph, COLOR, POSITION, RADIUS,
};
use crate::schedule::{completion, Completion, Prepare};
use crate::source::{
    Assembly, AssemblyDict, AssemblyPart, AtomData, AtomRequest, AtomView,
    BondData, DataView, RadiusType, Source,
};
use crate::styles::surface::{
    SurfaceExtractor, SurfaceInput, SurfaceMesh, SurfaceParams,
};

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ---------------------------------------------------------------------------
// RecordingScene
// ---------------------------------------------------------------------------

/// Everything that happened to buffers created by a [`RecordingScene`].
#[derive(Debug, Default)]
pub(crate) struct BufferLog {
    pub specs: BTreeMap<BufferId, BufferSpec>,
    pub attributes: Vec<(BufferId, Vec<&'static str>)>,
    pub parameters: Vec<(BufferId, ParamSet)>,
    pub visibility: BTreeMap<BufferId, bool>,
    pub disposed: Vec<BufferId>,
}

struct TestBuffer {
    id: BufferId,
    log: Rc<RefCell<BufferLog>>,
}

impl GeometryBuffer for TestBuffer {
    fn id(&self) -> BufferId {
        self.id
    }

    fn set_attributes(&mut self, attributes: &AttributeMap) {
        let mut names: Vec<_> = attributes.keys().copied().collect();
        names.sort_unstable();
        self.log.borrow_mut().attributes.push((self.id, names));
    }

    fn set_parameters(&mut self, params: &ParamSet) {
        self.log.borrow_mut().parameters.push((self.id, params.clone()));
    }

    fn set_visibility(&mut self, visible: bool) {
        drop(self.log.borrow_mut().visibility.insert(self.id, visible));
    }

    fn dispose(&mut self) {
        self.log.borrow_mut().disposed.push(self.id);
    }
}

/// Scene graph that records every call.
#[derive(Default)]
pub(crate) struct RecordingScene {
    next_id: u64,
    /// Attached buffers with their instance counts.
    pub attached: BTreeMap<BufferId, Option<usize>>,
    pub removed: Vec<BufferId>,
    pub renders: usize,
    /// Reject the next `n` buffer creations.
    pub fail_creates: usize,
    pub log: Rc<RefCell<BufferLog>>,
}

impl RecordingScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attached_ids(&self) -> Vec<BufferId> {
        self.attached.keys().copied().collect()
    }

    pub fn created(&self) -> usize {
        self.next_id as usize
    }

    pub fn disposed(&self) -> Vec<BufferId> {
        self.log.borrow().disposed.clone()
    }

    pub fn spec(&self, id: BufferId) -> Option<BufferSpec> {
        self.log.borrow().specs.get(&id).cloned()
    }
}

impl SceneGraph for RecordingScene {
    fn create_buffer(
        &mut self,
        spec: BufferSpec,
    ) -> Result<Box<dyn GeometryBuffer>, AdapterError> {
        if self.fail_creates > 0 {
            self.fail_creates -= 1;
            return Err(AdapterError::Backend("rejected".into()));
        }
        self.next_id += 1;
        let id = BufferId(self.next_id);
        drop(self.log.borrow_mut().specs.insert(id, spec));
        Ok(Box::new(TestBuffer {
            id,
            log: Rc::clone(&self.log),
        }))
    }

    fn add(&mut self, buffer: &dyn GeometryBuffer, instances: Option<&[Mat4]>) {
        let previous = self.attached.insert(buffer.id(), instances.map(<[Mat4]>::len));
        assert!(previous.is_none(), "buffer {:?} attached twice", buffer.id());
    }

    fn remove(&mut self, id: BufferId) {
        assert!(
            self.attached.remove(&id).is_some(),
            "removing unattached buffer {id:?}"
        );
        self.removed.push(id);
    }

    fn request_render(&mut self) {
        self.renders += 1;
    }
}

// ---------------------------------------------------------------------------
// TestSource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TestAtom {
    pub chain: char,
    pub position: Vec3,
}

/// Atoms tagged by chain. Selections: `""`/`"all"` everything, `":X"`
/// chain X; anything else matches nothing.
#[derive(Debug)]
pub(crate) struct TestSource {
    atoms: Rc<RefCell<Vec<TestAtom>>>,
    assemblies: AssemblyDict,
    default_assembly: String,
}

impl TestSource {
    /// `n` atoms in chain A along the x axis.
    pub fn new(n: usize) -> Self {
        Self::from_atoms(
            (0..n)
                .map(|i| TestAtom {
                    chain: 'A',
                    position: Vec3::new(i as f32, 0.0, 0.0),
                })
                .collect(),
        )
    }

    pub fn from_atoms(atoms: Vec<TestAtom>) -> Self {
        Self {
            atoms: Rc::new(RefCell::new(atoms)),
            assemblies: AssemblyDict::new(),
            default_assembly: String::new(),
        }
    }

    /// Chains A (4 atoms) and C (3 atoms); assembly `BU1` has parts
    /// `:A`, `:B` (empty) and `:C` (two instances), and is the default.
    pub fn with_three_part_assembly() -> Self {
        let atoms = (0..4)
            .map(|i| ('A', i))
            .chain((0..3).map(|i| ('C', i)))
            .map(|(chain, i)| TestAtom {
                chain,
                position: Vec3::new(i as f32, if chain == 'A' { 0.0 } else { 5.0 }, 0.0),
            })
            .collect();
        let mut source = Self::from_atoms(atoms);
        let assembly = Assembly::default()
            .with_part(AssemblyPart::new(":A", vec![Mat4::IDENTITY]))
            .with_part(AssemblyPart::new(":B", vec![Mat4::IDENTITY]))
            .with_part(AssemblyPart::new(
                ":C",
                vec![Mat4::IDENTITY, Mat4::from_translation(Vec3::X * 10.0)],
            ));
        drop(source.assemblies.insert("BU1".into(), assembly));
        source.default_assembly = "BU1".into();
        source
    }

    /// Move every atom by `offset`. Existing views see the new coordinates.
    pub fn translate(&self, offset: Vec3) {
        for atom in self.atoms.borrow_mut().iter_mut() {
            atom.position += offset;
        }
    }
}

fn matches(selection: &str, atom: &TestAtom) -> bool {
    match selection {
        "" | "all" => true,
        s => s
            .strip_prefix(':')
            .and_then(|c| c.chars().next())
            .is_some_and(|c| c == atom.chain),
    }
}

impl Source for TestSource {
    type View = TestView;

    fn view(&self, selection: &str) -> TestView {
        let indices = self
            .atoms
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, a)| matches(selection, a))
            .map(|(i, _)| i as u32)
            .collect();
        TestView {
            selection: selection.to_owned(),
            atoms: Rc::clone(&self.atoms),
            indices: Rc::new(indices),
        }
    }

    fn assemblies(&self) -> &AssemblyDict {
        &self.assemblies
    }

    fn default_assembly(&self) -> &str {
        &self.default_assembly
    }
}

/// Live view of the atoms matching a selection.
#[derive(Debug, Clone)]
pub(crate) struct TestView {
    selection: String,
    atoms: Rc<RefCell<Vec<TestAtom>>>,
    indices: Rc<Vec<u32>>,
}

impl TestView {
    fn each(&self, mut f: impl FnMut(u32, &TestAtom)) {
        let atoms = self.atoms.borrow();
        for &i in self.indices.iter() {
            f(i, &atoms[i as usize]);
        }
    }
}

impl DataView for TestView {
    fn element_count(&self) -> usize {
        self.indices.len()
    }

    fn selection(&self) -> &str {
        &self.selection
    }

    fn restrict(&self, selection: &str) -> Self {
        let mut indices = Vec::new();
        self.each(|i, atom| {
            if matches(selection, atom) {
                indices.push(i);
            }
        });
        Self {
            selection: format!("({}) and ({selection})", self.selection),
            atoms: Rc::clone(&self.atoms),
            indices: Rc::new(indices),
        }
    }
}

fn chain_color(chain: char) -> Vec3 {
    match chain {
        'A' => Vec3::X,
        'B' => Vec3::Y,
        _ => Vec3::Z,
    }
}

fn unpack(color: u32) -> Vec3 {
    Vec3::new(
        ((color >> 16) & 0xFF) as f32 / 255.0,
        ((color >> 8) & 0xFF) as f32 / 255.0,
        (color & 0xFF) as f32 / 255.0,
    )
}

impl AtomView for TestView {
    fn atom_data(&self, request: &AtomRequest) -> AtomData {
        let mut data = AtomData::default();
        self.each(|index, atom| {
            if request.position {
                data.position.push(atom.position);
            }
            if let Some(color) = &request.color {
                data.color.push(if color.scheme == "uniform" {
                    unpack(color.value)
                } else {
                    chain_color(atom.chain)
                });
            }
            if let Some(radius) = &request.radius {
                let base = match radius.radius {
                    RadiusType::Size(s) => s,
                    RadiusType::Named(_) => 1.5,
                };
                data.radius.push(base * radius.scale);
            }
            if request.index {
                data.index.push(index);
            }
        });
        data
    }

    /// Consecutive atoms of the same chain are bonded.
    fn bond_data(&self, request: &AtomRequest) -> BondData {
        let atoms = self.atom_data(&AtomRequest {
            position: true,
            ..request.clone()
        });
        let chains: Vec<char> = {
            let all = self.atoms.borrow();
            self.indices.iter().map(|&i| all[i as usize].chain).collect()
        };
        let mut bonds = BondData::default();
        for i in 1..chains.len() {
            if chains[i - 1] != chains[i] {
                continue;
            }
            if request.position {
                bonds.position1.push(atoms.position[i - 1]);
                bonds.position2.push(atoms.position[i]);
            }
            if request.color.is_some() {
                bonds.color1.push(atoms.color[i - 1]);
                bonds.color2.push(atoms.color[i]);
            }
            if request.radius.is_some() {
                bonds.radius.push(atoms.radius[i - 1].min(atoms.radius[i]));
            }
        }
        bonds
    }
}

// ---------------------------------------------------------------------------
// ScriptedAdapter
// ---------------------------------------------------------------------------

/// Calls observed by a [`ScriptedAdapter`], plus the knobs that script it.
#[derive(Default)]
pub(crate) struct AdapterLog {
    pub prepares: usize,
    pub creates: Vec<usize>,
    pub updates: Vec<ChannelSet>,
    pub disposed: usize,
    /// Snapshot seen by the last create.
    pub last_params: Option<ParamSet>,
    /// Make `prepare` return a pending task.
    pub defer_prepare: bool,
    /// Completion handles of deferred prepares, oldest first.
    pub completions: Vec<Completion<()>>,
    /// Fail `create_data` for this part index.
    pub fail_part: Option<usize>,
    /// Fail `update_data`.
    pub fail_update: bool,
    /// Answer updates with `NeedsRebuild`.
    pub escalate: bool,
}

impl AdapterLog {
    /// Finish the oldest deferred prepare.
    pub fn complete_prepare(&mut self, result: Result<(), AdapterError>) {
        if !self.completions.is_empty() {
            self.completions.remove(0).complete(result);
        }
    }
}

/// Adapter producing one sphere buffer per part.
pub(crate) struct ScriptedAdapter {
    pub log: Rc<RefCell<AdapterLog>>,
}

impl ScriptedAdapter {
    pub fn new() -> (Box<Self>, Rc<RefCell<AdapterLog>>) {
        let log = Rc::new(RefCell::new(AdapterLog::default()));
        (
            Box::new(Self {
                log: Rc::clone(&log),
            }),
            log,
        )
    }
}

impl SourceAdapter<TestView> for ScriptedAdapter {
    fn prepare(
        &mut self,
        _ctx: &PrepareContext<'_, TestView>,
    ) -> Result<Prepare, AdapterError> {
        let mut log = self.log.borrow_mut();
        log.prepares += 1;
        if !log.defer_prepare {
            return Ok(Prepare::Ready);
        }
        let (done, pending) = completion();
        log.completions.push(done);
        Ok(Prepare::Pending(Box::new(pending)))
    }

    fn create_data(
        &mut self,
        ctx: &mut BuildContext<'_>,
        view: &TestView,
        part: usize,
    ) -> Result<Option<UnitData>, AdapterError> {
        {
            let mut log = self.log.borrow_mut();
            log.creates.push(part);
            log.last_params = Some(ctx.params().clone());
            if log.fail_part == Some(part) {
                return Err(AdapterError::Create(format!("part {part}")));
            }
        }
        let data = view.atom_data(&AtomRequest::all(ctx.params()));
        let spec = BufferSpec::new(BufferKind::Sphere, ctx.impostor())
            .attribute(POSITION, AttributeData::Vec3(data.position));
        Ok(Some(UnitData::new(vec![ctx.create_buffer(spec)?])))
    }

    fn update_data(
        &mut self,
        ctx: &UpdateContext<'_>,
        channels: ChannelSet,
        unit: &mut DataUnit<TestView>,
    ) -> Result<UpdateOutcome, AdapterError> {
        let mut log = self.log.borrow_mut();
        log.updates.push(channels);
        if log.fail_update {
            return Err(AdapterError::Update("scripted".into()));
        }
        if log.escalate {
            return Ok(UpdateOutcome::NeedsRebuild);
        }
        let data = unit.view.atom_data(&AtomRequest::channels(channels, ctx.params()));
        let mut attributes = AttributeMap::default();
        if !data.radius.is_empty() {
            drop(attributes.insert(RADIUS, AttributeData::Scalar(data.radius)));
        }
        if !data.color.is_empty() {
            drop(attributes.insert(COLOR, AttributeData::Vec3(data.color)));
        }
        unit.set_attributes(&attributes);
        Ok(UpdateOutcome::Updated)
    }

    fn dispose(&mut self) {
        self.log.borrow_mut().disposed += 1;
    }
}

// ---------------------------------------------------------------------------
// SphereSurfaces
// ---------------------------------------------------------------------------

/// Extractor that wraps each atom in an octahedron.
#[derive(Debug, Default)]
pub(crate) struct SphereSurfaces {
    calls: AtomicUsize,
    fail: bool,
}

impl SphereSurfaces {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Surfaces extracted so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

const OCTAHEDRON: [[u32; 3]; 8] = [
    [0, 2, 4],
    [2, 1, 4],
    [1, 3, 4],
    [3, 0, 4],
    [2, 0, 5],
    [1, 2, 5],
    [3, 1, 5],
    [0, 3, 5],
];

impl SurfaceExtractor for SphereSurfaces {
    fn extract(&self, input: &SurfaceInput) -> Result<SurfaceMesh, AdapterError> {
        if self.fail {
            return Err(AdapterError::Prepare("no surface".into()));
        }
        drop(self.calls.fetch_add(1, Ordering::SeqCst));
        let axes = [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z];
        let mut mesh = SurfaceMesh::default();
        for (atom, (center, radius)) in
            input.positions.iter().zip(&input.radii).enumerate()
        {
            let base = mesh.positions.len() as u32;
            for axis in axes {
                mesh.positions.push(*center + axis * (*radius + input.params.probe_radius));
                mesh.normals.push(axis);
                mesh.atom_index.push(atom as u32);
            }
            mesh.indices
                .extend(OCTAHEDRON.iter().flatten().map(|v| base + v));
        }
        Ok(mesh)
    }
}

/// `n` atoms spaced along x, with default surface settings.
pub(crate) fn surface_input(n: usize) -> SurfaceInput {
    SurfaceInput {
        positions: (0..n).map(|i| Vec3::X * (i as f32 * 4.0)).collect(),
        radii: vec![1.5; n],
        params: SurfaceParams::from_params(&ParamSet::new()),
    }
}
