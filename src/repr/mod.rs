//! The representation state machine.
//!
//! A [`Representation`] owns the geometry it builds from a [`Source`] and
//! keeps it consistent with a live parameter set:
//!
//! ```text
//! Idle -> Preparing -> Computing -> Attaching -> Idle
//!   \__________\____________\___________\______-> Disposed
//! ```
//!
//! Builds go through a single-slot coalescing [`BuildQueue`], so bursts of
//! parameter changes collapse into one pending request. An adapter's
//! prepare step may suspend a build; the host resumes it by calling
//! [`Representation::poll`] once per frame.

mod adapter;
mod data_unit;
pub mod fanout;
mod meta;

use std::sync::Arc;
use std::task::Poll;

pub use adapter::{
    BuildContext, PrepareContext, SourceAdapter, UpdateContext, UpdateOutcome,
};
pub use data_unit::{DataUnit, UnitData};
pub use fanout::PartView;
use log::{debug, error, trace, warn};
use web_time::Instant;

use crate::error::{AdapterError, ReprError};
use crate::options::Options;
use crate::params::{
    apply_changes, impostor_active, styles, ChannelSet, ParamSet, ParamTable,
};
use crate::scene::SceneGraph;
use crate::schedule::{
    BuildQueue, BuildRequest, Coalesce, Prepare, PrepareTask, Submitted,
    TaskCounter,
};
use crate::source::{Selection, Source};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReprState {
    /// Nothing executing.
    #[default]
    Idle,
    /// Waiting for the adapter's prepare step.
    Preparing,
    /// Creating or updating data units.
    Computing,
    /// Swapping the new units into the scene.
    Attaching,
    /// Terminal.
    Disposed,
}

/// What [`Representation::poll`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReprStatus {
    /// No work outstanding.
    Idle,
    /// A build is suspended or queued.
    Busy,
    /// The representation has been disposed.
    Disposed,
}

/// A build suspended in its prepare step.
struct InFlight<V> {
    request: BuildRequest,
    parts: Vec<PartView<V>>,
    task: Box<dyn PrepareTask>,
    started: Instant,
}

// ---------------------------------------------------------------------------
// Representation
// ---------------------------------------------------------------------------

/// A managed, rebuildable set of geometry derived from a source plus a live
/// parameter set.
pub struct Representation<S: Source> {
    style: String,
    table: ParamTable,
    adapter: Box<dyn SourceAdapter<S::View>>,
    source: Arc<S>,
    options: Arc<Options>,
    selection: Selection,
    selection_seen: u64,
    view: S::View,
    params: ParamSet,
    visible: bool,
    quality: Option<String>,
    units: Vec<DataUnit<S::View>>,
    queue: BuildQueue<BuildRequest>,
    state: ReprState,
    in_flight: Option<InFlight<S::View>>,
    rebuild_requested: bool,
    disposed: bool,
}

impl<S: Source> Representation<S> {
    /// Create a representation of `source` in the given style.
    ///
    /// Nothing is built until [`build`](Self::build) is called. `params` may
    /// hold table parameters and the `visible`, `quality`, `sele` and
    /// `color` shorthands; unknown names are ignored. Sources with
    /// assemblies additionally accept `assembly` and `defaultAssembly`.
    pub fn new(
        style: impl Into<String>,
        table: ParamTable,
        adapter: Box<dyn SourceAdapter<S::View>>,
        source: Arc<S>,
        params: &ParamSet,
        options: Arc<Options>,
    ) -> Self {
        let style = style.into();
        let table = if source.assemblies().is_empty() {
            table
        } else {
            styles::with_assembly(table)
        };
        let (values, meta) = meta::split(params, &style, &options);
        let mut live = table.defaults();
        let _ = table.assign(&mut live, &values);
        let selection = Selection::new(meta.sele.unwrap_or_default());
        let view = source.view(&selection.string());
        Self {
            style,
            table,
            adapter,
            source,
            options,
            selection_seen: selection.generation(),
            selection,
            view,
            params: live,
            visible: meta.visible.unwrap_or(true),
            quality: meta.quality,
            units: Vec::new(),
            queue: BuildQueue::new(),
            state: ReprState::Idle,
            in_flight: None,
            rebuild_requested: false,
            disposed: false,
        }
    }

    // -- Accessors --

    /// Style name.
    #[must_use]
    pub fn style(&self) -> &str {
        &self.style
    }

    /// Composed parameter table.
    #[must_use]
    pub const fn table(&self) -> &ParamTable {
        &self.table
    }

    /// Shared source.
    #[must_use]
    pub const fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Selection handle. Clones share the query string; changes made
    /// through any clone rebuild this representation on the next
    /// [`poll`](Self::poll).
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ReprState {
        self.state
    }

    /// Whether builds are executing or queued.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        !self.queue.tasks().is_idle()
    }

    /// Outstanding build obligations.
    #[must_use]
    pub const fn task_count(&self) -> usize {
        self.queue.tasks().count()
    }

    /// Busy counter, for subscribing observers.
    pub fn tasks_mut(&mut self) -> &mut TaskCounter {
        self.queue.tasks_mut()
    }

    /// Data units currently attached to the scene.
    #[must_use]
    pub fn data_units(&self) -> &[DataUnit<S::View>] {
        &self.units
    }

    /// Whether the representation is shown.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Full parameter snapshot, including `visible`, `quality`, `sele` and
    /// `defaultAssembly`.
    #[must_use]
    pub fn get_parameters(&self) -> ParamSet {
        let mut params = self.params.clone();
        drop(params.insert(meta::VISIBLE, self.visible));
        if let Some(quality) = &self.quality {
            drop(params.insert(meta::QUALITY, quality.as_str()));
        }
        drop(params.insert(meta::SELE, self.selection.string()));
        let default_assembly = self
            .params
            .text(meta::DEFAULT_ASSEMBLY_KEY)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.source.default_assembly())
            .to_owned();
        drop(params.insert(meta::DEFAULT_ASSEMBLY_KEY, default_assembly));
        params
    }

    // -- Operations --

    /// Queue a full rebuild.
    ///
    /// With `params`, those values are applied first (without classifying
    /// their effects, the rebuild covers everything). The request snapshots
    /// the live parameters; the quality shorthand is not part of it.
    ///
    /// # Errors
    ///
    /// [`ReprError::Disposed`] after disposal, otherwise the first adapter
    /// error of any build executed synchronously by this call.
    pub fn build(
        &mut self,
        scene: &mut dyn SceneGraph,
        params: Option<&ParamSet>,
    ) -> Result<(), ReprError> {
        if self.disposed {
            return Err(ReprError::Disposed);
        }
        if let Some(params) = params {
            let (values, meta) =
                meta::split(params, &self.style, &self.options);
            let _ = self.table.assign(&mut self.params, &values);
            if let Some(visible) = meta.visible {
                self.visible = visible;
            }
            if meta.quality.is_some() {
                self.quality = meta.quality;
            }
            if let Some(sele) = meta.sele {
                // refresh_view records the bump; the build below covers it.
                self.selection.set(&sele);
                self.refresh_view();
            }
        }
        self.submit(scene, BuildRequest::full(self.params.clone()))
    }

    /// Apply a partial parameter change through the cheapest sufficient
    /// refresh.
    ///
    /// Buffer-mutable values are pushed into the current buffers at once
    /// (and into any queued snapshot). Recompute values queue an in-place
    /// channel update; rebuild values queue a full rebuild. Unchanged and
    /// unknown values are ignored; an empty change does nothing at all.
    ///
    /// # Errors
    ///
    /// [`ReprError::Disposed`] after disposal, otherwise the first adapter
    /// error of any build executed synchronously by this call.
    pub fn set_parameters(
        &mut self,
        scene: &mut dyn SceneGraph,
        partial: &ParamSet,
    ) -> Result<(), ReprError> {
        if self.disposed {
            return Err(ReprError::Disposed);
        }
        if partial.is_empty() {
            return Ok(());
        }
        let (values, meta) = meta::split(partial, &self.style, &self.options);
        let mut render = false;

        if meta.quality.is_some() {
            self.quality = meta.quality;
        }
        if let Some(visible) = meta.visible {
            if visible != self.visible {
                self.apply_visibility(visible);
                render = true;
            }
        }

        let changes = apply_changes(
            &self.table,
            &mut self.params,
            &values,
            &self.options.capabilities,
        );
        if !changes.changed.is_empty() {
            debug!("{} parameters changed: {:?}", self.style, changes.changed);
        }
        if !changes.buffer.is_empty() {
            for unit in &mut self.units {
                unit.set_parameters(&changes.buffer);
            }
            self.patch_requests(&changes.buffer);
            render = true;
        }

        let mut result = if changes.rebuild {
            self.submit(scene, BuildRequest::full(self.params.clone()))
        } else if changes.channels.is_empty() {
            Ok(())
        } else {
            let request =
                BuildRequest::update(self.params.clone(), changes.channels);
            self.submit(scene, request)
        };

        if let Some(sele) = meta.sele {
            self.selection.set(&sele);
            result = result.and(self.sync_selection(scene));
        }
        if render {
            scene.request_render();
        }
        result
    }

    /// Show or hide every attached buffer at once.
    ///
    /// # Errors
    ///
    /// [`ReprError::Disposed`] after disposal.
    pub fn set_visibility(
        &mut self,
        scene: &mut dyn SceneGraph,
        visible: bool,
    ) -> Result<(), ReprError> {
        if self.disposed {
            return Err(ReprError::Disposed);
        }
        self.apply_visibility(visible);
        scene.request_render();
        Ok(())
    }

    /// Change the selection query and rebuild from the new view.
    ///
    /// # Errors
    ///
    /// [`ReprError::Disposed`] after disposal, otherwise the first adapter
    /// error of any build executed synchronously by this call.
    pub fn set_selection(
        &mut self,
        scene: &mut dyn SceneGraph,
        sele: &str,
    ) -> Result<(), ReprError> {
        if self.disposed {
            return Err(ReprError::Disposed);
        }
        self.selection.set(sele);
        self.sync_selection(scene)
    }

    /// Recompute `channels` of the current units after the source's data
    /// changed underneath them (new coordinates, new colors).
    ///
    /// # Errors
    ///
    /// [`ReprError::Disposed`] after disposal, otherwise the first adapter
    /// error of any build executed synchronously by this call.
    pub fn update(
        &mut self,
        scene: &mut dyn SceneGraph,
        channels: ChannelSet,
    ) -> Result<(), ReprError> {
        if self.disposed {
            return Err(ReprError::Disposed);
        }
        if channels.is_empty() {
            return Ok(());
        }
        self.submit(scene, BuildRequest::update(self.params.clone(), channels))
    }

    /// Advance outstanding work. Call once per frame.
    ///
    /// Picks up selection changes made through shared [`Selection`]
    /// handles, resumes a build whose prepare step has finished and runs
    /// whatever was queued behind it.
    ///
    /// # Errors
    ///
    /// The first adapter error of any build finished by this call. The
    /// representation stays usable.
    pub fn poll(
        &mut self,
        scene: &mut dyn SceneGraph,
    ) -> Result<ReprStatus, ReprError> {
        if self.disposed {
            return Ok(ReprStatus::Disposed);
        }
        let mut result = self.sync_selection(scene);
        if let Some(mut flight) = self.in_flight.take() {
            match flight.task.poll() {
                Poll::Pending => self.in_flight = Some(flight),
                Poll::Ready(outcome) => {
                    trace!("{} prepare finished", self.style);
                    let made = outcome.and_then(|()| {
                        self.make(scene, &flight.request, flight.parts)
                    });
                    result = result.and(self.finish(scene, made, flight.started));
                }
            }
        }
        result.map(|()| {
            if self.is_busy() {
                ReprStatus::Busy
            } else {
                ReprStatus::Idle
            }
        })
    }

    /// Tear down: cancel any suspended prepare, drop queued work, detach
    /// and release every buffer and release the adapter. Idempotent; every
    /// later operation reports [`ReprError::Disposed`] without touching
    /// the scene.
    pub fn dispose(&mut self, scene: &mut dyn SceneGraph) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(mut flight) = self.in_flight.take() {
            debug!("{} disposed during prepare", self.style);
            flight.task.cancel();
        }
        self.queue.dispose();
        let had_units = !self.units.is_empty();
        self.clear(scene);
        if had_units {
            scene.request_render();
        }
        self.adapter.dispose();
        self.state = ReprState::Disposed;
        debug!("{} disposed", self.style);
    }

    // -- Build pipeline --

    fn submit(
        &mut self,
        scene: &mut dyn SceneGraph,
        request: BuildRequest,
    ) -> Result<(), ReprError> {
        match self.queue.submit(request) {
            Submitted::Run(request) => self.execute(scene, request),
            Submitted::Deferred => {
                trace!("{} build deferred", self.style);
                Ok(())
            }
        }
    }

    /// Run `request`, which the queue has marked executing, up to
    /// completion or until its prepare step suspends.
    fn execute(
        &mut self,
        scene: &mut dyn SceneGraph,
        request: BuildRequest,
    ) -> Result<(), ReprError> {
        let started = Instant::now();
        self.state = ReprState::Preparing;
        let parts = self.parts_for(&request);
        let prepared = self.adapter.prepare(&PrepareContext {
            params: &request.params,
            parts: &parts,
            update: request.update,
        });
        match prepared {
            Ok(Prepare::Ready) => {
                let made = self.make(scene, &request, parts);
                self.finish(scene, made, started)
            }
            Ok(Prepare::Pending(task)) => {
                trace!("{} waiting for prepare", self.style);
                self.in_flight = Some(InFlight {
                    request,
                    parts,
                    task,
                    started,
                });
                Ok(())
            }
            Err(e) => self.finish(scene, Err(e), started),
        }
    }

    /// Complete the executing request and start the next one, if any.
    fn finish(
        &mut self,
        scene: &mut dyn SceneGraph,
        made: Result<(), AdapterError>,
        started: Instant,
    ) -> Result<(), ReprError> {
        let result = made.map_err(|e| {
            error!("{} build failed: {e}", self.style);
            ReprError::from(e)
        });
        debug!("{} build finished in {:?}", self.style, started.elapsed());
        match self.next_request() {
            Some(next) => result.and(self.execute(scene, next)),
            None => {
                self.state = ReprState::Idle;
                result
            }
        }
    }

    fn next_request(&mut self) -> Option<BuildRequest> {
        let next = self.queue.complete();
        if !std::mem::take(&mut self.rebuild_requested) {
            return next;
        }
        let full = BuildRequest::full(self.params.clone());
        match next {
            Some(next) => Some(next.coalesce(full)),
            None => match self.queue.submit(full) {
                Submitted::Run(request) => Some(request),
                Submitted::Deferred => None,
            },
        }
    }

    fn parts_for(&self, request: &BuildRequest) -> Vec<PartView<S::View>> {
        if request.is_update() {
            return self.units.iter().map(DataUnit::part_view).collect();
        }
        fanout::part_views(
            &*self.source,
            &self.view,
            request
                .params
                .text(meta::ASSEMBLY_KEY)
                .unwrap_or(fanout::DEFAULT_ASSEMBLY),
            request.params.text(meta::DEFAULT_ASSEMBLY_KEY).unwrap_or(""),
        )
    }

    fn make(
        &mut self,
        scene: &mut dyn SceneGraph,
        request: &BuildRequest,
        parts: Vec<PartView<S::View>>,
    ) -> Result<(), AdapterError> {
        match request.update {
            Some(channels) => self.update_units(scene, &request.params, channels),
            None => self.rebuild(scene, &request.params, parts),
        }
    }

    /// Recompute `channels` in place. Never allocates or detaches buffers.
    fn update_units(
        &mut self,
        scene: &mut dyn SceneGraph,
        params: &ParamSet,
        channels: ChannelSet,
    ) -> Result<(), AdapterError> {
        self.state = ReprState::Computing;
        let impostor = impostor_active(params, &self.options.capabilities);
        let ctx = UpdateContext::new(params, impostor);
        for unit in &mut self.units {
            if unit.buffers.is_empty() {
                continue;
            }
            match self.adapter.update_data(&ctx, channels, unit)? {
                UpdateOutcome::Updated => {}
                UpdateOutcome::NeedsRebuild => {
                    debug!("{} update escalated to rebuild", self.style);
                    self.rebuild_requested = true;
                    break;
                }
            }
        }
        scene.request_render();
        Ok(())
    }

    /// Create a fresh unit list, then swap it in for the old one. On
    /// failure the partial new list is released and the old one stays.
    fn rebuild(
        &mut self,
        scene: &mut dyn SceneGraph,
        params: &ParamSet,
        parts: Vec<PartView<S::View>>,
    ) -> Result<(), AdapterError> {
        self.state = ReprState::Computing;
        let impostor = impostor_active(params, &self.options.capabilities);
        let buffer_params = self.table.buffer_params(params);
        let mut ctx = BuildContext::new(params, &buffer_params, impostor, scene);
        let mut fresh = Vec::with_capacity(parts.len());
        for part in parts {
            match self.adapter.create_data(&mut ctx, &part.view, part.index) {
                Ok(Some(data)) => fresh.push(DataUnit::new(data, part)),
                Ok(None) => trace!("{} part {} produced nothing", self.style, part.index),
                Err(e) => {
                    fresh.into_iter().for_each(DataUnit::discard);
                    return Err(e);
                }
            }
        }

        self.state = ReprState::Attaching;
        self.clear(scene);
        for unit in &mut fresh {
            unit.attach(scene, self.visible);
        }
        self.units = fresh;
        scene.request_render();
        Ok(())
    }

    // -- Helpers --

    /// Detach and release all current units.
    fn clear(&mut self, scene: &mut dyn SceneGraph) {
        for unit in self.units.drain(..) {
            unit.release(scene);
        }
    }

    fn apply_visibility(&mut self, visible: bool) {
        self.visible = visible;
        for unit in &mut self.units {
            unit.set_visibility(visible);
        }
    }

    /// Overlay directly applied buffer values onto snapshots that have not
    /// run yet.
    fn patch_requests(&mut self, values: &ParamSet) {
        if let Some(pending) = self.queue.pending_mut() {
            pending.patch(values);
        }
        if let Some(flight) = &mut self.in_flight {
            flight.request.patch(values);
        }
    }

    fn refresh_view(&mut self) {
        self.selection_seen = self.selection.generation();
        self.view = self.source.view(&self.selection.string());
    }

    fn sync_selection(
        &mut self,
        scene: &mut dyn SceneGraph,
    ) -> Result<(), ReprError> {
        if self.selection.generation() == self.selection_seen {
            return Ok(());
        }
        debug!("{} selection -> {:?}", self.style, self.selection.string());
        self.refresh_view();
        self.submit(scene, BuildRequest::full(self.params.clone()))
    }
}

impl<S: Source> Drop for Representation<S> {
    fn drop(&mut self) {
        if let Some(mut flight) = self.in_flight.take() {
            flight.task.cancel();
        }
        if !self.disposed {
            warn!(
                "{} representation dropped without dispose ({} data units leaked)",
                self.style,
                self.units.len()
            );
        }
    }
}
