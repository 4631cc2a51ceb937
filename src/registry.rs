//! Style name to adapter factory lookup.
//!
//! A [`StyleRegistry`] is built once at startup, extended with
//! [`register`](StyleRegistry::register) and then shared read-only. Every
//! [`make_representation`](StyleRegistry::make_representation) call gets a
//! fresh adapter from the style's factory, so adapter state (caches,
//! worker threads) is never shared between representations.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::error::ReprError;
use crate::options::Options;
use crate::params::{styles, ParamSet, ParamTable};
use crate::repr::{Representation, SourceAdapter};
use crate::source::{AtomView, Source};
use crate::styles::{
    AtomBondAdapter, AtomBondStrategy, PointAdapter, SphereAdapter,
    SurfaceAdapter, SurfaceExtractor, SurfaceWorker,
};

/// Creates a fresh adapter for one representation.
pub type AdapterFactory<V> = Arc<
    dyn Fn(&Options) -> Result<Box<dyn SourceAdapter<V>>, ReprError>
        + Send
        + Sync,
>;

/// A registered style: its parameter table and adapter factory.
pub struct StyleDescriptor<V> {
    name: String,
    table: ParamTable,
    factory: AdapterFactory<V>,
}

impl<V> StyleDescriptor<V> {
    /// Describe a style.
    pub fn new(
        name: impl Into<String>,
        table: ParamTable,
        factory: impl Fn(&Options) -> Result<Box<dyn SourceAdapter<V>>, ReprError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            table,
            factory: Arc::new(factory),
        }
    }

    /// Style name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter table new representations start from.
    #[must_use]
    pub const fn table(&self) -> &ParamTable {
        &self.table
    }
}

impl<V> Clone for StyleDescriptor<V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            table: self.table.clone(),
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<V> fmt::Debug for StyleDescriptor<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleDescriptor")
            .field("name", &self.name)
            .field("params", &self.table.len())
            .finish_non_exhaustive()
    }
}

/// Registered styles for views of type `V`.
pub struct StyleRegistry<V> {
    options: Arc<Options>,
    styles: BTreeMap<String, StyleDescriptor<V>>,
}

impl<V: 'static> StyleRegistry<V> {
    /// Empty registry.
    #[must_use]
    pub fn new(options: Arc<Options>) -> Self {
        Self {
            options,
            styles: BTreeMap::new(),
        }
    }

    /// Options handed to every representation.
    #[must_use]
    pub const fn options(&self) -> &Arc<Options> {
        &self.options
    }

    /// Add or replace a style. Returns the descriptor it replaced.
    pub fn register(
        &mut self,
        style: StyleDescriptor<V>,
    ) -> Option<StyleDescriptor<V>> {
        debug!("registering style {:?}", style.name);
        self.styles.insert(style.name.clone(), style)
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, style: StyleDescriptor<V>) -> Self {
        drop(self.register(style));
        self
    }

    /// The descriptor registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StyleDescriptor<V>> {
        self.styles.get(name)
    }

    /// Registered style names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }

    /// Create an unbuilt representation of `source` in style `kind`.
    ///
    /// # Errors
    ///
    /// [`ReprError::UnknownKind`] if no style is registered under `kind`,
    /// or whatever the style's factory fails with.
    pub fn make_representation<S>(
        &self,
        kind: &str,
        source: Arc<S>,
        params: &ParamSet,
    ) -> Result<Representation<S>, ReprError>
    where
        S: Source<View = V>,
    {
        let style = self.styles.get(kind).ok_or_else(|| {
            ReprError::UnknownKind {
                kind: kind.to_owned(),
            }
        })?;
        let adapter = (style.factory)(&self.options)?;
        Ok(Representation::new(
            style.name.clone(),
            style.table.clone(),
            adapter,
            source,
            params,
            Arc::clone(&self.options),
        ))
    }
}

impl<V: AtomView + 'static> StyleRegistry<V> {
    /// Register spacefill, point, ball+stick, licorice and line.
    #[must_use]
    pub fn with_builtin_styles(self) -> Self {
        let registry = self
            .with(StyleDescriptor::new("spacefill", styles::spacefill(), |_| {
                Ok(Box::new(SphereAdapter))
            }))
            .with(StyleDescriptor::new("point", styles::point(), |_| {
                Ok(Box::new(PointAdapter))
            }));
        [
            (AtomBondStrategy::BallAndStick, styles::ball_and_stick()),
            (AtomBondStrategy::Licorice, styles::licorice()),
            (AtomBondStrategy::Line, styles::line()),
        ]
        .into_iter()
        .fold(registry, |registry, (strategy, table)| {
            registry.with(StyleDescriptor::new(strategy.style(), table, move |_| {
                Ok(Box::new(AtomBondAdapter::new(strategy)))
            }))
        })
    }

    /// Register the molecular surface style, triangulated by `extractor`.
    /// Each representation gets its own worker thread when
    /// `worker.use_worker` is set.
    #[must_use]
    pub fn with_surface(self, extractor: Arc<dyn SurfaceExtractor>) -> Self {
        self.with(StyleDescriptor::new(
            "surface",
            styles::surface(),
            move |options| {
                let extractor = Arc::clone(&extractor);
                let adapter = if options.worker.use_worker {
                    let worker = SurfaceWorker::new(&options.worker.thread_name)?;
                    SurfaceAdapter::with_worker(extractor, worker)
                } else {
                    SurfaceAdapter::new(extractor)
                };
                Ok(Box::new(adapter))
            },
        ))
    }
}

impl<V> fmt::Debug for StyleRegistry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleRegistry")
            .field("styles", &self.styles.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
