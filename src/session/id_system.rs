//! Public facade: one [`IdSystem`] per open document, owning the host adapter and every registry.

use crate::config::model::MaterialIdConfig;
use crate::config::opts::IdSystemOpts;
use crate::emit::chain::{ChainHandle, ColorInput, MixChain, ScalarInput};
use crate::emit::color_mix::{ColorMixEntry, build_color_chain};
use crate::emit::core::{CoreGraphHandle, GraphEmitter};
use crate::emit::images::{MaskImageSource, NoMaskImages};
use crate::emit::normal_mix::{NormalMixEntry, build_normal_chain};
use crate::foundation::core::MaterialId;
use crate::foundation::error::{IdMaskError, IdMaskResult};
use crate::graph::adapter::GraphAdapter;
use std::collections::BTreeMap;

/// ID-mask compiler bound to one host.
///
/// All operations are synchronous and take `&mut self`, so access to the adapter is serialized
/// for the duration of a rebuild or chain build.
pub struct IdSystem<A: GraphAdapter> {
    adapter: A,
    opts: IdSystemOpts,
    images: Box<dyn MaskImageSource>,
    emitter: GraphEmitter,
    configs: BTreeMap<MaterialId, MaterialIdConfig>,
    chains: BTreeMap<ChainHandle, MixChain>,
    next_chain: u64,
}

impl<A: GraphAdapter> IdSystem<A> {
    /// System with default options and no mask images.
    pub fn new(adapter: A) -> Self {
        Self::with_opts(adapter, IdSystemOpts::default())
    }

    /// System with explicit options.
    pub fn with_opts(adapter: A, opts: IdSystemOpts) -> Self {
        Self {
            adapter,
            emitter: GraphEmitter::new(opts.core_graph_prefix.clone()),
            opts,
            images: Box::new(NoMaskImages),
            configs: BTreeMap::new(),
            chains: BTreeMap::new(),
            next_chain: 0,
        }
    }

    /// Replace the source of per-identifier mask images. Affects cores instanced afterwards.
    pub fn with_mask_images(mut self, images: impl MaskImageSource + 'static) -> Self {
        self.images = Box::new(images);
        self
    }

    /// Regenerate `material`'s core from `config` and remember the config.
    ///
    /// On failure the previously committed core and stored config are left untouched.
    #[tracing::instrument(skip_all, fields(material = %material))]
    pub fn rebuild_core(
        &mut self,
        material: &MaterialId,
        config: &MaterialIdConfig,
    ) -> IdMaskResult<CoreGraphHandle> {
        let handle = self
            .emitter
            .rebuild(&mut self.adapter, self.images.as_mut(), material, config)?;
        self.configs.insert(material.clone(), *config);
        tracing::info!(graph = handle.graph.0, split = ?config.split(), "core committed");
        Ok(handle)
    }

    /// Build a color chain blending `entries` over `base`, in the given order.
    ///
    /// A material without a core gets one first. If the chain then fails, that core is removed
    /// again and the host is left as it was.
    #[tracing::instrument(skip_all, fields(material = %material, entries = entries.len()))]
    pub fn build_color_mix_chain(
        &mut self,
        material: &MaterialId,
        base: ColorInput,
        entries: &[ColorMixEntry],
    ) -> IdMaskResult<ChainHandle> {
        let prefix = self.opts.color_chain_prefix.clone();
        let chain = self.with_core(material, |adapter, core| {
            build_color_chain(adapter, &prefix, core, &base, entries)
        })?;
        Ok(self.register(chain))
    }

    /// Build a normal chain blending `entries` over the base normal, in the given order.
    ///
    /// Implicit core creation is rolled back on failure, as for [`Self::build_color_mix_chain`].
    #[tracing::instrument(skip_all, fields(material = %material, entries = entries.len()))]
    pub fn build_normal_mix_chain(
        &mut self,
        material: &MaterialId,
        base: ColorInput,
        base_space: ScalarInput,
        entries: &[NormalMixEntry],
    ) -> IdMaskResult<ChainHandle> {
        let prefix = self.opts.normal_chain_prefix.clone();
        let chain = self.with_core(material, |adapter, core| {
            build_normal_chain(adapter, &prefix, core, &base, &base_space, entries)
        })?;
        Ok(self.register(chain))
    }

    /// Delete a chain's instance and sub-graph.
    #[tracing::instrument(skip(self))]
    pub fn remove_chain(&mut self, handle: ChainHandle) -> IdMaskResult<()> {
        let chain = self
            .chains
            .get(&handle)
            .ok_or_else(|| IdMaskError::validation(format!("unknown chain handle {handle}")))?;
        let (instance, graph) = (chain.instance, chain.graph);
        self.adapter.delete_node(instance)?;
        // The instance is gone; the chain is unusable from here on whatever happens to its graph.
        self.chains.remove(&handle);
        self.adapter.delete_graph(graph)
    }

    /// Committed core of `material`.
    pub fn core(&self, material: &MaterialId) -> Option<&CoreGraphHandle> {
        self.emitter.get(material)
    }

    /// Config the committed core of `material` was built from.
    pub fn config(&self, material: &MaterialId) -> Option<&MaterialIdConfig> {
        self.configs.get(material)
    }

    /// A live chain.
    pub fn chain(&self, handle: ChainHandle) -> Option<&MixChain> {
        self.chains.get(&handle)
    }

    /// All live chains in creation order.
    pub fn chains(&self) -> impl Iterator<Item = (ChainHandle, &MixChain)> {
        self.chains.iter().map(|(h, c)| (*h, c))
    }

    /// Options in use.
    pub fn opts(&self) -> &IdSystemOpts {
        &self.opts
    }

    /// The host adapter.
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// The host adapter, mutably (for wiring done outside the compiler).
    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// Give the host adapter back.
    pub fn into_adapter(self) -> A {
        self.adapter
    }

    /// Run `build` against `material`'s core, creating the core first when there is none.
    /// A core created here does not outlive a failed `build`.
    fn with_core<T>(
        &mut self,
        material: &MaterialId,
        build: impl FnOnce(&mut A, &CoreGraphHandle) -> IdMaskResult<T>,
    ) -> IdMaskResult<T> {
        if let Some(core) = self.emitter.get(material).cloned() {
            return build(&mut self.adapter, &core);
        }
        let stored = self.configs.get(material).copied();
        tracing::debug!("no core yet, building one first");
        let core = self.rebuild_core(material, &stored.unwrap_or_default())?;
        match build(&mut self.adapter, &core) {
            Ok(built) => Ok(built),
            Err(err) => {
                self.emitter.discard(&mut self.adapter, material);
                if stored.is_none() {
                    self.configs.remove(material);
                }
                tracing::debug!(graph = core.graph.0, "implicit core discarded");
                Err(err)
            }
        }
    }

    fn register(&mut self, chain: MixChain) -> ChainHandle {
        let handle = ChainHandle(self.next_chain);
        self.next_chain += 1;
        tracing::info!(%handle, graph = chain.graph.0, "chain committed");
        self.chains.insert(handle, chain);
        handle
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/id_system.rs"]
mod tests;
