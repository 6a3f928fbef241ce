//! Effect object model.
//!
//! An [`Effect`] is built once from the descriptor tree the native effect
//! compiler returns for a blob. It exposes parameters and techniques; applying
//! a technique's [`EffectPass`] replays the state the pass changes onto the
//! device.
//!
//! # Example
//!
//! ```ignore
//! let effect = device.create_effect(&bytes)?;
//! effect.parameter("World").unwrap().set_value_matrix(world)?;
//! for pass in effect.current_technique().passes() {
//!     pass.apply(&mut device)?;
//!     device.draw_indexed_primitives(PrimitiveType::TriangleList, 0, 0, count)?;
//! }
//! ```

pub mod codes;
pub mod descriptor;
mod parameter;
mod parser;
pub mod tables;
mod technique;
mod translator;

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::backend::{EffectHandle, NativeContext};
use crate::device::GraphicsDevice;
use crate::error::{GraphicsError, GraphicsResult};
use crate::resources::GraphicsResource;

pub use parameter::{EffectAnnotation, EffectParameter, ParameterClass, ParameterType};
pub use technique::{EffectPass, EffectTechnique};
pub use translator::{translate, ChangedStates, SamplerSlotUpdate, TranslatedStates};

use parser::ParsedEffect;

/// A compiled effect.
pub struct Effect {
    handle: EffectHandle,
    parameters: Vec<Rc<EffectParameter>>,
    techniques: Vec<EffectTechnique>,
    // Sampler name to the texture parameter it samples.
    sampler_map: HashMap<String, Rc<EffectParameter>>,
    current_technique: Cell<usize>,
    disposed: Cell<bool>,
}

impl Effect {
    fn from_parsed(handle: EffectHandle, parsed: ParsedEffect) -> Rc<Self> {
        let ParsedEffect {
            parameters,
            techniques,
            sampler_map,
        } = parsed;

        Rc::new_cyclic(|effect: &Weak<Effect>| {
            let techniques = techniques
                .into_iter()
                .enumerate()
                .map(|(slot, technique)| EffectTechnique {
                    name: technique.name,
                    handle: crate::backend::TechniqueHandle::from_raw(slot as u64),
                    passes: technique
                        .passes
                        .into_iter()
                        .enumerate()
                        .map(|(index, pass)| EffectPass {
                            name: pass.name,
                            annotations: pass.annotations,
                            effect: Weak::clone(effect),
                            technique: slot,
                            index,
                        })
                        .collect(),
                    annotations: technique.annotations,
                })
                .collect();
            Self {
                handle,
                parameters,
                techniques,
                sampler_map,
                current_technique: Cell::new(0),
                disposed: Cell::new(false),
            }
        })
    }

    /// Native effect handle.
    pub fn handle(&self) -> EffectHandle {
        self.handle
    }

    /// Public parameters, in declaration order. Samplers are not included.
    pub fn parameters(&self) -> &[Rc<EffectParameter>] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Rc<EffectParameter>> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    /// The texture parameter sampled by the sampler called `sampler_name`.
    pub fn sampler_texture(&self, sampler_name: &str) -> Option<&Rc<EffectParameter>> {
        self.sampler_map.get(sampler_name)
    }

    pub fn techniques(&self) -> &[EffectTechnique] {
        &self.techniques
    }

    pub fn technique(&self, name: &str) -> Option<&EffectTechnique> {
        self.techniques.iter().find(|t| t.name() == name)
    }

    pub fn current_technique(&self) -> &EffectTechnique {
        &self.techniques[self.current_technique.get()]
    }

    /// Make `technique` current and tell the native layer.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidParameter`] if `technique` belongs to
    /// another effect.
    pub fn set_current_technique<C: NativeContext>(
        &self,
        device: &mut GraphicsDevice<C>,
        technique: &EffectTechnique,
    ) -> GraphicsResult<()> {
        let index = self
            .techniques
            .iter()
            .position(|t| std::ptr::eq(t, technique))
            .ok_or_else(|| {
                GraphicsError::InvalidParameter(format!(
                    "technique {:?} does not belong to this effect",
                    technique.name()
                ))
            })?;
        self.select(device, index)
    }

    /// Make the technique called `name` current.
    pub fn set_current_technique_by_name<C: NativeContext>(
        &self,
        device: &mut GraphicsDevice<C>,
        name: &str,
    ) -> GraphicsResult<()> {
        let index = self
            .techniques
            .iter()
            .position(|t| t.name() == name)
            .ok_or_else(|| GraphicsError::InvalidParameter(format!("no technique named {name:?}")))?;
        self.select(device, index)
    }

    fn select<C: NativeContext>(&self, device: &mut GraphicsDevice<C>, index: usize) -> GraphicsResult<()> {
        self.check_live()?;
        let handle = self.techniques[index].handle;
        device
            .live_context()?
            .set_effect_technique(self.handle, handle);
        self.current_technique.set(index);
        Ok(())
    }

    /// Apply pass `pass` of technique slot `technique` and commit the state it
    /// changes to `device`.
    pub(crate) fn apply_pass<C: NativeContext>(
        &self,
        device: &mut GraphicsDevice<C>,
        technique: usize,
        pass: usize,
    ) -> GraphicsResult<()> {
        self.check_live()?;
        if self.current_technique.get() != technique {
            self.select(device, technique)?;
        }
        let changes = device.live_context()?.apply_effect(self.handle, pass)?;
        if changes.is_empty() {
            return Ok(());
        }
        let TranslatedStates {
            blend,
            depth_stencil,
            rasterizer,
            changed,
            samplers,
        } = translate(&changes, device.pipeline_snapshot(), &self.sampler_map)?;

        if changed.contains(ChangedStates::BLEND) {
            device.set_blend_state(Rc::new(blend));
        }
        if changed.contains(ChangedStates::DEPTH_STENCIL) {
            device.set_depth_stencil_state(Rc::new(depth_stencil));
        }
        if changed.contains(ChangedStates::RASTERIZER) {
            device.set_rasterizer_state(Rc::new(rasterizer));
        }
        for update in samplers {
            if let Some(texture) = update.texture {
                device.set_texture(update.register, texture)?;
            }
            if let Some(sampler) = update.sampler {
                device.set_sampler_state(update.register, Rc::new(sampler))?;
            }
        }
        Ok(())
    }

    fn check_live(&self) -> GraphicsResult<()> {
        if self.disposed.get() {
            return Err(GraphicsError::Disposed("effect"));
        }
        Ok(())
    }
}

impl GraphicsResource for Effect {
    fn dispose(&self, context: &mut dyn NativeContext) {
        if !self.disposed.replace(true) {
            context.delete_effect(self.handle);
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

impl Drop for Effect {
    fn drop(&mut self) {
        if !self.disposed.get() {
            log::warn!("Effect {:?} dropped without dispose", self.handle);
        }
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("handle", &self.handle)
            .field("parameters", &self.parameters.len())
            .field("techniques", &self.techniques.len())
            .field("current_technique", &self.current_technique().name())
            .finish()
    }
}

static_assertions::assert_not_impl_any!(Effect: Send, Sync);

impl<C: NativeContext> GraphicsDevice<C> {
    /// Load a compiled effect blob.
    ///
    /// The first technique becomes current.
    ///
    /// # Errors
    ///
    /// Returns the native layer's error if the blob cannot be loaded, and a
    /// compatibility or malformed-effect error if its descriptor cannot be
    /// parsed. The native effect is released in the latter case.
    pub fn create_effect(&mut self, code: &[u8]) -> GraphicsResult<Rc<Effect>> {
        let native = self.live_context()?.create_effect(code)?;
        let parsed = match parser::parse(&native.descriptor) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::debug!("Effect: rejecting {:?}: {err}", native.handle);
                self.context_mut().delete_effect(native.handle);
                return Err(err);
            }
        };

        let effect = Effect::from_parsed(native.handle, parsed);
        let first = effect.techniques[0].handle;
        self.context_mut().set_effect_technique(effect.handle, first);

        let weak: Weak<Effect> = Rc::downgrade(&effect);
        self.track(weak);
        Ok(effect)
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::backend::{DummyBackend, NativeCall, TechniqueHandle};
    use crate::effect::codes::{render_state, symbol_type};
    use crate::effect::descriptor::{
        DescriptorParameter, DescriptorTechnique, EffectDescriptor, EffectState, EffectValue,
        StateChanges,
    };
    use crate::types::PresentationParameters;

    const CODE: &[u8] = b"basic";

    fn descriptor() -> EffectDescriptor {
        EffectDescriptor::new()
            .with_parameter(DescriptorParameter::new(EffectValue::float("Alpha", 1.0)))
            .with_technique(DescriptorTechnique::new("Opaque").with_pass("P0"))
            .with_technique(DescriptorTechnique::new("Blended").with_pass("P0").with_pass("P1"))
    }

    fn create_test_device() -> GraphicsDevice<DummyBackend> {
        let mut backend = DummyBackend::new();
        backend.register_effect(CODE, descriptor());
        backend.set_pass_state_changes(
            CODE,
            1,
            1,
            StateChanges::default().with_render_state(EffectState::int(render_state::CULLMODE, 1)),
        );
        GraphicsDevice::new(backend, PresentationParameters::default())
    }

    #[test]
    fn test_first_technique_is_current() {
        let mut device = create_test_device();
        let effect = device.create_effect(CODE).unwrap();
        assert_eq!(effect.current_technique().name(), "Opaque");
        assert_eq!(
            device.context().calls().last(),
            Some(&NativeCall::SetEffectTechnique {
                effect: effect.handle(),
                technique: TechniqueHandle::from_raw(0),
            })
        );
        assert_eq!(effect.parameters().len(), 1);
        device.dispose();
    }

    #[test]
    fn test_passes_know_their_index() {
        let mut device = create_test_device();
        let effect = device.create_effect(CODE).unwrap();
        let blended = effect.technique("Blended").unwrap();
        assert_eq!(blended.passes()[1].index(), 1);
        assert_eq!(blended.pass("P1").unwrap().name(), "P1");
        device.dispose();
    }

    #[test]
    fn test_foreign_technique_rejected() {
        let mut device = create_test_device();
        let first = device.create_effect(CODE).unwrap();
        let second = device.create_effect(CODE).unwrap();
        let foreign = second.technique("Blended").unwrap();
        assert!(matches!(
            first.set_current_technique(&mut device, foreign),
            Err(GraphicsError::InvalidParameter(_))
        ));
        assert_eq!(first.current_technique().name(), "Opaque");
        device.dispose();
    }

    #[test]
    fn test_apply_pass_of_current_technique() {
        let mut device = create_test_device();
        let effect = device.create_effect(CODE).unwrap();
        effect
            .set_current_technique_by_name(&mut device, "Blended")
            .unwrap();

        effect.current_technique().passes()[0].apply(&mut device).unwrap();
        assert_eq!(
            device.rasterizer_state().cull_mode,
            stamen_core::CullMode::CullCounterClockwiseFace
        );

        effect.current_technique().passes()[1].apply(&mut device).unwrap();
        assert_eq!(device.rasterizer_state().cull_mode, stamen_core::CullMode::None);
        device.dispose();
    }

    #[test]
    fn test_apply_pass_selects_owning_technique() {
        let mut device = create_test_device();
        let effect = device.create_effect(CODE).unwrap();
        assert_eq!(effect.current_technique().name(), "Opaque");
        device.context_mut().clear_calls();

        effect.technique("Blended").unwrap().passes()[1]
            .apply(&mut device)
            .unwrap();
        assert_eq!(effect.current_technique().name(), "Blended");
        assert_eq!(device.rasterizer_state().cull_mode, stamen_core::CullMode::None);
        assert_eq!(
            &device.context().calls()[..2],
            &[
                NativeCall::SetEffectTechnique {
                    effect: effect.handle(),
                    technique: TechniqueHandle::from_raw(1),
                },
                NativeCall::ApplyEffect {
                    effect: effect.handle(),
                    pass: 1,
                },
            ]
        );

        device.context_mut().clear_calls();
        effect.technique("Blended").unwrap().passes()[0]
            .apply(&mut device)
            .unwrap();
        assert_eq!(
            device
                .context()
                .count_calls(|c| matches!(c, NativeCall::SetEffectTechnique { .. })),
            0
        );
        device.dispose();
    }

    #[test]
    fn test_parse_failure_releases_native_effect() {
        let mut backend = DummyBackend::new();
        let mut bad = descriptor();
        bad.parameters[0].value.value_type = symbol_type::UNSUPPORTED;
        backend.register_effect(CODE, bad);
        let mut device = GraphicsDevice::new(backend, PresentationParameters::default());

        assert!(device.create_effect(CODE).is_err());
        assert!(matches!(
            device.context().calls().last(),
            Some(NativeCall::DeleteEffect(_))
        ));
        assert_eq!(device.resource_count(), 0);
    }

    #[test]
    fn test_pass_outliving_effect() {
        let mut device = create_test_device();
        let effect = device.create_effect(CODE).unwrap();
        let pass = EffectPass {
            name: "P0".into(),
            annotations: Vec::new(),
            effect: Rc::downgrade(&effect),
            technique: 0,
            index: 0,
        };
        effect.dispose(device.context_mut());
        assert!(matches!(
            pass.apply(&mut device),
            Err(GraphicsError::Disposed("effect"))
        ));
        drop(effect);
        assert!(matches!(
            pass.apply(&mut device),
            Err(GraphicsError::Disposed("effect"))
        ));
    }
}
