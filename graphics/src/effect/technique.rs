//! Techniques and passes.

use std::rc::Weak;

use crate::backend::{NativeContext, TechniqueHandle};
use crate::device::GraphicsDevice;
use crate::error::{GraphicsError, GraphicsResult};

use super::parameter::EffectAnnotation;
use super::Effect;

/// A named, ordered list of passes.
#[derive(Debug)]
pub struct EffectTechnique {
    pub(crate) name: String,
    pub(crate) handle: TechniqueHandle,
    pub(crate) passes: Vec<EffectPass>,
    pub(crate) annotations: Vec<EffectAnnotation>,
}

impl EffectTechnique {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Native handle: the technique's slot in the compiled descriptor.
    pub fn handle(&self) -> TechniqueHandle {
        self.handle
    }

    pub fn passes(&self) -> &[EffectPass] {
        &self.passes
    }

    pub fn pass(&self, name: &str) -> Option<&EffectPass> {
        self.passes.iter().find(|p| p.name == name)
    }

    pub fn annotations(&self) -> &[EffectAnnotation] {
        &self.annotations
    }

    pub fn annotation(&self, name: &str) -> Option<&EffectAnnotation> {
        self.annotations.iter().find(|a| a.name == name)
    }
}

/// One pass of a technique.
///
/// Applying a pass asks the native layer for the state the pass changes and
/// commits it to the device.
#[derive(Debug)]
pub struct EffectPass {
    pub(crate) name: String,
    pub(crate) annotations: Vec<EffectAnnotation>,
    pub(crate) effect: Weak<Effect>,
    pub(crate) technique: usize,
    pub(crate) index: usize,
}

impl EffectPass {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zero-based index within the owning technique.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn annotations(&self) -> &[EffectAnnotation] {
        &self.annotations
    }

    pub fn annotation(&self, name: &str) -> Option<&EffectAnnotation> {
        self.annotations.iter().find(|a| a.name == name)
    }

    /// Apply this pass.
    ///
    /// The owning technique is made current first when the effect has another
    /// technique selected.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::Disposed`] if the owning effect is gone, and
    /// any error raised while translating the pass state. On error the device
    /// state is unchanged.
    pub fn apply<C: NativeContext>(&self, device: &mut GraphicsDevice<C>) -> GraphicsResult<()> {
        let effect = self
            .effect
            .upgrade()
            .ok_or(GraphicsError::Disposed("effect"))?;
        effect.apply_pass(device, self.technique, self.index)
    }
}
