//! Compiled effect descriptor tree.
//!
//! This is the shape the native effect compiler hands back after loading an
//! effect blob. Class, type and state codes are kept as the raw `u32` values
//! the compiler emits (see [`super::codes`]); [`super::parser`] turns the tree
//! into the typed [`Effect`](super::Effect) graph.

use crate::error::{GraphicsError, GraphicsResult};

use super::codes::{symbol_class, symbol_type};

/// A named, typed value: parameters, annotations and state payloads all use it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectValue {
    pub name: String,
    pub semantic: Option<String>,
    pub value_class: u32,
    pub value_type: u32,
    pub row_count: u32,
    pub column_count: u32,
    pub element_count: u32,
    pub values: EffectValueData,
}

/// Storage behind an [`EffectValue`].
#[derive(Debug, Clone, PartialEq)]
pub enum EffectValueData {
    /// Plain little-endian value bytes.
    Raw(Vec<u8>),
    /// State assignments of a sampler object.
    SamplerStates(Vec<EffectSamplerState>),
}

impl Default for EffectValueData {
    fn default() -> Self {
        Self::Raw(Vec::new())
    }
}

/// One `state = value` entry of a sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectSamplerState {
    pub state_type: u32,
    pub value: EffectValue,
}

/// One render state entry reported by an applied pass.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectState {
    pub state_type: u32,
    pub value: EffectValue,
}

/// Sampler state entries reported for one sampler register.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SamplerStateRegister {
    pub sampler_name: String,
    pub sampler_register: u32,
    pub states: Vec<EffectSamplerState>,
}

/// Everything a pass changed when it was applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateChanges {
    pub render_state_changes: Vec<EffectState>,
    pub sampler_state_changes: Vec<SamplerStateRegister>,
}

impl StateChanges {
    pub fn is_empty(&self) -> bool {
        self.render_state_changes.is_empty() && self.sampler_state_changes.is_empty()
    }

    /// Append a render state entry.
    pub fn with_render_state(mut self, state: EffectState) -> Self {
        self.render_state_changes.push(state);
        self
    }

    /// Append a sampler register.
    pub fn with_sampler_register(mut self, register: SamplerStateRegister) -> Self {
        self.sampler_state_changes.push(register);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DescriptorParameter {
    pub value: EffectValue,
    pub annotations: Vec<EffectValue>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DescriptorPass {
    pub name: String,
    pub annotations: Vec<EffectValue>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DescriptorTechnique {
    pub name: String,
    pub passes: Vec<DescriptorPass>,
    pub annotations: Vec<EffectValue>,
}

/// Entry of the descriptor's object table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DescriptorObject {
    pub object_type: u32,
    /// Name of the parameter this object was declared as.
    pub mapping_name: Option<String>,
}

/// Root of the compiled effect tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectDescriptor {
    pub parameters: Vec<DescriptorParameter>,
    pub techniques: Vec<DescriptorTechnique>,
    pub objects: Vec<DescriptorObject>,
}

impl EffectValue {
    fn new(name: impl Into<String>, value_class: u32, value_type: u32, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            semantic: None,
            value_class,
            value_type,
            row_count: 1,
            column_count: 1,
            element_count: 0,
            values: EffectValueData::Raw(bytes),
        }
    }

    /// Scalar `int` value.
    pub fn int(name: impl Into<String>, value: i32) -> Self {
        Self::new(
            name,
            symbol_class::SCALAR,
            symbol_type::INT,
            value.to_le_bytes().to_vec(),
        )
    }

    /// Scalar `bool` value (stored as a 32-bit integer).
    pub fn bool(name: impl Into<String>, value: bool) -> Self {
        Self::new(
            name,
            symbol_class::SCALAR,
            symbol_type::BOOL,
            (value as i32).to_le_bytes().to_vec(),
        )
    }

    /// Scalar `float` value.
    pub fn float(name: impl Into<String>, value: f32) -> Self {
        Self::new(
            name,
            symbol_class::SCALAR,
            symbol_type::FLOAT,
            value.to_le_bytes().to_vec(),
        )
    }

    /// `float` vector or matrix value.
    pub fn floats(name: impl Into<String>, rows: u32, columns: u32, values: &[f32]) -> Self {
        let class = match (rows, columns) {
            (1, 1) => symbol_class::SCALAR,
            (1, _) => symbol_class::VECTOR,
            _ => symbol_class::MATRIX_ROWS,
        };
        let mut value = Self::new(
            name,
            class,
            symbol_type::FLOAT,
            bytemuck::cast_slice(values).to_vec(),
        );
        value.row_count = rows;
        value.column_count = columns;
        value
    }

    /// NUL-terminated string value.
    pub fn string(name: impl Into<String>, value: &str) -> Self {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);
        Self::new(name, symbol_class::OBJECT, symbol_type::STRING, bytes)
    }

    /// Texture object. The payload is an index into the object table.
    pub fn texture(name: impl Into<String>, value_type: u32, object_index: i32) -> Self {
        Self::new(
            name,
            symbol_class::OBJECT,
            value_type,
            object_index.to_le_bytes().to_vec(),
        )
    }

    /// Sampler object with its state assignments.
    pub fn sampler(name: impl Into<String>, states: Vec<EffectSamplerState>) -> Self {
        Self {
            values: EffectValueData::SamplerStates(states),
            ..Self::new(name, symbol_class::OBJECT, symbol_type::SAMPLER2D, Vec::new())
        }
    }

    /// Set the semantic.
    pub fn with_semantic(mut self, semantic: impl Into<String>) -> Self {
        self.semantic = Some(semantic.into());
        self
    }

    /// Raw value bytes, or an error for sampler objects.
    pub fn raw(&self) -> GraphicsResult<&[u8]> {
        match &self.values {
            EffectValueData::Raw(bytes) => Ok(bytes),
            EffectValueData::SamplerStates(_) => Err(GraphicsError::MalformedEffect(format!(
                "value {:?} holds sampler states, not raw data",
                self.name
            ))),
        }
    }

    /// First four bytes as an `i32`.
    pub fn read_i32(&self) -> GraphicsResult<i32> {
        let bytes = self.first_word()?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    /// First four bytes as an `f32`.
    pub fn read_f32(&self) -> GraphicsResult<f32> {
        let bytes = self.first_word()?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    /// First four bytes as a 32-bit boolean.
    pub fn read_bool(&self) -> GraphicsResult<bool> {
        Ok(self.read_i32()? != 0)
    }

    fn first_word(&self) -> GraphicsResult<&[u8]> {
        let raw = self.raw()?;
        raw.get(..4).ok_or_else(|| {
            GraphicsError::MalformedEffect(format!(
                "value {:?} has {} bytes, expected at least 4",
                self.name,
                raw.len()
            ))
        })
    }
}

impl EffectState {
    pub fn new(state_type: u32, value: EffectValue) -> Self {
        Self { state_type, value }
    }

    /// Integer-valued state (enum codes, masks, references).
    pub fn int(state_type: u32, value: i32) -> Self {
        Self::new(state_type, EffectValue::int("", value))
    }

    /// Boolean-valued state.
    pub fn bool(state_type: u32, value: bool) -> Self {
        Self::new(state_type, EffectValue::bool("", value))
    }

    /// Float-valued state.
    pub fn float(state_type: u32, value: f32) -> Self {
        Self::new(state_type, EffectValue::float("", value))
    }
}

impl EffectSamplerState {
    pub fn new(state_type: u32, value: EffectValue) -> Self {
        Self { state_type, value }
    }

    /// Integer-valued sampler state.
    pub fn int(state_type: u32, value: i32) -> Self {
        Self::new(state_type, EffectValue::int("", value))
    }

    /// Float-valued sampler state.
    pub fn float(state_type: u32, value: f32) -> Self {
        Self::new(state_type, EffectValue::float("", value))
    }
}

impl SamplerStateRegister {
    pub fn new(sampler_name: impl Into<String>, sampler_register: u32) -> Self {
        Self {
            sampler_name: sampler_name.into(),
            sampler_register,
            states: Vec::new(),
        }
    }

    /// Append a state entry.
    pub fn with_state(mut self, state: EffectSamplerState) -> Self {
        self.states.push(state);
        self
    }
}

impl DescriptorParameter {
    pub fn new(value: EffectValue) -> Self {
        Self {
            value,
            annotations: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: EffectValue) -> Self {
        self.annotations.push(annotation);
        self
    }
}

impl DescriptorTechnique {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a pass with no annotations.
    pub fn with_pass(mut self, name: impl Into<String>) -> Self {
        self.passes.push(DescriptorPass {
            name: name.into(),
            annotations: Vec::new(),
        });
        self
    }

    pub fn with_annotation(mut self, annotation: EffectValue) -> Self {
        self.annotations.push(annotation);
        self
    }
}

impl EffectDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, parameter: DescriptorParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_technique(mut self, technique: DescriptorTechnique) -> Self {
        self.techniques.push(technique);
        self
    }

    pub fn with_object(mut self, object_type: u32, mapping_name: Option<&str>) -> Self {
        self.objects.push(DescriptorObject {
            object_type,
            mapping_name: mapping_name.map(str::to_owned),
        });
        self
    }
}
