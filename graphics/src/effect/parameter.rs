//! Effect parameters and annotations.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use bytemuck::Pod;
use glam::{Mat4, Vec4};

use crate::error::{GraphicsError, GraphicsResult};
use crate::resources::Texture;

/// Shape class of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterClass {
    Scalar,
    Vector,
    Matrix,
    Object,
    Struct,
}

/// Element type of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterType {
    Void,
    Bool,
    Int32,
    Single,
    String,
    Texture,
    Texture1D,
    Texture2D,
    Texture3D,
    TextureCube,
}

impl ParameterType {
    /// Returns true for any texture type.
    pub fn is_texture(self) -> bool {
        matches!(
            self,
            Self::Texture | Self::Texture1D | Self::Texture2D | Self::Texture3D | Self::TextureCube
        )
    }
}

/// Read-only metadata attached to a parameter, technique or pass.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectAnnotation {
    pub(crate) name: String,
    pub(crate) semantic: Option<String>,
    pub(crate) row_count: u32,
    pub(crate) column_count: u32,
    pub(crate) parameter_class: ParameterClass,
    pub(crate) parameter_type: ParameterType,
    pub(crate) data: Vec<u8>,
}

impl EffectAnnotation {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn semantic(&self) -> Option<&str> {
        self.semantic.as_deref()
    }

    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    pub fn column_count(&self) -> u32 {
        self.column_count
    }

    pub fn parameter_class(&self) -> ParameterClass {
        self.parameter_class
    }

    pub fn parameter_type(&self) -> ParameterType {
        self.parameter_type
    }

    pub fn get_value_bool(&self) -> GraphicsResult<bool> {
        Ok(read_pod::<i32>(&self.name, &self.data)? != 0)
    }

    pub fn get_value_i32(&self) -> GraphicsResult<i32> {
        read_pod(&self.name, &self.data)
    }

    pub fn get_value_f32(&self) -> GraphicsResult<f32> {
        read_pod(&self.name, &self.data)
    }

    pub fn get_value_string(&self) -> GraphicsResult<String> {
        read_string(&self.name, self.parameter_type, &self.data)
    }
}

/// A user-visible effect parameter.
///
/// The descriptive fields are fixed at parse time. The value storage and the
/// bound texture can be changed through the `set_value_*` methods.
#[derive(Debug)]
pub struct EffectParameter {
    pub(crate) name: String,
    pub(crate) semantic: Option<String>,
    pub(crate) row_count: u32,
    pub(crate) column_count: u32,
    pub(crate) element_count: u32,
    pub(crate) parameter_class: ParameterClass,
    pub(crate) parameter_type: ParameterType,
    pub(crate) annotations: Vec<EffectAnnotation>,
    pub(crate) data: RefCell<Vec<u8>>,
    pub(crate) texture: RefCell<Option<Rc<Texture>>>,
}

impl EffectParameter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn semantic(&self) -> Option<&str> {
        self.semantic.as_deref()
    }

    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    pub fn column_count(&self) -> u32 {
        self.column_count
    }

    pub fn element_count(&self) -> u32 {
        self.element_count
    }

    pub fn parameter_class(&self) -> ParameterClass {
        self.parameter_class
    }

    pub fn parameter_type(&self) -> ParameterType {
        self.parameter_type
    }

    pub fn annotations(&self) -> &[EffectAnnotation] {
        &self.annotations
    }

    pub fn annotation(&self, name: &str) -> Option<&EffectAnnotation> {
        self.annotations.iter().find(|a| a.name == name)
    }

    /// Raw value bytes.
    pub fn raw_value(&self) -> Ref<'_, [u8]> {
        Ref::map(self.data.borrow(), Vec::as_slice)
    }

    pub fn get_value_bool(&self) -> GraphicsResult<bool> {
        Ok(read_pod::<i32>(&self.name, &self.data.borrow())? != 0)
    }

    pub fn get_value_i32(&self) -> GraphicsResult<i32> {
        read_pod(&self.name, &self.data.borrow())
    }

    pub fn get_value_f32(&self) -> GraphicsResult<f32> {
        read_pod(&self.name, &self.data.borrow())
    }

    /// The first `count` floats of the value.
    pub fn get_value_f32_array(&self, count: usize) -> GraphicsResult<Vec<f32>> {
        let data = self.data.borrow();
        let bytes = data
            .get(..count * 4)
            .ok_or_else(|| too_small(&self.name, count * 4, data.len()))?;
        Ok(bytes
            .chunks_exact(4)
            .map(bytemuck::pod_read_unaligned::<f32>)
            .collect())
    }

    pub fn get_value_vec4(&self) -> GraphicsResult<Vec4> {
        read_pod(&self.name, &self.data.borrow())
    }

    /// Row-major 4x4 matrix value.
    pub fn get_value_matrix(&self) -> GraphicsResult<Mat4> {
        let values = self.get_value_f32_array(16)?;
        let mut rows = [0.0f32; 16];
        rows.copy_from_slice(&values);
        Ok(Mat4::from_cols_array(&rows).transpose())
    }

    pub fn get_value_string(&self) -> GraphicsResult<String> {
        read_string(&self.name, self.parameter_type, &self.data.borrow())
    }

    pub fn set_value_bool(&self, value: bool) -> GraphicsResult<()> {
        self.write_pod(&[value as i32])
    }

    pub fn set_value_i32(&self, value: i32) -> GraphicsResult<()> {
        self.write_pod(&[value])
    }

    pub fn set_value_f32(&self, value: f32) -> GraphicsResult<()> {
        self.write_pod(&[value])
    }

    pub fn set_value_f32_array(&self, values: &[f32]) -> GraphicsResult<()> {
        self.write_pod(values)
    }

    pub fn set_value_vec4(&self, value: Vec4) -> GraphicsResult<()> {
        self.write_pod(&[value])
    }

    /// Store a matrix in row-major order.
    pub fn set_value_matrix(&self, value: Mat4) -> GraphicsResult<()> {
        self.write_pod(&value.transpose().to_cols_array())
    }

    /// The texture currently bound to this parameter.
    pub fn get_value_texture(&self) -> Option<Rc<Texture>> {
        self.texture.borrow().clone()
    }

    /// Bind a texture. Samplers that reference this parameter pick it up the
    /// next time a pass binds them.
    pub fn set_value_texture(&self, texture: Option<Rc<Texture>>) -> GraphicsResult<()> {
        if !self.parameter_type.is_texture() {
            return Err(GraphicsError::InvalidParameter(format!(
                "parameter {:?} of type {:?} cannot hold a texture",
                self.name, self.parameter_type
            )));
        }
        *self.texture.borrow_mut() = texture;
        Ok(())
    }

    fn write_pod<T: Pod>(&self, values: &[T]) -> GraphicsResult<()> {
        let bytes: &[u8] = bytemuck::cast_slice(values);
        let mut data = self.data.borrow_mut();
        let len = data.len();
        let target = data
            .get_mut(..bytes.len())
            .ok_or_else(|| too_small(&self.name, bytes.len(), len))?;
        target.copy_from_slice(bytes);
        Ok(())
    }
}

fn too_small(name: &str, needed: usize, available: usize) -> GraphicsError {
    GraphicsError::InvalidParameter(format!(
        "parameter {name:?} holds {available} bytes, {needed} requested"
    ))
}

fn read_pod<T: Pod>(name: &str, data: &[u8]) -> GraphicsResult<T> {
    let size = std::mem::size_of::<T>();
    let bytes = data
        .get(..size)
        .ok_or_else(|| too_small(name, size, data.len()))?;
    Ok(bytemuck::pod_read_unaligned(bytes))
}

fn read_string(name: &str, parameter_type: ParameterType, data: &[u8]) -> GraphicsResult<String> {
    if parameter_type != ParameterType::String {
        return Err(GraphicsError::InvalidParameter(format!(
            "parameter {name:?} is not a string"
        )));
    }
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    Ok(String::from_utf8_lossy(&data[..end]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameter(parameter_type: ParameterType, size: usize) -> EffectParameter {
        EffectParameter {
            name: "p".into(),
            semantic: None,
            row_count: 4,
            column_count: 4,
            element_count: 0,
            parameter_class: ParameterClass::Matrix,
            parameter_type,
            annotations: Vec::new(),
            data: RefCell::new(vec![0; size]),
            texture: RefCell::new(None),
        }
    }

    #[test]
    fn test_matrix_round_trip() {
        let p = parameter(ParameterType::Single, 64);
        let m = Mat4::from_cols_array(&[
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0,
        ]);
        p.set_value_matrix(m).unwrap();
        assert_eq!(p.get_value_matrix().unwrap(), m);
        // Row-major storage: the first stored row is the matrix's x row.
        assert_eq!(p.get_value_f32_array(4).unwrap(), vec![1.0, 5.0, 9.0, 13.0]);
    }

    #[test]
    fn test_write_past_storage_fails() {
        let p = parameter(ParameterType::Single, 4);
        assert!(p.set_value_f32(2.0).is_ok());
        assert!(matches!(
            p.set_value_vec4(Vec4::ONE),
            Err(GraphicsError::InvalidParameter(_))
        ));
        assert_eq!(p.get_value_f32().unwrap(), 2.0);
    }

    #[test]
    fn test_texture_slot_requires_texture_type() {
        let p = parameter(ParameterType::Single, 4);
        assert!(p.set_value_texture(None).is_err());
        let t = parameter(ParameterType::Texture2D, 4);
        assert!(t.set_value_texture(None).is_ok());
    }
}
