//! Effect descriptor parser.
//!
//! Walks a compiled [`EffectDescriptor`] once and builds the typed parameter
//! and technique graph. Sampler objects do not become parameters; instead
//! each sampler is mapped to the texture parameter it samples.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{GraphicsError, GraphicsResult};

use super::codes::symbol_type;
use super::descriptor::{EffectDescriptor, EffectValue, EffectValueData};
use super::parameter::{EffectAnnotation, EffectParameter};
use super::tables::{SYMBOL_CLASS, SYMBOL_TYPE};

const MAX_DIMENSION: u32 = 4;
const MAX_ELEMENTS: u32 = 65_535;

/// Parse result, before passes are linked back to their effect.
#[derive(Debug)]
pub(crate) struct ParsedEffect {
    pub parameters: Vec<Rc<EffectParameter>>,
    pub techniques: Vec<ParsedTechnique>,
    pub sampler_map: HashMap<String, Rc<EffectParameter>>,
}

#[derive(Debug)]
pub(crate) struct ParsedTechnique {
    pub name: String,
    pub annotations: Vec<EffectAnnotation>,
    pub passes: Vec<ParsedPass>,
}

#[derive(Debug)]
pub(crate) struct ParsedPass {
    pub name: String,
    pub annotations: Vec<EffectAnnotation>,
}

/// Build the effect graph from `descriptor`, in descriptor order.
pub(crate) fn parse(descriptor: &EffectDescriptor) -> GraphicsResult<ParsedEffect> {
    if descriptor.techniques.is_empty() {
        return Err(GraphicsError::MalformedEffect(
            "effect has no techniques".to_string(),
        ));
    }

    let mut parameters: Vec<Rc<EffectParameter>> = Vec::new();
    let mut sampler_map = HashMap::new();

    for entry in &descriptor.parameters {
        let value = &entry.value;
        if symbol_type::is_shader(value.value_type) {
            continue;
        }
        if symbol_type::is_sampler(value.value_type) {
            match sampled_texture(descriptor, value)?
                .and_then(|name| parameters.iter().find(|p| p.name == name))
            {
                Some(texture) => {
                    sampler_map.insert(value.name.clone(), Rc::clone(texture));
                }
                None => log::debug!("Effect: sampler {:?} has no texture parameter", value.name),
            }
            continue;
        }

        check_dimensions(value)?;
        parameters.push(Rc::new(EffectParameter {
            name: value.name.clone(),
            semantic: value.semantic.clone(),
            row_count: value.row_count,
            column_count: value.column_count,
            element_count: value.element_count,
            parameter_class: SYMBOL_CLASS.get(value.value_class)?,
            parameter_type: SYMBOL_TYPE.get(value.value_type)?,
            annotations: parse_annotations(&entry.annotations)?,
            data: RefCell::new(value.raw()?.to_vec()),
            texture: RefCell::new(None),
        }));
    }

    let techniques = descriptor
        .techniques
        .iter()
        .map(|technique| {
            let passes = technique
                .passes
                .iter()
                .map(|pass| {
                    Ok(ParsedPass {
                        name: pass.name.clone(),
                        annotations: parse_annotations(&pass.annotations)?,
                    })
                })
                .collect::<GraphicsResult<Vec<_>>>()?;
            Ok(ParsedTechnique {
                name: technique.name.clone(),
                annotations: parse_annotations(&technique.annotations)?,
                passes,
            })
        })
        .collect::<GraphicsResult<Vec<_>>>()?;

    log::debug!(
        "Effect: parsed {} parameters, {} techniques, {} mapped samplers",
        parameters.len(),
        techniques.len(),
        sampler_map.len()
    );

    Ok(ParsedEffect {
        parameters,
        techniques,
        sampler_map,
    })
}

/// Name of the texture object a sampler's state list refers to.
fn sampled_texture<'a>(
    descriptor: &'a EffectDescriptor,
    sampler: &EffectValue,
) -> GraphicsResult<Option<&'a str>> {
    let EffectValueData::SamplerStates(states) = &sampler.values else {
        return Err(GraphicsError::MalformedEffect(format!(
            "sampler {:?} carries no state list",
            sampler.name
        )));
    };
    let Some(state) = states
        .iter()
        .find(|state| symbol_type::is_texture(state.value.value_type))
    else {
        return Ok(None);
    };

    let index = state.value.read_i32()?;
    let object = usize::try_from(index)
        .ok()
        .and_then(|index| descriptor.objects.get(index))
        .ok_or_else(|| {
            GraphicsError::MalformedEffect(format!(
                "sampler {:?} references object {index} of {}",
                sampler.name,
                descriptor.objects.len()
            ))
        })?;
    Ok(object.mapping_name.as_deref())
}

fn check_dimensions(value: &EffectValue) -> GraphicsResult<()> {
    if value.row_count > MAX_DIMENSION
        || value.column_count > MAX_DIMENSION
        || value.element_count > MAX_ELEMENTS
    {
        return Err(GraphicsError::MalformedEffect(format!(
            "value {:?} is {}x{}[{}]",
            value.name, value.row_count, value.column_count, value.element_count
        )));
    }
    Ok(())
}

fn parse_annotations(values: &[EffectValue]) -> GraphicsResult<Vec<EffectAnnotation>> {
    values
        .iter()
        .map(|value| {
            check_dimensions(value)?;
            Ok(EffectAnnotation {
                name: value.name.clone(),
                semantic: value.semantic.clone(),
                row_count: value.row_count,
                column_count: value.column_count,
                parameter_class: SYMBOL_CLASS.get(value.value_class)?,
                parameter_type: SYMBOL_TYPE.get(value.value_type)?,
                data: value.raw()?.to_vec(),
            })
        })
        .collect()
}
