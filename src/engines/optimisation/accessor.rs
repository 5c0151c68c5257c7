use super::parameter::ParamValue;
use crate::error::{Result, ShapetuneError};
use std::collections::HashMap;

/// Read/write access to named attributes of named host objects
pub trait AttributeAccess {
    fn get(&self, object: &str, attribute: &str) -> Result<ParamValue>;
    fn set(&mut self, object: &str, attribute: &str, value: ParamValue) -> Result<()>;
}

pub type Getter<T> = fn(&T) -> ParamValue;
pub type Setter<T> = fn(&mut T, ParamValue) -> Result<()>;

struct Accessor<T> {
    get: Getter<T>,
    set: Setter<T>,
}

/// Dispatch table mapping attribute names to typed getter/setter pairs.
///
/// Hosts register one entry per attribute they expose and delegate their
/// `AttributeAccess` implementation to the table.
pub struct AccessorTable<T> {
    accessors: HashMap<String, Accessor<T>>,
}

impl<T> AccessorTable<T> {
    pub fn new() -> Self {
        Self {
            accessors: HashMap::new(),
        }
    }

    pub fn register(&mut self, attribute: &str, get: Getter<T>, set: Setter<T>) -> &mut Self {
        self.accessors
            .insert(attribute.to_string(), Accessor { get, set });
        self
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.accessors.contains_key(attribute)
    }

    pub fn attributes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.accessors.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn get(&self, target: &T, attribute: &str) -> Result<ParamValue> {
        Ok((self.accessor(attribute)?.get)(target))
    }

    pub fn set(&self, target: &mut T, attribute: &str, value: ParamValue) -> Result<()> {
        (self.accessor(attribute)?.set)(target, value)
    }

    fn accessor(&self, attribute: &str) -> Result<&Accessor<T>> {
        self.accessors.get(attribute).ok_or_else(|| {
            ShapetuneError::HostIntegration(format!("No accessor registered for '{}'", attribute))
        })
    }
}

impl<T> Default for AccessorTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Rejects a value whose kind does not match the attribute
pub fn kind_mismatch(attribute: &str, value: ParamValue) -> ShapetuneError {
    ShapetuneError::HostIntegration(format!(
        "Attribute '{}' cannot take value {:?}",
        attribute, value
    ))
}
