//! # Macros
//!
//! A [`MacroTable`] maps macro names to values. The raw table holds values exactly as parsed; the
//! resolved table, produced by [`resolve_all`], holds the same values with every macro reference
//! replaced, transitively.
use std::collections::HashMap;

use log::trace;

use crate::error::{Error, ErrorCode, Result};
use crate::value::{FieldValue, StringComponent, StringDatum};

/// Macro values by name, remembering definition order. Names are case-sensitive.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MacroTable {
    names: Vec<String>,
    values: HashMap<String, FieldValue>,
}

impl MacroTable {
    /// Define a new macro, failing if the name is already defined.
    pub fn insert(&mut self, name: String, value: FieldValue) -> Result<()> {
        if self.contains(&name) {
            return Err(Error::new(ErrorCode::DuplicateMacro(name)));
        }
        self.names.push(name.clone());
        self.values.insert(name, value);
        Ok(())
    }

    /// Define a macro unless a macro with this name already exists.
    pub fn insert_if_absent(&mut self, name: &str, value: FieldValue) {
        if !self.contains(name) {
            self.names.push(name.to_string());
            self.values.insert(name.to_string(), value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over the macros in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.names
            .iter()
            .filter_map(|name| self.values.get(name).map(|value| (name.as_str(), value)))
    }

    /// Define the standard month macros `jan` to `dec`, keeping any existing definitions.
    pub fn set_month_macros(&mut self) {
        macro_rules! ins {
            ($var:expr, $text:expr) => {
                self.insert_if_absent(
                    $var,
                    FieldValue::String(StringComponent::quoted(vec![StringDatum::text_from(
                        $text,
                    )])),
                );
            };
        }

        ins!("jan", "January");
        ins!("feb", "February");
        ins!("mar", "March");
        ins!("apr", "April");
        ins!("may", "May");
        ins!("jun", "June");
        ins!("jul", "July");
        ins!("aug", "August");
        ins!("sep", "September");
        ins!("oct", "October");
        ins!("nov", "November");
        ins!("dec", "December");
    }
}

/// Resolution state over a raw table: a memo of resolved values and the stack of names currently
/// being resolved.
#[derive(Debug)]
pub struct MacroResolver<'m> {
    table: &'m MacroTable,
    resolved: HashMap<String, FieldValue>,
    resolving: Vec<String>,
    max_depth: Option<usize>,
}

impl<'m> MacroResolver<'m> {
    pub fn new(table: &'m MacroTable) -> Self {
        Self {
            table,
            resolved: HashMap::new(),
            resolving: Vec::new(),
            max_depth: None,
        }
    }

    /// Fail when a chain of macro references is longer than `max_depth`.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Resolve the macro `name`, depth-first, memoizing the result.
    pub fn resolve(&mut self, name: &str) -> Result<FieldValue> {
        if let Some(value) = self.resolved.get(name) {
            return Ok(value.clone());
        }
        if let Some(start) = self.resolving.iter().position(|active| active == name) {
            return Err(Error::new(ErrorCode::CycleDetected {
                name: name.to_string(),
                cycle: self.resolving[start..].to_vec(),
            }));
        }

        let table = self.table;
        let raw = table
            .get(name)
            .ok_or_else(|| Error::new(ErrorCode::UnresolvedReference(name.to_string())))?;

        if let Some(max) = self.max_depth {
            if self.resolving.len() >= max {
                return Err(Error::new(ErrorCode::NestingTooDeep(max)));
            }
        }

        self.resolving.push(name.to_string());
        let result = self.resolve_value(raw);
        self.resolving.pop();

        let value = result?;
        trace!("resolved macro '{name}'");
        self.resolved.insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Resolve every macro reference inside `value`.
    ///
    /// A value which is exactly one macro reference resolves to the referenced value itself, so
    /// a reference to a number stays a number.
    pub fn resolve_value(&mut self, value: &FieldValue) -> Result<FieldValue> {
        if !value.has_macro_refs() {
            return Ok(value.clone());
        }
        match value {
            FieldValue::Number(n) => Ok(FieldValue::Number(*n)),
            FieldValue::String(component) => match component.data.as_slice() {
                [StringDatum::MacroRef(name)] => self.resolve(name),
                _ => Ok(FieldValue::String(self.resolve_component(component)?)),
            },
        }
    }

    fn resolve_component(&mut self, component: &StringComponent) -> Result<StringComponent> {
        let mut data = Vec::with_capacity(component.data.len());
        for datum in &component.data {
            data.push(match datum {
                StringDatum::MacroRef(name) => self.resolve(name)?.into_datum(),
                StringDatum::Component(inner) => {
                    StringDatum::Component(self.resolve_component(inner)?)
                }
                StringDatum::Text(_) | StringDatum::Number(_) => datum.clone(),
            });
        }
        Ok(StringComponent::new(
            component.kind,
            component.brace_depth,
            data,
        ))
    }

    /// Resolve every macro of the table, in definition order.
    pub fn resolve_all(&mut self) -> Result<()> {
        let table = self.table;
        for name in &table.names {
            self.resolve(name)?;
        }
        Ok(())
    }

    /// The resolved table, in the definition order of the raw table. Only macros which were
    /// resolved are included.
    pub fn finish(mut self) -> MacroTable {
        let mut resolved = MacroTable::default();
        for name in &self.table.names {
            if let Some(value) = self.resolved.remove(name) {
                resolved.names.push(name.clone());
                resolved.values.insert(name.clone(), value);
            }
        }
        resolved
    }
}

/// Resolve every macro of `table`.
pub fn resolve_all(table: &MacroTable) -> Result<MacroTable> {
    let mut resolver = MacroResolver::new(table);
    resolver.resolve_all()?;
    Ok(resolver.finish())
}

/// Resolve the macro references of a single value against `table`.
pub fn resolve_value(value: &FieldValue, table: &MacroTable) -> Result<FieldValue> {
    MacroResolver::new(table).resolve_value(value)
}
