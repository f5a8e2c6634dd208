use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{UnitDefinition, UnitsError, UnitsResult};

/// SI unit name used by dimensionless kinds.
pub const DIMENSIONLESS_UNIT: &str = "-";

/// A quantity kind (Temperature, Pressure, ...) with its unit table.
///
/// The SI unit is always present in `units` as an identity conversion, so
/// the canonical value of a field is simply its value in the SI unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireQuantityKind")]
pub struct QuantityKind {
    #[serde(skip)]
    name: String,
    title: String,
    #[serde(rename = "nominalValue")]
    nominal_value: f64,
    #[serde(rename = "SIUnit")]
    si_unit_name: String,
    units: IndexMap<String, UnitDefinition>,
}

impl QuantityKind {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        si_unit_name: impl Into<String>,
        nominal_value: f64,
        units: IndexMap<String, UnitDefinition>,
    ) -> UnitsResult<Self> {
        let kind = Self {
            name: name.into(),
            title: title.into(),
            nominal_value,
            si_unit_name: si_unit_name.into(),
            units,
        };
        kind.validate()?;
        Ok(kind)
    }

    fn validate(&self) -> UnitsResult<()> {
        match self.units.get(&self.si_unit_name) {
            Some(def) if def.is_canonical() => Ok(()),
            _ => Err(UnitsError::NonCanonicalSiUnit {
                kind: self.name.clone(),
                unit: self.si_unit_name.clone(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn si_unit_name(&self) -> &str {
        &self.si_unit_name
    }

    /// Default canonical value for fresh fields and converter panels.
    pub fn nominal_value(&self) -> f64 {
        self.nominal_value
    }

    pub fn is_dimensionless(&self) -> bool {
        self.si_unit_name == DIMENSIONLESS_UNIT
    }

    /// Look up a unit, failing with [`UnitsError::UnknownUnit`].
    pub fn unit(&self, unit_name: &str) -> UnitsResult<&UnitDefinition> {
        self.units
            .get(unit_name)
            .ok_or_else(|| UnitsError::UnknownUnit {
                unit: unit_name.to_string(),
                kind: self.name.clone(),
            })
    }

    pub fn has_unit(&self, unit_name: &str) -> bool {
        self.units.contains_key(unit_name)
    }

    /// Unit names in table order.
    pub fn unit_names(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    pub fn units(&self) -> &IndexMap<String, UnitDefinition> {
        &self.units
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

#[derive(Deserialize)]
struct WireQuantityKind {
    title: String,
    #[serde(rename = "nominalValue", default)]
    nominal_value: f64,
    #[serde(rename = "SIUnit")]
    si_unit_name: String,
    #[serde(default)]
    units: IndexMap<String, UnitDefinition>,
}

impl TryFrom<WireQuantityKind> for QuantityKind {
    type Error = UnitsError;

    fn try_from(wire: WireQuantityKind) -> Result<Self, Self::Error> {
        // The catalog map key is the name; it is filled in by the catalog loader.
        QuantityKind::new(
            wire.title.clone(),
            wire.title,
            wire.si_unit_name,
            wire.nominal_value,
            wire.units,
        )
    }
}
