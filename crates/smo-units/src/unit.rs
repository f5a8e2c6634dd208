use serde::{Deserialize, Serialize};
use smo_core::{Real, ensure_finite, ensure_nonzero};

use crate::UnitsResult;

/// Linear conversion from a unit to the SI unit of its kind:
/// `si = value * multiplier + offset`.
///
/// On the wire this is `{"mult": 1e5}` or `{"mult": 1, "offset": 273.15}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireUnitDefinition", into = "WireUnitDefinition")]
pub struct UnitDefinition {
    multiplier: Real,
    offset: Real,
}

impl UnitDefinition {
    /// The SI unit itself.
    pub const CANONICAL: Self = Self {
        multiplier: 1.0,
        offset: 0.0,
    };

    pub fn new(multiplier: Real, offset: Real) -> UnitsResult<Self> {
        let multiplier = ensure_nonzero(multiplier, "unit multiplier")?;
        let offset = ensure_finite(offset, "unit offset")?;
        Ok(Self { multiplier, offset })
    }

    /// Pure scale factor, no offset.
    pub fn scaled(multiplier: Real) -> UnitsResult<Self> {
        Self::new(multiplier, 0.0)
    }

    pub fn multiplier(&self) -> Real {
        self.multiplier
    }

    pub fn offset(&self) -> Real {
        self.offset
    }

    pub fn is_canonical(&self) -> bool {
        self.multiplier == 1.0 && self.offset == 0.0
    }

    #[inline]
    pub fn to_canonical(&self, value: Real) -> Real {
        value * self.multiplier + self.offset
    }

    #[inline]
    pub fn from_canonical(&self, canonical: Real) -> Real {
        (canonical - self.offset) / self.multiplier
    }
}

#[derive(Serialize, Deserialize)]
struct WireUnitDefinition {
    mult: Real,
    #[serde(default, skip_serializing_if = "is_zero")]
    offset: Real,
}

fn is_zero(v: &Real) -> bool {
    *v == 0.0
}

impl TryFrom<WireUnitDefinition> for UnitDefinition {
    type Error = crate::UnitsError;

    fn try_from(wire: WireUnitDefinition) -> Result<Self, Self::Error> {
        Self::new(wire.mult, wire.offset)
    }
}

impl From<UnitDefinition> for WireUnitDefinition {
    fn from(def: UnitDefinition) -> Self {
        Self {
            mult: def.multiplier,
            offset: def.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UnitsError;
    use smo_core::SmoError;

    #[test]
    fn zero_multiplier_rejected() {
        assert!(matches!(
            UnitDefinition::scaled(0.0),
            Err(UnitsError::Core(SmoError::Zero { .. }))
        ));
    }

    #[test]
    fn non_finite_multiplier_and_offset_rejected() {
        assert!(matches!(
            UnitDefinition::scaled(f64::NAN),
            Err(UnitsError::Core(SmoError::NonFinite { .. }))
        ));
        assert!(matches!(
            UnitDefinition::new(1.0, f64::INFINITY),
            Err(UnitsError::Core(SmoError::NonFinite { .. }))
        ));
    }

    #[test]
    fn celsius_like_definition() {
        let deg_c = UnitDefinition::new(1.0, 273.15).unwrap();
        assert_eq!(deg_c.to_canonical(0.0), 273.15);
        assert_eq!(deg_c.from_canonical(273.15), 0.0);
        assert!(!deg_c.is_canonical());
        assert!(UnitDefinition::CANONICAL.is_canonical());
    }

    #[test]
    fn wire_format_defaults_offset() {
        let def: UnitDefinition = serde_json::from_str(r#"{"mult": 100000}"#).unwrap();
        assert_eq!(def.multiplier(), 1e5);
        assert_eq!(def.offset(), 0.0);

        let json = serde_json::to_string(&def).unwrap();
        assert_eq!(json, r#"{"mult":100000.0}"#);
    }

    #[test]
    fn wire_format_rejects_zero_multiplier() {
        let res: Result<UnitDefinition, _> = serde_json::from_str(r#"{"mult": 0}"#);
        assert!(res.is_err());
    }
}
