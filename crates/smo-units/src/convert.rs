//! Conversions between units of one quantity kind.

use crate::{QuantityKind, UnitsResult};

/// `value` in `unit_name` expressed in the SI unit: `value * mult + offset`.
pub fn convert_to_canonical(value: f64, unit_name: &str, kind: &QuantityKind) -> UnitsResult<f64> {
    Ok(kind.unit(unit_name)?.to_canonical(value))
}

/// SI value expressed in `unit_name`: `(canonical - offset) / mult`.
pub fn convert_from_canonical(
    canonical_value: f64,
    unit_name: &str,
    kind: &QuantityKind,
) -> UnitsResult<f64> {
    Ok(kind.unit(unit_name)?.from_canonical(canonical_value))
}

/// Unit-to-unit conversion through the SI unit.
pub fn convert(value: f64, from: &str, to: &str, kind: &QuantityKind) -> UnitsResult<f64> {
    let target = kind.unit(to)?;
    let canonical = convert_to_canonical(value, from, kind)?;
    Ok(target.from_canonical(canonical))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{UnitDefinition, UnitsError};
    use indexmap::IndexMap;

    fn temperature() -> QuantityKind {
        let mut units = IndexMap::new();
        units.insert("K".to_string(), UnitDefinition::CANONICAL);
        units.insert("degC".to_string(), UnitDefinition::new(1.0, 273.15).unwrap());
        units.insert(
            "degF".to_string(),
            UnitDefinition::new(5.0 / 9.0, 459.67 * 5.0 / 9.0).unwrap(),
        );
        QuantityKind::new("Temperature", "temperature", "K", 300.0, units).unwrap()
    }

    #[test]
    fn offsets_apply_both_ways() {
        let kind = temperature();
        assert!((convert_to_canonical(100.0, "degC", &kind).unwrap() - 373.15).abs() < 1e-12);
        assert!((convert_from_canonical(373.15, "degC", &kind).unwrap() - 100.0).abs() < 1e-12);
        assert!((convert(212.0, "degF", "degC", &kind).unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_unit_fails() {
        let kind = temperature();
        assert!(matches!(
            convert_to_canonical(5.0, "parsecs", &kind),
            Err(UnitsError::UnknownUnit { .. })
        ));
        assert!(matches!(
            convert(5.0, "K", "parsecs", &kind),
            Err(UnitsError::UnknownUnit { .. })
        ));
    }
}
