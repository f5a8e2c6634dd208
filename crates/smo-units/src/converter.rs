//! All-units converter panel.
//!
//! One row per unit of a kind. Editing any row recomputes the canonical value
//! and rewrites every other row, so the panel always shows the same physical
//! quantity in all units at once.

use std::sync::Arc;

use smo_core::format_number;

use crate::{QuantityKind, UnitsError, UnitsResult, parse_display_number};

#[derive(Debug, Clone, PartialEq)]
pub struct ConverterRow {
    pub unit: String,
    pub value: f64,
    /// Text shown in the row's input; may be mid-edit.
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct UnitConverter {
    kind: Arc<QuantityKind>,
    canonical_value: f64,
    rows: Vec<ConverterRow>,
}

impl UnitConverter {
    /// Panel initialised at the kind's nominal value.
    pub fn new(kind: Arc<QuantityKind>) -> Self {
        let nominal = kind.nominal_value();
        Self::with_value(kind, nominal)
    }

    pub fn with_value(kind: Arc<QuantityKind>, canonical_value: f64) -> Self {
        let rows = kind
            .units()
            .iter()
            .map(|(unit, def)| {
                let value = def.from_canonical(canonical_value);
                ConverterRow {
                    unit: unit.clone(),
                    value,
                    text: format_number(value),
                }
            })
            .collect();
        Self {
            kind,
            canonical_value,
            rows,
        }
    }

    pub fn kind(&self) -> &Arc<QuantityKind> {
        &self.kind
    }

    pub fn canonical_value(&self) -> f64 {
        self.canonical_value
    }

    pub fn rows(&self) -> &[ConverterRow] {
        &self.rows
    }

    pub fn row_index(&self, unit_name: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.unit == unit_name)
    }

    /// Apply text typed into row `index`.
    ///
    /// The edited row keeps the text as typed; all other rows are rewritten
    /// from the new canonical value. Invalid text changes nothing.
    pub fn update_from_row(&mut self, index: usize, text: &str) -> UnitsResult<()> {
        let len = self.rows.len();
        let unit_name = match self.rows.get(index) {
            Some(row) => row.unit.clone(),
            None => return Err(UnitsError::RowOutOfRange { index, len }),
        };
        let value = parse_display_number(text)?;
        self.canonical_value = self.kind.unit(&unit_name)?.to_canonical(value);

        for (i, row) in self.rows.iter_mut().enumerate() {
            if i == index {
                row.value = value;
                row.text = text.to_string();
                continue;
            }
            let def = self.kind.unit(&row.unit)?;
            row.value = def.from_canonical(self.canonical_value);
            row.text = format_number(row.value);
        }
        Ok(())
    }

    /// Same as [`update_from_row`](Self::update_from_row), addressed by unit name.
    pub fn update_unit(&mut self, unit_name: &str, text: &str) -> UnitsResult<()> {
        let index = self
            .row_index(unit_name)
            .ok_or_else(|| UnitsError::UnknownUnit {
                unit: unit_name.to_string(),
                kind: self.kind.name().to_string(),
            })?;
        self.update_from_row(index, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UnitDefinition;
    use indexmap::IndexMap;

    fn pressure() -> Arc<QuantityKind> {
        let mut units = IndexMap::new();
        units.insert("Pa".to_string(), UnitDefinition::CANONICAL);
        units.insert("kPa".to_string(), UnitDefinition::scaled(1e3).unwrap());
        units.insert("bar".to_string(), UnitDefinition::scaled(1e5).unwrap());
        Arc::new(QuantityKind::new("Pressure", "pressure", "Pa", 1e5, units).unwrap())
    }

    #[test]
    fn rows_follow_nominal_value() {
        let conv = UnitConverter::new(pressure());
        let texts: Vec<_> = conv.rows().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["100000", "100", "1"]);
    }

    #[test]
    fn editing_a_row_rewrites_the_others() {
        let mut conv = UnitConverter::new(pressure());
        conv.update_unit("bar", "2.5").unwrap();
        assert_eq!(conv.canonical_value(), 2.5e5);
        assert_eq!(conv.rows()[0].text, "2.50000e+5");
        assert_eq!(conv.rows()[1].text, "250");
        assert_eq!(conv.rows()[2].text, "2.5");
    }

    #[test]
    fn edited_row_keeps_typed_text() {
        let mut conv = UnitConverter::new(pressure());
        conv.update_from_row(1, "1.50e2").unwrap();
        assert_eq!(conv.rows()[1].text, "1.50e2");
        assert_eq!(conv.rows()[2].text, "1.5");
    }

    #[test]
    fn invalid_input_changes_nothing() {
        let mut conv = UnitConverter::new(pressure());
        let before = conv.rows().to_vec();
        assert!(conv.update_from_row(0, "abc").is_err());
        assert!(matches!(
            conv.update_from_row(7, "1"),
            Err(UnitsError::RowOutOfRange { index: 7, len: 3 })
        ));
        assert_eq!(conv.rows(), before.as_slice());
        assert_eq!(conv.canonical_value(), 1e5);
    }
}
