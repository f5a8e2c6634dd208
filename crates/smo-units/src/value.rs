//! Editable quantity fields.

use std::sync::Arc;

use smo_core::format_number;

use crate::{QuantityKind, UnitsError, UnitsResult, parse_display_number};

/// Allowed range of a field, in canonical (SI) units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ValueBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ValueBounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// A quantity bound to a form field.
///
/// The canonical value is the source of truth. The display value is the same
/// quantity in the currently selected display unit and is recomputed whenever
/// either side changes through [`change_display_unit`](Self::change_display_unit)
/// or [`update_from_display`](Self::update_from_display).
///
/// Raw typed text lives separately in `input_text` and may disagree with the
/// display value until it validates.
#[derive(Debug, Clone)]
pub struct QuantityValue {
    kind: Arc<QuantityKind>,
    canonical_value: f64,
    display_unit_name: String,
    display_value: f64,
    bounds: ValueBounds,
    input_text: String,
    input_error: Option<String>,
}

impl QuantityValue {
    /// New field holding `canonical_value`, shown in the kind's SI unit.
    pub fn new(kind: Arc<QuantityKind>, canonical_value: f64) -> Self {
        let display_unit_name = kind.si_unit_name().to_string();
        Self {
            kind,
            canonical_value,
            display_unit_name,
            display_value: canonical_value,
            bounds: ValueBounds::unbounded(),
            input_text: format_number(canonical_value),
            input_error: None,
        }
    }

    /// New field from a value given in any unit of the kind, e.g. `(15.0, "degC")`.
    pub fn from_unit_value(kind: Arc<QuantityKind>, value: f64, unit_name: &str) -> UnitsResult<Self> {
        let canonical = kind.unit(unit_name)?.to_canonical(value);
        Ok(Self::new(kind, canonical))
    }

    /// New field at the kind's nominal value.
    pub fn nominal(kind: Arc<QuantityKind>) -> Self {
        let nominal = kind.nominal_value();
        Self::new(kind, nominal)
    }

    /// Builder: start in a preferred display unit.
    pub fn with_display_unit(mut self, unit_name: &str) -> UnitsResult<Self> {
        self.change_display_unit(unit_name)?;
        Ok(self)
    }

    /// Builder: attach canonical bounds checked by [`edit_text`](Self::edit_text).
    pub fn with_bounds(mut self, bounds: ValueBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn kind(&self) -> &Arc<QuantityKind> {
        &self.kind
    }

    pub fn canonical_value(&self) -> f64 {
        self.canonical_value
    }

    pub fn display_unit_name(&self) -> &str {
        &self.display_unit_name
    }

    pub fn display_value(&self) -> f64 {
        self.display_value
    }

    pub fn bounds(&self) -> ValueBounds {
        self.bounds
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    /// Message from the last rejected [`edit_text`](Self::edit_text), if any.
    pub fn input_error(&self) -> Option<&str> {
        self.input_error.as_deref()
    }

    /// Display value run through the number formatting policy.
    pub fn formatted_display(&self) -> String {
        format_number(self.display_value)
    }

    /// Switch the display unit. The canonical value does not move.
    ///
    /// Fails with [`UnitsError::UnknownUnit`] and leaves the field untouched
    /// if the unit is not defined for the kind.
    pub fn change_display_unit(&mut self, new_unit_name: &str) -> UnitsResult<()> {
        let display_value = self.kind.unit(new_unit_name)?.from_canonical(self.canonical_value);
        self.display_unit_name = new_unit_name.to_string();
        self.display_value = display_value;
        self.input_text = format_number(display_value);
        self.input_error = None;
        Ok(())
    }

    /// Set a new display value in the current display unit and recompute the
    /// canonical value. The display unit does not move.
    pub fn update_from_display(&mut self, new_display_value: f64) -> UnitsResult<()> {
        let canonical = self
            .kind
            .unit(&self.display_unit_name)?
            .to_canonical(new_display_value);
        self.display_value = new_display_value;
        self.canonical_value = canonical;
        Ok(())
    }

    /// Min/max expressed in the current display unit.
    pub fn display_bounds(&self) -> UnitsResult<(Option<f64>, Option<f64>)> {
        let unit = self.kind.unit(&self.display_unit_name)?;
        Ok((
            self.bounds.min.map(|v| unit.from_canonical(v)),
            self.bounds.max.map(|v| unit.from_canonical(v)),
        ))
    }

    /// Record text typed into the field and apply it if it validates.
    ///
    /// The text is always kept in `input_text`. Invalid numbers and values
    /// outside the bounds leave the canonical and display values as they were
    /// and are remembered in `input_error`. Returns `Ok(true)` when the
    /// canonical value changed.
    pub fn edit_text(&mut self, text: impl Into<String>) -> UnitsResult<bool> {
        self.input_text = text.into();
        match self.validate_input() {
            Ok(display_value) => {
                self.input_error = None;
                let before = self.canonical_value;
                self.update_from_display(display_value)?;
                Ok(self.canonical_value != before)
            }
            Err(err) => {
                self.input_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn validate_input(&self) -> UnitsResult<f64> {
        let value = parse_display_number(&self.input_text)?;
        let (min, max) = self.display_bounds()?;
        // Bounds are compared in display units; a negative multiplier swaps them.
        let (low, high) = match (min, max) {
            (Some(a), Some(b)) if a > b => (Some(b), Some(a)),
            other => other,
        };
        if let Some(min) = low {
            if value < min {
                return Err(UnitsError::BelowMinimum { value, min });
            }
        }
        if let Some(max) = high {
            if value > max {
                return Err(UnitsError::AboveMaximum { value, max });
            }
        }
        Ok(value)
    }
}
