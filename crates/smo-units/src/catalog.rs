//! Quantity-kind catalogs.
//!
//! The server hands out its unit tables as
//! `{kind: {title, nominalValue, SIUnit, units: {unit: {mult, offset?}}}}`.
//! [`UnitCatalog::from_json_str`] reads that format; [`UnitCatalog::builtin`]
//! builds an equivalent table from the `uom` SI definitions for offline use.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;
use uom::si::f64::{
    Energy, Length, Mass, MassRate, Power, Pressure, Ratio, ThermodynamicTemperature, Time,
    Velocity, Volume,
};

use crate::{
    DIMENSIONLESS_UNIT, QuantityKind, QuantityValue, UnitConverter, UnitDefinition, UnitsError,
    UnitsResult,
};

/// Build a unit table from `uom` units of one quantity.
///
/// Each unit is sampled at 0 and 1 in the SI unit, which yields the offset and
/// the multiplier. Uses `?`, so it only expands inside functions returning
/// `UnitsResult`.
macro_rules! uom_units {
    ($qty:ty, $module:ident :: $si:ident; $($label:literal => $unit:ident),+ $(,)?) => {{
        let mut units = IndexMap::new();
        $(
            let at_zero = <$qty>::new::<$module::$unit>(0.0).get::<$module::$si>();
            let at_one = <$qty>::new::<$module::$unit>(1.0).get::<$module::$si>();
            units.insert($label.to_string(), UnitDefinition::new(at_one - at_zero, at_zero)?);
        )+
        units
    }};
}

/// Named quantity kinds, in server order.
#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    kinds: IndexMap<String, Arc<QuantityKind>>,
}

impl UnitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the server catalog format.
    pub fn from_json_str(json: &str) -> UnitsResult<Self> {
        let raw: IndexMap<String, QuantityKind> = serde_json::from_str(json)?;
        Ok(Self::from_raw(raw))
    }

    /// Same as [`from_json_str`](Self::from_json_str) for an already decoded
    /// response payload.
    pub fn from_json_value(value: Value) -> UnitsResult<Self> {
        let raw: IndexMap<String, QuantityKind> = serde_json::from_value(value)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: IndexMap<String, QuantityKind>) -> Self {
        let mut catalog = Self::new();
        for (name, mut kind) in raw {
            kind.set_name(name);
            catalog.insert(kind);
        }
        debug!(kinds = catalog.len(), "loaded unit catalog");
        catalog
    }

    /// Add or replace a kind; returns the replaced one.
    pub fn insert(&mut self, kind: QuantityKind) -> Option<Arc<QuantityKind>> {
        self.kinds.insert(kind.name().to_string(), Arc::new(kind))
    }

    pub fn get(&self, name: &str) -> UnitsResult<Arc<QuantityKind>> {
        self.kinds
            .get(name)
            .cloned()
            .ok_or_else(|| UnitsError::UnknownKind {
                kind: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<QuantityKind>> {
        self.kinds.values()
    }

    /// New field of kind `name` holding `value` given in `unit_name`.
    pub fn quantity(&self, name: &str, value: f64, unit_name: &str) -> UnitsResult<QuantityValue> {
        QuantityValue::from_unit_value(self.get(name)?, value, unit_name)
    }

    /// One converter panel per kind that has real units (dimensionless kinds
    /// have nothing to convert).
    pub fn converters(&self) -> Vec<UnitConverter> {
        self.iter()
            .filter(|kind| !kind.is_dimensionless())
            .map(|kind| UnitConverter::new(Arc::clone(kind)))
            .collect()
    }

    /// Catalog derived from `uom` unit definitions.
    pub fn builtin() -> UnitsResult<Self> {
        use uom::si::{
            energy, length, mass, power, pressure, ratio, thermodynamic_temperature, time,
            velocity, volume,
        };

        let mut catalog = Self::new();

        catalog.insert(QuantityKind::new(
            "Length",
            "length",
            "m",
            1.0,
            uom_units!(Length, length::meter;
                "m" => meter, "mm" => millimeter, "cm" => centimeter, "km" => kilometer,
                "in" => inch, "ft" => foot),
        )?);

        catalog.insert(QuantityKind::new(
            "Mass",
            "mass",
            "kg",
            1.0,
            uom_units!(Mass, mass::kilogram;
                "kg" => kilogram, "g" => gram, "lb" => pound),
        )?);

        catalog.insert(QuantityKind::new(
            "Time",
            "time",
            "s",
            60.0,
            uom_units!(Time, time::second;
                "s" => second, "min" => minute, "h" => hour, "day" => day),
        )?);

        catalog.insert(QuantityKind::new(
            "Temperature",
            "temperature",
            "K",
            300.0,
            uom_units!(ThermodynamicTemperature, thermodynamic_temperature::kelvin;
                "K" => kelvin, "degC" => degree_celsius, "degF" => degree_fahrenheit,
                "degR" => degree_rankine),
        )?);

        catalog.insert(QuantityKind::new(
            "Pressure",
            "pressure",
            "Pa",
            1e5,
            uom_units!(Pressure, pressure::pascal;
                "Pa" => pascal, "kPa" => kilopascal, "MPa" => megapascal, "bar" => bar,
                "mbar" => millibar, "atm" => atmosphere, "psi" => pound_force_per_square_inch),
        )?);

        catalog.insert(QuantityKind::new(
            "Energy",
            "energy",
            "J",
            1e3,
            uom_units!(Energy, energy::joule;
                "J" => joule, "kJ" => kilojoule, "MJ" => megajoule, "kWh" => kilowatt_hour),
        )?);

        catalog.insert(QuantityKind::new(
            "Power",
            "power",
            "W",
            1e3,
            uom_units!(Power, power::watt;
                "W" => watt, "kW" => kilowatt, "MW" => megawatt, "hp" => horsepower),
        )?);

        catalog.insert(QuantityKind::new(
            "Velocity",
            "velocity",
            "m/s",
            1.0,
            uom_units!(Velocity, velocity::meter_per_second;
                "m/s" => meter_per_second, "km/h" => kilometer_per_hour,
                "mph" => mile_per_hour),
        )?);

        catalog.insert(QuantityKind::new(
            "Volume",
            "volume",
            "m**3",
            1.0,
            uom_units!(Volume, volume::cubic_meter;
                "m**3" => cubic_meter, "L" => liter, "cm**3" => cubic_centimeter),
        )?);

        catalog.insert(QuantityKind::new(
            "MassFlowRate",
            "mass flow rate",
            "kg/s",
            1.0,
            mass_flow_units()?,
        )?);

        catalog.insert(QuantityKind::new(
            "Dimensionless",
            "dimensionless",
            DIMENSIONLESS_UNIT,
            1.0,
            uom_units!(Ratio, ratio::ratio;
                "-" => ratio, "%" => percent),
        )?);

        Ok(catalog)
    }
}

/// Mass flow units are composed from mass and time units.
fn mass_flow_units() -> UnitsResult<IndexMap<String, UnitDefinition>> {
    use uom::si::{mass, mass_rate, time};

    let per = |m: Mass, t: Time| -> f64 {
        let rate: MassRate = m / t;
        rate.get::<mass_rate::kilogram_per_second>()
    };
    let kg = Mass::new::<mass::kilogram>(1.0);
    let g = Mass::new::<mass::gram>(1.0);

    let mut units = IndexMap::new();
    units.insert("kg/s".to_string(), UnitDefinition::CANONICAL);
    units.insert(
        "kg/min".to_string(),
        UnitDefinition::scaled(per(kg, Time::new::<time::minute>(1.0)))?,
    );
    units.insert(
        "kg/h".to_string(),
        UnitDefinition::scaled(per(kg, Time::new::<time::hour>(1.0)))?,
    );
    units.insert(
        "g/s".to_string(),
        UnitDefinition::scaled(per(g, Time::new::<time::second>(1.0)))?,
    );
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER_JSON: &str = r#"{
        "Temperature": {
            "title": "temperature",
            "nominalValue": 300,
            "SIUnit": "K",
            "units": {
                "K": {"mult": 1},
                "degC": {"mult": 1, "offset": 273.15},
                "degF": {"mult": 0.5555555555555556, "offset": 255.3722222222222}
            }
        },
        "Dimensionless": {
            "title": "dimensionless",
            "nominalValue": 1,
            "SIUnit": "-",
            "units": {"-": {"mult": 1}}
        }
    }"#;

    #[test]
    fn loads_server_format() {
        let catalog = UnitCatalog::from_json_str(SERVER_JSON).unwrap();
        assert_eq!(catalog.len(), 2);
        let temp = catalog.get("Temperature").unwrap();
        assert_eq!(temp.name(), "Temperature");
        assert_eq!(temp.title(), "temperature");
        assert_eq!(temp.nominal_value(), 300.0);
        assert_eq!(
            temp.unit_names().collect::<Vec<_>>(),
            vec!["K", "degC", "degF"]
        );
    }

    #[test]
    fn converters_skip_dimensionless() {
        let catalog = UnitCatalog::from_json_str(SERVER_JSON).unwrap();
        let converters = catalog.converters();
        assert_eq!(converters.len(), 1);
        assert_eq!(converters[0].kind().name(), "Temperature");
    }

    #[test]
    fn unknown_kind() {
        let catalog = UnitCatalog::from_json_str(SERVER_JSON).unwrap();
        assert!(matches!(
            catalog.get("Luminosity"),
            Err(UnitsError::UnknownKind { .. })
        ));
    }

    #[test]
    fn malformed_catalog_is_reported() {
        let bad = r#"{"Pressure": {"title": "p", "SIUnit": "Pa", "units": {"Pa": {"mult": 0}}}}"#;
        assert!(matches!(
            UnitCatalog::from_json_str(bad),
            Err(UnitsError::Catalog(_))
        ));
    }

    #[test]
    fn builtin_has_expected_factors() {
        let catalog = UnitCatalog::builtin().unwrap();
        let pressure = catalog.get("Pressure").unwrap();
        assert_eq!(pressure.unit("bar").unwrap().multiplier(), 1e5);
        assert_eq!(pressure.unit("Pa").unwrap(), &UnitDefinition::CANONICAL);

        let temp = catalog.get("Temperature").unwrap();
        let deg_c = temp.unit("degC").unwrap();
        assert!((deg_c.offset() - 273.15).abs() < 1e-9);
        assert!((deg_c.multiplier() - 1.0).abs() < 1e-9);

        let flow = catalog.get("MassFlowRate").unwrap();
        assert!((flow.unit("kg/h").unwrap().multiplier() - 1.0 / 3600.0).abs() < 1e-15);

        assert!(catalog.get("Dimensionless").unwrap().is_dimensionless());
    }

    #[test]
    fn quantity_shortcut() {
        let catalog = UnitCatalog::builtin().unwrap();
        let q = catalog.quantity("Temperature", 15.0, "degC").unwrap();
        assert!((q.canonical_value() - 288.15).abs() < 1e-9);
    }
}
