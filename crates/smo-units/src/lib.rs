//! Unit-aware quantity model.
//!
//! A physical value is stored once, in the SI unit of its quantity kind
//! (the *canonical* value), and shown in any unit the kind defines. Unit
//! tables come from a [`UnitCatalog`] that the caller constructs and passes
//! around; there is no process-wide table.
//!
//! - [`UnitDefinition`]: multiplier + offset relative to the SI unit
//! - [`QuantityKind`]: a named unit table with its SI unit
//! - [`UnitCatalog`]: all kinds known to a form, loaded from server JSON or
//!   built from `uom`
//! - [`QuantityValue`]: an editable field (canonical value + display unit)
//! - [`UnitConverter`]: the all-units converter panel

pub mod catalog;
pub mod convert;
pub mod converter;
pub mod error;
pub mod input;
pub mod kind;
pub mod unit;
pub mod value;

pub use catalog::UnitCatalog;
pub use convert::{convert, convert_from_canonical, convert_to_canonical};
pub use converter::{ConverterRow, UnitConverter};
pub use error::{UnitsError, UnitsResult};
pub use input::parse_display_number;
pub use kind::{DIMENSIONLESS_UNIT, QuantityKind};
pub use smo_core::format_number;
pub use unit::UnitDefinition;
pub use value::{QuantityValue, ValueBounds};
