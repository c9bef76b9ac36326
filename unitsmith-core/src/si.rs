//! Builtin SI catalog.
//!
//! A ready-to-install catalog covering the seven base dimensions plus the
//! common mechanical derived dimensions, with vector forms on the
//! kinematic ones. Serves as the default metadata set and as the fixture
//! for the integration tests; domain-specific catalogs are loaded through
//! [`Catalog::from_json_str`] or [`Catalog::from_toml_str`] instead.

use std::collections::BTreeMap;

use crate::base::BaseQuantity;
use crate::bootstrap;
use crate::catalog::{
    Catalog, ConversionSpec, DimensionSpec, FormSpec, OverloadSpec, RelationSpec, UnitSpec,
};
use crate::error::Result;
use crate::registry::Registry;

/// Installs the builtin catalog as the global registry. Idempotent: after
/// the first call every later call returns the same registry.
pub fn install() -> Result<&'static Registry> {
    bootstrap::install(&catalog())
}

/// The builtin SI catalog.
pub fn catalog() -> Catalog {
    Catalog {
        dimensions: dimensions(),
        units: units(),
    }
}

fn dimensions() -> Vec<DimensionSpec> {
    let mut length = dim("Length", "L", &[(BaseQuantity::Length, 1)]);
    length.vector_forms = vec![
        distance_form(),
        form(1, "Displacement"),
        form(2, "Displacement2D"),
        form(3, "Displacement3D"),
    ];
    length.integrals = vec![relation("Length", "Area")];
    length.derivatives = vec![relation("Time", "Velocity")];
    length.dot_products = vec![relation("Length", "Area")];
    length.cross_products = vec![relation("Length", "Area")];
    length.available_units = names(&["Meter", "Kilometer", "Centimeter", "Millimeter", "Mile"]);

    let mut mass = dim("Mass", "M", &[(BaseQuantity::Mass, 1)]);
    mass.vector_forms = vec![form(0, "Mass")];
    mass.available_units = names(&["Kilogram", "Gram", "Tonne", "Pound"]);

    let mut time = dim("Time", "T", &[(BaseQuantity::Time, 1)]);
    time.vector_forms = vec![form(0, "Duration"), form(1, "TimeDelta")];
    time.available_units = names(&["Second", "Millisecond", "Minute", "Hour", "Day"]);

    let mut current = dim("Current", "I", &[(BaseQuantity::Current, 1)]);
    current.vector_forms = vec![form(0, "Amperage")];
    current.available_units = names(&["Ampere", "Milliampere"]);

    let mut temperature = dim("Temperature", "Θ", &[(BaseQuantity::Temperature, 1)]);
    temperature.vector_forms = vec![form(0, "Temperature")];
    temperature.available_units = names(&["Kelvin", "Celsius", "Fahrenheit"]);

    let mut amount = dim("AmountOfSubstance", "N", &[(BaseQuantity::AmountOfSubstance, 1)]);
    amount.vector_forms = vec![form(0, "Amount")];
    amount.available_units = names(&["Mole", "Millimole"]);

    let mut luminous = dim("LuminousIntensity", "J", &[(BaseQuantity::LuminousIntensity, 1)]);
    luminous.vector_forms = vec![form(0, "LuminousIntensity")];
    luminous.available_units = names(&["Candela"]);

    let mut area = dim("Area", "A", &[(BaseQuantity::Length, 2)]);
    area.vector_forms = vec![form(0, "Area"), form(3, "AreaVector")];
    area.available_units = names(&["SquareMeter", "Hectare", "SquareKilometer"]);

    let mut volume = dim("Volume", "V", &[(BaseQuantity::Length, 3)]);
    volume.vector_forms = vec![form(0, "Volume")];
    volume.available_units = names(&["CubicMeter", "Liter"]);

    let mut velocity = dim(
        "Velocity",
        "v",
        &[(BaseQuantity::Length, 1), (BaseQuantity::Time, -1)],
    );
    velocity.vector_forms = vec![
        form(0, "Speed"),
        form(1, "SignedSpeed"),
        form(2, "Velocity2D"),
        form(3, "Velocity3D"),
    ];
    // Redundant with Length's derivative edge; the closure converges on
    // the same operator set either way.
    velocity.integrals = vec![relation("Time", "Length")];
    velocity.available_units = names(&["MeterPerSecond", "KilometerPerHour", "Knot"]);

    let mut acceleration = dim(
        "Acceleration",
        "a",
        &[(BaseQuantity::Length, 1), (BaseQuantity::Time, -2)],
    );
    acceleration.vector_forms = vec![form(0, "Acceleration"), form(3, "Acceleration3D")];
    acceleration.integrals = vec![relation("Time", "Velocity"), relation("Mass", "Force")];
    acceleration.available_units = names(&["MeterPerSecondSquared", "StandardGravity"]);

    let mut force = dim(
        "Force",
        "F",
        &[
            (BaseQuantity::Mass, 1),
            (BaseQuantity::Length, 1),
            (BaseQuantity::Time, -2),
        ],
    );
    force.vector_forms = vec![form(0, "Force"), form(3, "Force3D")];
    force.integrals = vec![relation("Length", "Energy")];
    force.dot_products = vec![relation("Length", "Energy")];
    force.available_units = names(&["Newton", "Kilonewton"]);

    let mut energy = dim(
        "Energy",
        "E",
        &[
            (BaseQuantity::Mass, 1),
            (BaseQuantity::Length, 2),
            (BaseQuantity::Time, -2),
        ],
    );
    energy.vector_forms = vec![form(0, "Energy")];
    energy.derivatives = vec![relation("Time", "Power")];
    energy.available_units = names(&["Joule", "Kilojoule", "KilowattHour", "Calorie"]);

    let mut power = dim(
        "Power",
        "P",
        &[
            (BaseQuantity::Mass, 1),
            (BaseQuantity::Length, 2),
            (BaseQuantity::Time, -3),
        ],
    );
    power.vector_forms = vec![form(0, "Power")];
    power.available_units = names(&["Watt", "Kilowatt", "Horsepower"]);

    let mut frequency = dim("Frequency", "f", &[(BaseQuantity::Time, -1)]);
    frequency.vector_forms = vec![form(0, "Frequency")];
    frequency.integrals = vec![relation("Time", "Dimensionless")];
    frequency.available_units = names(&["Hertz", "Kilohertz"]);

    vec![
        length,
        mass,
        time,
        current,
        temperature,
        amount,
        luminous,
        area,
        volume,
        velocity,
        acceleration,
        force,
        energy,
        power,
        frequency,
    ]
}

fn units() -> Vec<UnitSpec> {
    vec![
        unit("Meter", "m", 1.0),
        unit("Kilometer", "km", 1000.0),
        unit("Centimeter", "cm", 0.01),
        unit("Millimeter", "mm", 0.001),
        unit("Mile", "mi", 1609.344),
        unit("Kilogram", "kg", 1.0),
        unit("Gram", "g", 0.001),
        unit("Tonne", "t", 1000.0),
        unit("Pound", "lb", 0.453_592_37),
        unit("Second", "s", 1.0),
        unit("Millisecond", "ms", 0.001),
        unit("Minute", "min", 60.0),
        unit("Hour", "h", 3600.0),
        unit("Day", "d", 86_400.0),
        unit("Ampere", "A", 1.0),
        unit("Milliampere", "mA", 0.001),
        unit("Kelvin", "K", 1.0),
        // v_K = v_C + 273.15
        unit_offset("Celsius", "°C", 1.0, 273.15),
        // v_K = (v_F + 459.67) * 5/9
        unit_offset("Fahrenheit", "°F", 5.0 / 9.0, 459.67 * 5.0 / 9.0),
        unit("Mole", "mol", 1.0),
        unit("Millimole", "mmol", 0.001),
        unit("Candela", "cd", 1.0),
        unit("SquareMeter", "m²", 1.0),
        unit("Hectare", "ha", 10_000.0),
        unit("SquareKilometer", "km²", 1.0e6),
        unit("CubicMeter", "m³", 1.0),
        unit("Liter", "L", 0.001),
        unit("MeterPerSecond", "m/s", 1.0),
        unit("KilometerPerHour", "km/h", 1.0 / 3.6),
        unit("Knot", "kn", 0.514_444),
        unit("MeterPerSecondSquared", "m/s²", 1.0),
        unit("StandardGravity", "g₀", 9.806_65),
        unit("Newton", "N", 1.0),
        unit("Kilonewton", "kN", 1000.0),
        unit("Joule", "J", 1.0),
        unit("Kilojoule", "kJ", 1000.0),
        unit("KilowattHour", "kWh", 3.6e6),
        unit("Calorie", "cal", 4.184),
        unit("Watt", "W", 1.0),
        unit("Kilowatt", "kW", 1000.0),
        unit("Horsepower", "hp", 745.699_871_582_270_2),
        unit("Hertz", "Hz", 1.0),
        unit("Kilohertz", "kHz", 1000.0),
    ]
}

/// Length's magnitude form carries the Radius/Diameter overload pair.
fn distance_form() -> FormSpec {
    let mut spec = form(0, "Distance");
    spec.overloads = vec![
        OverloadSpec {
            name: "Radius".to_owned(),
            description: "Distance from the center of a circle or sphere to its boundary."
                .to_owned(),
            relationships: BTreeMap::from([(
                "Diameter".to_owned(),
                ConversionSpec {
                    to: "value * 2.0".to_owned(),
                    from: "value / 2.0".to_owned(),
                },
            )]),
        },
        OverloadSpec {
            name: "Diameter".to_owned(),
            description: "Distance across a circle or sphere through its center.".to_owned(),
            relationships: BTreeMap::from([(
                "Radius".to_owned(),
                ConversionSpec {
                    to: "value / 2.0".to_owned(),
                    from: "value * 2.0".to_owned(),
                },
            )]),
        },
    ];
    spec
}

fn dim(name: &str, symbol: &str, exponents: &[(BaseQuantity, i8)]) -> DimensionSpec {
    DimensionSpec {
        name: name.to_owned(),
        symbol: symbol.to_owned(),
        exponents: exponents.iter().copied().collect(),
        vector_forms: Vec::new(),
        integrals: Vec::new(),
        derivatives: Vec::new(),
        dot_products: Vec::new(),
        cross_products: Vec::new(),
        available_units: Vec::new(),
    }
}

fn form(index: u8, base_type_name: &str) -> FormSpec {
    FormSpec {
        form: index,
        base_type_name: base_type_name.to_owned(),
        overloads: Vec::new(),
    }
}

fn relation(other: &str, result: &str) -> RelationSpec {
    RelationSpec {
        other: other.to_owned(),
        result: result.to_owned(),
    }
}

fn unit(name: &str, symbol: &str, to_base_factor: f64) -> UnitSpec {
    unit_offset(name, symbol, to_base_factor, 0.0)
}

fn unit_offset(name: &str, symbol: &str, to_base_factor: f64, to_base_offset: f64) -> UnitSpec {
    UnitSpec {
        name: name.to_owned(),
        symbol: symbol.to_owned(),
        system: "SI".to_owned(),
        to_base_factor,
        to_base_offset,
    }
}

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|&name| name.to_owned()).collect()
}
