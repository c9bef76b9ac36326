//! Two-phase bootstrap sequencer.
//!
//! Dimension definitions are expressed partly in terms of their units,
//! while full unit definitions need dimension linkage — circular if both
//! were fully constructed before either is used. The sequencer breaks
//! the cycle:
//!
//! - **Phase 1** registers one placeholder (bootstrap) unit per unit
//!   name referenced by any dimension — name only, factor 1, offset 0,
//!   no dimension back-reference — then constructs every dimension
//!   against those ids.
//! - **Phase 2** applies the real unit metadata (factors, offsets,
//!   system tags, dimension linkage) onto the same ids, so every
//!   dimension reference atomically sees the final unit. It then
//!   resolves relationships, runs the closure engine, registers the
//!   quantity-type descriptors, and seals the registry.
//!
//! The phase order is enforced by explicit calls inside
//! [`Sequencer::initialize`], never by implicit field-init ordering. By
//! the time `initialize` returns, no bootstrap unit is reachable.

use std::collections::HashMap;

use log::{info, warn};
use once_cell::sync::OnceCell;

use crate::base::Exponents;
use crate::catalog::{Catalog, DimensionSpec};
use crate::closure::ClosureEngine;
use crate::dimension::{DimId, Dimension, FormDecl, OverloadConversion, OverloadDecl, VectorForm};
use crate::error::{Error, Result};
use crate::registry::{QuantityType, Registry};
use crate::relationship::{Relationship, RelationshipKind};
use crate::unit::{Unit, UnitId};

/// Name of the auto-registered dimensionless dimension. Reserved: a
/// catalog redefining it fails with a duplicate-dimension error.
pub const DIMENSIONLESS: &str = "Dimensionless";

/// Name of the synthetic unit of the dimensionless dimension.
pub const DIMENSIONLESS_UNIT: &str = "One";

const DIMENSIONLESS_TYPES: [(VectorForm, &str); 2] = [
    (VectorForm::Magnitude, "Ratio"),
    (VectorForm::Scalar, "SignedRatio"),
];

/// The bootstrap sequencer. Stateless; both phases run inside
/// [`Sequencer::initialize`].
pub struct Sequencer;

impl Sequencer {
    /// Builds a sealed registry from a catalog.
    ///
    /// Runs structural validation, phase 1, and phase 2 in order and
    /// never exposes a partially-built registry.
    pub fn initialize(catalog: &Catalog) -> Result<Registry> {
        catalog.validate()?;
        let mut registry = Self::phase_one(catalog)?;
        Self::phase_two(&mut registry, catalog)?;
        info!(
            "registry sealed: {} dimension(s), {} unit(s), {} derived operator(s)",
            registry.dimensions.len(),
            registry.units.len(),
            registry.operators.len(),
        );
        Ok(registry)
    }

    /// Phase 1: bootstrap units and dimensions.
    fn phase_one(catalog: &Catalog) -> Result<Registry> {
        let mut registry = Registry::default();
        Self::add_dimensionless(&mut registry)?;

        // Which dimension first referenced each unit; a unit cannot
        // belong to two dimensions. The synthetic dimensionless unit is
        // claimed up front.
        let mut claimed: HashMap<String, String> = HashMap::new();
        claimed.insert(DIMENSIONLESS_UNIT.to_owned(), DIMENSIONLESS.to_owned());
        for spec in &catalog.dimensions {
            let id = DimId(registry.dimensions.len() as u32);
            if registry.dim_by_name.insert(spec.name.clone(), id).is_some() {
                return Err(Error::DuplicateDimension(spec.name.clone()));
            }
            let mut units = Vec::with_capacity(spec.available_units.len());
            for unit_name in &spec.available_units {
                if let Some(owner) = claimed.get(unit_name) {
                    if owner != &spec.name {
                        return Err(Error::DuplicateUnit(unit_name.clone()));
                    }
                }
                claimed.insert(unit_name.clone(), spec.name.clone());
                units.push(Self::bootstrap_unit(&mut registry, unit_name)?);
            }
            registry.dimensions.push(Dimension {
                id,
                name: spec.name.clone(),
                symbol: spec.symbol.clone(),
                exponents: exponents_of(spec),
                forms: forms_of(spec)?,
                units,
            });
        }
        info!(
            "bootstrap phase 1: {} dimension(s) over {} placeholder unit(s)",
            registry.dimensions.len(),
            registry.units.len(),
        );
        Ok(registry)
    }

    /// Phase 2: real unit metadata, dimension linkage, closure, types.
    fn phase_two(registry: &mut Registry, catalog: &Catalog) -> Result<()> {
        // Dimension back-references onto the ids fixed in phase 1.
        for dim in &registry.dimensions {
            for &unit_id in &dim.units {
                registry.units[unit_id.index()].dimension = Some(dim.id);
            }
        }

        // Replace each placeholder in place: the id (and with it every
        // dimension's unit list) is untouched.
        for spec in &catalog.units {
            match registry.unit_by_name.get(&spec.name).copied() {
                Some(id) => {
                    let unit = &mut registry.units[id.index()];
                    unit.symbol = spec.symbol.clone();
                    unit.system = spec.system.clone();
                    unit.to_base_factor = spec.to_base_factor;
                    unit.to_base_offset = spec.to_base_offset;
                    unit.bootstrap = false;
                }
                None => {
                    warn!("unit metadata `{}` is not referenced by any dimension", spec.name);
                    let id = UnitId(registry.units.len() as u32);
                    registry.unit_by_name.insert(spec.name.clone(), id);
                    registry.units.push(Unit {
                        id,
                        name: spec.name.clone(),
                        symbol: spec.symbol.clone(),
                        system: spec.system.clone(),
                        to_base_factor: spec.to_base_factor,
                        to_base_offset: spec.to_base_offset,
                        dimension: None,
                        bootstrap: false,
                    });
                }
            }
        }

        // Any unit still flagged bootstrap has no metadata.
        for unit in &registry.units {
            if unit.bootstrap {
                let dimension = unit
                    .dimension
                    .map(|id| registry.dimensions[id.index()].name.clone())
                    .unwrap_or_default();
                return Err(Error::UnknownUnit {
                    dimension,
                    name: unit.name.clone(),
                });
            }
        }

        // The first declared unit of every dimension is its base unit.
        for dim in &registry.dimensions {
            if let Some(base) = dim.base_unit() {
                let unit = &registry.units[base.index()];
                if unit.to_base_factor != 1.0 || unit.to_base_offset != 0.0 {
                    return Err(Error::NonCanonicalBaseUnit {
                        dimension: dim.name.clone(),
                        unit: unit.name.clone(),
                        factor: unit.to_base_factor,
                        offset: unit.to_base_offset,
                    });
                }
            }
        }

        registry.relationships = resolve_relationships(registry, catalog)?;
        registry.operators = ClosureEngine::new(&registry.dimensions).derive(&registry.relationships)?;
        register_types(registry)?;
        info!(
            "bootstrap phase 2: {} unit(s) finalized, {} quantity type(s) registered",
            registry.units.len(),
            registry.types.len(),
        );
        Ok(())
    }

    fn add_dimensionless(registry: &mut Registry) -> Result<()> {
        let id = DimId(0);
        registry.dim_by_name.insert(DIMENSIONLESS.to_owned(), id);
        let unit = Self::bootstrap_unit(registry, DIMENSIONLESS_UNIT)?;
        {
            // The synthetic unit never appears in unit metadata, so it is
            // finalized here rather than in phase 2.
            let one = &mut registry.units[unit.index()];
            one.symbol = String::new();
            one.dimension = Some(id);
            one.bootstrap = false;
        }
        registry.dimensions.push(Dimension {
            id,
            name: DIMENSIONLESS.to_owned(),
            symbol: "1".to_owned(),
            exponents: Exponents::DIMENSIONLESS,
            forms: DIMENSIONLESS_TYPES
                .iter()
                .map(|&(form, type_name)| FormDecl {
                    form,
                    type_name: type_name.to_owned(),
                    overloads: Vec::new(),
                })
                .collect(),
            units: vec![unit],
        });
        Ok(())
    }

    fn bootstrap_unit(registry: &mut Registry, name: &str) -> Result<UnitId> {
        if let Some(&id) = registry.unit_by_name.get(name) {
            return Ok(id);
        }
        let id = UnitId(registry.units.len() as u32);
        registry.unit_by_name.insert(name.to_owned(), id);
        registry.units.push(Unit {
            id,
            name: name.to_owned(),
            symbol: name.to_owned(),
            system: String::new(),
            to_base_factor: 1.0,
            to_base_offset: 0.0,
            dimension: None,
            bootstrap: true,
        });
        Ok(id)
    }
}

fn exponents_of(spec: &DimensionSpec) -> Exponents {
    let mut exponents = Exponents::DIMENSIONLESS;
    for (&quantity, &exponent) in &spec.exponents {
        exponents = exponents.with(quantity, exponent);
    }
    exponents
}

fn forms_of(spec: &DimensionSpec) -> Result<Vec<FormDecl>> {
    spec.vector_forms
        .iter()
        .map(|form| {
            // Already range-checked by catalog validation.
            let index = VectorForm::from_index(form.form).ok_or(Error::InvalidForm {
                dimension: spec.name.clone(),
                form: form.form,
            })?;
            Ok(FormDecl {
                form: index,
                type_name: form.base_type_name.clone(),
                overloads: form
                    .overloads
                    .iter()
                    .map(|overload| OverloadDecl {
                        name: overload.name.clone(),
                        description: overload.description.clone(),
                        conversions: overload
                            .relationships
                            .iter()
                            .map(|(target, conversion)| OverloadConversion {
                                target: target.clone(),
                                to_expr: conversion.to.clone(),
                                from_expr: conversion.from.clone(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
        })
        .collect()
}

fn resolve_relationships(registry: &Registry, catalog: &Catalog) -> Result<Vec<Relationship>> {
    let mut relationships = Vec::new();
    for spec in &catalog.dimensions {
        let left = registry.dim_by_name[&spec.name];
        let groups = [
            (RelationshipKind::Integral, &spec.integrals),
            (RelationshipKind::Derivative, &spec.derivatives),
            (RelationshipKind::DotProduct, &spec.dot_products),
            (RelationshipKind::CrossProduct, &spec.cross_products),
        ];
        for (kind, edges) in groups {
            for edge in edges {
                let resolve = |name: &str| -> Result<DimId> {
                    registry.dim_by_name.get(name).copied().ok_or_else(|| {
                        Error::UnknownDimension {
                            dimension: spec.name.clone(),
                            name: name.to_owned(),
                            kind: kind.to_string(),
                        }
                    })
                };
                relationships.push(Relationship {
                    kind,
                    left,
                    other: resolve(&edge.other)?,
                    result: resolve(&edge.result)?,
                });
            }
        }
    }
    Ok(relationships)
}

fn register_types(registry: &mut Registry) -> Result<()> {
    let mut types = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut claim = |name: &str, dimension: &str, entry: QuantityType| -> Result<()> {
        if by_name.insert(name.to_owned(), types.len()).is_some() {
            return Err(Error::DuplicateTypeName {
                name: name.to_owned(),
                dimension: dimension.to_owned(),
            });
        }
        types.push(entry);
        Ok(())
    };
    for dim in &registry.dimensions {
        for decl in &dim.forms {
            claim(
                &decl.type_name,
                &dim.name,
                QuantityType {
                    name: decl.type_name.clone(),
                    dim: dim.id,
                    form: decl.form,
                    overload_of: None,
                },
            )?;
            for overload in &decl.overloads {
                claim(
                    &overload.name,
                    &dim.name,
                    QuantityType {
                        name: overload.name.clone(),
                        dim: dim.id,
                        form: decl.form,
                        overload_of: Some(decl.type_name.clone()),
                    },
                )?;
            }
        }
    }
    registry.types = types;
    registry.type_by_name = by_name;
    Ok(())
}

static GLOBAL: OnceCell<Registry> = OnceCell::new();

/// Installs a catalog as the process-global registry.
///
/// The first successful install wins; later calls return the existing
/// registry. Operator sugar on [`crate::Quantity`] reads this registry.
pub fn install(catalog: &Catalog) -> Result<&'static Registry> {
    GLOBAL.get_or_try_init(|| Sequencer::initialize(catalog))
}

/// The installed global registry, or [`Error::Uninitialized`].
pub fn global() -> Result<&'static Registry> {
    GLOBAL.get().ok_or(Error::Uninitialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UnitSpec;
    use approx::assert_abs_diff_eq;

    fn kinematics_catalog() -> Catalog {
        Catalog::from_json_str(
            r#"{
                "dimensions": [
                    {
                        "name": "Length", "symbol": "L",
                        "exponents": { "Length": 1 },
                        "vectorForms": [
                            { "form": 0, "baseTypeName": "Distance" },
                            { "form": 1, "baseTypeName": "Displacement" },
                            { "form": 3, "baseTypeName": "Displacement3D" }
                        ],
                        "derivatives": [ { "other": "Time", "result": "Velocity" } ],
                        "availableUnits": ["Meter", "Kilometer"]
                    },
                    {
                        "name": "Time", "symbol": "T",
                        "exponents": { "Time": 1 },
                        "vectorForms": [
                            { "form": 0, "baseTypeName": "Duration" },
                            { "form": 1, "baseTypeName": "TimeDelta" }
                        ],
                        "availableUnits": ["Second", "Hour"]
                    },
                    {
                        "name": "Velocity", "symbol": "v",
                        "exponents": { "Length": 1, "Time": -1 },
                        "vectorForms": [
                            { "form": 0, "baseTypeName": "Speed" },
                            { "form": 1, "baseTypeName": "SignedSpeed" },
                            { "form": 3, "baseTypeName": "Velocity3D" }
                        ],
                        "integrals": [ { "other": "Time", "result": "Length" } ],
                        "availableUnits": ["MeterPerSecond"]
                    }
                ],
                "units": [
                    { "name": "Meter", "symbol": "m", "toBaseFactor": 1.0 },
                    { "name": "Kilometer", "symbol": "km", "toBaseFactor": 1000.0 },
                    { "name": "Second", "symbol": "s", "toBaseFactor": 1.0 },
                    { "name": "Hour", "symbol": "h", "toBaseFactor": 3600.0 },
                    { "name": "MeterPerSecond", "symbol": "m/s", "toBaseFactor": 1.0 }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn no_bootstrap_unit_survives() {
        let registry = Sequencer::initialize(&kinematics_catalog()).unwrap();
        for dim in registry.dimensions() {
            for &unit_id in dim.units() {
                let unit = registry.unit_by_id(unit_id);
                assert!(!unit.is_bootstrap(), "unit `{}` still bootstrap", unit.name());
                assert_eq!(unit.dimension(), Some(dim.id()));
            }
        }
    }

    #[test]
    fn replacement_preserves_unit_ids() {
        let registry = Sequencer::initialize(&kinematics_catalog()).unwrap();
        let km = registry.unit("Kilometer").unwrap();
        let length = registry.dimension("Length").unwrap();
        assert!(length.units().contains(&km.id()));
        assert_abs_diff_eq!(km.to_base_factor(), 1000.0);
    }

    #[test]
    fn missing_unit_metadata_fails() {
        let mut catalog = kinematics_catalog();
        catalog.units.retain(|unit| unit.name != "Hour");
        let err = Sequencer::initialize(&catalog).unwrap_err();
        match err {
            Error::UnknownUnit { dimension, name } => {
                assert_eq!(dimension, "Time");
                assert_eq!(name, "Hour");
            }
            other => panic!("expected UnknownUnit, got {other}"),
        }
    }

    #[test]
    fn non_canonical_base_unit_fails() {
        let mut catalog = kinematics_catalog();
        // Swap so Kilometer (factor 1000) comes first.
        catalog.dimensions[0].available_units.swap(0, 1);
        let err = Sequencer::initialize(&catalog).unwrap_err();
        assert!(matches!(
            err,
            Error::NonCanonicalBaseUnit { unit, .. } if unit == "Kilometer"
        ));
    }

    #[test]
    fn unit_shared_by_two_dimensions_fails() {
        let mut catalog = kinematics_catalog();
        catalog.dimensions[2].available_units.push("Second".to_owned());
        let err = Sequencer::initialize(&catalog).unwrap_err();
        assert!(matches!(err, Error::DuplicateUnit(name) if name == "Second"));
    }

    #[test]
    fn unknown_relationship_dimension_fails() {
        let mut catalog = kinematics_catalog();
        catalog.dimensions[2].integrals[0].result = "Momentum".to_owned();
        let err = Sequencer::initialize(&catalog).unwrap_err();
        match err {
            Error::UnknownDimension { dimension, name, kind } => {
                assert_eq!(dimension, "Velocity");
                assert_eq!(name, "Momentum");
                assert_eq!(kind, "integral");
            }
            other => panic!("expected UnknownDimension, got {other}"),
        }
    }

    #[test]
    fn unreferenced_unit_metadata_is_kept_unattached() {
        let mut catalog = kinematics_catalog();
        catalog.units.push(UnitSpec {
            name: "Furlong".to_owned(),
            symbol: "fur".to_owned(),
            system: "Imperial".to_owned(),
            to_base_factor: 201.168,
            to_base_offset: 0.0,
        });
        let registry = Sequencer::initialize(&catalog).unwrap();
        let furlong = registry.unit("Furlong").unwrap();
        assert!(!furlong.is_bootstrap());
        assert_eq!(furlong.dimension(), None);
    }

    #[test]
    fn dimensionless_is_auto_registered() {
        let registry = Sequencer::initialize(&kinematics_catalog()).unwrap();
        let dimensionless = registry.dimension(DIMENSIONLESS).unwrap();
        assert!(dimensionless.exponents().is_dimensionless());
        assert!(dimensionless.declares(VectorForm::Magnitude));
        assert!(dimensionless.declares(VectorForm::Scalar));
        assert_eq!(registry.quantity_type("Ratio").unwrap().dim, dimensionless.id());
    }

    #[test]
    fn quantity_types_cover_forms_and_overloads() {
        let registry = Sequencer::initialize(&kinematics_catalog()).unwrap();
        let speed = registry.quantity_type("Speed").unwrap();
        assert_eq!(speed.form, VectorForm::Magnitude);
        assert_eq!(speed.overload_of, None);
        assert!(registry.quantity_type("Velocity3D").is_some());
        assert!(registry.quantity_type("Warp").is_none());
    }

    #[test]
    fn consistent_double_declaration_converges() {
        // Length/Time=Velocity and Velocity*Time=Length are both declared;
        // the derived sets coincide entry for entry.
        let registry = Sequencer::initialize(&kinematics_catalog()).unwrap();
        let again = Sequencer::initialize(&kinematics_catalog()).unwrap();
        assert_eq!(registry.operators(), again.operators());
        assert!(!registry.operators().is_empty());
    }
}
