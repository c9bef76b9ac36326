//! Declarative metadata catalog: the serde model of dimension and unit
//! specifications, plus JSON/TOML loaders and structural validation.
//!
//! A catalog is the single input of the bootstrap sequencer. All checks
//! here are structural (names, factors, form indices); cross-references
//! between dimensions and units are resolved during bootstrap.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::base::BaseQuantity;
use crate::error::{Error, Result};

/// Conversion expressions between two sibling overloads.
///
/// Both expressions are over the variable `value`; the type emitter
/// validates and embeds them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversionSpec {
    /// Expression mapping this overload's `value` to the target.
    pub to: String,
    /// Expression mapping the target's `value` back to this overload.
    pub from: String,
}

/// A semantic overload declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OverloadSpec {
    /// Emitted type name.
    pub name: String,
    /// Doc text for the emitted type.
    #[serde(default)]
    pub description: String,
    /// Conversions keyed by sibling overload name.
    #[serde(default)]
    pub relationships: BTreeMap<String, ConversionSpec>,
}

/// One vector form declared by a dimension.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FormSpec {
    /// Form index, 0-4.
    pub form: u8,
    /// Base type name for this (dimension, form) pair.
    pub base_type_name: String,
    /// Semantic overloads wrapping the pair.
    #[serde(default)]
    pub overloads: Vec<OverloadSpec>,
}

/// One relationship edge declared by a dimension.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationSpec {
    /// The "Other" operand dimension.
    pub other: String,
    /// The result dimension.
    pub result: String,
}

/// Declarative specification of one dimension.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DimensionSpec {
    /// Dimension name, unique within the catalog.
    pub name: String,
    /// Short display symbol.
    pub symbol: String,
    /// Integer exponents over the base quantities; omitted keys are zero.
    #[serde(default)]
    pub exponents: BTreeMap<BaseQuantity, i8>,
    /// Declared vector forms.
    #[serde(default)]
    pub vector_forms: Vec<FormSpec>,
    /// `Self * Other = Result` edges.
    #[serde(default)]
    pub integrals: Vec<RelationSpec>,
    /// `Self / Other = Result` edges.
    #[serde(default)]
    pub derivatives: Vec<RelationSpec>,
    /// Dot-product edges.
    #[serde(default)]
    pub dot_products: Vec<RelationSpec>,
    /// Cross-product edges.
    #[serde(default)]
    pub cross_products: Vec<RelationSpec>,
    /// Unit names, base unit first.
    #[serde(default)]
    pub available_units: Vec<String>,
}

/// Declarative specification of one unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UnitSpec {
    /// Unit name, unique within the catalog.
    pub name: String,
    /// Printable symbol.
    pub symbol: String,
    /// Unit system tag; defaults to `SI`.
    #[serde(default = "default_system")]
    pub system: String,
    /// Multiplicative factor to the base unit. Must be nonzero.
    pub to_base_factor: f64,
    /// Additive offset to the base unit. Zero for all linear units.
    #[serde(default)]
    pub to_base_offset: f64,
}

fn default_system() -> String {
    "SI".to_owned()
}

/// The full declarative input of the bootstrap sequencer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Catalog {
    /// Dimension specifications.
    #[serde(default)]
    pub dimensions: Vec<DimensionSpec>,
    /// Unit specifications.
    #[serde(default)]
    pub units: Vec<UnitSpec>,
}

impl Catalog {
    /// Parses a JSON catalog, naming the offending path on failure.
    pub fn from_json_str(input: &str) -> Result<Catalog> {
        let mut deserializer = serde_json::Deserializer::from_str(input);
        let catalog: Catalog =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|err| Error::Json {
                path: err.path().to_string(),
                message: err.inner().to_string(),
            })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parses a TOML catalog.
    pub fn from_toml_str(input: &str) -> Result<Catalog> {
        let catalog: Catalog = toml::from_str(input).map_err(|err| Error::Toml(err.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Structural validation: duplicate names, zero factors, form
    /// indices, overload conversion targets. Fails fast before phase 1.
    pub fn validate(&self) -> Result<()> {
        let mut dim_names = HashSet::new();
        let mut type_names: BTreeMap<String, String> = BTreeMap::new();
        for dim in &self.dimensions {
            if !dim_names.insert(dim.name.as_str()) {
                return Err(Error::DuplicateDimension(dim.name.clone()));
            }
            let mut forms = HashSet::new();
            for form in &dim.vector_forms {
                if form.form > 4 {
                    return Err(Error::InvalidForm {
                        dimension: dim.name.clone(),
                        form: form.form,
                    });
                }
                if !forms.insert(form.form) {
                    return Err(Error::DuplicateForm {
                        dimension: dim.name.clone(),
                        form: form.form,
                    });
                }
                Self::claim_type_name(&mut type_names, &form.base_type_name, &dim.name)?;
                let siblings: HashSet<&str> =
                    form.overloads.iter().map(|o| o.name.as_str()).collect();
                for overload in &form.overloads {
                    Self::claim_type_name(&mut type_names, &overload.name, &dim.name)?;
                    for target in overload.relationships.keys() {
                        if !siblings.contains(target.as_str()) {
                            return Err(Error::UnknownOverloadTarget {
                                dimension: dim.name.clone(),
                                overload: overload.name.clone(),
                                target: target.clone(),
                            });
                        }
                    }
                }
            }
            if !dim.vector_forms.is_empty() && dim.available_units.is_empty() {
                return Err(Error::MissingUnits {
                    dimension: dim.name.clone(),
                });
            }
        }

        let mut unit_names = HashSet::new();
        for unit in &self.units {
            if !unit_names.insert(unit.name.as_str()) {
                return Err(Error::DuplicateUnit(unit.name.clone()));
            }
            if unit.to_base_factor == 0.0 {
                return Err(Error::ZeroConversionFactor(unit.name.clone()));
            }
        }
        Ok(())
    }

    fn claim_type_name(
        taken: &mut BTreeMap<String, String>,
        name: &str,
        dimension: &str,
    ) -> Result<()> {
        if taken.insert(name.to_owned(), dimension.to_owned()).is_some() {
            return Err(Error::DuplicateTypeName {
                name: name.to_owned(),
                dimension: dimension.to_owned(),
            });
        }
        Ok(())
    }
}
