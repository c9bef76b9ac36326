//! Registry-to-source rendering.
//!
//! One strongly-typed struct is emitted per declared (dimension, form)
//! pair and per semantic overload, with unit factories whose conversion
//! factors are inlined as literals, a `ZERO` const, and exactly the
//! operator impls assigned by the closure engine. Emitted arithmetic
//! constructs sibling types through struct literals, so every type's
//! fields stay private outside the generated module.

use log::debug;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;

use unitsmith_core::dimension::{Dimension, FormDecl, OverloadDecl};
use unitsmith_core::{Op, Registry, TypeRef, Unit, VectorForm};

use crate::error::{EmitError, Result};

/// Renders a sealed registry into Rust quantity definitions.
pub struct Emitter<'a> {
    registry: &'a Registry,
}

impl<'a> Emitter<'a> {
    /// Creates an emitter over a sealed registry.
    pub fn new(registry: &'a Registry) -> Emitter<'a> {
        Emitter { registry }
    }

    /// Emits the full set of quantity definitions as a token stream.
    pub fn emit(&self) -> Result<TokenStream> {
        let mut items = TokenStream::new();
        for dim in self.registry.dimensions() {
            for decl in dim.forms() {
                items.extend(self.emit_type(dim, decl)?);
                for overload in &decl.overloads {
                    items.extend(self.emit_overload(dim, decl, overload)?);
                }
            }
        }
        debug!(
            "emitted definitions for {} quantity type(s)",
            self.registry.quantity_types().len()
        );
        Ok(items)
    }

    /// Emits the definitions as source text.
    pub fn render(&self) -> Result<String> {
        Ok(self.emit()?.to_string())
    }

    /// One base type: struct, inherent impl, and its assigned operators.
    fn emit_type(&self, dim: &Dimension, decl: &FormDecl) -> Result<TokenStream> {
        let name = format_ident!("{}", decl.type_name);
        let fields = field_idents(decl.form);
        let doc = format!(
            "{} quantity of dimension `{}` ({}).",
            form_noun(decl.form),
            dim.name(),
            dim.exponents(),
        );

        let struct_def = quote! {
            #[doc = #doc]
            #[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
            pub struct #name {
                #( #fields: f64, )*
            }
        };

        let inherent = self.emit_inherent(dim, decl, &name, &fields);
        let arithmetic = self.emit_componentwise_ops(dim, decl, &name, &fields);
        let assigned = self.emit_assigned_ops(TypeRef::new(dim.id(), decl.form), &name, &fields);

        Ok(quote! {
            #struct_def
            #inherent
            #arithmetic
            #assigned
        })
    }

    /// Constructor, `ZERO`, accessors, unit factories, and the vector
    /// helpers (`magnitude`, `normalized`, `distance`).
    fn emit_inherent(
        &self,
        dim: &Dimension,
        decl: &FormDecl,
        name: &Ident,
        fields: &[Ident],
    ) -> TokenStream {
        let zero = quote! {
            /// The zero value.
            pub const ZERO: #name = #name { #( #fields: 0.0, )* };
        };

        let new = if decl.form == VectorForm::Magnitude {
            let message = format!("{} cannot be negative", decl.type_name);
            quote! {
                /// Builds a value in the base unit. Panics on a negative
                /// input: this type is a magnitude.
                pub fn new(value: f64) -> #name {
                    assert!(value >= 0.0, #message);
                    #name { value }
                }
            }
        } else {
            quote! {
                /// Builds a value in the base unit.
                pub fn new(#( #fields: f64 ),*) -> #name {
                    #name { #( #fields, )* }
                }
            }
        };

        let accessors = accessor_fns(decl.form, fields);

        let factories: Vec<TokenStream> = dim
            .units()
            .iter()
            .map(|&id| self.emit_unit_factory(self.registry.unit_by_id(id), name, fields, decl.form))
            .collect();

        let vector_helpers = if decl.form.is_vector() {
            self.emit_vector_helpers(dim, name, fields)
        } else {
            TokenStream::new()
        };

        quote! {
            impl #name {
                #zero
                #new
                #( #accessors )*
                #( #factories )*
                #vector_helpers
            }
        }
    }

    /// `from_<unit>` / `to_<unit>` with the conversion inlined.
    ///
    /// Magnitude factories carry the same non-negativity assertion as
    /// `new`, applied after the conversion to the base unit (an offset
    /// unit can map a positive input below zero).
    fn emit_unit_factory(
        &self,
        unit: &Unit,
        name: &Ident,
        fields: &[Ident],
        form: VectorForm,
    ) -> TokenStream {
        let snake = snake_case(unit.name());
        let from_fn = format_ident!("from_{snake}");
        let to_fn = format_ident!("to_{snake}");
        let factor = unit.to_base_factor();
        let offset = unit.to_base_offset();
        let from_doc = format!("Builds a value from `{}` ({}).", unit.name(), unit.symbol());
        let to_doc = format!("Value in `{}` ({}).", unit.name(), unit.symbol());
        if fields.len() == 1 {
            let build = if form == VectorForm::Magnitude {
                let message = format!("{name} cannot be negative");
                quote! {
                    let value = value * #factor + #offset;
                    assert!(value >= 0.0, #message);
                    #name { value }
                }
            } else {
                quote! { #name { value: value * #factor + #offset } }
            };
            quote! {
                #[doc = #from_doc]
                pub fn #from_fn(value: f64) -> #name {
                    #build
                }

                #[doc = #to_doc]
                pub fn #to_fn(&self) -> f64 {
                    (self.value - #offset) / #factor
                }
            }
        } else {
            let count = fields.len();
            quote! {
                #[doc = #from_doc]
                pub fn #from_fn(#( #fields: f64 ),*) -> #name {
                    #name { #( #fields: #fields * #factor + #offset, )* }
                }

                #[doc = #to_doc]
                pub fn #to_fn(&self) -> [f64; #count] {
                    [ #( (self.#fields - #offset) / #factor ),* ]
                }
            }
        }
    }

    /// `length_squared`, `normalized`, and (when the dimension declares a
    /// magnitude form) `magnitude` and `distance`.
    fn emit_vector_helpers(&self, dim: &Dimension, name: &Ident, fields: &[Ident]) -> TokenStream {
        let squares = quote! { #( self.#fields * self.#fields )+* };
        let mut helpers = quote! {
            /// Sum of squared components, as a raw number.
            pub fn length_squared(&self) -> f64 {
                #squares
            }

            /// Same direction, norm 1. The zero vector normalizes to
            /// itself.
            pub fn normalized(&self) -> #name {
                let norm = self.length_squared().sqrt();
                if norm == 0.0 {
                    *self
                } else {
                    #name { #( #fields: self.#fields / norm, )* }
                }
            }
        };
        if let Some(magnitude) = dim.form(VectorForm::Magnitude) {
            let magnitude_ty = format_ident!("{}", magnitude.type_name);
            let magnitude_doc = format!("Euclidean norm, as a [`{}`].", magnitude.type_name);
            helpers.extend(quote! {
                #[doc = #magnitude_doc]
                pub fn magnitude(&self) -> #magnitude_ty {
                    #magnitude_ty { value: self.length_squared().sqrt() }
                }

                /// Distance to another value: magnitude of the difference.
                pub fn distance(&self, other: #name) -> #magnitude_ty {
                    (*self - other).magnitude()
                }

                /// Squared distance to another value, as a raw number.
                pub fn distance_squared(&self, other: #name) -> f64 {
                    (*self - other).length_squared()
                }
            });
        }
        helpers
    }

    /// Same-type Add/Sub/Neg and raw `f64` scaling. Subtraction of two
    /// magnitudes produces the signed sibling and is only emitted when
    /// the dimension declares form 1.
    fn emit_componentwise_ops(
        &self,
        dim: &Dimension,
        decl: &FormDecl,
        name: &Ident,
        fields: &[Ident],
    ) -> TokenStream {
        let sub = if decl.form == VectorForm::Magnitude {
            match dim.form(VectorForm::Scalar) {
                Some(sibling) => {
                    let out = format_ident!("{}", sibling.type_name);
                    quote! {
                        impl core::ops::Sub for #name {
                            type Output = #out;

                            fn sub(self, rhs: #name) -> #out {
                                #out { value: self.value - rhs.value }
                            }
                        }
                    }
                }
                // No signed sibling: the difference could be negative,
                // so no subtraction is emitted at all.
                None => TokenStream::new(),
            }
        } else {
            quote! {
                impl core::ops::Sub for #name {
                    type Output = #name;

                    fn sub(self, rhs: #name) -> #name {
                        #name { #( #fields: self.#fields - rhs.#fields, )* }
                    }
                }

                impl core::ops::Neg for #name {
                    type Output = #name;

                    fn neg(self) -> #name {
                        #name { #( #fields: -self.#fields, )* }
                    }
                }
            }
        };

        quote! {
            impl core::ops::Add for #name {
                type Output = #name;

                fn add(self, rhs: #name) -> #name {
                    #name { #( #fields: self.#fields + rhs.#fields, )* }
                }
            }

            #sub

            impl core::ops::Mul<f64> for #name {
                type Output = #name;

                fn mul(self, rhs: f64) -> #name {
                    #name { #( #fields: self.#fields * rhs, )* }
                }
            }

            impl core::ops::Mul<#name> for f64 {
                type Output = #name;

                fn mul(self, rhs: #name) -> #name {
                    rhs * self
                }
            }

            impl core::ops::Div<f64> for #name {
                type Output = #name;

                fn div(self, rhs: f64) -> #name {
                    #name { #( #fields: self.#fields / rhs, )* }
                }
            }
        }
    }

    /// Operator impls derived by the closure engine, placed on the left
    /// operand type.
    fn emit_assigned_ops(&self, left: TypeRef, name: &Ident, fields: &[Ident]) -> TokenStream {
        let mut out = TokenStream::new();
        let mut dot_cross = TokenStream::new();
        for op in self.registry.operators().iter().filter(|op| op.left == left) {
            let rhs = format_ident!("{}", self.base_type_name(op.right));
            let result = format_ident!("{}", self.base_type_name(op.result));
            match op.op {
                Op::Mul => {
                    let body = mul_body(op.left, op.right, &result);
                    out.extend(quote! {
                        impl core::ops::Mul<#rhs> for #name {
                            type Output = #result;

                            fn mul(self, rhs: #rhs) -> #result {
                                #body
                            }
                        }
                    });
                }
                Op::Div => {
                    // The divisor is always a magnitude.
                    let result_fields = field_idents(op.result.form);
                    out.extend(quote! {
                        impl core::ops::Div<#rhs> for #name {
                            type Output = #result;

                            fn div(self, rhs: #rhs) -> #result {
                                #result { #( #result_fields: self.#result_fields / rhs.value, )* }
                            }
                        }
                    });
                }
                Op::Dot => {
                    let method = if op.right == left {
                        format_ident!("dot")
                    } else {
                        format_ident!("dot_{}", snake_case(&self.base_type_name(op.right)))
                    };
                    // A dot product can be negative: prefer the signed
                    // sibling of the result dimension, and go through
                    // `new` (which asserts) when only the magnitude
                    // form exists.
                    let result_dim = self.registry.dimension_by_id(op.result.dim);
                    let result = match result_dim.form(VectorForm::Scalar) {
                        Some(signed) => format_ident!("{}", signed.type_name),
                        None => result,
                    };
                    let doc = format!("Dot product with a [`{rhs}`], yielding a [`{result}`].");
                    dot_cross.extend(quote! {
                        #[doc = #doc]
                        pub fn #method(&self, rhs: #rhs) -> #result {
                            #result::new(#( self.#fields * rhs.#fields )+*)
                        }
                    });
                }
                Op::Cross => {
                    let method = if op.right == left {
                        format_ident!("cross")
                    } else {
                        format_ident!("cross_{}", snake_case(&self.base_type_name(op.right)))
                    };
                    let doc = format!("Cross product with a [`{rhs}`], yielding a [`{result}`].");
                    dot_cross.extend(quote! {
                        #[doc = #doc]
                        pub fn #method(&self, rhs: #rhs) -> #result {
                            #result {
                                x: self.y * rhs.z - self.z * rhs.y,
                                y: self.z * rhs.x - self.x * rhs.z,
                                z: self.x * rhs.y - self.y * rhs.x,
                            }
                        }
                    });
                }
            }
        }
        if !dot_cross.is_empty() {
            out.extend(quote! {
                impl #name {
                    #dot_cross
                }
            });
        }
        out
    }

    /// One semantic overload: a named wrapper sharing the base type's
    /// representation, with a widening `From` into the base type and the
    /// declared sibling conversions.
    fn emit_overload(
        &self,
        dim: &Dimension,
        decl: &FormDecl,
        overload: &OverloadDecl,
    ) -> Result<TokenStream> {
        let name = format_ident!("{}", overload.name);
        let base = format_ident!("{}", decl.type_name);
        let fields = field_idents(decl.form);
        let doc = if overload.description.is_empty() {
            format!("`{}` overload of [`{}`].", overload.name, decl.type_name)
        } else {
            overload.description.clone()
        };

        let accessors = accessor_fns(decl.form, &fields);
        let factories: Vec<TokenStream> = dim
            .units()
            .iter()
            .map(|&id| self.emit_unit_factory(self.registry.unit_by_id(id), &name, &fields, decl.form))
            .collect();

        let base_snake = snake_case(&decl.type_name);
        let narrowing = format_ident!("from_{base_snake}");
        let narrowing_doc = format!(
            "Reinterprets a [`{}`] as a `{}`. Explicit: narrowing adds meaning.",
            decl.type_name, overload.name
        );

        // Scalar overloads widen implicitly; vector overloads convert
        // only through explicit calls.
        let widening = if decl.form.is_scalar() {
            quote! {
                impl From<#name> for #base {
                    fn from(value: #name) -> #base {
                        #base { #( #fields: value.#fields, )* }
                    }
                }
            }
        } else {
            TokenStream::new()
        };
        let explicit_widening = if decl.form.is_scalar() {
            TokenStream::new()
        } else {
            let to_base_fn = format_ident!("to_{base_snake}");
            let to_base_doc = format!("The underlying [`{}`] value.", decl.type_name);
            quote! {
                #[doc = #to_base_doc]
                pub fn #to_base_fn(&self) -> #base {
                    #base { #( #fields: self.#fields, )* }
                }
            }
        };

        let mut conversions = TokenStream::new();
        for conversion in &overload.conversions {
            // Sibling overloads share the scalar representation;
            // expression conversions are only meaningful there.
            if !decl.form.is_scalar() {
                debug!(
                    "skipping conversion `{}` -> `{}`: vector overloads convert via the base type",
                    overload.name, conversion.target
                );
                continue;
            }
            let target = format_ident!("{}", conversion.target);
            let to_fn = format_ident!("to_{}", snake_case(&conversion.target));
            let from_fn = format_ident!("from_{}", snake_case(&conversion.target));
            let to_expr = parse_expr(&overload.name, &conversion.target, &conversion.to_expr)?;
            let from_expr = parse_expr(&overload.name, &conversion.target, &conversion.from_expr)?;
            let to_doc = format!("Converts to the sibling [`{}`].", conversion.target);
            let from_doc = format!("Builds from the sibling [`{}`].", conversion.target);
            conversions.extend(quote! {
                #[doc = #to_doc]
                pub fn #to_fn(&self) -> #target {
                    let value = self.value;
                    #target { value: #to_expr }
                }

                #[doc = #from_doc]
                pub fn #from_fn(other: #target) -> #name {
                    let value = other.value;
                    #name { value: #from_expr }
                }
            });
        }

        Ok(quote! {
            #[doc = #doc]
            #[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
            pub struct #name {
                #( #fields: f64, )*
            }

            impl #name {
                /// The zero value.
                pub const ZERO: #name = #name { #( #fields: 0.0, )* };

                #[doc = #narrowing_doc]
                pub fn #narrowing(base: #base) -> #name {
                    #name { #( #fields: base.#fields, )* }
                }

                #explicit_widening
                #( #accessors )*
                #( #factories )*
                #conversions
            }

            #widening
        })
    }

    fn base_type_name(&self, ty: TypeRef) -> String {
        let dim = self.registry.dimension_by_id(ty.dim);
        match dim.form(ty.form) {
            Some(decl) => decl.type_name.clone(),
            // Unreachable for closure output: operators only reference
            // declared forms.
            None => format!("{}{}", dim.name(), ty.form),
        }
    }
}

/// Multiplication body: derived Mul always pairs a magnitude with the
/// carrier operand.
fn mul_body(left: TypeRef, right: TypeRef, result: &Ident) -> TokenStream {
    let result_fields = field_idents(if left.form >= right.form { left.form } else { right.form });
    if left.form.is_scalar() && right.form.is_scalar() {
        quote! { #result { value: self.value * rhs.value } }
    } else if left.form.is_scalar() {
        quote! { #result { #( #result_fields: self.value * rhs.#result_fields, )* } }
    } else {
        quote! { #result { #( #result_fields: self.#result_fields * rhs.value, )* } }
    }
}

fn parse_expr(type_name: &str, target: &str, expr: &str) -> Result<syn::Expr> {
    syn::parse_str(expr).map_err(|err| EmitError::BadConversionExpr {
        type_name: type_name.to_owned(),
        target: target.to_owned(),
        expr: expr.to_owned(),
        message: err.to_string(),
    })
}

/// Per-field accessors: `value()` for scalar forms, one per component
/// otherwise.
fn accessor_fns(form: VectorForm, fields: &[Ident]) -> Vec<TokenStream> {
    if form.is_scalar() {
        vec![quote! {
            /// Value in the base unit.
            pub fn value(&self) -> f64 {
                self.value
            }
        }]
    } else {
        fields
            .iter()
            .map(|field| {
                let doc = format!("The `{field}` component, in the base unit.");
                quote! {
                    #[doc = #doc]
                    pub fn #field(&self) -> f64 {
                        self.#field
                    }
                }
            })
            .collect()
    }
}

fn field_idents(form: VectorForm) -> Vec<Ident> {
    let names: &[&str] = match form {
        VectorForm::Magnitude | VectorForm::Scalar => &["value"],
        VectorForm::Vector2 => &["x", "y"],
        VectorForm::Vector3 => &["x", "y", "z"],
        VectorForm::Vector4 => &["x", "y", "z", "w"],
    };
    names.iter().map(|name| format_ident!("{name}")).collect()
}

fn form_noun(form: VectorForm) -> &'static str {
    match form {
        VectorForm::Magnitude => "Non-negative magnitude",
        VectorForm::Scalar => "Signed scalar",
        VectorForm::Vector2 => "Two-component vector",
        VectorForm::Vector3 => "Three-component vector",
        VectorForm::Vector4 => "Four-component vector",
    }
}

/// `MeterPerSecond` -> `meter_per_second`; a digit joins the following
/// uppercase run, so `Velocity3D` -> `velocity3d`.
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_ascii_lowercase();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use unitsmith_core::{Catalog, Sequencer};

    fn registry() -> Registry {
        let catalog = Catalog::from_json_str(
            r#"{
                "dimensions": [
                    {
                        "name": "Length", "symbol": "L",
                        "exponents": { "Length": 1 },
                        "vectorForms": [
                            {
                                "form": 0, "baseTypeName": "Distance",
                                "overloads": [
                                    {
                                        "name": "Radius",
                                        "relationships": {
                                            "Diameter": { "to": "value * 2.0", "from": "value / 2.0" }
                                        }
                                    },
                                    {
                                        "name": "Diameter",
                                        "relationships": {
                                            "Radius": { "to": "value / 2.0", "from": "value * 2.0" }
                                        }
                                    }
                                ]
                            },
                            { "form": 1, "baseTypeName": "Displacement" },
                            { "form": 3, "baseTypeName": "Displacement3D" }
                        ],
                        "derivatives": [ { "other": "Time", "result": "Velocity" } ],
                        "dotProducts": [ { "other": "Length", "result": "Area" } ],
                        "crossProducts": [ { "other": "Length", "result": "Area" } ],
                        "availableUnits": ["Meter", "Kilometer"]
                    },
                    {
                        "name": "Time", "symbol": "T",
                        "exponents": { "Time": 1 },
                        "vectorForms": [ { "form": 0, "baseTypeName": "Duration" } ],
                        "availableUnits": ["Second"]
                    },
                    {
                        "name": "Velocity", "symbol": "v",
                        "exponents": { "Length": 1, "Time": -1 },
                        "vectorForms": [
                            { "form": 0, "baseTypeName": "Speed" },
                            { "form": 1, "baseTypeName": "SignedSpeed" },
                            {
                                "form": 3, "baseTypeName": "Velocity3D",
                                "overloads": [ { "name": "Heading" } ]
                            }
                        ],
                        "availableUnits": ["MeterPerSecond"]
                    },
                    {
                        "name": "Area", "symbol": "A",
                        "exponents": { "Length": 2 },
                        "vectorForms": [
                            { "form": 0, "baseTypeName": "Area" },
                            { "form": 3, "baseTypeName": "AreaVector" }
                        ],
                        "availableUnits": ["SquareMeter"]
                    }
                ],
                "units": [
                    { "name": "Meter", "symbol": "m", "toBaseFactor": 1.0 },
                    { "name": "Kilometer", "symbol": "km", "toBaseFactor": 1000.0 },
                    { "name": "Second", "symbol": "s", "toBaseFactor": 1.0 },
                    { "name": "MeterPerSecond", "symbol": "m/s", "toBaseFactor": 1.0 },
                    { "name": "SquareMeter", "symbol": "m²", "toBaseFactor": 1.0 }
                ]
            }"#,
        )
        .unwrap();
        Sequencer::initialize(&catalog).unwrap()
    }

    #[test]
    fn emits_struct_per_form() {
        let registry = registry();
        let code = Emitter::new(&registry).render().unwrap();
        assert!(code.contains("pub struct Distance"));
        assert!(code.contains("pub struct Displacement3D"));
        assert!(code.contains("pub struct Velocity3D"));
    }

    #[test]
    fn magnitude_constructor_asserts_non_negative() {
        let registry = registry();
        let code = Emitter::new(&registry).render().unwrap();
        assert!(code.contains("assert ! (value >= 0.0 , \"Distance cannot be negative\")"));
    }

    #[test]
    fn unit_factories_inline_factors() {
        let registry = registry();
        let code = Emitter::new(&registry).render().unwrap();
        assert!(code.contains("pub fn from_kilometer"));
        assert!(code.contains("value * 1000f64 + 0f64"));
        assert!(code.contains("pub fn to_kilometer"));
    }

    #[test]
    fn magnitude_subtraction_yields_signed_sibling() {
        let registry = registry();
        let code = Emitter::new(&registry).render().unwrap();
        assert!(code.contains("impl core :: ops :: Sub for Distance"));
        assert!(code.contains("type Output = Displacement"));
        // Duration has no signed sibling: no Sub impl at all.
        assert!(!code.contains("impl core :: ops :: Sub for Duration"));
    }

    #[test]
    fn assigned_operators_land_on_the_left_operand() {
        let registry = registry();
        let code = Emitter::new(&registry).render().unwrap();
        assert!(code.contains("impl core :: ops :: Div < Duration > for Distance"));
        assert!(code.contains("impl core :: ops :: Mul < Duration > for Speed"));
        assert!(code.contains("impl core :: ops :: Mul < Speed > for Duration"));
    }

    #[test]
    fn dot_and_cross_become_inherent_methods() {
        let registry = registry();
        let code = Emitter::new(&registry).render().unwrap();
        assert!(code.contains("pub fn dot (& self , rhs : Displacement3D) -> Area"));
        // Area declares no signed form, so the product goes through
        // `new` and its non-negativity assertion.
        assert!(code.contains("Area :: new (self . x * rhs . x"));
        assert!(code.contains("pub fn cross (& self , rhs : Displacement3D) -> AreaVector"));
    }

    #[test]
    fn dot_product_prefers_the_signed_result_form() {
        let catalog = Catalog::from_json_str(
            r#"{
                "dimensions": [
                    {
                        "name": "Length", "symbol": "L",
                        "exponents": { "Length": 1 },
                        "vectorForms": [
                            { "form": 0, "baseTypeName": "Distance" },
                            { "form": 3, "baseTypeName": "Displacement3D" }
                        ],
                        "dotProducts": [ { "other": "Length", "result": "Area" } ],
                        "availableUnits": ["Meter"]
                    },
                    {
                        "name": "Area", "symbol": "A",
                        "exponents": { "Length": 2 },
                        "vectorForms": [
                            { "form": 0, "baseTypeName": "Area" },
                            { "form": 1, "baseTypeName": "SignedArea" }
                        ],
                        "availableUnits": ["SquareMeter"]
                    }
                ],
                "units": [
                    { "name": "Meter", "symbol": "m", "toBaseFactor": 1.0 },
                    { "name": "SquareMeter", "symbol": "m²", "toBaseFactor": 1.0 }
                ]
            }"#,
        )
        .unwrap();
        let registry = Sequencer::initialize(&catalog).unwrap();
        let code = Emitter::new(&registry).render().unwrap();
        assert!(code.contains("pub fn dot (& self , rhs : Displacement3D) -> SignedArea"));
        assert!(code.contains("SignedArea :: new (self . x * rhs . x"));
    }

    #[test]
    fn overloads_widen_and_convert() {
        let registry = registry();
        let code = Emitter::new(&registry).render().unwrap();
        assert!(code.contains("pub struct Radius"));
        assert!(code.contains("impl From < Radius > for Distance"));
        assert!(code.contains("pub fn from_distance (base : Distance) -> Radius"));
        assert!(code.contains("pub fn to_diameter"));
        assert!(code.contains("value * 2.0"));
    }

    #[test]
    fn vector_overloads_convert_explicitly() {
        let registry = registry();
        let code = Emitter::new(&registry).render().unwrap();
        assert!(code.contains("pub struct Heading"));
        // No implicit widening on vector forms.
        assert!(!code.contains("impl From < Heading > for Velocity3D"));
        assert!(code.contains("pub fn to_velocity3d (& self) -> Velocity3D"));
        assert!(code.contains("pub fn from_velocity3d (base : Velocity3D) -> Heading"));
    }

    #[test]
    fn magnitude_unit_factories_reject_negative_base_values() {
        let registry = registry();
        let code = Emitter::new(&registry).render().unwrap();
        // Conversion first, then the same assertion `new` carries.
        assert!(code.contains(
            "let value = value * 1000f64 + 0f64 ; assert ! (value >= 0.0 , \"Distance cannot be negative\")"
        ));
        // Signed factories stay unchecked.
        assert!(code.contains("Displacement { value : value * 1000f64 + 0f64 }"));
    }

    #[test]
    fn bad_conversion_expression_is_reported() {
        let catalog = Catalog::from_json_str(
            r#"{
                "dimensions": [
                    {
                        "name": "Length", "symbol": "L",
                        "exponents": { "Length": 1 },
                        "vectorForms": [
                            {
                                "form": 0, "baseTypeName": "Distance",
                                "overloads": [
                                    {
                                        "name": "Radius",
                                        "relationships": {
                                            "Diameter": { "to": "value * * 2.0", "from": "value / 2.0" }
                                        }
                                    },
                                    { "name": "Diameter" }
                                ]
                            }
                        ],
                        "availableUnits": ["Meter"]
                    }
                ],
                "units": [ { "name": "Meter", "symbol": "m", "toBaseFactor": 1.0 } ]
            }"#,
        )
        .unwrap();
        let registry = Sequencer::initialize(&catalog).unwrap();
        let err = Emitter::new(&registry).emit().unwrap_err();
        match err {
            EmitError::BadConversionExpr { type_name, target, .. } => {
                assert_eq!(type_name, "Radius");
                assert_eq!(target, "Diameter");
            }
        }
    }

    #[test]
    fn snake_case_handles_compound_names() {
        assert_eq!(snake_case("Meter"), "meter");
        assert_eq!(snake_case("MeterPerSecondSquared"), "meter_per_second_squared");
        assert_eq!(snake_case("KilowattHour"), "kilowatt_hour");
        assert_eq!(snake_case("Velocity3D"), "velocity3d");
        assert_eq!(snake_case("Displacement3D"), "displacement3d");
    }
}
