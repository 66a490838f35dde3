#![cfg_attr(doc, doc = include_str!("../README.md"))]
//! Rule definitions and the schema registry for the dyrlink resolver
//!
//! # Example
//!
//! ```
//! use dyrlink_ir::ModelType;
//! use dyrlink_schema::{RuleSetDef, SchemaRegistry, Transform};
//!
//! let mut builder = SchemaRegistry::builder();
//! builder
//!     .register(
//!         &RuleSetDef::new("GENCLS", "GENCLS")
//!             .inputs(["BUS", "ID", "H"])
//!             .identity_fields(["BUS", "ID"])
//!             .output("bus", "BUS")
//!             .output_with("M", "H", "2 * x"),
//!     )
//!     .expect("definition should compile");
//! let registry = builder.build().expect("registry should build");
//!
//! let rule_set = registry.lookup(&ModelType::new("GENCLS")).expect("GENCLS is registered");
//! assert_eq!(rule_set.outputs()[1].transform(), Transform::ScaleBy(2.0));
//! ```

pub mod builtin;
mod compile;
pub mod def;
pub mod error;
mod registry;
pub mod rule;
pub mod transform;
mod util;

pub use def::{GroupDef, RuleSetDef, SchemaDef};
pub use error::SchemaError;
pub use registry::{RegistryBuilder, SchemaRegistry};
pub use rule::{
    Clause, FindRule, GetRule, GetSource, IdentityRule, OutputRule, RuleSet, Source,
};
pub use transform::{Transform, TransformError};
