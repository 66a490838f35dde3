//! Declarative rule-set definitions.
//!
//! A `RuleSetDef` is the uncompiled, string-keyed form of a rule set. It can
//! be deserialized from JSON or assembled in Rust with the builder methods
//! below, which is how the builtin table is written:
//!
//! ```ignore
//! RuleSetDef::new("TGOV1", "TGOV1")
//!     .inputs(["BUS", "ID", "R", "T1"])
//!     .find("gen", "StaticGen", [("bus", "BUS"), ("subidx", "ID")])
//!     .find("syn", "SynGen", [("gen", "gen")])
//!     .get("Sn", "syn", "Sn")
//!     .output("syn", "syn")
//!     .output_with("gain", "R", "1 / x")
//!     .identity_relation("syn");
//! ```
//!
//! A JSON definition uses the same field names:
//!
//! ```json
//! {
//!   "model": "TGOV1",
//!   "destination": "TGOV1",
//!   "inputs": ["BUS", "ID", "R", "T1"],
//!   "identity": { "relation": "syn" },
//!   "find": [
//!     { "relation": "gen", "target": "StaticGen", "match": { "bus": "BUS", "subidx": "ID" } },
//!     { "relation": "syn", "target": "SynGen", "match": { "gen": "gen" } }
//!   ],
//!   "get": [{ "field": "Sn", "from": { "relation": "syn" }, "src": "Sn" }],
//!   "outputs": [
//!     { "field": "syn", "source": "syn" },
//!     { "field": "gain", "source": "R", "transform": "1 / x" }
//!   ]
//! }
//! ```

use indexmap::IndexMap;
use serde::Deserialize;

use dyrlink_ir::Value;

/// The uncompiled definition of one model type's rule set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSetDef {
    /// The model type of the records this rule set resolves.
    pub model: String,
    /// The device type of the resolved instances.
    pub destination: String,
    /// The declared input fields, all of which a record must supply.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// How the identity key of a resolved instance is derived.
    pub identity: IdentityDef,
    /// Find rules, in execution order.
    #[serde(default)]
    pub find: Vec<FindDef>,
    /// Get rules, in execution order.
    #[serde(default)]
    pub get: Vec<GetDef>,
    /// Output rules, in execution order.
    #[serde(default)]
    pub outputs: Vec<OutputDef>,
}

/// How a resolved instance's identity key is derived.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityDef {
    /// Compose the key from these bound names, in order.
    Fields(Vec<String>),
    /// Reuse the key of the device bound to this relation.
    Relation(String),
}

/// A find rule definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FindDef {
    /// The relation name the found device is bound to.
    pub relation: String,
    /// The device type or group to search.
    pub target: String,
    /// Equality clauses: target device field to bound name.
    #[serde(rename = "match")]
    pub matches: IndexMap<String, String>,
    /// Whether zero matches binds the absent value instead of failing.
    #[serde(default)]
    pub allow_none: bool,
}

/// A get rule definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetDef {
    /// The name the fetched value is bound to.
    pub field: String,
    /// Where the device to read from comes from.
    pub from: GetSourceDef,
    /// The field to read on that device.
    pub src: String,
}

/// The device a get rule reads from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GetSourceDef {
    /// The device bound to a find relation.
    Relation(String),
    /// The device of the given type whose key is the value of a bound name.
    Keyed {
        /// The device type to look in
        device_type: String,
        /// The bound name holding the key
        key: String,
    },
}

/// An output rule definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputDef {
    /// The output field name.
    pub field: String,
    /// Where the value comes from.
    pub source: SourceDef,
    /// An optional transform expression.
    #[serde(default)]
    pub transform: Option<String>,
}

/// The source of an output value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SourceDef {
    /// A bound name: an input field, a find relation or a get result.
    Binding(String),
    /// A literal value.
    Constant {
        /// The literal
        constant: ConstantDef,
    },
}

/// A literal value in a definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConstantDef {
    /// A number literal.
    Number(f64),
    /// A string literal.
    String(String),
}

impl From<ConstantDef> for Value {
    fn from(constant: ConstantDef) -> Self {
        match constant {
            ConstantDef::Number(number) => Self::Number(number),
            ConstantDef::String(string) => Self::String(string),
        }
    }
}

/// A device group definition, such as `SynGen` = {`GENCLS`, `GENROU`}.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupDef {
    /// The group name.
    pub name: String,
    /// The concrete device types in the group.
    pub members: Vec<String>,
}

/// A file of definitions, as read from JSON.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDef {
    /// Device group definitions.
    #[serde(default)]
    pub groups: Vec<GroupDef>,
    /// Rule set definitions.
    #[serde(default)]
    pub rule_sets: Vec<RuleSetDef>,
}

impl RuleSetDef {
    /// Creates an empty definition keyed on no fields.
    ///
    /// Callers are expected to set the identity with `identity_fields` or
    /// `identity_relation`.
    #[must_use]
    pub fn new(model: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            destination: destination.into(),
            inputs: vec![],
            identity: IdentityDef::Fields(vec![]),
            find: vec![],
            get: vec![],
            outputs: vec![],
        }
    }

    /// Appends declared input fields.
    #[must_use]
    pub fn inputs<S: Into<String>>(mut self, inputs: impl IntoIterator<Item = S>) -> Self {
        self.inputs.extend(inputs.into_iter().map(Into::into));
        self
    }

    /// Keys resolved instances on the given bound names.
    #[must_use]
    pub fn identity_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.identity = IdentityDef::Fields(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Keys resolved instances on the key of a related device.
    #[must_use]
    pub fn identity_relation(mut self, relation: impl Into<String>) -> Self {
        self.identity = IdentityDef::Relation(relation.into());
        self
    }

    /// Appends a find rule that must match exactly one device.
    #[must_use]
    pub fn find<'a>(
        self,
        relation: impl Into<String>,
        target: impl Into<String>,
        matches: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        self.push_find(relation.into(), target.into(), matches, false)
    }

    /// Appends a find rule that binds the absent value when nothing matches.
    #[must_use]
    pub fn find_optional<'a>(
        self,
        relation: impl Into<String>,
        target: impl Into<String>,
        matches: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        self.push_find(relation.into(), target.into(), matches, true)
    }

    fn push_find<'a>(
        mut self,
        relation: String,
        target: String,
        matches: impl IntoIterator<Item = (&'a str, &'a str)>,
        allow_none: bool,
    ) -> Self {
        let matches = matches
            .into_iter()
            .map(|(field, source)| (field.to_string(), source.to_string()))
            .collect();

        self.find.push(FindDef {
            relation,
            target,
            matches,
            allow_none,
        });
        self
    }

    /// Appends a get rule reading `src` from the device bound to `relation`.
    #[must_use]
    pub fn get(
        mut self,
        field: impl Into<String>,
        relation: impl Into<String>,
        src: impl Into<String>,
    ) -> Self {
        self.get.push(GetDef {
            field: field.into(),
            from: GetSourceDef::Relation(relation.into()),
            src: src.into(),
        });
        self
    }

    /// Appends a get rule reading `src` from the `device_type` device whose
    /// key is the value bound to `key`.
    #[must_use]
    pub fn get_keyed(
        mut self,
        field: impl Into<String>,
        device_type: impl Into<String>,
        key: impl Into<String>,
        src: impl Into<String>,
    ) -> Self {
        self.get.push(GetDef {
            field: field.into(),
            from: GetSourceDef::Keyed {
                device_type: device_type.into(),
                key: key.into(),
            },
            src: src.into(),
        });
        self
    }

    /// Appends an output rule copying a bound name.
    #[must_use]
    pub fn output(self, field: impl Into<String>, source: impl Into<String>) -> Self {
        self.push_output(field.into(), SourceDef::Binding(source.into()), None)
    }

    /// Appends an output rule copying a bound name through a transform.
    #[must_use]
    pub fn output_with(
        self,
        field: impl Into<String>,
        source: impl Into<String>,
        transform: impl Into<String>,
    ) -> Self {
        self.push_output(
            field.into(),
            SourceDef::Binding(source.into()),
            Some(transform.into()),
        )
    }

    /// Appends an output rule producing a literal value.
    #[must_use]
    pub fn output_constant(self, field: impl Into<String>, constant: ConstantDef) -> Self {
        self.push_output(field.into(), SourceDef::Constant { constant }, None)
    }

    /// Appends output rules that copy each name to an output field of the
    /// same name.
    #[must_use]
    pub fn outputs_same<'a>(self, names: impl IntoIterator<Item = &'a str>) -> Self {
        names
            .into_iter()
            .fold(self, |def, name| def.output(name, name))
    }

    fn push_output(
        mut self,
        field: String,
        source: SourceDef,
        transform: Option<String>,
    ) -> Self {
        self.outputs.push(OutputDef {
            field,
            source,
            transform,
        });
        self
    }
}

impl GroupDef {
    /// Creates a group definition.
    #[must_use]
    pub fn new<S: Into<String>>(name: impl Into<String>, members: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_rule_set_from_json() {
        let json = r#"{
            "model": "TGOV1",
            "destination": "TGOV1",
            "inputs": ["BUS", "ID", "R"],
            "identity": { "relation": "syn" },
            "find": [
                { "relation": "gen", "target": "StaticGen", "match": { "bus": "BUS", "subidx": "ID" } },
                { "relation": "syn", "target": "SynGen", "match": { "gen": "gen" }, "allow_none": false }
            ],
            "get": [
                { "field": "Sn", "from": { "relation": "syn" }, "src": "Sn" },
                { "field": "Vn", "from": { "keyed": { "device_type": "Bus", "key": "BUS" } }, "src": "Vn" }
            ],
            "outputs": [
                { "field": "syn", "source": "syn" },
                { "field": "gain", "source": "R", "transform": "1 / x" },
                { "field": "wref0", "source": { "constant": 1.0 } }
            ]
        }"#;

        let def: RuleSetDef = serde_json::from_str(json).expect("definition should deserialize");

        let expected = RuleSetDef::new("TGOV1", "TGOV1")
            .inputs(["BUS", "ID", "R"])
            .identity_relation("syn")
            .find("gen", "StaticGen", [("bus", "BUS"), ("subidx", "ID")])
            .find("syn", "SynGen", [("gen", "gen")])
            .get("Sn", "syn", "Sn")
            .get_keyed("Vn", "Bus", "BUS", "Vn")
            .output("syn", "syn")
            .output_with("gain", "R", "1 / x")
            .output_constant("wref0", ConstantDef::Number(1.0));

        assert_eq!(def, expected);
    }

    #[test]
    fn deserialize_rejects_unknown_keys() {
        let json = r#"{
            "model": "GENCLS",
            "destination": "GENCLS",
            "identity": { "fields": ["BUS", "ID"] },
            "lambda": "x"
        }"#;

        let error = serde_json::from_str::<RuleSetDef>(json)
            .expect_err("unknown keys should be rejected");
        assert!(error.to_string().contains("lambda"));
    }

    #[test]
    fn deserialize_schema_file() {
        let json = r#"{
            "groups": [{ "name": "SynGen", "members": ["GENCLS", "GENROU"] }],
            "rule_sets": []
        }"#;

        let def: SchemaDef = serde_json::from_str(json).expect("schema should deserialize");
        assert_eq!(def.groups, vec![GroupDef::new("SynGen", ["GENCLS", "GENROU"])]);
        assert!(def.rule_sets.is_empty());
    }
}
