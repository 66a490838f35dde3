//! Compiled rule sets.
//!
//! A `RuleSet` is produced from a `RuleSetDef` by the schema compiler. Every
//! name in the definition has been resolved to a typed [`Source`] and every
//! transform has been parsed, so the resolver never looks anything up by an
//! unchecked string.

use dyrlink_ir::{DeviceType, FieldName, ModelType, RelationName, Value};

use crate::transform::Transform;

/// The compiled rule set for one model type.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    model_type: ModelType,
    destination: DeviceType,
    inputs: Vec<FieldName>,
    identity: IdentityRule,
    finds: Vec<FindRule>,
    gets: Vec<GetRule>,
    outputs: Vec<OutputRule>,
}

impl RuleSet {
    #[must_use]
    pub(crate) const fn new(
        model_type: ModelType,
        destination: DeviceType,
        inputs: Vec<FieldName>,
        identity: IdentityRule,
        finds: Vec<FindRule>,
        gets: Vec<GetRule>,
        outputs: Vec<OutputRule>,
    ) -> Self {
        Self {
            model_type,
            destination,
            inputs,
            identity,
            finds,
            gets,
            outputs,
        }
    }

    /// Returns the model type this rule set resolves.
    #[must_use]
    pub const fn model_type(&self) -> &ModelType {
        &self.model_type
    }

    /// Returns the device type of resolved instances.
    #[must_use]
    pub const fn destination(&self) -> &DeviceType {
        &self.destination
    }

    /// Returns the declared input fields.
    #[must_use]
    pub fn inputs(&self) -> &[FieldName] {
        &self.inputs
    }

    /// Returns the identity rule.
    #[must_use]
    pub const fn identity(&self) -> &IdentityRule {
        &self.identity
    }

    /// Returns the find rules in execution order.
    #[must_use]
    pub fn finds(&self) -> &[FindRule] {
        &self.finds
    }

    /// Returns the get rules in execution order.
    #[must_use]
    pub fn gets(&self) -> &[GetRule] {
        &self.gets
    }

    /// Returns the output rules in execution order.
    #[must_use]
    pub fn outputs(&self) -> &[OutputRule] {
        &self.outputs
    }

    /// Returns whether the rule set produces the given output field.
    #[must_use]
    pub fn produces(&self, field: &FieldName) -> bool {
        self.outputs.iter().any(|output| output.field() == field)
    }

    /// Returns the input fields the identity key ultimately depends on.
    ///
    /// For a key taken from a relation, these are the inputs of the find
    /// rules that lead to it. They are used to describe a record in
    /// diagnostics.
    #[must_use]
    pub fn identity_inputs(&self) -> Vec<&FieldName> {
        let mut inputs = vec![];
        match &self.identity {
            IdentityRule::Fields(sources) => {
                for source in sources {
                    self.collect_inputs(source, &mut inputs);
                }
            }
            IdentityRule::Relation(relation) => self.collect_relation_inputs(relation, &mut inputs),
        }
        inputs
    }

    fn collect_inputs<'a>(&'a self, source: &'a Source, inputs: &mut Vec<&'a FieldName>) {
        match source {
            Source::Input(field) if !inputs.contains(&field) => inputs.push(field),
            Source::Relation(relation) => self.collect_relation_inputs(relation, inputs),
            Source::Input(_) | Source::Get(_) | Source::Constant(_) => {}
        }
    }

    fn collect_relation_inputs<'a>(
        &'a self,
        relation: &RelationName,
        inputs: &mut Vec<&'a FieldName>,
    ) {
        let Some(find) = self.finds.iter().find(|find| find.relation() == relation) else {
            return;
        };

        for clause in find.clauses() {
            self.collect_inputs(clause.source(), inputs);
        }
    }
}

/// A reference to a value bound during resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// A declared input field of the record.
    Input(FieldName),
    /// The device bound by a find rule, or absent.
    Relation(RelationName),
    /// The value fetched by a get rule.
    Get(FieldName),
    /// A literal value.
    Constant(Value),
}

impl Source {
    /// Returns the name this source refers to, if it is not a constant.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Input(field) | Self::Get(field) => Some(field.as_str()),
            Self::Relation(relation) => Some(relation.as_str()),
            Self::Constant(_) => None,
        }
    }
}

/// How the identity key of a resolved instance is derived.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityRule {
    /// Compose the key from these sources, in order.
    Fields(Vec<Source>),
    /// Reuse the key of the device bound to this relation.
    Relation(RelationName),
}

/// A find rule: locate exactly one previously resolved device.
#[derive(Debug, Clone, PartialEq)]
pub struct FindRule {
    relation: RelationName,
    target: DeviceType,
    clauses: Vec<Clause>,
    allow_none: bool,
}

impl FindRule {
    #[must_use]
    pub(crate) const fn new(
        relation: RelationName,
        target: DeviceType,
        clauses: Vec<Clause>,
        allow_none: bool,
    ) -> Self {
        Self {
            relation,
            target,
            clauses,
            allow_none,
        }
    }

    /// Returns the relation name the found device is bound to.
    #[must_use]
    pub const fn relation(&self) -> &RelationName {
        &self.relation
    }

    /// Returns the device type or group that is searched.
    #[must_use]
    pub const fn target(&self) -> &DeviceType {
        &self.target
    }

    /// Returns the equality clauses of the predicate.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Returns whether zero matches binds the absent value.
    #[must_use]
    pub const fn allow_none(&self) -> bool {
        self.allow_none
    }
}

/// One equality clause of a find predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    field: FieldName,
    source: Source,
}

impl Clause {
    #[must_use]
    pub(crate) const fn new(field: FieldName, source: Source) -> Self {
        Self { field, source }
    }

    /// Returns the field compared on candidate devices.
    #[must_use]
    pub const fn field(&self) -> &FieldName {
        &self.field
    }

    /// Returns the source of the value the field must equal.
    #[must_use]
    pub const fn source(&self) -> &Source {
        &self.source
    }
}

/// A get rule: read one field of a related device.
#[derive(Debug, Clone, PartialEq)]
pub struct GetRule {
    field: FieldName,
    source: GetSource,
    src: FieldName,
}

impl GetRule {
    #[must_use]
    pub(crate) const fn new(field: FieldName, source: GetSource, src: FieldName) -> Self {
        Self { field, source, src }
    }

    /// Returns the name the fetched value is bound to.
    #[must_use]
    pub const fn field(&self) -> &FieldName {
        &self.field
    }

    /// Returns where the device to read from comes from.
    #[must_use]
    pub const fn source(&self) -> &GetSource {
        &self.source
    }

    /// Returns the field read on the device.
    #[must_use]
    pub const fn src(&self) -> &FieldName {
        &self.src
    }
}

/// The device a get rule reads from.
#[derive(Debug, Clone, PartialEq)]
pub enum GetSource {
    /// The device bound to a find relation.
    Relation(RelationName),
    /// The device of a concrete type whose key is the value of a source.
    Keyed {
        /// The device type to look in
        device_type: DeviceType,
        /// The source holding the key
        key: Source,
    },
}

/// An output rule: compute one field of the resolved instance.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRule {
    field: FieldName,
    source: Source,
    transform: Transform,
}

impl OutputRule {
    #[must_use]
    pub(crate) const fn new(field: FieldName, source: Source, transform: Transform) -> Self {
        Self {
            field,
            source,
            transform,
        }
    }

    /// Returns the output field name.
    #[must_use]
    pub const fn field(&self) -> &FieldName {
        &self.field
    }

    /// Returns the source of the value.
    #[must_use]
    pub const fn source(&self) -> &Source {
        &self.source
    }

    /// Returns the transform applied to the source value.
    #[must_use]
    pub const fn transform(&self) -> Transform {
        self.transform
    }
}
