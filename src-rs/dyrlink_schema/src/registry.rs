//! The schema registry.
//!
//! A `SchemaRegistry` is built once, before any record is processed, through
//! a `RegistryBuilder`. After `build` it is read-only and is passed by
//! reference to everything that resolves records.

use std::slice;

use indexmap::IndexMap;

use dyrlink_ir::{DeviceType, ModelType};

use crate::{
    compile::compile,
    def::{GroupDef, RuleSetDef, SchemaDef},
    error::SchemaError,
    rule::{GetSource, RuleSet},
};

/// The read-only table of rule sets and device groups.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaRegistry {
    rule_sets: IndexMap<ModelType, RuleSet>,
    groups: IndexMap<DeviceType, Vec<DeviceType>>,
}

impl SchemaRegistry {
    /// Creates a builder for a new registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Looks up the rule set for a model type.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::UnknownModelType` if no rule set is registered
    /// for the model type.
    pub fn lookup(&self, model_type: &ModelType) -> Result<&RuleSet, SchemaError> {
        self.rule_sets
            .get(model_type)
            .ok_or_else(|| SchemaError::unknown_model_type(model_type.clone()))
    }

    /// Returns whether a rule set is registered for the model type.
    #[must_use]
    pub fn contains(&self, model_type: &ModelType) -> bool {
        self.rule_sets.contains_key(model_type)
    }

    /// Expands a find target into the concrete device types to search.
    ///
    /// A group name expands to its members. Any other name is taken to be a
    /// concrete device type and expands to itself.
    #[must_use]
    pub fn members_of<'a>(&'a self, target: &'a DeviceType) -> &'a [DeviceType] {
        self.groups
            .get(target)
            .map_or_else(|| slice::from_ref(target), Vec::as_slice)
    }

    /// Returns the registered rule sets in registration order.
    pub fn rule_sets(&self) -> impl Iterator<Item = &RuleSet> {
        self.rule_sets.values()
    }

    /// Returns the registered groups in registration order.
    pub fn groups(&self) -> impl Iterator<Item = (&DeviceType, &[DeviceType])> {
        self.groups
            .iter()
            .map(|(group, members)| (group, members.as_slice()))
    }

    /// Returns the number of registered rule sets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rule_sets.len()
    }

    /// Returns whether no rule set is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rule_sets.is_empty()
    }
}

/// Collects rule sets and groups for a new `SchemaRegistry`.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    registry: SchemaRegistry,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles and registers a rule set.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DuplicateModelType` if a rule set for the same
    /// model type is already registered, or any error found while compiling
    /// the definition.
    pub fn register(&mut self, def: &RuleSetDef) -> Result<(), SchemaError> {
        let model_type = ModelType::new(&def.model);
        if self.registry.rule_sets.contains_key(&model_type) {
            return Err(SchemaError::duplicate_model_type(model_type));
        }

        let rule_set = compile(def)?;

        tracing::debug!(
            model = %model_type,
            destination = %rule_set.destination(),
            finds = rule_set.finds().len(),
            gets = rule_set.gets().len(),
            outputs = rule_set.outputs().len(),
            "registered rule set"
        );

        self.registry.rule_sets.insert(model_type, rule_set);
        Ok(())
    }

    /// Registers a device group.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DuplicateGroup` if a group with the same name is
    /// already registered.
    pub fn add_group(&mut self, def: &GroupDef) -> Result<(), SchemaError> {
        let group = DeviceType::new(&def.name);
        if self.registry.groups.contains_key(&group) {
            return Err(SchemaError::duplicate_group(group));
        }

        let members = def.members.iter().map(DeviceType::new).collect::<Vec<_>>();
        tracing::debug!(group = %group, members = members.len(), "registered device group");

        self.registry.groups.insert(group, members);
        Ok(())
    }

    /// Registers every group and rule set of a schema definition.
    ///
    /// Definitions that fail are skipped and the remaining ones are still
    /// registered, so that every defect is reported at once.
    ///
    /// # Errors
    ///
    /// Returns every error encountered, in definition order.
    pub fn load(&mut self, schema: &SchemaDef) -> Result<(), Vec<SchemaError>> {
        let mut errors = schema
            .groups
            .iter()
            .filter_map(|group| self.add_group(group).err())
            .collect::<Vec<_>>();

        errors.extend(
            schema
                .rule_sets
                .iter()
                .filter_map(|def| self.register(def).err()),
        );

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Finishes the registry.
    ///
    /// Get rules that read from a relation whose target is produced by
    /// registered rule sets are checked against those rule sets' outputs.
    /// Targets that are not produced by any rule set, such as power-flow
    /// devices supplied by the caller, are not checked.
    ///
    /// # Errors
    ///
    /// Returns every `SchemaError::UnknownSourceField` found.
    pub fn build(self) -> Result<SchemaRegistry, Vec<SchemaError>> {
        let registry = self.registry;
        let errors = registry
            .rule_sets
            .values()
            .flat_map(|rule_set| check_get_sources(&registry, rule_set))
            .collect::<Vec<_>>();

        if errors.is_empty() {
            tracing::debug!(
                rule_sets = registry.rule_sets.len(),
                groups = registry.groups.len(),
                "schema registry built"
            );
            Ok(registry)
        } else {
            Err(errors)
        }
    }
}

fn check_get_sources(registry: &SchemaRegistry, rule_set: &RuleSet) -> Vec<SchemaError> {
    let mut errors = vec![];

    for get in rule_set.gets() {
        let GetSource::Relation(relation) = get.source() else {
            continue;
        };

        let Some(find) = rule_set
            .finds()
            .iter()
            .find(|find| find.relation() == relation)
        else {
            continue;
        };

        for member in registry.members_of(find.target()) {
            let producers = registry
                .rule_sets
                .values()
                .filter(|producer| producer.destination() == member)
                .collect::<Vec<_>>();

            let missing = !producers.is_empty()
                && producers.iter().any(|producer| !producer.produces(get.src()));

            if missing {
                errors.push(SchemaError::unknown_source_field(
                    rule_set.model_type().clone(),
                    get.field().clone(),
                    member.clone(),
                    get.src().clone(),
                ));
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use dyrlink_ir::FieldName;

    use super::*;

    fn gencls() -> RuleSetDef {
        RuleSetDef::new("GENCLS", "GENCLS")
            .inputs(["BUS", "ID", "H"])
            .identity_fields(["BUS", "ID"])
            .find("gen", "StaticGen", [("bus", "BUS"), ("subidx", "ID")])
            .get("Sn", "gen", "Sn")
            .output("gen", "gen")
            .output("Sn", "Sn")
            .output_with("M", "H", "2 * x")
    }

    fn tgov1(src: &str) -> RuleSetDef {
        RuleSetDef::new("TGOV1", "TGOV1")
            .inputs(["BUS", "ID", "R"])
            .identity_relation("syn")
            .find("gen", "StaticGen", [("bus", "BUS"), ("subidx", "ID")])
            .find("syn", "SynGen", [("gen", "gen")])
            .get("Sn", "syn", src)
            .output("syn", "syn")
            .output("Sn", "Sn")
    }

    #[test]
    fn register_and_lookup() {
        // create the registry
        let mut builder = SchemaRegistry::builder();
        builder.register(&gencls()).expect("registration should succeed");
        let registry = builder.build().expect("build should succeed");

        // check the lookup
        let rule_set = registry
            .lookup(&ModelType::new("GENCLS"))
            .expect("rule set should exist");
        assert_eq!(rule_set.destination().as_str(), "GENCLS");
        assert!(rule_set.produces(&FieldName::new("M")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn lookup_unknown_model_type() {
        let registry = SchemaRegistry::default();

        let error = registry
            .lookup(&ModelType::new("GENSAL"))
            .expect_err("lookup should fail");
        assert_eq!(
            error,
            SchemaError::unknown_model_type(ModelType::new("GENSAL"))
        );
    }

    #[test]
    fn register_duplicate_model_type() {
        let mut builder = SchemaRegistry::builder();
        builder.register(&gencls()).expect("registration should succeed");

        let error = builder
            .register(&gencls())
            .expect_err("second registration should fail");
        assert_eq!(
            error,
            SchemaError::duplicate_model_type(ModelType::new("GENCLS"))
        );
    }

    #[test]
    fn members_of_group_and_concrete_type() {
        let mut builder = SchemaRegistry::builder();
        builder
            .add_group(&GroupDef::new("SynGen", ["GENCLS", "GENROU"]))
            .expect("group should register");
        let registry = builder.build().expect("build should succeed");

        let group = DeviceType::new("SynGen");
        let members = registry.members_of(&group);
        assert_eq!(
            members,
            &[DeviceType::new("GENCLS"), DeviceType::new("GENROU")]
        );

        let bus = DeviceType::new("Bus");
        assert_eq!(registry.members_of(&bus), &[DeviceType::new("Bus")]);
    }

    #[test]
    fn duplicate_group_is_rejected() {
        let mut builder = SchemaRegistry::builder();
        builder
            .add_group(&GroupDef::new("SynGen", ["GENCLS"]))
            .expect("group should register");

        let error = builder
            .add_group(&GroupDef::new("SynGen", ["GENROU"]))
            .expect_err("duplicate group should fail");
        assert_eq!(error, SchemaError::duplicate_group(DeviceType::new("SynGen")));
    }

    #[test]
    fn build_checks_get_source_fields() {
        // create a registry where TGOV1 reads a field GENCLS never produces
        let mut builder = SchemaRegistry::builder();
        builder
            .add_group(&GroupDef::new("SynGen", ["GENCLS"]))
            .expect("group should register");
        builder.register(&gencls()).expect("registration should succeed");
        builder
            .register(&tgov1("Tm0"))
            .expect("registration should succeed");

        // check the error
        let errors = builder.build().expect_err("build should fail");
        assert_eq!(
            errors,
            vec![SchemaError::unknown_source_field(
                ModelType::new("TGOV1"),
                FieldName::new("Sn"),
                DeviceType::new("GENCLS"),
                FieldName::new("Tm0"),
            )]
        );
    }

    #[test]
    fn build_skips_unproduced_targets() {
        // StaticGen members are supplied by the caller, so nothing is checked
        let mut builder = SchemaRegistry::builder();
        builder
            .add_group(&GroupDef::new("StaticGen", ["PV", "Slack"]))
            .expect("group should register");
        builder
            .register(&gencls().get("Vn", "gen", "Vn"))
            .expect("registration should succeed");

        builder.build().expect("build should succeed");
    }

    #[test]
    fn load_reports_every_error() {
        let schema = SchemaDef {
            groups: vec![
                GroupDef::new("SynGen", ["GENCLS"]),
                GroupDef::new("SynGen", ["GENROU"]),
            ],
            rule_sets: vec![gencls(), gencls(), tgov1("Sn")],
        };

        let mut builder = SchemaRegistry::builder();
        let errors = builder.load(&schema).expect_err("load should fail");
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], SchemaError::DuplicateGroup { .. }));
        assert!(matches!(errors[1], SchemaError::DuplicateModelType { .. }));

        // the valid definitions are still registered
        let registry = builder.build().expect("build should succeed");
        assert!(registry.contains(&ModelType::new("TGOV1")));
    }
}
