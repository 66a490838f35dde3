//! Compilation of rule set definitions.
//!
//! Compiling checks that every name a rule refers to is bound at the point
//! where the rule runs: inputs first, then find relations in order, then get
//! results in order. Output rules may refer to any of these. Find chains are
//! checked for cycles before scoping so that a self-referencing relation is
//! reported as a cycle rather than as an unbound name.

use std::collections::HashSet;

use indexmap::IndexMap;

use dyrlink_ir::{DeviceType, FieldName, ModelType, RelationName};

use crate::{
    def::{FindDef, GetSourceDef, IdentityDef, RuleSetDef, SourceDef},
    error::SchemaError,
    rule::{Clause, FindRule, GetRule, GetSource, IdentityRule, OutputRule, RuleSet, Source},
    transform::Transform,
    util::Stack,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Binding {
    Input,
    Relation { allow_none: bool },
    Get,
}

struct Scope<'a> {
    model_type: &'a ModelType,
    bindings: IndexMap<&'a str, Binding>,
    declared: HashSet<&'a str>,
}

impl<'a> Scope<'a> {
    fn new(model_type: &'a ModelType, def: &'a RuleSetDef) -> Self {
        let declared = def
            .find
            .iter()
            .map(|find| find.relation.as_str())
            .chain(def.get.iter().map(|get| get.field.as_str()))
            .collect();

        Self {
            model_type,
            bindings: IndexMap::new(),
            declared,
        }
    }

    fn bind(&mut self, name: &'a str, binding: Binding) -> Result<(), SchemaError> {
        if self.bindings.contains_key(name) {
            return Err(SchemaError::duplicate_binding(
                self.model_type.clone(),
                name.to_string(),
            ));
        }

        self.bindings.insert(name, binding);
        Ok(())
    }

    fn resolve(&self, rule: &str, name: &str) -> Result<Source, SchemaError> {
        match self.bindings.get(name) {
            Some(Binding::Input) => Ok(Source::Input(FieldName::new(name))),
            Some(Binding::Relation { .. }) => Ok(Source::Relation(RelationName::new(name))),
            Some(Binding::Get) => Ok(Source::Get(FieldName::new(name))),
            None => Err(self.unbound(rule, name)),
        }
    }

    fn resolve_relation(&self, rule: &str, name: &str) -> Result<(RelationName, bool), SchemaError> {
        match self.bindings.get(name) {
            Some(Binding::Relation { allow_none }) => Ok((RelationName::new(name), *allow_none)),
            Some(Binding::Input | Binding::Get) => Err(SchemaError::not_a_relation(
                self.model_type.clone(),
                rule.to_string(),
                name.to_string(),
            )),
            None => Err(self.unbound(rule, name)),
        }
    }

    fn unbound(&self, rule: &str, name: &str) -> SchemaError {
        SchemaError::unbound_reference(
            self.model_type.clone(),
            rule.to_string(),
            name.to_string(),
            self.declared.contains(name),
        )
    }
}

/// Compiles a definition into a rule set.
///
/// # Errors
///
/// Returns the first configuration defect found in the definition.
pub fn compile(def: &RuleSetDef) -> Result<RuleSet, SchemaError> {
    let model_type = ModelType::new(&def.model);

    check_find_cycles(&model_type, def)?;

    let mut scope = Scope::new(&model_type, def);

    for input in &def.inputs {
        scope.bind(input, Binding::Input)?;
    }

    let mut finds = Vec::with_capacity(def.find.len());
    for find in &def.find {
        let rule = format!("find `{}`", find.relation);

        let clauses = find
            .matches
            .iter()
            .map(|(field, name)| Ok(Clause::new(FieldName::new(field), scope.resolve(&rule, name)?)))
            .collect::<Result<Vec<_>, SchemaError>>()?;

        scope.bind(
            &find.relation,
            Binding::Relation {
                allow_none: find.allow_none,
            },
        )?;

        finds.push(FindRule::new(
            RelationName::new(&find.relation),
            DeviceType::new(&find.target),
            clauses,
            find.allow_none,
        ));
    }

    let mut gets = Vec::with_capacity(def.get.len());
    for get in &def.get {
        let rule = format!("get `{}`", get.field);

        let source = match &get.from {
            GetSourceDef::Relation(relation) => {
                let (relation, _) = scope.resolve_relation(&rule, relation)?;
                GetSource::Relation(relation)
            }
            GetSourceDef::Keyed { device_type, key } => GetSource::Keyed {
                device_type: DeviceType::new(device_type),
                key: scope.resolve(&rule, key)?,
            },
        };

        scope.bind(&get.field, Binding::Get)?;

        gets.push(GetRule::new(
            FieldName::new(&get.field),
            source,
            FieldName::new(&get.src),
        ));
    }

    let mut output_names = HashSet::new();
    let mut outputs = Vec::with_capacity(def.outputs.len());
    for output in &def.outputs {
        let field = FieldName::new(&output.field);
        let rule = format!("output `{field}`");

        if !output_names.insert(output.field.as_str()) {
            return Err(SchemaError::duplicate_binding(
                model_type.clone(),
                output.field.clone(),
            ));
        }

        let source = match &output.source {
            SourceDef::Binding(name) => scope.resolve(&rule, name)?,
            SourceDef::Constant { constant } => Source::Constant(constant.clone().into()),
        };

        let transform = match &output.transform {
            Some(text) => Transform::parse(text).map_err(|error| {
                SchemaError::invalid_transform(model_type.clone(), field.clone(), error)
            })?,
            None => Transform::Identity,
        };

        outputs.push(OutputRule::new(field, source, transform));
    }

    let identity = compile_identity(&scope, &def.identity)?;

    Ok(RuleSet::new(
        model_type.clone(),
        DeviceType::new(&def.destination),
        def.inputs.iter().map(FieldName::new).collect(),
        identity,
        finds,
        gets,
        outputs,
    ))
}

fn compile_identity(scope: &Scope<'_>, identity: &IdentityDef) -> Result<IdentityRule, SchemaError> {
    const RULE: &str = "identity";

    match identity {
        IdentityDef::Fields(fields) if fields.is_empty() => Err(SchemaError::invalid_identity(
            scope.model_type.clone(),
            "no identity fields are declared",
        )),
        IdentityDef::Fields(fields) => fields
            .iter()
            .map(|name| scope.resolve(RULE, name))
            .collect::<Result<Vec<_>, _>>()
            .map(IdentityRule::Fields),
        IdentityDef::Relation(relation) => {
            let (relation, allow_none) = scope.resolve_relation(RULE, relation)?;
            if allow_none {
                return Err(SchemaError::invalid_identity(
                    scope.model_type.clone(),
                    format!("relation `{relation}` may be absent"),
                ));
            }
            Ok(IdentityRule::Relation(relation))
        }
    }
}

/// Reports a find rule whose predicate depends on its own relation.
fn check_find_cycles(model_type: &ModelType, def: &RuleSetDef) -> Result<(), SchemaError> {
    let inputs = def.inputs.iter().map(String::as_str).collect::<HashSet<_>>();
    let relations = def
        .find
        .iter()
        .map(|find| (find.relation.as_str(), find))
        .collect::<IndexMap<_, _>>();

    for find in &def.find {
        let mut stack = Stack::new();
        visit_find(&find.relation, &relations, &inputs, &mut stack).map_err(|chain| {
            SchemaError::circular_reference(model_type.clone(), chain)
        })?;
    }

    Ok(())
}

fn visit_find<'a>(
    relation: &'a str,
    relations: &IndexMap<&'a str, &'a FindDef>,
    inputs: &HashSet<&'a str>,
    stack: &mut Stack<&'a str>,
) -> Result<(), Vec<String>> {
    if let Some(chain) = stack.find_circular_dependency(&relation) {
        return Err(chain.into_iter().map(str::to_string).collect());
    }

    let Some(find) = relations.get(relation) else {
        return Ok(());
    };

    stack.push(relation);
    for name in find.matches.values() {
        if !inputs.contains(name.as_str()) {
            visit_find(name, relations, inputs, stack)?;
        }
    }
    stack.pop();

    Ok(())
}

#[cfg(test)]
mod tests {
    use dyrlink_ir::Value;

    use super::*;
    use crate::def::ConstantDef;

    fn genrou() -> RuleSetDef {
        RuleSetDef::new("GENROU", "GENROU")
            .inputs(["BUS", "ID", "H", "Xd2"])
            .identity_fields(["BUS", "ID"])
            .find("gen", "StaticGen", [("bus", "BUS"), ("subidx", "ID")])
            .get("Sn", "gen", "Sn")
            .get_keyed("Vn", "Bus", "BUS", "Vn")
            .output("bus", "BUS")
            .output("gen", "gen")
            .output("Sn", "Sn")
            .output_with("M", "H", "2 * x")
            .output_constant("D", ConstantDef::Number(0.0))
    }

    #[test]
    fn compile_resolves_sources() {
        let rule_set = compile(&genrou()).expect("definition should compile");

        assert_eq!(rule_set.model_type().as_str(), "GENROU");
        assert_eq!(rule_set.inputs().len(), 4);

        // check the find predicate
        let find = &rule_set.finds()[0];
        assert_eq!(find.relation().as_str(), "gen");
        assert_eq!(
            find.clauses()[1].source(),
            &Source::Input(FieldName::new("ID"))
        );

        // check the get sources
        assert_eq!(
            rule_set.gets()[0].source(),
            &GetSource::Relation(RelationName::new("gen"))
        );
        assert!(matches!(
            rule_set.gets()[1].source(),
            GetSource::Keyed { key: Source::Input(_), .. }
        ));

        // check the outputs
        let outputs = rule_set.outputs();
        assert_eq!(outputs[1].source(), &Source::Relation(RelationName::new("gen")));
        assert_eq!(outputs[2].source(), &Source::Get(FieldName::new("Sn")));
        assert_eq!(outputs[3].transform(), Transform::ScaleBy(2.0));
        assert_eq!(outputs[4].source(), &Source::Constant(Value::Number(0.0)));

        assert_eq!(
            rule_set.identity(),
            &IdentityRule::Fields(vec![
                Source::Input(FieldName::new("BUS")),
                Source::Input(FieldName::new("ID")),
            ])
        );
    }

    #[test]
    fn find_may_depend_on_earlier_relation() {
        let def = RuleSetDef::new("IEEEST", "IEEEST")
            .inputs(["BUS", "ID"])
            .identity_relation("avr")
            .find("gen", "StaticGen", [("bus", "BUS"), ("subidx", "ID")])
            .find("syn", "SynGen", [("gen", "gen")])
            .find("avr", "Exciter", [("syn", "syn")]);

        let rule_set = compile(&def).expect("definition should compile");
        assert_eq!(
            rule_set.finds()[2].clauses()[0].source(),
            &Source::Relation(RelationName::new("syn"))
        );
    }

    #[test]
    fn identity_inputs_follow_relation_chain() {
        let def = RuleSetDef::new("TGOV1", "TGOV1")
            .inputs(["R", "BUS", "ID"])
            .identity_relation("syn")
            .find("gen", "StaticGen", [("bus", "BUS"), ("subidx", "ID")])
            .find("syn", "SynGen", [("gen", "gen")]);

        let rule_set = compile(&def).expect("definition should compile");
        let inputs = rule_set
            .identity_inputs()
            .into_iter()
            .map(FieldName::as_str)
            .collect::<Vec<_>>();
        assert_eq!(inputs, vec!["BUS", "ID"]);
    }

    #[test]
    fn find_referring_to_later_relation_is_unbound() {
        let def = RuleSetDef::new("ESST3A", "ESST3A")
            .inputs(["BUS", "ID"])
            .identity_fields(["BUS", "ID"])
            .find("syn", "SynGen", [("gen", "gen")])
            .find("gen", "StaticGen", [("bus", "BUS"), ("subidx", "ID")]);

        let error = compile(&def).expect_err("forward reference should fail");
        assert_eq!(
            error,
            SchemaError::unbound_reference(
                ModelType::new("ESST3A"),
                "find `syn`".to_string(),
                "gen".to_string(),
                true,
            )
        );
    }

    #[test]
    fn self_referencing_find_is_circular() {
        let def = RuleSetDef::new("EXST1", "EXST1")
            .inputs(["BUS", "ID"])
            .identity_fields(["BUS", "ID"])
            .find("syn", "SynGen", [("gen", "syn")]);

        let error = compile(&def).expect_err("cycle should fail");
        assert_eq!(
            error,
            SchemaError::circular_reference(
                ModelType::new("EXST1"),
                vec!["syn".to_string(), "syn".to_string()],
            )
        );
    }

    #[test]
    fn mutually_dependent_finds_are_circular() {
        let def = RuleSetDef::new("IEEEX1", "IEEEX1")
            .inputs(["BUS", "ID"])
            .identity_fields(["BUS", "ID"])
            .find("syn", "SynGen", [("gen", "gen")])
            .find("gen", "StaticGen", [("bus", "BUS"), ("syn", "syn")]);

        let error = compile(&def).expect_err("cycle should fail");
        let SchemaError::CircularReference { chain, .. } = error else {
            panic!("expected a circular reference, got {error:?}");
        };
        assert_eq!(chain, vec!["syn", "gen", "syn"]);
    }

    #[test]
    fn duplicate_binding_is_rejected() {
        let def = RuleSetDef::new("TGOV1", "TGOV1")
            .inputs(["BUS", "ID", "gen"])
            .identity_fields(["BUS", "ID"])
            .find("gen", "StaticGen", [("bus", "BUS"), ("subidx", "ID")]);

        let error = compile(&def).expect_err("duplicate should fail");
        assert_eq!(
            error,
            SchemaError::duplicate_binding(ModelType::new("TGOV1"), "gen".to_string())
        );
    }

    #[test]
    fn duplicate_output_is_rejected() {
        let def = RuleSetDef::new("GENCLS", "GENCLS")
            .inputs(["BUS", "ID", "H"])
            .identity_fields(["BUS", "ID"])
            .output("M", "H")
            .output_with("M", "H", "2 * x");

        let error = compile(&def).expect_err("duplicate should fail");
        assert!(matches!(error, SchemaError::DuplicateBinding { name, .. } if name == "M"));
    }

    #[test]
    fn get_from_input_is_not_a_relation() {
        let def = RuleSetDef::new("TG2", "TG2")
            .inputs(["BUS", "ID"])
            .identity_fields(["BUS", "ID"])
            .get("Sn", "BUS", "Sn");

        let error = compile(&def).expect_err("input is not a relation");
        assert!(matches!(error, SchemaError::NotARelation { name, .. } if name == "BUS"));
    }

    #[test]
    fn invalid_transform_is_rejected() {
        let def = RuleSetDef::new("GENCLS", "GENCLS")
            .inputs(["BUS", "ID", "H"])
            .identity_fields(["BUS", "ID"])
            .output_with("M", "H", "exp(x)");

        let error = compile(&def).expect_err("transform should fail");
        assert!(matches!(
            error,
            SchemaError::InvalidTransform {
                error: crate::transform::TransformError::UnknownFunction { .. },
                ..
            }
        ));
    }

    #[test]
    fn identity_must_not_be_empty() {
        let def = RuleSetDef::new("GENCLS", "GENCLS").inputs(["BUS", "ID"]);

        let error = compile(&def).expect_err("identity should fail");
        assert!(matches!(error, SchemaError::InvalidIdentity { .. }));
    }

    #[test]
    fn identity_relation_must_not_allow_none() {
        let def = RuleSetDef::new("IEEEST", "IEEEST")
            .inputs(["BUS", "ID"])
            .find_optional("busr", "Bus", [("idx", "BUS")])
            .identity_relation("busr");

        let error = compile(&def).expect_err("identity should fail");
        assert!(matches!(error, SchemaError::InvalidIdentity { .. }));
    }

    #[test]
    fn output_of_unknown_name_is_unbound() {
        let def = RuleSetDef::new("GENCLS", "GENCLS")
            .inputs(["BUS", "ID"])
            .identity_fields(["BUS", "ID"])
            .output("M", "H");

        let error = compile(&def).expect_err("output should fail");
        assert!(matches!(
            error,
            SchemaError::UnboundReference {
                declared_later: false,
                ..
            }
        ));
    }
}
