//! Printing of registered groups and rule sets

use anstream::println;
use dyrlink_ir::{DeviceType, FieldName};
use dyrlink_schema::{
    FindRule, GetRule, GetSource, IdentityRule, OutputRule, RuleSet, SchemaRegistry, Source,
    Transform,
};

use crate::stylesheet;

/// Prints the groups and a one-line summary of every rule set.
pub fn print_summary(registry: &SchemaRegistry, print_debug: bool) {
    if print_debug {
        println!("{registry:?}");
        return;
    }

    for (group, members) in registry.groups() {
        let styled_group = stylesheet::DEVICE_TYPE.style(group.as_str());
        let members = members
            .iter()
            .map(DeviceType::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        println!("{styled_group} = {{ {members} }}");
    }

    if registry.groups().next().is_some() {
        println!();
    }

    for rule_set in registry.rule_sets() {
        let styled_model = stylesheet::MODEL_TYPE.style(rule_set.model_type().as_str());
        println!(
            "{styled_model} -> {} ({} inputs, {} finds, {} gets, {} outputs)",
            rule_set.destination(),
            rule_set.inputs().len(),
            rule_set.finds().len(),
            rule_set.gets().len(),
            rule_set.outputs().len(),
        );
    }
}

/// Prints a single rule set in full.
pub fn print_rule_set(rule_set: &RuleSet, print_debug: bool) {
    if print_debug {
        println!("{rule_set:?}");
        return;
    }

    let styled_model = stylesheet::MODEL_TYPE.style(rule_set.model_type().as_str());
    println!("{styled_model} -> {}", rule_set.destination());

    let inputs = rule_set
        .inputs()
        .iter()
        .map(FieldName::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    println!("  {} {inputs}", keyword("inputs"));
    println!("  {} {}", keyword("identity"), identity_to_string(rule_set.identity()));

    for find in rule_set.finds() {
        println!("  {}", find_to_string(find));
    }

    for get in rule_set.gets() {
        println!("  {}", get_to_string(get));
    }

    for output in rule_set.outputs() {
        println!("  {}", output_to_string(output));
    }
}

fn keyword(word: &str) -> String {
    stylesheet::RULE_KEYWORD.style(word).to_string()
}

fn source_to_string(source: &Source) -> String {
    match source {
        Source::Input(_) | Source::Relation(_) | Source::Get(_) => {
            source.name().unwrap_or_default().to_string()
        }
        Source::Constant(value) => value.to_string(),
    }
}

fn identity_to_string(identity: &IdentityRule) -> String {
    match identity {
        IdentityRule::Fields(sources) => sources
            .iter()
            .map(source_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        IdentityRule::Relation(relation) => format!("key of `{relation}`"),
    }
}

fn find_to_string(find: &FindRule) -> String {
    // find gen: StaticGen { bus = BUS, subidx = ID }
    let clauses = find
        .clauses()
        .iter()
        .map(|clause| format!("{} = {}", clause.field(), source_to_string(clause.source())))
        .collect::<Vec<_>>()
        .join(", ");
    let kind = if find.allow_none() { "find?" } else { "find" };

    format!(
        "{} {}: {} {{ {clauses} }}",
        keyword(kind),
        find.relation(),
        find.target()
    )
}

fn get_to_string(get: &GetRule) -> String {
    // get Vn = Bus[BUS].Vn
    let from = match get.source() {
        GetSource::Relation(relation) => relation.to_string(),
        GetSource::Keyed { device_type, key } => {
            format!("{device_type}[{}]", source_to_string(key))
        }
    };

    format!("{} {} = {from}.{}", keyword("get"), get.field(), get.src())
}

fn output_to_string(output: &OutputRule) -> String {
    // output M = H |> x * 2
    let styled_field = stylesheet::FIELD_NAME.style(output.field().as_str());
    let source = source_to_string(output.source());

    match output.transform() {
        Transform::Identity => format!("{} {styled_field} = {source}", keyword("output")),
        transform @ (Transform::ScaleBy(_)
        | Transform::Offset(_)
        | Transform::Reciprocal
        | Transform::NullifyZero) => {
            format!("{} {styled_field} = {source} |> {transform}", keyword("output"))
        }
    }
}
