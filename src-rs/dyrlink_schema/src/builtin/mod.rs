//! Builtin rule sets for PSS/E dynamic-data models.
//!
//! Power-flow devices (`Bus`, `PV`, `Slack`) are not produced by any rule
//! set. They are expected to be present in the device index before the first
//! record is resolved. A static generator is found by its bus number and
//! machine identifier; every dynamic model is attached, directly or through
//! a chain of relations, to one.

mod exciter;
mod governor;
mod pss;
mod renewable;
mod synchronous;

use crate::{
    def::{GroupDef, RuleSetDef},
    error::SchemaError,
    registry::{RegistryBuilder, SchemaRegistry},
};

/// Returns the builtin device groups.
#[must_use]
pub fn groups() -> Vec<GroupDef> {
    vec![
        GroupDef::new("StaticGen", ["PV", "Slack"]),
        GroupDef::new("SynGen", ["GENCLS", "GENROU"]),
        GroupDef::new("TurbineGov", ["TGOV1", "TG2"]),
        GroupDef::new("Exciter", ["IEEEX1", "ESST3A", "EXST1"]),
        GroupDef::new("PSS", ["IEEEST", "ST2CUT", "STAB2A"]),
        GroupDef::new("RenGen", ["REGCA1"]),
        GroupDef::new("RenExciter", ["REECA1"]),
        GroupDef::new("RenPlant", ["REPCA1"]),
        GroupDef::new("RenGovernor", ["WTDTA1"]),
        GroupDef::new("RenAerodynamics", ["WTARA1"]),
        GroupDef::new("RenPitch", ["WTPTA1"]),
        GroupDef::new("RenTorque", ["WTTQA1"]),
    ]
}

/// Returns the builtin rule set definitions.
#[must_use]
pub fn rule_sets() -> Vec<RuleSetDef> {
    vec![
        synchronous::gencls(),
        synchronous::genrou(),
        governor::tgov1(),
        governor::tg2(),
        exciter::ieeex1(),
        exciter::esst3a(),
        exciter::exst1(),
        pss::ieeest(),
        pss::st2cut(),
        pss::stab2a(),
        renewable::regca1(),
        renewable::reeca1(),
        renewable::repca1(),
        renewable::wtdta1(),
        renewable::wtara1(),
        renewable::wtpta1(),
        renewable::wttqa1(),
    ]
}

/// Registers the builtin groups and rule sets.
///
/// # Errors
///
/// Returns every error encountered, for example when a rule set with a
/// builtin model type was registered before.
pub fn register_all(builder: &mut RegistryBuilder) -> Result<(), Vec<SchemaError>> {
    let mut errors = groups()
        .iter()
        .filter_map(|group| builder.add_group(group).err())
        .collect::<Vec<_>>();

    errors.extend(
        rule_sets()
            .iter()
            .filter_map(|def| builder.register(def).err()),
    );

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Builds a registry holding only the builtin groups and rule sets.
///
/// # Errors
///
/// Returns every error encountered while registering or building.
pub fn registry() -> Result<SchemaRegistry, Vec<SchemaError>> {
    let mut builder = SchemaRegistry::builder();
    register_all(&mut builder)?;
    builder.build()
}

/// Starts a rule set attached to the static generator at `BUS`/`ID`.
///
/// The generator is bound to the relation `gen`.
fn on_static_gen(model: &str) -> RuleSetDef {
    RuleSetDef::new(model, model)
        .inputs(["BUS", "ID"])
        .find("gen", "StaticGen", [("bus", "BUS"), ("subidx", "ID")])
}

/// Starts a rule set attached to the synchronous machine at `BUS`/`ID`.
///
/// The machine is bound to the relation `syn`.
fn on_syn_gen(model: &str) -> RuleSetDef {
    on_static_gen(model).find("syn", "SynGen", [("gen", "gen")])
}

#[cfg(test)]
mod tests {
    use dyrlink_ir::{DeviceType, ModelType};

    use super::*;

    #[test]
    fn builtin_registry_builds() {
        let registry = registry().expect("builtin registry should build");

        assert_eq!(registry.len(), rule_sets().len());
        assert_eq!(registry.groups().count(), groups().len());
    }

    #[test]
    fn every_destination_belongs_to_a_group() {
        let registry = registry().expect("builtin registry should build");

        for rule_set in registry.rule_sets() {
            let in_group = registry
                .groups()
                .any(|(_, members)| members.contains(rule_set.destination()));
            assert!(in_group, "{} is not in any group", rule_set.destination());
        }
    }

    #[test]
    fn renewable_chain_is_registered() {
        let registry = registry().expect("builtin registry should build");

        let wttqa1 = registry
            .lookup(&ModelType::new("WTTQA1"))
            .expect("WTTQA1 should be registered");
        let targets = wttqa1
            .finds()
            .iter()
            .map(|find| find.target().clone())
            .collect::<Vec<_>>();

        assert_eq!(
            targets,
            ["StaticGen", "RenGen", "RenExciter", "RenGovernor", "RenAerodynamics", "RenPitch"]
                .map(DeviceType::new)
        );
    }

    #[test]
    fn registering_builtins_twice_fails() {
        let mut builder = SchemaRegistry::builder();
        register_all(&mut builder).expect("first registration should succeed");

        let errors = register_all(&mut builder).expect_err("second registration should fail");
        assert_eq!(errors.len(), groups().len() + rule_sets().len());
    }
}
