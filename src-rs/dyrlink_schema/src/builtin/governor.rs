//! Turbine governors.
//!
//! A governor attaches to the machine at its bus and reads the machine's
//! rating through `syn`.

use crate::def::{ConstantDef, RuleSetDef};

use super::on_syn_gen;

fn turbine_gov(model: &str) -> RuleSetDef {
    on_syn_gen(model)
        .inputs(["R"])
        .identity_relation("syn")
        .get("Sn", "syn", "Sn")
        .output("syn", "syn")
        .output("Sn", "Sn")
        .output("R", "R")
        .output_with("gain", "R", "1 / x")
        .output_constant("wref0", ConstantDef::Number(1.0))
}

/// Steam turbine governor.
pub fn tgov1() -> RuleSetDef {
    turbine_gov("TGOV1")
        .inputs(["T1", "VMAX", "VMIN", "T2", "T3", "Dt"])
        .outputs_same(["T1", "VMAX", "VMIN", "T2", "T3", "Dt"])
}

/// Simplified governor.
pub fn tg2() -> RuleSetDef {
    turbine_gov("TG2")
        .inputs(["T1", "T2", "pmax", "pmin"])
        .outputs_same(["T1", "T2", "pmax", "pmin"])
}
