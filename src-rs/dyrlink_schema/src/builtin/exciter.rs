//! Excitation systems.

use crate::def::RuleSetDef;

use super::on_syn_gen;

fn exciter(model: &str, params: &[&str]) -> RuleSetDef {
    on_syn_gen(model)
        .inputs(params.iter().copied())
        .identity_relation("syn")
        .output("syn", "syn")
        .output("bus", "BUS")
        .outputs_same(params.iter().copied())
}

/// IEEE type 1 excitation system.
pub fn ieeex1() -> RuleSetDef {
    exciter(
        "IEEEX1",
        &[
            "TR", "KA", "TA", "TB", "TC", "VRMAX", "VRMIN", "KE", "TE", "KF", "TF", "E1", "SE1",
            "E2", "SE2",
        ],
    )
}

/// IEEE type ST3A excitation system.
pub fn esst3a() -> RuleSetDef {
    exciter(
        "ESST3A",
        &[
            "TR", "VIMAX", "VIMIN", "KM", "TC", "TB", "KA", "TA", "VRMAX", "VRMIN", "KG", "KP",
            "KI", "VBMAX", "KC", "XL", "VGMAX", "THETAP", "TM", "VMMAX", "VMMIN",
        ],
    )
}

/// IEEE type ST1 excitation system.
pub fn exst1() -> RuleSetDef {
    exciter(
        "EXST1",
        &[
            "TR", "VIMAX", "VIMIN", "TC", "TB", "KA", "TA", "VRMAX", "VRMIN", "KC", "KF", "TF",
        ],
    )
}
