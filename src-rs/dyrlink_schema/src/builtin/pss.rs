//! Power system stabilizers.
//!
//! Stabilizers act on the excitation system of their machine, found through
//! `syn`. A remote bus number of `0` means the local bus, in which case no
//! `Bus` device matches and the remote bus relation is absent.

use crate::def::RuleSetDef;

use super::on_syn_gen;

fn stabilizer(model: &str) -> RuleSetDef {
    on_syn_gen(model)
        .find("avr", "Exciter", [("syn", "syn")])
        .identity_fields(["BUS", "ID"])
        .output("avr", "avr")
}

/// IEEE standard power system stabilizer.
pub fn ieeest() -> RuleSetDef {
    let params = [
        "MODE", "A1", "A2", "A3", "A4", "A5", "A6", "T1", "T2", "T3", "T4", "T5", "T6", "KS",
        "LSMAX", "LSMIN",
    ];

    stabilizer("IEEEST")
        .inputs(["BUSR"])
        .inputs(params)
        .inputs(["VCU", "VCL"])
        .find_optional("busr", "Bus", [("idx", "BUSR")])
        .output("busr", "busr")
        .outputs_same(params)
        .output_with("VCU", "VCU", "nullify_zero(x)")
        .output_with("VCL", "VCL", "nullify_zero(x)")
}

/// Dual-input stabilizer with two optional remote buses.
pub fn st2cut() -> RuleSetDef {
    let params = [
        "MODE", "MODE2", "K1", "K2", "T1", "T2", "T3", "T4", "T5", "T6", "T7", "T8", "T9", "T10",
        "LSMAX", "LSMIN",
    ];

    stabilizer("ST2CUT")
        .inputs(["BUSR", "BUSR2"])
        .inputs(params)
        .inputs(["VCU", "VCL"])
        .find_optional("busr", "Bus", [("idx", "BUSR")])
        .find_optional("busr2", "Bus", [("idx", "BUSR2")])
        .output("busr", "busr")
        .output("busr2", "busr2")
        .outputs_same(params)
        .output_with("VCU", "VCU", "nullify_zero(x)")
        .output_with("VCL", "VCL", "nullify_zero(x)")
}

/// ABB power system stabilizer with a symmetric output limit.
pub fn stab2a() -> RuleSetDef {
    let params = ["K2", "T2", "K3", "T3", "K4", "K5", "T5"];

    stabilizer("STAB2A")
        .inputs(params)
        .inputs(["HLIM"])
        .outputs_same(params)
        .output("HLIM_MAX", "HLIM")
        .output_with("HLIM_MIN", "HLIM", "-x")
}
