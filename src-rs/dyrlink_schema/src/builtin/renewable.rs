//! Second-generation renewable energy models.
//!
//! The wind turbine models form a chain in which each stage attaches to the
//! previous one: converter (`REGCA1`), electrical control (`REECA1`), drive
//! train (`WTDTA1`), aerodynamics (`WTARA1`), pitch control (`WTPTA1`) and
//! torque control (`WTTQA1`). Each record therefore has to be preceded by
//! the records of every earlier stage.

use crate::def::RuleSetDef;

use super::on_static_gen;

fn on_ren_gen(model: &str) -> RuleSetDef {
    on_static_gen(model).find("reg", "RenGen", [("gen", "gen")])
}

fn on_ren_exciter(model: &str) -> RuleSetDef {
    on_ren_gen(model).find("ree", "RenExciter", [("reg", "reg")])
}

fn on_ren_governor(model: &str) -> RuleSetDef {
    on_ren_exciter(model).find("rego", "RenGovernor", [("ree", "ree")])
}

fn on_ren_aerodynamics(model: &str) -> RuleSetDef {
    on_ren_governor(model).find("rea", "RenAerodynamics", [("rego", "rego")])
}

/// Renewable energy generator/converter.
pub fn regca1() -> RuleSetDef {
    let params = [
        "Lvplsw", "Tg", "Rrpwr", "Brkpt", "Zerox", "Lvpl1", "Volim", "Lvpnt1", "Lvpnt0", "Iolim",
        "Tfltr", "Khv", "Iqrmax", "Iqrmin", "Accel",
    ];

    on_static_gen("REGCA1")
        .inputs(params)
        .identity_fields(["BUS", "ID"])
        .get("Sn", "gen", "Sn")
        .output("bus", "BUS")
        .output("gen", "gen")
        .output("Sn", "Sn")
        .outputs_same(params)
}

/// Renewable energy electrical control.
///
/// The voltage-dependent current limits are piecewise-linear curves in
/// which unused points are given as zero.
pub fn reeca1() -> RuleSetDef {
    let params = [
        "PFFLAG", "VFLAG", "QFLAG", "PFLAG", "PQFLAG", "Vdip", "Vup", "Trv", "dbd1", "dbd2",
        "Kqv", "Iqh1", "Iql1", "Vref0", "Iqfrz", "Thld", "Thld2", "Tp", "QMax", "QMin", "VMAX",
        "VMIN", "Kqp", "Kqi", "Kvp", "Kvi", "Vref1", "Tiq", "dPmax", "dPmin", "PMAX", "PMIN",
        "Imax", "Tpord",
    ];

    on_ren_gen("REECA1")
        .inputs(params)
        .inputs(["VDL1", "VDL2"])
        .identity_relation("reg")
        .get("Sn", "reg", "Sn")
        .output("reg", "reg")
        .output("Sn", "Sn")
        .outputs_same(params)
        .output_with("VDL1", "VDL1", "nullify_zero(x)")
        .output_with("VDL2", "VDL2", "nullify_zero(x)")
}

/// Renewable energy plant control.
pub fn repca1() -> RuleSetDef {
    let params = [
        "VCFlag", "RefFlag", "Fflag", "Tfltr", "Kp", "Ki", "Tft", "Tfv", "Vfrz", "Rc", "Xc", "Kc",
        "emax", "emin", "dbd1", "dbd2", "Qmax", "Qmin", "Kpg", "Kig", "Tp", "fdbd1", "fdbd2",
        "femax", "femin", "Pmax", "Pmin", "Tg", "Ddn", "Dup",
    ];

    on_ren_exciter("REPCA1")
        .inputs(params)
        .identity_relation("ree")
        .output("ree", "ree")
        .outputs_same(params)
}

/// Wind turbine drive train.
pub fn wtdta1() -> RuleSetDef {
    let params = ["H", "DAMP", "Htfrac", "Freq1", "Dshaft"];

    on_ren_exciter("WTDTA1")
        .inputs(params)
        .identity_relation("ree")
        .output("ree", "ree")
        .outputs_same(params)
}

/// Wind turbine aerodynamics.
pub fn wtara1() -> RuleSetDef {
    on_ren_governor("WTARA1")
        .inputs(["Ka", "theta0"])
        .identity_relation("rego")
        .output("rego", "rego")
        .outputs_same(["Ka", "theta0"])
}

/// Wind turbine pitch control.
pub fn wtpta1() -> RuleSetDef {
    let params = [
        "Kiw", "Kpw", "Kic", "Kpc", "Kcc", "Tp", "thmax", "thmin", "dthmax", "dthmin",
    ];

    on_ren_aerodynamics("WTPTA1")
        .inputs(params)
        .identity_relation("rea")
        .output("rea", "rea")
        .outputs_same(params)
}

/// Wind turbine torque control.
///
/// Reads the turbine inertia and initial pitch angle back through the
/// chain, so that the torque controller can be initialised on its own.
pub fn wttqa1() -> RuleSetDef {
    let params = [
        "Tflag", "Kpp", "Kip", "Tp", "Twref", "Temax", "Temin", "p1", "sp1", "p2", "sp2", "p3",
        "sp3", "p4", "sp4", "Tn",
    ];

    on_ren_aerodynamics("WTTQA1")
        .find("rep", "RenPitch", [("rea", "rea")])
        .inputs(params)
        .identity_relation("rep")
        .get("Ht", "rego", "H")
        .get("theta0", "rea", "theta0")
        .output("rep", "rep")
        .output("Ht", "Ht")
        .output("theta0", "theta0")
        .outputs_same(params)
}
