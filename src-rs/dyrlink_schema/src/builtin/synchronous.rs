//! Synchronous machine models.

use crate::def::RuleSetDef;

use super::on_static_gen;

/// Classical machine model.
pub fn gencls() -> RuleSetDef {
    on_static_gen("GENCLS")
        .inputs(["H", "D"])
        .identity_fields(["BUS", "ID"])
        .get("Sn", "gen", "Sn")
        .get_keyed("Vn", "Bus", "BUS", "Vn")
        .output("bus", "BUS")
        .output("gen", "gen")
        .output("Sn", "Sn")
        .output("Vn", "Vn")
        .output_with("M", "H", "2 * x")
        .output("D", "D")
}

/// Round rotor machine model.
pub fn genrou() -> RuleSetDef {
    on_static_gen("GENROU")
        .inputs([
            "Td10", "Td20", "Tq10", "Tq20", "H", "D", "Xd", "Xq", "Xd1", "Xq1", "Xd2", "Xl", "S10",
            "S12",
        ])
        .identity_fields(["BUS", "ID"])
        .get("Sn", "gen", "Sn")
        .get_keyed("Vn", "Bus", "BUS", "Vn")
        .output("bus", "BUS")
        .output("gen", "gen")
        .output("Sn", "Sn")
        .output("Vn", "Vn")
        .output_with("M", "H", "2 * x")
        .output("D", "D")
        .output("xd", "Xd")
        .output("xq", "Xq")
        .output("xd1", "Xd1")
        .output("xq1", "Xq1")
        .output("xd2", "Xd2")
        // round rotor: subtransient reactances are equal
        .output("xq2", "Xd2")
        .output("xl", "Xl")
        .outputs_same(["Td10", "Td20", "Tq10", "Tq20", "S10", "S12"])
}
