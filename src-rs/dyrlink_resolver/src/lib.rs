#![cfg_attr(doc, doc = include_str!("../README.md"))]
//! Record resolution and the import pass for the dyrlink resolver
//!
//! # Example
//!
//! ```
//! use dyrlink_index::DeviceIndex;
//! use dyrlink_ir::{DeviceKey, DeviceType, FieldName, ModelType, RawRecord, ResolvedDevice, Value};
//! use dyrlink_resolver::{ImportOptions, import_records};
//! use dyrlink_schema::builtin;
//!
//! let registry = builtin::registry().expect("builtin registry should build");
//!
//! // the power-flow generator the dynamic record attaches to
//! let mut index = DeviceIndex::new();
//! index
//!     .register(ResolvedDevice::new(
//!         DeviceType::new("PV"),
//!         DeviceKey::new("PV_1"),
//!         [
//!             (FieldName::new("bus"), Value::Number(5.0)),
//!             (FieldName::new("subidx"), Value::from("1")),
//!             (FieldName::new("Sn"), Value::Number(100.0)),
//!         ]
//!         .into_iter()
//!         .collect(),
//!     ))
//!     .expect("PV_1 is new");
//! index
//!     .register(ResolvedDevice::new(
//!         DeviceType::new("Bus"),
//!         DeviceKey::new("5"),
//!         [(FieldName::new("Vn"), Value::Number(230.0))].into_iter().collect(),
//!     ))
//!     .expect("bus 5 is new");
//!
//! let record = RawRecord::new(
//!     ModelType::new("GENCLS"),
//!     [
//!         (FieldName::new("BUS"), Value::Number(5.0)),
//!         (FieldName::new("ID"), Value::from("1")),
//!         (FieldName::new("H"), Value::Number(3.5)),
//!         (FieldName::new("D"), Value::Number(0.0)),
//!     ]
//!     .into_iter()
//!     .collect(),
//! );
//!
//! let index = import_records([record], &registry, index, &ImportOptions::new())
//!     .expect("the record should resolve");
//! let machine = index
//!     .get(&DeviceType::new("GENCLS"), &DeviceKey::from_components(["5", "1"]))
//!     .expect("the machine is registered");
//! assert_eq!(machine.get(&FieldName::new("M")), Some(&Value::Number(7.0)));
//! ```

use dyrlink_index::DeviceIndex;
use dyrlink_ir::RawRecord;
use dyrlink_schema::SchemaRegistry;

mod error;
mod options;
mod report;
mod resolve;
mod stage;

#[cfg(test)]
mod test;

pub use crate::error::{ResolutionError, ResolutionFailure};
pub use crate::options::ImportOptions;
pub use crate::report::{AbortReason, ImportReport, PassOutcome, RecordFailure, render_identity};
pub use crate::resolve::{instantiate, resolve, resolve_record};
pub use crate::stage::ResolutionStage;

type ImportOk = DeviceIndex;
type ImportErr = Box<(DeviceIndex, ImportReport)>;

/// Resolves a sequence of records, in order, into a device index.
///
/// `index` may already hold devices that records refer to but that no rule
/// set produces, such as power-flow buses and generators. Each resolved
/// record is registered before the next one is processed.
///
/// A record that fails is skipped and recorded in the report, unless
/// `options` ask for the pass to stop. A record whose model type has no rule
/// set always stops the pass. Devices registered before the pass stops are
/// kept.
///
/// # Errors
///
/// Returns the index together with an `ImportReport` if any record failed.
pub fn import_records(
    records: impl IntoIterator<Item = RawRecord>,
    registry: &SchemaRegistry,
    mut index: DeviceIndex,
    options: &ImportOptions,
) -> Result<ImportOk, ImportErr> {
    let mut report = ImportReport::new();

    for (position, record) in records.into_iter().enumerate() {
        let failure = match resolve_record(&record, registry, &mut index) {
            Ok(device) => {
                tracing::debug!(position, model = %record.model_type(), %device, "resolved record");
                report.record_resolved();
                continue;
            }
            Err(failure) => failure,
        };

        let identity = render_identity(&record, registry);
        tracing::warn!(
            position,
            model = %record.model_type(),
            identity = %identity,
            stage = %failure.stage(),
            kind = failure.error().kind(),
            "skipped record: {}",
            failure.error()
        );

        let stage = failure.stage();
        let error = failure.into_error();
        let abort_reason = if error.is_fatal() {
            Some(AbortReason::UnknownModelType)
        } else if options.strict() {
            Some(AbortReason::Strict)
        } else {
            options
                .max_failures()
                .filter(|&limit| report.failures().len() + 1 >= limit)
                .map(AbortReason::FailureLimit)
        };

        report.add_failure(RecordFailure::new(
            position,
            record.model_type().clone(),
            identity,
            stage,
            error,
        ));

        if let Some(reason) = abort_reason {
            tracing::error!(position, %reason, "import pass aborted");
            report.abort(position, reason);
            break;
        }
    }

    tracing::info!(
        resolved = report.resolved(),
        failed = report.failures().len(),
        devices = index.len(),
        "import pass finished"
    );

    if report.is_clean() {
        Ok(index)
    } else {
        Err(Box::new((index, report)))
    }
}

#[cfg(test)]
mod tests {
    use dyrlink_ir::{DeviceKey, DeviceType};
    use dyrlink_schema::{GroupDef, RuleSetDef};

    use super::*;
    use crate::test::construct::{RecordBuilder, power_flow_index, registry};

    fn test_registry() -> SchemaRegistry {
        registry(
            &[GroupDef::new("StaticGen", ["PV"])],
            &[RuleSetDef::new("GENCLS", "GENCLS")
                .inputs(["BUS", "ID", "H"])
                .identity_fields(["BUS", "ID"])
                .find("gen", "StaticGen", [("bus", "BUS"), ("subidx", "ID")])
                .output_with("M", "H", "2 * x")],
        )
    }

    fn machine(bus: f64, id: &str) -> RawRecord {
        RecordBuilder::new("GENCLS")
            .with("BUS", bus)
            .with("ID", id)
            .with("H", 3.0)
            .build()
    }

    fn contains_machine(index: &DeviceIndex, bus: &str, id: &str) -> bool {
        index.contains(&DeviceType::new("GENCLS"), &DeviceKey::from_components([bus, id]))
    }

    #[test]
    fn clean_pass_returns_index() {
        let index = import_records(
            [machine(5.0, "1")],
            &test_registry(),
            power_flow_index(),
            &ImportOptions::new(),
        )
        .expect("pass should be clean");

        assert!(contains_machine(&index, "5", "1"));
    }

    #[test]
    fn failed_records_are_skipped() {
        let records = [machine(7.0, "1"), machine(5.0, "1"), machine(8.0, "2")];

        let (index, report) = *import_records(
            records,
            &test_registry(),
            power_flow_index(),
            &ImportOptions::new(),
        )
        .expect_err("two records should fail");

        assert!(contains_machine(&index, "5", "1"));
        assert_eq!(report.resolved(), 1);
        assert_eq!(report.outcome(), PassOutcome::Completed);

        let failures = report.failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].position(), 0);
        assert_eq!(failures[0].identity(), "BUS = 7, ID = '1'");
        assert_eq!(failures[0].stage(), ResolutionStage::FindResolved);
        assert_eq!(failures[1].position(), 2);
        assert_eq!(failures[1].identity(), "BUS = 8, ID = '2'");
    }

    #[test]
    fn strict_pass_stops_at_first_failure() {
        let records = [machine(7.0, "1"), machine(5.0, "1")];

        let (index, report) = *import_records(
            records,
            &test_registry(),
            power_flow_index(),
            &ImportOptions::new().with_strict(true),
        )
        .expect_err("first record should fail");

        assert!(!contains_machine(&index, "5", "1"));
        assert_eq!(report.failures().len(), 1);
        assert_eq!(
            report.outcome(),
            PassOutcome::Aborted {
                position: 0,
                reason: AbortReason::Strict,
            }
        );
    }

    #[test]
    fn failure_limit_stops_pass_and_keeps_earlier_devices() {
        let records = [
            machine(5.0, "1"),
            machine(7.0, "1"),
            machine(8.0, "1"),
            machine(9.0, "1"),
        ];

        let (index, report) = *import_records(
            records,
            &test_registry(),
            power_flow_index(),
            &ImportOptions::new().with_max_failures(Some(2)),
        )
        .expect_err("records should fail");

        assert!(contains_machine(&index, "5", "1"));
        assert_eq!(report.failures().len(), 2);
        assert_eq!(
            report.outcome(),
            PassOutcome::Aborted {
                position: 2,
                reason: AbortReason::FailureLimit(2),
            }
        );
    }

    #[test]
    fn unknown_model_type_always_stops_pass() {
        let records = [
            RecordBuilder::new("GENSAL").with("BUS", 5.0).build(),
            machine(5.0, "1"),
        ];

        let (index, report) = *import_records(
            records,
            &test_registry(),
            power_flow_index(),
            &ImportOptions::new(),
        )
        .expect_err("model type should be unknown");

        assert!(!contains_machine(&index, "5", "1"));
        assert_eq!(report.failures()[0].identity(), "");
        assert_eq!(
            report.outcome(),
            PassOutcome::Aborted {
                position: 0,
                reason: AbortReason::UnknownModelType,
            }
        );
    }

    #[test]
    fn failure_diagnostic_carries_record_location() {
        let (_, report) = *import_records(
            [machine(7.0, "1")],
            &test_registry(),
            power_flow_index(),
            &ImportOptions::new(),
        )
        .expect_err("record should fail");

        let diagnostic = report.failures()[0].to_diagnostic();
        let location = diagnostic.location().expect("location should be set");
        assert_eq!(location.position(), 0);
        assert_eq!(location.model_type(), "GENCLS");
        assert_eq!(location.identity(), "BUS = 7, ID = '1'");
    }
}
