//! Import passes over the builtin PSS/E model rule sets.

#[cfg(test)]
mod tests {
    use dyrlink_index::DeviceIndex;
    use dyrlink_ir::{
        DeviceKey, DeviceRef, DeviceType, FieldName, ModelType, RawRecord, ResolvedDevice, Value,
    };
    use dyrlink_resolver::{
        ImportOptions, PassOutcome, ResolutionError, ResolutionStage, import_records,
    };
    use dyrlink_schema::{SchemaRegistry, builtin};

    fn builtin_registry() -> SchemaRegistry {
        builtin::registry().expect("builtin registry should build")
    }

    /// Builds a record with every input of the model set to `1.0`, then applies
    /// the overrides.
    fn record(registry: &SchemaRegistry, model: &str, overrides: &[(&str, Value)]) -> RawRecord {
        let model_type = ModelType::new(model);
        let rule_set = registry
            .lookup(&model_type)
            .expect("model should be builtin");

        let mut fields = rule_set
            .inputs()
            .iter()
            .map(|input| (input.clone(), Value::Number(1.0)))
            .collect::<indexmap::IndexMap<_, _>>();
        for (field, value) in overrides {
            fields.insert(FieldName::new(field), value.clone());
        }

        RawRecord::new(model_type, fields)
    }

    /// A record attached to the generator at bus 5, ID `'1'`.
    fn attached(registry: &SchemaRegistry, model: &str, overrides: &[(&str, Value)]) -> RawRecord {
        let mut all = vec![("BUS", Value::Number(5.0)), ("ID", Value::from("1"))];
        all.extend(overrides.iter().cloned());
        record(registry, model, &all)
    }

    fn device(device_type: &str, key: &str, fields: &[(&str, Value)]) -> ResolvedDevice {
        ResolvedDevice::new(
            DeviceType::new(device_type),
            DeviceKey::new(key),
            fields
                .iter()
                .map(|(field, value)| (FieldName::new(field), value.clone()))
                .collect(),
        )
    }

    /// Buses 5 and 6 with a PV generator on bus 5.
    fn power_flow() -> DeviceIndex {
        let mut index = DeviceIndex::new();
        for seed in [
            device("Bus", "5", &[("Vn", Value::Number(230.0))]),
            device("Bus", "6", &[("Vn", Value::Number(230.0))]),
            device(
                "PV",
                "PV_1",
                &[
                    ("bus", Value::Number(5.0)),
                    ("subidx", Value::from("1")),
                    ("Sn", Value::Number(100.0)),
                ],
            ),
        ] {
            index.register(seed).expect("seed device should be new");
        }
        index
    }

    fn import(registry: &SchemaRegistry, records: Vec<RawRecord>) -> DeviceIndex {
        import_records(records, registry, power_flow(), &ImportOptions::new())
            .unwrap_or_else(|failed| {
                let (_, report) = *failed;
                panic!("pass should be clean, {} records failed", report.failures().len())
            })
    }

    /// The key of every device attached to the generator at bus 5, ID `'1'`.
    fn attached_key() -> DeviceKey {
        DeviceKey::from_components(["5", "1"])
    }

    fn field<'a>(index: &'a DeviceIndex, device_type: &str, field: &str) -> &'a Value {
        index
            .get(&DeviceType::new(device_type), &attached_key())
            .and_then(|device| device.get(&FieldName::new(field)))
            .expect("device field should be present")
    }

    fn wind_turbine(registry: &SchemaRegistry) -> Vec<RawRecord> {
        vec![
            attached(registry, "REGCA1", &[]),
            attached(
                registry,
                "REECA1",
                &[("VDL1", Value::sequence([0.0, 2.0, 0.0, 4.0]))],
            ),
            attached(registry, "WTDTA1", &[("H", Value::Number(3.0))]),
            attached(registry, "WTARA1", &[("theta0", Value::Number(0.5))]),
            attached(registry, "WTPTA1", &[]),
            attached(registry, "WTTQA1", &[]),
        ]
    }

    #[test]
    fn machine_with_controllers() {
        let registry = builtin_registry();
        let records = vec![
            attached(&registry, "GENROU", &[("H", Value::Number(4.0)), ("Xd2", Value::Number(0.2))]),
            attached(&registry, "TGOV1", &[("R", Value::Number(0.5))]),
            attached(&registry, "IEEEX1", &[]),
            attached(
                &registry,
                "IEEEST",
                &[
                    ("BUSR", Value::Number(0.0)),
                    ("VCU", Value::Number(0.0)),
                    ("VCL", Value::Number(0.9)),
                ],
            ),
        ];

        let index = import(&registry, records);

        let machine = DeviceRef::new(DeviceType::new("GENROU"), attached_key());
        assert_eq!(field(&index, "GENROU", "M"), &Value::Number(8.0));
        assert_eq!(field(&index, "GENROU", "xq2"), &Value::Number(0.2));
        assert_eq!(field(&index, "GENROU", "Vn"), &Value::Number(230.0));

        assert_eq!(field(&index, "TGOV1", "syn"), &Value::Device(machine));
        assert_eq!(field(&index, "TGOV1", "Sn"), &Value::Number(100.0));
        assert_eq!(field(&index, "TGOV1", "gain"), &Value::Number(2.0));
        assert_eq!(field(&index, "TGOV1", "wref0"), &Value::Number(1.0));

        let exciter = DeviceRef::new(DeviceType::new("IEEEX1"), attached_key());
        assert_eq!(field(&index, "IEEEST", "avr"), &Value::Device(exciter));
        assert_eq!(field(&index, "IEEEST", "busr"), &Value::Absent);
        assert_eq!(field(&index, "IEEEST", "VCU"), &Value::Absent);
        assert_eq!(field(&index, "IEEEST", "VCL"), &Value::Number(0.9));
    }

    #[test]
    fn stabilizer_with_remote_bus() {
        let registry = builtin_registry();
        let records = vec![
            attached(&registry, "GENCLS", &[]),
            attached(&registry, "EXST1", &[]),
            attached(
                &registry,
                "ST2CUT",
                &[("BUSR", Value::Number(6.0)), ("BUSR2", Value::Number(0.0))],
            ),
        ];

        let index = import(&registry, records);

        let remote = DeviceRef::new(DeviceType::new("Bus"), DeviceKey::new("6"));
        assert_eq!(field(&index, "ST2CUT", "busr"), &Value::Device(remote));
        assert_eq!(field(&index, "ST2CUT", "busr2"), &Value::Absent);
    }

    #[test]
    fn stabilizer_limits_are_mirrored() {
        let registry = builtin_registry();
        let records = vec![
            attached(&registry, "GENCLS", &[]),
            attached(&registry, "ESST3A", &[]),
            attached(&registry, "STAB2A", &[("HLIM", Value::Number(0.1))]),
        ];

        let index = import(&registry, records);

        assert_eq!(field(&index, "STAB2A", "HLIM_MAX"), &Value::Number(0.1));
        assert_eq!(field(&index, "STAB2A", "HLIM_MIN"), &Value::Number(-0.1));
    }

    #[test]
    fn wind_turbine_chain_reads_back_through_relations() {
        let registry = builtin_registry();

        let index = import(&registry, wind_turbine(&registry));

        assert_eq!(
            field(&index, "REECA1", "VDL1"),
            &Value::Sequence(vec![None, Some(2.0), None, Some(4.0)])
        );
        assert_eq!(field(&index, "REECA1", "Sn"), &Value::Number(100.0));
        assert_eq!(field(&index, "WTTQA1", "Ht"), &Value::Number(3.0));
        assert_eq!(field(&index, "WTTQA1", "theta0"), &Value::Number(0.5));
    }

    #[test]
    fn wind_turbine_chain_with_missing_stage() {
        let registry = builtin_registry();
        let mut records = wind_turbine(&registry);
        // drop the aerodynamics record
        records.remove(3);

        let (index, report) = *import_records(records, &registry, power_flow(), &ImportOptions::new())
            .expect_err("the later stages should fail");

        assert!(index.contains(&DeviceType::new("WTDTA1"), &attached_key()));
        assert!(!index.contains(&DeviceType::new("WTTQA1"), &attached_key()));

        // the pitch and torque controllers both need the aerodynamics stage
        let failures = report.failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].model_type(), &ModelType::new("WTPTA1"));
        assert_eq!(failures[1].model_type(), &ModelType::new("WTTQA1"));
        for failure in failures {
            assert_eq!(failure.stage(), ResolutionStage::FindResolved);
            assert_eq!(failure.identity(), "BUS = 5, ID = '1'");
            assert!(matches!(
                failure.error(),
                ResolutionError::UnresolvedReference { relation, .. } if relation == "rea"
            ));
        }
    }

    #[test]
    fn controller_before_its_machine_is_unresolved() {
        let registry = builtin_registry();
        let records = vec![
            attached(&registry, "TGOV1", &[]),
            attached(&registry, "GENCLS", &[]),
        ];

        let (index, report) = *import_records(records, &registry, power_flow(), &ImportOptions::new())
            .expect_err("the governor comes first");

        assert!(index.contains(&DeviceType::new("GENCLS"), &attached_key()));
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].position(), 0);
        assert_eq!(report.outcome(), PassOutcome::Completed);
    }

    #[test]
    fn two_machines_on_one_generator_conflict() {
        let registry = builtin_registry();
        let records = vec![
            attached(&registry, "GENCLS", &[]),
            attached(&registry, "GENCLS", &[("ID", Value::Number(1.0))]),
        ];

        let (_, report) = *import_records(records, &registry, power_flow(), &ImportOptions::new())
            .expect_err("the second record has the same identity");

        let failure = &report.failures()[0];
        assert_eq!(failure.stage(), ResolutionStage::Instantiated);
        assert!(matches!(failure.error(), ResolutionError::DuplicateKey { .. }));
    }

    #[test]
    fn identical_input_gives_identical_index() {
        let registry = builtin_registry();
        let records = || {
            let mut records = vec![attached(&registry, "GENROU", &[])];
            records.extend(wind_turbine(&registry));
            records.push(attached(&registry, "TG2", &[("R", Value::Number(0.0))]));
            records
        };

        let first = import_records(records(), &registry, power_flow(), &ImportOptions::new());
        let second = import_records(records(), &registry, power_flow(), &ImportOptions::new());

        assert_eq!(first, second);
    }
}
