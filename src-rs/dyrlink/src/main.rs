//! Command-line front end for the dyrlink resolver

use std::{path::Path, process::ExitCode};

use clap::Parser;
use dyrlink_index::DeviceIndex;
use dyrlink_ir::ModelType;
use dyrlink_resolver::{ImportOptions, import_records};
use dyrlink_schema::{SchemaRegistry, builtin};
use dyrlink_shared::error::DyrlinkError;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use crate::command::{CliCommand, Commands, OutputArgs, SchemaArgs};

mod command;
mod print_error;
mod print_index;
mod print_schema;
mod reader;
mod stylesheet;

fn main() -> ExitCode {
    let cli = CliCommand::parse();

    match cli.command {
        Commands::Import {
            records,
            seed,
            strict,
            max_failures,
            schema,
            output,
        } => {
            init_output(&output);
            let options = ImportOptions::new()
                .with_strict(strict)
                .with_max_failures(max_failures);
            run_import(&records, seed.as_deref(), &options, &schema, &output)
        }
        Commands::Schema {
            model,
            schema,
            output,
        } => {
            init_output(&output);
            run_schema(model.as_deref(), &schema, &output)
        }
    }
}

fn init_output(output: &OutputArgs) {
    if output.no_colors {
        anstream::ColorChoice::Never.write_global();
    }

    let level = LevelFilter::from_level(output.log_level.into());
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!output.no_colors)
        .init();
}

fn run_import(
    records: &Path,
    seed: Option<&Path>,
    options: &ImportOptions,
    schema: &SchemaArgs,
    output: &OutputArgs,
) -> ExitCode {
    let Some(registry) = load_registry(schema, output) else {
        return ExitCode::FAILURE;
    };

    let index = match seed.map(load_seed).transpose() {
        Ok(index) => index.unwrap_or_default(),
        Err(error) => {
            print_error::print(&error, output.print_debug);
            return ExitCode::FAILURE;
        }
    };

    let records = match reader::read_records(records) {
        Ok(records) => records,
        Err(error) => {
            print_error::print(&DyrlinkError::from_error(&error, None), output.print_debug);
            return ExitCode::FAILURE;
        }
    };

    match import_records(records, &registry, index, options) {
        Ok(index) => {
            print_index::print(&index, output.print_debug);
            ExitCode::SUCCESS
        }
        Err(failed) => {
            let (index, report) = *failed;
            print_index::print(&index, output.print_debug);
            print_error::print_report(&report, output.print_debug);
            ExitCode::FAILURE
        }
    }
}

fn run_schema(model: Option<&str>, schema: &SchemaArgs, output: &OutputArgs) -> ExitCode {
    let Some(registry) = load_registry(schema, output) else {
        return ExitCode::FAILURE;
    };

    let Some(model) = model else {
        print_schema::print_summary(&registry, output.print_debug);
        return ExitCode::SUCCESS;
    };

    match registry.lookup(&ModelType::new(model)) {
        Ok(rule_set) => {
            print_schema::print_rule_set(rule_set, output.print_debug);
            ExitCode::SUCCESS
        }
        Err(error) => {
            print_error::print(&DyrlinkError::from_error(&error, None), output.print_debug);
            ExitCode::FAILURE
        }
    }
}

/// Builds the registry from the builtin rule sets and the rule file, printing
/// every schema error.
fn load_registry(schema: &SchemaArgs, output: &OutputArgs) -> Option<SchemaRegistry> {
    let mut builder = SchemaRegistry::builder();
    let mut errors = vec![];

    if !schema.no_builtins
        && let Err(builtin_errors) = builtin::register_all(&mut builder)
    {
        errors.extend(
            builtin_errors
                .iter()
                .map(|error| DyrlinkError::from_error(error, None)),
        );
    }

    if let Some(path) = &schema.rules {
        match reader::read_rules(path) {
            Ok(def) => {
                if let Err(schema_errors) = builder.load(&def) {
                    errors.extend(
                        schema_errors
                            .iter()
                            .map(|error| DyrlinkError::from_error(error, None)),
                    );
                }
            }
            Err(error) => errors.push(DyrlinkError::from_error(&error, None)),
        }
    }

    if !errors.is_empty() {
        for error in &errors {
            print_error::print(error, output.print_debug);
        }
        return None;
    }

    match builder.build() {
        Ok(registry) => Some(registry),
        Err(build_errors) => {
            for error in &build_errors {
                print_error::print(&DyrlinkError::from_error(error, None), output.print_debug);
            }
            None
        }
    }
}

fn load_seed(path: &Path) -> Result<DeviceIndex, DyrlinkError> {
    let devices = reader::read_seed(path).map_err(|error| DyrlinkError::from_error(&error, None))?;

    let mut index = DeviceIndex::new();
    for device in devices {
        index
            .register(device)
            .map_err(|error| DyrlinkError::from_error(&error, None))?;
    }

    tracing::info!(devices = index.len(), "seeded device index");
    Ok(index)
}
