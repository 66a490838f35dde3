//! Diagnostic formatting and display functionality
//
//       error: no `StaticGen` device found for `gen`
//        --> record #3 (GENROU BUS = 7, ID = '1')
//         = note: searched for bus = 7, subidx = '1'
//         = help: records must come after the records of the devices they refer to
//         = note: the record failed while finding related devices

use anstream::eprintln;
use dyrlink_resolver::{ImportReport, PassOutcome};
use dyrlink_shared::error::{Context, DyrlinkError, RecordLocation};
use owo_colors::{OwoColorize, Style};

use crate::stylesheet;

/// Prints a formatted diagnostic to stderr
pub fn print(error: &DyrlinkError, print_debug: bool) {
    if print_debug {
        eprintln!("{error:?}");
    } else {
        let error_string = error_to_string(error);
        eprintln!("{error_string}");
    }
}

/// Prints every failure of an import pass followed by a summary line
pub fn print_report(report: &ImportReport, print_debug: bool) {
    for failure in report.failures() {
        let error = failure.to_diagnostic();
        if print_debug {
            eprintln!("{error:?}");
            continue;
        }

        let stage = format!("the record failed while {}", failure.stage().activity());
        let lines = [
            error_to_string(&error),
            get_context_line(&Context::Note(stage)),
            String::new(),
        ];
        eprintln!("{}", lines.join("\n"));
    }

    eprintln!("{}", summary_line(report));
}

/// Converts a diagnostic to a formatted string representation
fn error_to_string(error: &DyrlinkError) -> String {
    let message_line = get_message_line("error", stylesheet::ERROR_COLOR, error.message());
    let location_line = error.location().map(get_location_line);
    let context_lines = error.context().iter().map(get_context_line);

    let mut lines = vec![message_line];
    lines.extend(location_line);
    lines.extend(context_lines);

    lines.join("\n")
}

/// Formats a message line with a colored prefix
fn get_message_line(kind: &str, kind_color: Style, message: &str) -> String {
    // <kind>: <message>
    let kind_str = kind_color.style(kind);
    let message_line = format!("{kind_str}: {message}");

    message_line.bold().to_string()
}

/// Formats the record location line
fn get_location_line(location: &RecordLocation) -> String {
    //  --> record #<position> (<model> <identity>)
    let arrow = stylesheet::LOCATION_ANNOTATION.style("-->");
    format!(" {arrow} {location}")
}

/// Formats a note or help line
fn get_context_line(context: &Context) -> String {
    //  = note: <message>
    let color = match context {
        Context::Note(_) => stylesheet::NOTE_COLOR,
        Context::Help(_) => stylesheet::HELP_COLOR,
    };
    let equals = color.bold().style("=");
    let message = get_message_line(context.label(), color, context.text());
    format!("  {equals} {message}")
}

fn summary_line(report: &ImportReport) -> String {
    let failed = report.failures().len();
    let counts = format!("{} resolved, {failed} failed", report.resolved());

    match report.outcome() {
        PassOutcome::Completed => get_message_line("warning", stylesheet::WARNING_COLOR, &counts),
        PassOutcome::Aborted { position, reason } => {
            let message = format!("import aborted after record #{position} ({reason}); {counts}");
            get_message_line("error", stylesheet::ERROR_COLOR, &message)
        }
    }
}
