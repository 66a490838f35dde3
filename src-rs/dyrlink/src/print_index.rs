//! Printing of a resolved device index

use anstream::println;
use dyrlink_index::DeviceIndex;
use dyrlink_ir::{ResolvedDevice, Value};

use crate::stylesheet;

/// Prints every device in the index, grouped by device type.
pub fn print(index: &DeviceIndex, print_debug: bool) {
    if print_debug {
        println!("{index:?}");
        return;
    }

    for device_type in index.device_types() {
        let count = index.devices_of(device_type).count();
        let styled_type = stylesheet::DEVICE_TYPE.style(device_type.as_str());
        println!("{styled_type} ({count})");

        for device in index.devices_of(device_type) {
            print_device(device);
        }

        println!();
    }
}

fn print_device(device: &ResolvedDevice) {
    let styled_key = stylesheet::DEVICE_KEY.style(device.key().to_string());
    println!("  {styled_key}");

    for (field, value) in device.fields() {
        let styled_field = stylesheet::FIELD_NAME.style(field.as_str());
        println!("    {styled_field} = {}", styled_value(value));
    }
}

fn styled_value(value: &Value) -> String {
    match value {
        Value::Absent => stylesheet::ABSENT_VALUE.style(value).to_string(),
        Value::Device(device) => stylesheet::DEVICE_REF.style(device).to_string(),
        Value::Number(_) | Value::String(_) | Value::Sequence(_) => value.to_string(),
    }
}
