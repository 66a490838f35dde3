#![cfg_attr(doc, doc = include_str!("../README.md"))]
//! Core value and device types for the dyrlink dynamic-data resolver

mod device;
mod name;
mod record;
mod value;

pub use device::{DeviceKey, DeviceRef, ResolvedDevice};
pub use name::{DeviceType, FieldName, ModelType, RelationName};
pub use record::RawRecord;
pub use value::{Value, ValueKind};
