#![cfg_attr(doc, doc = include_str!("../README.md"))]
//! The device index for the dyrlink resolver

mod error;
mod index;
mod predicate;

pub use error::IndexError;
pub use index::DeviceIndex;
pub use predicate::{FindResult, Predicate};
