#![cfg_attr(doc, doc = include_str!("../README.md"))]
//! Shared utilities for the dyrlink dynamic-data resolver

pub mod error;
