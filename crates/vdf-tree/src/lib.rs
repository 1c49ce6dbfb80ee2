#![doc = include_str!("../README.md")]
//! Document tree for Valve KeyValues files.
//!
//! This crate holds the node types produced by the parser, lookups over them,
//! and the text writer.

mod node;
mod writer;

pub use node::{Document, KeyValue, Payload};
