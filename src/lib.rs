//! UIX — compiles a small declarative UI + data-binding language into a
//! self-contained web document wired to an embedded relational store.

pub mod build;
pub mod config;
pub mod dsl;
pub mod error;
pub mod output;

pub use error::Error;
