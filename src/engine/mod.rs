//! Движок хранения: кодек ODS и файловый фасад.

pub mod ods;

pub use ods::*;
