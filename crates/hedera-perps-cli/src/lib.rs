/*
[INPUT]:  Crate modules
[OUTPUT]: Config and command helpers shared by the binary and tests
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod commands;
pub mod config;

pub use config::{AccountConfig, ApiConfig, CliConfig};
