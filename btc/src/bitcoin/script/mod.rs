mod base;
mod builder;
pub mod opcodes;
mod witness_version;

pub use base::*;
pub use builder::*;
pub use opcodes::Opcode;
pub use witness_version::{WitnessVersion, WitnessVersionError};
