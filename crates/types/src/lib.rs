//! Shared type definitions for the bstack resolution engine.
//!
//! Everything here is plain data: the closed dimension enumerations used to
//! key configuration catalogs, device records, credentials, the assembled
//! instruction set, and the error taxonomy surfaced to callers.

pub mod credentials;
pub mod device;
pub mod dimensions;
pub mod error;
pub mod instructions;

pub use credentials::Credentials;
pub use device::DeviceEntry;
pub use dimensions::{AutomationFramework, IntegrationPath, Language, PercyMode, Platform, TestFramework, UnknownDimensionValue};
pub use error::ResolutionError;
pub use instructions::InstructionSet;
