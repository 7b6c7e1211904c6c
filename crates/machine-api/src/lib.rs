//! Machine API Definitions
//!
//! Kubernetes resource types consumed by the Azure machine actuator: the
//! Cluster API `Machine` custom resource, the Azure provider spec/status
//! embedded in it, and the well-known labels and annotations the actuator
//! reads and writes.

pub mod machine;
pub mod provider;
pub mod references;
pub mod role;

pub use machine::*;
pub use provider::*;
pub use references::*;
pub use role::*;
