//! Azure Service Boundary
//!
//! Typed contracts for the three Azure services the machine actuator
//! orchestrates: virtual machines, network interfaces and VM extensions.
//! Concrete SDK-backed clients live outside this workspace; the actuator only
//! depends on the traits defined here.
//!
//! # Example
//!
//! ```no_run
//! use azure_services::{Lookup, VirtualMachineService};
//!
//! # async fn example(vms: &dyn VirtualMachineService) -> Result<(), Box<dyn std::error::Error>> {
//! match vms.get("worker-1").await? {
//!     Lookup::Found(vm) => println!("{} is {}", vm.name, vm.provisioning_state),
//!     Lookup::NotFound => println!("worker-1 has not been created yet"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Tagged lookups**: `get` results distinguish "absent" from "failed"
//! - **Deterministic naming**: resource names derived from cluster/machine names
//! - **Mocking**: `MockAzureServices` behind the `test-util` feature

pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod models;
pub mod naming;
#[path = "trait.rs"]
pub mod services_trait;

pub use error::AzureError;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockAzureServices, MockOperation, ServiceCall};
pub use models::*;
pub use services_trait::{NetworkInterfaceService, VirtualMachineService, VmExtensionService};
