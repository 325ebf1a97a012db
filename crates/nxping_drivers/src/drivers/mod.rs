pub mod cisco_nxos_api;
pub mod mock;

pub use cisco_nxos_api::NxapiDriver;
pub use mock::MockDriver;
