//! Helpers for checking adapter implementations against the adapter contract.

mod conformance;
mod mock;

pub use conformance::{
    assert_adapter_conforms, verify_adapter_protocol, verify_adapter_runtime, RuntimeProbe,
};
pub use mock::{create_test_adapter, MockCall, MockEphemerisAdapter};
