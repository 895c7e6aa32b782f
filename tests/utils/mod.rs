pub mod assertions;
pub mod harness;

pub use harness::{LifecycleHarness, PhaseTrace};
