//! Helpers shared by the tests of the `ethtx` crates.

pub mod secret_key;
