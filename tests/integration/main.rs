//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises the twin end to end
//! against mock adapters. No rendering host or real clock is required.

mod mock_host;
mod scenario_tests;
mod wire_tests;
