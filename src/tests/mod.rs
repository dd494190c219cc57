//! Test modules for the portbind library
//!
//! Tests run against a scriptable in-memory gateway (see `helpers`), so the
//! suite never needs a real router. The one live-network test is gated behind
//! `#[ignore]` in `gateway_tests`.

mod helpers;

mod cli_tests;
