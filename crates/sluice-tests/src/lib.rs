//! End-to-end and adversarial test suite for Sluice.
//!
//! The integration tests drive a real wallet against an in-process
//! scoring service and a programmable mock chain, covering the full
//! screen-then-send flow, its degraded modes, and the attack surfaces
//! around the vault and the safety gate.

pub mod helpers;
