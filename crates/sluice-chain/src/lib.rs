//! # sluice-chain
//!
//! JSON-RPC client for Sluice nodes, implementing the
//! [`ChainClient`](sluice_core::traits::ChainClient) seam used by the
//! wallet and the scoring service.

pub mod rpc;

pub use rpc::RpcChain;
