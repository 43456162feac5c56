//! Chain node access for the missed blocks checker.
//!
//! Reads slashing parameters, signing infos and validator records from a
//! Cosmos SDK REST endpoint, and block headers from a Tendermint RPC endpoint,
//! and assembles them into [`mbc_engine::SnapshotSet`]s.

pub mod address;
pub mod client;
pub mod error;
pub mod types;

pub use client::{CosmosClient, NodeConfig};
pub use error::NodeError;
