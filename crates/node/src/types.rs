//! Wire types of the Cosmos REST and Tendermint RPC responses we read.
//!
//! Cosmos encodes 64-bit integers as JSON strings, so numeric fields are kept
//! as `String` here and parsed when converted into engine types.

use crate::address::{ED25519_PUBKEY_TYPE, consensus_address};
use crate::error::NodeError;
use chrono::{DateTime, FixedOffset};
use mbc_engine::{SnapshotSet, ValidatorSnapshot};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
pub struct SlashingParamsResponse {
    pub params: SlashingParams,
}

#[derive(Debug, Deserialize)]
pub struct SlashingParams {
    pub signed_blocks_window: String,
    pub min_signed_per_window: String,
}

#[derive(Debug, Deserialize)]
pub struct SigningInfosResponse {
    #[serde(default)]
    pub info: Vec<SigningInfo>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
pub struct SigningInfo {
    pub address: String,
    #[serde(default)]
    pub tombstoned: bool,
    #[serde(default)]
    pub missed_blocks_counter: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidatorsResponse {
    #[serde(default)]
    pub validators: Vec<Validator>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
pub struct Validator {
    pub operator_address: String,
    pub consensus_pubkey: Option<ConsensusPubkey>,
    #[serde(default)]
    pub jailed: bool,
    #[serde(default)]
    pub description: ValidatorDescription,
}

#[derive(Debug, Deserialize)]
pub struct ConsensusPubkey {
    #[serde(rename = "@type")]
    pub type_url: String,
    pub key: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValidatorDescription {
    #[serde(default)]
    pub moniker: String,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub next_key: Option<String>,
}

impl Pagination {
    pub fn is_truncated(&self) -> bool {
        self.next_key.as_deref().is_some_and(|key| !key.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct BlockResponse {
    pub result: BlockResult,
}

#[derive(Debug, Deserialize)]
pub struct BlockResult {
    pub block: Block,
}

#[derive(Debug, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
}

#[derive(Debug, Deserialize)]
pub struct BlockHeader {
    pub height: String,
    pub time: String,
}

impl BlockHeader {
    pub fn height(&self) -> Result<i64, NodeError> {
        parse_i64("block.header.height", &self.height)
    }

    pub fn time(&self) -> Result<DateTime<FixedOffset>, NodeError> {
        DateTime::parse_from_rfc3339(&self.time).map_err(|source| NodeError::InvalidTime {
            value: self.time.clone(),
            source,
        })
    }
}

impl SlashingParams {
    pub fn signed_blocks_window(&self) -> Result<i64, NodeError> {
        parse_i64("signed_blocks_window", &self.signed_blocks_window)
    }

    pub fn min_signed_per_window(&self) -> Result<f64, NodeError> {
        self.min_signed_per_window
            .parse::<f64>()
            .map_err(|_| NodeError::InvalidNumber {
                field: "min_signed_per_window",
                value: self.min_signed_per_window.clone(),
            })
    }
}

/// Joins signing infos with the validator records they belong to.
///
/// Signing infos without a matching validator are kept with an empty
/// operator address and moniker; signing infos with an unparseable counter
/// are dropped with a warning.
pub fn build_snapshot(
    signing_infos: Vec<SigningInfo>,
    validators: Vec<Validator>,
    consensus_prefix: &str,
) -> SnapshotSet {
    let mut by_consensus_address: HashMap<String, Validator> = HashMap::new();
    for validator in validators {
        let Some(pubkey) = validator.consensus_pubkey.as_ref() else {
            debug!(address = %validator.operator_address, "validator has no consensus pubkey");
            continue;
        };

        if pubkey.type_url != ED25519_PUBKEY_TYPE {
            debug!(
                address = %validator.operator_address,
                pubkey_type = %pubkey.type_url,
                "unsupported consensus pubkey type"
            );
            continue;
        }

        match consensus_address(&pubkey.key, consensus_prefix) {
            Ok(address) => {
                by_consensus_address.insert(address, validator);
            }
            Err(error) => {
                warn!(
                    address = %validator.operator_address,
                    error = %error,
                    "could not get validator consensus address"
                );
            }
        }
    }

    let mut snapshot = SnapshotSet::new();
    for info in signing_infos {
        let missed_blocks = match parse_i64("missed_blocks_counter", &info.missed_blocks_counter) {
            Ok(missed_blocks) => missed_blocks,
            Err(error) => {
                warn!(address = %info.address, error = %error, "skipping signing info");
                continue;
            }
        };

        let validator = by_consensus_address.get(&info.address);
        if validator.is_none() {
            debug!(address = %info.address, "could not find validator for signing info");
        }

        snapshot.insert(ValidatorSnapshot {
            operator_address: validator
                .map(|v| v.operator_address.clone())
                .unwrap_or_default(),
            consensus_address: info.address,
            moniker: validator
                .map(|v| v.description.moniker.clone())
                .unwrap_or_default(),
            missed_blocks,
            jailed: validator.is_some_and(|v| v.jailed),
            tombstoned: info.tombstoned,
        });
    }

    snapshot
}

fn parse_i64(field: &'static str, value: &str) -> Result<i64, NodeError> {
    // Older nodes omit zero-valued counters.
    if value.is_empty() {
        return Ok(0);
    }

    value.parse::<i64>().map_err(|_| NodeError::InvalidNumber {
        field,
        value: value.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNING_INFOS: &str = r#"{
        "info": [
            {
                "address": "cosmosvalcons1vvxu62txcsekdygj23ythvjmfl6p9fyuyk54c2",
                "start_height": "0",
                "index_offset": "5012",
                "jailed_until": "1970-01-01T00:00:00Z",
                "tombstoned": false,
                "missed_blocks_counter": "17"
            },
            {
                "address": "cosmosvalcons1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqzy8k80",
                "start_height": "10",
                "index_offset": "40",
                "jailed_until": "2023-05-01T10:00:00Z",
                "tombstoned": true,
                "missed_blocks_counter": "0"
            }
        ],
        "pagination": { "next_key": null, "total": "2" }
    }"#;

    const VALIDATORS: &str = r#"{
        "validators": [
            {
                "operator_address": "cosmosvaloper1first",
                "consensus_pubkey": {
                    "@type": "/cosmos.crypto.ed25519.PubKey",
                    "key": "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8="
                },
                "jailed": true,
                "status": "BOND_STATUS_UNBONDING",
                "tokens": "1000000",
                "description": { "moniker": "First", "website": "" }
            },
            {
                "operator_address": "cosmosvaloper1secp",
                "consensus_pubkey": {
                    "@type": "/cosmos.crypto.secp256k1.PubKey",
                    "key": "AkFBQUFBQUFBQUFBQUFBQUFBQUFBQUFBQUFBQUFBQUFB"
                },
                "jailed": false,
                "description": { "moniker": "Secp" }
            }
        ],
        "pagination": { "next_key": "AAAA", "total": "0" }
    }"#;

    #[test]
    fn builds_snapshot_from_node_responses() -> Result<(), NodeError> {
        let infos: SigningInfosResponse = serde_json::from_str(SIGNING_INFOS)?;
        let validators: ValidatorsResponse = serde_json::from_str(VALIDATORS)?;

        assert!(validators.pagination.as_ref().is_some_and(Pagination::is_truncated));
        assert!(!infos.pagination.as_ref().is_some_and(Pagination::is_truncated));

        let snapshot = build_snapshot(infos.info, validators.validators, "cosmosvalcons");
        assert_eq!(snapshot.len(), 2);

        let first = snapshot.get("cosmosvalcons1vvxu62txcsekdygj23ythvjmfl6p9fyuyk54c2");
        assert_eq!(
            first,
            Some(&ValidatorSnapshot {
                operator_address: "cosmosvaloper1first".to_owned(),
                consensus_address: "cosmosvalcons1vvxu62txcsekdygj23ythvjmfl6p9fyuyk54c2".to_owned(),
                moniker: "First".to_owned(),
                missed_blocks: 17,
                jailed: true,
                tombstoned: false,
            })
        );

        let unresolved = snapshot.get("cosmosvalcons1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqzy8k80");
        assert_eq!(unresolved.map(|v| v.operator_address.as_str()), Some(""));
        assert_eq!(unresolved.map(|v| v.moniker.as_str()), Some(""));
        assert_eq!(unresolved.map(|v| v.tombstoned), Some(true));
        assert_eq!(unresolved.map(|v| v.jailed), Some(false));
        Ok(())
    }

    #[test]
    fn skips_signing_info_with_garbage_counter() {
        let infos = vec![SigningInfo {
            address: "cosmosvalcons1x".to_owned(),
            tombstoned: false,
            missed_blocks_counter: "lots".to_owned(),
        }];

        assert!(build_snapshot(infos, Vec::new(), "cosmosvalcons").is_empty());
    }

    #[test]
    fn parses_slashing_params() -> Result<(), NodeError> {
        let response: SlashingParamsResponse = serde_json::from_str(
            r#"{"params":{"signed_blocks_window":"10000","min_signed_per_window":"0.050000000000000000","downtime_jail_duration":"600s"}}"#,
        )?;

        assert_eq!(response.params.signed_blocks_window()?, 10_000);
        assert_eq!(response.params.min_signed_per_window()?, 0.05);
        Ok(())
    }

    #[test]
    fn parses_block_header() -> Result<(), NodeError> {
        let response: BlockResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":-1,"result":{"block_id":{"hash":"AB"},"block":{"header":{"chain_id":"test-1","height":"1234","time":"2023-05-01T10:00:06.123456789Z"}}}}"#,
        )?;

        assert_eq!(response.result.block.header.height()?, 1234);
        let time = response.result.block.header.time()?;
        assert_eq!(time.timestamp(), 1_682_935_206);
        Ok(())
    }
}
