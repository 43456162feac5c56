use crate::error::NodeError;
use crate::types::{
    BlockHeader, BlockResponse, SigningInfo, SigningInfosResponse, SlashingParamsResponse,
    Validator, ValidatorsResponse, build_snapshot,
};
use mbc_engine::{ChainParams, SnapshotSet, SnapshotSource};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Cosmos SDK REST (LCD) endpoint.
    pub lcd_address: String,
    /// Tendermint RPC endpoint.
    pub rpc_address: String,
    pub pagination_limit: u64,
    /// How far back to look when averaging block time.
    pub blocks_diff_in_the_past: i64,
    /// Bech32 prefix of consensus node addresses, e.g. `cosmosvalcons`.
    pub consensus_prefix: String,
}

/// Read-only client for the slashing, staking and block queries we need.
#[derive(Debug, Clone)]
pub struct CosmosClient {
    client: Client,
    config: NodeConfig,
}

impl CosmosClient {
    pub fn new(config: NodeConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Reads the slashing window and the average block time.
    pub async fn get_chain_params(&self) -> Result<ChainParams, NodeError> {
        let response: SlashingParamsResponse = self
            .get_json(&self.config.lcd_address, "/cosmos/slashing/v1beta1/params", &[])
            .await?;

        let signed_blocks_window = response.params.signed_blocks_window()?;
        let min_signed_per_window = response.params.min_signed_per_window()?;
        let avg_block_time = self.get_avg_block_time().await?;

        Ok(ChainParams::new(
            signed_blocks_window,
            min_signed_per_window,
            avg_block_time,
        ))
    }

    /// Average seconds per block over the last `blocks_diff_in_the_past` blocks.
    pub async fn get_avg_block_time(&self) -> Result<f64, NodeError> {
        let latest = self.get_block(None).await?;
        let latest_height = latest.height()?;

        let earlier_height = (latest_height - self.config.blocks_diff_in_the_past).max(1);
        if earlier_height >= latest_height {
            return Err(NodeError::NotEnoughBlocks {
                latest: latest_height,
            });
        }

        let earlier = self.get_block(Some(earlier_height)).await?;
        let height_diff = (latest_height - earlier.height()?) as f64;
        let time_diff = latest.time()? - earlier.time()?;

        let avg_block_time = time_diff.num_milliseconds() as f64 / 1000.0 / height_diff;
        debug!(
            latest_height,
            earlier_height, avg_block_time, "computed average block time"
        );

        Ok(avg_block_time)
    }

    pub async fn get_block(&self, height: Option<i64>) -> Result<BlockHeader, NodeError> {
        let height = height.map(|height| height.to_string());
        let query: Vec<(&str, &str)> = height
            .as_deref()
            .map(|height| vec![("height", height)])
            .unwrap_or_default();

        let response: BlockResponse = self
            .get_json(&self.config.rpc_address, "/block", &query)
            .await?;

        Ok(response.result.block.header)
    }

    pub async fn get_signing_infos(&self) -> Result<Vec<SigningInfo>, NodeError> {
        let limit = self.config.pagination_limit.to_string();
        let response: SigningInfosResponse = self
            .get_json(
                &self.config.lcd_address,
                "/cosmos/slashing/v1beta1/signing_infos",
                &[("pagination.limit", limit.as_str())],
            )
            .await?;

        if response.pagination.as_ref().is_some_and(|p| p.is_truncated()) {
            warn!(
                limit = self.config.pagination_limit,
                "signing infos response is paginated, consider raising the pagination limit"
            );
        }

        Ok(response.info)
    }

    pub async fn get_validators(&self) -> Result<Vec<Validator>, NodeError> {
        let limit = self.config.pagination_limit.to_string();
        let response: ValidatorsResponse = self
            .get_json(
                &self.config.lcd_address,
                "/cosmos/staking/v1beta1/validators",
                &[("pagination.limit", limit.as_str())],
            )
            .await?;

        if response.pagination.as_ref().is_some_and(|p| p.is_truncated()) {
            warn!(
                limit = self.config.pagination_limit,
                "validators response is paginated, consider raising the pagination limit"
            );
        }

        Ok(response.validators)
    }

    /// Current signing state of every validator that has a signing info.
    pub async fn get_validators_state(&self) -> Result<SnapshotSet, NodeError> {
        let signing_infos = self.get_signing_infos().await?;
        let validators = self.get_validators().await?;

        debug!(
            signing_infos = signing_infos.len(),
            validators = validators.len(),
            "fetched validators state"
        );

        Ok(build_snapshot(
            signing_infos,
            validators,
            &self.config.consensus_prefix,
        ))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        base_url: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, NodeError> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), path);
        let response = self.client.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NodeError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait::async_trait]
impl SnapshotSource for CosmosClient {
    type Error = NodeError;

    async fn fetch_snapshot(&self) -> Result<SnapshotSet, NodeError> {
        let snapshot = self.get_validators_state().await?;
        info!(validators = snapshot.len(), "fetched validators snapshot");
        Ok(snapshot)
    }
}
