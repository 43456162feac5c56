use clap::Parser;
use eyre::WrapErr;
use mbc_engine::ClassificationEngine;
use mbc_node::CosmosClient;
use mbc_reporters::LatestSnapshot;
use missed_blocks_checker::{
    cli::Options,
    config::AppConfig,
    initializers::{init_reporters, init_subscriptions, init_telegram_commands, init_tracing},
    service,
};
use tracing::info;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let opts = Options::parse();

    let config = AppConfig::load(&opts.config)
        .wrap_err_with(|| format!("failed to load config from {}", opts.config.display()))?;

    let log_level = match opts.log_level {
        Some(level) => level,
        None => config.log_level()?,
    };
    init_tracing(log_level, opts.log_json || config.log.json)?;

    config.validate()?;

    let client = CosmosClient::new(config.node_config()?);
    let params = client
        .get_chain_params()
        .await
        .wrap_err("failed to query chain params")?;
    info!(
        signed_blocks_window = params.signed_blocks_window,
        min_signed_per_window = params.min_signed_per_window,
        missed_blocks_to_jail = params.missed_blocks_to_jail,
        avg_block_time = params.avg_block_time,
        "got chain params"
    );

    let bands = config.severity_bands(&params)?;
    info!(bands = bands.len(), "using missed blocks groups");

    let subscriptions = init_subscriptions(&config);
    let reporters = init_reporters(&config, &params, subscriptions.clone());
    let engine = ClassificationEngine::new(bands, config.monitor_filter()?);

    let latest = LatestSnapshot::default();
    let commands = init_telegram_commands(&config, &params, latest.clone(), subscriptions);

    service::run(engine, &client, &reporters, &latest, config.poll_interval()).await;
    if let Some(commands) = commands {
        commands.abort();
    }
    Ok(())
}
