use crate::config::AppConfig;
use mbc_engine::ChainParams;
use mbc_reporters::{
    CommandContext, LatestSnapshot, Reporter, SlackReporter, SubscriptionFile, TelegramReporter,
    serve_commands,
};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::{
    EnvFilter, filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt,
    util::TryInitError,
};

/// Installs the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_tracing(level: Level, json: bool) -> Result<(), TryInitError> {
    let log_filter = EnvFilter::builder()
        .with_default_directive(Directive::from(level))
        .from_env_lossy();

    let include_target = matches!(level, Level::DEBUG | Level::TRACE);
    let registry = tracing_subscriber::registry().with(log_filter);

    if json {
        registry
            .with(fmt::layer().json().with_target(include_target))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(include_target))
            .try_init()
    }
}

/// Loads the Telegram subscription file, if one is configured.
///
/// A file that cannot be loaded is logged and treated as absent.
pub fn init_subscriptions(config: &AppConfig) -> Option<Arc<Mutex<SubscriptionFile>>> {
    if config.telegram.config_path.is_empty() {
        return None;
    }

    match SubscriptionFile::load_or_create(&config.telegram.config_path) {
        Ok(subscriptions) => Some(Arc::new(Mutex::new(subscriptions))),
        Err(error) => {
            warn!(
                path = %config.telegram.config_path,
                error = %error,
                "could not load telegram subscriptions, continuing without them"
            );
            None
        }
    }
}

/// Builds every reporter the config knows about and keeps the enabled ones.
pub fn init_reporters(
    config: &AppConfig,
    params: &ChainParams,
    subscriptions: Option<Arc<Mutex<SubscriptionFile>>>,
) -> Vec<Box<dyn Reporter>> {
    let candidates: Vec<Box<dyn Reporter>> = vec![
        Box::new(TelegramReporter::new(
            config.telegram.clone(),
            config.chain_info.clone(),
            *params,
            subscriptions,
        )),
        Box::new(SlackReporter::new(
            config.slack.clone(),
            config.chain_info.clone(),
            *params,
        )),
    ];

    candidates
        .into_iter()
        .filter(|reporter| {
            let enabled = reporter.enabled();
            info!(reporter = reporter.name(), enabled, "initialized reporter");
            enabled
        })
        .collect()
}

/// Spawns the Telegram command dispatcher when a bot token is configured.
pub fn init_telegram_commands(
    config: &AppConfig,
    params: &ChainParams,
    latest: LatestSnapshot,
    subscriptions: Option<Arc<Mutex<SubscriptionFile>>>,
) -> Option<JoinHandle<()>> {
    if config.telegram.token.is_empty() {
        debug!("telegram token not set, not serving bot commands");
        return None;
    }

    let context = CommandContext::new(config.chain_info.clone(), *params, latest, subscriptions);
    Some(tokio::spawn(serve_commands(
        config.telegram.token.clone(),
        context,
    )))
}
