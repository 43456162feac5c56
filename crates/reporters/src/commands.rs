//! Telegram bot commands: `/help`, `/status`, `/subscribe` and `/unsubscribe`.
//!
//! Replies are rendered by [`CommandContext::answer`], which only reads the
//! latest retained snapshot and the subscription file, so the dispatcher in
//! [`serve_commands`] is a thin shell around it.

use crate::link::ChainInfo;
use crate::subscriptions::SubscriptionFile;
use crate::telegram::html_link;
use mbc_engine::{ChainParams, SnapshotSet, ValidatorSnapshot};
use std::fmt::Write;
use std::sync::{Arc, Mutex, RwLock};
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;
use teloxide::utils::html;
use tracing::{info, warn};

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "show this help.")]
    Start,
    #[command(description = "show this help.")]
    Help,
    #[command(
        description = "show missed blocks of a validator: /status <valoper>, or of the validators you are subscribed to: /status."
    )]
    Status(String),
    #[command(description = "get mentioned in reports about a validator: /subscribe <valoper>.")]
    Subscribe(String),
    #[command(description = "stop being mentioned: /unsubscribe <valoper>.")]
    Unsubscribe(String),
}

/// Snapshot set of the last successful cycle, shared with the service loop.
#[derive(Debug, Clone, Default)]
pub struct LatestSnapshot(Arc<RwLock<Option<SnapshotSet>>>);

impl LatestSnapshot {
    pub fn update(&self, snapshot: SnapshotSet) {
        if let Ok(mut latest) = self.0.write() {
            *latest = Some(snapshot);
        }
    }

    fn find(&self, operator_address: &str) -> Lookup {
        let Ok(latest) = self.0.read() else {
            return Lookup::NotFetched;
        };
        let Some(snapshot) = latest.as_ref() else {
            return Lookup::NotFetched;
        };

        snapshot
            .iter()
            .map(|(_, validator)| validator)
            .find(|validator| validator.operator_address == operator_address)
            .map_or(Lookup::Unknown, |validator| Lookup::Found(validator.clone()))
    }
}

enum Lookup {
    NotFetched,
    Unknown,
    Found(ValidatorSnapshot),
}

#[derive(Debug, Clone)]
pub struct CommandContext {
    chain_info: ChainInfo,
    params: ChainParams,
    latest: LatestSnapshot,
    subscriptions: Option<Arc<Mutex<SubscriptionFile>>>,
}

impl CommandContext {
    pub fn new(
        chain_info: ChainInfo,
        params: ChainParams,
        latest: LatestSnapshot,
        subscriptions: Option<Arc<Mutex<SubscriptionFile>>>,
    ) -> Self {
        Self {
            chain_info,
            params,
            latest,
            subscriptions,
        }
    }

    /// HTML reply to `command` sent by a user with the given Telegram username.
    pub fn answer(&self, command: Command, username: Option<&str>) -> String {
        match command {
            Command::Start | Command::Help => html::escape(&Command::descriptions().to_string()),
            Command::Status(address) if address.trim().is_empty() => self.subscribed_status(username),
            Command::Status(address) => self.status(address.trim()),
            Command::Subscribe(address) => self.subscribe(address.trim(), username),
            Command::Unsubscribe(address) => self.unsubscribe(address.trim(), username),
        }
    }

    /// Status of every validator the user is subscribed to.
    fn subscribed_status(&self, username: Option<&str>) -> String {
        let addresses: Vec<String> = match (&self.subscriptions, username) {
            (Some(subscriptions), Some(username)) if !username.is_empty() => subscriptions
                .lock()
                .map(|subscriptions| {
                    subscriptions
                        .infos()
                        .iter()
                        .filter(|info| {
                            info.notifiers
                                .iter()
                                .any(|notifier| notifier.trim_start_matches('@') == username)
                        })
                        .map(|info| info.validator_address.clone())
                        .collect()
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        if addresses.is_empty() {
            return "You are not subscribed to any validator. Usage: /status &lt;valoper&gt;"
                .to_owned();
        }

        addresses
            .iter()
            .map(|address| self.status(address))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn status(&self, address: &str) -> String {
        let validator = match self.latest.find(address) {
            Lookup::Found(validator) => validator,
            Lookup::Unknown => return not_found(address),
            Lookup::NotFetched => return not_fetched(),
        };

        let mut out = self.link(&validator);
        let window = self.params.signed_blocks_window;
        let percent = if window > 0 {
            validator.missed_blocks as f64 / window as f64 * 100.0
        } else {
            0.0
        };
        let _ = write!(
            out,
            "\nMissed blocks: {}/{window} ({percent:.2}%)",
            validator.missed_blocks
        );

        if validator.tombstoned {
            out.push_str("\nTombstoned");
        } else if validator.jailed {
            out.push_str("\nJailed");
        } else {
            let _ = write!(
                out,
                "\nTime till jail: {}",
                self.params.time_to_jail(validator.missed_blocks)
            );
        }

        out
    }

    fn subscribe(&self, address: &str, username: Option<&str>) -> String {
        let (subscriptions, username) = match self.subscriber(address, username) {
            Ok(found) => found,
            Err(reply) => return reply,
        };

        let validator = match self.latest.find(address) {
            Lookup::Found(validator) => validator,
            Lookup::Unknown => return not_found(address),
            Lookup::NotFetched => return not_fetched(),
        };

        let Ok(mut subscriptions) = subscriptions.lock() else {
            return save_failed();
        };
        match subscriptions.add_notifier(address, username) {
            Ok(true) => {
                info!(validator = address, username, "subscribed to validator");
                format!("Subscribed to the notifications about {}.", self.link(&validator))
            }
            Ok(false) => format!(
                "You are already subscribed to the notifications about {}.",
                self.link(&validator)
            ),
            Err(err) => {
                warn!(validator = address, error = %err, "could not save subscription");
                save_failed()
            }
        }
    }

    fn unsubscribe(&self, address: &str, username: Option<&str>) -> String {
        let (subscriptions, username) = match self.subscriber(address, username) {
            Ok(found) => found,
            Err(reply) => return reply,
        };

        let Ok(mut subscriptions) = subscriptions.lock() else {
            return save_failed();
        };
        let code = format!("<code>{}</code>", html::escape(address));
        match subscriptions.remove_notifier(address, username) {
            Ok(true) => {
                info!(validator = address, username, "unsubscribed from validator");
                format!("Unsubscribed from the notifications about {code}.")
            }
            Ok(false) => format!("You are not subscribed to the notifications about {code}."),
            Err(err) => {
                warn!(validator = address, error = %err, "could not save subscription");
                save_failed()
            }
        }
    }

    /// Checks what every subscription change needs before touching the file.
    fn subscriber<'a>(
        &self,
        address: &str,
        username: Option<&'a str>,
    ) -> Result<(&Arc<Mutex<SubscriptionFile>>, &'a str), String> {
        let Some(subscriptions) = &self.subscriptions else {
            return Err("Subscriptions are not enabled for this bot.".to_owned());
        };
        let Some(username) = username.filter(|name| !name.is_empty()) else {
            return Err("Please set a Telegram username to manage subscriptions.".to_owned());
        };
        if address.is_empty() {
            return Err("Usage: /subscribe &lt;valoper&gt; or /unsubscribe &lt;valoper&gt;".to_owned());
        }
        Ok((subscriptions, username))
    }

    fn link(&self, validator: &ValidatorSnapshot) -> String {
        html_link(&self.chain_info.link(
            &validator.operator_address,
            &validator.moniker,
            &validator.consensus_address,
        ))
    }
}

fn not_found(address: &str) -> String {
    format!("Could not find validator <code>{}</code>.", html::escape(address))
}

fn not_fetched() -> String {
    "Validators are not fetched yet, try again later.".to_owned()
}

fn save_failed() -> String {
    "Could not save the subscription, try again later.".to_owned()
}

/// Registers the command list with Telegram and answers commands until the
/// dispatcher stops.
pub async fn serve_commands(token: String, context: CommandContext) {
    let bot = Bot::new(token);

    if let Err(err) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %err, "could not register telegram bot commands");
    }

    info!("serving telegram bot commands");
    Command::repl(bot, move |bot: Bot, message: Message, command: Command| {
        let context = context.clone();
        async move {
            let username = message.from.as_ref().and_then(|user| user.username.clone());
            let reply = context.answer(command, username.as_deref());
            bot.send_message(message.chat.id, reply)
                .parse_mode(ParseMode::Html)
                .await?;
            respond(())
        }
    })
    .await;
}
