//! Per-validator notification subscriptions for the Telegram reporter.
//!
//! Stored as TOML:
//!
//! ```toml
//! [[notification-infos]]
//! validator-address = "cosmosvaloper1..."
//! notifiers = ["@alice", "@bob"]
//! ```

use crate::error::SubscriptionError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NotificationInfo {
    pub validator_address: String,
    #[serde(default)]
    pub notifiers: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Subscriptions {
    #[serde(default, rename = "notification-infos")]
    notification_infos: Vec<NotificationInfo>,
}

/// Subscriptions backed by a TOML file.
#[derive(Debug)]
pub struct SubscriptionFile {
    path: PathBuf,
    infos: Vec<NotificationInfo>,
}

impl SubscriptionFile {
    /// Loads subscriptions from `path`, creating an empty file when it does
    /// not exist yet.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, SubscriptionError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            info!(path = %path.display(), "subscription file does not exist, creating it");
            let file = Self {
                path,
                infos: Vec::new(),
            };
            file.save()?;
            return Ok(file);
        }

        let contents = std::fs::read_to_string(&path)?;
        let subscriptions: Subscriptions = toml::from_str(&contents)?;

        Ok(Self {
            path,
            infos: subscriptions.notification_infos,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn infos(&self) -> &[NotificationInfo] {
        &self.infos
    }

    /// Notifiers subscribed to `validator_address`.
    pub fn notifiers(&self, validator_address: &str) -> &[String] {
        self.infos
            .iter()
            .find(|info| info.validator_address == validator_address)
            .map(|info| info.notifiers.as_slice())
            .unwrap_or_default()
    }

    /// Subscribes `notifier` to `validator_address` and persists the change.
    ///
    /// Returns `false` when the subscription already existed.
    pub fn add_notifier(
        &mut self,
        validator_address: &str,
        notifier: &str,
    ) -> Result<bool, SubscriptionError> {
        match self
            .infos
            .iter_mut()
            .find(|info| info.validator_address == validator_address)
        {
            Some(info) if info.notifiers.iter().any(|n| n == notifier) => return Ok(false),
            Some(info) => info.notifiers.push(notifier.to_owned()),
            None => self.infos.push(NotificationInfo {
                validator_address: validator_address.to_owned(),
                notifiers: vec![notifier.to_owned()],
            }),
        }

        self.save()?;
        Ok(true)
    }

    /// Unsubscribes `notifier` from `validator_address` and persists the change.
    ///
    /// Returns `false` when there was nothing to remove.
    pub fn remove_notifier(
        &mut self,
        validator_address: &str,
        notifier: &str,
    ) -> Result<bool, SubscriptionError> {
        let Some(info) = self
            .infos
            .iter_mut()
            .find(|info| info.validator_address == validator_address)
        else {
            return Ok(false);
        };

        let before = info.notifiers.len();
        info.notifiers.retain(|n| n != notifier);
        if info.notifiers.len() == before {
            return Ok(false);
        }

        self.infos.retain(|info| !info.notifiers.is_empty());
        self.save()?;
        Ok(true)
    }

    pub fn save(&self) -> Result<(), SubscriptionError> {
        let contents = toml::to_string(&Subscriptions {
            notification_infos: self.infos.clone(),
        })?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}
