use mbc_engine::ReportEntry;
use serde::{Deserialize, Serialize};

const MINTSCAN_VALIDATOR_URL: &str = "https://www.mintscan.io";

/// Where validator pages of the monitored chain live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ChainInfo {
    /// Chain name on mintscan, e.g. `cosmos`.
    pub mintscan_prefix: String,
    /// Explorer URL with a `%s` placeholder for the operator address.
    /// Takes precedence over `mintscan_prefix`.
    pub validator_page_pattern: String,
}

impl ChainInfo {
    pub fn validator_url(&self, operator_address: &str) -> Option<String> {
        if !self.validator_page_pattern.is_empty() {
            return Some(self.validator_page_pattern.replace("%s", operator_address));
        }

        if !self.mintscan_prefix.is_empty() {
            return Some(format!(
                "{MINTSCAN_VALIDATOR_URL}/{}/validators/{operator_address}",
                self.mintscan_prefix
            ));
        }

        None
    }

    pub fn link_for(&self, entry: &ReportEntry) -> ValidatorLink {
        self.link(
            &entry.validator_address,
            &entry.validator_moniker,
            &entry.consensus_address,
        )
    }

    pub fn link(
        &self,
        operator_address: &str,
        moniker: &str,
        consensus_address: &str,
    ) -> ValidatorLink {
        if operator_address.is_empty() {
            return ValidatorLink::Unresolved(consensus_address.to_owned());
        }

        let text = if moniker.is_empty() {
            operator_address.to_owned()
        } else {
            moniker.to_owned()
        };

        match self.validator_url(operator_address) {
            Some(url) => ValidatorLink::Page { url, text },
            None => ValidatorLink::Text(text),
        }
    }
}

/// How a validator is referenced in a message, independent of markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatorLink {
    /// Link to the validator's explorer page.
    Page { url: String, text: String },
    /// No explorer configured.
    Text(String),
    /// The operator address is unknown; only the consensus address is.
    Unresolved(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbc_engine::Direction;

    fn entry(validator_address: &str, moniker: &str) -> ReportEntry {
        ReportEntry {
            validator_address: validator_address.to_owned(),
            validator_moniker: moniker.to_owned(),
            consensus_address: "cosmosvalcons1abc".to_owned(),
            emoji: "🟡".to_owned(),
            description: "is skipping blocks (> 1.0%)".to_owned(),
            missing_blocks: 150,
            direction: Direction::Increasing,
        }
    }

    #[test]
    fn uses_mintscan_by_default() {
        let info = ChainInfo {
            mintscan_prefix: "cosmos".to_owned(),
            validator_page_pattern: String::new(),
        };

        assert_eq!(
            info.link_for(&entry("cosmosvaloper1xyz", "Validator")),
            ValidatorLink::Page {
                url: "https://www.mintscan.io/cosmos/validators/cosmosvaloper1xyz".to_owned(),
                text: "Validator".to_owned(),
            }
        );
    }

    #[test]
    fn page_pattern_takes_precedence() {
        let info = ChainInfo {
            mintscan_prefix: "cosmos".to_owned(),
            validator_page_pattern: "https://explorer.example/validator/%s".to_owned(),
        };

        assert_eq!(
            info.validator_url("cosmosvaloper1xyz").as_deref(),
            Some("https://explorer.example/validator/cosmosvaloper1xyz")
        );
    }

    #[test]
    fn falls_back_to_address_and_consensus_address() {
        let info = ChainInfo::default();

        assert_eq!(
            info.link_for(&entry("cosmosvaloper1xyz", "")),
            ValidatorLink::Text("cosmosvaloper1xyz".to_owned())
        );
        assert_eq!(
            info.link_for(&entry("", "Ghost")),
            ValidatorLink::Unresolved("cosmosvalcons1abc".to_owned())
        );
    }
}
