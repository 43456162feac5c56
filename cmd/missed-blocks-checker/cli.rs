use clap::Parser as ClapParser;
use std::path::PathBuf;
use tracing::Level;

#[derive(ClapParser, Debug, Clone)]
#[command(
    name = "missed-blocks-checker",
    author = "Lambdaclass",
    version,
    about = "Reports validators of a Cosmos chain that are missing blocks"
)]
pub struct Options {
    #[arg(
        long = "config",
        value_name = "CONFIG_PATH",
        env = "MBC_CONFIG",
        help = "Path to the TOML config file."
    )]
    pub config: PathBuf,
    #[arg(
        long = "log.level",
        value_name = "LOG_LEVEL",
        env = "MBC_LOG_LEVEL",
        help = "Overrides the log level set in the config file.",
        long_help = "Possible values: info, debug, trace, warn, error"
    )]
    pub log_level: Option<Level>,
    #[arg(
        long = "log.json",
        env = "MBC_LOG_JSON",
        help = "Output logs as JSON lines. Overrides the config file."
    )]
    pub log_json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let options = Options::try_parse_from([
            "missed-blocks-checker",
            "--config",
            "config.toml",
            "--log.level",
            "debug",
            "--log.json",
        ]);
        assert!(options.is_ok());
        let options = match options {
            Ok(options) => options,
            Err(_) => return,
        };

        assert_eq!(options.config, PathBuf::from("config.toml"));
        assert_eq!(options.log_level, Some(Level::DEBUG));
        assert!(options.log_json);
    }
}
