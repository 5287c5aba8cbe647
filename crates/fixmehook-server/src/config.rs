use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::{bail, Result};
use clap::builder::RangedU64ValueParser;
use clap::Args;
use fixmehook_core::{IssueFormatter, MarkerSet};
use fixmehook_service::HookSettings;

#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// GitHub token used to read commits and create issues
    #[arg(long, env = "GITHUB_API_KEY", hide_env_values = true)]
    pub github_api_key: Option<String>,

    /// Address to bind the webhook server to
    #[arg(long, env = "FIXMEHOOK_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Port for the webhook server
    #[arg(long, env = "FIXMEHOOK_PORT", default_value = "3720")]
    pub port: u16,

    /// Comma-separated marker tokens that flag an added line
    #[arg(long, env = "FIXMEHOOK_MARKERS", default_value = "XXX,FIXME,TODO")]
    pub markers: String,

    /// Label attached to every created issue
    #[arg(long, env = "FIXMEHOOK_LABEL", default_value = "FIXME")]
    pub label: String,

    /// Maximum issue title length, in characters
    #[arg(
        long,
        env = "FIXMEHOOK_MAX_TITLE_LEN",
        default_value = "50",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub max_title_len: usize,

    /// User-Agent sent to the GitHub API
    #[arg(long, env = "FIXMEHOOK_USER_AGENT", default_value = "FIXME helper")]
    pub user_agent: String,

    /// Timeout for each GitHub API request (seconds)
    #[arg(
        long,
        env = "FIXMEHOOK_TIMEOUT",
        default_value = "30",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,
}

impl ServerConfig {
    /// Build hook settings, rejecting a marker list with no usable token.
    pub fn settings(&self) -> Result<HookSettings> {
        let markers = MarkerSet::from_csv(&self.markers);
        if markers.is_empty() {
            bail!("--markers must name at least one token, got {:?}", self.markers);
        }
        Ok(HookSettings {
            markers,
            formatter: IssueFormatter {
                max_title_len: self.max_title_len,
                label: self.label.clone(),
            },
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout),
        })
    }

    pub fn addr(&self) -> Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.bind.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// The API key, if one is configured and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.github_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: ServerConfig,
    }

    fn parse(args: &[&str]) -> ServerConfig {
        let mut argv = vec!["fixmehook"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).unwrap().config
    }

    #[test]
    fn defaults() {
        let config = parse(&["--github-api-key", "ghp_x"]);
        assert_eq!(config.port, 3720);
        assert_eq!(config.addr().unwrap().to_string(), "0.0.0.0:3720");

        let settings = config.settings().unwrap();
        assert_eq!(settings.markers.tokens(), ["XXX", "FIXME", "TODO"]);
        assert_eq!(settings.formatter.max_title_len, 50);
        assert_eq!(settings.formatter.label, "FIXME");
        assert_eq!(settings.user_agent, "FIXME helper");
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides() {
        let config = parse(&[
            "--github-api-key",
            "ghp_x",
            "--bind",
            "127.0.0.1",
            "--port",
            "8080",
            "--markers",
            "HACK,BUG",
            "--label",
            "debt",
            "--max-title-len",
            "72",
            "--timeout",
            "5",
        ]);
        assert_eq!(config.addr().unwrap().to_string(), "127.0.0.1:8080");

        let settings = config.settings().unwrap();
        assert_eq!(settings.markers.tokens(), ["HACK", "BUG"]);
        assert_eq!(settings.formatter.label, "debt");
        assert_eq!(settings.formatter.max_title_len, 72);
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }

    #[test]
    fn zero_limits_are_rejected() {
        let argv = |flag: &'static str| vec!["fixmehook", flag, "0"];
        assert!(TestCli::try_parse_from(argv("--max-title-len")).is_err());
        assert!(TestCli::try_parse_from(argv("--timeout")).is_err());
    }

    #[test]
    fn blank_marker_list_is_rejected() {
        let config = parse(&["--markers", " , "]);
        let err = config.settings().unwrap_err();
        assert!(err.to_string().contains("--markers"), "got {err}");
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = parse(&["--github-api-key", "  "]);
        assert!(config.api_key().is_none());
    }

    #[test]
    fn invalid_bind_address() {
        let config = parse(&["--bind", "not-an-ip"]);
        assert!(config.addr().is_err());
    }
}
