//! Process configuration from flags and `JOBHOUND_*` environment variables.

use std::path::PathBuf;

use clap::Args;
use jobhound_pipeline::{DEFAULT_INTERVAL_SECS, LinkMethod, Settings};

/// Options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// SerpApi key (job search and listing detail)
    #[arg(long, env = "JOBHOUND_SERPAPI_KEY", hide_env_values = true)]
    pub serpapi_key: Option<String>,

    /// Google API key for Custom Search (scraping link method)
    #[arg(long, env = "JOBHOUND_GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// Custom Search engine ID (scraping link method)
    #[arg(long, env = "JOBHOUND_CSE_ID")]
    pub cse_id: Option<String>,

    /// Discord bot token
    #[arg(long, env = "JOBHOUND_DISCORD_TOKEN", hide_env_values = true)]
    pub discord_token: Option<String>,

    /// Forum channel that receives job threads
    #[arg(long, env = "JOBHOUND_FORUM_CHANNEL_ID")]
    pub forum_channel_id: Option<String>,

    /// Caller identities allowed to change settings
    #[arg(long, env = "JOBHOUND_ALLOWED_CALLERS", value_delimiter = ',')]
    pub allowed_callers: Vec<String>,

    /// Where seen job IDs are stored
    #[arg(long, env = "JOBHOUND_JOBS_FILE")]
    pub jobs_file: Option<PathBuf>,

    /// Search location (empty searches the default location)
    #[arg(long, env = "JOBHOUND_LOCATION", default_value = "")]
    pub location: String,

    /// Search query (empty searches the default query)
    #[arg(long, env = "JOBHOUND_QUERY", default_value = "")]
    pub query: String,

    /// Link resolution method: api or scraping
    #[arg(long, env = "JOBHOUND_LINK_METHOD", default_value = "api")]
    pub link_method: LinkMethod,

    /// Seconds between cycle starts
    #[arg(long, env = "JOBHOUND_INTERVAL", default_value_t = DEFAULT_INTERVAL_SECS)]
    pub interval: u64,
}

impl Config {
    /// Initial runtime settings.
    pub fn settings(&self) -> Settings {
        Settings::new(self.location.trim(), self.query.trim(), self.link_method)
    }

    /// Dedup file path, defaulting to the platform data directory.
    pub fn jobs_file(&self) -> PathBuf {
        self.jobs_file.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("jobhound")
                .join("jobs.json")
        })
    }

    /// Custom Search credentials, if both halves are configured.
    pub fn web_search_credentials(&self) -> Option<(&str, &str)> {
        let key = self.google_api_key.as_deref().filter(|s| !s.is_empty())?;
        let cx = self.cse_id.as_deref().filter(|s| !s.is_empty())?;
        Some((key, cx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: Config,
    }

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["jobhound"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).unwrap().config
    }

    #[test]
    fn test_flags() {
        let config = parse(&[
            "--serpapi-key",
            "serp",
            "--allowed-callers",
            "alice,bob",
            "--location",
            "Austin",
            "--link-method",
            "scraping",
            "--interval",
            "60",
            "--jobs-file",
            "/tmp/jobs.json",
        ]);

        assert_eq!(config.serpapi_key.as_deref(), Some("serp"));
        assert_eq!(config.allowed_callers, vec!["alice", "bob"]);
        assert_eq!(config.interval, 60);
        assert_eq!(config.jobs_file(), PathBuf::from("/tmp/jobs.json"));
        assert_eq!(
            config.settings(),
            Settings::new("Austin", "", LinkMethod::Scrape)
        );
    }

    #[test]
    fn test_invalid_link_method_rejected() {
        let result = TestCli::try_parse_from(["jobhound", "--link-method", "carrier-pigeon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_web_search_needs_both_credentials() {
        let config = parse(&["--google-api-key", "key"]);
        assert!(config.web_search_credentials().is_none());

        let config = parse(&["--google-api-key", "key", "--cse-id", "cx"]);
        assert_eq!(config.web_search_credentials(), Some(("key", "cx")));
    }

    #[test]
    fn test_default_jobs_file_name() {
        let config = parse(&[]);
        assert!(config.jobs_file().ends_with("jobhound/jobs.json"));
    }
}
