use crate::config::toml_config::LookupConfig;
use crate::domain::model::InfoKind;
use crate::utils::error::{LookupError, Result};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "court-lookup")]
#[command(about = "Look up a court auction case by its case number (e.g. 2024타경12345)")]
pub struct CliArgs {
    /// Court name (서울중앙지방법원) or office code (B000210)
    #[arg(long, required_unless_present = "list_courts")]
    pub court: Option<String>,

    /// Case number as printed on the auction notice, e.g. 2024타경12345
    #[arg(long = "case", required_unless_present_any = ["list_courts", "key"], conflicts_with = "key")]
    pub case_number: Option<String>,

    /// Already-normalized 15-digit case key
    #[arg(long)]
    pub key: Option<String>,

    /// Details to fetch: case, schedule, documents
    #[arg(long, value_delimiter = ',', default_value = "case")]
    pub info: Vec<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override upstream.base_url
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override upstream.timeout_seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Override retry.attempts (network failures only)
    #[arg(long)]
    pub retries: Option<u32>,

    /// Skip the session warm-up request
    #[arg(long)]
    pub no_warmup: bool,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Print the request bodies without calling the upstream
    #[arg(long)]
    pub dry_run: bool,

    /// List known courts and exit
    #[arg(long)]
    pub list_courts: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliArgs {
    pub fn info_kinds(&self) -> Result<Vec<InfoKind>> {
        let mut kinds = Vec::new();
        for name in &self.info {
            let kind = InfoKind::from_name(name).ok_or_else(|| LookupError::InvalidConfigValue {
                field: "--info".to_string(),
                value: name.clone(),
                reason: "expected one of: case, schedule, documents".to_string(),
            })?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Ok(kinds)
    }

    /// 先讀設定檔，再以命令列參數覆蓋
    pub fn load_config(&self) -> Result<LookupConfig> {
        let mut config = match &self.config {
            Some(path) => LookupConfig::from_file(path)?,
            None => LookupConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.upstream.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.upstream.timeout_seconds = timeout;
        }
        if let Some(retries) = self.retries {
            config.retry.attempts = retries;
        }
        if self.no_warmup {
            config.upstream.session_warmup = false;
        }

        Ok(config)
    }
}
