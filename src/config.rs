use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, de::DeserializeOwned};

pub const LOGIN_URL: &str = "https://www.myrta.com/wps/portal/extvp/myrta/login/";
pub const GITHUB_CONTENTS_URL: &str =
    "https://api.github.com/repos/Myrtabooking/driving-test-times/contents/docs/data.json";
pub const LOG_FILE: &str = "driving_test_scraper.log";

const DEFAULT_DATA_PATH: &str = "data.json";
const DEFAULT_MAX_WEEKS: u32 = 26;
const DEFAULT_NO_SLOT_STRIKES: u32 = 1;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/103.0.5060.114 Safari/537.36";

/// The env vars needed to drive the booking portal.
#[derive(Debug, Deserialize)]
pub struct PortalEnv {
    myrta_card_number: String,
    myrta_password: String,
    data_path: Option<PathBuf>,
    max_weeks: Option<u32>,
    no_slot_strikes: Option<u32>,
}

/// The env vars needed for publishing scraped data.
#[derive(Debug, Deserialize)]
pub struct PublishEnv {
    pub pat: String,
    pub github_contents_url: Option<String>,
}

#[derive(Clone)]
pub struct Credentials {
    pub card_number: String,
    pub password: String,
}

// Keep the password out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("card_number", &self.card_number)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bounded waits and settle pauses used while driving the portal.
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    pub element_wait: Duration,
    pub settle: Duration,
    pub after_select: Duration,
    pub after_back: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            element_wait: Duration::from_secs(10),
            settle: Duration::from_secs(1),
            after_select: Duration::from_millis(1500),
            after_back: Duration::from_secs(4),
        }
    }
}

impl Timings {
    /// No waiting between steps; used against scripted sessions.
    pub fn immediate() -> Self {
        Self {
            element_wait: Duration::ZERO,
            settle: Duration::ZERO,
            after_select: Duration::ZERO,
            after_back: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
    /// Hard cap on weeks scanned for one location.
    pub max_weeks: u32,
    /// Consecutive "no timeslots" weeks after which a location is done.
    pub no_slot_strikes: u32,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_weeks: DEFAULT_MAX_WEEKS,
            no_slot_strikes: DEFAULT_NO_SLOT_STRIKES,
        }
    }
}

/// Fixed browser launch options.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
    pub sandbox: bool,
    pub window_size: (u32, u32),
    pub user_agent: String,
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: false,
            window_size: (1920, 1080),
            user_agent: USER_AGENT.to_string(),
            extra_args: vec!["--disable-dev-shm-usage".to_string()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapingConfig {
    pub login_url: String,
    pub credentials: Credentials,
    pub timings: Timings,
    pub limits: ScanLimits,
    pub browser: BrowserConfig,
    pub data_path: PathBuf,
}

impl ScrapingConfig {
    pub fn new() -> anyhow::Result<Self> {
        let portal_env = PortalEnv::load_from_env()?;
        Self::from_env(portal_env)
    }

    pub fn from_env(env: PortalEnv) -> anyhow::Result<Self> {
        let limits = ScanLimits {
            max_weeks: env.max_weeks.unwrap_or(DEFAULT_MAX_WEEKS),
            no_slot_strikes: env.no_slot_strikes.unwrap_or(DEFAULT_NO_SLOT_STRIKES),
        };
        if limits.max_weeks == 0 {
            anyhow::bail!("MAX_WEEKS must be at least 1");
        }
        if limits.no_slot_strikes == 0 {
            anyhow::bail!("NO_SLOT_STRIKES must be at least 1");
        }
        Ok(Self {
            login_url: LOGIN_URL.to_string(),
            credentials: Credentials {
                card_number: env.myrta_card_number,
                password: env.myrta_password,
            },
            timings: Timings::default(),
            limits,
            browser: BrowserConfig::default(),
            data_path: env
                .data_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
        })
    }
}

/// Remote store settings resolved from [`PublishEnv`].
#[derive(Debug, Clone)]
pub struct UploadingConfig {
    pub token: String,
    pub contents_url: String,
}

impl UploadingConfig {
    pub fn new() -> anyhow::Result<Self> {
        let env = PublishEnv::load_from_env()?;
        Ok(Self {
            token: env.pat,
            contents_url: env
                .github_contents_url
                .unwrap_or_else(|| GITHUB_CONTENTS_URL.to_string()),
        })
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}
