pub mod chrome;
pub mod config;
pub mod dataset;
pub mod error;
pub mod locations;
pub mod logging;
pub mod navigator;
pub mod portal;
pub mod publish;
mod requests;
pub mod scanner;
pub mod scraping_context;
pub mod session;

pub use chrome::ChromeSession;
pub use config::{ScanLimits, ScrapingConfig, Timings, UploadingConfig};
pub use dataset::{DataAggregator, Dataset, LocationAvailability};
pub use error::{PublishError, ScrapeError, SessionError, Severity};
pub use locations::{IterationReport, LocationIterator};
pub use navigator::SessionNavigator;
pub use portal::PortalLayout;
pub use publish::{GithubContentsStore, PublishAdapter, PublishReport, RemoteStore};
pub use scanner::{ScanSummary, StopReason, WeekScanner};
pub use scraping_context::{ScrapeRun, ScrapingContext, run_scrape, scrape_succeeded};
pub use session::{Locator, SelectOption, Session};
