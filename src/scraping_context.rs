use anyhow::Context;
use log::{info, warn};

use crate::{
    chrome::ChromeSession,
    config::ScrapingConfig,
    dataset::{DataAggregator, Dataset},
    error::ScrapeError,
    locations::{IterationReport, LocationIterator},
    navigator::SessionNavigator,
    portal::PortalLayout,
    session::Session,
};

/// Result of one pass over every location.
#[derive(Debug)]
pub struct ScrapeRun {
    pub dataset: Dataset,
    pub report: IterationReport,
}

/// Everything a run needs, resolved once at start-up.
pub struct ScrapingContext {
    pub scraping_config: ScrapingConfig,
    pub layout: PortalLayout,
}

impl ScrapingContext {
    pub fn new() -> anyhow::Result<Self> {
        let scraping_config = ScrapingConfig::new()?;
        Ok(ScrapingContext {
            scraping_config,
            layout: PortalLayout::default(),
        })
    }

    /// Launch headless Chrome and scrape on a blocking thread.
    pub async fn scrape_in_browser(self) -> anyhow::Result<ScrapeRun> {
        tokio::task::spawn_blocking(move || -> anyhow::Result<ScrapeRun> {
            let mut session = ChromeSession::launch(&self.scraping_config.browser)?;
            let run = run_scrape(&mut session, &self.scraping_config, &self.layout)?;
            Ok(run)
        })
        .await
        .context("scraping task panicked")?
    }
}

/// Whether the job as a whole succeeded: scanning produced at least one slot.
/// Saving and publishing are reported in the log only.
pub fn scrape_succeeded(dataset: Option<&Dataset>) -> bool {
    dataset.is_some_and(Dataset::has_slots)
}

/// Bootstrap the session, visit every location and collect the dataset.
///
/// The session is closed on every path out of here.
pub fn run_scrape(
    session: &mut impl Session,
    config: &ScrapingConfig,
    layout: &PortalLayout,
) -> Result<ScrapeRun, ScrapeError> {
    let result = scrape(session, config, layout);
    if let Err(e) = session.close() {
        warn!("Failed to tear down browser session: {e}");
    }
    result
}

fn scrape(
    session: &mut impl Session,
    config: &ScrapingConfig,
    layout: &PortalLayout,
) -> Result<ScrapeRun, ScrapeError> {
    SessionNavigator::new(layout, config.timings).bootstrap(
        session,
        &config.login_url,
        &config.credentials,
    )?;

    let mut aggregator = DataAggregator::new();
    let report = LocationIterator::new(layout, config.timings, config.limits)
        .run(session, &mut aggregator)?;
    let dataset = aggregator.finish();

    info!(
        "Scanned {} location(s), {} failed{}",
        report.attempted.len(),
        report.failed.len(),
        if report.stopped_early {
            ", stopped early"
        } else {
            ""
        }
    );
    Ok(ScrapeRun { dataset, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::LocationAvailability;

    #[test]
    fn only_a_dataset_with_slots_counts_as_success() {
        assert!(!scrape_succeeded(None));

        let mut aggregator = DataAggregator::new();
        aggregator.record("Wollongong", LocationAvailability::new());
        let empty = aggregator.finish();
        assert!(!scrape_succeeded(Some(&empty)));

        let mut auburn = LocationAvailability::new();
        auburn.record_day("Wed 14 Jan".to_string(), vec!["07:30".to_string()]);
        let mut aggregator = DataAggregator::new();
        aggregator.record("Auburn", auburn);
        assert!(scrape_succeeded(Some(&aggregator.finish())));
    }
}
