use log::{error, info};

use crate::{
    config::{ScanLimits, Timings},
    dataset::{DataAggregator, LocationAvailability},
    error::{ScrapeError, SessionError, Severity},
    portal::PortalLayout,
    scanner::{ScanSummary, WeekScanner},
    session::{SelectOption, Session},
};

/// What happened to the locations of one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IterationReport {
    /// Every location visited, in enumeration order.
    pub attempted: Vec<String>,
    /// Locations abandoned after a recoverable error.
    pub failed: Vec<String>,
    /// Set when returning to the location list failed and the loop stopped.
    pub stopped_early: bool,
}

/// Visits every selectable location once and scans its calendar.
pub struct LocationIterator<'a> {
    layout: &'a PortalLayout,
    timings: Timings,
    scanner: WeekScanner<'a>,
}

impl<'a> LocationIterator<'a> {
    pub fn new(layout: &'a PortalLayout, timings: Timings, limits: ScanLimits) -> Self {
        Self {
            layout,
            timings,
            scanner: WeekScanner::new(layout, timings, limits),
        }
    }

    /// Read the location control once and keep the selectable names, in the
    /// order the control lists them.
    pub fn enumerate(&self, session: &mut impl Session) -> Result<Vec<String>, ScrapeError> {
        let select = &self.layout.location_select;
        let options = session
            .await_ready(select, self.timings.element_wait)
            .and_then(|()| session.options(select))
            .map_err(|source| ScrapeError::Bootstrap {
                step: "location list",
                source,
            })?;

        let names: Vec<String> = options
            .into_iter()
            .filter(|option| self.is_selectable(option))
            .map(|option| option.text.trim().to_string())
            .collect();

        info!("Found {} locations to process.", names.len());
        info!("Locations: {}", names.join(", "));
        Ok(names)
    }

    pub fn is_selectable(&self, option: &SelectOption) -> bool {
        option.enabled && !option.text.trim().is_empty() && !self.layout.is_placeholder(&option.text)
    }

    /// Enumerate, then visit each location, recording whatever it yielded into
    /// `aggregator`. Only a fatal error is returned; everything else is logged
    /// and reflected in the report.
    pub fn run(
        &self,
        session: &mut impl Session,
        aggregator: &mut DataAggregator,
    ) -> Result<IterationReport, ScrapeError> {
        let locations = self.enumerate(session)?;
        let mut report = IterationReport::default();

        for location in locations {
            let mut availability = LocationAvailability::new();
            let outcome = self.visit(session, &location, &mut availability);
            aggregator.record(&location, availability);
            report.attempted.push(location.clone());

            let Err(e) = outcome else {
                continue;
            };
            match e.severity() {
                Severity::Recoverable => {
                    error!("{e}");
                    report.failed.push(location);
                }
                Severity::StopIteration => {
                    error!("{e}. Exiting.");
                    report.stopped_early = true;
                    break;
                }
                Severity::Fatal => return Err(e),
            }
        }

        Ok(report)
    }

    fn visit(
        &self,
        session: &mut impl Session,
        location: &str,
        availability: &mut LocationAvailability,
    ) -> Result<ScanSummary, ScrapeError> {
        self.select(session, location)
            .map_err(|source| ScrapeError::Location {
                location: location.to_string(),
                source,
            })?;

        let summary = self.scanner.scan(session, location, availability);

        session
            .click_when_ready(&self.layout.another_location_link, self.timings.element_wait)
            .map_err(|source| ScrapeError::NavigateBack {
                location: location.to_string(),
                source,
            })?;
        session.settle(self.timings.after_back);

        Ok(summary)
    }

    fn select(
        &self,
        session: &mut impl Session,
        location: &str,
    ) -> Result<(), SessionError> {
        let select = &self.layout.location_select;
        session.await_ready(select, self.timings.element_wait)?;
        session.select_by_text(select, location)?;
        info!("Selected Location: {location}");

        session.click_when_ready(&self.layout.next_button, self.timings.element_wait)?;
        session.settle(self.timings.after_select);
        Ok(())
    }
}
