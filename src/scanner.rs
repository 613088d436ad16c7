use log::{error, info, warn};

use crate::{
    config::{ScanLimits, Timings},
    dataset::{DayLabel, LocationAvailability, SlotTime},
    error::SessionError,
    portal::PortalLayout,
    session::Session,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The portal said there are no timeslots, `no_slot_strikes` weeks running.
    NoSlots,
    /// The "next week" control could not be clicked.
    EndOfHorizon,
    /// `max_weeks` weeks were scanned without any other stop signal.
    WeekCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scanning,
    Done(StopReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub weeks_scanned: u32,
    pub stop: StopReason,
}

/// Walks one location's calendar a week at a time.
pub struct WeekScanner<'a> {
    layout: &'a PortalLayout,
    timings: Timings,
    limits: ScanLimits,
}

impl<'a> WeekScanner<'a> {
    pub fn new(layout: &'a PortalLayout, timings: Timings, limits: ScanLimits) -> Self {
        Self {
            layout,
            timings,
            limits,
        }
    }

    /// Scan from the currently rendered week until a stop signal, recording
    /// every non-empty day into `availability`.
    ///
    /// Extraction failures lose that week's data but never end the scan.
    pub fn scan(
        &self,
        session: &mut impl Session,
        location: &str,
        availability: &mut LocationAvailability,
    ) -> ScanSummary {
        let mut weeks_scanned = 0;
        let mut strikes = 0;

        let stop = loop {
            weeks_scanned += 1;

            match self.extract_week(session) {
                Ok(days) => {
                    for (day, slots) in days {
                        if !slots.is_empty() {
                            info!("{}: {}", day, slots.join(", "));
                        }
                        availability.record_day(day, slots);
                    }
                }
                Err(e) => error!("Error extracting times for {location}: {e}"),
            }

            if let ScanState::Done(stop) = self.next_state(session, weeks_scanned, &mut strikes) {
                break stop;
            }
        };
        info!("Finished {location} after {weeks_scanned} week(s): {stop:?}");
        ScanSummary {
            weeks_scanned,
            stop,
        }
    }

    fn next_state(
        &self,
        session: &mut impl Session,
        weeks_scanned: u32,
        strikes: &mut u32,
    ) -> ScanState {
        match self.no_slots_signalled(session) {
            Ok(true) => {
                *strikes += 1;
                info!("No timeslots for this week. Consecutive weeks with no slots: {strikes}");
                if *strikes >= self.limits.no_slot_strikes {
                    info!("Stopping search for this location after {strikes} week(s) with no slots");
                    return ScanState::Done(StopReason::NoSlots);
                }
            }
            Ok(false) => *strikes = 0,
            Err(e) => {
                warn!("Could not read the alert dialog: {e}");
                *strikes = 0;
            }
        }

        // A calendar that ends on the capped week is reported as ended.
        if weeks_scanned >= self.limits.max_weeks {
            if let Err(e) = session
                .await_clickable(&self.layout.next_week_button, self.timings.element_wait)
            {
                info!("No more weeks available or 'Next week' button not found ({e})");
                return ScanState::Done(StopReason::EndOfHorizon);
            }
            warn!(
                "Reached the {} week limit while the calendar still offered more weeks",
                self.limits.max_weeks
            );
            return ScanState::Done(StopReason::WeekCap);
        }

        match self.advance(session) {
            Ok(()) => ScanState::Scanning,
            Err(e) => {
                info!("No more weeks available or 'Next week' button not found ({e})");
                ScanState::Done(StopReason::EndOfHorizon)
            }
        }
    }

    fn extract_week(
        &self,
        session: &mut impl Session,
    ) -> Result<Vec<(DayLabel, Vec<SlotTime>)>, SessionError> {
        if let Some(week_starting) = session.text_of(&self.layout.week_title)? {
            info!("Week starting: {week_starting}");
        }

        let labels = session.texts_of(&self.layout.day_labels)?;
        let mut days = Vec::with_capacity(labels.len());
        for day in labels {
            let Some(slots_locator) = self.layout.available_slots(&day) else {
                warn!(
                    "Skipping day label without a weekday prefix, its slots are not read: {day:?}"
                );
                continue;
            };
            let slots = session.texts_of(&slots_locator)?;
            days.push((day, slots));
        }
        Ok(days)
    }

    fn no_slots_signalled(&self, session: &mut impl Session) -> Result<bool, SessionError> {
        let alert = session.text_of(&self.layout.alert_dialog)?;
        Ok(alert.is_some_and(|text| self.layout.is_no_slots_notice(&text)))
    }

    fn advance(&self, session: &mut impl Session) -> Result<(), SessionError> {
        session.click_when_ready(&self.layout.next_week_button, self.timings.element_wait)?;
        session.settle(self.timings.settle);
        Ok(())
    }
}
