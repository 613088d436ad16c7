#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use driving_test_times::{
    Locator, PortalLayout, ScanLimits, ScrapingConfig, SelectOption, Session, SessionError,
    Timings,
    config::{BrowserConfig, Credentials},
};

/// One rendered calendar page.
#[derive(Debug, Clone)]
pub struct FakeWeek {
    pub days: Vec<(String, Vec<String>)>,
    pub no_slots: bool,
    pub has_next: bool,
    pub extraction_fails: bool,
}

impl FakeWeek {
    pub fn with_days(days: &[(&str, &[&str])]) -> Self {
        Self {
            days: days
                .iter()
                .map(|(day, slots)| {
                    (day.to_string(), slots.iter().map(|s| s.to_string()).collect())
                })
                .collect(),
            no_slots: false,
            has_next: true,
            extraction_fails: false,
        }
    }

    pub fn empty() -> Self {
        Self::with_days(&[])
    }

    /// The portal shows its "no timeslots" dialog on this week.
    pub fn no_slots(mut self) -> Self {
        self.no_slots = true;
        self
    }

    /// No "next week" control on this week.
    pub fn last(mut self) -> Self {
        self.has_next = false;
        self
    }

    pub fn broken(mut self) -> Self {
        self.extraction_fails = true;
        self
    }
}

/// A scripted stand-in for the booking portal.
pub struct FakeSession {
    layout: PortalLayout,
    pub options: Vec<SelectOption>,
    pub calendars: HashMap<String, Vec<FakeWeek>>,
    /// Locators that never become ready or clickable.
    pub unready: HashSet<Locator>,
    /// Locations whose selection is rejected.
    pub select_fails: HashSet<String>,
    /// Locations after which the "choose another location" link is missing.
    pub back_fails: HashSet<String>,
    /// Checkboxes and radios that start out selected.
    pub preselected: HashSet<Locator>,
    /// Repeat the last week forever instead of ending the calendar.
    pub endless: bool,

    pending: Option<String>,
    current: Option<(String, usize)>,

    pub opened: Vec<String>,
    pub typed: Vec<(Locator, String)>,
    pub clicked: Vec<Locator>,
    pub selected: Vec<String>,
    /// (location, week index) for every week whose days were read.
    pub weeks_seen: Vec<(String, usize)>,
    pub close_calls: usize,
}

impl FakeSession {
    pub fn new(options: &[(&str, bool)]) -> Self {
        Self {
            layout: PortalLayout::default(),
            options: options
                .iter()
                .map(|(text, enabled)| SelectOption::new(*text, *enabled))
                .collect(),
            calendars: HashMap::new(),
            unready: HashSet::new(),
            select_fails: HashSet::new(),
            back_fails: HashSet::new(),
            preselected: HashSet::new(),
            endless: false,
            pending: None,
            current: None,
            opened: vec![],
            typed: vec![],
            clicked: vec![],
            selected: vec![],
            weeks_seen: vec![],
            close_calls: 0,
        }
    }

    pub fn calendar(mut self, location: &str, weeks: Vec<FakeWeek>) -> Self {
        self.calendars.insert(location.to_string(), weeks);
        self
    }

    /// Put the session straight onto `location`'s first week.
    pub fn enter(&mut self, location: &str) {
        self.current = Some((location.to_string(), 0));
    }

    pub fn weeks_seen_for(&self, location: &str) -> Vec<usize> {
        self.weeks_seen
            .iter()
            .filter(|(l, _)| l == location)
            .map(|(_, w)| *w)
            .collect()
    }

    fn week(&self) -> Option<&FakeWeek> {
        let (location, index) = self.current.as_ref()?;
        let weeks = self.calendars.get(location)?;
        if self.endless {
            weeks.get(*index).or(weeks.last())
        } else {
            weeks.get(*index)
        }
    }

    fn clickable(&self, target: &Locator) -> bool {
        if self.unready.contains(target) {
            return false;
        }
        if *target == self.layout.next_week_button {
            return self.week().is_some_and(|w| w.has_next);
        }
        if *target == self.layout.another_location_link {
            return match &self.current {
                Some((location, _)) => !self.back_fails.contains(location),
                None => false,
            };
        }
        true
    }

    fn timeout(target: &Locator, waited: Duration) -> SessionError {
        SessionError::Timeout {
            target: target.clone(),
            waited,
        }
    }
}

impl Session for FakeSession {
    fn open(&mut self, url: &str) -> Result<(), SessionError> {
        self.opened.push(url.to_string());
        Ok(())
    }

    fn await_ready(&mut self, target: &Locator, timeout: Duration) -> Result<(), SessionError> {
        if self.unready.contains(target) {
            return Err(Self::timeout(target, timeout));
        }
        Ok(())
    }

    fn await_clickable(
        &mut self,
        target: &Locator,
        timeout: Duration,
    ) -> Result<(), SessionError> {
        if self.clickable(target) {
            Ok(())
        } else {
            Err(Self::timeout(target, timeout))
        }
    }

    fn click(&mut self, target: &Locator) -> Result<(), SessionError> {
        if !self.clickable(target) {
            return Err(SessionError::NotFound(target.clone()));
        }
        self.clicked.push(target.clone());
        if *target == self.layout.next_button {
            if let Some(location) = self.pending.take() {
                self.current = Some((location, 0));
            }
        } else if *target == self.layout.next_week_button {
            if let Some((_, index)) = self.current.as_mut() {
                *index += 1;
            }
        } else if *target == self.layout.another_location_link {
            self.current = None;
        }
        Ok(())
    }

    fn script_click(&mut self, target: &Locator) -> Result<(), SessionError> {
        self.clicked.push(target.clone());
        Ok(())
    }

    fn type_text(&mut self, target: &Locator, text: &str) -> Result<(), SessionError> {
        self.typed.push((target.clone(), text.to_string()));
        Ok(())
    }

    fn is_selected(&mut self, target: &Locator) -> Result<bool, SessionError> {
        Ok(self.preselected.contains(target))
    }

    fn select_by_text(&mut self, target: &Locator, text: &str) -> Result<(), SessionError> {
        if self.select_fails.contains(text) {
            return Err(SessionError::NoSuchOption {
                target: target.clone(),
                text: text.to_string(),
            });
        }
        self.selected.push(text.to_string());
        self.pending = Some(text.to_string());
        Ok(())
    }

    fn options(&mut self, _target: &Locator) -> Result<Vec<SelectOption>, SessionError> {
        Ok(self.options.clone())
    }

    fn text_of(&mut self, target: &Locator) -> Result<Option<String>, SessionError> {
        let Some((_, index)) = self.current.clone() else {
            return Ok(None);
        };
        if *target == self.layout.week_title {
            return Ok(Some(format!("Week {}", index + 1)));
        }
        if *target == self.layout.alert_dialog {
            return Ok(self
                .week()
                .filter(|w| w.no_slots)
                .map(|_| self.layout.no_slots_messages[0].clone()));
        }
        Ok(None)
    }

    fn texts_of(&mut self, target: &Locator) -> Result<Vec<String>, SessionError> {
        let Some(week) = self.week().cloned() else {
            return Ok(vec![]);
        };
        if *target == self.layout.day_labels {
            if let Some(current) = self.current.clone() {
                self.weeks_seen.push(current);
            }
            if week.extraction_fails {
                return Err(SessionError::Browser("stale element reference".to_string()));
            }
            return Ok(week.days.iter().map(|(day, _)| day.clone()).collect());
        }
        for (day, slots) in &week.days {
            if self.layout.available_slots(day).as_ref() == Some(target) {
                return Ok(slots.clone());
            }
        }
        Ok(vec![])
    }

    fn settle(&mut self, _pause: Duration) {}

    fn close(&mut self) -> Result<(), SessionError> {
        self.close_calls += 1;
        Ok(())
    }
}

pub fn config(limits: ScanLimits) -> ScrapingConfig {
    ScrapingConfig {
        login_url: "https://portal.test/login".to_string(),
        credentials: Credentials {
            card_number: "12345678".to_string(),
            password: "hunter2".to_string(),
        },
        timings: Timings::immediate(),
        limits,
        browser: BrowserConfig::default(),
        data_path: "data.json".into(),
    }
}

pub fn slots(times: &[&str]) -> Vec<String> {
    times.iter().map(|t| t.to_string()).collect()
}
