use std::sync::LazyLock;

use regex::Regex;

use crate::session::Locator;

// Leading weekday token of a rendered day label, e.g. "Mon" in "Mon 12 Jan".
static WEEKDAY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z]{3})").expect("weekday regex is valid"));

/// Every element of the booking portal the scraper touches.
#[derive(Debug, Clone)]
pub struct PortalLayout {
    pub card_number: Locator,
    pub password: Locator,
    pub login_button: Locator,
    pub book_test_link: Locator,
    pub car_category: Locator,
    pub driving_test: Locator,
    pub next_button: Locator,
    pub terms_checkbox: Locator,
    pub by_location: Locator,
    pub location_select: Locator,
    pub week_title: Locator,
    pub day_labels: Locator,
    pub alert_dialog: Locator,
    pub next_week_button: Locator,
    pub another_location_link: Locator,
    pub placeholder_option: String,
    pub no_slots_messages: Vec<String>,
}

impl Default for PortalLayout {
    fn default() -> Self {
        Self {
            card_number: Locator::id("widget_cardNumber"),
            password: Locator::id("widget_password"),
            login_button: Locator::xpath("//span[@id='nextButton_label']"),
            book_test_link: Locator::xpath(
                "//a[@class='general-btn' and contains(@href, 'tbsloginredirect')]",
            ),
            car_category: Locator::id("CAR"),
            driving_test: Locator::id("c1tt3"),
            next_button: Locator::id("nextButton"),
            terms_checkbox: Locator::id("checkTerms"),
            by_location: Locator::id("rms_batLocLocSel"),
            location_select: Locator::id("rms_batLocationSelect2"),
            week_title: Locator::xpath("//span[@class='title']"),
            day_labels: Locator::xpath("//span[@class='d']"),
            alert_dialog: Locator::xpath("//div[@role='alertdialog']"),
            next_week_button: Locator::id("nextWeekButton"),
            another_location_link: Locator::id("anotherLocationLink"),
            placeholder_option: "choose...".to_string(),
            no_slots_messages: vec![
                "There are no timeslots available for this week.".to_string(),
                "There are no timeslots available at this location.".to_string(),
            ],
        }
    }
}

impl PortalLayout {
    /// Available slot links in the calendar column of `day_label`.
    ///
    /// Columns are classed by weekday (`rms_mon`, `rms_tue`, ...), so the
    /// label's leading three letters pick the column.
    pub fn available_slots(&self, day_label: &str) -> Option<Locator> {
        let weekday = WEEKDAY_PREFIX.captures(day_label)?.get(1)?.as_str();
        Some(Locator::xpath(format!(
            "//td[contains(@class, 'rms_{}')]//a[contains(@class, 'available')]",
            weekday.to_lowercase()
        )))
    }

    pub fn is_placeholder(&self, option_text: &str) -> bool {
        option_text.trim().eq_ignore_ascii_case(&self.placeholder_option)
    }

    pub fn is_no_slots_notice(&self, alert_text: &str) -> bool {
        self.no_slots_messages
            .iter()
            .any(|message| alert_text.contains(message.as_str()))
    }
}
