use log::info;

use crate::{
    config::{Credentials, Timings},
    error::{ScrapeError, SessionError},
    portal::PortalLayout,
    session::Session,
};

/// Drives the onboarding wizard from the login page to the location list.
pub struct SessionNavigator<'a> {
    layout: &'a PortalLayout,
    timings: Timings,
}

impl<'a> SessionNavigator<'a> {
    pub fn new(layout: &'a PortalLayout, timings: Timings) -> Self {
        Self { layout, timings }
    }

    /// Log in, pick car / driving test, accept the terms and switch to
    /// search-by-location. Any step that times out aborts the run.
    pub fn bootstrap(
        &self,
        session: &mut impl Session,
        login_url: &str,
        credentials: &Credentials,
    ) -> Result<(), ScrapeError> {
        let layout = self.layout;
        let wait = self.timings.element_wait;

        info!("Opening booking portal");
        at("open portal", session.open(login_url))?;

        at("card number", session.await_ready(&layout.card_number, wait))?;
        at(
            "card number",
            session.type_text(&layout.card_number, &credentials.card_number),
        )?;
        at("password", session.await_ready(&layout.password, wait))?;
        at(
            "password",
            session.type_text(&layout.password, &credentials.password),
        )?;
        session.settle(self.timings.settle);

        at("login", session.click_when_ready(&layout.login_button, wait))?;
        info!("Logged in");

        at(
            "book test",
            session.click_when_ready(&layout.book_test_link, wait),
        )?;
        session.settle(self.timings.settle);

        at(
            "vehicle category",
            session.await_clickable(&layout.car_category, wait),
        )?;
        at(
            "vehicle category",
            session.script_click(&layout.car_category),
        )?;
        at(
            "test type",
            session.await_clickable(&layout.driving_test, wait),
        )?;
        at("test type", session.script_click(&layout.driving_test))?;
        session.settle(self.timings.settle);
        at(
            "test type",
            session.click_when_ready(&layout.next_button, wait),
        )?;
        info!("Selected car driving test");
        session.settle(self.timings.settle);

        at(
            "terms",
            session.click_when_ready(&layout.terms_checkbox, wait),
        )?;
        session.settle(self.timings.settle);
        at("terms", session.click_when_ready(&layout.next_button, wait))?;
        info!("Accepted terms and conditions");
        session.settle(self.timings.settle);

        if !at("location mode", session.is_selected(&layout.by_location))? {
            at("location mode", session.click(&layout.by_location))?;
        }
        session.settle(self.timings.settle);

        info!("Reached location selection");
        Ok(())
    }
}

fn at<T>(step: &'static str, result: Result<T, SessionError>) -> Result<T, ScrapeError> {
    result.map_err(|source| ScrapeError::Bootstrap { step, source })
}
