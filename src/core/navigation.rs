use crate::domain::ports::HomePage;
use crate::utils::error::{RecapError, Result};

pub const ANALYZE_ROUTE: &str = "/analyze";
pub const REDIRECT_FAILED_ALERT: &str =
    "Unable to redirect to the analysis page. Please try again.";

/// Routes every card control on the landing page to the analysis page.
pub struct CardNavigator<H: HomePage> {
    page: H,
}

impl<H: HomePage> CardNavigator<H> {
    pub fn attach(page: H) -> Result<Self> {
        let cards = page.card_count();
        if cards == 0 {
            tracing::warn!("No card controls found on the page");
            return Err(RecapError::NoCardControls);
        }

        tracing::debug!("Card navigation attached to {} controls", cards);
        Ok(Self { page })
    }

    pub fn page(&self) -> &H {
        &self.page
    }

    /// Click handler shared by all cards. No retry and no fallback route.
    pub fn on_card_click(&self) -> Result<()> {
        match self.page.set_location(ANALYZE_ROUTE) {
            Ok(()) => {
                tracing::info!("Navigating to {}", ANALYZE_ROUTE);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error redirecting to {} page: {}", ANALYZE_ROUTE, e);
                self.page.alert(REDIRECT_FAILED_ALERT);
                Err(e)
            }
        }
    }
}
