//! Checkout step state machine.

use serde::{Deserialize, Serialize};

/// One stage of the reservation flow.
///
/// Steps are strictly ordered:
/// ```text
/// Search ──► SelectFerry ──► BookingDetails ──► Payment ──► Confirmation
/// ```
/// Forward movement is one step at a time through [`CheckoutStep::next`];
/// clicking a step ahead of the current one never navigates, and clicking a
/// step at or behind it navigates only under a caller-granted back policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutStep {
    /// Entering search criteria.
    #[default]
    Search,

    /// Choosing outbound (and return) sailings from the results.
    SelectFerry,

    /// Passengers, vehicles, cabins, meals, and contact details.
    BookingDetails,

    /// Payment against the created booking.
    Payment,

    /// Booking confirmed (terminal).
    Confirmation,
}

impl CheckoutStep {
    /// Returns the 0-based position of this step in the flow.
    pub fn index(&self) -> usize {
        match self {
            CheckoutStep::Search => 0,
            CheckoutStep::SelectFerry => 1,
            CheckoutStep::BookingDetails => 2,
            CheckoutStep::Payment => 3,
            CheckoutStep::Confirmation => 4,
        }
    }

    /// Returns the step after this one, if any.
    pub fn next(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Search => Some(CheckoutStep::SelectFerry),
            CheckoutStep::SelectFerry => Some(CheckoutStep::BookingDetails),
            CheckoutStep::BookingDetails => Some(CheckoutStep::Payment),
            CheckoutStep::Payment => Some(CheckoutStep::Confirmation),
            CheckoutStep::Confirmation => None,
        }
    }

    /// Decides whether a click on `target` may navigate away from `self`.
    ///
    /// A target ahead of the current step is always refused; a target at or
    /// behind it is allowed only when the caller grants backward navigation.
    pub fn navigate(self, target: CheckoutStep, can_go_back: bool) -> Option<CheckoutStep> {
        if target.index() > self.index() {
            return None;
        }
        can_go_back.then_some(target)
    }

    /// Returns true once the flow has completed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutStep::Confirmation)
    }

    /// Returns the step name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Search => "Search",
            CheckoutStep::SelectFerry => "SelectFerry",
            CheckoutStep::BookingDetails => "BookingDetails",
            CheckoutStep::Payment => "Payment",
            CheckoutStep::Confirmation => "Confirmation",
        }
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
