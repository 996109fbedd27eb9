//! Payment-boundary validation.
//!
//! Validation failures are local and non-fatal: they are reported per
//! field, grouped into screen sections, and the first offending section
//! tells the caller where to direct attention.

use serde::{Deserialize, Serialize};

use crate::cart::BookingCart;
use crate::contact::is_plausible_email;

/// A section of the booking-details screen, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Passengers,
    Contact,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Passengers => write!(f, "passengers"),
            Section::Contact => write!(f, "contact"),
        }
    }
}

/// One failed check on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub section: Section,
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    fn new(section: Section, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            section,
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All issues found at the payment boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<FieldIssue>,
}

impl ValidationReport {
    /// Returns true when no checks failed.
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns the section the caller should scroll to first.
    pub fn first_invalid_section(&self) -> Option<Section> {
        self.issues.iter().map(|issue| issue.section).min()
    }

    /// Returns the issues for one section.
    pub fn issues_in(&self, section: Section) -> impl Iterator<Item = &FieldIssue> {
        self.issues.iter().filter(move |issue| issue.section == section)
    }
}

/// Checks the cart before the transition into the payment step.
///
/// Required: at least one passenger, complete passenger names, and the
/// required contact fields with a plausible email.
pub fn validate_for_payment(cart: &BookingCart) -> ValidationReport {
    let mut issues = Vec::new();

    if cart.passengers().is_empty() {
        issues.push(FieldIssue::new(
            Section::Passengers,
            "passengers",
            "At least one passenger is required",
        ));
    }
    for passenger in cart.passengers() {
        if !passenger.has_complete_name() {
            issues.push(FieldIssue::new(
                Section::Passengers,
                format!("passenger.{}", passenger.id),
                "First and last name are required",
            ));
        }
    }

    match cart.contact_info() {
        None => {
            issues.push(FieldIssue::new(
                Section::Contact,
                "contact",
                "Contact details are required",
            ));
        }
        Some(contact) => {
            if contact.email.trim().is_empty() {
                issues.push(FieldIssue::new(
                    Section::Contact,
                    "email",
                    "Email is required",
                ));
            } else if !is_plausible_email(&contact.email) {
                issues.push(FieldIssue::new(
                    Section::Contact,
                    "email",
                    "Email address is not valid",
                ));
            }
            if contact.phone.trim().is_empty() {
                issues.push(FieldIssue::new(
                    Section::Contact,
                    "phone",
                    "Phone number is required",
                ));
            }
            if contact.first_name.trim().is_empty() {
                issues.push(FieldIssue::new(
                    Section::Contact,
                    "firstName",
                    "First name is required",
                ));
            }
            if contact.last_name.trim().is_empty() {
                issues.push(FieldIssue::new(
                    Section::Contact,
                    "lastName",
                    "Last name is required",
                ));
            }
        }
    }

    // Stable section ordering so the first issue is also the first section
    // on screen.
    issues.sort_by_key(|issue| issue.section);
    ValidationReport { issues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::ContactInfo;
    use crate::passenger::Passenger;
    use availability::PassengerType;

    fn valid_contact() -> ContactInfo {
        ContactInfo {
            email: "anna@example.com".to_string(),
            phone: "+358401234567".to_string(),
            first_name: "Anna".to_string(),
            last_name: "Virtanen".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_cart_passes() {
        let mut cart = BookingCart::new();
        cart.add_passenger(Passenger::new(PassengerType::Adult, "Anna", "Virtanen"));
        cart.set_contact_info(valid_contact());

        let report = validate_for_payment(&cart);
        assert!(report.is_valid());
        assert_eq!(report.first_invalid_section(), None);
    }

    #[test]
    fn test_empty_cart_flags_both_sections() {
        let cart = BookingCart::new();
        let report = validate_for_payment(&cart);

        assert!(!report.is_valid());
        assert_eq!(report.first_invalid_section(), Some(Section::Passengers));
        assert!(report.issues_in(Section::Contact).count() > 0);
    }

    #[test]
    fn test_incomplete_passenger_name_is_flagged() {
        let mut cart = BookingCart::new();
        cart.add_passenger(Passenger::new(PassengerType::Adult, "Anna", ""));
        cart.set_contact_info(valid_contact());

        let report = validate_for_payment(&cart);
        assert!(!report.is_valid());
        assert_eq!(report.first_invalid_section(), Some(Section::Passengers));
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn test_bad_email_is_flagged() {
        let mut cart = BookingCart::new();
        cart.add_passenger(Passenger::new(PassengerType::Adult, "Anna", "Virtanen"));
        let mut contact = valid_contact();
        contact.email = "not-an-email".to_string();
        cart.set_contact_info(contact);

        let report = validate_for_payment(&cart);
        assert!(!report.is_valid());
        assert_eq!(report.first_invalid_section(), Some(Section::Contact));
        let issue = report.issues_in(Section::Contact).next().unwrap();
        assert_eq!(issue.field, "email");
    }

    #[test]
    fn test_missing_contact_fields_reported_per_field() {
        let mut cart = BookingCart::new();
        cart.add_passenger(Passenger::new(PassengerType::Adult, "Anna", "Virtanen"));
        cart.set_contact_info(ContactInfo {
            email: "anna@example.com".to_string(),
            ..Default::default()
        });

        let report = validate_for_payment(&cart);
        let fields: Vec<&str> = report
            .issues_in(Section::Contact)
            .map(|issue| issue.field.as_str())
            .collect();
        assert_eq!(fields, vec!["phone", "firstName", "lastName"]);
    }
}
