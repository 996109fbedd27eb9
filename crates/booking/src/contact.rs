//! Contact details for the reservation.

use serde::{Deserialize, Serialize};

/// The lead traveler's contact information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Checks an email address for the shape `local@domain.tld`.
///
/// This is a boundary sanity check, not RFC validation; the booking
/// collaborator is the authority.
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.split_once('.').is_some_and(|(host, _)| !host.is_empty())
        && !domain.contains('@')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_normal_addresses() {
        assert!(is_plausible_email("anna@example.com"));
        assert!(is_plausible_email("a.b+tag@mail.example.fi"));
    }

    #[test]
    fn test_rejects_broken_addresses() {
        assert!(!is_plausible_email(""));
        assert!(!is_plausible_email("no-at-sign.com"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("anna@"));
        assert!(!is_plausible_email("anna@nodot"));
        assert!(!is_plausible_email("anna@.com"));
        assert!(!is_plausible_email("anna@example.com."));
        assert!(!is_plausible_email("anna@ex@ample.com"));
    }
}
