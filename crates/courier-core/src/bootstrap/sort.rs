//! Organization ordering for the switcher

use std::cmp::Ordering;

use crate::domain::Organization;

/// Order organizations for display.
///
/// The account's personal organization comes first, then the other
/// organizations it owns, then everything else. Each group is sorted by
/// name. Only the first personal organization owned by the account is kept.
pub fn sort_organizations(account_id: &str, organizations: Vec<Organization>) -> Vec<Organization> {
    let mut personal: Option<Organization> = None;
    let mut owned = Vec::new();
    let mut others = Vec::new();

    for organization in organizations {
        if organization.is_owned_by(account_id) {
            if organization.is_personal() {
                if personal.is_none() {
                    personal = Some(organization);
                }
            } else {
                owned.push(organization);
            }
        } else {
            others.push(organization);
        }
    }

    owned.sort_by(by_name);
    others.sort_by(by_name);

    personal.into_iter().chain(owned).chain(others).collect()
}

fn by_name(a: &Organization, b: &Organization) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}
