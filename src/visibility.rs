//! Page-visibility gate.
//!
//! The clinic's configured structure selects which workflow pages are
//! active. Visibility is a pure function of (structure, path); navigation
//! outcomes encode the redirect behaviour instead of an error.

use serde::Serialize;

use crate::models::enums::ClinicStructure;

pub const PAGE_LOGIN: &str = "/login";
pub const PAGE_RECEPTION: &str = "/reception";
pub const PAGE_DOCTOR: &str = "/doctor";
pub const PAGE_PHARMACY: &str = "/pharmacy";
pub const PAGE_ONE_DOCTOR: &str = "/one-doctor";

/// Static allow-list of pages for a workflow structure.
pub fn allowed_pages(structure: ClinicStructure) -> &'static [&'static str] {
    match structure {
        ClinicStructure::FullWorkflow => &[PAGE_RECEPTION, PAGE_DOCTOR, PAGE_PHARMACY],
        ClinicStructure::NoPharmacy => &[PAGE_RECEPTION, PAGE_DOCTOR],
        ClinicStructure::OneMan => &[PAGE_RECEPTION, PAGE_ONE_DOCTOR],
    }
}

/// Whether a path is permitted under the given structure.
pub fn is_page_visible(path: &str, structure: ClinicStructure) -> bool {
    allowed_pages(structure).contains(&path)
}

/// Where a navigation attempt should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "target")]
pub enum NavigationOutcome {
    Allow,
    /// Unauthenticated access always goes to login.
    RedirectLogin,
    /// Authenticated but disallowed — land on the reception page.
    RedirectReception,
}

impl NavigationOutcome {
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Self::Allow => None,
            Self::RedirectLogin => Some(PAGE_LOGIN),
            Self::RedirectReception => Some(PAGE_RECEPTION),
        }
    }
}

/// Route a navigation attempt.
pub fn route_navigation(
    authenticated: bool,
    structure: ClinicStructure,
    path: &str,
) -> NavigationOutcome {
    if !authenticated {
        return NavigationOutcome::RedirectLogin;
    }
    if is_page_visible(path, structure) {
        NavigationOutcome::Allow
    } else {
        NavigationOutcome::RedirectReception
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PAGES: &[&str] = &[PAGE_RECEPTION, PAGE_DOCTOR, PAGE_PHARMACY, PAGE_ONE_DOCTOR];

    #[test]
    fn full_workflow_allow_list_exact() {
        for page in ALL_PAGES {
            let expected = matches!(*page, PAGE_RECEPTION | PAGE_DOCTOR | PAGE_PHARMACY);
            assert_eq!(
                is_page_visible(page, ClinicStructure::FullWorkflow),
                expected,
                "full_workflow visibility of {page}"
            );
        }
    }

    #[test]
    fn no_pharmacy_allow_list_exact() {
        for page in ALL_PAGES {
            let expected = matches!(*page, PAGE_RECEPTION | PAGE_DOCTOR);
            assert_eq!(
                is_page_visible(page, ClinicStructure::NoPharmacy),
                expected,
                "no_pharmacy visibility of {page}"
            );
        }
    }

    #[test]
    fn one_man_allow_list_exact() {
        for page in ALL_PAGES {
            let expected = matches!(*page, PAGE_RECEPTION | PAGE_ONE_DOCTOR);
            assert_eq!(
                is_page_visible(page, ClinicStructure::OneMan),
                expected,
                "one_man visibility of {page}"
            );
        }
    }

    #[test]
    fn unknown_paths_never_visible() {
        for structure in [
            ClinicStructure::FullWorkflow,
            ClinicStructure::NoPharmacy,
            ClinicStructure::OneMan,
        ] {
            assert!(!is_page_visible("/admin", structure));
            assert!(!is_page_visible("", structure));
            assert!(!is_page_visible("/reception/", structure));
        }
    }

    #[test]
    fn unauthenticated_always_redirects_to_login() {
        let outcome = route_navigation(false, ClinicStructure::FullWorkflow, PAGE_RECEPTION);
        assert_eq!(outcome, NavigationOutcome::RedirectLogin);
        assert_eq!(outcome.redirect_target(), Some(PAGE_LOGIN));
    }

    #[test]
    fn disallowed_redirects_to_reception() {
        let outcome = route_navigation(true, ClinicStructure::OneMan, PAGE_PHARMACY);
        assert_eq!(outcome, NavigationOutcome::RedirectReception);
        assert_eq!(outcome.redirect_target(), Some(PAGE_RECEPTION));
    }

    #[test]
    fn allowed_passes_through() {
        let outcome = route_navigation(true, ClinicStructure::OneMan, PAGE_ONE_DOCTOR);
        assert_eq!(outcome, NavigationOutcome::Allow);
        assert!(outcome.redirect_target().is_none());
    }
}
