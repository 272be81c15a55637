// NexusHealth - app/navigation.rs
//
// Navigation controller: combines who is signed in (role) with what that
// role may see (access table) to produce the menu, and owns the active tab.
//
// State machine:
//   Unauthenticated --on_authenticated(role)--> Authenticated(dashboard)
//   Authenticated   --set_active_tab(y)------> Authenticated(y)
//   Authenticated   --on_logged_out()--------> Unauthenticated
// Navigation while unauthenticated never mutates state; the caller is told
// to show the login entry point instead.
//
// Visibility is a presentation filter. `set_active_tab` accepts sections
// the role cannot see; `content_tab` then falls back to the default.

use crate::core::access;
use crate::core::catalog;
use crate::core::model::{MenuGroup, Role, SectionId};
use crate::util::constants::DEFAULT_SECTION;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavState {
    Unauthenticated,
    Authenticated { role: Role, active_tab: SectionId },
}

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    Switched { from: SectionId, to: SectionId },
    /// Requested tab was already active.
    Unchanged,
    /// Nobody is signed in; show the login entry point.
    RedirectToLogin,
}

#[derive(Debug, Clone)]
pub struct NavigationController {
    catalog: Vec<MenuGroup>,
    state: NavState,
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationController {
    /// Controller over the built-in master catalog.
    pub fn new() -> Self {
        Self::with_catalog(catalog::master_catalog())
    }

    pub fn with_catalog(catalog: Vec<MenuGroup>) -> Self {
        Self {
            catalog,
            state: NavState::Unauthenticated,
        }
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn role(&self) -> Option<&Role> {
        match &self.state {
            NavState::Authenticated { role, .. } => Some(role),
            NavState::Unauthenticated => None,
        }
    }

    pub fn active_tab(&self) -> Option<&SectionId> {
        match &self.state {
            NavState::Authenticated { active_tab, .. } => Some(active_tab),
            NavState::Unauthenticated => None,
        }
    }

    /// Login or restore succeeded. Re-authenticating as another user also
    /// lands on the default section.
    pub fn on_authenticated(&mut self, role: Role) {
        tracing::debug!(%role, known = role.is_known(), "Navigation authenticated");
        self.state = NavState::Authenticated {
            role,
            active_tab: SectionId::from(DEFAULT_SECTION),
        };
    }

    pub fn on_logged_out(&mut self) {
        tracing::debug!("Navigation reset to login");
        self.state = NavState::Unauthenticated;
    }

    /// The one entry point for every panel switch (menu click, search,
    /// shortcut buttons, redirects).
    pub fn set_active_tab(&mut self, id: SectionId) -> NavOutcome {
        match &mut self.state {
            NavState::Unauthenticated => {
                tracing::debug!(section = %id, "Navigation while signed out; redirecting to login");
                NavOutcome::RedirectToLogin
            }
            NavState::Authenticated { role, active_tab } => {
                if *active_tab == id {
                    return NavOutcome::Unchanged;
                }
                if !access::sections_for(role).permits(&id) {
                    tracing::debug!(section = %id, %role, "Active tab is outside the role's menu");
                }
                let from = std::mem::replace(active_tab, id.clone());
                NavOutcome::Switched { from, to: id }
            }
        }
    }

    /// Menu for an arbitrary role, filtered from this controller's catalog.
    pub fn visible_menu(&self, role: &Role) -> Vec<MenuGroup> {
        catalog::filter_catalog(&self.catalog, &access::sections_for(role))
    }

    /// Menu for the signed-in role; empty when signed out.
    pub fn current_menu(&self) -> Vec<MenuGroup> {
        self.role()
            .map(|role| self.visible_menu(role))
            .unwrap_or_default()
    }

    /// Whether `id` appears in the signed-in role's menu.
    pub fn is_visible(&self, id: &SectionId) -> bool {
        self.current_menu()
            .iter()
            .any(|group| group.section_ids().any(|s| s == id))
    }

    /// Section the content area should render. An active tab the role
    /// cannot see (stale deep link, role change) falls back to the default.
    pub fn content_tab(&self) -> Option<SectionId> {
        let active = self.active_tab()?;
        if self.is_visible(active) {
            Some(active.clone())
        } else {
            Some(SectionId::from(DEFAULT_SECTION))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unauthenticated_and_redirects() {
        let mut nav = NavigationController::new();
        assert_eq!(nav.state(), &NavState::Unauthenticated);
        assert_eq!(
            nav.set_active_tab(SectionId::from("patients")),
            NavOutcome::RedirectToLogin
        );
        assert_eq!(nav.state(), &NavState::Unauthenticated);
        assert!(nav.current_menu().is_empty());
        assert_eq!(nav.content_tab(), None);
    }

    #[test]
    fn test_login_lands_on_default_then_switches() {
        let mut nav = NavigationController::new();
        nav.on_authenticated(Role::Doctor);
        assert_eq!(nav.active_tab(), Some(&SectionId::from("dashboard")));

        let outcome = nav.set_active_tab(SectionId::from("patients"));
        assert_eq!(
            outcome,
            NavOutcome::Switched {
                from: SectionId::from("dashboard"),
                to: SectionId::from("patients"),
            }
        );
        assert_eq!(
            nav.set_active_tab(SectionId::from("patients")),
            NavOutcome::Unchanged
        );
    }

    #[test]
    fn test_hidden_tab_is_accepted_but_content_falls_back() {
        let mut nav = NavigationController::new();
        nav.on_authenticated(Role::Nurse);
        let outcome = nav.set_active_tab(SectionId::from("billing"));
        assert!(matches!(outcome, NavOutcome::Switched { .. }));
        assert_eq!(nav.active_tab(), Some(&SectionId::from("billing")));
        assert_eq!(nav.content_tab(), Some(SectionId::from("dashboard")));
    }

    #[test]
    fn test_logout_returns_to_unauthenticated() {
        let mut nav = NavigationController::new();
        nav.on_authenticated(Role::Admin);
        nav.set_active_tab(SectionId::from("audit"));
        nav.on_logged_out();
        assert_eq!(nav.active_tab(), None);
        assert_eq!(nav.role(), None);
    }

    #[test]
    fn test_current_menu_matches_role_filter() {
        let mut nav = NavigationController::new();
        nav.on_authenticated(Role::Accountant);
        assert_eq!(nav.current_menu(), catalog::visible_menu(&Role::Accountant));
        assert!(nav.is_visible(&SectionId::from("revenue")));
        assert!(!nav.is_visible(&SectionId::from("patients")));
    }

    #[test]
    fn test_unrecognised_role_signs_in_with_empty_menu() {
        let mut nav = NavigationController::new();
        nav.on_authenticated(Role::Other("Staff".to_string()));
        assert!(nav.current_menu().is_empty());
        assert_eq!(nav.active_tab(), Some(&SectionId::from("dashboard")));
        assert_eq!(nav.content_tab(), Some(SectionId::from("dashboard")));
    }
}
