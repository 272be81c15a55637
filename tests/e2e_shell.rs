// NexusHealth - tests/e2e_shell.rs
//
// End-to-end tests for the shell state layer.
//
// These drive the public library API with real on-disk storage (FileStore
// under a TempDir) or MemoryStore, and a scripted auth API double. They
// cover the theme, session, access and navigation properties together,
// including state surviving a simulated restart.

use nexushealth::app::navigation::{NavOutcome, NavigationController};
use nexushealth::app::session::{SessionOptions, SessionStore};
use nexushealth::app::state::{self, AppState, ShellEvent};
use nexushealth::app::theme::ThemeResolver;
use nexushealth::core::access::{sections_for, sections_for_label};
use nexushealth::core::catalog::{filter_catalog, master_catalog, visible_menu};
use nexushealth::core::model::{
    Access, Identity, ResolvedTheme, Role, SectionId, SessionStatus, ThemePreference,
};
use nexushealth::core::theme::resolve;
use nexushealth::platform::api::{AuthApi, AuthGrant, Credentials, Registration};
use nexushealth::platform::appearance::FixedProbe;
use nexushealth::platform::config::AppConfig;
use nexushealth::platform::storage::{FileStore, KeyValueStore, MemoryStore};
use nexushealth::util::error::AuthError;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

/// Scripted auth API: a fixed roster, password "pw" for everyone.
struct WardApi {
    roster: Vec<Identity>,
}

impl WardApi {
    fn new() -> Self {
        let person = |id: &str, name: &str, role: Role| Identity {
            id: id.to_string(),
            name: name.to_string(),
            role,
            avatar_ref: None,
            email: Some(format!("{id}@ward.test")),
        };
        Self {
            roster: vec![
                person("chen", "Dr. Chen", Role::Doctor),
                person("okoro", "Nurse Okoro", Role::Nurse),
                person("root", "Admin", Role::Admin),
            ],
        }
    }
}

impl AuthApi for WardApi {
    fn login(&self, c: &Credentials) -> Result<AuthGrant, AuthError> {
        if c.password != "pw" {
            return Err(AuthError::Rejected {
                status: 401,
                detail: "Invalid credentials".to_string(),
            });
        }
        self.roster
            .iter()
            .find(|i| i.email.as_deref() == Some(c.email.as_str()))
            .map(|i| AuthGrant {
                token: format!("t-{}", i.id),
                identity: i.clone(),
            })
            .ok_or(AuthError::Rejected {
                status: 401,
                detail: "Invalid credentials".to_string(),
            })
    }

    fn register(&self, _r: &Registration) -> Result<AuthGrant, AuthError> {
        Err(AuthError::Rejected {
            status: 403,
            detail: "Registration closed".to_string(),
        })
    }

    fn me(&self, token: &str) -> Result<Identity, AuthError> {
        self.roster
            .iter()
            .find(|i| format!("t-{}", i.id) == token)
            .cloned()
            .ok_or(AuthError::Rejected {
                status: 401,
                detail: "Invalid token".to_string(),
            })
    }
}

/// Auth API that answers every login with a raw response body, decoded
/// the way the HTTP client decodes it.
struct RawBodyApi {
    body: &'static str,
}

impl AuthApi for RawBodyApi {
    fn login(&self, _c: &Credentials) -> Result<AuthGrant, AuthError> {
        serde_json::from_str(self.body).map_err(|e| AuthError::InvalidCredentials {
            reason: e.to_string(),
        })
    }

    fn register(&self, _r: &Registration) -> Result<AuthGrant, AuthError> {
        Err(AuthError::Rejected {
            status: 403,
            detail: "Registration closed".to_string(),
        })
    }

    fn me(&self, _token: &str) -> Result<Identity, AuthError> {
        self.login(&creds("any")).map(|grant| grant.identity)
    }
}

fn creds(id: &str) -> Credentials {
    Credentials {
        email: format!("{id}@ward.test"),
        password: "pw".to_string(),
    }
}

fn file_store(dir: &TempDir) -> Arc<dyn KeyValueStore> {
    Arc::new(FileStore::open(dir.path().join("client")).expect("open file store"))
}

fn shell(store: Arc<dyn KeyValueStore>, prefers_dark: bool) -> AppState {
    AppState::new(
        store,
        Arc::new(WardApi::new()),
        Arc::new(FixedProbe(Some(prefers_dark))),
        AppConfig::default(),
    )
}

fn ids(groups: &[nexushealth::core::model::MenuGroup]) -> Vec<String> {
    groups
        .iter()
        .flat_map(|g| g.section_ids().map(|s| s.as_str().to_string()))
        .collect()
}

// =============================================================================
// Theme
// =============================================================================

#[test]
fn e2e_resolve_table_is_total_and_stable() {
    for &pref in ThemePreference::all() {
        for os in [ResolvedTheme::Light, ResolvedTheme::Dark] {
            let expected = match pref {
                ThemePreference::Light => ResolvedTheme::Light,
                ThemePreference::Dark => ResolvedTheme::Dark,
                ThemePreference::System => os,
            };
            for _ in 0..3 {
                assert_eq!(resolve(pref, os), expected, "{pref} / {os}");
            }
        }
    }
}

#[test]
fn e2e_system_dark_user_switches_to_light_and_it_persists() {
    let dir = TempDir::new().unwrap();
    {
        let mut theme = ThemeResolver::init(file_store(&dir), ResolvedTheme::Dark);
        assert_eq!(theme.preference(), ThemePreference::System);
        assert_eq!(theme.resolved(), ResolvedTheme::Dark);

        theme.set_preference(ThemePreference::Light);
        assert_eq!(theme.resolved(), ResolvedTheme::Light);

        // OS flipping back and forth has no effect while the override holds.
        theme.on_os_signal(ResolvedTheme::Light);
        theme.on_os_signal(ResolvedTheme::Dark);
        assert_eq!(theme.resolved(), ResolvedTheme::Light);
    }

    let theme = ThemeResolver::init(file_store(&dir), ResolvedTheme::Dark);
    assert_eq!(theme.preference(), ThemePreference::Light);
    assert_eq!(theme.resolved(), ResolvedTheme::Light);
}

// =============================================================================
// Access & menu
// =============================================================================

#[test]
fn e2e_access_table_is_total_and_admin_sees_everything() {
    for role in Role::all() {
        assert_eq!(sections_for(role), sections_for(role));
    }
    assert_eq!(sections_for(&Role::Admin), Access::All);
    assert_eq!(visible_menu(&Role::Admin), master_catalog());
    assert_eq!(sections_for_label("Janitor"), Access::none());
}

#[test]
fn e2e_visible_menu_is_an_ordered_subset() {
    let catalog = master_catalog();
    let all_ids = ids(&catalog);
    for role in Role::all() {
        let visible = ids(&visible_menu(role));
        let mut cursor = all_ids.iter();
        for id in &visible {
            assert!(
                cursor.any(|c| c == id),
                "{role}: '{id}' is missing or out of catalog order"
            );
        }
    }
}

#[test]
fn e2e_filter_keeps_catalog_order() {
    let access = Access::Allowlist(BTreeSet::from([
        SectionId::from("schedule"),
        SectionId::from("dashboard"),
    ]));
    let menu = filter_catalog(&master_catalog(), &access);
    assert_eq!(menu.len(), 1);
    assert_eq!(menu[0].title, "Overview");
    assert_eq!(ids(&menu), vec!["dashboard", "schedule"]);
}

#[test]
fn e2e_nurse_menu_hides_billing_and_empty_groups() {
    let menu = visible_menu(&Role::Nurse);
    assert!(!ids(&menu).contains(&"billing".to_string()));
    assert!(menu.iter().all(|g| g.title != "Finance"));
    assert!(menu.iter().all(|g| !g.items.is_empty()));
}

#[test]
fn e2e_navigation_redirects_until_signed_in() {
    let mut nav = NavigationController::new();
    assert_eq!(
        nav.set_active_tab(SectionId::from("dashboard")),
        NavOutcome::RedirectToLogin
    );
    nav.on_authenticated(Role::Doctor);
    assert_eq!(nav.content_tab(), Some(SectionId::from("dashboard")));
    nav.set_active_tab(SectionId::from("payroll"));
    assert_eq!(nav.content_tab(), Some(SectionId::from("dashboard")));
}

// =============================================================================
// Session history
// =============================================================================

#[test]
fn e2e_login_logout_leaves_no_active_record() {
    let api = WardApi::new();
    let mut store = SessionStore::init(Arc::new(MemoryStore::new()), SessionOptions::default());

    store.login(&api, &creds("chen")).unwrap();
    assert_eq!(store.active_sessions().len(), 1);

    assert!(store.logout().is_some());
    assert!(store
        .history()
        .iter()
        .filter(|r| r.user_name == "Dr. Chen")
        .all(|r| r.status == SessionStatus::LoggedOut));

    let before = store.history().to_vec();
    assert_eq!(store.logout(), None);
    assert_eq!(store.history(), before.as_slice());
}

#[test]
fn e2e_second_user_logout_flips_only_their_record() {
    let api = WardApi::new();
    let mut store = SessionStore::init(Arc::new(MemoryStore::new()), SessionOptions::default());

    store.login(&api, &creds("chen")).unwrap();
    store.login(&api, &creds("okoro")).unwrap();
    let flipped = store.logout().expect("a record was closed");

    let okoro = store
        .history()
        .iter()
        .find(|r| r.user_name == "Nurse Okoro")
        .unwrap();
    assert_eq!(okoro.id, flipped);
    assert_eq!(okoro.status, SessionStatus::LoggedOut);

    let chen = store
        .history()
        .iter()
        .find(|r| r.user_name == "Dr. Chen")
        .unwrap();
    assert_eq!(chen.status, SessionStatus::Active);
}

#[test]
fn e2e_rejected_login_changes_nothing() {
    let api = WardApi::new();
    let mut store = SessionStore::init(Arc::new(MemoryStore::new()), SessionOptions::default());
    let bad = Credentials {
        email: "chen@ward.test".to_string(),
        password: "wrong".to_string(),
    };
    assert!(store.login(&api, &bad).is_err());
    assert!(!store.is_authenticated());
    assert!(store.history().is_empty());
}

// =============================================================================
// Whole shell across a restart
// =============================================================================

#[test]
fn e2e_restart_restores_session_in_background() {
    let dir = TempDir::new().unwrap();
    {
        let mut app = shell(file_store(&dir), false);
        app.login(&creds("okoro")).unwrap();
        app.set_active_tab(SectionId::from("beds"));
        app.theme_mut().set_preference(ThemePreference::Dark);
        app.dispose();
    }

    let mut app = shell(file_store(&dir), false);
    assert_eq!(app.theme().resolved(), ResolvedTheme::Dark);
    assert!(!app.session().is_authenticated());
    assert_eq!(app.navigation().role(), None);

    assert!(app.start_restore());
    match app.wait_restore(Duration::from_secs(5)) {
        Some(ShellEvent::SessionRestored(identity)) => assert_eq!(identity.role, Role::Nurse),
        other => panic!("expected a restored session, got {other:?}"),
    }
    assert_eq!(app.navigation().role(), Some(&Role::Nurse));
    assert_eq!(app.navigation().active_tab(), Some(&SectionId::from("dashboard")));
    assert_eq!(app.session().active_sessions().len(), 1);

    app.logout();
    let reopened = shell(file_store(&dir), false);
    assert!(reopened.session().active_sessions().is_empty());
    assert_eq!(reopened.session().token(), None);
}

#[test]
fn e2e_explicit_login_wins_over_slow_restore() {
    let dir = TempDir::new().unwrap();
    {
        let mut app = shell(file_store(&dir), false);
        app.login(&creds("chen")).unwrap();
    }

    let mut app = shell(file_store(&dir), false);
    assert!(app.start_restore());
    app.login(&creds("root")).unwrap();

    let event = app.wait_restore(Duration::from_secs(5));
    assert!(matches!(event, Some(ShellEvent::SessionRestoreDiscarded)));
    assert_eq!(app.navigation().role(), Some(&Role::Admin));
    assert_eq!(app.session().current_identity().unwrap().name, "Admin");
}

#[test]
fn e2e_staff_account_signs_in_with_no_sections() {
    let api = RawBodyApi {
        body: r#"{"access_token":"t-staff","token_type":"bearer",
            "user":{"id":"9","name":"Sam Porter","email":"sam@ward.test",
                "role":"Staff","avatar":null}}"#,
    };
    let mut app = AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(api),
        Arc::new(FixedProbe(Some(false))),
        AppConfig::default(),
    );

    let identity = app.login(&creds("sam")).unwrap();
    assert_eq!(identity.role, Role::Other("Staff".to_string()));
    assert_eq!(app.session().history().len(), 1);
    assert_eq!(app.session().history()[0].user_role.label(), "Staff");

    let staff = app.navigation().role().cloned().unwrap();
    assert!(app.navigation().visible_menu(&staff).is_empty());
    assert!(app.navigation().current_menu().is_empty());
    assert_eq!(app.navigation().content_tab(), Some(SectionId::from("dashboard")));

    app.set_active_tab(SectionId::from("patients"));
    assert_eq!(app.navigation().content_tab(), Some(SectionId::from("dashboard")));
}

#[test]
fn e2e_configured_terminal_details_land_on_login_records() {
    let dir = TempDir::new().unwrap();
    let config = AppConfig {
        device_label: Some("Ward 3 terminal".to_string()),
        network_address: Some("10.0.3.17".to_string()),
        ..AppConfig::default()
    };
    let mut app = AppState::new(
        file_store(&dir),
        Arc::new(WardApi::new()),
        Arc::new(FixedProbe(Some(false))),
        config,
    );
    app.login(&creds("chen")).unwrap();
    app.dispose();

    let reopened = shell(file_store(&dir), false);
    let record = &reopened.session().history()[0];
    assert_eq!(record.device_label.as_deref(), Some("Ward 3 terminal"));
    assert_eq!(record.network_address.as_deref(), Some("10.0.3.17"));
}

#[test]
fn e2e_unusable_storage_still_runs_in_memory() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("plain-file");
    std::fs::write(&file, "x").unwrap();

    let mut app = shell(state::open_store(&file.join("nested")), true);
    assert_eq!(app.theme().resolved(), ResolvedTheme::Dark);
    app.theme_mut().set_preference(ThemePreference::Light);
    assert_eq!(app.theme().resolved(), ResolvedTheme::Light);
    app.login(&creds("chen")).unwrap();
    assert!(app.session().is_authenticated());
}
