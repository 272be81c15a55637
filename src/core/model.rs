// NexusHealth - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Theme
// =============================================================================

/// The user's stored theme choice. `System` follows the OS signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    /// Returns all variants in cycle order.
    pub fn all() -> &'static [ThemePreference] {
        &[
            ThemePreference::Light,
            ThemePreference::Dark,
            ThemePreference::System,
        ]
    }

    /// Storage/wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "system" => Ok(ThemePreference::System),
            other => Err(format!(
                "unknown theme '{other}', expected light, dark or system"
            )),
        }
    }
}

/// The concrete display mode actually applied. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
    Light,
    Dark,
}

impl ResolvedTheme {
    /// Map the OS "prefers dark" boolean onto a display mode.
    pub fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark {
            ResolvedTheme::Dark
        } else {
            ResolvedTheme::Light
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedTheme::Light => "light",
            ResolvedTheme::Dark => "dark",
        }
    }

    /// Colour for the browser/window chrome under this mode.
    pub fn chrome_colour(&self) -> &'static str {
        match self {
            ResolvedTheme::Light => crate::util::constants::LIGHT_CHROME_COLOUR,
            ResolvedTheme::Dark => crate::util::constants::DARK_CHROME_COLOUR,
        }
    }
}

impl fmt::Display for ResolvedTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification published to theme subscribers whenever the resolved
/// theme or the preference changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeChange {
    pub preference: ThemePreference,
    pub resolved: ResolvedTheme,
}

// =============================================================================
// Roles
// =============================================================================

/// Staff and patient roles known to the dashboard, plus whatever else the
/// auth API may report.
///
/// Serialised with the display labels the auth API uses ("Lab Technician",
/// "HR Manager", ...). Labels outside the known set deserialise to `Other`
/// and keep their text; they are granted no sections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Doctor,
    Nurse,
    Pharmacist,
    Receptionist,
    LabTechnician,
    Radiologist,
    Accountant,
    HrManager,
    FacilityManager,
    KitchenManager,
    EmergencyManager,
    Researcher,
    Patient,
    /// A role label this build does not know, e.g. "Staff".
    Other(String),
}

const KNOWN_ROLES: &[Role] = &[
    Role::Admin,
    Role::Doctor,
    Role::Nurse,
    Role::Pharmacist,
    Role::Receptionist,
    Role::LabTechnician,
    Role::Radiologist,
    Role::Accountant,
    Role::HrManager,
    Role::FacilityManager,
    Role::KitchenManager,
    Role::EmergencyManager,
    Role::Researcher,
    Role::Patient,
];

/// Lowercase alphanumerics only, so "Lab Technician", "lab_technician" and
/// "labtechnician" compare equal.
fn role_key(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
}

impl Role {
    /// Every known role, in declaration order. `Other` is not listed.
    pub fn all() -> &'static [Role] {
        KNOWN_ROLES
    }

    /// Human-readable label, identical to the wire form.
    pub fn label(&self) -> &str {
        match self {
            Role::Admin => "Admin",
            Role::Doctor => "Doctor",
            Role::Nurse => "Nurse",
            Role::Pharmacist => "Pharmacist",
            Role::Receptionist => "Receptionist",
            Role::LabTechnician => "Lab Technician",
            Role::Radiologist => "Radiologist",
            Role::Accountant => "Accountant",
            Role::HrManager => "HR Manager",
            Role::FacilityManager => "Facility Manager",
            Role::KitchenManager => "Kitchen Manager",
            Role::EmergencyManager => "Emergency Manager",
            Role::Researcher => "Researcher",
            Role::Patient => "Patient",
            Role::Other(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Role::Other(_))
    }

    /// Known role whose label matches `s` loosely, if any.
    fn lookup(s: &str) -> Option<Role> {
        KNOWN_ROLES
            .iter()
            .find(|role| role_key(role.label()).eq(role_key(s)))
            .cloned()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Strict parse for user input: unknown labels are an error.
impl FromStr for Role {
    type Err = String;

    /// Accepts the display label as well as snake, kebab and compact forms,
    /// case-insensitively ("Lab Technician", "lab_technician", "labtechnician").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::lookup(s).ok_or_else(|| format!("unknown role '{s}'"))
    }
}

/// Lenient conversion for data from the auth API or storage.
impl From<String> for Role {
    fn from(label: String) -> Self {
        Role::lookup(&label).unwrap_or(Role::Other(label))
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

// =============================================================================
// Identity & session history
// =============================================================================

/// The signed-in user as reported by the auth API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub role: Role,

    /// Opaque avatar reference (usually a URL); rendering is not our concern.
    #[serde(default, alias = "avatar")]
    pub avatar_ref: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

/// Lifecycle state of one login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Active,
    #[serde(rename = "Logged Out")]
    LoggedOut,
}

impl SessionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Active => "Active",
            SessionStatus::LoggedOut => "Logged Out",
        }
    }
}

/// One entry of the append-only login history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub user_name: String,
    pub user_role: Role,
    pub login_timestamp: DateTime<Utc>,
    pub status: SessionStatus,

    #[serde(default)]
    pub network_address: Option<String>,

    #[serde(default)]
    pub device_label: Option<String>,

    /// Set when the record is flipped to `LoggedOut`.
    #[serde(default)]
    pub logout_timestamp: Option<DateTime<Utc>>,
}

impl SessionRecord {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

// =============================================================================
// Navigation
// =============================================================================

/// Opaque identifier of one navigation destination ("patients", "billing").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The set of sections a role may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Every section in the catalog, including ones added later.
    All,
    /// Only the listed sections.
    Allowlist(BTreeSet<SectionId>),
}

impl Access {
    /// An allow-list that grants nothing.
    pub fn none() -> Self {
        Access::Allowlist(BTreeSet::new())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Access::All)
    }

    pub fn permits(&self, section: &SectionId) -> bool {
        match self {
            Access::All => true,
            Access::Allowlist(ids) => ids.contains(section),
        }
    }
}

/// One navigable entry of the menu catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub id: SectionId,
    pub label: String,
    /// Opaque icon token interpreted by the presentation layer.
    pub icon: String,
}

/// A titled, ordered group of menu items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuGroup {
    pub title: String,
    pub items: Vec<MenuItem>,
}

impl MenuGroup {
    pub fn section_ids(&self) -> impl Iterator<Item = &SectionId> {
        self.items.iter().map(|item| &item.id)
    }
}
