// NexusHealth - core/access.rs
//
// Static role -> visible-sections table.
//
// Each role carries a flat allow-list. New sections are never inherited:
// they must be added to a role's list explicitly (Admin excepted, which
// sees everything). This is a presentation filter only; the auth API is
// responsible for real enforcement.

use crate::core::model::{Access, Role, SectionId};

const DOCTOR: &[&str] = &[
    "dashboard",
    "clinical-ai",
    "patients",
    "schedule",
    "tasks",
    "notices",
    "opd-queue",
    "lab",
    "radiology",
    "pharmacy",
    "ot",
    "records",
    "research",
    "telemedicine",
    "certificates",
];

const NURSE: &[&str] = &[
    "dashboard",
    "patients",
    "schedule",
    "tasks",
    "notices",
    "beds",
    "vitals",
    "vaccination",
    "dietary",
    "maternity",
    "housekeeping",
    "laundry",
    "incidents",
];

const PHARMACIST: &[&str] = &[
    "dashboard",
    "pharmacy",
    "tasks",
    "notices",
    "procurement",
    "billing",
];

const RECEPTIONIST: &[&str] = &[
    "dashboard",
    "patients",
    "schedule",
    "tasks",
    "notices",
    "billing",
    "visitors",
    "opd-queue",
    "referrals",
    "call-center",
    "help-desk",
    "lost-found",
];

const LAB_TECHNICIAN: &[&str] = &["dashboard", "lab", "tasks", "notices", "records"];

const RADIOLOGIST: &[&str] = &["dashboard", "radiology", "tasks", "notices", "records"];

const ACCOUNTANT: &[&str] = &[
    "dashboard",
    "billing",
    "insurance",
    "expenses",
    "revenue",
    "payroll",
    "assets",
    "procurement",
    "tasks",
    "notices",
];

const HR_MANAGER: &[&str] = &[
    "dashboard",
    "staff",
    "roster",
    "leave",
    "payroll",
    "attendance",
    "recruitment",
    "training",
    "tasks",
    "notices",
    "incidents",
    "legal",
];

const FACILITY_MANAGER: &[&str] = &[
    "dashboard",
    "facility",
    "housekeeping",
    "canteen",
    "dietary",
    "laundry",
    "waste",
    "security",
    "transport",
    "parking",
    "fire-safety",
    "assets",
    "tasks",
    "notices",
];

/// Roles without a dedicated list see only the common landing sections.
const BASELINE: &[&str] = &["dashboard", "tasks", "notices"];

fn allow(ids: &[&str]) -> Access {
    Access::Allowlist(ids.iter().map(|id| SectionId::from(*id)).collect())
}

/// Sections visible to `role`. Roles outside the known set see nothing.
pub fn sections_for(role: &Role) -> Access {
    match role {
        Role::Admin => Access::All,
        Role::Doctor => allow(DOCTOR),
        Role::Nurse => allow(NURSE),
        Role::Pharmacist => allow(PHARMACIST),
        Role::Receptionist => allow(RECEPTIONIST),
        Role::LabTechnician => allow(LAB_TECHNICIAN),
        Role::Radiologist => allow(RADIOLOGIST),
        Role::Accountant => allow(ACCOUNTANT),
        Role::HrManager => allow(HR_MANAGER),
        Role::FacilityManager => allow(FACILITY_MANAGER),
        Role::KitchenManager | Role::EmergencyManager | Role::Researcher | Role::Patient => {
            allow(BASELINE)
        }
        Role::Other(_) => Access::none(),
    }
}

/// Lookup by free-form role label. Unrecognised labels see nothing.
pub fn sections_for_label(label: &str) -> Access {
    let role = Role::from(label.to_string());
    if !role.is_known() {
        tracing::debug!(role = label, "Unknown role label; granting no sections");
    }
    sections_for(&role)
}
