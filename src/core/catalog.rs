// NexusHealth - core/catalog.rs
//
// The master navigation catalog and the role filter applied to it.
//
// The catalog is plain data: section id, display label and an opaque icon
// token. Filtering is stable; group order and item order are never changed.

use crate::core::access;
use crate::core::model::{Access, MenuGroup, MenuItem, Role, SectionId};

/// (group title, [(section id, label, icon token)])
type GroupSpec = (&'static str, &'static [(&'static str, &'static str, &'static str)]);

const CATALOG: &[GroupSpec] = &[
    (
        "Overview",
        &[
            ("dashboard", "Dashboard", "layout-dashboard"),
            ("analytics", "Analytics", "bar-chart-2"),
            ("schedule", "Schedule", "calendar"),
            ("tasks", "My Tasks", "clipboard-list"),
            ("notices", "Notice Board", "bell"),
            ("audit", "Audit Logs", "file-check"),
            ("security", "Security Monitor", "shield"),
        ],
    ),
    (
        "Clinical",
        &[
            ("patients", "Patients", "users"),
            ("clinical-ai", "Clinical AI", "sparkles"),
            ("opd-queue", "OPD Queue", "clock"),
            ("lab", "Laboratory", "microscope"),
            ("radiology", "Radiology", "radio"),
            ("pharmacy", "Pharmacy", "pill"),
            ("blood-bank", "Blood Bank", "heart"),
            ("ot", "OT Management", "activity"),
            ("maternity", "Maternity", "baby"),
            ("physio", "Physiotherapy", "activity"),
            ("telemedicine", "Telemedicine", "phone"),
            ("vaccination", "Vaccination", "stethoscope"),
            ("records", "Vital Records", "file-text"),
            ("certificates", "Med. Certificates", "file-check"),
            ("research", "Clinical Research", "microscope"),
        ],
    ),
    (
        "Services",
        &[
            ("ambulance", "Ambulance", "truck"),
            ("mortuary", "Mortuary", "alert-triangle"),
            ("cssd", "CSSD Sterilization", "thermometer"),
            ("waste", "Bio-Medical Waste", "trash-2"),
            ("dietary", "Patient Diet", "coffee"),
            ("canteen", "Canteen", "coffee"),
            ("housekeeping", "Housekeeping", "sparkles"),
            ("facility", "Maintenance", "pen-tool"),
            ("laundry", "Laundry", "shirt"),
            ("call-center", "Call Center", "phone"),
            ("intercom", "Intercom/Paging", "speaker"),
            ("parking", "Parking", "car"),
            ("transport", "Transport", "truck"),
            ("lost-found", "Lost & Found", "search"),
            ("donations", "Donations", "heart"),
            ("library", "Library", "database"),
            ("events", "Events", "calendar"),
            ("help-desk", "Help Desk", "user-plus"),
        ],
    ),
    (
        "Human Resources",
        &[
            ("staff", "Staff Directory", "users"),
            ("roster", "Shift Roster", "calendar"),
            ("leave", "Leave Mgmt", "calendar"),
            ("payroll", "Payroll", "dollar-sign"),
            ("attendance", "Attendance", "clock"),
            ("recruitment", "Recruitment", "briefcase"),
            ("training", "Staff Training", "book"),
        ],
    ),
    (
        "Finance",
        &[
            ("billing", "Billing", "dollar-sign"),
            ("insurance", "Insurance Claims", "shield"),
            ("expenses", "Expenses", "dollar-sign"),
            ("revenue", "Revenue", "bar-chart-2"),
            ("procurement", "Procurement", "truck"),
            ("assets", "Asset Manager", "box"),
        ],
    ),
    (
        "Administration",
        &[
            ("departments", "Departments", "building-2"),
            ("beds", "Bed Management", "grid"),
            ("referrals", "Referral System", "users"),
            ("visitors", "Visitor Pass", "ticket"),
            ("legal", "Legal/Compliance", "lock"),
            ("incidents", "Incident Reporting", "alert-triangle"),
            ("settings", "Settings", "settings"),
        ],
    ),
];

/// The full, unfiltered menu in display order.
pub fn master_catalog() -> Vec<MenuGroup> {
    CATALOG
        .iter()
        .map(|(title, items)| MenuGroup {
            title: (*title).to_string(),
            items: items
                .iter()
                .map(|(id, label, icon)| MenuItem {
                    id: SectionId::from(*id),
                    label: (*label).to_string(),
                    icon: (*icon).to_string(),
                })
                .collect(),
        })
        .collect()
}

/// Keep only the items `access` permits, dropping groups left empty.
pub fn filter_catalog(catalog: &[MenuGroup], access: &Access) -> Vec<MenuGroup> {
    if access.is_all() {
        return catalog.to_vec();
    }
    catalog
        .iter()
        .filter_map(|group| {
            let items: Vec<MenuItem> = group
                .items
                .iter()
                .filter(|item| access.permits(&item.id))
                .cloned()
                .collect();
            (!items.is_empty()).then(|| MenuGroup {
                title: group.title.clone(),
                items,
            })
        })
        .collect()
}

/// The menu `role` should see.
pub fn visible_menu(role: &Role) -> Vec<MenuGroup> {
    filter_catalog(&master_catalog(), &access::sections_for(role))
}

/// Look up a catalog entry by id.
pub fn find_item(id: &SectionId) -> Option<MenuItem> {
    master_catalog()
        .into_iter()
        .flat_map(|group| group.items)
        .find(|item| &item.id == id)
}
