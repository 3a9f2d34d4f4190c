use std::fmt;

/// Admin actions gated by role level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ManagePublications,
    ManageThemes,
    ManageReporters,
    ManageCareers,
    ManagePodcasters,
    ManageOrders,
    ApprovePublications,
    ApproveThemes,
    ApproveReporters,
    ApproveCareers,
    ApprovePodcasters,
    ManageUsers,
    ManageAdmins,
    SystemAdmin,
}

impl Permission {
    /// Minimum admin role level that holds this permission.
    pub fn required_level(&self) -> u8 {
        match self {
            Permission::ManagePublications
            | Permission::ManageThemes
            | Permission::ManageReporters
            | Permission::ManageCareers
            | Permission::ManagePodcasters
            | Permission::ManageOrders => 1,
            Permission::ApprovePublications
            | Permission::ApproveThemes
            | Permission::ApproveReporters
            | Permission::ApproveCareers
            | Permission::ApprovePodcasters => 2,
            Permission::ManageUsers => 3,
            Permission::ManageAdmins => 4,
            Permission::SystemAdmin => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManagePublications => "manage_publications",
            Permission::ManageThemes => "manage_themes",
            Permission::ManageReporters => "manage_reporters",
            Permission::ManageCareers => "manage_careers",
            Permission::ManagePodcasters => "manage_podcasters",
            Permission::ManageOrders => "manage_orders",
            Permission::ApprovePublications => "approve_publications",
            Permission::ApproveThemes => "approve_themes",
            Permission::ApproveReporters => "approve_reporters",
            Permission::ApproveCareers => "approve_careers",
            Permission::ApprovePodcasters => "approve_podcasters",
            Permission::ManageUsers => "manage_users",
            Permission::ManageAdmins => "manage_admins",
            Permission::SystemAdmin => "system_admin",
        }
    }

}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
