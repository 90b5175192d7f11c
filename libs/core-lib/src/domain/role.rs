use serde::{Deserialize, Serialize};

/// Closed set of roles a deployment knows about. Scoping and capability rules
/// match exhaustively on this enum, so adding a role forces every rule site
/// to be revisited instead of silently defaulting to "unfiltered".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Clinic owner / administrator. The single designated superuser role.
    Owner,
    /// Store manager: full day-to-day access within assigned stores.
    Manager,
    /// Front-desk staff: scheduling, patients and messaging only.
    Staff,
    /// Doctor / therapist: sees only records attributed to them.
    Practitioner,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "Owner" | "ROLE_OWNER" => Some(Role::Owner),
            "Manager" | "ROLE_MANAGER" => Some(Role::Manager),
            "Staff" | "ROLE_STAFF" => Some(Role::Staff),
            "Practitioner" | "ROLE_PRACTITIONER" => Some(Role::Practitioner),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "Owner",
            Role::Manager => "Manager",
            Role::Staff => "Staff",
            Role::Practitioner => "Practitioner",
        }
    }
}

/// Actions feature pages gate on. Coarse by intent: a page asks "may this
/// session do X", never "which role is this".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    ManageBilling,
    ViewFinancials,
    ManageInventory,
    ManageSchedule,
    ViewPatients,
    EditPatients,
    SendMessages,
    ManageStaff,
    ConfigureTenant,
}

impl Capability {
    pub const ALL: [Capability; 9] = [
        Capability::ManageBilling,
        Capability::ViewFinancials,
        Capability::ManageInventory,
        Capability::ManageSchedule,
        Capability::ViewPatients,
        Capability::EditPatients,
        Capability::SendMessages,
        Capability::ManageStaff,
        Capability::ConfigureTenant,
    ];
}

impl Role {
    /// The permission matrix: fixed per deployment, not editable at runtime.
    pub fn allows(&self, capability: Capability) -> bool {
        use Capability::*;
        match self {
            Role::Owner => true,
            Role::Manager => !matches!(capability, ConfigureTenant),
            Role::Staff => matches!(capability, ManageSchedule | ViewPatients | SendMessages),
            Role::Practitioner => {
                matches!(capability, ManageSchedule | ViewPatients | EditPatients)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_has_every_capability() {
        for cap in Capability::ALL {
            assert!(Role::Owner.allows(cap), "{cap:?} should be allowed");
        }
    }

    #[test]
    fn manager_cannot_reconfigure_tenant() {
        assert!(!Role::Manager.allows(Capability::ConfigureTenant));
        assert!(Role::Manager.allows(Capability::ManageBilling));
        assert!(Role::Manager.allows(Capability::ManageStaff));
    }

    #[test]
    fn staff_is_limited_to_front_desk_work() {
        assert!(Role::Staff.allows(Capability::ManageSchedule));
        assert!(Role::Staff.allows(Capability::ViewPatients));
        assert!(Role::Staff.allows(Capability::SendMessages));
        assert!(!Role::Staff.allows(Capability::ViewFinancials));
        assert!(!Role::Staff.allows(Capability::EditPatients));
        assert!(!Role::Staff.allows(Capability::ManageStaff));
    }

    #[test]
    fn practitioner_cannot_touch_money_or_staff() {
        assert!(Role::Practitioner.allows(Capability::EditPatients));
        assert!(!Role::Practitioner.allows(Capability::ManageBilling));
        assert!(!Role::Practitioner.allows(Capability::ViewFinancials));
        assert!(!Role::Practitioner.allows(Capability::ManageStaff));
    }

    #[test]
    fn parse_accepts_both_wire_spellings() {
        assert_eq!(Role::parse("Manager"), Some(Role::Manager));
        assert_eq!(Role::parse("ROLE_PRACTITIONER"), Some(Role::Practitioner));
        assert_eq!(Role::parse("superuser"), None);
    }
}
