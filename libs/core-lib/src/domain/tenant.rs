use serde::{Deserialize, Serialize};

/// Per-tenant configuration fetched alongside an online login. Absent in
/// offline mode; callers degrade to `TenantConfig::default()` values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TenantConfig {
    pub tenant_id: String,
    pub name: String,
    #[serde(default)]
    pub branding: Branding,
    #[serde(default)]
    pub doctor_list: Vec<String>,
    #[serde(default)]
    pub service_list: Vec<String>,
    #[serde(default)]
    pub plan: PlanSettings,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Branding {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub accent_color: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSettings {
    pub tier: String,
    pub max_stores: u32,
    #[serde(default)]
    pub sms_enabled: bool,
}

impl Default for PlanSettings {
    fn default() -> Self {
        // Most restrictive plan; offline mode must not unlock anything.
        Self {
            tier: "basic".to_string(),
            max_stores: 1,
            sms_enabled: false,
        }
    }
}
