//! Role to capability policy

use crate::auth::models::{Capability, Role};
use crate::error::{Error, Result};
use std::collections::{BTreeSet, HashMap};

/// Static authorization policy. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionTable {
    entries: HashMap<Role, BTreeSet<Capability>>,
}

impl PermissionTable {
    /// The marketplace's built-in policy
    pub fn standard() -> Self {
        let entries = Role::ALL
            .iter()
            .map(|role| (*role, standard_capabilities(*role)))
            .collect();
        Self { entries }
    }

    /// Standard policy with some roles replaced wholesale.
    ///
    /// Keys are role names and values capability strings, as they appear in
    /// the `[permissions]` config section.
    pub fn from_overrides(overrides: &HashMap<String, Vec<String>>) -> Result<Self> {
        let mut table = Self::standard();
        for (role_name, capabilities) in overrides {
            let role: Role = role_name.parse().map_err(|_| {
                Error::Config(format!("Unknown role in permissions: {}", role_name))
            })?;
            let set = capabilities
                .iter()
                .map(|cap| {
                    cap.parse::<Capability>().map_err(|_| {
                        Error::Config(format!("Unknown capability for {}: {}", role, cap))
                    })
                })
                .collect::<Result<BTreeSet<_>>>()?;
            tracing::debug!(
                "Overriding capabilities for {}: {} entries",
                role,
                set.len()
            );
            table.entries.insert(role, set);
        }
        Ok(table)
    }

    pub fn capabilities_for(&self, role: Role) -> BTreeSet<Capability> {
        self.entries.get(&role).cloned().unwrap_or_default()
    }

    /// Capabilities for a role given by name; unknown names get none
    pub fn capabilities_for_name(&self, role: &str) -> BTreeSet<Capability> {
        role.parse::<Role>()
            .map(|role| self.capabilities_for(role))
            .unwrap_or_default()
    }

    pub fn has_capability(&self, role: Role, capability: Capability) -> bool {
        self.entries
            .get(&role)
            .is_some_and(|caps| caps.contains(&capability))
    }

    /// False for an empty list
    pub fn has_any(&self, role: Role, capabilities: &[Capability]) -> bool {
        capabilities
            .iter()
            .any(|cap| self.has_capability(role, *cap))
    }

    /// True for an empty list
    pub fn has_all(&self, role: Role, capabilities: &[Capability]) -> bool {
        capabilities
            .iter()
            .all(|cap| self.has_capability(role, *cap))
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_capabilities(role: Role) -> BTreeSet<Capability> {
    use Capability::*;

    match role {
        Role::Seller => BTreeSet::from([
            SellerRoutes,
            ProfileRoutes,
            ManageServices,
            CreateOrders,
            ViewOrders,
            ApproveOrders,
            ViewWallet,
            WithdrawWallet,
            ViewAnalytics,
        ]),
        Role::Worker => BTreeSet::from([
            WorkerRoutes,
            ProfileRoutes,
            BrowseServices,
            BrowseTasks,
            ClaimTasks,
            SubmitTasks,
            ViewOrders,
            ViewWallet,
            WithdrawWallet,
        ]),
        Role::Admin => Capability::ALL.into_iter().collect(),
    }
}
