/*!
 * Role Hierarchy
 * Validated, immutable role definitions and their direct inheritance edges
 */

use super::types::{Role, RoleDefinition};
use crate::core::errors::ConfigError;
use crate::permissions::types::Permission;
use ahash::HashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// JSON document shape: `{"roles": [ {name, permissions, inherits}, ... ]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyDocument {
    pub roles: Vec<RoleDefinition>,
}

/// Static role hierarchy. Acyclic by construction; no mutation after build.
#[derive(Debug, Clone)]
pub struct RoleHierarchy {
    definitions: HashMap<Role, RoleDefinition>,
}

impl RoleHierarchy {
    pub fn builder() -> RoleHierarchyBuilder {
        RoleHierarchyBuilder::default()
    }

    /// Validate and freeze a set of definitions
    pub fn from_definitions(definitions: Vec<RoleDefinition>) -> Result<Self, ConfigError> {
        let mut map = HashMap::default();
        for definition in definitions {
            let name = definition.name;
            if map.insert(name, definition).is_some() {
                return Err(ConfigError::DuplicateRole(name));
            }
        }

        for definition in map.values() {
            for parent in &definition.inherits {
                if *parent == definition.name {
                    return Err(ConfigError::SelfInheritance(definition.name));
                }
                if !map.contains_key(parent) {
                    return Err(ConfigError::UndefinedParent {
                        role: definition.name,
                        parent: *parent,
                    });
                }
            }
        }

        if let Some(cycle) = find_cycle(&map) {
            return Err(ConfigError::CyclicInheritance(cycle));
        }

        info!(roles = map.len(), "Role hierarchy loaded");
        Ok(Self { definitions: map })
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let document: HierarchyDocument =
            serde_json::from_str(json).map_err(|source| ConfigError::Parse {
                what: "role hierarchy",
                source,
            })?;
        Self::from_definitions(document.roles)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Directly declared permissions only. Undefined roles grant nothing.
    pub fn permissions_for_role(&self, role: Role) -> &[Permission] {
        self.definitions
            .get(&role)
            .map(|d| d.permissions.as_slice())
            .unwrap_or(&[])
    }

    /// Direct parents only, in declared order
    pub fn inherited_roles(&self, role: Role) -> &[Role] {
        self.definitions
            .get(&role)
            .map(|d| d.inherits.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, role: Role) -> bool {
        self.definitions.contains_key(&role)
    }

    /// Defined roles in canonical order
    pub fn roles(&self) -> Vec<Role> {
        Role::ALL
            .iter()
            .copied()
            .filter(|role| self.definitions.contains_key(role))
            .collect()
    }

    pub fn definition(&self, role: Role) -> Option<&RoleDefinition> {
        self.definitions.get(&role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Depth-first search with three colors; returns the first cycle found as a closed path
fn find_cycle(definitions: &HashMap<Role, RoleDefinition>) -> Option<Vec<Role>> {
    let mut marks: HashMap<Role, Mark> = HashMap::default();
    let mut path: Vec<Role> = Vec::new();

    fn visit(
        role: Role,
        definitions: &HashMap<Role, RoleDefinition>,
        marks: &mut HashMap<Role, Mark>,
        path: &mut Vec<Role>,
    ) -> Option<Vec<Role>> {
        match marks.get(&role) {
            Some(Mark::Done) => return None,
            Some(Mark::Visiting) => {
                let start = path.iter().position(|r| *r == role).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(role);
                return Some(cycle);
            }
            None => {}
        }

        marks.insert(role, Mark::Visiting);
        path.push(role);
        if let Some(definition) = definitions.get(&role) {
            for parent in &definition.inherits {
                if let Some(cycle) = visit(*parent, definitions, marks, path) {
                    return Some(cycle);
                }
            }
        }
        path.pop();
        marks.insert(role, Mark::Done);
        None
    }

    // Canonical order keeps the reported cycle stable across runs
    for role in Role::ALL {
        if definitions.contains_key(&role) {
            if let Some(cycle) = visit(role, definitions, &mut marks, &mut path) {
                return Some(cycle);
            }
        }
    }
    None
}

/// Incremental builder for hierarchies declared in code
#[derive(Debug, Default)]
pub struct RoleHierarchyBuilder {
    definitions: Vec<RoleDefinition>,
}

impl RoleHierarchyBuilder {
    pub fn role(mut self, definition: RoleDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn build(self) -> Result<RoleHierarchy, ConfigError> {
        RoleHierarchy::from_definitions(self.definitions)
    }
}
