use crate::config::MachineConfig;

/// One lab computer in the fixed catalog.
#[derive(Debug, Clone)]
pub struct Machine {
    pub id: String,
    pub specification: String,
}

/// Fixed machine catalog, built from config at startup and never mutated
/// at runtime. Iteration preserves the configured order so availability
/// boards render in a stable sequence.
#[derive(Debug, Clone)]
pub struct MachineCatalog {
    machines: Vec<Machine>,
}

impl MachineCatalog {
    #[must_use]
    pub fn from_config(machines: &[MachineConfig]) -> Self {
        Self {
            machines: machines
                .iter()
                .map(|m| Machine {
                    id: m.id.clone(),
                    specification: m.specification.clone(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, machine_id: &str) -> bool {
        self.machines.iter().any(|m| m.id == machine_id)
    }

    #[must_use]
    pub fn get(&self, machine_id: &str) -> Option<&Machine> {
        self.machines.iter().find(|m| m.id == machine_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Machine> {
        self.machines.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }
}
