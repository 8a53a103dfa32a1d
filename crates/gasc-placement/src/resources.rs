//! Offer resource totals.
//!
//! Only the two scalar dimensions the scheduler packs on are read: `cpus`
//! and `mem`. Port ranges, disk and anything non-scalar are ignored.

use serde::{Deserialize, Serialize};

use gasc_core::{CPUS, MEM, Resource};
use gasc_state::InstanceRequirement;

/// Cpu and memory available in an offer (or left over after packing).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OfferResources {
    pub cpus: f64,
    /// Megabytes.
    pub mem: f64,
}

impl OfferResources {
    /// Sum scalar values by name across an offer's resource list.
    pub fn from_resources(resources: &[Resource]) -> Self {
        let mut totals = Self::default();
        for resource in resources {
            let Some(value) = resource.scalar_value() else {
                continue;
            };
            match resource.name.as_str() {
                CPUS => totals.cpus += value,
                MEM => totals.mem += value,
                _ => {}
            }
        }
        totals
    }

    pub fn has_cpus_for(&self, req: &InstanceRequirement) -> bool {
        self.cpus >= req.cpus()
    }

    pub fn has_memory_for(&self, req: &InstanceRequirement) -> bool {
        self.mem >= req.memory_mb() as f64
    }

    /// Whether one more instance fits.
    pub fn fits(&self, req: &InstanceRequirement) -> bool {
        self.has_cpus_for(req) && self.has_memory_for(req)
    }

    /// Consume one instance worth of resources.
    pub fn take(&mut self, req: &InstanceRequirement) {
        self.cpus -= req.cpus();
        self.mem -= req.memory_mb() as f64;
    }
}
