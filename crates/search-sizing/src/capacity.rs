use serde::Serialize;

use crate::config::CapacityConfig;
use crate::error::{Result, SizingError};
use crate::types::{IndexSize, InstanceProfile};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityPlan {
    pub required_vcpu: u32,
    pub recommended_instance: InstanceProfile,
}

/// Picks the smallest instance class able to hold an index and serve its load
pub struct CapacityPlanner<'a> {
    capacity: &'a CapacityConfig,
    /// Sorted in ascending resource order
    instances: &'a [InstanceProfile],
}

impl<'a> CapacityPlanner<'a> {
    /// `instances` must already be in ascending resource order, see [`sort_instances`].
    pub fn new(capacity: &'a CapacityConfig, instances: &'a [InstanceProfile]) -> Self {
        Self { capacity, instances }
    }

    /// vCPUs needed to answer `qps` queries within `latency_target_seconds`.
    ///
    /// Grows with `qps / latency_target_seconds`, never below one.
    pub fn required_vcpu(&self, qps: f64, latency_target_seconds: f64) -> u32 {
        let pressure = qps / latency_target_seconds;
        let vcpu = (pressure / self.capacity.queries_per_vcpu_per_second).ceil();
        if vcpu.is_nan() || vcpu < 1.0 {
            1
        } else {
            // Saturating float-to-int cast
            vcpu as u32
        }
    }

    /// First profile meeting the vCPU, RAM and storage thresholds
    pub fn select_instance(&self, required_vcpu: u32, size: IndexSize) -> Result<&'a InstanceProfile> {
        self.instances
            .iter()
            .find(|profile| {
                profile.vcpu >= required_vcpu
                    && profile.ram_bytes() >= size.ram_bytes
                    && profile.storage_bytes() >= size.storage_bytes
            })
            .ok_or(SizingError::NoSuitableInstance {
                required_vcpu,
                ram_bytes: size.ram_bytes,
                storage_bytes: size.storage_bytes,
            })
    }

    #[tracing::instrument(level = "trace", skip_all, target = "sizing::capacity")]
    pub fn plan(&self, size: IndexSize, qps: f64, latency_target_seconds: f64) -> Result<CapacityPlan> {
        let required_vcpu = self.required_vcpu(qps, latency_target_seconds);
        self.plan_for_vcpu(size, required_vcpu)
    }

    /// Selection for an already combined vCPU requirement
    pub fn plan_for_vcpu(&self, size: IndexSize, required_vcpu: u32) -> Result<CapacityPlan> {
        let profile = self.select_instance(required_vcpu, size)?;

        tracing::debug!(
            target: "sizing::capacity",
            required_vcpu,
            storage_bytes = size.storage_bytes,
            ram_bytes = size.ram_bytes,
            instance = %profile.name,
            "selected instance"
        );

        Ok(CapacityPlan {
            required_vcpu,
            recommended_instance: profile.clone(),
        })
    }
}

/// Orders profiles by vCPU, then RAM, then storage
pub fn sort_instances(instances: &mut [InstanceProfile]) {
    instances.sort_by(|a, b| {
        (a.vcpu, a.ram_gb, a.max_storage_gb).cmp(&(b.vcpu, b.ram_gb, b.max_storage_gb))
    });
}
