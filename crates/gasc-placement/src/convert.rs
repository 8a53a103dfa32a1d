//! Conversions from `gasc.toml` sections to evaluator types.

use gasc_core::GascConfig;
use gasc_state::{InstanceRequirement, StateResult};

use crate::evaluator::{DaemonTemplate, OfferEvaluator};

/// Build the per-instance requirement from `[instance]`.
pub fn requirement_from_config(config: &GascConfig) -> StateResult<InstanceRequirement> {
    InstanceRequirement::new(config.instance.cpus, config.instance.memory_mb)
}

/// Build an [`OfferEvaluator`] from `[instance]` and `[daemon]`.
pub fn evaluator_from_config(config: &GascConfig) -> StateResult<OfferEvaluator> {
    let requirement = requirement_from_config(config)?;
    let template = DaemonTemplate::new(
        &config.daemon.command,
        config.daemon.base_port,
        &config.daemon.name_prefix,
    );
    Ok(OfferEvaluator::new(requirement, template))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluator_uses_config_values() {
        let mut config = GascConfig::default();
        config.instance.cpus = 2.0;
        config.instance.memory_mb = 1024;

        let evaluator = evaluator_from_config(&config).unwrap();
        assert_eq!(evaluator.requirement().cpus(), 2.0);
        assert_eq!(evaluator.requirement().memory_mb(), 1024);
    }

    #[test]
    fn invalid_requirement_is_rejected() {
        let mut config = GascConfig::default();
        config.instance.memory_mb = 0;
        assert!(evaluator_from_config(&config).is_err());
    }
}
