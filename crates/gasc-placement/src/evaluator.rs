//! Offer evaluator — packs daemon launches into a single offer.
//!
//! The offer's totals are checked against the per-instance requirement
//! once; an offer that cannot host one instance is declined. Otherwise
//! instances are allocated greedily until the offer or the launch quota
//! runs out. Every launch registers a `Staging` daemon before the cluster
//! manager has confirmed placement.

use std::fmt;

use tracing::{debug, info, warn};

use gasc_core::config::PORT_PLACEHOLDER;
use gasc_core::{CPUS, MEM, Offer, Resource, TaskInfo};
use gasc_state::{DaemonRecord, DaemonRegistry, InstanceRequirement, LaunchPlan, TaskId};

use crate::resources::OfferResources;

/// How a daemon task is named, addressed and started.
#[derive(Debug, Clone)]
pub struct DaemonTemplate {
    command: String,
    base_port: u16,
    name_prefix: String,
}

impl DaemonTemplate {
    pub fn new(command: &str, base_port: u16, name_prefix: &str) -> Self {
        Self {
            command: command.to_string(),
            base_port,
            name_prefix: name_prefix.to_string(),
        }
    }

    /// `base_port + task_id`, if that is still a valid port.
    pub fn port_for(&self, task_id: TaskId) -> Option<u16> {
        u64::from(self.base_port)
            .checked_add(task_id)
            .and_then(|port| u16::try_from(port).ok())
    }

    pub fn command_for(&self, port: u16) -> String {
        self.command.replace(PORT_PLACEHOLDER, &port.to_string())
    }

    pub fn name_for(&self, task_id: TaskId) -> String {
        format!("{}{task_id}", self.name_prefix)
    }
}

/// Why an offer was declined.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclineReason {
    InsufficientCpus { offered: f64, needed: f64 },
    InsufficientMemory { offered: f64, needed: i64 },
    /// Every daemon is already launched.
    QuotaExhausted,
    /// `base_port + task_id` no longer fits in a port number.
    PortsExhausted,
}

impl fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclineReason::InsufficientCpus { offered, needed } => {
                write!(f, "need {needed} cpus but was offered {offered}")
            }
            DeclineReason::InsufficientMemory { offered, needed } => {
                write!(f, "need {needed} mb memory but was offered {offered} mb")
            }
            DeclineReason::QuotaExhausted => write!(f, "all daemons already launched"),
            DeclineReason::PortsExhausted => write!(f, "no daemon ports left"),
        }
    }
}

/// The outcome of evaluating one offer.
#[derive(Debug, Clone, PartialEq)]
pub enum OfferDecision {
    /// Accept the offer with at least one task.
    Launch {
        tasks: Vec<TaskInfo>,
        /// What is left of the offer after packing.
        residue: OfferResources,
    },
    Decline(DeclineReason),
}

#[derive(Debug, Clone)]
pub struct OfferEvaluator {
    requirement: InstanceRequirement,
    template: DaemonTemplate,
}

impl OfferEvaluator {
    pub fn new(requirement: InstanceRequirement, template: DaemonTemplate) -> Self {
        Self {
            requirement,
            template,
        }
    }

    pub fn requirement(&self) -> &InstanceRequirement {
        &self.requirement
    }

    /// Evaluate one offer, allocating from `plan` and registering every
    /// launched daemon in `registry`.
    pub fn evaluate(
        &self,
        offer: &Offer,
        plan: &mut LaunchPlan,
        registry: &mut DaemonRegistry,
    ) -> OfferDecision {
        let req = &self.requirement;
        let mut available = OfferResources::from_resources(&offer.resources);

        if !available.has_cpus_for(req) {
            return self.decline(
                offer,
                DeclineReason::InsufficientCpus {
                    offered: available.cpus,
                    needed: req.cpus(),
                },
            );
        }
        if !available.has_memory_for(req) {
            return self.decline(
                offer,
                DeclineReason::InsufficientMemory {
                    offered: available.mem,
                    needed: req.memory_mb(),
                },
            );
        }

        let mut tasks = Vec::new();
        let mut ports_exhausted = false;

        while available.fits(req) && plan.remaining_to_launch() > 0 {
            let Some(port) = self.template.port_for(plan.next_task_id()) else {
                warn!(next_task_id = plan.next_task_id(), "daemon port range exhausted");
                ports_exhausted = true;
                break;
            };
            let Some(task_id) = plan.allocate() else {
                break;
            };

            if let Err(e) = registry.insert(DaemonRecord::staging(task_id, &offer.hostname, port)) {
                warn!(task_id, error = %e, "not launching daemon");
                plan.requeue();
                continue;
            }
            available.take(req);

            info!(
                task_id,
                host = %offer.hostname,
                port,
                offer_id = %offer.id,
                "starting daemon"
            );
            tasks.push(self.task_info(offer, task_id, port));
        }

        if tasks.is_empty() {
            let reason = if ports_exhausted {
                DeclineReason::PortsExhausted
            } else {
                DeclineReason::QuotaExhausted
            };
            return self.decline(offer, reason);
        }

        OfferDecision::Launch {
            tasks,
            residue: available,
        }
    }

    fn task_info(&self, offer: &Offer, task_id: TaskId, port: u16) -> TaskInfo {
        TaskInfo {
            task_id: task_id.to_string(),
            name: self.template.name_for(task_id),
            slave_id: offer.slave_id.clone(),
            command: self.template.command_for(port),
            resources: vec![
                Resource::scalar(CPUS, self.requirement.cpus()),
                Resource::scalar(MEM, self.requirement.memory_mb() as f64),
            ],
        }
    }

    fn decline(&self, offer: &Offer, reason: DeclineReason) -> OfferDecision {
        debug!(offer_id = %offer.id, host = %offer.hostname, %reason, "declining offer");
        OfferDecision::Decline(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasc_state::DaemonState;

    fn evaluator(cpus: f64, memory_mb: i64) -> OfferEvaluator {
        OfferEvaluator::new(
            InstanceRequirement::new(cpus, memory_mb).unwrap(),
            DaemonTemplate::new("sshd -p {port} -D", 8000, "daemon #"),
        )
    }

    fn offer(id: &str, cpus: f64, mem: f64) -> Offer {
        Offer {
            id: id.to_string(),
            slave_id: format!("slave-{id}"),
            hostname: format!("host-{id}"),
            resources: vec![Resource::scalar(CPUS, cpus), Resource::scalar(MEM, mem)],
        }
    }

    #[test]
    fn packs_as_many_as_fit() {
        let eval = evaluator(1.0, 128);
        let mut plan = LaunchPlan::new(10);
        let mut registry = DaemonRegistry::new();

        let decision = eval.evaluate(&offer("o1", 4.0, 512.0), &mut plan, &mut registry);

        let OfferDecision::Launch { tasks, residue } = decision else {
            panic!("expected launch");
        };
        assert_eq!(tasks.len(), 4);
        assert_eq!(plan.remaining_to_launch(), 6);
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.count_in(DaemonState::Staging), 4);
        assert_eq!(residue, OfferResources { cpus: 0.0, mem: 0.0 });
    }

    #[test]
    fn declines_when_cpus_short() {
        let eval = evaluator(1.0, 128);
        let mut plan = LaunchPlan::new(10);
        let mut registry = DaemonRegistry::new();

        let decision = eval.evaluate(&offer("o1", 0.5, 4096.0), &mut plan, &mut registry);

        assert_eq!(
            decision,
            OfferDecision::Decline(DeclineReason::InsufficientCpus {
                offered: 0.5,
                needed: 1.0
            })
        );
        assert!(registry.is_empty());
        assert_eq!(plan.remaining_to_launch(), 10);
    }

    #[test]
    fn declines_when_memory_short() {
        let eval = evaluator(1.0, 128);
        let mut plan = LaunchPlan::new(10);
        let mut registry = DaemonRegistry::new();

        let decision = eval.evaluate(&offer("o1", 8.0, 64.0), &mut plan, &mut registry);

        assert!(matches!(
            decision,
            OfferDecision::Decline(DeclineReason::InsufficientMemory { needed: 128, .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn stops_at_quota_and_declines_once_exhausted() {
        let eval = evaluator(1.0, 128);
        let mut plan = LaunchPlan::new(2);
        let mut registry = DaemonRegistry::new();

        let first = eval.evaluate(&offer("o1", 8.0, 4096.0), &mut plan, &mut registry);
        let OfferDecision::Launch { tasks, residue } = first else {
            panic!("expected launch");
        };
        assert_eq!(tasks.len(), 2);
        assert_eq!(residue.cpus, 6.0);

        let second = eval.evaluate(&offer("o2", 8.0, 4096.0), &mut plan, &mut registry);
        assert_eq!(second, OfferDecision::Decline(DeclineReason::QuotaExhausted));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn task_ids_increase_across_offers() {
        let eval = evaluator(1.0, 128);
        let mut plan = LaunchPlan::new(4);
        let mut registry = DaemonRegistry::new();

        eval.evaluate(&offer("a", 2.0, 256.0), &mut plan, &mut registry);
        let OfferDecision::Launch { tasks, .. } =
            eval.evaluate(&offer("b", 2.0, 256.0), &mut plan, &mut registry)
        else {
            panic!("expected launch");
        };
        let ids: Vec<&str> = tasks.iter().map(|t| t.task_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert_eq!(registry.get(3).unwrap().host, "host-b");
    }

    #[test]
    fn launch_descriptor_embeds_port_and_shares() {
        let eval = evaluator(0.5, 64);
        let mut plan = LaunchPlan::new(1);
        let mut registry = DaemonRegistry::new();

        let OfferDecision::Launch { tasks, .. } =
            eval.evaluate(&offer("o1", 1.0, 128.0), &mut plan, &mut registry)
        else {
            panic!("expected launch");
        };
        let task = &tasks[0];
        assert_eq!(task.task_id, "0");
        assert_eq!(task.name, "daemon #0");
        assert_eq!(task.slave_id, "slave-o1");
        assert_eq!(task.command, "sshd -p 8000 -D");
        assert_eq!(
            task.resources,
            vec![Resource::scalar(CPUS, 0.5), Resource::scalar(MEM, 64.0)]
        );
        assert_eq!(registry.get(0).unwrap().port, 8000);
    }

    #[test]
    fn port_overflow_stops_launching() {
        let eval = OfferEvaluator::new(
            InstanceRequirement::new(1.0, 1).unwrap(),
            DaemonTemplate::new("sshd -p {port}", u16::MAX - 1, "d"),
        );
        let mut plan = LaunchPlan::new(5);
        let mut registry = DaemonRegistry::new();

        let OfferDecision::Launch { tasks, .. } =
            eval.evaluate(&offer("o1", 5.0, 5.0), &mut plan, &mut registry)
        else {
            panic!("expected launch");
        };
        assert_eq!(tasks.len(), 2);
        assert_eq!(plan.remaining_to_launch(), 3);

        let again = eval.evaluate(&offer("o2", 5.0, 5.0), &mut plan, &mut registry);
        assert_eq!(again, OfferDecision::Decline(DeclineReason::PortsExhausted));
    }
}
