use crate::funding::FixedCeiling;
use crate::types::Identity;

/// Static configuration of a pool instance: who administers it and how the
/// default funding oracle answers.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub administrator: Identity,
    /// Ceiling handed to the default `FixedCeiling` oracle.
    pub funding_ceiling: u64,
}

impl PoolConfig {
    pub fn canonical() -> Self {
        PoolConfig {
            administrator: Identity::from("pool-admin"),
            funding_ceiling: FixedCeiling::DEFAULT_CEILING,
        }
    }
}

/// Parameters of the synthetic operation stream the workload generator
/// feeds a ledger. All monetary values in integer units.
#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    pub seed: u64,
    /// Number of distinct member identities.
    pub members: usize,
    /// Poisson λ: expected policies per member.
    pub policies_per_member: f64,
    /// Poisson λ: expected claims per created policy.
    pub claims_per_policy: f64,
    /// Premium severity, ln-space. E[X] = exp(mu + sigma²/2).
    /// mu = 10.6, sigma = 0.8 → E[X] ≈ 55,000 units; median ≈ 40,000.
    pub premium_mu: f64,
    pub premium_sigma: f64,
    /// Coverage written per policy = premium × this factor.
    pub coverage_factor: u64,
    /// Fraction of submitted claims the administrator approves.
    pub approval_fraction: f64,
    /// Fraction of extra, deliberately invalid operations mixed in
    /// (re-joins, strangers' claims, non-admin approvals). These must all
    /// be rejected cleanly and leave no trace in the log.
    pub invalid_op_fraction: f64,
    /// Blocks the logical clock advances between operations.
    pub blocks_per_op: u64,
    /// Duration marker handed to every CreatePolicy.
    pub policy_duration: u64,
}

impl WorkloadConfig {
    pub fn canonical() -> Self {
        WorkloadConfig {
            seed: 42,
            members: 25,
            policies_per_member: 2.0,
            claims_per_policy: 1.5,
            premium_mu: 10.6,
            premium_sigma: 0.8,
            coverage_factor: 20,
            approval_fraction: 0.8,
            invalid_op_fraction: 0.15,
            blocks_per_op: 1,
            policy_duration: 144,
        }
    }
}
