use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, LogNormal, Poisson};

use crate::clock::BlockCounter;
use crate::config::{PoolConfig, WorkloadConfig};
use crate::ledger::PoolLedger;
use crate::types::{BlockHeight, ClaimId, Identity, PolicyId};

/// Tallies of what a workload run attempted and how the ledger answered.
/// `rejected` counts the deliberately invalid operations plus any organic
/// refusals (ceiling, solvency); every rejection is an expected outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkloadOutcome {
    pub joins: u64,
    pub policies: u64,
    pub claims: u64,
    pub approvals: u64,
    pub rejected: u64,
}

/// Drive a fresh ledger through a seeded random operation stream.
///
/// Same config + same seed → byte-identical event logs: the generator
/// draws everything from one ChaCha20 stream and iterates only ordered
/// collections. Invalid traffic (re-joins, strangers' claims, non-admin
/// approvals, oversized amounts) is mixed in at `invalid_op_fraction` and
/// must bounce off the ledger without a trace.
pub fn run(pool_cfg: &PoolConfig, cfg: &WorkloadConfig, seed: u64) -> (PoolLedger, WorkloadOutcome) {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let clock = Arc::new(BlockCounter::starting_at(BlockHeight(0)));
    let mut pool = PoolLedger::from_config(pool_cfg).with_clock(Arc::clone(&clock));
    let mut outcome = WorkloadOutcome::default();

    let members: Vec<Identity> =
        (1..=cfg.members).map(|i| Identity::new(format!("member-{i}"))).collect();
    let admin = pool_cfg.administrator.clone();

    let premium_dist = LogNormal::new(cfg.premium_mu, cfg.premium_sigma)
        .expect("premium sigma must be finite and non-negative");

    // ── Membership ────────────────────────────────────────────────────────
    for member in &members {
        if pool.join(member).is_ok() {
            outcome.joins += 1;
        }
        clock.advance(cfg.blocks_per_op);

        if rng.random_bool(cfg.invalid_op_fraction) {
            // Duplicate join — must be rejected, not duplicated.
            let _ = pool.join(member);
            outcome.rejected += 1;
        }
    }

    // ── Policies ──────────────────────────────────────────────────────────
    let mut created: Vec<(Identity, PolicyId, u64)> = Vec::new();
    for member in &members {
        let n_policies = draw_count(&mut rng, cfg.policies_per_member);
        for _ in 0..n_policies {
            let premium = premium_dist.sample(&mut rng).max(1.0) as u64;
            let coverage = premium * cfg.coverage_factor;
            match pool.create_policy(member, coverage, premium, cfg.policy_duration) {
                Ok(pid) => {
                    outcome.policies += 1;
                    created.push((member.clone(), pid, coverage));
                }
                // Premium above the oracle's answer — expected for the
                // LogNormal tail against a fixed ceiling.
                Err(_) => outcome.rejected += 1,
            }
            clock.advance(cfg.blocks_per_op);
        }
    }

    if !members.is_empty() && rng.random_bool(cfg.invalid_op_fraction) {
        // A stranger who never joined tries to buy coverage.
        let _ = pool.create_policy(&Identity::from("stranger"), 1_000, 10, cfg.policy_duration);
        outcome.rejected += 1;
    }

    // ── Claims ────────────────────────────────────────────────────────────
    let mut submitted: Vec<ClaimId> = Vec::new();
    for (owner, policy_id, coverage) in &created {
        let n_claims = draw_count(&mut rng, cfg.claims_per_policy);
        for _ in 0..n_claims {
            let amount = rng.random_range(1..=*coverage);
            match pool.submit_claim(owner, *policy_id, amount, "asset damage") {
                Ok(cid) => {
                    outcome.claims += 1;
                    submitted.push(cid);
                }
                Err(_) => outcome.rejected += 1,
            }
            clock.advance(cfg.blocks_per_op);

            if rng.random_bool(cfg.invalid_op_fraction) {
                // Over-coverage claim from the rightful owner.
                let _ = pool.submit_claim(owner, *policy_id, coverage + 1, "inflated");
                outcome.rejected += 1;
            }
        }

        if rng.random_bool(cfg.invalid_op_fraction) {
            // Another member (or a stranger) claims on someone else's policy.
            let intruder = &members[rng.random_range(0..members.len())];
            if intruder != owner {
                let _ = pool.submit_claim(intruder, *policy_id, 1, "not mine");
                outcome.rejected += 1;
            }
        }
    }

    // ── Approvals ─────────────────────────────────────────────────────────
    for cid in &submitted {
        if rng.random_bool(cfg.invalid_op_fraction) && !members.is_empty() {
            // A member tries to approve their own claim.
            let pretender = &members[rng.random_range(0..members.len())];
            let _ = pool.approve_claim(pretender, *cid);
            outcome.rejected += 1;
        }

        if rng.random_bool(cfg.approval_fraction) {
            match pool.approve_claim(&admin, *cid) {
                Ok(()) => outcome.approvals += 1,
                // Solvency refusal — the pool keeps its balance instead.
                Err(_) => outcome.rejected += 1,
            }
        }
        clock.advance(cfg.blocks_per_op);
    }

    (pool, outcome)
}

/// Draw a Poisson count; λ = 0 yields 0 without consulting the RNG.
fn draw_count(rng: &mut ChaCha20Rng, lambda: f64) -> u64 {
    if lambda <= 0.0 {
        return 0;
    }
    let dist = Poisson::new(lambda).expect("lambda must be positive and finite");
    dist.sample(rng) as u64
}
