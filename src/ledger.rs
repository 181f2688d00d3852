use std::collections::{HashMap, HashSet};

use crate::clock::{FixedClock, LedgerClock};
use crate::error::LedgerError;
use crate::events::{EventLog, LedgerEvent, LedgerRecord};
use crate::funding::{FixedCeiling, FundingOracle};
use crate::types::{BlockHeight, ClaimId, Identity, PolicyId};

/// A coverage agreement between a participant and the pool.
/// Created active; nothing in this core ever deactivates it. `end_block`
/// is stored as handed in (a duration marker) and not enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub id: PolicyId,
    pub owner: Identity,
    pub coverage_amount: u64,
    pub premium: u64,
    pub start_block: BlockHeight,
    pub end_block: u64,
    pub active: bool,
}

/// A request to pay out against a policy. Pending until the administrator
/// approves it; approval is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub id: ClaimId,
    pub policy_id: PolicyId,
    pub amount: u64,
    pub description: String,
    pub approved: bool,
}

/// The pool ledger: one instance owns the entire mutable state of a mutual
/// insurance pool — participant set, policy and claim tables, pool balance,
/// and the id counters. Every operation is check-then-mutate against
/// `&mut self`, so a call either applies completely or not at all.
///
/// Embedders exposing this as a service must serialize calls through a
/// single mutual-exclusion boundary (e.g. `Mutex<PoolLedger>`); the core
/// itself never blocks on I/O.
pub struct PoolLedger {
    administrator: Identity,
    participants: HashSet<Identity>,
    policies: HashMap<PolicyId, Policy>,
    claims: HashMap<ClaimId, Claim>,
    pool_balance: u64,
    next_policy_id: u64,
    next_claim_id: u64,
    next_seq: u64,
    /// Completed operations in application order. `log[i]` has seq `i`.
    pub log: EventLog,
    clock: Box<dyn LedgerClock + Send>,
    funding: Box<dyn FundingOracle + Send>,
}

impl PoolLedger {
    /// Fresh ledger: empty collections, zeroed counters, reference ports
    /// (block 0 clock, 1,000,000-unit funding ceiling).
    pub fn new(administrator: Identity) -> Self {
        PoolLedger {
            administrator,
            participants: HashSet::new(),
            policies: HashMap::new(),
            claims: HashMap::new(),
            pool_balance: 0,
            next_policy_id: 0,
            next_claim_id: 0,
            next_seq: 0,
            log: EventLog::new(),
            clock: Box::new(FixedClock::genesis()),
            funding: Box::new(FixedCeiling::reference()),
        }
    }

    /// Construct from a pool config: the configured administrator and a
    /// fixed-ceiling oracle at the configured ceiling.
    pub fn from_config(config: &crate::config::PoolConfig) -> Self {
        PoolLedger::new(config.administrator.clone())
            .with_funding(FixedCeiling(config.funding_ceiling))
    }

    /// Replace the clock port (builder style, used by workloads and tests).
    pub fn with_clock(mut self, clock: impl LedgerClock + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the funding oracle port.
    pub fn with_funding(mut self, funding: impl FundingOracle + Send + 'static) -> Self {
        self.funding = Box::new(funding);
        self
    }

    // ── Operations ────────────────────────────────────────────────────────

    /// Add `caller` to the participant set. Joining twice fails; membership
    /// is never duplicated and never revoked.
    pub fn join(&mut self, caller: &Identity) -> Result<(), LedgerError> {
        if self.participants.contains(caller) {
            return Err(LedgerError::AlreadyMember);
        }
        self.participants.insert(caller.clone());
        self.record(LedgerEvent::ParticipantJoined { participant: caller.clone() });
        Ok(())
    }

    /// Create a policy owned by `caller`, collecting `premium` into the
    /// pool. The policy id counter advances only on success, so a rejected
    /// call never consumes an id.
    pub fn create_policy(
        &mut self,
        caller: &Identity,
        coverage_amount: u64,
        premium: u64,
        duration: u64,
    ) -> Result<PolicyId, LedgerError> {
        if !self.participants.contains(caller) {
            return Err(LedgerError::Unauthorized);
        }
        if !self.funding.has_available(caller, premium) {
            return Err(LedgerError::InsufficientFunds);
        }

        let policy_id = PolicyId(self.next_policy_id);
        self.next_policy_id += 1;

        let start_block = self.clock.current_block();
        self.policies.insert(
            policy_id,
            Policy {
                id: policy_id,
                owner: caller.clone(),
                coverage_amount,
                premium,
                start_block,
                end_block: duration,
                active: true,
            },
        );
        self.pool_balance += premium;

        self.record(LedgerEvent::PolicyCreated {
            policy_id,
            owner: caller.clone(),
            coverage_amount,
            premium,
            start_block,
            end_block: duration,
            pool_balance: self.pool_balance,
        });
        Ok(policy_id)
    }

    /// Submit a claim against a policy `caller` owns. A missing policy and
    /// an ownership mismatch are indistinguishable to the caller. The pool
    /// balance is untouched until approval.
    pub fn submit_claim(
        &mut self,
        caller: &Identity,
        policy_id: PolicyId,
        amount: u64,
        description: &str,
    ) -> Result<ClaimId, LedgerError> {
        let policy = match self.policies.get(&policy_id) {
            Some(p) if p.owner == *caller => p,
            _ => return Err(LedgerError::Unauthorized),
        };
        if !policy.active || amount > policy.coverage_amount {
            return Err(LedgerError::InvalidPolicy);
        }

        let claim_id = ClaimId(self.next_claim_id);
        self.next_claim_id += 1;

        self.claims.insert(
            claim_id,
            Claim {
                id: claim_id,
                policy_id,
                amount,
                description: description.to_string(),
                approved: false,
            },
        );

        self.record(LedgerEvent::ClaimSubmitted {
            claim_id,
            policy_id,
            amount,
            description: description.to_string(),
        });
        Ok(claim_id)
    }

    /// Pay out a pending claim from the pool. Administrator only; refused
    /// rather than letting the balance go negative. The only payout path,
    /// and irreversible.
    pub fn approve_claim(&mut self, caller: &Identity, claim_id: ClaimId) -> Result<(), LedgerError> {
        if *caller != self.administrator {
            return Err(LedgerError::OwnerOnly);
        }
        let claim = self.claims.get_mut(&claim_id).ok_or(LedgerError::NotFound)?;
        if claim.approved {
            return Err(LedgerError::AlreadyApproved);
        }
        if claim.amount > self.pool_balance {
            return Err(LedgerError::InsufficientFunds);
        }

        claim.approved = true;
        let (policy_id, amount) = (claim.policy_id, claim.amount);
        self.pool_balance -= amount;

        self.record(LedgerEvent::ClaimApproved {
            claim_id,
            policy_id,
            amount,
            pool_balance: self.pool_balance,
        });
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn administrator(&self) -> &Identity {
        &self.administrator
    }

    pub fn pool_balance(&self) -> u64 {
        self.pool_balance
    }

    pub fn is_participant(&self, who: &Identity) -> bool {
        self.participants.contains(who)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn policy(&self, id: PolicyId) -> Option<&Policy> {
        self.policies.get(&id)
    }

    pub fn policy_count(&self) -> usize {
        self.policies.len()
    }

    pub fn claim(&self, id: ClaimId) -> Option<&Claim> {
        self.claims.get(&id)
    }

    pub fn claim_count(&self) -> usize {
        self.claims.len()
    }

    fn record(&mut self, event: LedgerEvent) {
        let record = LedgerRecord {
            seq: self.next_seq,
            block: self.clock.current_block(),
            event,
        };
        self.next_seq += 1;
        self.log.push(record);
    }
}


#[cfg(test)]
mod prop_tests {
    use proptest::prelude::*;

    use super::*;
    use crate::audit;

    /// A caller-agnostic operation over a small identity pool. Index 0 is
    /// the administrator; 1..=4 are ordinary members.
    #[derive(Debug, Clone)]
    enum Op {
        Join(u8),
        Create { who: u8, coverage: u64, premium: u64, duration: u64 },
        Submit { who: u8, policy: u64, amount: u64 },
        Approve { who: u8, claim: u64 },
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..5).prop_map(Op::Join),
            (0u8..5, 0u64..2_000_000, 0u64..1_500_000, 1u64..1000).prop_map(
                |(who, coverage, premium, duration)| Op::Create { who, coverage, premium, duration }
            ),
            (0u8..5, 0u64..8, 0u64..2_000_000)
                .prop_map(|(who, policy, amount)| Op::Submit { who, policy, amount }),
            (0u8..5, 0u64..8).prop_map(|(who, claim)| Op::Approve { who, claim }),
        ]
    }

    fn identity(idx: u8) -> Identity {
        if idx == 0 { Identity::from("pool-admin") } else { Identity::new(format!("member-{idx}")) }
    }

    fn apply(pool: &mut PoolLedger, op: &Op) -> (u64, u64) {
        // Returns (premium collected, payout made) for this op, zero on failure.
        match op {
            Op::Join(who) => {
                let _ = pool.join(&identity(*who));
                (0, 0)
            }
            Op::Create { who, coverage, premium, duration } => {
                match pool.create_policy(&identity(*who), *coverage, *premium, *duration) {
                    Ok(_) => (*premium, 0),
                    Err(_) => (0, 0),
                }
            }
            Op::Submit { who, policy, amount } => {
                let _ = pool.submit_claim(&identity(*who), PolicyId(*policy), *amount, "loss");
                (0, 0)
            }
            Op::Approve { who, claim } => {
                let cid = ClaimId(*claim);
                let payout = pool.claim(cid).map(|c| c.amount).unwrap_or(0);
                match pool.approve_claim(&identity(*who), cid) {
                    Ok(()) => (0, payout),
                    Err(_) => (0, 0),
                }
            }
        }
    }

    proptest! {
        #[test]
        fn balance_is_exactly_premiums_minus_payouts(ops in prop::collection::vec(op_strategy(), 1..120)) {
            let mut pool = PoolLedger::new(Identity::from("pool-admin"));
            let mut collected = 0u64;
            let mut paid = 0u64;
            for op in &ops {
                let (c, p) = apply(&mut pool, op);
                collected += c;
                paid += p;
            }
            prop_assert!(paid <= collected, "payouts can never exceed premiums collected");
            prop_assert_eq!(pool.pool_balance(), collected - paid);
        }

        #[test]
        fn ids_stay_dense_and_sequential(ops in prop::collection::vec(op_strategy(), 1..120)) {
            let mut pool = PoolLedger::new(Identity::from("pool-admin"));
            for op in &ops {
                apply(&mut pool, op);
            }
            // Every id below the counts must resolve; the one at the count must not.
            let policies = pool.policy_count() as u64;
            for i in 0..policies {
                prop_assert!(pool.policy(PolicyId(i)).is_some());
            }
            prop_assert!(pool.policy(PolicyId(policies)).is_none());

            let claims = pool.claim_count() as u64;
            for i in 0..claims {
                prop_assert!(pool.claim(ClaimId(i)).is_some());
            }
            prop_assert!(pool.claim(ClaimId(claims)).is_none());
        }

        #[test]
        fn replayed_log_never_violates_invariants(ops in prop::collection::vec(op_strategy(), 1..120)) {
            let mut pool = PoolLedger::new(Identity::from("pool-admin"));
            for op in &ops {
                apply(&mut pool, op);
            }
            let violations = audit::verify_ledger(&pool.log);
            prop_assert!(
                violations.is_empty(),
                "log from live ledger must replay clean, got: {:?}",
                violations.iter().map(|v| v.to_string()).collect::<Vec<_>>()
            );
        }
    }
}
