use std::collections::{HashMap, HashSet};

use crate::events::{EventLog, LedgerEvent};
use crate::types::{ClaimId, Identity, PolicyId};

/// Aggregate statistics derived from a ledger's event stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Count of ParticipantJoined records.
    pub participants: u64,
    /// Count of PolicyCreated records.
    pub policies: u64,
    /// Count of ClaimSubmitted records.
    pub claims: u64,
    /// Count of ClaimApproved records.
    pub approvals: u64,
    /// Sum of PolicyCreated.premium.
    pub premiums_collected: u64,
    /// Sum of ClaimSubmitted.amount (requested, not necessarily paid).
    pub amount_claimed: u64,
    /// Sum of ClaimApproved.amount.
    pub amount_paid: u64,
    /// Pool balance after the last balance-bearing record (0 for an empty log).
    pub final_balance: u64,
}

impl PoolStats {
    /// Paid claims / collected premiums. Zero if nothing was collected.
    pub fn payout_ratio(&self) -> f64 {
        if self.premiums_collected == 0 {
            0.0
        } else {
            self.amount_paid as f64 / self.premiums_collected as f64
        }
    }

    /// Approved claims / submitted claims. Zero if nothing was submitted.
    pub fn approval_rate(&self) -> f64 {
        if self.claims == 0 { 0.0 } else { self.approvals as f64 / self.claims as f64 }
    }
}

/// Compute aggregate statistics from an event stream.
pub fn analyse(log: &EventLog) -> PoolStats {
    let mut stats = PoolStats::default();
    for record in log {
        match &record.event {
            LedgerEvent::ParticipantJoined { .. } => stats.participants += 1,
            LedgerEvent::PolicyCreated { premium, pool_balance, .. } => {
                stats.policies += 1;
                stats.premiums_collected += premium;
                stats.final_balance = *pool_balance;
            }
            LedgerEvent::ClaimSubmitted { amount, .. } => {
                stats.claims += 1;
                stats.amount_claimed += amount;
            }
            LedgerEvent::ClaimApproved { amount, pool_balance, .. } => {
                stats.approvals += 1;
                stats.amount_paid += amount;
                stats.final_balance = *pool_balance;
            }
        }
    }
    stats
}

/// A ledger invariant violated by an event stream. A log produced by a live
/// `PoolLedger` replays with zero violations; anything else means the log
/// was corrupted, truncated, or produced by a broken implementation.
#[derive(Debug)]
pub enum LedgerViolation {
    /// Record seq does not match its position in the stream.
    SeqGap { expected: u64, actual: u64 },
    /// The same identity joined twice.
    DuplicateJoin { participant: String, seq: u64 },
    /// A policy was created for an owner with no prior join.
    OwnerNotParticipant { policy_id: u64, owner: String, seq: u64 },
    /// Policy ids must be allocated 0, 1, 2, … in stream order.
    PolicyIdOutOfOrder { expected: u64, actual: u64, seq: u64 },
    /// Claim ids must be allocated 0, 1, 2, … in stream order.
    ClaimIdOutOfOrder { expected: u64, actual: u64, seq: u64 },
    /// A claim references a policy the stream never created.
    ClaimAgainstUnknownPolicy { claim_id: u64, policy_id: u64, seq: u64 },
    /// A claim was submitted for more than its policy's coverage.
    ClaimExceedsCoverage { claim_id: u64, amount: u64, coverage: u64, seq: u64 },
    /// An approval references a claim the stream never submitted.
    ApprovalWithoutSubmission { claim_id: u64, seq: u64 },
    /// The same claim was approved twice.
    DuplicateApproval { claim_id: u64, seq: u64 },
    /// Approved amount differs from the submitted amount.
    ApprovalAmountMismatch { claim_id: u64, submitted: u64, approved: u64, seq: u64 },
    /// A payout larger than the running balance — the pool went negative.
    Overdraw { payout: u64, balance: u64, seq: u64 },
    /// Recorded pool_balance does not match the replayed running balance.
    BalanceDrift { expected: u64, recorded: u64, seq: u64 },
}

impl std::fmt::Display for LedgerViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SeqGap { expected, actual } => {
                write!(f, "SeqGap: expected={expected} actual={actual}")
            }
            Self::DuplicateJoin { participant, seq } => {
                write!(f, "DuplicateJoin seq={seq}: participant={participant}")
            }
            Self::OwnerNotParticipant { policy_id, owner, seq } => {
                write!(f, "OwnerNotParticipant seq={seq}: policy={policy_id} owner={owner}")
            }
            Self::PolicyIdOutOfOrder { expected, actual, seq } => {
                write!(f, "PolicyIdOutOfOrder seq={seq}: expected={expected} actual={actual}")
            }
            Self::ClaimIdOutOfOrder { expected, actual, seq } => {
                write!(f, "ClaimIdOutOfOrder seq={seq}: expected={expected} actual={actual}")
            }
            Self::ClaimAgainstUnknownPolicy { claim_id, policy_id, seq } => {
                write!(f, "ClaimAgainstUnknownPolicy seq={seq}: claim={claim_id} policy={policy_id}")
            }
            Self::ClaimExceedsCoverage { claim_id, amount, coverage, seq } => {
                write!(
                    f,
                    "ClaimExceedsCoverage seq={seq}: claim={claim_id} amount={amount} coverage={coverage}"
                )
            }
            Self::ApprovalWithoutSubmission { claim_id, seq } => {
                write!(f, "ApprovalWithoutSubmission seq={seq}: claim={claim_id}")
            }
            Self::DuplicateApproval { claim_id, seq } => {
                write!(f, "DuplicateApproval seq={seq}: claim={claim_id}")
            }
            Self::ApprovalAmountMismatch { claim_id, submitted, approved, seq } => {
                write!(
                    f,
                    "ApprovalAmountMismatch seq={seq}: claim={claim_id} submitted={submitted} approved={approved}"
                )
            }
            Self::Overdraw { payout, balance, seq } => {
                write!(f, "Overdraw seq={seq}: payout={payout} balance={balance}")
            }
            Self::BalanceDrift { expected, recorded, seq } => {
                write!(f, "BalanceDrift seq={seq}: expected={expected} recorded={recorded}")
            }
        }
    }
}

/// Replay an event stream against the ledger invariants. Returns one item
/// per violation found; an empty Vec means the stream is consistent.
pub fn verify_ledger(log: &EventLog) -> Vec<LedgerViolation> {
    let mut violations = Vec::new();

    let mut participants: HashSet<&Identity> = HashSet::new();
    // policy_id → coverage_amount
    let mut coverage: HashMap<PolicyId, u64> = HashMap::new();
    // claim_id → (amount, approved)
    let mut claims: HashMap<ClaimId, (u64, bool)> = HashMap::new();
    let mut balance: u64 = 0;
    let mut next_policy_id: u64 = 0;
    let mut next_claim_id: u64 = 0;

    for (idx, record) in log.iter().enumerate() {
        let seq = record.seq;
        if seq != idx as u64 {
            violations.push(LedgerViolation::SeqGap { expected: idx as u64, actual: seq });
        }

        match &record.event {
            LedgerEvent::ParticipantJoined { participant } => {
                if !participants.insert(participant) {
                    violations.push(LedgerViolation::DuplicateJoin {
                        participant: participant.to_string(),
                        seq,
                    });
                }
            }
            LedgerEvent::PolicyCreated {
                policy_id, owner, coverage_amount, premium, pool_balance, ..
            } => {
                if !participants.contains(owner) {
                    violations.push(LedgerViolation::OwnerNotParticipant {
                        policy_id: policy_id.0,
                        owner: owner.to_string(),
                        seq,
                    });
                }
                if policy_id.0 != next_policy_id {
                    violations.push(LedgerViolation::PolicyIdOutOfOrder {
                        expected: next_policy_id,
                        actual: policy_id.0,
                        seq,
                    });
                }
                next_policy_id = policy_id.0 + 1;
                coverage.insert(*policy_id, *coverage_amount);

                balance += premium;
                if *pool_balance != balance {
                    violations.push(LedgerViolation::BalanceDrift {
                        expected: balance,
                        recorded: *pool_balance,
                        seq,
                    });
                    // Resync so a single drift is reported once, not per
                    // subsequent record.
                    balance = *pool_balance;
                }
            }
            LedgerEvent::ClaimSubmitted { claim_id, policy_id, amount, .. } => {
                if claim_id.0 != next_claim_id {
                    violations.push(LedgerViolation::ClaimIdOutOfOrder {
                        expected: next_claim_id,
                        actual: claim_id.0,
                        seq,
                    });
                }
                next_claim_id = claim_id.0 + 1;

                match coverage.get(policy_id) {
                    None => violations.push(LedgerViolation::ClaimAgainstUnknownPolicy {
                        claim_id: claim_id.0,
                        policy_id: policy_id.0,
                        seq,
                    }),
                    Some(&cov) if *amount > cov => {
                        violations.push(LedgerViolation::ClaimExceedsCoverage {
                            claim_id: claim_id.0,
                            amount: *amount,
                            coverage: cov,
                            seq,
                        });
                    }
                    Some(_) => {}
                }
                claims.insert(*claim_id, (*amount, false));
            }
            LedgerEvent::ClaimApproved { claim_id, amount, pool_balance, .. } => {
                match claims.get_mut(claim_id) {
                    None => violations.push(LedgerViolation::ApprovalWithoutSubmission {
                        claim_id: claim_id.0,
                        seq,
                    }),
                    Some((submitted, approved)) => {
                        if *approved {
                            violations.push(LedgerViolation::DuplicateApproval {
                                claim_id: claim_id.0,
                                seq,
                            });
                        }
                        if *submitted != *amount {
                            violations.push(LedgerViolation::ApprovalAmountMismatch {
                                claim_id: claim_id.0,
                                submitted: *submitted,
                                approved: *amount,
                                seq,
                            });
                        }
                        *approved = true;
                    }
                }

                if *amount > balance {
                    violations.push(LedgerViolation::Overdraw {
                        payout: *amount,
                        balance,
                        seq,
                    });
                    balance = 0;
                } else {
                    balance -= amount;
                }
                if *pool_balance != balance {
                    violations.push(LedgerViolation::BalanceDrift {
                        expected: balance,
                        recorded: *pool_balance,
                        seq,
                    });
                    balance = *pool_balance;
                }
            }
        }
    }

    violations
}

/// Distribution statistics for a continuous metric across N workload runs.
#[derive(Debug, Clone)]
pub struct DistStats {
    pub n: usize,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

/// Percentile summary of `values`. Sorts in place; None if empty.
pub fn percentile_stats(values: &mut Vec<f64>) -> Option<DistStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();

    let interp = |p: f64| -> f64 {
        let h = p * (n - 1) as f64;
        let lo = h.floor() as usize;
        let hi = (lo + 1).min(n - 1);
        let frac = h - lo as f64;
        values[lo] * (1.0 - frac) + values[hi] * frac
    };

    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = if n > 1 {
        values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
    } else {
        0.0
    };

    Some(DistStats {
        n,
        min: values[0],
        p25: interp(0.25),
        p50: interp(0.50),
        p75: interp(0.75),
        max: values[n - 1],
        mean,
        std_dev: variance.sqrt(),
    })
}
