use serde::{Deserialize, Serialize};

use crate::types::{BlockHeight, ClaimId, Identity, PolicyId};

/// One successful ledger mutation. Failed operations emit nothing — the log
/// records the states the pool actually passed through, not the attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    ParticipantJoined {
        participant: Identity,
    },
    PolicyCreated {
        policy_id: PolicyId,
        owner: Identity,
        coverage_amount: u64,
        premium: u64,
        start_block: BlockHeight,
        end_block: u64,
        /// Pool balance after the premium was collected.
        pool_balance: u64,
    },
    ClaimSubmitted {
        claim_id: ClaimId,
        policy_id: PolicyId,
        amount: u64,
        description: String,
    },
    ClaimApproved {
        claim_id: ClaimId,
        policy_id: PolicyId,
        amount: u64,
        /// Pool balance after the payout was deducted.
        pool_balance: u64,
    },
}

/// Unified log entry: the immutable record the auditor replays. `seq` is the
/// position in the total operation order; `block` is the logical height at
/// which the operation was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub seq: u64,
    pub block: BlockHeight,
    pub event: LedgerEvent,
}

/// Append-only record of everything a ledger instance has done, in the
/// order it did it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog(Vec<LedgerRecord>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: LedgerRecord) {
        self.0.push(record);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LedgerRecord> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[LedgerRecord] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a LedgerRecord;
    type IntoIter = std::slice::Iter<'a, LedgerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufWriter, Write};

    use super::*;

    #[test]
    fn record_serializes_seq_block_and_event_fields() {
        let rec = LedgerRecord {
            seq: 0,
            block: BlockHeight(0),
            event: LedgerEvent::ParticipantJoined { participant: Identity::from("user1") },
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(
            json,
            r#"{"seq":0,"block":0,"event":{"ParticipantJoined":{"participant":"user1"}}}"#
        );
    }

    #[test]
    fn policy_created_json_shape() {
        let rec = LedgerRecord {
            seq: 1,
            block: BlockHeight(5),
            event: LedgerEvent::PolicyCreated {
                policy_id: PolicyId(0),
                owner: Identity::from("user1"),
                coverage_amount: 1_000_000,
                premium: 50_000,
                start_block: BlockHeight(5),
                end_block: 144,
                pool_balance: 50_000,
            },
        };
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["event"]["PolicyCreated"]["policy_id"], 0);
        assert_eq!(value["event"]["PolicyCreated"]["premium"], 50_000);
        assert_eq!(value["event"]["PolicyCreated"]["pool_balance"], 50_000);
    }

    #[test]
    fn records_round_trip_through_json() {
        let rec = LedgerRecord {
            seq: 3,
            block: BlockHeight(7),
            event: LedgerEvent::ClaimSubmitted {
                claim_id: ClaimId(0),
                policy_id: PolicyId(0),
                amount: 30_000,
                description: "Minor damage".to_string(),
            },
        };
        let json = serde_json::to_string(&rec).unwrap();
        let back: LedgerRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn ndjson_stream_one_line_per_record() {
        let records = vec![
            LedgerRecord {
                seq: 0,
                block: BlockHeight(0),
                event: LedgerEvent::ParticipantJoined { participant: Identity::from("user1") },
            },
            LedgerRecord {
                seq: 1,
                block: BlockHeight(0),
                event: LedgerEvent::PolicyCreated {
                    policy_id: PolicyId(0),
                    owner: Identity::from("user1"),
                    coverage_amount: 1_000_000,
                    premium: 50_000,
                    start_block: BlockHeight(0),
                    end_block: 144,
                    pool_balance: 50_000,
                },
            },
            LedgerRecord {
                seq: 2,
                block: BlockHeight(0),
                event: LedgerEvent::ClaimApproved {
                    claim_id: ClaimId(0),
                    policy_id: PolicyId(0),
                    amount: 30_000,
                    pool_balance: 20_000,
                },
            },
        ];

        let mut buf: Vec<u8> = Vec::new();
        {
            let mut writer = BufWriter::new(&mut buf);
            for r in &records {
                serde_json::to_writer(&mut writer, r).unwrap();
                writeln!(writer).unwrap();
            }
        }

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.split('\n').filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 3);
        for line in &lines {
            let v: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(v.get("seq").is_some(), "missing 'seq' key in: {line}");
            assert!(v.get("event").is_some(), "missing 'event' key in: {line}");
        }
    }

    #[test]
    fn event_log_preserves_push_order() {
        let mut log = EventLog::new();
        assert!(log.is_empty());
        for seq in 0..3 {
            log.push(LedgerRecord {
                seq,
                block: BlockHeight(0),
                event: LedgerEvent::ParticipantJoined {
                    participant: Identity::new(format!("member-{seq}")),
                },
            });
        }
        assert_eq!(log.len(), 3);
        let seqs: Vec<u64> = log.iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }
}
