//! Typed event-stream auditor for pool ledger output.
//!
//! Reads an NDJSON record stream (default `events.ndjson`), deserializes it
//! using the same `LedgerRecord` type the ledger writes, then prints:
//!   Tier 1 — ledger invariant status (PASS/FAIL per invariant)
//!   Tier 2 — pool summary (counts, amounts, ratios)
//! Exits nonzero if any invariant is violated.

use std::{
    fs::File,
    io::{BufRead, BufReader},
};

use mupool::{
    audit::{analyse, verify_ledger, LedgerViolation},
    events::{EventLog, LedgerRecord},
};

fn main() {
    // ── Resolve events file path: first positional arg, else default ──────
    let events_path = std::env::args().nth(1).unwrap_or_else(|| "events.ndjson".to_string());

    // ── Load records ──────────────────────────────────────────────────────
    let file = File::open(&events_path).unwrap_or_else(|e| {
        eprintln!("error: cannot open {events_path} — {e}");
        eprintln!("Run `cargo run --release` first to generate the event stream.");
        std::process::exit(1);
    });

    let mut log = EventLog::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line.unwrap_or_else(|e| {
            eprintln!("error reading line {}: {}", line_no + 1, e);
            std::process::exit(1);
        });
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LedgerRecord>(&line) {
            Ok(record) => log.push(record),
            Err(e) => {
                eprintln!("error: failed to deserialize line {}: {}", line_no + 1, e);
                eprintln!("  line: {line}");
                std::process::exit(1);
            }
        }
    }

    // ── Tier 1: ledger invariants ─────────────────────────────────────────
    let violations = verify_ledger(&log);

    println!("=== Tier 1 — Ledger Invariants ===");

    // Each invariant is a category; FAIL if any violation of that kind exists.
    let has = |f: fn(&LedgerViolation) -> bool| violations.iter().any(f);

    fn status(fail: bool) -> &'static str {
        if fail { "FAIL" } else { "PASS" }
    }

    println!(
        "  [{}] Inv 1 — Record seqs dense and in order",
        status(has(|v| matches!(v, LedgerViolation::SeqGap { .. })))
    );
    println!(
        "  [{}] Inv 2 — No identity joins twice",
        status(has(|v| matches!(v, LedgerViolation::DuplicateJoin { .. })))
    );
    println!(
        "  [{}] Inv 3 — Policy owners joined first",
        status(has(|v| matches!(v, LedgerViolation::OwnerNotParticipant { .. })))
    );
    println!(
        "  [{}] Inv 4 — Policy ids allocated 0,1,2,…",
        status(has(|v| matches!(v, LedgerViolation::PolicyIdOutOfOrder { .. })))
    );
    println!(
        "  [{}] Inv 5 — Claim ids allocated 0,1,2,…",
        status(has(|v| matches!(v, LedgerViolation::ClaimIdOutOfOrder { .. })))
    );
    println!(
        "  [{}] Inv 6 — Claims reference created policies",
        status(has(|v| matches!(v, LedgerViolation::ClaimAgainstUnknownPolicy { .. })))
    );
    println!(
        "  [{}] Inv 7 — Claim amount within coverage",
        status(has(|v| matches!(v, LedgerViolation::ClaimExceedsCoverage { .. })))
    );
    println!(
        "  [{}] Inv 8 — Approvals reference submitted claims",
        status(has(|v| matches!(v, LedgerViolation::ApprovalWithoutSubmission { .. })))
    );
    println!(
        "  [{}] Inv 9 — No claim approved twice",
        status(has(|v| matches!(v, LedgerViolation::DuplicateApproval { .. })))
    );
    println!(
        "  [{}] Inv 10 — Approved amount equals submitted",
        status(has(|v| matches!(v, LedgerViolation::ApprovalAmountMismatch { .. })))
    );
    println!(
        "  [{}] Inv 11 — Pool balance never overdrawn",
        status(has(|v| matches!(v, LedgerViolation::Overdraw { .. })))
    );
    println!(
        "  [{}] Inv 12 — Recorded balances reconcile",
        status(has(|v| matches!(v, LedgerViolation::BalanceDrift { .. })))
    );

    if !violations.is_empty() {
        println!("\n{} violation(s):", violations.len());
        for v in &violations {
            println!("  {v}");
        }
    }

    // ── Tier 2: pool summary ──────────────────────────────────────────────
    let stats = analyse(&log);
    println!("\n=== Tier 2 — Pool Summary ===");
    println!("  Records:            {:>10}", log.len());
    println!("  Participants:       {:>10}", stats.participants);
    println!("  Policies:           {:>10}", stats.policies);
    println!("  Claims submitted:   {:>10}", stats.claims);
    println!("  Claims approved:    {:>10}", stats.approvals);
    println!("  Premiums collected: {:>10}", stats.premiums_collected);
    println!("  Amount claimed:     {:>10}", stats.amount_claimed);
    println!("  Amount paid:        {:>10}", stats.amount_paid);
    println!("  Final balance:      {:>10}", stats.final_balance);
    println!("  Payout ratio:       {:>9.1}%", stats.payout_ratio() * 100.0);
    println!("  Approval rate:      {:>9.1}%", stats.approval_rate() * 100.0);

    if !violations.is_empty() {
        std::process::exit(1);
    }
}
