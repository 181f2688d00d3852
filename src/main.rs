use std::fs::File;
use std::io::{BufWriter, Write};

use mupool::audit::{self, LedgerViolation, PoolStats};
use mupool::config::{PoolConfig, WorkloadConfig};
use mupool::events::EventLog;
use mupool::workload::{self, WorkloadOutcome};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut seed_override: Option<u64> = None;
    let mut members_override: Option<usize> = None;
    let mut output_path = "events.ndjson".to_string();
    let mut quiet = false;
    let mut runs: Option<u64> = None;
    let mut output_dir_opt: Option<String> = None;
    let mut csv_path_opt: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                seed_override = Some(args[i].parse().expect("--seed requires a u64"));
            }
            "--members" => {
                i += 1;
                members_override = Some(args[i].parse().expect("--members requires a count"));
            }
            "--output" => {
                i += 1;
                output_path = args[i].clone();
            }
            "--quiet" => quiet = true,
            "--runs" => {
                i += 1;
                runs = Some(args[i].parse().expect("--runs requires a positive integer"));
            }
            "--output-dir" => {
                i += 1;
                output_dir_opt = Some(args[i].clone());
            }
            "--csv" => {
                i += 1;
                csv_path_opt = Some(args[i].clone());
            }
            _ => {}
        }
        i += 1;
    }

    let pool_config = PoolConfig::canonical();
    let mut workload_config = WorkloadConfig::canonical();
    let start_seed = seed_override.unwrap_or(workload_config.seed);
    if let Some(m) = members_override {
        workload_config.members = m;
    }

    if let Some(n) = runs {
        use rayon::prelude::*;

        if let Some(ref dir) = output_dir_opt {
            std::fs::create_dir_all(dir).expect("failed to create output directory");
        }

        let results: Vec<(u64, PoolStats, WorkloadOutcome, usize)> = (0u64..n)
            .into_par_iter()
            .map(|i| {
                let seed = start_seed + i;
                let (pool, outcome) = workload::run(&pool_config, &workload_config, seed);

                if let Some(ref dir) = output_dir_opt {
                    let path = format!("{dir}/events_seed_{seed}.ndjson");
                    write_ndjson(&pool.log, &path);
                    if !quiet {
                        println!("Seed {seed}: {} records → {path}", pool.log.len());
                    }
                }

                let violations = audit::verify_ledger(&pool.log);
                for v in &violations {
                    eprintln!("Seed {seed}: VIOLATION {v}");
                }
                (seed, audit::analyse(&pool.log), outcome, violations.len())
            })
            .collect();

        if let Some(ref csv_path) = csv_path_opt {
            write_runs_csv(&results, csv_path);
        }

        if !quiet {
            print_all_runs(&results);
            print_distributions(&results);
        }

        if results.iter().any(|(_, _, _, violations)| *violations > 0) {
            std::process::exit(1);
        }
    } else {
        let (pool, outcome) = workload::run(&pool_config, &workload_config, start_seed);

        write_ndjson(&pool.log, &output_path);

        if !quiet {
            println!("Records written: {} → {output_path}", pool.log.len());
            print_report(&pool.log, &outcome);
        }
    }
}

fn write_ndjson(log: &EventLog, path: &str) {
    let file =
        File::create(path).unwrap_or_else(|e| panic!("failed to create {path}: {e}"));
    let mut writer = BufWriter::new(file);
    for record in log {
        serde_json::to_writer(&mut writer, record).expect("failed to serialize record");
        writeln!(writer).expect("failed to write newline");
    }
}

fn print_report(log: &EventLog, outcome: &WorkloadOutcome) {
    // ── Ledger invariants ─────────────────────────────────────────────────
    let violations = audit::verify_ledger(log);

    let inv = |variant: fn(&LedgerViolation) -> bool| {
        if violations.iter().any(variant) { "FAIL" } else { "PASS" }
    };

    println!("\n=== Ledger invariants ===");
    println!("  [1]  Seq dense and ordered:           {}", inv(|v| matches!(v, LedgerViolation::SeqGap { .. })));
    println!("  [2]  No duplicate join:               {}", inv(|v| matches!(v, LedgerViolation::DuplicateJoin { .. })));
    println!("  [3]  Owner joined before policy:      {}", inv(|v| matches!(v, LedgerViolation::OwnerNotParticipant { .. })));
    println!("  [4]  Policy ids sequential:           {}", inv(|v| matches!(v, LedgerViolation::PolicyIdOutOfOrder { .. })));
    println!("  [5]  Claim ids sequential:            {}", inv(|v| matches!(v, LedgerViolation::ClaimIdOutOfOrder { .. })));
    println!("  [6]  Claims reference known policies: {}", inv(|v| matches!(v, LedgerViolation::ClaimAgainstUnknownPolicy { .. })));
    println!("  [7]  Claim ≤ coverage:                {}", inv(|v| matches!(v, LedgerViolation::ClaimExceedsCoverage { .. })));
    println!("  [8]  Approvals reference submissions: {}", inv(|v| matches!(v, LedgerViolation::ApprovalWithoutSubmission { .. })));
    println!("  [9]  No duplicate approval:           {}", inv(|v| matches!(v, LedgerViolation::DuplicateApproval { .. })));
    println!("  [10] Approved amount = submitted:     {}", inv(|v| matches!(v, LedgerViolation::ApprovalAmountMismatch { .. })));
    println!("  [11] Pool never overdrawn:            {}", inv(|v| matches!(v, LedgerViolation::Overdraw { .. })));
    println!("  [12] Recorded balance reconciles:     {}", inv(|v| matches!(v, LedgerViolation::BalanceDrift { .. })));

    if violations.is_empty() {
        println!("  All ledger invariants: PASS");
    } else {
        println!("\n  {} violation(s):", violations.len());
        for v in &violations {
            println!("    {v}");
        }
    }

    // ── Pool summary ──────────────────────────────────────────────────────
    let stats = audit::analyse(log);
    println!("\n=== Pool summary ===");
    println!("  Participants:       {:>10}", stats.participants);
    println!("  Policies:           {:>10}", stats.policies);
    println!("  Claims submitted:   {:>10}", stats.claims);
    println!("  Claims approved:    {:>10}", stats.approvals);
    println!("  Rejected attempts:  {:>10}", outcome.rejected);
    println!("  Premiums collected: {:>10}", stats.premiums_collected);
    println!("  Amount claimed:     {:>10}", stats.amount_claimed);
    println!("  Amount paid:        {:>10}", stats.amount_paid);
    println!("  Final balance:      {:>10}", stats.final_balance);
    println!("  Payout ratio:       {:>9.1}%", stats.payout_ratio() * 100.0);
    println!("  Approval rate:      {:>9.1}%", stats.approval_rate() * 100.0);
}

fn write_runs_csv(results: &[(u64, PoolStats, WorkloadOutcome, usize)], path: &str) {
    let file = File::create(path).unwrap_or_else(|e| panic!("failed to create {path}: {e}"));
    let mut w = BufWriter::new(file);
    writeln!(
        w,
        "seed,participants,policies,claims,approvals,rejected,premiums,paid,final_balance,payout_ratio,violations"
    )
    .expect("write");
    for (seed, stats, outcome, violations) in results {
        writeln!(
            w,
            "{},{},{},{},{},{},{},{},{},{:.6},{}",
            seed,
            stats.participants,
            stats.policies,
            stats.claims,
            stats.approvals,
            outcome.rejected,
            stats.premiums_collected,
            stats.amount_paid,
            stats.final_balance,
            stats.payout_ratio(),
            violations,
        )
        .expect("write");
    }
}

fn print_all_runs(results: &[(u64, PoolStats, WorkloadOutcome, usize)]) {
    println!("\n=== Per-Run Summary ===");
    println!(
        "{:>6} | {:>7} | {:>8} | {:>7} | {:>8} | {:>8} | {:>10} | {:>10} | {:>7} | {:>4}",
        "Seed", "Members", "Policies", "Claims", "Approved", "Rejected", "Premiums", "Balance",
        "Payout%", "Viol"
    );
    println!("{}", "-".repeat(100));
    for (seed, stats, outcome, violations) in results {
        println!(
            "{:>6} | {:>7} | {:>8} | {:>7} | {:>8} | {:>8} | {:>10} | {:>10} | {:>6.1}% | {:>4}",
            seed,
            stats.participants,
            stats.policies,
            stats.claims,
            stats.approvals,
            outcome.rejected,
            stats.premiums_collected,
            stats.final_balance,
            stats.payout_ratio() * 100.0,
            violations,
        );
    }
}

fn print_distributions(results: &[(u64, PoolStats, WorkloadOutcome, usize)]) {
    if results.len() < 2 {
        eprintln!("Warning: Distribution requires >= 2 runs");
        return;
    }

    println!("\n=== Cross-Run Distribution (N={} runs) ===", results.len());
    println!(
        "{:>16} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10}",
        "Metric", "min", "p25", "p50", "p75", "max", "mean"
    );

    let mut rows = [
        ("payout_ratio_%", results.iter().map(|(_, s, _, _)| s.payout_ratio() * 100.0).collect::<Vec<f64>>()),
        ("final_balance", results.iter().map(|(_, s, _, _)| s.final_balance as f64).collect()),
        ("premiums", results.iter().map(|(_, s, _, _)| s.premiums_collected as f64).collect()),
        ("claims", results.iter().map(|(_, s, _, _)| s.claims as f64).collect()),
    ];

    for (name, values) in &mut rows {
        if let Some(ds) = audit::percentile_stats(values) {
            println!(
                "{:>16} | {:>10.1} | {:>10.1} | {:>10.1} | {:>10.1} | {:>10.1} | {:>10.1}",
                name, ds.min, ds.p25, ds.p50, ds.p75, ds.max, ds.mean
            );
        }
    }
}
