
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use mupool::audit;
use mupool::config::PoolConfig;
use mupool::ledger::PoolLedger;
use mupool::types::Identity;
use mupool::workload;

use fixtures::{LARGE, MEDIUM, SMALL, pool_with_members, prepopulate_policies, workload_config};

// ── Group 1: join — participant set scaling ──────────────────────────────────

fn bench_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("join");
    for &count in &[1_000usize, 10_000, 100_000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &n| {
            b.iter_batched(
                || {
                    let pool = PoolLedger::from_config(&PoolConfig::canonical());
                    let members: Vec<Identity> =
                        (0..n).map(|i| Identity::new(format!("member-{i}"))).collect();
                    (pool, members)
                },
                |(mut pool, members)| {
                    for m in &members {
                        pool.join(m).unwrap();
                    }
                    pool
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

// ── Group 2: create_policy — policy table scaling ────────────────────────────

fn bench_create_policy(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_policy");
    for &count in &[100usize, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &n| {
            b.iter_batched(
                || pool_with_members(100),
                |(mut pool, members)| {
                    prepopulate_policies(&mut pool, &members, n);
                    pool
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

// ── Group 3: claim_chain — submit then approve ───────────────────────────────

fn bench_claim_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("claim_chain");
    for &count in &[100usize, 1_000, 5_000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &n| {
            b.iter_batched(
                || {
                    let (mut pool, members) = pool_with_members(100);
                    let policies = prepopulate_policies(&mut pool, &members, n);
                    (pool, policies)
                },
                |(mut pool, policies)| {
                    let admin = pool.administrator().clone();
                    for (owner, pid) in &policies {
                        let cid = pool.submit_claim(owner, *pid, 500, "bench loss").unwrap();
                        pool.approve_claim(&admin, cid).unwrap();
                    }
                    pool
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

// ── Group 4: full_workload — end-to-end random traffic ───────────────────────

fn bench_full_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_workload");
    let pool_config = PoolConfig::canonical();
    for (name, scenario) in [("small", &SMALL), ("medium", &MEDIUM), ("large", &LARGE)] {
        if name == "large" {
            group.sample_size(10);
        }
        group.throughput(Throughput::Elements(scenario.members as u64));
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            let config = workload_config(scenario, 42);
            b.iter(|| workload::run(&pool_config, &config, 42))
        });
    }
    group.finish();
}

// ── Group 5: audit_replay — verification cost over log size ──────────────────

fn bench_audit_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("audit_replay");
    let pool_config = PoolConfig::canonical();
    for (name, scenario) in [("small", &SMALL), ("medium", &MEDIUM), ("large", &LARGE)] {
        let config = workload_config(scenario, 42);
        let (pool, _) = workload::run(&pool_config, &config, 42);
        group.throughput(Throughput::Elements(pool.log.len() as u64));
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| audit::verify_ledger(&pool.log))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_join,
    bench_create_policy,
    bench_claim_chain,
    bench_full_workload,
    bench_audit_replay,
);
criterion_main!(benches);
