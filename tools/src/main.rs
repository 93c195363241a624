//! fraud-runner: headless driver for the fraud scoring core.
//!
//! Usage:
//!   fraud-runner --seed 12345 --cardholders 50 --days 30
//!   fraud-runner --config scoring.json --json
//!   fraud-runner --stdin-mode < commands.jsonl

use anyhow::Result;
use chrono::{DateTime, Utc};
use fraudscore_core::{
    report::SummaryReport,
    scenario::{FraudPattern, ScenarioConfig, ScenarioGenerator},
    EngineConfig, FraudAnalysisEngine, FraudAnalysisResult, RiskLevel, SharedHistory,
    Transaction, TransactionHistory,
};
use std::collections::HashMap;
use std::env;
use std::io::{self, BufRead, Write};
use uuid::Uuid;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    /// Score without recording.
    Analyze { transaction: Transaction },
    /// Score, then append to history.
    Record { transaction: Transaction },
    MarkFraud { transaction_id: String },
    Summary,
    Quit,
}

#[derive(serde::Serialize)]
struct RunSummary {
    run_id: String,
    started_at: DateTime<Utc>,
    seed: u64,
    baseline_transactions: usize,
    report: SummaryReport,
    injected: usize,
    injected_flagged: usize,
    clean_flagged: usize,
    by_pattern: Vec<(FraudPattern, usize, usize)>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let cardholders = parse_arg(&args, "--cardholders", 50usize);
    let days = parse_arg(&args, "--days", 30i64);
    let fraud_rate = parse_arg(&args, "--fraud-rate", 0.2f64);
    let workers = parse_arg(&args, "--workers", 4usize);
    let json_output = args.iter().any(|a| a == "--json");
    let stdin_mode = args.iter().any(|a| a == "--stdin-mode");

    let config = match args.windows(2).find(|w| w[0] == "--config") {
        Some(w) => EngineConfig::load(&w[1])?,
        None => EngineConfig::default(),
    };

    if stdin_mode {
        return run_ipc_loop(&config);
    }

    let run_id = Uuid::new_v4().to_string();
    let started_at = Utc::now();
    if !json_output {
        println!("fraud-runner");
        println!("  run_id:      {run_id}");
        println!("  started:     {}", started_at.to_rfc3339());
        println!("  seed:        {seed}");
        println!("  cardholders: {cardholders}");
        println!("  days:        {days}");
        println!("  fraud rate:  {fraud_rate}");
        println!();
    }

    let scenario = ScenarioGenerator::new(
        seed,
        ScenarioConfig {
            cardholders,
            days,
            fraud_rate,
            ..ScenarioConfig::default()
        },
    )
    .generate()?;

    let mut history = TransactionHistory::new();
    for tx in &scenario.history {
        history.add_transaction(tx.clone())?;
    }
    let baseline_transactions = history.len();

    // Score the first transaction of every cardholder's incoming stream in
    // parallel against the baseline, as a throughput check.
    let firsts: Vec<Transaction> = {
        let mut seen = std::collections::HashSet::new();
        scenario
            .incoming
            .iter()
            .filter(|s| seen.insert(s.transaction.cardholder_id.clone()))
            .map(|s| s.transaction.clone())
            .collect()
    };
    let preview = FraudAnalysisEngine::new(&history, config.clone())?
        .batch_analyze_parallel(&firsts, workers)?;
    log::info!("preview: {} first-of-stream transactions scored", preview.len());

    // Replay the incoming stream in order, recording as we go so bursts build up.
    let shared = SharedHistory::from_history(history);
    let mut results = Vec::with_capacity(scenario.incoming.len());
    let mut patterns = Vec::with_capacity(scenario.incoming.len());
    for item in &scenario.incoming {
        results.push(shared.analyze_and_record(&config, item.transaction.clone())?);
        patterns.push(item.pattern);
    }

    let summary = summarize(run_id, started_at, seed, baseline_transactions, &results, &patterns);
    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, &results);
    }
    Ok(())
}

fn run_ipc_loop(config: &EngineConfig) -> Result<()> {
    let shared = SharedHistory::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();
    let mut results: Vec<FraudAnalysisResult> = Vec::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };

        let reply = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Analyze { transaction } => {
                shared.analyze(config, &transaction).map(|r| serde_json::to_value(&r))
            }
            IpcCommand::Record { transaction } => {
                shared.analyze_and_record(config, transaction).map(|r| {
                    let value = serde_json::to_value(&r);
                    results.push(r);
                    value
                })
            }
            IpcCommand::MarkFraud { transaction_id } => shared
                .mark_fraud(&transaction_id)
                .map(|_| Ok(serde_json::json!({ "marked": transaction_id }))),
            IpcCommand::Summary => Ok(serde_json::to_value(SummaryReport::from_results(&results))),
        };

        match reply {
            Ok(value) => writeln!(stdout, "{}", value?)?,
            Err(e) => {
                log::warn!("command rejected: {e}");
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn summarize(
    run_id: String,
    started_at: DateTime<Utc>,
    seed: u64,
    baseline_transactions: usize,
    results: &[FraudAnalysisResult],
    patterns: &[Option<FraudPattern>],
) -> RunSummary {
    let flagged = |r: &FraudAnalysisResult| r.risk_level >= RiskLevel::Medium;

    let mut by_pattern: HashMap<FraudPattern, (usize, usize)> = HashMap::new();
    let mut injected = 0;
    let mut injected_flagged = 0;
    let mut clean_flagged = 0;
    for (result, pattern) in results.iter().zip(patterns) {
        match pattern {
            Some(p) => {
                injected += 1;
                let entry = by_pattern.entry(*p).or_insert((0, 0));
                entry.0 += 1;
                if flagged(result) {
                    injected_flagged += 1;
                    entry.1 += 1;
                }
            }
            None if flagged(result) => clean_flagged += 1,
            None => {}
        }
    }
    let mut by_pattern: Vec<(FraudPattern, usize, usize)> = by_pattern
        .into_iter()
        .map(|(p, (n, f))| (p, n, f))
        .collect();
    by_pattern.sort_by_key(|(p, _, _)| *p);

    RunSummary {
        run_id,
        started_at,
        seed,
        baseline_transactions,
        report: SummaryReport::from_results(results),
        injected,
        injected_flagged,
        clean_flagged,
        by_pattern,
    }
}

fn print_summary(summary: &RunSummary, results: &[FraudAnalysisResult]) {
    let report = &summary.report;
    println!("=== RUN SUMMARY ===");
    println!("  baseline txns:    {}", summary.baseline_transactions);
    println!("  scored txns:      {}", report.total_transactions);
    println!("  high risk:        {}", report.high_risk_transactions);
    println!("  medium risk:      {}", report.medium_risk_transactions);
    println!("  avg fraud score:  {:.3}", report.average_fraud_score);
    println!("  est. fraud txns:  {}", report.estimated_fraud_transactions);

    println!();
    println!("=== TOP INDICATORS ===");
    if report.top_fraud_indicators.is_empty() {
        println!("  (no indicators triggered)");
    }
    for (indicator, count) in &report.top_fraud_indicators {
        println!("  {indicator:<20} {count}");
    }

    println!();
    println!("=== INJECTED PATTERNS (flagged = MEDIUM or above) ===");
    for (pattern, total, flagged) in &summary.by_pattern {
        println!("  {:<20} {flagged}/{total}", format!("{pattern:?}"));
    }
    println!("  clean txns flagged: {}", summary.clean_flagged);

    println!();
    println!("=== HIGHEST RISK ===");
    let mut ranked: Vec<&FraudAnalysisResult> = results.iter().collect();
    ranked.sort_by(|a, b| b.fraud_score.total_cmp(&a.fraud_score));
    for r in ranked.iter().take(5) {
        println!(
            "  {} | {:.3} {:<8} | {} ({})",
            r.transaction_id, r.fraud_score, r.risk_level, r.recommendation, r.recommendation_reason
        );
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
