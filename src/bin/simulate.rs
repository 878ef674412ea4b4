use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use maze_chase::autopilot::Autopilot;
use maze_chase::constants::{
    PINK_SHIELD_CHARGES, SHIELD_BREAK_SCARED_DURATION_MS, TICK_MS, TICK_RATE,
};
use maze_chase::engine::{GameEngine, GameEngineOptions};
use maze_chase::types::{
    Command, GameState, GhostStatus, LevelClearPolicy, RuntimeEvent, Snapshot,
};
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_MINUTES: u64 = 5;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u64>,
    /// Tick budget per scenario. Defaults to five simulated minutes.
    #[arg(long)]
    ticks: Option<u64>,
    #[arg(long)]
    scenarios: Option<usize>,
    /// `reload` keeps cycling levels, `win` ends the run on the first clear.
    #[arg(long)]
    policy: Option<String>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    seed: u64,
    #[serde(rename = "maxTicks")]
    max_ticks: u64,
    policy: LevelClearPolicy,
}

#[derive(Clone, Debug, Default, Serialize)]
struct EventTally {
    #[serde(rename = "foodEaten")]
    food_eaten: u32,
    #[serde(rename = "powerPlusEaten")]
    power_plus_eaten: u32,
    #[serde(rename = "ghostsEaten")]
    ghosts_eaten: u32,
    #[serde(rename = "clonesFired")]
    clones_fired: u32,
    #[serde(rename = "shieldHits")]
    shield_hits: u32,
    #[serde(rename = "trapsPlaced")]
    traps_placed: u32,
    #[serde(rename = "trapsTriggered")]
    traps_triggered: u32,
    teleports: u32,
    #[serde(rename = "playerHits")]
    player_hits: u32,
    #[serde(rename = "levelsCleared")]
    levels_cleared: u32,
}

impl EventTally {
    fn record(&mut self, event: &RuntimeEvent) {
        match event {
            RuntimeEvent::FoodEaten { .. } => self.food_eaten += 1,
            RuntimeEvent::PowerPlusEaten { .. } => self.power_plus_eaten += 1,
            RuntimeEvent::GhostEaten { .. } => self.ghosts_eaten += 1,
            RuntimeEvent::CloneFired { .. } => self.clones_fired += 1,
            RuntimeEvent::ShieldHit { .. } => self.shield_hits += 1,
            RuntimeEvent::TrapPlaced { .. } => self.traps_placed += 1,
            RuntimeEvent::TrapTriggered { .. } => self.traps_triggered += 1,
            RuntimeEvent::GhostTeleported { .. } => self.teleports += 1,
            RuntimeEvent::PlayerHit { .. } => self.player_hits += 1,
            RuntimeEvent::LevelCleared { .. } => self.levels_cleared += 1,
            _ => {}
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u64,
    policy: LevelClearPolicy,
    state: GameState,
    level: u32,
    score: i32,
    lives: i32,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    ticks: u64,
    #[serde(flatten)]
    tally: EventTally,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct ScenarioRunResult {
    result: ScenarioResultLine,
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: i32,
    #[serde(rename = "averageDurationMs")]
    average_duration_ms: u64,
    #[serde(rename = "stateCounts")]
    state_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli)?;
    let started_at = Utc::now();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed_hint, started_at));
    let mut results = Vec::new();
    let mut total_anomalies = 0usize;

    for scenario in &scenarios {
        info!(
            match_id = %match_id,
            scenario = %scenario.name,
            seed = scenario.seed,
            max_ticks = scenario.max_ticks,
            "scenario started"
        );
        let run = run_scenario(scenario)?;
        for anomaly in &run.anomaly_records {
            warn!(
                match_id = %match_id,
                scenario = %scenario.name,
                tick = anomaly.tick,
                message = %anomaly.message,
                "anomaly detected"
            );
        }
        total_anomalies += run.anomaly_records.len();
        info!(
            match_id = %match_id,
            scenario = %scenario.name,
            state = ?run.result.state,
            score = run.result.score,
            level = run.result.level,
            ticks = run.result.ticks,
            "scenario finished"
        );
        println!("{}", serde_json::to_string(&run.result)?);
        results.push(run.result);
    }

    let has_anomaly = results.iter().any(|result| !result.anomalies.is_empty());
    let summary = build_run_summary(
        match_id.clone(),
        started_at,
        Utc::now(),
        results,
        total_anomalies,
    );

    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(err) = write_summary(path, &summary) {
            error!(match_id = %match_id, path = %path.display(), error = %err, "summary write failed");
            std::process::exit(2);
        }
    }

    info!(
        match_id = %match_id,
        scenarios = summary.scenario_count,
        anomalies = summary.anomaly_count,
        average_score = summary.average_score,
        "run finished"
    );

    if has_anomaly {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run_scenario(scenario: &Scenario) -> Result<ScenarioRunResult> {
    let mut engine = GameEngine::new(GameEngineOptions {
        seed: scenario.seed,
        level_clear_policy: scenario.policy,
        layout: None,
    })
    .context("reference layout failed to load")?;
    let mut pilot = Autopilot::new(&engine.get_world_init(), scenario.seed ^ 0x5eed);
    engine.handle_command(Command::StartGame);

    let mut tally = EventTally::default();
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut snapshot = engine.build_snapshot(true);

    while !engine.is_ended() && engine.tick() < scenario.max_ticks {
        for command in pilot.decide(&snapshot) {
            engine.handle_command(command);
        }
        engine.step(TICK_MS);
        snapshot = engine.build_snapshot(true);
        for message in collect_snapshot_anomalies(&snapshot, &engine) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        for event in &snapshot.events {
            tally.record(event);
        }
    }

    let summary = engine.summary();
    Ok(ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            policy: scenario.policy,
            state: summary.state,
            level: summary.level,
            score: summary.score,
            lives: summary.lives,
            duration_ms: summary.duration_ms,
            ticks: summary.ticks,
            tally,
            anomalies,
        },
        anomaly_records,
    })
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, engine: &GameEngine) -> Vec<String> {
    let mut anomalies = Vec::new();
    let level = &engine.level;
    let player = &snapshot.player;
    if player.score < 0 || player.lives < 0 || player.skill_charges < 0 {
        anomalies.push(format!(
            "player counters out of range: score={} lives={} charges={}",
            player.score, player.lives, player.skill_charges
        ));
    }
    if player.x < 0
        || player.y < 0
        || player.x + player.width > level.width()
        || player.y + player.height > level.height()
    {
        anomalies.push(format!("player left the board at ({}, {})", player.x, player.y));
    }

    for ghost in &snapshot.ghosts {
        match ghost.status {
            GhostStatus::Dead { .. } => continue,
            GhostStatus::Scared { remaining_ms } if remaining_ms > SHIELD_BREAK_SCARED_DURATION_MS => {
                anomalies.push(format!("ghost {} scared for {remaining_ms} ms", ghost.id));
            }
            _ => {}
        }
        if ghost.x < 0
            || ghost.y < 0
            || ghost.x + ghost.width > level.width()
            || ghost.y + ghost.height > level.height()
        {
            anomalies.push(format!("ghost {} left the board", ghost.id));
        }
        if ghost
            .shield
            .is_some_and(|shield| !(0..=PINK_SHIELD_CHARGES).contains(&shield))
        {
            anomalies.push(format!("ghost {} shield out of range", ghost.id));
        }
    }

    if snapshot.state == GameState::Running && snapshot.collectibles.is_empty() {
        anomalies.push("running level has no collectibles".to_string());
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Result<Vec<Scenario>> {
    let seed = cli
        .seed
        .unwrap_or_else(|| Utc::now().timestamp_millis().unsigned_abs());
    let policy = match cli.policy.as_deref() {
        Some(raw) => LevelClearPolicy::parse(raw)
            .with_context(|| format!("unknown level clear policy {raw:?}"))?,
        None => LevelClearPolicy::Reload,
    };
    let max_ticks = cli
        .ticks
        .unwrap_or(DEFAULT_MINUTES * 60 * TICK_RATE as u64)
        .max(1);
    let count = cli.scenarios.unwrap_or(2).clamp(1, 64);

    Ok((0..count)
        .map(|index| Scenario {
            name: format!("autopilot-{}", index + 1),
            seed: seed.wrapping_add(index as u64),
            max_ticks,
            policy,
        })
        .collect())
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u64, started_at: DateTime<Utc>) -> String {
    format!("sim-{seed}-{}", started_at.format("%Y%m%dT%H%M%SZ"))
}

fn state_key(state: GameState) -> String {
    match state {
        GameState::Start => "start",
        GameState::Running => "running",
        GameState::GameOver => "game_over",
        GameState::Win => "win",
    }
    .to_string()
}

fn build_run_summary(
    match_id: String,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    scenarios: Vec<ScenarioResultLine>,
    anomaly_count: usize,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let mut state_counts: BTreeMap<String, usize> = BTreeMap::new();
    for result in &scenarios {
        *state_counts.entry(state_key(result.state)).or_insert(0) += 1;
    }
    let (average_score, average_duration_ms) = if scenario_count == 0 {
        (0, 0)
    } else {
        let total_score: i64 = scenarios.iter().map(|result| result.score as i64).sum();
        let total_duration: u64 = scenarios.iter().map(|result| result.duration_ms).sum();
        (
            (total_score / scenario_count as i64) as i32,
            total_duration / scenario_count as u64,
        )
    };
    RunSummary {
        match_id,
        started_at: started_at.to_rfc3339(),
        finished_at: finished_at.to_rfc3339(),
        scenario_count,
        anomaly_count,
        average_score,
        average_duration_ms,
        state_counts,
        scenarios,
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let text = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, text)
        .with_context(|| format!("failed to write summary to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_result(state: GameState, score: i32, duration_ms: u64) -> ScenarioResultLine {
        ScenarioResultLine {
            scenario: "test".to_string(),
            seed: 42,
            policy: LevelClearPolicy::Reload,
            state,
            level: 1,
            score,
            lives: 0,
            duration_ms,
            ticks: duration_ms / TICK_MS,
            tally: EventTally::default(),
            anomalies: Vec::new(),
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 12, 30, 5)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn default_match_id_contains_seed_and_timestamp() {
        assert_eq!(default_match_id(42, fixed_time()), "sim-42-20240309T123005Z");
    }

    #[test]
    fn build_run_summary_averages_and_counts_states() {
        let summary = build_run_summary(
            "sim-42".to_string(),
            fixed_time(),
            fixed_time(),
            vec![
                make_result(GameState::GameOver, 1_000, 60_000),
                make_result(GameState::Win, 3_000, 90_000),
            ],
            1,
        );
        assert_eq!(summary.average_duration_ms, 75_000);
        assert_eq!(summary.average_score, 2_000);
        assert_eq!(summary.scenario_count, 2);
        assert_eq!(summary.state_counts.get("game_over"), Some(&1));
        assert_eq!(summary.state_counts.get("win"), Some(&1));
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!("maze-chase-missing-{}", Utc::now().timestamp_millis()))
            .join("summary.json");
        let summary = build_run_summary(
            "sim-1".to_string(),
            fixed_time(),
            fixed_time(),
            vec![make_result(GameState::GameOver, 0, 1_000)],
            0,
        );
        assert!(write_summary(&target, &summary).is_err());
    }

    #[test]
    fn push_anomaly_keeps_records_and_deduplicates_summary_messages() {
        let mut anomalies = Vec::new();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(&mut anomalies, &mut records, &mut seen, 10, "same".to_string());
        push_anomaly(&mut anomalies, &mut records, &mut seen, 11, "same".to_string());
        assert_eq!(anomalies.len(), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].tick, 11);
    }

    #[test]
    fn scenarios_follow_cli_flags() {
        let cli = Cli::parse_from([
            "simulate",
            "--seed",
            "7",
            "--ticks",
            "200",
            "--scenarios",
            "3",
            "--policy",
            "win",
        ]);
        let scenarios = resolve_scenarios(&cli).expect("valid flags");
        assert_eq!(scenarios.len(), 3);
        assert_eq!(scenarios[2].seed, 9);
        assert!(scenarios
            .iter()
            .all(|s| s.max_ticks == 200 && s.policy == LevelClearPolicy::Win));

        let bad = Cli::parse_from(["simulate", "--policy", "forever"]);
        assert!(resolve_scenarios(&bad).is_err());
    }

    #[test]
    fn short_scenario_runs_clean() {
        let scenario = Scenario {
            name: "smoke".to_string(),
            seed: 5,
            max_ticks: 400,
            policy: LevelClearPolicy::Reload,
        };
        let run = run_scenario(&scenario).expect("scenario should run");
        assert!(run.result.ticks <= 400);
        assert!(run.result.tally.food_eaten + run.result.tally.power_plus_eaten > 0);
        assert!(run.result.anomalies.is_empty(), "{:?}", run.result.anomalies);
    }
}
