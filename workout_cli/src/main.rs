use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};
use uuid::Uuid;
use workout_core::*;

#[derive(Parser)]
#[command(name = "stepwork")]
#[command(about = "Step-by-step workout session runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Show informational log output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the workout days (default)
    Days,

    /// Run a workout day set by set
    Run {
        /// Day number, starting at 1
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        day: u64,

        /// Half the sets, shorter pauses, more calories per set
        #[arg(long)]
        fat_burner: bool,

        /// Auto-complete (for testing) - finish every set without input
        #[arg(long)]
        auto: bool,
    },

    /// Show totals over recorded workouts
    Stats {
        /// Only include the last N days
        #[arg(long, conflicts_with_all = ["from", "to"])]
        days: Option<i64>,

        #[command(flatten)]
        range: DateRange,
    },

    /// List or delete logged sessions
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Roll up WAL sessions to CSV
    Rollup {
        /// Clean up processed WAL files after rollup
        #[arg(long)]
        cleanup: bool,
    },

    /// Body-weight log
    Weight {
        #[command(subcommand)]
        command: WeightCommand,
    },

    /// Customise the workout plan
    Plan {
        #[command(subcommand)]
        command: PlanCommand,
    },
}

/// Inclusive calendar-date bounds, in UTC
#[derive(Args)]
struct DateRange {
    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl DateRange {
    /// `[start, end)` timestamps covering the selected days
    fn bounds(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
        let start = self.from.and_then(midnight);
        let end = self.to.and_then(|d| d.succ_opt()).and_then(midnight);
        (start, end)
    }
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List logged sessions, newest first
    List {
        #[command(flatten)]
        range: DateRange,
    },
    /// Delete a logged session by id
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum WeightCommand {
    /// Record today's weight, e.g. "82.5" or "82,5 kg"
    Add {
        weight: String,

        #[arg(long)]
        notes: Option<String>,
    },
    /// List recorded weights, oldest first
    List,
    /// Show progress since the first entry
    Stats,
}

#[derive(Subcommand)]
enum PlanCommand {
    /// Discard customisations and return to the built-in program
    Reset,
    /// Remove one exercise from a day
    Remove {
        /// Day number, starting at 1
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        day: u64,

        /// Exercise number within the day, starting at 1
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        exercise: u64,
    },
    /// Append a new exercise to a day
    Add {
        /// Day number, starting at 1
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        day: u64,

        #[arg(long)]
        name: String,

        #[command(flatten)]
        fields: ExerciseFields,
    },
    /// Change fields of an existing exercise
    Update {
        /// Day number, starting at 1
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        day: u64,

        /// Exercise number within the day, starting at 1
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        exercise: u64,

        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: ExerciseFields,
    },
}

/// Exercise attributes settable from the command line
#[derive(Args)]
struct ExerciseFields {
    /// Display text such as "3 × 12"
    #[arg(long)]
    label: Option<String>,

    /// Equipment text, e.g. "2 × 10 kg dumbbells" (empty to clear)
    #[arg(long)]
    equipment: Option<String>,

    /// Instructions (empty to clear)
    #[arg(long)]
    description: Option<String>,

    /// Calories per set, as MIN-MAX or a single number
    #[arg(long, value_parser = parse_calorie_range)]
    calories: Option<(u32, u32)>,

    /// Number of sets
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    sets: Option<u32>,

    /// Seconds per timed set (0 makes the exercise untimed)
    #[arg(long)]
    duration: Option<u32>,
}

impl ExerciseFields {
    fn apply(self, exercise: &mut Exercise) {
        let non_empty = |s: String| Some(s).filter(|s| !s.trim().is_empty());

        if let Some(label) = self.label {
            exercise.sets_label = label;
        }
        if let Some(equipment) = self.equipment {
            exercise.equipment = non_empty(equipment);
        }
        if let Some(description) = self.description {
            exercise.description = non_empty(description);
        }
        if let Some(calories) = self.calories {
            exercise.calories_per_set = calories;
        }
        if let Some(sets) = self.sets {
            exercise.total_sets = Some(sets);
        }
        match self.duration {
            Some(0) => {
                exercise.is_timed = false;
                exercise.duration_seconds = None;
            }
            Some(seconds) => {
                exercise.is_timed = true;
                exercise.duration_seconds = Some(seconds);
            }
            None => {}
        }
    }

    /// A new exercise; unset fields get three sets and a generated label
    fn into_exercise(self, name: String) -> Exercise {
        let mut exercise = Exercise {
            name,
            sets_label: String::new(),
            equipment: None,
            description: None,
            calories_per_set: (0, 0),
            total_sets: None,
            is_timed: false,
            duration_seconds: None,
            video_ref: None,
        };
        self.apply(&mut exercise);

        if exercise.sets_label.trim().is_empty() {
            let sets = *exercise.total_sets.get_or_insert(3);
            exercise.sets_label = match exercise.duration_seconds {
                Some(seconds) if exercise.is_timed => format!("{} × {} sec", sets, seconds),
                _ => format!("{} sets", sets),
            };
        }
        exercise
    }
}

fn parse_calorie_range(input: &str) -> std::result::Result<(u32, u32), String> {
    let number = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|_| format!("'{}' is not a calorie count", s.trim()))
    };

    let (min, max) = match input.split_once('-') {
        Some((min, max)) => (number(min)?, number(max)?),
        None => {
            let n = number(input)?;
            (n, n)
        }
    };
    if min > max {
        return Err(format!("minimum {} is above maximum {}", min, max));
    }
    Ok((min, max))
}

/// File layout under the data directory
struct DataPaths {
    wal_dir: PathBuf,
    wal: PathBuf,
    csv: PathBuf,
    plan: PathBuf,
    weight: PathBuf,
}

impl DataPaths {
    fn new(data_dir: &Path) -> Self {
        let wal_dir = data_dir.join("wal");
        Self {
            wal: wal_dir.join("sessions.wal"),
            wal_dir,
            csv: data_dir.join("sessions.csv"),
            plan: data_dir.join("plan.json"),
            weight: data_dir.join("weight.json"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    workout_core::logging::init_with_level(if cli.verbose { "info" } else { "warn" });

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let paths = DataPaths::new(&data_dir);

    match cli.command {
        Some(Commands::Days) | None => cmd_days(&paths),
        Some(Commands::Run {
            day,
            fat_burner,
            auto,
        }) => cmd_run(&paths, &config, day, fat_burner, auto),
        Some(Commands::Stats { days, range }) => cmd_stats(&paths, days, &range),
        Some(Commands::History { command }) => cmd_history(&paths, command),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(&paths, cleanup),
        Some(Commands::Weight { command }) => cmd_weight(&paths, command),
        Some(Commands::Plan { command }) => cmd_plan(&paths, command),
    }
}

fn cmd_days(paths: &DataPaths) -> Result<()> {
    let store = PlanStore::new(&paths.plan);
    let catalog = store.load()?;

    if store.is_customised() && catalog != build_default_catalog() {
        println!("(custom plan)");
    }

    for (i, day) in catalog.days.iter().enumerate() {
        let sets = day
            .exercises
            .iter()
            .fold(0u32, |acc, e| acc.saturating_add(e.set_count()));
        println!();
        println!("{}. {}", i + 1, day.title);
        println!("   {} exercises, {} sets", day.exercises.len(), sets);
        for (j, exercise) in day.exercises.iter().enumerate() {
            println!("   {}) {} | {}", j + 1, exercise.name, exercise.sets_label);
        }
    }

    Ok(())
}

fn cmd_run(
    paths: &DataPaths,
    config: &Config,
    day: u64,
    fat_burner: bool,
    auto: bool,
) -> Result<()> {
    let catalog = PlanStore::new(&paths.plan).load()?;
    let day_index = (day - 1) as usize;

    let options = SessionOptions::from_config(config, fat_burner);
    let mut session = WorkoutSession::start(&catalog, day_index, options)?.with_hooks(
        TerminalHooks {
            bell: !auto,
            warnings: 0,
        },
    );

    let mut screen = Screen {
        live_clock: !auto,
        clock_shown: false,
    };
    screen.header(&session);
    screen.step(&session);

    if auto {
        run_auto(&mut session, &mut screen);
    } else {
        screen.line("Enter = set done, 's' + Enter = skip rest, 'q' + Enter = quit");
        run_interactive(&mut session, &mut screen);
    }

    tracing::debug!("{} timer warnings", session.hooks().warnings);

    match session.close() {
        SessionOutcome::Finished(summary) => {
            display_summary(&summary);

            let mut sink = JsonlSink::new(&paths.wal);
            match sink.save_session_summary(&summary) {
                Ok(()) => println!("\n✓ Session saved"),
                Err(e) => eprintln!("\n⚠ Could not save session: {}", e),
            }
        }
        SessionOutcome::Cancelled {
            completed_sets,
            accumulated_calories,
        } => {
            screen.line(format!(
                "\nSession ended early after {} sets ({} kcal). Nothing was saved.",
                completed_sets, accumulated_calories
            ));
        }
    }

    Ok(())
}

fn run_auto(session: &mut WorkoutSession<TerminalHooks>, screen: &mut Screen) {
    while session.phase() != SessionPhase::Complete {
        let event = match session.phase() {
            SessionPhase::Active if !session.current_exercise().is_timed => session.complete_set(),
            _ => session.tick(),
        };
        screen.event(session, &event);
    }
}

/// Returns when the workout completes, the user quits, or stdin closes
fn run_interactive(session: &mut WorkoutSession<TerminalHooks>, screen: &mut Screen) {
    let (tx, rx) = mpsc::channel::<String>();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let second = Duration::from_secs(1);
    let mut next_tick = Instant::now() + second;

    while session.phase() != SessionPhase::Complete {
        let wait = next_tick.saturating_duration_since(Instant::now());
        match rx.recv_timeout(wait) {
            Ok(line) => {
                let event = match line.trim().to_lowercase().as_str() {
                    "q" => return,
                    "s" => session.skip_rest(),
                    _ => session.complete_set(),
                };
                if event == SessionEvent::Ignored {
                    screen.hint(session);
                }
                screen.event(session, &event);
            }
            Err(RecvTimeoutError::Timeout) => {
                next_tick += second;
                let event = session.tick();
                screen.event(session, &event);
            }
            Err(RecvTimeoutError::Disconnected) => {
                tracing::info!("Input closed, leaving session");
                return;
            }
        }
    }
}

struct TerminalHooks {
    bell: bool,
    warnings: u32,
}

impl SessionHooks for TerminalHooks {
    fn on_timer_warning(&mut self, seconds_remaining: u32) {
        self.warnings += 1;
        if self.bell {
            print!("\x07");
        }
        tracing::debug!("{}s left", seconds_remaining);
    }

    fn on_set_complete(&mut self, calories_earned: u32) {
        tracing::debug!("+{} kcal", calories_earned);
    }
}

/// Terminal output for a running session
struct Screen {
    live_clock: bool,
    clock_shown: bool,
}

impl Screen {
    fn line(&mut self, text: impl std::fmt::Display) {
        if self.clock_shown {
            println!();
            self.clock_shown = false;
        }
        println!("{}", text);
    }

    fn clock(&mut self, remaining: u32) {
        if !self.live_clock {
            return;
        }
        print!("\r  ⏱ {}  ", format_clock(remaining));
        let _ = io::stdout().flush();
        self.clock_shown = true;
    }

    fn header<H: SessionHooks>(&mut self, session: &WorkoutSession<H>) {
        self.line("\n╭─────────────────────────────────────────╮");
        self.line(format!("│  {}", session.day().title));
        self.line("╰─────────────────────────────────────────╯");
        let mode = if session.fat_burner() { ", fat burner" } else { "" };
        self.line(format!(
            "  {} exercises, {} sets{}",
            session.day().exercises.len(),
            session.total_sets(),
            mode
        ));
    }

    fn step<H: SessionHooks>(&mut self, session: &WorkoutSession<H>) {
        let exercise = session.current_exercise();

        if session.set_index() == 0 {
            self.line("");
            self.line(format!(
                "▶ {}/{}: {}",
                session.exercise_index() + 1,
                session.day().exercises.len(),
                exercise.name
            ));
            self.line(format!("  {}", exercise.sets_label));
            if let Some(ref equipment) = exercise.equipment {
                self.line(format!("  Equipment: {}", equipment));
            }
            if let Some(ref description) = exercise.description {
                self.line(format!("  {}", description));
            }
        }

        let kind = if exercise.is_timed { " (timed)" } else { "" };
        self.line(format!(
            "  Set {}/{}{}",
            session.set_index() + 1,
            session.current_set_count(),
            kind
        ));
    }

    fn hint<H: SessionHooks>(&mut self, session: &WorkoutSession<H>) {
        let text = match session.phase() {
            SessionPhase::Active => "  Timed set: it ends with the countdown",
            SessionPhase::TransitioningExercise => "  Next exercise starts when the countdown ends",
            SessionPhase::Resting => "  Resting: 's' + Enter to skip",
            SessionPhase::Complete => return,
        };
        self.line(text);
    }

    fn event<H: SessionHooks>(&mut self, session: &WorkoutSession<H>, event: &SessionEvent) {
        match *event {
            SessionEvent::Ignored => {}
            SessionEvent::Tick { remaining } | SessionEvent::Warning { remaining } => {
                self.clock(remaining)
            }
            SessionEvent::Resting { calories, seconds } => self.line(format!(
                "  ✓ Set done (+{} kcal). Rest {}s",
                calories, seconds
            )),
            SessionEvent::Transitioning { calories, seconds } => {
                let next = session
                    .day()
                    .exercises
                    .get(session.exercise_index() + 1)
                    .map(|e| e.name.as_str())
                    .unwrap_or("?");
                self.line(format!(
                    "  ✓ Exercise done (+{} kcal). Next: {} in {}s",
                    calories, next, seconds
                ));
            }
            SessionEvent::Completed { calories } => {
                self.line(format!("  ✓ Final set done (+{} kcal)", calories))
            }
            SessionEvent::Resumed { .. } => self.step(session),
        }
    }
}

fn display_summary(summary: &SessionSummary) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  WORKOUT COMPLETE");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", summary.title);
    if summary.fat_burner {
        println!("  Fat burner mode");
    }
    println!("  Calories: {} kcal", summary.total_calories);
    println!("  Duration: {}", format_clock(summary.duration_seconds));
    println!("  Exercises: {}", summary.exercise_count);
    println!(
        "  Estimated weight lifted: {:.0} kg",
        summary.estimated_weight_lifted
    );
    println!();
    for exercise in &summary.per_exercise {
        if exercise.weight > 0.0 {
            println!(
                "  {} x{} sets, ~{:.0} kg",
                exercise.name, exercise.completed_sets, exercise.weight
            );
        } else {
            println!("  {} x{} sets", exercise.name, exercise.completed_sets);
        }
    }
}

fn cmd_stats(paths: &DataPaths, days: Option<i64>, range: &DateRange) -> Result<()> {
    let summaries = match days {
        Some(_) => load_recent_summaries(&paths.wal, &paths.csv, days)?,
        None => {
            let (from, until) = range.bounds();
            load_summaries_in_range(&paths.wal, &paths.csv, from, until)?
        }
    };
    let stats = WorkoutStats::from_summaries(&summaries);

    if stats.total_workouts == 0 {
        println!("No workouts recorded yet.");
        return Ok(());
    }

    println!("Workouts: {}", stats.total_workouts);
    println!("Calories: {} kcal", stats.total_calories);
    println!(
        "Time: {}h {:02}m",
        stats.total_duration_seconds / 3600,
        stats.total_duration_seconds % 3600 / 60
    );
    println!(
        "Estimated weight lifted: {:.0} kg",
        stats.total_weight_lifted
    );
    if let Some(last) = stats.last_workout_date {
        println!("Last workout: {}", last.format("%Y-%m-%d"));
    }

    let by_exercise = workout_core::history::weight_lifted_by_exercise(&summaries);
    if !by_exercise.is_empty() {
        println!();
        for (name, weight) in &by_exercise {
            println!("  {}: {:.0} kg", name, weight);
        }
    }

    Ok(())
}

fn cmd_history(paths: &DataPaths, command: HistoryCommand) -> Result<()> {
    match command {
        HistoryCommand::List { range } => {
            let (from, until) = range.bounds();
            let summaries = load_summaries_in_range(&paths.wal, &paths.csv, from, until)?;
            if summaries.is_empty() {
                println!("No workouts recorded yet.");
            }
            for summary in &summaries {
                let mode = if summary.fat_burner { " (fat burner)" } else { "" };
                println!(
                    "{}  {}  {}{}  {} kcal",
                    summary.date.format("%Y-%m-%d %H:%M"),
                    summary.id,
                    summary.title,
                    mode,
                    summary.total_calories
                );
            }
        }
        HistoryCommand::Delete { id } => {
            if delete_summary(&paths.wal, &paths.csv, id)? {
                println!("✓ Deleted session {}", id);
            } else {
                println!("No session with id {}", id);
            }
        }
    }

    Ok(())
}

fn cmd_rollup(paths: &DataPaths, cleanup: bool) -> Result<()> {
    if !paths.wal.exists() {
        println!("No WAL file found - nothing to roll up.");
        return Ok(());
    }

    let count = workout_core::csv_rollup::wal_to_csv_and_archive(&paths.wal, &paths.csv)?;

    println!("✓ Rolled up {} sessions to CSV", count);
    println!("  CSV: {}", paths.csv.display());

    if cleanup {
        let cleaned = workout_core::csv_rollup::cleanup_processed_wals(&paths.wal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed WAL files", cleaned);
        }
    }

    Ok(())
}

fn cmd_weight(paths: &DataPaths, command: WeightCommand) -> Result<()> {
    let mut log = WeightLog::load(&paths.weight)?;

    match command {
        WeightCommand::Add { weight, notes } => {
            let kg = parse_weight(&weight)?;
            let record = log.add(kg, chrono::Utc::now(), notes)?;
            println!("✓ Recorded {:.1} kg", record.weight_kg);
        }
        WeightCommand::List => {
            if log.is_empty() {
                println!("No weights recorded yet.");
            }
            for record in log.records() {
                let notes = record.notes.as_deref().unwrap_or("");
                println!(
                    "{}  {:>6.1} kg  {}",
                    record.recorded_at.format("%Y-%m-%d"),
                    record.weight_kg,
                    notes
                );
            }
        }
        WeightCommand::Stats => match log.stats() {
            None => println!("No weights recorded yet."),
            Some(stats) => {
                println!("Current: {:.1} kg", stats.current);
                println!("Initial: {:.1} kg", stats.initial);
                println!(
                    "Change: {:+.1} kg ({:+.1}%)",
                    stats.change, stats.change_percentage
                );
                println!("Lowest: {:.1} kg", stats.lowest);
                println!("Highest: {:.1} kg", stats.highest);
            }
        },
    }

    Ok(())
}

fn cmd_plan(paths: &DataPaths, command: PlanCommand) -> Result<()> {
    let store = PlanStore::new(&paths.plan);

    match command {
        PlanCommand::Reset => {
            if store.reset()? {
                println!("✓ Custom plan removed, using the built-in program");
            } else {
                println!("No custom plan - already using the built-in program.");
            }
        }
        PlanCommand::Remove { day, exercise } => {
            let removed = store.remove_exercise((day - 1) as usize, (exercise - 1) as usize)?;
            println!("✓ Removed '{}' from day {}", removed.name, day);
        }
        PlanCommand::Add { day, name, fields } => {
            let exercise = fields.into_exercise(name);
            let name = exercise.name.clone();
            let day_index = (day - 1) as usize;
            let catalog = store.add_exercise(day_index, exercise)?;
            let position = catalog.days.get(day_index).map_or(0, |d| d.exercises.len());
            println!("✓ Added '{}' to day {} as exercise {}", name, day, position);
        }
        PlanCommand::Update {
            day,
            exercise,
            name,
            fields,
        } => {
            let (day_index, exercise_index) = ((day - 1) as usize, (exercise - 1) as usize);
            let mut updated = store
                .load()?
                .days
                .get(day_index)
                .and_then(|d| d.exercises.get(exercise_index))
                .cloned()
                .ok_or_else(|| {
                    Error::Plan(format!("no exercise {} on day {}", exercise, day))
                })?;
            if let Some(name) = name {
                updated.name = name;
            }
            fields.apply(&mut updated);

            let name = updated.name.clone();
            store.update_exercise(day_index, exercise_index, updated)?;
            println!("✓ Updated exercise {} of day {}: {}", exercise, day, name);
        }
    }

    Ok(())
}
