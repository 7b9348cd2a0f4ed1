use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;

use podium::competition::{self, Competition, DivisionBoard};
use podium::config::Config;
use podium::output;
use podium::score::{self, DecodeOptions, DistanceUnit, FormatOptions, Scheme, UnitOptions, WeightUnit};
use podium::scoring::{self, ScoringConfig};

const EXIT_SUCCESS: i32 = 0;
const EXIT_DATA: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
enum Format {
    #[default]
    Table,
    Tsv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show overall standings for every division
    Rank {
        /// Competition file (YAML or JSON)
        file: PathBuf,
        /// Only show this division
        #[arg(short, long)]
        division: Option<String>,
        #[arg(short, long, value_enum, default_value_t)]
        format: Format,
    },
    /// Show one event's leaderboard
    Event {
        file: PathBuf,
        event_id: String,
        #[arg(short, long)]
        division: Option<String>,
        #[arg(short, long, value_enum, default_value_t)]
        format: Format,
    },
    /// Encode a raw score ("4:05", "5+12", "225") to its stored integer
    Encode {
        scheme: Scheme,
        raw: String,
        /// Weight or distance unit of the input (lbs, kg, m, ft, km)
        #[arg(short, long)]
        unit: Option<String>,
    },
    /// Decode a stored integer for display
    Decode {
        scheme: Scheme,
        #[arg(allow_negative_numbers = true)]
        value: i64,
        #[arg(short, long)]
        unit: Option<String>,
        #[arg(long)]
        compact: bool,
        #[arg(long)]
        include_unit: bool,
    },
    /// Convert legacy scoring settings to the current config shape
    Migrate {
        file: PathBuf,
        /// Division size, used to resolve even_spread exactly
        #[arg(long)]
        athletes: Option<usize>,
        /// Write the migrated config here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check a scoring config (defaults to the one in the user config)
    Validate { file: Option<PathBuf> },
}

#[derive(Parser, Debug)]
#[command(name = "podium")]
#[command(about = "Competition scoring and leaderboard CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/podium/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn exit_with(code: i32, message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    std::process::exit(code);
}

fn apply_unit(units: &mut UnitOptions, unit: Option<&str>) {
    let Some(unit) = unit else {
        return;
    };
    if let Some(weight) = WeightUnit::parse(unit) {
        units.weight_unit = weight;
    } else if let Some(distance) = DistanceUnit::parse(unit) {
        units.distance_unit = Some(distance);
    } else {
        exit_with(EXIT_DATA, format!("Unknown unit '{}'", unit));
    }
}

fn load_competition(path: &Path) -> Competition {
    match competition::load_competition(path) {
        Ok(c) => c,
        Err(e) => exit_with(EXIT_DATA, format!("Competition error: {:#}", e)),
    }
}

/// Scoring from the competition file, else the user config, else defaults.
fn effective_scoring(competition: &Competition, config: &Config) -> ScoringConfig {
    let scoring = competition
        .scoring
        .clone()
        .or_else(|| config.scoring.clone())
        .unwrap_or_default();

    let event_ids: Vec<&str> = competition.events.iter().map(|e| e.id.as_str()).collect();
    if let Err(errors) = scoring::validate_scoring_for_events(&scoring, &event_ids) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }
    scoring
}

fn division_boards(competition: &Competition, scoring: &ScoringConfig, division: Option<&str>) -> Vec<DivisionBoard> {
    let result = match division {
        Some(d) => {
            if !competition.divisions().contains(&d) {
                exit_with(EXIT_DATA, format!("Unknown division '{}'", d));
            }
            competition::evaluate_division(competition, scoring, d).map(|b| vec![b])
        }
        None => competition::evaluate(competition, scoring),
    };
    match result {
        Ok(boards) => boards,
        Err(e) => exit_with(EXIT_CONFIG, format!("Scoring config error: {}", e)),
    }
}

fn format_options(competition: &Competition, config: &Config) -> FormatOptions {
    FormatOptions {
        weight_unit: competition.units.weight_unit,
        distance_unit: competition.units.distance_unit.or(config.display.distance_unit),
        include_unit: true,
        show_status: true,
        compact: config.display.compact,
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => exit_with(EXIT_DATA, format!("Failed to serialize output: {}", e)),
    }
}

fn main() {
    let cli = Cli::parse();
    podium::logging::init(cli.verbose);
    let start_time = Instant::now();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match podium::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => exit_with(EXIT_CONFIG, format!("Config error: {:#}", e)),
    };

    match cli.command {
        Commands::Rank { file, division, format } => {
            let competition = load_competition(&file);
            let scoring = effective_scoring(&competition, &config);
            if cli.verbose {
                eprintln!("Scoring with {}", scoring.algorithm.display_name());
            }

            // Keep warnings from interleaving with the table
            podium::logging::activate();
            let boards = division_boards(&competition, &scoring, division.as_deref());
            let use_colors = output::should_use_colors();
            match format {
                Format::Table => {
                    let tables: Vec<String> = boards
                        .iter()
                        .map(|b| output::format_standings_table(b, &competition, use_colors))
                        .collect();
                    println!("{}", tables.join("\n\n"));
                }
                Format::Tsv => {
                    for board in &boards {
                        let tsv = output::format_standings_tsv(board, &competition);
                        if !tsv.is_empty() {
                            println!("{}", tsv);
                        }
                    }
                }
                Format::Json => {
                    let values: Vec<serde_json::Value> = boards
                        .iter()
                        .map(|b| output::standings_json(b, &competition))
                        .collect();
                    print_json(&serde_json::Value::Array(values));
                }
            }
            podium::logging::flush_buffered();

            if cli.verbose {
                eprintln!("Ranked {} divisions in {:?}", boards.len(), start_time.elapsed());
            }
        }
        Commands::Event {
            file,
            event_id,
            division,
            format,
        } => {
            let competition = load_competition(&file);
            if let Err(e) = competition.event(&event_id) {
                exit_with(EXIT_DATA, e);
            }
            let scoring = effective_scoring(&competition, &config);
            let opts = format_options(&competition, &config);

            podium::logging::activate();
            let boards = division_boards(&competition, &scoring, division.as_deref());
            let use_colors = output::should_use_colors();
            let events = boards.iter().filter_map(|b| {
                b.events
                    .iter()
                    .find(|e| e.event_id == event_id)
                    .map(|e| (b.division.as_str(), e))
            });
            match format {
                Format::Table => {
                    let tables: Vec<String> = events
                        .map(|(division, event)| {
                            format!(
                                "{}\n{}",
                                division,
                                output::format_event_table(event, &competition, &opts, use_colors)
                            )
                        })
                        .collect();
                    println!("{}", tables.join("\n\n"));
                }
                Format::Tsv => {
                    for (_, event) in events {
                        println!("{}", output::format_event_tsv(event, &opts));
                    }
                }
                Format::Json => {
                    let values: Vec<serde_json::Value> = events
                        .map(|(division, event)| {
                            let mut value = output::event_json(event, &opts);
                            value["division"] = serde_json::Value::from(division);
                            value
                        })
                        .collect();
                    print_json(&serde_json::Value::Array(values));
                }
            }
            podium::logging::flush_buffered();
        }
        Commands::Encode { scheme, raw, unit } => {
            let mut units = config.display.units();
            apply_unit(&mut units, unit.as_deref());
            match score::parse_score(&raw, scheme, &units) {
                Ok(encoded) => println!("{}", encoded.value),
                Err(e) => exit_with(EXIT_DATA, e),
            }
        }
        Commands::Decode {
            scheme,
            value,
            unit,
            compact,
            include_unit,
        } => {
            let mut units = config.display.units();
            apply_unit(&mut units, unit.as_deref());
            let opts = DecodeOptions {
                units,
                include_unit,
                compact: compact || config.display.compact,
            };
            println!("{}", score::decode(value, scheme, &opts));
        }
        Commands::Migrate { file, athletes, output } => {
            let settings = match scoring::load_legacy_settings(&file) {
                Ok(s) => s,
                Err(e) => exit_with(EXIT_DATA, format!("{:#}", e)),
            };
            let migrated = scoring::migrate_legacy(&settings, athletes);
            match output {
                Some(path) => {
                    if let Err(e) = scoring::save_scoring_config(&path, &migrated) {
                        exit_with(EXIT_DATA, format!("{:#}", e));
                    }
                    eprintln!("Wrote {}", path.display());
                }
                None => match serde_json::to_string_pretty(&migrated) {
                    Ok(text) => println!("{}", text),
                    Err(e) => exit_with(EXIT_DATA, e),
                },
            }
        }
        Commands::Validate { file } => {
            let scoring = match file {
                Some(path) => match competition::load_scoring_config(&path) {
                    Ok(s) => s,
                    Err(e) => exit_with(EXIT_CONFIG, format!("{:#}", e)),
                },
                None => config.scoring.clone().unwrap_or_default(),
            };
            if let Err(errors) = scoring::validate_scoring(&scoring) {
                eprintln!("Scoring config errors:");
                for error in errors {
                    eprintln!("  - {}", error);
                }
                std::process::exit(EXIT_CONFIG);
            }
            println!("Scoring config OK ({})", scoring.algorithm.display_name());
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
