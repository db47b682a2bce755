//! Command-line driver for the scene populator
//!
//! Runs population requests against an in-memory world (a dry run) and
//! prints what would have been created.

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use scene_populator::foundation::logging;
use scene_populator::prelude::*;
use std::path::PathBuf;

const DEFAULT_PATTERN_COUNT: usize = 10;

#[derive(Debug)]
struct RoomArgs {
    room_type: String,
    size: Vec3,
    theme: Option<String>,
    density: f64,
}

#[derive(Debug)]
struct PatternArgs {
    pattern: String,
    asset: String,
    count: usize,
    spacing: Option<f64>,
    radius: Option<f64>,
}

#[derive(Debug, Default)]
struct RunConfig {
    config_file: Option<PathBuf>,
    settings_file: Option<PathBuf>,
    seed: Option<u64>,
    log_level: Option<String>,
    room: Option<RoomArgs>,
    pattern: Option<PatternArgs>,
    station_interior: Option<String>,
    sector: bool,
    sector_assets: Option<PathBuf>,
    export: Option<PathBuf>,
    keep: bool,
}

fn cli() -> Command {
    Command::new("populate")
        .about("Procedurally places assets and reports what a world would receive")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Population config (.yaml, .yml, .toml, .ron or .csv)"),
        )
        .arg(
            Arg::new("settings")
                .long("settings")
                .value_name("FILE")
                .help("Populator settings file (.toml, .ron or .yaml)"),
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .value_name("SEED")
                .value_parser(clap::value_parser!(u64))
                .help("Seed for reproducible layouts"),
        )
        .arg(
            Arg::new("room")
                .long("room")
                .value_name("TYPE")
                .help("Furnish one room of this type at the origin"),
        )
        .arg(
            Arg::new("size")
                .long("size")
                .value_name("W,L,H")
                .requires("room")
                .help("Room size"),
        )
        .arg(
            Arg::new("theme")
                .long("theme")
                .value_name("THEME")
                .requires("room")
                .help("Room theme"),
        )
        .arg(
            Arg::new("density")
                .long("density")
                .value_name("MULTIPLIER")
                .value_parser(clap::value_parser!(f64))
                .default_value("1.0")
                .help("Prop density multiplier for --room"),
        )
        .arg(
            Arg::new("pattern")
                .short('p')
                .long("pattern")
                .value_name("NAME")
                .requires("asset")
                .help("Lay out --asset with a pattern (grid, random, cluster, orbit, spiral, line, belt)"),
        )
        .arg(
            Arg::new("asset")
                .short('a')
                .long("asset")
                .value_name("REFERENCE")
                .requires("pattern")
                .help("Asset reference for --pattern"),
        )
        .arg(
            Arg::new("count")
                .short('n')
                .long("count")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help("Number of instances for --pattern"),
        )
        .arg(
            Arg::new("spacing")
                .long("spacing")
                .value_name("UNITS")
                .value_parser(clap::value_parser!(f64))
                .help("Pattern spacing"),
        )
        .arg(
            Arg::new("radius")
                .long("radius")
                .value_name("UNITS")
                .value_parser(clap::value_parser!(f64))
                .help("Pattern radius"),
        )
        .arg(
            Arg::new("station-interior")
                .long("station-interior")
                .value_name("LAYOUT")
                .help("Build a complete station interior (hub)"),
        )
        .arg(
            Arg::new("sector")
                .long("sector")
                .action(ArgAction::SetTrue)
                .help("Populate a complete sector around the origin"),
        )
        .arg(
            Arg::new("sector-assets")
                .long("sector-assets")
                .value_name("FILE")
                .requires("sector")
                .help("Sector asset table (.toml, .ron or .yaml)"),
        )
        .arg(
            Arg::new("export")
                .short('o')
                .long("export")
                .value_name("CSV")
                .help("Write every created instance to a CSV file"),
        )
        .arg(
            Arg::new("keep")
                .long("keep")
                .action(ArgAction::SetTrue)
                .help("Leave instances in the world instead of clearing them at exit"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level when RUST_LOG is not set (error, warn, info, debug, trace)"),
        )
}

fn parse_triple(text: &str) -> Result<Vec3> {
    let values = text
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid number in '{text}'"))?;

    match values[..] {
        [x, y, z] => Ok(Vec3::new(x, y, z)),
        _ => bail!("Expected three comma separated values, got '{text}'"),
    }
}

fn run_config(matches: &ArgMatches, settings: &PopulatorSettings) -> Result<RunConfig> {
    let room = match matches.get_one::<String>("room") {
        Some(room_type) => {
            let size = match matches.get_one::<String>("size") {
                Some(text) => parse_triple(text)?,
                None => Vec3::from(settings.room_defaults.size),
            };
            Some(RoomArgs {
                room_type: room_type.clone(),
                size,
                theme: matches.get_one::<String>("theme").cloned(),
                density: matches.get_one::<f64>("density").copied().unwrap_or(1.0),
            })
        }
        None => None,
    };

    let pattern = match (matches.get_one::<String>("pattern"), matches.get_one::<String>("asset")) {
        (Some(pattern), Some(asset)) => Some(PatternArgs {
            pattern: pattern.clone(),
            asset: asset.clone(),
            count: matches.get_one::<usize>("count").copied().unwrap_or(DEFAULT_PATTERN_COUNT),
            spacing: matches.get_one::<f64>("spacing").copied(),
            radius: matches.get_one::<f64>("radius").copied(),
        }),
        _ => None,
    };

    Ok(RunConfig {
        config_file: matches.get_one::<String>("config").map(PathBuf::from),
        settings_file: matches.get_one::<String>("settings").map(PathBuf::from),
        seed: matches.get_one::<u64>("seed").copied(),
        log_level: matches.get_one::<String>("log-level").cloned(),
        room,
        pattern,
        station_interior: matches.get_one::<String>("station-interior").cloned(),
        sector: matches.get_flag("sector"),
        sector_assets: matches.get_one::<String>("sector-assets").map(PathBuf::from),
        export: matches.get_one::<String>("export").map(PathBuf::from),
        keep: matches.get_flag("keep"),
    })
}

fn load_settings(matches: &ArgMatches) -> Result<PopulatorSettings> {
    let mut settings = match matches.get_one::<String>("settings") {
        Some(path) => PopulatorSettings::load_from_file(path)
            .with_context(|| format!("Failed to load settings from {path}"))?,
        None => PopulatorSettings::default(),
    };

    if let Some(seed) = matches.get_one::<u64>("seed") {
        settings.seed = Some(*seed);
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        settings.log_level = level.clone();
    }

    settings.validate().context("Invalid populator settings")?;
    Ok(settings)
}

fn run(config: &RunConfig, settings: PopulatorSettings) -> Result<()> {
    if config.config_file.is_none()
        && config.room.is_none()
        && config.pattern.is_none()
        && config.station_interior.is_none()
        && !config.sector
    {
        bail!("Nothing to populate: pass --config, --room, --pattern, --station-interior or --sector");
    }

    let loader = ConfigLoader::from_settings(&settings);
    let default_theme = settings.default_theme.clone();
    let mut composer = SceneComposer::with_settings(InMemoryWorld::new(), settings);

    if let Some(path) = &config.config_file {
        let parsed = loader
            .load(path)
            .with_context(|| format!("Failed to load population config {}", path.display()))?;
        composer.populate_from_config(&parsed);
    }

    if let Some(room) = &config.room {
        let theme = room.theme.as_deref().unwrap_or(&default_theme);
        composer.populate_room(&room.room_type, Vec3::zeros(), room.size, theme, room.density);
    }

    if let Some(args) = &config.pattern {
        let mut spec = PatternSpec::new(args.pattern.as_str(), args.count);
        if let Some(spacing) = args.spacing {
            spec = spec.with_param("spacing", spacing);
        }
        if let Some(radius) = args.radius {
            spec = spec.with_param("radius", radius);
        }
        composer
            .spawn_pattern(&args.asset, &spec, 0.0, 0.0)
            .with_context(|| format!("Failed to lay out {} with pattern {}", args.asset, args.pattern))?;
    }

    if let Some(layout) = &config.station_interior {
        composer
            .populate_station_interior(layout, &default_theme)
            .with_context(|| format!("Failed to build station interior '{layout}'"))?;
    }

    if config.sector {
        let assets = match &config.sector_assets {
            Some(path) => SectorAssets::load_from_file(path)
                .with_context(|| format!("Failed to load sector assets from {}", path.display()))?,
            None => SectorAssets::default(),
        };
        let sector = composer.populate_complete_sector(&assets);
        println!("Sector instances: {}", sector.total());
    }

    if let Some(path) = &config.export {
        let written = composer
            .export_csv(path)
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        println!("Exported {written} instances to {}", path.display());
    }

    let report = *composer.report();
    println!("Batch summary: {report}");
    println!("Instances in world: {}", composer.gateway().len());

    if !config.keep {
        composer.clear_all();
    }
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let settings = load_settings(&matches)?;
    logging::init_with_level(&settings.log_level);

    let config = run_config(&matches, &settings)?;
    log::debug!("Run configuration: {:?}", config);
    if let Some(path) = &config.settings_file {
        log::info!("Using settings from {}", path.display());
    }
    if let Some(seed) = config.seed {
        log::info!("Using seed {}", seed);
    }
    if let Some(level) = &config.log_level {
        log::debug!("Log level override: {}", level);
    }

    run(&config, settings)
}
