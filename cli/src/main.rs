use std::{
    io::{self, stdout},
    path::PathBuf,
    time::{Duration, Instant},
};

use clap::{Parser, Subcommand};
use crossterm::{
    cursor::{MoveLeft, MoveRight, MoveUp},
    execute,
    style::{Attribute, Color as TermColor, SetBackgroundColor, Stylize},
};
use env_logger::TimestampPrecision;
use log::{info, LevelFilter};
use spinners::Spinner;
use twophase::{
    cache,
    cubie::CubieCube,
    error::Error,
    facelet::{Color, FaceCube},
    scramble::{gen_scramble, random_cube, scramble_from_str, scramble_to_str},
    solver::{solve_cubie, SearchPolicy, SolverConfig, Tables},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
struct Cli {
    /// Increase logging verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "solves the cube using two-phase algorithm")]
    #[clap(group(
    clap::ArgGroup::new("state")
        .required(true)
        .args(&["scramble", "facelet"]),
    ))]
    Solve {
        #[arg(short, long)]
        scramble: Option<String>,

        #[arg(short, long)]
        facelet: Option<String>,

        /// Maximal number of moves
        #[arg(short, long, default_value_t = 24)]
        max: usize,

        /// Search time limit in seconds
        #[arg(short, long)]
        timeout: Option<f32>,

        /// Keep searching until a solution with at most this many moves is found
        #[arg(long, conflicts_with = "first")]
        target: Option<usize>,

        /// Return the first solution found
        #[arg(long)]
        first: bool,

        /// Print a dot between the phase 1 and phase 2 moves
        #[arg(long)]
        separator: bool,

        /// Table cache file
        #[arg(short, long)]
        cache: Option<PathBuf>,

        #[arg(short, long)]
        preview: bool,
    },

    #[command(about = "generates a random cube and a random scramble")]
    Scramble {
        #[arg(short, long, default_value_t = 20)]
        number: usize,
        #[arg(short, long)]
        preview: bool,
    },

    #[command(about = "builds the table cache")]
    Tables {
        /// Table cache file
        #[arg(short, long)]
        cache: Option<PathBuf>,

        /// Build the tables even if the cache file is valid
        #[arg(short, long)]
        rebuild: bool,
    },
}

struct SolveArgs<'a> {
    scramble: &'a Option<String>,
    facelet: &'a Option<String>,
    cache: &'a Option<PathBuf>,
    preview: bool,
}

fn solve(args: SolveArgs, config: &SolverConfig) -> Result<(), Error> {
    let state = if let Some(scramble) = args.scramble {
        let moves = scramble_from_str(scramble)?;
        CubieCube::default().apply_moves(&moves)
    } else if let Some(facelet) = args.facelet {
        CubieCube::try_from(facelet.as_str())?
    } else {
        return Ok(());
    };
    if args.preview {
        print_facelet(&FaceCube::from(&state))?;
    }
    let tables = Tables::load_or_build(cache::cache_path(args.cache.as_deref()));

    let start = Instant::now();
    let mut spinner = Spinner::new(spinners::Spinners::Dots, "Solving".to_owned());
    let result = solve_cubie(&tables, &state, config);
    spinner.stop_with_newline();
    let result = result?;

    println!(
        "Solution: {}",
        result.to_string_with_separator(config.separator)
    );
    println!(
        "Move count: {} ({} + {})",
        result.len(),
        result.phase1_length,
        result.phase2().len()
    );
    println!("Solve time: {:?}", result.solve_time);
    println!("Total time: {:?}", start.elapsed());
    Ok(())
}

fn color_to_termcolor(color: Color) -> TermColor {
    match color {
        Color::U => TermColor::White,
        Color::R => TermColor::Red,
        Color::F => TermColor::Green,
        Color::D => TermColor::Yellow,
        Color::L => TermColor::Magenta,
        Color::B => TermColor::Blue,
    }
}

fn print_face(face: &[Color], offset: u16) -> Result<(), io::Error> {
    for row in face.chunks(3) {
        let layer = format!(
            "{}  {}  {}  {}",
            SetBackgroundColor(color_to_termcolor(row[0])),
            SetBackgroundColor(color_to_termcolor(row[1])),
            SetBackgroundColor(color_to_termcolor(row[2])),
            SetBackgroundColor(TermColor::Reset)
        );

        println!("{layer}");

        if offset != 0 {
            execute!(stdout(), MoveRight(offset))?;
        }
    }

    Ok(())
}

/// Print the net of the cube: U on top, then L, F, R, B side by side, D at the bottom.
fn print_facelet(facelet: &FaceCube) -> Result<(), io::Error> {
    let stdout = stdout();

    println!();
    execute!(&stdout, MoveRight(6))?;
    print_face(&facelet.f[0..9], 6)?; // U
    execute!(&stdout, MoveLeft(6))?;
    print_face(&facelet.f[36..45], 0)?; // L
    execute!(&stdout, MoveRight(6), MoveUp(3))?;
    print_face(&facelet.f[18..27], 6)?; // F
    execute!(&stdout, MoveLeft(12), MoveUp(3), MoveRight(12))?;
    print_face(&facelet.f[9..18], 12)?; // R
    execute!(&stdout, MoveLeft(12), MoveUp(3), MoveRight(18))?;
    print_face(&facelet.f[45..54], 18)?; // B
    execute!(&stdout, MoveLeft(12))?;
    print_face(&facelet.f[27..36], 6)?; // D
    execute!(&stdout, MoveLeft(12))?;
    println!();

    Ok(())
}

fn scramble(number: usize, preview: bool) -> Result<(), Error> {
    let facelets = random_cube();
    println!("Random cube: {}", facelets);
    let ss = gen_scramble(number);
    println!("Scramble: {}", scramble_to_str(&ss));
    if preview {
        let cc = CubieCube::default().apply_moves(&ss);
        print_facelet(&FaceCube::from(&cc))?;
    }
    Ok(())
}

fn tables(path: &Option<PathBuf>, rebuild: bool) -> Result<(), Error> {
    let path = cache::cache_path(path.as_deref());
    let start = Instant::now();
    if rebuild {
        let tables = Tables::build();
        cache::store(&path, &tables)?;
    } else {
        let _ = Tables::load_or_build(&path);
    }
    info!("table cache ready");
    println!("Tables: {} ({:?})", path.display(), start.elapsed());
    Ok(())
}

fn main() {
    let program = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match program.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let result = match &program.command {
        Some(Commands::Solve {
            scramble,
            facelet,
            max,
            timeout,
            target,
            first,
            separator,
            cache,
            preview,
        }) => {
            let policy = match (target, first) {
                (Some(target), _) => SearchPolicy::Target(*target),
                (None, true) => SearchPolicy::FirstSolution,
                (None, false) => SearchPolicy::FinishDepth,
            };
            let config = SolverConfig::default()
                .max_length(*max)
                .timeout(timeout.map(Duration::from_secs_f32))
                .policy(policy)
                .separator(*separator);
            let args = SolveArgs {
                scramble,
                facelet,
                cache,
                preview: *preview,
            };
            solve(args, &config)
        }
        Some(Commands::Scramble { number, preview }) => scramble(*number, *preview),
        Some(Commands::Tables { cache, rebuild }) => tables(cache, *rebuild),
        _ => Ok(()),
    };

    if let Err(error) = result {
        let styled = "Error:".with(TermColor::Red).attribute(Attribute::Bold);
        println!("{styled} {error}");
    }
}
