use std::env;
use std::fs;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Error};
use clap::{value_t, values_t, App, AppSettings, Arg};
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};
use toml::value::{Table, Value};

use lasat::config::SolverConfig;
use lasat::solver::{Solver, SolverError};

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("LASAT_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn banner() {
    info!("This is lasat {}", env!("LASAT_VERSION"));
    info!(
        "  {} build - {}",
        env!("LASAT_PROFILE"),
        env!("LASAT_RUSTC_VERSION")
    );
}

/// Combine the config file and all `-C` options, later settings win.
fn read_config(config_file: Option<&str>, options: &[String]) -> Result<SolverConfig, Error> {
    let mut settings = Table::new();

    if let Some(path) = config_file {
        let contents = fs::read_to_string(path)?;
        settings.extend(toml::from_str::<Table>(&contents)?);
    }

    for option in options {
        settings.extend(toml::from_str::<Table>(option)?);
    }

    Ok(Value::Table(settings).try_into()?)
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("lasat")
        .version(env!("LASAT_VERSION"))
        .setting(AppSettings::DisableHelpSubcommand)
        .arg_from_usage("[INPUT] 'The input file to use (stdin if omitted)'")
        .arg_from_usage("[config-file] --config=[FILE] 'Read parameters from configuration file'")
        .arg(
            Arg::from_usage("[config-option] -C --config-option")
                .value_name("OPTION>=<VALUE")
                .help("Specify a single config option, see 'lasat -C help' for a list of options.")
                .multiple(true)
                .number_of_values(1),
        )
        .arg_from_usage(
            "[time-limit] --time-limit=[SECONDS] 'Give up when no result was found in time'",
        )
        .arg_from_usage("--stats 'Print search statistics after solving'")
        .get_matches();

    let config_options = values_t!(matches, "config-option", String).unwrap_or_default();

    if config_options.iter().any(|option| option == "help") {
        print!("{}", SolverConfig::help());
        return Ok(0);
    }

    init_logging();
    banner();

    let config = read_config(matches.value_of("config-file"), &config_options)?;

    let mut solver = Solver::new();
    solver.config(&config)?;

    if matches.is_present("time-limit") {
        let seconds = value_t!(matches, "time-limit", f64)?;
        if !(seconds >= 0.0) {
            bail!("time limit must be a non-negative number of seconds");
        }
        let flag = Arc::new(AtomicBool::new(false));
        solver.set_interrupt(flag.clone());
        thread::spawn(move || {
            thread::sleep(Duration::from_secs_f64(seconds));
            flag.store(true, Ordering::Relaxed);
        });
    }

    match matches.value_of("INPUT") {
        Some(path) => {
            info!("Reading file '{}'", path);
            solver.add_dimacs_cnf(fs::File::open(path)?)?;
        }
        None => {
            info!("Reading from stdin");
            let stdin = io::stdin();
            let locked_stdin = stdin.lock();
            solver.add_dimacs_cnf(locked_stdin)?;
        }
    }

    let result = solver.solve();

    if matches.is_present("stats") {
        for line in solver.stats().to_string().lines() {
            info!("{}", line);
        }
    }

    match result {
        Ok(true) => {
            println!("s SATISFIABLE");
            print!("v");
            for lit in solver.model().unwrap_or_default() {
                print!(" {}", lit);
            }
            println!(" 0");
            Ok(10)
        }
        Ok(false) => {
            println!("s UNSATISFIABLE");
            Ok(20)
        }
        Err(SolverError::Interrupted) => {
            info!("Time limit reached");
            println!("s UNKNOWN");
            Ok(0)
        }
        Err(err) => Err(err.into()),
    }
}
