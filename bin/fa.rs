use std::{
    io::Read,
    process::ExitCode,
    time::{Duration, Instant},
};

use automata_engine::{combinators::pipeline, prelude::*};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use owo_colors::OwoColorize;
use tracing::{debug, info, trace};
use tracing_subscriber::{filter, prelude::*};

fn cli() -> clap::Command {
    Command::new("fa")
        .about("Runs a single algorithm on finite automata read from a file or stdin and reports its running time")
        .subcommand_required(true)
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .global(true)
                .num_args(0..=1)
                .require_equals(true)
                .value_parser(["info", "debug", "trace"])
                .default_missing_value("info"),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .global(true)
                .help("file to read the automata from, stdin is used if omitted"),
        )
        .arg(
            Arg::new("budget")
                .short('b')
                .long("budget")
                .global(true)
                .value_parser(value_parser!(u64))
                .default_value("500")
                .help("milliseconds during which the algorithm is run repeatedly"),
        )
        .arg(
            Arg::new("table")
                .short('t')
                .long("table")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("print automata and relations as tables"),
        )
        .subcommand(Command::new("emptiness").about("checks whether the first automaton accepts no word"))
        .subcommand(Command::new("useless").about("removes states of the first automaton that are not reachable or cannot reach a final state"))
        .subcommand(Command::new("intersection").about("builds the product of the first two automata"))
        .subcommand(
            Command::new("determinize")
                .about("applies the subset construction to the first automaton")
                .arg(
                    Arg::new("fail-state")
                        .long("fail-state")
                        .action(ArgAction::SetTrue)
                        .help("complete the result with a non-accepting sink"),
                ),
        )
        .subcommand(
            Command::new("minimize")
                .about("determinizes the first automaton once and then minimizes the result")
                .arg(
                    Arg::new("fail-state")
                        .long("fail-state")
                        .action(ArgAction::SetTrue)
                        .help("complete the determinized automaton with a non-accepting sink"),
                ),
        )
        .subcommand(Command::new("simulation").about("computes the maximal simulation preorder of the first automaton"))
        .subcommand(Command::new("reduce").about("merges states of the first automaton related by simulation"))
        .subcommand(
            Command::new("universality")
                .about("checks whether the first automaton accepts every word")
                .arg(identity_arg()),
        )
        .subcommand(
            Command::new("inclusion")
                .about("checks whether the language of the first automaton is included in that of the second")
                .arg(identity_arg()),
        )
        .subcommand(Command::new("union").about("builds the union of the first two automata"))
        .subcommand(
            Command::new("pipeline")
                .about("complements the determinized union of the product of the first two automata with the third"),
        )
}

fn identity_arg() -> Arg {
    Arg::new("identity")
        .long("identity")
        .action(ArgAction::SetTrue)
        .help("use the identity instead of the simulation preorder for subsumption")
}

fn setup_logging(matches: &ArgMatches) {
    let Ok(Some(verbosity)) = matches.try_get_one::<String>("verbosity") else {
        return;
    };

    let level = match verbosity.as_str() {
        "trace" => filter::LevelFilter::TRACE,
        "debug" => filter::LevelFilter::DEBUG,
        "info" => filter::LevelFilter::INFO,
        _ => unreachable!(),
    };

    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

/// What a single run of a mode produces.
enum Outcome {
    Verdict {
        holds: bool,
        yes: &'static str,
        no: &'static str,
    },
    Automaton(Automaton),
    /// A relation over the states of the first automaton.
    Relation(Relation),
}

fn verdict(holds: bool, yes: &'static str, no: &'static str) -> Outcome {
    Outcome::Verdict { holds, yes, no }
}

/// Number of automata that `mode` consumes.
fn arity(mode: &str) -> usize {
    match mode {
        "intersection" | "inclusion" | "union" => 2,
        "pipeline" => 3,
        _ => 1,
    }
}

/// Runs `mode` once on `automata`, which are known to be sufficiently many.
fn run(mode: &str, sub: &ArgMatches, automata: &[Automaton]) -> Result<Outcome, Error> {
    let subsumption = || {
        if sub.get_flag("identity") {
            Subsumption::Identity
        } else {
            Subsumption::Simulation
        }
    };
    let outcome = match mode {
        "emptiness" => verdict(
            automata[0].is_empty_language(),
            "Automaton is empty!",
            "Automaton is not empty!",
        ),
        "useless" => Outcome::Automaton(automata[0].clone().trim()),
        "intersection" => Outcome::Automaton(automata[0].intersection(&automata[1])),
        "determinize" => Outcome::Automaton(automata[0].determinize_with(DeterminizeConfig {
            fail_state: sub.get_flag("fail-state"),
        })),
        "minimize" => Outcome::Automaton(automata[0].minimize()?),
        "simulation" => Outcome::Relation(automata[0].simulation()),
        "reduce" => Outcome::Automaton(automata[0].clone().reduced()),
        "universality" => verdict(
            automata[0].is_universal(subsumption()),
            "Automaton is universal!",
            "Automaton is not universal!",
        ),
        "inclusion" => verdict(
            automata[0].is_included_in(&automata[1], subsumption())?,
            "Language of the first automaton is included in the second!",
            "Language of the first automaton is not included in the second!",
        ),
        "union" => Outcome::Automaton(automata[0].union(&automata[1])),
        "pipeline" => Outcome::Automaton(pipeline(&automata[0], &automata[1], &automata[2])?),
        _ => unreachable!(),
    };
    Ok(outcome)
}

/// Brings the parsed automata into the shape `mode` works on. Minimization needs a deterministic
/// automaton, so the first one is determinized here, outside of the timed runs.
fn prepare(mode: &str, sub: &ArgMatches, mut automata: Vec<Automaton>) -> Vec<Automaton> {
    if mode == "minimize" {
        let config = DeterminizeConfig {
            fail_state: sub.get_flag("fail-state"),
        };
        automata[0] = automata[0].determinize_with(config);
        debug!(
            "determinized {} into {} states before minimizing",
            automata[0].name(),
            automata[0].size()
        );
    }
    automata
}

/// Summary of a measurement, printed as the first line of the output.
#[derive(Debug, Clone, Copy)]
struct Timing {
    states: usize,
    transitions: usize,
    runs: usize,
    elapsed: Duration,
}

impl Timing {
    /// Mean wall-clock time of a single run in milliseconds.
    fn wall(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0 / self.runs.max(1) as f64
    }
}

impl std::fmt::Display for Timing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "states: {} transitions: {} runs: {} wall: {:.6} ms",
            self.states,
            self.transitions,
            self.runs,
            self.wall()
        )
    }
}

/// Repeats `mode` until `budget` is used up, but at least once. Returns the last outcome
/// together with the number of runs and the elapsed time.
fn measure(
    mode: &str,
    sub: &ArgMatches,
    automata: &[Automaton],
    budget: Duration,
) -> Result<(Outcome, usize, Duration), Error> {
    let start = Instant::now();
    let mut runs = 0;
    loop {
        let outcome = run(mode, sub, automata)?;
        runs += 1;
        if start.elapsed() >= budget {
            return Ok((outcome, runs, start.elapsed()));
        }
    }
}

fn read_input(matches: &ArgMatches) -> std::io::Result<String> {
    match matches.get_one::<String>("input") {
        Some(path) => {
            debug!("reading automata from {path}");
            std::fs::read_to_string(path)
        }
        None => {
            debug!("reading automata from stdin");
            let mut input = String::new();
            std::io::stdin().lock().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn execute(mode: &str, sub: &ArgMatches, input: &str) -> Result<(), Error> {
    let automata = parse_automata(input)?;
    info!("parsed {} automata", automata.len());
    if automata.len() < arity(mode) {
        return Err(Error::Usage {
            mode: mode.to_string(),
            expected: arity(mode),
            found: automata.len(),
        });
    }

    let states: usize = automata.iter().map(Automaton::size).sum();
    let transitions: usize = automata.iter().map(Automaton::transition_count).sum();
    let automata = prepare(mode, sub, automata);

    let budget = Duration::from_millis(sub.get_one::<u64>("budget").copied().unwrap_or(500));
    let (outcome, runs, elapsed) = measure(mode, sub, &automata, budget)?;
    info!("{mode} ran {runs} times in {}ms", elapsed.as_millis());

    let timing = Timing {
        states,
        transitions,
        runs,
        elapsed,
    };
    println!("{timing}\n");

    let table = sub.get_flag("table");
    match outcome {
        Outcome::Verdict { holds, yes, no } => {
            if holds {
                println!("{}", yes.green());
            } else {
                println!("{}", no.red());
            }
        }
        Outcome::Automaton(aut) if table => println!("{}", aut.transition_table()),
        Outcome::Automaton(aut) => print!("{aut}"),
        Outcome::Relation(relation) if table => println!("{}", relation.table(&automata[0])),
        Outcome::Relation(relation) => println!("{}", relation.show(&automata[0])),
    }
    Ok(())
}

pub fn main() -> ExitCode {
    let matches = cli().get_matches();
    let Some((mode, sub)) = matches.subcommand() else {
        unreachable!()
    };

    setup_logging(sub);

    let input = match read_input(sub) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("{} could not read input: {err}", "error:".red().bold());
            return ExitCode::from(1);
        }
    };

    match execute(mode, sub, &input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            match err {
                Error::IncompatibleAlphabets { .. } => ExitCode::from(2),
                _ => ExitCode::from(1),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use automata_engine::prelude::*;

    use super::{cli, prepare, run, Outcome, Timing};

    fn matches_for(mode: &str) -> clap::ArgMatches {
        let matches = cli().try_get_matches_from(["fa", mode]).unwrap();
        matches.subcommand_matches(mode).unwrap().clone()
    }

    #[test]
    fn global_arguments_after_the_mode() {
        let matches = cli()
            .try_get_matches_from(["fa", "determinize", "--fail-state", "--budget", "10", "--table"])
            .unwrap();
        let (mode, sub) = matches.subcommand().unwrap();
        assert_eq!(mode, "determinize");
        assert!(sub.get_flag("fail-state"));
        assert!(sub.get_flag("table"));
        assert_eq!(sub.get_one::<u64>("budget"), Some(&10));
    }

    #[test]
    fn a_mode_is_required() {
        assert!(cli().try_get_matches_from(["fa"]).is_err());
        assert!(cli().try_get_matches_from(["fa", "universality", "--fail-state"]).is_err());
        cli().debug_assert();
    }

    #[test]
    fn minimize_accepts_nondeterministic_input() {
        let sub = matches_for("minimize");
        let automata = parse_automata(
            "Ops a:1 Automaton nd States q0 q1 q2 Final States q1 q2 \
             Transitions ->q0 a(q0)->q1 a(q0)->q2",
        )
        .unwrap();
        assert!(!automata[0].is_deterministic());
        let automata = prepare("minimize", &sub, automata);
        assert!(automata[0].is_deterministic());
        match run("minimize", &sub, &automata) {
            Ok(Outcome::Automaton(min)) => {
                assert_eq!(min.size(), 2);
                assert!(min.accepts(&[0]));
            }
            _ => panic!("minimization failed"),
        }
    }

    #[test]
    fn timing_line_reports_the_mean_run() {
        let timing = Timing {
            states: 3,
            transitions: 4,
            runs: 4,
            elapsed: Duration::from_millis(10),
        };
        assert_eq!(
            timing.to_string(),
            "states: 3 transitions: 4 runs: 4 wall: 2.500000 ms"
        );
    }
}
