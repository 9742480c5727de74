// Copyright (c) 2018 Fabian Schuiki
#[macro_use]
extern crate clap;
extern crate gramlab;
#[macro_use]
extern crate log;
extern crate stderrlog;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::error::Error;
use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use gramlab::analysis::Analysis;
use gramlab::cyk::CykParser;
use gramlab::grammar::Grammar;
use gramlab::item_set::ItemSets;
use gramlab::ll1::{self, PredictTable};
use gramlab::machine::StateMachine;
use gramlab::search::{FilterChoice, Search, SearchOptions, SearchState};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let word_arg = || {
        Arg::with_name("WORD")
            .help("The word to recognize; every character is one terminal")
            .required(true)
            .index(1)
    };
    let matches = App::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about("Analyzes grammars and tests words for membership")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .global(true)
                .help("Increase message verbosity"),
        )
        .arg(
            Arg::with_name("GRAMMAR")
                .help("The grammar description to read")
                .required(true),
        )
        .subcommand(SubCommand::with_name("info").about("Print the grammar and its class"))
        .subcommand(SubCommand::with_name("first").about("Print the first sets"))
        .subcommand(SubCommand::with_name("follow").about("Print the follow sets"))
        .subcommand(SubCommand::with_name("ll1").about("Check the LL(1) condition"))
        .subcommand(SubCommand::with_name("items").about("Print the canonical LR(0) item sets"))
        .subcommand(SubCommand::with_name("slr").about("Print the SLR(1) table"))
        .subcommand(
            SubCommand::with_name("cyk")
                .about("Recognize a word with CYK")
                .arg(word_arg()),
        )
        .subcommand(
            SubCommand::with_name("derive")
                .about("Search for a derivation of a word")
                .arg(word_arg())
                .arg(
                    Arg::with_name("timeout")
                        .long("timeout")
                        .takes_value(true)
                        .default_value("10")
                        .help("Seconds after which the search is paused"),
                )
                .arg(
                    Arg::with_name("filter")
                        .long("filter")
                        .takes_value(true)
                        .possible_values(&["auto", "length", "bookend"])
                        .default_value("auto")
                        .help("The filter applied to candidate forms"),
                ),
        )
        .get_matches();

    stderrlog::new()
        .module(module_path!())
        .module("gramlab")
        .verbosity(matches.occurrences_of("verbosity") as usize + 1)
        .init()?;

    let path = matches.value_of("GRAMMAR").unwrap_or_default();
    let grammar = read_grammar(path)?;
    debug!("read grammar from {}", path);

    match matches.subcommand() {
        ("info", _) => {
            println!("{}", grammar.pretty());
            println!("class: {:?}", grammar.classify());
        }
        ("first", _) => {
            let analysis = Analysis::compute(&grammar)?;
            println!("{}", analysis.first().pretty(&grammar));
        }
        ("follow", _) => {
            let analysis = Analysis::compute(&grammar)?;
            println!("{}", analysis.follow().pretty(&grammar));
        }
        ("ll1", _) => {
            let analysis = Analysis::compute(&grammar)?;
            let table = PredictTable::compute(&grammar, analysis.first(), analysis.follow());
            println!("{}", table.pretty(&grammar));
            match ll1::find_conflict(&grammar, analysis.first(), analysis.follow()) {
                Some(conflict) => println!("not LL(1): {}", conflict.pretty(&grammar)),
                None => println!("LL(1)"),
            }
        }
        ("items", _) => {
            let item_sets = ItemSets::compute(&grammar)?;
            println!("{}", item_sets.pretty(&grammar));
        }
        ("slr", _) => {
            let analysis = Analysis::compute(&grammar)?;
            let item_sets = ItemSets::compute(&grammar)?;
            match StateMachine::compute(&grammar, &item_sets, analysis.follow()) {
                Ok(sm) => println!("{}", sm.pretty(&grammar)),
                Err(conflicts) => {
                    for conflict in &conflicts {
                        println!("conflict: {}", conflict.pretty(&grammar));
                    }
                    println!("not SLR(1)");
                }
            }
        }
        ("cyk", Some(sub)) => run_cyk(&grammar, sub)?,
        ("derive", Some(sub)) => run_derive(grammar, sub)?,
        _ => unreachable!("subcommand is required"),
    }
    Ok(())
}

/// Read and parse a grammar description file.
fn read_grammar(path: &str) -> Result<Grammar, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    Ok(gramlab::parser::parse_str(&text)?)
}

fn run_cyk(grammar: &Grammar, matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let word = matches.value_of("WORD").unwrap_or_default();
    let mut cyk = CykParser::new(grammar)?;
    if cyk.solve_str(word)? {
        println!("accepted");
        for rule in cyk.trace() {
            println!("  {}", grammar.rule(rule).pretty(grammar));
        }
    } else {
        println!("rejected");
    }
    Ok(())
}

fn run_derive(grammar: Grammar, matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let word = matches.value_of("WORD").unwrap_or_default();
    let timeout = Duration::from_secs(value_t!(matches, "timeout", u64)?);
    let filter = match matches.value_of("filter") {
        Some("length") => FilterChoice::Length,
        Some("bookend") => FilterChoice::Bookend,
        _ => FilterChoice::Auto,
    };
    let grammar = Arc::new(grammar);
    let mut search = Search::for_str(grammar.clone(), word, SearchOptions { filter })?;
    search.add_listener(|event| debug!("search event: {:?}", event));
    search.start();

    let started = Instant::now();
    while search.is_active() && started.elapsed() < timeout {
        thread::sleep(Duration::from_millis(20));
    }
    search.pause();
    let state = search.wait();
    let progress = search.progress();
    info!(
        "{} nodes expanded, {} of {} nodes live, frontier {}",
        progress.expanded, progress.live_nodes, progress.total_nodes, progress.frontier
    );

    match state {
        SearchState::Accepted => {
            println!("accepted");
            if let Some(answer) = search.answer() {
                println!("{}", answer.pretty(&grammar));
            }
        }
        SearchState::Rejected => println!("rejected"),
        SearchState::Failed => return Err("the search worker failed".into()),
        _ => println!("undecided after {}s", timeout.as_secs()),
    }
    Ok(())
}
