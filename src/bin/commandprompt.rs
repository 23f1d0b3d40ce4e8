// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An interactive REPL for poking at a board and the solvers by hand,
//! grounded on the teacher's `uci::run` stdin-line-loop shape and on
//! `examples/original_source/src/CommandPrompt.cpp`'s command set.

use std::fs;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use rand::Rng;

use quartet::board::{Board, Column, Row, NUM_COLUMNS, NUM_ROWS};
use quartet::eval::{MaterialScorer, ThreatAwareScorer};
use quartet::search::{self, SearchOptions};

enum ActiveSolver {
    None,
    Automarked { depth: u32, prune: bool },
    Tournament { options: SearchOptions },
}

impl Default for ActiveSolver {
    fn default() -> ActiveSolver {
        ActiveSolver::None
    }
}

fn print_board(board: &Board) {
    let header: String = (0..NUM_COLUMNS)
        .map(|c| char::from_digit(c, 10).unwrap())
        .collect();
    println!("\n+{header}+");
    for r in (0..NUM_ROWS).rev() {
        let row = Row::new(r).unwrap();
        println!("{r}{}{r}", board.get_description(Some(row), true));
    }
    println!("+{header}+");
}

fn print_count(board: &Board) {
    let connections = board.count_connections();
    println!("Total pieces: {}", board.count());
    println!("2-in-a-row: {}", connections.exactly_two);
    println!("3-in-a-row: {}", connections.exactly_three);
    println!("4+-in-a-row: {}", connections.at_least_four);
}

fn print_threats(board: &Board) {
    let threats = board.get_threat_info();
    println!("total: {}, {}", threats.all_threats[0], threats.all_threats[1]);
    println!(
        "double: {}, {}",
        threats.double_threats[0], threats.double_threats[1]
    );
    println!(
        "grounded: {}, {}",
        threats.grounded_threats[0], threats.grounded_threats[1]
    );
}

fn save(board: &Board, name: &str) {
    if name.is_empty() {
        println!("No name given");
        return;
    }
    match fs::write(format!("{name}.stash"), board.get_description(None, false)) {
        Ok(()) => println!("Board saved"),
        Err(e) => println!("Failed to save board: {e}"),
    }
}

fn load(board: &mut Board, name: &str) {
    if name.is_empty() {
        println!("No name given");
        return;
    }
    match fs::read_to_string(format!("{name}.stash")) {
        Ok(description) => match Board::from_description(description.trim()) {
            Ok(loaded) => *board = loaded,
            Err(e) => println!("Saved board is invalid: {e}"),
        },
        Err(e) => println!("Failed to load board: {e}"),
    }
}

fn play(board: &mut Board, column: i64, check_only: bool) {
    match Column::new(column as u32).filter(|&c| column >= 0 && board.can_play(c)) {
        Some(column) => {
            println!("Valid move");
            if !check_only {
                board.play(column);
            }
        }
        None => println!("Invalid move"),
    }
}

fn random_moves(board: &mut Board, mut pieces: i64) {
    let mut rng = rand::thread_rng();
    if pieces < 0 {
        pieces = rng.gen_range(0..(NUM_COLUMNS * NUM_ROWS)) as i64;
    }
    while pieces > 0 {
        let column = Column::new(rng.gen_range(0..NUM_COLUMNS)).unwrap();
        if board.can_play(column) {
            board.play(column);
        }
        pieces -= 1;
        board.swap();
    }
}

fn set_solver(active: &mut ActiveSolver, name: &str, args: &[&str]) {
    match name {
        "am" => {
            let depth = args.first().and_then(|s| s.parse().ok()).unwrap_or(0);
            let prune = args.get(1).and_then(|s| s.parse::<u32>().ok()).unwrap_or(0) != 0;
            *active = ActiveSolver::Automarked { depth, prune };
            println!(
                "Set solver to automarked with depth={depth} and pruning {}",
                if prune { "enabled" } else { "disabled" }
            );
        }
        "t" => {
            let timeout_ms = args.first().and_then(|s| s.parse().ok()).unwrap_or(10_000);
            let start_depth = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(9);
            let depth_step = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1);
            let max_depth = args.get(3).and_then(|s| s.parse().ok());
            *active = ActiveSolver::Tournament {
                options: SearchOptions {
                    start_height: start_depth,
                    height_step: depth_step,
                    max_height: max_depth,
                    time_limit: Duration::from_millis(timeout_ms),
                },
            };
            println!(
                "Set solver to tournament with timeout {timeout_ms}ms, start depth {start_depth}, depth step {depth_step}"
            );
        }
        _ => println!("Invalid solver name"),
    }
}

/// Counters from the most recently completed solve, printed verbatim by the
/// `stats` command. Grounded on `CommandPrompt.cpp`'s `printSolverStatistics`,
/// which reports the same node/table figures after each solve.
#[derive(Copy, Clone)]
struct SolveStats {
    elapsed_ms: u128,
    nodes_examined: u64,
    table_hits: u64,
    table_replacements: u64,
    table_ignores: u64,
    height_reached: Option<u32>,
}

fn print_stats(stats: &Option<SolveStats>) {
    match stats {
        None => println!("No solve has been run yet"),
        Some(stats) => {
            println!("Time taken: {} ms", stats.elapsed_ms);
            println!("Nodes examined: {}", stats.nodes_examined);
            if let Some(height) = stats.height_reached {
                println!("Height reached: {height}");
            }
            println!(
                "Table hits: {}, replacements: {}, ignores: {}",
                stats.table_hits, stats.table_replacements, stats.table_ignores
            );
        }
    }
}

fn solve_move(board: &mut Board, active: &ActiveSolver, play_it: bool) -> Option<SolveStats> {
    let start = std::time::Instant::now();
    let (column, stats) = match active {
        ActiveSolver::None => {
            println!("No solver is set");
            return None;
        }
        ActiveSolver::Automarked { depth, prune } => {
            let scorer = MaterialScorer::new();
            let result = search::fixed_depth(board, &scorer, *depth, *prune);
            (
                result.best_move,
                SolveStats {
                    elapsed_ms: 0,
                    nodes_examined: result.nodes_examined,
                    table_hits: result.table_hits,
                    table_replacements: result.table_replacements,
                    table_ignores: result.table_ignores,
                    height_reached: None,
                },
            )
        }
        ActiveSolver::Tournament { options } => {
            let scorer = ThreatAwareScorer::new();
            let result = search::search(board, &scorer, options);
            (
                result.best_move,
                SolveStats {
                    elapsed_ms: 0,
                    nodes_examined: result.nodes_examined,
                    table_hits: result.table_hits,
                    table_replacements: result.table_replacements,
                    table_ignores: result.table_ignores,
                    height_reached: Some(result.height_reached),
                },
            )
        }
    };

    match column {
        Some(column) => {
            println!("Best move: {}", column.get());
            if play_it {
                board.play(column);
                board.swap();
            }
        }
        None => println!("Unable to solve"),
    }

    let stats = SolveStats {
        elapsed_ms: start.elapsed().as_millis(),
        ..stats
    };
    print_stats(&Some(stats));
    Some(stats)
}

fn main() {
    let mut board = Board::new();
    let mut active_solver = ActiveSolver::default();
    let mut last_stats: Option<SolveStats> = None;

    println!("ConnectFour command prompt");
    print_board(&board);
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();
    for maybe_line in stdin.lock().lines() {
        let line = match maybe_line {
            Ok(line) => line,
            Err(_) => break,
        };
        let line = line.to_lowercase();
        let parts: Vec<&str> = line.split_whitespace().collect();
        let (&command, arguments) = parts.split_first().unwrap_or((&"", &[]));

        match command {
            "exit" | "quit" => break,
            "set" => match arguments.first() {
                Some(description) => match Board::from_description(description) {
                    Ok(parsed) => {
                        board = parsed;
                        println!("Board updated");
                    }
                    Err(e) => println!("Invalid description: {e}"),
                },
                None => println!("No description given"),
            },
            "print" => println!("{board}"),
            "swap" => board.swap(),
            "red" | "yellow" | "clear" => {
                let column: i64 = arguments.first().and_then(|s| s.parse().ok()).unwrap_or(-1);
                let row: i64 = arguments.get(1).and_then(|s| s.parse().ok()).unwrap_or(-1);
                if command == "yellow" {
                    board.swap();
                }
                if let (Some(c), Some(r)) = (
                    Column::new(column.try_into().unwrap_or(u32::MAX)),
                    Row::new(row.try_into().unwrap_or(u32::MAX)),
                ) {
                    board.set_space(c, r, command != "clear");
                } else if column == -1 && row == -1 && command == "clear" {
                    board.clear();
                } else {
                    println!("Invalid arguments: <column> <row>");
                }
                if command == "yellow" {
                    board.swap();
                }
            }
            "iswin" => println!("{}", if board.is_win() { "won" } else { "not won" }),
            "count" => print_count(&board),
            "threats" => print_threats(&board),
            "save" => save(&board, arguments.first().unwrap_or(&"")),
            "load" => load(&mut board, arguments.first().unwrap_or(&"")),
            "canplay" | "play" => {
                let column: i64 = arguments.first().and_then(|s| s.parse().ok()).unwrap_or(-1);
                play(&mut board, column, command == "canplay");
            }
            "random" => {
                let pieces: i64 = arguments.first().and_then(|s| s.parse().ok()).unwrap_or(-1);
                random_moves(&mut board, pieces);
            }
            "solver" => {
                if let Some((&name, rest)) = arguments.split_first() {
                    set_solver(&mut active_solver, name, rest);
                } else {
                    println!("Invalid solver name");
                }
            }
            "solve" | "auto" => {
                last_stats = solve_move(&mut board, &active_solver, command == "auto");
            }
            "stats" => print_stats(&last_stats),
            "hash" => println!("{}", board.get_hash()),
            "" => {}
            _ => println!("Invalid command"),
        }

        print_board(&board);
        print!("> ");
        io::stdout().flush().ok();
    }
}
