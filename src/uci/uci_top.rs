//! UCI protocol front-end and command loop.
//!
//! Keeps the current position and search settings, turns `go` into an
//! iterative deepening run and prints one `info` line per completed depth
//! followed by `bestmove`. Searches run to completion before the next command
//! is read.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::game_state::position::Position;
use crate::move_generation::legal_move_apply::apply_long_algebraic_moves;
use crate::search::alpha_beta::{mate_distance, SearchConfig};
use crate::search::iterative_deepening::{format_pv, iterative_deepening_with_reporter, DepthReport};
use crate::search::time_management::GoParams;
use crate::search::transposition_table::TranspositionTable;

const UCI_ENGINE_NAME: &str = "Quill Chess";
const UCI_ENGINE_AUTHOR: &str = "the Quill Chess developers";

pub fn run_stdio_loop() -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut uci = UciState::new();

    for line in stdin.lock().lines() {
        let line = line?;
        let should_quit = uci.handle_command(&line, &mut stdout)?;
        stdout.flush()?;
        if should_quit {
            break;
        }
    }

    Ok(())
}

struct UciState {
    position: Position,
    config: SearchConfig,
    fixed_depth: Option<i32>,
}

impl UciState {
    fn new() -> Self {
        Self {
            position: Position::new_game(),
            config: SearchConfig::default(),
            fixed_depth: None,
        }
    }

    fn handle_command(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let trimmed = line.trim();
        let Some(cmd) = trimmed.split_whitespace().next() else {
            return Ok(false);
        };

        match cmd {
            "uci" => {
                writeln!(out, "id name {UCI_ENGINE_NAME}")?;
                writeln!(out, "id author {UCI_ENGINE_AUTHOR}")?;
                writeln!(out, "uciok")?;
            }
            "isready" => writeln!(out, "readyok")?,
            "setoption" => {
                if let Err(err) = self.handle_setoption(trimmed) {
                    log::warn!("rejected setoption: {err}");
                    writeln!(out, "info string setoption error: {err}")?;
                }
            }
            "ucinewgame" => self.position = Position::new_game(),
            "position" => {
                if let Err(err) = self.handle_position(trimmed) {
                    log::warn!("rejected position: {err}");
                    writeln!(out, "info string position error: {err}")?;
                }
            }
            "go" => self.handle_go(trimmed, out)?,
            "quit" => return Ok(true),
            other => log::debug!("ignoring unknown command '{other}'"),
        }

        Ok(false)
    }

    fn handle_setoption(&mut self, line: &str) -> Result<(), String> {
        let mut name_tokens = Vec::new();
        let mut value_tokens = Vec::new();
        let mut in_value = false;
        for tok in line.split_whitespace().skip(1) {
            match tok {
                "name" => in_value = false,
                "value" => in_value = true,
                _ if in_value => value_tokens.push(tok),
                _ => name_tokens.push(tok),
            }
        }
        let name = name_tokens.join(" ");
        let value = value_tokens.join(" ");

        if name.eq_ignore_ascii_case("Hash") {
            let mb = value
                .parse::<usize>()
                .map_err(|_| format!("invalid Hash value '{value}'"))?;
            self.config.tt_capacity = TranspositionTable::new_with_mb(mb).capacity();
        } else if name.eq_ignore_ascii_case("Depth") {
            let depth = value
                .parse::<i32>()
                .map_err(|_| format!("invalid Depth value '{value}'"))?;
            self.fixed_depth = (depth > 0).then_some(depth);
        } else {
            return Err(format!("unknown option '{name}'"));
        }
        Ok(())
    }

    fn handle_position(&mut self, line: &str) -> Result<(), String> {
        let mut tokens = line.split_whitespace().skip(1).peekable();
        let base = match tokens.next() {
            Some("startpos") => Position::new_game(),
            Some("fen") => {
                let mut fen_parts = Vec::new();
                while let Some(tok) = tokens.next_if(|tok| *tok != "moves") {
                    fen_parts.push(tok);
                }
                if fen_parts.is_empty() {
                    return Err("missing FEN after 'position fen'".to_owned());
                }
                Position::from_fen(&fen_parts.join(" ")).map_err(|e| e.to_string())?
            }
            Some(other) => return Err(format!("unsupported position token '{other}'")),
            None => return Err("incomplete position command".to_owned()),
        };

        let moves: Vec<&str> = match tokens.next() {
            Some("moves") => tokens.collect(),
            Some(other) => return Err(format!("unexpected token '{other}'")),
            None => Vec::new(),
        };
        // Nothing changes unless the whole move list applies.
        self.position = apply_long_algebraic_moves(&base, &moves).map_err(|e| e.to_string())?;
        Ok(())
    }

    fn handle_go(&mut self, line: &str, out: &mut impl Write) -> io::Result<()> {
        let mut params = parse_go_params(line);
        if params.depth.is_none() {
            params.depth = self.fixed_depth;
        }
        let limits = params.limits(&self.position);
        log::debug!("go with {limits:?}");

        let mut write_error = None;
        let result = iterative_deepening_with_reporter(
            &self.position,
            &self.config,
            limits,
            None,
            |report| {
                if write_error.is_none() {
                    if let Err(err) = writeln!(out, "{}", info_line(report)) {
                        write_error = Some(err);
                    }
                }
            },
        );
        if let Some(err) = write_error {
            return Err(err);
        }

        match result.and_then(|node| node.best_move()) {
            Some(mv) => writeln!(out, "bestmove {mv}"),
            None => writeln!(out, "bestmove 0000"),
        }
    }
}

fn info_line(report: &DepthReport<'_>) -> String {
    let score = match mate_distance(report.node.value) {
        Some(plies) if plies > 0 => format!("mate {}", (plies + 1) / 2),
        Some(plies) => format!("mate -{}", (-plies + 1) / 2),
        None => format!("cp {}", report.node.value),
    };
    format!(
        "info depth {} score {} nodes {} time {} pv {}",
        report.depth,
        score,
        report.total_nodes,
        report.elapsed.as_millis(),
        format_pv(&report.node.pv)
    )
}

fn parse_go_params(line: &str) -> GoParams {
    let mut params = GoParams::default();
    let mut tokens = line.split_whitespace().skip(1);
    while let Some(tok) = tokens.next() {
        match tok {
            "depth" => params.depth = next_number(&mut tokens),
            "movetime" => params.movetime_ms = next_number(&mut tokens),
            "wtime" => params.wtime_ms = next_number(&mut tokens),
            "btime" => params.btime_ms = next_number(&mut tokens),
            "winc" => params.winc_ms = next_number(&mut tokens),
            "binc" => params.binc_ms = next_number(&mut tokens),
            other => log::debug!("ignoring go token '{other}'"),
        }
    }
    params
}

fn next_number<'a, T: FromStr>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<T> {
    tokens.next().and_then(|x| x.parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::Color;

    fn run(state: &mut UciState, line: &str) -> String {
        let mut out = Vec::new();
        state.handle_command(line, &mut out).expect("writing to a Vec cannot fail");
        String::from_utf8(out).expect("output should be UTF-8")
    }

    #[test]
    fn handshake() {
        let mut state = UciState::new();
        let out = run(&mut state, "uci");
        assert!(out.starts_with("id name Quill Chess"));
        assert!(out.ends_with("uciok\n"));
        assert_eq!(run(&mut state, "isready"), "readyok\n");
        assert!(state.handle_command("quit", &mut Vec::new()).expect("quit should succeed"));
    }

    #[test]
    fn position_startpos_with_moves_updates_state() {
        let mut state = UciState::new();
        state
            .handle_position("position startpos moves e2e4 e7e5 g1f3")
            .expect("position command should parse");
        assert_eq!(state.position.side_to_move, Color::Black);
        assert_eq!(
            state.position.to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
    }

    #[test]
    fn position_fen_without_moves_updates_state() {
        let mut state = UciState::new();
        state
            .handle_position("position fen 8/8/8/8/8/4k3/4P3/4K3 w - - 0 1")
            .expect("position fen should parse");
        assert_eq!(state.position.to_fen(), "8/8/8/8/8/4k3/4P3/4K3 w - - 0 1");
    }

    #[test]
    fn bad_position_keeps_the_previous_one() {
        let mut state = UciState::new();
        let out = run(&mut state, "position startpos moves e2e4 e2e4");
        assert!(out.starts_with("info string position error"));
        assert_eq!(state.position.to_fen(), Position::new_game().to_fen());
        assert!(state.handle_position("position fen").is_err());
        assert!(state.handle_position("position somewhere").is_err());
    }

    #[test]
    fn setoption_hash_and_depth() {
        let mut state = UciState::new();
        state
            .handle_setoption("setoption name Hash value 1")
            .expect("hash should parse");
        assert_eq!(
            state.config.tt_capacity,
            TranspositionTable::new_with_mb(1).capacity()
        );
        state
            .handle_setoption("setoption name Depth value 3")
            .expect("depth should parse");
        assert_eq!(state.fixed_depth, Some(3));
        assert!(state.handle_setoption("setoption name Depth value x").is_err());
        assert!(state.handle_setoption("setoption name Ponder value true").is_err());
    }

    #[test]
    fn parse_go_params_keeps_clock_fields() {
        let params = parse_go_params("go wtime 120000 btime 60000 winc 1000 binc 1000 depth 6");
        assert_eq!(params.movetime_ms, None);
        assert_eq!(params.wtime_ms, Some(120_000));
        assert_eq!(params.btime_ms, Some(60_000));
        assert_eq!(params.winc_ms, Some(1_000));
        assert_eq!(params.binc_ms, Some(1_000));
        assert_eq!(params.depth, Some(6));
    }

    #[test]
    fn go_prints_progress_and_bestmove() {
        let mut state = UciState::new();
        run(&mut state, "position fen 7k/8/6K1/8/8/8/8/R7 w - - 0 1");
        let out = run(&mut state, "go depth 3");
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("info depth 1 score mate 1 nodes "));
        assert!(lines[0].ends_with("pv a1a8"));
        assert_eq!(lines.last().copied(), Some("bestmove a1a8"));
    }

    #[test]
    fn go_depth_zero_still_searches_one_ply() {
        let mut state = UciState::new();
        run(&mut state, "position fen 4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1");
        let out = run(&mut state, "go depth 0");
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("info depth 1 "));
        assert_eq!(lines.last().copied(), Some("bestmove e4d5"));
    }

    #[test]
    fn go_without_moves_answers_null_move() {
        let mut state = UciState::new();
        run(&mut state, "position fen 6k1/6Q1/6K1/8/8/8/8/8 b - - 0 1");
        assert_eq!(run(&mut state, "go depth 2"), "bestmove 0000\n");
    }

    #[test]
    fn info_lines_report_centipawns() {
        let node = crate::search::alpha_beta::SearchNode {
            value: -35,
            ..Default::default()
        };
        let report = DepthReport {
            depth: 2,
            node: &node,
            total_nodes: 100,
            elapsed: std::time::Duration::from_millis(7),
        };
        assert_eq!(info_line(&report), "info depth 2 score cp -35 nodes 100 time 7 pv ");
    }
}
