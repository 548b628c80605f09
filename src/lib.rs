//! Crate root module declarations for the Quill Chess engine.
//!
//! Exposes the position model, move generation, search and text helpers so
//! the UCI binary, benches and external tooling can import stable paths.

pub mod errors;

pub mod game_state {
    pub mod chess_move;
    pub mod chess_rules;
    pub mod chess_types;
    pub mod fingerprint;
    pub mod position;
}

pub mod move_generation {
    pub mod attacks;
    pub mod legal_move_apply;
    pub mod move_generator;
    pub mod perft;
    pub mod piece_moves;
}

pub mod search {
    pub mod alpha_beta;
    pub mod board_scoring;
    pub mod exchange;
    pub mod iterative_deepening;
    pub mod move_ordering;
    pub mod quiescence;
    pub mod time_management;
    pub mod transposition_table;
}

pub mod uci {
    pub mod uci_top;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod long_algebraic;
}
