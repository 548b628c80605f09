use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use quill_chess::game_state::chess_rules::STARTING_POSITION_FEN;
use quill_chess::game_state::position::Position;
use quill_chess::search::alpha_beta::{search, SearchConfig};
use quill_chess::search::iterative_deepening::{iterative_deepening, SearchLimits};

#[derive(Clone, Copy)]
struct PerfCase {
    name: &'static str,
    fen: &'static str,
}

const CASES: &[PerfCase] = &[
    PerfCase {
        name: "startpos",
        fen: STARTING_POSITION_FEN,
    },
    PerfCase {
        name: "classical_mid",
        fen: "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
    },
    PerfCase {
        name: "tactical",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    },
    PerfCase {
        name: "end_kpk",
        fen: "8/8/8/8/8/4k3/4P3/4K3 w - - 0 1",
    },
];

fn search_depth() -> i32 {
    std::env::var("QUILL_SEARCH_DEPTH")
        .ok()
        .and_then(|v| v.parse::<i32>().ok())
        .unwrap_or(4)
        .max(1)
}

fn bench_search(c: &mut Criterion) {
    let depth = search_depth();
    let config = SearchConfig::default();

    let mut group = c.benchmark_group(format!("search_d{depth}"));
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(10);

    for case in CASES {
        let position = Position::from_fen(case.fen).expect("benchmark FEN should parse");
        group.bench_with_input(BenchmarkId::new("fixed", case.name), &position, |b, position| {
            b.iter(|| black_box(search(black_box(position), depth, &config).value));
        });
        group.bench_with_input(BenchmarkId::new("deepening", case.name), &position, |b, position| {
            b.iter(|| {
                let limits = SearchLimits::depth(depth);
                let node = iterative_deepening(black_box(position), &config, limits);
                black_box(node.map(|n| n.value))
            });
        });
    }

    group.finish();
}

criterion_group!(search_benches, bench_search);
criterion_main!(search_benches);
