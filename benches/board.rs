// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quartet::board::{Board, Column};

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("play-and-swap", |b| {
        let board = Board::new();
        let column = Column::new(3).unwrap();
        b.iter(|| {
            let mut board = black_box(&board).clone();
            board.play(black_box(column));
            board.swap();
        });
    });

    c.bench_function("is-win-midgame", |b| {
        let board =
            Board::from_description(".......,.......,...y...,..ry...,.ryry..,ryyrry.").unwrap();
        b.iter(|| black_box(&board).is_win());
    });

    c.bench_function("count-connections-midgame", |b| {
        let board =
            Board::from_description(".......,.......,...y...,..ry...,.ryry..,ryyrry.").unwrap();
        b.iter(|| black_box(&board).count_connections());
    });

    c.bench_function("get-threat-info-midgame", |b| {
        let board =
            Board::from_description(".......,.......,...y...,..ry...,.ryry..,ryyrry.").unwrap();
        b.iter(|| black_box(&board).get_threat_info());
    });

    c.bench_function("description-round-trip", |b| {
        let board =
            Board::from_description(".......,.......,...y...,..ry...,.ryry..,ryyrry.").unwrap();
        b.iter(|| {
            let description = black_box(&board).get_description(None, false);
            Board::from_description(&description).unwrap()
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
