// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quartet::board::Board;
use quartet::eval::{MaterialScorer, Scorer, ThreatAwareScorer};

fn criterion_benchmark(c: &mut Criterion) {
    let midgame =
        Board::from_description(".......,.......,...y...,..ry...,.ryry..,ryyrry.").unwrap();

    c.bench_function("material-eval-midgame", |b| {
        let scorer = MaterialScorer::new();
        b.iter(|| scorer.score(black_box(&midgame)));
    });

    c.bench_function("threat-aware-eval-midgame", |b| {
        let scorer = ThreatAwareScorer::new();
        b.iter(|| scorer.score(black_box(&midgame)));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
