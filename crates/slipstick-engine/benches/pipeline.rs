use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use slipstick_engine::{generate_tutorial, parser, Player, SimulatedInstrument};
use slipstick_model::RuleProfile;

// One expression per emitter path: index multiply, chained inverted
// division, the four-step log method, and a trig/root mix.
const EXPRESSIONS: &[&str] = &["2*3.5", "1/7/3", "2^10", "sin(30)*sqrt(16)"];

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for text in EXPRESSIONS {
        group.bench_with_input(BenchmarkId::from_parameter(text), text, |b, text| {
            b.iter(|| black_box(parser::parse(black_box(text)).unwrap()))
        });
    }
    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let profile = RuleProfile::versalog_ii();
    let mut group = c.benchmark_group("generate_tutorial");
    for text in EXPRESSIONS {
        group.bench_with_input(BenchmarkId::from_parameter(text), text, |b, text| {
            b.iter(|| black_box(generate_tutorial(black_box(text), &profile).unwrap()))
        });
    }
    group.finish();
}

fn bench_play(c: &mut Criterion) {
    let profile = RuleProfile::versalog_ii();
    let mut group = c.benchmark_group("play_all");
    for text in EXPRESSIONS {
        let tutorial = generate_tutorial(text, &profile).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(text), &tutorial, |b, tutorial| {
            b.iter(|| {
                let mut player = Player::new(&tutorial.steps, SimulatedInstrument::new());
                player.play_all();
                black_box(player.check_passed())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_generate, bench_play);
criterion_main!(benches);
