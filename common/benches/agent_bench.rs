use chrono::Utc;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use snake_common::PlayerId;
use snake_common::games::SessionRng;
use snake_common::games::snake::{ActivePlayer, BotController, Direction, GameMode, GameState, GRID_SIZE};

fn bench_agent_steps(mode: GameMode, steps: usize) {
    let mut rng = SessionRng::new(42);
    let mut player = ActivePlayer::spawn(
        PlayerId::new("bench"),
        "BenchBot".to_string(),
        mode,
        GRID_SIZE,
        Utc::now(),
        &mut rng,
    );

    for _ in 0..steps {
        player = BotController::step(&player, GRID_SIZE, &mut rng);
    }
    black_box(player);
}

fn bench_engine_ticks(steps: usize) {
    let mut rng = SessionRng::new(42);
    let mut state = GameState::create_initial_state(GameMode::PassThrough, &mut rng).start_game(&mut rng);
    let turns = [Direction::Down, Direction::Left, Direction::Up, Direction::Right];

    for i in 0..steps {
        if i % 7 == 0 {
            state = state.set_direction(turns[(i / 7) % turns.len()]);
        }
        state = state.move_snake(&mut rng);
        if !state.is_playing() {
            state = state.start_game(&mut rng);
        }
    }
    black_box(state);
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("snake");

    group.bench_function("agent_1000_steps_walls", |b| {
        b.iter(|| bench_agent_steps(GameMode::Walls, 1000))
    });

    group.bench_function("agent_1000_steps_pass_through", |b| {
        b.iter(|| bench_agent_steps(GameMode::PassThrough, 1000))
    });

    group.bench_function("engine_1000_ticks", |b| {
        b.iter(|| bench_engine_ticks(1000))
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
