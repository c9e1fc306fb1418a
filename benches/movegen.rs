use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tabiya::chess::core::Promotion;
use tabiya::chess::game::Game;

fn start_position_legal_moves(c: &mut Criterion) {
    c.bench_function("start_position_legal_moves", |b| {
        b.iter(|| {
            let mut game = Game::new(|_| Promotion::Queen);
            game.start();
            black_box(game.legal_moves().len())
        });
    });
}

criterion_group!(benches, start_position_legal_moves);
criterion_main!(benches);
