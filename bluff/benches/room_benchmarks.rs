use bluff::{
    Room, RoomConfig,
    entities::{CardId, ClientId, Deck, RoomId},
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{SeedableRng, rngs::StdRng};

/// Room with `n_players` seated and a game dealt
fn setup_room(n_players: usize) -> Room {
    let mut room = Room::new(RoomId::new("BENCH"), RoomConfig::default());
    for i in 0..n_players {
        room.join(ClientId::new(&format!("PLAYER{i}X")), "p").unwrap();
    }
    room.start_game(&ClientId::new("PLAYER0X"), &mut StdRng::seed_from_u64(7))
        .unwrap();
    room
}

/// Benchmark shuffling a fresh deck
fn bench_shuffle(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    c.bench_function("deck_shuffle", |b| {
        b.iter(|| Deck::shuffled(&mut rng));
    });
}

/// Benchmark dealing a game for varying table sizes
fn bench_start_game(c: &mut Criterion) {
    let mut group = c.benchmark_group("start_game");

    for n_players in [2, 3, 5] {
        group.bench_with_input(
            BenchmarkId::from_parameter(n_players),
            &n_players,
            |b, &n| {
                let mut room = setup_room(n);
                let mut rng = StdRng::seed_from_u64(3);
                let host = ClientId::new("PLAYER0X");
                b.iter(|| room.start_game(&host, &mut rng).unwrap());
            },
        );
    }

    group.finish();
}

/// Benchmark one play followed by a challenge
fn bench_play_and_challenge(c: &mut Criterion) {
    c.bench_function("play_and_challenge", |b| {
        b.iter_batched(
            || setup_room(3),
            |mut room| {
                let claimant = ClientId::new("PLAYER0X");
                let card: CardId = room.hand(&claimant)[0].id.clone();
                room.play(&claimant, &[card], "A").unwrap();
                room.challenge(&ClientId::new("PLAYER1X")).unwrap();
                room
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Benchmark building both views after a mutation
fn bench_views(c: &mut Criterion) {
    let room = setup_room(5);
    let players: Vec<ClientId> = room.players().iter().map(|p| p.id.clone()).collect();

    c.bench_function("public_and_hand_views", |b| {
        b.iter(|| {
            let view = room.public_view();
            let hands: Vec<_> = players.iter().map(|id| room.hand_view(id)).collect();
            (view, hands)
        });
    });
}

criterion_group!(
    benches,
    bench_shuffle,
    bench_start_game,
    bench_play_and_challenge,
    bench_views
);
criterion_main!(benches);
