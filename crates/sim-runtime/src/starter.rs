//! Fresh career worlds.

use rand::Rng;
use rust_decimal::Decimal;
use sim_core::{
    seeded_rng, GameClock, GameState, NpcArtist, NpcId, PlayerProfile, WorldConstants,
};
use std::collections::BTreeMap;

/// Cash a new player starts with.
pub const STARTING_MONEY_USD: i64 = 50_000;

const NPC_FIRST: [&str; 10] = [
    "Nova", "Kai", "Luna", "Rex", "Ivy", "Jax", "Mira", "Zane", "Cleo", "Dex",
];
const NPC_LAST: [&str; 8] = [
    "Vega", "Stone", "Rivers", "Blaze", "Monroe", "Sky", "Frost", "Reyes",
];

fn npc_name(index: usize) -> String {
    let first = NPC_FIRST[index % NPC_FIRST.len()];
    let last = NPC_LAST[(index / NPC_FIRST.len()) % NPC_LAST.len()];
    let round = index / (NPC_FIRST.len() * NPC_LAST.len());
    if round == 0 {
        format!("{first} {last}")
    } else {
        format!("{first} {last} {}", round + 1)
    }
}

/// Build a new career: the player at starting cash and regional fame, `npcs`
/// rival artists spread over the configured genres, neutral genre trends and
/// empty charts.
pub fn new_career(
    constants: &WorldConstants,
    player_name: &str,
    npcs: usize,
    start_year: i32,
    seed: u64,
) -> GameState {
    let mut rng = seeded_rng(seed);
    let mut state = GameState {
        clock: GameClock::new(start_year),
        player: PlayerProfile {
            name: player_name.to_string(),
            money: Decimal::new(STARTING_MONEY_USD, 0),
            hype: 0.0,
            monthly_listeners: 0,
        },
        regions: constants.initial_regions(),
        songs: Vec::new(),
        albums: Vec::new(),
        videos: Vec::new(),
        npcs: Vec::with_capacity(npcs),
        genre_trends: constants
            .genres
            .iter()
            .map(|g| (g.id.clone(), 1.0))
            .collect::<BTreeMap<_, _>>(),
        charts: BTreeMap::new(),
        next_id: 0,
    };

    if constants.genres.is_empty() {
        return state;
    }
    for index in 0..npcs {
        let genre = &constants.genres[rng.gen_range(0..constants.genres.len())];
        let popularity: f64 = rng.gen_range(10.0..90.0);
        let id = NpcId(state.allocate_id("npc"));
        state.npcs.push(NpcArtist {
            id,
            name: npc_name(index),
            genre: genre.id.clone(),
            global_popularity: popularity,
            monthly_listeners: (popularity * popularity * 500.0) as u64,
            release_propensity: rng.gen_range(0.1..0.5),
            last_release_week: None,
        });
    }
    state
}
