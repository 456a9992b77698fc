//! Weekly systems, run in a fixed chain against [`StagedState`].

use bevy_ecs::prelude::*;
use rust_decimal::Decimal;
use sim_charts::{chart_leader_genre, update_charts, ChartOptions};
use sim_core::{average_popularity, ArtistRef, NpcId, PromoStrategy, Song};
use sim_econ::lifecycle::ACTIVE_WEEKS;
use sim_econ::{
    apply_video_week, compute_video_week, drift_genre_trends, estimate_listeners,
    simulate_song_week, ArtistContext, FameSource, ListenerArtist, ListenerSeason, WeekContext,
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::resources::{Constants, Settings, StagedState, WeekLedger, WeekRng};

/// Weekly hype retention.
pub const HYPE_RETENTION: f64 = 0.98;
pub const HYPE_MAX: f64 = 1000.0;
/// Popularity points gained per this many regional player streams.
pub const REGION_GROWTH_STREAMS: f64 = 2_000_000.0;
pub const REGION_GROWTH_CAP: f64 = 2.0;
pub const REGION_DECAY: f64 = 0.1;
/// Lifetime video views needed before videos earn ad revenue.
pub const MONETIZATION_VIEWS: u64 = 1_000;

/// Rival releases land first so they get their launch week like any other
/// release made during the week.
pub fn npc_releases(
    mut staged: ResMut<StagedState>,
    mut rng: ResMut<WeekRng>,
    mut ledger: ResMut<WeekLedger>,
) {
    ledger.npc_songs_released = sim_ai::run_npc_releases(&mut staged.0, &mut rng.0);
}

/// Charge promos, run every song through the weekly calculator and bank the
/// player's share.
pub fn simulate_songs(
    mut staged: ResMut<StagedState>,
    constants: Res<Constants>,
    mut rng: ResMut<WeekRng>,
    mut ledger: ResMut<WeekLedger>,
) {
    let state = &mut staged.0;
    let constants = &constants.0;
    let rng = &mut rng.0;
    let week = state.clock.absolute_week();
    let themes = state.clock.active_themes();

    let player = ArtistContext {
        monthly_listeners: state.player.monthly_listeners,
        fame: FameSource::Regional,
    };
    let npcs: BTreeMap<NpcId, ArtistContext> = state
        .npcs
        .iter()
        .map(|n| {
            let ctx = ArtistContext {
                monthly_listeners: n.monthly_listeners,
                fame: FameSource::Global(n.global_popularity),
            };
            (n.id.clone(), ctx)
        })
        .collect();
    let ctx = WeekContext {
        absolute_week: week,
        month: state.clock.month,
        active_themes: &themes,
        genre_trends: &state.genre_trends,
        constants,
    };

    for song in state.songs.iter_mut() {
        let artist = match &song.artist {
            ArtistRef::Player => player,
            ArtistRef::Npc(id) => match npcs.get(id) {
                Some(c) => *c,
                None => continue,
            },
        };
        if artist.fame == FameSource::Regional {
            charge_promo(song, week, &mut state.player.money, constants, &mut ledger);
        }

        let result = simulate_song_week(song, &ctx, &artist, &state.regions, rng);
        if !song.artist.is_player() {
            continue;
        }
        state.player.money += result.revenue;
        ledger.streaming_revenue += result.revenue;
        ledger.player_streams += result.weekly_streams;
        ledger.player_sales += result.weekly_sales;
        ledger.hype_gain += result.hype_delta;
        for (region, (streams, _)) in &result.regional {
            *ledger
                .player_regional_streams
                .entry(region.clone())
                .or_default() += streams;
        }
    }
    debug!(
        week,
        streams = ledger.player_streams,
        revenue = %ledger.streaming_revenue,
        "songs simulated"
    );
}

/// Weekly promo billing: paid while the single is fresh or active, cancelled
/// once it ages out or the player cannot cover it.
fn charge_promo(
    song: &mut Song,
    week: u32,
    money: &mut Decimal,
    constants: &sim_core::WorldConstants,
    ledger: &mut WeekLedger,
) {
    if song.promo == PromoStrategy::None || !song.is_single() {
        return;
    }
    if song.age_at(week) > ACTIVE_WEEKS {
        debug!(song = %song.id.0, "promo ended");
        song.promo = PromoStrategy::None;
        return;
    }
    let cost = constants.promo_cost(song.promo);
    if *money >= cost {
        *money -= cost;
        ledger.promo_spend += cost;
    } else {
        warn!(song = %song.id.0, cost = %cost, "promo lapsed: insufficient funds");
        song.promo = PromoStrategy::None;
        ledger.lapsed_promos += 1;
    }
}

/// Albums have no formula of their own: weekly sales are their tracks' sum.
pub fn aggregate_albums(mut staged: ResMut<StagedState>) {
    let state = &mut staged.0;
    let sales: BTreeMap<&sim_core::SongId, u64> = state
        .songs
        .iter()
        .map(|s| (&s.id, s.weekly_sales))
        .collect();
    for album in state.albums.iter_mut() {
        let weekly: u64 = album
            .track_ids
            .iter()
            .filter_map(|t| sales.get(t))
            .sum();
        album.weekly_sales = weekly;
        album.total_sales = album.total_sales.saturating_add(weekly);
    }
}

pub fn simulate_videos(
    mut staged: ResMut<StagedState>,
    mut rng: ResMut<WeekRng>,
    mut ledger: ResMut<WeekLedger>,
) {
    let state = &mut staged.0;
    let rng = &mut rng.0;
    let week = state.clock.absolute_week();
    let popularity = average_popularity(&state.regions);

    for video in state.videos.iter_mut() {
        let result = compute_video_week(video, week, popularity, &state.regions, rng);
        apply_video_week(video, &result);
        ledger.video_views += result.views;
        ledger.video_revenue += result.revenue;
        ledger.hype_gain += result.hype_delta;
    }
    state.player.money += ledger.video_revenue;

    let lifetime: u64 = state.videos.iter().map(|v| v.total_views).sum();
    if lifetime >= MONETIZATION_VIEWS && state.videos.iter().any(|v| !v.monetized) {
        for video in state.videos.iter_mut() {
            video.monetized = true;
        }
        info!(lifetime_views = lifetime, "channel monetized");
    }
}

/// Monthly listeners for the player and every NPC.
pub fn update_listeners(mut staged: ResMut<StagedState>) {
    let state = &mut staged.0;
    let season = ListenerSeason {
        is_holiday: state.clock.is_holiday(),
        is_halloween: state.clock.is_halloween(),
    };

    let mut by_npc: BTreeMap<&NpcId, Vec<&Song>> = BTreeMap::new();
    let mut player_songs = Vec::new();
    for song in &state.songs {
        match &song.artist {
            ArtistRef::Player => player_songs.push(song),
            ArtistRef::Npc(id) => by_npc.entry(id).or_default().push(song),
        }
    }

    let player = estimate_listeners(
        state.player.monthly_listeners,
        &player_songs,
        &state.regions,
        &state.genre_trends,
        season,
        ListenerArtist::Player,
    );
    let npc_listeners: Vec<u64> = state
        .npcs
        .iter()
        .map(|npc| {
            let songs = by_npc.get(&npc.id).map(Vec::as_slice).unwrap_or(&[]);
            estimate_listeners(
                npc.monthly_listeners,
                songs,
                &state.regions,
                &state.genre_trends,
                season,
                ListenerArtist::Npc(npc),
            )
        })
        .collect();

    state.player.monthly_listeners = player;
    for (npc, listeners) in state.npcs.iter_mut().zip(npc_listeners) {
        npc.monthly_listeners = listeners;
    }
}

/// Hype decays 2% a week and gains from this week's songs and videos.
pub fn update_hype(mut staged: ResMut<StagedState>, ledger: Res<WeekLedger>) {
    let player = &mut staged.0.player;
    player.hype = (player.hype * HYPE_RETENTION + ledger.hype_gain).clamp(0.0, HYPE_MAX);
}

/// Regional fame grows with the player's streams there and slowly decays.
pub fn grow_regions(mut staged: ResMut<StagedState>, ledger: Res<WeekLedger>) {
    for region in staged.0.regions.iter_mut() {
        let streams = ledger
            .player_regional_streams
            .get(&region.id)
            .copied()
            .unwrap_or(0);
        let growth = (streams as f64 / REGION_GROWTH_STREAMS).min(REGION_GROWTH_CAP);
        region.popularity = (region.popularity + growth - REGION_DECAY).clamp(0.0, 100.0);
    }
}

/// Genre trends drift, nudged toward last week's HOT_100 leader.
pub fn drift_trends(
    mut staged: ResMut<StagedState>,
    constants: Res<Constants>,
    mut rng: ResMut<WeekRng>,
) {
    let state = &mut staged.0;
    let leader = chart_leader_genre(state);
    drift_genre_trends(
        &mut state.genre_trends,
        &constants.0.genres,
        leader.as_ref(),
        &mut rng.0,
    );
}

pub fn rebuild_charts(
    mut staged: ResMut<StagedState>,
    constants: Res<Constants>,
    settings: Res<Settings>,
    mut ledger: ResMut<WeekLedger>,
) {
    let options = ChartOptions {
        pad_song_charts: settings.0.pad_song_charts,
    };
    let update = update_charts(&mut staged.0, &constants.0, options);
    ledger.chart_debuts = update.first_time_entries;
    ledger.player_best_hot100 = update.player_best_hot100;
}

/// Last step: the week is done, move the calendar on.
pub fn advance_clock(mut staged: ResMut<StagedState>) {
    staged.0.clock.advance();
}
