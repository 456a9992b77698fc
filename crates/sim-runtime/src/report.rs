use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::GameState;

use crate::resources::WeekLedger;

/// KPIs for one simulated week.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeekReport {
    /// Absolute week that was simulated.
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub player_streams: u64,
    pub player_sales: u64,
    pub streaming_revenue: Decimal,
    pub video_revenue: Decimal,
    pub promo_spend: Decimal,
    pub video_views: u64,
    /// Player cash after the week.
    pub money: Decimal,
    pub hype: f64,
    pub monthly_listeners: u64,
    pub npc_songs_released: usize,
    pub chart_debuts: usize,
    pub player_best_hot100: Option<u32>,
    /// Promotions cancelled this week for lack of funds.
    pub lapsed_promos: usize,
}

impl WeekReport {
    /// Income minus promo spend.
    pub fn net_income(&self) -> Decimal {
        self.streaming_revenue + self.video_revenue - self.promo_spend
    }

    /// `clock` is the calendar position that was simulated.
    pub(crate) fn from_ledger(
        clock: &sim_core::GameClock,
        ledger: &WeekLedger,
        state: &GameState,
    ) -> Self {
        Self {
            week: clock.absolute_week(),
            month: clock.month,
            year: clock.year,
            player_streams: ledger.player_streams,
            player_sales: ledger.player_sales,
            streaming_revenue: ledger.streaming_revenue,
            video_revenue: ledger.video_revenue,
            promo_spend: ledger.promo_spend,
            video_views: ledger.video_views,
            money: state.player.money,
            hype: state.player.hype,
            monthly_listeners: state.player.monthly_listeners,
            npc_songs_released: ledger.npc_songs_released,
            chart_debuts: ledger.chart_debuts,
            player_best_hot100: ledger.player_best_hot100,
            lapsed_promos: ledger.lapsed_promos,
        }
    }
}
