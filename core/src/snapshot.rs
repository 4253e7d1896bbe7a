//! Read model: everything a UI needs to render the simulator, in one
//! serializable value. No other core state is exposed.

use crate::{
    activity_log::SimulationLogItem,
    aggregate::{ChartPoint, SimulationTotals},
    calculator::DailyData,
    clock::RunState,
    params::{Currency, SimulationParams},
    session::{ActualComparison, ActualResults},
    types::{Day, SessionId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimSnapshot {
    pub state:              RunState,
    pub current_day:        Day,
    pub currency:           Currency,
    pub params:             SimulationParams,
    /// Live totals once a day has run, otherwise the projection.
    pub totals:             SimulationTotals,
    pub projection:         SimulationTotals,
    pub daily_data:         Vec<DailyData>,
    pub chart:              Vec<ChartPoint>,
    /// Newest first.
    pub log:                Vec<SimulationLogItem>,
    pub advisory_text:      Option<String>,
    pub advisory_pending:   bool,
    pub current_session_id: Option<SessionId>,
    pub actual_results:     Option<ActualResults>,
    pub comparison:         Option<ActualComparison>,
}
