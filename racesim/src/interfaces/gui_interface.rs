use crate::core::track::Direction;
use helpers::geometry::Point;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// RacerState is the rendering snapshot of one racer.
/// * `color` - Color token, e.g. red
/// * `rgb` - Parsed icon color
/// * `prev_position` - Position before the last move (used to draw the trail segment)
/// * `candidates` - Positions reachable with the next move (empty unless it is the racer's turn)
/// * `speed`, `avg_speed`, `top_speed` - (km/h)
/// * `distance` - (m)
#[derive(Debug, Clone, Default)]
pub struct RacerState {
    pub driver: String,
    pub color: String,
    pub rgb: RgbColor,
    pub position: Point,
    pub prev_position: Point,
    pub candidates: Vec<Point>,
    pub speed: f64,
    pub distance: f64,
    pub avg_speed: f64,
    pub top_speed: f64,
    pub status: String,
    pub active: bool,
}

/// RaceState is the rendering snapshot of a session.
/// * `race_started` - True once any racer has moved
/// * `direction` - Direction in which the finish line must be crossed
#[derive(Debug, Clone)]
pub struct RaceState {
    pub racer_states: Vec<RacerState>,
    pub whose_turn: Option<usize>,
    pub whose_turn_text: String,
    pub race_started: bool,
    pub race_over: bool,
    pub track_text: String,
    pub direction: Direction,
}

impl RaceState {
    /// turn_prompt returns the turn text. Before the first move it also tells which way to go.
    pub fn turn_prompt(&self) -> String {
        if self.race_started || self.race_over {
            self.whose_turn_text.to_owned()
        } else {
            format!("{} Go {}!", self.whose_turn_text, self.direction)
        }
    }
}
