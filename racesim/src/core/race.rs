use crate::core::racer::Racer;
use crate::core::track::Track;
use crate::post::race_result::{RaceResult, Standing};
use helpers::general::{argsort, InputValueError, SortOrder};
use serde::{Deserialize, Serialize};

/// Icon colors of the racers in starting order. The number of colors limits the number of drivers.
pub const RACER_COLORS: [&str; 4] = ["red", "green", "blue", "purple"];

/// * `scale_t` - (s/tick) Time represented by one turn
/// * `scale_d` - (m/unit) Distance represented by one track unit
/// * `min_dist` - (-) Fraction of the track distance a racer must drive before a finish counts
/// * `crash_distance` - (units) Racers closer than this on both axes have crashed
/// * `grid_rows` - (-) Number of grid steps fitting into the play area height
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SimConstants {
    pub scale_t: f64,
    pub scale_d: f64,
    pub min_dist: f64,
    pub crash_distance: f64,
    pub grid_rows: f64,
}

impl Default for SimConstants {
    fn default() -> Self {
        SimConstants {
            scale_t: 1.2,
            scale_d: 1.0,
            min_dist: 0.8,
            crash_distance: 5.0,
            grid_rows: 60.0,
        }
    }
}

impl SimConstants {
    /// grid_step returns the step `dp` of the acceleration grid for a play area of the given
    /// height.
    pub fn grid_step(&self, height: f64) -> f64 {
        (height / self.grid_rows).floor()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    InProgress,
    Over,
}

/// Result of a racer's move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEvent {
    Moved,
    Finished { ranking: u32 },
    Crashed,
    OffRoad,
}

/// * `racer_idx` - Index of the racer that moved (starting order)
/// * `event` - What happened to the racer
/// * `next_turn` - Index of the racer whose turn it is now, `None` if the race is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnReport {
    pub racer_idx: usize,
    pub event: TurnEvent,
    pub next_turn: Option<usize>,
}

/// RaceEvent logs a racer leaving the race.
/// * `tick` - The racer's tick count when it happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceEvent {
    pub tick: u32,
    pub driver: String,
    pub event: TurnEvent,
}

/// RaceSession runs one race. The racers keep their starting order for the whole race, the turn
/// index points into the subset of racers that are still active.
#[derive(Debug)]
pub struct RaceSession {
    pub track: Track,
    pub racers: Vec<Racer>,
    pub events: Vec<RaceEvent>,
    active_count: usize,
    turn_index: usize,
    ranking_counter: u32,
    state: SessionState,
    crash_distance: f64,
}

impl RaceSession {
    /// The method creates a session for the inserted drivers and places them on the track's
    /// starting positions. The track must provide one starting position per driver.
    pub fn new(
        track: Track,
        drivers: &[String],
        dp: f64,
        sim_consts: &SimConstants,
    ) -> anyhow::Result<RaceSession> {
        if drivers.len() > RACER_COLORS.len() {
            return Err(InputValueError::new(&format!(
                "at most {} drivers can race, got {}",
                RACER_COLORS.len(),
                drivers.len()
            ))
            .into());
        }

        if drivers.len() != track.positions.len() {
            return Err(InputValueError::new(&format!(
                "track {} provides {} starting positions for {} drivers",
                track.name,
                track.positions.len(),
                drivers.len()
            ))
            .into());
        }

        // create racers on their starting positions
        let racers: Vec<Racer> = drivers
            .iter()
            .zip(RACER_COLORS.iter())
            .zip(track.positions.iter())
            .map(|((driver, color), p)| {
                let mut racer = Racer::new(driver, color, dp, sim_consts);
                racer.start_at(*p);
                racer
            })
            .collect();

        let state = if racers.is_empty() {
            SessionState::Over
        } else {
            SessionState::InProgress
        };

        log::info!(
            "Starting race on {} with {} racer(s), grid step {}",
            track.text(),
            racers.len(),
            dp
        );

        Ok(RaceSession {
            active_count: racers.len(),
            track,
            racers,
            events: vec![],
            turn_index: 0,
            ranking_counter: 1,
            state,
            crash_distance: sim_consts.crash_distance,
        })
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHOD ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// The method lets the racer whose turn it is drive in the direction given by the keypad code
    /// (1 - 9). The racer leaves the race if it finished, crashed into another racer, or drove
    /// off the track. Invalid codes and calls without an active racer are ignored (`None`).
    pub fn apply_turn(&mut self, code: u8) -> Option<TurnReport> {
        if self.racers.is_empty() || self.active_count == 0 {
            return None;
        }
        if !(1..=9).contains(&code) {
            return None;
        }

        // get current active racer and let it drive
        let racer_idx = self.get_active_idxs()[self.turn_index];
        self.racers[racer_idx].drive(code);

        let racer = &self.racers[racer_idx];
        let finished = self.track.has_finished(racer);
        let crashed = self.check_crash(racer_idx);
        let off_road = self.track.is_off_road(racer);

        let event = if finished {
            TurnEvent::Finished {
                ranking: self.ranking_counter,
            }
        } else if crashed {
            TurnEvent::Crashed
        } else if off_road {
            TurnEvent::OffRoad
        } else {
            TurnEvent::Moved
        };

        let mut eliminated = false;

        if event != TurnEvent::Moved {
            let racer = &mut self.racers[racer_idx];
            racer.active = false;

            if finished {
                racer.ranking = self.ranking_counter;
                self.ranking_counter += 1;
            }

            log::info!("{} {:?} after {} ticks", racer.driver, event, racer.ticks());
            self.events.push(RaceEvent {
                tick: racer.ticks(),
                driver: racer.driver.to_owned(),
                event,
            });

            self.active_count -= 1;
            eliminated = true;
        }

        if self.active_count == 0 {
            // no more active racers -> race is over
            log::info!("Race on {} is over", self.track.name);
            self.state = SessionState::Over;
            self.turn_index = 0;

            return Some(TurnReport {
                racer_idx,
                event,
                next_turn: None,
            });
        }

        // the active view shrank under the current index if the racer left the race, so the index
        // already points to the next racer in that case
        self.turn_index = if eliminated {
            self.turn_index % self.active_count
        } else {
            (self.turn_index + 1) % self.active_count
        };

        Some(TurnReport {
            racer_idx,
            event,
            next_turn: self.whose_turn(),
        })
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// The method checks if the racer is within the crash distance of any other racer on both
    /// axes. Racers that already left the race are included, their cars still occupy the track.
    fn check_crash(&self, racer_idx: usize) -> bool {
        let p = self.racers[racer_idx].position();

        self.racers.iter().enumerate().any(|(i, other)| {
            let q = other.position();
            i != racer_idx
                && (p.x - q.x).abs() < self.crash_distance
                && (p.y - q.y).abs() < self.crash_distance
        })
    }

    fn get_active_idxs(&self) -> Vec<usize> {
        self.racers
            .iter()
            .enumerate()
            .filter(|(_, racer)| racer.active)
            .map(|(i, _)| i)
            .collect()
    }

    /// The method returns the index (starting order) of the racer whose turn it is.
    pub fn whose_turn(&self) -> Option<usize> {
        if self.state == SessionState::Over {
            return None;
        }
        self.get_active_idxs().get(self.turn_index).copied()
    }

    pub fn get_winner(&self) -> Option<&Racer> {
        self.racers.iter().find(|racer| racer.ranking == 1)
    }

    pub fn is_over(&self) -> bool {
        self.state == SessionState::Over
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    pub fn ranking_counter(&self) -> u32 {
        self.ranking_counter
    }

    /// The method returns the final standings: finishers by ranking first, then the racers that
    /// did not finish (or are still racing) in starting order.
    pub fn get_race_result(&self) -> RaceResult {
        let sort_keys: Vec<u32> = self
            .racers
            .iter()
            .map(|racer| if racer.ranking > 0 { racer.ranking } else { u32::MAX })
            .collect();
        let winner = self.get_winner();

        let standings = argsort(&sort_keys, SortOrder::Ascending)
            .into_iter()
            .map(|i| {
                let racer = &self.racers[i];
                Standing {
                    driver: racer.driver.to_owned(),
                    color: racer.color.to_owned(),
                    ranking: racer.ranking,
                    ticks: racer.ticks(),
                    status: racer.status_text(winner),
                    distance: racer.distance(),
                    avg_speed: racer.avg_speed(),
                    top_speed: racer.top_speed(),
                }
            })
            .collect();

        RaceResult {
            track_name: self.track.name.to_owned(),
            track_distance: self.track.distance,
            standings,
            events: self.events.to_owned(),
        }
    }
}
