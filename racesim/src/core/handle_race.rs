use crate::core::race::{RaceSession, TurnEvent, TurnReport};
use crate::interfaces::gui_interface::{RaceState, RacerState, RgbColor};
use crate::post::race_result::RaceResult;
use crate::post::score_ledger::{ScoreLedger, ScoreStore};
use anyhow::Context;

/// handle_turn applies one direction code to the session. Once the race is over, the results of
/// all finishers are recorded in the ledger.
pub fn handle_turn<S: ScoreStore>(
    session: &mut RaceSession,
    ledger: &mut ScoreLedger<S>,
    code: u8,
) -> Option<TurnReport> {
    let report = match session.apply_turn(code) {
        Some(report) => report,
        None => {
            log::debug!("Ignored turn command {}", code);
            return None;
        }
    };

    if report.event != TurnEvent::Moved {
        let racer = &session.racers[report.racer_idx];
        log::debug!(
            "{} left the race at ({}, {})",
            racer.driver,
            racer.position().x,
            racer.position().y
        );
    }

    if report.next_turn.is_none() {
        let no_recorded = ledger.record_results(&session.racers, &session.track.name);
        log::debug!("Race over, {} result(s) recorded", no_recorded);
    }

    Some(report)
}

/// get_race_state creates the rendering snapshot of the current session state.
pub fn get_race_state(session: &RaceSession) -> anyhow::Result<RaceState> {
    let whose_turn = session.whose_turn();
    let winner = session.get_winner();
    let mut racer_states = Vec::with_capacity(session.racers.len());

    for (i, racer) in session.racers.iter().enumerate() {
        let tmp_color = racer
            .color
            .parse::<css_color_parser::Color>()
            .context(format!("Could not parse racer color {}!", racer.color))?;

        let candidates = if whose_turn == Some(i) {
            racer.next_position_candidates()
        } else {
            vec![]
        };

        racer_states.push(RacerState {
            driver: racer.driver.to_owned(),
            color: racer.color.to_owned(),
            rgb: RgbColor {
                r: tmp_color.r,
                g: tmp_color.g,
                b: tmp_color.b,
            },
            position: racer.position(),
            prev_position: racer.prev_position(),
            candidates,
            speed: racer.speed(),
            distance: racer.distance(),
            avg_speed: racer.avg_speed(),
            top_speed: racer.top_speed(),
            status: racer.status_text(winner),
            active: racer.active,
        });
    }

    let whose_turn_text = match whose_turn {
        Some(idx) => session.racers[idx].whose_turn_text(),
        None => String::from("Race over!"),
    };

    Ok(RaceState {
        racer_states,
        whose_turn,
        whose_turn_text,
        race_started: session.racers.iter().any(|racer| racer.ticks() > 0),
        race_over: session.is_over(),
        track_text: session.track.text(),
        direction: session.track.direction,
    })
}

/// handle_race feeds the inserted direction codes into the session until the codes run out or
/// the race is over, and returns the results for post-processing.
pub fn handle_race<S: ScoreStore>(
    session: &mut RaceSession,
    ledger: &mut ScoreLedger<S>,
    codes: &[u8],
    print_debug: bool,
) -> anyhow::Result<RaceResult> {
    for &code in codes.iter() {
        if session.is_over() {
            break;
        }

        if let Some(report) = handle_turn(session, ledger, code) {
            if print_debug {
                let racer = &session.racers[report.racer_idx];
                println!(
                    "DEBUG: {} -> ({}, {}), {:.0} km/h, {:?}",
                    racer.driver,
                    racer.position().x,
                    racer.position().y,
                    racer.speed(),
                    report.event
                );
            }
        }
    }

    if !session.is_over() {
        log::info!(
            "Command list exhausted with {} racer(s) still active",
            session.active_count()
        );
    }

    Ok(session.get_race_result())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::race::SimConstants;
    use crate::core::track::{Track, TrackPars};
    use crate::post::score_ledger::MemoryStore;
    use helpers::geometry::Point;

    fn session(drivers: &[&str]) -> RaceSession {
        let sim_consts = SimConstants::default();
        let track_pars = TrackPars {
            name: String::from("Square"),
            outer: vec![
                Point::new(0.0, 0.0),
                Point::new(1000.0, 0.0),
                Point::new(1000.0, 1000.0),
                Point::new(0.0, 1000.0),
            ],
            inner: vec![],
            finish_line: [Point::new(500.0, 100.0), Point::new(500.0, 900.0)],
        };
        let track = Track::new(&track_pars, drivers.len(), &sim_consts).unwrap();
        let drivers: Vec<String> = drivers.iter().map(|d| d.to_string()).collect();
        RaceSession::new(track, &drivers, 10.0, &sim_consts).unwrap()
    }

    #[test]
    fn snapshot_offers_candidates_to_the_turn_owner_only() {
        let session = session(&["Anna", "Bob"]);
        let state = get_race_state(&session).unwrap();

        assert_eq!(state.whose_turn, Some(0));
        assert_eq!(state.whose_turn_text, "It's Anna's (red) turn!");
        assert_eq!(state.racer_states[0].candidates.len(), 9);
        assert!(state.racer_states[1].candidates.is_empty());
        assert_eq!(state.racer_states[0].rgb, RgbColor { r: 255, g: 0, b: 0 });
        assert_eq!(state.racer_states[1].rgb, RgbColor { r: 0, g: 128, b: 0 });
        assert_eq!(state.track_text, "Square (2000 m)");
    }

    #[test]
    fn first_turn_prompt_names_the_direction() {
        let mut session = session(&["Anna", "Bob"]);
        let mut ledger = ScoreLedger::new(MemoryStore::default());

        let state = get_race_state(&session).unwrap();
        assert!(!state.race_started);
        assert_eq!(state.turn_prompt(), "It's Anna's (red) turn! Go right!");

        handle_turn(&mut session, &mut ledger, 5);
        let state = get_race_state(&session).unwrap();
        assert!(state.race_started);
        assert_eq!(state.turn_prompt(), "It's Bob's (green) turn!");
    }

    #[test]
    fn race_over_records_results() {
        let mut session = session(&["Anna"]);
        let mut ledger = ScoreLedger::new(MemoryStore::default());

        // drive upwards until leaving the track
        let result = handle_race(&mut session, &mut ledger, &[8; 20], false).unwrap();

        assert!(session.is_over());
        assert_eq!(result.standings[0].status, "DID NOT FINISH");
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].event, TurnEvent::OffRoad);
        assert!(ledger.best("Square").is_none());

        let state = get_race_state(&session).unwrap();
        assert!(state.race_over);
        assert_eq!(state.whose_turn_text, "Race over!");
    }

    #[test]
    fn invalid_codes_do_not_count_as_turns() {
        let mut session = session(&["Anna", "Bob"]);
        let mut ledger = ScoreLedger::new(MemoryStore::default());

        assert!(handle_turn(&mut session, &mut ledger, 0).is_none());
        assert!(handle_turn(&mut session, &mut ledger, 12).is_none());
        assert_eq!(session.whose_turn(), Some(0));
        assert_eq!(session.racers[0].ticks(), 0);
    }
}
