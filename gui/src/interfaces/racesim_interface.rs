use helpers::geometry::Point;
use racesim::core::handle_race::{get_race_state, handle_turn};
use racesim::core::race::RaceSession;
use racesim::interfaces::gui_interface::RaceState;
use racesim::post::score_ledger::{ScoreLedger, ScoreStore};

/// RacesimInterface owns the running session and keeps the rendering snapshot and the racers'
/// trails up to date.
#[derive(Debug)]
pub struct RacesimInterface<S: ScoreStore> {
    pub session: Option<RaceSession>,
    pub ledger: ScoreLedger<S>,
    pub race_state: Option<RaceState>,
    pub trails: Vec<Vec<Point>>,
}

impl<S: ScoreStore> RacesimInterface<S> {
    pub fn new(ledger: ScoreLedger<S>) -> RacesimInterface<S> {
        RacesimInterface {
            session: None,
            ledger,
            race_state: None,
            trails: vec![],
        }
    }

    /// The method replaces the current session (if any) by the inserted one.
    pub fn start(&mut self, session: RaceSession) -> anyhow::Result<()> {
        self.trails = session
            .racers
            .iter()
            .map(|racer| vec![racer.position()])
            .collect();
        self.race_state = Some(get_race_state(&session)?);
        self.session = Some(session);
        Ok(())
    }

    /// The method forwards a direction code to the session and updates the snapshot. Commands
    /// without a running session are ignored.
    pub fn drive(&mut self, code: u8) -> anyhow::Result<()> {
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => return Ok(()),
        };

        if let Some(report) = handle_turn(session, &mut self.ledger, code) {
            let p = session.racers[report.racer_idx].position();
            if let Some(trail) = self.trails.get_mut(report.racer_idx) {
                trail.push(p);
            }
            self.race_state = Some(get_race_state(session)?);
        }

        Ok(())
    }

    pub fn track_name(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.track.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use racesim::core::race::SimConstants;
    use racesim::core::track::{Track, TrackPars};
    use racesim::post::score_ledger::MemoryStore;

    fn session() -> RaceSession {
        let sim_consts = SimConstants::default();
        let track_pars = TrackPars {
            name: String::from("Square"),
            outer: vec![
                Point::new(0.0, 0.0),
                Point::new(600.0, 0.0),
                Point::new(600.0, 600.0),
                Point::new(0.0, 600.0),
            ],
            inner: vec![],
            finish_line: [Point::new(300.0, 0.0), Point::new(300.0, 300.0)],
        };
        let track = Track::new(&track_pars, 2, &sim_consts).unwrap();
        let drivers = vec![String::from("Anna"), String::from("Bob")];
        RaceSession::new(track, &drivers, 10.0, &sim_consts).unwrap()
    }

    #[test]
    fn trails_follow_the_racers() {
        let mut interface = RacesimInterface::new(ScoreLedger::new(MemoryStore::default()));
        interface.drive(6).unwrap();
        assert!(interface.race_state.is_none());

        interface.start(session()).unwrap();
        interface.drive(6).unwrap();
        interface.drive(2).unwrap();
        interface.drive(0).unwrap();

        assert_eq!(
            interface.trails[0],
            vec![Point::new(300.0, 100.0), Point::new(310.0, 100.0)]
        );
        assert_eq!(
            interface.trails[1],
            vec![Point::new(300.0, 200.0), Point::new(300.0, 210.0)]
        );
        assert_eq!(interface.race_state.as_ref().unwrap().whose_turn, Some(0));
        assert_eq!(interface.track_name(), Some("Square"));
    }
}
