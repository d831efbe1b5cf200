use crate::core::race::SimConstants;
use helpers::general::format_clock;
use helpers::geometry::Point;

/// Racer stores the kinematic state of one driver's car.
/// * `driver` - Driver name
/// * `color` - Color token of the racer icon, e.g. red
/// * `x`, `y` - Current position
/// * `dx`, `dy` - Displacement realized by the last move (the velocity carried into the next
/// turn)
/// * `x0`, `y0` - Position before the last move
/// * `dist` - (units) Total distance driven
/// * `top_speed` - (km/h) Highest speed reached so far
/// * `ticks` - Number of turns taken
/// * `active` - True while the racer still takes turns
/// * `ranking` - Finishing position, 0 while racing or if the racer did not finish
/// * `dp` - (units) Grid step of the 3x3 acceleration grid
#[derive(Debug, Clone)]
pub struct Racer {
    pub driver: String,
    pub color: String,
    x: f64,
    y: f64,
    dx: f64,
    dy: f64,
    x0: f64,
    y0: f64,
    dist: f64,
    top_speed: f64,
    ticks: u32,
    pub active: bool,
    pub ranking: u32,
    dp: f64,
    scale_t: f64,
    scale_d: f64,
}

impl Racer {
    pub fn new(driver: &str, color: &str, dp: f64, sim_consts: &SimConstants) -> Racer {
        Racer {
            driver: driver.to_owned(),
            color: color.to_owned(),
            x: 0.0,
            y: 0.0,
            dx: 0.0,
            dy: 0.0,
            x0: 0.0,
            y0: 0.0,
            dist: 0.0,
            top_speed: 0.0,
            ticks: 0,
            active: true,
            ranking: 0,
            dp,
            scale_t: sim_consts.scale_t,
            scale_d: sim_consts.scale_d,
        }
    }

    /// The method places the racer on its starting position.
    pub fn start_at(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
        self.x0 = p.x;
        self.y0 = p.y;
    }

    /// The method drives the racer in the direction given by a numeric keypad code (1 - 9, 5
    /// keeps the current velocity). The chosen acceleration is added to the velocity of the last
    /// turn before moving. Invalid codes leave the velocity unchanged.
    pub fn drive(&mut self, code: u8) {
        let (ax, ay) = match code {
            1 => (-1.0, 1.0),
            2 => (0.0, 1.0),
            3 => (1.0, 1.0),
            4 => (-1.0, 0.0),
            6 => (1.0, 0.0),
            7 => (-1.0, -1.0),
            8 => (0.0, -1.0),
            9 => (1.0, -1.0),
            _ => (0.0, 0.0),
        };
        self.dx += ax * self.dp;
        self.dy += ay * self.dp;

        // update current and previous positions, deltas reflect the realized displacement
        self.x0 = self.x;
        self.y0 = self.y;
        self.x += self.dx;
        self.y += self.dy;
        self.dx = self.x - self.x0;
        self.dy = self.y - self.y0;

        // update distance, top speed, and time ticks
        self.dist += (self.dx.powi(2) + self.dy.powi(2)).sqrt();
        if self.speed() > self.top_speed {
            self.top_speed = self.speed();
        }
        self.ticks += 1;
    }

    /// The method returns the nine positions the racer can reach with its next move, ordered by
    /// x offset first (-dp, 0, +dp) and y offset second.
    pub fn next_position_candidates(&self) -> Vec<Point> {
        let mut candidates = Vec::with_capacity(9);

        for k in -1..=1 {
            for m in -1..=1 {
                candidates.push(Point::new(
                    self.x + self.dx + k as f64 * self.dp,
                    self.y + self.dy + m as f64 * self.dp,
                ));
            }
        }

        candidates
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn prev_position(&self) -> Point {
        Point::new(self.x0, self.y0)
    }

    pub fn velocity(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// (km/h) top speed
    pub fn top_speed(&self) -> f64 {
        self.top_speed
    }

    fn scale_v(&self) -> f64 {
        3.6 * self.scale_d / self.scale_t
    }

    /// (km/h) current speed
    pub fn speed(&self) -> f64 {
        (self.dx.powi(2) + self.dy.powi(2)).sqrt() * self.scale_v()
    }

    /// (m) total distance driven
    pub fn distance(&self) -> f64 {
        self.dist * self.scale_d
    }

    /// (km/h) average speed, a racer without ticks counts as having taken one
    pub fn avg_speed(&self) -> f64 {
        let ticks = if self.ticks > 0 { self.ticks } else { 1 };
        self.distance() / ticks as f64 * self.scale_v()
    }

    fn ticks_to_ms(&self, ticks: i64) -> u64 {
        (ticks as f64 * self.scale_t * 1000.0).floor().max(0.0) as u64
    }

    /// The method returns the total race time, e.g. "01:23.6".
    pub fn total_time(&self) -> String {
        format_clock(self.ticks_to_ms(self.ticks as i64))
    }

    /// The method returns the time gap to another racer (usually the winner). Negative gaps are
    /// clamped to zero.
    pub fn delta_time(&self, other: &Racer) -> String {
        format_clock(self.ticks_to_ms(self.ticks as i64 - other.ticks as i64))
    }

    /// The method returns the announcement of this racer's turn, e.g. "It's Anna's (red) turn!".
    pub fn whose_turn_text(&self) -> String {
        let ends_with_sibilant = self
            .driver
            .chars()
            .last()
            .map(|c| matches!(c.to_ascii_lowercase(), 's' | 'z'))
            .unwrap_or(false);
        let suffix = if ends_with_sibilant { "'" } else { "'s" };

        format!("It's {}{} ({}) turn!", self.driver, suffix, self.color)
    }

    /// The method returns the race status shown in the status table: empty while racing,
    /// the winner's time, the gap to the winner, or DID NOT FINISH.
    pub fn status_text(&self, winner: Option<&Racer>) -> String {
        if self.active {
            String::new()
        } else if self.ranking == 0 {
            String::from("DID NOT FINISH")
        } else if self.ranking == 1 {
            format!("#1 time: {}", self.total_time())
        } else {
            match winner {
                Some(winner) => format!("#{} gap: +{}", self.ranking, self.delta_time(winner)),
                None => format!("#{} time: {}", self.ranking, self.total_time()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn racer(name: &str) -> Racer {
        let mut racer = Racer::new(name, "red", 10.0, &SimConstants::default());
        racer.start_at(Point::new(100.0, 100.0));
        racer
    }

    #[test]
    fn velocity_persists_between_turns() {
        let mut racer = racer("Anna");
        racer.drive(6);
        assert_eq!(racer.position(), Point::new(110.0, 100.0));
        racer.drive(5);
        assert_eq!(racer.position(), Point::new(120.0, 100.0));
        assert_eq!(racer.prev_position(), Point::new(110.0, 100.0));
        racer.drive(3);
        assert_eq!(racer.position(), Point::new(140.0, 110.0));
        assert_eq!(racer.velocity(), (20.0, 10.0));
        racer.drive(7);
        assert_eq!(racer.velocity(), (10.0, 0.0));
        assert_eq!(racer.ticks(), 4);
    }

    #[test]
    fn keypad_codes_map_to_compass_directions() {
        let expected = [
            (1, (-10.0, 10.0)),
            (2, (0.0, 10.0)),
            (3, (10.0, 10.0)),
            (4, (-10.0, 0.0)),
            (5, (0.0, 0.0)),
            (6, (10.0, 0.0)),
            (7, (-10.0, -10.0)),
            (8, (0.0, -10.0)),
            (9, (10.0, -10.0)),
        ];

        for (code, velocity) in expected.iter() {
            let mut racer = racer("Anna");
            racer.drive(*code);
            assert_eq!(racer.velocity(), *velocity, "code {}", code);
        }
    }

    #[test]
    fn distance_and_speeds_are_scaled() {
        let mut racer = racer("Anna");
        assert_relative_eq!(racer.avg_speed(), 0.0);

        racer.drive(6);
        racer.drive(6);
        racer.drive(4);
        // steps of 10, 20, 10 units
        assert_relative_eq!(racer.distance(), 40.0);
        assert_relative_eq!(racer.speed(), 10.0 * 3.0, epsilon = 1e-9);
        assert_relative_eq!(racer.top_speed(), 20.0 * 3.0, epsilon = 1e-9);
        assert_relative_eq!(racer.avg_speed(), 40.0 / 3.0 * 3.0, epsilon = 1e-9);
    }

    #[test]
    fn candidates_surround_the_projected_position() {
        let mut racer = racer("Anna");
        racer.drive(6);
        let candidates = racer.next_position_candidates();
        assert_eq!(candidates.len(), 9);
        assert_eq!(candidates[0], Point::new(110.0, 90.0));
        assert_eq!(candidates[4], Point::new(120.0, 100.0));
        assert_eq!(candidates[8], Point::new(130.0, 110.0));
    }

    #[test]
    fn times_are_formatted_as_clock() {
        let mut winner = racer("Anna");
        let mut second = racer("Bob");
        for _ in 0..50 {
            winner.drive(5);
        }
        for _ in 0..60 {
            second.drive(5);
        }
        assert_eq!(winner.total_time(), "01:00.0");
        assert_eq!(second.delta_time(&winner), "12.0");
        assert_eq!(winner.delta_time(&second), "00.0");
    }

    #[test]
    fn turn_text_respects_possessive_form() {
        assert_eq!(racer("Anna").whose_turn_text(), "It's Anna's (red) turn!");
        assert_eq!(racer("James").whose_turn_text(), "It's James' (red) turn!");
        assert_eq!(racer("FRITZ").whose_turn_text(), "It's FRITZ' (red) turn!");
    }

    #[test]
    fn status_text_depends_on_ranking() {
        let mut winner = racer("Anna");
        let mut second = racer("Bob");
        let mut crashed = racer("Carl");
        assert_eq!(winner.status_text(None), "");

        for _ in 0..10 {
            winner.drive(5);
        }
        for _ in 0..11 {
            second.drive(5);
        }
        winner.active = false;
        winner.ranking = 1;
        second.active = false;
        second.ranking = 2;
        crashed.active = false;

        assert_eq!(winner.status_text(Some(&winner)), "#1 time: 12.0");
        assert_eq!(second.status_text(Some(&winner)), "#2 gap: +01.2");
        assert_eq!(crashed.status_text(Some(&winner)), "DID NOT FINISH");
    }
}
