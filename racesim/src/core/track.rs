use crate::core::race::SimConstants;
use crate::core::racer::Racer;
use helpers::general::InvalidFinishLineError;
use helpers::geometry::{point_in_polygon, ring_length, segment_intersection, BoundingBox, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

/// (-) Side length of the normalized square that track definitions are given in
pub const NORMALIZED_EXTENT: f64 = 1000.0;

/// * `name` - Track name
/// * `outer` - Outer boundary polygon, racers must stay inside of it
/// * `inner` - Inner boundary polygon (hole), racers must stay outside of it (empty for a simple
/// filled loop)
/// * `finish_line` - Start/finish line, must be either horizontal or vertical. The ordering of
/// its end points determines the direction in which it must be crossed.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TrackPars {
    pub name: String,
    pub outer: Vec<Point>,
    #[serde(default)]
    pub inner: Vec<Point>,
    pub finish_line: [Point; 2],
}

impl TrackPars {
    /// The method maps the normalized coordinates onto a play area of the given size. Scaled
    /// coordinates are floored to whole units.
    pub fn scaled(&self, width: f64, height: f64) -> TrackPars {
        let scale_x = width / NORMALIZED_EXTENT;
        let scale_y = height / NORMALIZED_EXTENT;
        let scale = |p: &Point| Point::new((p.x * scale_x).floor(), (p.y * scale_y).floor());

        TrackPars {
            name: self.name.to_owned(),
            outer: self.outer.iter().map(scale).collect(),
            inner: self.inner.iter().map(scale).collect(),
            finish_line: [scale(&self.finish_line[0]), scale(&self.finish_line[1])],
        }
    }

    pub fn has_valid_finish_line(&self) -> bool {
        Direction::from_finish_line(&self.finish_line).is_some()
    }
}

/// Direction a racer must be moving in when crossing the finish line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// from_finish_line derives the direction from the finish line's axis and end point ordering.
    /// It returns `None` if the line is neither horizontal nor vertical (or has zero length).
    pub fn from_finish_line(finish_line: &[Point; 2]) -> Option<Direction> {
        let [p0, p1] = finish_line;

        if p0.x == p1.x && p0.y < p1.y {
            Some(Direction::Right)
        } else if p0.x == p1.x && p0.y > p1.y {
            Some(Direction::Left)
        } else if p0.y == p1.y && p0.x > p1.x {
            Some(Direction::Down)
        } else if p0.y == p1.y && p0.x < p1.x {
            Some(Direction::Up)
        } else {
            None
        }
    }

    /// is_moving checks if the movement from `from` to `to` has a component in this direction.
    /// Screen coordinates are used, i.e. y grows downwards.
    pub fn is_moving(&self, from: &Point, to: &Point) -> bool {
        match self {
            Direction::Up => to.y < from.y,
            Direction::Down => to.y > from.y,
            Direction::Left => to.x < from.x,
            Direction::Right => to.x > from.x,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        write!(f, "{}", text)
    }
}

/// * `distance` - (m) Nominal race distance, i.e. the mean of the outer and inner boundary
/// lengths
/// * `positions` - Starting positions, equally spaced along the finish line
/// * `min_dist` - (-) Fraction of `distance` a racer must have driven before a finish counts
#[derive(Debug, Clone)]
pub struct Track {
    pub name: String,
    pub outer: Vec<Point>,
    pub inner: Vec<Point>,
    pub finish_line: [Point; 2],
    pub direction: Direction,
    pub distance: f64,
    pub positions: Vec<Point>,
    outer_bbox: Option<BoundingBox>,
    min_dist: f64,
}

impl Track {
    pub fn new(
        track_pars: &TrackPars,
        no_racers: usize,
        sim_consts: &SimConstants,
    ) -> anyhow::Result<Track> {
        // determine travel direction from the finish line
        let direction = match Direction::from_finish_line(&track_pars.finish_line) {
            Some(direction) => direction,
            None => {
                return Err(InvalidFinishLineError {
                    track_name: track_pars.name.to_owned(),
                    finish_line: track_pars.finish_line,
                }
                .into())
            }
        };

        // nominal race distance
        let distance = (sim_consts.scale_d
            * (ring_length(&track_pars.outer) + ring_length(&track_pars.inner))
            / 2.0)
            .floor();

        // starting positions for racers, excluding the end points of the finish line
        let [sf0, sf1] = track_pars.finish_line;
        let dx = sf1.x - sf0.x;
        let dy = sf1.y - sf0.y;

        let positions = (0..no_racers)
            .map(|i| {
                let frac = (i + 1) as f64 / (no_racers + 1) as f64;
                Point::new((sf0.x + frac * dx).floor(), (sf0.y + frac * dy).floor())
            })
            .collect();

        log::debug!(
            "Created track {} ({} m), finish line must be crossed going {}",
            track_pars.name,
            distance,
            direction
        );

        Ok(Track {
            name: track_pars.name.to_owned(),
            outer: track_pars.outer.to_owned(),
            inner: track_pars.inner.to_owned(),
            finish_line: track_pars.finish_line,
            direction,
            distance,
            positions,
            outer_bbox: BoundingBox::of(&track_pars.outer),
            min_dist: sim_consts.min_dist,
        })
    }

    /// The method returns the track caption, e.g. "Oblong (1720 m)".
    pub fn text(&self) -> String {
        format!("{} ({} m)", self.name, self.distance)
    }

    /// The method checks if the racer's current position is off the track surface. The surface is
    /// inside the outer polygon and not inside the inner one. Both rings toggle a single parity
    /// flag.
    pub fn is_off_road(&self, racer: &Racer) -> bool {
        let p = racer.position();

        match &self.outer_bbox {
            Some(bbox) if bbox.contains(&p) => {}
            _ => return true,
        }

        let mut inside = point_in_polygon(&p, &self.outer);

        if !self.inner.is_empty() {
            inside ^= point_in_polygon(&p, &self.inner);
        }

        !inside
    }

    /// The method checks if the racer's last movement validly crossed the finish line. The
    /// movement must go in the track's direction, the racer must have covered the minimum
    /// distance, and the crossing must lie within both segments. A movement ending on the line
    /// counts, one starting on it does not.
    pub fn has_finished(&self, racer: &Racer) -> bool {
        let from = racer.prev_position();
        let to = racer.position();

        let isec = match segment_intersection(
            &from,
            &to,
            &self.finish_line[0],
            &self.finish_line[1],
        ) {
            Some(isec) => isec,
            None => return false,
        };

        let dir_ok = self.direction.is_moving(&from, &to);
        let dist_ok = racer.distance() > self.min_dist * self.distance;

        dir_ok
            && dist_ok
            && isec.lambda > 0.0
            && isec.lambda <= 1.0
            && isec.gamma > 0.0
            && isec.gamma < 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rectangle_pars() -> TrackPars {
        TrackPars {
            name: String::from("Rectangle"),
            outer: vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0),
                Point::new(0.0, 100.0),
            ],
            inner: vec![],
            finish_line: [Point::new(50.0, 0.0), Point::new(50.0, 100.0)],
        }
    }

    fn ring_pars() -> TrackPars {
        TrackPars {
            name: String::from("Ring"),
            outer: vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0),
                Point::new(0.0, 100.0),
            ],
            inner: vec![
                Point::new(30.0, 30.0),
                Point::new(70.0, 30.0),
                Point::new(70.0, 70.0),
                Point::new(30.0, 70.0),
            ],
            finish_line: [Point::new(0.0, 50.0), Point::new(30.0, 50.0)],
        }
    }

    fn racer_at(x: f64, y: f64) -> Racer {
        let mut racer = Racer::new("Test", "red", 10.0, &SimConstants::default());
        racer.start_at(Point::new(x, y));
        racer
    }

    #[test]
    fn distance_is_mean_of_both_rings() {
        let sim_consts = SimConstants::default();
        let track = Track::new(&rectangle_pars(), 1, &sim_consts).unwrap();
        assert_relative_eq!(track.distance, 200.0);

        let track = Track::new(&ring_pars(), 1, &sim_consts).unwrap();
        assert_relative_eq!(track.distance, 280.0);
        assert_eq!(track.text(), "Ring (280 m)");
    }

    #[test]
    fn directions_follow_finish_line_ordering() {
        let line = |x0, y0, x1, y1| [Point::new(x0, y0), Point::new(x1, y1)];
        assert_eq!(
            Direction::from_finish_line(&line(5.0, 0.0, 5.0, 10.0)),
            Some(Direction::Right)
        );
        assert_eq!(
            Direction::from_finish_line(&line(5.0, 10.0, 5.0, 0.0)),
            Some(Direction::Left)
        );
        assert_eq!(
            Direction::from_finish_line(&line(10.0, 5.0, 0.0, 5.0)),
            Some(Direction::Down)
        );
        assert_eq!(
            Direction::from_finish_line(&line(0.0, 5.0, 10.0, 5.0)),
            Some(Direction::Up)
        );
        assert_eq!(Direction::from_finish_line(&line(0.0, 0.0, 10.0, 10.0)), None);
        assert_eq!(Direction::from_finish_line(&line(3.0, 3.0, 3.0, 3.0)), None);
    }

    #[test]
    fn diagonal_finish_line_is_rejected() {
        let mut pars = rectangle_pars();
        pars.finish_line = [Point::new(0.0, 0.0), Point::new(50.0, 50.0)];
        assert!(!pars.has_valid_finish_line());

        let err = Track::new(&pars, 2, &SimConstants::default()).unwrap_err();
        assert!(err.downcast_ref::<InvalidFinishLineError>().is_some());
    }

    #[test]
    fn starting_positions_are_spread_along_finish_line() {
        let track = Track::new(&rectangle_pars(), 3, &SimConstants::default()).unwrap();
        assert_eq!(
            track.positions,
            vec![
                Point::new(50.0, 25.0),
                Point::new(50.0, 50.0),
                Point::new(50.0, 75.0)
            ]
        );

        let track = Track::new(&ring_pars(), 2, &SimConstants::default()).unwrap();
        assert_eq!(
            track.positions,
            vec![Point::new(10.0, 50.0), Point::new(20.0, 50.0)]
        );
    }

    #[test]
    fn rectangle_center_is_on_road() {
        let track = Track::new(&rectangle_pars(), 1, &SimConstants::default()).unwrap();
        assert!(!track.is_off_road(&racer_at(50.0, 50.0)));
        assert!(track.is_off_road(&racer_at(150.0, 50.0)));
        assert!(track.is_off_road(&racer_at(50.0, -10.0)));
    }

    #[test]
    fn inner_polygon_is_a_hole() {
        let track = Track::new(&ring_pars(), 1, &SimConstants::default()).unwrap();
        assert!(track.is_off_road(&racer_at(50.0, 50.0)));
        assert!(!track.is_off_road(&racer_at(15.0, 50.0)));
        assert!(!track.is_off_road(&racer_at(50.0, 85.0)));
    }

    #[test]
    fn finish_requires_minimum_distance() {
        let track = Track::new(&rectangle_pars(), 1, &SimConstants::default()).unwrap();

        // crossing right away is geometrically valid but far too short
        let mut racer = racer_at(40.0, 50.0);
        racer.drive(6);
        assert_relative_eq!(racer.position().x, 50.0);
        assert!(!track.has_finished(&racer));

        // drive a long way to the left, turn around, and cross again
        let mut racer = racer_at(40.0, 50.0);
        racer.drive(4);
        for _ in 0..8 {
            racer.drive(5);
        }
        racer.drive(6);
        racer.drive(6);
        assert_relative_eq!(racer.position().x, -40.0);

        while racer.position().x < 40.0 {
            racer.drive(5);
            assert!(!track.has_finished(&racer));
        }

        racer.drive(5);
        assert!(racer.distance() > 0.8 * track.distance);
        assert!(track.has_finished(&racer));
    }

    #[test]
    fn finish_requires_matching_direction() {
        let track = Track::new(&rectangle_pars(), 1, &SimConstants::default()).unwrap();

        // cover the minimum distance going left and cross leftwards
        let mut racer = racer_at(300.0, 50.0);
        racer.drive(4);
        while racer.position().x > 50.0 {
            racer.drive(5);
        }
        assert!(racer.distance() > 0.8 * track.distance);
        assert!(!track.has_finished(&racer));
    }

    #[test]
    fn movement_parallel_to_finish_line_never_finishes() {
        let track = Track::new(&rectangle_pars(), 1, &SimConstants::default()).unwrap();

        let mut racer = racer_at(50.0, -300.0);
        racer.drive(2);
        while racer.position().y < 50.0 {
            racer.drive(5);
            assert!(!track.has_finished(&racer));
        }
    }

    #[test]
    fn finish_bounds_exclude_start_and_end_points() {
        let sim_consts = SimConstants {
            min_dist: 0.0,
            ..SimConstants::default()
        };
        let track = Track::new(&rectangle_pars(), 1, &sim_consts).unwrap();
        let crosses = |x: f64, y: f64| {
            let mut racer = racer_at(x, y);
            racer.drive(6);
            track.has_finished(&racer)
        };

        // ending on the line counts, starting on it does not
        assert!(crosses(40.0, 50.0));
        assert!(!crosses(50.0, 50.0));
        assert!(crosses(45.0, 50.0));

        // touching either end point of the finish line does not count
        assert!(!crosses(40.0, 0.0));
        assert!(!crosses(40.0, 100.0));
    }

    #[test]
    fn scaling_floors_coordinates() {
        let pars = rectangle_pars().scaled(640.0, 480.0);
        assert_eq!(pars.outer[2], Point::new(64.0, 48.0));
        assert_eq!(pars.finish_line[0], Point::new(32.0, 0.0));
        assert_eq!(pars.finish_line[1], Point::new(32.0, 48.0));
    }
}
