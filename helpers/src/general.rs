use crate::geometry::Point;
use std::error::Error;
use std::fmt;

/// InputValueError is used if some simulation option or parameter does not fulfill the posed
/// requirements, e.g., by requesting more drivers than there are racer colors.
#[derive(Debug, Clone)]
pub struct InputValueError {
    details: String,
}

impl InputValueError {
    pub fn new(msg: &str) -> InputValueError {
        InputValueError {
            details: msg.to_owned(),
        }
    }
}

impl fmt::Display for InputValueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid input value: {}", self.details)
    }
}

impl Error for InputValueError {}

/// InvalidFinishLineError is used if the finish line of a track is neither horizontal nor
/// vertical. A track carrying such a finish line cannot be raced on.
#[derive(Debug, Clone)]
pub struct InvalidFinishLineError {
    pub track_name: String,
    pub finish_line: [Point; 2],
}

impl fmt::Display for InvalidFinishLineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Invalid finish line for track {}: ({}, {}) -> ({}, {})",
            self.track_name,
            self.finish_line[0].x,
            self.finish_line[0].y,
            self.finish_line[1].x,
            self.finish_line[1].y
        )
    }
}

impl Error for InvalidFinishLineError {}

#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// argsort returns the indices that would sort an array. Incomparable values (NaN) are treated
/// as equal.
pub fn argsort<T: std::cmp::PartialOrd>(x: &[T], order: SortOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..x.len()).collect();
    match order {
        SortOrder::Ascending => indices.sort_by(|&a, &b| {
            x[a].partial_cmp(&x[b]).unwrap_or(std::cmp::Ordering::Equal)
        }),
        SortOrder::Descending => indices.sort_by(|&a, &b| {
            x[b].partial_cmp(&x[a]).unwrap_or(std::cmp::Ordering::Equal)
        }),
    }
    indices
}

/// format_clock formats a duration given in milliseconds as a race clock. The precision is
/// clamped to tenths of a second and the leading fields depend on the magnitude:
/// `HH:MM:SS.s` from one hour on, `MM:SS.s` from one minute on, `SS.s` below. Hours wrap
/// around after a day.
pub fn format_clock(t_ms: u64) -> String {
    let tenths = (t_ms % 1000) / 100;
    let secs = (t_ms / 1000) % 60;
    let mins = (t_ms / 60_000) % 60;
    let hours = (t_ms / 3_600_000) % 24;

    if t_ms >= 3_600_000 {
        format!("{:02}:{:02}:{:02}.{}", hours, mins, secs, tenths)
    } else if t_ms >= 60_000 {
        format!("{:02}:{:02}.{}", mins, secs, tenths)
    } else {
        format!("{:02}.{}", secs, tenths)
    }
}
