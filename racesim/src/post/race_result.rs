use crate::core::race::{RaceEvent, TurnEvent};
use anyhow::Context;
use std::fmt::Write;
use std::io::Write as IoWrite;

use serde::{Deserialize, Serialize};

/// Standing stores one racer's final (or current) race information for post-processing.
/// * `ranking` - Finishing position, 0 if the racer did not finish
/// * `status` - Status text, e.g. "#2 gap: +03.6"
/// * `distance` - (m) Distance driven
/// * `avg_speed` - (km/h) Average speed
/// * `top_speed` - (km/h) Top speed
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Standing {
    pub driver: String,
    pub color: String,
    pub ranking: u32,
    pub ticks: u32,
    pub status: String,
    pub distance: f64,
    pub avg_speed: f64,
    pub top_speed: f64,
}

/// RaceResult contains all race information that is required for post-processing the results.
/// * `track_distance` - (m) Nominal race distance of the track
/// * `standings` - Finishers by ranking first, then the remaining racers in starting order
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RaceResult {
    pub track_name: String,
    pub track_distance: f64,
    pub standings: Vec<Standing>,
    pub events: Vec<RaceEvent>,
}

impl RaceResult {
    /// format_results returns the standings table followed by the event log.
    pub fn format_results(&self) -> Result<String, std::fmt::Error> {
        let mut content = String::new();

        writeln!(
            &mut content,
            "RESULT: {} ({} m)",
            self.track_name, self.track_distance
        )?;
        writeln!(
            &mut content,
            "{:<20} {:<24} {:>6} {:>12} {:>12} {:>12}",
            "Driver", "Position", "Ticks", "Dist. (m)", "Avg. (km/h)", "Top (km/h)"
        )?;

        for standing in self.standings.iter() {
            writeln!(
                &mut content,
                "{:<20} {:<24} {:>6} {:>12.0} {:>12.0} {:>12.0}",
                format!("{} ({})", standing.driver, standing.color),
                standing.status,
                standing.ticks,
                standing.distance.floor(),
                standing.avg_speed.floor(),
                standing.top_speed.floor()
            )?;
        }

        if !self.events.is_empty() {
            writeln!(&mut content, "RESULT: Events")?;

            for ev in self.events.iter() {
                let kind = match ev.event {
                    TurnEvent::Finished { ranking } => format!("finished #{}", ranking),
                    TurnEvent::Crashed => String::from("crashed"),
                    TurnEvent::OffRoad => String::from("drove off the track"),
                    TurnEvent::Moved => String::from("moved"),
                };
                writeln!(&mut content, "tick {:4}: {} {}", ev.tick, ev.driver, kind)?;
            }
        }

        Ok(content)
    }

    /// write_results_to_file writes the results to a text file in output/ (or the inserted path).
    /// Returns the path to the written file.
    pub fn write_results_to_file(&self, path: Option<&std::path::Path>) -> anyhow::Result<String> {
        let content = self
            .format_results()
            .context("Failed to format race results!")?;

        let out_dir = std::path::Path::new("output");
        let out_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            std::fs::create_dir_all(out_dir).context(format!(
                "Failed to create output directory {}!",
                out_dir.display()
            ))?;
            out_dir.join("last_race.txt")
        };
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&out_path)
            .context(format!("Failed to open result file {}!", out_path.display()))?;
        file.write_all(content.as_bytes())
            .and_then(|_| file.flush())
            .context(format!("Failed to write result file {}!", out_path.display()))?;

        Ok(out_path.to_string_lossy().into_owned())
    }

    /// print_results prints the results to the console output.
    pub fn print_results(&self) {
        match self.format_results() {
            Ok(content) => print!("{}", content),
            Err(e) => log::error!("Could not format race results: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> RaceResult {
        RaceResult {
            track_name: String::from("Oblong"),
            track_distance: 1720.0,
            standings: vec![
                Standing {
                    driver: String::from("Anna"),
                    color: String::from("red"),
                    ranking: 1,
                    ticks: 40,
                    status: String::from("#1 time: 48.0"),
                    distance: 1800.7,
                    avg_speed: 135.05,
                    top_speed: 180.0,
                },
                Standing {
                    driver: String::from("Bob"),
                    color: String::from("green"),
                    ranking: 0,
                    ticks: 12,
                    status: String::from("DID NOT FINISH"),
                    distance: 300.0,
                    avg_speed: 75.0,
                    top_speed: 120.0,
                },
            ],
            events: vec![
                RaceEvent {
                    tick: 12,
                    driver: String::from("Bob"),
                    event: TurnEvent::OffRoad,
                },
                RaceEvent {
                    tick: 40,
                    driver: String::from("Anna"),
                    event: TurnEvent::Finished { ranking: 1 },
                },
            ],
        }
    }

    #[test]
    fn results_list_standings_and_events() {
        let content = result().format_results().unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "RESULT: Oblong (1720 m)");
        assert!(lines[2].starts_with("Anna (red)"));
        assert!(lines[2].contains("#1 time: 48.0"));
        assert!(lines[2].contains("1800"));
        assert!(lines[3].contains("DID NOT FINISH"));
        assert_eq!(lines[5], "tick   12: Bob drove off the track");
        assert_eq!(lines[6], "tick   40: Anna finished #1");
    }

    #[test]
    fn results_survive_json_round_trip() {
        let json = serde_json::to_string(&result()).unwrap();
        let parsed: RaceResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.standings.len(), 2);
        assert_eq!(parsed.events[1].event, TurnEvent::Finished { ranking: 1 });
    }

    #[test]
    fn results_are_written_to_the_given_file() {
        let path = std::env::temp_dir().join(format!("racesim_result_{}.txt", std::process::id()));
        let written = result().write_results_to_file(Some(&path)).unwrap();
        assert_eq!(written, path.to_string_lossy());

        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(content.starts_with("RESULT: Oblong (1720 m)"));
    }

    #[test]
    fn unwritable_result_path_names_the_file() {
        let path = std::env::temp_dir()
            .join("racesim_missing_dir")
            .join("nested")
            .join("last_race.txt");
        let err = result().write_results_to_file(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to open result file"));
        assert!(err.to_string().contains("last_race.txt"));
    }
}
