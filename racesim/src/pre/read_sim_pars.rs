use crate::core::race::SimConstants;
use crate::core::track::{Track, TrackPars};
use anyhow::Context;
use helpers::general::InputValueError;
use std::fs::OpenOptions;
use std::path::Path;

/// Track definitions shipped with the simulator.
const BUILTIN_TRACKS: &str = include_str!("../../../input/tracks.json");

/// read_track_pars_all reads the JSON file and decodes the JSON string into a list of track
/// definitions.
pub fn read_track_pars_all(filepath: &Path) -> anyhow::Result<Vec<TrackPars>> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open track definition file {}!",
            filepath.display()
        ))?;
    let pars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse track definition file {}!",
        filepath.display()
    ))?;
    Ok(pars)
}

/// Read simulation constants (time and distance scales, finish gating, crash distance) from a
/// JSON file. Missing fields keep their defaults.
pub fn read_sim_constants(filepath: &Path) -> anyhow::Result<SimConstants> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open simulation constants file {}!",
            filepath.display()
        ))?;

    let pars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse simulation constants file {}!",
        filepath.display()
    ))?;
    Ok(pars)
}

pub fn builtin_track_pars() -> anyhow::Result<Vec<TrackPars>> {
    let pars = serde_json::from_str(BUILTIN_TRACKS)
        .context("Failed to parse built-in track definitions!")?;
    Ok(pars)
}

/// validate_track_pars checks the finish lines of all track definitions at once. The error names
/// every track with an invalid finish line.
pub fn validate_track_pars(track_pars_all: &[TrackPars]) -> anyhow::Result<()> {
    let invalid: Vec<&str> = track_pars_all
        .iter()
        .filter(|pars| !pars.has_valid_finish_line())
        .map(|pars| pars.name.as_str())
        .collect();

    if !invalid.is_empty() {
        anyhow::bail!(
            "Race track(s) \"{}\": finish line must be horizontal or vertical!",
            invalid.join(", ")
        )
    }

    if track_pars_all.is_empty() {
        return Err(InputValueError::new("no track definitions found").into());
    }

    Ok(())
}

/// load_track_pars reads the track definitions from the inserted file (or the built-in ones),
/// validates them, and scales them to the play area.
pub fn load_track_pars(
    filepath: Option<&Path>,
    width: f64,
    height: f64,
) -> anyhow::Result<Vec<TrackPars>> {
    let track_pars_all = match filepath {
        Some(path) => {
            log::info!("Reading track definitions from {}", path.display());
            read_track_pars_all(path)?
        }
        None => builtin_track_pars()?,
    };

    validate_track_pars(&track_pars_all)?;

    Ok(track_pars_all
        .iter()
        .map(|pars| pars.scaled(width, height))
        .collect())
}

/// find_track returns the (scaled) definition with the inserted name. Names are compared case
/// insensitively.
pub fn find_track<'a>(
    track_pars_all: &'a [TrackPars],
    name: &str,
) -> anyhow::Result<&'a TrackPars> {
    track_pars_all
        .iter()
        .find(|pars| pars.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            let names: Vec<&str> = track_pars_all.iter().map(|p| p.name.as_str()).collect();
            InputValueError::new(&format!(
                "unknown track {}, available tracks are: {}",
                name,
                names.join(", ")
            ))
            .into()
        })
}

/// create_track builds the raceable track for the inserted number of racers.
pub fn create_track(
    track_pars: &TrackPars,
    no_racers: usize,
    sim_consts: &SimConstants,
) -> anyhow::Result<Track> {
    Track::new(track_pars, no_racers, sim_consts)
        .context(format!("Failed to create track {}!", track_pars.name))
}
