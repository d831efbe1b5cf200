use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    author = "Alexander Heilmeier <alexander.heilmeier@tum.de>",
    name = "RS-VR",
    about = "A turn-based vector racing game written in Rust"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug printing and debug log level
    #[clap(long)]
    pub debug: bool,

    /// Activate GUI - race is driven by the keyboard in a window
    #[clap(short, long)]
    pub gui: bool,

    /// Print the high scores of the selected track and exit
    #[clap(long)]
    pub show_scores: bool,

    /// Clear the high scores of the selected track and exit
    #[clap(long)]
    pub clear_scores: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set driver names in starting order (at most 4), e.g. -d Anna -d Bob
    #[clap(short, long = "driver")]
    pub drivers: Vec<String>,

    /// Set name of the track to race on
    #[clap(short, long, default_value = "Practising Ground")]
    pub track: String,

    /// Set path to a track definition file (OPTIONAL: if not set, the built-in tracks are used)
    #[clap(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set path to a simulation constants file (OPTIONAL: if not set, defaults are used)
    #[clap(short, long)]
    pub constants_path: Option<PathBuf>,

    /// Set path to the high score file
    #[clap(short, long, default_value = "output/highscores.json")]
    pub scores_path: PathBuf,

    /// Set width of the play area in track units
    #[clap(long, default_value = "1000")]
    pub width: f64,

    /// Set height of the play area in track units
    #[clap(long, default_value = "1000")]
    pub height: f64,

    /// Set scripted moves as a string of direction codes 1 - 9, e.g. 6665 (only for non-GUI mode)
    #[clap(short, long)]
    pub moves: Option<String>,
}

impl SimOpts {
    /// The method converts the scripted moves into direction codes. Characters other than the
    /// digits 1 - 9 are skipped.
    pub fn move_codes(&self) -> Vec<u8> {
        self.moves
            .as_deref()
            .unwrap_or("")
            .chars()
            .filter_map(|c| c.to_digit(10))
            .filter(|d| (1..=9).contains(d))
            .map(|d| d as u8)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_are_parsed() {
        let opts = SimOpts::parse_from(vec![
            "rs-vr", "-d", "Anna", "-d", "Bob", "-t", "Oblong", "-m", "66 5x0 9",
        ]);
        assert_eq!(opts.drivers, vec!["Anna", "Bob"]);
        assert_eq!(opts.track, "Oblong");
        assert_eq!(opts.move_codes(), vec![6, 6, 5, 9]);
        assert_eq!(opts.scores_path, PathBuf::from("output/highscores.json"));
        assert!(!opts.gui);
    }
}
