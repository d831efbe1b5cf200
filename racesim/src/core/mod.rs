pub mod handle_race;
pub mod race;
pub mod racer;
pub mod track;
