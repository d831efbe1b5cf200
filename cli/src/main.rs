use clap::Parser;
use gui::core::gui::RaceView;
use gui::interfaces::racesim_interface::RacesimInterface;
use racesim::core::handle_race::{get_race_state, handle_race, handle_turn};
use racesim::core::race::{RaceSession, SimConstants};
use racesim::core::track::TrackPars;
use racesim::interfaces::gui_interface::RaceState;
use racesim::post::score_ledger::{JsonFileStore, ScoreLedger};
use racesim::pre::read_sim_pars::{create_track, find_track, load_track_pars, read_sim_constants};
use racesim::pre::sim_opts::SimOpts;
use std::io::BufRead;
use std::time::Instant;

fn print_race_state(race_state: &RaceState) {
    println!("{}", race_state.track_text);
    println!(
        "{:<20} {:>8} {:>10} {:>8} {:>8}  {}",
        "Driver", "km/h", "Dist. (m)", "Avg.", "Top", "Status"
    );
    for racer_state in race_state.racer_states.iter() {
        println!(
            "{:<20} {:>8.0} {:>10.0} {:>8.0} {:>8.0}  {}",
            format!("{} ({})", racer_state.driver, racer_state.color),
            racer_state.speed.floor(),
            racer_state.distance.floor(),
            racer_state.avg_speed.floor(),
            racer_state.top_speed.floor(),
            racer_state.status
        );
    }
    println!("{}", race_state.turn_prompt());
}

fn print_high_scores(ledger: &mut ScoreLedger<JsonFileStore>, track_name: &str) {
    if !ledger.is_available() {
        println!("High scores are not available");
        return;
    }

    println!("High scores: {}", track_name);
    match ledger.best(track_name) {
        Some(entries) => {
            for (i, entry) in entries.iter().enumerate() {
                println!(
                    "{:>2}. {:<20} {:>10} {:>6.0} km/h {:>6.0} km/h",
                    i + 1,
                    entry.driver,
                    entry.time,
                    entry.avg_speed.floor(),
                    entry.top_speed.floor()
                );
            }
        }
        None => println!("No data"),
    }
}

/// Reads direction codes line by line from stdin until the race is over or the input ends.
fn run_interactive(
    session: &mut RaceSession,
    ledger: &mut ScoreLedger<JsonFileStore>,
) -> anyhow::Result<()> {
    print_race_state(&get_race_state(session)?);

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;

        for c in line.chars() {
            let code = match c.to_digit(10) {
                Some(d) => d as u8,
                None => continue,
            };
            handle_turn(session, ledger, code);
        }

        print_race_state(&get_race_state(session)?);
        if session.is_over() {
            break;
        }
    }

    Ok(())
}

/// Runs a race in the terminal, driven by the scripted moves or by stdin.
fn run_race(
    sim_opts: &SimOpts,
    track_pars: &TrackPars,
    sim_consts: &SimConstants,
    ledger: &mut ScoreLedger<JsonFileStore>,
) -> anyhow::Result<()> {
    if sim_opts.drivers.is_empty() {
        anyhow::bail!("No drivers provided! Use -d <name> (up to four times) to start a race.");
    }

    let track = create_track(track_pars, sim_opts.drivers.len(), sim_consts)?;
    let mut session = RaceSession::new(
        track,
        &sim_opts.drivers,
        sim_consts.grid_step(sim_opts.height),
        sim_consts,
    )?;

    let t_start = Instant::now();

    let race_result = if sim_opts.moves.is_some() {
        handle_race(&mut session, ledger, &sim_opts.move_codes(), sim_opts.debug)?
    } else {
        run_interactive(&mut session, ledger)?;
        session.get_race_result()
    };

    log::info!("Execution time: {}ms", t_start.elapsed().as_millis());

    // POST-PROCESSING -----------------------------------------------------------------------------
    race_result.print_results();
    let path = race_result.write_results_to_file(None)?;
    log::info!("Results written to {}", path);

    if session.is_over() {
        print_high_scores(ledger, &session.track.name);
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();

    let default_level = if sim_opts.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // get simulation constants
    let sim_consts = if let Some(constants_path) = &sim_opts.constants_path {
        log::info!("Reading simulation constants from {:?}", constants_path);
        read_sim_constants(constants_path)?
    } else {
        SimConstants::default()
    };

    // get scaled track definitions
    let track_pars_all = load_track_pars(
        sim_opts.parfile_path.as_deref(),
        sim_opts.width,
        sim_opts.height,
    )?;
    let track_pars = find_track(&track_pars_all, &sim_opts.track)?;

    let mut ledger = ScoreLedger::new(JsonFileStore::new(&sim_opts.scores_path));

    if sim_opts.clear_scores {
        ledger.clear(&track_pars.name);
        log::info!("Cleared high scores of {}", track_pars.name);
        return Ok(());
    }
    if sim_opts.show_scores {
        print_high_scores(&mut ledger, &track_pars.name);
        return Ok(());
    }

    // EXECUTION -----------------------------------------------------------------------------------
    if !sim_opts.gui {
        return run_race(&sim_opts, track_pars, &sim_consts, &mut ledger);
    }

    log::info!("Starting GUI...");

    let selected_track = track_pars_all
        .iter()
        .position(|pars| pars.name == track_pars.name)
        .unwrap_or(0);
    let mut racesim_interface = RacesimInterface::new(ledger);

    if !sim_opts.drivers.is_empty() {
        let track = create_track(track_pars, sim_opts.drivers.len(), &sim_consts)?;
        let session = RaceSession::new(
            track,
            &sim_opts.drivers,
            sim_consts.grid_step(sim_opts.height),
            &sim_consts,
        )?;
        racesim_interface.start(session)?;
    }

    let gui = RaceView::new(
        racesim_interface,
        track_pars_all.to_owned(),
        sim_consts,
        [sim_opts.width, sim_opts.height],
        &sim_opts.drivers,
        selected_track,
    );
    let native_options = eframe::NativeOptions {
        initial_window_size: Some(eframe::egui::Vec2::new(1280.0, 900.0)),
        ..eframe::NativeOptions::default()
    };
    eframe::run_native(Box::new(gui), native_options);
    Ok(())
}
