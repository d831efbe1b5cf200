use crate::interfaces::racesim_interface::RacesimInterface;
use eframe::{egui, epi};
use helpers::geometry::Point;
use racesim::core::race::{RaceSession, SimConstants, RACER_COLORS};
use racesim::core::track::TrackPars;
use racesim::interfaces::gui_interface::{RaceState, RacerState};
use racesim::post::score_ledger::ScoreStore;
use racesim::pre::read_sim_pars::create_track;

/// Keys driving the turn owner: the keypad digits and the letter block J K L / U I O.
const KEY_CODES: [(egui::Key, u8); 15] = [
    (egui::Key::Num1, 1),
    (egui::Key::Num2, 2),
    (egui::Key::Num3, 3),
    (egui::Key::Num4, 4),
    (egui::Key::Num5, 5),
    (egui::Key::Num6, 6),
    (egui::Key::Num7, 7),
    (egui::Key::Num8, 8),
    (egui::Key::Num9, 9),
    (egui::Key::J, 1),
    (egui::Key::K, 2),
    (egui::Key::L, 3),
    (egui::Key::U, 4),
    (egui::Key::I, 5),
    (egui::Key::O, 6),
];

/// Returns the direction code belonging to a pressed key.
pub fn key_to_code(key: egui::Key) -> Option<u8> {
    KEY_CODES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, code)| *code)
}

fn to_pos(p: &Point) -> egui::Pos2 {
    egui::Pos2 {
        x: p.x as f32,
        y: p.y as f32,
    }
}

fn racer_color(racer_state: &RacerState) -> egui::Color32 {
    egui::Color32::from_rgb(racer_state.rgb.r, racer_state.rgb.g, racer_state.rgb.b)
}

#[derive(Debug)]
pub struct RaceView<S: ScoreStore> {
    pub racesim_interface: RacesimInterface<S>,
    pub track_pars_all: Vec<TrackPars>,
    pub sim_consts: SimConstants,
    pub play_area: [f64; 2],
    pub driver_names: Vec<String>,
    pub selected_track: usize,
    pub message: Option<String>,
}

impl<S: ScoreStore> RaceView<S> {
    /// The inserted track definitions must already be scaled to the play area.
    pub fn new(
        racesim_interface: RacesimInterface<S>,
        track_pars_all: Vec<TrackPars>,
        sim_consts: SimConstants,
        play_area: [f64; 2],
        driver_names: &[String],
        selected_track: usize,
    ) -> RaceView<S> {
        let mut names: Vec<String> = driver_names
            .iter()
            .take(RACER_COLORS.len())
            .cloned()
            .collect();
        names.resize(RACER_COLORS.len(), String::new());

        RaceView {
            racesim_interface,
            track_pars_all,
            sim_consts,
            play_area,
            driver_names: names,
            selected_track,
            message: None,
        }
    }

    /// The method starts a new race with the entered (non-empty) driver names on the selected
    /// track.
    pub fn start_race(&mut self) -> anyhow::Result<()> {
        let drivers: Vec<String> = self
            .driver_names
            .iter()
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .collect();

        if drivers.is_empty() {
            anyhow::bail!("Enter at least one driver name!")
        }

        let track_pars = self
            .track_pars_all
            .get(self.selected_track)
            .ok_or_else(|| anyhow::anyhow!("No track selected!"))?;
        let track = create_track(track_pars, drivers.len(), &self.sim_consts)?;
        let dp = self.sim_consts.grid_step(self.play_area[1]);
        let session = RaceSession::new(track, &drivers, dp, &self.sim_consts)?;

        self.racesim_interface.start(session)
    }

    fn handle_keys(&mut self, ctx: &egui::CtxRef) {
        let codes: Vec<u8> = KEY_CODES
            .iter()
            .filter(|(key, _)| ctx.input().key_pressed(*key))
            .map(|(_, code)| *code)
            .collect();

        for code in codes {
            if let Err(e) = self.racesim_interface.drive(code) {
                log::error!("Could not update race state: {:#}", e);
                self.message = Some(format!("{:#}", e));
            }
        }
    }

    fn set_setup_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Drivers");
        for (i, name) in self.driver_names.iter_mut().enumerate() {
            ui.horizontal(|ui| {
                ui.label(RACER_COLORS[i]);
                ui.text_edit_singleline(name);
            });
        }

        ui.separator();
        ui.heading("Track");
        for (i, track_pars) in self.track_pars_all.iter().enumerate() {
            ui.selectable_value(&mut self.selected_track, i, &track_pars.name);
        }

        ui.separator();
        if ui.button("Go!").clicked() {
            match self.start_race() {
                Ok(()) => self.message = None,
                Err(e) => {
                    log::warn!("Could not start race: {:#}", e);
                    self.message = Some(format!("{:#}", e));
                }
            }
        }

        if let Some(message) = &self.message {
            ui.colored_label(egui::Color32::RED, message);
        }

        ui.separator();
        self.set_high_scores(ui);
    }

    fn set_high_scores(&mut self, ui: &mut egui::Ui) {
        let track_name = match self.track_pars_all.get(self.selected_track) {
            Some(track_pars) => track_pars.name.to_owned(),
            None => return,
        };

        ui.heading(format!("High scores: {}", track_name));

        let ledger = &mut self.racesim_interface.ledger;
        if !ledger.is_available() {
            ui.label("High scores are not available");
            return;
        }

        match ledger.best(&track_name) {
            Some(entries) => {
                egui::Grid::new("high_scores").striped(true).show(ui, |ui| {
                    ui.label("#");
                    ui.label("Driver");
                    ui.label("Time");
                    ui.label("Avg. km/h");
                    ui.label("Top km/h");
                    ui.end_row();

                    for (i, entry) in entries.iter().enumerate() {
                        ui.label(format!("{}", i + 1));
                        ui.label(&entry.driver);
                        ui.label(&entry.time);
                        ui.label(format!("{:.0}", entry.avg_speed.floor()));
                        ui.label(format!("{:.0}", entry.top_speed.floor()));
                        ui.end_row();
                    }
                });
            }
            None => {
                ui.label("No data");
            }
        }

        if ui.button("Clear high scores").clicked() {
            ledger.clear(&track_name);
        }
    }

    fn set_status_table(ui: &mut egui::Ui, race_state: &RaceState) {
        ui.label(&race_state.track_text);

        egui::Grid::new("status").striped(true).show(ui, |ui| {
            ui.label("Driver");
            ui.label("Speed (km/h)");
            ui.label("Distance (m)");
            ui.label("Avg. (km/h)");
            ui.label("Top (km/h)");
            ui.label("Status");
            ui.end_row();

            for racer_state in race_state.racer_states.iter() {
                ui.colored_label(racer_color(racer_state), &racer_state.driver);
                ui.label(format!("{:.0}", racer_state.speed.floor()));
                ui.label(format!("{:.0}", racer_state.distance.floor()));
                ui.label(format!("{:.0}", racer_state.avg_speed.floor()));
                ui.label(format!("{:.0}", racer_state.top_speed.floor()));
                ui.label(&racer_state.status);
                ui.end_row();
            }
        });

        ui.heading(race_state.turn_prompt());
    }

    pub fn set_ui_content(&mut self, ui: &mut egui::Ui) -> egui::Response {
        // PREPARATIONS ----------------------------------------------------------------------------
        let (response, painter) =
            ui.allocate_painter(ui.available_size_before_wrap_finite(), egui::Sense::hover());

        // keep the aspect ratio of the play area, track coordinates already grow downwards
        let [width, height] = self.play_area;
        let area_aspect = (width / height) as f32;
        let screen_width = response.rect.width();
        let screen_height = response.rect.height();

        let dest_rect = if screen_width / screen_height > area_aspect {
            let new_width = screen_height * area_aspect;
            egui::Rect::from_min_size(
                egui::Pos2::new(
                    response.rect.min.x + (screen_width - new_width) / 2.0,
                    response.rect.min.y,
                ),
                egui::Vec2::new(new_width, screen_height),
            )
        } else {
            let new_height = screen_width / area_aspect;
            egui::Rect::from_min_size(
                egui::Pos2::new(
                    response.rect.min.x,
                    response.rect.min.y + (screen_height - new_height) / 2.0,
                ),
                egui::Vec2::new(screen_width, new_height),
            )
        };

        let to_screen = egui::emath::RectTransform::from_to(
            egui::emath::Rect::from_min_max(
                egui::Pos2 { x: 0.0, y: 0.0 },
                egui::Pos2 {
                    x: width as f32,
                    y: height as f32,
                },
            ),
            dest_rect,
        );

        let session = match &self.racesim_interface.session {
            Some(session) => session,
            None => return response,
        };
        let race_state = match &self.racesim_interface.race_state {
            Some(race_state) => race_state,
            None => return response,
        };

        let mut shapes = vec![];

        // TRACK DRAWING ---------------------------------------------------------------------------
        let track = &session.track;
        shapes.push(egui::Shape::closed_line(
            track.outer.iter().map(|p| to_screen * to_pos(p)).collect(),
            egui::Stroke::new(3.0, egui::Color32::WHITE),
        ));
        if !track.inner.is_empty() {
            shapes.push(egui::Shape::closed_line(
                track.inner.iter().map(|p| to_screen * to_pos(p)).collect(),
                egui::Stroke::new(3.0, egui::Color32::WHITE),
            ));
        }
        shapes.push(egui::Shape::line_segment(
            [
                to_screen * to_pos(&track.finish_line[0]),
                to_screen * to_pos(&track.finish_line[1]),
            ],
            egui::Stroke::new(5.0, egui::Color32::from_rgb(255, 128, 0)),
        ));

        // RACERS DRAWING --------------------------------------------------------------------------
        for (i, racer_state) in race_state.racer_states.iter().enumerate() {
            let color = racer_color(racer_state);

            if let Some(trail) = self.racesim_interface.trails.get(i) {
                if trail.len() > 1 {
                    shapes.push(egui::Shape::line(
                        trail.iter().map(|p| to_screen * to_pos(p)).collect(),
                        egui::Stroke::new(1.5, color),
                    ));
                }
            }

            // candidate hints are only filled for the turn owner
            for candidate in racer_state.candidates.iter() {
                shapes.push(egui::Shape::circle_filled(
                    to_screen * to_pos(candidate),
                    3.0,
                    egui::Color32::from_gray(200),
                ));
            }

            let pos = to_screen * to_pos(&racer_state.position);
            if racer_state.active {
                shapes.push(egui::Shape::circle_filled(pos, 7.0, color));
            } else {
                shapes.push(egui::Shape::rect_filled(
                    egui::Rect::from_center_size(pos, egui::Vec2::new(12.0, 12.0)),
                    2.0,
                    color,
                ));
            }
        }

        if race_state.race_over {
            shapes.push(egui::Shape::text(
                ui.fonts(),
                dest_rect.center(),
                egui::Align2::CENTER_CENTER,
                "RACE OVER",
                egui::TextStyle::Heading,
                egui::Color32::WHITE,
            ));
        }

        // DRAWING ---------------------------------------------------------------------------------
        painter.extend(shapes);
        response
    }
}

impl<S: ScoreStore> epi::App for RaceView<S> {
    /// Called each time the UI needs repainting, e.g. after a key press.
    fn update(&mut self, ctx: &egui::CtxRef, _frame: &mut epi::Frame) {
        self.handle_keys(ctx);

        egui::SidePanel::left("setup").show(ctx, |ui| {
            self.set_setup_panel(ui);
        });

        if let Some(race_state) = &self.racesim_interface.race_state {
            egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
                Self::set_status_table(ui, race_state);
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let mut frame = egui::Frame::dark_canvas(ui.style());
            frame.fill = egui::Color32::from_rgb(20, 80, 20);
            frame.show(ui, |ui| {
                self.set_ui_content(ui);
            });
        });
    }

    fn name(&self) -> &str {
        "Vector Race"
    }
}
