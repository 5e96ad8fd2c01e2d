use std::time::Duration;

use eframe::{egui, Frame};
use egui::Context;

use reqwest::blocking::Client;
use reqwest::Result;

/// REST context holding a reusable blocking HTTP client.
struct RESTContext {
    client: Client,
}

impl RESTContext {
    /// Creates a new REST context with a timeout.
    ///
    /// Training can take a while, so the timeout is generous.
    fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::new(120, 0))
            .build()?;
        Ok(Self { client })
    }

    /// Sends a GET request to `/v1/generate` with query parameters.
    fn get_generated(&self, params: &[(String, String)]) -> Result<String> {
        let response = self.client
            .get("http://127.0.0.1:5000/v1/generate")
            .query(params)
            .send()?
            .error_for_status()?;

        Ok(response.text()?)
    }

    /// Sends a GET request to `/v1/corpora`.
    fn get_corpora(&self) -> Result<String> {
        let response = self.client
            .get("http://127.0.0.1:5000/v1/corpora")
            .send()?
            .error_for_status()?;

        Ok(response.text()?)
    }

    /// Sends a PUT request to `/v1/train` for a named corpus.
    fn put_train(&self, corpus: &str) -> Result<String> {
        let response = self.client
            .put("http://127.0.0.1:5000/v1/train")
            .query(&[("corpus", corpus)])
            .send()?
            .error_for_status()?;

        Ok(response.text()?)
    }
}

/// Global UI state (MUST persist between frames in egui).
struct LetterUI {
    rest: RESTContext,
    last_letter: Option<String>,
    status: Option<String>,

    available_corpora: Vec<String>,
    selected_corpus: String,

    recipient: String,
    sender: String,
    purpose: String,
    length: usize,
    temperature: f32,
}

impl LetterUI {
    /// Initializes the UI with sane defaults.
    fn new() -> Result<Self> {
        let mut ui = Self {
            rest: RESTContext::new()?,
            last_letter: None,
            status: None,

            available_corpora: Vec::new(),
            selected_corpus: String::new(),

            recipient: String::new(),
            sender: String::new(),
            purpose: String::new(),
            length: 300,
            temperature: 0.5,
        };
        ui.get_corpora();
        Ok(ui)
    }

    /// Builds the query parameters for the generate endpoint.
    fn build_query(&self) -> Vec<(String, String)> {
        vec![
            ("length".into(), self.length.to_string()),
            ("temperature".into(), self.temperature.to_string()),
            ("recipient".into(), self.recipient.clone()),
            ("sender".into(), self.sender.clone()),
            ("purpose".into(), self.purpose.clone()),
        ]
    }

    /// Performs the generation request.
    fn get_generated(&mut self) {
        let params = self.build_query();
        match self.rest.get_generated(&params) {
            Ok(letter) => self.last_letter = Some(letter),
            Err(e) => self.last_letter = Some(format!("Error: {e}")),
        }
    }

    /// Performs the corpora listing request.
    fn get_corpora(&mut self) {
        match self.rest.get_corpora() {
            Ok(list) => {
                self.available_corpora = list
                    .split('\n')
                    .map(|s| s.trim().to_owned())
                    .filter(|s| !s.is_empty())
                    .collect();
                if self.selected_corpus.is_empty() {
                    if let Some(first) = self.available_corpora.first() {
                        self.selected_corpus = first.clone();
                    }
                }
            }
            Err(e) => self.status = Some(format!("Error: {e}")),
        }
    }

    /// Performs the training request.
    fn put_train(&mut self) {
        let corpus = self.selected_corpus.clone();
        match self.rest.put_train(&corpus) {
            Ok(message) => self.status = Some(message),
            Err(e) => self.status = Some(format!("Error: {e}")),
        }
    }
}

impl eframe::App for LetterUI {
    /// UI update loop (called every frame).
    fn update(&mut self, ctx: &Context, _: &mut Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {

            egui::Grid::new("letter_grid")
                .num_columns(2)
                .spacing([20.0, 6.0])
                .striped(true)
                .show(ui, |ui| {

                    // Corpus selection + training
                    ui.label("Corpus");
                    egui::ComboBox::from_id_salt("corpus_select")
                        .selected_text(&self.selected_corpus)
                        .show_ui(ui, |ui| {
                            for corpus in &self.available_corpora {
                                ui.selectable_value(&mut self.selected_corpus, corpus.clone(), corpus);
                            }
                        });
                    ui.end_row();

                    ui.label("");
                    ui.horizontal(|ui| {
                        if ui.button("Train").clicked() {
                            self.put_train();
                        }
                        if ui.button("Refresh corpora").clicked() {
                            self.get_corpora();
                        }
                    });
                    ui.end_row();

                    if let Some(status) = &self.status {
                        ui.label("Status");
                        ui.label(status);
                        ui.end_row();
                    }

                    ui.separator();
                    ui.end_row();

                    // Letter fields
                    ui.label("Recipient");
                    ui.text_edit_singleline(&mut self.recipient);
                    ui.end_row();

                    ui.label("Sender");
                    ui.text_edit_singleline(&mut self.sender);
                    ui.end_row();

                    ui.label("Purpose");
                    ui.text_edit_singleline(&mut self.purpose);
                    ui.end_row();

                    ui.label("Length");
                    ui.add(
                        egui::DragValue::new(&mut self.length)
                            .range(0..=2000)
                            .speed(10),
                    );
                    ui.end_row();

                    ui.label("Temperature");
                    ui.add(
                        egui::DragValue::new(&mut self.temperature)
                            .range(0.01..=2.0)
                            .speed(0.01),
                    );
                    ui.end_row();

                    ui.separator();
                    ui.end_row();

                    // Generate button
                    if ui
                        .add_sized([200.0, 40.0], egui::Button::new("Generate"))
                        .clicked()
                    {
                        self.get_generated();
                    }
                    ui.end_row();
                });

            // Output
            egui::ScrollArea::vertical().show(ui, |ui| {
                if let Some(letter) = &self.last_letter {
                    ui.label(letter);
                } else {
                    ui.label("Click Generate to start");
                }
            });
        });
    }
}

/// Application entry point.
fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([520.0, 640.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "rs-letter",
        options,
        Box::new(|_| Ok(Box::new(LetterUI::new()?))),
    )
}
