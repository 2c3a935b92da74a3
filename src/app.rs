use crate::{
    markup::safe_url,
    model::{ActivityType, DisplayConfig, Layout, MAX_AVATAR_SIZE, MAX_ITEMS, MIN_AVATAR_SIZE, MIN_ITEMS},
    pipeline::{Listing, ViewRow},
    preview::Preview,
};
use chrono::Utc;
use eframe::egui;
use log::{error, info};
use std::time::{Duration, Instant};

const GRID_CELL_WIDTH: f32 = 260.0;

pub struct ActivityPreviewApp {
    pub config: DisplayConfig,
    pub preview: Preview,
    pub notification: Option<(String, Instant)>,
}

impl ActivityPreviewApp {
    pub fn new(config: DisplayConfig, preview: Preview) -> Self {
        Self {
            config: config.resolved(),
            preview,
            notification: None,
        }
    }

    fn settings_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("settings_panel")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Activity Settings");
                ui.separator();

                ui.label("Number of Activities to Display");
                ui.add(egui::Slider::new(
                    &mut self.config.number_of_items,
                    MIN_ITEMS..=MAX_ITEMS,
                ));

                ui.label("Activity Type");
                egui::ComboBox::from_id_salt("activity_type")
                    .selected_text(type_label(self.config.activity_type))
                    .show_ui(ui, |ui| {
                        for activity_type in ActivityType::ALL {
                            ui.selectable_value(
                                &mut self.config.activity_type,
                                activity_type,
                                type_label(activity_type),
                            );
                        }
                    });

                ui.label("Layout");
                ui.horizontal(|ui| {
                    ui.radio_value(&mut self.config.layout, Layout::List, "List");
                    ui.radio_value(&mut self.config.layout, Layout::Grid, "Grid");
                });

                ui.checkbox(&mut self.config.show_date, "Show date");

                ui.label("Avatar size");
                ui.add(
                    egui::Slider::new(&mut self.config.avatar_size, MIN_AVATAR_SIZE..=MAX_AVATAR_SIZE)
                        .suffix("px"),
                );

                ui.checkbox(&mut self.config.hide_heading, "Hide heading");

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Refresh").clicked() {
                        self.preview.refresh(&self.config);
                    }
                    if ui.button("Copy block attributes").clicked() {
                        match serde_json::to_string_pretty(&self.config) {
                            Ok(json) => {
                                ctx.copy_text(json);
                                self.notification =
                                    Some(("Attributes copied to clipboard!".to_owned(), Instant::now()));
                            }
                            Err(err) => error!("could not serialize block attributes: {}", err),
                        }
                    }
                });
                self.notification_label(ui, ctx);
            });
    }

    fn notification_label(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        const NOTIFICATION_DURATION: f32 = 3.0;
        if let Some((message, start)) = &self.notification {
            let elapsed = start.elapsed().as_secs_f32();
            if elapsed < NOTIFICATION_DURATION {
                let alpha = 1.0 - (elapsed / NOTIFICATION_DURATION);
                let text = egui::RichText::new(message).color(egui::Color32::from_rgba_unmultiplied(
                    255,
                    255,
                    255,
                    (alpha * 255.0) as u8,
                ));
                ui.label(text);
                ctx.request_repaint();
            } else {
                self.notification = None;
            }
        }
    }

    fn central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(listing) = self.preview.listing(&self.config, Utc::now()) else {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading activities…");
                });
                return;
            };
            match listing {
                Listing::Rows { heading, rows } => {
                    if let Some(heading) = heading {
                        ui.heading(heading);
                        ui.separator();
                    }
                    egui::ScrollArea::vertical()
                        .id_salt("activity_scroll_area")
                        .show(ui, |ui| self.show_rows(ui, &rows));
                }
                other => {
                    ui.label(other.message().unwrap_or_default());
                }
            }
        });
    }

    fn show_rows(&self, ui: &mut egui::Ui, rows: &[ViewRow]) {
        let avatar_size = self.config.avatar_size as f32;
        match self.config.layout {
            Layout::List => {
                for row in rows {
                    show_row(ui, row, avatar_size);
                    ui.add_space(12.0);
                }
            }
            Layout::Grid => {
                ui.horizontal_wrapped(|ui| {
                    for row in rows {
                        ui.group(|ui| {
                            ui.set_width(GRID_CELL_WIDTH);
                            ui.vertical(|ui| show_row(ui, row, avatar_size));
                        });
                    }
                });
            }
        }
    }
}

fn type_label(activity_type: ActivityType) -> &'static str {
    match activity_type {
        ActivityType::All => "All Activities",
        ActivityType::My => "My Activities",
        ActivityType::Favorites => "Favorites",
    }
}

fn show_row(ui: &mut egui::Ui, row: &ViewRow, avatar_size: f32) {
    ui.horizontal(|ui| {
        if let Some(url) = &row.avatar_url {
            avatar(ui, &row.display_title, url, avatar_size);
        }
        ui.horizontal_wrapped(|ui| {
            ui.label(egui::RichText::new(&row.display_title).small());
            if let Some(time) = &row.relative_time {
                ui.label(egui::RichText::new(time).small().strong());
            }
        });
    });
    ui.label(&row.display_content);
}

/// The thumbnail once the image loaders have it, and a round placeholder with the
/// author's initial while it is loading or if it failed to load.
fn avatar(ui: &mut egui::Ui, title: &str, url: &str, size: f32) {
    let extent = egui::vec2(size, size);
    if let Some(uri) = image_uri(url) {
        let image = egui::Image::new(uri)
            .fit_to_exact_size(extent)
            .corner_radius(size / 2.0);
        if let Ok(egui::load::TexturePoll::Ready { .. }) = image.load_for_size(ui.ctx(), extent) {
            ui.add(image).on_hover_text(url);
            return;
        }
    }

    let (rect, response) = ui.allocate_exact_size(extent, egui::Sense::hover());
    let painter = ui.painter();
    painter.circle_filled(rect.center(), size / 2.0, egui::Color32::from_rgb(70, 110, 160));
    let initial = title
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default();
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        initial,
        egui::FontId::proportional(size * 0.45),
        egui::Color32::WHITE,
    );
    response.on_hover_text(url);
}

/// Where the http loader fetches a thumbnail from. It needs a scheme, so
/// protocol-relative gravatar links are loaded over https.
fn image_uri(url: &str) -> Option<String> {
    let url = safe_url(url)?;
    Some(match url.strip_prefix("//") {
        Some(rest) => format!("https://{}", rest),
        None => url,
    })
}

impl eframe::App for ActivityPreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.preview.poll();
        self.preview.sync(&self.config);

        self.settings_panel(ctx);

        self.central_panel(ctx);

        // Picks up finished fetches and keeps relative times current.
        let repaint_after = if self.preview.is_loading() {
            Duration::from_millis(100)
        } else {
            Duration::from_secs(1)
        };
        ctx.request_repaint_after(repaint_after);
    }
}

pub fn run(app: ActivityPreviewApp) -> eframe::Result<()> {
    info!("opening activity preview");
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1100.0, 760.0]),
        ..Default::default()
    };
    eframe::run_native(
        "BuddyPress Activity Listing",
        options,
        Box::new(|cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
}
