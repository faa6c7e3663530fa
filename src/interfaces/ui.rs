use crate::application::agents::user_agent::UserAgent;
use crate::domain::types::AlertDirection;
use chrono::Utc;
use eframe::egui;
use egui_plot::{Legend, Line, Plot};

impl eframe::App for UserAgent {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // --- 0. Theme Configuration (Run once or simple check) ---
        let mut visuals = egui::Visuals::dark();
        visuals.window_fill = egui::Color32::from_rgb(10, 15, 20); // Deep dark blue/black
        visuals.panel_fill = egui::Color32::from_rgb(10, 15, 20);
        ctx.set_visuals(visuals);

        // --- 1. Process System Events (Prices, Alerts & Logs) ---
        self.update();

        // --- 2. Top Status Bar ---
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("📈 Pricewatch");
                ui.separator();

                // Coin selector
                let coins = self.coins.clone();
                egui::ComboBox::from_id_salt("coin_select")
                    .selected_text(self.selected_coin.label.clone())
                    .show_ui(ui, |ui| {
                        for coin in &coins {
                            let is_selected = coin.id == self.selected_coin.id;
                            if ui.selectable_label(is_selected, &coin.label).clicked() {
                                self.select_coin(coin.clone());
                            }
                        }
                    });

                if ui.button("⟳ Refresh").clicked() {
                    self.refresh();
                }

                ui.separator();
                ui.label(format!("Time (UTC): {}", Utc::now().format("%H:%M:%S")));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let status_color = if self.status_line.starts_with("Fetch failed") {
                        egui::Color32::from_rgb(255, 80, 80)
                    } else {
                        egui::Color32::from_gray(180)
                    };
                    ui.label(
                        egui::RichText::new(&self.status_line)
                            .color(status_color)
                            .small(),
                    );
                });
            });
        });

        // --- 3. Left Sidebar: Alerts ---
        egui::SidePanel::left("alerts_panel")
            .default_width(300.0)
            .min_width(240.0)
            .max_width(450.0)
            .resizable(true)
            .show(ctx, |ui| {
                ui.vertical(|ui| {
                    ui.heading("Price Alerts");
                    ui.separator();

                    // Entry row
                    ui.horizontal(|ui| {
                        egui::ComboBox::from_id_salt("direction_select")
                            .selected_text(self.direction_input.to_string())
                            .width(80.0)
                            .show_ui(ui, |ui| {
                                ui.selectable_value(
                                    &mut self.direction_input,
                                    AlertDirection::Above,
                                    "above",
                                );
                                ui.selectable_value(
                                    &mut self.direction_input,
                                    AlertDirection::Below,
                                    "below",
                                );
                            });

                        let response = ui.add(
                            egui::TextEdit::singleline(&mut self.threshold_input)
                                .desired_width(90.0)
                                .hint_text("30000"),
                        );
                        let submitted = response.lost_focus()
                            && ui.input(|i| i.key_pressed(egui::Key::Enter));

                        if ui.button("Set Alert").clicked() || submitted {
                            self.submit_alert();
                        }
                    });

                    // Rejected input feedback
                    if let Some(err) = self.error_banner.clone() {
                        ui.add_space(6.0);
                        egui::Frame::NONE
                            .fill(egui::Color32::from_rgb(45, 20, 20))
                            .inner_margin(egui::Margin::symmetric(10, 8))
                            .corner_radius(6)
                            .stroke(egui::Stroke::new(
                                1.0,
                                egui::Color32::from_rgb(120, 40, 40),
                            ))
                            .show(ui, |ui| {
                                ui.horizontal_wrapped(|ui| {
                                    ui.label(
                                        egui::RichText::new(&err)
                                            .color(egui::Color32::from_rgb(255, 120, 120))
                                            .small(),
                                    );
                                    if ui.small_button("✕").clicked() {
                                        self.error_banner = None;
                                    }
                                });
                            });
                    }

                    ui.add_space(10.0);
                    ui.separator();
                    ui.heading("Active");
                    ui.add_space(5.0);

                    if self.active_alerts.is_empty() {
                        ui.label(
                            egui::RichText::new("No alerts set.")
                                .color(egui::Color32::from_gray(140)),
                        );
                    } else {
                        egui::ScrollArea::vertical()
                            .id_salt("active_alerts")
                            .max_height(ui.available_height() * 0.4)
                            .auto_shrink([false, true])
                            .show(ui, |ui| {
                                for alert in self.active_alerts.clone() {
                                    ui.horizontal(|ui| {
                                        let (arrow, color) = match alert.direction {
                                            AlertDirection::Above => ("▲", egui::Color32::GREEN),
                                            AlertDirection::Below => {
                                                ("▼", egui::Color32::from_rgb(255, 100, 100))
                                            }
                                        };
                                        ui.label(egui::RichText::new(arrow).color(color));
                                        ui.label(format!(
                                            "{} ${:.2}",
                                            alert.direction, alert.threshold
                                        ));
                                        ui.with_layout(
                                            egui::Layout::right_to_left(egui::Align::Center),
                                            |ui| {
                                                if ui.small_button("✕").clicked() {
                                                    self.remove_alert(alert.id);
                                                }
                                            },
                                        );
                                    });
                                }
                            });
                    }

                    ui.add_space(10.0);
                    ui.separator();
                    ui.heading("Triggered");
                    ui.add_space(5.0);

                    egui::ScrollArea::vertical()
                        .id_salt("notifications")
                        .auto_shrink([false, true])
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            if self.notifications.is_empty() {
                                ui.label(
                                    egui::RichText::new("Nothing triggered yet.")
                                        .color(egui::Color32::from_gray(140)),
                                );
                            }
                            for note in &self.notifications {
                                ui.label(
                                    egui::RichText::new(note)
                                        .color(egui::Color32::GOLD)
                                        .small(),
                                );
                            }
                        });
                });
            });

        // --- 4. Bottom Panel: System Logs ---
        egui::TopBottomPanel::bottom("log_panel")
            .resizable(true)
            .default_height(130.0)
            .show(ctx, |ui| {
                ui.heading("System Logs");
                egui::ScrollArea::vertical()
                    .auto_shrink([false, true])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for msg in &self.logs {
                            let color = if msg.contains("ERROR") {
                                egui::Color32::from_rgb(255, 80, 80) // Red
                            } else if msg.contains("WARN") {
                                egui::Color32::from_rgb(255, 255, 100) // Yellow
                            } else {
                                egui::Color32::from_gray(180) // Gray
                            };
                            ui.label(egui::RichText::new(msg).color(color).small());
                        }
                    });
            });

        // --- 5. Central Panel: Price Chart ---
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(&self.selected_coin.label);
                ui.add_space(10.0);

                match self.latest {
                    Some(point) => {
                        // Tint by the move since the previous point
                        let n = self.history.len();
                        let price_color = if n >= 2 && self.history[n - 1].price < self.history[n - 2].price
                        {
                            egui::Color32::from_rgb(255, 100, 100)
                        } else if n >= 2 {
                            egui::Color32::GREEN
                        } else {
                            egui::Color32::WHITE
                        };
                        ui.label(
                            egui::RichText::new(format!("${:.2}", point.price))
                                .size(28.0)
                                .strong()
                                .color(price_color),
                        );
                        ui.label(
                            egui::RichText::new(format!(
                                "{} · as of {}",
                                self.vs_currency.to_uppercase(),
                                point.timestamp.format("%H:%M:%S")
                            ))
                            .small()
                            .color(egui::Color32::from_gray(160)),
                        );
                    }
                    None => {
                        ui.label(
                            egui::RichText::new("—")
                                .size(28.0)
                                .color(egui::Color32::from_gray(120)),
                        );
                    }
                }
            });

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(10.0);

            if self.history.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("⏳ Waiting for price data...");
                });
            } else {
                let points: Vec<[f64; 2]> = self
                    .history
                    .iter()
                    .map(|p| [p.timestamp.timestamp() as f64, p.price])
                    .collect();

                let height = ui.available_height() - 20.0;
                Plot::new("price_chart")
                    .height(height.max(300.0))
                    .show_grid([true, true])
                    .legend(Legend::default())
                    .x_axis_formatter(|mark, _range| {
                        match chrono::DateTime::from_timestamp(mark.value as i64, 0) {
                            Some(dt) => dt.format("%H:%M:%S").to_string(),
                            None => String::new(),
                        }
                    })
                    .show(ui, |plot_ui| {
                        plot_ui.line(
                            Line::new(self.selected_coin.label.clone(), points)
                                .color(egui::Color32::from_rgb(100, 200, 255))
                                .width(2.0),
                        );
                    });
            }
        });

        // Force frequent repaints to ensure responsive logs
        ctx.request_repaint();
    }
}
