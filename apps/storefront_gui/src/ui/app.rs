use std::time::Duration;

use client_core::{
    form::{package_option_label, EMPTY_FIELD},
    messages, FlowEvent, OrderFormState,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{Currency, Order, CATALOG};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

#[derive(Debug, Clone, PartialEq, Eq)]
struct StatusBanner {
    message: String,
}

pub struct StorefrontApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    form: OrderFormState,
    order: Option<Order>,
    status: String,
    status_banner: Option<StatusBanner>,
    loading: bool,
    polling: bool,
    poll_attempt: Option<u32>,
    pending_pay_url: Option<String>,
}

impl StorefrontApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            form: OrderFormState::new(),
            order: None,
            status: String::new(),
            status_banner: None,
            loading: false,
            polling: false,
            poll_attempt: None,
            pending_pay_url: None,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Error(err) => self.apply_error(err),
                UiEvent::Flow(event) => self.apply_flow_event(event),
            }
        }
    }

    fn apply_error(&mut self, err: UiError) {
        if err.context() == UiErrorContext::BackendStartup {
            self.status = err.message().to_string();
        }
        if err.wants_banner() {
            self.status_banner = Some(StatusBanner {
                message: format!("{}: {}", err.category().label(), err.message()),
            });
        }
    }

    fn apply_flow_event(&mut self, event: FlowEvent) {
        match event {
            FlowEvent::LoadingChanged(loading) => self.loading = loading,
            FlowEvent::OrderCreated(order) => {
                self.order = Some(order);
                self.polling = false;
                self.poll_attempt = None;
                self.status_banner = None;
            }
            FlowEvent::StatusMessage(message) => self.status = message,
            FlowEvent::PaymentOpened { pay_url } => {
                self.pending_pay_url = Some(pay_url);
                self.polling = true;
                self.poll_attempt = None;
            }
            FlowEvent::PollProgress { attempt, .. } => self.poll_attempt = Some(attempt),
            FlowEvent::PollFinished { order_id, outcome } => {
                tracing::debug!(%order_id, ?outcome, "poll finished");
                self.polling = false;
                self.poll_attempt = None;
            }
        }
    }

    fn submit_order(&mut self) {
        if let Err(err) = self.form.validate() {
            self.status = err.to_string();
            return;
        }
        self.status_banner = None;
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::CreateOrder {
                draft: self.form.draft().clone(),
            },
            &mut self.status,
        );
    }

    fn can_pay(&self) -> bool {
        !self.loading && self.order.is_some()
    }

    fn pay_now(&mut self) {
        dispatch_backend_command(&self.cmd_tx, BackendCommand::PayNow, &mut self.status);
    }

    fn cancel_polling(&mut self) {
        if !self.polling {
            return;
        }
        if dispatch_backend_command(&self.cmd_tx, BackendCommand::CancelPolling, &mut self.status)
        {
            self.polling = false;
            self.poll_attempt = None;
            self.status = messages::POLLING_CANCELLED.to_string();
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            egui::Frame::NONE
                .fill(egui::Color32::from_rgb(111, 53, 53))
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Tutup").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
            ui.add_space(8.0);
        }
    }

    fn show_order_form(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Data Akun").strong());
        egui::Grid::new("order_form")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("Player ID");
                ui.add(
                    egui::TextEdit::singleline(self.form.player_id_mut())
                        .hint_text("contoh: 123456789"),
                );
                ui.end_row();

                ui.label("Zone");
                let mut zone = self.form.draft().zone;
                ui.add(egui::DragValue::new(&mut zone).range(1..=u32::MAX));
                self.form.set_zone(zone);
                ui.end_row();

                let currency = self.form.draft().currency;
                ui.label("Paket");
                let mut package_code = self.form.draft().package_code.clone();
                let selected = self
                    .form
                    .selected_package()
                    .map(|package| package_option_label(package, currency))
                    .unwrap_or_else(|| EMPTY_FIELD.to_string());
                egui::ComboBox::from_id_salt("package_select")
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        for package in CATALOG.iter() {
                            ui.selectable_value(
                                &mut package_code,
                                package.code.to_string(),
                                package_option_label(package, currency),
                            );
                        }
                    });
                self.form.select_package(&package_code);
                ui.end_row();

                ui.label("Qty");
                let mut quantity = self.form.draft().quantity;
                ui.add(egui::DragValue::new(&mut quantity).range(1..=u32::MAX));
                self.form.set_quantity(quantity);
                ui.end_row();

                ui.label("Currency");
                let mut currency = currency;
                egui::ComboBox::from_id_salt("currency_select")
                    .selected_text(currency.code())
                    .show_ui(ui, |ui| {
                        for option in Currency::ALL {
                            ui.selectable_value(&mut currency, option, option.code());
                        }
                    });
                self.form.set_currency(currency);
                ui.end_row();
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("Total:");
            ui.strong(self.form.formatted_total());
        });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let create_label = if self.loading {
                "Memproses..."
            } else {
                "Buat Order"
            };
            if ui
                .add_enabled(!self.loading, egui::Button::new(create_label))
                .clicked()
            {
                self.submit_order();
            }
            if ui
                .add_enabled(self.can_pay(), egui::Button::new("Bayar via FPX"))
                .clicked()
            {
                self.pay_now();
            }
            if self.polling && ui.button("Batalkan").clicked() {
                self.cancel_polling();
            }
        });
    }

    fn show_summary(&self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Ringkasan").strong());
        egui::Grid::new("order_summary")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                for (label, value) in self.form.summary().rows() {
                    ui.label(label);
                    ui.strong(value);
                    ui.end_row();
                }
            });

        if let Some(order) = &self.order {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label("Order ID:");
                ui.monospace(order.order_id.to_string());
            });
        }

        if self.polling {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.spinner();
                match self.poll_attempt {
                    Some(attempt) => ui.weak(format!("Cek status pembayaran (#{attempt})")),
                    None => ui.weak("Cek status pembayaran"),
                };
            });
        }
    }
}

impl eframe::App for StorefrontApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        if let Some(pay_url) = self.pending_pay_url.take() {
            ctx.open_url(egui::OpenUrl::new_tab(pay_url));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Top Up Diamond MLBB");
            ui.weak("Isi data akun, pilih paket, lalu bayar via FPX.");
            ui.add_space(10.0);
            self.show_status_banner(ui);

            ui.columns(2, |columns| {
                self.show_order_form(&mut columns[0]);
                self.show_summary(&mut columns[1]);
            });

            ui.separator();
            if !self.status.is_empty() {
                ui.label(&self.status);
            }
        });

        let repaint_after = if self.loading || self.polling { 100 } else { 250 };
        ctx.request_repaint_after(Duration::from_millis(repaint_after));
    }
}

impl Drop for StorefrontApp {
    fn drop(&mut self) {
        let _ = self.cmd_tx.try_send(BackendCommand::Shutdown);
    }
}
