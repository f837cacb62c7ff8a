//! Main GUI application module
//!
//! Contains the GuiApp struct, the per-frame job and input bookkeeping, and
//! the top bar. The form panels live in `views`.

use crate::{
    calldata::{self, BatchPolicy},
    chain::{ChainSession, SubstrateConnector},
    config::{find_network_index, Config, NETWORKS},
    csv_import,
    debounce::DebouncedInput,
    form::ProxyForm,
    rebuild::RebuildTicket,
    types::TransferField,
};
use anyhow::{anyhow, Result};
use eframe::{egui, egui::RichText, App, Frame, NativeOptions};
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::async_job::{spawn_job, AsyncJob};
use super::notifications::{push_notification, NotificationEntry};
use super::theme::{configure_style, AppTheme};

/// Repaint cadence while jobs are running.
const BUSY_REPAINT: Duration = Duration::from_millis(100);
const IDLE_REPAINT: Duration = Duration::from_millis(500);

/// Debounced editors for one transfer row.
pub(crate) struct RowInputs {
    pub(crate) destination: DebouncedInput,
    pub(crate) amount: DebouncedInput,
}

impl RowInputs {
    fn new(destination: &str, amount: &str, delay: Duration) -> Self {
        Self {
            destination: DebouncedInput::new(destination, delay),
            amount: DebouncedInput::new(amount, delay),
        }
    }

    fn input_mut(&mut self, field: TransferField) -> &mut DebouncedInput {
        match field {
            TransferField::Destination => &mut self.destination,
            TransferField::Amount => &mut self.amount,
        }
    }
}

pub struct GuiApp {
    pub(crate) config: Config,
    pub(crate) theme: AppTheme,
    pub(crate) form: ProxyForm,
    pub(crate) proxy_input: DebouncedInput,
    pub(crate) row_inputs: HashMap<u64, RowInputs>,
    pub(crate) session: Arc<ChainSession<SubstrateConnector>>,
    pub(crate) rebuild_jobs: Vec<(RebuildTicket, AsyncJob<String>)>,
    pub(crate) csv_job: Option<AsyncJob<String>>,
    pub(crate) import_error: Option<String>,
    pub(crate) notifications: VecDeque<NotificationEntry>,
    pub(crate) network_index: usize,
}

impl GuiApp {
    fn new(config: Config, ctx: &egui::Context) -> Self {
        let theme = AppTheme::default();
        configure_style(ctx, &theme);

        let network_index = find_network_index(&config.network_key).unwrap_or(0);
        let proxy_input = DebouncedInput::new("", config.debounce());

        Self {
            config,
            theme,
            form: ProxyForm::new(),
            proxy_input,
            row_inputs: HashMap::new(),
            session: Arc::new(ChainSession::new(SubstrateConnector::default())),
            rebuild_jobs: Vec::new(),
            csv_job: None,
            import_error: None,
            notifications: VecDeque::with_capacity(20),
            network_index,
        }
    }

    pub(crate) fn notify(&mut self, message: impl Into<String>) {
        push_notification(&mut self.notifications, message);
    }

    pub(crate) fn select_network(&mut self, index: usize) {
        if index == self.network_index {
            return;
        }
        let Some(network) = NETWORKS.get(index) else {
            return;
        };
        self.network_index = index;
        self.config.select_network(network);
        // Fresh session: in-flight jobs keep the old one and their results are discarded
        self.session = Arc::new(ChainSession::new(SubstrateConnector::default()));
        self.form.invalidate();
        self.notify(format!("Switched to {}", network.label));
    }

    pub(crate) fn select_batch_policy(&mut self, policy: BatchPolicy) {
        if policy == self.config.batch_policy {
            return;
        }
        self.config.batch_policy = policy;
        self.form.invalidate();
        self.notify(format!("Batch layout: {}", policy.description()));
    }

    pub(crate) fn start_csv_import(&mut self, path: PathBuf) {
        tracing::info!("Importing transfers from {}", path.display());
        self.csv_job = Some(spawn_job(move || async move {
            csv_import::read_file(&path).await.map_err(anyhow::Error::from)
        }));
    }

    fn apply_csv_result(&mut self, result: Result<String>) {
        let outcome = result.and_then(|text| self.form.import_csv(&text).map_err(anyhow::Error::from));
        match outcome {
            Ok(count) => {
                self.import_error = None;
                self.notify(format!("[OK] Imported {} transfers from CSV", count));
            }
            Err(e) => {
                self.import_error = Some(e.to_string());
                self.notify(format!("[!!] CSV import failed: {}", e));
            }
        }
    }

    fn poll_jobs(&mut self) {
        let form = &mut self.form;
        self.rebuild_jobs.retain_mut(|(ticket, job)| match job.poll() {
            Some(result) => {
                form.complete(*ticket, result.map_err(|e| e.to_string()));
                false
            }
            None => true,
        });

        if let Some(job) = &mut self.csv_job {
            if let Some(result) = job.poll() {
                self.csv_job = None;
                self.apply_csv_result(result);
            }
        }
    }

    /// Follow list changes that did not come from the editors (CSV import, clear, add).
    fn sync_inputs(&mut self) {
        let delay = self.config.debounce();
        let list = self.form.list();
        self.proxy_input.sync_external(list.proxy_account());

        self.row_inputs.retain(|id, _| list.get(*id).is_some());
        for entry in list.entries() {
            let inputs = self
                .row_inputs
                .entry(entry.id)
                .or_insert_with(|| RowInputs::new(&entry.destination, &entry.amount, delay));
            inputs.destination.sync_external(&entry.destination);
            inputs.amount.sync_external(&entry.amount);
        }
    }

    /// Write drafts whose quiet period has elapsed into the list.
    fn commit_inputs(&mut self, now: Instant) {
        if let Some(value) = self.proxy_input.poll(now) {
            self.form.list_mut().set_proxy_account(&value);
        }
        for (id, inputs) in self.row_inputs.iter_mut() {
            for field in [TransferField::Destination, TransferField::Amount] {
                if let Some(value) = inputs.input_mut(field).poll(now) {
                    self.form.list_mut().update(*id, field, &value);
                }
            }
        }
    }

    fn schedule_rebuild(&mut self) {
        let Some((ticket, request)) = self.form.poll_rebuild() else {
            return;
        };
        let session = Arc::clone(&self.session);
        let endpoint = self.config.ws_url.clone();
        let policy = self.config.batch_policy;
        let job = spawn_job(move || async move {
            calldata::rebuild(&session, &endpoint, &request, policy)
                .await
                .map_err(anyhow::Error::from)
        });
        self.rebuild_jobs.push((ticket, job));
    }

    fn next_repaint(&self, now: Instant) -> Duration {
        let mut next = if self.rebuild_jobs.is_empty() && self.csv_job.is_none() {
            IDLE_REPAINT
        } else {
            BUSY_REPAINT
        };
        let pending = std::iter::once(&self.proxy_input).chain(
            self.row_inputs
                .values()
                .flat_map(|inputs| [&inputs.destination, &inputs.amount]),
        );
        for input in pending {
            if let Some(wait) = input.time_until_commit(now) {
                next = next.min(wait);
            }
        }
        next
    }

    fn render_top_bar(&mut self, ui: &mut egui::Ui) {
        ui.add_space(self.theme.spacing_sm);
        ui.horizontal(|ui| {
            ui.heading(RichText::new("Proxy Batch Builder").strong().color(self.theme.primary));
            ui.label(
                RichText::new(format!("v{}", env!("CARGO_PKG_VERSION")))
                    .small()
                    .color(self.theme.text_secondary),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let mut selected_network = self.network_index;
                let current = NETWORKS
                    .get(self.network_index)
                    .map(|n| format!("{} ({})", n.label, n.native_token))
                    .unwrap_or_else(|| self.config.label.clone());
                // Switching mid-build would race the running job
                ui.add_enabled_ui(!self.form.is_building(), |ui| {
                    egui::ComboBox::from_id_source("network_selector")
                        .selected_text(current)
                        .width(180.0)
                        .show_ui(ui, |ui| {
                            for (idx, network) in NETWORKS.iter().enumerate() {
                                let label = format!("{} · {}", network.label, network.native_token);
                                ui.selectable_value(&mut selected_network, idx, label);
                            }
                        });
                });

                let mut selected_policy = self.config.batch_policy;
                egui::ComboBox::from_id_source("batch_policy_selector")
                    .selected_text(selected_policy.description())
                    .width(200.0)
                    .show_ui(ui, |ui| {
                        for policy in BatchPolicy::ALL {
                            ui.selectable_value(&mut selected_policy, policy, policy.description());
                        }
                    });
                ui.label(RichText::new("Batch layout:").color(self.theme.text_secondary));

                if selected_network != self.network_index {
                    self.select_network(selected_network);
                }
                if selected_policy != self.config.batch_policy {
                    self.select_batch_policy(selected_policy);
                }
            });
        });
        ui.add_space(self.theme.spacing_sm);
    }
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let now = Instant::now();
        self.poll_jobs();
        self.sync_inputs();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            self.render_top_bar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.view_transfers(ui, now);
                ui.add_space(self.theme.spacing_lg);
                self.view_output(ui);
            });
        });

        self.commit_inputs(now);
        self.schedule_rebuild();
        ctx.request_repaint_after(self.next_repaint(now));
    }
}

pub fn launch(config: Config) -> Result<()> {
    tracing::info!(
        "Starting with network {} ({}), batch layout {}",
        config.label,
        config.ws_url,
        config.batch_policy
    );

    let app_creator = move |cc: &eframe::CreationContext<'_>| {
        Box::new(GuiApp::new(config, &cc.egui_ctx)) as Box<dyn App>
    };

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([980.0, 760.0])
        .with_min_inner_size([640.0, 480.0]);

    let native_options = NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native("Proxy Batch Builder", native_options, Box::new(app_creator))
        .map_err(|e| anyhow!("Failed to start GUI: {}", e))
}
