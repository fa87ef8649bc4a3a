// SPDX-License-Identifier: MIT OR Apache-2.0
//! On-screen motion log fed by a tracing layer.

use std::collections::VecDeque;
use std::sync::mpsc;

/// Entries kept before the oldest are dropped
const MAX_ENTRIES: usize = 500;

/// A tracing event captured by the [`TracingBridge`] layer
#[derive(Debug, Clone)]
pub struct TracingEvent {
    /// Event level
    pub level: tracing::Level,
    /// Emitting module
    pub target: String,
    /// Message followed by its fields
    pub message: String,
}

/// A `tracing_subscriber::Layer` that forwards events over an `mpsc`
/// channel so the [`LogPanel`] can display them
pub struct TracingBridge {
    sender: mpsc::Sender<TracingEvent>,
}

impl TracingBridge {
    /// Create a new bridge and return `(layer, receiver)`
    pub fn new() -> (Self, mpsc::Receiver<TracingEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl<S> tracing_subscriber::Layer<S> for TracingBridge
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let meta = event.metadata();
        let _ = self.sender.send(TracingEvent {
            level: *meta.level(),
            target: meta.target().to_string(),
            message: visitor.finish(),
        });
    }
}

/// Collects the `message` field and appends the remaining fields
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (true, true) => "(empty)".to_string(),
            (true, false) => self.fields.join(", "),
            (false, true) => self.message,
            (false, false) => format!("{} ({})", self.message, self.fields.join(", ")),
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push(format!("{} = {:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{} = {}", field.name(), value));
        }
    }
}

fn level_color(level: tracing::Level) -> egui::Color32 {
    match level {
        tracing::Level::TRACE => egui::Color32::from_rgb(100, 100, 100),
        tracing::Level::DEBUG => egui::Color32::from_rgb(150, 150, 150),
        tracing::Level::INFO => egui::Color32::from_rgb(200, 200, 200),
        tracing::Level::WARN => egui::Color32::from_rgb(255, 200, 80),
        tracing::Level::ERROR => egui::Color32::from_rgb(255, 100, 100),
    }
}

/// Side panel listing recent motion events
pub struct LogPanel {
    tracing_rx: Option<mpsc::Receiver<TracingEvent>>,
    entries: VecDeque<TracingEvent>,
    show_debug: bool,
}

impl LogPanel {
    /// Create a panel wired to an optional tracing receiver
    pub fn new(tracing_rx: Option<mpsc::Receiver<TracingEvent>>) -> Self {
        Self {
            tracing_rx,
            entries: VecDeque::new(),
            show_debug: true,
        }
    }

    /// Drain pending tracing events
    pub fn poll(&mut self) {
        let Some(rx) = &self.tracing_rx else {
            return;
        };
        while let Ok(event) = rx.try_recv() {
            self.entries.push_back(event);
        }
        while self.entries.len() > MAX_ENTRIES {
            self.entries.pop_front();
        }
    }

    /// Number of buffered entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been logged yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the panel
    pub fn ui(&mut self, ctx: &egui::Context) {
        self.poll();
        egui::SidePanel::right("motion_log")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Motion log");
                    ui.weak(format!("{} / {MAX_ENTRIES}", self.len()));
                    if ui.button("Clear").clicked() {
                        self.entries.clear();
                    }
                    ui.checkbox(&mut self.show_debug, "Debug");
                });
                ui.separator();
                if self.is_empty() {
                    ui.weak("No motion events yet");
                }

                egui::ScrollArea::vertical()
                    .id_salt("motion_log_entries")
                    .stick_to_bottom(true)
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for entry in &self.entries {
                            if !self.show_debug && entry.level > tracing::Level::INFO {
                                continue;
                            }
                            let short_target =
                                entry.target.rsplit("::").next().unwrap_or(&entry.target);
                            ui.label(
                                egui::RichText::new(format!(
                                    "{:>5} [{}] {}",
                                    entry.level, short_target, entry.message
                                ))
                                .monospace()
                                .color(level_color(entry.level)),
                            );
                        }
                    });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_bridge_forwards_fields() {
        let (bridge, rx) = TracingBridge::new();
        let subscriber = tracing_subscriber::registry().with(bridge);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(state = "S1_IDLE", "scroll sequence rewound to start");
            tracing::debug!(intent = "down");
        });

        let mut panel = LogPanel::new(Some(rx));
        panel.poll();
        assert_eq!(panel.len(), 2);
        assert_eq!(
            panel.entries[0].message,
            "scroll sequence rewound to start (state = S1_IDLE)"
        );
        assert_eq!(panel.entries[1].message, "intent = down");
        assert_eq!(panel.entries[1].level, tracing::Level::DEBUG);
    }

    #[test]
    fn test_panel_caps_entries() {
        let (sender, rx) = mpsc::channel();
        for i in 0..MAX_ENTRIES + 10 {
            let _ = sender.send(TracingEvent {
                level: tracing::Level::INFO,
                target: "tradeflow_motion_scroll::controller".to_string(),
                message: format!("event {i}"),
            });
        }
        let mut panel = LogPanel::new(Some(rx));
        panel.poll();
        assert_eq!(panel.len(), MAX_ENTRIES);
        assert_eq!(panel.entries[0].message, "event 10");
    }
}
