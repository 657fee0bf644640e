//! Watch-party chat panel for `FeedApp`.
//!
//! A background thread plays a second participant, publishing through the
//! shared change feed the same way a network listener would.

use std::time::{Duration, Instant};

use eframe::egui;

use clipfeed::realtime::ChangeFeed;
use clipfeed::watch_party::{PartyEvent, WatchParty};

use super::{FeedApp, PARTY_ID};

const PEER_NAME: &str = "mika";
const PEER_LINES: [&str; 5] = [
    "ok starting the video now",
    "wait rewind 10s",
    "that cut was so clean",
    "who picked this song lol",
    "brb",
];
const PEER_INTERVAL: Duration = Duration::from_secs(4);

/// Spawn the simulated participant. It leaves after its last line.
pub fn spawn_simulated_peer(feed: ChangeFeed<PartyEvent>, ctx: egui::Context) {
    std::thread::spawn(move || {
        let mut peer = WatchParty::join(&feed, PARTY_ID, PEER_NAME);
        ctx.request_repaint();
        for line in PEER_LINES {
            std::thread::sleep(PEER_INTERVAL);
            peer.poll();
            if let Err(e) = peer.send(line, Instant::now()) {
                log::warn!("simulated peer could not send: {}", e);
            }
            ctx.request_repaint();
        }
        peer.leave();
        ctx.request_repaint();
    });
}

impl FeedApp {
    pub fn draw_chat(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Watch party");
            let watching: Vec<&str> = self.party.presence().iter().map(|s| s.as_str()).collect();
            ui.label(
                egui::RichText::new(format!(
                    "{} watching ({} connected)",
                    watching.join(", "),
                    self.party_feed.subscriber_count()
                ))
                .small()
                .weak(),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("Share").clicked() {
                    let link = format!("https://clipfeed.app/party/{}", PARTY_ID);
                    let outcome = self.capabilities.share("Join my watch party", &link);
                    match outcome {
                        Ok(()) => self.report("Shared party link".to_string()),
                        Err(e) => self.report(format!("Share unavailable: {}", e)),
                    }
                }
            });
        });
        ui.separator();

        let input_height = 32.0;
        egui::ScrollArea::vertical()
            .max_height((ui.available_height() - input_height).max(40.0))
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for msg in self.party.messages() {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&msg.author).strong());
                        ui.label(&msg.body);
                    });
                }
            });

        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.chat_input)
                    .hint_text("Say something...")
                    .desired_width(ui.available_width() - 56.0),
            );
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Send").clicked() || submitted {
                self.send_chat();
                response.request_focus();
            }
        });
    }

    fn send_chat(&mut self) {
        match self.party.send(&self.chat_input, Instant::now()) {
            Ok(_) => self.chat_input.clear(),
            Err(e) => self.report(e.to_string()),
        }
    }
}
