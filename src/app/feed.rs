//! Comment feed rendering for `FeedApp`.
//!
//! Each row is a `SwipeAction`: swipe left to delete, swipe right to reply.
//! Row callbacks only queue a `FeedAction`; the queue is applied after the
//! frame's rows are drawn so the list never changes mid-iteration.

use std::rc::Rc;
use std::sync::mpsc;

use eframe::egui;

use clipfeed::mobile::capability::Capabilities;
use clipfeed::mobile::touch::{SwipeConfig, SwipeTracker};
use clipfeed::mobile::ui::{SwipeAction, SwipeActionStyle};
use clipfeed::settings::FeedTab;

use super::FeedApp;

const ROW_HEIGHT: f32 = 56.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedAction {
    Delete(u64),
    Reply(u64),
}

pub struct CommentRow {
    pub id: u64,
    pub author: String,
    pub body: String,
    /// Author is followed by the local user
    pub following: bool,
    pub tracker: SwipeTracker,
}

fn row_tracker(
    id: u64,
    tx: &mpsc::Sender<FeedAction>,
    capabilities: &Rc<dyn Capabilities>,
) -> SwipeTracker {
    let delete_tx = tx.clone();
    let reply_tx = tx.clone();
    SwipeTracker::new(SwipeConfig::default())
        .on_swipe_left(move || {
            let _ = delete_tx.send(FeedAction::Delete(id));
        })
        .on_swipe_right(move || {
            let _ = reply_tx.send(FeedAction::Reply(id));
        })
        .with_capabilities(Rc::clone(capabilities))
}

pub fn seed_comments(
    tx: &mpsc::Sender<FeedAction>,
    capabilities: &Rc<dyn Capabilities>,
) -> Vec<CommentRow> {
    let seed = [
        ("mika", "that transition at 0:12 is unreal", true),
        ("dev_ryo", "what camera is this?", false),
        ("lena", "came back to watch this 5 times", true),
        ("oskar", "the audio sync is slightly off for me", false),
        ("pri", "tutorial please!!", true),
        ("jun", "first time seeing this trend, love it", false),
        ("sam", "song name?", false),
        ("ana", "this deserves way more views", true),
        ("theo", "the lighting here is perfect", false),
        ("kai", "how long did this take to edit", true),
    ];
    seed.iter()
        .enumerate()
        .map(|(i, (author, body, following))| {
            let id = i as u64 + 1;
            CommentRow {
                id,
                author: author.to_string(),
                body: body.to_string(),
                following: *following,
                tracker: row_tracker(id, tx, capabilities),
            }
        })
        .collect()
}

impl FeedApp {
    /// Render the comment list for the current tab.
    pub fn draw_feed(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Comments");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.checkbox(&mut self.swipe_disabled, "Lock rows");
            });
        });
        if let Some(status) = &self.status {
            ui.label(egui::RichText::new(status).small().weak());
        }
        ui.separator();

        let delete = SwipeActionStyle::new("Delete", egui::Color32::from_rgb(229, 57, 53));
        let reply = SwipeActionStyle::new("Reply", egui::Color32::from_rgb(30, 136, 229));
        let disabled = self.swipe_disabled;
        let tab = self.tab;
        let mut copy_request = None;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for row in self.comments.iter_mut() {
                    if tab == FeedTab::Following && !row.following {
                        continue;
                    }
                    let (id, author, body) = (row.id, &row.author, &row.body);
                    SwipeAction::new(&mut row.tracker, ROW_HEIGHT)
                        .left_action(&delete)
                        .right_action(&reply)
                        .disabled(disabled)
                        .show(ui, |ui| {
                            ui.vertical(|ui| {
                                ui.label(egui::RichText::new(author.as_str()).strong());
                                ui.label(body.as_str());
                            });
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if ui.small_button("\u{1F517}").on_hover_text("Copy link").clicked() {
                                        copy_request = Some(id);
                                    }
                                },
                            );
                        });
                    ui.add_space(4.0);
                }
                if self.comments.is_empty() {
                    ui.label(egui::RichText::new("No comments yet").weak());
                }
            });

        if let Some(id) = copy_request {
            let link = comment_link(id);
            match self.capabilities.copy_to_clipboard(&link) {
                Ok(()) => self.report(format!("Copied {}", link)),
                Err(e) => self.report(format!("Could not copy link: {}", e)),
            }
        }
    }

    /// Apply actions queued by row callbacks this frame.
    pub fn apply_feed_actions(&mut self) {
        while let Ok(action) = self.action_rx.try_recv() {
            match action {
                FeedAction::Delete(id) => {
                    let before = self.comments.len();
                    self.comments.retain(|c| c.id != id);
                    if self.comments.len() != before {
                        self.report(format!("Deleted comment #{}", id));
                    }
                }
                FeedAction::Reply(id) => {
                    if let Some(author) = self.comments.iter().find(|c| c.id == id).map(|c| c.author.clone()) {
                        self.chat_input = format!("@{} ", author);
                        self.report(format!("Replying to {}", author));
                    }
                }
            }
        }
    }
}

pub fn comment_link(id: u64) -> String {
    format!("https://clipfeed.app/c/{}", id)
}
