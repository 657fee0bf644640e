//! `FeedApp` — the top-level egui application state.
//!
//! This module declares the `FeedApp` struct, its constructor and the
//! `eframe::App` impl. Drawing is split across the sibling sub-modules:
//!
//! - `feed`     — swipeable comment rows and their actions
//! - `settings` — preferences side panel
//! - `chat`     — watch-party chat and the simulated peer

pub mod chat;
pub mod feed;
pub mod settings;

use std::rc::Rc;
use std::sync::mpsc;

use eframe::egui;

use clipfeed::mobile::capability::{Capabilities, EguiCapabilities};
use clipfeed::realtime::ChangeFeed;
use clipfeed::settings::{FeedTab, KeyValueStore, Settings};
use clipfeed::watch_party::{PartyEvent, WatchParty};

use feed::{CommentRow, FeedAction};

pub const LOCAL_USER: &str = "you";
pub const PARTY_ID: u64 = 1;

// ─── Application state ───────────────────────────────────────────────────────

pub struct FeedApp {
    pub settings: Settings<Box<dyn KeyValueStore>>,
    pub tab: FeedTab,
    pub comments: Vec<CommentRow>,
    pub action_rx: mpsc::Receiver<FeedAction>,
    pub capabilities: Rc<dyn Capabilities>,
    pub swipe_disabled: bool,
    pub show_settings: bool,
    /// Last user-facing status line (errors and confirmations)
    pub status: Option<String>,
    pub party_feed: ChangeFeed<PartyEvent>,
    pub party: WatchParty,
    pub chat_input: String,
}

impl FeedApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings<Box<dyn KeyValueStore>>) -> Self {
        let (action_tx, action_rx) = mpsc::channel();
        let capabilities: Rc<dyn Capabilities> =
            Rc::new(EguiCapabilities::new(cc.egui_ctx.clone()));

        let comments = feed::seed_comments(&action_tx, &capabilities);

        let party_feed = ChangeFeed::new();
        let party = WatchParty::join(&party_feed, PARTY_ID, LOCAL_USER);
        chat::spawn_simulated_peer(party_feed.clone(), cc.egui_ctx.clone());

        Self {
            tab: settings.default_feed(),
            settings,
            comments,
            action_rx,
            capabilities,
            swipe_disabled: false,
            show_settings: false,
            status: None,
            party_feed,
            party,
            chat_input: String::new(),
        }
    }

    /// Any row currently tracking a gesture.
    pub fn gesture_active(&self) -> bool {
        self.comments.iter().any(|c| c.tracker.is_swiping())
    }

    fn draw_tab_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for tab in [FeedTab::ForYou, FeedTab::Following] {
                ui.selectable_value(&mut self.tab, tab, tab.label());
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.toggle_value(&mut self.show_settings, "\u{2699}");
                let sound = if self.settings.muted() { "\u{1F507}" } else { "\u{1F50A}" };
                if ui.button(sound).clicked() {
                    if let Err(e) = self.settings.toggle_muted() {
                        self.report(format!("Could not save: {}", e));
                    }
                }
            });
        });
    }

    pub fn report(&mut self, message: String) {
        log::info!("{}", message);
        self.status = Some(message);
    }
}

impl eframe::App for FeedApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.party.poll();

        let hide_nav = self.settings.nav_auto_hide() && self.gesture_active();
        if !hide_nav {
            egui::TopBottomPanel::top("tabs").show(ctx, |ui| self.draw_tab_bar(ui));
        }

        if self.show_settings {
            egui::SidePanel::right("settings")
                .resizable(false)
                .default_width(220.0)
                .show(ctx, |ui| self.draw_settings(ui));
        }

        egui::TopBottomPanel::bottom("chat")
            .resizable(true)
            .default_height(220.0)
            .show(ctx, |ui| self.draw_chat(ui));

        let margin = self.settings.ui_margin().pixels();
        egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).inner_margin(margin))
            .show(ctx, |ui| self.draw_feed(ui));

        self.apply_feed_actions();
    }
}
