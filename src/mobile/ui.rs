//! SwipeAction — swipeable row with revealed action regions
//!
//! ┌──────────────────────────────┐
//! │ [Reply] │   row content  →    │  ← right swipe reveals the left edge
//! └──────────────────────────────┘
//! ┌──────────────────────────────┐
//! │    ←  row content   │ [Delete]│  ← left swipe reveals the right edge
//! └──────────────────────────────┘
//!
//! Layout is a pure function of the tracker's offset and progress
//! ([`SwipeVisual::compute`]); the egui widget only paints it.

use super::touch::{MoveResponse, SwipeTracker, TouchPoint};

/// Offset magnitude past which a background region becomes visible.
pub const REVEAL_THRESHOLD: f32 = 20.0;

/// Progress at which the action label starts to fade in.
pub const LABEL_FADE_START: f32 = 0.5;

/// Label scale once the release would commit.
pub const ARMED_LABEL_SCALE: f32 = 1.1;

const CORNER_RADIUS: f32 = 6.0;
const LABEL_SIZE: f32 = 14.0;

impl From<egui::Pos2> for TouchPoint {
    fn from(pos: egui::Pos2) -> Self {
        TouchPoint::new(pos.x, pos.y)
    }
}

/// Look of one action region
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeActionStyle {
    pub label: String,
    pub fill: egui::Color32,
}

impl SwipeActionStyle {
    pub fn new(label: impl Into<String>, fill: egui::Color32) -> Self {
        Self {
            label: label.into(),
            fill,
        }
    }
}

/// A revealed background region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reveal {
    /// Region width in pixels
    pub width: f32,
    /// Label alpha (0.0 -> 1.0)
    pub label_opacity: f32,
    pub label_scale: f32,
}

/// Everything the row needs to paint one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeVisual {
    /// Horizontal translation of the foreground content
    pub translate_x: f32,
    /// Region shown while swiping left (anchored to the right edge)
    pub left_swipe: Option<Reveal>,
    /// Region shown while swiping right (anchored to the left edge)
    pub right_swipe: Option<Reveal>,
}

impl SwipeVisual {
    /// Static layout: no translation, nothing revealed.
    pub const STATIC: SwipeVisual = SwipeVisual {
        translate_x: 0.0,
        left_swipe: None,
        right_swipe: None,
    };

    pub fn compute(offset: f32, progress: f32, disabled: bool) -> Self {
        if disabled || !offset.is_finite() {
            return Self::STATIC;
        }

        let magnitude = offset.abs();
        let reveal = (magnitude > REVEAL_THRESHOLD).then(|| Reveal {
            width: magnitude + REVEAL_THRESHOLD,
            label_opacity: label_opacity(progress),
            label_scale: if progress >= 1.0 { ARMED_LABEL_SCALE } else { 1.0 },
        });

        Self {
            translate_x: offset,
            left_swipe: if offset < 0.0 { reveal } else { None },
            right_swipe: if offset > 0.0 { reveal } else { None },
        }
    }
}

fn label_opacity(progress: f32) -> f32 {
    if progress < LABEL_FADE_START {
        return 0.0;
    }
    ((progress - LABEL_FADE_START) / (1.0 - LABEL_FADE_START)).clamp(0.0, 1.0)
}

/// Swipeable row widget driving a [`SwipeTracker`].
///
/// The tracker lives in the caller's state so the gesture survives across
/// frames. When `disabled`, the row renders statically and senses no input.
pub struct SwipeAction<'a> {
    tracker: &'a mut SwipeTracker,
    height: f32,
    left: Option<&'a SwipeActionStyle>,
    right: Option<&'a SwipeActionStyle>,
    disabled: bool,
}

impl<'a> SwipeAction<'a> {
    pub fn new(tracker: &'a mut SwipeTracker, height: f32) -> Self {
        Self {
            tracker,
            height,
            left: None,
            right: None,
            disabled: false,
        }
    }

    /// Region revealed by a left swipe.
    pub fn left_action(mut self, style: &'a SwipeActionStyle) -> Self {
        self.left = Some(style);
        self
    }

    /// Region revealed by a right swipe.
    pub fn right_action(mut self, style: &'a SwipeActionStyle) -> Self {
        self.right = Some(style);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn show<R>(
        mut self,
        ui: &mut egui::Ui,
        add_contents: impl FnOnce(&mut egui::Ui) -> R,
    ) -> egui::InnerResponse<R> {
        let sense = if self.disabled {
            egui::Sense::hover()
        } else {
            egui::Sense::drag()
        };
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(ui.available_width(), self.height), sense);

        if self.disabled {
            // A live gesture must not outlive the switch to disabled
            self.tracker.cancel();
        } else {
            self.handle_input(ui, &response);
        }

        let visual = SwipeVisual::compute(
            self.tracker.offset(),
            self.tracker.progress(),
            self.disabled,
        );
        let painter = ui.painter_at(rect);

        if let (Some(reveal), Some(style)) = (visual.left_swipe, self.left) {
            let region = egui::Rect::from_min_max(
                egui::pos2(rect.max.x - reveal.width, rect.min.y),
                rect.max,
            );
            paint_region(&painter, region, style, reveal);
        }
        if let (Some(reveal), Some(style)) = (visual.right_swipe, self.right) {
            let region = egui::Rect::from_min_max(
                rect.min,
                egui::pos2(rect.min.x + reveal.width, rect.max.y),
            );
            paint_region(&painter, region, style, reveal);
        }

        let content_rect = rect.translate(egui::vec2(visual.translate_x, 0.0));
        painter.rect_filled(content_rect, CORNER_RADIUS, ui.visuals().faint_bg_color);

        let mut child = ui.new_child(
            egui::UiBuilder::new()
                .max_rect(content_rect.shrink(6.0))
                .layout(egui::Layout::left_to_right(egui::Align::Center)),
        );
        child.set_clip_rect(rect.intersect(ui.clip_rect()));
        let inner = add_contents(&mut child);

        egui::InnerResponse::new(inner, response)
    }

    fn handle_input(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let cancelled = ui.input(|i| {
            i.events.iter().any(|e| {
                matches!(
                    e,
                    egui::Event::Touch {
                        phase: egui::TouchPhase::Cancel,
                        ..
                    }
                )
            })
        });

        if response.drag_started() {
            let origin = ui
                .input(|i| i.pointer.press_origin())
                .or_else(|| response.interact_pointer_pos());
            if let Some(origin) = origin {
                self.tracker.begin(origin.into());
            }
        }

        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                if self.tracker.update(pos.into()) == MoveResponse::Scroll {
                    // Vertical gesture: hand the movement back to the scroll area
                    ui.scroll_with_delta(egui::vec2(0.0, response.drag_delta().y));
                }
            }
        }

        if cancelled {
            self.tracker.cancel();
        } else if response.drag_stopped() {
            self.tracker.end();
        }

        if self.tracker.is_swiping() {
            ui.ctx().request_repaint();
        }
    }
}

fn paint_region(
    painter: &egui::Painter,
    region: egui::Rect,
    style: &SwipeActionStyle,
    reveal: Reveal,
) {
    painter.rect_filled(region, CORNER_RADIUS, style.fill);
    if reveal.label_opacity > 0.0 {
        painter.text(
            region.center(),
            egui::Align2::CENTER_CENTER,
            &style.label,
            egui::FontId::proportional(LABEL_SIZE * reveal.label_scale),
            egui::Color32::WHITE.gamma_multiply(reveal.label_opacity),
        );
    }
}
