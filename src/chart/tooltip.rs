//! Tooltip interaction
//!
//! Hover state for the tooltip panel:
//!
//! ```text
//! Hidden --enter--> Visible --leave--> FadingOut --timer--> Hidden
//!                      ^                   |
//!                      +------enter--------+   (timer cancelled)
//! ```
//!
//! Time is passed in explicitly so the state machine is driven the same way
//! by the HTTP surface (wall clock) and by tests (synthetic instants).

use chrono::{Datelike, Timelike};
use serde::Serialize;
use std::time::{Duration, Instant};

use super::legend::HIDE_CLASS;
use super::scene::{Element, NodeId, Scene};
use crate::config::TooltipConfig;
use crate::dataset::{format_time, RaceRecord};

/// Visibility phase of the tooltip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TooltipPhase {
    Hidden,
    Visible,
    FadingOut,
}

/// Bounding box of a marker, in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerBox {
    pub left: f64,
    pub top: f64,
    pub size: f64,
}

impl MarkerBox {
    /// Box of a circle centered at `(cx, cy)`
    pub fn circle(cx: f64, cy: f64, r: f64) -> Self {
        Self {
            left: cx - r,
            top: cy - r,
            size: 2.0 * r,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalSide {
    Below,
    Above,
}

/// `Right`: the tooltip's left edge sits on the marker's left edge.
/// `Left`: the tooltip's right edge sits on the marker's left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalSide {
    Right,
    Left,
}

/// Where the tooltip panel ends up
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    pub vertical: VerticalSide,
    pub horizontal: HorizontalSide,
}

/// Text lines shown for a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TooltipContent {
    pub lines: Vec<String>,
}

impl TooltipContent {
    pub fn for_record(record: &RaceRecord) -> Self {
        let mut lines = vec![
            format!("{}, {}, #{}", record.name, record.nationality, record.place),
            format!("{}, {}", record.year.year(), format_time(&record.time)),
        ];
        if record.has_allegation() {
            lines.push(String::new());
            lines.push(record.doping.clone());
        }
        Self { lines }
    }

    /// Estimated rendered size `(width, height)`, wrapping at `max_width`
    pub fn measure(&self, rules: &TooltipConfig) -> (f64, f64) {
        let inner_max = (rules.max_width - 2.0 * rules.padding).max(rules.char_width);

        let mut widest: f64 = 0.0;
        let mut rows = 0usize;
        for line in &self.lines {
            let natural = line.chars().count() as f64 * rules.char_width;
            widest = widest.max(natural.min(inner_max));
            rows += ((natural / inner_max).ceil() as usize).max(1);
        }

        (
            widest + 2.0 * rules.padding,
            rows as f64 * rules.line_height + 2.0 * rules.padding,
        )
    }
}

/// Position a tooltip of `size` next to `marker`
///
/// Fixed thresholds: fast times (minute below the threshold) open below the
/// marker, slow ones above it; early years open to the right, late years to
/// the left.
pub fn place(
    record: &RaceRecord,
    marker: MarkerBox,
    size: (f64, f64),
    rules: &TooltipConfig,
) -> Placement {
    let (width, height) = size;

    let (vertical, top) = if record.time.minute() < rules.minute_threshold {
        (VerticalSide::Below, marker.top + rules.vertical_offset)
    } else {
        (VerticalSide::Above, marker.top - height)
    };

    let (horizontal, left) = if record.year.year() < rules.year_threshold {
        (HorizontalSide::Right, marker.left)
    } else {
        (HorizontalSide::Left, marker.left - width)
    };

    Placement {
        top,
        left,
        width,
        height,
        vertical,
        horizontal,
    }
}

/// Linear opacity animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    pub from: f64,
    pub to: f64,
    pub start: Instant,
    pub duration: Duration,
}

impl Fade {
    /// Opacity at `now`; holds the final value once finished
    pub fn opacity_at(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.start).as_secs_f64();
        let t = (elapsed / self.duration.as_secs_f64()).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }
}

/// Pending hide of the tooltip panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HideTimer {
    pub deadline: Instant,
}

impl HideTimer {
    pub fn due(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

/// Interaction state for one render pass
#[derive(Debug, Clone)]
pub struct InteractionState {
    rules: TooltipConfig,
    phase: TooltipPhase,
    fade: Option<Fade>,
    hide_timer: Option<HideTimer>,
    hovered: Option<usize>,
    content: Option<TooltipContent>,
    placement: Option<Placement>,
}

impl InteractionState {
    pub fn new(rules: TooltipConfig) -> Self {
        Self {
            rules,
            phase: TooltipPhase::Hidden,
            fade: None,
            hide_timer: None,
            hovered: None,
            content: None,
            placement: None,
        }
    }

    pub fn phase(&self) -> TooltipPhase {
        self.phase
    }

    /// Index of the marker the tooltip describes
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn content(&self) -> Option<&TooltipContent> {
        self.content.as_ref()
    }

    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }

    pub fn hide_timer(&self) -> Option<&HideTimer> {
        self.hide_timer.as_ref()
    }

    /// Current panel opacity
    pub fn opacity(&self, now: Instant) -> f64 {
        match (self.phase, self.fade) {
            (TooltipPhase::Hidden, _) => 0.0,
            (_, Some(fade)) => fade.opacity_at(now),
            (_, None) => 1.0,
        }
    }

    /// Pointer entered marker `index`
    pub fn pointer_enter(
        &mut self,
        index: usize,
        record: &RaceRecord,
        marker: MarkerBox,
        now: Instant,
    ) -> Placement {
        if self.hide_timer.take().is_some() {
            tracing::trace!("Pending tooltip hide cancelled");
        }

        let content = TooltipContent::for_record(record);
        let placement = place(record, marker, content.measure(&self.rules), &self.rules);

        self.phase = TooltipPhase::Visible;
        self.fade = Some(Fade {
            from: 0.0,
            to: 1.0,
            start: now,
            duration: self.rules.fade(),
        });
        self.hovered = Some(index);
        self.content = Some(content);
        self.placement = Some(placement);

        placement
    }

    /// Pointer left the hovered marker; returns whether a fade-out started
    pub fn pointer_leave(&mut self, now: Instant) -> bool {
        if self.phase != TooltipPhase::Visible {
            return false;
        }

        // A fade too long to schedule hides on the next tick
        let (duration, deadline) = match now.checked_add(self.rules.fade()) {
            Some(deadline) => (self.rules.fade(), deadline),
            None => (Duration::ZERO, now),
        };
        let from = self.opacity(now);
        self.phase = TooltipPhase::FadingOut;
        self.fade = Some(Fade {
            from,
            to: 0.0,
            start: now,
            duration,
        });
        self.hide_timer = Some(HideTimer { deadline });
        true
    }

    /// Fire the hide timer if it is due; returns whether the panel was hidden
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.hide_timer {
            Some(timer) if timer.due(now) => {
                self.hide_timer = None;
                self.phase = TooltipPhase::Hidden;
                self.fade = None;
                self.hovered = None;
                true
            }
            _ => false,
        }
    }

    /// Write the current state into the tooltip panel node
    pub fn apply(&self, scene: &mut Scene, panel: NodeId, now: Instant) {
        let opacity = self.opacity(now);

        if let Some(content) = &self.content {
            if self.phase != TooltipPhase::Hidden {
                scene.clear_children(panel);
                for line in &content.lines {
                    scene.append(panel, Element::new("div").class("line").text(line.clone()));
                }
            }
        }

        let element = match scene.get_mut(panel) {
            Some(element) => element,
            None => return,
        };

        match self.phase {
            TooltipPhase::Hidden => element.add_class(HIDE_CLASS),
            TooltipPhase::Visible | TooltipPhase::FadingOut => element.remove_class(HIDE_CLASS),
        }

        if let Some(p) = &self.placement {
            element.set_style("top", format!("{}px", p.top));
            element.set_style("left", format!("{}px", p.left));
            element.set_style("width", format!("{}px", p.width));
        }
        element.set_style("opacity", format!("{:.3}", opacity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{parse_time, year_value};

    fn record(year: i32, time: &str, doping: &str) -> RaceRecord {
        RaceRecord {
            name: "Alberto Contador".to_string(),
            nationality: "ESP".to_string(),
            place: 9,
            year: year_value(year).unwrap(),
            time: parse_time(time).unwrap(),
            doping: doping.to_string(),
            url: None,
        }
    }

    fn marker() -> MarkerBox {
        MarkerBox::circle(500.0, 300.0, 5.0)
    }

    #[test]
    fn test_content_lines() {
        let content = TooltipContent::for_record(&record(2010, "37:42", ""));
        assert_eq!(content.lines, vec!["Alberto Contador, ESP, #9", "2010, 37:42"]);

        let content = TooltipContent::for_record(&record(2010, "37:42", "Positive test"));
        assert_eq!(content.lines.len(), 4);
        assert_eq!(content.lines[2], "");
        assert_eq!(content.lines[3], "Positive test");
    }

    #[test]
    fn test_measure_wraps_long_lines() {
        let rules = TooltipConfig::default();
        let short = TooltipContent {
            lines: vec!["abcd".to_string()],
        };
        assert_eq!(short.measure(&rules), (4.0 * 7.0 + 20.0, 18.0 + 20.0));

        let long = TooltipContent {
            lines: vec!["x".repeat(100)],
        };
        let (w, h) = long.measure(&rules);
        assert_eq!(w, rules.max_width);
        assert_eq!(h, 3.0 * 18.0 + 20.0);
    }

    #[test]
    fn test_fast_late_record_opens_below_and_left() {
        let rules = TooltipConfig::default();
        let p = place(&record(2010, "10:00", ""), marker(), (120.0, 50.0), &rules);

        assert_eq!(p.vertical, VerticalSide::Below);
        assert_eq!(p.top, marker().top + 10.0);
        assert_eq!(p.horizontal, HorizontalSide::Left);
        assert_eq!(p.left + p.width, marker().left);
    }

    #[test]
    fn test_slow_early_record_opens_above_and_right() {
        let rules = TooltipConfig::default();
        let p = place(&record(2000, "40:00", ""), marker(), (120.0, 50.0), &rules);

        assert_eq!(p.vertical, VerticalSide::Above);
        assert_eq!(p.top + p.height, marker().top);
        assert_eq!(p.horizontal, HorizontalSide::Right);
        assert_eq!(p.left, marker().left);
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        let rules = TooltipConfig::default();
        let p = place(&record(2005, "38:00", ""), marker(), (120.0, 50.0), &rules);
        assert_eq!(p.vertical, VerticalSide::Above);
        assert_eq!(p.horizontal, HorizontalSide::Left);

        let p = place(&record(2004, "37:59", ""), marker(), (120.0, 50.0), &rules);
        assert_eq!(p.vertical, VerticalSide::Below);
        assert_eq!(p.horizontal, HorizontalSide::Right);
    }

    #[test]
    fn test_state_machine_cycle() {
        let mut state = InteractionState::new(TooltipConfig::default());
        let t0 = Instant::now();
        let rec = record(2010, "37:42", "");

        assert_eq!(state.phase(), TooltipPhase::Hidden);

        state.pointer_enter(0, &rec, marker(), t0);
        assert_eq!(state.phase(), TooltipPhase::Visible);
        assert_eq!(state.opacity(t0), 0.0);
        assert_eq!(state.opacity(t0 + Duration::from_millis(150)), 0.5);
        assert_eq!(state.opacity(t0 + Duration::from_millis(300)), 1.0);

        let t1 = t0 + Duration::from_millis(500);
        assert!(state.pointer_leave(t1));
        assert_eq!(state.phase(), TooltipPhase::FadingOut);
        assert_eq!(state.hide_timer().unwrap().deadline, t1 + Duration::from_millis(300));

        // Not due yet: still fading
        assert!(!state.tick(t1 + Duration::from_millis(299)));
        assert_eq!(state.phase(), TooltipPhase::FadingOut);

        assert!(state.tick(t1 + Duration::from_millis(300)));
        assert_eq!(state.phase(), TooltipPhase::Hidden);
        assert!(state.hide_timer().is_none());
    }

    #[test]
    fn test_enter_during_fade_out_cancels_hide() {
        let mut state = InteractionState::new(TooltipConfig::default());
        let t0 = Instant::now();
        let rec = record(2010, "37:42", "");

        state.pointer_enter(0, &rec, marker(), t0);
        state.pointer_leave(t0 + Duration::from_millis(400));
        state.pointer_enter(1, &rec, marker(), t0 + Duration::from_millis(500));

        assert_eq!(state.phase(), TooltipPhase::Visible);
        assert!(state.hide_timer().is_none());
        assert_eq!(state.hovered(), Some(1));

        // The old deadline passes without hiding the panel
        assert!(!state.tick(t0 + Duration::from_millis(800)));
        assert_eq!(state.phase(), TooltipPhase::Visible);
    }

    #[test]
    fn test_leave_is_ignored_unless_visible() {
        let mut state = InteractionState::new(TooltipConfig::default());
        let t0 = Instant::now();
        assert!(!state.pointer_leave(t0));
        assert_eq!(state.phase(), TooltipPhase::Hidden);

        state.pointer_enter(0, &record(2010, "37:42", ""), marker(), t0);
        state.pointer_leave(t0);
        let deadline = state.hide_timer().unwrap().deadline;
        assert!(!state.pointer_leave(t0 + Duration::from_millis(100)));
        assert_eq!(state.hide_timer().unwrap().deadline, deadline);
    }

    #[test]
    fn test_unbounded_fade_hides_on_next_tick() {
        let rules = TooltipConfig {
            fade_ms: u64::MAX,
            ..TooltipConfig::default()
        };
        let mut state = InteractionState::new(rules);
        let t0 = Instant::now();

        state.pointer_enter(0, &record(2010, "37:42", ""), marker(), t0);
        assert!(state.pointer_leave(t0));
        assert_eq!(state.hide_timer().unwrap().deadline, t0);
        assert_eq!(state.opacity(t0), 0.0);

        assert!(state.tick(t0));
        assert_eq!(state.phase(), TooltipPhase::Hidden);
    }

    #[test]
    fn test_apply_writes_panel() {
        let mut scene = Scene::new(Element::new("body"));
        let root = scene.root();
        let panel = scene.append(root, Element::new("div").class("tooltip").class(HIDE_CLASS));

        let mut state = InteractionState::new(TooltipConfig::default());
        let t0 = Instant::now();
        state.pointer_enter(0, &record(2010, "37:42", "Positive test"), marker(), t0);
        state.apply(&mut scene, panel, t0 + Duration::from_millis(300));

        let el = scene.get(panel).unwrap();
        assert!(!el.has_class(HIDE_CLASS));
        assert_eq!(el.get_style("opacity"), Some("1.000"));
        assert!(el.get_style("top").is_some());
        assert_eq!(scene.children(panel).len(), 4);

        let t1 = t0 + Duration::from_millis(400);
        state.pointer_leave(t1);
        state.tick(t1 + Duration::from_millis(300));
        state.apply(&mut scene, panel, t1 + Duration::from_millis(300));
        assert!(scene.get(panel).unwrap().has_class(HIDE_CLASS));
    }
}
