//! Chart Session
//!
//! The page-level state the pipeline runs against: the scene with its
//! persistent canvas and tooltip panel, the current canvas size, the last
//! rendered chart and the interaction state.
//!
//! A pass is split into [`ChartSession::begin_pass`] and
//! [`ChartSession::complete_pass`] so callers can fetch without holding the
//! session. Every pass gets a ticket; a completion older than the newest
//! rendered one is dropped as stale. A failed pass draws nothing and so
//! leaves the cut-off where it was.
//!
//! A requested canvas size is committed only when a pass renders with it,
//! so the summary always matches the canvas on the page.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::chart::legend::{self, Toggle, HIDE_CLASS};
use crate::chart::{
    CanvasSize, Element, InteractionState, NodeId, Placement, RenderError, RenderedChart,
    Renderer, Scene, Selector, TooltipPhase,
};
use crate::config::{CanvasConfig, Config, TooltipConfig};
use crate::dataset::{Category, LoadError, Loader, LoadResult, RaceRecord};

const STYLESHEET: &str = r#"
body { position: relative; margin: 0; font-family: sans-serif; }
.canvas { display: block; }
.hide { display: none; }
.inactive { opacity: 0.4; }
.marker { stroke: #333; stroke-width: 0.5; cursor: pointer; }
.score-axis-title { position: absolute; top: 40px; left: 10px; font-size: 12px; }
.legend { position: absolute; top: 80px; right: 20px; font-size: 12px; }
.category { display: flex; align-items: center; gap: 6px; margin-bottom: 6px; cursor: pointer; }
.tooltip { position: absolute; padding: 10px; line-height: 18px; font-size: 12px;
           background: rgba(255, 255, 224, 0.95); border: 1px solid #999; border-radius: 4px;
           pointer-events: none; }
"#;

/// Forwards pointer and legend events to the API, then swaps in the new page.
/// `__FADE_MS__` is replaced with the configured fade.
const EVENT_HOOK: &str = r#"
(function () {
  var hovered = null;
  function refresh() {
    return fetch("/").then(function (r) { return r.text(); }).then(function (html) {
      var page = new DOMParser().parseFromString(html, "text/html");
      document.body.replaceWith(page.body);
    });
  }
  function post(path) {
    return fetch("/api/v1" + path, { method: "POST" }).then(refresh);
  }
  document.addEventListener("mouseover", function (e) {
    var marker = e.target.closest && e.target.closest("circle.marker");
    if (!marker || marker.dataset.index === hovered) return;
    hovered = marker.dataset.index;
    post("/markers/" + hovered + "/enter");
  });
  document.addEventListener("mouseout", function (e) {
    var marker = e.target.closest && e.target.closest("circle.marker");
    if (!marker || marker.dataset.index !== hovered) return;
    hovered = null;
    post("/markers/leave").then(function () { setTimeout(refresh, __FADE_MS__); });
  });
  document.addEventListener("click", function (e) {
    var entry = e.target.closest && e.target.closest(".category");
    if (entry) post("/legend/" + entry.dataset.category + "/toggle");
  });
})();
"#;

/// Errors surfaced by a pipeline pass
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Load failure: {0}")]
    Load(#[from] LoadError),

    #[error("Render failure: {0}")]
    Render(#[from] RenderError),
}

/// Errors from pointer events
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InteractionError {
    #[error("No chart has been rendered yet")]
    NotRendered,

    #[error("Unknown marker index {0}")]
    UnknownMarker(usize),

    #[error("Marker {0} is hidden by the legend")]
    HiddenMarker(usize),
}

/// Proof that a pass was started; hand it back to `complete_pass`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassTicket {
    generation: u64,
}

impl PassTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// How a pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PassOutcome {
    Rendered { markers: usize },
    Failed,
    Stale,
}

/// Counts describing the current scene
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSummary {
    pub width: f64,
    pub height: f64,
    pub rendered: bool,
    pub generation: u64,
    pub axis_groups: usize,
    pub markers: usize,
    pub hidden_markers: usize,
    pub legends: usize,
    pub axis_titles: usize,
    pub tooltip: TooltipPhase,
}

/// A chart page with its interaction state
pub struct ChartSession {
    renderer: Renderer,
    tooltip_rules: TooltipConfig,
    scene: Scene,
    canvas: NodeId,
    tooltip_panel: NodeId,
    /// Size the canvas currently has
    size: CanvasSize,
    /// Size the next pass renders at
    requested: CanvasSize,
    interaction: InteractionState,
    chart: Option<RenderedChart>,
    records: Option<Arc<[RaceRecord]>>,
    issued: u64,
    applied: u64,
}

impl ChartSession {
    pub fn new(canvas: CanvasConfig, tooltip: TooltipConfig) -> Self {
        let size = CanvasSize::new(canvas.width, canvas.height);

        let mut scene = Scene::new(Element::new("body"));
        let root = scene.root();
        let canvas_node = scene.append(
            root,
            Element::new("svg")
                .class("canvas")
                .attr("xmlns", "http://www.w3.org/2000/svg")
                .attr("width", size.width)
                .attr("height", size.height),
        );
        let tooltip_panel = scene.append(root, Element::new("div").class("tooltip").class(HIDE_CLASS));

        Self {
            renderer: Renderer::new(canvas),
            interaction: InteractionState::new(tooltip.clone()),
            tooltip_rules: tooltip,
            scene,
            canvas: canvas_node,
            tooltip_panel,
            size,
            requested: size,
            chart: None,
            records: None,
            issued: 0,
            applied: 0,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.canvas.clone(), config.tooltip.clone())
    }

    /// Size of the canvas on the page
    pub fn size(&self) -> CanvasSize {
        self.size
    }

    /// Record a new canvas size; takes effect once a pass renders
    pub fn set_size(&mut self, size: CanvasSize) {
        self.requested = size;
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn chart(&self) -> Option<&RenderedChart> {
        self.chart.as_ref()
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    /// Records of the last rendered pass
    pub fn records(&self) -> Option<&[RaceRecord]> {
        self.records.as_deref()
    }

    /// Start a pass
    pub fn begin_pass(&mut self) -> PassTicket {
        self.issued += 1;
        PassTicket {
            generation: self.issued,
        }
    }

    /// Finish a pass with the loader's result
    ///
    /// Failures are logged and swallowed: the scene keeps whatever it had.
    pub fn complete_pass(
        &mut self,
        ticket: PassTicket,
        result: LoadResult<Arc<[RaceRecord]>>,
    ) -> PassOutcome {
        if ticket.generation < self.applied {
            tracing::debug!(
                generation = ticket.generation,
                newest = self.applied,
                "Discarding stale pass"
            );
            return PassOutcome::Stale;
        }

        match self.draw(result) {
            Ok(markers) => {
                self.applied = ticket.generation;
                PassOutcome::Rendered { markers }
            }
            Err(e) => {
                tracing::error!(generation = ticket.generation, error = %e, "Chart pass failed");
                PassOutcome::Failed
            }
        }
    }

    fn draw(&mut self, result: LoadResult<Arc<[RaceRecord]>>) -> Result<usize, ChartError> {
        let records = result?;
        let page = self.scene.root();

        let chart = self
            .renderer
            .render(&mut self.scene, self.canvas, page, &records, self.requested)?;
        let markers = chart.markers.len();
        self.size = self.requested;

        // Fresh interaction state per pass
        self.interaction = InteractionState::new(self.tooltip_rules.clone());
        self.scene.clear_children(self.tooltip_panel);
        self.interaction
            .apply(&mut self.scene, self.tooltip_panel, Instant::now());

        self.chart = Some(chart);
        self.records = Some(records);
        Ok(markers)
    }

    /// One full pipeline run
    pub async fn run(&mut self, loader: &Loader) -> PassOutcome {
        let ticket = self.begin_pass();
        let result = loader.records().await;
        self.complete_pass(ticket, result)
    }

    /// Host resize: new canvas size, then a full pass
    pub async fn resize(&mut self, size: CanvasSize, loader: &Loader) -> PassOutcome {
        tracing::debug!(width = size.width, height = size.height, "Resize");
        self.set_size(size);
        self.run(loader).await
    }

    /// Explicit reload: drop the cached dataset, then a full pass
    pub async fn reload(&mut self, loader: &Loader) -> PassOutcome {
        loader.invalidate().await;
        self.run(loader).await
    }

    /// Pointer entered marker `index`
    pub fn pointer_enter(&mut self, index: usize, now: Instant) -> Result<Placement, InteractionError> {
        let chart = self.chart.as_ref().ok_or(InteractionError::NotRendered)?;
        let records = self.records.as_ref().ok_or(InteractionError::NotRendered)?;

        let record = records.get(index).ok_or(InteractionError::UnknownMarker(index))?;
        let marker = chart
            .marker_box(&self.scene, index)
            .ok_or(InteractionError::UnknownMarker(index))?;

        let hidden = chart
            .markers
            .get(index)
            .and_then(|&node| self.scene.get(node))
            .map_or(false, |element| element.has_class(HIDE_CLASS));
        if hidden {
            return Err(InteractionError::HiddenMarker(index));
        }

        let placement = self.interaction.pointer_enter(index, record, marker, now);
        self.interaction.apply(&mut self.scene, self.tooltip_panel, now);
        Ok(placement)
    }

    /// Pointer left the hovered marker
    pub fn pointer_leave(&mut self, now: Instant) -> bool {
        let started = self.interaction.pointer_leave(now);
        self.interaction.apply(&mut self.scene, self.tooltip_panel, now);
        started
    }

    /// Advance timers and animations to `now`
    pub fn tick(&mut self, now: Instant) -> bool {
        let hidden = self.interaction.tick(now);
        self.interaction.apply(&mut self.scene, self.tooltip_panel, now);
        hidden
    }

    /// Legend click on `category`
    pub fn toggle_category(&mut self, category: Category) -> Option<Toggle> {
        legend::toggle_category(&mut self.scene, category)
    }

    /// Whether `category` is currently shown
    pub fn category_active(&self, category: Category) -> Option<bool> {
        legend::is_active(&self.scene, category)
    }

    pub fn summary(&self) -> SceneSummary {
        SceneSummary {
            width: self.size.width,
            height: self.size.height,
            rendered: self.chart.is_some(),
            generation: self.applied,
            axis_groups: self.scene.count(&Selector::parse("g.axis")),
            markers: self.scene.count(&Selector::parse("circle.marker")),
            hidden_markers: self.scene.count(&Selector::parse("circle.marker.hide")),
            legends: self.scene.count(&Selector::parse(".legend")),
            axis_titles: self.scene.count(&Selector::parse(".score-axis-title")),
            tooltip: self.interaction.phase(),
        }
    }

    /// The whole page as an HTML document
    ///
    /// The page carries a small script that reports hover, leave and legend
    /// clicks to `/api/v1` and then reloads its body from `GET /`.
    pub fn document(&self) -> String {
        let refresh_ms = self.tooltip_rules.fade_ms.saturating_add(50);
        let hook = EVENT_HOOK.replace("__FADE_MS__", &refresh_ms.to_string());
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Doping in Professional Bicycle Racing</title>\n<style>{}</style>\n<script>{}</script>\n</head>\n{}</html>\n",
            STYLESHEET,
            hook,
            self.scene.to_markup(self.scene.root())
        )
    }
}
