//! Renderer
//!
//! Synchronizes the scene with a record set: tears down the previous pass,
//! builds both scales, then draws axes, markers and the legend.

use thiserror::Error;

use super::axis::Axis;
use super::legend::draw_legend;
use super::scale::TimeScale;
use super::scene::{Element, NodeId, Scene, Selector};
use super::tooltip::MarkerBox;
use crate::config::CanvasConfig;
use crate::dataset::{format_time, RaceRecord};

/// Title shown next to the time axis
pub const TIME_AXIS_TITLE: &str = "Best time (min:sec)";

/// Everything a pass draws; removed again before the next pass
const TEARDOWN_SELECTORS: [&str; 4] = ["circle", "g", ".legend", ".score-axis-title"];

/// Errors that can occur while drawing
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    /// No records means no scale extent
    #[error("Nothing to render: dataset is empty")]
    EmptyDataset,
}

/// Canvas dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Handles into the scene produced by one pass
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub year_scale: TimeScale,
    pub time_scale: TimeScale,
    pub year_axis: NodeId,
    pub time_axis: NodeId,
    pub title: NodeId,
    pub legend: NodeId,
    /// One marker per record, in dataset order
    pub markers: Vec<NodeId>,
    pub marker_radius: f64,
}

impl RenderedChart {
    /// Bounding box of marker `index`
    pub fn marker_box(&self, scene: &Scene, index: usize) -> Option<MarkerBox> {
        let element = scene.get(*self.markers.get(index)?)?;
        let cx = element.number_attr("cx")?;
        let cy = element.number_attr("cy")?;
        Some(MarkerBox::circle(cx, cy, self.marker_radius))
    }
}

/// Draws a record set onto a canvas node
#[derive(Debug, Clone)]
pub struct Renderer {
    layout: CanvasConfig,
}

impl Renderer {
    pub fn new(layout: CanvasConfig) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &CanvasConfig {
        &self.layout
    }

    /// Remove everything a previous pass drew
    pub fn teardown(&self, scene: &mut Scene) -> usize {
        TEARDOWN_SELECTORS
            .iter()
            .map(|s| scene.remove_all(&Selector::parse(s)))
            .sum()
    }

    /// Build the year scale: [padding, width - padding]
    pub fn year_scale(&self, records: &[RaceRecord], size: CanvasSize) -> Option<TimeScale> {
        let padding = self.layout.padding;
        TimeScale::from_extent(
            records.iter().map(|r| r.year),
            (padding, size.width - padding),
        )
    }

    /// Build the time scale: [padding, height - padding], not flipped
    pub fn time_scale(&self, records: &[RaceRecord], size: CanvasSize) -> Option<TimeScale> {
        let padding = self.layout.padding;
        TimeScale::from_extent(
            records.iter().map(|r| r.time),
            (padding, size.height - padding),
        )
    }

    /// Run a full pass
    ///
    /// `canvas` receives axes and markers; `page` receives the legend and the
    /// axis title.
    pub fn render(
        &self,
        scene: &mut Scene,
        canvas: NodeId,
        page: NodeId,
        records: &[RaceRecord],
        size: CanvasSize,
    ) -> Result<RenderedChart, RenderError> {
        let year_scale = self.year_scale(records, size).ok_or(RenderError::EmptyDataset)?;
        let time_scale = self.time_scale(records, size).ok_or(RenderError::EmptyDataset)?;

        let removed = self.teardown(scene);
        tracing::trace!(removed, "Previous pass torn down");

        if let Some(element) = scene.get_mut(canvas) {
            element.set_attr("width", size.width);
            element.set_attr("height", size.height);
        }

        let padding = self.layout.padding;

        // Axes
        let year_axis =
            Axis::bottom(&year_scale).draw(scene, canvas, "year-axis", 0.0, size.height - padding);
        let time_axis = Axis::left(&time_scale)
            .tick_format(format_time)
            .draw(scene, canvas, "time-axis", padding, 0.0);
        let title = scene.append(
            page,
            Element::new("text")
                .class("score-axis-title")
                .text(TIME_AXIS_TITLE),
        );

        // Markers
        let markers = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let category = record.category();
                scene.append(
                    canvas,
                    Element::new("circle")
                        .class("marker")
                        .class(category.marker_class())
                        .attr("cx", year_scale.apply(record.year))
                        .attr("cy", time_scale.apply(record.time))
                        .attr("r", self.layout.marker_radius)
                        .attr("data-index", index)
                        .style("fill", category.fill()),
                )
            })
            .collect::<Vec<_>>();

        // Legend
        let legend = draw_legend(scene, page, self.layout.legend_swatch);

        tracing::debug!(
            markers = markers.len(),
            width = size.width,
            height = size.height,
            "Chart rendered"
        );

        Ok(RenderedChart {
            year_scale,
            time_scale,
            year_axis,
            time_axis,
            title,
            legend,
            markers,
            marker_radius: self.layout.marker_radius,
        })
    }
}
