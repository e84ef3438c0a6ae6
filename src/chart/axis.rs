//! Axis drawing
//!
//! Each axis is one `g` group holding a domain path and a `g.tick` per tick
//! value (a 6px tick line plus a label).

use chrono::NaiveDateTime;

use super::scale::{TimeScale, DEFAULT_TICK_COUNT};
use super::scene::{Element, NodeId, Scene};

const TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;

/// Which side of the plot the axis sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Bottom,
    Left,
}

/// Axis description: scale, orientation, tick label format
pub struct Axis<'a> {
    scale: &'a TimeScale,
    orientation: Orientation,
    format: fn(&NaiveDateTime) -> String,
    tick_count: usize,
}

impl<'a> Axis<'a> {
    pub fn bottom(scale: &'a TimeScale) -> Self {
        Self {
            scale,
            orientation: Orientation::Bottom,
            format: super::scale::multi_format,
            tick_count: DEFAULT_TICK_COUNT,
        }
    }

    pub fn left(scale: &'a TimeScale) -> Self {
        Self {
            orientation: Orientation::Left,
            ..Self::bottom(scale)
        }
    }

    /// Builder method: tick label format
    pub fn tick_format(mut self, format: fn(&NaiveDateTime) -> String) -> Self {
        self.format = format;
        self
    }

    /// Builder method: requested tick count
    pub fn ticks(mut self, count: usize) -> Self {
        self.tick_count = count;
        self
    }

    /// Append the axis group under `parent`, translated by `(dx, dy)`
    pub fn draw(&self, scene: &mut Scene, parent: NodeId, class: &str, dx: f64, dy: f64) -> NodeId {
        let anchor = match self.orientation {
            Orientation::Bottom => "middle",
            Orientation::Left => "end",
        };

        let group = scene.append(
            parent,
            Element::new("g")
                .class("axis")
                .class(class)
                .attr("transform", format!("translate({}, {})", dx, dy))
                .attr("fill", "none")
                .attr("font-size", 10)
                .attr("font-family", "sans-serif")
                .attr("text-anchor", anchor),
        );

        let (r0, r1) = self.scale.range();
        let domain_path = match self.orientation {
            Orientation::Bottom => format!("M{},{}V0H{}V{}", r0, TICK_SIZE, r1, TICK_SIZE),
            Orientation::Left => format!("M{},{}H0V{}H{}", -TICK_SIZE, r0, r1, -TICK_SIZE),
        };
        scene.append(
            group,
            Element::new("path")
                .class("domain")
                .attr("stroke", "currentColor")
                .attr("d", domain_path),
        );

        for value in self.scale.ticks(self.tick_count) {
            let position = self.scale.apply(value);
            let label = (self.format)(&value);

            let (transform, line, text) = match self.orientation {
                Orientation::Bottom => (
                    format!("translate({}, 0)", position),
                    Element::new("line").attr("stroke", "currentColor").attr("y2", TICK_SIZE),
                    Element::new("text")
                        .attr("fill", "currentColor")
                        .attr("y", TICK_SIZE + TICK_PADDING)
                        .attr("dy", "0.71em"),
                ),
                Orientation::Left => (
                    format!("translate(0, {})", position),
                    Element::new("line").attr("stroke", "currentColor").attr("x2", -TICK_SIZE),
                    Element::new("text")
                        .attr("fill", "currentColor")
                        .attr("x", -(TICK_SIZE + TICK_PADDING))
                        .attr("dy", "0.32em"),
                ),
            };

            let tick = scene.append(
                group,
                Element::new("g").class("tick").attr("transform", transform),
            );
            scene.append(tick, line);
            scene.append(tick, text.text(label));
        }

        group
    }
}
