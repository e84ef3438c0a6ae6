//! Legend
//!
//! One clickable entry per category. Clicking an entry fades it out and
//! hides every marker of that category; clicking again restores both.

use super::scene::{Element, NodeId, Scene, Selector};
use crate::dataset::Category;

/// Class marking a faded legend entry
pub const INACTIVE_CLASS: &str = "inactive";
/// Class marking a hidden node
pub const HIDE_CLASS: &str = "hide";

/// Append the legend container under `parent`
pub fn draw_legend(scene: &mut Scene, parent: NodeId, swatch_size: f64) -> NodeId {
    let legend = scene.append(parent, Element::new("div").class("legend"));
    let radius = swatch_size / 2.0;

    for category in Category::ALL {
        let entry = scene.append(
            legend,
            Element::new("div")
                .class("category")
                .class(category.legend_class())
                .attr("data-category", category),
        );

        let swatch = scene.append(
            entry,
            Element::new("svg")
                .class("svg")
                .attr("width", swatch_size)
                .attr("height", swatch_size),
        );
        scene.append(
            swatch,
            Element::new("circle")
                .attr("cx", radius)
                .attr("cy", radius)
                .attr("r", radius)
                .attr("fill", category.fill()),
        );

        scene.append(entry, Element::new("div").class("text").text(category.label()));
    }

    legend
}

/// Outcome of a legend click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle {
    pub category: Category,
    /// Whether the category is shown after the click
    pub active: bool,
    /// Number of markers whose visibility flipped
    pub markers: usize,
}

/// Handle a click on the legend entry of `category`
///
/// Returns `None` when no legend is currently rendered.
pub fn toggle_category(scene: &mut Scene, category: Category) -> Option<Toggle> {
    let entry_selector = Selector::parse(&format!(".category.{}", category.legend_class()));
    let entry = scene.select(&entry_selector)?;

    let inactive = scene.get_mut(entry)?.toggle_class(INACTIVE_CLASS);

    let marker_selector = Selector::parse(&format!("circle.marker.{}", category.marker_class()));
    let markers = scene.select_all(&marker_selector);
    for id in &markers {
        if let Some(marker) = scene.get_mut(*id) {
            marker.toggle_class(HIDE_CLASS);
        }
    }

    tracing::debug!(
        category = %category,
        active = !inactive,
        markers = markers.len(),
        "Legend category toggled"
    );

    Some(Toggle {
        category,
        active: !inactive,
        markers: markers.len(),
    })
}

/// Whether the legend entry of `category` is currently shown as active
pub fn is_active(scene: &Scene, category: Category) -> Option<bool> {
    let selector = Selector::parse(&format!(".category.{}", category.legend_class()));
    let entry = scene.select(&selector)?;
    scene.get(entry).map(|e| !e.has_class(INACTIVE_CLASS))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with_markers() -> Scene {
        let mut scene = Scene::new(Element::new("body"));
        let root = scene.root();
        let svg = scene.append(root, Element::new("svg").class("canvas"));
        for class in ["red", "green", "red"] {
            scene.append(svg, Element::new("circle").class("marker").class(class));
        }
        draw_legend(&mut scene, root, 20.0);
        scene
    }

    #[test]
    fn test_legend_structure() {
        let scene = scene_with_markers();
        assert_eq!(scene.count(&".legend".into()), 1);
        assert_eq!(scene.count(&".category".into()), 2);
        assert_eq!(scene.count(&".category.doping".into()), 1);
        assert_eq!(scene.count(&".category.no-doping".into()), 1);
        assert_eq!(scene.count(&"svg.svg".into()), 2);
        assert_eq!(scene.count(&"div.text".into()), 2);
    }

    #[test]
    fn test_toggle_hides_matching_markers_only() {
        let mut scene = scene_with_markers();

        let toggle = toggle_category(&mut scene, Category::Doping).unwrap();
        assert!(!toggle.active);
        assert_eq!(toggle.markers, 2);
        assert_eq!(scene.count(&"circle.red.hide".into()), 2);
        assert_eq!(scene.count(&"circle.green.hide".into()), 0);
        assert_eq!(is_active(&scene, Category::Doping), Some(false));
        assert_eq!(is_active(&scene, Category::NoDoping), Some(true));

        let toggle = toggle_category(&mut scene, Category::Doping).unwrap();
        assert!(toggle.active);
        assert_eq!(scene.count(&"circle.hide".into()), 0);
    }

    #[test]
    fn test_categories_toggle_independently() {
        let mut scene = scene_with_markers();
        toggle_category(&mut scene, Category::Doping);
        toggle_category(&mut scene, Category::NoDoping);
        assert_eq!(scene.count(&"circle.marker.hide".into()), 3);

        toggle_category(&mut scene, Category::NoDoping);
        assert_eq!(scene.count(&"circle.green.hide".into()), 0);
        assert_eq!(scene.count(&"circle.red.hide".into()), 2);
    }

    #[test]
    fn test_toggle_without_legend() {
        let mut scene = Scene::new(Element::new("body"));
        assert!(toggle_category(&mut scene, Category::Doping).is_none());
    }
}
