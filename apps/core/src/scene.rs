use std::collections::BTreeMap;

use serde::Serialize;

use crate::backend::{Axis, ChartBackend, Hover, Legend, Mark, SurfaceId};

/// One drawing area inside a container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Surface {
    pub id: SurfaceId,
    pub width: f64,
    pub height: f64,
    pub marks: Vec<Mark>,
    pub axes: Vec<Axis>,
    pub legend: Option<Legend>,
}

/// A hoverable mark, addressed by its position in the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverTarget<'a> {
    pub surface: SurfaceId,
    pub mark: usize,
    pub hover: &'a Hover,
}

/// Retained page model the front-ends paint from.
///
/// Containers hold surfaces, surfaces hold marks, and text nodes hold the
/// stats line. Hover handlers are part of the marks, so clearing a container
/// detaches them.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    containers: BTreeMap<String, Vec<Surface>>,
    text: BTreeMap<String, String>,
    next_surface: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn surfaces(&self, container: &str) -> &[Surface] {
        self.containers.get(container).map_or(&[], Vec::as_slice)
    }

    pub fn text(&self, node: &str) -> Option<&str> {
        self.text.get(node).map(String::as_str)
    }

    /// Every mark in `container` that has a hover handler, in drawing order.
    pub fn hover_targets(&self, container: &str) -> Vec<HoverTarget<'_>> {
        self.surfaces(container)
            .iter()
            .flat_map(|surface| {
                surface
                    .marks
                    .iter()
                    .enumerate()
                    .filter_map(move |(index, mark)| {
                        mark.hover.as_ref().map(|hover| HoverTarget {
                            surface: surface.id,
                            mark: index,
                            hover,
                        })
                    })
            })
            .collect()
    }

    pub fn hover(&self, container: &str, index: usize) -> Option<HoverTarget<'_>> {
        self.hover_targets(container).get(index).copied()
    }

    fn surface_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.containers
            .values_mut()
            .flat_map(|surfaces| surfaces.iter_mut())
            .find(|surface| surface.id == id)
    }
}

impl ChartBackend for Scene {
    fn clear(&mut self, container: &str) {
        if let Some(surfaces) = self.containers.get_mut(container) {
            surfaces.clear();
        }
    }

    fn add_surface(&mut self, container: &str, width: f64, height: f64) -> SurfaceId {
        let id = SurfaceId(self.next_surface);
        self.next_surface += 1;
        self.containers
            .entry(container.to_string())
            .or_default()
            .push(Surface {
                id,
                width,
                height,
                marks: Vec::new(),
                axes: Vec::new(),
                legend: None,
            });
        id
    }

    fn draw(&mut self, surface: SurfaceId, mark: Mark) {
        match self.surface_mut(surface) {
            Some(target) => target.marks.push(mark),
            None => tracing::warn!(?surface, "draw on a detached surface ignored"),
        }
    }

    fn axis(&mut self, surface: SurfaceId, axis: Axis) {
        if let Some(target) = self.surface_mut(surface) {
            target.axes.push(axis);
        }
    }

    fn legend(&mut self, surface: SurfaceId, legend: Legend) {
        if let Some(target) = self.surface_mut(surface) {
            target.legend = Some(legend);
        }
    }

    fn set_text(&mut self, node: &str, text: String) {
        self.text.insert(node.to_string(), text);
    }
}
