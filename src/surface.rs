use crate::{
    config,
    types::{ElementId, Rect, Size, Vec2},
};

/// Where a surface should draw one element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Absolute position of the element's anchor.
    pub offset: Vec2,
    /// Negative half-size, so the box ends up centered on `offset`.
    pub margin: Vec2,
    /// Smoothed center, for hosts that animate toward the logical position.
    pub visual: Vec2,
    /// Stacking layer; small boxes are raised above the rest.
    pub layer: u8,
}

impl Placement {
    pub fn top_left(&self) -> Vec2 {
        self.offset + self.margin
    }
}

/// Presentation side of the simulation: measures elements and draws them.
pub trait Surface {
    fn element_size(&self, element: ElementId) -> Size;
    fn place(&mut self, element: ElementId, placement: Placement);
}

/// Supplies the bounds bodies are kept inside, queried every frame.
pub trait Container {
    fn bounds(&self) -> Rect;
}

impl Container for Rect {
    fn bounds(&self) -> Rect {
        *self
    }
}

/// Cells a label occupies when drawn as a bordered box with one cell of padding.
pub fn label_cells(label: &str) -> (u16, u16) {
    let cols = label.chars().count().min(u16::MAX as usize - 4) as u16 + 4;
    (cols, 3)
}

pub fn label_size(label: &str) -> Size {
    let (cols, rows) = label_cells(label);
    Size::new(
        cols as u32 * config::CELL_PX_W,
        rows as u32 * config::CELL_PX_H,
    )
}

/// In-memory surface with fixed element sizes. Used by the headless runner.
#[derive(Debug, Default)]
pub struct StaticSurface {
    sizes: Vec<Size>,
    placements: Vec<Option<Placement>>,
}

impl StaticSurface {
    pub fn new(sizes: Vec<Size>) -> Self {
        let placements = vec![None; sizes.len()];
        Self { sizes, placements }
    }

    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        Self::new(labels.iter().map(|l| label_size(l.as_ref())).collect())
    }

    pub fn elements(&self) -> impl Iterator<Item = ElementId> + use<> {
        (0..self.sizes.len()).map(ElementId)
    }

    pub fn set_size(&mut self, element: ElementId, size: Size) {
        if let Some(slot) = self.sizes.get_mut(element.0) {
            *slot = size;
        }
    }

    pub fn placement(&self, element: ElementId) -> Option<Placement> {
        self.placements.get(element.0).copied().flatten()
    }
}

impl Surface for StaticSurface {
    fn element_size(&self, element: ElementId) -> Size {
        self.sizes.get(element.0).copied().unwrap_or(Size::UNKNOWN)
    }

    fn place(&mut self, element: ElementId, placement: Placement) {
        if let Some(slot) = self.placements.get_mut(element.0) {
            *slot = Some(placement);
        }
    }
}
