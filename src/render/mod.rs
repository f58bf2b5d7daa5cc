use crate::{
    config,
    surface::{Container, Placement, Surface, label_cells, label_size},
    types::{ElementId, Rect, Size, Vec2},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorId {
    White,
    Border,
    Raised,
    Trail,
}

#[derive(Clone, Copy, Debug)]
pub struct RenderCell {
    pub ch: char,
    pub depth: i32,
    pub color: ColorId,
}

const EMPTY_DEPTH: i32 = i32::MIN;
const TRAIL_DEPTH: i32 = i32::MAX;

#[derive(Debug)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<RenderCell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let mut buffer = Self {
            width,
            height,
            cells: Vec::new(),
        };
        buffer.resize(width, height);
        buffer
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let len = (width as usize).saturating_mul(height as usize);
        if self.cells.len() != len {
            self.cells.resize(
                len,
                RenderCell {
                    ch: ' ',
                    depth: EMPTY_DEPTH,
                    color: ColorId::White,
                },
            );
        }
        self.clear();
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.ch = ' ';
            cell.depth = EMPTY_DEPTH;
            cell.color = ColorId::White;
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn get(&self, x: u16, y: u16) -> RenderCell {
        debug_assert!(x < self.width && y < self.height, "get() out of bounds");
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        self.cells[idx]
    }

    /// Writes unless something deeper in the stack already owns the cell.
    fn set(&mut self, x: i32, y: i32, ch: char, depth: i32, color: ColorId) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        let cell = &mut self.cells[idx];
        if depth >= cell.depth {
            cell.depth = depth;
            cell.ch = ch;
            cell.color = color;
        }
    }
}

#[derive(Clone, Debug)]
struct BoardElement {
    label: String,
    visible: bool,
    placement: Option<Placement>,
}

/// Terminal-backed surface. Elements are labelled boxes measured in pixels,
/// `CELL_PX_W` x `CELL_PX_H` per cell.
#[derive(Debug)]
pub struct Board {
    elements: Vec<BoardElement>,
    cols: u16,
    rows: u16,
}

impl Board {
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Self {
        let elements = labels
            .iter()
            .map(|label| BoardElement {
                label: label.as_ref().to_string(),
                visible: true,
                placement: None,
            })
            .collect();
        Self {
            elements,
            cols: 0,
            rows: 0,
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = ElementId> + use<> {
        (0..self.elements.len()).map(ElementId)
    }

    pub fn set_viewport(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
    }

    /// Hidden elements are not laid out, so they measure as zero.
    pub fn set_visible(&mut self, element: ElementId, visible: bool) {
        if let Some(el) = self.elements.get_mut(element.0) {
            el.visible = visible;
        }
    }

    pub fn visible_count(&self) -> usize {
        self.elements.iter().filter(|el| el.visible).count()
    }
}

impl Surface for Board {
    fn element_size(&self, element: ElementId) -> Size {
        match self.elements.get(element.0) {
            Some(el) if el.visible => label_size(&el.label),
            _ => Size::UNKNOWN,
        }
    }

    fn place(&mut self, element: ElementId, placement: Placement) {
        if let Some(el) = self.elements.get_mut(element.0) {
            el.placement = Some(placement);
        }
    }
}

impl Container for Board {
    fn bounds(&self) -> Rect {
        Rect::from_size(
            (self.cols as u32 * config::CELL_PX_W) as f32,
            (self.rows as u32 * config::CELL_PX_H) as f32,
        )
    }
}

fn to_cell(px: Vec2) -> (i32, i32) {
    (
        (px.x / config::CELL_PX_W as f32).round() as i32,
        (px.y / config::CELL_PX_H as f32).round() as i32,
    )
}

pub fn draw(board: &Board, frame: &mut FrameBuffer) {
    if frame.width() != board.cols || frame.height() != board.rows {
        frame.resize(board.cols, board.rows);
    } else {
        frame.clear();
    }

    for (order, el) in board.elements.iter().enumerate() {
        let Some(placement) = el.placement else {
            continue;
        };
        if !el.visible {
            continue;
        }
        let depth = ((placement.layer as i32) << 16) + order as i32;
        draw_box(el, placement, depth, frame);
    }

    for el in &board.elements {
        if let Some(placement) = el.placement.filter(|_| el.visible) {
            draw_trail(placement, frame);
        }
    }
}

fn draw_box(el: &BoardElement, placement: Placement, depth: i32, frame: &mut FrameBuffer) {
    let (cols, rows) = label_cells(&el.label);
    let (cols, rows) = (cols as i32, rows as i32);
    let (x0, y0) = to_cell(placement.top_left());
    let color = if placement.layer > 0 {
        ColorId::Raised
    } else {
        ColorId::Border
    };

    for dy in 0..rows {
        for dx in 0..cols {
            let top = dy == 0;
            let bottom = dy == rows - 1;
            let left = dx == 0;
            let right = dx == cols - 1;
            let ch = match (top, bottom, left, right) {
                (true, _, true, _) => '┌',
                (true, _, _, true) => '┐',
                (_, true, true, _) => '└',
                (_, true, _, true) => '┘',
                (true, _, _, _) | (_, true, _, _) => '─',
                (_, _, true, _) | (_, _, _, true) => '│',
                _ => ' ',
            };
            frame.set(x0 + dx, y0 + dy, ch, depth, color);
        }
    }
    for (i, ch) in el.label.chars().enumerate() {
        frame.set(x0 + 2 + i as i32, y0 + 1, ch, depth, ColorId::White);
    }
}

/// Marks the smoothed center when it has fallen at least a cell behind.
fn draw_trail(placement: Placement, frame: &mut FrameBuffer) {
    let logical = to_cell(placement.offset);
    let visual = to_cell(placement.visual);
    if logical != visual {
        frame.set(visual.0, visual.1, '·', TRAIL_DEPTH, ColorId::Trail);
    }
}
