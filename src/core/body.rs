use crate::{
    config::Settings,
    error::UnknownSize,
    surface::{Placement, Surface},
    types::{ElementId, Rect, Size, Vec2},
};

/// One rectangular element placed on the surface, tracked by its center.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    element: ElementId,
    pub position: Vec2,
    pub visual_position: Vec2,
    pub size: Size,
}

impl Body {
    pub fn new(element: ElementId, position: Vec2) -> Self {
        Self {
            element,
            position,
            visual_position: position,
            size: Size::UNKNOWN,
        }
    }

    #[cfg(test)]
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Re-measures the element. A zero dimension is reported but still stored,
    /// which keeps the body inert until the surface lays it out.
    pub fn refresh_size<S: Surface + ?Sized>(&mut self, surface: &S) -> Result<(), UnknownSize> {
        self.size = surface.element_size(self.element);
        if self.size.is_known() {
            Ok(())
        } else {
            Err(UnknownSize {
                element: self.element,
                width: self.size.width,
                height: self.size.height,
            })
        }
    }

    /// Strict interior test; points on an edge are outside.
    pub fn point_inside(&self, point: Vec2) -> bool {
        let half = self.size.half();
        point.x > self.position.x - half.x
            && point.x < self.position.x + half.x
            && point.y > self.position.y - half.y
            && point.y < self.position.y + half.y
    }

    pub fn corners(&self) -> [Vec2; 4] {
        let half = self.size.half();
        let Vec2 { x, y } = self.position;
        [
            Vec2::new(x - half.x, y - half.y),
            Vec2::new(x + half.x, y - half.y),
            Vec2::new(x - half.x, y + half.y),
            Vec2::new(x + half.x, y + half.y),
        ]
    }

    /// True when a corner of `other` lies inside `self`, or when `other`
    /// swallows `self` whole. Not symmetric: test both directions to catch
    /// every overlap. Unmeasured bodies never overlap anything.
    pub fn overlaps(&self, other: &Body) -> bool {
        if !self.size.is_known() || !other.size.is_known() {
            return false;
        }
        if self.holds_corner_of(other) {
            return true;
        }
        other.point_inside(self.position)
    }

    pub fn holds_corner_of(&self, other: &Body) -> bool {
        other.corners().iter().any(|&c| self.point_inside(c))
    }

    /// Shoves `self` directly away from `from`'s center.
    pub fn apply_push(&mut self, from: &Body, settings: &Settings) {
        let angle = from.position.angle_to(self.position);
        let mut strength = settings.push_speed;
        // small boxes get stuck under big ones otherwise
        let (num, den) = settings.bully_ratio;
        let pusher = u128::from(from.size.perimeter_sum()) * u128::from(den);
        let pushed = u128::from(self.size.perimeter_sum()) * u128::from(num);
        if pusher > pushed {
            strength *= settings.bully_multiplier;
        }
        self.position += Vec2::from_angle(angle) * strength;
        debug_assert!(self.position.is_finite(), "push left {} non-finite", self.element);
        self.settle(settings);
    }

    /// Nudges the body back toward `container` on every edge it crosses.
    /// Returns whether anything moved.
    pub fn clamp_boundary(&mut self, container: Rect, settings: &Settings) -> bool {
        let half = self.size.half();
        let steps = settings.clamp;
        let mut moved = false;

        if self.position.x - half.x < container.left() {
            self.position.x += steps.left;
            self.settle(settings);
            moved = true;
        }
        if self.position.y - half.y < container.top() {
            self.position.y += steps.top;
            self.settle(settings);
            moved = true;
        }
        if self.position.x + half.x > container.right() {
            self.position.x -= steps.right;
            self.settle(settings);
            moved = true;
        }
        if self.position.y + half.y > container.bottom() {
            self.position.y -= steps.bottom;
            self.settle(settings);
            moved = true;
        }
        moved
    }

    pub fn is_raised(&self, settings: &Settings) -> bool {
        self.size.width < settings.raise_below_px || self.size.height < settings.raise_below_px
    }

    pub fn placement(&self, settings: &Settings) -> Placement {
        let half = self.size.half();
        Placement {
            offset: self.position,
            margin: Vec2::new(-half.x, -half.y),
            visual: self.visual_position,
            layer: if self.is_raised(settings) {
                crate::config::RAISED_LAYER
            } else {
                0
            },
        }
    }

    fn settle(&mut self, settings: &Settings) {
        self.visual_position = self.visual_position.approach(self.position, settings.damping);
    }
}
