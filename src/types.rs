use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` radians.
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    /// Angle of the vector from `self` to `other`; `0.0` when they coincide.
    pub fn angle_to(self, other: Vec2) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Moves `self` toward `target` by `factor` of the remaining distance.
    pub fn approach(self, target: Vec2, factor: f32) -> Vec2 {
        self + (target - self) * factor
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Rendered size in whole pixels. Zero means the surface has not measured it yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const UNKNOWN: Size = Size {
        width: 0,
        height: 0,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_known(self) -> bool {
        self.width != 0 && self.height != 0
    }

    pub fn half(self) -> Vec2 {
        Vec2::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    pub fn perimeter_sum(self) -> u64 {
        u64::from(self.width) + u64::from(self.height)
    }
}

/// Axis-aligned rectangle given by its top-left corner and extent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Handle to one external visual element owned by the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    mod vec2_angle {
        use super::*;

        #[test]
        fn angle_to_point_on_the_right_is_zero() {
            let a = Vec2::new(0.0, 0.0);
            assert_eq!(a.angle_to(Vec2::new(5.0, 0.0)), 0.0);
        }

        #[test]
        fn angle_to_point_below_is_quarter_turn() {
            let a = Vec2::new(1.0, 1.0);
            let angle = a.angle_to(Vec2::new(1.0, 4.0));
            assert_abs_diff_eq!(angle, std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
        }

        #[test]
        fn coincident_points_give_zero_angle() {
            let a = Vec2::new(3.0, -2.0);
            assert_eq!(a.angle_to(a), 0.0);
        }

        #[test]
        fn from_angle_is_unit_length() {
            let v = Vec2::from_angle(0.7);
            assert_abs_diff_eq!(v.x * v.x + v.y * v.y, 1.0, epsilon = 1e-6);
        }
    }

    mod vec2_approach {
        use super::*;

        #[test]
        fn covers_the_given_fraction() {
            let v = Vec2::ZERO.approach(Vec2::new(10.0, -20.0), 0.1);
            assert_abs_diff_eq!(v.x, 1.0, epsilon = 1e-6);
            assert_abs_diff_eq!(v.y, -2.0, epsilon = 1e-6);
        }

        #[test]
        fn already_at_target_stays_put() {
            let target = Vec2::new(4.0, 4.0);
            assert_eq!(target.approach(target, 0.1), target);
        }
    }

    mod size {
        use super::*;

        #[test]
        fn zero_dimension_is_unknown() {
            assert!(!Size::new(0, 30).is_known());
            assert!(!Size::new(30, 0).is_known());
            assert!(Size::new(30, 30).is_known());
        }

        #[test]
        fn perimeter_sum_does_not_overflow() {
            assert_eq!(Size::new(u32::MAX, u32::MAX).perimeter_sum(), 2 * u64::from(u32::MAX));
        }

        #[test]
        fn half_extent_keeps_odd_pixels() {
            assert_eq!(Size::new(11, 4).half(), Vec2::new(5.5, 2.0));
        }
    }

    mod rect {
        use super::*;

        #[test]
        fn edges_follow_origin_and_extent() {
            let r = Rect::new(10.0, 20.0, 100.0, 50.0);
            assert_eq!(r.left(), 10.0);
            assert_eq!(r.top(), 20.0);
            assert_eq!(r.right(), 110.0);
            assert_eq!(r.bottom(), 70.0);
            assert_eq!(r.center(), Vec2::new(60.0, 45.0));
        }
    }
}
