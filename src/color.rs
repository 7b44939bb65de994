// src/color.rs

//! Colour and vector tuples.
//!
//! A [`Tuple`] is four `f32` components. The `w` component distinguishes
//! points (`w == 1`) from vectors (`w == 0`); for colours it carries the
//! alpha channel. The framebuffer origin is the top-left corner, so `UP`
//! points toward negative `y`.

use std::ops::{Add, Div, Mul, Neg, Sub};

/// Comparison factor for floating-point comparisons between tuples.
pub const EPSILON: f32 = 1e-5;

/// A 4-component tuple of `f32` values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tuple {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// Colours are tuples; `x`/`y`/`z` are the red/green/blue channels and `w`
/// is the (currently unused) alpha channel.
pub type Color = Tuple;

impl Tuple {
    pub const ZERO: Tuple = Tuple::new(0.0, 0.0, 0.0, 0.0);
    pub const LEFT: Tuple = Tuple::new(-1.0, 0.0, 0.0, 0.0);
    pub const RIGHT: Tuple = Tuple::new(1.0, 0.0, 0.0, 0.0);
    pub const UP: Tuple = Tuple::new(0.0, -1.0, 0.0, 0.0);
    pub const DOWN: Tuple = Tuple::new(0.0, 1.0, 0.0, 0.0);
    pub const FORWARD: Tuple = Tuple::new(0.0, 0.0, 1.0, 0.0);
    pub const BACK: Tuple = Tuple::new(0.0, 0.0, -1.0, 0.0);

    /// Opaque black, the colour every framebuffer cell starts as.
    pub const BLACK: Color = Tuple::new(0.0, 0.0, 0.0, 1.0);

    /// Creates an arbitrary tuple with the given components.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Tuple { x, y, z, w }
    }

    /// Creates a point (`w == 1`).
    #[inline]
    pub const fn point(x: f32, y: f32, z: f32) -> Self {
        Tuple::new(x, y, z, 1.0)
    }

    /// Creates a vector (`w == 0`).
    #[inline]
    pub const fn vector(x: f32, y: f32, z: f32) -> Self {
        Tuple::new(x, y, z, 0.0)
    }

    /// Creates an opaque colour from red/green/blue channels in `[0, 1]`.
    #[inline]
    pub const fn color(r: f32, g: f32, b: f32) -> Self {
        Tuple::new(r, g, b, 1.0)
    }

    /// Component-wise (Hadamard) product.
    #[inline]
    pub fn hadamard(self, rhs: Tuple) -> Tuple {
        Tuple::new(
            self.x * rhs.x,
            self.y * rhs.y,
            self.z * rhs.z,
            self.w * rhs.w,
        )
    }

    /// 4-component dot product.
    #[inline]
    pub fn dot(self, rhs: Tuple) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z + self.w * rhs.w
    }

    /// 3-component cross product; the result is a vector (`w == 0`).
    #[inline]
    pub fn cross(self, rhs: Tuple) -> Tuple {
        Tuple::vector(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Magnitude over the `x`/`y`/`z` components.
    #[inline]
    pub fn magnitude(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Returns the tuple scaled to unit magnitude, preserving `w`.
    /// A near-zero magnitude yields the zero tuple.
    pub fn normalized(self) -> Tuple {
        let mag = self.magnitude();
        if mag.abs() < EPSILON {
            return Tuple::ZERO;
        }
        Tuple::new(self.x / mag, self.y / mag, self.z / mag, self.w)
    }

    /// Component-wise comparison within [`EPSILON`].
    pub fn approx_eq(self, rhs: Tuple) -> bool {
        (self.x - rhs.x).abs() < EPSILON
            && (self.y - rhs.y).abs() < EPSILON
            && (self.z - rhs.z).abs() < EPSILON
            && (self.w - rhs.w).abs() < EPSILON
    }
}

impl Add for Tuple {
    type Output = Tuple;

    #[inline]
    fn add(self, rhs: Tuple) -> Tuple {
        Tuple::new(
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
            self.w + rhs.w,
        )
    }
}

impl Sub for Tuple {
    type Output = Tuple;

    #[inline]
    fn sub(self, rhs: Tuple) -> Tuple {
        Tuple::new(
            self.x - rhs.x,
            self.y - rhs.y,
            self.z - rhs.z,
            self.w - rhs.w,
        )
    }
}

impl Neg for Tuple {
    type Output = Tuple;

    #[inline]
    fn neg(self) -> Tuple {
        Tuple::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl Mul<f32> for Tuple {
    type Output = Tuple;

    #[inline]
    fn mul(self, s: f32) -> Tuple {
        Tuple::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }
}

impl Div<f32> for Tuple {
    type Output = Tuple;

    /// Division by a near-zero scalar yields the zero tuple instead of
    /// infinities.
    fn div(self, s: f32) -> Tuple {
        if s.abs() < EPSILON {
            return Tuple::ZERO;
        }
        Tuple::new(self.x / s, self.y / s, self.z / s, self.w / s)
    }
}
