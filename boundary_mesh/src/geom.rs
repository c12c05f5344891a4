//! 3D vectors and axis-aligned boxes.

use glam::DVec3;

/// Alias kept distinct from `glam::DVec3` at call sites so the rest of the
/// crate reads in domain terms (`Point`/normal) rather than bare `DVec3`.
pub type Vec3 = DVec3;

/// Axis-aligned bounding box. Starts invalid (`vmin > vmax`) and only ever
/// grows via `add`/`add_point`, mirroring `Rect3f::makeInvalid()` in the
/// original source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect3 {
    pub vmin: Vec3,
    pub vmax: Vec3,
}

impl Rect3 {
    pub fn invalid() -> Self {
        Self {
            vmin: Vec3::splat(f64::MAX),
            vmax: Vec3::splat(f64::MIN),
        }
    }

    pub fn new(vmin: Vec3, vmax: Vec3) -> Self {
        let mut r = Self { vmin, vmax };
        r.validate();
        r
    }

    fn validate(&mut self) {
        if self.vmin.x > self.vmax.x {
            std::mem::swap(&mut self.vmin.x, &mut self.vmax.x);
        }
        if self.vmin.y > self.vmax.y {
            std::mem::swap(&mut self.vmin.y, &mut self.vmax.y);
        }
        if self.vmin.z > self.vmax.z {
            std::mem::swap(&mut self.vmin.z, &mut self.vmax.z);
        }
    }

    pub fn is_valid(&self) -> bool {
        const MIN_SIZE: f64 = 1e-10;
        self.width() > MIN_SIZE && self.height() > MIN_SIZE
    }

    pub fn add_point(&mut self, v: Vec3) {
        self.vmin = self.vmin.min(v);
        self.vmax = self.vmax.max(v);
    }

    pub fn add_rect(&mut self, r: &Rect3) {
        self.add_point(r.vmin);
        self.add_point(r.vmax);
    }

    pub fn point_inside(&self, p: Vec3) -> bool {
        (self.vmin.x <= p.x && p.x <= self.vmax.x)
            && (self.vmin.y <= p.y && p.y <= self.vmax.y)
            && (self.vmin.z <= p.z && p.z <= self.vmax.z)
    }

    pub fn contains(&self, other: &Rect3) -> bool {
        self.point_inside(other.vmin) && self.point_inside(other.vmax)
    }

    pub fn intersects(&self, other: &Rect3) -> bool {
        (other.vmin.x <= self.vmax.x && other.vmax.x >= self.vmin.x)
            && (other.vmin.y <= self.vmax.y && other.vmax.y >= self.vmin.y)
            && (other.vmin.z <= self.vmax.z && other.vmax.z >= self.vmin.z)
    }

    pub fn width(&self) -> f64 {
        self.vmax.x - self.vmin.x
    }

    pub fn height(&self) -> f64 {
        self.vmax.y - self.vmin.y
    }

    pub fn depth(&self) -> f64 {
        self.vmax.z - self.vmin.z
    }

    pub fn dimension(&self) -> Vec3 {
        Vec3::new(self.width(), self.height(), self.depth())
    }

    pub fn center(&self) -> Vec3 {
        (self.vmin + self.vmax) * 0.5
    }

    /// Scale about the center by a per-axis factor (e.g. `1.05` to inflate
    /// by 5%, matching the octree's construction-time inflation).
    pub fn scale(&mut self, s: Vec3) {
        let c = self.center();
        let d = self.dimension() * s * 0.5;
        self.vmin = c - d;
        self.vmax = c + d;
    }

    /// One of the 8 octants split at the box center, numbered the way the
    /// original source numbers them (`octant(0)` is the `vmin`-corner
    /// octant, `octant(6)` is the `vmax`-corner octant).
    pub fn octant(&self, i: u8) -> Rect3 {
        let c = self.center();
        let (vmin, vmax) = self.vmin_vmax();
        match i {
            0 => Rect3::new(vmin, c),
            1 => Rect3::new(Vec3::new(c.x, vmin.y, vmin.z), Vec3::new(vmax.x, c.y, c.z)),
            2 => Rect3::new(Vec3::new(c.x, c.y, vmin.z), Vec3::new(vmax.x, vmax.y, c.z)),
            3 => Rect3::new(Vec3::new(vmin.x, c.y, vmin.z), Vec3::new(c.x, vmax.y, c.z)),
            4 => Rect3::new(Vec3::new(vmin.x, vmin.y, c.z), Vec3::new(c.x, c.y, vmax.z)),
            5 => Rect3::new(Vec3::new(c.x, vmin.y, c.z), Vec3::new(vmax.x, c.y, vmax.z)),
            6 => Rect3::new(c, vmax),
            7 => Rect3::new(Vec3::new(vmin.x, c.y, c.z), Vec3::new(c.x, vmax.y, vmax.z)),
            _ => panic!("octant index out of range: {i}"),
        }
    }

    fn vmin_vmax(&self) -> (Vec3, Vec3) {
        (self.vmin, self.vmax)
    }
}

impl Default for Rect3 {
    fn default() -> Self {
        Self::invalid()
    }
}
