use crate::doc::style::StyleState;

/// A point in 1/8-pixel fixed point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathPoint {
    /// Horizontal coordinate in eighths of a pixel.
    pub x: i32,
    /// Vertical coordinate in eighths of a pixel.
    pub y: i32,
}

impl PathPoint {
    /// Build a point from eighth-pixel coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One outline command, carrying a single control point.
///
/// Curve commands appear in runs: a cubic Bezier segment contributes three
/// `CubicBezierTo` points after its start point, a B-spline opens with three
/// `BSplineTo` points and extends one `BSplinePatchTo` point at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathCommand {
    /// Start a new subpath, closing the previous one.
    MoveTo(PathPoint),
    /// Start a new subpath without closing the previous one.
    MoveToNoClose(PathPoint),
    /// Straight segment to the point.
    LineTo(PathPoint),
    /// Cubic Bezier control/end point (runs of three).
    CubicBezierTo(PathPoint),
    /// Uniform B-spline opening point (runs of three).
    BSplineTo(PathPoint),
    /// Uniform B-spline extension point.
    BSplinePatchTo(PathPoint),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CmdKind {
    MoveTo,
    MoveToNoClose,
    LineTo,
    Bezier,
    BSpline,
    BSplinePatch,
}

/// Receiver for flattened polyline segments in 1/64-pixel coordinates.
pub(crate) trait SegmentSink {
    fn segment(&mut self, x0: i32, y0: i32, x1: i32, y1: i32);
}

/// Mutable outline storage at 1/64-pixel resolution.
///
/// Public path input is 1/8-pixel; three extra fractional bits are kept
/// internally so curve flattening and the style transform do not quantize to
/// the coverage grid early.
#[derive(Clone, Debug, Default)]
pub(crate) struct PathBuffer {
    kinds: Vec<CmdKind>,
    xs: Vec<i32>,
    ys: Vec<i32>,
}

/// Extra fractional bits of the internal path space over the 1/8-px space.
pub(crate) const PATH_FRAC_BITS: u32 = 3;

impl PathBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn push_fine(&mut self, kind: CmdKind, x: i32, y: i32) {
        self.kinds.push(kind);
        self.xs.push(x);
        self.ys.push(y);
    }

    /// Append public commands, translated by `(dx, dy)` eighth-pixels.
    pub fn append_commands(&mut self, commands: &[PathCommand], dx: i32, dy: i32) {
        for cmd in commands {
            let (kind, p) = match *cmd {
                PathCommand::MoveTo(p) => (CmdKind::MoveTo, p),
                PathCommand::MoveToNoClose(p) => (CmdKind::MoveToNoClose, p),
                PathCommand::LineTo(p) => (CmdKind::LineTo, p),
                PathCommand::CubicBezierTo(p) => (CmdKind::Bezier, p),
                PathCommand::BSplineTo(p) => (CmdKind::BSpline, p),
                PathCommand::BSplinePatchTo(p) => (CmdKind::BSplinePatch, p),
            };
            self.push_fine(
                kind,
                (p.x + dx) << PATH_FRAC_BITS,
                (p.y + dy) << PATH_FRAC_BITS,
            );
        }
    }

    pub fn point_fine(&self, i: usize) -> (i32, i32) {
        (self.xs[i], self.ys[i])
    }

    /// Bounding box over control points in fine units, `None` when empty.
    ///
    /// Curves stay inside the convex hull of their control points, so this
    /// bounds the flattened outline as well.
    pub fn bounds_fine(&self) -> Option<(i32, i32, i32, i32)> {
        if self.is_empty() {
            return None;
        }
        let mut minx = i32::MAX;
        let mut miny = i32::MAX;
        let mut maxx = i32::MIN;
        let mut maxy = i32::MIN;
        for i in 0..self.len() {
            minx = minx.min(self.xs[i]);
            maxx = maxx.max(self.xs[i]);
            miny = miny.min(self.ys[i]);
            maxy = maxy.max(self.ys[i]);
        }
        Some((minx, miny, maxx, maxy))
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        for x in &mut self.xs {
            *x += dx;
        }
        for y in &mut self.ys {
            *y += dy;
        }
    }

    /// Apply the style's scale, shear, three-axis rotation, and perspective
    /// to every point, about the rotation origin `(org_x, org_y)` in fine
    /// units.
    pub fn transform(&mut self, style: &StyleState, org_x: i32, org_y: i32) {
        const DEG: f64 = std::f64::consts::PI / 180.0;

        let scale_x = style.font_scale_x / 100.0;
        let scale_y = style.font_scale_y / 100.0;

        let caz = (DEG * style.font_angle_z).cos();
        let saz = (DEG * style.font_angle_z).sin();
        let cax = (DEG * style.font_angle_x).cos();
        let sax = (DEG * style.font_angle_x).sin();
        let cay = (DEG * style.font_angle_y).cos();
        let say = (DEG * style.font_angle_y).sin();

        let org_x = f64::from(org_x);
        let org_y = f64::from(org_y);

        for i in 0..self.len() {
            let px = f64::from(self.xs[i]);
            let py = f64::from(self.ys[i]);

            let mut x = scale_x * (px + style.font_shift_x * py) - org_x;
            let mut y = scale_y * (py + style.font_shift_y * px) - org_y;
            let mut z = 0.0;

            let xx = x * caz + y * saz;
            let yy = -(x * saz - y * caz);
            let zz = z;

            x = xx;
            y = yy * cax + zz * sax;
            z = yy * sax - zz * cax;

            let xx = x * cay + z * say;
            let yy = y;
            let mut zz = x * say - z * cay;

            // Clamp the perspective denominator so points swung far behind
            // the viewer stay finite.
            zz = zz.max(-19000.0);

            let x = (xx * 20000.0) / (zz + 20000.0);
            let y = (yy * 20000.0) / (zz + 20000.0);

            self.xs[i] = (x + org_x + 0.5).floor() as i32;
            self.ys[i] = (y + org_y + 0.5).floor() as i32;
        }
    }

    /// Flatten every subpath into line segments.
    ///
    /// A `MoveTo` implicitly closes the open subpath, so every emitted
    /// contour is closed and scan-convertible.
    pub fn flatten<S: SegmentSink>(&self, sink: &mut S) {
        let mut walker = Walker {
            sink,
            first: (0, 0),
            last: (0, 0),
            first_set: false,
        };

        let n = self.len();
        let mut last_moveto = false;
        let mut i = 0;
        while i < n {
            match self.kinds[i] {
                CmdKind::MoveTo => {
                    if last_moveto && walker.first_set && walker.first != walker.last {
                        let (lx, ly) = walker.last;
                        let (fx, fy) = walker.first;
                        walker.line(lx, ly, fx, fy);
                    }
                    last_moveto = true;
                    walker.first_set = false;
                    walker.last = self.point_fine(i);
                }
                CmdKind::MoveToNoClose => {}
                CmdKind::LineTo => {
                    if i >= 1 {
                        let (x0, y0) = self.point_fine(i - 1);
                        let (x1, y1) = self.point_fine(i);
                        walker.line(x0, y0, x1, y1);
                    }
                }
                CmdKind::Bezier => {
                    if i >= 1 && n - (i - 1) >= 4 {
                        walker.curve(self.control_points(i - 1), false);
                    }
                    i += 2;
                }
                CmdKind::BSpline => {
                    if i >= 1 && n - (i - 1) >= 4 {
                        walker.curve(self.control_points(i - 1), true);
                    }
                    i += 2;
                }
                CmdKind::BSplinePatch => {
                    if i >= 3 && n - (i - 3) >= 4 {
                        walker.curve(self.control_points(i - 3), true);
                    }
                }
            }
            i += 1;
        }

        if last_moveto && walker.first_set && walker.first != walker.last {
            let (lx, ly) = walker.last;
            let (fx, fy) = walker.first;
            walker.line(lx, ly, fx, fy);
        }
    }

    fn control_points(&self, base: usize) -> [(f64, f64); 4] {
        let mut pts = [(0.0, 0.0); 4];
        for (k, p) in pts.iter_mut().enumerate() {
            let (x, y) = self.point_fine(base + k);
            *p = (f64::from(x), f64::from(y));
        }
        pts
    }
}

struct Walker<'a, S> {
    sink: &'a mut S,
    first: (i32, i32),
    last: (i32, i32),
    first_set: bool,
}

impl<S: SegmentSink> Walker<'_, S> {
    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        if self.last != (x0, y0) {
            let (lx, ly) = self.last;
            self.emit(lx, ly, x0, y0);
        }
        self.emit(x0, y0, x1, y1);
    }

    fn emit(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        if !self.first_set {
            self.first = (x0, y0);
            self.first_set = true;
        }
        self.last = (x1, y1);
        self.sink.segment(x0, y0, x1, y1);
    }

    fn curve(&mut self, pts: [(f64, f64); 4], bspline: bool) {
        let [(x0, y0), (x1, y1), (x2, y2), (x3, y3)] = pts;

        let (cx3, cx2, cx1, cx0, cy3, cy2, cy1, cy0);
        if bspline {
            let sixth = 1.0 / 6.0;
            cx3 = sixth * (-x0 + 3.0 * x1 - 3.0 * x2 + x3);
            cx2 = sixth * (3.0 * x0 - 6.0 * x1 + 3.0 * x2);
            cx1 = sixth * (-3.0 * x0 + 3.0 * x2);
            cx0 = sixth * (x0 + 4.0 * x1 + x2);
            cy3 = sixth * (-y0 + 3.0 * y1 - 3.0 * y2 + y3);
            cy2 = sixth * (3.0 * y0 - 6.0 * y1 + 3.0 * y2);
            cy1 = sixth * (-3.0 * y0 + 3.0 * y2);
            cy0 = sixth * (y0 + 4.0 * y1 + y2);
        } else {
            cx3 = -x0 + 3.0 * x1 - 3.0 * x2 + x3;
            cx2 = 3.0 * x0 - 6.0 * x1 + 3.0 * x2;
            cx1 = -3.0 * x0 + 3.0 * x1;
            cx0 = x0;
            cy3 = -y0 + 3.0 * y1 - 3.0 * y2 + y3;
            cy2 = 3.0 * y0 - 6.0 * y1 + 3.0 * y2;
            cy1 = -3.0 * y0 + 3.0 * y1;
            cy0 = y0;
        }

        // The flattening error of a cubic is bounded by its curvature, whose
        // maximum acceleration occurs at one end of the parameter range, so
        // |2*c2| + |6*c3| bounds it. A step of sqrt(8/max_accel) then caps the
        // error independent of curve length (Graphics Gems).
        let maxaccel_y = (2.0 * cy2).abs() + (6.0 * cy3).abs();
        let maxaccel_x = (2.0 * cx2).abs() + (6.0 * cx3).abs();
        let maxaccel = maxaccel_x.max(maxaccel_y);

        let mut h = 1.0;
        if maxaccel > 8.0 {
            h = (8.0 / maxaccel).sqrt();
        }

        if !self.first_set {
            self.first = (cx0 as i32, cy0 as i32);
            self.last = self.first;
            self.first_set = true;
        }

        let mut t = 0.0;
        while t < 1.0 {
            let x = cx0 + t * (cx1 + t * (cx2 + t * cx3));
            let y = cy0 + t * (cy1 + t * (cy2 + t * cy3));
            let (lx, ly) = self.last;
            self.emit(lx, ly, x as i32, y as i32);
            t += h;
        }

        let x = cx0 + cx1 + cx2 + cx3;
        let y = cy0 + cy1 + cy2 + cy3;
        let (lx, ly) = self.last;
        self.emit(lx, ly, x as i32, y as i32);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/path.rs"]
mod tests;
