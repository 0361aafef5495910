// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Path painter — rasterise translated page content onto an RGBA image using
// `imageproc` drawing primitives.
//
// Points are mapped to device pixels as they are added to the path, so the
// transform in effect at construction time applies, as in PDF. The device
// transform flips the y axis: PDF user space grows upwards, images grow down.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;

use artefacto_core::Viewport;

use crate::pdf::content::PaintOp;
use crate::pdf::reader::PageBox;

/// Paper colour behind every page.
pub const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Straight segments used to approximate one Bézier curve.
const CURVE_SEGMENTS: usize = 16;

/// Device line widths at or below this draw as hairlines.
const HAIRLINE: f32 = 1.0;

/// Row-major affine transform `[a b c d e f]`, PDF convention.
type Matrix = [f32; 6];

/// Paint `ops` for a page with geometry `page_box` at `scale` pixels per
/// point. The image has the page's viewport size, or is `None` when that
/// viewport is past the raster limits.
pub fn paint_page(ops: &[PaintOp], page_box: PageBox, scale: f32) -> Option<RgbaImage> {
    let viewport = Viewport::from_points(page_box.width, page_box.height, scale);
    if !viewport.is_drawable() {
        return None;
    }
    let mut painter = Painter::new(viewport, page_box, scale);
    for op in ops {
        painter.apply(*op);
    }
    Some(painter.canvas)
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    fill: Rgba<u8>,
    stroke: Rgba<u8>,
    line_width: f32,
}

#[derive(Debug, Default)]
struct Subpath {
    points: Vec<(f32, f32)>,
    closed: bool,
}

struct Painter {
    canvas: RgbaImage,
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    path: Vec<Subpath>,
}

impl Painter {
    fn new(viewport: Viewport, page_box: PageBox, scale: f32) -> Self {
        let device = [
            scale,
            0.0,
            0.0,
            -scale,
            -page_box.x0 * scale,
            (page_box.y0 + page_box.height) * scale,
        ];
        Self {
            canvas: RgbaImage::from_pixel(viewport.width, viewport.height, PAPER),
            state: GraphicsState {
                ctm: device,
                fill: Rgba([0, 0, 0, 255]),
                stroke: Rgba([0, 0, 0, 255]),
                line_width: 1.0,
            },
            saved: Vec::new(),
            path: Vec::new(),
        }
    }

    fn apply(&mut self, op: PaintOp) {
        match op {
            PaintOp::Save => self.saved.push(self.state.clone()),
            PaintOp::Restore => {
                // Unbalanced `Q` is common in the wild.
                if let Some(state) = self.saved.pop() {
                    self.state = state;
                }
            }
            PaintOp::Transform(m) => self.state.ctm = concat(m, self.state.ctm),
            PaintOp::LineWidth(width) => self.state.line_width = width.max(0.0),
            PaintOp::FillColor([r, g, b]) => self.state.fill = Rgba([r, g, b, 255]),
            PaintOp::StrokeColor([r, g, b]) => self.state.stroke = Rgba([r, g, b, 255]),

            PaintOp::MoveTo { x, y } => {
                let point = self.device(x, y);
                self.path.push(Subpath {
                    points: vec![point],
                    closed: false,
                });
            }
            PaintOp::LineTo { x, y } => {
                let point = self.device(x, y);
                self.open_subpath().points.push(point);
            }
            PaintOp::CurveTo([x1, y1, x2, y2, x3, y3]) => {
                let c1 = self.device(x1, y1);
                let c2 = self.device(x2, y2);
                let end = self.device(x3, y3);
                let subpath = self.open_subpath();
                let start = subpath.points.last().copied().unwrap_or(c1);
                subpath
                    .points
                    .extend((1..=CURVE_SEGMENTS).map(|i| {
                        bezier(start, c1, c2, end, i as f32 / CURVE_SEGMENTS as f32)
                    }));
            }
            PaintOp::Rect {
                x,
                y,
                width,
                height,
            } => {
                let points = vec![
                    self.device(x, y),
                    self.device(x + width, y),
                    self.device(x + width, y + height),
                    self.device(x, y + height),
                ];
                self.path.push(Subpath {
                    points,
                    closed: true,
                });
            }
            PaintOp::ClosePath => {
                if let Some(subpath) = self.path.last_mut() {
                    subpath.closed = true;
                }
            }

            PaintOp::Fill => {
                self.fill_path();
                self.path.clear();
            }
            PaintOp::Stroke => {
                self.stroke_path();
                self.path.clear();
            }
            PaintOp::FillStroke => {
                self.fill_path();
                self.stroke_path();
                self.path.clear();
            }
            PaintOp::EndPath => self.path.clear(),
        }
    }

    fn device(&self, x: f32, y: f32) -> (f32, f32) {
        transform(self.state.ctm, x, y)
    }

    /// The subpath new segments extend. A closed subpath starts a fresh one
    /// at its first point.
    fn open_subpath(&mut self) -> &mut Subpath {
        let restart = match self.path.last() {
            None => Some(Vec::new()),
            Some(last) if last.closed => Some(last.points.first().copied().into_iter().collect()),
            Some(_) => None,
        };
        if let Some(points) = restart {
            self.path.push(Subpath {
                points,
                closed: false,
            });
        }
        let last = self.path.len() - 1;
        &mut self.path[last]
    }

    fn fill_path(&mut self) {
        let colour = self.state.fill;
        for subpath in &self.path {
            fill_polygon(&mut self.canvas, &subpath.points, colour);
        }
    }

    fn stroke_path(&mut self) {
        let colour = self.state.stroke;
        let [a, b, c, d, _, _] = self.state.ctm;
        let width = self.state.line_width * (a * d - b * c).abs().sqrt();

        for subpath in &self.path {
            let points = &subpath.points;
            let closing = (subpath.closed && points.len() > 2)
                .then(|| (points[points.len() - 1], points[0]));
            let segments = points
                .windows(2)
                .map(|pair| (pair[0], pair[1]))
                .chain(closing);

            for (from, to) in segments {
                if width <= HAIRLINE {
                    draw_line_segment_mut(&mut self.canvas, from, to, colour);
                } else {
                    stroke_segment(&mut self.canvas, from, to, width / 2.0, colour);
                }
            }
        }
    }
}

/// `m × ctm`: the new transform applies `m` first.
fn concat(m: Matrix, ctm: Matrix) -> Matrix {
    let [a, b, c, d, e, f] = m;
    let [ca, cb, cc, cd, ce, cf] = ctm;
    [
        a * ca + b * cc,
        a * cb + b * cd,
        c * ca + d * cc,
        c * cb + d * cd,
        e * ca + f * cc + ce,
        e * cb + f * cd + cf,
    ]
}

fn transform(m: Matrix, x: f32, y: f32) -> (f32, f32) {
    let [a, b, c, d, e, f] = m;
    (a * x + c * y + e, b * x + d * y + f)
}

fn bezier(
    p0: (f32, f32),
    p1: (f32, f32),
    p2: (f32, f32),
    p3: (f32, f32),
    t: f32,
) -> (f32, f32) {
    let u = 1.0 - t;
    let (w0, w1, w2, w3) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
    (
        w0 * p0.0 + w1 * p1.0 + w2 * p2.0 + w3 * p3.0,
        w0 * p0.1 + w1 * p1.1 + w2 * p2.1 + w3 * p3.1,
    )
}

/// A thick segment as a quad around the centre line. Joins are not drawn.
fn stroke_segment(
    canvas: &mut RgbaImage,
    from: (f32, f32),
    to: (f32, f32),
    half_width: f32,
    colour: Rgba<u8>,
) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return;
    }
    let (nx, ny) = (-dy / length * half_width, dx / length * half_width);
    let quad = [
        (from.0 + nx, from.1 + ny),
        (to.0 + nx, to.1 + ny),
        (to.0 - nx, to.1 - ny),
        (from.0 - nx, from.1 - ny),
    ];
    fill_polygon(canvas, &quad, colour);
}

/// `draw_polygon_mut` rejects empty polygons and ones whose last point
/// repeats the first, so snap to pixels and drop those first.
fn fill_polygon(canvas: &mut RgbaImage, points: &[(f32, f32)], colour: Rgba<u8>) {
    let mut polygon: Vec<Point<i32>> = points
        .iter()
        .map(|&(x, y)| Point::new(x.round() as i32, y.round() as i32))
        .collect();
    polygon.dedup();
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }
    if polygon.len() >= 3 {
        draw_polygon_mut(canvas, &polygon, colour);
    }
}
