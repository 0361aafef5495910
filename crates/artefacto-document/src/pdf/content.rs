// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content-stream translation.
//
// Turns decoded `lopdf` operations into the path-painting subset the raster
// painter understands. Text, images, shadings and marked content are dropped
// here; a page made only of those renders as a blank sheet.

use lopdf::Object;
use lopdf::content::Operation;
use tracing::debug;

/// One painting instruction, in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaintOp {
    /// `q`
    Save,
    /// `Q`
    Restore,
    /// `cm`: concatenate `[a b c d e f]` onto the current transform.
    Transform([f32; 6]),
    /// `w`
    LineWidth(f32),
    FillColor([u8; 3]),
    StrokeColor([u8; 3]),
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    /// Cubic Bézier: two control points then the end point.
    CurveTo([f32; 6]),
    Rect { x: f32, y: f32, width: f32, height: f32 },
    ClosePath,
    Fill,
    Stroke,
    FillStroke,
    /// `n`: discard the current path without painting.
    EndPath,
}

/// Translate decoded operations, skipping anything outside the subset or
/// with malformed operands.
pub fn translate(operations: &[Operation]) -> Vec<PaintOp> {
    let mut ops = Vec::with_capacity(operations.len());
    let mut current = (0.0_f32, 0.0_f32);
    let mut skipped = 0_usize;

    for operation in operations {
        let args = operation.operands.as_slice();
        let translated = match operation.operator.as_str() {
            "q" => Some(vec![PaintOp::Save]),
            "Q" => Some(vec![PaintOp::Restore]),
            "cm" => numbers::<6>(args).map(|m| vec![PaintOp::Transform(m)]),
            "w" => numbers::<1>(args).map(|[w]| vec![PaintOp::LineWidth(w)]),

            "g" => numbers::<1>(args).map(|[v]| vec![PaintOp::FillColor(gray(v))]),
            "G" => numbers::<1>(args).map(|[v]| vec![PaintOp::StrokeColor(gray(v))]),
            "rg" => numbers::<3>(args).map(|c| vec![PaintOp::FillColor(rgb(c))]),
            "RG" => numbers::<3>(args).map(|c| vec![PaintOp::StrokeColor(rgb(c))]),
            "k" => numbers::<4>(args).map(|c| vec![PaintOp::FillColor(cmyk(c))]),
            "K" => numbers::<4>(args).map(|c| vec![PaintOp::StrokeColor(cmyk(c))]),
            "sc" | "scn" => by_component_count(args).map(|c| vec![PaintOp::FillColor(c)]),
            "SC" | "SCN" => by_component_count(args).map(|c| vec![PaintOp::StrokeColor(c)]),

            "m" => numbers::<2>(args).map(|[x, y]| {
                current = (x, y);
                vec![PaintOp::MoveTo { x, y }]
            }),
            "l" => numbers::<2>(args).map(|[x, y]| {
                current = (x, y);
                vec![PaintOp::LineTo { x, y }]
            }),
            "c" => numbers::<6>(args).map(|c| {
                current = (c[4], c[5]);
                vec![PaintOp::CurveTo(c)]
            }),
            "v" => numbers::<4>(args).map(|[x2, y2, x3, y3]| {
                let (x1, y1) = current;
                current = (x3, y3);
                vec![PaintOp::CurveTo([x1, y1, x2, y2, x3, y3])]
            }),
            "y" => numbers::<4>(args).map(|[x1, y1, x3, y3]| {
                current = (x3, y3);
                vec![PaintOp::CurveTo([x1, y1, x3, y3, x3, y3])]
            }),
            "re" => numbers::<4>(args).map(|[x, y, width, height]| {
                current = (x, y);
                vec![PaintOp::Rect {
                    x,
                    y,
                    width,
                    height,
                }]
            }),
            "h" => Some(vec![PaintOp::ClosePath]),

            "f" | "F" | "f*" => Some(vec![PaintOp::Fill]),
            "S" => Some(vec![PaintOp::Stroke]),
            "s" => Some(vec![PaintOp::ClosePath, PaintOp::Stroke]),
            "B" | "B*" => Some(vec![PaintOp::FillStroke]),
            "b" | "b*" => Some(vec![PaintOp::ClosePath, PaintOp::FillStroke]),
            "n" => Some(vec![PaintOp::EndPath]),

            _ => None,
        };

        match translated {
            Some(batch) => ops.extend(batch),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, "operators outside the painted subset ignored");
    }
    ops
}

/// Exactly `N` numeric operands.
fn numbers<const N: usize>(operands: &[Object]) -> Option<[f32; N]> {
    if operands.len() != N {
        return None;
    }
    let mut out = [0.0_f32; N];
    for (slot, operand) in out.iter_mut().zip(operands) {
        *slot = operand.as_float().ok()?;
    }
    Some(out)
}

/// `sc`/`scn` carry no colour space, so guess it from the operand count.
fn by_component_count(operands: &[Object]) -> Option<[u8; 3]> {
    match operands.len() {
        1 => numbers::<1>(operands).map(|[v]| gray(v)),
        3 => numbers::<3>(operands).map(rgb),
        4 => numbers::<4>(operands).map(cmyk),
        _ => None,
    }
}

fn channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn gray(value: f32) -> [u8; 3] {
    let v = channel(value);
    [v, v, v]
}

fn rgb([r, g, b]: [f32; 3]) -> [u8; 3] {
    [channel(r), channel(g), channel(b)]
}

fn cmyk([c, m, y, k]: [f32; 4]) -> [u8; 3] {
    let k = 1.0 - k.clamp(0.0, 1.0);
    [
        channel((1.0 - c.clamp(0.0, 1.0)) * k),
        channel((1.0 - m.clamp(0.0, 1.0)) * k),
        channel((1.0 - y.clamp(0.0, 1.0)) * k),
    ]
}
