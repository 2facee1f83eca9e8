//! SVG path data scanning for bounds estimation.
//!
//! [`control_points`] yields every on-curve point and every Bézier control
//! point of a path expression, so folding them into a bounding box gives a
//! conservative control-point hull. Elliptical arcs are converted to center
//! form and sampled along the sweep.

use thiserror::Error;

/// Sample count per elliptical arc segment.
const ARC_SAMPLES: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathDataError {
    #[error("unknown path command `{0}`")]
    UnknownCommand(char),

    #[error("path data must start with a move command")]
    MissingMove,

    #[error("invalid number at byte {0} of path data")]
    InvalidNumber(usize),

    #[error("invalid arc flag at byte {0} of path data")]
    InvalidFlag(usize),

    #[error("path data ends mid-command")]
    Truncated,
}

/// Collect the control-point hull of a path expression.
///
/// Handles the full command set (`MmLlHhVvCcSsQqTtAaZz`), implicit command
/// repetition, and relative coordinates. An empty expression yields no
/// points.
pub fn control_points(d: &str) -> Result<Vec<(f64, f64)>, PathDataError> {
    let mut lex = Lexer::new(d);
    let mut points = Vec::new();

    let mut cursor = (0.0_f64, 0.0_f64);
    let mut subpath_start = cursor;
    let mut prev_cubic_ctrl: Option<(f64, f64)> = None;
    let mut prev_quad_ctrl: Option<(f64, f64)> = None;
    let mut command: Option<u8> = None;

    loop {
        lex.skip_separators();
        let Some(next) = lex.peek() else { break };

        if next.is_ascii_alphabetic() {
            lex.advance();
            command = Some(next);
        } else if command.is_none() {
            return Err(PathDataError::MissingMove);
        }

        let cmd = match command {
            Some(c) => c,
            None => return Err(PathDataError::MissingMove),
        };
        let relative = cmd.is_ascii_lowercase();

        match cmd.to_ascii_uppercase() {
            b'Z' => {
                cursor = subpath_start;
                prev_cubic_ctrl = None;
                prev_quad_ctrl = None;
                // A closepath takes no arguments; forget it so a following
                // number is not treated as an implicit repeat.
                command = None;
                continue;
            }
            b'M' => {
                let p = lex.point(cursor, relative)?;
                points.push(p);
                cursor = p;
                subpath_start = p;
                prev_cubic_ctrl = None;
                prev_quad_ctrl = None;
                // Further coordinate pairs are implicit linetos.
                command = Some(if relative { b'l' } else { b'L' });
            }
            b'L' => {
                let p = lex.point(cursor, relative)?;
                points.push(p);
                cursor = p;
                prev_cubic_ctrl = None;
                prev_quad_ctrl = None;
            }
            b'H' => {
                let x = lex.number()?;
                let p = (if relative { cursor.0 + x } else { x }, cursor.1);
                points.push(p);
                cursor = p;
                prev_cubic_ctrl = None;
                prev_quad_ctrl = None;
            }
            b'V' => {
                let y = lex.number()?;
                let p = (cursor.0, if relative { cursor.1 + y } else { y });
                points.push(p);
                cursor = p;
                prev_cubic_ctrl = None;
                prev_quad_ctrl = None;
            }
            b'C' => {
                let c1 = lex.point(cursor, relative)?;
                let c2 = lex.point(cursor, relative)?;
                let p = lex.point(cursor, relative)?;
                points.extend([c1, c2, p]);
                cursor = p;
                prev_cubic_ctrl = Some(c2);
                prev_quad_ctrl = None;
            }
            b'S' => {
                let c1 = reflect(cursor, prev_cubic_ctrl);
                let c2 = lex.point(cursor, relative)?;
                let p = lex.point(cursor, relative)?;
                points.extend([c1, c2, p]);
                cursor = p;
                prev_cubic_ctrl = Some(c2);
                prev_quad_ctrl = None;
            }
            b'Q' => {
                let c = lex.point(cursor, relative)?;
                let p = lex.point(cursor, relative)?;
                points.extend([c, p]);
                cursor = p;
                prev_quad_ctrl = Some(c);
                prev_cubic_ctrl = None;
            }
            b'T' => {
                let c = reflect(cursor, prev_quad_ctrl);
                let p = lex.point(cursor, relative)?;
                points.extend([c, p]);
                cursor = p;
                prev_quad_ctrl = Some(c);
                prev_cubic_ctrl = None;
            }
            b'A' => {
                let rx = lex.number()?;
                let ry = lex.number()?;
                let rotation = lex.number()?;
                let large_arc = lex.flag()?;
                let sweep = lex.flag()?;
                let p = lex.point(cursor, relative)?;
                sample_arc(&mut points, cursor, p, rx, ry, rotation, large_arc, sweep);
                points.push(p);
                cursor = p;
                prev_cubic_ctrl = None;
                prev_quad_ctrl = None;
            }
            other => return Err(PathDataError::UnknownCommand(char::from(other))),
        }
    }

    Ok(points)
}

fn reflect(cursor: (f64, f64), ctrl: Option<(f64, f64)>) -> (f64, f64) {
    match ctrl {
        Some((cx, cy)) => (2.0 * cursor.0 - cx, 2.0 * cursor.1 - cy),
        None => cursor,
    }
}

/// Append points sampled along an elliptical arc (endpoint form converted
/// to center form).
#[allow(clippy::too_many_arguments)]
fn sample_arc(
    points: &mut Vec<(f64, f64)>,
    from: (f64, f64),
    to: (f64, f64),
    rx: f64,
    ry: f64,
    rotation_deg: f64,
    large_arc: bool,
    sweep: bool,
) {
    let mut rx = rx.abs();
    let mut ry = ry.abs();
    if rx == 0.0 || ry == 0.0 || from == to {
        // Degenerate arcs render as straight lines; endpoints suffice.
        return;
    }

    let phi = rotation_deg.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    let dx2 = (from.0 - to.0) / 2.0;
    let dy2 = (from.1 - to.1) / 2.0;
    let x1p = cos_phi * dx2 + sin_phi * dy2;
    let y1p = -sin_phi * dx2 + cos_phi * dy2;

    // Scale radii up if the endpoints cannot be connected otherwise.
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    let num = rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p;
    let den = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
    let mut coef = if den == 0.0 { 0.0 } else { (num / den).max(0.0).sqrt() };
    if large_arc == sweep {
        coef = -coef;
    }
    let cxp = coef * (rx * y1p / ry);
    let cyp = coef * (-(ry * x1p) / rx);

    let cx = cos_phi * cxp - sin_phi * cyp + (from.0 + to.0) / 2.0;
    let cy = sin_phi * cxp + cos_phi * cyp + (from.1 + to.1) / 2.0;

    let start = vector_angle(1.0, 0.0, (x1p - cxp) / rx, (y1p - cyp) / ry);
    let mut delta = vector_angle(
        (x1p - cxp) / rx,
        (y1p - cyp) / ry,
        (-x1p - cxp) / rx,
        (-y1p - cyp) / ry,
    );
    if !sweep && delta > 0.0 {
        delta -= std::f64::consts::TAU;
    } else if sweep && delta < 0.0 {
        delta += std::f64::consts::TAU;
    }

    for i in 1..ARC_SAMPLES {
        let theta = start + delta * (i as f64) / (ARC_SAMPLES as f64);
        let (sin_t, cos_t) = theta.sin_cos();
        points.push((
            cx + rx * cos_t * cos_phi - ry * sin_t * sin_phi,
            cy + rx * cos_t * sin_phi + ry * sin_t * cos_phi,
        ));
    }
}

/// Signed angle between two vectors.
fn vector_angle(ux: f64, uy: f64, vx: f64, vy: f64) -> f64 {
    let dot = ux * vx + uy * vy;
    let len = (ux * ux + uy * uy).sqrt() * (vx * vx + vy * vy).sqrt();
    if len == 0.0 {
        return 0.0;
    }
    let angle = (dot / len).clamp(-1.0, 1.0).acos();
    if ux * vy - uy * vx < 0.0 { -angle } else { angle }
}

// ----------------------------------------------------------------------------
// Lexer
// ----------------------------------------------------------------------------

struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(d: &'a str) -> Self {
        Self {
            bytes: d.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn skip_separators(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || b == b',' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Parse one number. At most one decimal point belongs to a number, so
    /// `1.5.5` scans as `1.5` followed by `.5`.
    fn number(&mut self) -> Result<f64, PathDataError> {
        self.skip_separators();
        let start = self.pos;
        let b = self.bytes;
        let mut i = self.pos;

        if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
            i += 1;
        }
        let mut saw_digit = false;
        let mut saw_dot = false;
        while i < b.len() {
            match b[i] {
                b'0'..=b'9' => {
                    saw_digit = true;
                    i += 1;
                }
                b'.' if !saw_dot => {
                    saw_dot = true;
                    i += 1;
                }
                _ => break,
            }
        }
        if saw_digit && i < b.len() && (b[i] == b'e' || b[i] == b'E') {
            let mut j = i + 1;
            if j < b.len() && (b[j] == b'+' || b[j] == b'-') {
                j += 1;
            }
            let mut exp_digits = false;
            while j < b.len() && b[j].is_ascii_digit() {
                exp_digits = true;
                j += 1;
            }
            if exp_digits {
                i = j;
            }
        }

        if !saw_digit {
            return Err(if start >= b.len() {
                PathDataError::Truncated
            } else {
                PathDataError::InvalidNumber(start)
            });
        }

        let tok = std::str::from_utf8(&b[start..i]).map_err(|_| PathDataError::InvalidNumber(start))?;
        let value = tok
            .parse::<f64>()
            .map_err(|_| PathDataError::InvalidNumber(start))?;
        self.pos = i;
        Ok(value)
    }

    /// Parse an arc flag: a single `0` or `1`, possibly unseparated from the
    /// number that follows.
    fn flag(&mut self) -> Result<bool, PathDataError> {
        self.skip_separators();
        match self.peek() {
            Some(b'0') => {
                self.advance();
                Ok(false)
            }
            Some(b'1') => {
                self.advance();
                Ok(true)
            }
            Some(_) => Err(PathDataError::InvalidFlag(self.pos)),
            None => Err(PathDataError::Truncated),
        }
    }

    fn point(&mut self, cursor: (f64, f64), relative: bool) -> Result<(f64, f64), PathDataError> {
        let x = self.number()?;
        let y = self.number()?;
        if relative {
            Ok((cursor.0 + x, cursor.1 + y))
        } else {
            Ok((x, y))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hull(d: &str) -> (f64, f64, f64, f64) {
        let pts = control_points(d).unwrap();
        assert!(!pts.is_empty());
        pts.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        )
    }

    #[test]
    fn test_absolute_rect_path() {
        let (x0, y0, x1, y1) = hull("M 0 0 H 10 V 5 H 0 Z");
        assert_eq!((x0, y0, x1, y1), (0.0, 0.0, 10.0, 5.0));
    }

    #[test]
    fn test_relative_commands() {
        let (x0, y0, x1, y1) = hull("m 5,5 l 10,0 v 5 h -10 z");
        assert_eq!((x0, y0, x1, y1), (5.0, 5.0, 15.0, 10.0));
    }

    #[test]
    fn test_implicit_lineto_after_move() {
        let (x0, y0, x1, y1) = hull("M 0 0 10 0 10 10");
        assert_eq!((x0, y0, x1, y1), (0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_cubic_controls_extend_hull() {
        let (_, y0, _, y1) = hull("M 0 0 C 0 10 10 10 10 0");
        assert_eq!(y1, 10.0);
        assert_eq!(y0, 0.0);
    }

    #[test]
    fn test_smooth_cubic_includes_reflection() {
        // S after C reflects (10,10) about (10,0), pushing the hull to -10
        let (_, y0, _, _) = hull("M 0 0 C 0 10 10 10 10 0 S 20 -10 20 0");
        assert_eq!(y0, -10.0);
    }

    #[test]
    fn test_arc_bulge_is_sampled() {
        let (x0, y0, x1, _) = hull("M 0 0 A 5 5 0 0 1 10 0");
        assert_eq!((x0, x1), (0.0, 10.0));
        assert!(y0 < -4.9, "arc bulge missing, min_y = {y0}");
    }

    #[test]
    fn test_compact_number_runs() {
        // Negative numbers may follow without separators
        let (x0, y0, x1, y1) = hull("M10-5L-10 5");
        assert_eq!((x0, y0, x1, y1), (-10.0, -5.0, 10.0, 5.0));
    }

    #[test]
    fn test_unseparated_arc_flags() {
        let pts = control_points("M 0 0 a25 25 0 0110 25").unwrap();
        let (ex, ey) = *pts.last().unwrap();
        assert_eq!((ex, ey), (10.0, 25.0));
    }

    #[test]
    fn test_errors() {
        assert_eq!(control_points("10 20 L 5 5"), Err(PathDataError::MissingMove));
        assert!(matches!(
            control_points("M 0 0 L 5"),
            Err(PathDataError::Truncated)
        ));
        assert!(matches!(
            control_points("M 0 0 W 5 5"),
            Err(PathDataError::UnknownCommand('W'))
        ));
        assert!(matches!(
            control_points("M 0 0 A 5 5 0 2 0 1 1"),
            Err(PathDataError::InvalidFlag(_))
        ));
    }

    #[test]
    fn test_empty_is_ok_and_pointless() {
        assert_eq!(control_points("").unwrap(), Vec::new());
        assert_eq!(control_points("   ").unwrap(), Vec::new());
    }
}
