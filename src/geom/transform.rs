//! Affine transform parsing, composition, and serialization.
//!
//! A transform is the standard SVG 2×3 matrix `[a c e; b d f]` mapping
//! `x' = a*x + c*y + e`, `y' = b*x + d*y + f`. The parser accepts the full
//! `transform` attribute grammar (`matrix`, `translate`, `scale`, `rotate`,
//! `skewX`, `skewY`, and whitespace/comma separated lists of them) and
//! normalizes everything to the 6-scalar form.

use std::fmt;
use std::ops::Mul;
use thiserror::Error;

/// Errors produced while parsing a `transform` attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("unknown transform function `{0}`")]
    UnknownFunction(String),

    #[error("invalid number `{0}` in transform")]
    InvalidNumber(String),

    #[error("`{name}` takes {expected} arguments, got {got}")]
    ArgumentCount {
        name: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("unbalanced parentheses in transform")]
    Unbalanced,
}

/// 2D affine transform. The implicit bottom matrix row is `[0 0 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Pure translation.
    #[must_use]
    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: tx,
            f: ty,
        }
    }

    /// Parse a `transform` attribute value.
    ///
    /// A list of transform functions multiplies out left to right, so the
    /// right-most function applies to coordinates first (SVG semantics).
    /// An empty or whitespace-only value is the identity.
    pub fn parse(expr: &str) -> Result<Self, TransformError> {
        let mut result = Self::IDENTITY;
        let mut rest = expr.trim_start();

        while !rest.is_empty() {
            let open = rest.find('(').ok_or(TransformError::Unbalanced)?;
            let close = rest[open..]
                .find(')')
                .map(|i| i + open)
                .ok_or(TransformError::Unbalanced)?;

            let name = rest[..open].trim();
            let args = parse_numbers(&rest[open + 1..close])?;
            result = result * Self::from_function(name, &args)?;

            rest = rest[close + 1..].trim_start();
            if let Some(after_comma) = rest.strip_prefix(',') {
                rest = after_comma.trim_start();
            }
        }

        Ok(result)
    }

    /// Build a single transform function from its parsed arguments.
    fn from_function(name: &str, args: &[f64]) -> Result<Self, TransformError> {
        match name {
            "matrix" => match args {
                [a, b, c, d, e, f] => Ok(Self {
                    a: *a,
                    b: *b,
                    c: *c,
                    d: *d,
                    e: *e,
                    f: *f,
                }),
                _ => Err(TransformError::ArgumentCount {
                    name: "matrix",
                    expected: "6",
                    got: args.len(),
                }),
            },
            "translate" => match args {
                [tx] => Ok(Self::translation(*tx, 0.0)),
                [tx, ty] => Ok(Self::translation(*tx, *ty)),
                _ => Err(TransformError::ArgumentCount {
                    name: "translate",
                    expected: "1 or 2",
                    got: args.len(),
                }),
            },
            "scale" => match args {
                [s] => Ok(Self::scaling(*s, *s)),
                [sx, sy] => Ok(Self::scaling(*sx, *sy)),
                _ => Err(TransformError::ArgumentCount {
                    name: "scale",
                    expected: "1 or 2",
                    got: args.len(),
                }),
            },
            "rotate" => match args {
                [deg] => Ok(Self::rotation(*deg)),
                [deg, cx, cy] => Ok(Self::translation(*cx, *cy)
                    * Self::rotation(*deg)
                    * Self::translation(-cx, -cy)),
                _ => Err(TransformError::ArgumentCount {
                    name: "rotate",
                    expected: "1 or 3",
                    got: args.len(),
                }),
            },
            "skewX" => match args {
                [deg] => Ok(Self {
                    c: deg.to_radians().tan(),
                    ..Self::IDENTITY
                }),
                _ => Err(TransformError::ArgumentCount {
                    name: "skewX",
                    expected: "1",
                    got: args.len(),
                }),
            },
            "skewY" => match args {
                [deg] => Ok(Self {
                    b: deg.to_radians().tan(),
                    ..Self::IDENTITY
                }),
                _ => Err(TransformError::ArgumentCount {
                    name: "skewY",
                    expected: "1",
                    got: args.len(),
                }),
            },
            other => Err(TransformError::UnknownFunction(other.to_string())),
        }
    }

    const fn scaling(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            e: 0.0,
            f: 0.0,
        }
    }

    fn rotation(deg: f64) -> Self {
        let (sin, cos) = deg.to_radians().sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Returns a copy with `dx`/`dy` added to the translation components.
    ///
    /// The linear part (`a`..`d`) is left untouched: the result shifts the
    /// mapped output in the parent coordinate space by exactly `(dx, dy)`.
    /// This is NOT a translation in the element's own (possibly rotated or
    /// scaled) frame; that would be a full matrix product instead.
    #[must_use]
    pub const fn with_translation(&self, dx: f64, dy: f64) -> Self {
        Self {
            e: self.e + dx,
            f: self.f + dy,
            ..*self
        }
    }

    /// Apply the transform to a point.
    #[must_use]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Serialize to the canonical `matrix(a b c d e f)` form.
    #[must_use]
    pub fn to_svg(&self) -> String {
        self.to_string()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform {
    type Output = Self;

    /// Matrix product `self × rhs` (`rhs` applies to coordinates first).
    fn mul(self, rhs: Self) -> Self {
        Self {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            e: self.a * rhs.e + self.c * rhs.f + self.e,
            f: self.b * rhs.e + self.d * rhs.f + self.f,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "matrix({} {} {} {} {} {})",
            self.a, self.b, self.c, self.d, self.e, self.f
        )
    }
}

/// Split a transform argument list on whitespace and commas.
fn parse_numbers(s: &str) -> Result<Vec<f64>, TransformError> {
    s.split(|ch: char| ch.is_ascii_whitespace() || ch == ',')
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            tok.parse::<f64>()
                .map_err(|_| TransformError::InvalidNumber(tok.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(t: Transform, want: [f64; 6]) {
        let got = [t.a, t.b, t.c, t.d, t.e, t.f];
        for (g, w) in got.iter().zip(want.iter()) {
            assert!((g - w).abs() < EPS, "got {got:?}, want {want:?}");
        }
    }

    #[test]
    fn test_parse_matrix() {
        let t = Transform::parse("matrix(1 2 3 4 5 6)").unwrap();
        assert_close(t, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_parse_matrix_with_commas() {
        let t = Transform::parse("matrix(1,2,3,4,5,6)").unwrap();
        assert_close(t, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_parse_translate() {
        assert_close(
            Transform::parse("translate(10)").unwrap(),
            [1.0, 0.0, 0.0, 1.0, 10.0, 0.0],
        );
        assert_close(
            Transform::parse("translate(10, -4.5)").unwrap(),
            [1.0, 0.0, 0.0, 1.0, 10.0, -4.5],
        );
    }

    #[test]
    fn test_parse_scale_and_skew() {
        assert_close(
            Transform::parse("scale(2)").unwrap(),
            [2.0, 0.0, 0.0, 2.0, 0.0, 0.0],
        );
        assert_close(
            Transform::parse("scale(2 3)").unwrap(),
            [2.0, 0.0, 0.0, 3.0, 0.0, 0.0],
        );
        let t = Transform::parse("skewX(45)").unwrap();
        assert!((t.c - 1.0).abs() < EPS);
        let t = Transform::parse("skewY(45)").unwrap();
        assert!((t.b - 1.0).abs() < EPS);
    }

    #[test]
    fn test_parse_rotate_about_center() {
        let t = Transform::parse("rotate(90 10 10)").unwrap();
        let (x, y) = t.apply(10.0, 10.0);
        assert!((x - 10.0).abs() < EPS);
        assert!((y - 10.0).abs() < EPS);
        let (x, y) = t.apply(20.0, 10.0);
        assert!((x - 10.0).abs() < EPS);
        assert!((y - 20.0).abs() < EPS);
    }

    #[test]
    fn test_parse_list_applies_right_to_left() {
        let t = Transform::parse("translate(10 0) scale(2)").unwrap();
        let (x, y) = t.apply(1.0, 0.0);
        assert!((x - 12.0).abs() < EPS);
        assert!(y.abs() < EPS);
    }

    #[test]
    fn test_parse_empty_is_identity() {
        assert_eq!(Transform::parse("").unwrap(), Transform::IDENTITY);
        assert_eq!(Transform::parse("   ").unwrap(), Transform::IDENTITY);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Transform::parse("spin(90)"),
            Err(TransformError::UnknownFunction(_))
        ));
        assert!(matches!(
            Transform::parse("translate(abc)"),
            Err(TransformError::InvalidNumber(_))
        ));
        assert!(matches!(
            Transform::parse("matrix(1 2 3)"),
            Err(TransformError::ArgumentCount { .. })
        ));
        assert!(matches!(
            Transform::parse("translate(1, 2"),
            Err(TransformError::Unbalanced)
        ));
    }

    #[test]
    fn test_serialize_parse_round_trip() {
        let t = Transform {
            a: 0.5,
            b: -1.25,
            c: 3.0,
            d: 4.0,
            e: -1034.75,
            f: 2.5e-3,
        };
        let parsed = Transform::parse(&t.to_svg()).unwrap();
        assert_eq!(parsed, t);
    }

    #[test]
    fn test_with_translation_ignores_linear_part() {
        let rotated = Transform::parse("rotate(30)").unwrap();
        let shifted = rotated.with_translation(100.0, 200.0);
        assert_eq!(shifted.a, rotated.a);
        assert_eq!(shifted.b, rotated.b);
        assert_eq!(shifted.c, rotated.c);
        assert_eq!(shifted.d, rotated.d);
        assert!((shifted.e - 100.0).abs() < EPS);
        assert!((shifted.f - 200.0).abs() < EPS);
    }
}
