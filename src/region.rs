// gridcut/src/region.rs
//! Cut region shapes and their per-bin predicates.

use crate::grid::BinGeometry;
use std::fmt;

/// Shape family currently being edited. "No mode" is `Option::<CutMode>::None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CutMode {
    Rectangle,
    BandX,
    BandY,
    InverseRectangle,
    AngledBand,
    SingleBin,
}

impl CutMode {
    pub const ALL: [CutMode; 6] = [
        CutMode::Rectangle,
        CutMode::BandX,
        CutMode::BandY,
        CutMode::InverseRectangle,
        CutMode::AngledBand,
        CutMode::SingleBin,
    ];

    /// Maps keys `'1'..='6'` to a mode.
    pub fn from_key(key: char) -> Option<CutMode> {
        match key {
            '1' => Some(CutMode::Rectangle),
            '2' => Some(CutMode::BandX),
            '3' => Some(CutMode::BandY),
            '4' => Some(CutMode::InverseRectangle),
            '5' => Some(CutMode::AngledBand),
            '6' => Some(CutMode::SingleBin),
            _ => None,
        }
    }

    pub fn key(&self) -> char {
        match self {
            CutMode::Rectangle => '1',
            CutMode::BandX => '2',
            CutMode::BandY => '3',
            CutMode::InverseRectangle => '4',
            CutMode::AngledBand => '5',
            CutMode::SingleBin => '6',
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CutMode::Rectangle => "rectangle",
            CutMode::BandX => "x band",
            CutMode::BandY => "y band",
            CutMode::InverseRectangle => "inverse rectangle",
            CutMode::AngledBand => "angled band",
            CutMode::SingleBin => "single bin",
        }
    }
}

impl fmt::Display for CutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A point in data coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The line `y = shift_y + tan_alpha * x`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub tan_alpha: f64,
    pub shift_y: f64,
}

impl Line {
    /// Line through two points, `None` when they share the same x.
    pub fn through(a: Point, b: Point) -> Option<Line> {
        let dx = a.x - b.x;
        if dx == 0.0 || !dx.is_finite() {
            return None;
        }
        let tan_alpha = (a.y - b.y) / dx;
        Some(Line {
            tan_alpha,
            shift_y: b.y - b.x * tan_alpha,
        })
    }

    pub fn at(&self, x: f64) -> f64 {
        self.shift_y + x * self.tan_alpha
    }
}

/// A completed cut region. Boundaries of the axis-aligned shapes sit on bin edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CutRegion {
    Rectangle {
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    },
    /// Bounds of the kept interior.
    InverseRectangle {
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    },
    BandX {
        x_min: f64,
        x_max: f64,
    },
    BandY {
        y_min: f64,
        y_max: f64,
    },
    AngledBand {
        first: Line,
        second: Line,
    },
    SingleBin {
        x: f64,
        y: f64,
    },
}

impl CutRegion {
    pub fn mode(&self) -> CutMode {
        match self {
            CutRegion::Rectangle { .. } => CutMode::Rectangle,
            CutRegion::InverseRectangle { .. } => CutMode::InverseRectangle,
            CutRegion::BandX { .. } => CutMode::BandX,
            CutRegion::BandY { .. } => CutMode::BandY,
            CutRegion::AngledBand { .. } => CutMode::AngledBand,
            CutRegion::SingleBin { .. } => CutMode::SingleBin,
        }
    }

    /// Whether this region rejects `bin`.
    pub fn cuts(&self, bin: &BinGeometry) -> bool {
        let (x, y) = (bin.center_x, bin.center_y);
        match *self {
            CutRegion::Rectangle {
                x_min,
                x_max,
                y_min,
                y_max,
            } => x > x_min && x < x_max && y > y_min && y < y_max,
            CutRegion::InverseRectangle {
                x_min,
                x_max,
                y_min,
                y_max,
            } => x > x_max || x < x_min || y > y_max || y < y_min,
            CutRegion::BandX { x_min, x_max } => x > x_min && x < x_max,
            CutRegion::BandY { y_min, y_max } => y > y_min && y < y_max,
            CutRegion::AngledBand { first, second } => {
                let y1 = first.at(x);
                let y2 = second.at(x);
                y > y1.min(y2) && y < y1.max(y2)
            }
            CutRegion::SingleBin { x: px, y: py } => {
                px >= bin.x_min && px < bin.x_max && py >= bin.y_min && py < bin.y_max
            }
        }
    }
}

impl fmt::Display for CutRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CutRegion::Rectangle {
                x_min,
                x_max,
                y_min,
                y_max,
            } => write!(f, "rectangle x [{}, {}] y [{}, {}]", x_min, x_max, y_min, y_max),
            CutRegion::InverseRectangle {
                x_min,
                x_max,
                y_min,
                y_max,
            } => write!(
                f,
                "keep only x [{}, {}] y [{}, {}]",
                x_min, x_max, y_min, y_max
            ),
            CutRegion::BandX { x_min, x_max } => write!(f, "x band [{}, {}]", x_min, x_max),
            CutRegion::BandY { y_min, y_max } => write!(f, "y band [{}, {}]", y_min, y_max),
            CutRegion::AngledBand { first, second } => write!(
                f,
                "band between y = {:.4} + {:.4}x and y = {:.4} + {:.4}x",
                first.shift_y, first.tan_alpha, second.shift_y, second.tan_alpha
            ),
            CutRegion::SingleBin { x, y } => write!(f, "bin at ({}, {})", x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(cx: f64, cy: f64) -> BinGeometry {
        BinGeometry {
            ix: 0,
            iy: 0,
            center_x: cx,
            center_y: cy,
            x_min: cx - 0.5,
            x_max: cx + 0.5,
            y_min: cy - 0.5,
            y_max: cy + 0.5,
        }
    }

    #[test]
    fn test_mode_keys() {
        for mode in CutMode::ALL {
            assert_eq!(CutMode::from_key(mode.key()), Some(mode));
        }
        assert_eq!(CutMode::from_key('0'), None);
        assert_eq!(CutMode::from_key('u'), None);
    }

    #[test]
    fn test_line_through() {
        let line = Line::through(Point::new(0.0, 1.0), Point::new(2.0, 5.0)).unwrap();
        assert_eq!(line.tan_alpha, 2.0);
        assert_eq!(line.shift_y, 1.0);
        assert_eq!(line.at(1.0), 3.0);
        assert!(Line::through(Point::new(1.0, 0.0), Point::new(1.0, 3.0)).is_none());
    }

    #[test]
    fn test_rectangle_and_inverse() {
        let rect = CutRegion::Rectangle {
            x_min: 1.0,
            x_max: 3.0,
            y_min: 1.0,
            y_max: 3.0,
        };
        assert!(rect.cuts(&bin(1.5, 2.5)));
        assert!(!rect.cuts(&bin(0.5, 1.5)));

        let inverse = CutRegion::InverseRectangle {
            x_min: 1.0,
            x_max: 3.0,
            y_min: 1.0,
            y_max: 3.0,
        };
        assert!(!inverse.cuts(&bin(1.5, 2.5)));
        assert!(inverse.cuts(&bin(0.5, 1.5)));
        assert!(inverse.cuts(&bin(1.5, 3.5)));
    }

    #[test]
    fn test_bands() {
        let band_x = CutRegion::BandX {
            x_min: 2.0,
            x_max: 4.0,
        };
        assert!(band_x.cuts(&bin(2.5, 100.0)));
        assert!(!band_x.cuts(&bin(4.5, 0.5)));

        let band_y = CutRegion::BandY {
            y_min: -1.0,
            y_max: 1.0,
        };
        assert!(band_y.cuts(&bin(-50.0, 0.5)));
        assert!(!band_y.cuts(&bin(0.5, 1.5)));
    }

    #[test]
    fn test_angled_band_ignores_line_order() {
        let low = Line {
            tan_alpha: 1.0,
            shift_y: 0.0,
        };
        let high = Line {
            tan_alpha: 1.0,
            shift_y: 2.0,
        };
        let forward = CutRegion::AngledBand {
            first: low,
            second: high,
        };
        let backward = CutRegion::AngledBand {
            first: high,
            second: low,
        };
        for region in [forward, backward] {
            assert!(region.cuts(&bin(1.5, 2.5)));
            assert!(!region.cuts(&bin(1.5, 0.5)));
            assert!(!region.cuts(&bin(1.5, 3.5)));
        }
    }

    #[test]
    fn test_single_bin_contains_point() {
        let single = CutRegion::SingleBin { x: 0.2, y: 0.2 };
        assert!(single.cuts(&bin(0.5, 0.5)));
        assert!(!single.cuts(&bin(1.5, 0.5)));
    }
}
