//! # Page Backgrounds
//!
//! A [`Background`] describes the backdrop drawn behind a page's markup. Every
//! variant carries all of the colors and metrics needed to regenerate its
//! tiled pattern, so a persisted page renders identically without any
//! external state.
//!
//! ## Variants
//!
//! | Variant | Fields | Tile |
//! |---------|--------|------|
//! | `plain` | `color` | none, solid fill |
//! | `dotted` | `dot_color`, `background_color`, `spacing`, `dot_size` | `spacing × spacing`, centered dot |
//! | `grid` | `line_color`, `background_color`, `spacing`, `line_width` | `spacing × spacing`, right + bottom edge |
//! | `lined` | `line_color`, `background_color`, `spacing`, `line_width` | `10 × spacing`, bottom edge |
//!
//! ## Persisted Shape
//!
//! Backgrounds serialize as an internally tagged object:
//!
//! ```text
//! { "type": "dotted", "dotColor": {...}, "backgroundColor": {...}, "spacing": 20.0, "dotSize": 2.0 }
//! ```
//!
//! Unknown tags fail deserialization, which the codec reports as a decode error.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Size};

pub const DEFAULT_DOT_SPACING: f64 = 20.0;
pub const DEFAULT_DOT_SIZE: f64 = 2.0;
pub const DEFAULT_GRID_SPACING: f64 = 20.0;
pub const DEFAULT_LINED_SPACING: f64 = 24.0;
pub const DEFAULT_LINE_WIDTH: f64 = 0.5;

/// Width of a lined tile. Horizontal lines repeat along x, so any width works.
const LINED_TILE_WIDTH: f64 = 10.0;

/// RGBA color, each channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const LIGHT_GRAY: Color = Color::rgb(0.8, 0.8, 0.8);

    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 1.0,
        }
    }

    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Copy with every channel clamped into `0.0..=1.0`.
    pub fn is_finite(&self) -> bool {
        [self.red, self.green, self.blue, self.alpha]
            .iter()
            .all(|v| v.is_finite())
    }

    pub fn clamped(self) -> Self {
        let c = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self {
            red: c(self.red),
            green: c(self.green),
            blue: c(self.blue),
            alpha: c(self.alpha),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Background {
    Plain {
        color: Color,
    },
    Dotted {
        dot_color: Color,
        background_color: Color,
        spacing: f64,
        dot_size: f64,
    },
    Grid {
        line_color: Color,
        background_color: Color,
        spacing: f64,
        line_width: f64,
    },
    Lined {
        line_color: Color,
        background_color: Color,
        spacing: f64,
        line_width: f64,
    },
}

impl Default for Background {
    fn default() -> Self {
        Background::Plain {
            color: Color::WHITE,
        }
    }
}

/// One primitive of a pattern tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TileMark {
    /// Filled ellipse inscribed in the rect.
    Dot(Rect),
    /// Stroked segment.
    Line { from: Point, to: Point, width: f64 },
}

/// Everything needed to paint one repeat of a background pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternTile {
    pub size: Size,
    pub fill: Color,
    pub mark_color: Color,
    pub marks: Vec<TileMark>,
}

impl Background {
    pub fn plain(color: Color) -> Self {
        Background::Plain { color }
    }

    pub fn dotted(dot_color: Color, background_color: Color) -> Self {
        Background::Dotted {
            dot_color,
            background_color,
            spacing: DEFAULT_DOT_SPACING,
            dot_size: DEFAULT_DOT_SIZE,
        }
    }

    pub fn grid(line_color: Color, background_color: Color) -> Self {
        Background::Grid {
            line_color,
            background_color,
            spacing: DEFAULT_GRID_SPACING,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }

    pub fn lined(line_color: Color, background_color: Color) -> Self {
        Background::Lined {
            line_color,
            background_color,
            spacing: DEFAULT_LINED_SPACING,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }

    /// The solid color behind the pattern. Defined for every variant.
    pub fn background_color(&self) -> Color {
        match *self {
            Background::Plain { color } => color,
            Background::Dotted {
                background_color, ..
            }
            | Background::Grid {
                background_color, ..
            }
            | Background::Lined {
                background_color, ..
            } => background_color,
        }
    }

    /// Whether every color channel and metric is a finite number. Only
    /// finite backgrounds survive the JSON document format.
    pub fn is_finite(&self) -> bool {
        match *self {
            Background::Plain { color } => color.is_finite(),
            Background::Dotted {
                dot_color: mark,
                background_color,
                spacing,
                dot_size: width,
            }
            | Background::Grid {
                line_color: mark,
                background_color,
                spacing,
                line_width: width,
            }
            | Background::Lined {
                line_color: mark,
                background_color,
                spacing,
                line_width: width,
            } => {
                mark.is_finite()
                    && background_color.is_finite()
                    && spacing.is_finite()
                    && width.is_finite()
            }
        }
    }

    /// Stable tag used in the persisted format and in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Background::Plain { .. } => "plain",
            Background::Dotted { .. } => "dotted",
            Background::Grid { .. } => "grid",
            Background::Lined { .. } => "lined",
        }
    }

    /// Tile geometry for patterned variants; `None` for `plain`, and for
    /// patterns whose spacing is not a positive finite number.
    pub fn pattern_tile(&self) -> Option<PatternTile> {
        match *self {
            Background::Plain { .. } => None,
            Background::Dotted {
                dot_color,
                background_color,
                spacing,
                dot_size,
            } => {
                let spacing = valid_spacing(spacing)?;
                let offset = (spacing - dot_size) / 2.0;
                Some(PatternTile {
                    size: Size::new(spacing, spacing),
                    fill: background_color,
                    mark_color: dot_color,
                    marks: vec![TileMark::Dot(Rect::new(offset, offset, dot_size, dot_size))],
                })
            }
            Background::Grid {
                line_color,
                background_color,
                spacing,
                line_width,
            } => {
                let spacing = valid_spacing(spacing)?;
                let edge = spacing - line_width / 2.0;
                Some(PatternTile {
                    size: Size::new(spacing, spacing),
                    fill: background_color,
                    mark_color: line_color,
                    marks: vec![
                        TileMark::Line {
                            from: Point::new(edge, 0.0),
                            to: Point::new(edge, spacing),
                            width: line_width,
                        },
                        TileMark::Line {
                            from: Point::new(0.0, edge),
                            to: Point::new(spacing, edge),
                            width: line_width,
                        },
                    ],
                })
            }
            Background::Lined {
                line_color,
                background_color,
                spacing,
                line_width,
            } => {
                let spacing = valid_spacing(spacing)?;
                let edge = spacing - line_width / 2.0;
                Some(PatternTile {
                    size: Size::new(LINED_TILE_WIDTH, spacing),
                    fill: background_color,
                    mark_color: line_color,
                    marks: vec![TileMark::Line {
                        from: Point::new(0.0, edge),
                        to: Point::new(LINED_TILE_WIDTH, edge),
                        width: line_width,
                    }],
                })
            }
        }
    }
}

fn valid_spacing(spacing: f64) -> Option<f64> {
    (spacing.is_finite() && spacing > 0.0).then_some(spacing)
}
