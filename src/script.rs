//! Annotation scripts: a TOML list of annotations applied non-interactively.
//!
//! ```toml
//! [[annotation]]
//! kind = "arrow"
//! from = [10, 10]
//! to = [120, 40]
//! color = "blue"
//!
//! [[annotation]]
//! kind = "pen"
//! points = [[5, 5], [20, 8], [40, 30]]
//! thickness = 2.0
//!
//! [[annotation]]
//! kind = "text"
//! at = [200, 50]
//! text = "look here"
//! size = 18.0
//! ```
//!
//! Coordinates are full-screenshot pixels. Color, thickness and font size fall back to
//! the current [`DrawingSettings`].

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use crate::config::{ColorSpec, THICKNESS_RANGE};
use crate::draw::filters::{
    Arrow, Circle, DottedLine, Pen, Rectangle, ShieldBlock, StraightLine, Text,
};
use crate::draw::font::RasterizeError;
use crate::draw::{Color, Filter, TextRasterizer};
use crate::geometry::Point;
use crate::session::DrawingSettings;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to read annotation script {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid annotation script: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Annotation #{index}: {field} must be a positive number, got {value}")]
    InvalidNumber {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("Annotation #{index}: thickness must be between 1 and 50, got {value}")]
    ThicknessOutOfRange { index: usize, value: f64 },

    #[error("Annotation #{0}: a pen stroke needs at least one point")]
    EmptyPen(usize),

    #[error("Annotation #{index}: failed to render text: {source}")]
    Rasterize {
        index: usize,
        #[source]
        source: RasterizeError,
    },
}

/// Two-point shape: arrow, line, dotted line, rectangle, shield block or circle.
#[derive(Debug, Clone, Deserialize)]
pub struct ShapeSpec {
    pub from: [i32; 2],
    pub to: [i32; 2],
    #[serde(default)]
    pub color: Option<ColorSpec>,
    #[serde(default)]
    pub thickness: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PenSpec {
    pub points: Vec<[i32; 2]>,
    #[serde(default)]
    pub color: Option<ColorSpec>,
    #[serde(default)]
    pub thickness: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextSpec {
    /// Center of the text.
    pub at: [i32; 2],
    pub text: String,
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub color: Option<ColorSpec>,
    #[serde(default)]
    pub background: Option<ColorSpec>,
}

/// One `[[annotation]]` table, selected by its `kind` key.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AnnotationSpec {
    Arrow(ShapeSpec),
    Line(ShapeSpec),
    DottedLine(ShapeSpec),
    Rectangle(ShapeSpec),
    ShieldBlock(ShapeSpec),
    Circle(ShapeSpec),
    Pen(PenSpec),
    Text(TextSpec),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnotationScript {
    #[serde(default, rename = "annotation")]
    pub annotations: Vec<AnnotationSpec>,
}

impl AnnotationScript {
    pub fn from_toml(text: &str) -> Result<Self, ScriptError> {
        let script: AnnotationScript = toml::from_str(text)?;
        debug!("parsed {} annotations", script.annotations.len());
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let script = Self::from_toml(&text)?;
        info!(
            "Loaded {} annotations from {}",
            script.annotations.len(),
            path.display()
        );
        Ok(script)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Builds the filters in script order. Text is rasterized here, once.
    pub fn to_filters(
        &self,
        defaults: &DrawingSettings,
        rasterizer: &dyn TextRasterizer,
    ) -> Result<Vec<Filter>, ScriptError> {
        self.annotations
            .iter()
            .enumerate()
            .map(|(index, spec)| build_filter(index, spec, defaults, rasterizer))
            .collect()
    }
}

fn build_filter(
    index: usize,
    spec: &AnnotationSpec,
    defaults: &DrawingSettings,
    rasterizer: &dyn TextRasterizer,
) -> Result<Filter, ScriptError> {
    let filter = match spec {
        AnnotationSpec::Arrow(shape) => {
            let (from, to, color, thickness) = shape_params(index, shape, defaults)?;
            Filter::Arrow(Arrow::new(from, to, color, thickness))
        }
        AnnotationSpec::Line(shape) => {
            let (from, to, color, thickness) = shape_params(index, shape, defaults)?;
            Filter::StraightLine(StraightLine::new(from, to, color, thickness))
        }
        AnnotationSpec::DottedLine(shape) => {
            let (from, to, color, thickness) = shape_params(index, shape, defaults)?;
            Filter::DottedLine(DottedLine::new(from, to, color, thickness))
        }
        AnnotationSpec::Rectangle(shape) => {
            let (from, to, color, thickness) = shape_params(index, shape, defaults)?;
            Filter::Rectangle(Rectangle::new(from, to, color, thickness))
        }
        AnnotationSpec::ShieldBlock(shape) => {
            let (from, to, color, _) = shape_params(index, shape, defaults)?;
            Filter::ShieldBlock(ShieldBlock::new(from, to, color))
        }
        AnnotationSpec::Circle(shape) => {
            let (from, to, color, thickness) = shape_params(index, shape, defaults)?;
            Filter::Circle(Circle::new(from, to, color, thickness))
        }
        AnnotationSpec::Pen(pen) => {
            if pen.points.is_empty() {
                return Err(ScriptError::EmptyPen(index));
            }
            let thickness = checked_thickness(index, pen.thickness, defaults.thickness)?;
            let color = color_or(&pen.color, defaults.color);
            let stroke = Pen::new(color, thickness);
            for point in &pen.points {
                stroke.add_point(to_point(*point));
            }
            Filter::Pen(stroke)
        }
        AnnotationSpec::Text(text) => {
            let size = positive(index, "size", text.size, defaults.font_size)?;
            let mask = rasterizer
                .rasterize(&text.text, &defaults.font, size)
                .map_err(|source| ScriptError::Rasterize { index, source })?;
            Filter::Text(Text::new(
                to_point(text.at),
                text.text.as_str(),
                mask,
                size,
                color_or(&text.color, defaults.color),
                color_or(&text.background, defaults.background),
            ))
        }
    };
    debug!("annotation #{}: {}", index, filter.kind_name());
    Ok(filter)
}

fn shape_params(
    index: usize,
    shape: &ShapeSpec,
    defaults: &DrawingSettings,
) -> Result<(Point, Point, Color, f64), ScriptError> {
    let thickness = checked_thickness(index, shape.thickness, defaults.thickness)?;
    Ok((
        to_point(shape.from),
        to_point(shape.to),
        color_or(&shape.color, defaults.color),
        thickness,
    ))
}

fn positive(
    index: usize,
    field: &'static str,
    value: Option<f64>,
    default: f64,
) -> Result<f64, ScriptError> {
    match value {
        None => Ok(default),
        Some(value) if value.is_finite() && value > 0.0 => Ok(value),
        Some(value) => Err(ScriptError::InvalidNumber {
            index,
            field,
            value,
        }),
    }
}

fn checked_thickness(index: usize, value: Option<f64>, default: f64) -> Result<f64, ScriptError> {
    let value = positive(index, "thickness", value, default)?;
    if THICKNESS_RANGE.contains(&value) {
        Ok(value)
    } else {
        Err(ScriptError::ThicknessOutOfRange { index, value })
    }
}

fn color_or(spec: &Option<ColorSpec>, default: Color) -> Color {
    spec.as_ref().map_or(default, ColorSpec::to_color)
}

fn to_point([x, y]: [i32; 2]) -> Point {
    Point::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::draw::color::{BLUE, RED, WHITE};
    use crate::draw::{FontDescriptor, GlyphMask};

    struct SquareRasterizer;

    impl TextRasterizer for SquareRasterizer {
        fn rasterize(
            &self,
            _text: &str,
            _font: &FontDescriptor,
            size: f64,
        ) -> Result<GlyphMask, RasterizeError> {
            let side = size as i32;
            Ok(GlyphMask::new(side, side, vec![255; (side * side) as usize]).unwrap())
        }
    }

    fn defaults() -> DrawingSettings {
        DrawingSettings::from_config(&Config::default())
    }

    #[test]
    fn parses_every_kind_in_order() {
        let script = AnnotationScript::from_toml(
            r#"
            [[annotation]]
            kind = "arrow"
            from = [0, 0]
            to = [50, 0]

            [[annotation]]
            kind = "line"
            from = [0, 0]
            to = [0, 50]
            color = [0, 90, 255]

            [[annotation]]
            kind = "dotted-line"
            from = [0, 0]
            to = [50, 50]

            [[annotation]]
            kind = "rectangle"
            from = [10, 10]
            to = [40, 40]
            thickness = 2.0

            [[annotation]]
            kind = "shield-block"
            from = [60, 60]
            to = [80, 80]
            color = "black"

            [[annotation]]
            kind = "circle"
            from = [0, 0]
            to = [30, 20]

            [[annotation]]
            kind = "pen"
            points = [[1, 1], [10, 1]]

            [[annotation]]
            kind = "text"
            at = [100, 100]
            text = "hello"
            size = 10.0
            "#,
        )
        .unwrap();
        assert_eq!(script.len(), 8);

        let filters = script.to_filters(&defaults(), &SquareRasterizer).unwrap();
        let kinds: Vec<_> = filters.iter().map(Filter::kind_name).collect();
        assert_eq!(
            kinds,
            [
                "arrow",
                "line",
                "dotted line",
                "rectangle",
                "shield block",
                "circle",
                "pen",
                "text"
            ]
        );
        assert_eq!(filters[1].color_at(0, 25, WHITE), BLUE);
        assert_eq!(filters[4].color_at(70, 70, WHITE), Color::rgb(0, 0, 0));
        assert_eq!(filters[7].color_at(100, 100, WHITE), RED);
    }

    #[test]
    fn missing_values_use_drawing_defaults() {
        let script = AnnotationScript::from_toml(
            r#"
            [[annotation]]
            kind = "rectangle"
            from = [0, 0]
            to = [20, 20]
            "#,
        )
        .unwrap();
        let filters = script.to_filters(&defaults(), &SquareRasterizer).unwrap();
        let Filter::Rectangle(rectangle) = &filters[0] else {
            panic!("expected a rectangle");
        };
        assert_eq!(rectangle.color, RED);
        assert_eq!(rectangle.thickness(), 3.0);
    }

    #[test]
    fn empty_script_has_no_annotations() {
        let script = AnnotationScript::from_toml("").unwrap();
        assert!(script.is_empty());
    }

    #[test]
    fn rejects_unknown_kind_and_bad_values() {
        assert!(matches!(
            AnnotationScript::from_toml("[[annotation]]\nkind = \"star\"\n"),
            Err(ScriptError::Parse(_))
        ));

        let script = AnnotationScript::from_toml(
            "[[annotation]]\nkind = \"line\"\nfrom = [0, 0]\nto = [1, 1]\nthickness = -1.0\n",
        )
        .unwrap();
        assert!(matches!(
            script.to_filters(&defaults(), &SquareRasterizer),
            Err(ScriptError::InvalidNumber {
                index: 0,
                field: "thickness",
                ..
            })
        ));

        let script = AnnotationScript::from_toml(
            "[[annotation]]\nkind = \"arrow\"\nfrom = [10, 10]\nto = [50, 50]\nthickness = 1e10\n",
        )
        .unwrap();
        assert!(matches!(
            script.to_filters(&defaults(), &SquareRasterizer),
            Err(ScriptError::ThicknessOutOfRange { index: 0, .. })
        ));

        let script =
            AnnotationScript::from_toml("[[annotation]]\nkind = \"pen\"\npoints = []\n").unwrap();
        assert!(matches!(
            script.to_filters(&defaults(), &SquareRasterizer),
            Err(ScriptError::EmptyPen(0))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AnnotationScript::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ScriptError::Read { .. }));
    }
}
