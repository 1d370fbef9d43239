//! Element and decorator implementations built on top of `genpdf` primitives.
//!
//! The report needs a few things `genpdf` does not ship with: shaded table header cells, tables
//! that draw rules only along selected cell edges, and images stretched into a fixed box that
//! quietly disappear when the asset is missing.

use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageBuffer, Rgb, Rgba};
use log::warn;

use genpdf::elements::{CellDecorator, Image};
use genpdf::error::{Context as _, Error};
use genpdf::style::{Color, Style};
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Scale, Size};

use crate::config::ImageBox;

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
/// Distance between the strokes that fill a shaded area.
const SHADE_STROKE_STEP_MM: f64 = 0.25;

fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

fn estimated_image_size(image: &DynamicImage, dpi: f64) -> Size {
    let (px_width, px_height) = image.dimensions();
    let width_mm = MM_PER_INCH * (px_width as f64) / dpi;
    let height_mm = MM_PER_INCH * (px_height as f64) / dpi;
    Size::new(mm_from_f64(width_mm), mm_from_f64(height_mm))
}

/// Loads an image from the given path using the [`image`] crate with descriptive errors.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<DynamicImage, Error> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path)
        .with_context(|| format!("Failed to open image file {}", path.display()))?;
    reader
        .with_guessed_format()
        .context("Unable to determine image format")?
        .decode()
        .with_context(|| format!("Failed to decode image file {}", path.display()))
}

/// Composites transparent pixels onto white.
///
/// PDF images written by `genpdf` cannot carry an alpha channel, and scanned signatures usually
/// come with one.
pub fn flatten_alpha(image: DynamicImage) -> DynamicImage {
    if !image.color().has_alpha() {
        return image;
    }

    let rgba = image.to_rgba8();
    let flattened = ImageBuffer::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let alpha = u32::from(a);
        let blend = |channel: u8| ((u32::from(channel) * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    });
    DynamicImage::ImageRgb8(flattened)
}

/// Builds an image element stretched to fill `target`.
pub fn fitted_image(image: DynamicImage, target: ImageBox) -> Result<Image, Error> {
    let image = flatten_alpha(image);
    let natural = estimated_image_size(&image, DEFAULT_IMAGE_DPI);
    let natural_width = mm_to_f64(natural.width);
    let natural_height = mm_to_f64(natural.height);

    let mut element = Image::from_dynamic_image(image)?;
    if natural_width > f64::EPSILON && natural_height > f64::EPSILON {
        element.set_scale(Scale::new(
            target.width_mm / natural_width,
            target.height_mm / natural_height,
        ));
    }
    Ok(element)
}

/// An optional image slot: the fitted image, or nothing when the asset cannot be used.
pub enum ImageSlot {
    Image(Image),
    Empty,
}

impl ImageSlot {
    pub fn is_empty(&self) -> bool {
        matches!(self, ImageSlot::Empty)
    }
}

impl Element for ImageSlot {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        match self {
            ImageSlot::Image(image) => image.render(context, area, style),
            ImageSlot::Empty => Ok(RenderResult::default()),
        }
    }
}

/// Returns the image at `path` fitted into `target`, or an empty slot if it cannot be used.
///
/// A missing path is the normal case for optional assets and is not reported.  A file that exists
/// but does not decode is logged and treated the same way.
pub fn optional_image(path: Option<&Path>, target: ImageBox, alignment: Alignment) -> ImageSlot {
    let Some(path) = path else {
        return ImageSlot::Empty;
    };

    match decode_image_from_path(path).and_then(|image| fitted_image(image, target)) {
        Ok(mut image) => {
            image.set_alignment(alignment);
            ImageSlot::Image(image)
        }
        Err(err) => {
            warn!("Leaving out image {}: {}", path.display(), err);
            ImageSlot::Empty
        }
    }
}

/// Vertical offsets of the strokes that fill an area `height_mm` tall.
///
/// The first stroke sits on the top edge and the last on the bottom edge.
fn shade_offsets(height_mm: f64) -> Vec<f64> {
    if height_mm <= 0.0 {
        return Vec::new();
    }
    let steps = (height_mm / SHADE_STROKE_STEP_MM).ceil() as usize;
    (0..=steps)
        .map(|step| (step as f64 * SHADE_STROKE_STEP_MM).min(height_mm))
        .collect()
}

/// A single line of text on a solid background, used for table section headers.
pub struct ShadedText {
    text: String,
    alignment: Alignment,
    shade: Color,
    padding: Mm,
}

impl ShadedText {
    /// Creates shaded, left-aligned text.
    pub fn new(text: impl Into<String>, shade: Color) -> Self {
        Self {
            text: text.into(),
            alignment: Alignment::Left,
            shade,
            padding: Mm::default(),
        }
    }

    /// Sets the alignment and returns the updated element.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets the space kept around the text inside the shaded area.
    pub fn with_padding(mut self, padding: impl Into<Mm>) -> Self {
        self.padding = padding.into();
        self
    }
}

impl Element for ShadedText {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();

        let line_height = style.line_height(&context.font_cache);
        let height = line_height + self.padding + self.padding;
        if height > area.size().height {
            result.has_more = true;
            return Ok(result);
        }

        // Strokes are drawn first so the text is painted on top of them.
        let width = area.size().width;
        let shade = Style::new().with_color(self.shade);
        for offset in shade_offsets(mm_to_f64(height)) {
            let y = mm_from_f64(offset);
            area.draw_line(vec![Position::new(0, y), Position::new(width, y)], shade);
        }

        let text_width = style.str_width(&context.font_cache, &self.text);
        let x_offset = match self.alignment {
            Alignment::Left => self.padding,
            Alignment::Center => (width - text_width) / 2.0,
            Alignment::Right => width - text_width - self.padding,
        };

        match area.text_section(
            &context.font_cache,
            Position::new(x_offset, self.padding),
            style,
        ) {
            Some(mut section) => section.print_str(&self.text, style)?,
            None => {
                result.has_more = true;
                return Ok(result);
            }
        }

        result.size = Size::new(width, height);
        Ok(result)
    }
}

/// Side of a table cell a rule is drawn along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug)]
struct CellRule {
    row: usize,
    column: Option<usize>,
    edge: Edge,
    color: Color,
}

/// Cell decorator drawing rules only where they were requested.
///
/// Rules can be attached to single cells or whole rows, a vertical divider can be placed before a
/// column, and an optional outline boxes the complete table.
#[derive(Clone, Debug, Default)]
pub struct RuleCellDecorator {
    rules: Vec<CellRule>,
    dividers: Vec<(usize, Color)>,
    outline: Option<Color>,
    num_columns: usize,
    num_rows: usize,
}

impl RuleCellDecorator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws a box around the complete table.
    pub fn with_outline(mut self, color: Color) -> Self {
        self.outline = Some(color);
        self
    }

    /// Draws a vertical line along the left edge of `column` in every row.
    pub fn with_divider_before(mut self, column: usize, color: Color) -> Self {
        self.dividers.push((column, color));
        self
    }

    /// Draws a rule along `edge` of every cell in `row`.
    pub fn with_row_rule(mut self, row: usize, edge: Edge, color: Color) -> Self {
        self.rules.push(CellRule {
            row,
            column: None,
            edge,
            color,
        });
        self
    }

    /// Draws a rule along `edge` of the cell at `column` in `row`.
    pub fn with_cell_rule(mut self, row: usize, column: usize, edge: Edge, color: Color) -> Self {
        self.rules.push(CellRule {
            row,
            column: Some(column),
            edge,
            color,
        });
        self
    }

    /// Collects the rules to draw around the given cell.
    fn edges(&self, column: usize, row: usize, has_more: bool) -> Vec<(Edge, Color)> {
        let mut edges = Vec::new();

        if let Some(color) = self.outline {
            if row == 0 {
                edges.push((Edge::Top, color));
            }
            if has_more || row + 1 == self.num_rows {
                edges.push((Edge::Bottom, color));
            }
            if column == 0 {
                edges.push((Edge::Left, color));
            }
            if column + 1 == self.num_columns {
                edges.push((Edge::Right, color));
            }
        }

        edges.extend(
            self.dividers
                .iter()
                .filter(|(divider, _)| *divider == column)
                .map(|(_, color)| (Edge::Left, *color)),
        );

        edges.extend(
            self.rules
                .iter()
                .filter(|rule| rule.row == row && rule.column.map_or(true, |c| c == column))
                .map(|rule| (rule.edge, rule.color)),
        );

        edges
    }
}

impl CellDecorator for RuleCellDecorator {
    fn set_table_size(&mut self, num_columns: usize, num_rows: usize) {
        self.num_columns = num_columns;
        self.num_rows = num_rows;
    }

    fn decorate_cell(
        &mut self,
        column: usize,
        row: usize,
        has_more: bool,
        area: render::Area<'_>,
        style: Style,
    ) {
        let size = area.size();
        for (edge, color) in self.edges(column, row, has_more) {
            let (from, to) = match edge {
                Edge::Top => (Position::new(0, 0), Position::new(size.width, 0)),
                Edge::Bottom => (
                    Position::new(0, size.height),
                    Position::new(size.width, size.height),
                ),
                Edge::Left => (Position::new(0, 0), Position::new(0, size.height)),
                Edge::Right => (
                    Position::new(size.width, 0),
                    Position::new(size.width, size.height),
                ),
            };
            area.draw_line(vec![from, to], style.with_color(color));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thin() -> Color {
        Color::Greyscale(0)
    }

    fn sides(decorator: &RuleCellDecorator, column: usize, row: usize) -> Vec<Edge> {
        decorator
            .edges(column, row, false)
            .into_iter()
            .map(|(edge, _)| edge)
            .collect()
    }

    #[test]
    fn outline_only_touches_the_border_cells() {
        let mut decorator = RuleCellDecorator::new().with_outline(thin());
        decorator.set_table_size(2, 3);

        assert_eq!(sides(&decorator, 0, 0), [Edge::Top, Edge::Left]);
        assert_eq!(sides(&decorator, 1, 1), [Edge::Right]);
        assert_eq!(sides(&decorator, 1, 2), [Edge::Bottom, Edge::Right]);
    }

    #[test]
    fn continued_rows_are_closed_at_the_page_end() {
        let mut decorator = RuleCellDecorator::new().with_outline(thin());
        decorator.set_table_size(2, 3);

        let edges: Vec<_> = decorator
            .edges(0, 1, true)
            .into_iter()
            .map(|(edge, _)| edge)
            .collect();
        assert_eq!(edges, [Edge::Bottom, Edge::Left]);
    }

    #[test]
    fn row_and_cell_rules_are_scoped() {
        let mut decorator = RuleCellDecorator::new()
            .with_divider_before(1, thin())
            .with_row_rule(2, Edge::Top, thin())
            .with_cell_rule(0, 0, Edge::Bottom, thin());
        decorator.set_table_size(2, 4);

        assert_eq!(sides(&decorator, 0, 0), [Edge::Bottom]);
        assert!(sides(&decorator, 1, 0).contains(&Edge::Left));
        assert_eq!(sides(&decorator, 0, 2), [Edge::Top]);
        assert_eq!(sides(&decorator, 1, 2), [Edge::Left, Edge::Top]);
        assert!(sides(&decorator, 0, 3).is_empty());
    }

    #[test]
    fn rules_keep_their_color() {
        let grey = Color::Greyscale(128);
        let mut decorator = RuleCellDecorator::new()
            .with_outline(thin())
            .with_cell_rule(0, 1, Edge::Bottom, grey);
        decorator.set_table_size(2, 1);

        assert_eq!(
            decorator.edges(1, 0, false),
            [
                (Edge::Top, thin()),
                (Edge::Bottom, thin()),
                (Edge::Right, thin()),
                (Edge::Bottom, grey)
            ]
        );
    }

    #[test]
    fn shading_covers_the_whole_height() {
        let offsets = shade_offsets(6.0);
        assert_eq!(offsets.first(), Some(&0.0));
        assert_eq!(offsets.last(), Some(&6.0));
        assert!(offsets
            .windows(2)
            .all(|pair| pair[1] - pair[0] <= SHADE_STROKE_STEP_MM + f64::EPSILON));

        assert_eq!(shade_offsets(0.1), [0.0, 0.1]);
        assert!(shade_offsets(0.0).is_empty());
    }

    #[test]
    fn missing_or_broken_images_leave_an_empty_slot() {
        let target = ImageBox {
            width_mm: 40.0,
            height_mm: 10.0,
        };
        assert!(optional_image(None, target, Alignment::Left).is_empty());

        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("logo.png");
        std::fs::write(&broken, b"not a png").unwrap();
        assert!(optional_image(Some(broken.as_path()), target, Alignment::Left).is_empty());

        let valid = dir.path().join("signature.png");
        ImageBuffer::from_pixel(30, 10, Rgba([0u8, 0, 0, 255]))
            .save(&valid)
            .unwrap();
        assert!(!optional_image(Some(valid.as_path()), target, Alignment::Left).is_empty());
    }

    #[test]
    fn transparent_pixels_become_white() {
        let image = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(2, 2, Rgba([0, 0, 0, 0])));
        let flattened = flatten_alpha(image);
        assert!(!flattened.color().has_alpha());
        assert_eq!(flattened.to_rgb8().get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn opaque_images_are_left_alone() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(1, 1, Rgb([10, 20, 30])));
        let flattened = flatten_alpha(image);
        assert_eq!(flattened.to_rgb8().get_pixel(0, 0), &Rgb([10, 20, 30]));
    }
}
