//! Paints a computed CV layout onto a single-page PDF.
//!
//! Rendering is synchronous and CPU-bound; handlers call it inside
//! `tokio::task::spawn_blocking`.

use image::DynamicImage;
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfLayerReference, Point, Pt, Rect,
};
use thiserror::Error;
use tracing::debug;

use crate::cv::font_metrics::StandardFont;
use crate::cv::layout::{layout_cv, CvTemplate, DrawOp, Rgb, PAGE_HEIGHT, PAGE_WIDTH};
use crate::directory::view::PublicProfile;

/// Control-point distance for approximating a quarter circle with a cubic Bézier.
const KAPPA: f32 = 0.552_284_8;
/// Images are placed at 72 dpi so one pixel maps to one point before scaling.
const PHOTO_DPI: f32 = 72.0;

#[derive(Debug, Error)]
pub enum CvError {
    #[error("font error: {0}")]
    Font(String),

    #[error("PDF serialization error: {0}")]
    Save(String),
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, font: StandardFont) -> &IndirectFontRef {
        match font {
            StandardFont::Helvetica => &self.regular,
            StandardFont::HelveticaBold => &self.bold,
        }
    }
}

/// Renders the CV for `view` to PDF bytes.
///
/// Photo bytes that fail to decode are dropped and the header renders without
/// a photo.
pub fn render_cv(
    view: &PublicProfile,
    photo: Option<&[u8]>,
    template: &CvTemplate,
) -> Result<Vec<u8>, CvError> {
    let photo = photo.and_then(decode_photo);
    let ops = layout_cv(view, template, photo.is_some());

    let (doc, page, layer) = PdfDocument::new(
        format!("CV {}", view.nama),
        Mm::from(Pt(PAGE_WIDTH)),
        Mm::from(Pt(PAGE_HEIGHT)),
        "Layer 1",
    );
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| CvError::Font(format!("{e:?}")))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| CvError::Font(format!("{e:?}")))?,
    };
    let layer = doc.get_page(page).get_layer(layer);

    for op in &ops {
        paint(&layer, &fonts, op, photo.as_ref());
    }

    doc.save_to_bytes()
        .map_err(|e| CvError::Save(format!("{e:?}")))
}

fn decode_photo(bytes: &[u8]) -> Option<DynamicImage> {
    match image::load_from_memory(bytes) {
        Ok(img) => Some(DynamicImage::ImageRgb8(img.to_rgb8())),
        Err(e) => {
            debug!("Skipping CV photo: {e}");
            None
        }
    }
}

fn mm(v: f32) -> Mm {
    Mm::from(Pt(v))
}

fn point(x: f32, y: f32) -> Point {
    Point::new(mm(x), mm(y))
}

fn color(c: Rgb) -> Color {
    Color::Rgb(printpdf::Rgb::new(c.r, c.g, c.b, None))
}

fn paint(layer: &PdfLayerReference, fonts: &Fonts, op: &DrawOp, photo: Option<&DynamicImage>) {
    match op {
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        } => {
            layer.set_fill_color(color(*fill));
            layer.set_outline_color(color(*stroke));
            layer.set_outline_thickness(1.0);
            let rect = Rect::new(mm(*x), mm(*y), mm(x + width), mm(y + height))
                .with_mode(PaintMode::FillStroke);
            layer.add_rect(rect);
        }
        DrawOp::RoundedRect {
            x,
            y,
            width,
            height,
            radius,
            stroke,
        } => {
            layer.set_outline_color(color(*stroke));
            layer.set_outline_thickness(1.0);
            layer.add_line(rounded_rect(*x, *y, *width, *height, *radius));
        }
        DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        } => {
            layer.set_outline_color(color(*stroke));
            layer.set_outline_thickness(1.0);
            layer.add_line(Line {
                points: vec![(point(*x1, *y1), false), (point(*x2, *y2), false)],
                is_closed: false,
            });
        }
        DrawOp::Text {
            x,
            y,
            text,
            font,
            size,
            color: text_color,
        } => {
            layer.set_fill_color(color(*text_color));
            layer.use_text(text.as_str(), *size, mm(*x), mm(*y), fonts.get(*font));
        }
        DrawOp::Photo {
            x,
            y,
            width,
            height,
        } => {
            let Some(img) = photo else { return };
            let (px_w, px_h) = (img.width().max(1) as f32, img.height().max(1) as f32);
            Image::from_dynamic_image(img).add_to_layer(
                layer.clone(),
                ImageTransform {
                    translate_x: Some(mm(*x)),
                    translate_y: Some(mm(*y)),
                    scale_x: Some(width / px_w),
                    scale_y: Some(height / px_h),
                    dpi: Some(PHOTO_DPI),
                    ..Default::default()
                },
            );
        }
    }
}

/// Closed outline of a rectangle whose corners are quarter circles of `r`.
///
/// A point flagged `true` followed by another flagged `true` starts a cubic
/// Bézier: the second point and the next one are the control points.
fn rounded_rect(x: f32, y: f32, w: f32, h: f32, r: f32) -> Line {
    let r = r.min(w / 2.0).min(h / 2.0);
    let k = r * KAPPA;
    let (right, top) = (x + w, y + h);

    let points = vec![
        (point(x + r, y), false),
        (point(right - r, y), true),
        (point(right - r + k, y), true),
        (point(right, y + r - k), false),
        (point(right, y + r), false),
        (point(right, top - r), true),
        (point(right, top - r + k), true),
        (point(right - r + k, top), false),
        (point(right - r, top), false),
        (point(x + r, top), true),
        (point(x + r - k, top), true),
        (point(x, top - r + k), false),
        (point(x, top - r), false),
        (point(x, y + r), true),
        (point(x, y + r - k), true),
        (point(x + r - k, y), false),
        (point(x + r, y), false),
    ];
    Line {
        points,
        is_closed: true,
    }
}
