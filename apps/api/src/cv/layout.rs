//! One-page CV layout computed as a flat list of draw operations.
//!
//! Coordinates are PDF points on an A4 page with the origin at the bottom-left.
//! Nothing here touches a PDF library; `renderer` paints the ops.

use crate::cv::font_metrics::{get_metrics, StandardFont};
use crate::cv::DEFAULT_INSTITUTION;
use crate::directory::view::PublicProfile;

pub const PAGE_WIDTH: f32 = 595.2756;
pub const PAGE_HEIGHT: f32 = 841.8898;

const MARGIN_X: f32 = 50.0;
const HEADER_HEIGHT: f32 = 140.0;
const HEADER_TEXT_X: f32 = MARGIN_X + 100.0;
const PHOTO_SIZE: f32 = 80.0;
const CONTENT_TOP: f32 = PAGE_HEIGHT - 180.0;

const BODY_SIZE: f32 = 10.0;
const BIO_LEADING: f32 = 12.0;
/// Fixed gap below the bio, whatever its line count.
const BIO_ADVANCE: f32 = 40.0;

const CHIP_HEIGHT: f32 = 16.0;
const CHIP_RADIUS: f32 = 6.0;
const CHIP_PADDING: f32 = 10.0;
const CHIP_GAP: f32 = 8.0;
const CHIP_ROW_STEP: f32 = 22.0;
const CHIP_WRAP_AT: f32 = PAGE_WIDTH - 120.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Rgb { r, g, b }
    }
}

pub const ACCENT_BLUE: Rgb = Rgb::new(0.23, 0.51, 0.96);
pub const MUTED_GRAY: Rgb = Rgb::new(0.45, 0.45, 0.45);
pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Filled and outlined rectangle; `(x, y)` is the bottom-left corner.
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Rgb,
        stroke: Rgb,
    },
    /// Outlined rectangle with rounded corners.
    RoundedRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        stroke: Rgb,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: Rgb,
    },
    /// Single line of text with its baseline at `y`.
    Text {
        x: f32,
        y: f32,
        text: String,
        font: StandardFont,
        size: f32,
        color: Rgb,
    },
    /// Slot for the profile photo, scaled to fill the box.
    Photo {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

/// Per-deployment settings for the CV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CvTemplate {
    pub institution: String,
}

impl Default for CvTemplate {
    fn default() -> Self {
        CvTemplate {
            institution: DEFAULT_INSTITUTION.to_string(),
        }
    }
}

#[derive(Default)]
struct Canvas {
    ops: Vec<DrawOp>,
}

impl Canvas {
    fn text(&mut self, x: f32, y: f32, text: impl Into<String>, font: StandardFont, size: f32, color: Rgb) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            text: text.into(),
            font,
            size,
            color,
        });
    }

    fn body(&mut self, x: f32, y: f32, text: impl Into<String>) {
        self.text(x, y, text, StandardFont::Helvetica, BODY_SIZE, BLACK);
    }

    /// Bold title with an underline across the content width. Returns the
    /// baseline for the section's first line.
    fn section_title(&mut self, y: f32, title: &str) -> f32 {
        self.text(MARGIN_X, y, title, StandardFont::HelveticaBold, 14.0, BLACK);
        let rule_y = y - 6.0;
        self.ops.push(DrawOp::Line {
            x1: MARGIN_X,
            y1: rule_y,
            x2: PAGE_WIDTH - MARGIN_X,
            y2: rule_y,
            stroke: BLACK,
        });
        rule_y - 14.0
    }
}

/// Lays out the CV for `view`. `with_photo` reserves the header photo slot;
/// callers pass `false` when there is no decodable photo.
pub fn layout_cv(view: &PublicProfile, template: &CvTemplate, with_photo: bool) -> Vec<DrawOp> {
    let mut canvas = Canvas::default();

    draw_header(&mut canvas, view, template, with_photo);

    let mut y = CONTENT_TOP;
    y = draw_about(&mut canvas, y, &view.bio);
    y = draw_experiences(&mut canvas, y, view);
    y = draw_skills(&mut canvas, y, view);
    draw_contact(&mut canvas, y, view);

    canvas.ops
}

fn draw_header(canvas: &mut Canvas, view: &PublicProfile, template: &CvTemplate, with_photo: bool) {
    canvas.ops.push(DrawOp::Rect {
        x: 0.0,
        y: PAGE_HEIGHT - HEADER_HEIGHT,
        width: PAGE_WIDTH,
        height: HEADER_HEIGHT,
        fill: ACCENT_BLUE,
        stroke: BLACK,
    });

    if with_photo {
        canvas.ops.push(DrawOp::Photo {
            x: MARGIN_X,
            y: PAGE_HEIGHT - 120.0,
            width: PHOTO_SIZE,
            height: PHOTO_SIZE,
        });
    }

    let top = PAGE_HEIGHT - 50.0;
    canvas.text(HEADER_TEXT_X, top, view.nama.as_str(), StandardFont::HelveticaBold, 18.0, WHITE);
    canvas.text(
        HEADER_TEXT_X,
        top - 22.0,
        format!("{} · Angkatan {}", view.prodi, view.angkatan),
        StandardFont::Helvetica,
        11.0,
        WHITE,
    );
    canvas.text(
        HEADER_TEXT_X,
        top - 40.0,
        template.institution.as_str(),
        StandardFont::Helvetica,
        BODY_SIZE,
        WHITE,
    );
}

fn draw_about(canvas: &mut Canvas, y: f32, bio: &str) -> f32 {
    let y = canvas.section_title(y, "Tentang Saya");
    let bio = if bio.is_empty() { "Belum ada bio" } else { bio };

    for (i, line) in bio.split('\n').enumerate() {
        canvas.body(MARGIN_X, y - i as f32 * BIO_LEADING, line.trim_end_matches('\r'));
    }

    y - BIO_ADVANCE
}

fn draw_experiences(canvas: &mut Canvas, y: f32, view: &PublicProfile) -> f32 {
    let mut y = canvas.section_title(y, "Pengalaman");

    if view.experiences.is_empty() {
        canvas.body(MARGIN_X, y, "Belum ada pengalaman");
        return y - 20.0;
    }

    for experience in &view.experiences {
        canvas.text(
            MARGIN_X,
            y,
            format!("{} ({})", experience.title, experience.start_year),
            StandardFont::HelveticaBold,
            11.0,
            BLACK,
        );
        y -= 14.0;
        canvas.text(
            MARGIN_X + 12.0,
            y,
            experience.description.as_str(),
            StandardFont::Helvetica,
            BODY_SIZE,
            MUTED_GRAY,
        );
        y -= 22.0;
    }
    y
}

fn draw_skills(canvas: &mut Canvas, y: f32, view: &PublicProfile) -> f32 {
    let y = canvas.section_title(y, "Skill");
    let metrics = get_metrics(StandardFont::Helvetica);

    let mut chip_x = MARGIN_X;
    let mut chip_y = y;
    for skill in &view.skills {
        let width = metrics.measure_pt(&skill.name, BODY_SIZE) + CHIP_PADDING;
        canvas.ops.push(DrawOp::RoundedRect {
            x: chip_x,
            y: chip_y - 12.0,
            width,
            height: CHIP_HEIGHT,
            radius: CHIP_RADIUS,
            stroke: BLACK,
        });
        canvas.body(chip_x + 5.0, chip_y - 8.0, skill.name.as_str());
        chip_x += width + CHIP_GAP;

        if chip_x > CHIP_WRAP_AT {
            chip_x = MARGIN_X;
            chip_y -= CHIP_ROW_STEP;
        }
    }

    if view.skills.is_empty() {
        canvas.body(MARGIN_X, y, "Belum ada skill");
    }

    chip_y - 30.0
}

fn draw_contact(canvas: &mut Canvas, y: f32, view: &PublicProfile) {
    let mut y = canvas.section_title(y, "Kontak");

    let lines = [
        (&view.kontak_email, "Email: "),
        (&view.kontak_wa, "WhatsApp: "),
        (&view.instagram, "Instagram: @"),
    ];
    for (value, label) in lines {
        if value.is_empty() {
            continue;
        }
        canvas.body(MARGIN_X, y, format!("{label}{value}"));
        y -= 14.0;
    }
}
