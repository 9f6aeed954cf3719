// One-page CV rendering: pure layout as draw ops, then painted with printpdf.
// Painting is CPU-bound and must run inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod handlers;
pub mod layout;
pub mod renderer;

/// Institution printed in the CV header unless `CV_INSTITUTION` overrides it.
pub const DEFAULT_INSTITUTION: &str = "Universitas Muhammadiyah Surakarta";

pub use layout::CvTemplate;
pub use renderer::render_cv;
