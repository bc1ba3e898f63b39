//! SVG output for silhouette paths.

use std::fmt::Write as _;

use crate::emit::PathSink;
use crate::trace::Winding;

/// Style attributes written on the SVG `<path>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgStyle {
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_width: f64,
    /// Padding around the path bounds in the document view box.
    pub margin: f64,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            fill_color: "#000000".to_string(),
            stroke_color: "#000000".to_string(),
            stroke_width: 1.0,
            margin: 1.0,
        }
    }
}

/// A [`PathSink`] that builds SVG path data.
///
/// Screen space is y-up while SVG is y-down, so y is negated when written.
/// Windings are kept per subpath; the document uses `fill-rule="nonzero"`,
/// under which oppositely wound subpaths cut holes.
#[derive(Debug, Clone, Default)]
pub struct SvgPath {
    data: String,
    windings: Vec<Winding>,
    subpaths: usize,
    filled: bool,
    stroked: bool,
    min: Option<(f64, f64)>,
    max: Option<(f64, f64)>,
    style: SvgStyle,
}

impl SvgPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: SvgStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    /// The `d` attribute built so far.
    pub fn data(&self) -> &str {
        self.data.trim_end()
    }

    /// Number of closed subpaths.
    pub fn subpath_count(&self) -> usize {
        self.subpaths
    }

    /// Winding of each subpath, in emission order.
    pub fn windings(&self) -> &[Winding] {
        &self.windings
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bounds of all points in SVG coordinates, as (min, max).
    pub fn bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        self.min.zip(self.max)
    }

    /// A standalone SVG document containing the path.
    ///
    /// An empty path still yields a valid (empty) document.
    pub fn document(&self) -> String {
        let margin = self.style.margin;
        let ((min_x, min_y), (max_x, max_y)) = self.bounds().unwrap_or(((0.0, 0.0), (0.0, 0.0)));
        let width = (max_x - min_x) + 2.0 * margin;
        let height = (max_y - min_y) + 2.0 * margin;

        let mut doc = String::with_capacity(self.data.len() + 256);
        let _ = writeln!(
            doc,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
            fmt_num(min_x - margin),
            fmt_num(min_y - margin),
            fmt_num(width),
            fmt_num(height)
        );

        if !self.is_empty() {
            let fill = if self.filled { self.style.fill_color.as_str() } else { "none" };
            let _ = write!(doc, r#"  <path fill="{}" fill-rule="nonzero""#, fill);
            if self.stroked {
                let _ = write!(
                    doc,
                    r#" stroke="{}" stroke-width="{}""#,
                    self.style.stroke_color,
                    fmt_num(self.style.stroke_width)
                );
            }
            let _ = writeln!(doc, r#" d="{}"/>"#, self.data());
        }

        doc.push_str("</svg>\n");
        doc
    }

    fn push_point(&mut self, command: char, x: f64, y: f64) {
        let y = -y;
        let _ = write!(self.data, "{} {} {} ", command, fmt_num(x), fmt_num(y));

        self.min = Some(match self.min {
            Some((mx, my)) => (mx.min(x), my.min(y)),
            None => (x, y),
        });
        self.max = Some(match self.max {
            Some((mx, my)) => (mx.max(x), my.max(y)),
            None => (x, y),
        });
    }
}

impl PathSink for SvgPath {
    fn begin_path(&mut self) {
        self.data.clear();
        self.windings.clear();
        self.subpaths = 0;
        self.filled = false;
        self.stroked = false;
        self.min = None;
        self.max = None;
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.push_point('M', x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push_point('L', x, y);
    }

    fn close_path(&mut self) {
        self.data.push_str("Z ");
        self.subpaths += 1;
    }

    fn set_winding(&mut self, winding: Winding) {
        self.windings.push(winding);
    }

    fn fill(&mut self) {
        self.filled = true;
    }

    fn stroke(&mut self) {
        self.stroked = true;
    }
}

/// Format a coordinate without trailing zeros.
fn fmt_num(value: f64) -> String {
    let s = format!("{:.4}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_string(),
        _ => s.to_string(),
    }
}
