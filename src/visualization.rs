//! Visualization utilities for route searches.
//!
//! Generates SVG drawings of the network with candidate and best routes,
//! convergence curves of the best distance, and CSV exports for plotting.

use crate::error::Result;
use crate::graph::Graph;
use crate::heuristics::whale::IterationSnapshot;
use crate::solution::Solution;
use std::f64::consts::PI;
use std::fs::File;
use std::io::Write;
use std::path::Path;
#[cfg(not(feature = "resvg"))]
use std::process::Command;
#[cfg(feature = "resvg")]
use resvg::usvg;
#[cfg(feature = "resvg")]
use resvg::render;
#[cfg(feature = "resvg")]
use resvg::FitTo;
#[cfg(feature = "resvg")]
use resvg::tiny_skia::{Pixmap, Transform};
#[cfg(feature = "resvg")]
use resvg::usvg::TreeParsing;

/// SVG visualization generator
pub struct Visualizer {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// Node radius
    pub node_radius: f64,
    /// Height of the convergence plot
    pub plot_height: f64,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 90.0,
            node_radius: 26.0,
            plot_height: 360.0,
        }
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Final drawing: the best route in red over the network
    pub fn generate_svg(&self, graph: &Graph, solution: &Solution) -> String {
        let title = format!(
            "Best route: {} | Distance: {:.2}",
            solution.route_string(graph),
            solution.cost
        );
        self.generate_routes_svg(graph, &[], Some(solution.path.as_slice()), &title)
    }

    /// One frame per iteration: every whale's route in translucent blue
    pub fn generate_frame_svg(&self, graph: &Graph, snapshot: &IterationSnapshot<'_>) -> String {
        let routes: Vec<&[usize]> = snapshot.population.iter().map(|c| c.path.as_slice()).collect();
        let title = format!(
            "Iteration {} | Best distance so far: {:.2} | Replaced: {}",
            snapshot.iteration, snapshot.best.cost, snapshot.replacements
        );
        self.generate_routes_svg(graph, &routes, None, &title)
    }

    /// Draw the network, a set of candidate routes and an optional highlighted route
    pub fn generate_routes_svg(
        &self,
        graph: &Graph,
        routes: &[&[usize]],
        highlight: Option<&[usize]>,
        title: &str,
    ) -> String {
        let mut svg = String::new();
        let positions = self.layout(graph);

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .node {{ fill: #add8e6; stroke: #2c3e50; stroke-width: 2; }}
    .edge {{ stroke: #95a5a6; stroke-width: 2; fill: none; }}
    .candidate {{ stroke: #3498db; stroke-width: 4; stroke-opacity: 0.3; fill: none; }}
    .best {{ stroke: #e74c3c; stroke-width: 6; fill: none; }}
    .label {{ font-family: Arial; font-size: 12px; fill: #2c3e50; font-weight: bold; }}
    .weight {{ font-family: Arial; font-size: 11px; fill: #7f8c8d; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            self.width, self.height, self.width, self.height
        ));

        svg.push_str(&format!(
            r##"<text x="20" y="30" class="title">{}</text>
"##,
            escape(title)
        ));

        for &(a, b, weight) in graph.edges() {
            let (x1, y1) = positions[a];
            let (x2, y2) = positions[b];
            svg.push_str(&format!(
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" class="edge"/>
<text x="{:.2}" y="{:.2}" class="weight" text-anchor="middle">{}</text>
"#,
                x1, y1, x2, y2,
                (x1 + x2) / 2.0, (y1 + y2) / 2.0 - 4.0, weight
            ));
        }

        for route in routes {
            svg.push_str(&self.route_polyline(&positions, route, "candidate"));
        }
        if let Some(route) = highlight {
            svg.push_str(&self.route_polyline(&positions, route, "best"));
        }

        for (id, name) in graph.nodes().iter().enumerate() {
            let (x, y) = positions[id];
            svg.push_str(&format!(
                r##"<circle cx="{:.2}" cy="{:.2}" r="{}" class="node"/>
<text x="{:.2}" y="{:.2}" class="label" text-anchor="middle">{}</text>
"##,
                x, y, self.node_radius,
                x, y + 4.0, escape(name)
            ));
        }

        svg.push_str("</svg>");

        svg
    }

    /// Convergence curve of the best distance per iteration
    pub fn generate_convergence_svg(&self, history: &[f64]) -> String {
        let mut svg = String::new();

        let width = self.width;
        let height = self.plot_height;
        let margin = 60.0;

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .line {{ stroke: #3498db; stroke-width: 2; fill: none; }}
    .axis {{ stroke: #2c3e50; stroke-width: 1; }}
    .label {{ font-family: Arial; font-size: 12px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ecf0f1"/>
<text x="{}" y="25" class="title">Convergence of the best route distance</text>
"##,
            width, height, width, height, margin
        ));

        let values: Vec<f64> = history.iter().copied().filter(|v| v.is_finite()).collect();
        let plot_width = width - 2.0 * margin;
        let plot_height = height - 2.0 * margin;

        svg.push_str(&format!(
            r##"<line x1="{}" y1="{}" x2="{}" y2="{}" class="axis"/>
<line x1="{}" y1="{}" x2="{}" y2="{}" class="axis"/>
<text x="{}" y="{}" class="label" text-anchor="middle">Iteration</text>
<text x="15" y="{}" class="label">Distance</text>
"##,
            margin, height - margin, width - margin, height - margin,
            margin, margin, margin, height - margin,
            width / 2.0, height - 15.0,
            margin - 15.0
        ));

        if values.is_empty() {
            svg.push_str("</svg>");
            return svg;
        }

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let span = (max - min).max(1e-9);
        let x_scale = plot_width / (values.len().max(2) - 1) as f64;

        let point = |i: usize, v: f64| -> (f64, f64) {
            let x = margin + i as f64 * x_scale;
            let y = if max > min {
                height - margin - (v - min) / span * plot_height
            } else {
                margin + plot_height / 2.0
            };
            (x, y)
        };

        let mut path = String::new();
        for (i, &v) in values.iter().enumerate() {
            let (x, y) = point(i, v);
            if i == 0 {
                path.push_str(&format!("M {:.2} {:.2}", x, y));
            } else {
                path.push_str(&format!(" L {:.2} {:.2}", x, y));
            }
        }
        svg.push_str(&format!(r##"<path d="{}" class="line"/>
"##, path));

        for (i, &v) in values.iter().enumerate() {
            let (x, y) = point(i, v);
            svg.push_str(&format!(
                r##"<circle cx="{:.2}" cy="{:.2}" r="3" fill="#3498db"/>
"##,
                x, y
            ));
        }

        svg.push_str(&format!(
            r##"<text x="{}" y="{:.2}" class="label" text-anchor="end">{:.2}</text>
<text x="{}" y="{:.2}" class="label" text-anchor="end">{:.2}</text>
<text x="{:.2}" y="{}" class="label" text-anchor="middle">{}</text>
"##,
            margin - 5.0, point(0, max).1 + 4.0, max,
            margin - 5.0, point(0, min).1 + 4.0, min,
            width - margin, height - margin + 18.0, values.len() - 1
        ));

        svg.push_str("</svg>");

        svg
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(svg.as_bytes())?;
        Ok(())
    }

    /// Save SVG as PNG, natively with the `resvg` feature, otherwise through
    /// `rsvg-convert`, `magick convert` or `inkscape`.
    pub fn save_png<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        render_png(svg, path.as_ref(), (self.width as u32, self.height as u32))
    }

    /// Node positions on a circle, first node at the top
    fn layout(&self, graph: &Graph) -> Vec<(f64, f64)> {
        let n = graph.num_nodes().max(1);
        let cx = self.width / 2.0;
        let cy = self.height / 2.0 + 15.0;
        let radius = (self.width.min(self.height) / 2.0 - self.margin).max(10.0);

        (0..graph.num_nodes())
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / n as f64 - PI / 2.0;
                (cx + radius * angle.cos(), cy + radius * angle.sin())
            })
            .collect()
    }

    fn route_polyline(&self, positions: &[(f64, f64)], route: &[usize], class: &str) -> String {
        let points: Vec<String> = route.iter()
            .filter_map(|&n| positions.get(n))
            .map(|&(x, y)| format!("{:.2},{:.2}", x, y))
            .collect();
        format!(r#"<polyline points="{}" class="{}"/>
"#, points.join(" "), class)
    }
}

#[cfg(feature = "resvg")]
fn render_png(svg: &str, path: &Path, fallback_size: (u32, u32)) -> std::io::Result<()> {
    let opt = usvg::Options::default();
    let rtree = usvg::Tree::from_str(svg, &opt).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, format!("usvg parse error: {}", e)))?;
    let (w, h) = svg_size(svg).unwrap_or(fallback_size);
    let mut pixmap = Pixmap::new(w.max(1), h.max(1)).ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "Failed to create pixmap"))?;
    render(&rtree, FitTo::Original, Transform::default(), pixmap.as_mut()).ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "resvg render failed"))?;
    pixmap.save_png(path).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, format!("save_png failed: {}", e)))
}

#[cfg(not(feature = "resvg"))]
fn render_png(svg: &str, path: &Path, _fallback_size: (u32, u32)) -> std::io::Result<()> {
    let tmp_svg = path.with_extension("svg.tmp");
    std::fs::write(&tmp_svg, svg)?;

    let out = path.to_string_lossy().to_string();
    let tmp = tmp_svg.to_string_lossy().to_string();
    let converters: [(&str, Vec<&str>); 3] = [
        ("rsvg-convert", vec!["-o", out.as_str(), tmp.as_str()]),
        ("magick", vec!["convert", tmp.as_str(), out.as_str()]),
        ("inkscape", vec![tmp.as_str(), "--export-type=png", "--export-filename", out.as_str()]),
    ];

    for (program, args) in &converters {
        if let Ok(status) = Command::new(program).args(args).status() {
            if status.success() {
                let _ = std::fs::remove_file(&tmp_svg);
                return Ok(());
            }
        }
    }

    let _ = std::fs::remove_file(&tmp_svg);
    Err(std::io::Error::new(std::io::ErrorKind::Other, "No SVG->PNG converter succeeded (tried rsvg-convert, magick, inkscape)"))
}

/// Write the best-distance history as `iteration,best_cost` CSV rows
pub fn export_history_csv<P: AsRef<Path>>(history: &[f64], path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["iteration", "best_cost"])?;
    for (i, cost) in history.iter().enumerate() {
        writer.write_record([i.to_string(), format!("{:.4}", cost)])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(feature = "resvg")]
fn svg_size(svg: &str) -> Option<(u32, u32)> {
    let attr = |name: &str| -> Option<u32> {
        let (_, rest) = svg.split_once(&format!("{}=\"", name))?;
        let (value, _) = rest.split_once('"')?;
        value.parse::<f64>().ok().map(|v| v as u32)
    };
    Some((attr("width")?, attr("height")?))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
