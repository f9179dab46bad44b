//! Sentiment trend chart.
//!
//! [`ChartRenderer`] turns the yearly table into a chart document. The
//! bundled [`SvgLineChart`] draws a standalone SVG line plot with
//! `plotters`: years on the x-axis, mean sentiment on a fixed `[-1, 1]`
//! y-axis, a dashed neutral line at `y = 0`, and the total number of strips
//! analyzed.

use anyhow::Result;
use comic_archive_core::models::YearlySummary;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use crate::progress::format_number;

pub trait ChartRenderer {
    /// Render the full chart document.
    fn render(&self, summaries: &[YearlySummary]) -> Result<String>;
}

/// SVG line chart of mean sentiment per year.
#[derive(Debug, Clone)]
pub struct SvgLineChart {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for SvgLineChart {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            title: "Year-by-Year Sentiment Trend".to_string(),
        }
    }
}

const LINE_COLOR: RGBColor = RGBColor(59, 130, 246);

/// Year range shown on the x-axis, padded by one year on each side.
fn year_range(summaries: &[YearlySummary]) -> std::ops::Range<i32> {
    match (summaries.first(), summaries.last()) {
        (Some(first), Some(last)) => (first.year - 1)..(last.year + 1),
        _ => 0..1,
    }
}

impl ChartRenderer for SvgLineChart {
    fn render(&self, summaries: &[YearlySummary]) -> Result<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height))
                .into_drawing_area();
            root.fill(&WHITE)?;

            let years = year_range(summaries);
            let (x_start, x_end) = (years.start, years.end);
            let mut chart = ChartBuilder::on(&root)
                .caption(&self.title, ("sans-serif", 24))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(70)
                .build_cartesian_2d(years, -1.0f64..1.0f64)?;

            chart
                .configure_mesh()
                .x_desc("Year")
                .y_desc("Average Sentiment")
                .x_labels(summaries.len().clamp(2, 30))
                .x_label_formatter(&|year: &i32| year.to_string())
                .y_labels(9)
                .draw()?;

            chart.draw_series(DashedLineSeries::new(
                vec![(x_start, 0.0), (x_end, 0.0)],
                8,
                4,
                BLACK.mix(0.5).stroke_width(1),
            ))?;

            let points: Vec<(i32, f64)> = summaries
                .iter()
                .map(|s| (s.year, s.mean_sentiment.clamp(-1.0, 1.0)))
                .collect();
            if !points.is_empty() {
                chart.draw_series(LineSeries::new(
                    points.iter().copied(),
                    LINE_COLOR.stroke_width(2),
                ))?;
                chart.draw_series(
                    points
                        .iter()
                        .map(|&point| Circle::new(point, 4, LINE_COLOR.filled())),
                )?;
            }

            let total: usize = summaries.iter().map(|s| s.comic_count).sum();
            root.draw(&Text::new(
                format!("Total comics analyzed: {}", format_number(total as u64)),
                (100, 70),
                ("sans-serif", 14).into_font(),
            ))?;

            root.present()?;
        }
        Ok(svg)
    }
}
