//! Title-frequency bar chart rasterized straight into an RGBA buffer.
//!
//! Bars are numbered left to right; the page renders a legend table that maps
//! each number to its title and count. Past [`MAX_BARS`] titles the tail is
//! folded into a single "Other" bar.

use std::collections::HashMap;

use super::ReportError;
use crate::tickets::Ticket;

pub const CHART_WIDTH: u32 = 1000;
pub const CHART_HEIGHT: u32 = 500;
/// Widest series drawn; keeps every bar at least a few pixels wide.
pub const MAX_BARS: usize = 40;

const MARGIN_LEFT: u32 = 60;
const MARGIN_RIGHT: u32 = 20;
const MARGIN_TOP: u32 = 20;
const MARGIN_BOTTOM: u32 = 40;

const BACKGROUND: [u8; 3] = [255, 255, 255];
const BAR: [u8; 3] = [135, 206, 235];
const BAR_EDGE: [u8; 3] = [70, 130, 180];
const AXIS: [u8; 3] = [33, 33, 33];
const GRID: [u8; 3] = [225, 225, 225];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCount {
    pub title: String,
    pub count: usize,
}

/// Counts identical titles, most frequent first, ties by title.
pub fn title_frequencies(tickets: &[Ticket]) -> Vec<TitleCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for ticket in tickets.iter().filter(|t| !t.deleted) {
        *counts.entry(ticket.title.as_str()).or_default() += 1;
    }

    let mut frequencies: Vec<TitleCount> = counts
        .into_iter()
        .map(|(title, count)| TitleCount {
            title: title.to_string(),
            count,
        })
        .collect();
    frequencies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.title.cmp(&b.title)));
    frequencies
}

/// Keeps the `MAX_BARS - 1` most frequent titles and sums the rest into one
/// trailing entry. Shorter series pass through untouched.
pub fn chart_series(mut frequencies: Vec<TitleCount>) -> Vec<TitleCount> {
    if frequencies.len() <= MAX_BARS {
        return frequencies;
    }

    let tail = frequencies.split_off(MAX_BARS - 1);
    frequencies.push(TitleCount {
        title: format!("Other ({} titles)", tail.len()),
        count: tail.iter().map(|f| f.count).sum(),
    });
    frequencies
}

struct Canvas {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        let mut pixels = vec![255u8; (width * height * 4) as usize];
        for chunk in pixels.chunks_mut(4) {
            chunk[..3].copy_from_slice(&BACKGROUND);
        }
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Fills `[x0, x1) x [y0, y1)`, clipped to the canvas.
    fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, color: [u8; 3]) {
        let (x1, y1) = (x1.min(self.width), y1.min(self.height));
        for y in y0..y1 {
            for x in x0..x1 {
                let idx = ((y * self.width + x) * 4) as usize;
                self.pixels[idx..idx + 3].copy_from_slice(&color);
                self.pixels[idx + 3] = 255;
            }
        }
    }

    fn encode(self) -> Result<Vec<u8>, ReportError> {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            let mut writer = encoder
                .write_header()
                .map_err(|e| ReportError::Render(e.to_string()))?;
            writer
                .write_image_data(&self.pixels)
                .map_err(|e| ReportError::Render(e.to_string()))?;
            writer
                .finish()
                .map_err(|e| ReportError::Render(e.to_string()))?;
        }
        Ok(png_data)
    }
}

/// Horizontal extent of bar `index` out of `len`, evenly spread over the
/// plot area.
fn bar_span(index: usize, len: usize) -> (u32, u32) {
    let plot_width = (CHART_WIDTH - MARGIN_RIGHT - MARGIN_LEFT) as u64;
    let (index, len) = (index as u64, len.max(1) as u64);

    let slot_start = plot_width * index / len;
    let slot_end = plot_width * (index + 1) / len;
    let slot = (slot_end - slot_start).max(1);
    let bar_width = (slot * 3 / 5).max(1);

    let x0 = MARGIN_LEFT as u64 + slot_start + (slot - bar_width) / 2;
    (x0 as u32, (x0 + bar_width) as u32)
}

/// Renders one bar per entry, scaled to the largest count. An empty slice
/// yields the bare axes.
pub fn render_bar_chart(frequencies: &[TitleCount]) -> Result<Vec<u8>, ReportError> {
    let mut canvas = Canvas::new(CHART_WIDTH, CHART_HEIGHT);

    let plot_left = MARGIN_LEFT;
    let plot_right = CHART_WIDTH - MARGIN_RIGHT;
    let plot_top = MARGIN_TOP;
    let plot_bottom = CHART_HEIGHT - MARGIN_BOTTOM;
    let plot_height = plot_bottom - plot_top;

    let max_count = frequencies.iter().map(|f| f.count).max().unwrap_or(0);

    if max_count > 0 {
        // One gridline per unit while that stays readable.
        let steps = max_count.min(10) as u32;
        for step in 1..=steps {
            let y = plot_bottom - plot_height * step / steps;
            canvas.fill_rect(plot_left, y, plot_right, y + 1, GRID);
        }

        for (i, entry) in frequencies.iter().enumerate() {
            let bar_height =
                ((entry.count as u64 * plot_height as u64) / max_count as u64) as u32;
            let (x0, x1) = bar_span(i, frequencies.len());
            let bar_width = x1 - x0;
            let y0 = plot_bottom - bar_height;

            canvas.fill_rect(x0, y0, x1, plot_bottom, BAR_EDGE);
            if bar_width > 2 && bar_height > 1 {
                canvas.fill_rect(x0 + 1, y0 + 1, x1 - 1, plot_bottom, BAR);
            }
            // Tick under each bar.
            let tick_x = x0 + bar_width / 2;
            canvas.fill_rect(tick_x, plot_bottom, tick_x + 1, plot_bottom + 6, AXIS);
        }
    }

    canvas.fill_rect(plot_left - 2, plot_top, plot_left, plot_bottom + 2, AXIS);
    canvas.fill_rect(plot_left - 2, plot_bottom, plot_right, plot_bottom + 2, AXIS);

    canvas.encode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn ticket(id: i32, title: &str, deleted: bool) -> Ticket {
        Ticket {
            id,
            title: title.into(),
            description: "d".into(),
            status: "Open".into(),
            name: "n".into(),
            office: "o".into(),
            created_at: Utc::now().naive_utc(),
            deleted,
        }
    }

    #[test]
    fn test_frequencies_order_by_count_then_title() {
        let tickets = vec![
            ticket(1, "VPN", false),
            ticket(2, "Printer", false),
            ticket(3, "VPN", false),
            ticket(4, "Email", false),
            ticket(5, "Printer", false),
            ticket(6, "Badge", false),
        ];

        let freq = title_frequencies(&tickets);
        let pairs: Vec<(&str, usize)> = freq.iter().map(|f| (f.title.as_str(), f.count)).collect();
        assert_eq!(
            pairs,
            vec![("Printer", 2), ("VPN", 2), ("Badge", 1), ("Email", 1)]
        );
    }

    #[test]
    fn test_frequencies_skip_deleted() {
        let tickets = vec![ticket(1, "VPN", true), ticket(2, "Printer", false)];
        let freq = title_frequencies(&tickets);
        assert_eq!(freq.len(), 1);
        assert_eq!(freq[0].title, "Printer");
    }

    #[test]
    fn test_render_produces_png() {
        let freq = vec![
            TitleCount {
                title: "Printer".into(),
                count: 3,
            },
            TitleCount {
                title: "VPN".into(),
                count: 1,
            },
        ];
        let bytes = render_bar_chart(&freq).expect("render");
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);

        let decoder = png::Decoder::new(bytes.as_slice());
        let reader = decoder.read_info().expect("decode");
        assert_eq!(reader.info().width, CHART_WIDTH);
        assert_eq!(reader.info().height, CHART_HEIGHT);
    }

    #[test]
    fn test_render_empty_chart() {
        let bytes = render_bar_chart(&[]).expect("render");
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);
    }

    fn distinct_titles(n: usize) -> Vec<TitleCount> {
        (0..n)
            .map(|i| TitleCount {
                title: format!("t{i:04}"),
                count: 1,
            })
            .collect()
    }

    #[test]
    fn test_series_folds_tail_into_other() {
        let series = chart_series(distinct_titles(2000));

        assert_eq!(series.len(), MAX_BARS);
        assert_eq!(series[0].title, "t0000");
        let other = &series[MAX_BARS - 1];
        assert_eq!(other.title, format!("Other ({} titles)", 2000 - (MAX_BARS - 1)));
        assert_eq!(other.count, 2000 - (MAX_BARS - 1));
        assert_eq!(series.iter().map(|f| f.count).sum::<usize>(), 2000);
    }

    #[test]
    fn test_series_keeps_short_lists() {
        let freq = distinct_titles(MAX_BARS);
        assert_eq!(chart_series(freq.clone()), freq);
    }

    #[test]
    fn test_bars_stay_inside_plot() {
        let plot_right = CHART_WIDTH - MARGIN_RIGHT;
        let mut previous_end = MARGIN_LEFT;
        for i in 0..MAX_BARS {
            let (x0, x1) = bar_span(i, MAX_BARS);
            assert!(x0 >= previous_end, "bar {i} overlaps its neighbour");
            assert!(x1 <= plot_right, "bar {i} is clipped");
            assert!(x1 - x0 >= 3, "bar {i} is too thin");
            previous_end = x1;
        }
    }

    #[test]
    fn test_many_titles_still_render() {
        let series = chart_series(distinct_titles(2000));
        assert!(render_bar_chart(&series).is_ok());
    }
}
