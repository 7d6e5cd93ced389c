//! Terminal rendering of the calibration-factor distribution.
//!
//! Purely presentational: given the ratio vector `w_i/d_i` from a
//! [`crate::CalibrationResult`], render a unicode histogram so the analyst
//! can eyeball how far calibration pushed the weights. Ratios piling up
//! near 1 mean the margins were nearly satisfied by the design weights
//! already; a wide spread or mass at the bound multipliers means the
//! calibration worked hard.

use colored::Colorize;

/// Number of histogram bins.
const BINS: usize = 20;

/// Maximum bar width in characters.
const BAR_WIDTH: usize = 40;

/// Render a histogram of calibration ratios for terminal display.
///
/// Non-finite ratios are skipped. Returns a short notice string when
/// there is nothing to plot.
pub fn render_ratio_histogram(ratios: &[f64]) -> String {
    let finite: Vec<f64> = ratios.iter().copied().filter(|r| r.is_finite()).collect();
    if finite.is_empty() {
        return "no calibration ratios to display".to_string();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut output = String::new();
    output.push_str(&format!(
        "{} ({} units, ratios in [{:.3}, {:.3}])\n",
        "Calibration factor distribution".bold(),
        finite.len(),
        min,
        max
    ));

    if max == min {
        output.push_str(&format!(
            "  all ratios equal {:.3}: {}\n",
            min,
            "█".repeat(BAR_WIDTH).cyan()
        ));
        return output;
    }

    let width = (max - min) / BINS as f64;
    let mut counts = [0usize; BINS];
    for &r in &finite {
        let bin = (((r - min) / width) as usize).min(BINS - 1);
        counts[bin] += 1;
    }
    let peak = counts.iter().copied().max().unwrap_or(1).max(1);

    for (i, &count) in counts.iter().enumerate() {
        let low = min + i as f64 * width;
        let high = low + width;
        let bar_len = (count * BAR_WIDTH).div_ceil(peak).min(BAR_WIDTH);
        let bar = if count > 0 {
            "█".repeat(bar_len)
        } else {
            String::new()
        };
        output.push_str(&format!(
            "  {:>7.3} .. {:>7.3} | {} {}\n",
            low,
            high,
            bar.cyan(),
            count
        ));
    }
    output
}
