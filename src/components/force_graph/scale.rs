//! Zoom-aware sizing and label wrapping.

/// Font size used when an element has no `font-size` attribute.
pub const DEFAULT_FONT_PX: f64 = 11.0;

/// Rough advance width of one character relative to the font size.
const CHAR_WIDTH_RATIO: f64 = 0.6;

/// On-screen font size in world units: labels grow with zoom but stay legible when zoomed out.
pub fn font_px(size: Option<f64>, k: f64) -> f64 {
	size.unwrap_or(DEFAULT_FONT_PX) / k.max(0.5)
}

/// Split `text` into lines no wider than `max_width` at `font_px`.
///
/// Words longer than a line are kept whole.
pub fn wrap_label(text: &str, max_width: Option<f64>, font_px: f64) -> Vec<String> {
	let Some(max_width) = max_width.filter(|w| *w > 0.0) else {
		return if text.is_empty() {
			Vec::new()
		} else {
			vec![text.to_string()]
		};
	};
	let max_chars = ((max_width / (font_px * CHAR_WIDTH_RATIO)).floor() as usize).max(1);

	let mut lines = Vec::new();
	let mut line = String::new();
	for word in text.split_whitespace() {
		let needed = if line.is_empty() {
			word.chars().count()
		} else {
			line.chars().count() + 1 + word.chars().count()
		};
		if needed > max_chars && !line.is_empty() {
			lines.push(std::mem::take(&mut line));
		}
		if !line.is_empty() {
			line.push(' ');
		}
		line.push_str(word);
	}
	if !line.is_empty() {
		lines.push(line);
	}
	lines
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn font_scales_inversely_with_zoom_down_to_half() {
		assert_eq!(font_px(None, 1.0), DEFAULT_FONT_PX);
		assert_eq!(font_px(Some(20.0), 2.0), 10.0);
		assert_eq!(font_px(Some(20.0), 0.1), 40.0);
	}

	#[test]
	fn wraps_on_word_boundaries() {
		// 10px font, 6px per char, 36px wide: six characters per line
		let lines = wrap_label("leads to something", Some(36.0), 10.0);
		assert_eq!(lines, ["leads", "to", "something"]);
		let lines = wrap_label("a b c d", Some(36.0), 10.0);
		assert_eq!(lines, ["a b c", "d"]);
	}

	#[test]
	fn no_cap_means_single_line() {
		assert_eq!(wrap_label("one long label", None, 10.0), ["one long label"]);
		assert!(wrap_label("", None, 10.0).is_empty());
	}
}
