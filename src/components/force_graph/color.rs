//! Just enough CSS colour parsing to tell dark backgrounds from light ones.

use super::options::DarkMode;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Rgba {
	/// Relative luminance in [0, 1] (sRGB, linearised).
	pub fn luminance(&self) -> f64 {
		fn channel(c: u8) -> f64 {
			let c = c as f64 / 255.0;
			if c <= 0.03928 {
				c / 12.92
			} else {
				((c + 0.055) / 1.055).powf(2.4)
			}
		}
		0.2126 * channel(self.r) + 0.7152 * channel(self.g) + 0.0722 * channel(self.b)
	}
}

pub fn parse_css_color(input: &str) -> Option<Rgba> {
	let s = input.trim().to_ascii_lowercase();
	if let Some(hex) = s.strip_prefix('#') {
		return parse_hex(hex);
	}
	if let Some(args) = s
		.strip_prefix("rgba(")
		.or_else(|| s.strip_prefix("rgb("))
		.and_then(|rest| rest.strip_suffix(')'))
	{
		let parts: Vec<&str> = args
			.split([',', ' ', '/'])
			.filter(|p| !p.is_empty())
			.collect();
		if parts.len() < 3 {
			return None;
		}
		let channel = |p: &str| p.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0) as u8);
		let a = match parts.get(3) {
			Some(p) => p.parse::<f64>().ok()?.clamp(0.0, 1.0),
			None => 1.0,
		};
		return Some(Rgba {
			r: channel(parts[0])?,
			g: channel(parts[1])?,
			b: channel(parts[2])?,
			a,
		});
	}
	let (r, g, b, a) = match s.as_str() {
		"white" => (255, 255, 255, 1.0),
		"black" => (0, 0, 0, 1.0),
		"transparent" => (0, 0, 0, 0.0),
		_ => return None,
	};
	Some(Rgba { r, g, b, a })
}

fn parse_hex(hex: &str) -> Option<Rgba> {
	let digit = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
	match hex.len() {
		3 => Some(Rgba {
			r: digit(0, 1)? * 17,
			g: digit(1, 1)? * 17,
			b: digit(2, 1)? * 17,
			a: 1.0,
		}),
		6 => Some(Rgba {
			r: digit(0, 2)?,
			g: digit(2, 2)?,
			b: digit(4, 2)?,
			a: 1.0,
		}),
		_ => None,
	}
}

/// Whether text over `background` should use the dark palette.
pub fn is_dark(mode: DarkMode, background: &str) -> bool {
	match mode {
		DarkMode::Dark => true,
		DarkMode::Light => false,
		DarkMode::Auto => parse_css_color(background)
			// Mostly-transparent backgrounds show the (light) page through.
			.filter(|c| c.a > 0.5)
			.is_some_and(|c| c.luminance() < 0.3),
	}
}

pub fn is_transparent(background: &str) -> bool {
	background.trim().is_empty() || parse_css_color(background).is_some_and(|c| c.a == 0.0)
}
