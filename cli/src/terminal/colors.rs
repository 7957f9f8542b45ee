use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 120, g: 200, b: 255 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 190, b: 90 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 210, g: 210, b: 210 };

pub const SUCCESS: Color = Color::Green;
pub const FAILED: Color = Color::Red;
pub const TIMEOUT: Color = Color::Yellow;
pub const ERROR: Color = Color::BrightRed;
