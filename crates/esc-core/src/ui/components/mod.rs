//! UI components library

pub mod button;
pub mod slider;
pub mod text;

pub use button::Button;
pub use slider::VerticalSlider;
pub use text::{MultiLineText, TextComponent, TextSize};
