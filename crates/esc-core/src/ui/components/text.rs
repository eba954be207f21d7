//! Text components: single-line labels and the word-wrapped log

use crate::ui::core::Drawable;
use crate::ui::styling::Style;
use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, iso_8859_1};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Alignment, Baseline, Text as EgText, TextStyleBuilder};

/// Font presets. Latin-1 fonts so `µs` renders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextSize {
    /// 5x8
    Small,
    /// 6x10
    Medium,
    /// 10x20
    Large,
}

impl TextSize {
    pub fn font(&self) -> &'static MonoFont<'static> {
        match self {
            TextSize::Small => &iso_8859_1::FONT_5X8,
            TextSize::Medium => &iso_8859_1::FONT_6X10,
            TextSize::Large => &iso_8859_1::FONT_10X20,
        }
    }
}

/// Anchor point for text inside `bounds` given the alignment and padding.
fn anchor(bounds: &Rectangle, style: &Style, alignment: Alignment, y: i32) -> Point {
    let x = match alignment {
        Alignment::Left => bounds.top_left.x + style.padding.left as i32,
        Alignment::Center => bounds.center().x,
        Alignment::Right => {
            bounds.top_left.x + bounds.size.width as i32 - style.padding.right as i32 - 1
        }
    };
    Point::new(x, y)
}

/// Single line of styled text, up to 64 bytes
///
/// ```ignore
/// let readout = TextComponent::new(bounds, "off", TextSize::Large)
///     .with_alignment(Alignment::Center);
/// ```
pub struct TextComponent {
    bounds: Rectangle,
    text: heapless::String<64>,
    size: TextSize,
    alignment: Alignment,
    style: Style,
    dirty: bool,
}

impl TextComponent {
    pub fn new(bounds: Rectangle, text: &str, size: TextSize) -> Self {
        let mut component = Self {
            bounds,
            text: heapless::String::new(),
            size,
            alignment: Alignment::Left,
            style: Style::default(),
            dirty: true,
        };
        component.set_text(text);
        component
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Replace the text; marks dirty only when it changed.
    ///
    /// Text that does not fit is cut at the last whole character.
    pub fn set_text(&mut self, text: &str) {
        let mut new_text = heapless::String::<64>::new();
        for c in text.chars() {
            if new_text.push(c).is_err() {
                break;
            }
        }

        if self.text != new_text {
            self.text = new_text;
            self.dirty = true;
        }
    }

    /// Change the text color; marks dirty only when it changed.
    pub fn set_color(&mut self, color: Rgb565) {
        if self.style.foreground_color != Some(color) {
            self.style.foreground_color = Some(color);
            self.dirty = true;
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Drawable for TextComponent {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        if self.style.background_color.is_some() {
            self.bounds
                .into_styled(self.style.to_primitive_style())
                .draw(display)?;
        }

        let text_color = self.style.foreground_color.unwrap_or(Rgb565::WHITE);
        let character_style = MonoTextStyle::new(self.size.font(), text_color);
        let text_style = TextStyleBuilder::new()
            .alignment(self.alignment)
            .baseline(Baseline::Middle)
            .build();

        let position = anchor(&self.bounds, &self.style, self.alignment, self.bounds.center().y);
        EgText::with_text_style(&self.text, position, character_style, text_style)
            .draw(display)?;

        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

/// Bytes per wrapped line; a full line of two-byte Latin-1 characters fits
const LINE_BYTES: usize = 128;

type Line = heapless::String<LINE_BYTES>;

/// Longest prefix of `s` with at most `max_chars` characters and `max_bytes` bytes.
fn take_chunk(s: &str, max_chars: usize, max_bytes: usize) -> &str {
    let mut end = 0;
    for (count, (i, c)) in s.char_indices().enumerate() {
        if count == max_chars || i + c.len_utf8() > max_bytes {
            break;
        }
        end = i + c.len_utf8();
    }
    &s[..end]
}

/// Word-wrapped text block, used for the panel log
///
/// Holds up to 16 lines of at most 64 characters. Words longer than a line
/// are split.
pub struct MultiLineText {
    bounds: Rectangle,
    lines: heapless::Vec<Line, 16>,
    size: TextSize,
    alignment: Alignment,
    line_spacing: u32,
    style: Style,
    dirty: bool,
}

impl MultiLineText {
    pub fn new(bounds: Rectangle, text: &str, size: TextSize) -> Self {
        let mut component = Self {
            bounds,
            lines: heapless::Vec::new(),
            size,
            alignment: Alignment::Left,
            line_spacing: 2,
            style: Style::default(),
            dirty: true,
        };

        component.set_text(text);
        component
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self.rewrap();
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Change the text color; marks dirty only when it changed.
    pub fn set_color(&mut self, color: Rgb565) {
        if self.style.foreground_color != Some(color) {
            self.style.foreground_color = Some(color);
            self.dirty = true;
        }
    }

    /// Characters that fit on one line inside the padding
    pub fn max_chars(&self) -> usize {
        let usable = self
            .bounds
            .size
            .width
            .saturating_sub(self.style.padding.horizontal());
        let per_char = self.size.font().character_size.width + self.size.font().character_spacing;
        ((usable / per_char.max(1)) as usize).clamp(1, 64)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.as_str())
    }

    pub fn set_text(&mut self, text: &str) {
        self.lines.clear();
        let max_chars = self.max_chars();

        for paragraph in text.split('\n') {
            let mut current = Line::new();
            let mut current_chars = 0usize;

            for word in paragraph.split_whitespace() {
                let mut rest = word;

                // Split words that can never fit on a line
                loop {
                    let chunk = take_chunk(rest, max_chars, LINE_BYTES);
                    if chunk.len() == rest.len() {
                        break;
                    }
                    self.push_line(&mut current, &mut current_chars);
                    current.push_str(chunk).ok();
                    current_chars = chunk.chars().count();
                    self.push_line(&mut current, &mut current_chars);
                    rest = &rest[chunk.len()..];
                }

                let word_chars = rest.chars().count();
                let gap = usize::from(current_chars > 0);
                if current_chars + gap + word_chars > max_chars
                    || current.len() + gap + rest.len() > LINE_BYTES
                {
                    self.push_line(&mut current, &mut current_chars);
                }
                if current_chars > 0 {
                    current.push(' ').ok();
                    current_chars += 1;
                }
                current.push_str(rest).ok();
                current_chars += word_chars;
            }

            self.push_line(&mut current, &mut current_chars);
        }

        self.dirty = true;
    }

    fn push_line(&mut self, current: &mut Line, current_chars: &mut usize) {
        if !current.is_empty() {
            self.lines.push(current.clone()).ok();
        }
        current.clear();
        *current_chars = 0;
    }

    fn rewrap(&mut self) {
        let mut text = alloc::string::String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                text.push(' ');
            }
            text.push_str(line);
        }
        self.set_text(&text);
    }
}

impl Drawable for MultiLineText {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        if self.style.background_color.is_some() || self.style.border_width > 0 {
            self.bounds
                .into_styled(self.style.to_primitive_style())
                .draw(display)?;
        }

        let text_color = self.style.foreground_color.unwrap_or(Rgb565::WHITE);
        let character_style = MonoTextStyle::new(self.size.font(), text_color);
        let text_style = TextStyleBuilder::new()
            .alignment(self.alignment)
            .baseline(Baseline::Top)
            .build();
        let line_height = self.size.font().character_size.height + self.line_spacing;
        let bottom = self.bounds.top_left.y + self.bounds.size.height as i32;

        let mut y = self.bounds.top_left.y + self.style.padding.top as i32;
        for line in &self.lines {
            if y + line_height as i32 > bottom {
                break;
            }
            let position = anchor(&self.bounds, &self.style, self.alignment, y);
            EgText::with_text_style(line, position, character_style, text_style).draw(display)?;
            y += line_height as i32;
        }

        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
