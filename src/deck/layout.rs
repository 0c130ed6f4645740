//! Slide composition rules.
//!
//! Every deck has the same shape: title slide, table of contents, one slide
//! per outline entry, conclusion and a closing slide. Font sizes shrink as
//! text grows so content stays inside its box.

use super::media::Picture;
use super::shape::{Align, Border, Paragraph, Rect};
use super::slide::Slide;
use crate::models::{Outline, ThemeColor};

pub const DARK_GRAY: &str = "505050";
pub const WHITE: &str = "FFFFFF";

pub const SUBTITLE: &str = "Generated by AI Agent";
pub const EMPTY_SLIDE_PLACEHOLDER: &str = "(No content generated)";
pub const CLOSING_TEXT: &str = "Thank You";

const PICTURE_X: f64 = 6.0;
const PICTURE_Y: f64 = 2.0;
const PICTURE_WIDTH: f64 = 3.5;
const PICTURE_MAX_HEIGHT: f64 = 3.4;

/// Font size (pt) and paragraph spacing (pt).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSizing {
    pub font_pt: u32,
    pub spacing_pt: u32,
}

const fn sizing(font_pt: u32, spacing_pt: u32) -> TextSizing {
    TextSizing {
        font_pt,
        spacing_pt,
    }
}

pub fn title_font_size(title: &str) -> u32 {
    match title.chars().count() {
        n if n > 40 => 32,
        n if n > 25 => 38,
        _ => 44,
    }
}

pub fn content_title_font_size(title: &str) -> u32 {
    match title.chars().count() {
        n if n > 50 => 24,
        n if n > 35 => 26,
        _ => 28,
    }
}

pub fn toc_sizing(item_count: usize) -> TextSizing {
    match item_count {
        n if n > 8 => sizing(14, 8),
        n if n > 5 => sizing(16, 12),
        _ => sizing(20, 14),
    }
}

pub fn bullet_sizing(total_chars: usize) -> TextSizing {
    match total_chars {
        n if n > 600 => sizing(12, 4),
        n if n > 400 => sizing(14, 6),
        _ => sizing(16, 8),
    }
}

pub fn conclusion_sizing(total_chars: usize) -> TextSizing {
    match total_chars {
        n if n > 500 => sizing(14, 8),
        n if n > 300 => sizing(16, 10),
        _ => sizing(20, 14),
    }
}

fn total_chars(items: &[String]) -> usize {
    items.iter().map(|s| s.chars().count()).sum()
}

fn bullet(text: &str) -> String {
    format!("\u{2022} {}", text)
}

/// Compose the full deck.
///
/// `pictures[i]` is the (optional) image for `outline.slides[i]`; missing
/// entries mean "no picture".
pub fn compose(outline: &Outline, pictures: &[Option<Picture>], theme: ThemeColor) -> Vec<Slide> {
    let accent = theme.hex();
    let mut slides = Vec::with_capacity(outline.deck_slide_count());

    slides.push(title_slide(&outline.presentation_title, &accent));
    slides.push(toc_slide(&outline.table_of_contents, &accent));

    for (index, entry) in outline.slides.iter().enumerate() {
        let picture = pictures.get(index).cloned().flatten();
        let bullets: Vec<String> = entry
            .content
            .iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
        slides.push(content_slide(
            &entry.title,
            &bullets,
            picture,
            entry.image_query().unwrap_or(&entry.title),
            &accent,
        ));
    }

    slides.push(conclusion_slide(
        &outline.conclusion.title,
        &outline.conclusion.content,
        &accent,
    ));
    slides.push(closing_slide(&accent));

    slides
}

fn separator(slide: &mut Slide, frame: Rect, accent: &str) {
    slide.add_rectangle(frame, accent);
}

fn title_slide(title: &str, accent: &str) -> Slide {
    let mut slide = Slide::new();

    // Decorative bar
    slide.add_rectangle(Rect::inches(0.0, 0.0, 10.0, 0.5), accent);

    slide.add_text_box(
        Rect::inches(1.0, 2.0, 8.0, 1.5),
        vec![Paragraph::new(title, title_font_size(title), accent)
            .bold()
            .align(Align::Center)],
        true,
    );
    slide.add_text_box(
        Rect::inches(1.0, 3.5, 8.0, 1.0),
        vec![Paragraph::new(SUBTITLE, 20, DARK_GRAY).align(Align::Center)],
        false,
    );

    slide
}

fn toc_slide(items: &[String], accent: &str) -> Slide {
    let mut slide = Slide::new();

    slide.add_text_box(
        Rect::inches(0.5, 0.5, 9.0, 1.0),
        vec![Paragraph::new("Table of Contents", 32, accent)
            .bold()
            .align(Align::Center)],
        false,
    );
    separator(&mut slide, Rect::inches(4.0, 1.5, 2.0, 0.05), accent);

    let sizing = toc_sizing(items.len());
    let paragraphs = |items: &[String], align: Option<Align>| -> Vec<Paragraph> {
        items
            .iter()
            .map(|item| {
                let p = Paragraph::new(bullet(item), sizing.font_pt, DARK_GRAY)
                    .space_after(sizing.spacing_pt);
                match align {
                    Some(a) => p.align(a),
                    None => p,
                }
            })
            .collect()
    };

    if items.len() > 4 {
        let mid = items.len().div_ceil(2);
        let (left, right) = items.split_at(mid);
        slide.add_text_box(Rect::inches(1.0, 2.0, 4.0, 3.0), paragraphs(left, None), true);
        slide.add_text_box(Rect::inches(5.5, 2.0, 4.0, 3.0), paragraphs(right, None), true);
    } else {
        slide.add_text_box(
            Rect::inches(2.0, 2.0, 6.0, 3.0),
            paragraphs(items, Some(Align::Left)),
            true,
        );
    }

    slide
}

fn picture_frame(picture: &Picture) -> Rect {
    let mut width = PICTURE_WIDTH;
    let mut height = width * picture.aspect_ratio();
    if height > PICTURE_MAX_HEIGHT {
        width *= PICTURE_MAX_HEIGHT / height;
        height = PICTURE_MAX_HEIGHT;
    }
    Rect::inches(PICTURE_X, PICTURE_Y, width, height)
}

fn content_slide(
    title: &str,
    bullets: &[String],
    picture: Option<Picture>,
    description: &str,
    accent: &str,
) -> Slide {
    let mut slide = Slide::new();

    slide.add_text_box(
        Rect::inches(0.5, 0.3, 9.0, 0.8),
        vec![Paragraph::new(title, content_title_font_size(title), accent).bold()],
        true,
    );
    separator(&mut slide, Rect::inches(0.5, 1.1, 9.0, 0.03), accent);

    let content_width = if picture.is_some() { 5.0 } else { 9.0 };

    let placeholder = [EMPTY_SLIDE_PLACEHOLDER.to_string()];
    let bullets = if bullets.is_empty() { &placeholder[..] } else { bullets };
    let sizing = bullet_sizing(total_chars(bullets));

    slide.add_text_box(
        Rect::inches(0.5, 1.4, content_width, 3.9),
        bullets
            .iter()
            .map(|b| {
                Paragraph::new(bullet(b), sizing.font_pt, DARK_GRAY)
                    .space_before(sizing.spacing_pt)
                    .space_after(sizing.spacing_pt)
            })
            .collect(),
        true,
    );

    if let Some(picture) = picture {
        let frame = picture_frame(&picture);
        slide.add_picture(
            picture,
            frame,
            Some(Border {
                color: accent.to_string(),
                width_pt: 2,
            }),
            description,
        );
    }

    slide
}

fn conclusion_slide(title: &str, points: &[String], accent: &str) -> Slide {
    let mut slide = Slide::new();

    slide.add_text_box(
        Rect::inches(0.5, 0.3, 9.0, 0.8),
        vec![Paragraph::new(title, 28, accent).bold()],
        false,
    );
    separator(&mut slide, Rect::inches(0.5, 1.1, 9.0, 0.03), accent);

    let sizing = conclusion_sizing(total_chars(points));
    slide.add_text_box(
        Rect::inches(1.0, 1.5, 8.0, 3.5),
        points
            .iter()
            .map(|p| {
                Paragraph::new(bullet(p), sizing.font_pt, DARK_GRAY).space_after(sizing.spacing_pt)
            })
            .collect(),
        true,
    );

    slide
}

fn closing_slide(accent: &str) -> Slide {
    let mut slide = Slide::new();
    slide.set_background(accent);
    slide.add_text_box(
        Rect::inches(2.0, 2.0, 6.0, 2.0),
        vec![Paragraph::new(CLOSING_TEXT, 54, WHITE)
            .bold()
            .align(Align::Center)],
        true,
    );
    slide
}
