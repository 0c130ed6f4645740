//! A single slide: optional solid background, shapes and embedded pictures.
use super::media::Picture;
use super::shape::{Border, Paragraph, Rect, Shape};
use crate::Result;
use std::fmt::Write as FmtWrite;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slide {
    pub(crate) background: Option<String>,
    pub(crate) shapes: Vec<Shape>,
    pub(crate) pictures: Vec<Picture>,
}

impl Slide {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_background(&mut self, color: &str) {
        self.background = Some(color.to_string());
    }

    pub fn add_text_box(&mut self, frame: Rect, paragraphs: Vec<Paragraph>, word_wrap: bool) {
        self.shapes.push(Shape::TextBox {
            frame,
            paragraphs,
            word_wrap,
        });
    }

    pub fn add_rectangle(&mut self, frame: Rect, fill: &str) {
        self.shapes.push(Shape::Rectangle {
            frame,
            fill: fill.to_string(),
        });
    }

    pub fn add_picture(
        &mut self,
        picture: Picture,
        frame: Rect,
        border: Option<Border>,
        description: &str,
    ) {
        self.pictures.push(picture);
        self.shapes.push(Shape::Picture {
            frame,
            picture: self.pictures.len() - 1,
            border,
            description: description.to_string(),
        });
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn pictures(&self) -> &[Picture] {
        &self.pictures
    }

    /// Collect the text of every paragraph, in shape order.
    pub fn texts(&self) -> Vec<&str> {
        self.shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::TextBox { paragraphs, .. } => Some(paragraphs),
                _ => None,
            })
            .flatten()
            .map(|p| p.text.as_str())
            .collect()
    }

    /// Generate the slide part.
    ///
    /// `picture_rel_ids[i]` is the relationship ID of `pictures()[i]`.
    pub(crate) fn to_xml(&self, picture_rel_ids: &[String]) -> Result<String> {
        let mut xml = String::with_capacity(4096);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
        );
        xml.push_str(
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
        );
        xml.push_str(r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#);

        xml.push_str("<p:cSld>");

        // Background must precede the shape tree
        if let Some(ref color) = self.background {
            write!(
                xml,
                r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
                color
            )?;
        }

        xml.push_str("<p:spTree>");
        xml.push_str(
            r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#
        );
        xml.push_str("<p:grpSpPr><a:xfrm>");
        xml.push_str(r#"<a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#);
        xml.push_str(r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/>"#);
        xml.push_str("</a:xfrm></p:grpSpPr>");

        // IDs: 1=group, 2+=shapes
        for (index, shape) in self.shapes.iter().enumerate() {
            let rel_id = match shape {
                Shape::Picture { picture, .. } => picture_rel_ids.get(*picture).map(String::as_str),
                _ => None,
            };
            shape.to_xml(index as u32 + 2, &mut xml, rel_id)?;
        }

        xml.push_str("</p:spTree>");
        xml.push_str("</p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");

        Ok(xml)
    }
}
