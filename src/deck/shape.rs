//! Drawing primitives and their PresentationML serialisation.

use crate::Result;
use std::fmt::Write as FmtWrite;

/// English Metric Units per inch (914400 EMU = 1 inch).
pub const EMU_PER_INCH: i64 = 914_400;

pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

pub(crate) fn escape_xml(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .filter(|c| !matches!(c, '\u{FFFE}' | '\u{FFFF}'))
        .collect::<String>()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Position and size in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Rect {
    pub fn inches(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: inches(x),
            y: inches(y),
            cx: inches(width),
            cy: inches(height),
        }
    }

    fn write_xfrm(&self, xml: &mut String) -> Result<()> {
        write!(
            xml,
            r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
            self.x, self.y, self.cx, self.cy
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

impl Align {
    fn as_attr(self) -> &'static str {
        match self {
            Align::Left => "l",
            Align::Center => "ctr",
        }
    }
}

/// One paragraph holding a single run of uniformly formatted text.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub size_pt: u32,
    pub bold: bool,
    pub color: String,
    pub align: Option<Align>,
    pub space_before_pt: Option<u32>,
    pub space_after_pt: Option<u32>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, size_pt: u32, color: &str) -> Self {
        Self {
            text: text.into(),
            size_pt,
            bold: false,
            color: color.to_string(),
            align: None,
            space_before_pt: None,
            space_after_pt: None,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    pub fn space_before(mut self, pt: u32) -> Self {
        self.space_before_pt = Some(pt);
        self
    }

    pub fn space_after(mut self, pt: u32) -> Self {
        self.space_after_pt = Some(pt);
        self
    }

    fn to_xml(&self, xml: &mut String) -> Result<()> {
        xml.push_str("<a:p>");

        let has_props =
            self.align.is_some() || self.space_before_pt.is_some() || self.space_after_pt.is_some();
        if has_props {
            xml.push_str("<a:pPr");
            if let Some(align) = self.align {
                write!(xml, r#" algn="{}""#, align.as_attr())?;
            }
            xml.push('>');
            if let Some(pt) = self.space_before_pt {
                write!(xml, r#"<a:spcBef><a:spcPts val="{}"/></a:spcBef>"#, pt * 100)?;
            }
            if let Some(pt) = self.space_after_pt {
                write!(xml, r#"<a:spcAft><a:spcPts val="{}"/></a:spcAft>"#, pt * 100)?;
            }
            xml.push_str("</a:pPr>");
        }

        xml.push_str("<a:r>");
        write!(xml, r#"<a:rPr lang="en-US" sz="{}""#, self.size_pt * 100)?;
        if self.bold {
            xml.push_str(r#" b="1""#);
        }
        xml.push_str(r#" dirty="0">"#);
        write!(
            xml,
            r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
            self.color
        )?;
        xml.push_str("</a:rPr>");
        write!(xml, "<a:t>{}</a:t>", escape_xml(&self.text))?;
        xml.push_str("</a:r>");
        xml.push_str("</a:p>");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Border {
    pub color: String,
    pub width_pt: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    TextBox {
        frame: Rect,
        paragraphs: Vec<Paragraph>,
        word_wrap: bool,
    },
    Rectangle {
        frame: Rect,
        fill: String,
    },
    /// Picture referencing the slide's `picture`-th embedded image.
    Picture {
        frame: Rect,
        picture: usize,
        border: Option<Border>,
        description: String,
    },
}

impl Shape {
    pub(crate) fn to_xml(
        &self,
        shape_id: u32,
        xml: &mut String,
        rel_id: Option<&str>,
    ) -> Result<()> {
        match self {
            Shape::TextBox {
                frame,
                paragraphs,
                word_wrap,
            } => {
                xml.push_str("<p:sp><p:nvSpPr>");
                write!(
                    xml,
                    r#"<p:cNvPr id="{}" name="TextBox {}"/>"#,
                    shape_id,
                    shape_id - 1
                )?;
                xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#);

                xml.push_str("<p:spPr>");
                frame.write_xfrm(xml)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/>"#);
                xml.push_str("</p:spPr>");

                xml.push_str("<p:txBody>");
                write!(
                    xml,
                    r#"<a:bodyPr wrap="{}" rtlCol="0" anchor="t"><a:noAutofit/></a:bodyPr>"#,
                    if *word_wrap { "square" } else { "none" }
                )?;
                xml.push_str("<a:lstStyle/>");
                if paragraphs.is_empty() {
                    xml.push_str("<a:p/>");
                }
                for paragraph in paragraphs {
                    paragraph.to_xml(xml)?;
                }
                xml.push_str("</p:txBody></p:sp>");
            }
            Shape::Rectangle { frame, fill } => {
                xml.push_str("<p:sp><p:nvSpPr>");
                write!(
                    xml,
                    r#"<p:cNvPr id="{}" name="Rectangle {}"/>"#,
                    shape_id,
                    shape_id - 1
                )?;
                xml.push_str("<p:cNvSpPr/><p:nvPr/></p:nvSpPr>");

                xml.push_str("<p:spPr>");
                frame.write_xfrm(xml)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
                write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, fill)?;
                xml.push_str("<a:ln><a:noFill/></a:ln>");
                xml.push_str("</p:spPr></p:sp>");
            }
            Shape::Picture {
                frame,
                border,
                description,
                ..
            } => {
                let rel_id = rel_id.ok_or_else(|| {
                    crate::Error::Invariant(format!(
                        "picture shape {} has no relationship",
                        shape_id
                    ))
                })?;

                xml.push_str("<p:pic><p:nvPicPr>");
                write!(
                    xml,
                    r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
                    shape_id,
                    shape_id - 1,
                    escape_xml(description)
                )?;
                xml.push_str(
                    r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#
                );

                write!(
                    xml,
                    r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
                    rel_id
                )?;

                xml.push_str("<p:spPr>");
                frame.write_xfrm(xml)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
                if let Some(border) = border {
                    write!(
                        xml,
                        r#"<a:ln w="{}"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:ln>"#,
                        border.width_pt as i64 * 12_700,
                        border.color
                    )?;
                }
                xml.push_str("</p:spPr></p:pic>");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inches_to_emu() {
        assert_eq!(inches(1.0), 914_400);
        assert_eq!(inches(5.625), 5_143_500);
        assert_eq!(Rect::inches(0.5, 0.0, 9.0, 0.03).cy, 27_432);
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("R&D <fast> \"now\""), "R&amp;D &lt;fast&gt; &quot;now&quot;");
        assert_eq!(escape_xml("bell\u{7}less"), "bellless");
        assert_eq!(escape_xml("non\u{FFFE}char\u{FFFF}s"), "nonchars");
    }

    #[test]
    fn test_text_box_xml() {
        let shape = Shape::TextBox {
            frame: Rect::inches(1.0, 2.0, 8.0, 1.5),
            paragraphs: vec![Paragraph::new("Tom & Jerry", 44, "003366")
                .bold()
                .align(Align::Center)
                .space_after(14)],
            word_wrap: true,
        };

        let mut xml = String::new();
        shape.to_xml(2, &mut xml, None).unwrap();

        assert!(xml.contains(r#"<p:cNvPr id="2" name="TextBox 1"/>"#));
        assert!(xml.contains(r#"<a:off x="914400" y="1828800"/>"#));
        assert!(xml.contains(r#"wrap="square""#));
        assert!(
            xml.contains(r#"<a:pPr algn="ctr"><a:spcAft><a:spcPts val="1400"/></a:spcAft></a:pPr>"#)
        );
        assert!(xml.contains(r#"sz="4400" b="1""#));
        assert!(xml.contains(r#"<a:srgbClr val="003366"/>"#));
        assert!(xml.contains("<a:t>Tom &amp; Jerry</a:t>"));
    }

    #[test]
    fn test_rectangle_has_fill_and_no_line() {
        let shape = Shape::Rectangle {
            frame: Rect::inches(0.0, 0.0, 10.0, 0.5),
            fill: "FF0000".to_string(),
        };
        let mut xml = String::new();
        shape.to_xml(3, &mut xml, None).unwrap();
        assert!(
            xml.contains(r#"<a:solidFill><a:srgbClr val="FF0000"/></a:solidFill><a:ln><a:noFill/></a:ln>"#)
        );
    }

    #[test]
    fn test_picture_requires_relationship() {
        let shape = Shape::Picture {
            frame: Rect::inches(6.0, 2.0, 3.5, 2.0),
            picture: 0,
            border: Some(Border {
                color: "003366".to_string(),
                width_pt: 2,
            }),
            description: "beach".to_string(),
        };

        let mut xml = String::new();
        assert!(shape.to_xml(4, &mut xml, None).is_err());

        let mut xml = String::new();
        shape.to_xml(4, &mut xml, Some("rId2")).unwrap();
        assert!(xml.contains(r#"<a:blip r:embed="rId2"/>"#));
        assert!(xml.contains(r#"<a:ln w="25400">"#));
        assert!(xml.contains(r#"descr="beach""#));
    }
}
