//! PPTX package assembly.
//!
//! Writes the fixed set of parts a viewer needs (content types, package
//! relationships, presentation, one master, one blank layout, theme and
//! document properties) plus one part per slide and its media into a zip.

use super::media::PictureFormat;
use super::shape::{escape_xml, inches};
use super::slide::Slide;
use crate::models::ThemeColor;
use crate::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const SLIDE_MASTER_XML: &str = include_str!("../../data/pptx/slide_master.xml");
const SLIDE_LAYOUT_XML: &str = include_str!("../../data/pptx/slide_layout.xml");
const THEME_XML: &str = include_str!("../../data/pptx/theme.xml");

const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT_BASE: &str = "application/vnd.openxmlformats-officedocument";
const CT_CORE_PROPS: &str = "application/vnd.openxmlformats-package.core-properties+xml";

pub const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Builder for a complete `.pptx` file.
#[derive(Debug, Clone)]
pub struct PptxPackage {
    title: String,
    theme: ThemeColor,
    created: DateTime<Utc>,
    slide_width: i64,
    slide_height: i64,
}

impl PptxPackage {
    /// Widescreen (16:9) package, 10 in x 5.625 in.
    pub fn new(title: &str, theme: ThemeColor) -> Self {
        Self {
            title: title.to_string(),
            theme,
            created: Utc::now(),
            slide_width: inches(10.0),
            slide_height: inches(5.625),
        }
    }

    /// Serialise `slides` into an in-memory zip archive.
    pub fn write(&self, slides: &[Slide]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let deflated =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let slide_count = slides.len();

        add_part(
            &mut zip,
            "[Content_Types].xml",
            self.content_types_xml(slide_count)?.as_bytes(),
            deflated,
        )?;
        add_part(&mut zip, "_rels/.rels", self.package_rels_xml().as_bytes(), deflated)?;
        add_part(&mut zip, "docProps/core.xml", self.core_props_xml()?.as_bytes(), deflated)?;
        add_part(
            &mut zip,
            "docProps/app.xml",
            self.app_props_xml(slide_count)?.as_bytes(),
            deflated,
        )?;
        add_part(
            &mut zip,
            "ppt/presentation.xml",
            self.presentation_xml(slide_count)?.as_bytes(),
            deflated,
        )?;
        add_part(
            &mut zip,
            "ppt/_rels/presentation.xml.rels",
            self.presentation_rels_xml(slide_count)?.as_bytes(),
            deflated,
        )?;
        add_part(&mut zip, "ppt/presProps.xml", PRES_PROPS_XML.as_bytes(), deflated)?;
        add_part(
            &mut zip,
            "ppt/slideMasters/slideMaster1.xml",
            SLIDE_MASTER_XML.as_bytes(),
            deflated,
        )?;
        add_part(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            relationships_xml(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                ("rId2", "theme", "../theme/theme1.xml"),
            ])?
            .as_bytes(),
            deflated,
        )?;
        add_part(
            &mut zip,
            "ppt/slideLayouts/slideLayout1.xml",
            SLIDE_LAYOUT_XML.as_bytes(),
            deflated,
        )?;
        add_part(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            relationships_xml(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")])?
                .as_bytes(),
            deflated,
        )?;
        add_part(
            &mut zip,
            "ppt/theme/theme1.xml",
            THEME_XML.replace("{{accent1}}", &self.theme.hex()).as_bytes(),
            deflated,
        )?;

        let mut media_counter = 0;
        for (index, slide) in slides.iter().enumerate() {
            let number = index + 1;
            let mut rels = vec![(
                "rId1".to_string(),
                "slideLayout",
                "../slideLayouts/slideLayout1.xml".to_string(),
            )];
            let mut picture_rel_ids = Vec::with_capacity(slide.pictures().len());

            for picture in slide.pictures() {
                media_counter += 1;
                let media_name = format!("image{}.{}", media_counter, picture.format.extension());
                add_part(&mut zip, &format!("ppt/media/{}", media_name), &picture.bytes, stored)?;

                let rel_id = format!("rId{}", rels.len() + 1);
                rels.push((rel_id.clone(), "image", format!("../media/{}", media_name)));
                picture_rel_ids.push(rel_id);
            }

            let slide_xml = slide.to_xml(&picture_rel_ids)?;
            add_part(
                &mut zip,
                &format!("ppt/slides/slide{}.xml", number),
                slide_xml.as_bytes(),
                deflated,
            )?;

            let rel_refs: Vec<(&str, &str, &str)> = rels
                .iter()
                .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
                .collect();
            add_part(
                &mut zip,
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                relationships_xml(&rel_refs)?.as_bytes(),
                deflated,
            )?;
        }

        let cursor = zip.finish()?;
        tracing::debug!(
            "Wrote pptx package with {} slides and {} images",
            slides.len(),
            media_counter
        );
        Ok(cursor.into_inner())
    }

    fn content_types_xml(&self, slide_count: usize) -> Result<String> {
        let mut xml = String::with_capacity(2048);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#
        );
        xml.push_str(
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#
        );
        xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
        for format in PictureFormat::ALL {
            write!(
                xml,
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                format.extension(),
                format.content_type()
            )?;
        }

        let ct = |suffix: &str| format!("{}.{}", CT_BASE, suffix);
        let mut overrides = vec![
            (
                "/ppt/presentation.xml".to_string(),
                ct("presentationml.presentation.main+xml"),
            ),
            ("/ppt/presProps.xml".to_string(), ct("presentationml.presProps+xml")),
            (
                "/ppt/slideMasters/slideMaster1.xml".to_string(),
                ct("presentationml.slideMaster+xml"),
            ),
            (
                "/ppt/slideLayouts/slideLayout1.xml".to_string(),
                ct("presentationml.slideLayout+xml"),
            ),
            ("/ppt/theme/theme1.xml".to_string(), ct("theme+xml")),
            ("/docProps/core.xml".to_string(), CT_CORE_PROPS.to_string()),
            ("/docProps/app.xml".to_string(), ct("extended-properties+xml")),
        ];
        for number in 1..=slide_count {
            overrides.push((
                format!("/ppt/slides/slide{}.xml", number),
                ct("presentationml.slide+xml"),
            ));
        }

        for (part, content_type) in overrides {
            write!(
                xml,
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                part, content_type
            )?;
        }
        xml.push_str("</Types>");
        Ok(xml)
    }

    fn package_rels_xml(&self) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<Relationships xmlns="{ns}">"#,
                r#"<Relationship Id="rId1" Type="{base}/officeDocument" Target="ppt/presentation.xml"/>"#,
                r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
                r#"<Relationship Id="rId3" Type="{base}/extended-properties" Target="docProps/app.xml"/>"#,
                "</Relationships>"
            ),
            ns = NS_RELATIONSHIPS,
            base = REL_BASE
        )
    }

    fn presentation_xml(&self, slide_count: usize) -> Result<String> {
        let mut xml = String::with_capacity(1024);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" saveSubsetFonts="1">"#
        );
        xml.push_str(
            r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#
        );

        if slide_count > 0 {
            xml.push_str("<p:sldIdLst>");
            for index in 0..slide_count {
                write!(
                    xml,
                    r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                    256 + index,
                    index + 2
                )?;
            }
            xml.push_str("</p:sldIdLst>");
        }

        write!(
            xml,
            r#"<p:sldSz cx="{}" cy="{}"/>"#,
            self.slide_width, self.slide_height
        )?;
        xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
        xml.push_str("</p:presentation>");
        Ok(xml)
    }

    fn presentation_rels_xml(&self, slide_count: usize) -> Result<String> {
        let mut rels = vec![(
            "rId1".to_string(),
            "slideMaster",
            "slideMasters/slideMaster1.xml".to_string(),
        )];
        for number in 1..=slide_count {
            rels.push((
                format!("rId{}", number + 1),
                "slide",
                format!("slides/slide{}.xml", number),
            ));
        }
        rels.push((format!("rId{}", slide_count + 2), "theme", "theme/theme1.xml".to_string()));
        rels.push((format!("rId{}", slide_count + 3), "presProps", "presProps.xml".to_string()));

        let refs: Vec<(&str, &str, &str)> = rels
            .iter()
            .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
            .collect();
        relationships_xml(&refs)
    }

    fn core_props_xml(&self) -> Result<String> {
        let timestamp = self.created.to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut xml = String::with_capacity(768);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
        );
        write!(xml, "<dc:title>{}</dc:title>", escape_xml(&self.title))?;
        xml.push_str("<dc:creator>Deck Agent</dc:creator>");
        write!(
            xml,
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{0}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{0}</dcterms:modified>"#,
            timestamp
        )?;
        xml.push_str("</cp:coreProperties>");
        Ok(xml)
    }

    fn app_props_xml(&self, slide_count: usize) -> Result<String> {
        let mut xml = String::with_capacity(384);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#
        );
        xml.push_str("<Application>Deck Agent</Application>");
        write!(xml, "<Slides>{}</Slides>", slide_count)?;
        xml.push_str("</Properties>");
        Ok(xml)
    }
}

fn add_part(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    path: &str,
    content: &[u8],
    options: SimpleFileOptions,
) -> Result<()> {
    zip.start_file(path, options)?;
    zip.write_all(content)?;
    Ok(())
}

const PRES_PROPS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentationPr xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#;

/// Render a part relationships file; `kind` is the suffix of the
/// officeDocument relationship type (`slide`, `image`, ...).
fn relationships_xml(rels: &[(&str, &str, &str)]) -> Result<String> {
    let mut xml = String::with_capacity(256 + rels.len() * 160);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(xml, r#"<Relationships xmlns="{}">"#, NS_RELATIONSHIPS)?;
    for (id, kind, target) in rels {
        write!(
            xml,
            r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
            id, REL_BASE, kind, target
        )?;
    }
    xml.push_str("</Relationships>");
    Ok(xml)
}
