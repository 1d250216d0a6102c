/// Presentation writer for PPTX.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{
    content_type as ct, namespace, part_name, relationship_type as rt,
};
use crate::ooxml::opc::{PackURI, PackageWriter, PartBlob};
use crate::ooxml::pptx::template;
use chrono::Utc;
use std::fmt::Write as FmtWrite;
use tracing::debug;

use super::slide::{PictureSlide, SlideImage};

/// First ID handed out in `sldIdLst`.
const FIRST_SLIDE_ID: u32 = 256;

/// Slide dimensions in EMUs (English Metric Units, 914400 EMU = 1 inch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideSize {
    pub width_emu: i64,
    pub height_emu: i64,
}

impl SlideSize {
    /// 16:9 widescreen, 13.333" x 7.5"
    pub const WIDESCREEN: SlideSize = SlideSize::new(12192000, 6858000);

    pub const fn new(width_emu: i64, height_emu: i64) -> Self {
        Self {
            width_emu,
            height_emu,
        }
    }
}

impl Default for SlideSize {
    fn default() -> Self {
        Self::WIDESCREEN
    }
}

/// A picture-only presentation being assembled for writing.
///
/// Slides keep the order they were added in; each carries exactly one image.
#[derive(Debug)]
pub struct PresentationWriter<'a> {
    /// Slides in the presentation
    slides: Vec<PictureSlide<'a>>,
    size: SlideSize,
}

impl<'a> PresentationWriter<'a> {
    /// Create an empty presentation with the given slide size.
    pub fn new(size: SlideSize) -> Self {
        Self {
            slides: Vec::new(),
            size,
        }
    }

    /// Append a slide showing `image` over the whole slide.
    pub fn add_picture_slide(&mut self, image: SlideImage<'a>) -> &PictureSlide<'a> {
        let slide_id = FIRST_SLIDE_ID + self.slides.len() as u32;
        self.slides.push(PictureSlide::new(slide_id, image));
        &self.slides[self.slides.len() - 1]
    }

    /// Get the number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Get the slide size.
    pub fn slide_size(&self) -> SlideSize {
        self.size
    }

    /// Generate presentation.xml content with actual relationship IDs.
    ///
    /// # Arguments
    /// * `master_rel_id` - rId of the slide master relationship
    /// * `slide_rel_ids` - rId of each slide relationship, in slide order
    pub(crate) fn generate_presentation_xml(
        &self,
        master_rel_id: &str,
        slide_rel_ids: &[String],
    ) -> Result<String> {
        if slide_rel_ids.len() != self.slides.len() {
            return Err(OoxmlError::Xml(format!(
                "expected {} slide relationship IDs, got {}",
                self.slides.len(),
                slide_rel_ids.len()
            )));
        }

        let mut xml = String::with_capacity(1024 + self.slides.len() * 48);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(
            xml,
            r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
            namespace::DML_MAIN,
            namespace::OFC_RELATIONSHIPS,
            namespace::PML_MAIN
        )?;

        // Write slide master ID list
        xml.push_str("<p:sldMasterIdLst>");
        write!(xml, r#"<p:sldMasterId id="2147483648" r:id="{}"/>"#, master_rel_id)?;
        xml.push_str("</p:sldMasterIdLst>");

        // Write slide ID list
        if !self.slides.is_empty() {
            xml.push_str("<p:sldIdLst>");
            for (slide, rel_id) in self.slides.iter().zip(slide_rel_ids) {
                write!(xml, r#"<p:sldId id="{}" r:id="{}"/>"#, slide.slide_id(), rel_id)?;
            }
            xml.push_str("</p:sldIdLst>");
        }

        // Write slide size
        write!(
            xml,
            r#"<p:sldSz cx="{}" cy="{}"/>"#,
            self.size.width_emu, self.size.height_emu
        )?;

        xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
        xml.push_str("</p:presentation>");

        Ok(xml)
    }

    /// Serialize the presentation to `.pptx` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut pkg = PackageWriter::new();

        let pres_uri = part_uri(part_name::PRESENTATION)?;
        let master_uri = part_uri(part_name::SLIDE_MASTER)?;
        let layout_uri = part_uri(part_name::SLIDE_LAYOUT)?;
        let theme_uri = part_uri(part_name::THEME)?;
        let pres_props_uri = part_uri(part_name::PRES_PROPS)?;
        let core_uri = part_uri(part_name::CORE_PROPS)?;
        let app_uri = part_uri(part_name::APP_PROPS)?;

        pkg.relate_from_package(rt::OFFICE_DOCUMENT, &pres_uri);
        pkg.relate_from_package(rt::CORE_PROPERTIES, &core_uri);
        pkg.relate_from_package(rt::EXTENDED_PROPERTIES, &app_uri);

        // The master must be rId1 of the presentation part
        let mut pres_part = PartBlob::new(pres_uri, ct::PML_PRESENTATION_MAIN, Vec::new());
        let master_rel_id = pres_part.rels.get_or_add(rt::SLIDE_MASTER, &master_uri);

        let mut slide_rel_ids = Vec::with_capacity(self.slides.len());
        for (index, slide) in self.slides.iter().enumerate() {
            let n = index + 1;
            let slide_uri = part_uri(&format!("{}/slide{}.xml", part_name::SLIDES_DIR, n))?;
            let image = slide.image();
            let media_uri = part_uri(&format!(
                "{}/image{}.{}",
                part_name::MEDIA_DIR,
                n,
                image.format.extension()
            ))?;

            slide_rel_ids.push(pres_part.rels.get_or_add(rt::SLIDE, &slide_uri));

            let mut slide_part = PartBlob::new(slide_uri, ct::PML_SLIDE, Vec::new());
            slide_part.rels.get_or_add(rt::SLIDE_LAYOUT, &layout_uri);
            let image_rel_id = slide_part.rels.get_or_add(rt::IMAGE, &media_uri);
            slide_part.blob = slide.to_xml(&image_rel_id, self.size)?.into_bytes();

            pkg.add_part(slide_part);
            pkg.add_part(PartBlob::new(
                media_uri,
                image.format.mime_type(),
                image.data.to_vec(),
            ));
        }

        pres_part.rels.get_or_add(rt::PRES_PROPS, &pres_props_uri);
        pres_part.rels.get_or_add(rt::THEME, &theme_uri);
        pres_part.blob = self
            .generate_presentation_xml(&master_rel_id, &slide_rel_ids)?
            .into_bytes();
        pkg.add_part(pres_part);

        // The layout must be rId1 of the master part
        let mut master_part = PartBlob::new(
            master_uri.clone(),
            ct::PML_SLIDE_MASTER,
            template::default_slide_master_xml().as_bytes().to_vec(),
        );
        master_part.rels.get_or_add(rt::SLIDE_LAYOUT, &layout_uri);
        master_part.rels.get_or_add(rt::THEME, &theme_uri);
        pkg.add_part(master_part);

        let mut layout_part = PartBlob::new(
            layout_uri,
            ct::PML_SLIDE_LAYOUT,
            template::blank_slide_layout_xml().as_bytes().to_vec(),
        );
        layout_part.rels.get_or_add(rt::SLIDE_MASTER, &master_uri);
        pkg.add_part(layout_part);

        pkg.add_part(PartBlob::new(
            theme_uri,
            ct::OFC_THEME,
            template::default_theme_xml().as_bytes().to_vec(),
        ));
        pkg.add_part(PartBlob::new(
            pres_props_uri,
            ct::PML_PRES_PROPS,
            template::default_pres_props_xml().as_bytes().to_vec(),
        ));
        pkg.add_part(PartBlob::new(
            core_uri,
            ct::OPC_CORE_PROPERTIES,
            template::core_props_xml(Utc::now()).into_bytes(),
        ));
        pkg.add_part(PartBlob::new(
            app_uri,
            ct::OFC_EXTENDED_PROPERTIES,
            template::app_props_xml(self.slides.len()).into_bytes(),
        ));

        debug!(
            slides = self.slides.len(),
            parts = pkg.part_count(),
            "assembled presentation package"
        );
        Ok(pkg.to_bytes()?)
    }
}

fn part_uri(uri: &str) -> Result<PackURI> {
    PackURI::new(uri).map_err(OoxmlError::InvalidFormat)
}
