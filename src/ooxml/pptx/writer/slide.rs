/// Picture slide writer for PPTX.
use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::pptx::format::ImageFormat;
use std::fmt::Write as FmtWrite;

use super::pres::SlideSize;

/// Borrowed image bytes for one output slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideImage<'a> {
    /// Encoded raster bytes, written to the media part unchanged
    pub data: &'a [u8],
    /// Format of `data`; decides the media part's extension and content type
    pub format: ImageFormat,
}

impl<'a> SlideImage<'a> {
    pub fn new(data: &'a [u8], format: ImageFormat) -> Self {
        Self { data, format }
    }
}

/// A slide whose only content is one picture covering the whole slide.
#[derive(Debug)]
pub struct PictureSlide<'a> {
    /// Slide ID used in the presentation's `sldIdLst` (256 and up)
    slide_id: u32,
    image: SlideImage<'a>,
}

impl<'a> PictureSlide<'a> {
    pub(crate) fn new(slide_id: u32, image: SlideImage<'a>) -> Self {
        Self { slide_id, image }
    }

    /// Get the slide ID.
    pub fn slide_id(&self) -> u32 {
        self.slide_id
    }

    /// Get the slide's image.
    pub fn image(&self) -> SlideImage<'a> {
        self.image
    }

    /// Generate slide XML content.
    ///
    /// # Arguments
    /// * `image_rel_id` - rId of the slide's image relationship
    /// * `size` - Slide size; the picture frame spans all of it
    pub fn to_xml(&self, image_rel_id: &str, size: SlideSize) -> Result<String> {
        let mut xml = String::with_capacity(1024);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(
            xml,
            r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
            namespace::DML_MAIN,
            namespace::OFC_RELATIONSHIPS,
            namespace::PML_MAIN
        )?;

        xml.push_str("<p:cSld>");
        xml.push_str("<p:spTree>");

        // Write group shape properties (required)
        xml.push_str("<p:nvGrpSpPr>");
        xml.push_str(r#"<p:cNvPr id="1" name=""/>"#);
        xml.push_str("<p:cNvGrpSpPr/>");
        xml.push_str("<p:nvPr/>");
        xml.push_str("</p:nvGrpSpPr>");
        xml.push_str("<p:grpSpPr>");
        xml.push_str("<a:xfrm>");
        xml.push_str(r#"<a:off x="0" y="0"/>"#);
        xml.push_str(r#"<a:ext cx="0" cy="0"/>"#);
        xml.push_str(r#"<a:chOff x="0" y="0"/>"#);
        xml.push_str(r#"<a:chExt cx="0" cy="0"/>"#);
        xml.push_str("</a:xfrm>");
        xml.push_str("</p:grpSpPr>");

        self.write_picture(&mut xml, image_rel_id, size)?;

        xml.push_str("</p:spTree>");
        xml.push_str("</p:cSld>");
        xml.push_str(r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#);
        xml.push_str("</p:sld>");

        Ok(xml)
    }

    /// Write the full-bleed `<p:pic>` element.
    fn write_picture(&self, xml: &mut String, rel_id: &str, size: SlideSize) -> Result<()> {
        xml.push_str("<p:pic>");
        xml.push_str("<p:nvPicPr>");
        xml.push_str(r#"<p:cNvPr id="2" name="Picture 1"/>"#);
        xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>"#);
        xml.push_str("<p:nvPr/>");
        xml.push_str("</p:nvPicPr>");

        xml.push_str("<p:blipFill>");
        write!(xml, r#"<a:blip r:embed="{}"/>"#, rel_id)?;
        xml.push_str("<a:stretch><a:fillRect/></a:stretch>");
        xml.push_str("</p:blipFill>");

        xml.push_str("<p:spPr>");
        xml.push_str("<a:xfrm>");
        xml.push_str(r#"<a:off x="0" y="0"/>"#);
        write!(
            xml,
            r#"<a:ext cx="{}" cy="{}"/>"#,
            size.width_emu, size.height_emu
        )?;
        xml.push_str("</a:xfrm>");
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
        xml.push_str("</p:spPr>");
        xml.push_str("</p:pic>");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picture_fills_slide() {
        let data = [0x89, b'P', b'N', b'G'];
        let slide = PictureSlide::new(256, SlideImage::new(&data, ImageFormat::Png));
        let xml = slide
            .to_xml("rId2", SlideSize::new(12192000, 6858000))
            .unwrap();

        assert!(xml.contains(r#"<a:blip r:embed="rId2"/>"#));
        assert!(xml.contains(r#"<a:off x="0" y="0"/><a:ext cx="12192000" cy="6858000"/>"#));
        assert_eq!(xml.matches("<p:pic>").count(), 1);
        assert!(!xml.contains("<p:sp>"));
        assert!(!xml.contains("<a:t>"));
    }
}
