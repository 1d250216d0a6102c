//! Presentation template module.
//!
//! Provides the fixed scaffolding parts every written package carries: one
//! slide master, one blank layout, one theme and the presentation properties.
//! Document properties depend on the deck and are rendered on demand.

use crate::common::xml::escape_xml;
use chrono::{DateTime, SecondsFormat, Utc};

/// Application name recorded in `docProps/app.xml` and `docProps/core.xml`.
pub const APPLICATION: &str = "deckcraft";

/// Slide master with an empty shape tree and a single layout reference (`rId1`).
pub fn default_slide_master_xml() -> &'static str {
    include_str!("../../../resources/slideMasters/slideMaster1.xml")
}

/// Blank slide layout.
pub fn blank_slide_layout_xml() -> &'static str {
    include_str!("../../../resources/slideLayouts/slideLayout1.xml")
}

/// Generate a minimal valid theme.xml content.
pub fn default_theme_xml() -> &'static str {
    include_str!("../../../resources/theme/theme1.xml")
}

/// Generate a minimal valid presProps.xml content.
pub fn default_pres_props_xml() -> &'static str {
    include_str!("../../../resources/presProps.xml")
}

/// Core properties (`docProps/core.xml`) stamped with `created` as both the
/// creation and modification time.
pub fn core_props_xml(created: DateTime<Utc>) -> String {
    let stamp = created.to_rfc3339_opts(SecondsFormat::Secs, true);
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            r#"<dc:creator>{creator}</dc:creator>"#,
            r#"<cp:lastModifiedBy>{creator}</cp:lastModifiedBy>"#,
            r#"<cp:revision>1</cp:revision>"#,
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{stamp}</dcterms:created>"#,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{stamp}</dcterms:modified>"#,
            r#"</cp:coreProperties>"#
        ),
        creator = escape_xml(APPLICATION),
        stamp = stamp,
    )
}

/// Extended properties (`docProps/app.xml`) for a deck of `slide_count` slides.
pub fn app_props_xml(slide_count: usize) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
            r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
            r#"<Application>{app}</Application>"#,
            r#"<PresentationFormat>Custom</PresentationFormat>"#,
            r#"<Slides>{slides}</Slides>"#,
            r#"<Notes>0</Notes>"#,
            r#"<HiddenSlides>0</HiddenSlides>"#,
            r#"</Properties>"#
        ),
        app = escape_xml(APPLICATION),
        slides = slide_count,
    )
}
