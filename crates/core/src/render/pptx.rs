//! # PPTX Package Writer
//!
//! Serializes a [`Deck`] into a PresentationML package: one slide master,
//! one blank layout, a theme built from the deck palette, and one slide
//! part per deck slide holding its text boxes.

use crate::error::{DeckError, DeckResult};
use crate::render::deck::{Alignment, Deck, DeckSlide, Paragraph, TextBox};
use crate::template::{FontConfig, HexColor};
use chrono::{SecondsFormat, Utc};
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_PKG_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// First slide id allowed by PresentationML
const FIRST_SLIDE_ID: usize = 256;
/// Left margin of a bulleted paragraph, in EMU
const BULLET_INDENT: i64 = 285_750;

/// Neutral palette used when the deck carries no template theme
const FALLBACK_PALETTE: [&str; 6] = ["4472C4", "ED7D31", "A5A5A5", "000000", "FFFFFF", "FFFFFF"];

fn xml_err(e: std::fmt::Error) -> DeckError {
    DeckError::render(format!("failed to build slide XML: {}", e))
}

fn zip_err(e: zip::result::ZipError) -> DeckError {
    DeckError::render(format!("failed to write presentation package: {}", e))
}

/// Escape text for use in XML content and attribute values
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if (c as u32) < 0x20 && c != '\t' && c != '\n' && c != '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// Build the complete `.pptx` archive in memory
pub fn write_package(deck: &Deck) -> DeckResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let slide_count = deck.slide_count();
    let mut parts: Vec<(String, String)> = vec![
        ("[Content_Types].xml".into(), content_types_xml(slide_count)),
        ("_rels/.rels".into(), root_rels_xml()),
        ("docProps/core.xml".into(), core_xml(deck)),
        ("docProps/app.xml".into(), app_xml(slide_count)),
        ("ppt/presentation.xml".into(), presentation_xml(deck)?),
        (
            "ppt/_rels/presentation.xml.rels".into(),
            presentation_rels_xml(slide_count)?,
        ),
        ("ppt/slideMasters/slideMaster1.xml".into(), slide_master_xml()),
        (
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".into(),
            slide_master_rels_xml(),
        ),
        ("ppt/slideLayouts/slideLayout1.xml".into(), slide_layout_xml()),
        (
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels".into(),
            slide_layout_rels_xml(),
        ),
        ("ppt/theme/theme1.xml".into(), theme_xml(deck)),
    ];
    for (index, slide) in deck.slides().iter().enumerate() {
        let number = index + 1;
        parts.push((format!("ppt/slides/slide{}.xml", number), slide_xml(slide)?));
        parts.push((
            format!("ppt/slides/_rels/slide{}.xml.rels", number),
            slide_rels_xml(),
        ));
    }

    for (path, content) in &parts {
        zip.start_file(path.as_str(), options).map_err(zip_err)?;
        zip.write_all(content.as_bytes())?;
    }

    let cursor = zip.finish().map_err(zip_err)?;
    Ok(cursor.into_inner())
}

fn content_types_xml(slide_count: usize) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#);
    for number in 1..=slide_count {
        xml.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            number
        ));
    }
    xml.push_str(r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#);
    xml.push_str(r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#);
    xml.push_str("</Types>");
    xml
}

fn root_rels_xml() -> String {
    format!(
        concat!(
            "{decl}<Relationships xmlns=\"{pkg}\">",
            "<Relationship Id=\"rId1\" Type=\"{base}/officeDocument\" Target=\"ppt/presentation.xml\"/>",
            "<Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties\" Target=\"docProps/core.xml\"/>",
            "<Relationship Id=\"rId3\" Type=\"{base}/extended-properties\" Target=\"docProps/app.xml\"/>",
            "</Relationships>"
        ),
        decl = XML_DECL,
        pkg = NS_PKG_RELS,
        base = REL_BASE,
    )
}

fn core_xml(deck: &Deck) -> String {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let author = deck.author.as_deref().unwrap_or("");
    format!(
        concat!(
            "{decl}<cp:coreProperties ",
            "xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" ",
            "xmlns:dc=\"http://purl.org/dc/elements/1.1/\" ",
            "xmlns:dcterms=\"http://purl.org/dc/terms/\" ",
            "xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">",
            "<dc:title>{title}</dc:title>",
            "<dc:creator>{author}</dc:creator>",
            "<cp:lastModifiedBy>{author}</cp:lastModifiedBy>",
            "<dcterms:created xsi:type=\"dcterms:W3CDTF\">{now}</dcterms:created>",
            "<dcterms:modified xsi:type=\"dcterms:W3CDTF\">{now}</dcterms:modified>",
            "</cp:coreProperties>"
        ),
        decl = XML_DECL,
        title = escape_xml(&deck.title),
        author = escape_xml(author),
        now = now,
    )
}

fn app_xml(slide_count: usize) -> String {
    format!(
        concat!(
            "{decl}<Properties xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\">",
            "<Application>Deckforge</Application>",
            "<Slides>{count}</Slides>",
            "<PresentationFormat>On-screen Show (16:9)</PresentationFormat>",
            "</Properties>"
        ),
        decl = XML_DECL,
        count = slide_count,
    )
}

fn presentation_xml(deck: &Deck) -> DeckResult<String> {
    let mut xml = String::from(XML_DECL);
    write!(
        xml,
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
        NS_A, NS_R, NS_P
    )
    .map_err(xml_err)?;
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
    if deck.slide_count() > 0 {
        xml.push_str("<p:sldIdLst>");
        for index in 0..deck.slide_count() {
            write!(
                xml,
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                FIRST_SLIDE_ID + index,
                index + 3
            )
            .map_err(xml_err)?;
        }
        xml.push_str("</p:sldIdLst>");
    }
    write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/>"#,
        deck.canvas.width, deck.canvas.height
    )
    .map_err(xml_err)?;
    xml.push_str("</p:presentation>");
    Ok(xml)
}

fn presentation_rels_xml(slide_count: usize) -> DeckResult<String> {
    let mut xml = String::from(XML_DECL);
    write!(xml, r#"<Relationships xmlns="{}">"#, NS_PKG_RELS).map_err(xml_err)?;
    write!(
        xml,
        r#"<Relationship Id="rId1" Type="{}/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#,
        REL_BASE
    )
    .map_err(xml_err)?;
    write!(
        xml,
        r#"<Relationship Id="rId2" Type="{}/theme" Target="theme/theme1.xml"/>"#,
        REL_BASE
    )
    .map_err(xml_err)?;
    for number in 1..=slide_count {
        write!(
            xml,
            r#"<Relationship Id="rId{}" Type="{}/slide" Target="slides/slide{}.xml"/>"#,
            number + 2,
            REL_BASE,
            number
        )
        .map_err(xml_err)?;
    }
    xml.push_str("</Relationships>");
    Ok(xml)
}

fn empty_sp_tree() -> &'static str {
    concat!(
        "<p:spTree><p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>",
        "<p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/>",
        "<a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>"
    )
}

fn slide_master_xml() -> String {
    format!(
        concat!(
            "{decl}<p:sldMaster xmlns:a=\"{a}\" xmlns:r=\"{r}\" xmlns:p=\"{p}\">",
            "<p:cSld><p:bg><p:bgRef idx=\"1001\"><a:schemeClr val=\"bg1\"/></p:bgRef></p:bg>",
            "{tree}</p:spTree></p:cSld>",
            "<p:clrMap bg1=\"lt1\" tx1=\"dk1\" bg2=\"lt2\" tx2=\"dk2\" accent1=\"accent1\" ",
            "accent2=\"accent2\" accent3=\"accent3\" accent4=\"accent4\" accent5=\"accent5\" ",
            "accent6=\"accent6\" hlink=\"hlink\" folHlink=\"folHlink\"/>",
            "<p:sldLayoutIdLst><p:sldLayoutId id=\"2147483649\" r:id=\"rId1\"/></p:sldLayoutIdLst>",
            "</p:sldMaster>"
        ),
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        tree = empty_sp_tree(),
    )
}

fn slide_master_rels_xml() -> String {
    format!(
        concat!(
            "{decl}<Relationships xmlns=\"{pkg}\">",
            "<Relationship Id=\"rId1\" Type=\"{base}/slideLayout\" Target=\"../slideLayouts/slideLayout1.xml\"/>",
            "<Relationship Id=\"rId2\" Type=\"{base}/theme\" Target=\"../theme/theme1.xml\"/>",
            "</Relationships>"
        ),
        decl = XML_DECL,
        pkg = NS_PKG_RELS,
        base = REL_BASE,
    )
}

fn slide_layout_xml() -> String {
    format!(
        concat!(
            "{decl}<p:sldLayout xmlns:a=\"{a}\" xmlns:r=\"{r}\" xmlns:p=\"{p}\" type=\"blank\" preserve=\"1\">",
            "<p:cSld name=\"Blank\">{tree}</p:spTree></p:cSld>",
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>",
            "</p:sldLayout>"
        ),
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        tree = empty_sp_tree(),
    )
}

fn slide_layout_rels_xml() -> String {
    format!(
        concat!(
            "{decl}<Relationships xmlns=\"{pkg}\">",
            "<Relationship Id=\"rId1\" Type=\"{base}/slideMaster\" Target=\"../slideMasters/slideMaster1.xml\"/>",
            "</Relationships>"
        ),
        decl = XML_DECL,
        pkg = NS_PKG_RELS,
        base = REL_BASE,
    )
}

fn slide_rels_xml() -> String {
    format!(
        concat!(
            "{decl}<Relationships xmlns=\"{pkg}\">",
            "<Relationship Id=\"rId1\" Type=\"{base}/slideLayout\" Target=\"../slideLayouts/slideLayout1.xml\"/>",
            "</Relationships>"
        ),
        decl = XML_DECL,
        pkg = NS_PKG_RELS,
        base = REL_BASE,
    )
}

fn theme_xml(deck: &Deck) -> String {
    // primary, secondary, accent, text_dark, text_light, background
    let palette: [String; 6] = match &deck.palette {
        Some(colors) => colors.entries().map(|(_, color)| color.rgb().to_string()),
        None => FALLBACK_PALETTE.map(str::to_string),
    };
    let [primary, secondary, accent, text_dark, text_light, background] = &palette;

    let mut colors = String::new();
    colors.push_str(&scheme_color("dk1", text_dark));
    colors.push_str(&scheme_color("lt1", background));
    colors.push_str(&scheme_color("dk2", primary));
    colors.push_str(&scheme_color("lt2", text_light));
    colors.push_str(&scheme_color("accent1", primary));
    colors.push_str(&scheme_color("accent2", secondary));
    colors.push_str(&scheme_color("accent3", accent));
    colors.push_str(&scheme_color("accent4", primary));
    colors.push_str(&scheme_color("accent5", secondary));
    colors.push_str(&scheme_color("accent6", accent));
    colors.push_str(&scheme_color("hlink", accent));
    colors.push_str(&scheme_color("folHlink", secondary));

    format!(
        concat!(
            "{decl}<a:theme xmlns:a=\"{a}\" name=\"Deckforge\">",
            "<a:themeElements>",
            "<a:clrScheme name=\"Deckforge\">{colors}</a:clrScheme>",
            "<a:fontScheme name=\"Deckforge\">{major}{minor}</a:fontScheme>",
            "<a:fmtScheme name=\"Deckforge\">",
            "<a:fillStyleLst>",
            "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>",
            "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>",
            "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>",
            "</a:fillStyleLst>",
            "<a:lnStyleLst>",
            "<a:ln w=\"6350\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>",
            "<a:ln w=\"12700\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>",
            "<a:ln w=\"19050\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>",
            "</a:lnStyleLst>",
            "<a:effectStyleLst>",
            "<a:effectStyle><a:effectLst/></a:effectStyle>",
            "<a:effectStyle><a:effectLst/></a:effectStyle>",
            "<a:effectStyle><a:effectLst/></a:effectStyle>",
            "</a:effectStyleLst>",
            "<a:bgFillStyleLst>",
            "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>",
            "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>",
            "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>",
            "</a:bgFillStyleLst>",
            "</a:fmtScheme>",
            "</a:themeElements>",
            "<a:objectDefaults/><a:extraClrSchemeLst/>",
            "</a:theme>"
        ),
        decl = XML_DECL,
        a = NS_A,
        colors = colors,
        major = font_set("majorFont", &deck.major_font),
        minor = font_set("minorFont", &deck.minor_font),
    )
}

fn scheme_color(name: &str, rgb: &str) -> String {
    format!(r#"<a:{0}><a:srgbClr val="{1}"/></a:{0}>"#, name, rgb)
}

fn font_set(tag: &str, typeface: &str) -> String {
    format!(
        r#"<a:{0}><a:latin typeface="{1}"/><a:ea typeface=""/><a:cs typeface=""/></a:{0}>"#,
        tag,
        escape_xml(typeface)
    )
}

fn slide_xml(slide: &DeckSlide) -> DeckResult<String> {
    let mut xml = String::from(XML_DECL);
    write!(
        xml,
        r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld>"#,
        NS_A, NS_R, NS_P
    )
    .map_err(xml_err)?;

    if let Some(color) = &slide.background {
        xml.push_str("<p:bg><p:bgPr><a:solidFill>");
        xml.push_str(&srgb_color(color));
        xml.push_str("</a:solidFill><a:effectLst/></p:bgPr></p:bg>");
    }

    xml.push_str(empty_sp_tree());
    // id 1 belongs to the group shape
    for (index, text_box) in slide.text_boxes.iter().enumerate() {
        write_text_box(&mut xml, text_box, index + 2)?;
    }
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
    Ok(xml)
}

fn srgb_color(color: &HexColor) -> String {
    match color.alpha() {
        Some(alpha) => {
            let percent = u32::from(alpha) * 100_000 / 255;
            format!(
                r#"<a:srgbClr val="{}"><a:alpha val="{}"/></a:srgbClr>"#,
                color.rgb(),
                percent
            )
        }
        None => format!(r#"<a:srgbClr val="{}"/>"#, color.rgb()),
    }
}

fn write_text_box(xml: &mut String, text_box: &TextBox, shape_id: usize) -> DeckResult<()> {
    write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{0}" name="TextBox {0}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#,
        shape_id
    )
    .map_err(xml_err)?;
    let rect = text_box.rect;
    write!(
        xml,
        r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#,
        rect.left, rect.top, rect.width, rect.height
    )
    .map_err(xml_err)?;

    let wrap = if text_box.word_wrap { "square" } else { "none" };
    write!(
        xml,
        r#"<p:txBody><a:bodyPr wrap="{}" rtlCol="0"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#,
        wrap
    )
    .map_err(xml_err)?;
    if text_box.paragraphs.is_empty() {
        xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
    }
    for paragraph in &text_box.paragraphs {
        write_paragraph(xml, paragraph)?;
    }
    xml.push_str("</p:txBody></p:sp>");
    Ok(())
}

fn alignment_attr(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "l",
        Alignment::Center => "ctr",
        Alignment::Right => "r",
    }
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph) -> DeckResult<()> {
    xml.push_str("<a:p><a:pPr");
    if paragraph.bullet {
        let margin = BULLET_INDENT * (i64::from(paragraph.level) + 1);
        write!(xml, r#" marL="{}" indent="-{}""#, margin, BULLET_INDENT).map_err(xml_err)?;
    }
    if paragraph.level > 0 {
        write!(xml, r#" lvl="{}""#, paragraph.level).map_err(xml_err)?;
    }
    write!(xml, r#" algn="{}">"#, alignment_attr(paragraph.alignment)).map_err(xml_err)?;
    if let Some(points) = paragraph.space_after {
        write!(xml, r#"<a:spcAft><a:spcPts val="{}"/></a:spcAft>"#, points * 100)
            .map_err(xml_err)?;
    }
    if paragraph.bullet {
        xml.push_str(r#"<a:buFont typeface="Arial"/><a:buChar char="&#8226;"/>"#);
    } else {
        xml.push_str("<a:buNone/>");
    }
    xml.push_str("</a:pPr>");

    let run_props = run_properties(paragraph.font.as_ref());
    let mut lines = paragraph.text.split('\n').peekable();
    while let Some(line) = lines.next() {
        let line = line.trim_end_matches('\r');
        if !line.is_empty() {
            write!(
                xml,
                "<a:r>{}<a:t>{}</a:t></a:r>",
                run_props,
                escape_xml(line)
            )
            .map_err(xml_err)?;
        }
        if lines.peek().is_some() {
            write!(xml, "<a:br>{}</a:br>", run_props).map_err(xml_err)?;
        }
    }
    xml.push_str(r#"<a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
    Ok(())
}

fn run_properties(font: Option<&FontConfig>) -> String {
    let Some(font) = font else {
        return r#"<a:rPr lang="en-US" dirty="0"/>"#.to_string();
    };
    let mut props = format!(r#"<a:rPr lang="en-US" sz="{}""#, font.size * 100);
    if font.bold {
        props.push_str(r#" b="1""#);
    }
    if font.italic {
        props.push_str(r#" i="1""#);
    }
    props.push_str(r#" dirty="0">"#);
    if let Some(color) = &font.color {
        props.push_str("<a:solidFill>");
        props.push_str(&srgb_color(color));
        props.push_str("</a:solidFill>");
    }
    props.push_str(&format!(r#"<a:latin typeface="{}"/>"#, escape_xml(&font.name)));
    props.push_str("</a:rPr>");
    props
}
