//! PresentationML markup for inserted pictures and text boxes.

use std::fmt::Write;

use crate::units::cm_to_emu;
use crate::xml::{escape, escape_text};

/// Appearance of inserted text boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font: String,
    /// Size in points.
    pub size_pt: f64,
    /// RGB hex without `#`.
    pub color: String,
    pub bold: bool,
    /// Box width in centimeters.
    pub box_width_cm: f64,
    /// Box height in centimeters.
    pub box_height_cm: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: "LiciumFont 2022".to_string(),
            size_pt: 20.0,
            color: "000000".to_string(),
            bold: false,
            box_width_cm: 5.0,
            box_height_cm: 1.0,
        }
    }
}

/// Markup for a picture referencing the image relationship `rel_id`.
pub fn picture_xml(shape_id: u32, name: &str, rel_id: &str, x: i64, y: i64, cx: i64, cy: i64) -> String {
    let mut xml = String::new();
    xml.push_str("<p:pic>");
    xml.push_str("<p:nvPicPr>");
    let _ = write!(
        xml,
        r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
        shape_id,
        shape_id,
        escape_text(name)
    );
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>"#);
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvPicPr>");

    xml.push_str("<p:blipFill>");
    let _ = write!(xml, r#"<a:blip r:embed="{}"/>"#, escape(rel_id));
    xml.push_str("<a:stretch><a:fillRect/></a:stretch>");
    xml.push_str("</p:blipFill>");

    xml.push_str("<p:spPr>");
    push_xfrm(&mut xml, x, y, cx, cy);
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    xml.push_str("</p:spPr>");
    xml.push_str("</p:pic>");
    xml
}

/// Markup for a single-paragraph, non-wrapping, left-aligned text box.
pub fn text_box_xml(shape_id: u32, text: &str, x: i64, y: i64, style: &TextStyle) -> String {
    let mut xml = String::new();
    xml.push_str("<p:sp>");
    xml.push_str("<p:nvSpPr>");
    let _ = write!(
        xml,
        r#"<p:cNvPr id="{}" name="TextBox {}"/>"#,
        shape_id,
        shape_id.saturating_sub(1)
    );
    xml.push_str(r#"<p:cNvSpPr txBox="1"/>"#);
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvSpPr>");

    xml.push_str("<p:spPr>");
    push_xfrm(
        &mut xml,
        x,
        y,
        cm_to_emu(style.box_width_cm),
        cm_to_emu(style.box_height_cm),
    );
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    xml.push_str("<a:noFill/>");
    xml.push_str("</p:spPr>");

    xml.push_str("<p:txBody>");
    xml.push_str(r#"<a:bodyPr wrap="none" rtlCol="0"/>"#);
    xml.push_str("<a:lstStyle/>");
    xml.push_str("<a:p>");
    xml.push_str(r#"<a:pPr algn="l"/>"#);
    xml.push_str("<a:r>");
    let _ = write!(
        xml,
        r#"<a:rPr lang="en-US" sz="{}" b="{}" dirty="0">"#,
        (style.size_pt * 100.0).round() as u32,
        u8::from(style.bold)
    );
    // Fill precedes the font elements in CT_TextCharacterProperties.
    let _ = write!(
        xml,
        r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
        escape(&style.color)
    );
    let _ = write!(xml, r#"<a:latin typeface="{}"/>"#, escape(&style.font));
    xml.push_str("</a:rPr>");
    let _ = write!(xml, "<a:t>{}</a:t>", escape_text(text));
    xml.push_str("</a:r>");
    xml.push_str("</a:p>");
    xml.push_str("</p:txBody>");
    xml.push_str("</p:sp>");
    xml
}

fn push_xfrm(xml: &mut String, x: i64, y: i64, cx: i64, cy: i64) {
    let _ = write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        x, y, cx, cy
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_box_styling() {
        let xml = text_box_xml(5, "10/30 & <x>", 720_000, 360_000, &TextStyle::default());
        assert!(xml.contains(r#"<p:cNvPr id="5" name="TextBox 4"/>"#));
        assert!(xml.contains(r#"<a:off x="720000" y="360000"/><a:ext cx="1800000" cy="360000"/>"#));
        assert!(xml.contains(r#"<a:bodyPr wrap="none" rtlCol="0"/>"#));
        assert!(xml.contains(r#"<a:pPr algn="l"/>"#));
        assert!(xml.contains(r#"sz="2000" b="0""#));
        assert!(xml.contains(r#"<a:srgbClr val="000000"/>"#));
        assert!(xml.contains(r#"<a:latin typeface="LiciumFont 2022"/>"#));
        assert!(xml.contains("<a:t>10/30 &amp; &lt;x&gt;</a:t>"));
        assert_eq!(xml.matches("<a:p>").count(), 1);
    }

    #[test]
    fn test_text_box_encodes_control_characters() {
        let xml = text_box_xml(2, "\u{1b}[32m12.5\u{1b}[0m", 0, 0, &TextStyle::default());
        assert!(xml.contains("<a:t>_x001B_[32m12.5_x001B_[0m</a:t>"));
        assert!(!xml.contains('\u{1b}'));
    }

    #[test]
    fn test_picture_markup() {
        let xml = picture_xml(7, "photo \"1\".png", "rId9", 1, 2, 3, 4);
        assert!(xml.starts_with("<p:pic>") && xml.ends_with("</p:pic>"));
        assert!(xml.contains(r#"<a:blip r:embed="rId9"/>"#));
        assert!(xml.contains(r#"descr="photo &quot;1&quot;.png""#));
        assert!(xml.contains(r#"<a:off x="1" y="2"/><a:ext cx="3" cy="4"/>"#));
    }
}
