//! Single-page PDF output with lopdf

use layout_engine::{BaseFont, PT_PER_MM};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};
use thiserror::Error;
use tracing::debug;

use crate::page::{PageDescription, PageSetup, TextItem};

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to encode content stream: {0}")]
    Encode(String),

    #[error("Failed to write PDF: {0}")]
    Write(String),
}

/// Resource name of a base font in the page's font dictionary
fn font_resource(font: BaseFont) -> &'static str {
    match font {
        BaseFont::TimesRoman => "F1",
        BaseFont::TimesBold => "F2",
    }
}

/// Encode text for a WinAnsi (CP1252) simple font.
///
/// Latin-1 maps to itself; the CP1252 extras in 0x80..0x9F are looked up;
/// anything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch as u32 {
            code @ 0x20..=0x7e | code @ 0xa0..=0xff => code as u8,
            _ => match ch {
                '€' => 0x80,
                '‚' => 0x82,
                'ƒ' => 0x83,
                '„' => 0x84,
                '…' => 0x85,
                '†' => 0x86,
                '‡' => 0x87,
                'ˆ' => 0x88,
                '‰' => 0x89,
                'Š' => 0x8a,
                '‹' => 0x8b,
                'Œ' => 0x8c,
                'Ž' => 0x8e,
                '‘' => 0x91,
                '’' => 0x92,
                '“' => 0x93,
                '”' => 0x94,
                '•' => 0x95,
                '–' => 0x96,
                '—' => 0x97,
                '˜' => 0x98,
                '™' => 0x99,
                'š' => 0x9a,
                '›' => 0x9b,
                'œ' => 0x9c,
                'ž' => 0x9e,
                'Ÿ' => 0x9f,
                '\t' => b' ',
                _ => b'?',
            },
        })
        .collect()
}

fn pt(mm: f64) -> f32 {
    (mm * PT_PER_MM) as f32
}

fn gray_level(gray: u8) -> f32 {
    f32::from(gray) / 255.0
}

fn text_operations(item: &TextItem, height: f64, ops: &mut Vec<Operation>) {
    if item.text.is_empty() {
        return;
    }

    let gray = item.gray != 0;
    if gray {
        ops.push(Operation::new("g", vec![gray_level(item.gray).into()]));
    }
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![font_resource(item.font.font).into(), (item.font.size as f32).into()],
    ));
    ops.push(Operation::new(
        "Td",
        vec![pt(item.x).into(), pt(height - item.y).into()],
    ));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(&item.text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
    if gray {
        ops.push(Operation::new("g", vec![0.into()]));
    }
}

/// Render `page` as a one-page PDF using the standard Times fonts
pub fn render_pdf(page: &PageDescription, setup: &PageSetup) -> Result<Vec<u8>, PdfError> {
    let mut operations = Vec::new();

    operations.push(Operation::new("w", vec![pt(setup.rule_width).into()]));
    operations.push(Operation::new("G", vec![0.into()]));
    for rule in page.rules() {
        operations.push(Operation::new(
            "m",
            vec![pt(rule.x1).into(), pt(page.height - rule.y).into()],
        ));
        operations.push(Operation::new(
            "l",
            vec![pt(rule.x2).into(), pt(page.height - rule.y).into()],
        ));
        operations.push(Operation::new("S", vec![]));
    }

    let items = page.text_items();
    for item in &items {
        text_operations(item, page.height, &mut operations);
    }

    let content = Content { operations };
    let encoded = content
        .encode()
        .map_err(|e| PdfError::Encode(e.to_string()))?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let font = |base: BaseFont| {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base.postscript_name(),
            "Encoding" => "WinAnsiEncoding",
        }
    };
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            font_resource(BaseFont::TimesRoman) => font(BaseFont::TimesRoman),
            font_resource(BaseFont::TimesBold) => font(BaseFont::TimesBold),
        },
    });

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), pt(page.width).into(), pt(page.height).into()],
        "Contents" => content_id,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfError::Write(e.to_string()))?;

    debug!(bytes = buffer.len(), text_runs = items.len(), "Rendered PDF");
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::{assemble, assemble_resolved, SIGNATURE_CAPTION};
    use placeholder_engine::{FieldValues, Resolver};
    use shared_types::{ResolvedDocument, Template};

    fn shown_strings(pdf: &[u8]) -> Vec<Vec<u8>> {
        let doc = Document::load_mem(pdf).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);

        let page_id = *pages.values().next().unwrap();
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Mudança"), b"Mudan\xe7a".to_vec());
        assert_eq!(encode_win_ansi("“a”—€"), vec![0x93, b'a', 0x94, 0x97, 0x80]);
        assert_eq!(encode_win_ansi("中"), b"?".to_vec());
    }

    #[test]
    fn test_render_single_page_with_words() {
        let setup = PageSetup::default();
        let template = Template::new(
            "Termo de Mudança",
            "Eu, {{nome}}, declaro que estou de mudança e que respeitarei todas as \
             regras do condomínio durante a mudança, inclusive os horários.",
            "{{nome}}",
            "Síndico",
        );
        let mut values = FieldValues::new();
        values.insert("nome".to_string(), "Maria".to_string());
        let doc = assemble(&template, &values, &Resolver::default(), &setup);

        let pdf = render_pdf(&doc.page, &setup).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));

        let strings = shown_strings(&pdf);
        assert!(strings.contains(&encode_win_ansi("Termo de Mudança")));
        assert!(strings.contains(&b"Maria,".to_vec()));
        assert!(strings.contains(&b"Maria".to_vec()));
        assert!(strings.contains(&encode_win_ansi("Síndico")));
        assert_eq!(
            strings
                .iter()
                .filter(|s| s.as_slice() == SIGNATURE_CAPTION.as_bytes())
                .count(),
            2
        );
    }

    #[test]
    fn test_fonts_and_media_box() {
        let setup = PageSetup::default();
        let doc = assemble_resolved(&ResolvedDocument::default(), &setup);
        let pdf = render_pdf(&doc.page, &setup).unwrap();

        let loaded = Document::load_mem(&pdf).unwrap();
        let page_id = *loaded.get_pages().values().next().unwrap();
        let page = loaded.get_object(page_id).unwrap().as_dict().unwrap();

        let resources_id = page.get(b"Resources").unwrap().as_reference().unwrap();
        let resources = loaded.get_object(resources_id).unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        let names: Vec<Vec<u8>> = fonts
            .iter()
            .map(|(_, f)| {
                f.as_dict()
                    .unwrap()
                    .get(b"BaseFont")
                    .unwrap()
                    .as_name()
                    .unwrap()
                    .to_vec()
            })
            .collect();
        assert!(names.contains(&b"Times-Roman".to_vec()));
        assert!(names.contains(&b"Times-Bold".to_vec()));

        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        let height = media_box[3].as_float().unwrap();
        assert!((height - 841.89).abs() < 0.01);
    }
}
