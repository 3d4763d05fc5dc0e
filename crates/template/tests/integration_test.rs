//! Integration tests for rendering and export

use chrono::{FixedOffset, TimeZone};
use lopdf::content::Content;
use lopdf::{dictionary, Document, Object};
use pdf_core::PdfDocument;
use pretty_assertions::assert_eq;
use report::{expand, parse, ReportType};
use template::{
    export, parse_template, Background, ExportRequest, PageRenderer, PageTemplate, TemplateError,
};

const INTERIOR: &str = "\
LINHA\tRAMAL\tCIDADE\tQTDE
22\t0\tREGISTRO\t2\r
5  1  SAO PAULO  1

31|2|SANTOS|0
";

/// Create a small RGB PNG poster
fn create_test_png() -> Vec<u8> {
    use image::{ImageBuffer, Rgb};

    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(6, 8, Rgb([240, 200, 20]));
    let mut buffer = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    buffer
}

/// Create a 2-page letter-size PDF whose pages draw a red square
fn create_test_pdf() -> Vec<u8> {
    create_test_pdf_with(dictionary! {})
}

/// Same as [`create_test_pdf`], with extra entries on every page
fn create_test_pdf_with(extra: lopdf::Dictionary) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let page_ids: Vec<Object> = (0..2)
        .map(|_| {
            let contents_id = doc.add_object(lopdf::Stream::new(
                dictionary! {},
                b"1 0 0 rg 10 10 50 50 re f\n".to_vec(),
            ));
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => contents_id,
                "Resources" => dictionary! {},
            };
            for (key, value) in extra.iter() {
                page.set(key.clone(), value.clone());
            }
            doc.add_object(page).into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids,
            "Count" => 2,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn operations(doc: &Document, page: u32) -> Vec<lopdf::content::Operation> {
    let page_id = doc.get_pages()[&page];
    let content = doc.get_page_content(page_id).unwrap();
    Content::decode(&content).unwrap().operations
}

fn footer_text(doc: &Document, page: u32) -> String {
    let ops = operations(doc, page);
    let tj = ops.iter().find(|op| op.operator == "Tj").unwrap();
    String::from_utf8(tj.operands[0].as_str().unwrap().to_vec()).unwrap()
}

fn number(object: &Object) -> f64 {
    match object {
        Object::Integer(v) => *v as f64,
        Object::Real(v) => f64::from(*v),
        other => panic!("not a number: {other:?}"),
    }
}

fn interior_request<'a>(
    background: &'a Background,
    template: &'a PageTemplate,
) -> ExportRequest<'a> {
    ExportRequest {
        report: ReportType::BrInterior,
        text: INTERIOR,
        background: Some(background),
        template,
        font: None,
        creation_date: None,
    }
}

#[test]
fn test_export_image_background() {
    let background = Background::from_bytes(create_test_png()).unwrap();
    let template = PageTemplate::default();

    let outcome = export(&interior_request(&background, &template)).unwrap();
    assert_eq!(outcome.file_name, "comunicado_br_interior.pdf");
    assert_eq!(outcome.records, 2);
    assert_eq!(outcome.pages, 3);
    // Header line has a non-numeric linha
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].line, 1);

    let doc = Document::load_mem(&outcome.pdf).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
    assert_eq!(
        footer_text(&doc, 1),
        "LINHA 22 - RAMAL 0 - CIDADE REGISTRO - QTDE. 2"
    );
    assert_eq!(
        footer_text(&doc, 2),
        "LINHA 22 - RAMAL 0 - CIDADE REGISTRO - QTDE. 2"
    );
    assert_eq!(
        footer_text(&doc, 3),
        "LINHA 5 - RAMAL 1 - CIDADE SAO PAULO - QTDE. 1"
    );

    // Every page draws the same image object over the whole A4 page
    let mut image_ids = Vec::new();
    for page in 1..=3 {
        let ops = operations(&doc, page);
        let cm = ops.iter().find(|op| op.operator == "cm").unwrap();
        assert!((number(&cm.operands[0]) - 595.28).abs() < 0.01);
        assert!((number(&cm.operands[3]) - 841.89).abs() < 0.01);

        let page_id = doc.get_pages()[&page];
        let page_dict = doc.get_dictionary(page_id).unwrap();
        let resources = page_dict.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        image_ids.push(xobjects.get(b"CmIm1").unwrap().as_reference().unwrap());
    }
    assert!(image_ids.iter().all(|id| *id == image_ids[0]));
}

#[test]
fn test_footer_position_and_style() {
    let background = Background::from_bytes(create_test_png()).unwrap();
    let template = PageTemplate::default();

    let outcome = export(&ExportRequest {
        report: ReportType::SpCapital,
        text: "CENTRO|1",
        ..interior_request(&background, &template)
    })
    .unwrap();
    assert_eq!(outcome.file_name, "comunicado_sp_capital.pdf");

    let doc = Document::load_mem(&outcome.pdf).unwrap();
    let ops = operations(&doc, 1);

    let tf = ops.iter().find(|op| op.operator == "Tf").unwrap();
    assert_eq!(number(&tf.operands[1]), 8.0);

    let rg = ops.iter().find(|op| op.operator == "rg").unwrap();
    assert!(rg.operands.iter().all(|v| number(v) == 0.0));

    // Centred on the page, baseline 42.52pt above the bottom
    let td = ops.iter().find(|op| op.operator == "Td").unwrap();
    let x = number(&td.operands[0]);
    let y = number(&td.operands[1]);
    assert!(x > 0.0 && x < 595.28 / 2.0);
    assert!((y - 42.52).abs() < 0.01);
}

#[test]
fn test_export_pdf_background_reuses_first_page() {
    let background = Background::from_bytes(create_test_pdf()).unwrap();
    let template = PageTemplate::default();

    let outcome = export(&interior_request(&background, &template)).unwrap();
    let reopened = PdfDocument::open_from_bytes(&outcome.pdf).unwrap();
    assert_eq!(reopened.page_count(), 3);
    let doc = Document::load_mem(&outcome.pdf).unwrap();

    for page in 1..=3 {
        assert_eq!(reopened.page_size(page as usize).unwrap(), (612.0, 792.0));

        let ops = operations(&doc, page);
        let names: Vec<&str> = ops.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(
            names,
            vec!["q", "rg", "re", "f", "Q", "BT", "rg", "Tf", "Td", "Tj", "ET"]
        );
    }

    // Baseline is measured from the background's own page height
    let ops = operations(&doc, 3);
    let td = ops.iter().find(|op| op.operator == "Td").unwrap();
    assert!((number(&td.operands[1]) - 42.52).abs() < 0.01);
}

#[test]
fn test_footer_sits_inside_the_crop_box() {
    let pdf = create_test_pdf_with(dictionary! {
        "CropBox" => vec![50.into(), 100.into(), 562.into(), 692.into()],
    });
    let background = Background::from_bytes(pdf).unwrap();
    let template = PageTemplate::default();

    let outcome = export(&ExportRequest {
        report: ReportType::SpCapital,
        text: "CENTRO|2",
        ..interior_request(&background, &template)
    })
    .unwrap();
    let doc = Document::load_mem(&outcome.pdf).unwrap();

    for page in 1..=2 {
        let ops = operations(&doc, page);
        let td = ops.iter().find(|op| op.operator == "Td").unwrap();
        // Centred on the crop box, 42.52pt above its bottom edge
        let x = number(&td.operands[0]);
        assert!(x > 50.0 && x < 306.0);
        assert!((number(&td.operands[1]) - 142.52).abs() < 0.01);
    }
}

#[test]
fn test_rotated_background_still_renders() {
    let pdf = create_test_pdf_with(dictionary! { "Rotate" => 90 });
    let background = Background::from_bytes(pdf).unwrap();
    let template = PageTemplate::default();

    let outcome = export(&interior_request(&background, &template)).unwrap();
    let reopened = PdfDocument::open_from_bytes(&outcome.pdf).unwrap();
    assert_eq!(reopened.page_count(), 3);
    assert_eq!(reopened.page_rotation(3).unwrap(), 90);
}

#[test]
fn test_export_input_with_byte_order_mark() {
    let background = Background::from_bytes(create_test_png()).unwrap();
    let template = PageTemplate::default();

    let outcome = export(&ExportRequest {
        report: ReportType::SpCapital,
        text: "\u{FEFF}CENTRO|1\r\n",
        ..interior_request(&background, &template)
    })
    .unwrap();
    assert!(outcome.diagnostics.is_empty());

    let doc = Document::load_mem(&outcome.pdf).unwrap();
    assert_eq!(footer_text(&doc, 1), "FILIAL CENTRO - QTDE. 1");
}

#[test]
fn test_export_records_metadata() {
    let background = Background::from_bytes(create_test_png()).unwrap();
    let template = PageTemplate::default();
    let date = FixedOffset::west_opt(3 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 5, 6, 7, 8, 9)
        .unwrap();

    let outcome = export(&ExportRequest {
        creation_date: Some(date),
        ..interior_request(&background, &template)
    })
    .unwrap();

    let doc = Document::load_mem(&outcome.pdf).unwrap();
    let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let info = doc.get_dictionary(info_id).unwrap();
    assert_eq!(
        info.get(b"Title").unwrap().as_str().unwrap(),
        b"Comunicado BR INTERIOR"
    );
    assert_eq!(info.get(b"Producer").unwrap().as_str().unwrap(), b"comunicado");
    assert_eq!(
        info.get(b"Creator").unwrap().as_str().unwrap(),
        concat!("comunicado ", env!("CARGO_PKG_VERSION")).as_bytes()
    );
    assert_eq!(
        info.get(b"CreationDate").unwrap().as_str().unwrap(),
        b"D:20240506070809-03'00'"
    );
}

#[test]
fn test_template_changes_footer() {
    let template = parse_template(
        r#"{
            "page": { "width": 400, "height": 300 },
            "footer": { "fontSize": 12, "color": { "r": 1 }, "bottomMargin": 20, "align": "left" }
        }"#,
    )
    .unwrap();
    let background = Background::from_bytes(create_test_png()).unwrap();

    let outcome = export(&ExportRequest {
        report: ReportType::SpCapital,
        text: "NORTE\t1",
        ..interior_request(&background, &template)
    })
    .unwrap();

    let reopened = PdfDocument::open_from_bytes(&outcome.pdf).unwrap();
    assert_eq!(reopened.page_size(1).unwrap(), (400.0, 300.0));
    let doc = Document::load_mem(&outcome.pdf).unwrap();

    let ops = operations(&doc, 1);
    let text_ops: Vec<_> = ops
        .iter()
        .skip_while(|op| op.operator != "BT")
        .collect();
    let rg = text_ops.iter().find(|op| op.operator == "rg").unwrap();
    assert_eq!(number(&rg.operands[0]), 1.0);
    let tf = text_ops.iter().find(|op| op.operator == "Tf").unwrap();
    assert_eq!(number(&tf.operands[1]), 12.0);
    let td = text_ops.iter().find(|op| op.operator == "Td").unwrap();
    assert!((number(&td.operands[0]) - 20.0).abs() < 0.01);
    assert!((number(&td.operands[1]) - 20.0).abs() < 0.01);
}

#[test]
fn test_fit_box_background_is_centred() {
    let template = parse_template(r#"{ "background": { "scale": "fitBox" } }"#).unwrap();
    let background = Background::from_bytes(create_test_png()).unwrap();
    let parsed = parse(ReportType::SpCapital, "CENTRO|1");
    let directives = expand(&parsed.records, &background);

    let mut doc = PageRenderer::new(&template).render(&directives).unwrap();
    let doc = Document::load_mem(&doc.to_bytes().unwrap()).unwrap();
    let ops = operations(&doc, 1);
    let cm = ops.iter().find(|op| op.operator == "cm").unwrap();

    // 6x8 image limited by the page width
    let width = number(&cm.operands[0]);
    let height = number(&cm.operands[3]);
    assert!((width - 595.28).abs() < 0.01);
    assert!((height - 595.28 * 8.0 / 6.0).abs() < 0.01);
    let y = number(&cm.operands[5]);
    assert!((y - (841.89 - height) / 2.0).abs() < 0.01);
}

#[test]
fn test_export_errors() {
    let background = Background::from_bytes(create_test_png()).unwrap();
    let template = PageTemplate::default();

    let result = export(&ExportRequest {
        text: "31|2|SANTOS|0",
        ..interior_request(&background, &template)
    });
    assert!(matches!(
        result,
        Err(TemplateError::NoValidRecords(ReportType::BrInterior))
    ));

    let result = export(&ExportRequest {
        background: None,
        ..interior_request(&background, &template)
    });
    assert!(matches!(result, Err(TemplateError::MissingBackground)));
}

#[test]
fn test_corrupt_background_pdf() {
    let background = Background::from_bytes(b"%PDF-1.4\ngarbage".to_vec()).unwrap();
    let template = PageTemplate::default();

    let result = export(&interior_request(&background, &template));
    assert!(matches!(result, Err(TemplateError::InvalidBackground(_))));
}
