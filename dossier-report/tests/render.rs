use dossier_common::{Candidate, ExtractionError, SourceFailure, SourceResult};
use dossier_report::layout::layout;
use dossier_report::{Block, render_document, render_markup};

fn test_topic_sources() -> Vec<SourceResult> {
    vec![
        SourceResult::new(
            Candidate::new("Source A", "https://a.example/article"),
            Ok("Background sentence.\n- key fact\n* counterpoint".into()),
        ),
        SourceResult::new(
            Candidate::new("Source B", "https://b.example/post"),
            Err(SourceFailure::Extraction(ExtractionError::Fetch(
                "network error: connection refused".into(),
            ))),
        ),
    ]
}

#[test]
fn both_sources_reach_both_outputs() {
    let sources = test_topic_sources();

    let md = render_markup("test topic", &sources);
    for s in &sources {
        assert!(md.contains(&s.title));
        assert!(md.contains(&s.link));
        assert!(md.contains(s.summary_text().as_ref()));
    }
    assert!(md.contains("Error extracting content: network error"));

    let blocks = layout("test topic", &sources);
    for s in &sources {
        assert!(blocks.contains(&Block::Heading(s.title.clone())));
        assert!(blocks.contains(&Block::Link(s.link.clone())));
    }
    assert!(blocks.contains(&Block::BulletList(vec![
        "key fact".into(),
        "counterpoint".into()
    ])));
    assert!(blocks.contains(&Block::Paragraph(
        "Error extracting content: network error: connection refused".into()
    )));

    let pdf = render_document("test topic", &sources).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn sections_follow_source_order() {
    let sources = test_topic_sources();
    let md = render_markup("test topic", &sources);
    let a = md.find("## Source A").unwrap();
    let b = md.find("## Source B").unwrap();
    assert!(a < b);

    let blocks = layout("test topic", &sources);
    let pos = |t: &str| {
        blocks
            .iter()
            .position(|b| *b == Block::Heading(t.into()))
            .unwrap()
    };
    assert!(pos("Source A") < pos("Source B"));
}

#[test]
fn empty_report_still_renders() {
    assert_eq!(render_markup("nothing", &[]), "# Research Report on nothing\n\n");
    assert!(render_document("nothing", &[]).unwrap().starts_with(b"%PDF"));
}
