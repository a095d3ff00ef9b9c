use redline::document::{Document, Paragraph};
use redline::report::{ChangeStatus, ErrorKind, RunStatus};
use redline::transaction::{ChangeInstruction, Operation, Payload};

fn replace(change_id: &str, target: &str, new_text: &str) -> ChangeInstruction {
    ChangeInstruction {
        change_id: change_id.to_string(),
        operation: Operation::Replace,
        target_text: target.to_string(),
        payload: Payload {
            new_text: Some(new_text.to_string()),
        },
        ..ChangeInstruction::default()
    }
}

#[test]
fn load_document_from_json_and_apply_a_cross_fragment_replace() {
    let content = r#"{
        "paragraphs": [
            { "fragments": [
                { "text": "Chapter ", "format": { "bold": true } },
                { "text": "1. DEFINITIONS AND ", "format": { "italic": true } },
                { "text": "INTERPRETATION" }
            ]}
        ]
    }"#;

    let mut document = Document::from_json(content).expect("document loads");

    let instruction = replace(
        "CHG-001",
        "Chapter 1. DEFINITIONS AND INTERPRETATION",
        "Chapter 1. DEFINITIONS AND INTERPRETATION test",
    );
    let summary = redline::apply_to_document(&mut document, &[instruction]);

    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.total_changes, 1);
    assert_eq!(summary.successful, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.changes[0].change_id, "CHG-001");
    assert_eq!(summary.changes[0].status, ChangeStatus::Success);

    let text = document.to_plain_text();
    assert_eq!(text, "Chapter 1. DEFINITIONS AND INTERPRETATION test");
    assert_eq!(
        text.matches("Chapter 1. DEFINITIONS AND INTERPRETATION").count(),
        1,
        "the original heading must appear exactly once, extended in place"
    );
}

#[test]
fn a_missing_target_fails_the_change_but_completes_the_pass() {
    let mut document = Document::new(vec![
        Paragraph::from_texts(["one"]),
        Paragraph::from_texts(["two"]),
    ]);
    let pristine = document.clone();

    let summary = redline::apply_to_document(
        &mut document,
        &[
            replace("CHG-001", "one", "uno"),
            replace("CHG-002", "nowhere to be found", "x"),
            replace("CHG-003", "two", "dos"),
        ],
    );

    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.successful, 2);
    assert_eq!(summary.failed, 1);

    let failed = &summary.changes[1];
    assert_eq!(failed.change_id, "CHG-002");
    assert_eq!(failed.details.error, Some(ErrorKind::NotFound));

    assert_eq!(document.to_plain_text(), "uno\ndos");
    assert_ne!(document, pristine);
}

#[test]
fn results_arrive_in_instruction_order_with_every_change_id() {
    let mut document = Document::new(vec![Paragraph::from_texts(["a b c d e"])]);

    let instructions: Vec<_> = (1..=5)
        .map(|n| replace(&format!("CHG-{n:03}"), "never matches", "x"))
        .collect();
    let summary = redline::apply_to_document(&mut document, &instructions);

    assert_eq!(summary.changes.len(), instructions.len());
    for (result, instruction) in summary.changes.iter().zip(&instructions) {
        assert_eq!(result.change_id, instruction.change_id);
    }
}

#[test]
fn untouched_fragments_keep_their_format_through_an_edit() {
    let content = r#"{
        "paragraphs": [
            { "fragments": [ { "text": "edited here" } ] },
            { "fragments": [
                { "text": "kept", "format": { "style": "Heading 1", "size": 14 } }
            ]}
        ]
    }"#;

    let mut document = Document::from_json(content).expect("document loads");
    let summary =
        redline::apply_to_document(&mut document, &[replace("CHG-001", "edited", "rewritten")]);
    assert_eq!(summary.successful, 1);

    let rendered = document.to_json().expect("document serializes");
    let reparsed = Document::from_json(&rendered).expect("output parses");
    assert_eq!(
        reparsed.paragraph(1).unwrap().fragments()[0].format,
        document.paragraph(1).unwrap().fragments()[0].format
    );
    assert!(rendered.contains("Heading 1"));
}

#[test]
fn delete_all_occurrences_in_one_instruction() {
    let mut document = Document::new(vec![
        Paragraph::from_texts(["as amended, ", "the clause stands as amended, today"]),
        Paragraph::from_texts(["nothing in common"]),
    ]);

    let instruction = ChangeInstruction {
        change_id: "CHG-001".to_string(),
        operation: Operation::Delete,
        target_text: "as amended, ".to_string(),
        replace_all: true,
        ..ChangeInstruction::default()
    };
    let summary = redline::apply_to_document(&mut document, &[instruction]);

    assert_eq!(summary.successful, 1);
    let details = &summary.changes[0].details;
    assert_eq!(details.replacements, Some(2));
    assert_eq!(details.affected_paragraphs, vec![0]);
    assert_eq!(
        document.to_plain_text(),
        "the clause stands today\nnothing in common"
    );
}
