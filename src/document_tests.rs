use super::*;

fn label_of(document: &Document, id: TokenId) -> String {
    document.token(id).map(|token| token.label.clone()).unwrap()
}

#[test]
fn insert_token_into_empty_document_appends() {
    let mut registry = TokenRegistry::new();
    let mut document = Document::new();

    let (id, caret) = document.insert_token(&mut registry, None);

    assert_eq!(id, TokenId::new(1));
    assert_eq!(caret, 1);
    assert_eq!(
        document.segments(),
        &[Segment::Token(TokenSegment::new(id, "List1"))]
    );
    assert_eq!(registry.get(id).unwrap().label, "List1");
}

#[test]
fn insert_token_splits_text_at_caret() {
    let mut registry = TokenRegistry::new();
    let mut document = Document::from_text("Hello World");

    let (id, caret) = document.insert_token(&mut registry, Some(6));

    assert_eq!(caret, 7);
    assert_eq!(
        document.segments(),
        &[
            Segment::text("Hello "),
            Segment::Token(TokenSegment::new(id, "List1")),
            Segment::text("World"),
        ]
    );
}

#[test]
fn insert_token_at_text_edges_omits_empty_remainders() {
    let mut registry = TokenRegistry::new();
    let mut document = Document::from_text("abc");

    let (first, caret) = document.insert_token(&mut registry, Some(0));
    assert_eq!(caret, 1);
    let (second, caret) = document.insert_token(&mut registry, Some(document.len()));
    assert_eq!(caret, 5);

    assert_eq!(
        document.segments(),
        &[
            Segment::Token(TokenSegment::new(first, "List1")),
            Segment::text("abc"),
            Segment::Token(TokenSegment::new(second, "List2")),
        ]
    );
}

#[test]
fn insert_token_with_caret_out_of_range_appends() {
    let mut registry = TokenRegistry::new();
    let mut document = Document::from_text("abc");

    let (id, caret) = document.insert_token(&mut registry, Some(40));

    assert_eq!(caret, 4);
    assert_eq!(document.token_caret(id), Some(3));
}

#[test]
fn insert_token_between_two_tokens() {
    let mut registry = TokenRegistry::new();
    let mut document = Document::new();
    let (first, _) = document.insert_token(&mut registry, None);
    let (second, _) = document.insert_token(&mut registry, None);

    let (middle, caret) = document.insert_token(&mut registry, Some(1));

    assert_eq!(caret, 2);
    let order: Vec<TokenId> = document.tokens().map(|token| token.id).collect();
    assert_eq!(order, vec![first, middle, second]);
}

#[test]
fn two_insertions_then_removal_never_reuse_ids() {
    let mut registry = TokenRegistry::new();
    let mut document = Document::new();
    let (first, _) = document.insert_token(&mut registry, None);
    let (second, _) = document.insert_token(&mut registry, None);
    assert_eq!((first.get(), second.get()), (1, 2));

    assert!(document.remove_token(first));
    registry.remove(first);
    let (third, _) = document.insert_token(&mut registry, None);

    assert_eq!(third, TokenId::new(3));
}

#[test]
fn set_token_label_updates_matching_token_only() {
    let mut registry = TokenRegistry::new();
    let mut document = Document::new();
    let (first, _) = document.insert_token(&mut registry, None);
    let (second, _) = document.insert_token(&mut registry, None);

    document.set_token_label(second, "Colors");
    document.set_token_label(TokenId::new(99), "Nope");

    assert_eq!(label_of(&document, first), "List1");
    assert_eq!(label_of(&document, second), "Colors");
}

#[test]
fn set_token_options_distinguishes_empty_from_unattached() {
    let mut registry = TokenRegistry::new();
    let mut document = Document::new();
    let (id, _) = document.insert_token(&mut registry, None);

    assert_eq!(document.token(id).unwrap().list_title, None);

    document.set_token_options(id, Some("Colors".into()), Vec::new());
    let token = document.token(id).unwrap();
    assert_eq!(token.list_title.as_deref(), Some("Colors"));
    assert!(token.selected_options.is_empty());

    document.set_token_options(id, Some("Colors".into()), vec!["Red".into()]);
    document.set_token_options(id, Some("Colors".into()), vec!["Green".into()]);
    assert_eq!(document.token(id).unwrap().selected_options, ["Green"]);
}

#[test]
fn remove_token_leaves_neighbouring_text_unmerged() {
    let mut registry = TokenRegistry::new();
    let mut document = Document::from_text("ab");
    let (id, _) = document.insert_token(&mut registry, Some(1));

    assert!(document.remove_token(id));
    assert!(!document.remove_token(id));

    assert_eq!(document.segments(), &[Segment::text("a"), Segment::text("b")]);
    assert_eq!(document.serialize(), "ab");
}

#[test]
fn from_segments_drops_empty_text() {
    let document = Document::from_segments(vec![
        Segment::text(""),
        Segment::text("a"),
        Segment::text(""),
    ]);
    assert_eq!(document.segments(), &[Segment::text("a")]);
    assert!(Document::from_text("").is_empty());
}

#[test]
fn insert_text_extends_existing_text_segment() {
    let mut document = Document::from_text("Hllo");
    let caret = document.insert_char(1, 'e');
    assert_eq!(caret, 2);
    assert_eq!(document.segments(), &[Segment::text("Hello")]);
}

#[test]
fn insert_text_after_token_creates_segment() {
    let mut registry = TokenRegistry::new();
    let mut document = Document::new();
    let (id, caret) = document.insert_token(&mut registry, None);

    let caret = document.insert_text(caret, "ok");

    assert_eq!(caret, 3);
    assert_eq!(
        document.segments(),
        &[
            Segment::Token(TokenSegment::new(id, "List1")),
            Segment::text("ok"),
        ]
    );
}

#[test]
fn insert_text_before_token_at_start() {
    let mut registry = TokenRegistry::new();
    let mut document = Document::new();
    document.insert_token(&mut registry, None);

    let caret = document.insert_text(0, "x");

    assert_eq!(caret, 1);
    assert_eq!(document.serialize(), "x{List1}");
}

#[test]
fn delete_backward_removes_chars_and_tokens() {
    let mut registry = TokenRegistry::new();
    let mut document = Document::from_text("ab");
    let (id, caret) = document.insert_token(&mut registry, Some(2));

    assert_eq!(document.delete_backward(caret), Some((Removed::Token(id), 2)));
    assert_eq!(document.delete_backward(2), Some((Removed::Char('b'), 1)));
    assert_eq!(document.delete_backward(1), Some((Removed::Char('a'), 0)));
    assert_eq!(document.delete_backward(0), None);
    assert!(document.is_empty());
}

#[test]
fn delete_forward_keeps_caret_and_drops_empty_segments() {
    let mut document = Document::from_segments(vec![Segment::text("a"), Segment::text("b")]);

    assert_eq!(document.delete_forward(0), Some(Removed::Char('a')));
    assert_eq!(document.segments(), &[Segment::text("b")]);
    assert_eq!(document.delete_forward(1), None);
}

#[test]
fn token_near_prefers_token_right_of_caret() {
    let mut registry = TokenRegistry::new();
    let mut document = Document::from_text("ab");
    let (first, _) = document.insert_token(&mut registry, Some(1));
    let (second, _) = document.insert_token(&mut registry, Some(2));

    assert_eq!(document.token_near(1), Some(first));
    assert_eq!(document.token_near(2), Some(second));
    assert_eq!(document.token_near(3), Some(second));
    assert_eq!(document.token_near(0), None);
    assert_eq!(document.token_near(4), None);
}

#[test]
fn editable_view_shows_labels_and_line_breaks() {
    let mut registry = TokenRegistry::new();
    let mut document = Document::from_text("one\ntwo ");
    let (id, _) = document.insert_token(&mut registry, None);
    document.set_token_label(id, "Colors");
    document.set_token_options(id, Some("Colors".into()), vec!["Red".into()]);

    let view = document.editable_view();

    assert_eq!(
        view.runs,
        vec![
            ViewRun::Text("one".into()),
            ViewRun::LineBreak,
            ViewRun::Text("two ".into()),
            ViewRun::Marker {
                id,
                label: "Colors".into()
            },
        ]
    );
    assert_eq!(view.unit_len(), document.len());
}

#[test]
fn units_treat_tokens_as_single_units() {
    let mut registry = TokenRegistry::new();
    let mut document = Document::from_text("añ");
    let (id, _) = document.insert_token(&mut registry, Some(1));

    assert_eq!(
        document.units(),
        vec![Unit::Char('a'), Unit::Token(id), Unit::Char('ñ')]
    );
    assert_eq!(document.token_at(1), Some(id));
}

#[test]
fn plain_text_substitutes_labels() {
    let mut registry = TokenRegistry::new();
    let mut document = Document::from_text("a cat");
    let (id, _) = document.insert_token(&mut registry, Some(2));
    document.set_token_options(id, Some("Colors".into()), vec!["Red".into()]);

    assert_eq!(document.plain_text(), "a List1cat");
}
