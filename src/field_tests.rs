use super::*;
use crate::document::ViewRun;

fn open_field(text: &str) -> FieldController {
    FieldController::new(FieldKind::Input, text, Visibility::Open)
}

fn colors() -> List {
    List::new("Colors", ["Red", "Green", "Blue"])
}

#[test]
fn worked_example_produces_option_group_and_bare_label() {
    let mut field = open_field("");
    let first = field.insert_token();
    field.open_token_menu(first);
    field.choose_list(&colors());
    field.toggle_option("Red");
    field.apply_options();

    field.insert_char(' ');
    field.insert_token();

    assert_eq!(field.serialize(), "{Red} {List2}");
    assert!(field.menu().is_none());
}

#[test]
fn list_plus_inserts_at_caret_when_open() {
    let mut field = open_field("Hello World");
    field.set_caret(6);

    let id = field.insert_token();

    assert_eq!(field.serialize(), "Hello {List1}World");
    assert_eq!(field.caret(), 7);
    assert!(field.registry().get(id).is_some());
}

#[test]
fn list_plus_appends_when_collapsed() {
    let mut field = FieldController::new(FieldKind::Negative, "blurry", Visibility::Collapsed);
    field.set_caret(0);

    field.insert_token();

    assert_eq!(field.serialize(), "blurry{List1}");
    assert!(field.surface().is_none());
}

#[test]
fn collapse_closes_menu_and_open_restores_surface() {
    let mut field = open_field("a ");
    let id = field.insert_token();
    field.open_token_menu(id);
    field.begin_label_edit();
    field.open_lists_modal();

    field.toggle_visibility();
    assert_eq!(field.visibility(), Visibility::Collapsed);
    assert!(field.menu().is_none());
    assert!(field.modal().is_none());
    assert!(field.surface().is_none());

    field.toggle_visibility();
    let surface = field.surface().unwrap();
    assert_eq!(
        surface.runs,
        vec![
            ViewRun::Text("a ".into()),
            ViewRun::Marker {
                id,
                label: "List1".into()
            },
        ]
    );
}

#[test]
fn typing_run_is_one_undo_step() {
    let mut field = open_field("");
    for ch in "cat".chars() {
        field.insert_char(ch);
    }
    field.move_left();
    field.insert_char('r');

    assert_eq!(field.serialize(), "cart");
    assert!(field.undo());
    assert_eq!(field.serialize(), "cat");
    assert!(field.undo());
    assert_eq!(field.serialize(), "");
    assert!(!field.undo());
    assert!(field.redo());
    assert_eq!(field.serialize(), "cat");
}

#[test]
fn undo_restores_removed_token_and_registry_entry() {
    let mut field = open_field("x");
    let id = field.insert_token();
    field.rename_token(id, "Mood");

    assert!(field.backspace());
    assert_eq!(field.serialize(), "x");
    assert!(field.registry().get(id).is_none());

    assert!(field.undo());
    assert_eq!(field.serialize(), "x{Mood}");
    assert_eq!(field.registry().get(id).unwrap().label, "Mood");

    let next = field.insert_token();
    assert!(next.get() > id.get());
}

#[test]
fn delete_forward_over_token_drops_registry_entry() {
    let mut field = open_field("ab");
    field.set_caret(1);
    let id = field.insert_token();
    field.set_caret(1);

    assert!(field.delete());
    assert_eq!(field.serialize(), "ab");
    assert!(field.registry().is_empty());
    assert!(field.document().token(id).is_none());
}

#[test]
fn revision_tracks_content_changes_only() {
    let mut field = open_field("ab");
    let start = field.revision();

    field.move_left();
    field.set_caret(0);
    assert_eq!(field.revision(), start);

    field.insert_char('z');
    assert!(field.revision() > start);

    let after_typing = field.revision();
    field.undo();
    assert!(field.revision() > after_typing);
}

#[test]
fn options_require_attached_list() {
    let mut field = open_field("");
    let id = field.insert_token();
    field.open_token_menu(id);

    assert_eq!(
        field.open_options_modal(&[colors()]),
        Err(Notice::NoListAttached)
    );
    assert_eq!(Notice::NoListAttached.to_string(), "Please select a list first");
    assert!(field.modal().is_none());
}

#[test]
fn options_for_deleted_list_report_missing() {
    let mut field = open_field("");
    let id = field.insert_token();
    field.open_token_menu(id);
    field.choose_list(&colors());
    field.dismiss_modal();

    assert_eq!(
        field.open_options_modal(&[]),
        Err(Notice::ListMissing("Colors".into()))
    );
}

#[test]
fn reopening_options_starts_from_current_choice() {
    let mut field = open_field("");
    let id = field.insert_token();
    field.open_token_menu(id);
    field.choose_list(&colors());
    field.toggle_option("Blue");
    field.toggle_option("Red");
    field.apply_options();
    assert_eq!(field.serialize(), "{Blue|Red}");

    field.open_token_menu(id);
    field.open_options_modal(&[colors()]).unwrap();
    let Some(FieldModal::Options(picker)) = field.modal() else {
        panic!("options modal should be open");
    };
    assert_eq!(picker.chosen, vec!["Blue", "Red"]);

    field.toggle_option("Blue");
    field.apply_options();
    assert_eq!(field.serialize(), "{Red}");
}

#[test]
fn choosing_another_list_resets_options() {
    let mut field = open_field("");
    let id = field.insert_token();
    field.open_token_menu(id);
    field.choose_list(&colors());
    field.toggle_option("Red");
    field.apply_options();

    field.open_token_menu(id);
    field.open_lists_modal();
    field.choose_list(&List::new("Animals", ["Cat"]));

    let token = field.registry().get(id).unwrap();
    assert_eq!(token.list_ref.as_deref(), Some("Animals"));
    assert!(token.selected_options.is_empty());
    assert_eq!(field.serialize(), "{List1}");
}

#[test]
fn label_edit_commits_trimmed_label_and_keeps_old_on_blank() {
    let mut field = open_field("");
    let id = field.insert_token();

    field.open_token_menu(id);
    field.begin_label_edit();
    for _ in 0.."List1".len() {
        field.label_edit_pop();
    }
    for ch in " Sky ".chars() {
        field.label_edit_push(ch);
    }
    field.commit_label_edit();
    assert_eq!(field.serialize(), "{Sky}");
    assert!(field.menu().is_none());

    field.open_token_menu(id);
    field.begin_label_edit();
    for _ in 0..3 {
        field.label_edit_pop();
    }
    field.commit_label_edit();
    assert_eq!(field.serialize(), "{Sky}");
}

#[test]
fn cancel_label_edit_keeps_menu_open() {
    let mut field = open_field("");
    let id = field.insert_token();
    field.open_token_menu(id);
    field.begin_label_edit();
    field.label_edit_push('!');

    field.cancel_label_edit();

    assert_eq!(
        field.menu(),
        Some(&TokenMenu {
            token: id,
            label_edit: None
        })
    );
    assert_eq!(field.serialize(), "{List1}");
}

#[test]
fn open_token_menu_toggles() {
    let mut field = open_field("");
    let id = field.insert_token();

    field.open_token_menu(id);
    assert_eq!(field.active_token().map(|token| token.id), Some(id));
    field.open_token_menu(id);
    assert!(field.menu().is_none());
}

#[test]
fn menu_at_caret_needs_adjacent_token() {
    let mut field = open_field("abc");
    assert_eq!(field.toggle_menu_at_caret(), Err(Notice::NoTokenAtCaret));

    let id = field.insert_token();
    field.toggle_menu_at_caret().unwrap();
    assert_eq!(field.menu().map(|menu| menu.token), Some(id));
}

#[test]
fn remove_active_token_shifts_caret() {
    let mut field = open_field("ab");
    field.set_caret(1);
    let id = field.insert_token();
    field.move_line_end();
    field.open_token_menu(id);

    field.remove_active_token();

    assert_eq!(field.serialize(), "ab");
    assert_eq!(field.caret(), 2);
    assert!(field.menu().is_none());
    assert!(field.registry().is_empty());
}

#[test]
fn ids_are_not_reused_after_removal() {
    let mut field = open_field("");
    let first = field.insert_token();
    let second = field.insert_token();
    field.remove_token(first);
    let third = field.insert_token();

    assert_eq!(
        (first.get(), second.get(), third.get()),
        (1, 2, 3)
    );
    assert_eq!(field.serialize(), "{List2}{List3}");
}

#[test]
fn options_picker_cursor_wraps() {
    let mut picker = OptionsPicker {
        list: colors(),
        chosen: Vec::new(),
        cursor: 0,
    };
    picker.move_cursor(-1);
    assert_eq!(picker.cursor, 2);
    picker.toggle_at_cursor();
    picker.move_cursor(1);
    picker.toggle_at_cursor();
    assert_eq!(picker.chosen, vec!["Blue", "Red"]);
    assert!(picker.is_chosen("Red"));
}
