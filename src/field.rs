use std::fmt;

use tracing::debug;

use crate::document::{Document, EditableView, Removed};
use crate::lists::List;
use crate::registry::{Token, TokenId, TokenRegistry};

mod history;

pub use history::History;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Input,
    Negative,
}

impl FieldKind {
    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Input => "Input",
            FieldKind::Negative => "Negative",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Collapsed,
    Open,
}

/// Message shown to the user when an action cannot run. Not an error: the
/// field state is unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    NoListAttached,
    ListMissing(String),
    NoTokenAtCaret,
    EmptyTitle,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoListAttached => write!(f, "Please select a list first"),
            Notice::ListMissing(title) => write!(f, "List \"{title}\" no longer exists"),
            Notice::NoTokenAtCaret => write!(f, "No list token next to the cursor"),
            Notice::EmptyTitle => write!(f, "Please enter a title"),
        }
    }
}

/// Menu opened on a single token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenMenu {
    pub token: TokenId,
    /// Label being typed, while a label edit is in progress.
    pub label_edit: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionsPicker {
    pub list: List,
    /// Chosen options in the order they were ticked.
    pub chosen: Vec<String>,
    pub cursor: usize,
}

impl OptionsPicker {
    pub fn is_chosen(&self, option: &str) -> bool {
        self.chosen.iter().any(|chosen| chosen == option)
    }

    pub fn toggle(&mut self, option: &str) {
        if let Some(idx) = self.chosen.iter().position(|chosen| chosen == option) {
            self.chosen.remove(idx);
        } else {
            self.chosen.push(option.to_string());
        }
    }

    pub fn toggle_at_cursor(&mut self) {
        if let Some(option) = self.list.items.get(self.cursor).cloned() {
            self.toggle(&option);
        }
    }

    pub fn move_cursor(&mut self, delta: i32) {
        self.cursor = step_index(self.cursor, delta, self.list.items.len());
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldModal {
    Lists { selected: usize },
    Options(OptionsPicker),
}

/// Moves `index` by `delta`, wrapping around a collection of `len` items.
pub fn step_index(index: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index as i64 + delta as i64).rem_euclid(len as i64) as usize
}

#[derive(Clone, Debug)]
struct Snapshot {
    document: Document,
    tokens: Vec<Token>,
}

/// One editable field: its segments, tokens, history, visibility and the
/// token menu state tied to it.
#[derive(Debug)]
pub struct FieldController {
    kind: FieldKind,
    visibility: Visibility,
    document: Document,
    registry: TokenRegistry,
    caret: usize,
    history: History<Snapshot>,
    typing: bool,
    revision: u64,
    surface: Option<EditableView>,
    menu: Option<TokenMenu>,
    modal: Option<FieldModal>,
}

impl FieldController {
    pub fn new(kind: FieldKind, initial_text: &str, visibility: Visibility) -> Self {
        let document = Document::from_text(initial_text);
        let registry = TokenRegistry::new();
        let history = History::new(Snapshot {
            document: document.clone(),
            tokens: registry.snapshot(),
        });
        let mut field = Self {
            kind,
            visibility: Visibility::Collapsed,
            caret: document.len(),
            document,
            registry,
            history,
            typing: false,
            revision: 0,
            surface: None,
            menu: None,
            modal: None,
        };
        if visibility == Visibility::Open {
            field.open();
        }
        field
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_open(&self) -> bool {
        self.visibility == Visibility::Open
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Bumped on every content change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Editable view, present while the field is open.
    pub fn surface(&self) -> Option<&EditableView> {
        self.surface.as_ref()
    }

    pub fn serialize(&self) -> String {
        self.document.serialize()
    }

    pub fn menu(&self) -> Option<&TokenMenu> {
        self.menu.as_ref()
    }

    pub fn modal(&self) -> Option<&FieldModal> {
        self.modal.as_ref()
    }

    pub fn modal_mut(&mut self) -> Option<&mut FieldModal> {
        self.modal.as_mut()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn toggle_visibility(&mut self) {
        match self.visibility {
            Visibility::Collapsed => self.open(),
            Visibility::Open => self.collapse(),
        }
    }

    /// Opens the field and re-materializes its view from the document.
    pub fn open(&mut self) {
        self.visibility = Visibility::Open;
        self.surface = Some(self.document.editable_view());
        debug!(field = self.kind.label(), "field opened");
    }

    /// Collapses the field, closing the token menu, any label edit and the
    /// modals tied to it.
    pub fn collapse(&mut self) {
        self.visibility = Visibility::Collapsed;
        self.surface = None;
        self.menu = None;
        self.modal = None;
        self.typing = false;
        debug!(field = self.kind.label(), "field collapsed");
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            document: self.document.clone(),
            tokens: self.registry.snapshot(),
        }
    }

    fn content_changed(&mut self) {
        self.revision += 1;
        if self.is_open() {
            self.surface = Some(self.document.editable_view());
        }
    }

    /// Records the current content as one logical edit.
    fn commit_edit(&mut self) {
        self.typing = false;
        let snapshot = self.snapshot();
        self.history.edit(snapshot);
        self.content_changed();
    }

    /// Keystrokes of one typing run share a single history step.
    fn commit_typing(&mut self) {
        let snapshot = self.snapshot();
        if self.typing {
            self.history.amend(snapshot);
        } else {
            self.history.edit(snapshot);
            self.typing = true;
        }
        self.content_changed();
    }

    pub fn set_caret(&mut self, caret: usize) {
        self.caret = self.document.clamp_caret(caret);
        self.typing = false;
    }

    pub fn move_left(&mut self) {
        self.set_caret(self.document.caret_left(self.caret));
    }

    pub fn move_right(&mut self) {
        self.set_caret(self.document.caret_right(self.caret));
    }

    pub fn move_word_left(&mut self) {
        self.set_caret(self.document.caret_word_left(self.caret));
    }

    pub fn move_word_right(&mut self) {
        self.set_caret(self.document.caret_word_right(self.caret));
    }

    pub fn move_line_start(&mut self) {
        self.set_caret(self.document.line_start_caret(self.caret));
    }

    pub fn move_line_end(&mut self) {
        self.set_caret(self.document.line_end_caret(self.caret));
    }

    pub fn insert_char(&mut self, ch: char) {
        self.caret = self.document.insert_char(self.caret, ch);
        self.commit_typing();
    }

    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.caret = self.document.insert_text(self.caret, text);
        self.commit_typing();
    }

    pub fn backspace(&mut self) -> bool {
        let Some((removed, caret)) = self.document.delete_backward(self.caret) else {
            return false;
        };
        self.caret = caret;
        self.after_delete(removed);
        true
    }

    pub fn delete(&mut self) -> bool {
        let Some(removed) = self.document.delete_forward(self.caret) else {
            return false;
        };
        self.after_delete(removed);
        true
    }

    fn after_delete(&mut self, removed: Removed) {
        match removed {
            Removed::Char(_) => self.commit_typing(),
            Removed::Token(id) => {
                self.registry.remove(id);
                self.drop_menu_for(id);
                self.commit_edit();
            }
        }
    }

    /// "List+": inserts a token at the caret, or appends it when the field is
    /// collapsed and has no live caret.
    pub fn insert_token(&mut self) -> TokenId {
        let caret = self.is_open().then_some(self.caret);
        let (id, caret) = self.document.insert_token(&mut self.registry, caret);
        self.caret = caret;
        self.commit_edit();
        id
    }

    pub fn rename_token(&mut self, id: TokenId, label: &str) {
        if self.registry.get(id).is_none() {
            return;
        }
        self.registry.rename(id, label);
        self.document.set_token_label(id, label);
        self.commit_edit();
    }

    pub fn attach_list(&mut self, id: TokenId, list_title: &str) {
        if self.registry.get(id).is_none() {
            return;
        }
        self.registry.attach_list(id, list_title);
        self.document
            .set_token_options(id, Some(list_title.to_string()), Vec::new());
        self.commit_edit();
    }

    pub fn set_token_options(&mut self, id: TokenId, options: Vec<String>) {
        self.registry.set_options(id, options);
        let Some(token) = self.registry.get(id) else {
            return;
        };
        let list_title = token.list_ref.clone();
        let options = token.selected_options.clone();
        self.document.set_token_options(id, list_title, options);
        self.commit_edit();
    }

    pub fn remove_token(&mut self, id: TokenId) {
        let Some(position) = self.document.token_caret(id) else {
            return;
        };
        self.registry.remove(id);
        self.document.remove_token(id);
        if self.caret > position {
            self.caret -= 1;
        }
        self.drop_menu_for(id);
        self.commit_edit();
    }

    fn drop_menu_for(&mut self, id: TokenId) {
        if self.menu.as_ref().is_some_and(|menu| menu.token == id) {
            self.menu = None;
            self.modal = None;
        }
    }

    pub fn undo(&mut self) -> bool {
        if !self.history.undo() {
            return false;
        }
        self.restore_current();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.redo() {
            return false;
        }
        self.restore_current();
        true
    }

    fn restore_current(&mut self) {
        let Snapshot { document, tokens } = self.history.current().clone();
        self.document = document;
        self.registry.restore(tokens);
        self.caret = self.document.clamp_caret(self.caret);
        self.typing = false;
        if let Some(id) = self.menu.as_ref().map(|menu| menu.token) {
            if self.registry.get(id).is_none() {
                self.menu = None;
                self.modal = None;
            }
        }
        self.content_changed();
    }

    /// Token the open menu belongs to.
    pub fn active_token(&self) -> Option<&Token> {
        let id = self.menu.as_ref()?.token;
        self.registry.get(id)
    }

    /// Opens the menu for the token touching the caret, or closes it if it is
    /// already open for that token.
    pub fn toggle_menu_at_caret(&mut self) -> Result<(), Notice> {
        let id = self
            .document
            .token_near(self.caret)
            .ok_or(Notice::NoTokenAtCaret)?;
        self.open_token_menu(id);
        Ok(())
    }

    pub fn open_token_menu(&mut self, id: TokenId) {
        if self.menu.as_ref().is_some_and(|menu| menu.token == id) {
            self.close_token_menu();
            return;
        }
        if self.registry.get(id).is_none() {
            return;
        }
        self.menu = Some(TokenMenu {
            token: id,
            label_edit: None,
        });
        self.modal = None;
    }

    pub fn close_token_menu(&mut self) {
        self.menu = None;
        self.modal = None;
    }

    pub fn begin_label_edit(&mut self) {
        let Some(label) = self.active_token().map(|token| token.label.clone()) else {
            return;
        };
        if let Some(menu) = self.menu.as_mut() {
            menu.label_edit = Some(label);
        }
    }

    pub fn label_edit_push(&mut self, ch: char) {
        if let Some(buffer) = self.menu.as_mut().and_then(|menu| menu.label_edit.as_mut()) {
            buffer.push(ch);
        }
    }

    pub fn label_edit_pop(&mut self) {
        if let Some(buffer) = self.menu.as_mut().and_then(|menu| menu.label_edit.as_mut()) {
            buffer.pop();
        }
    }

    /// Applies the typed label and closes the menu. A blank label keeps the
    /// previous one.
    pub fn commit_label_edit(&mut self) {
        let Some(menu) = self.menu.take() else {
            return;
        };
        self.modal = None;
        let Some(label) = menu.label_edit else {
            return;
        };
        let label = label.trim();
        if !label.is_empty() {
            self.rename_token(menu.token, label);
        }
    }

    pub fn cancel_label_edit(&mut self) {
        if let Some(menu) = self.menu.as_mut() {
            menu.label_edit = None;
        }
    }

    pub fn open_lists_modal(&mut self) {
        if self.menu.is_some() {
            self.modal = Some(FieldModal::Lists { selected: 0 });
        }
    }

    /// Attaches `list` to the active token and moves straight on to picking
    /// its options.
    pub fn choose_list(&mut self, list: &List) {
        let Some(id) = self.menu.as_ref().map(|menu| menu.token) else {
            return;
        };
        self.attach_list(id, &list.title);
        self.modal = Some(FieldModal::Options(OptionsPicker {
            list: list.clone(),
            chosen: Vec::new(),
            cursor: 0,
        }));
    }

    pub fn open_options_modal(&mut self, lists: &[List]) -> Result<(), Notice> {
        let Some(token) = self.active_token() else {
            return Ok(());
        };
        let title = token.list_ref.clone().ok_or(Notice::NoListAttached)?;
        let list = lists
            .iter()
            .find(|list| list.title == title)
            .ok_or_else(|| Notice::ListMissing(title.clone()))?;
        let chosen = token.selected_options.clone();
        self.modal = Some(FieldModal::Options(OptionsPicker {
            list: list.clone(),
            chosen,
            cursor: 0,
        }));
        Ok(())
    }

    pub fn toggle_option(&mut self, option: &str) {
        if let Some(FieldModal::Options(picker)) = self.modal.as_mut() {
            picker.toggle(option);
        }
    }

    /// Writes the picked options to the active token and closes the menu.
    pub fn apply_options(&mut self) {
        let Some(FieldModal::Options(picker)) = self.modal.take() else {
            return;
        };
        let Some(menu) = self.menu.take() else {
            return;
        };
        self.set_token_options(menu.token, picker.chosen);
    }

    pub fn dismiss_modal(&mut self) {
        self.modal = None;
    }

    pub fn remove_active_token(&mut self) {
        if let Some(id) = self.menu.as_ref().map(|menu| menu.token) {
            self.remove_token(id);
        }
    }
}

#[cfg(test)]
#[path = "field_tests.rs"]
mod field_tests;
