use std::{
    fs, io,
    sync::mpsc::{Receiver, TryRecvError},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List as ListWidget, ListItem, ListState, Paragraph, Wrap},
};
use tracing::{info, warn};

use wrangle_tui::config::{Cli, Settings};
use wrangle_tui::field::{FieldController, FieldKind, FieldModal, Notice, Visibility, step_index};
use wrangle_tui::field_display::FieldDisplay;
use wrangle_tui::lists::{List, ListPatch, ListStore, parse_items, spawn_load};
use wrangle_tui::logging::init_tracing;
use wrangle_tui::output::OutputComposer;
use wrangle_tui::render::visible_width;
use wrangle_tui::theme::Theme;

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);
const TICK_RATE: Duration = Duration::from_millis(250);
const OUTPUT_HEIGHT: u16 = 6;
const COLLAPSED_HEIGHT: u16 = 3;

const INPUT: usize = 0;
const NEGATIVE: usize = 1;

const DEFAULT_INPUT: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.\n\
Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.\n\
Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat.";

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let settings = Settings::from_cli(Cli::parse());
    init_tracing(&settings.log_path(), settings.verbose);
    info!(data_dir = %settings.data_dir.display(), seed = ?settings.seed, "starting");

    let loading = spawn_load(
        Box::new(settings.cache()),
        Some(settings.legacy_storage()),
        settings.seed.clone(),
    );
    let mut app = App::new(settings, loading);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().ok();

    let res = run_app(&mut terminal, &mut app).context("application error");

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res?;
    app.emit_output()
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut last_tick = Instant::now();
    let mut needs_redraw = true;

    while !app.should_quit() {
        if needs_redraw {
            terminal
                .draw(|frame| app.draw(frame))
                .context("failed to draw frame")?;
            needs_redraw = false;
        }

        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("event poll failed")? {
            let evt = event::read().context("failed to read event")?;
            app.handle_event(evt);
            needs_redraw = true;
        }

        if last_tick.elapsed() >= TICK_RATE {
            if app.on_tick() {
                needs_redraw = true;
            }
            last_tick = Instant::now();
        }
    }

    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MenuAction {
    EditLabel,
    ChooseList,
    ChooseOptions,
    RemoveToken,
}

#[derive(Clone, Copy)]
struct MenuShortcut {
    key: char,
}

impl MenuShortcut {
    const fn new(key: char) -> Self {
        Self { key }
    }

    fn matches(&self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        matches!(code, KeyCode::Char(ch) if ch == self.key && modifiers.is_empty())
    }
}

#[derive(Clone, Copy)]
struct MenuItem {
    label: &'static str,
    action: MenuAction,
    shortcut: MenuShortcut,
}

impl MenuItem {
    const fn new(label: &'static str, action: MenuAction, key: char) -> Self {
        Self {
            label,
            action,
            shortcut: MenuShortcut::new(key),
        }
    }
}

const TOKEN_MENU: [MenuItem; 4] = [
    MenuItem::new("Label", MenuAction::EditLabel, 'l'),
    MenuItem::new("Lists", MenuAction::ChooseList, 's'),
    MenuItem::new("Options", MenuAction::ChooseOptions, 'o'),
    MenuItem::new("Remove", MenuAction::RemoveToken, 'r'),
];

struct TokenMenuState {
    selected_index: usize,
}

impl TokenMenuState {
    fn new() -> Self {
        Self { selected_index: 0 }
    }

    fn move_selection(&mut self, delta: i32) {
        self.selected_index = step_index(self.selected_index, delta, TOKEN_MENU.len());
    }

    fn current_action(&self) -> Option<MenuAction> {
        TOKEN_MENU.get(self.selected_index).map(|item| item.action)
    }

    fn shortcut_action(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<MenuAction> {
        let (idx, item) = TOKEN_MENU
            .iter()
            .enumerate()
            .find(|(_, item)| item.shortcut.matches(code, modifiers))?;
        self.selected_index = idx;
        Some(item.action)
    }
}

fn is_token_menu_shortcut(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char(' ') | KeyCode::Char('p') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FormFocus {
    Title,
    Items,
}

/// Title and comma separated items for adding or editing a list.
#[derive(Clone, Debug)]
struct ListForm {
    title: String,
    items: String,
    focus: FormFocus,
    /// Index of the list being edited; `None` adds a new list.
    editing: Option<usize>,
}

impl ListForm {
    fn new_list() -> Self {
        Self {
            title: String::new(),
            items: String::new(),
            focus: FormFocus::Title,
            editing: None,
        }
    }

    fn edit(index: usize, list: &List) -> Self {
        Self {
            title: list.title.clone(),
            items: list.items.join(", "),
            focus: FormFocus::Items,
            editing: Some(index),
        }
    }

    fn buffer_mut(&mut self) -> &mut String {
        match self.focus {
            FormFocus::Title => &mut self.title,
            FormFocus::Items => &mut self.items,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FormFocus::Title => FormFocus::Items,
            FormFocus::Items => FormFocus::Title,
        };
    }
}

enum Overlay {
    ListForm(ListForm),
    ListPicker { selected: usize },
}

struct App {
    settings: Settings,
    theme: Theme,
    fields: [FieldDisplay; 2],
    focus: usize,
    output: OutputComposer,
    store: Option<ListStore>,
    loading: Option<Receiver<ListStore>>,
    token_menu: TokenMenuState,
    overlay: Option<Overlay>,
    status_message: Option<(String, Instant)>,
    should_quit: bool,
}

fn store_lists(store: &Option<ListStore>) -> &[List] {
    store.as_ref().map(ListStore::lists).unwrap_or(&[])
}

impl App {
    fn new(settings: Settings, loading: Receiver<ListStore>) -> Self {
        let input = FieldController::new(FieldKind::Input, DEFAULT_INPUT, Visibility::Open);
        let negative = FieldController::new(FieldKind::Negative, "", Visibility::Open);
        Self {
            settings,
            theme: Theme::new(),
            fields: [FieldDisplay::new(input), FieldDisplay::new(negative)],
            focus: INPUT,
            output: OutputComposer::new(),
            store: None,
            loading: Some(loading),
            token_menu: TokenMenuState::new(),
            overlay: None,
            status_message: Some(("Loading lists...".to_string(), Instant::now())),
            should_quit: false,
        }
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn focused(&mut self) -> &mut FieldDisplay {
        &mut self.fields[self.focus]
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    fn notify(&mut self, notice: Notice) {
        self.set_status(notice.to_string());
    }

    /// Returns whether anything visible changed.
    fn on_tick(&mut self) -> bool {
        let mut changed = self.poll_lists();
        if let Some((_, instant)) = &self.status_message
            && instant.elapsed() > STATUS_TIMEOUT
        {
            self.status_message = None;
            changed = true;
        }
        changed
    }

    fn poll_lists(&mut self) -> bool {
        let Some(receiver) = &self.loading else {
            return false;
        };
        match receiver.try_recv() {
            Ok(store) => {
                let count = store.lists().len();
                self.store = Some(store);
                self.loading = None;
                self.set_status(format!("{count} lists loaded"));
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                warn!("list loader exited without a result");
                self.store = Some(ListStore::empty(Box::new(self.settings.cache())));
                self.loading = None;
                true
            }
        }
    }

    fn emit_output(&mut self) -> Result<()> {
        self.output.refresh(&self.fields[INPUT]);
        let output = self.output.output();
        match &self.settings.output {
            Some(path) => fs::write(path, output)
                .with_context(|| format!("failed to write {}", path.display()))?,
            None => println!("{output}"),
        }
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return;
        };

        if matches!(code, KeyCode::Char('q') | KeyCode::Char('c'))
            && modifiers.contains(KeyModifiers::CONTROL)
        {
            self.should_quit = true;
            return;
        }

        if self.overlay.is_some() {
            self.handle_overlay_key(code, modifiers);
            return;
        }
        if self.fields[self.focus].modal().is_some() {
            self.handle_field_modal_key(code);
            return;
        }
        let label_editing = self.fields[self.focus]
            .menu()
            .map(|menu| menu.label_edit.is_some());
        match label_editing {
            Some(true) => self.handle_label_edit_key(code, modifiers),
            Some(false) => self.handle_token_menu_key(code, modifiers),
            None => self.handle_editor_key(code, modifiers),
        }
    }

    fn handle_token_menu_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if is_token_menu_shortcut(code, modifiers) {
            self.focused().close_token_menu();
            return;
        }
        match code {
            KeyCode::Esc => self.focused().close_token_menu(),
            KeyCode::Up => self.token_menu.move_selection(-1),
            KeyCode::Down => self.token_menu.move_selection(1),
            KeyCode::Enter => {
                if let Some(action) = self.token_menu.current_action() {
                    self.execute_menu_action(action);
                }
            }
            KeyCode::Char(_) => {
                if let Some(action) = self.token_menu.shortcut_action(code, modifiers) {
                    self.execute_menu_action(action);
                }
            }
            _ => {}
        }
    }

    fn execute_menu_action(&mut self, action: MenuAction) {
        match action {
            MenuAction::EditLabel => self.focused().begin_label_edit(),
            MenuAction::ChooseList => self.focused().open_lists_modal(),
            MenuAction::ChooseOptions => {
                let lists = store_lists(&self.store);
                if let Err(notice) = self.fields[self.focus].open_options_modal(lists) {
                    self.notify(notice);
                }
            }
            MenuAction::RemoveToken => {
                self.focused().remove_active_token();
                self.focused().set_preferred_column(None);
            }
        }
    }

    fn handle_label_edit_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let field = self.focused();
        match code {
            KeyCode::Esc => field.cancel_label_edit(),
            KeyCode::Enter => field.commit_label_edit(),
            KeyCode::Backspace => field.label_edit_pop(),
            KeyCode::Char(ch)
                if !modifiers.contains(KeyModifiers::CONTROL)
                    && !modifiers.contains(KeyModifiers::ALT) =>
            {
                field.label_edit_push(ch)
            }
            _ => {}
        }
    }

    fn handle_field_modal_key(&mut self, code: KeyCode) {
        let lists = store_lists(&self.store);
        let field = &mut self.fields[self.focus];
        match field.modal_mut() {
            Some(FieldModal::Lists { selected }) => match code {
                KeyCode::Esc => field.dismiss_modal(),
                KeyCode::Up => *selected = step_index(*selected, -1, lists.len()),
                KeyCode::Down => *selected = step_index(*selected, 1, lists.len()),
                KeyCode::Enter => {
                    if let Some(list) = lists.get(*selected) {
                        field.choose_list(list);
                    }
                }
                _ => {}
            },
            Some(FieldModal::Options(picker)) => match code {
                KeyCode::Esc => field.dismiss_modal(),
                KeyCode::Up => picker.move_cursor(-1),
                KeyCode::Down => picker.move_cursor(1),
                KeyCode::Char(' ') => picker.toggle_at_cursor(),
                KeyCode::Enter => {
                    field.apply_options();
                    field.set_preferred_column(None);
                }
                _ => {}
            },
            None => {}
        }
    }

    fn handle_overlay_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let Some(overlay) = self.overlay.as_mut() else {
            return;
        };
        match overlay {
            Overlay::ListPicker { selected } => {
                let count = store_lists(&self.store).len();
                match code {
                    KeyCode::Esc => self.overlay = None,
                    KeyCode::Up => *selected = step_index(*selected, -1, count),
                    KeyCode::Down => *selected = step_index(*selected, 1, count),
                    KeyCode::Enter => {
                        let index = *selected;
                        if let Some(list) = store_lists(&self.store).get(index) {
                            self.overlay = Some(Overlay::ListForm(ListForm::edit(index, list)));
                        }
                    }
                    KeyCode::Delete | KeyCode::Char('d') => {
                        let index = *selected;
                        *selected = index.min(count.saturating_sub(2));
                        if let Some(store) = self.store.as_mut() {
                            store.remove_at(index);
                            self.set_status("List deleted");
                        }
                    }
                    _ => {}
                }
            }
            Overlay::ListForm(form) => match code {
                KeyCode::Esc => self.overlay = None,
                KeyCode::Tab | KeyCode::BackTab => form.toggle_focus(),
                KeyCode::Backspace => {
                    form.buffer_mut().pop();
                }
                KeyCode::Enter => {
                    let form = form.clone();
                    self.save_list_form(form);
                }
                KeyCode::Char(ch)
                    if !modifiers.contains(KeyModifiers::CONTROL)
                        && !modifiers.contains(KeyModifiers::ALT) =>
                {
                    form.buffer_mut().push(ch);
                }
                _ => {}
            },
        }
    }

    fn save_list_form(&mut self, form: ListForm) {
        let title = form.title.trim();
        if title.is_empty() {
            self.notify(Notice::EmptyTitle);
            return;
        }
        let Some(store) = self.store.as_mut() else {
            self.set_status("Lists are still loading");
            return;
        };
        let items = parse_items(&form.items);
        match form.editing {
            Some(index) => {
                store.update_at(
                    index,
                    ListPatch {
                        title: Some(title.to_string()),
                        items: Some(items),
                    },
                );
                self.overlay = Some(Overlay::ListPicker { selected: index });
                self.set_status("List updated");
            }
            None => {
                store.append(List::new(title, items));
                self.overlay = None;
                self.set_status(format!("List \"{title}\" added"));
            }
        }
    }

    fn handle_editor_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if is_token_menu_shortcut(code, modifiers) {
            match self.focused().toggle_menu_at_caret() {
                Ok(()) => self.token_menu = TokenMenuState::new(),
                Err(notice) => self.notify(notice),
            }
            return;
        }

        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        match (code, ctrl) {
            (KeyCode::Tab, _) | (KeyCode::BackTab, _) => {
                self.focus = if self.focus == INPUT { NEGATIVE } else { INPUT };
                return;
            }
            (KeyCode::F(2), _) => {
                self.focused().toggle_visibility();
                return;
            }
            (KeyCode::Char('l'), true) => {
                self.focused().insert_token();
            }
            (KeyCode::Char('z'), true) => {
                if !self.focused().undo() {
                    self.set_status("Nothing to undo");
                }
            }
            (KeyCode::Char('y'), true) => {
                if !self.focused().redo() {
                    self.set_status("Nothing to redo");
                }
            }
            (KeyCode::Char('n'), true) => {
                self.overlay = Some(Overlay::ListForm(ListForm::new_list()));
                return;
            }
            (KeyCode::Char('e'), true) => {
                self.overlay = Some(Overlay::ListPicker { selected: 0 });
                return;
            }
            _ => {
                if self.fields[self.focus].is_open() {
                    self.handle_text_key(code, modifiers);
                }
                return;
            }
        }
        self.focused().set_preferred_column(None);
    }

    fn handle_text_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        let alt = modifiers.contains(KeyModifiers::ALT);
        let field = self.focused();
        match code {
            KeyCode::Up => {
                field.move_cursor_vertical(-1);
                return;
            }
            KeyCode::Down => {
                field.move_cursor_vertical(1);
                return;
            }
            KeyCode::PageUp => {
                field.move_page(-1);
                return;
            }
            KeyCode::PageDown => {
                field.move_page(1);
                return;
            }
            KeyCode::Home => field.move_to_visual_line_start(),
            KeyCode::End => field.move_to_visual_line_end(),
            KeyCode::Left if ctrl || alt => field.move_word_left(),
            KeyCode::Right if ctrl || alt => field.move_word_right(),
            KeyCode::Left => field.move_left(),
            KeyCode::Right => field.move_right(),
            KeyCode::Backspace => {
                field.backspace();
            }
            KeyCode::Delete => {
                field.delete();
            }
            KeyCode::Enter => field.insert_char('\n'),
            KeyCode::Char(ch) if !ctrl && !alt => field.insert_char(ch),
            _ => return,
        }
        field.set_preferred_column(None);
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.height == 0 || area.width == 0 {
            return;
        }
        self.output.refresh(&self.fields[INPUT]);

        let field_constraint = |field: &FieldDisplay| {
            if field.is_open() {
                Constraint::Min(COLLAPSED_HEIGHT)
            } else {
                Constraint::Length(COLLAPSED_HEIGHT)
            }
        };
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                field_constraint(&self.fields[INPUT]),
                field_constraint(&self.fields[NEGATIVE]),
                Constraint::Length(OUTPUT_HEIGHT),
                Constraint::Length(1),
            ])
            .split(area);

        let popup_open = self.overlay.is_some()
            || self.fields[self.focus].menu().is_some()
            || self.fields[self.focus].modal().is_some();
        for idx in [INPUT, NEGATIVE] {
            let focused = idx == self.focus;
            self.draw_field(frame, vertical[idx], idx, focused && !popup_open);
        }
        self.draw_output(frame, vertical[2]);

        let status_line = self.status_line(vertical[3].width as usize);
        let status_widget = Paragraph::new(status_line).style(self.theme.status_bar_style());
        frame.render_widget(status_widget, vertical[3]);

        self.draw_popups(frame, area);
    }

    fn draw_field(&mut self, frame: &mut Frame, area: Rect, idx: usize, show_cursor: bool) {
        let theme = &self.theme;
        let field = &mut self.fields[idx];
        let focused = idx == self.focus;
        let arrow = if field.is_open() { "▾" } else { "▸" };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused))
            .title(Span::styled(
                format!(" {arrow} {} ", field.kind().label()),
                theme.title_style(),
            ));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let Some(render) = field.render(inner.width as usize, theme) else {
            let preview = field.document().plain_text().replace('\n', " ");
            let preview = Paragraph::new(preview).style(theme.menu_disabled_style());
            frame.render_widget(preview, inner);
            return;
        };

        let viewport_height = inner.height as usize;
        let scroll_top = field.update_scroll(viewport_height, render.total_lines);
        let paragraph = Paragraph::new(Text::from(render.lines)).scroll((scroll_top as u16, 0));
        frame.render_widget(paragraph, inner);

        if show_cursor
            && let Some(cursor) = field.last_cursor_visual()
            && cursor.line >= scroll_top
            && cursor.line < scroll_top + viewport_height
        {
            let cursor_y = inner.y + (cursor.line - scroll_top) as u16;
            let cursor_x = inner.x + cursor.column.min(inner.width - 1);
            frame.set_cursor_position(Position::new(cursor_x, cursor_y));
        }
    }

    fn draw_output(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false))
            .title(Span::styled(" Output ", self.theme.title_style()));
        let paragraph = Paragraph::new(self.output.output().to_string())
            .style(self.theme.output_style())
            .wrap(Wrap { trim: false })
            .block(block);
        frame.render_widget(paragraph, area);
    }

    fn status_line(&self, terminal_width: usize) -> Line<'static> {
        if let Some((message, _)) = &self.status_message {
            return Line::from(Span::styled(
                format!(" {message}"),
                self.theme.notice_style(),
            ));
        }

        let field = &self.fields[self.focus];
        let (line, column) = field.document().caret_line_column(field.caret());
        let left = format!(
            " {} {}:{}  {} tokens",
            field.kind().label(),
            line + 1,
            column + 1,
            field.registry().len()
        );

        let shortcuts = [
            "^L:List+",
            "^P:Token",
            "^N:New list",
            "^E:Lists",
            "F2:Fold",
            "^Q:Quit",
        ];
        let left_width = visible_width(&left);
        let mut shown: Vec<&str> = Vec::new();
        let mut shown_width = 0;
        for shortcut in shortcuts.iter().rev() {
            let width = shown_width + visible_width(shortcut) + usize::from(!shown.is_empty());
            if left_width + 1 + width > terminal_width {
                break;
            }
            shown.insert(0, *shortcut);
            shown_width = width;
        }

        let mut spans = vec![Span::raw(left)];
        if !shown.is_empty() {
            let padding = terminal_width
                .saturating_sub(left_width)
                .saturating_sub(shown_width)
                .max(1);
            spans.push(Span::raw(" ".repeat(padding)));
            spans.push(Span::raw(shown.join(" ")));
        }
        Line::from(spans)
    }

    fn draw_popups(&self, frame: &mut Frame, area: Rect) {
        if let Some(overlay) = &self.overlay {
            match overlay {
                Overlay::ListForm(form) => self.draw_list_form(frame, area, form),
                Overlay::ListPicker { selected } => self.draw_list_picker(frame, area, *selected),
            }
            return;
        }

        let field = &self.fields[self.focus];
        match field.modal() {
            Some(FieldModal::Lists { selected }) => {
                let items: Vec<String> = store_lists(&self.store)
                    .iter()
                    .map(|list| format!("{} ({})", list.title, list.items.len()))
                    .collect();
                self.draw_choice_popup(frame, area, "Choose a list", items, *selected, None);
                return;
            }
            Some(FieldModal::Options(picker)) => {
                let items: Vec<String> = picker
                    .list
                    .items
                    .iter()
                    .map(|option| {
                        let mark = if picker.is_chosen(option) { "x" } else { " " };
                        format!("[{mark}] {option}")
                    })
                    .collect();
                let footer = format!("Enter: Apply Selected ({})  Esc: Cancel", picker.chosen.len());
                let title = format!("Options: {}", picker.list.title);
                self.draw_choice_popup(frame, area, &title, items, picker.cursor, Some(footer));
                return;
            }
            None => {}
        }

        let Some(menu) = field.menu() else {
            return;
        };
        let title = field
            .active_token()
            .map(|token| token.label.clone())
            .unwrap_or_default();
        match &menu.label_edit {
            Some(buffer) => self.draw_text_popup(
                frame,
                area,
                &format!("Label for {title}"),
                &[("", buffer.as_str(), true)],
            ),
            None => self.draw_token_menu(frame, area, &title),
        }
    }

    fn draw_token_menu(&self, frame: &mut Frame, area: Rect, title: &str) {
        let label_width = TOKEN_MENU
            .iter()
            .map(|item| item.label.chars().count())
            .max()
            .unwrap_or(0);
        let items: Vec<String> = TOKEN_MENU
            .iter()
            .map(|item| {
                format!(
                    "{label:<label_width$}  {key}",
                    label = item.label,
                    key = item.shortcut.key
                )
            })
            .collect();
        self.draw_choice_popup(frame, area, title, items, self.token_menu.selected_index, None);
    }

    fn draw_list_picker(&self, frame: &mut Frame, area: Rect, selected: usize) {
        let items: Vec<String> = store_lists(&self.store)
            .iter()
            .map(|list| format!("{}: {}", list.title, list.items.join(", ")))
            .collect();
        self.draw_choice_popup(
            frame,
            area,
            "Edit lists",
            items,
            selected,
            Some("Enter: Edit  d: Delete  Esc: Close".to_string()),
        );
    }

    fn draw_list_form(&self, frame: &mut Frame, area: Rect, form: &ListForm) {
        let title = if form.editing.is_some() {
            "Edit list"
        } else {
            "Add list"
        };
        self.draw_text_popup(
            frame,
            area,
            title,
            &[
                ("Title", form.title.as_str(), form.focus == FormFocus::Title),
                (
                    "Items (comma separated)",
                    form.items.as_str(),
                    form.focus == FormFocus::Items,
                ),
            ],
        );
    }

    fn draw_choice_popup(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        items: Vec<String>,
        selected: usize,
        footer: Option<String>,
    ) {
        let content_width = items
            .iter()
            .map(|item| visible_width(item))
            .chain(footer.iter().map(|footer| visible_width(footer)))
            .chain([visible_width(title)])
            .max()
            .unwrap_or(0);
        let rows = items.len().max(1) + usize::from(footer.is_some());
        let popup_area = centered_rect(area, content_width as u16 + 4, rows as u16 + 2);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .style(self.theme.menu_style())
            .border_style(self.theme.border_style(true));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let (list_area, footer_area) = if footer.is_some() && inner.height > 1 {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(inner);
            (split[0], Some(split[1]))
        } else {
            (inner, None)
        };

        if items.is_empty() {
            let empty = Paragraph::new("(no lists yet, Ctrl-N adds one)")
                .style(self.theme.menu_disabled_style());
            frame.render_widget(empty, list_area);
        } else {
            let entries: Vec<ListItem> = items.into_iter().map(ListItem::new).collect();
            let mut state = ListState::default();
            state.select(Some(selected));
            let list = ListWidget::new(entries)
                .style(self.theme.menu_style())
                .highlight_style(self.theme.menu_selected_style());
            frame.render_stateful_widget(list, list_area, &mut state);
        }

        if let (Some(footer), Some(footer_area)) = (footer, footer_area) {
            let footer = Paragraph::new(footer).style(self.theme.menu_disabled_style());
            frame.render_widget(footer, footer_area);
        }
    }

    /// Popup with labelled single-line inputs; the focused one gets the cursor.
    fn draw_text_popup(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        inputs: &[(&str, &str, bool)],
    ) {
        let width = area.width.saturating_sub(4).min(60);
        let rows: usize = inputs
            .iter()
            .map(|(label, _, _)| if label.is_empty() { 1 } else { 2 })
            .sum();
        let popup_area = centered_rect(area, width, rows as u16 + 3);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .style(self.theme.menu_style())
            .border_style(self.theme.border_style(true));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let mut lines = Vec::new();
        let mut cursor = None;
        for (label, value, focused) in inputs {
            if !label.is_empty() {
                lines.push(Line::from(Span::styled(
                    label.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
            }
            if *focused {
                cursor = Some((lines.len(), visible_width(value)));
            }
            lines.push(Line::from(value.to_string()));
        }
        lines.push(Line::from(Span::styled(
            "Enter: Save  Tab: Next  Esc: Cancel",
            self.theme.menu_disabled_style(),
        )));
        frame.render_widget(Paragraph::new(Text::from(lines)), inner);

        if let Some((row, column)) = cursor
            && (row as u16) < inner.height
            && inner.width > 0
        {
            let x = inner.x + (column as u16).min(inner.width - 1);
            frame.set_cursor_position(Position::new(x, inner.y + row as u16));
        }
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width).max(10.min(area.width));
    let height = height.min(area.height).max(3.min(area.height));
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}
