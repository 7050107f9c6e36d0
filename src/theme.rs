use ratatui::style::{Color, Modifier, Style};

/// Colors used across the prompt editor
#[derive(Clone, Debug)]
pub struct Theme {
    /// Foreground color for plain field text
    pub text_fg: Color,

    /// Border color of an unfocused panel
    pub border_fg: Color,

    /// Border color of the focused field
    pub focused_border_fg: Color,

    /// Foreground color for panel titles
    pub title_fg: Color,

    /// Foreground color for token markers
    pub marker_fg: Color,

    /// Background color for token markers
    pub marker_bg: Color,

    /// Foreground color for the marker whose menu is open
    pub active_marker_fg: Color,

    /// Background color for the marker whose menu is open
    pub active_marker_bg: Color,

    /// Foreground color for the composed output
    pub output_fg: Color,

    /// Foreground (text) color for the status bar
    pub status_bar_fg: Color,

    /// Background color for the status bar
    pub status_bar_bg: Color,

    /// Foreground color for notices in the status bar
    pub notice_fg: Color,

    /// Foreground color for menu items
    pub menu_fg: Color,

    /// Background color for menus and modals
    pub menu_bg: Color,

    /// Foreground color for disabled menu items
    pub menu_disabled_fg: Color,

    /// Foreground color for the selected menu entry
    pub menu_selected_fg: Color,

    /// Background color for the selected menu entry
    pub menu_selected_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text_fg: Color::Reset,
            border_fg: Color::DarkGray,
            focused_border_fg: Color::LightBlue,
            title_fg: Color::LightYellow,
            marker_fg: Color::Black,
            marker_bg: Color::LightCyan,
            active_marker_fg: Color::White,
            active_marker_bg: Color::Magenta,
            output_fg: Color::LightGreen,
            status_bar_fg: Color::White,
            status_bar_bg: Color::Blue,
            notice_fg: Color::LightYellow,
            menu_fg: Color::White,
            menu_bg: Color::Black,
            menu_disabled_fg: Color::DarkGray,
            menu_selected_fg: Color::White,
            menu_selected_bg: Color::LightBlue,
        }
    }
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_text_style(&self) -> Style {
        Style::default().fg(self.text_fg)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.focused_border_fg)
        } else {
            Style::default().fg(self.border_fg)
        }
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.title_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn marker_style(&self) -> Style {
        Style::default().fg(self.marker_fg).bg(self.marker_bg)
    }

    pub fn active_marker_style(&self) -> Style {
        Style::default()
            .fg(self.active_marker_fg)
            .bg(self.active_marker_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn output_style(&self) -> Style {
        Style::default().fg(self.output_fg)
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar_fg)
            .bg(self.status_bar_bg)
    }

    /// Status bar text while a notice is showing
    pub fn notice_style(&self) -> Style {
        self.status_bar_style()
            .fg(self.notice_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn menu_style(&self) -> Style {
        Style::default().fg(self.menu_fg).bg(self.menu_bg)
    }

    pub fn menu_disabled_style(&self) -> Style {
        Style::default().fg(self.menu_disabled_fg).bg(self.menu_bg)
    }

    pub fn menu_selected_style(&self) -> Style {
        Style::default()
            .fg(self.menu_selected_fg)
            .bg(self.menu_selected_bg)
    }
}
