use std::ops::Range;
use std::path::PathBuf;

use gpui::prelude::FluentBuilder;
use gpui::*;

use crate::cell::Backspace;
use crate::schema::{Column, COLUMN_COUNT};
use crate::text_edit::EditBuffer;
use crate::Theme;

actions!(
    command_palette,
    [
        ShowCommandPalette,
        HideCommandPalette,
        SelectNext,
        SelectPrevious,
        Confirm,
    ]
);

/// What a palette entry does when confirmed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    LoadDatabase,
    SaveCsv,
    Clear,
    Fill(usize),
    GenerateDeleteQuery,
    CopyDeleteQuery,
    WriteSettings,
    Quit,
}

/// A command that can be executed from the palette
#[derive(Clone, Debug)]
pub struct Command {
    pub kind: CommandKind,
    pub name: &'static str,
    pub shortcut: Option<&'static str>,
    pub vim_alias: Option<&'static str>,
}

impl Command {
    pub const fn new(kind: CommandKind, name: &'static str) -> Self {
        Self {
            kind,
            name,
            shortcut: None,
            vim_alias: None,
        }
    }

    pub const fn with_shortcut(mut self, shortcut: &'static str) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub const fn with_vim(mut self, alias: &'static str) -> Self {
        self.vim_alias = Some(alias);
        self
    }
}

/// Result of parsing a vim-style command line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VimCommand {
    /// :e <path> - load a database file
    Edit(PathBuf),
    /// :w - save the grid (asks for a path the first time)
    Write,
    /// :w <path> - save the grid to path
    WriteTo(PathBuf),
    /// :new - clear the grid
    New,
    /// :fill <1-8> - fill one column
    Fill(usize),
    /// :delete - build the delete query
    Delete,
    /// :q - quit
    Quit,
}

impl VimCommand {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim().strip_prefix(':')?;
        let (cmd, arg) = match input.split_once(' ') {
            Some((cmd, arg)) => (cmd, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (input, None),
        };

        match (cmd, arg) {
            ("e" | "edit" | "load", Some(path)) => Some(VimCommand::Edit(PathBuf::from(path))),
            ("w", None) => Some(VimCommand::Write),
            ("w", Some(path)) => Some(VimCommand::WriteTo(PathBuf::from(path))),
            ("new" | "clear", None) => Some(VimCommand::New),
            ("fill", Some(n)) => n
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=COLUMN_COUNT).contains(n))
                .map(|n| VimCommand::Fill(n - 1)),
            ("delete", None) => Some(VimCommand::Delete),
            ("q" | "q!" | "quit", None) => Some(VimCommand::Quit),
            _ => None,
        }
    }
}

/// What the palette asks its owner to run
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaletteRequest {
    Command(CommandKind),
    Vim(VimCommand),
}

/// All available commands
pub const COMMANDS: &[Command] = &[
    Command::new(CommandKind::LoadDatabase, "Load Database...")
        .with_shortcut("⌘O")
        .with_vim(":e"),
    Command::new(CommandKind::SaveCsv, "Save CSV...")
        .with_shortcut("⌘S")
        .with_vim(":w"),
    Command::new(CommandKind::Clear, "Clear")
        .with_shortcut("⌘N")
        .with_vim(":new"),
    Command::new(CommandKind::Fill(0), "Fill Device ID")
        .with_shortcut("⌘1")
        .with_vim(":fill 1"),
    Command::new(CommandKind::Fill(1), "Fill Device Model ID (*)")
        .with_shortcut("⌘2")
        .with_vim(":fill 2"),
    Command::new(CommandKind::Fill(2), "Fill Container ID")
        .with_shortcut("⌘3")
        .with_vim(":fill 3"),
    Command::new(CommandKind::Fill(3), "Fill Place in Container")
        .with_shortcut("⌘4")
        .with_vim(":fill 4"),
    Command::new(CommandKind::Fill(4), "Fill MAC Address (*)")
        .with_shortcut("⌘5")
        .with_vim(":fill 5"),
    Command::new(CommandKind::Fill(5), "Fill IP Address")
        .with_shortcut("⌘6")
        .with_vim(":fill 6"),
    Command::new(CommandKind::Fill(6), "Fill Serial Number (*)")
        .with_shortcut("⌘7")
        .with_vim(":fill 7"),
    Command::new(CommandKind::Fill(7), "Fill Pool Profile ID")
        .with_shortcut("⌘8")
        .with_vim(":fill 8"),
    Command::new(CommandKind::GenerateDeleteQuery, "Generate Delete Query")
        .with_vim(":delete"),
    Command::new(CommandKind::CopyDeleteQuery, "Copy Delete Query"),
    Command::new(CommandKind::WriteSettings, "Write Settings File"),
    Command::new(CommandKind::Quit, "Quit")
        .with_shortcut("⌘Q")
        .with_vim(":q"),
];

/// Indices into `COMMANDS` matching `query`
fn filter_commands(query: &str) -> Vec<usize> {
    let query = query.to_lowercase();
    COMMANDS
        .iter()
        .enumerate()
        .filter(|(_, cmd)| {
            query.is_empty()
                || cmd.name.to_lowercase().contains(&query)
                || (query.starts_with(':')
                    && cmd.vim_alias.is_some_and(|alias| alias.starts_with(query.as_str())))
        })
        .map(|(idx, _)| idx)
        .collect()
}

type CommandHandler = Box<dyn Fn(PaletteRequest, &mut Window, &mut App) + 'static>;

pub struct CommandPalette {
    focus_handle: FocusHandle,
    input: EditBuffer,
    selected_index: usize,
    filtered_commands: Vec<usize>,
    vim_command: Option<VimCommand>,
    on_command: Option<CommandHandler>,
}

impl CommandPalette {
    pub fn new(cx: &mut Context<Self>) -> Self {
        let mut palette = Self {
            focus_handle: cx.focus_handle(),
            input: EditBuffer::default(),
            selected_index: 0,
            filtered_commands: Vec::new(),
            vim_command: None,
            on_command: None,
        };
        palette.update_filter();
        palette
    }

    pub fn set_command_handler<F>(&mut self, handler: F)
    where
        F: Fn(PaletteRequest, &mut Window, &mut App) + 'static,
    {
        self.on_command = Some(Box::new(handler));
    }

    pub fn reset(&mut self, cx: &mut Context<Self>) {
        self.input = EditBuffer::default();
        self.selected_index = 0;
        self.update_filter();
        cx.notify();
    }

    fn update_filter(&mut self) {
        self.vim_command = VimCommand::parse(self.input.text());
        self.filtered_commands = filter_commands(self.input.text());
        if self.selected_index >= self.filtered_commands.len() {
            self.selected_index = 0;
        }
    }

    fn select_next(&mut self, _: &SelectNext, _window: &mut Window, cx: &mut Context<Self>) {
        if !self.filtered_commands.is_empty() {
            self.selected_index = (self.selected_index + 1) % self.filtered_commands.len();
            cx.notify();
        }
    }

    fn select_previous(&mut self, _: &SelectPrevious, _window: &mut Window, cx: &mut Context<Self>) {
        let len = self.filtered_commands.len();
        if len > 0 {
            self.selected_index = (self.selected_index + len - 1) % len;
            cx.notify();
        }
    }

    fn backspace(&mut self, _: &Backspace, _window: &mut Window, cx: &mut Context<Self>) {
        self.input.backspace();
        self.update_filter();
        cx.notify();
    }

    fn confirm(&mut self, _: &Confirm, window: &mut Window, cx: &mut Context<Self>) {
        let request = match self.vim_command.take() {
            Some(vim_cmd) => PaletteRequest::Vim(vim_cmd),
            None => match self.filtered_commands.get(self.selected_index) {
                Some(&idx) => PaletteRequest::Command(COMMANDS[idx].kind),
                None => return,
            },
        };
        if let Some(handler) = &self.on_command {
            handler(request, window, cx);
        }
    }
}

impl Render for CommandPalette {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.global::<Theme>();

        div()
            .key_context("CommandPalette")
            .track_focus(&self.focus_handle)
            .on_action(cx.listener(Self::select_next))
            .on_action(cx.listener(Self::select_previous))
            .on_action(cx.listener(Self::confirm))
            .on_action(cx.listener(Self::backspace))
            .flex()
            .flex_col()
            .w(px(420.))
            .max_h(px(360.))
            .bg(theme.mantle)
            .border_1()
            .border_color(theme.surface1)
            .rounded(px(8.))
            .shadow_lg()
            .overflow_hidden()
            .child(self.render_input(cx))
            .child(self.render_results(cx))
    }
}

impl CommandPalette {
    fn render_input(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.global::<Theme>();

        div()
            .flex()
            .flex_row()
            .items_center()
            .w_full()
            .h(px(40.))
            .px(px(12.))
            .border_b_1()
            .border_color(theme.surface0)
            .child(
                div()
                    .text_color(theme.subtext0)
                    .text_size(px(16.))
                    .mr(px(8.))
                    .child(">"),
            )
            .child(
                div()
                    .id("palette-input")
                    .flex_1()
                    .text_size(px(14.))
                    .text_color(theme.text)
                    .child(CommandPaletteInput {
                        palette: cx.entity().clone(),
                        content: self.input.text().to_string(),
                        cursor: self.input.cursor(),
                    }),
            )
    }

    fn render_results(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.global::<Theme>();

        div()
            .id("palette-results")
            .flex()
            .flex_col()
            .flex_1()
            .overflow_y_scroll()
            .children(self.filtered_commands.iter().enumerate().map(|(idx, &cmd_idx)| {
                let cmd = &COMMANDS[cmd_idx];
                let is_selected = idx == self.selected_index;

                div()
                    .id(ElementId::Name(format!("cmd-{}", cmd_idx).into()))
                    .flex()
                    .flex_row()
                    .items_center()
                    .justify_between()
                    .w_full()
                    .h(px(30.))
                    .flex_none()
                    .px(px(12.))
                    .when(is_selected, |d| d.bg(theme.surface0))
                    .cursor_pointer()
                    .on_mouse_down(MouseButton::Left, {
                        let entity = cx.entity().clone();
                        move |_, window, app| {
                            entity.update(app, |palette, cx| {
                                palette.selected_index = idx;
                                palette.vim_command = None;
                                cx.notify();
                            });
                            window.dispatch_action(Box::new(Confirm), app);
                        }
                    })
                    .child(
                        div()
                            .flex()
                            .flex_row()
                            .items_center()
                            .gap(px(8.))
                            .child(div().text_size(px(14.)).text_color(theme.text).child(cmd.name))
                            .when_some(cmd.vim_alias, |d, alias| {
                                d.child(div().text_size(px(12.)).text_color(theme.subtext0).child(alias))
                            }),
                    )
                    .when_some(cmd.shortcut, |d, shortcut| {
                        d.child(div().text_size(px(12.)).text_color(theme.subtext0).child(shortcut))
                    })
            }))
    }
}

impl Focusable for CommandPalette {
    fn focus_handle(&self, _: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

/// Input line of the palette with a placeholder and cursor
struct CommandPaletteInput {
    palette: Entity<CommandPalette>,
    content: String,
    cursor: usize,
}

impl IntoElement for CommandPaletteInput {
    type Element = Self;

    fn into_element(self) -> Self::Element {
        self
    }
}

impl Element for CommandPaletteInput {
    type RequestLayoutState = ();
    type PrepaintState = ShapedLine;

    fn id(&self) -> Option<ElementId> {
        None
    }

    fn source_location(&self) -> Option<&'static core::panic::Location<'static>> {
        None
    }

    fn request_layout(
        &mut self,
        _id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        window: &mut Window,
        cx: &mut App,
    ) -> (LayoutId, Self::RequestLayoutState) {
        let mut style = Style::default();
        style.size.width = relative(1.).into();
        style.size.height = window.line_height().into();
        (window.request_layout(style, [], cx), ())
    }

    fn prepaint(
        &mut self,
        _id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        _bounds: Bounds<Pixels>,
        _request_layout: &mut Self::RequestLayoutState,
        window: &mut Window,
        cx: &mut App,
    ) -> Self::PrepaintState {
        let style = window.text_style();
        let font_size = style.font_size.to_pixels(window.rem_size());

        let (text, color): (SharedString, Hsla) = if self.content.is_empty() {
            ("Type a command or :fill 1..8".into(), cx.global::<Theme>().subtext0.into())
        } else {
            (self.content.clone().into(), style.color)
        };
        let run = TextRun {
            len: text.len(),
            font: style.font(),
            color,
            background_color: None,
            underline: None,
            strikethrough: None,
        };
        window.text_system().shape_line(text, font_size, &[run], None)
    }

    fn paint(
        &mut self,
        _id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        bounds: Bounds<Pixels>,
        _request_layout: &mut Self::RequestLayoutState,
        line: &mut Self::PrepaintState,
        window: &mut Window,
        cx: &mut App,
    ) {
        let focus_handle = self.palette.read(cx).focus_handle.clone();
        window.handle_input(
            &focus_handle,
            ElementInputHandler::new(bounds, self.palette.clone()),
            cx,
        );

        if let Err(e) = line.paint(bounds.origin, window.line_height(), window, cx) {
            log::error!("Failed to paint palette input: {}", e);
        }

        if focus_handle.is_focused(window) {
            let cursor_x = if self.content.is_empty() {
                px(0.)
            } else {
                line.x_for_index(self.cursor)
            };
            let cursor = Bounds::new(
                point(bounds.left() + cursor_x, bounds.top()),
                size(px(2.), bounds.size.height),
            );
            window.paint_quad(fill(cursor, cx.global::<Theme>().accent));
        }
    }
}

impl EntityInputHandler for CommandPalette {
    fn text_for_range(
        &mut self,
        range_utf16: Range<usize>,
        actual_range: &mut Option<Range<usize>>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<String> {
        let range = self.input.range_from_utf16(&range_utf16);
        actual_range.replace(self.input.range_to_utf16(&range));
        self.input.text().get(range).map(str::to_string)
    }

    fn selected_text_range(
        &mut self,
        _ignore_disabled_input: bool,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<UTF16Selection> {
        Some(UTF16Selection {
            range: self.input.range_to_utf16(&self.input.selected_range()),
            reversed: self.input.is_reversed(),
        })
    }

    fn marked_text_range(&self, _window: &mut Window, _cx: &mut Context<Self>) -> Option<Range<usize>> {
        None
    }

    fn unmark_text(&mut self, _window: &mut Window, _cx: &mut Context<Self>) {}

    fn replace_text_in_range(
        &mut self,
        range_utf16: Option<Range<usize>>,
        new_text: &str,
        _: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let range = range_utf16.map(|r| self.input.range_from_utf16(&r));
        self.input.replace(range, &new_text.replace(['\n', '\r'], ""));
        self.update_filter();
        cx.notify();
    }

    fn replace_and_mark_text_in_range(
        &mut self,
        range_utf16: Option<Range<usize>>,
        new_text: &str,
        _new_selected_range_utf16: Option<Range<usize>>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self.replace_text_in_range(range_utf16, new_text, window, cx);
    }

    fn bounds_for_range(
        &mut self,
        _range_utf16: Range<usize>,
        bounds: Bounds<Pixels>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<Bounds<Pixels>> {
        Some(bounds)
    }

    fn character_index_for_point(
        &mut self,
        _point: gpui::Point<Pixels>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<usize> {
        Some(self.input.offset_to_utf16(self.input.cursor()))
    }
}

/// Palette entry for filling `column`
pub fn fill_command(column: Column) -> Option<&'static Command> {
    COMMANDS
        .iter()
        .find(|cmd| cmd.kind == CommandKind::Fill(column.index()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::prelude::v1::test;

    #[test]
    fn parses_vim_commands() {
        assert_eq!(
            VimCommand::parse(":e /tmp/db.csv"),
            Some(VimCommand::Edit(PathBuf::from("/tmp/db.csv")))
        );
        assert_eq!(VimCommand::parse(" :w "), Some(VimCommand::Write));
        assert_eq!(
            VimCommand::parse(":w out.csv"),
            Some(VimCommand::WriteTo(PathBuf::from("out.csv")))
        );
        assert_eq!(VimCommand::parse(":fill 7"), Some(VimCommand::Fill(6)));
        assert_eq!(VimCommand::parse(":clear"), Some(VimCommand::New));
        assert_eq!(VimCommand::parse(":delete"), Some(VimCommand::Delete));
        assert_eq!(VimCommand::parse(":q!"), Some(VimCommand::Quit));
    }

    #[test]
    fn rejects_incomplete_vim_commands() {
        assert_eq!(VimCommand::parse("e db.csv"), None);
        assert_eq!(VimCommand::parse(":e"), None);
        assert_eq!(VimCommand::parse(":fill"), None);
        assert_eq!(VimCommand::parse(":fill 0"), None);
        assert_eq!(VimCommand::parse(":fill 9"), None);
        assert_eq!(VimCommand::parse(":delete all"), None);
    }

    #[test]
    fn every_column_has_a_fill_command() {
        for column in Column::ALL {
            let cmd = fill_command(column).unwrap();
            assert_eq!(cmd.name, format!("Fill {}", column.label()));
        }
    }

    #[test]
    fn filter_matches_names_and_vim_aliases() {
        assert_eq!(filter_commands("").len(), COMMANDS.len());

        let serial: Vec<_> = filter_commands("serial").iter().map(|&i| COMMANDS[i].kind).collect();
        assert_eq!(serial, [CommandKind::Fill(6)]);

        let fill3: Vec<_> = filter_commands(":fill 3").iter().map(|&i| COMMANDS[i].kind).collect();
        assert_eq!(fill3, [CommandKind::Fill(2)]);

        assert!(filter_commands("no such command").is_empty());
    }
}
