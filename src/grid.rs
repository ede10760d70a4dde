use std::path::PathBuf;

use gpui::prelude::FluentBuilder;
use gpui::*;
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use crate::cell::CellInput;
use crate::command_palette::{
    fill_command, CommandKind, CommandPalette, HideCommandPalette, PaletteRequest,
    ShowCommandPalette, VimCommand,
};
use crate::error::Error;
use crate::schema::{Column, COLUMN_COUNT};
use crate::settings::Settings;
use crate::sheet::DeviceSheet;
use crate::state::{CellPosition, Mode};
use crate::Theme;

pub const MIN_CELL_WIDTH: f32 = 110.0;
pub const CELL_HEIGHT: f32 = 28.0;
pub const ROW_HEADER_WIDTH: f32 = 50.0;
pub const COLUMN_HEADER_HEIGHT: f32 = 24.0;
pub const HEADER_HEIGHT: f32 = 32.0;
pub const TOOLBAR_HEIGHT: f32 = 36.0;
pub const QUERY_HEIGHT: f32 = 84.0;
pub const FOOTER_HEIGHT: f32 = 24.0;

// Room for half the columns and three grid rows below the fixed bars
pub const MIN_WINDOW_WIDTH: f32 = ROW_HEADER_WIDTH + MIN_CELL_WIDTH * 4.0;
pub const MIN_WINDOW_HEIGHT: f32 = HEADER_HEIGHT
    + COLUMN_HEADER_HEIGHT
    + CELL_HEIGHT * 3.0
    + TOOLBAR_HEIGHT * 2.0
    + QUERY_HEIGHT
    + FOOTER_HEIGHT;

// Actions for Normal mode
actions!(
    normal_mode,
    [
        MoveUp,
        MoveDown,
        MoveLeft,
        MoveRight,
        EnterEditMode,
        PasteColumn,
        ClearCell,
    ]
);

// Actions for Edit mode
actions!(
    edit_mode,
    [
        ExitEditMode,
        ExitAndMoveDown,
        ExitAndMoveLeft,
        ExitAndMoveRight,
    ]
);

// Global actions
actions!(devsheets, [Quit]);

// Database and file actions
actions!(
    file_ops,
    [
        LoadDatabase,
        SaveCsv,
        ClearGrid,
        GenerateDeleteQuery,
        CopyDeleteQuery,
        WriteSettings,
    ]
);

// One fill action per grid column
actions!(
    fill,
    [
        FillDeviceId,
        FillDeviceModelId,
        FillContainerId,
        FillPlaceInContainer,
        FillMacAddress,
        FillIpAddress,
        FillSerialNumber,
        FillPoolProfileId,
    ]
);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug)]
struct Status {
    level: StatusLevel,
    message: String,
}

/// The main application component
pub struct DevSheetsApp {
    grid: Entity<DeviceGrid>,
}

impl DevSheetsApp {
    pub fn new(settings: Settings, cx: &mut Context<Self>) -> Self {
        let grid = cx.new(|cx| DeviceGrid::new(settings, cx));
        Self { grid }
    }
}

impl Render for DevSheetsApp {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.global::<Theme>();

        div()
            .flex()
            .flex_col()
            .size_full()
            .bg(theme.base)
            .text_color(theme.text)
            .font_family("Berkeley Mono")
            .child(self.grid.clone())
    }
}

/// The device grid with its fill and database controls
pub struct DeviceGrid {
    focus_handle: FocusHandle,
    active_input: Entity<CellInput>,
    sheet: DeviceSheet,
    selected: CellPosition,
    scroll_row: usize,
    mode: Mode,
    visible_rows: usize,
    cell_width: f32,
    command_palette: Entity<CommandPalette>,
    show_command_palette: bool,
    status: Option<Status>,
    delete_query: Option<String>,
}

impl DeviceGrid {
    pub fn new(settings: Settings, cx: &mut Context<Self>) -> Self {
        let focus_handle = cx.focus_handle();
        let active_input = cx.new(|cx| CellInput::new(cx));
        let command_palette = cx.new(|cx| CommandPalette::new(cx));

        Self {
            focus_handle,
            active_input,
            sheet: DeviceSheet::new(settings),
            selected: CellPosition::new(0, 0),
            scroll_row: 0,
            mode: Mode::Normal,
            visible_rows: 10,
            cell_width: MIN_CELL_WIDTH,
            command_palette,
            show_command_palette: false,
            status: None,
            delete_query: None,
        }
    }

    fn set_status(&mut self, level: StatusLevel, message: impl Into<String>) {
        self.status = Some(Status {
            level,
            message: message.into(),
        });
    }

    /// Show `error` in a dialog and keep it in the footer
    fn report_error(&mut self, error: Error) {
        let (level, dialog_level, title) = if error.is_user_error() {
            (StatusLevel::Warning, MessageLevel::Warning, "Warning")
        } else {
            (StatusLevel::Error, MessageLevel::Error, "Error")
        };
        let message = error.to_string();
        show_dialog(dialog_level, title, &message);
        self.set_status(level, message);
    }

    fn move_up(&mut self, _: &MoveUp, window: &mut Window, cx: &mut Context<Self>) {
        self.move_selection(-1, 0, window, cx);
    }

    fn move_down(&mut self, _: &MoveDown, window: &mut Window, cx: &mut Context<Self>) {
        self.move_selection(1, 0, window, cx);
    }

    fn move_left(&mut self, _: &MoveLeft, window: &mut Window, cx: &mut Context<Self>) {
        self.move_selection(0, -1, window, cx);
    }

    fn move_right(&mut self, _: &MoveRight, window: &mut Window, cx: &mut Context<Self>) {
        self.move_selection(0, 1, window, cx);
    }

    fn move_selection(&mut self, delta_row: isize, delta_col: isize, _window: &mut Window, cx: &mut Context<Self>) {
        self.selected = self
            .selected
            .offset(delta_row, delta_col, self.sheet.grid().row_count());
        self.ensure_visible();
        cx.notify();
    }

    fn enter_edit_mode(&mut self, _: &EnterEditMode, window: &mut Window, cx: &mut Context<Self>) {
        self.begin_edit(window, cx);
    }

    fn begin_edit(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.mode = Mode::Edit;

        let content = self
            .sheet
            .grid()
            .cell(self.selected.row, self.selected.col)
            .to_string();
        self.active_input.update(cx, |input, cx| {
            input.set_content(content, cx);
        });

        let focus_handle = self.active_input.focus_handle(cx);
        focus_handle.focus(window);
        cx.notify();
    }

    fn exit_edit_mode(&mut self, _: &ExitEditMode, window: &mut Window, cx: &mut Context<Self>) {
        self.save_and_exit_edit_mode(window, cx);
    }

    fn exit_and_move_down(&mut self, _: &ExitAndMoveDown, window: &mut Window, cx: &mut Context<Self>) {
        self.save_and_exit_edit_mode(window, cx);
        self.move_selection(1, 0, window, cx);
    }

    fn exit_and_move_left(&mut self, _: &ExitAndMoveLeft, window: &mut Window, cx: &mut Context<Self>) {
        self.save_and_exit_edit_mode(window, cx);
        self.move_selection(0, -1, window, cx);
    }

    fn exit_and_move_right(&mut self, _: &ExitAndMoveRight, window: &mut Window, cx: &mut Context<Self>) {
        self.save_and_exit_edit_mode(window, cx);
        self.move_selection(0, 1, window, cx);
    }

    fn save_and_exit_edit_mode(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.mode != Mode::Edit {
            return;
        }
        let content = self.active_input.read(cx).get_content();
        if let Err(e) = self.sheet.set_cell(self.selected.row, self.selected.col, content) {
            self.report_error(e);
        }

        self.mode = Mode::Normal;
        self.focus_handle.focus(window);
        cx.notify();
    }

    /// Paste clipboard lines down the selected column, one value per row
    fn paste_column(&mut self, _: &PasteColumn, _window: &mut Window, cx: &mut Context<Self>) {
        let Some(text) = cx.read_from_clipboard().and_then(|item| item.text()) else {
            return;
        };
        match self.sheet.paste_at(self.selected.row, self.selected.col, &text) {
            Ok(0) => self.set_status(StatusLevel::Info, "Clipboard has no values to paste"),
            Ok(n) => self.set_status(StatusLevel::Info, format!("Pasted {} values", n)),
            Err(e) => self.report_error(e),
        }
        cx.notify();
    }

    fn clear_cell(&mut self, _: &ClearCell, _window: &mut Window, cx: &mut Context<Self>) {
        if let Err(e) = self.sheet.set_cell(self.selected.row, self.selected.col, "") {
            self.report_error(e);
        }
        cx.notify();
    }

    // Database and file operations
    fn load_database(&mut self, _: &LoadDatabase, window: &mut Window, cx: &mut Context<Self>) {
        let path = rfd::FileDialog::new()
            .set_title("Select CSV File")
            .add_filter("CSV Files", &["csv"])
            .add_filter("All Files", &["*"])
            .pick_file();

        if let Some(path) = path {
            self.load_database_from(path);
        }

        self.focus_handle.focus(window);
        cx.notify();
    }

    fn load_database_from(&mut self, path: PathBuf) {
        match self.sheet.load_csv(&path).map(|columns| columns.len()) {
            Ok(columns) => {
                let records = self.sheet.database().map_or(0, |t| t.len());
                self.delete_query = None;
                self.set_status(
                    StatusLevel::Success,
                    format!(
                        "Loaded {} records with {} columns from {}",
                        records,
                        columns,
                        self.sheet.files().database_name()
                    ),
                );
                show_dialog(MessageLevel::Info, "Success", "Database loaded successfully!");
            }
            Err(e) => self.report_error(e),
        }
    }

    fn save_csv(&mut self, _: &SaveCsv, window: &mut Window, cx: &mut Context<Self>) {
        let default_name = self
            .sheet
            .files()
            .export_name()
            .unwrap_or_else(|| "devices.csv".to_string());
        let path = rfd::FileDialog::new()
            .set_title("Save CSV File")
            .add_filter("CSV Files", &["csv"])
            .set_file_name(default_name)
            .save_file();

        if let Some(path) = path {
            self.export_to(path);
        }

        self.focus_handle.focus(window);
        cx.notify();
    }

    fn export_to(&mut self, path: PathBuf) {
        match self.sheet.export_csv(&path) {
            Ok(()) => {
                self.set_status(StatusLevel::Success, format!("Saved {}", path.display()));
                show_dialog(MessageLevel::Info, "Success", "File saved successfully!");
            }
            Err(e) => self.report_error(e),
        }
    }

    fn clear_grid(&mut self, _: &ClearGrid, window: &mut Window, cx: &mut Context<Self>) {
        if self.sheet.has_unsaved_edits() && !confirm_discard() {
            return;
        }
        self.sheet.clear();
        self.mode = Mode::Normal;
        self.selected = CellPosition::new(0, 0);
        self.scroll_row = 0;
        self.set_status(StatusLevel::Info, "Cleared");
        self.focus_handle.focus(window);
        cx.notify();
    }

    fn fill(&mut self, index: usize, window: &mut Window, cx: &mut Context<Self>) {
        self.save_and_exit_edit_mode(window, cx);

        match self.sheet.fill_column_at(index) {
            Ok(report) => {
                let label = Column::from_index(index).map_or("", Column::label);
                let level = if report.filled > 0 {
                    StatusLevel::Success
                } else {
                    StatusLevel::Info
                };
                self.set_status(level, report.summary(label));
            }
            Err(e) => self.report_error(e),
        }
        cx.notify();
    }

    fn fill_device_id(&mut self, _: &FillDeviceId, window: &mut Window, cx: &mut Context<Self>) {
        self.fill(Column::DeviceId.index(), window, cx);
    }

    fn fill_device_model_id(&mut self, _: &FillDeviceModelId, window: &mut Window, cx: &mut Context<Self>) {
        self.fill(Column::DeviceModelId.index(), window, cx);
    }

    fn fill_container_id(&mut self, _: &FillContainerId, window: &mut Window, cx: &mut Context<Self>) {
        self.fill(Column::ContainerId.index(), window, cx);
    }

    fn fill_place_in_container(&mut self, _: &FillPlaceInContainer, window: &mut Window, cx: &mut Context<Self>) {
        self.fill(Column::PlaceInContainer.index(), window, cx);
    }

    fn fill_mac_address(&mut self, _: &FillMacAddress, window: &mut Window, cx: &mut Context<Self>) {
        self.fill(Column::MacAddress.index(), window, cx);
    }

    fn fill_ip_address(&mut self, _: &FillIpAddress, window: &mut Window, cx: &mut Context<Self>) {
        self.fill(Column::IpAddress.index(), window, cx);
    }

    fn fill_serial_number(&mut self, _: &FillSerialNumber, window: &mut Window, cx: &mut Context<Self>) {
        self.fill(Column::SerialNumber.index(), window, cx);
    }

    fn fill_pool_profile_id(&mut self, _: &FillPoolProfileId, window: &mut Window, cx: &mut Context<Self>) {
        self.fill(Column::PoolProfileId.index(), window, cx);
    }

    fn generate_delete_query(&mut self, _: &GenerateDeleteQuery, _window: &mut Window, cx: &mut Context<Self>) {
        match self.sheet.generate_delete_query() {
            Ok(query) => {
                self.delete_query = Some(query);
                self.set_status(StatusLevel::Success, "Delete query generated");
            }
            Err(e) => self.report_error(e),
        }
        cx.notify();
    }

    fn copy_delete_query(&mut self, _: &CopyDeleteQuery, _window: &mut Window, cx: &mut Context<Self>) {
        match &self.delete_query {
            Some(query) => {
                cx.write_to_clipboard(ClipboardItem::new_string(query.clone()));
                self.set_status(StatusLevel::Info, "Delete query copied to clipboard");
            }
            None => self.set_status(StatusLevel::Warning, "Generate the delete query first"),
        }
        cx.notify();
    }

    fn write_settings(&mut self, _: &WriteSettings, _window: &mut Window, cx: &mut Context<Self>) {
        let path = Settings::default_path();
        match self.sheet.settings().save(&path) {
            Ok(()) => self.set_status(StatusLevel::Success, format!("Settings written to {}", path.display())),
            Err(e) => {
                log::error!("Failed to write settings {}: {}", path.display(), e);
                self.set_status(StatusLevel::Error, format!("Failed to write settings: {}", e));
            }
        }
        cx.notify();
    }

    // Command palette
    fn show_command_palette(&mut self, _: &ShowCommandPalette, window: &mut Window, cx: &mut Context<Self>) {
        self.save_and_exit_edit_mode(window, cx);

        self.show_command_palette = true;
        self.command_palette.update(cx, |palette, cx| {
            palette.reset(cx);
        });

        let palette_focus = self.command_palette.focus_handle(cx);
        palette_focus.focus(window);
        cx.notify();
    }

    fn hide_command_palette(&mut self, _: &HideCommandPalette, window: &mut Window, cx: &mut Context<Self>) {
        self.show_command_palette = false;
        self.focus_handle.focus(window);
        cx.notify();
    }

    fn handle_command(&mut self, request: PaletteRequest, window: &mut Window, cx: &mut Context<Self>) {
        self.show_command_palette = false;
        self.focus_handle.focus(window);

        match request {
            PaletteRequest::Command(kind) => match kind {
                CommandKind::LoadDatabase => self.load_database(&LoadDatabase, window, cx),
                CommandKind::SaveCsv => self.save_csv(&SaveCsv, window, cx),
                CommandKind::Clear => self.clear_grid(&ClearGrid, window, cx),
                CommandKind::Fill(index) => self.fill(index, window, cx),
                CommandKind::GenerateDeleteQuery => self.generate_delete_query(&GenerateDeleteQuery, window, cx),
                CommandKind::CopyDeleteQuery => self.copy_delete_query(&CopyDeleteQuery, window, cx),
                CommandKind::WriteSettings => self.write_settings(&WriteSettings, window, cx),
                CommandKind::Quit => cx.quit(),
            },
            PaletteRequest::Vim(vim_cmd) => match vim_cmd {
                VimCommand::Edit(path) => self.load_database_from(path),
                VimCommand::Write => match self.sheet.files().export_path.clone() {
                    Some(path) => self.export_to(path),
                    None => self.save_csv(&SaveCsv, window, cx),
                },
                VimCommand::WriteTo(path) => self.export_to(path),
                VimCommand::New => self.clear_grid(&ClearGrid, window, cx),
                VimCommand::Fill(index) => self.fill(index, window, cx),
                VimCommand::Delete => self.generate_delete_query(&GenerateDeleteQuery, window, cx),
                VimCommand::Quit => cx.quit(),
            },
        }
        cx.notify();
    }

    fn ensure_visible(&mut self) {
        if self.selected.row < self.scroll_row {
            self.scroll_row = self.selected.row;
        } else if self.selected.row >= self.scroll_row + self.visible_rows {
            self.scroll_row = self.selected.row + 1 - self.visible_rows;
        }
    }

    fn max_scroll_row(&self) -> usize {
        self.sheet.grid().row_count().saturating_sub(self.visible_rows)
    }

    fn on_scroll(&mut self, event: &ScrollWheelEvent, _window: &mut Window, cx: &mut Context<Self>) {
        let delta = f32::from(event.delta.pixel_delta(px(CELL_HEIGHT)).y);
        let rows = (-delta / CELL_HEIGHT).round() as isize;
        if rows != 0 {
            self.scroll_row = (self.scroll_row as isize + rows).clamp(0, self.max_scroll_row() as isize) as usize;
            cx.notify();
        }
    }

    fn on_cell_click(&mut self, row: usize, col: usize, window: &mut Window, cx: &mut Context<Self>) {
        if self.mode == Mode::Edit && (row != self.selected.row || col != self.selected.col) {
            self.save_and_exit_edit_mode(window, cx);
        }

        self.selected = CellPosition::new(row, col);
        self.ensure_visible();
        cx.notify();
    }

    fn on_cell_double_click(&mut self, row: usize, col: usize, window: &mut Window, cx: &mut Context<Self>) {
        self.save_and_exit_edit_mode(window, cx);
        self.selected = CellPosition::new(row, col);
        self.ensure_visible();
        self.begin_edit(window, cx);
    }

    fn button(
        &self,
        id: impl Into<ElementId>,
        label: impl Into<SharedString>,
        cx: &mut Context<Self>,
        on_click: impl Fn(&mut Self, &mut Window, &mut Context<Self>) + 'static,
    ) -> Stateful<Div> {
        let theme = cx.global::<Theme>();
        let (bg, hover_bg, text) = (theme.surface0, theme.surface1, theme.text);
        let label: SharedString = label.into();

        div()
            .id(id)
            .flex()
            .flex_none()
            .items_center()
            .justify_center()
            .h(px(26.))
            .px(px(10.))
            .rounded(px(4.))
            .bg(bg)
            .hover(move |style| style.bg(hover_bg))
            .text_size(px(12.))
            .text_color(text)
            .overflow_hidden()
            .cursor_pointer()
            .child(label)
            .on_click(cx.listener(move |this, _: &ClickEvent, window, cx| on_click(this, window, cx)))
    }

    fn render_header(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.global::<Theme>();
        let cell_ref = self.selected.to_reference();

        div()
            .flex()
            .flex_row()
            .w_full()
            .h(px(HEADER_HEIGHT))
            .bg(theme.mantle)
            .border_b_1()
            .border_color(theme.surface0)
            .items_center()
            .px(px(8.))
            .gap(px(8.))
            .child(
                div()
                    .flex()
                    .items_center()
                    .justify_center()
                    .px(px(8.))
                    .h(px(24.))
                    .bg(theme.surface0)
                    .rounded(px(4.))
                    .text_size(px(13.))
                    .text_color(theme.subtext1)
                    .child(cell_ref),
            )
            .child(
                div()
                    .flex_1()
                    .h(px(24.))
                    .bg(theme.surface0)
                    .rounded(px(4.))
                    .overflow_hidden()
                    .px(px(8.))
                    .items_center()
                    .text_size(px(14.))
                    .child(if self.mode == Mode::Edit {
                        self.active_input.read(cx).get_content()
                    } else {
                        self.sheet
                            .grid()
                            .cell(self.selected.row, self.selected.col)
                            .to_string()
                    }),
            )
    }

    fn render_column_headers(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.global::<Theme>();

        div()
            .flex()
            .flex_row()
            .h(px(COLUMN_HEADER_HEIGHT))
            .bg(theme.mantle)
            .border_b_1()
            .border_color(theme.surface0)
            .child(
                div()
                    .w(px(ROW_HEADER_WIDTH))
                    .h_full()
                    .flex_none()
                    .border_r_1()
                    .border_color(theme.surface0),
            )
            .children(Column::ALL.iter().map(|column| {
                let is_selected = column.index() == self.selected.col;

                div()
                    .w(px(self.cell_width))
                    .h_full()
                    .flex_none()
                    .flex()
                    .items_center()
                    .justify_center()
                    .overflow_hidden()
                    .border_r_1()
                    .border_color(theme.surface0)
                    .text_size(px(12.))
                    .text_color(if is_selected { theme.accent } else { theme.subtext0 })
                    .font_weight(if is_selected { FontWeight::BOLD } else { FontWeight::NORMAL })
                    .child(column.label())
            }))
    }

    fn render_grid(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.global::<Theme>();
        let grid = self.sheet.grid();
        let end_row = (self.scroll_row + self.visible_rows).min(grid.row_count());

        div()
            .id("device-grid")
            .flex()
            .flex_col()
            .flex_1()
            .overflow_hidden()
            .on_scroll_wheel(cx.listener(Self::on_scroll))
            .children((self.scroll_row..end_row).map(|row| {
                let is_row_selected = row == self.selected.row;

                div()
                    .flex()
                    .flex_row()
                    .flex_none()
                    .h(px(CELL_HEIGHT))
                    .child(
                        div()
                            .w(px(ROW_HEADER_WIDTH))
                            .h_full()
                            .flex_none()
                            .flex()
                            .items_center()
                            .justify_center()
                            .bg(theme.mantle)
                            .border_r_1()
                            .border_b_1()
                            .border_color(theme.surface0)
                            .text_size(px(12.))
                            .text_color(if is_row_selected { theme.accent } else { theme.subtext0 })
                            .font_weight(if is_row_selected { FontWeight::BOLD } else { FontWeight::NORMAL })
                            .child(format!("{}", row + 1)),
                    )
                    .children((0..COLUMN_COUNT).map(|col| {
                        let is_selected = row == self.selected.row && col == self.selected.col;

                        if is_selected && self.mode == Mode::Edit {
                            div()
                                .id(ElementId::Name(format!("cell-edit-{}-{}", row, col).into()))
                                .w(px(self.cell_width))
                                .h(px(CELL_HEIGHT))
                                .flex_none()
                                .border_2()
                                .border_color(theme.accent)
                                .overflow_hidden()
                                .child(self.active_input.clone())
                        } else {
                            div()
                                .id(ElementId::Name(format!("cell-{}-{}", row, col).into()))
                                .w(px(self.cell_width))
                                .h(px(CELL_HEIGHT))
                                .flex_none()
                                .flex()
                                .items_center()
                                .px(px(4.))
                                .border_r_1()
                                .border_b_1()
                                .border_color(if is_selected { theme.accent } else { theme.surface0 })
                                .when(is_selected, |d| d.border_2())
                                .bg(if is_selected { theme.surface0 } else { theme.base })
                                .text_size(px(14.))
                                .overflow_hidden()
                                .on_mouse_down(MouseButton::Left, {
                                    let entity = cx.entity().clone();
                                    move |event, window, app| {
                                        entity.update(app, |this, cx| {
                                            if event.click_count == 2 {
                                                this.on_cell_double_click(row, col, window, cx);
                                            } else {
                                                this.on_cell_click(row, col, window, cx);
                                            }
                                        });
                                    }
                                })
                                .child(grid.cell(row, col).to_string())
                        }
                    }))
            }))
    }

    fn render_fill_bar(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let buttons: Vec<_> = Column::ALL
            .iter()
            .map(|&column| {
                let index = column.index();
                let label = fill_command(column).map_or(column.label(), |cmd| cmd.name);
                self.button(
                    ElementId::Name(format!("fill-{}", index).into()),
                    label,
                    cx,
                    move |this, window, cx| this.fill(index, window, cx),
                )
                .w(px(self.cell_width - 4.))
            })
            .collect();
        let theme = cx.global::<Theme>();

        div()
            .flex()
            .flex_row()
            .flex_none()
            .items_center()
            .h(px(TOOLBAR_HEIGHT))
            .bg(theme.mantle)
            .border_t_1()
            .border_color(theme.surface0)
            .pl(px(ROW_HEADER_WIDTH))
            .gap(px(4.))
            .children(buttons)
    }

    fn render_controls(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let load = self.button("load-database", "Load Database", cx, |this, window, cx| {
            this.load_database(&LoadDatabase, window, cx)
        });
        let save = self.button("save-csv", "Save CSV", cx, |this, window, cx| {
            this.save_csv(&SaveCsv, window, cx)
        });
        let clear = self.button("clear", "Clear", cx, |this, window, cx| {
            this.clear_grid(&ClearGrid, window, cx)
        });
        let generate = self.button("generate-delete-query", "Generate Delete Query", cx, |this, window, cx| {
            this.generate_delete_query(&GenerateDeleteQuery, window, cx)
        });
        let copy = self.button("copy-delete-query", "Copy Query", cx, |this, window, cx| {
            this.copy_delete_query(&CopyDeleteQuery, window, cx)
        });
        let theme = cx.global::<Theme>();

        div()
            .flex()
            .flex_row()
            .flex_none()
            .items_center()
            .h(px(TOOLBAR_HEIGHT))
            .px(px(8.))
            .gap(px(8.))
            .bg(theme.mantle)
            .border_t_1()
            .border_color(theme.surface0)
            .child(load)
            .child(save)
            .child(clear)
            .child(div().flex_1())
            .child(generate)
            .child(copy)
    }

    fn render_query(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.global::<Theme>();
        let (text, color) = match &self.delete_query {
            Some(query) => (query.clone(), theme.text),
            None => ("Delete query will be displayed here".to_string(), theme.overlay1),
        };

        div()
            .id("delete-query")
            .flex()
            .flex_col()
            .flex_none()
            .h(px(QUERY_HEIGHT))
            .mx(px(8.))
            .my(px(4.))
            .px(px(8.))
            .py(px(4.))
            .bg(theme.surface0)
            .rounded(px(4.))
            .overflow_y_scroll()
            .text_size(px(12.))
            .text_color(color)
            .children(text.lines().map(|line| div().child(line.to_string())).collect::<Vec<_>>())
    }

    fn render_footer(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.global::<Theme>();
        let mode_text = match self.mode {
            Mode::Normal => "-- NORMAL --",
            Mode::Edit => "-- EDIT --",
        };

        let files = self.sheet.files();
        let database = match self.sheet.database() {
            Some(table) => format!("{} ({} records)", files.database_name(), table.len()),
            None => files.database_name(),
        };
        let dirty_indicator = if files.is_dirty { "[+]" } else { "" };
        let (status_text, status_color) = match &self.status {
            Some(status) => (
                status.message.clone(),
                match status.level {
                    StatusLevel::Info => theme.subtext0,
                    StatusLevel::Success => theme.success,
                    StatusLevel::Warning => theme.warning,
                    StatusLevel::Error => theme.error,
                },
            ),
            None => (String::new(), theme.subtext0),
        };

        div()
            .flex()
            .flex_row()
            .w_full()
            .h(px(FOOTER_HEIGHT))
            .flex_none()
            .bg(theme.mantle)
            .border_t_1()
            .border_color(theme.surface0)
            .items_center()
            .justify_between()
            .gap(px(12.))
            .px(px(8.))
            .text_size(px(12.))
            .text_color(theme.subtext0)
            .child(div().font_weight(FontWeight::BOLD).child(mode_text))
            .child(
                div()
                    .flex_1()
                    .overflow_hidden()
                    .text_color(status_color)
                    .child(status_text),
            )
            .child(
                div()
                    .flex()
                    .flex_row()
                    .gap(px(8.))
                    .child(
                        div()
                            .when(files.is_dirty, |d| d.text_color(theme.accent))
                            .child(dirty_indicator),
                    )
                    .child(database),
            )
    }
}

impl Render for DeviceGrid {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let viewport = window.viewport_size();
        let grid_height = f32::from(viewport.height)
            - HEADER_HEIGHT
            - COLUMN_HEADER_HEIGHT
            - TOOLBAR_HEIGHT * 2.0
            - QUERY_HEIGHT
            - FOOTER_HEIGHT;
        let grid_width = f32::from(viewport.width) - ROW_HEADER_WIDTH;

        self.visible_rows = ((grid_height / CELL_HEIGHT).floor() as usize).max(1);
        self.cell_width = (grid_width / COLUMN_COUNT as f32).max(MIN_CELL_WIDTH);
        self.scroll_row = self.scroll_row.min(self.max_scroll_row());

        let key_context = if self.show_command_palette {
            "CommandPalette"
        } else if self.mode == Mode::Edit {
            "EditMode"
        } else {
            "NormalMode"
        };

        let entity = cx.entity().clone();
        self.command_palette.update(cx, |palette, _cx| {
            palette.set_command_handler(move |request, window, app| {
                entity.update(app, |grid, cx| {
                    grid.handle_command(request, window, cx);
                });
            });
        });

        let show_palette = self.show_command_palette;

        div()
            .flex()
            .flex_col()
            .size_full()
            .key_context(key_context)
            .track_focus(&self.focus_handle)
            // Normal mode actions
            .on_action(cx.listener(Self::move_up))
            .on_action(cx.listener(Self::move_down))
            .on_action(cx.listener(Self::move_left))
            .on_action(cx.listener(Self::move_right))
            .on_action(cx.listener(Self::enter_edit_mode))
            .on_action(cx.listener(Self::paste_column))
            .on_action(cx.listener(Self::clear_cell))
            // Edit mode actions
            .on_action(cx.listener(Self::exit_edit_mode))
            .on_action(cx.listener(Self::exit_and_move_down))
            .on_action(cx.listener(Self::exit_and_move_left))
            .on_action(cx.listener(Self::exit_and_move_right))
            // Database and file actions
            .on_action(cx.listener(Self::load_database))
            .on_action(cx.listener(Self::save_csv))
            .on_action(cx.listener(Self::clear_grid))
            .on_action(cx.listener(Self::generate_delete_query))
            .on_action(cx.listener(Self::copy_delete_query))
            .on_action(cx.listener(Self::write_settings))
            // Fill actions
            .on_action(cx.listener(Self::fill_device_id))
            .on_action(cx.listener(Self::fill_device_model_id))
            .on_action(cx.listener(Self::fill_container_id))
            .on_action(cx.listener(Self::fill_place_in_container))
            .on_action(cx.listener(Self::fill_mac_address))
            .on_action(cx.listener(Self::fill_ip_address))
            .on_action(cx.listener(Self::fill_serial_number))
            .on_action(cx.listener(Self::fill_pool_profile_id))
            // Command palette actions
            .on_action(cx.listener(Self::show_command_palette))
            .on_action(cx.listener(Self::hide_command_palette))
            .child(self.render_header(cx))
            .child(self.render_column_headers(cx))
            .child(self.render_grid(cx))
            .child(self.render_fill_bar(cx))
            .child(self.render_controls(cx))
            .child(self.render_query(cx))
            .child(self.render_footer(cx))
            .when(show_palette, |d| {
                d.child(
                    div()
                        .absolute()
                        .size_full()
                        .top_0()
                        .left_0()
                        .flex()
                        .items_start()
                        .justify_center()
                        .pt(px(100.))
                        .bg(rgba(0x00000080))
                        .on_mouse_down(MouseButton::Left, {
                            let entity = cx.entity().clone();
                            move |_, window, app| {
                                entity.update(app, |grid, cx| {
                                    grid.hide_command_palette(&HideCommandPalette, window, cx);
                                });
                            }
                        })
                        .child(
                            div()
                                .on_mouse_down(MouseButton::Left, |_, _, app| {
                                    app.stop_propagation();
                                })
                                .child(self.command_palette.clone()),
                        ),
                )
            })
    }
}

impl Focusable for DeviceGrid {
    fn focus_handle(&self, _: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

fn show_dialog(level: MessageLevel, title: &str, description: &str) {
    let _ = MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::Ok)
        .show();
}

fn confirm_discard() -> bool {
    let answer = MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title("Clear")
        .set_description("The grid has unsaved rows. Clear it anyway?")
        .set_buttons(MessageButtons::YesNo)
        .show();
    matches!(answer, MessageDialogResult::Yes)
}
