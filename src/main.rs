mod cell;
mod command_palette;
mod delete_query;
mod error;
mod file_io;
mod file_state;
mod fill;
mod grid;
mod menu;
mod reference;
mod schema;
mod settings;
mod sheet;
mod state;
mod text_edit;
mod theme;

use env_logger::Env;
use gpui::*;

use cell::*;
use command_palette::*;
use grid::*;
use settings::Settings;
use theme::Theme;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let settings = Settings::load_or_default();
    log::info!(
        "Starting devsheets: {} rows, match strategy {:?}",
        settings.initial_rows,
        settings.match_strategy
    );

    Application::new().run(move |cx| {
        // Initialize theme
        Theme::init(cx);

        // Set up menu bar
        menu::setup_menu(cx);

        // Register keybindings
        cx.bind_keys([
            // Normal mode navigation
            KeyBinding::new("up", MoveUp, Some("NormalMode")),
            KeyBinding::new("down", MoveDown, Some("NormalMode")),
            KeyBinding::new("left", MoveLeft, Some("NormalMode")),
            KeyBinding::new("right", MoveRight, Some("NormalMode")),
            KeyBinding::new("k", MoveUp, Some("NormalMode")),
            KeyBinding::new("j", MoveDown, Some("NormalMode")),
            KeyBinding::new("h", MoveLeft, Some("NormalMode")),
            KeyBinding::new("l", MoveRight, Some("NormalMode")),
            KeyBinding::new("i", EnterEditMode, Some("NormalMode")),
            KeyBinding::new("enter", EnterEditMode, Some("NormalMode")),
            KeyBinding::new("backspace", ClearCell, Some("NormalMode")),
            KeyBinding::new("delete", ClearCell, Some("NormalMode")),
            KeyBinding::new("secondary-v", PasteColumn, Some("NormalMode")),

            // Edit mode
            KeyBinding::new("escape", ExitEditMode, Some("EditMode")),
            KeyBinding::new("enter", ExitAndMoveDown, Some("EditMode")),
            KeyBinding::new("tab", ExitAndMoveRight, Some("EditMode")),
            KeyBinding::new("shift-tab", ExitAndMoveLeft, Some("EditMode")),

            // Text editing in CellInput
            KeyBinding::new("backspace", Backspace, Some("CellInput")),
            KeyBinding::new("delete", Delete, Some("CellInput")),
            KeyBinding::new("left", Left, Some("CellInput")),
            KeyBinding::new("right", Right, Some("CellInput")),
            KeyBinding::new("shift-left", SelectLeft, Some("CellInput")),
            KeyBinding::new("shift-right", SelectRight, Some("CellInput")),
            KeyBinding::new("secondary-a", SelectAll, Some("CellInput")),
            KeyBinding::new("home", Home, Some("CellInput")),
            KeyBinding::new("end", End, Some("CellInput")),
            KeyBinding::new("ctrl-cmd-space", ShowCharacterPalette, Some("CellInput")),
            KeyBinding::new("secondary-v", Paste, Some("CellInput")),
            KeyBinding::new("secondary-c", Copy, Some("CellInput")),
            KeyBinding::new("secondary-x", Cut, Some("CellInput")),

            // Command palette
            KeyBinding::new("secondary-k", ShowCommandPalette, Some("NormalMode")),
            KeyBinding::new("shift-;", ShowCommandPalette, Some("NormalMode")), // : key
            KeyBinding::new("escape", HideCommandPalette, Some("CommandPalette")),
            KeyBinding::new("up", SelectPrevious, Some("CommandPalette")),
            KeyBinding::new("down", SelectNext, Some("CommandPalette")),
            KeyBinding::new("enter", Confirm, Some("CommandPalette")),
            KeyBinding::new("backspace", Backspace, Some("CommandPalette")),

            // Database and file operations
            KeyBinding::new("secondary-o", LoadDatabase, Some("NormalMode")),
            KeyBinding::new("secondary-s", SaveCsv, Some("NormalMode")),
            KeyBinding::new("secondary-n", ClearGrid, Some("NormalMode")),

            // Fill columns
            KeyBinding::new("secondary-1", FillDeviceId, None),
            KeyBinding::new("secondary-2", FillDeviceModelId, None),
            KeyBinding::new("secondary-3", FillContainerId, None),
            KeyBinding::new("secondary-4", FillPlaceInContainer, None),
            KeyBinding::new("secondary-5", FillMacAddress, None),
            KeyBinding::new("secondary-6", FillIpAddress, None),
            KeyBinding::new("secondary-7", FillSerialNumber, None),
            KeyBinding::new("secondary-8", FillPoolProfileId, None),

            // Global
            KeyBinding::new("secondary-q", Quit, None),
        ]);

        // Register quit action
        cx.on_action::<Quit>(|_, cx| {
            cx.quit();
        });

        // Create the main window
        let window_options = WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                None,
                size(px(1200.), px(720.)),
                cx,
            ))),
            titlebar: Some(TitlebarOptions {
                title: Some("devsheets".into()),
                appears_transparent: false,
                ..Default::default()
            }),
            window_min_size: Some(size(px(MIN_WINDOW_WIDTH), px(MIN_WINDOW_HEIGHT))),
            ..Default::default()
        };

        let settings = settings.clone();
        if let Err(e) = cx.open_window(window_options, move |_window, cx| {
            cx.new(|cx| DevSheetsApp::new(settings, cx))
        }) {
            log::error!("Failed to open window: {}", e);
            cx.quit();
        }
    });
}
