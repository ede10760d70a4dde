use gpui::*;

use crate::cell::{Copy, Cut, Paste};
use crate::grid::{
    ClearGrid, CopyDeleteQuery, FillContainerId, FillDeviceId, FillDeviceModelId,
    FillIpAddress, FillMacAddress, FillPlaceInContainer, FillPoolProfileId, FillSerialNumber,
    GenerateDeleteQuery, LoadDatabase, PasteColumn, Quit, SaveCsv, WriteSettings,
};

/// Set up the application menu bar
pub fn setup_menu(cx: &mut App) {
    cx.set_menus(vec![
        Menu {
            name: "devsheets".into(),
            items: vec![
                MenuItem::action("Write Settings File", WriteSettings),
                MenuItem::separator(),
                MenuItem::action("Quit", Quit),
            ],
        },
        Menu {
            name: "File".into(),
            items: vec![
                MenuItem::action("Load Database...", LoadDatabase),
                MenuItem::action("Save CSV...", SaveCsv),
                MenuItem::separator(),
                MenuItem::action("Clear", ClearGrid),
            ],
        },
        Menu {
            name: "Edit".into(),
            items: vec![
                MenuItem::action("Cut", Cut),
                MenuItem::action("Copy", Copy),
                MenuItem::action("Paste", Paste),
                MenuItem::separator(),
                MenuItem::action("Paste Down Column", PasteColumn),
            ],
        },
        Menu {
            name: "Fill".into(),
            items: vec![
                MenuItem::action("Device ID", FillDeviceId),
                MenuItem::action("Device Model ID", FillDeviceModelId),
                MenuItem::action("Container ID", FillContainerId),
                MenuItem::action("Place in Container", FillPlaceInContainer),
                MenuItem::action("MAC Address", FillMacAddress),
                MenuItem::action("IP Address", FillIpAddress),
                MenuItem::action("Serial Number", FillSerialNumber),
                MenuItem::action("Pool Profile ID", FillPoolProfileId),
            ],
        },
        Menu {
            name: "Query".into(),
            items: vec![
                MenuItem::action("Generate Delete Query", GenerateDeleteQuery),
                MenuItem::action("Copy Delete Query", CopyDeleteQuery),
            ],
        },
    ]);
}
