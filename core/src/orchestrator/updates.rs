use crate::entries::{EntryAction, Icon, NewEntry};
use crate::events::UpdateInfo;

pub fn available_entry(info: &UpdateInfo) -> NewEntry {
    let entry = NewEntry::text("Update available")
        .body(format!("Version {} is being downloaded…", info.version))
        .icon(Icon::Info);
    match &info.release_notes {
        Some(url) => entry.action(EntryAction::OpenUrl { url: url.clone() }),
        None => entry,
    }
}

pub fn downloaded_entry(info: &UpdateInfo) -> NewEntry {
    NewEntry::text("Update ready")
        .body(format!("Version {} will be installed on restart.", info.version))
        .icon(Icon::Success)
        .action(EntryAction::InstallUpdate)
}
