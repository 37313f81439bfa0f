pub mod chat;
pub mod code_viewer;
pub mod pr_dialog;
pub mod projects;
pub mod sidebar;
