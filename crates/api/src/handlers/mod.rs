pub mod diagnostics;
pub mod images;
pub mod recordings;
pub mod session;
pub mod settings;
