pub mod essay;
pub mod evaluation;
pub mod session;
pub mod view;
