//! # UI Module
//!
//! Front ends for the student tracker. Each one implements the backend's
//! `Presenter` trait and forwards user actions to the `StudentController`.

pub mod terminal;

pub use terminal::{TerminalPresenter, TerminalShell};
