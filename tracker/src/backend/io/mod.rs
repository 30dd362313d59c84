//! # IO Module
//!
//! The boundary between the backend and whatever front end shows the data.
//!
//! Front ends implement [`Presenter`] to receive rendered state and call
//! [`StudentController`] for every user action: submitting the form, editing,
//! deleting with confirmation, cycling a status, filtering, exporting and
//! clearing all data.

pub mod presenter;
pub mod controller;

pub use presenter::Presenter;
pub use controller::StudentController;
