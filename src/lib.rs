//! No-show: Appointment Attendance Analysis Library
//!
//! A library for analysing medical appointment no-shows by cleaning
//! raw appointment data, deriving age bracket and disease history
//! features, and breaking attendance down by reminder, age and health.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
