//! Shared types and utilities for the HumanTic platform

pub mod db;
pub mod types;
