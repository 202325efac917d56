//! CLI infrastructure for the teeter trainer
//!
//! This module provides the command-line interface for training, evaluating,
//! simulating, and resetting the beam agent.

pub mod commands;
pub mod config;
pub mod ledger;
pub mod output;
