//! Shared utility modules used across suggest components.

pub mod kana;
