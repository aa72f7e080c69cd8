//! Import EXIF metadata from a photo archive into a relational store, along
//! with a keyword index built from descriptions and directory names.

pub mod config;
pub mod db;
pub mod logging;
pub mod scanner;
