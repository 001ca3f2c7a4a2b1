//! screen-capture-mcp: Screenshot and OCR MCP server
//!
//! This library provides Model Context Protocol (MCP) server functionality
//! for taking desktop screenshots via the platform screenshot command and
//! extracting text from captured images with OCR.

pub mod capture;
pub mod error;
pub mod mcp;
pub mod model;
pub mod ocr;
pub mod tools;
pub mod util;
