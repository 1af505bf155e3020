//! Output generation for search results.
//!
//! # Submodules
//!
//! - [`json`]: Writes a result list to a dated JSON file
//! - [`text`]: Renders articles, preferences and the source catalogue for the terminal
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── top.json            # empty query (headlines / feed)
//!     ├── climate-summit.json
//!     └── interest-rates.json
//! ```

pub mod json;
pub mod text;
