//! # photo-organize CLI
//!
//! Command-line interface for the photo organizer.
//!
//! ## Usage
//! ```bash
//! photo-organize organize --source ~/Camera --destination ~/Library --dry-run
//! photo-organize duplicates ~/Camera --output json
//! ```

mod cli;

use photo_organizer::Result;

fn main() -> Result<()> {
    cli::run()
}
