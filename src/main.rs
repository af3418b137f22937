//! adrank: rank ads by keyword relevance, never showing a caller the same ad twice.

use anyhow::Result;

fn main() -> Result<()> {
    adrank::cli::run()
}
