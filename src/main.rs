//! # phash-pipeline CLI
//!
//! Command-line interface for the perceptual-hash pipeline.
//!
//! ## Usage
//! ```bash
//! phash-pipeline hash ~/Photos --pool-size 4
//! phash-pipeline similar --distance 5 --output json
//! ```

mod cli;

use phash_pipeline::Result;

fn main() -> Result<()> {
    phash_pipeline::init_tracing();
    cli::run()
}
