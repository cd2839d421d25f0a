//! # Overlap Forge Application (Binary)
//!
//! Main executable entry point.

fn main() -> anyhow::Result<()> {
    overlap_forge_app::main()
}
