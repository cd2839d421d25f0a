// Main entry point that forwards to the overlap-forge-app binary
fn main() {
    // Exit with the same code as the app
    std::process::exit(match overlap_forge_app::main() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    });
}
