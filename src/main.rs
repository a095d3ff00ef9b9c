//! The redline command-line executable.

fn main() -> anyhow::Result<()> {
    redline::run()
}
