use anyhow::Result;
use mri_core::exercise::solve;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let threshold = 2;
    let points = [1, 2, 3];
    println!("{}", solve(threshold, &points)?);
    Ok(())
}
