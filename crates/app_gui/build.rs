use std::env;

fn main() {
    let version = env::var("MRI_VISION_VERSION")
        .unwrap_or_else(|_| env::var("CARGO_PKG_VERSION").unwrap());
    println!("cargo:rustc-env=MRI_VISION_VERSION={version}");
}
