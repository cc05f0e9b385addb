fn main() {
    // include_dir! embeds frontend/dist into the server at compile time;
    // cargo only tracks Rust sources unless told otherwise.
    println!("cargo:rerun-if-changed=frontend/dist");
}
