// rust-embed embeds the page template and stylesheet at compile time, but
// Cargo may not notice when only those files change. Rerun when they do.

fn main() {
    println!("cargo:rerun-if-changed=src/assets/");
    println!("cargo:rerun-if-changed=templates/");
}
