use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=PLAIDML_LIB_DIR");
    println!("cargo:rerun-if-env-changed=PLAIDML_LIB_NAME");
    if env::var("CARGO_FEATURE_SYSTEM").is_err() {
        return;
    }
    if let Ok(dir) = env::var("PLAIDML_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir);
    } else if let Ok(prefix) = env::var("CONDA_PREFIX") {
        println!("cargo:rustc-link-search=native={}/lib", prefix);
    }
    let name = env::var("PLAIDML_LIB_NAME").unwrap_or_else(|_| "plaidml".into());
    println!("cargo:rustc-link-lib=dylib={}", name);
}
