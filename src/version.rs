pub fn print_version_info() {
    println!("orikata {}", env!("CARGO_PKG_VERSION"));

    // These are set by build.rs when building inside a git checkout
    if let Some(rev) = option_env!("ORIKATA_GIT_REV") {
        println!("git revision: {}", rev);
    }
    if let Some(date) = option_env!("ORIKATA_BUILD_DATE") {
        println!("build date: {}", date);
    }
}
