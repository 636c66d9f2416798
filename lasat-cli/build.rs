use std::{env, path::Path, process::Command};

/// Trimmed stdout of a successful command.
fn output_of(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_owned())
}

fn main() {
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_owned());

    let git_version = if Path::new("../.git").exists() {
        output_of(
            "git",
            &["describe", "--tags", "--match=v[0-9]*", "--dirty=-d", "--always"],
        )
        .map(|version| version.trim_start_matches('v').to_owned())
    } else {
        None
    };

    let version = git_version.unwrap_or_else(|| env::var("CARGO_PKG_VERSION").unwrap());
    let rustc_version =
        output_of(&rustc, &["--version"]).unwrap_or_else(|| "unknown rustc".to_owned());

    println!("cargo:rustc-env=LASAT_VERSION={}", version);
    println!("cargo:rustc-env=LASAT_RUSTC_VERSION={}", rustc_version);
    println!("cargo:rustc-env=LASAT_PROFILE={}", env::var("PROFILE").unwrap());
}
