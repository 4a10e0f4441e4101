use std::env;
use std::fs;
use std::path::{Path, PathBuf};

// oven-sh/WebKit autobuild used for the static JavaScriptCore archives
const BUN_WEBKIT_VERSION: &str = "aaf3f80b1cc701b412f8abfb7c7f413644a229ff";

fn main() {
    println!("cargo:rerun-if-env-changed=BUN_WEBKIT_VERSION");
    println!("cargo:rerun-if-env-changed=JSC_LIB_DIR");

    let target_os = env::var("CARGO_CFG_TARGET_OS").expect("CARGO_CFG_TARGET_OS not set");
    let target_arch = env::var("CARGO_CFG_TARGET_ARCH").expect("CARGO_CFG_TARGET_ARCH not set");

    match target_os.as_str() {
        "macos" | "ios" => link_framework(),
        "linux" | "windows" => {
            let lib_dir = match env::var("JSC_LIB_DIR") {
                Ok(dir) => PathBuf::from(dir),
                Err(_) => find_lib_dir(&fetch_webkit(&target_os, &target_arch)),
            };
            link_static(&lib_dir, &target_os);
        }
        other => panic!("JavaScriptCore is not available for target OS {other}"),
    }
}

fn link_framework() {
    println!("cargo:rustc-link-lib=framework=JavaScriptCore");

    if let Ok(output) = std::process::Command::new("xcrun")
        .args(["--show-sdk-path"])
        .output()
    {
        let sdk = String::from_utf8_lossy(&output.stdout);
        println!(
            "cargo:rustc-link-search=framework={}/System/Library/Frameworks",
            sdk.trim()
        );
    }
}

fn fetch_webkit(os: &str, arch: &str) -> PathBuf {
    let arch = match (os, arch) {
        (_, "x86_64") => "amd64",
        ("linux", "aarch64") => "arm64",
        (os, arch) => panic!("No prebuilt JavaScriptCore for {os}-{arch}"),
    };
    let version = env::var("BUN_WEBKIT_VERSION").unwrap_or_else(|_| BUN_WEBKIT_VERSION.into());

    let dest = cache_dir().join(&version).join(format!("{os}-{arch}"));
    let marker = dest.join(".downloaded");
    if marker.exists() {
        return dest;
    }

    let url = format!(
        "https://github.com/oven-sh/WebKit/releases/download/autobuild-{version}/bun-webkit-{os}-{arch}.tar.gz"
    );
    println!("cargo:warning=Downloading JavaScriptCore from {url}");

    fs::create_dir_all(&dest).expect("failed to create JavaScriptCore cache directory");

    let response = ureq::get(&url)
        .call()
        .unwrap_or_else(|e| panic!("failed to download {url}: {e}"));
    let archive = flate2::read::GzDecoder::new(response.into_body().into_reader());
    tar::Archive::new(archive)
        .unpack(&dest)
        .expect("failed to extract JavaScriptCore archive");

    fs::write(&marker, "").expect("failed to write download marker");
    dest
}

fn link_static(lib_dir: &Path, os: &str) {
    println!("cargo:rustc-link-search=native={}", lib_dir.display());
    println!("cargo:rustc-link-lib=static=JavaScriptCore");
    println!("cargo:rustc-link-lib=static=WTF");

    if has_lib(lib_dir, "bmalloc") {
        println!("cargo:rustc-link-lib=static=bmalloc");
    }

    // Windows builds ship ICU as sicu*
    let icu: &[&str] = if has_lib(lib_dir, "icudata") {
        &["icudata", "icui18n", "icuuc"]
    } else if has_lib(lib_dir, "sicudt") {
        &["sicudt", "sicuin", "sicuuc"]
    } else {
        println!("cargo:warning=ICU libraries not found in {}", lib_dir.display());
        &[]
    };
    for lib in icu {
        println!("cargo:rustc-link-lib=static={lib}");
    }

    let system: &[&str] = match os {
        "linux" => &["stdc++", "atomic", "dl", "pthread", "m"],
        "windows" => &[
            "winmm", "bcrypt", "ntdll", "userenv", "dbghelp", "crypt32", "wsock32", "ws2_32",
            "advapi32", "ole32", "oleaut32", "uuid", "shell32", "msvcrt",
        ],
        _ => &[],
    };
    for lib in system {
        println!("cargo:rustc-link-lib={lib}");
    }
    if os == "windows" {
        println!("cargo:rustc-link-arg=/NODEFAULTLIB:libcmt");
    }
}

fn find_lib_dir(root: &Path) -> PathBuf {
    let direct = root.join("lib");
    if direct.exists() {
        return direct;
    }

    fs::read_dir(root)
        .into_iter()
        .flatten()
        .flatten()
        .map(|entry| entry.path().join("lib"))
        .find(|lib| lib.is_dir())
        .unwrap_or_else(|| root.to_path_buf())
}

fn has_lib(lib_dir: &Path, name: &str) -> bool {
    let prefixed = format!("lib{name}");
    fs::read_dir(lib_dir)
        .into_iter()
        .flatten()
        .flatten()
        .filter_map(|entry| entry.file_name().into_string().ok())
        .any(|file| {
            (file.starts_with(name) || file.starts_with(&prefixed))
                && (file.ends_with(".a") || file.ends_with(".lib"))
        })
}

fn cache_dir() -> PathBuf {
    if let Ok(home) = env::var("CARGO_HOME") {
        return PathBuf::from(home).join("cache").join("bun-webkit");
    }
    for var in ["HOME", "USERPROFILE"] {
        if let Ok(home) = env::var(var) {
            return PathBuf::from(home)
                .join(".cargo")
                .join("cache")
                .join("bun-webkit");
        }
    }
    PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set")).join("bun-webkit")
}
